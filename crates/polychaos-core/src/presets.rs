//! Named starting points for the game.

use crate::config::{GameSettings, DEFAULT_CAPACITY, DEFAULT_RADIUS};
use crate::selection::SelectionRule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamePreset {
    pub name: &'static str,
    pub description: &'static str,
    pub vertices: i64,
    pub jump_ratio: f64,
    pub selection: SelectionRule,
}

impl GamePreset {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            vertices: self.vertices,
            jump_ratio: self.jump_ratio,
            capacity: DEFAULT_CAPACITY,
            radius: DEFAULT_RADIUS,
            selection: self.selection,
        }
    }
}

pub const PRESETS: &[GamePreset] = &[
    GamePreset {
        name: "sierpinski",
        description: "Triangle, halfway jumps: the Sierpinski gasket",
        vertices: 3,
        jump_ratio: 2.0,
        selection: SelectionRule::Uniform,
    },
    GamePreset {
        name: "square-no-repeat",
        description: "Square that never jumps toward the same corner twice",
        vertices: 4,
        jump_ratio: 2.0,
        selection: SelectionRule::NoRepeat,
    },
    GamePreset {
        name: "pentagon-no-neighbor",
        description: "Pentagon that skips the neighbours of the last corner",
        vertices: 5,
        jump_ratio: 2.0,
        selection: SelectionRule::NoNeighbor,
    },
    GamePreset {
        name: "hexagon-thirds",
        description: "Hexagon with a jump ratio of three",
        vertices: 6,
        jump_ratio: 3.0,
        selection: SelectionRule::Uniform,
    },
];

/// Case-insensitive lookup by name.
pub fn find_preset(name: &str) -> Option<&'static GamePreset> {
    let name = name.trim();
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for preset in PRESETS {
            assert!(preset.settings().validate().is_ok(), "{} is invalid", preset.name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_preset("Sierpinski").map(|p| p.vertices), Some(3));
        assert!(find_preset("koch").is_none());
    }
}
