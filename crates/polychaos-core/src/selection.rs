//! Vertex selection policies. The base game draws uniformly; restricted rules
//! remember the previous pick and draw uniformly among the remaining candidates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::RandomSource;

/// Picks the target vertex for the next step.
pub trait VertexSelector: Send + fmt::Debug {
    /// Returns an index in `[0, vertex_count)`.
    fn select(&mut self, vertex_count: usize, rng: &mut dyn RandomSource) -> usize;

    /// Forget any memory of previous picks.
    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionRule {
    #[default]
    Uniform,
    NoRepeat,
    NoNeighbor,
}

impl SelectionRule {
    pub const ALL: [SelectionRule; 3] = [
        SelectionRule::Uniform,
        SelectionRule::NoRepeat,
        SelectionRule::NoNeighbor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SelectionRule::Uniform => "uniform",
            SelectionRule::NoRepeat => "no-repeat",
            SelectionRule::NoNeighbor => "no-neighbor",
        }
    }

    pub fn selector(self) -> Box<dyn VertexSelector> {
        match self {
            SelectionRule::Uniform => Box::new(UniformSelector),
            SelectionRule::NoRepeat => Box::new(NoRepeatSelector::default()),
            SelectionRule::NoNeighbor => Box::new(NoNeighborSelector::default()),
        }
    }
}

impl fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown selection rule `{0}` (expected uniform, no-repeat or no-neighbor)")]
pub struct ParseSelectionRuleError(pub String);

impl FromStr for SelectionRule {
    type Err = ParseSelectionRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SelectionRule::ALL
            .into_iter()
            .find(|rule| rule.name() == wanted)
            .ok_or_else(|| ParseSelectionRuleError(s.to_string()))
    }
}

/// Independent discrete uniform draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelector;

impl VertexSelector for UniformSelector {
    fn select(&mut self, vertex_count: usize, rng: &mut dyn RandomSource) -> usize {
        rng.next_index(vertex_count)
    }
}

/// Never picks the same vertex twice in a row.
#[derive(Debug, Clone, Default)]
pub struct NoRepeatSelector {
    previous: Option<usize>,
}

impl VertexSelector for NoRepeatSelector {
    fn select(&mut self, vertex_count: usize, rng: &mut dyn RandomSource) -> usize {
        let pick = match self.previous {
            Some(previous) if previous < vertex_count && vertex_count > 1 => {
                let draw = rng.next_index(vertex_count - 1);
                if draw >= previous {
                    draw + 1
                } else {
                    draw
                }
            }
            _ => rng.next_index(vertex_count),
        };
        self.previous = Some(pick);
        pick
    }

    fn reset(&mut self) {
        self.previous = None;
    }
}

/// Never picks a ring neighbour of the previous vertex. Repeating it is allowed.
#[derive(Debug, Clone, Default)]
pub struct NoNeighborSelector {
    previous: Option<usize>,
    candidates: Vec<usize>,
}

impl VertexSelector for NoNeighborSelector {
    fn select(&mut self, vertex_count: usize, rng: &mut dyn RandomSource) -> usize {
        self.candidates.clear();
        match self.previous {
            Some(previous) if previous < vertex_count => {
                let next = (previous + 1) % vertex_count;
                let prior = (previous + vertex_count - 1) % vertex_count;
                self.candidates
                    .extend((0..vertex_count).filter(|&i| i != next && i != prior));
            }
            _ => self.candidates.extend(0..vertex_count),
        }
        let pick = if self.candidates.is_empty() {
            rng.next_index(vertex_count)
        } else {
            self.candidates[rng.next_index(self.candidates.len())]
        };
        self.previous = Some(pick);
        pick
    }

    fn reset(&mut self) {
        self.previous = None;
    }
}
