//! Game configuration: raw user-facing settings and the validated form the engine accepts.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::SelectionRule;

pub const VERTEX_RANGE: RangeInclusive<i64> = 3..=12;
pub const JUMP_RATIO_RANGE: RangeInclusive<f64> = 2.0..=12.0;

pub const DEFAULT_VERTICES: i64 = 3;
pub const DEFAULT_JUMP_RATIO: f64 = 2.0;
pub const DEFAULT_CAPACITY: usize = 10_000;
pub const DEFAULT_RADIUS: f64 = 1.0;

/// Unvalidated game parameters as they arrive from a form, CLI flags or a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GameSettings {
    pub vertices: i64,
    pub jump_ratio: f64,
    pub capacity: usize,
    pub radius: f64,
    pub selection: SelectionRule,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            vertices: DEFAULT_VERTICES,
            jump_ratio: DEFAULT_JUMP_RATIO,
            capacity: DEFAULT_CAPACITY,
            radius: DEFAULT_RADIUS,
            selection: SelectionRule::Uniform,
        }
    }
}

impl GameSettings {
    /// Checks every field and reports all offending ones at once.
    pub fn validate(&self) -> Result<GameConfig, ConfigError> {
        let mut issues = Vec::new();
        if !VERTEX_RANGE.contains(&self.vertices) {
            issues.push(FieldIssue::Vertices(self.vertices));
        }
        if !self.jump_ratio.is_finite() || !JUMP_RATIO_RANGE.contains(&self.jump_ratio) {
            issues.push(FieldIssue::JumpRatio(self.jump_ratio));
        }
        if self.capacity == 0 {
            issues.push(FieldIssue::Capacity(self.capacity));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            issues.push(FieldIssue::Radius(self.radius));
        }
        if !issues.is_empty() {
            return Err(ConfigError { issues });
        }
        Ok(GameConfig {
            vertex_count: self.vertices as usize,
            jump_ratio: self.jump_ratio,
            capacity: self.capacity,
            radius: self.radius,
            selection: self.selection,
        })
    }
}

/// Validated configuration. Only obtainable through [`GameSettings::validate`],
/// so an engine can never be built from out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    vertex_count: usize,
    jump_ratio: f64,
    capacity: usize,
    radius: f64,
    selection: SelectionRule,
}

impl GameConfig {
    pub fn new(vertices: i64, jump_ratio: f64) -> Result<Self, ConfigError> {
        GameSettings {
            vertices,
            jump_ratio,
            ..GameSettings::default()
        }
        .validate()
    }

    pub fn with_capacity(self, capacity: usize) -> Result<Self, ConfigError> {
        GameSettings {
            capacity,
            ..self.to_settings()
        }
        .validate()
    }

    pub fn with_radius(self, radius: f64) -> Result<Self, ConfigError> {
        GameSettings {
            radius,
            ..self.to_settings()
        }
        .validate()
    }

    pub fn with_selection(mut self, selection: SelectionRule) -> Self {
        self.selection = selection;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn jump_ratio(&self) -> f64 {
        self.jump_ratio
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn selection(&self) -> SelectionRule {
        self.selection
    }

    pub fn to_settings(&self) -> GameSettings {
        GameSettings {
            vertices: self.vertex_count as i64,
            jump_ratio: self.jump_ratio,
            capacity: self.capacity,
            radius: self.radius,
            selection: self.selection,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            vertex_count: DEFAULT_VERTICES as usize,
            jump_ratio: DEFAULT_JUMP_RATIO,
            capacity: DEFAULT_CAPACITY,
            radius: DEFAULT_RADIUS,
            selection: SelectionRule::Uniform,
        }
    }
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, jump ratio {}, capacity {}, radius {}, {} selection",
            self.vertex_count, self.jump_ratio, self.capacity, self.radius, self.selection
        )
    }
}

/// A single rejected field. The message spells out the accepted range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldIssue {
    #[error("vertices must be an integer between 3 and 12 (got {0})")]
    Vertices(i64),
    #[error("jump ratio must be between 2 and 12 (got {0})")]
    JumpRatio(f64),
    #[error("capacity must be at least 1 (got {0})")]
    Capacity(usize),
    #[error("radius must be a positive finite number (got {0})")]
    Radius(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration: {}", join_issues(.issues))]
pub struct ConfigError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Caller-side validation with last-known-good fallback, as a settings form would do it.
///
/// A rejected submission resets only the offending fields; the rest of the
/// submitted values are kept so the user does not lose them.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    fields: GameSettings,
    last_good: GameConfig,
}

impl Default for ConfigForm {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl ConfigForm {
    pub fn new(initial: GameConfig) -> Self {
        Self {
            fields: initial.to_settings(),
            last_good: initial,
        }
    }

    /// Values currently shown in the form.
    pub fn fields(&self) -> &GameSettings {
        &self.fields
    }

    pub fn last_good(&self) -> GameConfig {
        self.last_good
    }

    pub fn submit(&mut self, input: GameSettings) -> Result<GameConfig, ConfigError> {
        match input.validate() {
            Ok(config) => {
                self.fields = input;
                self.last_good = config;
                Ok(config)
            }
            Err(err) => {
                let good = self.last_good.to_settings();
                let mut fields = input;
                for issue in &err.issues {
                    match issue {
                        FieldIssue::Vertices(_) => fields.vertices = good.vertices,
                        FieldIssue::JumpRatio(_) => fields.jump_ratio = good.jump_ratio,
                        FieldIssue::Capacity(_) => fields.capacity = good.capacity,
                        FieldIssue::Radius(_) => fields.radius = good.radius,
                    }
                }
                self.fields = fields;
                Err(err)
            }
        }
    }

    /// Submits `input`; on rejection resubmits the reset fields, which always validate.
    pub fn submit_or_reset(&mut self, input: GameSettings) -> (GameConfig, Option<ConfigError>) {
        match self.submit(input) {
            Ok(config) => (config, None),
            Err(err) => {
                let config = self
                    .fields
                    .validate()
                    .unwrap_or(self.last_good);
                self.last_good = config;
                (config, Some(err))
            }
        }
    }
}
