//! Polychaos core engine: platform-agnostic chaos-game logic, configuration, and presets.

pub mod config;
pub mod engine;
pub mod polygon;
pub mod presets;
pub mod random;
pub mod selection;
pub mod settings;

pub use config::{ConfigError, ConfigForm, FieldIssue, GameConfig, GameSettings};
pub use engine::{
    AgedPoint, ChaosEngine, EngineState, FrameSnapshot, PointInstance, StepUpdate, Updates,
};
pub use polygon::polygon_vertices;
pub use presets::{find_preset, GamePreset, PRESETS};
pub use random::RandomSource;
pub use selection::{SelectionRule, VertexSelector};
pub use settings::{AppSettings, RenderSettings, SettingsError};
