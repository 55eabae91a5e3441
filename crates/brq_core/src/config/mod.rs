//! Configuration handling for Batch Render Queue.
//!
//! Settings live in a TOML file split into sections (`[paths]`, `[logging]`,
//! `[render]`). The manager loads/creates the file, keeps an in-memory copy,
//! and writes updates atomically, section by section.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, LoggingSettings, PathSettings, RenderSettings, Settings};
