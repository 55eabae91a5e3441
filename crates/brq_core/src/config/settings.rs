//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Render-run behavior.
    #[serde(default)]
    pub render: RenderSettings,
}

/// Path configuration for queue storage and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// File the queue is persisted to.
    #[serde(default = "default_queue_file")]
    pub queue_file: String,

    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_queue_file() -> String {
    "render_queue.json".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            queue_file: default_queue_file(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Show timestamps in run-log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Spaces per indentation level in the run log.
    #[serde(default = "default_indent_step")]
    pub indent_step: u32,

    /// Log debug-level detail in run logs.
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

fn default_indent_step() -> u32 {
    2
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            indent_step: default_indent_step(),
            verbose: false,
        }
    }
}

impl LoggingSettings {
    /// Build the run-log configuration these settings describe.
    pub fn to_log_config(&self) -> LogConfig {
        let mut config = if self.verbose {
            LogConfig::debug()
        } else {
            LogConfig::default()
        };
        config.show_timestamps = self.show_timestamps;
        config.indent_step = self.indent_step as usize;
        config
    }
}

/// Render-run behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Substring the active renderer's name must contain.
    #[serde(default = "default_expected_renderer")]
    pub expected_renderer: String,

    /// Abort the queue after this many canceled frames (0 disables).
    #[serde(default = "default_cancel_threshold")]
    pub cancel_threshold: u32,

    /// Age in seconds past which a rendered output counts as suspicious.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Trailing marker stripped from physical-camera names.
    #[serde(default = "default_physical_camera_suffix")]
    pub physical_camera_suffix: String,
}

fn default_expected_renderer() -> String {
    "V-Ray".to_string()
}

fn default_cancel_threshold() -> u32 {
    2
}

fn default_stale_after_secs() -> u64 {
    60
}

fn default_physical_camera_suffix() -> String {
    "_VRayPhysicalCamera".to_string()
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            expected_renderer: default_expected_renderer(),
            cancel_threshold: default_cancel_threshold(),
            stale_after_secs: default_stale_after_secs(),
            physical_camera_suffix: default_physical_camera_suffix(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Render,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Render => "render",
        }
    }
}
