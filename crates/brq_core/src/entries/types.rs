//! Render-entry data structures.

use serde::{Deserialize, Serialize};

use crate::models::NodeId;

/// Sentinel meaning "defer to the host" in range/resolution/aspect fields,
/// and "use the camera name" in the name field. Compared case-insensitively.
pub const DEFAULT_FIELD: &str = "Default";

/// Sentinel meaning "derive the output file from the queue's default
/// directory and the resolved render name".
pub const DEFAULT_PATH_TEXT: &str = "Default Path + Name";

/// True if a field value is the `Default` sentinel.
pub fn is_default_field(value: &str) -> bool {
    value.eq_ignore_ascii_case(DEFAULT_FIELD)
}

/// One row of the render queue.
///
/// Override fields keep their literal table form; parsing happens when the
/// entry is processed, so a stale or hand-edited value surfaces as an
/// entry-level error at run time instead of corrupting the stored queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEntry {
    /// Render this entry when the queue runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Render-name template; `Default` means `{Camera}`.
    #[serde(default = "default_field")]
    pub name: String,

    /// Stable identity of the camera node.
    pub camera_id: NodeId,

    /// Last-known camera display name, used as a fallback lookup key.
    #[serde(default)]
    pub camera_name: String,

    /// Literal output path, or [`DEFAULT_PATH_TEXT`].
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// `Default` or `start:end`.
    #[serde(default = "default_field")]
    pub frame_range: String,

    /// `Default` or `WxH`.
    #[serde(default = "default_field")]
    pub resolution: String,

    /// `Default` or a decimal literal.
    #[serde(default = "default_field")]
    pub pixel_aspect: String,

    /// Empty, or a prefix-tagged scene-configuration name.
    #[serde(default)]
    pub scene_config: String,

    /// Empty, or a render-preset file stem.
    #[serde(default)]
    pub render_preset: String,

    /// Empty, or a layer-preset file stem.
    #[serde(default)]
    pub layer_preset: String,
}

fn default_true() -> bool {
    true
}

fn default_field() -> String {
    DEFAULT_FIELD.to_string()
}

fn default_output_path() -> String {
    DEFAULT_PATH_TEXT.to_string()
}

impl RenderEntry {
    /// Create an entry for a camera with every override at its default.
    pub fn new(camera_id: NodeId, camera_name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            name: default_field(),
            camera_id,
            camera_name: camera_name.into(),
            output_path: default_output_path(),
            frame_range: default_field(),
            resolution: default_field(),
            pixel_aspect: default_field(),
            scene_config: String::new(),
            render_preset: String::new(),
            layer_preset: String::new(),
        }
    }

    /// True if the entry writes into the queue's default output directory.
    pub fn uses_default_output(&self) -> bool {
        self.output_path == DEFAULT_PATH_TEXT
    }
}
