//! Value types crossing the host boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Transient handle to a camera node in the open document.
///
/// Valid only for the current host session; rows persist a
/// [`NodeId`](crate::models::NodeId) instead and re-resolve handles on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub u64);

/// A resolved camera: live handle plus its current display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub handle: CameraHandle,
    pub name: String,
}

impl CameraInfo {
    pub fn new(handle: CameraHandle, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
        }
    }
}

/// The host's active render-time mode, snapshotted at run start.
///
/// Rows whose frame-range field says `Default` defer to this.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeOutput {
    /// Render the current frame only.
    Single { frame: i32 },
    /// Render the active time segment, every frame.
    ActiveSegment { start: i32, end: i32 },
    /// Render an explicit range, every nth frame.
    Range { start: i32, end: i32, every_nth: i32 },
    /// Render an explicit frame list, e.g. `"1, 3-5, 8"`.
    Frames { spec: String },
}

/// Snapshot of the global render settings the engine may override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGlobals {
    pub width: u32,
    pub height: u32,
    pub pixel_aspect: f32,
}

/// The developer/debug toggles inspected during preflight.
///
/// Any of these left enabled silently changes what renders, so preflight
/// warns about them before a batch starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperToggles {
    #[serde(default)]
    pub region_render: bool,
    #[serde(default)]
    pub test_resolution: bool,
    #[serde(default)]
    pub follow_mouse: bool,
    #[serde(default)]
    pub debug_shading: bool,
}

impl DeveloperToggles {
    /// Display labels of the toggles that are enabled, in fixed order.
    pub fn enabled_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.region_render {
            labels.push("Region render");
        }
        if self.test_resolution {
            labels.push("Test resolution");
        }
        if self.follow_mouse {
            labels.push("Follow mouse");
        }
        if self.debug_shading {
            labels.push("Debug shading");
        }
        labels
    }

    pub fn any_enabled(&self) -> bool {
        self.region_render || self.test_resolution || self.follow_mouse || self.debug_shading
    }
}

/// One blocking render call: camera, frame and the exact output file.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRender {
    pub camera: CameraHandle,
    pub frame: i32,
    pub width: u32,
    pub height: u32,
    pub pixel_aspect: f32,
    pub output: PathBuf,
}

/// What the render primitive reported when it returned.
///
/// User cancellation is an ordinary return value in the host API, not an
/// error; host errors come back as `Err(HostError)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSignal {
    Completed,
    Canceled,
}
