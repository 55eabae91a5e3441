//! The collaborator traits implemented by host adapters.

use std::path::{Path, PathBuf};

use crate::models::{NodeId, SceneConfigRef};

use super::errors::HostResult;
use super::types::{
    CameraHandle, CameraInfo, DeveloperToggles, FrameRender, RenderGlobals, RenderSignal,
    TimeOutput,
};

/// Access to the content-creation host.
///
/// One implementation wraps the live host API; tests use scripted stand-ins.
/// The host API is single-threaded, so the trait takes `&mut self` for every
/// call that changes document or renderer state and makes no threading
/// promises.
///
/// # Example
///
/// ```ignore
/// let mut host = MaxScriptHost::connect()?;
/// let globals = host.render_globals();
/// host.set_render_resolution(1920, 1080);
/// // ... render ...
/// host.set_render_resolution(globals.width, globals.height);
/// ```
pub trait RenderHost {
    // --- Cameras ---

    /// All camera nodes in the open document.
    fn cameras(&self) -> Vec<CameraInfo>;

    /// Resolve a camera by its stable identity.
    fn camera_by_identity(&self, id: &NodeId) -> Option<CameraInfo>;

    /// Resolve a camera by display name (exact match).
    fn camera_by_name(&self, name: &str) -> Option<CameraInfo>;

    /// The stable identity of a camera, stamping a fresh one on first use.
    ///
    /// Implementations must keep identities unique within the document:
    /// copying a node in the host duplicates its stamp, and this call is
    /// where the duplicate gets regenerated.
    fn identity_of(&mut self, camera: CameraHandle) -> NodeId;

    // --- Render time and globals ---

    /// The active render-time mode (what `Default` frame ranges defer to).
    fn time_output(&self) -> TimeOutput;

    /// Current global resolution and pixel aspect.
    fn render_globals(&self) -> RenderGlobals;

    fn set_render_resolution(&mut self, width: u32, height: u32);

    fn set_pixel_aspect(&mut self, pixel_aspect: f32);

    // --- Scene configurations and presets ---

    /// All named scene configurations, both namespaces.
    fn scene_configs(&self) -> Vec<SceneConfigRef>;

    /// Activate one scene configuration.
    ///
    /// Fails with [`HostError::NotFound`](super::HostError::NotFound) when
    /// the name no longer exists in its namespace.
    fn activate_scene_config(&mut self, config: &SceneConfigRef) -> HostResult<()>;

    /// Directory the host loads render presets from.
    fn render_presets_dir(&self) -> PathBuf;

    /// Directory the host loads layer presets from.
    fn layer_presets_dir(&self) -> PathBuf;

    /// Load a render preset file into the current renderer.
    fn load_render_preset(&mut self, path: &Path) -> HostResult<()>;

    /// Load a layer preset file.
    fn load_layer_preset(&mut self, path: &Path) -> HostResult<()>;

    // --- Preconditions ---

    /// Display name of the active production renderer.
    fn active_renderer(&self) -> String;

    /// Current state of the developer/debug toggles.
    fn developer_toggles(&self) -> DeveloperToggles;

    /// Whether the render-settings panel is currently open.
    fn render_settings_open(&self) -> bool;

    /// Commit pending edits in the open render-settings panel.
    fn commit_render_settings(&mut self);

    fn open_render_settings(&mut self);

    fn close_render_settings(&mut self);

    // --- Paths ---

    /// Root of the current project, base for relative output paths.
    fn project_root(&self) -> PathBuf;

    /// The host's configured render-output directory.
    fn render_output_dir(&self) -> PathBuf;

    /// Location of the renderer's textual error log.
    fn error_log_path(&self) -> PathBuf;

    // --- Rendering ---

    /// Render one frame, blocking until the host returns.
    ///
    /// A user hitting cancel in the host is reported through
    /// [`RenderSignal::Canceled`], not as an error.
    fn render_frame(&mut self, render: &FrameRender) -> HostResult<RenderSignal>;

    /// Save the frame buffer preview of the last render.
    fn save_preview(&mut self, path: &Path) -> HostResult<()>;
}

/// Modal confirmations put to the user during pre-check.
///
/// `ask` returns the index of the chosen option, or `None` when the dialog
/// was dismissed. Dismissal is always treated as the negative answer.
pub trait UserPrompt {
    fn ask(&self, title: &str, message: &str, options: &[&str]) -> Option<usize>;

    /// Yes/No confirmation; dismissal counts as No.
    fn confirm(&self, title: &str, message: &str) -> bool {
        self.ask(title, message, &["Yes", "No"]) == Some(0)
    }

    /// Acknowledge-only notification.
    fn notify(&self, title: &str, message: &str) {
        let _ = self.ask(title, message, &["OK"]);
    }
}

/// Prompt that accepts every question, for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl UserPrompt for AcceptAll {
    fn ask(&self, _title: &str, _message: &str, _options: &[&str]) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAnswer(Option<usize>);

    impl UserPrompt for FixedAnswer {
        fn ask(&self, _title: &str, _message: &str, _options: &[&str]) -> Option<usize> {
            self.0
        }
    }

    #[test]
    fn accept_all_confirms() {
        assert!(AcceptAll.confirm("t", "m"));
    }

    #[test]
    fn dismissed_confirm_is_negative() {
        assert!(!FixedAnswer(None).confirm("t", "m"));
    }

    #[test]
    fn second_option_is_negative() {
        assert!(!FixedAnswer(Some(1)).confirm("t", "m"));
    }
}
