//! Render-settings checks that run before each pass touches an entry.
//!
//! None of this blocks on its own. The executor surfaces the warning as a
//! continue/abort prompt during pre-check and merely logs it during commit.

use crate::host::RenderHost;

/// What the preflight inspection found and changed.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    /// Renderer or developer-toggle warning, when something looked risky.
    pub warning: Option<String>,
    /// The render-settings panel was opened here and must be closed when
    /// the pass ends.
    pub close_render_settings: bool,
}

/// Inspect the host's render state and settle the settings panel.
///
/// When the expected renderer is active, any pending edits in an open
/// render-settings panel are committed so they cannot leak into the run;
/// a closed panel is opened instead, which keeps programmatic overrides
/// from sticking after the run, and the caller is told to close it again.
pub fn check(host: &mut dyn RenderHost, expected_renderer: &str) -> PreflightReport {
    let renderer = host.active_renderer();
    if !renderer.contains(expected_renderer) {
        return PreflightReport {
            warning: Some(format!("{expected_renderer} is not set as current renderer!")),
            close_render_settings: false,
        };
    }

    let enabled = host.developer_toggles().enabled_labels();
    let warning = if enabled.is_empty() {
        None
    } else {
        Some(conjoin_enabled(&enabled))
    };

    let close_render_settings = if host.render_settings_open() {
        host.commit_render_settings();
        false
    } else {
        host.open_render_settings();
        true
    };

    PreflightReport {
        warning,
        close_render_settings,
    }
}

fn conjoin_enabled(labels: &[&'static str]) -> String {
    match labels {
        [] => String::new(),
        [only] => format!("{only} is enabled"),
        [first, second] => format!("{first} and {second} are enabled"),
        _ => {
            let head = labels[..labels.len() - 1].join(", ");
            format!("{head}, and {} are enabled", labels[labels.len() - 1])
        }
    }
}
