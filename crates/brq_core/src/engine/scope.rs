//! Save/override/restore scope for the host's shared render globals.
//!
//! Resolution and pixel-aspect overrides mutate process-wide host state, so
//! each entry snapshots the globals first and puts them back when it is
//! done. Restore is explicit rather than Drop-based; the executor funnels
//! every entry exit, including errors and queue aborts, through one call.

use crate::host::{RenderGlobals, RenderHost};

/// Snapshot of the render globals taken before an entry's overrides.
#[derive(Debug)]
pub struct GlobalsScope {
    saved: RenderGlobals,
}

impl GlobalsScope {
    /// Snapshot the current globals.
    pub fn capture(host: &dyn RenderHost) -> Self {
        Self {
            saved: host.render_globals(),
        }
    }

    /// The values present when the scope was captured.
    ///
    /// `Default` resolution and pixel-aspect fields resolve against these,
    /// not against whatever a preset load may have changed since.
    pub fn saved(&self) -> RenderGlobals {
        self.saved
    }

    /// Write the snapshot back, ending the scope.
    pub fn restore(self, host: &mut dyn RenderHost) {
        host.set_render_resolution(self.saved.width, self.saved.height);
        host.set_pixel_aspect(self.saved.pixel_aspect);
    }
}
