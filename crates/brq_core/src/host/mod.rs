//! Host collaborator seams.
//!
//! Everything the engine needs from the content-creation host goes through
//! the traits in this module:
//! - [`RenderHost`]: scene access, global render settings, preset loading and
//!   the blocking render primitive
//! - [`UserPrompt`]: modal confirmations during pre-check
//!
//! The engine never talks to a real host directly, which keeps the whole
//! queue pipeline runnable (and testable) against scripted stand-ins.

mod errors;
mod traits;
mod types;

pub mod error_log;

#[cfg(test)]
pub(crate) mod testing;

// Re-export all public types
pub use errors::{HostError, HostResult};
pub use traits::{AcceptAll, RenderHost, UserPrompt};
pub use types::{
    CameraHandle, CameraInfo, DeveloperToggles, FrameRender, RenderGlobals, RenderSignal,
    TimeOutput,
};
