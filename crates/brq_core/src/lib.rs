//! BRQ Core - Backend logic for the batch render queue
//!
//! This crate contains all queue and render logic with zero UI dependencies.
//! The host application provides scene access through the
//! [`RenderHost`](host::RenderHost) trait and user interaction through
//! [`UserPrompt`](host::UserPrompt); everything else lives here.

pub mod config;
pub mod engine;
pub mod entries;
pub mod host;
pub mod logging;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
