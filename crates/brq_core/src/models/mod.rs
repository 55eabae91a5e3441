//! Data models for Batch Render Queue.
//!
//! This module contains the value types shared across the crate:
//! - Stable node identities (`NodeId`)
//! - Scene-configuration references (`SceneConfigKind`, `SceneConfigRef`)

mod identity;
mod scene_config;

// Re-export all public types
pub use identity::NodeId;
pub use scene_config::{SceneConfigKind, SceneConfigRef};
