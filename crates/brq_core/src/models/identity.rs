//! Stable identities for scene nodes.
//!
//! Node handles returned by the host are transient: they become invalid when
//! the document is reopened, and node names can be edited freely. Queue rows
//! therefore reference cameras through a `NodeId` the host stamps onto the
//! node itself, which survives save/load and renames.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque stable identity of a scene node.
///
/// Identities are unique within one open document. Copying a node in the host
/// duplicates its identity; `RenderHost::identity_of` is responsible for
/// repairing such collisions by regenerating the copy's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil identity, used for rows whose camera was never resolved.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// True if this is the nil identity.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}
