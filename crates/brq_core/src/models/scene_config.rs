//! Scene-configuration references.
//!
//! The host exposes two unrelated mechanisms for captured scene setups, and a
//! queue row may select from either. Stored values carry a literal prefix tag
//! so the engine can route the activation call to the right namespace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the host's two scene-configuration namespaces a name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneConfigKind {
    /// The hierarchical namespace (nested sets, activated by descendant path).
    StateSet,
    /// The flat legacy namespace (activated by restoring all captured parts).
    SceneState,
}

impl SceneConfigKind {
    /// The literal tag prepended to stored values in this namespace.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::StateSet => "State Set: ",
            Self::SceneState => "Scene State: ",
        }
    }

    pub fn all() -> &'static [SceneConfigKind] {
        &[Self::StateSet, Self::SceneState]
    }
}

impl fmt::Display for SceneConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateSet => write!(f, "State Set"),
            Self::SceneState => write!(f, "Scene State"),
        }
    }
}

/// A reference to one named scene configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneConfigRef {
    pub kind: SceneConfigKind,
    pub name: String,
}

impl SceneConfigRef {
    pub fn new(kind: SceneConfigKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Parse a stored field value.
    ///
    /// Returns `Ok(None)` for an empty value (no configuration selected) and
    /// `Err` with the raw value when the prefix tag is not recognized.
    pub fn parse(value: &str) -> Result<Option<Self>, String> {
        if value.is_empty() {
            return Ok(None);
        }
        for kind in SceneConfigKind::all() {
            if let Some(name) = value.strip_prefix(kind.prefix()) {
                return Ok(Some(Self::new(*kind, name)));
            }
        }
        Err(value.to_string())
    }

    /// The stored/display form, prefix tag included.
    pub fn tagged(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.name)
    }
}

impl fmt::Display for SceneConfigRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_state_set_prefix() {
        let parsed = SceneConfigRef::parse("State Set: Beauty").unwrap().unwrap();
        assert_eq!(parsed.kind, SceneConfigKind::StateSet);
        assert_eq!(parsed.name, "Beauty");
    }

    #[test]
    fn parses_scene_state_prefix() {
        let parsed = SceneConfigRef::parse("Scene State: Night").unwrap().unwrap();
        assert_eq!(parsed.kind, SceneConfigKind::SceneState);
        assert_eq!(parsed.name, "Night");
    }

    #[test]
    fn empty_value_means_none() {
        assert_eq!(SceneConfigRef::parse("").unwrap(), None);
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = SceneConfigRef::parse("Layer: Foo").unwrap_err();
        assert_eq!(err, "Layer: Foo");
    }

    #[test]
    fn tagged_round_trip() {
        let config = SceneConfigRef::new(SceneConfigKind::StateSet, "Look Dev");
        let parsed = SceneConfigRef::parse(&config.tagged()).unwrap().unwrap();
        assert_eq!(parsed, config);
    }
}
