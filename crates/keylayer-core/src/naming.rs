// Keylayer Variable Naming
// Derives runtime flag names for sublayers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::KeyCode;

/// Name of the global flag that marks the leader as armed
pub const LEADER_FLAG: &str = "leader";

/// Name of a runtime state cell owned by the remapping engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagName(String);

impl FlagName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The global leader flag
    pub fn leader() -> Self {
        Self(LEADER_FLAG.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_leader(&self) -> bool {
        self.0 == LEADER_FLAG
    }
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlagName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Strategy for deriving a sublayer's flag name from its key path.
///
/// `path` is the chain of keys from the top level down to the sublayer, so a
/// top-level sublayer has a path of length 1. Implementations must be pure: the
/// compiler calls them more than once for the same path and relies on getting
/// the same answer. Injectivity is checked by the compiler, not assumed.
pub trait VariableNaming {
    fn name_for(&self, path: &[KeyCode]) -> FlagName;
}

/// Default strategy: `sublayer_` followed by the key path joined with `_`.
///
/// `[s]` becomes `sublayer_s`, `[o, m]` becomes `sublayer_o_m`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SublayerPrefix;

impl SublayerPrefix {
    pub const PREFIX: &'static str = "sublayer_";
}

impl VariableNaming for SublayerPrefix {
    fn name_for(&self, path: &[KeyCode]) -> FlagName {
        let joined: Vec<&str> = path.iter().map(|key| key.name()).collect();
        FlagName(format!("{}{}", Self::PREFIX, joined.join("_")))
    }
}

impl<F> VariableNaming for F
where
    F: Fn(&[KeyCode]) -> FlagName,
{
    fn name_for(&self, path: &[KeyCode]) -> FlagName {
        self(path)
    }
}

/// Render a key path for messages, e.g. `o > m`
pub fn display_path(path: &[KeyCode]) -> String {
    path.iter()
        .map(|key| key.name())
        .collect::<Vec<_>>()
        .join(" > ")
}
