// Keylayer Modifier System
// Modifier tokens and the `from.modifiers` constraint block

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A modifier token as spelled by the remapping engine
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Modifier {
    LeftCommand,
    LeftControl,
    LeftOption,
    LeftShift,
    RightCommand,
    RightControl,
    RightOption,
    RightShift,
    Command,
    Control,
    Option,
    Shift,
    Fn,
    CapsLock,
    /// Wildcard, only meaningful in `optional`
    Any,
}

impl Modifier {
    /// Left shift + left control + left option, the chord produced by a Meh key
    pub const MEH: [Modifier; 3] = [Modifier::LeftShift, Modifier::LeftControl, Modifier::LeftOption];

    /// Meh + left command
    pub const HYPER: [Modifier; 4] = [
        Modifier::LeftShift,
        Modifier::LeftControl,
        Modifier::LeftOption,
        Modifier::LeftCommand,
    ];
}

/// Modifier constraints on a trigger key
///
/// `mandatory` must all be held; `optional` may be held without blocking the match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FromModifiers {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mandatory: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<Modifier>,
}

impl FromModifiers {
    /// Accept the trigger regardless of held modifiers
    pub fn any() -> Self {
        Self {
            mandatory: Vec::new(),
            optional: vec![Modifier::Any],
        }
    }

    /// Require exactly these modifiers
    pub fn mandatory(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            mandatory: modifiers.into_iter().collect(),
            optional: Vec::new(),
        }
    }

    /// Require these modifiers while allowing any others
    pub fn mandatory_any(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            mandatory: modifiers.into_iter().collect(),
            optional: vec![Modifier::Any],
        }
    }

    pub fn accepts_any(&self) -> bool {
        self.optional.contains(&Modifier::Any)
    }
}

impl fmt::Display for FromModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.mandatory.iter().map(|m| m.as_ref()).collect();
        if parts.is_empty() {
            write!(f, "(none)")?;
        } else {
            write!(f, "{}", parts.join("+"))?;
        }
        if self.accepts_any() {
            write!(f, " [any]")?;
        }
        Ok(())
    }
}
