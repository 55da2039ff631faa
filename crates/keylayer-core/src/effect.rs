// Keylayer Effects
// Primitive output actions emitted when a rule fires (`to` entries)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::{ConsumerKeyCode, KeyCode};
use crate::modifier::Modifier;
use crate::naming::FlagName;

/// Assignment of a runtime variable owned by the remapping engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetVariable {
    pub name: FlagName,
    pub value: i64,
}

/// One primitive output action.
///
/// The serialized form is a single `to` entry of the engine schema, so the
/// variant is recognized by which field is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Effect {
    Key {
        key_code: KeyCode,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        modifiers: Vec<Modifier>,
    },
    ConsumerKey {
        consumer_key_code: ConsumerKeyCode,
    },
    Shell {
        shell_command: String,
    },
    SetVariable {
        set_variable: SetVariable,
    },
}

impl Effect {
    /// Emit a bare key
    pub fn key(key_code: KeyCode) -> Self {
        Effect::Key {
            key_code,
            modifiers: Vec::new(),
        }
    }

    /// Emit a key with modifiers held
    pub fn key_with(key_code: KeyCode, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Effect::Key {
            key_code,
            modifiers: modifiers.into_iter().collect(),
        }
    }

    pub fn consumer(consumer_key_code: ConsumerKeyCode) -> Self {
        Effect::ConsumerKey { consumer_key_code }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Effect::Shell {
            shell_command: command.into(),
        }
    }

    pub fn set_variable(name: FlagName, value: i64) -> Self {
        Effect::SetVariable {
            set_variable: SetVariable { name, value },
        }
    }

    /// Returns the variable assignment if this effect is one
    pub fn as_set_variable(&self) -> Option<&SetVariable> {
        match self {
            Effect::SetVariable { set_variable } => Some(set_variable),
            _ => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Key {
                key_code,
                modifiers,
            } => {
                for modifier in modifiers {
                    write!(f, "{}+", modifier)?;
                }
                write!(f, "{}", key_code)
            }
            Effect::ConsumerKey { consumer_key_code } => write!(f, "consumer:{}", consumer_key_code),
            Effect::Shell { shell_command } => write!(f, "shell:{}", shell_command),
            Effect::SetVariable { set_variable } => {
                write!(f, "{}={}", set_variable.name, set_variable.value)
            }
        }
    }
}
