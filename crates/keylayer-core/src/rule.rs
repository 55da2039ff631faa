// Keylayer Rule Schema
// The rule/manipulator document shape consumed by the remapping engine

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::key::KeyCode;
use crate::modifier::FromModifiers;
use crate::naming::FlagName;

/// A group of manipulators shown as one entry in the engine's rule list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub description: String,
    pub manipulators: Vec<Manipulator>,
}

impl Rule {
    pub fn new(description: impl Into<String>, manipulators: Vec<Manipulator>) -> Self {
        Self {
            description: description.into(),
            manipulators,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulatorType {
    #[default]
    Basic,
}

/// Trigger side of a manipulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FromEvent {
    pub key_code: KeyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<FromModifiers>,
}

impl FromEvent {
    /// Trigger on `key` with any modifiers held
    pub fn any_modifiers(key_code: KeyCode) -> Self {
        Self {
            key_code,
            modifiers: Some(FromModifiers::any()),
        }
    }

    pub fn with_modifiers(key_code: KeyCode, modifiers: FromModifiers) -> Self {
        Self {
            key_code,
            modifiers: Some(modifiers),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    #[default]
    VariableIf,
    VariableUnless,
}

/// Guard predicate over a runtime variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub name: FlagName,
    pub value: i64,
}

impl Condition {
    /// `name == value`
    pub fn variable_if(name: FlagName, value: i64) -> Self {
        Self {
            kind: ConditionType::VariableIf,
            name,
            value,
        }
    }

    /// Whether this condition requires `name == value`
    pub fn requires(&self, name: &FlagName, value: i64) -> bool {
        self.kind == ConditionType::VariableIf && &self.name == name && self.value == value
    }
}

/// A single trigger -> effects mapping with guard conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manipulator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ManipulatorType,
    pub from: FromEvent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Manipulator {
    pub fn basic(from: FromEvent, to: Vec<Effect>, conditions: Vec<Condition>) -> Self {
        Self {
            description: None,
            kind: ManipulatorType::Basic,
            from,
            to,
            conditions,
        }
    }

    pub fn described(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    pub fn trigger(&self) -> KeyCode {
        self.from.key_code
    }

    /// Whether the guard contains `name == value`
    pub fn requires(&self, name: &FlagName, value: i64) -> bool {
        self.conditions.iter().any(|c| c.requires(name, value))
    }

    /// Whether any guard condition mentions `name`
    pub fn mentions(&self, name: &FlagName) -> bool {
        self.conditions.iter().any(|c| &c.name == name)
    }

    /// Whether the effects contain `name := value`
    pub fn sets(&self, name: &FlagName, value: i64) -> bool {
        self.to
            .iter()
            .filter_map(Effect::as_set_variable)
            .any(|sv| &sv.name == name && sv.value == value)
    }
}
