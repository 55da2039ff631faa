// Keylayer Output Document
// The engine's top-level configuration file

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::rule::Rule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub show_in_menu_bar: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            show_in_menu_bar: false,
        }
    }
}

/// One rule group in the document.
///
/// Generated groups keep their typed form. Hand-written groups are carried as
/// raw JSON so every engine field survives, including ones this crate never
/// emits (`to_if_alone`, `parameters`, application conditions). A document
/// read back from disk holds only raw groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentRule {
    Generated(Rule),
    Verbatim(serde_json::Value),
}

impl DocumentRule {
    pub fn description(&self) -> Option<&str> {
        match self {
            DocumentRule::Generated(rule) => Some(rule.description.as_str()),
            DocumentRule::Verbatim(raw) => raw.get("description").and_then(|d| d.as_str()),
        }
    }

    /// Typed view of the group, `None` when a raw group uses fields outside
    /// the generated schema
    pub fn to_rule(&self) -> Option<Rule> {
        match self {
            DocumentRule::Generated(rule) => Some(rule.clone()),
            DocumentRule::Verbatim(raw) => serde_json::from_value(raw.clone()).ok(),
        }
    }
}

impl From<Rule> for DocumentRule {
    fn from(rule: Rule) -> Self {
        DocumentRule::Generated(rule)
    }
}

impl<'de> Deserialize<'de> for DocumentRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(DocumentRule::Verbatim)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexModifications {
    pub rules: Vec<DocumentRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub complex_modifications: ComplexModifications,
}

/// Root of the engine's configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KarabinerDocument {
    pub global: GlobalSettings,
    pub profiles: Vec<Profile>,
}

impl KarabinerDocument {
    /// A document with a single profile holding `rules`
    pub fn single_profile(name: impl Into<String>, rules: Vec<DocumentRule>) -> Self {
        Self {
            global: GlobalSettings::default(),
            profiles: vec![Profile {
                name: name.into(),
                complex_modifications: ComplexModifications { rules },
            }],
        }
    }

    pub fn with_global(mut self, global: GlobalSettings) -> Self {
        self.global = global;
        self
    }

    pub fn rule_count(&self) -> usize {
        self.profiles
            .iter()
            .map(|p| p.complex_modifications.rules.len())
            .sum()
    }

    /// Pretty JSON with two-space indentation and a trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Serialize fully, then write in one go
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
