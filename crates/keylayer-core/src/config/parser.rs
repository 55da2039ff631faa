// Keylayer Config Parser - TOML with Serde
// Parses layer definitions and output settings from TOML files

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::command::{self, CommandLeaf};
use crate::compiler::{CompileError, Compiler};
use crate::document::{DocumentRule, GlobalSettings, KarabinerDocument};
use crate::effect::Effect;
use crate::key::KeyCode;
use crate::layer::{LayerEntry, Layers, Sublayer};
use crate::leader::LeaderTrigger;
use crate::modifier::Modifier;
use crate::naming::display_path;

/// Fields that mark a `[layers]` table as a command rather than a sublayer
const COMMAND_FIELDS: [&str; 5] = ["shell", "open", "bg_open", "app", "to"];

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid layer entry at {path}: {reason}")]
    InvalidLayer { path: String, reason: String },

    #[error("Invalid rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Where and how the document is written
    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Leader arm/disarm keys
    #[serde(default)]
    pub leader: Option<LeaderConfig>,

    /// Hand-written engine rules, copied through verbatim
    #[serde(default)]
    pub rules: Vec<serde_json::Value>,

    /// Leader-level bindings: command tables or nested sublayer tables
    #[serde(default)]
    pub layers: IndexMap<String, toml::Value>,
}

/// Output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Destination file
    pub path: Option<PathBuf>,
    /// Profile name
    pub profile: Option<String>,
    /// Engine menu bar icon
    pub show_in_menu_bar: Option<bool>,
}

/// Leader trigger settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderConfig {
    /// Set to false when the leader is armed by rules defined elsewhere
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub key: Option<String>,
    pub modifiers: Option<Vec<String>>,
    pub deactivate: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

/// A command table under `[layers]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandToml {
    shell: Option<String>,
    open: Option<String>,
    bg_open: Option<String>,
    app: Option<String>,
    to: Option<Vec<Effect>>,
    description: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination file (None = caller decides)
    pub output_path: Option<PathBuf>,
    /// Profile name
    pub profile: String,
    /// Global engine settings
    pub global: GlobalSettings,
    /// Leader trigger (None = leader armed elsewhere)
    pub leader: Option<LeaderTrigger>,
    /// Verbatim rules placed before the generated ones
    pub rules: Vec<serde_json::Value>,
    /// The layer tree to compile
    pub layers: Layers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: None,
            profile: "Default".to_string(),
            global: GlobalSettings::default(),
            leader: Some(LeaderTrigger::default()),
            rules: vec![],
            layers: Layers::new(),
        }
    }
}

impl Config {
    /// Default config location (~/.config/keylayer/layers.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keylayer").join("layers.toml"))
    }

    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        toml_config.to_config()
    }

    /// Compile the layers and assemble the full document.
    ///
    /// Order: verbatim rules, leader rules, generated layer rules.
    pub fn to_document(&self) -> Result<KarabinerDocument, ConfigError> {
        self.to_document_with(&Compiler::new())
    }

    pub fn to_document_with<N: crate::naming::VariableNaming>(
        &self,
        compiler: &Compiler<N>,
    ) -> Result<KarabinerDocument, ConfigError> {
        if let Some(leader) = &self.leader {
            leader.check_layers(&self.layers)?;
        }
        let compiled = compiler.compile(&self.layers)?;

        let mut rules: Vec<DocumentRule> = self
            .rules
            .iter()
            .cloned()
            .map(DocumentRule::Verbatim)
            .collect();
        if let Some(leader) = &self.leader {
            rules.extend(leader.rules(&compiled.flags).into_iter().map(DocumentRule::from));
        }
        rules.extend(compiled.rules.into_iter().map(DocumentRule::from));

        log::debug!("Document assembled with {} rule groups", rules.len());

        Ok(KarabinerDocument::single_profile(self.profile.clone(), rules)
            .with_global(self.global.clone()))
    }

    /// Compile and serialize to the final JSON text
    pub fn render(&self) -> Result<String, ConfigError> {
        Ok(self.to_document()?.to_json()?)
    }
}

impl ConfigToml {
    /// Convert parsed TOML to internal Config structure
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(output) = &self.output {
            config.output_path = output.path.clone();
            if let Some(profile) = &output.profile {
                config.profile = profile.clone();
            }
            if let Some(show) = output.show_in_menu_bar {
                config.global.show_in_menu_bar = show;
            }
        }

        if let Some(leader) = &self.leader {
            config.leader = leader.to_trigger()?;
        }

        for (index, rule) in self.rules.iter().enumerate() {
            check_rule(index, rule)?;
        }
        config.rules = self.rules.clone();

        let mut path = Vec::new();
        for (key_str, value) in &self.layers {
            let key = parse_key(key_str)?;
            path.push(key);
            let entry = parse_entry(&mut path, value)?;
            config.layers.insert(key, entry);
            path.pop();
        }

        log::debug!(
            "Config parsed: {} verbatim rules, {} top-level layer entries",
            config.rules.len(),
            config.layers.len()
        );

        Ok(config)
    }
}

impl LeaderConfig {
    fn to_trigger(&self) -> Result<Option<LeaderTrigger>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        let mut trigger = LeaderTrigger::default();
        if let Some(key) = &self.key {
            trigger.key = parse_key(key)?;
        }
        if let Some(modifiers) = &self.modifiers {
            trigger.modifiers = modifiers
                .iter()
                .map(|m| parse_modifier(m))
                .collect::<Result<_, _>>()?;
        }
        if let Some(keys) = &self.deactivate {
            trigger.deactivate = keys
                .iter()
                .map(|k| parse_key(k))
                .collect::<Result<_, _>>()?;
        }
        Ok(Some(trigger))
    }
}

/// Parse a key name into a KeyCode
fn parse_key(name: &str) -> Result<KeyCode, ConfigError> {
    let trimmed = name.trim();
    KeyCode::from_str(trimmed).map_err(|_| ConfigError::InvalidKey(trimmed.to_string()))
}

fn parse_modifier(name: &str) -> Result<Modifier, ConfigError> {
    let trimmed = name.trim();
    Modifier::from_str(trimmed).map_err(|_| ConfigError::InvalidModifier(trimmed.to_string()))
}

/// A verbatim rule must at least look like a rule group; everything else is
/// left to the engine.
fn check_rule(index: usize, rule: &serde_json::Value) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRule {
        index,
        reason: reason.to_string(),
    };
    let table = rule.as_object().ok_or_else(|| invalid("expected a table"))?;
    if !table.get("description").is_some_and(|d| d.is_string()) {
        return Err(invalid("missing string field `description`"));
    }
    if !table.get("manipulators").is_some_and(|m| m.is_array()) {
        return Err(invalid("missing array field `manipulators`"));
    }
    Ok(())
}

/// A table with any command field is a command; any other table is a sublayer.
fn parse_entry(path: &mut Vec<KeyCode>, value: &toml::Value) -> Result<LayerEntry, ConfigError> {
    let table = value.as_table().ok_or_else(|| ConfigError::InvalidLayer {
        path: display_path(path),
        reason: format!("expected a table, found {}", value.type_str()),
    })?;

    if COMMAND_FIELDS.iter().any(|field| table.contains_key(*field)) {
        let command: CommandToml =
            value
                .clone()
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::InvalidLayer {
                    path: display_path(path),
                    reason: e.to_string(),
                })?;
        return Ok(LayerEntry::Command(command.into_leaf(path)?));
    }

    let mut sublayer = Sublayer::new();
    for (key_str, child) in table {
        let key = parse_key(key_str)?;
        path.push(key);
        let entry = parse_entry(path, child)?;
        sublayer.insert(key, entry);
        path.pop();
    }
    Ok(LayerEntry::Sublayer(sublayer))
}

impl CommandToml {
    fn into_leaf(self, path: &[KeyCode]) -> Result<CommandLeaf, ConfigError> {
        let mut actions = Vec::new();
        if let Some(cmd) = &self.shell {
            actions.push(command::shell(cmd));
        }
        if let Some(target) = &self.open {
            actions.push(command::open(target));
        }
        if let Some(target) = &self.bg_open {
            actions.push(command::bg_open(target));
        }
        if let Some(name) = &self.app {
            actions.push(command::app(name));
        }
        if let Some(effects) = self.to {
            actions.push(CommandLeaf::new(effects));
        }

        if actions.len() != 1 {
            return Err(ConfigError::InvalidLayer {
                path: display_path(path),
                reason: format!(
                    "a command needs exactly one of {}, found {}",
                    COMMAND_FIELDS.join("/"),
                    actions.len()
                ),
            });
        }

        let leaf = actions.remove(0);
        Ok(match self.description {
            Some(description) => leaf.with_description(description),
            None => leaf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ReservedTrigger;
    use crate::key::ConsumerKeyCode;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("a").unwrap(), KeyCode::A);
        assert_eq!(parse_key(" return_or_enter ").unwrap(), KeyCode::ReturnOrEnter);
        assert!(matches!(parse_key("notakey"), Err(ConfigError::InvalidKey(k)) if k == "notakey"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.profile, "Default");
        assert!(!config.global.show_in_menu_bar);
        assert_eq!(config.leader, Some(LeaderTrigger::default()));
        assert!(config.layers.is_empty());
        assert!(config.output_path.is_none());
    }

    #[test]
    fn test_config_from_simple_toml() {
        let toml = r#"
            [output]
            path = "karabiner.json"
            profile = "Work"

            [layers.spacebar]
            bg_open = "raycast://extensions/raycast/raycast/confetti"

            [layers.s]
            a = { open = "raycast://extensions/the-browser-company/arc/search" }
            "1" = { open = "raycast://extensions/khasbilegt/1password/item-list" }

            [layers.b]
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.output_path, Some(PathBuf::from("karabiner.json")));
        assert_eq!(config.profile, "Work");

        let keys: Vec<KeyCode> = config.layers.entries().keys().copied().collect();
        assert_eq!(keys, vec![KeyCode::Spacebar, KeyCode::S, KeyCode::B]);

        match &config.layers.entries()[&KeyCode::Spacebar] {
            LayerEntry::Command(leaf) => assert_eq!(
                leaf.description(),
                Some("Open raycast://extensions/raycast/raycast/confetti in background")
            ),
            other => panic!("expected command, got {:?}", other),
        }
        match &config.layers.entries()[&KeyCode::S] {
            LayerEntry::Sublayer(sub) => {
                let keys: Vec<KeyCode> = sub.entries().keys().copied().collect();
                assert_eq!(keys, vec![KeyCode::A, KeyCode::Num1]);
            }
            other => panic!("expected sublayer, got {:?}", other),
        }
        assert!(matches!(
            &config.layers.entries()[&KeyCode::B],
            LayerEntry::Sublayer(sub) if sub.is_empty()
        ));
    }

    #[test]
    fn test_raw_effects_and_description() {
        let toml = r#"
            [layers.u.z]
            to = [{ key_code = "8", modifiers = ["left_command", "left_option"] }]
            description = "Zoom"

            [layers.u.t]
            to = [{ consumer_key_code = "dictation" }]
        "#;

        let config = Config::from_toml(toml).unwrap();
        let LayerEntry::Sublayer(u) = &config.layers.entries()[&KeyCode::U] else {
            panic!("expected sublayer");
        };
        let LayerEntry::Command(zoom) = &u.entries()[&KeyCode::Z] else {
            panic!("expected command");
        };
        assert_eq!(zoom.description(), Some("Zoom"));
        assert_eq!(
            zoom.effects(),
            &[Effect::key_with(KeyCode::Num8, [Modifier::LeftCommand, Modifier::LeftOption])]
        );
        let LayerEntry::Command(dictate) = &u.entries()[&KeyCode::T] else {
            panic!("expected command");
        };
        assert_eq!(dictate.effects(), &[Effect::consumer(ConsumerKeyCode::Dictation)]);
        assert!(dictate.description().is_none());
    }

    #[test]
    fn test_leader_config() {
        let toml = r#"
            [leader]
            key = "f18"
            modifiers = []
            deactivate = ["escape"]
        "#;
        let config = Config::from_toml(toml).unwrap();
        let leader = config.leader.unwrap();
        assert_eq!(leader.key, KeyCode::F18);
        assert!(leader.modifiers.is_empty());
        assert_eq!(leader.deactivate, vec![KeyCode::Escape]);

        let config = Config::from_toml("[leader]\nenabled = false\n").unwrap();
        assert!(config.leader.is_none());
    }

    #[test]
    fn test_invalid_modifier() {
        let toml = r#"
            [leader]
            modifiers = ["hyperdrive"]
        "#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::InvalidModifier(m)) if m == "hyperdrive"
        ));
    }

    #[test]
    fn test_two_actions_in_one_command() {
        let toml = r#"
            [layers.q]
            shell = "quit"
            open = "somewhere"
        "#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLayer { ref path, .. } if path == "q"));
    }

    #[test]
    fn test_unknown_field_in_command() {
        let toml = r#"
            [layers.q]
            shell = "quit"
            colour = "red"
        "#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::InvalidLayer { .. })
        ));
    }

    #[test]
    fn test_non_table_entry() {
        let toml = r#"
            [layers]
            q = "quit"
        "#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("expected a table"));
    }

    #[test]
    fn test_invalid_nested_key() {
        let toml = r#"
            [layers.s]
            nope = { shell = "x" }
        "#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::InvalidKey(k)) if k == "nope"
        ));
    }

    #[test]
    fn test_verbatim_rules_pass_through() {
        let toml = r#"
            [[rules]]
            description = "Change right_command+j to left arrow"
            [[rules.manipulators]]
            type = "basic"
            from = { key_code = "j", modifiers = { mandatory = ["right_command"], optional = ["any"] } }
            to = [{ key_code = "left_arrow" }]
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0]["manipulators"][0]["from"]["key_code"], "j");
    }

    #[test]
    fn test_verbatim_rules_keep_engine_only_fields() {
        let toml = r#"
            [[rules]]
            description = "Caps Lock alone is Escape in the terminal"
            [[rules.manipulators]]
            type = "basic"
            from = { key_code = "caps_lock", modifiers = { optional = ["any"] } }
            to = [{ key_code = "left_control" }]
            to_if_alone = [{ key_code = "escape" }]
            parameters = { "basic.to_if_alone_timeout_milliseconds" = 300 }
            conditions = [{ type = "frontmost_application_if", bundle_identifiers = ['^com\.apple\.Terminal$'] }]
        "#;
        let config = Config::from_toml(toml).unwrap();
        let doc = config.to_document().unwrap();
        let group = &doc.profiles[0].complex_modifications.rules[0];
        assert_eq!(group, &DocumentRule::Verbatim(config.rules[0].clone()));

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let manipulator = &json["profiles"][0]["complex_modifications"]["rules"][0]["manipulators"][0];
        assert_eq!(manipulator["to_if_alone"], serde_json::json!([{ "key_code": "escape" }]));
        assert_eq!(
            manipulator["parameters"]["basic.to_if_alone_timeout_milliseconds"],
            300
        );
        assert_eq!(
            manipulator["conditions"][0]["bundle_identifiers"][0],
            "^com\\.apple\\.Terminal$"
        );
    }

    #[test]
    fn test_verbatim_rule_without_manipulators() {
        let toml = r#"
            [[rules]]
            description = "Nothing here"
        "#;
        assert!(matches!(
            Config::from_toml(toml),
            Err(ConfigError::InvalidRule { index: 0, .. })
        ));
    }

    #[test]
    fn test_to_document_order() {
        let toml = r#"
            [[rules]]
            description = "Passthrough"
            manipulators = []

            [layers.q]
            shell = "quit"
        "#;
        let doc = Config::from_toml(toml).unwrap().to_document().unwrap();
        let names: Vec<&str> = doc.profiles[0]
            .complex_modifications
            .rules
            .iter()
            .filter_map(|r| r.description())
            .collect();
        assert_eq!(
            names,
            vec![
                "Passthrough",
                "Activate Leader Key",
                "Deactivate Leader Key",
                "Leader Key + q"
            ]
        );
    }

    #[test]
    fn test_to_document_surfaces_compile_errors() {
        let toml = r#"
            [layers.s.s]
            open = "spotify"
        "#;
        let err = Config::from_toml(toml).unwrap().to_document().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Compile(CompileError::AmbiguousTrigger { .. })
        ));
    }

    #[test]
    fn test_deactivate_key_at_leader_level_is_rejected() {
        let config = Config::from_toml("[layers.caps_lock]\nshell = \"say hi\"\n").unwrap();
        let err = config.to_document().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Compile(CompileError::AmbiguousTrigger {
                key: KeyCode::CapsLock,
                reserved: ReservedTrigger::LeaderDeactivate,
                ..
            })
        ));

        let toml = r#"
            [leader]
            deactivate = ["escape"]

            [layers.caps_lock]
            shell = "say hi"
        "#;
        assert!(Config::from_toml(toml).unwrap().to_document().is_ok());

        let toml = r#"
            [leader]
            enabled = false

            [layers.caps_lock]
            shell = "say hi"
        "#;
        assert!(Config::from_toml(toml).unwrap().to_document().is_ok());
    }
}
