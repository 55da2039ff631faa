// Keylayer Layer Compiler
// Flattens a layer tree into mutually exclusive engine rules

pub mod sublayer;

use std::fmt;

use indexmap::IndexMap;

use crate::command::CommandLeaf;
use crate::effect::Effect;
use crate::key::KeyCode;
use crate::layer::{LayerEntry, Layers, Sublayer};
use crate::naming::{display_path, FlagName, SublayerPrefix, VariableNaming};
use crate::rule::{Condition, FromEvent, Manipulator, Rule};

pub use sublayer::{compile_sublayer, SublayerContext, ESCAPE_KEY};

/// Trigger a sublayer entry is not allowed to reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedTrigger {
    ActivationKey,
    EscapeKey,
    /// One of the leader trigger's deactivate keys
    LeaderDeactivate,
}

impl fmt::Display for ReservedTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservedTrigger::ActivationKey => write!(f, "sublayer's own activation key"),
            ReservedTrigger::EscapeKey => write!(f, "escape key"),
            ReservedTrigger::LeaderDeactivate => write!(f, "leader's deactivate key"),
        }
    }
}

/// Fatal configuration errors; nothing is emitted when one occurs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Duplicate flag name '{flag}': sublayers {first} and {second} derive the same variable")]
    DuplicateFlagName {
        flag: FlagName,
        first: String,
        second: String,
    },

    #[error("Ambiguous trigger '{key}' in sublayer {sublayer}: collides with the {reserved}")]
    AmbiguousTrigger {
        sublayer: String,
        key: KeyCode,
        reserved: ReservedTrigger,
    },

    #[error("Command bound to {path} has no effects")]
    EmptyCommand { path: String },

    #[error("Sublayer context has an empty key path")]
    EmptyPath,
}

/// Non-fatal findings; compilation still succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    EmptySublayer { sublayer: String },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::EmptySublayer { sublayer } => {
                write!(f, "sublayer {} has no entries", sublayer)
            }
        }
    }
}

/// Result of a successful compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    /// Rule groups in declaration order
    pub rules: Vec<Rule>,
    /// Every sublayer flag, in declaration order
    pub flags: Vec<FlagName>,
    pub warnings: Vec<CompileWarning>,
}

impl CompiledOutput {
    pub fn manipulator_count(&self) -> usize {
        self.rules.iter().map(|r| r.manipulators.len()).sum()
    }

    /// All manipulators, flattened in order
    pub fn manipulators(&self) -> impl Iterator<Item = &Manipulator> + '_ {
        self.rules.iter().flat_map(|r| r.manipulators.iter())
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}

/// Compiles a layer tree with a given flag naming strategy
#[derive(Debug, Clone, Default)]
pub struct Compiler<N = SublayerPrefix> {
    naming: N,
}

impl Compiler<SublayerPrefix> {
    pub fn new() -> Self {
        Self {
            naming: SublayerPrefix,
        }
    }
}

impl<N: VariableNaming> Compiler<N> {
    pub fn with_naming(naming: N) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &N {
        &self.naming
    }

    /// Compile the top-level mapping.
    ///
    /// Flags are collected over the whole tree before any rule is built, since
    /// every activation guard lists all the other flags.
    pub fn compile(&self, layers: &Layers) -> Result<CompiledOutput, CompileError> {
        let flags = self.collect_flags(layers)?;
        let leader = FlagName::leader();
        let mut rules = Vec::with_capacity(layers.len());
        let mut warnings = Vec::new();

        for (key, entry) in layers.entries() {
            if *key == ESCAPE_KEY {
                return Err(CompileError::AmbiguousTrigger {
                    sublayer: leader.to_string(),
                    key: *key,
                    reserved: ReservedTrigger::EscapeKey,
                });
            }

            match entry {
                LayerEntry::Command(command) => {
                    rules.push(standalone(*key, command, &leader)?);
                }
                LayerEntry::Sublayer(node) => {
                    let path = [*key];
                    let ctx = SublayerContext {
                        path: &path,
                        parent: &leader,
                        all_flags: &flags,
                    };
                    rules.extend(compile_sublayer(&self.naming, ctx, node, &mut warnings)?);
                }
            }
        }

        log::debug!(
            "Compiled {} top-level entries into {} rule groups ({} sublayer flags)",
            layers.len(),
            rules.len(),
            flags.len()
        );

        Ok(CompiledOutput {
            rules,
            flags,
            warnings,
        })
    }

    /// Derive every sublayer flag depth-first and reject collisions, including
    /// a collision with the leader flag itself.
    fn collect_flags(&self, layers: &Layers) -> Result<Vec<FlagName>, CompileError> {
        let mut seen: IndexMap<FlagName, String> = IndexMap::new();
        seen.insert(FlagName::leader(), "(leader)".to_string());
        let mut path = Vec::new();
        self.collect_into(layers, &mut path, &mut seen)?;
        Ok(seen.into_keys().skip(1).collect())
    }

    fn collect_into(
        &self,
        node: &Sublayer,
        path: &mut Vec<KeyCode>,
        seen: &mut IndexMap<FlagName, String>,
    ) -> Result<(), CompileError> {
        for (key, entry) in node.entries() {
            let LayerEntry::Sublayer(child) = entry else {
                continue;
            };
            path.push(*key);
            let flag = self.naming.name_for(path);
            let label = display_path(path);
            if let Some(first) = seen.get(&flag) {
                return Err(CompileError::DuplicateFlagName {
                    flag,
                    first: first.clone(),
                    second: label,
                });
            }
            seen.insert(flag, label);
            self.collect_into(child, path, seen)?;
            path.pop();
        }
        Ok(())
    }
}

/// Compile with the default `sublayer_<key>` naming
pub fn compile(layers: &Layers) -> Result<CompiledOutput, CompileError> {
    Compiler::new().compile(layers)
}

/// A leader-level command: fires while the leader is armed, then disarms it.
fn standalone(key: KeyCode, command: &CommandLeaf, leader: &FlagName) -> Result<Rule, CompileError> {
    if command.is_empty() {
        return Err(CompileError::EmptyCommand {
            path: key.to_string(),
        });
    }

    let mut to = command.effects().to_vec();
    to.push(Effect::set_variable(leader.clone(), 0));

    let manipulator = Manipulator::basic(
        FromEvent::any_modifiers(key),
        to,
        vec![Condition::variable_if(leader.clone(), 1)],
    )
    .described(command.description());

    Ok(Rule::new(format!("Leader Key + {}", key), vec![manipulator]))
}
