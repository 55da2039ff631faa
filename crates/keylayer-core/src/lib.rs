// Keylayer Core Library
// Compiles nested leader-key layers into flat remapping-engine rules

pub mod command;
pub mod compiler;
pub mod config;
pub mod document;
pub mod effect;
pub mod key;
pub mod layer;
pub mod leader;
pub mod modifier;
pub mod naming;
pub mod rule;

pub use command::{app, bg_open, open, shell, shell_described, CommandLeaf};
pub use compiler::{
    compile, compile_sublayer, CompileError, CompileWarning, CompiledOutput, Compiler,
    ReservedTrigger, SublayerContext, ESCAPE_KEY,
};
pub use config::{Config, ConfigError};
pub use document::{DocumentRule, GlobalSettings, KarabinerDocument, Profile};
pub use effect::{Effect, SetVariable};
pub use key::{ConsumerKeyCode, KeyCode};
pub use layer::{LayerEntry, Layers, Sublayer};
pub use leader::LeaderTrigger;
pub use modifier::{FromModifiers, Modifier};
pub use naming::{FlagName, SublayerPrefix, VariableNaming, LEADER_FLAG};
pub use rule::{Condition, ConditionType, FromEvent, Manipulator, ManipulatorType, Rule};
