// Keylayer Commands
// Leaf actions of a layer tree plus the usual authoring shortcuts

use serde::{Deserialize, Serialize};

use crate::effect::Effect;

/// What happens when a key fires inside its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLeaf {
    #[serde(rename = "to")]
    effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl CommandLeaf {
    pub fn new(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl From<Effect> for CommandLeaf {
    fn from(effect: Effect) -> Self {
        CommandLeaf::new([effect])
    }
}

/// Run a shell command
pub fn shell(command: &str) -> CommandLeaf {
    shell_described(command, format!("Run shell command: {}", command))
}

/// Run a shell command with a custom description
pub fn shell_described(command: &str, description: impl Into<String>) -> CommandLeaf {
    CommandLeaf::new([Effect::shell(command)]).with_description(description)
}

/// `open` a URL, file or `-a` application argument
pub fn open(target: &str) -> CommandLeaf {
    shell_described(&format!("open {}", target), format!("Open {}", target))
}

/// `open -g`, leaving the current app focused
pub fn bg_open(target: &str) -> CommandLeaf {
    shell_described(
        &format!("open -g {}", target),
        format!("Open {} in background", target),
    )
}

/// Launch or focus an application bundle by name
pub fn app(name: &str) -> CommandLeaf {
    open(&format!("-a '{}.app'", name))
}
