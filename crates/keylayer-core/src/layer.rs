// Keylayer Layer Tree
// Declarative key -> command / nested sublayer mappings

use indexmap::IndexMap;

use crate::command::CommandLeaf;
use crate::key::KeyCode;

/// Value bound to a key inside a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEntry {
    Command(CommandLeaf),
    Sublayer(Sublayer),
}

impl From<CommandLeaf> for LayerEntry {
    fn from(command: CommandLeaf) -> Self {
        LayerEntry::Command(command)
    }
}

impl From<Sublayer> for LayerEntry {
    fn from(sublayer: Sublayer) -> Self {
        LayerEntry::Sublayer(sublayer)
    }
}

/// A named modal state: its key bindings apply only while it is active.
///
/// Entries keep insertion order; binding a key twice replaces the earlier
/// entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sublayer {
    entries: IndexMap<KeyCode, LayerEntry>,
}

impl Sublayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a command leaf
    pub fn with_command(mut self, key: KeyCode, command: CommandLeaf) -> Self {
        self.entries.insert(key, LayerEntry::Command(command));
        self
    }

    /// Bind a nested sublayer
    pub fn with_sublayer(mut self, key: KeyCode, sublayer: Sublayer) -> Self {
        self.entries.insert(key, LayerEntry::Sublayer(sublayer));
        self
    }

    pub fn insert(&mut self, key: KeyCode, entry: impl Into<LayerEntry>) {
        self.entries.insert(key, entry.into());
    }

    pub fn entries(&self) -> &IndexMap<KeyCode, LayerEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest sublayer nesting below this one (0 when all entries are commands)
    pub fn depth(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                LayerEntry::Command(_) => 0,
                LayerEntry::Sublayer(sub) => 1 + sub.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}

impl FromIterator<(KeyCode, LayerEntry)> for Sublayer {
    fn from_iter<I: IntoIterator<Item = (KeyCode, LayerEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The complete top-level mapping handed to the compiler in one go.
///
/// Structurally a sublayer whose parent is the leader itself.
pub type Layers = Sublayer;
