use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque folder identifier, stable for the folder's lifetime.
pub type FolderId = String;

/// Key of a host-owned list entry (the chat file name).
pub type ItemKey = String;

/// Key of a grouping scope (the active character identity).
pub type ScopeKey = String;

/// Generate a unique folder ID using UUID v4
pub fn generate_folder_id() -> FolderId {
    format!("folder-{}", Uuid::new_v4())
}

/// A named, ordered, collapsible grouping of item keys within one scope.
///
/// Folders never own the items themselves — `member_keys` records which
/// host chat files belong to the folder, and a key appears in at most one
/// folder per scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier (`folder-<uuid>`), generated at creation
    pub id: FolderId,
    /// Display name; mutable by rename, never blank
    pub name: String,
    /// Item keys assigned to this folder, in assignment order
    #[serde(default)]
    pub member_keys: Vec<ItemKey>,
    /// Persisted display state, independent of membership
    #[serde(default)]
    pub collapsed: bool,
    /// Display rank among sibling folders within the scope
    #[serde(default)]
    pub order: u32,
}

impl Folder {
    pub fn new(name: &str, order: u32) -> Self {
        Self {
            id: generate_folder_id(),
            name: name.to_string(),
            member_keys: Vec::new(),
            collapsed: false,
            order,
        }
    }

    /// Check if a given item key is a member of this folder.
    pub fn contains(&self, key: &str) -> bool {
        self.member_keys.iter().any(|k| k == key)
    }
}

/// Where an item resolves within the current scope: a folder, or the
/// implicit unassigned group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Folder(FolderId),
    Unassigned,
}

impl Assignment {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Assignment::Unassigned)
    }
}
