use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::SCHEMA_VERSION;
use crate::models::{Folder, FolderId, ScopeKey};

/// Root of the persisted settings blob.
///
/// Migration is additive only: every field carries a serde default, so a
/// blob written by an older version loads with the missing keys filled in
/// and nothing removed. There is no rewrite of existing data on a version
/// bump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// All folders across all scopes, keyed by folder id
    #[serde(default)]
    pub folders: HashMap<FolderId, Folder>,
    /// Ordered folder-id list per scope. Ids that no longer exist in
    /// `folders` are treated as absent at read time.
    #[serde(default)]
    pub scope_folders: HashMap<ScopeKey, Vec<FolderId>>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folders: HashMap::new(),
            scope_folders: HashMap::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}
