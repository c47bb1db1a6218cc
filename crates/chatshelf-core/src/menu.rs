use crate::constants::{NEW_FOLDER_LABEL, UNASSIGNED_LABEL};
use crate::models::Assignment;
use crate::store::FolderStore;

/// What selecting a context-menu entry should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Move the item to this group.
    Assign(Assignment),
    /// Create a folder and move the item into it; the name comes from the
    /// caller (the dialog is presentation, not engine).
    NewFolder,
}

/// One entry of the move-to-folder context menu.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
    /// Whether the item currently lives in this group (highlighted).
    pub current: bool,
}

/// Build the context menu for an item: the scope's folders in display
/// order, then "Unassigned", then "New folder…".
pub fn move_menu(store: &FolderStore, scope: &str, item_key: &str) -> Vec<MenuEntry> {
    let current = store.folder_for_item(scope, item_key);

    let mut entries: Vec<MenuEntry> = store
        .list_folders(scope)
        .iter()
        .map(|folder| MenuEntry {
            label: folder.name.clone(),
            current: current == Assignment::Folder(folder.id.clone()),
            action: MenuAction::Assign(Assignment::Folder(folder.id.clone())),
        })
        .collect();

    entries.push(MenuEntry {
        label: UNASSIGNED_LABEL.to_string(),
        current: current.is_unassigned(),
        action: MenuAction::Assign(Assignment::Unassigned),
    });
    entries.push(MenuEntry {
        label: NEW_FOLDER_LABEL.to_string(),
        current: false,
        action: MenuAction::NewFolder,
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileBackend, SettingsStore};
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn menu_lists_folders_unassigned_and_new() {
        let dir = tempdir().unwrap();
        let mut store = FolderStore::new(SettingsStore::load(
            Box::new(JsonFileBackend::new(dir.path())),
            Duration::from_millis(50),
        ));
        let lore = store.create_folder("alice", "Lore").unwrap();
        store.create_folder("alice", "Side stories").unwrap();
        store.move_item("alice", "chat_001.jsonl", &Assignment::Folder(lore.clone()));

        let entries = move_menu(&store, "alice", "chat_001.jsonl");
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Lore", "Side stories", "Unassigned", "New folder…"]);

        let highlighted: Vec<&str> = entries
            .iter()
            .filter(|e| e.current)
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(highlighted, vec!["Lore"]);

        // Folders from other scopes are never offered.
        let other = move_menu(&store, "bob", "chat_001.jsonl");
        assert_eq!(other.len(), 2);
        assert!(other[0].current, "unhoused items highlight Unassigned");
    }
}
