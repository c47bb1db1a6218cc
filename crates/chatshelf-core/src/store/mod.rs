pub mod persist;

pub use persist::{JsonFileBackend, SettingsBackend, SettingsStore};

use std::time::Instant;

use crate::models::{Assignment, Folder, FolderId};

/// Folder model - single source of truth for grouping state.
///
/// Pure data, no DOM. Every mutator leaves the model self-consistent
/// before returning (a reconciliation pass may run immediately after) and
/// marks the settings blob dirty for the debounced write-through. Mutators
/// are silent no-ops on stale ids or absent scopes; the engine layer maps
/// those to its error taxonomy where a caller needs to know.
pub struct FolderStore {
    settings: SettingsStore,
}

impl FolderStore {
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings }
    }

    /// Folders of a scope, sorted by `order` then insertion position.
    /// Dangling ids in the scope list are skipped, never an error.
    pub fn list_folders(&self, scope: &str) -> Vec<&Folder> {
        let settings = self.settings.get();
        let Some(ids) = settings.scope_folders.get(scope) else {
            return Vec::new();
        };

        let mut folders: Vec<(usize, &Folder)> = ids
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| settings.folders.get(id).map(|f| (idx, f)))
            .collect();
        // Duplicate orders happen after delete/re-create; insertion
        // position breaks the tie.
        folders.sort_by_key(|(idx, f)| (f.order, *idx));
        folders.into_iter().map(|(_, f)| f).collect()
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.settings.get().folders.get(id)
    }

    /// Create a folder at the end of the scope's display order. Blank
    /// names are rejected (same rule as rename).
    pub fn create_folder(&mut self, scope: &str, name: &str) -> Option<FolderId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        // Append-to-end: rank = current folder count in this scope.
        let order = self.list_folders(scope).len() as u32;
        let folder = Folder::new(name, order);
        let id = folder.id.clone();

        let settings = self.settings.get_mut();
        settings.folders.insert(id.clone(), folder);
        settings
            .scope_folders
            .entry(scope.to_string())
            .or_default()
            .push(id.clone());
        self.settings.mark_dirty(Instant::now());

        tracing::debug!(scope, id = %id, "created folder");
        Some(id)
    }

    /// Rename a folder. No-op on a blank name or unknown id.
    pub fn rename_folder(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(folder) = self.settings.get_mut().folders.get_mut(id) else {
            return false;
        };
        folder.name = name.to_string();
        self.settings.mark_dirty(Instant::now());
        true
    }

    /// Delete a folder from a scope. Member items become unassigned; they
    /// are not deleted and not transferred.
    pub fn delete_folder(&mut self, scope: &str, id: &str) -> bool {
        let settings = self.settings.get_mut();
        let Some(ids) = settings.scope_folders.get_mut(scope) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|x| x == id) else {
            return false;
        };
        ids.remove(pos);
        settings.folders.remove(id);
        self.settings.mark_dirty(Instant::now());

        tracing::debug!(scope, id, "deleted folder");
        true
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> bool {
        let Some(folder) = self.settings.get_mut().folders.get_mut(id) else {
            return false;
        };
        folder.collapsed = collapsed;
        self.settings.mark_dirty(Instant::now());
        true
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> bool {
        let Some(folder) = self.settings.get_mut().folders.get_mut(id) else {
            return false;
        };
        folder.collapsed = !folder.collapsed;
        self.settings.mark_dirty(Instant::now());
        true
    }

    /// Assign an item to a folder (or back to unassigned). Membership is
    /// exclusive per scope: the key is removed from every other folder in
    /// the scope first. Returns false when the target folder is stale.
    pub fn move_item(&mut self, scope: &str, key: &str, target: &Assignment) -> bool {
        if self.folder_for_item(scope, key) == *target {
            return true;
        }

        let scope_ids: Vec<FolderId> = self
            .settings
            .get()
            .scope_folders
            .get(scope)
            .cloned()
            .unwrap_or_default();

        if let Assignment::Folder(target_id) = target {
            let known = scope_ids.iter().any(|id| id == target_id)
                && self.settings.get().folders.contains_key(target_id);
            if !known {
                return false;
            }
        }

        let settings = self.settings.get_mut();
        for id in &scope_ids {
            if let Some(folder) = settings.folders.get_mut(id) {
                folder.member_keys.retain(|k| k != key);
            }
        }
        if let Assignment::Folder(target_id) = target {
            if let Some(folder) = settings.folders.get_mut(target_id) {
                folder.member_keys.push(key.to_string());
            }
        }
        self.settings.mark_dirty(Instant::now());
        true
    }

    /// Resolve which group an item belongs to within a scope.
    pub fn folder_for_item(&self, scope: &str, key: &str) -> Assignment {
        for folder in self.list_folders(scope) {
            if folder.contains(key) {
                return Assignment::Folder(folder.id.clone());
            }
        }
        Assignment::Unassigned
    }

    /// Move a folder up (`delta < 0`) or down (`delta > 0`) among its
    /// siblings, normalizing ranks to `0..n`. No-op at either end of the
    /// list or for unknown ids.
    pub fn reorder_folder(&mut self, scope: &str, id: &str, delta: i32) -> bool {
        let ordered: Vec<FolderId> = self
            .list_folders(scope)
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let Some(pos) = ordered.iter().position(|x| x == id) else {
            return false;
        };

        let new_pos = (pos as i64 + delta as i64).clamp(0, ordered.len() as i64 - 1) as usize;
        if new_pos == pos {
            return false;
        }

        let mut ordered = ordered;
        let moved = ordered.remove(pos);
        ordered.insert(new_pos, moved);

        let settings = self.settings.get_mut();
        for (rank, folder_id) in ordered.iter().enumerate() {
            if let Some(folder) = settings.folders.get_mut(folder_id) {
                folder.order = rank as u32;
            }
        }
        self.settings.mark_dirty(Instant::now());
        true
    }

    // Persistence passthrough - pumped by the engine tick.

    pub fn flush_due(&mut self, now: Instant) -> bool {
        self.settings.flush_due(now)
    }

    pub fn flush(&mut self) -> bool {
        self.settings.flush()
    }

    pub fn is_dirty(&self) -> bool {
        self.settings.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path) -> FolderStore {
        FolderStore::new(SettingsStore::load(
            Box::new(JsonFileBackend::new(dir)),
            Duration::from_millis(50),
        ))
    }

    #[test]
    fn create_move_switch_delete_scenario() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let id = store.create_folder("alice", "Lore").unwrap();
        {
            let folders = store.list_folders("alice");
            assert_eq!(folders.len(), 1);
            assert_eq!(folders[0].name, "Lore");
            assert!(folders[0].member_keys.is_empty());
            assert_eq!(folders[0].order, 0);
        }

        assert!(store.move_item("alice", "chat_001.jsonl", &Assignment::Folder(id.clone())));
        assert_eq!(
            store.folder_for_item("alice", "chat_001.jsonl"),
            Assignment::Folder(id.clone())
        );

        // Scope isolation: nothing leaks into bob.
        assert!(store.list_folders("bob").is_empty());
        assert_eq!(
            store.folder_for_item("bob", "chat_001.jsonl"),
            Assignment::Unassigned
        );

        assert!(store.delete_folder("alice", &id));
        assert!(store.list_folders("alice").is_empty());
        assert_eq!(
            store.folder_for_item("alice", "chat_001.jsonl"),
            Assignment::Unassigned
        );
    }

    #[test]
    fn membership_is_exclusive_within_a_scope() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let a = store.create_folder("alice", "A").unwrap();
        let b = store.create_folder("alice", "B").unwrap();

        store.move_item("alice", "chat_001.jsonl", &Assignment::Folder(a.clone()));
        store.move_item("alice", "chat_001.jsonl", &Assignment::Folder(b.clone()));

        assert!(!store.folder(&a).unwrap().contains("chat_001.jsonl"));
        assert!(store.folder(&b).unwrap().contains("chat_001.jsonl"));

        store.move_item("alice", "chat_001.jsonl", &Assignment::Unassigned);
        assert!(!store.folder(&b).unwrap().contains("chat_001.jsonl"));
    }

    #[test]
    fn move_to_stale_folder_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let a = store.create_folder("alice", "A").unwrap();
        store.delete_folder("alice", &a);
        assert!(!store.move_item("alice", "chat_001.jsonl", &Assignment::Folder(a)));
    }

    #[test]
    fn deleted_and_recreated_folders_tie_break_by_insertion() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let a = store.create_folder("alice", "A").unwrap();
        let _b = store.create_folder("alice", "B").unwrap();
        store.delete_folder("alice", &a);
        // B kept order=1; C gets order = count = 1 as well.
        let _c = store.create_folder("alice", "C").unwrap();

        let names: Vec<&str> = store
            .list_folders("alice")
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn reorder_moves_one_rank_and_normalizes() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let a = store.create_folder("alice", "A").unwrap();
        let _b = store.create_folder("alice", "B").unwrap();
        let c = store.create_folder("alice", "C").unwrap();

        assert!(store.reorder_folder("alice", &c, -1));
        let names: Vec<&str> = store
            .list_folders("alice")
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C", "B"]);

        // Ranks are normalized to 0..n after a reorder.
        let orders: Vec<u32> = store.list_folders("alice").iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        // Already at the top: no-op.
        assert!(!store.reorder_folder("alice", &a, -1));
    }

    #[test]
    fn blank_names_are_noops() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        assert!(store.create_folder("alice", "   ").is_none());
        let id = store.create_folder("alice", "Lore").unwrap();
        assert!(!store.rename_folder(&id, ""));
        assert_eq!(store.folder(&id).unwrap().name, "Lore");
    }

    #[test]
    fn dangling_scope_ids_are_skipped() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        let id = store.create_folder("alice", "Lore").unwrap();
        // Simulate a stale blob: the record vanished but the scope list
        // still references it.
        store.settings.get_mut().folders.remove(&id);

        assert!(store.list_folders("alice").is_empty());
        assert_eq!(
            store.folder_for_item("alice", "chat_001.jsonl"),
            Assignment::Unassigned
        );
    }

    #[test]
    fn mutations_mark_settings_dirty() {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path());

        assert!(!store.is_dirty());
        let id = store.create_folder("alice", "Lore").unwrap();
        assert!(store.is_dirty());
        store.flush();
        assert!(!store.is_dirty());

        store.toggle_collapsed(&id);
        assert!(store.is_dirty());
    }
}
