use std::collections::HashMap;

use crate::constants::UNASSIGNED_LABEL;
use crate::host::HostItem;
use crate::models::Assignment;
use crate::store::FolderStore;

/// One rendered group: a folder, or the implicit unassigned tail group.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub assignment: Assignment,
    pub title: String,
    pub collapsed: bool,
    /// Items resolving to this group, in host-given order.
    pub items: Vec<HostItem>,
}

/// The grouped view one reconciliation pass renders: folder groups in
/// display order, then the unassigned group when it has anything to show.
#[derive(Debug, Clone, Default)]
pub struct GroupedView {
    pub groups: Vec<GroupView>,
}

impl GroupedView {
    pub fn total_items(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Derive the grouped view from the store and the live host item list.
///
/// Pure with respect to the DOM: reads only the snapshots taken earlier in
/// the pass. Items without a resolvable key are excluded from grouping.
/// Folder groups appear even when empty; the unassigned group is hidden
/// when it is empty and other groups exist. With no keyed items at all the
/// view is empty and the overlay renders nothing.
pub fn build_view(store: &FolderStore, scope: &str, items: &[HostItem]) -> GroupedView {
    let keyed: Vec<&HostItem> = items.iter().filter(|i| i.key.is_some()).collect();
    if keyed.is_empty() {
        return GroupedView::default();
    }

    let folders = store.list_folders(scope);

    // Exclusive membership makes key -> group a plain map.
    let mut slot_of_key: HashMap<&str, usize> = HashMap::new();
    for (slot, folder) in folders.iter().enumerate() {
        for key in &folder.member_keys {
            slot_of_key.entry(key.as_str()).or_insert(slot);
        }
    }

    let mut groups: Vec<GroupView> = folders
        .iter()
        .map(|f| GroupView {
            assignment: Assignment::Folder(f.id.clone()),
            title: f.name.clone(),
            collapsed: f.collapsed,
            items: Vec::new(),
        })
        .collect();
    let mut unassigned = GroupView {
        assignment: Assignment::Unassigned,
        title: UNASSIGNED_LABEL.to_string(),
        collapsed: false,
        items: Vec::new(),
    };

    for item in keyed {
        let key = item.key.as_deref().unwrap_or_default();
        match slot_of_key.get(key) {
            Some(slot) => groups[*slot].items.push(item.clone()),
            None => unassigned.items.push(item.clone()),
        }
    }

    if !unassigned.items.is_empty() || groups.is_empty() {
        groups.push(unassigned);
    }

    GroupedView { groups }
}
