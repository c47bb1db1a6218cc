//! The host seam.
//!
//! The host application owns the DOM this engine augments: chat items,
//! the chat-select popup, its lifecycle. Everything the engine knows about
//! the host goes through the object-safe [`HostDom`] trait — node
//! inspection, node mutation, a drained mutation journal, and the active
//! grouping context. [`sim::SimDom`] implements it in memory for the test
//! suite and the CLI driver; a browser binding would implement the same
//! trait over a real DOM and a MutationObserver.

pub mod sim;

use crate::constants::{attrs, locators};
use crate::models::ItemKey;

/// Handle to a host DOM node. Only meaningful to the `HostDom` that issued
/// it; handles go stale when the host removes the node.
pub type NodeId = u64;

/// What changed in a single observed mutation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from the target.
    ChildList,
    /// The named attribute changed on the target.
    Attribute(String),
    /// The target's text content changed.
    Text,
}

/// One observed host mutation. The journal carries every mutation,
/// including the engine's own writes; the observer is responsible for
/// telling them apart.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub target: NodeId,
    pub kind: MutationKind,
}

/// Signals the host pushes outside the DOM (best effort; DOM observation
/// remains the backstop trigger path when a host build lacks them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The active grouping context (character) changed.
    ScopeChanged,
}

/// Object-safe view of the host application's DOM.
pub trait HostDom {
    fn root(&self) -> NodeId;
    fn exists(&self, node: NodeId) -> bool;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attr(&mut self, node: NodeId, name: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Concatenated text of the node's subtree, line per text node.
    fn text(&self, node: NodeId) -> String;
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Whether the node and all its ancestors are displayed.
    fn is_visible(&self, node: NodeId) -> bool;

    fn create_element(&mut self, tag: &str) -> NodeId;
    /// Append `child` under `parent`, detaching it from any previous
    /// parent first (DOM reparenting semantics).
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn remove_node(&mut self, node: NodeId);
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Nodes with the given `id` attribute, in document order. The host
    /// has shipped duplicate ids across versions, hence a list.
    fn find_by_id(&self, id: &str) -> Vec<NodeId>;
    fn find_with_attr(&self, name: &str) -> Vec<NodeId>;

    /// Forward an activation (click) to a host node.
    fn activate(&mut self, node: NodeId);

    /// Drain the mutation journal accumulated since the last call.
    fn take_mutations(&mut self) -> Vec<Mutation>;

    /// Identity of the active grouping context, as the host reports it.
    fn active_context(&self) -> Option<String>;
}

/// The discovered popup structures for one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Popup {
    /// The popup container element.
    pub container: NodeId,
    /// The item-list container inside it (the popup itself when the host
    /// version has no dedicated list element).
    pub list: NodeId,
}

/// Snapshot of one host list entry, taken at reconciliation time.
#[derive(Debug, Clone)]
pub struct HostItem {
    pub node: NodeId,
    /// Resolved item key; `None` when the whole fallback chain came up
    /// empty (such items are excluded from grouping).
    pub key: Option<ItemKey>,
    /// Display label mirrored into proxies.
    pub label: String,
}

/// Ordered capability probe for the popup container. Candidate locators
/// are tried in sequence; the first that matches wins, and several
/// simultaneous matches resolve to the currently visible one.
pub fn find_popup(host: &dyn HostDom) -> Option<Popup> {
    let container = probe_first(host, locators::POPUP_IDS)?;

    let list = locators::LIST_IDS
        .iter()
        .find_map(|id| {
            host.find_by_id(id)
                .into_iter()
                .find(|n| *n == container || host.contains(container, *n))
        })
        .unwrap_or(container);

    Some(Popup { container, list })
}

fn probe_first(host: &dyn HostDom, candidates: &[&str]) -> Option<NodeId> {
    for id in candidates {
        let matches = host.find_by_id(id);
        if matches.is_empty() {
            continue;
        }
        let visible = matches.iter().copied().find(|n| host.is_visible(*n));
        return visible.or_else(|| matches.first().copied());
    }
    tracing::debug!("no popup locator matched");
    None
}

/// Resolve an item's key via the fallback chain: the primary key
/// attribute, else the title attribute, else the first line of visible
/// text. All empty → `None`.
pub fn resolve_item_key(host: &dyn HostDom, node: NodeId) -> Option<ItemKey> {
    for name in [attrs::ITEM_KEY, attrs::ITEM_TITLE] {
        if let Some(value) = host.attr(node, name) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    let text = host.text(node);
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        None
    } else {
        Some(first_line.to_string())
    }
}

/// Read the live item list from the popup, in document order. Engine-owned
/// nodes (proxies) are never items; host items already reparented into
/// group bodies by a previous pass are still found.
pub fn read_items(host: &dyn HostDom, popup: &Popup) -> Vec<HostItem> {
    let mut items = Vec::new();
    let mut stack = vec![popup.list];
    // Manual DFS keeps document order without recursing through the trait.
    while let Some(node) = stack.pop() {
        let children = host.children(node);
        for child in children.iter().rev() {
            stack.push(*child);
        }
        if node == popup.list {
            continue;
        }
        // Engine-owned nodes are containers or stand-ins, never items;
        // their children (reparented host items) are still visited.
        if host.attr(node, attrs::OWNED).is_some() {
            continue;
        }
        if host.has_class(node, locators::ITEM_CLASS) {
            let key = resolve_item_key(host, node);
            let label = host
                .text(node)
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            let label = if label.is_empty() {
                key.clone().unwrap_or_default()
            } else {
                label
            };
            items.push(HostItem { node, key, label });
        }
    }
    items
}

/// Whether a node was created by this engine, directly or via an owned
/// ancestor.
pub fn is_engine_owned(host: &dyn HostDom, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if host.attr(n, attrs::OWNED).is_some() {
            return true;
        }
        current = host.parent(n);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::SimDom;

    #[test]
    fn probe_prefers_earlier_candidates() {
        let mut dom = SimDom::new();
        let shadow = dom.create_element("div");
        dom.set_attr(shadow, "id", "shadow_select_chat_popup");
        dom.append_child(dom.root(), shadow);

        let primary = dom.create_element("div");
        dom.set_attr(primary, "id", "select_chat_popup");
        dom.append_child(dom.root(), primary);

        let popup = find_popup(&dom).unwrap();
        assert_eq!(popup.container, primary);
    }

    #[test]
    fn probe_resolves_duplicates_to_the_visible_one() {
        let mut dom = SimDom::new();
        let stale = dom.create_element("div");
        dom.set_attr(stale, "id", "select_chat_popup");
        dom.set_attr(stale, "style", "display: none");
        dom.append_child(dom.root(), stale);

        let live = dom.create_element("div");
        dom.set_attr(live, "id", "select_chat_popup");
        dom.append_child(dom.root(), live);

        let popup = find_popup(&dom).unwrap();
        assert_eq!(popup.container, live);
    }

    #[test]
    fn probe_misses_cleanly() {
        let dom = SimDom::new();
        assert!(find_popup(&dom).is_none());
    }

    #[test]
    fn key_chain_falls_back_attribute_title_text() {
        let mut dom = SimDom::new();
        let by_attr = dom.create_element("div");
        dom.set_attr(by_attr, "file_name", "chat_001.jsonl");
        assert_eq!(
            resolve_item_key(&dom, by_attr).as_deref(),
            Some("chat_001.jsonl")
        );

        let by_title = dom.create_element("div");
        dom.set_attr(by_title, "title", "chat_002.jsonl");
        assert_eq!(
            resolve_item_key(&dom, by_title).as_deref(),
            Some("chat_002.jsonl")
        );

        let by_text = dom.create_element("div");
        dom.set_text(by_text, "chat_003.jsonl\nsecond line");
        assert_eq!(
            resolve_item_key(&dom, by_text).as_deref(),
            Some("chat_003.jsonl")
        );

        let empty = dom.create_element("div");
        assert_eq!(resolve_item_key(&dom, empty), None);
    }

    #[test]
    fn read_items_keeps_document_order_and_skips_proxies() {
        let mut dom = SimDom::new();
        let popup = dom.create_element("div");
        dom.set_attr(popup, "id", "select_chat_popup");
        dom.append_child(dom.root(), popup);
        let list = dom.create_element("div");
        dom.set_attr(list, "id", "select_chat_div");
        dom.append_child(popup, list);

        let first = dom.add_chat_item(list, "chat_001.jsonl", "First chat");
        let _second = dom.add_chat_item(list, "chat_002.jsonl", "Second chat");

        // An engine-owned stand-in must never read back as an item.
        let proxy = dom.create_element("div");
        dom.set_attr(proxy, crate::constants::attrs::OWNED, "1");
        dom.set_attr(proxy, "class", crate::constants::locators::ITEM_CLASS);
        dom.append_child(list, proxy);

        let popup = find_popup(&dom).unwrap();
        let items = read_items(&dom, &popup);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].node, first);
        assert_eq!(items[0].key.as_deref(), Some("chat_001.jsonl"));
        assert_eq!(items[0].label, "First chat");
    }
}
