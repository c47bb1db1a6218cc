//! In-memory host DOM used by the test suite and the CLI driver.
//!
//! `SimDom` behaves like the slice of a browser DOM the engine cares
//! about: a node tree with attributes, classes, text, visibility derived
//! from inline style, and a mutation journal that records every write —
//! the engine's own included, exactly as a MutationObserver would.

use std::collections::HashMap;

use super::{HostDom, Mutation, MutationKind, NodeId};
use crate::constants::locators;

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

pub struct SimDom {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: NodeId,
    journal: Vec<Mutation>,
    clicks: Vec<NodeId>,
    active_context: Option<String>,
}

impl SimDom {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            1,
            Node {
                tag: "body".to_string(),
                ..Node::default()
            },
        );
        Self {
            nodes,
            root: 1,
            next_id: 2,
            journal: Vec::new(),
            clicks: Vec::new(),
            active_context: None,
        }
    }

    /// Set which character the host currently has selected. This is host
    /// application state, not a DOM write, so it does not journal.
    pub fn set_active_context(&mut self, context: Option<&str>) {
        self.active_context = context.map(|s| s.to_string());
    }

    /// Activations forwarded to host nodes so far (oldest first).
    pub fn clicks(&self) -> &[NodeId] {
        &self.clicks
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.tag.as_str())
    }

    /// Build a popup + list container pair the way current host versions
    /// render it. Returns the list container.
    pub fn add_chat_popup(&mut self) -> NodeId {
        let popup = self.create_element("div");
        self.set_attr(popup, "id", "select_chat_popup");
        self.append_child(self.root, popup);

        let list = self.create_element("div");
        self.set_attr(list, "id", "select_chat_div");
        self.append_child(popup, list);
        list
    }

    /// Append a host chat entry to a list container.
    pub fn add_chat_item(&mut self, list: NodeId, file_name: &str, label: &str) -> NodeId {
        let item = self.create_element("div");
        self.set_attr(item, "class", locators::ITEM_CLASS);
        self.set_attr(item, "file_name", file_name);
        self.set_text(item, label);
        self.append_child(list, item);
        item
    }

    fn journal(&mut self, target: NodeId, kind: MutationKind) {
        self.journal.push(Mutation { target, kind });
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|c| *c != child);
            }
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = None;
            }
            self.journal(parent, MutationKind::ChildList);
        }
    }

    fn remove_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            for child in removed.children {
                self.remove_subtree(child);
            }
        }
    }
}

impl Default for SimDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDom for SimDom {
    fn root(&self) -> NodeId {
        self.root
    }

    fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(&node).and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attrs.insert(name.to_string(), value.to_string());
            self.journal(node, MutationKind::Attribute(name.to_string()));
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            if n.attrs.remove(name).is_some() {
                self.journal(node, MutationKind::Attribute(name.to_string()));
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().any(|part| part == class))
            .unwrap_or(false)
    }

    fn text(&self, node: NodeId) -> String {
        let Some(n) = self.nodes.get(&node) else {
            return String::new();
        };
        let mut parts = Vec::new();
        if !n.text.is_empty() {
            parts.push(n.text.clone());
        }
        for child in &n.children {
            let child_text = self.text(*child);
            if !child_text.is_empty() {
                parts.push(child_text);
            }
        }
        parts.join("\n")
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.text = text.to_string();
            self.journal(node, MutationKind::Text);
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.nodes.get(&id) else {
                return false;
            };
            if let Some(style) = n.attrs.get("style") {
                let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
                if compact.contains("display:none") {
                    return false;
                }
            }
            current = n.parent;
        }
        true
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_string(),
                ..Node::default()
            },
        );
        id
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            return;
        }
        self.detach(child);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
        self.journal(parent, MutationKind::ChildList);
    }

    fn remove_node(&mut self, node: NodeId) {
        if node == self.root || !self.nodes.contains_key(&node) {
            return;
        }
        self.detach(node);
        self.remove_subtree(node);
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn find_by_id(&self, id: &str) -> Vec<NodeId> {
        self.find_matching(|_, node| node.attrs.get("id").map(|v| v == id).unwrap_or(false))
    }

    fn find_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.find_matching(|_, node| node.attrs.contains_key(name))
    }

    fn activate(&mut self, node: NodeId) {
        if self.nodes.contains_key(&node) {
            self.clicks.push(node);
        }
    }

    fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    fn active_context(&self) -> Option<String> {
        self.active_context.clone()
    }
}

impl SimDom {
    /// Depth-first walk from the root, document order.
    fn find_matching<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&SimDom, &Node) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
            if predicate(self, node) {
                found.push(id);
            }
        }
        found
    }
}
