use super::view::{GroupView, GroupedView};
use crate::config::ApplyMode;
use crate::constants::attrs;
use crate::error::EngineError;
use crate::host::{HostDom, NodeId, Popup};
use crate::models::Assignment;

/// How a grouped view lands in the host DOM.
///
/// Every pass runs teardown-then-apply: teardown returns the DOM to the
/// host's flat shape, apply rebuilds the overlay from scratch. Rebuilding
/// from stable inputs is what makes passes idempotent — there is no
/// incremental state to drift, no duplicate groups to accumulate.
pub trait ApplyStrategy {
    fn name(&self) -> &'static str;

    /// Remove every engine-owned structure, restoring the host list.
    fn teardown(&self, host: &mut dyn HostDom, popup: &Popup);

    /// Render the grouped view into the popup. Runs after `teardown`.
    fn apply(
        &self,
        host: &mut dyn HostDom,
        popup: &Popup,
        view: &GroupedView,
    ) -> Result<(), EngineError>;
}

pub fn strategy_for(mode: ApplyMode) -> Box<dyn ApplyStrategy> {
    match mode {
        ApplyMode::Reparent => Box::new(Reparent),
        ApplyMode::ProxyMirror => Box::new(ProxyMirror),
    }
}

/// Group container + header + body chrome shared by both strategies.
/// Returns the body node items (or proxies) go under.
fn render_group(host: &mut dyn HostDom, parent: NodeId, group: &GroupView) -> NodeId {
    let container = host.create_element("div");
    host.set_attr(container, attrs::OWNED, "1");
    let group_id = match &group.assignment {
        Assignment::Folder(id) => id.as_str(),
        Assignment::Unassigned => attrs::UNASSIGNED_GROUP,
    };
    host.set_attr(container, attrs::GROUP, group_id);

    let header = host.create_element("div");
    host.set_attr(header, attrs::OWNED, "1");
    host.set_attr(header, attrs::GROUP_HEADER, &group.items.len().to_string());
    host.set_text(header, &format!("{} ({})", group.title, group.items.len()));
    host.append_child(container, header);

    let body = host.create_element("div");
    host.set_attr(body, attrs::OWNED, "1");
    host.set_attr(body, attrs::GROUP_BODY, "1");
    if group.collapsed {
        host.set_attr(container, attrs::COLLAPSED, "1");
        host.set_attr(body, "style", "display: none");
    }
    host.append_child(container, body);

    host.append_child(parent, container);
    body
}

/// Move the host's own item elements into group containers. Node identity
/// and whatever behavior the host attached to the items survive.
pub struct Reparent;

impl ApplyStrategy for Reparent {
    fn name(&self) -> &'static str {
        "reparent"
    }

    fn teardown(&self, host: &mut dyn HostDom, popup: &Popup) {
        for group in host.find_with_attr(attrs::GROUP) {
            for part in host.children(group) {
                if host.attr(part, attrs::GROUP_BODY).is_none() {
                    continue;
                }
                for item in host.children(part) {
                    // Host items go back to the flat list; only engine
                    // chrome stays behind for removal.
                    if host.attr(item, attrs::OWNED).is_none() && host.exists(popup.list) {
                        host.append_child(popup.list, item);
                    }
                }
            }
            host.remove_node(group);
        }
    }

    fn apply(
        &self,
        host: &mut dyn HostDom,
        popup: &Popup,
        view: &GroupedView,
    ) -> Result<(), EngineError> {
        if !host.exists(popup.list) {
            return Err(EngineError::HostStructureMismatch("item list vanished"));
        }
        for group in &view.groups {
            let body = render_group(host, popup.list, group);
            for item in &group.items {
                if host.exists(item.node) {
                    host.append_child(body, item.node);
                }
            }
        }
        Ok(())
    }
}

/// Render stand-in nodes mirroring the items and hide the originals. The
/// host's own nodes stay where they are; activation is forwarded to the
/// hidden source by the engine.
pub struct ProxyMirror;

impl ApplyStrategy for ProxyMirror {
    fn name(&self) -> &'static str {
        "proxy-mirror"
    }

    fn teardown(&self, host: &mut dyn HostDom, _popup: &Popup) {
        for layer in host.find_with_attr(attrs::PROXY_LAYER) {
            host.remove_node(layer);
        }
        for hidden in host.find_with_attr(attrs::HIDDEN_SOURCE) {
            host.remove_attr(hidden, attrs::HIDDEN_SOURCE);
            host.remove_attr(hidden, "style");
        }
    }

    fn apply(
        &self,
        host: &mut dyn HostDom,
        popup: &Popup,
        view: &GroupedView,
    ) -> Result<(), EngineError> {
        if !host.exists(popup.list) {
            return Err(EngineError::HostStructureMismatch("item list vanished"));
        }
        if view.is_empty() {
            return Ok(());
        }

        let layer = host.create_element("div");
        host.set_attr(layer, attrs::OWNED, "1");
        host.set_attr(layer, attrs::PROXY_LAYER, "1");
        host.append_child(popup.list, layer);

        for group in &view.groups {
            let body = render_group(host, layer, group);
            for item in &group.items {
                let proxy = host.create_element("div");
                host.set_attr(proxy, attrs::OWNED, "1");
                if let Some(key) = &item.key {
                    host.set_attr(proxy, attrs::PROXY_FOR, key);
                }
                host.set_text(proxy, &item.label);
                host.append_child(body, proxy);

                if host.exists(item.node) {
                    host.set_attr(item.node, attrs::HIDDEN_SOURCE, "1");
                    host.set_attr(item.node, "style", "display: none");
                }
            }
        }
        Ok(())
    }
}
