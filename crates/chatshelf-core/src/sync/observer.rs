use crate::constants::attrs;
use crate::host::{self, HostDom, MutationKind, NodeId};

/// Filters the host's mutation journal down to "something the overlay
/// cares about changed".
///
/// Relevant: the popup appearing (or being replaced wholesale by the
/// host), child-list/text changes inside the popup subtree, and
/// visibility-affecting attribute changes on the popup or its ancestors.
/// Mutations targeting engine-owned nodes are never relevant — that, plus
/// the engine discarding the journal right after a pass, is what keeps the
/// overlay's own writes from feeding back into the scheduler.
pub struct DomObserver {
    tracked_popup: Option<NodeId>,
}

impl DomObserver {
    pub fn new() -> Self {
        Self {
            tracked_popup: None,
        }
    }

    /// Drain the journal and report whether a reconciliation-worthy change
    /// happened. Re-discovers the popup every scan, so a popup element the
    /// host replaced is picked up without re-subscription ceremony.
    pub fn scan(&mut self, host: &mut dyn HostDom) -> bool {
        let mutations = host.take_mutations();

        let popup = host::find_popup(host).map(|p| p.container);
        let reattached = popup.is_some() && popup != self.tracked_popup;
        self.tracked_popup = popup;

        if reattached {
            tracing::debug!("popup discovered or replaced, reconciling");
            return true;
        }
        let Some(popup) = popup else {
            // No popup yet: nothing to overlay, whatever just mutated.
            return false;
        };

        for mutation in &mutations {
            // Targets removed since the record was written can no longer
            // be classified; the heartbeat covers anything missed here.
            if !host.exists(mutation.target) {
                continue;
            }
            if host::is_engine_owned(host, mutation.target) {
                continue;
            }

            let relevant = match &mutation.kind {
                MutationKind::ChildList | MutationKind::Text => {
                    mutation.target == popup || host.contains(popup, mutation.target)
                }
                MutationKind::Attribute(name) => {
                    attrs::VISIBILITY.contains(&name.as_str())
                        && (mutation.target == popup || host.contains(mutation.target, popup))
                }
            };
            if relevant {
                return true;
            }
        }
        false
    }
}

impl Default for DomObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::SimDom;

    #[test]
    fn popup_appearing_is_relevant() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        assert!(!observer.scan(&mut dom));

        dom.add_chat_popup();
        assert!(observer.scan(&mut dom));
        // Nothing new afterwards.
        assert!(!observer.scan(&mut dom));
    }

    #[test]
    fn item_list_changes_are_relevant() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        let list = dom.add_chat_popup();
        observer.scan(&mut dom);

        dom.add_chat_item(list, "chat_001.jsonl", "First");
        assert!(observer.scan(&mut dom));
    }

    #[test]
    fn visibility_flips_on_ancestors_are_relevant() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        let list = dom.add_chat_popup();
        let popup = dom.parent(list).unwrap();
        observer.scan(&mut dom);

        dom.set_attr(popup, "style", "display: none");
        assert!(observer.scan(&mut dom));
        dom.set_attr(popup, "style", "");
        assert!(observer.scan(&mut dom));
    }

    #[test]
    fn unrelated_mutations_are_ignored() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        dom.add_chat_popup();
        observer.scan(&mut dom);

        let elsewhere = dom.create_element("div");
        dom.append_child(dom.root(), elsewhere);
        dom.set_attr(elsewhere, "class", "toast");
        assert!(!observer.scan(&mut dom));
    }

    #[test]
    fn writes_inside_engine_owned_subtrees_are_ignored() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        let list = dom.add_chat_popup();
        observer.scan(&mut dom);

        // An overlay container left by a pass. The append itself journals
        // on the host-owned list, which the engine discards right after
        // the pass; simulate that discard here.
        let group = dom.create_element("div");
        dom.set_attr(group, attrs::OWNED, "1");
        dom.append_child(list, group);
        let header = dom.create_element("div");
        dom.append_child(group, header);
        let _ = dom.take_mutations();

        // Later writes within the owned subtree never re-trigger.
        dom.set_text(header, "Lore (2)");
        dom.set_attr(group, attrs::COLLAPSED, "1");
        assert!(!observer.scan(&mut dom));
    }

    #[test]
    fn replaced_popup_is_reattached() {
        let mut dom = SimDom::new();
        let mut observer = DomObserver::new();
        let list = dom.add_chat_popup();
        let popup = dom.parent(list).unwrap();
        observer.scan(&mut dom);

        dom.remove_node(popup);
        observer.scan(&mut dom);
        dom.add_chat_popup();
        assert!(observer.scan(&mut dom));
    }
}
