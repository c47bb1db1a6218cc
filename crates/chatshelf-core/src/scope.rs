use crate::host::HostDom;
use crate::models::ScopeKey;

/// Resolve the active grouping scope (the selected character) from host
/// state. Pure read, no caching. Blank identities normalize to `None`,
/// and `None` means "no-op, nothing to show" throughout the engine.
pub fn current_scope(host: &dyn HostDom) -> Option<ScopeKey> {
    let raw = host.active_context()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::SimDom;

    #[test]
    fn blank_contexts_resolve_to_none() {
        let mut dom = SimDom::new();
        assert_eq!(current_scope(&dom), None);

        dom.set_active_context(Some("   "));
        assert_eq!(current_scope(&dom), None);

        dom.set_active_context(Some(" alice "));
        assert_eq!(current_scope(&dom).as_deref(), Some("alice"));
    }
}
