use std::time::Duration;

use crate::constants;

/// How reconciliation results are applied to the host DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Move the host's own item elements into group containers, keeping
    /// node identity and any host-attached behavior.
    Reparent,
    /// Render stand-in nodes mirroring item labels and hide the originals;
    /// activation is forwarded to the hidden source node.
    ProxyMirror,
}

/// Engine tuning. One instance per engine; the apply mode never changes
/// mid-session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub debounce: Duration,
    pub heartbeat: Duration,
    pub settings_flush: Duration,
    pub apply_mode: ApplyMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(constants::DEBOUNCE_MS),
            heartbeat: Duration::from_secs(constants::HEARTBEAT_SECS),
            settings_flush: Duration::from_millis(constants::SETTINGS_FLUSH_MS),
            apply_mode: ApplyMode::Reparent,
        }
    }
}
