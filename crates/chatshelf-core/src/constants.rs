//! Application-wide constants
//!
//! Centralized location for magic strings and timing values that are used
//! across multiple modules.

/// Current settings blob schema version. Bumps are additive only: loading
/// an older blob fills missing fields from defaults and never rewrites
/// existing data.
pub const SCHEMA_VERSION: u32 = 2;

/// Debounce delay between a change signal and the reconciliation pass it
/// coalesces into.
pub const DEBOUNCE_MS: u64 = 60;

/// Liveness heartbeat interval. The heartbeat only re-requests a pass when
/// the rendered view and the observed host item count have drifted.
pub const HEARTBEAT_SECS: u64 = 5;

/// Delay before a dirty settings blob is written through to the backend.
pub const SETTINGS_FLUSH_MS: u64 = 400;

/// File name of the JSON settings blob used by the file backend.
pub const SETTINGS_FILE: &str = "chatshelf_settings.json";

/// Display label of the implicit group holding items not assigned to any
/// folder in the current scope.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Label of the context-menu entry that creates a folder and assigns the
/// item to it in one gesture.
pub const NEW_FOLDER_LABEL: &str = "New folder…";

/// Candidate locators for host structures. The host has renamed these
/// across its own versions, so discovery is an ordered probe: first match
/// wins, several matches resolve to the currently visible one.
pub mod locators {
    /// Element ids the chat-select popup has been known under.
    pub const POPUP_IDS: &[&str] = &[
        "select_chat_popup",
        "shadow_select_chat_popup",
        "chat_select_popup",
    ];

    /// Element ids of the item-list container inside the popup. When none
    /// match, the popup element itself is treated as the list container.
    pub const LIST_IDS: &[&str] = &["select_chat_div", "select_chat_popup_body"];

    /// Class carried by host chat entries inside the list container.
    pub const ITEM_CLASS: &str = "select_chat_block";
}

/// Attribute names: the host's item contract plus the markers this engine
/// stamps on nodes it owns.
pub mod attrs {
    /// Primary source of an item key (the chat file name).
    pub const ITEM_KEY: &str = "file_name";

    /// Fallback source of an item key when `file_name` is absent.
    pub const ITEM_TITLE: &str = "title";

    /// Marks any node created by this engine. Observer records targeting
    /// marked nodes are never treated as host changes.
    pub const OWNED: &str = "data-chatshelf";

    /// Group container marker; the value is the folder id or
    /// [`UNASSIGNED`](self::UNASSIGNED_GROUP).
    pub const GROUP: &str = "data-chatshelf-group";

    /// Group header marker (value: rendered item count).
    pub const GROUP_HEADER: &str = "data-chatshelf-header";

    /// Group body marker; items (or proxies) live under this node.
    pub const GROUP_BODY: &str = "data-chatshelf-body";

    /// Present on a group container whose body is collapsed.
    pub const COLLAPSED: &str = "data-chatshelf-collapsed";

    /// Marker of the proxy layer container (proxy-mirroring strategy).
    pub const PROXY_LAYER: &str = "data-chatshelf-proxy-layer";

    /// On a proxy node, the item key of the original it stands in for.
    pub const PROXY_FOR: &str = "data-chatshelf-proxy-for";

    /// Stamped on an original host item hidden behind a proxy, so teardown
    /// can find and restore it.
    pub const HIDDEN_SOURCE: &str = "data-chatshelf-hidden";

    /// `GROUP` attribute value of the implicit unassigned group.
    pub const UNASSIGNED_GROUP: &str = "unassigned";

    /// Attribute names whose change on a popup ancestor can affect
    /// visibility and therefore triggers reconciliation.
    pub const VISIBILITY: &[&str] = &["style", "class", "id"];
}
