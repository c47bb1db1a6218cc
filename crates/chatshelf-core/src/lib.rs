//! chatshelf-core: the folder-overlay reconciliation engine.
//!
//! Synchronizes a small persisted folder model with an externally-owned,
//! frequently-mutated chat list: observe host mutations, coalesce them,
//! rebuild a grouped view over the host's items, apply it back — without
//! feedback loops, duplicate bindings, or crashes when the host changes
//! shape underneath us.

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod menu;
pub mod models;
pub mod scope;
pub mod store;
pub mod sync;
pub mod tracing_setup;

pub use config::{ApplyMode, EngineConfig};
pub use error::EngineError;
pub use host::HostSignal;
pub use models::{Assignment, Folder, FolderId};
pub use store::{FolderStore, JsonFileBackend, SettingsBackend, SettingsStore};
pub use sync::{EngineDiagnostics, SyncEngine};
