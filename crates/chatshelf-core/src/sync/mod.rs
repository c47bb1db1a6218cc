//! The synchronization pipeline: observer → scheduler → view builder →
//! apply strategy, owned and pumped by [`engine::SyncEngine`].

pub mod apply;
pub mod engine;
pub mod observer;
pub mod scheduler;
pub mod view;

pub use apply::{ApplyStrategy, ProxyMirror, Reparent};
pub use engine::{EngineDiagnostics, SyncEngine};
pub use observer::DomObserver;
pub use scheduler::ChangeScheduler;
pub use view::{build_view, GroupView, GroupedView};
