use std::time::Instant;

use super::apply::{strategy_for, ApplyStrategy};
use super::observer::DomObserver;
use super::scheduler::ChangeScheduler;
use super::view;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::host::{self, HostDom, HostSignal};
use crate::menu::{self, MenuEntry};
use crate::models::{Assignment, FolderId, ScopeKey};
use crate::scope;
use crate::store::FolderStore;

/// Counters for the periodic diagnostics line and the CLI summary.
#[derive(Debug, Default, Clone)]
pub struct EngineDiagnostics {
    /// request_reconcile calls (observer, heartbeat, signals, gestures)
    pub triggers: u64,
    /// completed reconciliation passes
    pub passes: u64,
    /// passes aborted on a host structure mismatch
    pub aborted_passes: u64,
    /// heartbeat-detected drifts between view and host
    pub heartbeat_resyncs: u64,
    /// debounced settings writes that went through
    pub settings_flushes: u64,
}

/// The reconciliation engine: owns the host handle, the folder store, the
/// scheduler, the observer and the apply strategy, and wires the loop
/// DOM Observer → Change Scheduler → View Builder → DOM mutation.
///
/// Everything runs on the caller's thread; `tick(now)` is the only pump.
/// No entry point panics on host weirdness — a pass that cannot proceed
/// aborts cleanly and the next trigger retries from scratch.
pub struct SyncEngine<H: HostDom> {
    host: H,
    store: FolderStore,
    scheduler: ChangeScheduler,
    observer: DomObserver,
    strategy: Box<dyn ApplyStrategy>,
    diag: EngineDiagnostics,
    /// Grouped item count of the last successful pass; `None` until a
    /// pass succeeds (or after one aborts). Drives the drift check.
    last_rendered: Option<usize>,
}

impl<H: HostDom> SyncEngine<H> {
    pub fn new(host: H, store: FolderStore, config: &EngineConfig, now: Instant) -> Self {
        Self {
            host,
            store,
            scheduler: ChangeScheduler::new(config.debounce, config.heartbeat, now),
            observer: DomObserver::new(),
            strategy: strategy_for(config.apply_mode),
            diag: EngineDiagnostics::default(),
            last_rendered: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, for drivers that play the host's role (the
    /// simulator, tests).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &FolderStore {
        &self.store
    }

    pub fn diagnostics(&self) -> &EngineDiagnostics {
        &self.diag
    }

    pub fn current_scope(&self) -> Option<ScopeKey> {
        scope::current_scope(&self.host)
    }

    /// Host-pushed signal intake. Best effort: hosts without the channel
    /// simply never call this and DOM observation carries the load.
    pub fn notify(&mut self, signal: HostSignal, now: Instant) {
        match signal {
            HostSignal::ScopeChanged => {
                tracing::debug!("scope change signaled by host");
                self.request_reconcile(now);
            }
        }
    }

    pub fn request_reconcile(&mut self, now: Instant) {
        self.diag.triggers += 1;
        self.scheduler.request(now);
    }

    /// One cooperative turn: observer intake, heartbeat, settings flush,
    /// and the debounced pass when its deadline has come.
    pub fn tick(&mut self, now: Instant) {
        if self.observer.scan(&mut self.host) {
            self.request_reconcile(now);
        }
        if self.scheduler.heartbeat_due(now) {
            self.heartbeat_check(now);
        }
        if self.store.flush_due(now) {
            self.diag.settings_flushes += 1;
        }
        if self.scheduler.take_due(now) {
            self.run_pass();
        }
    }

    /// Flush pending settings on the way out.
    pub fn shutdown(&mut self) {
        if self.store.is_dirty() {
            self.store.flush();
        }
    }

    // ===== Reconciliation =====

    fn run_pass(&mut self) {
        self.scheduler.begin_pass();
        let outcome = self.reconcile();
        // The pass's own DOM writes are in the journal now; drop them so
        // they cannot feed back into the scheduler.
        let _ = self.host.take_mutations();
        self.scheduler.end_pass();

        match outcome {
            Ok(rendered) => {
                self.last_rendered = Some(rendered);
                self.diag.passes += 1;
            }
            Err(e) => {
                self.last_rendered = None;
                self.diag.aborted_passes += 1;
                tracing::debug!("reconciliation pass aborted: {e}");
            }
        }
    }

    fn reconcile(&mut self) -> Result<usize, EngineError> {
        let Some(scope) = scope::current_scope(&self.host) else {
            // No scope, nothing to show; clear any stale overlay.
            if let Some(popup) = host::find_popup(&self.host) {
                self.strategy.teardown(&mut self.host, &popup);
            }
            return Ok(0);
        };

        let popup = host::find_popup(&self.host)
            .ok_or(EngineError::HostStructureMismatch("popup not found"))?;

        self.strategy.teardown(&mut self.host, &popup);
        let items = host::read_items(&self.host, &popup);
        let grouped = view::build_view(&self.store, &scope, &items);
        self.strategy.apply(&mut self.host, &popup, &grouped)?;

        tracing::trace!(
            scope = %scope,
            groups = grouped.groups.len(),
            items = grouped.total_items(),
            strategy = self.strategy.name(),
            "reconciled"
        );
        Ok(grouped.total_items())
    }

    fn heartbeat_check(&mut self, now: Instant) {
        let Some(expected) = self.last_rendered else {
            return;
        };
        let Some(live) = self.live_item_count() else {
            return;
        };
        if live != expected {
            tracing::debug!(live, expected, "rendered view drifted from host, resyncing");
            self.diag.heartbeat_resyncs += 1;
            self.request_reconcile(now);
        }
    }

    /// Keyed item count as the host shows it right now; `None` when there
    /// is no scope or no popup to compare against.
    fn live_item_count(&self) -> Option<usize> {
        scope::current_scope(&self.host)?;
        let popup = host::find_popup(&self.host)?;
        let count = host::read_items(&self.host, &popup)
            .iter()
            .filter(|i| i.key.is_some())
            .count();
        Some(count)
    }

    // ===== Gesture handlers =====
    //
    // Synchronous user-gesture paths: mutate the store, then ask for a
    // pass. `NoActiveScope` and `NotFound` are the caller-visible no-ops
    // of the error taxonomy; nothing here blocks on I/O.

    /// Create a folder in the current scope. `Ok(None)` on a blank name
    /// (same silent no-op rule as rename).
    pub fn create_folder(&mut self, name: &str) -> Result<Option<FolderId>, EngineError> {
        let scope = self.require_scope()?;
        let id = self.store.create_folder(&scope, name);
        if id.is_some() {
            self.request_reconcile(Instant::now());
        }
        Ok(id)
    }

    /// The context menu's "New folder…": create and assign in one gesture.
    pub fn create_folder_for_item(
        &mut self,
        name: &str,
        item_key: &str,
    ) -> Result<Option<FolderId>, EngineError> {
        let scope = self.require_scope()?;
        let Some(id) = self.store.create_folder(&scope, name) else {
            return Ok(None);
        };
        self.store
            .move_item(&scope, item_key, &Assignment::Folder(id.clone()));
        self.request_reconcile(Instant::now());
        Ok(Some(id))
    }

    pub fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), EngineError> {
        self.require_scope()?;
        if name.trim().is_empty() {
            return Ok(());
        }
        if !self.store.rename_folder(id, name) {
            return Err(EngineError::NotFound);
        }
        self.request_reconcile(Instant::now());
        Ok(())
    }

    /// Delete a folder; its items become unassigned, nothing is lost.
    pub fn delete_folder(&mut self, id: &str) -> Result<(), EngineError> {
        let scope = self.require_scope()?;
        if !self.store.delete_folder(&scope, id) {
            return Err(EngineError::NotFound);
        }
        self.request_reconcile(Instant::now());
        Ok(())
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> Result<(), EngineError> {
        self.require_scope()?;
        if !self.store.toggle_collapsed(id) {
            return Err(EngineError::NotFound);
        }
        self.request_reconcile(Instant::now());
        Ok(())
    }

    /// Move a folder one rank up or down. Hitting either end of the list
    /// is a quiet no-op, not an error.
    pub fn reorder_folder(&mut self, id: &str, delta: i32) -> Result<(), EngineError> {
        let scope = self.require_scope()?;
        if self.store.folder(id).is_none() {
            return Err(EngineError::NotFound);
        }
        if self.store.reorder_folder(&scope, id, delta) {
            self.request_reconcile(Instant::now());
        }
        Ok(())
    }

    pub fn move_item(&mut self, item_key: &str, target: &Assignment) -> Result<(), EngineError> {
        let scope = self.require_scope()?;
        if !self.store.move_item(&scope, item_key, target) {
            return Err(EngineError::NotFound);
        }
        self.request_reconcile(Instant::now());
        Ok(())
    }

    /// The move-to-folder context menu for an item; empty without a scope.
    pub fn menu_for_item(&self, item_key: &str) -> Vec<MenuEntry> {
        match scope::current_scope(&self.host) {
            Some(scope) => menu::move_menu(&self.store, &scope, item_key),
            None => Vec::new(),
        }
    }

    /// Forward an activation to the original host node for an item key.
    /// This is how proxy stand-ins open the real chat.
    pub fn activate_item(&mut self, item_key: &str) -> bool {
        let Some(popup) = host::find_popup(&self.host) else {
            return false;
        };
        let target = host::read_items(&self.host, &popup)
            .into_iter()
            .find(|i| i.key.as_deref() == Some(item_key));
        match target {
            Some(item) => {
                self.host.activate(item.node);
                true
            }
            None => false,
        }
    }

    fn require_scope(&self) -> Result<ScopeKey, EngineError> {
        scope::current_scope(&self.host).ok_or(EngineError::NoActiveScope)
    }
}
