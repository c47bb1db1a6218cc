use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::Settings;

/// Opaque blob store the settings write through to.
///
/// In the extension this seam is the host's own settings/save API; here a
/// JSON file implementation backs the CLI and the test suite.
pub trait SettingsBackend {
    /// Read the raw blob, or `None` when nothing has been stored yet.
    fn load(&self) -> Option<String>;

    /// Persist the raw blob.
    fn store(&mut self, blob: &str) -> std::io::Result<()>;
}

/// File-backed settings blob (`chatshelf_settings.json` in the data dir).
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(crate::constants::SETTINGS_FILE),
        }
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn store(&mut self, blob: &str) -> std::io::Result<()> {
        fs::write(&self.path, blob)
    }
}

/// Settings blob plus its debounced write-through lifecycle.
///
/// Mutations mark the blob dirty; `flush_due` (called from the engine
/// tick) writes it out once the flush delay has passed with no further
/// mutation. Writes are fire-and-forget: a failed write is logged and the
/// blob stays dirty, so the next flush retries.
pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    settings: Settings,
    flush_delay: Duration,
    dirty_at: Option<Instant>,
}

impl SettingsStore {
    /// Load from the backend, lazily materializing defaults. A missing
    /// blob is not an error; an unparseable one falls back to defaults
    /// (the bad blob is only overwritten on the next successful flush).
    pub fn load(backend: Box<dyn SettingsBackend>, flush_delay: Duration) -> Self {
        let settings = match backend.load() {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("settings blob unparseable, starting from defaults: {e}");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };

        Self {
            backend,
            settings,
            flush_delay,
            dirty_at: None,
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access for the store layer. The caller must `mark_dirty`
    /// after changing anything.
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Re-arm the debounced write: the blob is flushed `flush_delay` after
    /// the last mutation.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_at = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_at.is_some()
    }

    /// Write the blob through if it is dirty and the flush delay has
    /// passed. Returns whether a write happened.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match self.dirty_at {
            Some(at) if now.duration_since(at) >= self.flush_delay => self.flush(),
            _ => false,
        }
    }

    /// Write the blob through immediately (used on shutdown).
    pub fn flush(&mut self) -> bool {
        let json = match serde_json::to_string_pretty(&self.settings) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize settings: {e}");
                return false;
            }
        };

        match self.backend.store(&json) {
            Ok(()) => {
                self.dirty_at = None;
                true
            }
            Err(e) => {
                tracing::warn!("failed to persist settings: {e}");
                false
            }
        }
    }
}
