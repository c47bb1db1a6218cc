/// Errors raised by engine entry points.
///
/// None of these are fatal: gesture handlers surface them to the caller,
/// reconciliation catches them, logs, and waits for the next trigger.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// No grouping context is selected; mutators no-op.
    #[error("no active scope")]
    NoActiveScope,

    /// An operation referenced a folder id that no longer exists.
    #[error("folder not found")]
    NotFound,

    /// Expected host containers are absent or malformed. The pass aborts
    /// cleanly; the next mutation/heartbeat/user trigger retries.
    #[error("host structure mismatch: {0}")]
    HostStructureMismatch(&'static str),
}
