use std::time::{Duration, Instant};

/// Coalesces bursts of change signals into single reconciliation passes.
///
/// Single-slot debounce: every request re-arms one pending deadline; when
/// it passes, exactly one pass runs. The in-flight flag is the re-entrancy
/// guard — a pass can never start while another is running, and a request
/// arriving mid-pass lands in the pending slot for a later tick. Only
/// pending deadlines are ever cancelled; a started pass always finishes.
///
/// Time is an argument, not an ambient read, so the whole schedule is
/// deterministic under test.
pub struct ChangeScheduler {
    debounce: Duration,
    heartbeat: Duration,
    deadline: Option<Instant>,
    in_flight: bool,
    last_heartbeat: Instant,
}

impl ChangeScheduler {
    pub fn new(debounce: Duration, heartbeat: Duration, now: Instant) -> Self {
        Self {
            debounce,
            heartbeat,
            deadline: None,
            in_flight: false,
            last_heartbeat: now,
        }
    }

    /// Arm (or re-arm) the pending pass.
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Claim the pending pass if its deadline has passed. Clears the slot;
    /// the caller must bracket the pass with `begin_pass`/`end_pass`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn begin_pass(&mut self) {
        self.in_flight = true;
    }

    pub fn end_pass(&mut self) {
        self.in_flight = false;
    }

    /// Whether the low-frequency liveness check is due; advances the
    /// heartbeat clock when it is.
    pub fn heartbeat_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_heartbeat) >= self.heartbeat {
            self.last_heartbeat = now;
            true
        } else {
            false
        }
    }
}
