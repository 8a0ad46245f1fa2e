//! Recording session state machine

use std::time::{Duration as StdDuration, Instant};

use thiserror::Error;

use super::{Duration, RecordingStatus, StatusEvent};

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: RecordingStatus,
    pub action: String,
}

/// Recording session entity.
/// Tracks status transitions and elapsed recording time.
///
/// State machine:
///   IDLE -> STARTED (start)
///   STARTED -> PAUSED (pause)
///   PAUSED -> STARTED (resume)
///   STARTED | PAUSED -> MAX_REACHED (limit_reached)
///   STARTED | PAUSED -> FAILED (fail)
///   any -> IDLE (finish)
///
/// Elapsed time is `accumulated + (now - resumed_at)` while started, so
/// queries are correct mid-segment and pauses never count.
#[derive(Debug, Default)]
pub struct RecordingSession {
    status: RecordingStatus,
    extra: i32,
    accumulated: StdDuration,
    resumed_at: Option<Instant>,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current status
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    /// Get the current status with its extra code
    pub fn event(&self) -> StatusEvent {
        StatusEvent::new(self.status, self.extra)
    }

    pub fn is_idle(&self) -> bool {
        self.status == RecordingStatus::Idle
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Total recorded time as of `now`
    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .resumed_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();
        Duration::from_std(self.accumulated + running)
    }

    /// Transition from IDLE to STARTED, resetting accumulated time
    pub fn start(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingStatus::Idle, "start recording")?;
        self.accumulated = StdDuration::ZERO;
        self.resumed_at = Some(now);
        self.set(RecordingStatus::Started, 0);
        Ok(())
    }

    /// Transition from STARTED to PAUSED
    pub fn pause(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingStatus::Started, "pause recording")?;
        self.freeze(now);
        self.set(RecordingStatus::Paused, 0);
        Ok(())
    }

    /// Transition from PAUSED to STARTED
    pub fn resume(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingStatus::Paused, "resume recording")?;
        self.resumed_at = Some(now);
        self.set(RecordingStatus::Started, 0);
        Ok(())
    }

    /// Transition from an active state to MAX_REACHED
    pub fn limit_reached(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.expect_active("reach limit")?;
        self.freeze(now);
        self.set(RecordingStatus::MaxReached, 0);
        Ok(())
    }

    /// Transition from an active state to FAILED with an error code
    pub fn fail(&mut self, now: Instant, code: i32) -> Result<(), InvalidStateTransition> {
        self.expect_active("fail recording")?;
        self.freeze(now);
        self.set(RecordingStatus::Failed, code);
        Ok(())
    }

    /// Return to IDLE from any state. Accumulated time is kept for a final read.
    pub fn finish(&mut self, now: Instant) {
        self.freeze(now);
        self.set(RecordingStatus::Idle, 0);
    }

    fn freeze(&mut self, now: Instant) {
        if let Some(at) = self.resumed_at.take() {
            self.accumulated += now.saturating_duration_since(at);
        }
    }

    fn set(&mut self, status: RecordingStatus, extra: i32) {
        self.status = status;
        self.extra = extra;
    }

    fn expect(&self, status: RecordingStatus, action: &str) -> Result<(), InvalidStateTransition> {
        if self.status != status {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn expect_active(&self, action: &str) -> Result<(), InvalidStateTransition> {
        if !self.status.is_active() {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.status,
            action: action.to_string(),
        }
    }
}
