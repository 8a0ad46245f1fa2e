//! Recording status broadcast to listeners

use std::fmt;

/// Status of the single active recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingStatus {
    #[default]
    Idle,
    Started,
    Paused,
    MaxReached,
    Failed,
}

impl RecordingStatus {
    /// Stable integer code for the status
    pub const fn code(&self) -> i32 {
        match self {
            Self::Idle => 0,
            Self::Started => 1,
            Self::Paused => 2,
            Self::MaxReached => 3,
            Self::Failed => -1,
        }
    }

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Paused => "paused",
            Self::MaxReached => "max-reached",
            Self::Failed => "failed",
        }
    }

    /// Whether the encoder is still capturing (possibly paused)
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::Paused)
    }

    /// Whether the session ended on its own and awaits a stop
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::MaxReached | Self::Failed)
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status announcement with its optional extra (error code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusEvent {
    pub status: RecordingStatus,
    pub extra: i32,
}

impl StatusEvent {
    pub const fn new(status: RecordingStatus, extra: i32) -> Self {
        Self { status, extra }
    }
}

impl From<RecordingStatus> for StatusEvent {
    fn from(status: RecordingStatus) -> Self {
        Self::new(status, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RecordingStatus::Idle.code(), 0);
        assert_eq!(RecordingStatus::Started.code(), 1);
        assert_eq!(RecordingStatus::Paused.code(), 2);
        assert_eq!(RecordingStatus::MaxReached.code(), 3);
        assert_eq!(RecordingStatus::Failed.code(), -1);
    }

    #[test]
    fn active_and_terminal_are_disjoint() {
        for status in [
            RecordingStatus::Idle,
            RecordingStatus::Started,
            RecordingStatus::Paused,
            RecordingStatus::MaxReached,
            RecordingStatus::Failed,
        ] {
            assert!(!(status.is_active() && status.is_terminal()));
        }
        assert!(!RecordingStatus::Idle.is_active());
        assert!(!RecordingStatus::Idle.is_terminal());
    }

    #[test]
    fn event_from_status_has_zero_extra() {
        let event = StatusEvent::from(RecordingStatus::Paused);
        assert_eq!(event.extra, 0);
        assert_eq!(event.status.to_string(), "paused");
    }
}
