//! Recording value objects and the session state machine

mod duration;
mod options;
mod session;
mod status;

pub use duration::Duration;
pub use options::{
    GeoLocation, LimitMode, OutputFormat, RecordLimit, RecordOptions, RecordOptionsBuilder,
    BYTES_PER_KB, MAX_SIZE_LIMIT_KB, MAX_TIME_LIMIT_SECS,
};
pub use session::{InvalidStateTransition, RecordingSession};
pub use status::{RecordingStatus, StatusEvent};
