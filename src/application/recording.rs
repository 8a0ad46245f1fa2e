//! Recording use case: the single-session recording state machine
//!
//! [`RecordingService`] owns at most one encoder at a time. Every transition
//! runs behind one async mutex, so commands from any number of callers are
//! applied in order. Status changes are pushed to registered listeners on
//! the task that performed the transition.

use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use std::time::{Duration as StdDuration, Instant};

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::recording::{
    Duration, LimitMode, RecordOptions, RecordingSession, RecordingStatus, StatusEvent,
};

use super::ports::{
    AudioEncoder, EncoderConfig, EncoderFactory, EncoderHealth, RecordingError,
    START_FAILURE_CODE,
};

/// Default period of the limit watchdog
pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_millis(250);

/// Callback receiving status changes
pub type StatusListener = Arc<dyn Fn(StatusEvent) + Send + Sync>;

/// Handle returned by [`RecordingService::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, StatusListener)>,
}

struct State {
    session: RecordingSession,
    encoder: Option<Box<dyn AudioEncoder>>,
    options: Option<RecordOptions>,
    /// Bumped on every start and return to idle; stale watchdogs exit
    generation: u64,
}

struct Inner {
    factory: Arc<dyn EncoderFactory>,
    state: Mutex<State>,
    listeners: StdMutex<Listeners>,
    poll_interval: StdDuration,
}

/// Recording service handle. Clones share the same session.
#[derive(Clone)]
pub struct RecordingService {
    inner: Arc<Inner>,
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl RecordingService {
    /// Create a service with the default watchdog period
    pub fn new(factory: Arc<dyn EncoderFactory>) -> Self {
        Self::with_poll_interval(factory, DEFAULT_POLL_INTERVAL)
    }

    /// Create a service with a custom watchdog period
    pub fn with_poll_interval(factory: Arc<dyn EncoderFactory>, poll_interval: StdDuration) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory,
                state: Mutex::new(State {
                    session: RecordingSession::new(),
                    encoder: None,
                    options: None,
                    generation: 0,
                }),
                listeners: StdMutex::new(Listeners::default()),
                poll_interval,
            }),
        }
    }

    /// Start a new recording.
    ///
    /// When not idle the current status is re-announced and nothing else
    /// happens. When the encoder cannot be opened or started the session
    /// moves to FAILED with extra `-1` and the error is returned.
    pub async fn start(&self, options: RecordOptions) -> Result<StatusEvent, RecordingError> {
        let mut state = self.inner.state.lock().await;
        if !state.session.is_idle() {
            debug!(status = %state.session.status(), "start ignored");
            return Ok(self.inner.announce(&state));
        }

        let config = EncoderConfig::from(&options);
        info!(
            file = %config.output.display(),
            format = %config.format,
            sample_rate = config.sample_rate,
            bits = config.bits_per_sample,
            channels = config.channels,
            "starting recording"
        );

        let opened = self.open_and_start(&config).await;
        let now = now();
        state.options = Some(options);
        state.generation += 1;
        if let Err(e) = state.session.start(now) {
            warn!("{}", e);
        }

        match opened {
            Ok(encoder) => {
                state.encoder = Some(encoder);
                let generation = state.generation;
                self.spawn_watchdog(generation);
                Ok(self.inner.announce(&state))
            }
            Err(e) => {
                error!("Failed to start recording: {}", e);
                if let Err(t) = state.session.fail(now, START_FAILURE_CODE) {
                    warn!("{}", t);
                }
                self.inner.announce(&state);
                Err(e)
            }
        }
    }

    async fn open_and_start(
        &self,
        config: &EncoderConfig,
    ) -> Result<Box<dyn AudioEncoder>, RecordingError> {
        let mut encoder = self.inner.factory.open(config)?;
        encoder.start().await?;
        Ok(encoder)
    }

    /// Toggle between STARTED and PAUSED. Any other status is re-announced.
    pub async fn pause_resume(&self) -> Result<StatusEvent, RecordingError> {
        let mut state = self.inner.state.lock().await;
        let status = state.session.status();
        let now = now();

        if !status.is_active() || state.encoder.is_none() {
            debug!(%status, "pause/resume ignored");
            return Ok(self.inner.announce(&state));
        }

        let result = match state.encoder.as_mut() {
            Some(encoder) if status == RecordingStatus::Started => encoder.pause().await,
            Some(encoder) => encoder.resume().await,
            None => Ok(()),
        };

        if let Err(e) = result {
            error!("Failed to {} recording: {}", toggle_verb(status), e);
            self.inner.release_encoder(&mut state).await;
            if let Err(t) = state.session.fail(now, e.code()) {
                warn!("{}", t);
            }
            self.inner.announce(&state);
            return Err(e);
        }

        let transition = if status == RecordingStatus::Started {
            state.session.pause(now)
        } else {
            state.session.resume(now)
        };
        if let Err(e) = transition {
            warn!("{}", e);
        }
        info!(duration = %state.session.elapsed(now), "recording {}", state.session.status());
        Ok(self.inner.announce(&state))
    }

    /// Finish the recording and keep the file.
    ///
    /// Finalize errors are logged; the session still returns to IDLE.
    pub async fn stop(&self) -> StatusEvent {
        let mut state = self.inner.state.lock().await;
        if state.session.is_idle() {
            return self.inner.announce(&state);
        }

        let now = now();
        self.inner.release_encoder(&mut state).await;
        state.session.finish(now);
        state.generation += 1;
        info!(duration = %state.session.elapsed(now), "recording stopped");
        self.inner.announce(&state)
    }

    /// Finish the recording and delete its output file
    pub async fn erase(&self) -> StatusEvent {
        let mut state = self.inner.state.lock().await;
        if state.session.is_idle() {
            return self.inner.announce(&state);
        }

        let now = now();
        self.inner.release_encoder(&mut state).await;
        if let Some(options) = &state.options {
            let file = options.file();
            match tokio::fs::remove_file(file).await {
                Ok(()) => info!(file = %file.display(), "recording erased"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(file = %file.display(), "nothing to erase")
                }
                Err(e) => warn!(file = %file.display(), "Failed to erase recording: {}", e),
            }
        }
        state.session.finish(now);
        state.generation += 1;
        self.inner.announce(&state)
    }

    /// Recorded time, excluding pauses
    pub async fn duration(&self) -> Duration {
        self.inner.state.lock().await.session.elapsed(now())
    }

    pub async fn status(&self) -> RecordingStatus {
        self.inner.state.lock().await.session.status()
    }

    /// Current status with its extra code
    pub async fn status_event(&self) -> StatusEvent {
        self.inner.state.lock().await.session.event()
    }

    /// Options of the current or most recent recording
    pub async fn options(&self) -> Option<RecordOptions> {
        self.inner.state.lock().await.options.clone()
    }

    /// Register a status listener
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(StatusEvent) + Send + Sync + 'static,
    {
        let mut listeners = self.inner.lock_listeners();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Unregister a listener. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.inner.lock_listeners().entries.retain(|(i, _)| *i != id);
    }

    pub fn clear_listeners(&self) {
        self.inner.lock_listeners().entries.clear();
    }

    /// Re-broadcast the current status to all listeners
    pub async fn request_update(&self) -> StatusEvent {
        let state = self.inner.state.lock().await;
        self.inner.announce(&state)
    }

    fn spawn_watchdog(&self, generation: u64) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !inner.check_limits(generation).await {
                    break;
                }
            }
            debug!(generation, "watchdog exited");
        });
    }
}

impl Inner {
    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast the session's current event and return it
    fn announce(&self, state: &State) -> StatusEvent {
        let event = state.session.event();
        let listeners: Vec<StatusListener> = self
            .lock_listeners()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
        event
    }

    /// Finalize and drop the encoder, if one is held
    async fn release_encoder(&self, state: &mut State) {
        if let Some(mut encoder) = state.encoder.take() {
            if let Err(e) = encoder.finalize().await {
                error!("Failed to finalize recording: {}", e);
            }
        }
    }

    /// One watchdog pass. Returns false when the watchdog should exit.
    async fn check_limits(&self, generation: u64) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation || !state.session.is_active() {
            return false;
        }

        let now = now();
        let Some(encoder) = state.encoder.as_mut() else {
            return false;
        };
        let health = encoder.health();
        let bytes = encoder.bytes_written();

        match health {
            EncoderHealth::Failed(code) => {
                error!(code, "encoder failed");
                self.release_encoder(&mut state).await;
                if let Err(e) = state.session.fail(now, code) {
                    warn!("{}", e);
                }
                self.announce(&state);
                return false;
            }
            EncoderHealth::LimitReached => {
                info!(bytes, "encoder reached its size cap");
                self.reach_limit(&mut state, now).await;
                return false;
            }
            EncoderHealth::Running => {}
        }

        if state.session.status() != RecordingStatus::Started {
            return true;
        }
        let Some(limit) = state.options.as_ref().and_then(RecordOptions::limit) else {
            return true;
        };
        let reached = match limit.mode() {
            LimitMode::Time => limit
                .max_duration()
                .is_some_and(|max| state.session.elapsed(now) >= max),
            LimitMode::Size => limit.max_bytes().is_some_and(|max| bytes >= max),
        };
        if reached {
            info!(%limit, "recording limit reached");
            self.reach_limit(&mut state, now).await;
            return false;
        }
        true
    }

    async fn reach_limit(&self, state: &mut State, now: Instant) {
        self.release_encoder(state).await;
        if let Err(e) = state.session.limit_reached(now) {
            warn!("{}", e);
        }
        self.announce(state);
    }
}

fn toggle_verb(status: RecordingStatus) -> &'static str {
    if status == RecordingStatus::Started {
        "pause"
    } else {
        "resume"
    }
}
