//! Bottango playback API client
//!
//! [`BottangoClient`] wraps the REST API exposed by a running Bottango
//! instance: listing and selecting animations, starting, pausing and
//! stopping playback, and polling the playback state.
//!
//! Every failure is logged here before it is returned. Callers decide what
//! to do with it; see [`BottangoError::is_fatal`].

pub mod transport;


use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::animations::AnimationIndex;
use crate::config::BottangoConfig;
use crate::error::{BottangoError, Result};
use crate::types::{
    AnimationListResponse, CanAnimateResponse, PlaybackState, PlaybackUpdate, SelectedAnimation,
};

pub use transport::{HttpTransport, Transport};

pub const CAN_ANIMATE_URL: &str = "CanAnimate/";
pub const LIST_ANIMATIONS_URL: &str = "Animations/";
pub const CURRENT_ANIMATION_URL: &str = "Animations/Selected/";
pub const PLAYBACK_STATE_URL: &str = "PlaybackState/";
pub const EMERGENCY_STOP_URL: &str = "Stop/";

/// Delay between two playback state polls in [`BottangoClient::wait_animation_done`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Playback time sent when starting an animation with [`BottangoClient::play_animation`]
pub const PLAY_START_TIME_MS: i64 = 5000;

/// How [`BottangoClient::wait_animation_done`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// Playback reached the end and stopped
    Finished(PlaybackState),
    /// The timeout elapsed first; carries the last state seen
    TimedOut(PlaybackState),
}

impl WaitOutcome {
    pub fn state(&self) -> &PlaybackState {
        match self {
            WaitOutcome::Finished(state) | WaitOutcome::TimedOut(state) => state,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, WaitOutcome::Finished(_))
    }
}

/// Client for the Bottango playback REST API
///
/// All operations take `&self`; the animation index cache uses interior
/// mutability.
pub struct BottangoClient<T: Transport = HttpTransport> {
    transport: T,
    animations: RwLock<AnimationIndex>,
    poll_interval: Duration,
}

impl BottangoClient<HttpTransport> {
    /// Connect to the Bottango instance described by `config`.
    ///
    /// Checks whether Bottango can animate and loads the animation list,
    /// logging the result of both. Only a connection failure makes this
    /// return an error; a "not ready" answer or a failed request is logged
    /// and the client is returned anyway.
    pub fn connect(config: &BottangoConfig) -> Result<Self> {
        info!("🎬 Connecting to Bottango at {}:{}", config.host, config.port);
        let client = Self::with_transport(HttpTransport::from_config(config)?);
        client.handshake()?;
        Ok(client)
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    pub fn port(&self) -> u16 {
        self.transport.port()
    }
}

impl<T: Transport> BottangoClient<T> {
    /// Wrap a transport without contacting the server
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            animations: RwLock::new(AnimationIndex::new()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Readiness check and initial animation list load
    pub fn handshake(&self) -> Result<()> {
        self.test_connection()?;

        match self.refresh_animation_list() {
            Ok(animations) => info!("Available animations are: {:?}", animations),
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => warn!("⚠️  Animation list unavailable, starting with an empty cache"),
        }
        Ok(())
    }

    fn test_connection(&self) -> Result<()> {
        match self.can_animate() {
            Ok(true) => info!("✅ Bottango online and ready to animate!"),
            Ok(false) => error!("Bottango not ready to animate or offline"),
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => error!("Bottango not ready to animate or offline"),
        }
        Ok(())
    }

    /// Whether Bottango is currently able to animate
    pub fn can_animate(&self) -> Result<bool> {
        let response: CanAnimateResponse = self.get_json(CAN_ANIMATE_URL)?;
        Ok(response.can_animate)
    }

    /// Fetch the animation list and rebuild the name -> index cache.
    ///
    /// Returns the names in server order; that order defines the index used
    /// to select an animation.
    pub fn refresh_animation_list(&self) -> Result<Vec<String>> {
        let response: AnimationListResponse = self.get_json(LIST_ANIMATIONS_URL)?;
        self.animations.write().rebuild(&response.animations);
        Ok(response.animations)
    }

    /// Cached index of `name`, as of the last refresh
    pub fn animation_index(&self, name: &str) -> Option<usize> {
        self.animations.read().index_of(name)
    }

    /// Cached animation names, as of the last refresh
    pub fn animation_names(&self) -> Vec<String> {
        self.animations.read().names().to_vec()
    }

    /// Currently selected animation (index and name)
    pub fn get_selected_animation(&self) -> Result<SelectedAnimation> {
        self.get_json(CURRENT_ANIMATION_URL)
    }

    /// Name of the currently selected animation, if the server reports one
    pub fn get_current_animation(&self) -> Result<Option<String>> {
        Ok(self.get_selected_animation()?.selected_animation_name)
    }

    pub fn get_playback_state(&self) -> Result<PlaybackState> {
        self.get_json(PLAYBACK_STATE_URL)
    }

    pub fn resume_animation(&self) -> Result<()> {
        self.put_update(&PlaybackUpdate::playing(true))
    }

    pub fn pause_animation(&self) -> Result<()> {
        self.put_update(&PlaybackUpdate::playing(false))
    }

    /// Select `animation_name` and start playing it.
    ///
    /// The animation list is refreshed first so the index matches the
    /// server. An unknown name is not an error: the index is left out and
    /// Bottango plays whatever is selected.
    ///
    /// Three writes are always sent, in order: select and pause, an empty
    /// update, then play from [`PLAY_START_TIME_MS`]. `playback_time_ms` is
    /// accepted but currently not sent.
    pub fn play_animation(&self, animation_name: &str, playback_time_ms: i64) -> Result<()> {
        self.refresh_animation_list()?;

        let index = self.animation_index(animation_name);
        match index {
            Some(index) => info!(
                "▶️  Playing animation '{}' (index {})",
                animation_name, index
            ),
            None => warn!(
                "⚠️  Animation '{}' not found, playing the current selection",
                animation_name
            ),
        }

        self.put_update(&PlaybackUpdate::playing(false).with_index(index))?;
        self.put_update(&PlaybackUpdate::default())?;

        // TODO: send `playback_time_ms` instead of PLAY_START_TIME_MS once the
        // intended start offset behavior is confirmed against Bottango.
        debug!(
            requested_ms = playback_time_ms,
            sent_ms = PLAY_START_TIME_MS,
            "Play start offset"
        );
        self.put_update(&PlaybackUpdate::playing(true).with_playback_time_ms(PLAY_START_TIME_MS))
    }

    /// Turn master live off, like pressing Escape in Bottango.
    ///
    /// There is no API call to turn it back on; that has to be done in the
    /// Bottango UI.
    pub fn emergency_stop(&self) -> Result<()> {
        warn!("🛑 Emergency stop");
        self.put_json(EMERGENCY_STOP_URL, &Value::String(String::new()))
    }

    /// Poll the playback state until the animation has finished.
    ///
    /// Sleeps [`Self::poll_interval`] before every poll. When `timeout`
    /// elapses first an error is logged and [`WaitOutcome::TimedOut`] is
    /// returned. A failed poll ends the wait with that error.
    pub fn wait_animation_done(&self, timeout: Option<Duration>) -> Result<WaitOutcome> {
        let started = Instant::now();

        loop {
            thread::sleep(self.poll_interval);
            let state = self.get_playback_state()?;

            if state.is_finished() {
                debug!(
                    "Animation '{}' finished after {:?}",
                    state.selected_animation_name,
                    started.elapsed()
                );
                return Ok(WaitOutcome::Finished(state));
            }

            if let Some(timeout) = timeout {
                if started.elapsed() > timeout {
                    error!(
                        "Timeout while waiting for animation '{}' to finish. \
                         Timeout was {:?}, state is: {:?}",
                        state.selected_animation_name,
                        timeout,
                        state
                    );
                    return Ok(WaitOutcome::TimedOut(state));
                }
            }
        }
    }

    fn get_json<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R> {
        let result = self.transport.get(endpoint).and_then(|value| {
            debug!("Request '{}' returned: {}", endpoint, value);
            serde_json::from_value(value).map_err(|source| BottangoError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
        });
        result.map_err(log_failure)
    }

    fn put_json(&self, endpoint: &str, body: &Value) -> Result<()> {
        debug!("Request '{}' with params '{}'", endpoint, body);
        self.transport.put(endpoint, body).map_err(log_failure)
    }

    fn put_update(&self, update: &PlaybackUpdate) -> Result<()> {
        let body = serde_json::to_value(update).map_err(|source| {
            log_failure(BottangoError::Encode {
                endpoint: PLAYBACK_STATE_URL.to_string(),
                source,
            })
        })?;
        self.put_json(PLAYBACK_STATE_URL, &body)
    }
}

fn log_failure(err: BottangoError) -> BottangoError {
    error!("{}", err);
    err
}
