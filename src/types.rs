//! Wire records of the Bottango REST API
//!
//! Response bodies deserialize straight into these types. Required fields
//! that are missing make deserialization fail; optional fields are explicit
//! `Option`s. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Current readout of one animation-driven channel
///
/// The meaning of `movement` and `signal` depends on the driver type:
/// - motors and curves report movement in 0.0-1.0 and the raw signal value
/// - on/off events report their state as 0 or 1
/// - audio (with hardware playback enabled) reports -1 when not playing,
///   otherwise the signal is the playback time in ms from the start of the
///   clip and movement is that time divided by the clip length
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Effector {
    pub name: String,
    pub live: bool,
    pub identifier: String,
    pub driver_name: String,
    pub driver_live: bool,
    #[serde(default)]
    pub movement: Option<f64>,
    #[serde(default)]
    pub signal: Option<f64>,
}

/// Snapshot of the server's playback state
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub selected_animation_index: i64,
    pub selected_animation_name: String,
    pub is_playing: bool,
    #[serde(rename = "playbackTimeInMS")]
    pub playback_time_in_ms: i64,
    #[serde(rename = "durationInMS")]
    pub duration_in_ms: i64,
    pub effectors: Vec<Effector>,
}

impl PlaybackState {
    /// Playback reached the end of the animation and stopped
    pub fn is_finished(&self) -> bool {
        self.playback_time_in_ms >= self.duration_in_ms && !self.is_playing
    }

    /// Position in the animation as a 0.0-1.0 ratio (0.0 for empty animations)
    pub fn progress(&self) -> f64 {
        if self.duration_in_ms <= 0 {
            return 0.0;
        }
        (self.playback_time_in_ms as f64 / self.duration_in_ms as f64).clamp(0.0, 1.0)
    }

    /// Find an effector by name
    pub fn effector(&self, name: &str) -> Option<&Effector> {
        self.effectors.iter().find(|e| e.name == name)
    }
}

/// Body of `GET CanAnimate/`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanAnimateResponse {
    #[serde(default)]
    pub can_animate: bool,
}

/// Body of `GET Animations/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationListResponse {
    #[serde(default)]
    pub animations: Vec<String>,
}

/// Body of `GET Animations/Selected/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAnimation {
    #[serde(default)]
    pub selected_animation_index: Option<i64>,
    #[serde(default)]
    pub selected_animation_name: Option<String>,
}

/// Partial playback state sent with `PUT PlaybackState/`
///
/// Absent fields are left out of the JSON body entirely, so the default
/// value serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_animation_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_animation_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
    #[serde(rename = "playbackTimeInMS", skip_serializing_if = "Option::is_none")]
    pub playback_time_in_ms: Option<i64>,
}

impl PlaybackUpdate {
    /// Update that only sets the playing flag
    pub fn playing(is_playing: bool) -> Self {
        Self {
            is_playing: Some(is_playing),
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.selected_animation_index = index;
        self
    }

    pub fn with_playback_time_ms(mut self, time_ms: i64) -> Self {
        self.playback_time_in_ms = Some(time_ms);
        self
    }
}
