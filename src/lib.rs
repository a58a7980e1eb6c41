//! Bottango playback client
//!
//! Typed client for the REST API that Bottango exposes on
//! `http://localhost:59224/`: list and play animations, pause, resume,
//! emergency stop, and poll the playback state.
//!
//! ```no_run
//! use bottango_playback::{BottangoClient, BottangoConfig};
//! use std::time::Duration;
//!
//! # fn main() -> bottango_playback::Result<()> {
//! let client = BottangoClient::connect(&BottangoConfig::default())?;
//! client.play_animation("Wave", 0)?;
//! client.wait_animation_done(Some(Duration::from_secs(30)))?;
//! # Ok(())
//! # }
//! ```

pub mod animations;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod types;

pub use animations::AnimationIndex;
pub use client::{BottangoClient, HttpTransport, Transport, WaitOutcome};
pub use config::{AppConfig, BottangoConfig};
pub use error::{BottangoError, Result};
pub use types::{Effector, PlaybackState, PlaybackUpdate, SelectedAnimation};
