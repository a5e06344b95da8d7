//! Happy Birthday: a linear animated greeting for the terminal
//!
//! A single-session greeting made of full-screen scenes shown one after the
//! other: intro messages, a song-choice card, a room reveal, a cake ceremony,
//! a photo gallery and a final message with a small "catch the heart" game.
//! One background track is shared by every scene that controls playback.
//!
//! # Architecture
//! - [`stage::SceneSequencer`] owns the forward-only stage index.
//! - [`audio::AudioController`] wraps the single playable resource; it is
//!   shared as [`audio::SharedAudio`] and never duplicated.
//! - [`timer::Scheduler`] is a virtual-time timer queue. Scenes hold
//!   [`timer::TimerGuard`]s that cancel their timers when the scene is dropped.
//! - [`session::Session`] is the root: it mounts scenes, routes user actions
//!   and timer events, and advances the sequencer on scene completion.
//!
//! # Crate feature flags
//! - `tui` (default): ratatui/crossterm front end (`tui`)
//! - `streaming` (opt-in): real audio output through rodio (`audio::device`)
//!
//! # Quick start
//! ```no_run
//! use std::time::Duration;
//! use happy_birthday::audio::SilentBackend;
//! use happy_birthday::scene::SceneAction;
//! use happy_birthday::{GreetingConfig, Session, Stage};
//!
//! let config = GreetingConfig::default();
//! let backend = SilentBackend::new(Some(Duration::from_secs(180)));
//! let mut session = Session::new(config, Box::new(backend)).unwrap();
//! session.advance_time(Duration::from_millis(6_000));
//! session.perform(SceneAction::Choose(0));
//! session.perform(SceneAction::TogglePlay);
//! session.advance_time(Duration::from_millis(3_000));
//! assert_eq!(session.stage(), Stage::Room);
//! ```

#![warn(missing_docs)]

pub mod audio; // Shared background audio
pub mod config; // Greeting configuration
pub mod scene; // Scene implementations
pub mod session; // Root session
pub mod stage; // Stage sequencing
pub mod timer; // Virtual-time timers
#[cfg(feature = "tui")]
pub mod tui; // Terminal front end

/// Error types for greeting operations
#[derive(thiserror::Error, Debug)]
pub enum GreetingError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error from filesystem or terminal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDevice(String),
}

/// Result type for greeting operations
pub type Result<T> = std::result::Result<T, GreetingError>;

// Public API exports
pub use audio::{AudioBackend, AudioController, SharedAudio, SilentBackend};
pub use config::GreetingConfig;
pub use scene::{SceneAction, SceneView};
pub use session::Session;
pub use stage::{SceneSequencer, Stage};
pub use timer::{Scheduler, TimerEvent, TimerGuard};

#[cfg(feature = "streaming")]
pub use audio::RodioBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_keep_their_category() {
        let missing = GreetingConfig::load("/nonexistent/greeting.json").unwrap_err();
        assert!(matches!(missing, GreetingError::Io(_)));

        let malformed = GreetingConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(malformed, GreetingError::Json(_)));
        assert!(malformed.to_string().starts_with("Config parse error"));

        let invalid = GreetingConfig::from_json(r#"{ "cake": { "candles": 0 } }"#).unwrap_err();
        assert!(matches!(invalid, GreetingError::Config(_)));
    }
}
