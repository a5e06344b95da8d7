//! Shared background audio
//!
//! Exactly one playable resource exists per session. It is wrapped in an
//! [`AudioController`] and shared as [`SharedAudio`]: the global music
//! button, the song-choice card and the photo gallery all drive the same
//! controller, so they always observe the same playback position.

#[cfg(feature = "streaming")]
pub mod device;
pub mod silent;

#[cfg(feature = "streaming")]
pub use device::RodioBackend;
pub use silent::SilentBackend;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Fixed forward skip of the song card, in seconds
pub const SKIP_FORWARD_SECS: f64 = 10.0;

/// Handle to the single session-wide audio controller
pub type SharedAudio = Arc<Mutex<AudioController>>;

/// Failures reported by an [`AudioBackend`].
///
/// The controller recovers from all of these locally.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The platform declined to start playback
    #[error("playback start rejected: {0}")]
    StartRejected(String),

    /// The backend could not move to the requested position
    #[error("seek failed: {0}")]
    Seek(String),
}

/// A single playable audio resource.
///
/// Implementations only perform the physical operation; clamping, loop
/// policy and error recovery live in [`AudioController`].
pub trait AudioBackend {
    /// Start or resume playback from the current position.
    fn start(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self);

    /// Move to an absolute position (already clamped by the caller).
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Track length, if known.
    fn duration(&self) -> Option<Duration>;

    /// Enable or disable looping at end of track.
    fn set_looping(&mut self, looping: bool);

    /// Advance time for backends that keep a virtual clock.
    fn tick(&mut self, _elapsed: Duration) {}
}

/// Controller over the one background track.
pub struct AudioController {
    backend: Box<dyn AudioBackend>,
    is_playing: bool,
    looping: bool,
    released: bool,
}

impl AudioController {
    /// Wrap a backend. Looping is always enabled.
    pub fn new(mut backend: Box<dyn AudioBackend>) -> Self {
        backend.set_looping(true);
        Self {
            backend,
            is_playing: false,
            looping: true,
            released: false,
        }
    }

    /// Wrap a backend into the shared handle handed to scenes.
    pub fn shared(backend: Box<dyn AudioBackend>) -> SharedAudio {
        Arc::new(Mutex::new(Self::new(backend)))
    }

    /// Start or pause playback.
    ///
    /// A rejected start is logged and leaves the controller not playing.
    pub fn set_playing(&mut self, playing: bool) {
        if self.released {
            log::debug!("ignoring set_playing({playing}) on released audio handle");
            return;
        }

        if playing {
            if self.is_playing {
                return;
            }
            self.backend.set_looping(true);
            match self.backend.start() {
                Ok(()) => {
                    self.is_playing = true;
                    log::debug!("background audio started at {:.2}s", self.current_time());
                }
                Err(e) => {
                    log::warn!("Audio playback failed: {e}");
                    self.is_playing = false;
                }
            }
        } else {
            if self.is_playing {
                self.backend.pause();
                log::debug!("background audio paused at {:.2}s", self.current_time());
            }
            self.is_playing = false;
        }
    }

    /// Flip between playing and paused.
    pub fn toggle(&mut self) {
        let target = !self.is_playing;
        self.set_playing(target);
    }

    /// Seek to an absolute time in seconds, clamped to `[0, duration]`.
    ///
    /// No-op while the duration is unknown.
    pub fn seek_to(&mut self, time: f64) {
        let Some(duration) = self.duration() else {
            return;
        };
        let target = if time.is_finite() {
            time.clamp(0.0, duration)
        } else {
            0.0
        };
        if let Err(e) = self.backend.seek(Duration::from_secs_f64(target)) {
            log::warn!("{e}");
        }
    }

    /// Seek relative to the current position.
    pub fn skip_by(&mut self, delta: f64) {
        let target = self.current_time() + delta;
        self.seek_to(target);
    }

    /// Playback position in `[0, 1]`; 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        match self.duration() {
            Some(duration) if duration > 0.0 => (self.current_time() / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Current position in seconds
    pub fn current_time(&self) -> f64 {
        self.backend.position().as_secs_f64()
    }

    /// Track length in seconds, if known
    pub fn duration(&self) -> Option<f64> {
        self.backend.duration().map(|d| d.as_secs_f64())
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether the track loops (always true)
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Forward elapsed time to the backend.
    pub fn tick(&mut self, elapsed: Duration) {
        self.backend.tick(elapsed);
    }

    /// Pause and refuse further playback. Called once at session end.
    pub fn release(&mut self) {
        self.set_playing(false);
        self.released = true;
    }

    /// Whether [`release`](Self::release) was called
    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller(duration_secs: Option<u64>) -> AudioController {
        AudioController::new(Box::new(SilentBackend::new(
            duration_secs.map(Duration::from_secs),
        )))
    }

    #[test]
    fn test_play_pause_preserves_position() {
        let mut audio = controller(Some(60));
        audio.set_playing(true);
        assert!(audio.is_playing());

        audio.tick(Duration::from_secs(5));
        audio.set_playing(false);
        assert!(!audio.is_playing());
        assert_relative_eq!(audio.current_time(), 5.0);

        audio.tick(Duration::from_secs(5));
        assert_relative_eq!(audio.current_time(), 5.0);
    }

    #[test]
    fn test_rejected_start_stays_paused() {
        let mut audio = AudioController::new(Box::new(SilentBackend::rejecting(Some(
            Duration::from_secs(60),
        ))));
        audio.set_playing(true);
        assert!(!audio.is_playing());
    }

    #[test]
    fn test_seek_clamps_to_track() {
        let mut audio = controller(Some(60));
        audio.seek_to(-5.0);
        assert_relative_eq!(audio.current_time(), 0.0);

        audio.seek_to(55.0);
        audio.skip_by(SKIP_FORWARD_SECS);
        assert_relative_eq!(audio.current_time(), 60.0);
        assert_relative_eq!(audio.progress(), 1.0);
    }

    #[test]
    fn test_seek_without_duration_is_noop() {
        let mut audio = controller(None);
        audio.set_playing(true);
        audio.tick(Duration::from_secs(3));
        audio.seek_to(0.0);
        audio.skip_by(10.0);
        assert_relative_eq!(audio.current_time(), 3.0);
        assert_relative_eq!(audio.progress(), 0.0);
    }

    #[test]
    fn test_always_loops() {
        let mut audio = controller(Some(10));
        assert!(audio.is_looping());
        audio.set_playing(true);
        audio.tick(Duration::from_secs(12));
        assert_relative_eq!(audio.current_time(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_release_blocks_playback() {
        let mut audio = controller(Some(10));
        audio.set_playing(true);
        audio.release();
        assert!(!audio.is_playing());
        audio.set_playing(true);
        assert!(!audio.is_playing());
        assert!(audio.is_released());
    }
}
