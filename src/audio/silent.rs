//! Virtual-clock backend
//!
//! Plays nothing but keeps an exact playback position that advances only
//! through [`AudioBackend::tick`]. Used when no audio device is available
//! and by the test suite.

use super::{AudioBackend, PlaybackError};
use std::time::Duration;

/// Silent stand-in for a real audio track
#[derive(Debug, Clone)]
pub struct SilentBackend {
    position: Duration,
    duration: Option<Duration>,
    playing: bool,
    looping: bool,
    reject_start: bool,
}

impl SilentBackend {
    /// Create a silent track of the given length (None = unknown length)
    pub fn new(duration: Option<Duration>) -> Self {
        SilentBackend {
            position: Duration::ZERO,
            duration,
            playing: false,
            looping: false,
            reject_start: false,
        }
    }

    /// Create a track whose every start request is rejected,
    /// as a browser does under an autoplay policy
    pub fn rejecting(duration: Option<Duration>) -> Self {
        SilentBackend {
            reject_start: true,
            ..Self::new(duration)
        }
    }
}

impl AudioBackend for SilentBackend {
    fn start(&mut self) -> Result<(), PlaybackError> {
        if self.reject_start {
            return Err(PlaybackError::StartRejected(
                "playback not allowed by platform policy".into(),
            ));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        self.position = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        Ok(())
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn tick(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        let advanced = self.position + elapsed;
        self.position = match self.duration {
            Some(duration) if advanced >= duration => {
                if self.looping && !duration.is_zero() {
                    let wrapped = advanced.as_nanos() % duration.as_nanos();
                    Duration::from_nanos(wrapped as u64)
                } else {
                    self.playing = false;
                    duration
                }
            }
            _ => advanced,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_end_without_loop() {
        let mut backend = SilentBackend::new(Some(Duration::from_secs(4)));
        backend.start().unwrap();
        backend.tick(Duration::from_secs(6));
        assert_eq!(backend.position(), Duration::from_secs(4));
        backend.tick(Duration::from_secs(1));
        assert_eq!(backend.position(), Duration::from_secs(4));
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let mut backend = SilentBackend::new(None);
        backend.tick(Duration::from_secs(2));
        assert_eq!(backend.position(), Duration::ZERO);
    }

    #[test]
    fn test_rejecting_backend() {
        let mut backend = SilentBackend::rejecting(None);
        assert!(matches!(
            backend.start(),
            Err(PlaybackError::StartRejected(_))
        ));
    }
}
