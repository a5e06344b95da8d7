//! Audio device integration using rodio
//!
//! Plays one audio file on the default output device. Looping is done by
//! re-queueing the decoded file whenever the sink runs dry, so seeking
//! always operates on a plain decoder.

use super::{AudioBackend, PlaybackError};
use crate::{GreetingError, Result};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Background track played through the system audio device
pub struct RodioBackend {
    path: PathBuf,
    _stream: OutputStream,
    sink: Sink,
    duration: Option<Duration>,
    looping: bool,
    playing: bool,
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| GreetingError::AudioDevice(format!("Failed to decode {}: {e}", path.display())))
}

impl RodioBackend {
    /// Open the default output device and load `path`, paused at 0s.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| GreetingError::AudioDevice(format!("Failed to create audio stream: {e}")))?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| GreetingError::AudioDevice(format!("Failed to create audio sink: {e}")))?;
        sink.pause();

        let source = decode(&path)?;
        let duration = source.total_duration();
        sink.append(source);

        log::info!(
            "loaded background track {} ({})",
            path.display(),
            duration
                .map(|d| format!("{:.1}s", d.as_secs_f64()))
                .unwrap_or_else(|| "unknown length".to_string())
        );

        Ok(RodioBackend {
            path,
            _stream: stream,
            sink,
            duration,
            looping: true,
            playing: false,
        })
    }

    fn requeue(&mut self) -> Result<()> {
        let source = decode(&self.path)?;
        self.sink.append(source);
        Ok(())
    }
}

impl AudioBackend for RodioBackend {
    fn start(&mut self) -> std::result::Result<(), PlaybackError> {
        if self.sink.empty() {
            self.requeue()
                .map_err(|e| PlaybackError::StartRejected(e.to_string()))?;
        }
        self.sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> std::result::Result<(), PlaybackError> {
        self.sink
            .try_seek(position)
            .map_err(|e| PlaybackError::Seek(e.to_string()))
    }

    fn position(&self) -> Duration {
        let pos = self.sink.get_pos();
        match self.duration {
            Some(duration) => pos.min(duration),
            None => pos,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn tick(&mut self, _elapsed: Duration) {
        // Restart if the track ran out
        if self.playing && self.looping && self.sink.empty() {
            if let Err(e) = self.requeue() {
                log::warn!("Failed to loop background track: {e}");
                self.playing = false;
            }
        }
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.sink.pause();
    }
}
