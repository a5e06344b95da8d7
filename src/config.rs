//! Greeting configuration
//!
//! Every text and timing of the greeting lives here. The defaults are the
//! stock greeting; a JSON file can override any subset of fields.

use crate::{GreetingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete greeting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    /// Who the greeting is for
    pub recipient: String,
    /// Intro message card
    pub intro: IntroConfig,
    /// Song-choice card and background track
    pub song: SongConfig,
    /// Room reveal
    pub room: RoomConfig,
    /// Cake ceremony
    pub cake: CakeConfig,
    /// Photo gallery
    pub gallery: GalleryConfig,
    /// Final message flow
    pub finale: FinaleConfig,
}

/// Intro message cycle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Messages shown in order
    pub messages: Vec<String>,
    /// Time each message stays on screen
    pub dwell_ms: u64,
    /// Labels of the action buttons; any of them opens the song card
    pub action_labels: Vec<String>,
}

/// Song card and background track settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongConfig {
    /// Song title shown on the card
    pub title: String,
    /// Artist shown on the card
    pub artist: String,
    /// Audio file to play (requires the `streaming` feature)
    pub audio_path: Option<PathBuf>,
    /// Track length used when no real audio is played
    pub fallback_duration_secs: Option<f64>,
    /// Delay between pressing play and leaving the intro
    pub advance_delay_ms: u64,
    /// Forward skip increment
    pub skip_forward_secs: f64,
}

/// Room reveal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Decorations revealed one by one once the lights are on
    pub decorations: Vec<String>,
    /// Time between two reveals
    pub reveal_interval_ms: u64,
}

/// Cake ceremony settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CakeConfig {
    /// Number of candles to blow out
    pub candles: u8,
    /// Celebration after the last candle
    pub celebration_ms: u64,
}

/// Photo gallery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Photo captions, in order
    pub photos: Vec<String>,
}

/// Final message flow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinaleConfig {
    /// Postcards shown before the heart game
    pub postcards: Vec<String>,
    /// Final headline
    pub headline: String,
    /// Final message body
    pub body: String,
    /// Sign-off line
    pub signoff: String,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            recipient: "Madam Jii".to_string(),
            intro: IntroConfig::default(),
            song: SongConfig::default(),
            room: RoomConfig::default(),
            cake: CakeConfig::default(),
            gallery: GalleryConfig::default(),
            finale: FinaleConfig::default(),
        }
    }
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            messages: vec![
                "Hey Superstar! Happy Birthday!".to_string(),
                "Get ready for a wild, cartoon adventure...".to_string(),
                "You're the hero of this comic celebration!".to_string(),
            ],
            dwell_ms: 3000,
            action_labels: vec!["Let's Party!".to_string(), "Show Me The Fun!".to_string()],
        }
    }
}

impl Default for SongConfig {
    fn default() -> Self {
        Self {
            title: "Comic Birthday Anthem".to_string(),
            artist: "The Birthday Band".to_string(),
            audio_path: None,
            fallback_duration_secs: Some(180.0),
            advance_delay_ms: 3000,
            skip_forward_secs: crate::audio::SKIP_FORWARD_SECS,
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            decorations: vec![
                "Balloons".to_string(),
                "Streamers".to_string(),
                "Fairy lights".to_string(),
                "A giant banner".to_string(),
                "A pile of presents".to_string(),
            ],
            reveal_interval_ms: 800,
        }
    }
}

impl Default for CakeConfig {
    fn default() -> Self {
        Self {
            candles: 5,
            celebration_ms: 3000,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photos: vec![
                "The day we met".to_string(),
                "That crazy road trip".to_string(),
                "Midnight snacks".to_string(),
                "Laughing until it hurt".to_string(),
            ],
        }
    }
}

impl Default for FinaleConfig {
    fn default() -> Self {
        Self {
            postcards: vec![
                "Remember that crazy road trip? You made every mile hilarious!".to_string(),
                "Your laughter is my favorite soundtrack.".to_string(),
                "Every moment with you is like a scene from a comic book adventure!".to_string(),
            ],
            headline: "Happy Birthday Madam Jii!!".to_string(),
            body: "Thanks for lighting up my world with your laughter, love, and endless inspiration."
                .to_string(),
            signoff: "ilysm".to_string(),
        }
    }
}

impl IntroConfig {
    /// Message dwell time
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

impl SongConfig {
    /// Delay from first play to leaving the intro
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    /// Track length for the silent backend
    pub fn fallback_duration(&self) -> Option<Duration> {
        self.fallback_duration_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

impl RoomConfig {
    /// Time between two decoration reveals
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

impl CakeConfig {
    /// Celebration length
    pub fn celebration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }
}

impl GreetingConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        log::info!("loaded greeting config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(data: &str) -> Result<Self> {
        let config: GreetingConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the scenes cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.intro.messages.is_empty() {
            return Err(GreetingError::Config(
                "intro.messages must contain at least one message".into(),
            ));
        }
        if self.intro.action_labels.is_empty() {
            return Err(GreetingError::Config(
                "intro.action_labels must contain at least one label".into(),
            ));
        }

        let intervals = [
            ("intro.dwell_ms", self.intro.dwell_ms),
            ("song.advance_delay_ms", self.song.advance_delay_ms),
            ("room.reveal_interval_ms", self.room.reveal_interval_ms),
            ("cake.celebration_ms", self.cake.celebration_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(GreetingError::Config(format!("{name} must be greater than zero")));
            }
        }

        if !self.song.skip_forward_secs.is_finite() || self.song.skip_forward_secs < 0.0 {
            return Err(GreetingError::Config(format!(
                "song.skip_forward_secs must be a non-negative number, got {}",
                self.song.skip_forward_secs
            )));
        }
        if self.cake.candles == 0 {
            return Err(GreetingError::Config("cake.candles must be at least 1".into()));
        }
        if self.gallery.photos.is_empty() {
            return Err(GreetingError::Config(
                "gallery.photos must contain at least one photo".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GreetingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.intro.messages[0], "Hey Superstar! Happy Birthday!");
        assert_eq!(config.intro.dwell(), Duration::from_millis(3000));
        assert_eq!(config.song.advance_delay(), Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = GreetingConfig::from_json(
            r#"{ "recipient": "Sam", "intro": { "dwell_ms": 1500 } }"#,
        )
        .unwrap();
        assert_eq!(config.recipient, "Sam");
        assert_eq!(config.intro.dwell_ms, 1500);
        assert_eq!(config.intro.messages.len(), 3);
        assert_eq!(config.finale.signoff, "ilysm");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = GreetingConfig::from_json(r#"{ "room": { "reveal_interval_ms": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, GreetingError::Config(msg) if msg.contains("reveal_interval_ms")));
    }

    #[test]
    fn test_rejects_empty_messages() {
        let err = GreetingConfig::from_json(r#"{ "intro": { "messages": [] } }"#).unwrap_err();
        assert!(matches!(err, GreetingError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = GreetingConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GreetingError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "cake": {{ "candles": 3 }} }}"#).unwrap();
        let config = GreetingConfig::load(file.path()).unwrap();
        assert_eq!(config.cake.candles, 3);
    }

    #[test]
    fn test_pretty_json_reloads() {
        let config = GreetingConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(GreetingConfig::from_json(&json).unwrap(), config);
    }
}
