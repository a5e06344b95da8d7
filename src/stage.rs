//! Stage sequencing
//!
//! The greeting is a strictly forward sequence of five stages. The
//! sequencer is the only place a stage can change, and it only ever moves
//! one step forward.

use std::fmt;

/// Top-level scene index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    /// Intro messages and song-choice card
    #[default]
    Intro = 0,
    /// Room reveal
    Room = 1,
    /// Cake ceremony
    CakeCeremony = 2,
    /// Photo gallery
    PhotoGallery = 3,
    /// Final message (terminal)
    FinalMessage = 4,
}

impl Stage {
    /// All stages in order
    pub const ALL: [Stage; 5] = [
        Stage::Intro,
        Stage::Room,
        Stage::CakeCeremony,
        Stage::PhotoGallery,
        Stage::FinalMessage,
    ];

    /// The terminal stage
    pub const TERMINAL: Stage = Stage::FinalMessage;

    /// Numeric stage index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage for a numeric index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following stage, saturating at the terminal stage
    pub fn next(self) -> Stage {
        Self::from_index(self.index() + 1).unwrap_or(Self::TERMINAL)
    }

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intro => "Intro",
            Stage::Room => "Room",
            Stage::CakeCeremony => "Cake Ceremony",
            Stage::PhotoGallery => "Photo Gallery",
            Stage::FinalMessage => "Final Message",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-only stage machine
#[derive(Debug, Clone, Default)]
pub struct SceneSequencer {
    current: Stage,
    lights_on: bool,
}

impl SceneSequencer {
    /// Start at [`Stage::Intro`] with the lights off
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active stage
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Lighting flag consumed by the room
    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    /// Whether the terminal stage has been reached
    pub fn is_terminal(&self) -> bool {
        self.current == Stage::TERMINAL
    }

    /// Move one stage forward. Returns false (and changes nothing) at the
    /// terminal stage.
    pub fn advance(&mut self) -> bool {
        if self.is_terminal() {
            log::debug!("advance ignored at terminal stage");
            return false;
        }

        let from = self.current;
        self.current = from.next();
        if self.current == Stage::Room {
            self.lights_on = true;
        }
        log::info!("stage {} -> {}", from, self.current);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_saturates() {
        for start in 0..Stage::ALL.len() {
            let mut seq = SceneSequencer::new();
            for _ in 0..start {
                seq.advance();
            }
            assert_eq!(seq.current().index(), start);
            seq.advance();
            assert_eq!(seq.current().index(), (start + 1).min(4));
        }
    }

    #[test]
    fn test_terminal_is_idempotent() {
        let mut seq = SceneSequencer::new();
        while seq.advance() {}
        assert_eq!(seq.current(), Stage::FinalMessage);
        assert!(!seq.advance());
        assert!(!seq.advance());
        assert_eq!(seq.current(), Stage::FinalMessage);
    }

    #[test]
    fn test_entering_room_turns_lights_on() {
        let mut seq = SceneSequencer::new();
        assert!(!seq.lights_on());
        seq.advance();
        assert_eq!(seq.current(), Stage::Room);
        assert!(seq.lights_on());
        seq.advance();
        assert!(seq.lights_on());
    }

    #[test]
    fn test_stage_indices() {
        assert_eq!(Stage::from_index(2), Some(Stage::CakeCeremony));
        assert_eq!(Stage::from_index(5), None);
        assert_eq!(Stage::FinalMessage.next(), Stage::FinalMessage);
    }
}
