//! Intro stage: message cycle, action buttons, song card

use super::song_card::{SongCardView, SongChoiceCard};
use super::{Completion, Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::config::{IntroConfig, SongConfig};
use crate::stage::Stage;
use crate::timer::{Scheduler, TimerEvent, TimerGuard};

/// Timed walk through the greeting messages.
///
/// The index only moves forward and stops at the last message. The reveal
/// flag turns on when the index reaches the second-to-last message and
/// never turns off.
pub struct IntroMessageCycle {
    messages: Vec<String>,
    index: usize,
    revealed: bool,
    timer: Option<TimerGuard>,
}

impl IntroMessageCycle {
    /// Show the first message and start the dwell timer
    pub fn start(messages: Vec<String>, dwell: std::time::Duration, scheduler: &Scheduler) -> Self {
        let mut cycle = Self {
            messages,
            index: 0,
            revealed: false,
            timer: None,
        };
        cycle.update_reveal();
        if !cycle.is_finished() {
            cycle.timer = Some(scheduler.schedule_repeating(dwell, TimerEvent::IntroTick));
        }
        cycle
    }

    fn reveal_index(&self) -> usize {
        self.messages.len().saturating_sub(2)
    }

    fn update_reveal(&mut self) {
        if !self.revealed && self.index >= self.reveal_index() {
            self.revealed = true;
            log::debug!("intro actions revealed at message {}", self.index);
        }
    }

    /// Handle one dwell tick. Returns whether the message changed.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            self.timer = None;
            return false;
        }
        self.index += 1;
        self.update_reveal();
        if self.is_finished() {
            // Last message stays up; nothing left to time.
            self.timer = None;
        }
        true
    }

    /// Index of the message on screen
    pub fn index(&self) -> usize {
        self.index
    }

    /// Message on screen
    pub fn message(&self) -> &str {
        self.messages.get(self.index).map(String::as_str).unwrap_or("")
    }

    /// Number of messages
    pub fn total(&self) -> usize {
        self.messages.len()
    }

    /// Whether the action buttons are visible
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether the last message is on screen
    pub fn is_finished(&self) -> bool {
        self.index + 1 >= self.messages.len()
    }

    /// Whether the dwell timer is still live
    pub fn is_ticking(&self) -> bool {
        self.timer.is_some()
    }
}

/// Render model of the intro message card
#[derive(Debug, Clone, PartialEq)]
pub struct IntroView {
    /// Message on screen
    pub message: String,
    /// Its index
    pub index: usize,
    /// Total number of messages
    pub total: usize,
    /// Action button labels; empty until revealed
    pub actions: Vec<String>,
}

enum IntroStep {
    Messages(IntroMessageCycle),
    SongCard(SongChoiceCard),
}

/// Stage 0
pub struct IntroScene {
    step: IntroStep,
    action_labels: Vec<String>,
    song: SongConfig,
    completion: Completion,
}

impl IntroScene {
    /// Mount the intro and start cycling messages
    pub fn new(intro: &IntroConfig, song: &SongConfig, ctx: &SceneContext) -> Self {
        let cycle = IntroMessageCycle::start(intro.messages.clone(), intro.dwell(), &ctx.scheduler);
        Self {
            step: IntroStep::Messages(cycle),
            action_labels: intro.action_labels.clone(),
            song: song.clone(),
            completion: Completion::default(),
        }
    }

    /// Whether the song card replaced the message card
    pub fn showing_song_card(&self) -> bool {
        matches!(self.step, IntroStep::SongCard(_))
    }

    /// Song card render model, when the card is showing
    pub fn song_card_view(&self) -> Option<SongCardView> {
        match &self.step {
            IntroStep::SongCard(card) => Some(card.view()),
            IntroStep::Messages(_) => None,
        }
    }
}

impl Scene for IntroScene {
    fn stage(&self) -> Stage {
        Stage::Intro
    }

    fn handle(&mut self, action: SceneAction, ctx: &SceneContext) -> SceneSignal {
        match &mut self.step {
            IntroStep::Messages(cycle) => {
                if let SceneAction::Choose(button) = action {
                    if cycle.is_revealed() && button < self.action_labels.len() {
                        log::info!("intro action '{}' chosen", self.action_labels[button]);
                        // Replacing the step drops the cycle and its timer.
                        self.step =
                            IntroStep::SongCard(SongChoiceCard::new(&self.song, ctx.audio.clone()));
                    }
                }
            }
            IntroStep::SongCard(card) => match action {
                SceneAction::TogglePlay => card.toggle_play(&ctx.scheduler),
                SceneAction::Back => card.skip_backward(),
                SceneAction::Forward => card.skip_forward(),
                _ => {}
            },
        }
        SceneSignal::Pending
    }

    fn on_timer(&mut self, event: TimerEvent, _ctx: &SceneContext) -> SceneSignal {
        match (&mut self.step, event) {
            (IntroStep::Messages(cycle), TimerEvent::IntroTick) => {
                cycle.tick();
                SceneSignal::Pending
            }
            (IntroStep::SongCard(card), TimerEvent::SongCardAdvance) => {
                if card.on_advance() {
                    self.completion.fire()
                } else {
                    SceneSignal::Pending
                }
            }
            _ => SceneSignal::Pending,
        }
    }

    fn view(&self) -> SceneView {
        match &self.step {
            IntroStep::Messages(cycle) => SceneView::Intro(IntroView {
                message: cycle.message().to_string(),
                index: cycle.index(),
                total: cycle.total(),
                actions: if cycle.is_revealed() {
                    self.action_labels.clone()
                } else {
                    Vec::new()
                },
            }),
            IntroStep::SongCard(card) => SceneView::SongCard(card.view()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::{context, run};
    use std::time::Duration;

    fn messages(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("message {i}")).collect()
    }

    #[test]
    fn test_cycle_index_is_monotonic_and_clamped() {
        let scheduler = Scheduler::new();
        let mut cycle = IntroMessageCycle::start(messages(4), Duration::from_millis(100), &scheduler);
        let mut last = cycle.index();
        for _ in 0..10 {
            cycle.tick();
            assert!(cycle.index() >= last);
            assert!(cycle.index() <= 3);
            last = cycle.index();
        }
        assert_eq!(cycle.index(), 3);
        assert_eq!(cycle.total(), 4);
        assert!(!cycle.is_ticking());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_reveal_at_second_to_last() {
        let scheduler = Scheduler::new();
        let mut cycle = IntroMessageCycle::start(messages(4), Duration::from_millis(100), &scheduler);
        assert!(!cycle.is_revealed());
        cycle.tick();
        assert!(!cycle.is_revealed());
        cycle.tick();
        assert_eq!(cycle.index(), 2);
        assert!(cycle.is_revealed());
        cycle.tick();
        assert!(cycle.is_revealed());
    }

    #[test]
    fn test_short_lists_reveal_on_mount() {
        let scheduler = Scheduler::new();
        let single = IntroMessageCycle::start(messages(1), Duration::from_millis(100), &scheduler);
        assert!(single.is_revealed());
        assert!(!single.is_ticking());

        let pair = IntroMessageCycle::start(messages(2), Duration::from_millis(100), &scheduler);
        assert!(pair.is_revealed());
        assert!(pair.is_ticking());
    }

    #[test]
    fn test_buttons_hidden_until_revealed() {
        let ctx = context(Some(180));
        let config = IntroConfig::default();
        let mut scene = IntroScene::new(&config, &SongConfig::default(), &ctx);

        scene.handle(SceneAction::Choose(0), &ctx);
        assert!(!scene.showing_song_card());

        run(&mut scene, &ctx, Duration::from_millis(3000));
        match scene.view() {
            SceneView::Intro(view) => {
                assert_eq!(view.index, 1);
                assert_eq!(view.total, config.messages.len());
                assert_eq!(view.actions, config.action_labels);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_choosing_action_cancels_cycle() {
        let ctx = context(Some(180));
        let mut scene = IntroScene::new(&IntroConfig::default(), &SongConfig::default(), &ctx);
        run(&mut scene, &ctx, Duration::from_millis(3000));

        scene.handle(SceneAction::Choose(1), &ctx);
        assert!(scene.showing_song_card());
        assert_eq!(ctx.scheduler.pending(), 0);
        assert!(scene.song_card_view().is_some());
    }

    #[test]
    fn test_out_of_range_button_ignored() {
        let ctx = context(Some(180));
        let mut scene = IntroScene::new(&IntroConfig::default(), &SongConfig::default(), &ctx);
        run(&mut scene, &ctx, Duration::from_millis(6000));
        scene.handle(SceneAction::Choose(7), &ctx);
        assert!(!scene.showing_song_card());
    }

    #[test]
    fn test_song_card_completes_intro_once() {
        let ctx = context(Some(180));
        let mut scene = IntroScene::new(&IntroConfig::default(), &SongConfig::default(), &ctx);
        run(&mut scene, &ctx, Duration::from_millis(3000));
        scene.handle(SceneAction::Choose(0), &ctx);
        scene.handle(SceneAction::TogglePlay, &ctx);

        assert_eq!(run(&mut scene, &ctx, Duration::from_millis(2999)), 0);
        assert_eq!(run(&mut scene, &ctx, Duration::from_millis(1)), 1);
        assert_eq!(run(&mut scene, &ctx, Duration::from_millis(10_000)), 0);
    }
}
