//! Room reveal

use super::{Completion, Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::config::RoomConfig;
use crate::stage::Stage;
use crate::timer::{TimerEvent, TimerGuard};
use std::time::Duration;

/// Render model of the room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    /// Lighting flag
    pub lights_on: bool,
    /// Decorations revealed so far
    pub revealed: Vec<String>,
    /// Decorations still hidden
    pub hidden: usize,
    /// Whether `Continue` leaves the room
    pub can_continue: bool,
}

/// Stage 1
pub struct RoomScene {
    lights_on: bool,
    decorations: Vec<String>,
    revealed: usize,
    interval: Duration,
    timer: Option<TimerGuard>,
    completion: Completion,
}

impl RoomScene {
    /// Mount the room. With the lights on, decorations start appearing.
    pub fn new(config: &RoomConfig, lights_on: bool, ctx: &SceneContext) -> Self {
        let mut room = Self {
            lights_on,
            decorations: config.decorations.clone(),
            revealed: 0,
            interval: config.reveal_interval(),
            timer: None,
            completion: Completion::default(),
        };
        if lights_on {
            room.start_reveal(ctx);
        }
        room
    }

    fn start_reveal(&mut self, ctx: &SceneContext) {
        if self.timer.is_none() && !self.fully_revealed() {
            self.timer = Some(
                ctx.scheduler
                    .schedule_repeating(self.interval, TimerEvent::RoomReveal),
            );
        }
    }

    /// Whether every decoration is visible
    pub fn fully_revealed(&self) -> bool {
        self.revealed >= self.decorations.len()
    }

    /// Lighting flag
    pub fn lights_on(&self) -> bool {
        self.lights_on
    }
}

impl Scene for RoomScene {
    fn stage(&self) -> Stage {
        Stage::Room
    }

    fn handle(&mut self, action: SceneAction, ctx: &SceneContext) -> SceneSignal {
        if action != SceneAction::Continue {
            return SceneSignal::Pending;
        }
        if !self.lights_on {
            log::debug!("room light switched on");
            self.lights_on = true;
            self.start_reveal(ctx);
            return SceneSignal::Pending;
        }
        if self.fully_revealed() {
            return self.completion.fire();
        }
        SceneSignal::Pending
    }

    fn on_timer(&mut self, event: TimerEvent, _ctx: &SceneContext) -> SceneSignal {
        if event == TimerEvent::RoomReveal && !self.fully_revealed() {
            self.revealed += 1;
            if self.fully_revealed() {
                self.timer = None;
            }
        }
        SceneSignal::Pending
    }

    fn view(&self) -> SceneView {
        SceneView::Room(RoomView {
            lights_on: self.lights_on,
            revealed: self.decorations[..self.revealed].to_vec(),
            hidden: self.decorations.len() - self.revealed,
            can_continue: !self.lights_on || self.fully_revealed(),
        })
    }
}
