//! Cake ceremony

use super::{Completion, Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::config::CakeConfig;
use crate::stage::Stage;
use crate::timer::{TimerEvent, TimerGuard};
use std::time::Duration;

/// Render model of the cake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CakeView {
    /// Candles on the cake
    pub candles: u8,
    /// Candles still burning
    pub lit: u8,
    /// All candles out, celebration running
    pub celebrating: bool,
}

/// Stage 2
pub struct CakeScene {
    candles: u8,
    lit: u8,
    celebration_len: Duration,
    celebration: Option<TimerGuard>,
    completion: Completion,
}

impl CakeScene {
    /// Mount with every candle lit
    pub fn new(config: &CakeConfig) -> Self {
        Self {
            candles: config.candles,
            lit: config.candles,
            celebration_len: config.celebration(),
            celebration: None,
            completion: Completion::default(),
        }
    }
}

impl Scene for CakeScene {
    fn stage(&self) -> Stage {
        Stage::CakeCeremony
    }

    fn handle(&mut self, action: SceneAction, ctx: &SceneContext) -> SceneSignal {
        if action == SceneAction::BlowCandles && self.lit > 0 {
            self.lit -= 1;
            log::debug!("candle out, {} left", self.lit);
            if self.lit == 0 {
                self.celebration = Some(
                    ctx.scheduler
                        .schedule_once(self.celebration_len, TimerEvent::CakeCelebrationDone),
                );
            }
        }
        SceneSignal::Pending
    }

    fn on_timer(&mut self, event: TimerEvent, _ctx: &SceneContext) -> SceneSignal {
        if event == TimerEvent::CakeCelebrationDone && self.celebration.take().is_some() {
            return self.completion.fire();
        }
        SceneSignal::Pending
    }

    fn view(&self) -> SceneView {
        SceneView::Cake(CakeView {
            candles: self.candles,
            lit: self.lit,
            celebrating: self.lit == 0,
        })
    }
}
