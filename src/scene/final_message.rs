//! Final message: postcards, heart game, final words
//!
//! Terminal scene. It never completes; the greeting ends here.

use super::{Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::config::FinaleConfig;
use crate::stage::Stage;
use crate::timer::TimerEvent;
use std::fmt;

/// Sub-state of the final scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FinalPhase {
    /// Postcards with a "proceed" button
    #[default]
    Postcards,
    /// Catch the bouncing heart
    Game,
    /// Final words (terminal)
    Final,
}

impl fmt::Display for FinalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FinalPhase::Postcards => "postcards",
            FinalPhase::Game => "game",
            FinalPhase::Final => "final",
        })
    }
}

/// Forward-only postcards → game → final machine.
///
/// The phase can only change through the two transition methods.
#[derive(Debug, Clone, Default)]
pub struct FinalMessageFlow {
    phase: FinalPhase,
}

impl FinalMessageFlow {
    /// Start at the postcards
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn phase(&self) -> FinalPhase {
        self.phase
    }

    /// Postcards → game. Returns false from any other phase.
    pub fn proceed_to_game(&mut self) -> bool {
        self.transition(FinalPhase::Postcards, FinalPhase::Game)
    }

    /// Game → final. Returns false from any other phase.
    pub fn catch_heart(&mut self) -> bool {
        self.transition(FinalPhase::Game, FinalPhase::Final)
    }

    fn transition(&mut self, from: FinalPhase, to: FinalPhase) -> bool {
        if self.phase != from {
            return false;
        }
        log::info!("final message {} -> {}", self.phase, to);
        self.phase = to;
        true
    }
}

/// Render model of the final scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalView {
    /// Current phase
    pub phase: FinalPhase,
    /// Postcard texts
    pub postcards: Vec<String>,
    /// Final headline
    pub headline: String,
    /// Final body
    pub body: String,
    /// Sign-off
    pub signoff: String,
}

/// Stage 4
pub struct FinalMessageScene {
    flow: FinalMessageFlow,
    finale: FinaleConfig,
}

impl FinalMessageScene {
    /// Mount on the postcards
    pub fn new(config: &FinaleConfig) -> Self {
        Self {
            flow: FinalMessageFlow::new(),
            finale: config.clone(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> FinalPhase {
        self.flow.phase()
    }
}

impl Scene for FinalMessageScene {
    fn stage(&self) -> Stage {
        Stage::FinalMessage
    }

    fn handle(&mut self, action: SceneAction, _ctx: &SceneContext) -> SceneSignal {
        match action {
            SceneAction::Continue => {
                self.flow.proceed_to_game();
            }
            SceneAction::CatchHeart => {
                self.flow.catch_heart();
            }
            _ => {}
        }
        SceneSignal::Pending
    }

    fn on_timer(&mut self, _event: TimerEvent, _ctx: &SceneContext) -> SceneSignal {
        SceneSignal::Pending
    }

    fn view(&self) -> SceneView {
        SceneView::Final(FinalView {
            phase: self.flow.phase(),
            postcards: self.finale.postcards.clone(),
            headline: self.finale.headline.clone(),
            body: self.finale.body.clone(),
            signoff: self.finale.signoff.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::context;

    #[test]
    fn test_flow_is_forward_only() {
        let mut flow = FinalMessageFlow::new();
        assert_eq!(flow.phase(), FinalPhase::Postcards);

        // Cannot skip the game
        assert!(!flow.catch_heart());
        assert_eq!(flow.phase(), FinalPhase::Postcards);

        assert!(flow.proceed_to_game());
        assert!(!flow.proceed_to_game());
        assert_eq!(flow.phase(), FinalPhase::Game);

        assert!(flow.catch_heart());
        assert_eq!(flow.phase(), FinalPhase::Final);

        assert!(!flow.proceed_to_game());
        assert!(!flow.catch_heart());
        assert_eq!(flow.phase(), FinalPhase::Final);
    }

    #[test]
    fn test_scene_never_completes() {
        let ctx = context(None);
        let mut scene = FinalMessageScene::new(&FinaleConfig::default());
        for action in [
            SceneAction::CatchHeart,
            SceneAction::Continue,
            SceneAction::CatchHeart,
            SceneAction::Continue,
        ] {
            assert_eq!(scene.handle(action, &ctx), SceneSignal::Pending);
        }
        assert_eq!(scene.phase(), FinalPhase::Final);
    }
}
