//! Scene implementations
//!
//! Exactly one scene is mounted at a time. A scene reacts to user
//! [`SceneAction`]s and to the [`TimerEvent`]s it scheduled itself, and
//! reports [`SceneSignal::Complete`] at most once when its narrative ends.
//! Front ends only ever see the read-only [`SceneView`].

pub mod cake;
pub mod final_message;
pub mod gallery;
pub mod intro;
pub mod room;
pub mod song_card;

pub use cake::{CakeScene, CakeView};
pub use final_message::{FinalMessageFlow, FinalMessageScene, FinalPhase, FinalView};
pub use gallery::{GalleryScene, GalleryView};
pub use intro::{IntroMessageCycle, IntroScene, IntroView};
pub use room::{RoomScene, RoomView};
pub use song_card::{CardState, SongCardView, SongChoiceCard};

use crate::audio::SharedAudio;
use crate::config::GreetingConfig;
use crate::stage::Stage;
use crate::timer::{Scheduler, TimerEvent};

/// User input, already mapped from keys or clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAction {
    /// Press the n-th intro action button
    Choose(usize),
    /// Play/pause on the song card
    TogglePlay,
    /// Skip backward / previous photo
    Back,
    /// Skip forward / next photo
    Forward,
    /// Generic "continue" button of the current scene
    Continue,
    /// Blow out a candle
    BlowCandles,
    /// Click the bouncing heart
    CatchHeart,
}

/// Result of handling an action or timer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneSignal {
    /// Scene keeps running
    Pending,
    /// Scene narrative finished; advance the sequencer
    Complete,
}

/// Session resources a scene may use
#[derive(Clone)]
pub struct SceneContext {
    /// Timer queue of the session
    pub scheduler: Scheduler,
    /// The single background audio handle
    pub audio: SharedAudio,
}

/// Snapshot of the mounted scene for rendering
#[derive(Debug, Clone, PartialEq)]
pub enum SceneView {
    /// Intro message card (possibly with action buttons)
    Intro(IntroView),
    /// Song-choice card
    SongCard(SongCardView),
    /// Room reveal
    Room(RoomView),
    /// Cake ceremony
    Cake(CakeView),
    /// Photo gallery
    Gallery(GalleryView),
    /// Final message flow
    Final(FinalView),
}

/// One full-screen unit of the greeting
pub trait Scene {
    /// Stage this scene implements
    fn stage(&self) -> Stage;

    /// React to user input
    fn handle(&mut self, action: SceneAction, ctx: &SceneContext) -> SceneSignal;

    /// React to one of this scene's timers
    fn on_timer(&mut self, event: TimerEvent, ctx: &SceneContext) -> SceneSignal;

    /// Render model
    fn view(&self) -> SceneView;
}

/// One-shot completion latch shared by all scenes
#[derive(Debug, Default)]
pub(crate) struct Completion {
    fired: bool,
}

impl Completion {
    /// `Complete` the first time, `Pending` afterwards
    pub(crate) fn fire(&mut self) -> SceneSignal {
        if self.fired {
            SceneSignal::Pending
        } else {
            self.fired = true;
            SceneSignal::Complete
        }
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.fired
    }
}

/// Build the scene for `stage`, scheduling its initial timers.
pub fn mount(
    stage: Stage,
    config: &GreetingConfig,
    lights_on: bool,
    ctx: &SceneContext,
) -> Box<dyn Scene> {
    log::debug!("mounting {stage} scene");
    match stage {
        Stage::Intro => Box::new(IntroScene::new(&config.intro, &config.song, ctx)),
        Stage::Room => Box::new(RoomScene::new(&config.room, lights_on, ctx)),
        Stage::CakeCeremony => Box::new(CakeScene::new(&config.cake)),
        Stage::PhotoGallery => Box::new(GalleryScene::new(&config.gallery, ctx)),
        Stage::FinalMessage => Box::new(FinalMessageScene::new(&config.finale)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Scene, SceneContext, SceneSignal};
    use crate::audio::{AudioController, SilentBackend};
    use crate::timer::Scheduler;
    use std::time::Duration;

    pub fn context(track_secs: Option<u64>) -> SceneContext {
        SceneContext {
            scheduler: Scheduler::new(),
            audio: AudioController::shared(Box::new(SilentBackend::new(
                track_secs.map(Duration::from_secs),
            ))),
        }
    }

    /// Deliver every timer due within `elapsed` to `scene`, in order.
    /// Returns how many times the scene reported completion.
    pub fn run(scene: &mut dyn Scene, ctx: &SceneContext, elapsed: Duration) -> usize {
        let until = ctx.scheduler.now() + elapsed;
        let mut completions = 0;
        while let Some(event) = ctx.scheduler.pop_due(until) {
            if scene.on_timer(event, ctx) == SceneSignal::Complete {
                completions += 1;
            }
        }
        ctx.scheduler.settle(until);
        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_latches() {
        let mut completion = Completion::default();
        assert!(!completion.is_fired());
        assert_eq!(completion.fire(), SceneSignal::Complete);
        assert_eq!(completion.fire(), SceneSignal::Pending);
        assert!(completion.is_fired());
    }

    #[test]
    fn test_mount_matches_stage() {
        let ctx = test_support::context(Some(60));
        let config = GreetingConfig::default();
        for stage in Stage::ALL {
            assert_eq!(mount(stage, &config, true, &ctx).stage(), stage);
        }
    }
}
