//! Root session
//!
//! Owns everything that lives for the whole greeting: the sequencer, the
//! timer queue, the shared audio handle and the mounted scene. Actions and
//! timer events are handled one at a time, in order.

use crate::audio::{AudioBackend, AudioController, SharedAudio};
use crate::config::GreetingConfig;
use crate::scene::{self, Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::stage::{SceneSequencer, Stage};
use crate::timer::Scheduler;
use crate::Result;
use std::time::Duration;

/// One run of the greeting
pub struct Session {
    config: GreetingConfig,
    sequencer: SceneSequencer,
    ctx: SceneContext,
    scene: Box<dyn Scene>,
}

impl Session {
    /// Validate `config`, wrap `backend` as the shared track and mount the intro.
    pub fn new(config: GreetingConfig, backend: Box<dyn AudioBackend>) -> Result<Self> {
        Self::with_audio(config, AudioController::shared(backend))
    }

    /// Like [`new`](Self::new) with an already shared audio handle.
    pub fn with_audio(config: GreetingConfig, audio: SharedAudio) -> Result<Self> {
        config.validate()?;
        let sequencer = SceneSequencer::new();
        let ctx = SceneContext {
            scheduler: Scheduler::new(),
            audio,
        };
        let scene = scene::mount(sequencer.current(), &config, sequencer.lights_on(), &ctx);
        log::info!("greeting session started for {}", config.recipient);
        Ok(Session {
            config,
            sequencer,
            ctx,
            scene,
        })
    }

    /// Active stage
    pub fn stage(&self) -> Stage {
        self.sequencer.current()
    }

    /// Room lighting flag
    pub fn lights_on(&self) -> bool {
        self.sequencer.lights_on()
    }

    /// Shared audio handle
    pub fn audio(&self) -> &SharedAudio {
        &self.ctx.audio
    }

    /// Session timer queue
    pub fn scheduler(&self) -> &Scheduler {
        &self.ctx.scheduler
    }

    /// Effective configuration
    pub fn config(&self) -> &GreetingConfig {
        &self.config
    }

    /// Virtual time since the session started
    pub fn elapsed(&self) -> Duration {
        self.ctx.scheduler.now()
    }

    /// Render model of the mounted scene
    pub fn view(&self) -> SceneView {
        self.scene.view()
    }

    /// Whether background music is playing
    pub fn music_playing(&self) -> bool {
        self.ctx.audio.lock().is_playing()
    }

    /// The always-visible music button
    pub fn toggle_music(&mut self) {
        self.ctx.audio.lock().toggle();
    }

    /// Deliver a user action to the mounted scene
    pub fn perform(&mut self, action: SceneAction) {
        log::debug!("{} <- {:?}", self.stage(), action);
        let signal = self.scene.handle(action, &self.ctx);
        self.apply(signal);
    }

    /// Let `elapsed` pass: fire due timers one by one, then tick the audio.
    pub fn advance_time(&mut self, elapsed: Duration) {
        let until = self.ctx.scheduler.now() + elapsed;
        while let Some(event) = self.ctx.scheduler.pop_due(until) {
            log::debug!("{} timer {:?}", self.stage(), event);
            let signal = self.scene.on_timer(event, &self.ctx);
            self.apply(signal);
        }
        self.ctx.scheduler.settle(until);
        self.ctx.audio.lock().tick(elapsed);
    }

    fn apply(&mut self, signal: SceneSignal) {
        if signal != SceneSignal::Complete {
            return;
        }
        let leaving = self.sequencer.current();
        if self.sequencer.advance() {
            if leaving == Stage::Intro {
                // The party starts with music, even if the card was paused.
                self.ctx.audio.lock().set_playing(true);
            }
            // The old scene is dropped here, cancelling its timers.
            self.scene = scene::mount(
                self.sequencer.current(),
                &self.config,
                self.sequencer.lights_on(),
                &self.ctx,
            );
        }
    }

    /// End the session and release the audio handle.
    pub fn shutdown(self) {
        log::info!(
            "greeting session ended at {} after {:.1}s",
            self.stage(),
            self.elapsed().as_secs_f64()
        );
        self.ctx.audio.lock().release();
    }
}
