//! Photo gallery
//!
//! Leaving the last photo stops the background track through the shared
//! handle before the gallery completes.

use super::{Completion, Scene, SceneAction, SceneContext, SceneSignal, SceneView};
use crate::audio::SharedAudio;
use crate::config::GalleryConfig;
use crate::stage::Stage;
use crate::timer::TimerEvent;

/// Render model of the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    /// Caption of the photo on screen
    pub caption: String,
    /// Its index
    pub index: usize,
    /// Number of photos
    pub total: usize,
}

/// Stage 3
pub struct GalleryScene {
    photos: Vec<String>,
    index: usize,
    audio: SharedAudio,
    completion: Completion,
}

impl GalleryScene {
    /// Mount on the first photo
    pub fn new(config: &GalleryConfig, ctx: &SceneContext) -> Self {
        Self {
            photos: config.photos.clone(),
            index: 0,
            audio: ctx.audio.clone(),
            completion: Completion::default(),
        }
    }

    fn stop_background_music(&self) {
        log::info!("gallery finished, stopping background music");
        self.audio.lock().set_playing(false);
    }
}

impl Scene for GalleryScene {
    fn stage(&self) -> Stage {
        Stage::PhotoGallery
    }

    fn handle(&mut self, action: SceneAction, _ctx: &SceneContext) -> SceneSignal {
        match action {
            SceneAction::Forward | SceneAction::Continue => {
                if self.index + 1 < self.photos.len() {
                    self.index += 1;
                } else if !self.completion.is_fired() {
                    self.stop_background_music();
                    return self.completion.fire();
                }
            }
            SceneAction::Back => self.index = self.index.saturating_sub(1),
            _ => {}
        }
        SceneSignal::Pending
    }

    fn on_timer(&mut self, _event: TimerEvent, _ctx: &SceneContext) -> SceneSignal {
        SceneSignal::Pending
    }

    fn view(&self) -> SceneView {
        SceneView::Gallery(GalleryView {
            caption: self.photos.get(self.index).cloned().unwrap_or_default(),
            index: self.index,
            total: self.photos.len(),
        })
    }
}
