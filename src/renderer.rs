//! Frame renderer
//!
//! Full redraw every tick: clear, optional debug overlay, then the stage.

use crate::consts::{FPS_OVERLAY_X, FPS_OVERLAY_Y};
use crate::game::GameMode;
use crate::stage::Stage;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw one frame of `stage`. The FPS overlay only appears in debug mode
    /// once a rate is known.
    pub fn render_frame(
        &self,
        mode: GameMode,
        surface: &mut dyn Surface,
        stage: &mut dyn Stage,
        fps: Option<u32>,
    ) {
        surface.clear();

        if mode == GameMode::Debug {
            if let Some(fps) = fps {
                surface.fill_text(&format!("FPS:{fps}"), FPS_OVERLAY_X, FPS_OVERLAY_Y);
            }
        }

        stage.draw(surface);
    }
}
