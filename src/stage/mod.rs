//! Stages: swappable containers of drawables that receive input
//!
//! A stage is the single observer the input dispatcher forwards to. Every
//! handler has a default, so a concrete stage overrides only what it needs.

pub mod draw_list;
pub mod opening;

pub use draw_list::{DrawList, RenderDepth};
pub use opening::Opening;

use std::cell::RefCell;
use std::rc::Rc;

use crate::input::{KeyInput, ResizeInput};
use crate::point::Point;
use crate::surface::Surface;

/// Anything that can paint itself onto a surface.
///
/// Drawing takes `&mut self` because entities may animate as they draw.
pub trait Drawable {
    fn draw(&mut self, surface: &mut dyn Surface);
}

/// Shared handle to a stage. The game loop owns the list; the dispatcher
/// holds a clone of whichever one is active.
pub type StageRef = Rc<RefCell<dyn Stage>>;

/// Wrap a concrete stage in a [`StageRef`]
pub fn stage_ref<S: Stage + 'static>(stage: S) -> StageRef {
    Rc::new(RefCell::new(stage))
}

/// Scene-like container that the renderer draws and the dispatcher feeds.
pub trait Stage {
    fn name(&self) -> &str {
        "stage"
    }

    fn draw(&mut self, surface: &mut dyn Surface);

    fn on_mouse_down(&mut self, point: Point) {
        log::debug!("{} received mouse down at ({}, {})", self.name(), point.x, point.y);
    }

    /// Fired repeatedly while the button stays down
    fn on_mouse_held_down(&mut self) {
        log::debug!("{} received mouse held down", self.name());
    }

    fn on_mouse_up(&mut self, _point: Point) {}

    fn on_mouse_move(&mut self, _point: Point) {}

    fn on_key_press(&mut self, _event: &KeyInput) {}

    fn on_window_resize(&mut self, _event: &ResizeInput) {}
}

/// The plain stage: a draw list plus the last pointer position.
pub struct BasicStage {
    pub drawables: DrawList,
    pub mouse_position: Point,
}

impl Default for BasicStage {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicStage {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            drawables: DrawList::with_limit(limit),
            mouse_position: Point::ORIGIN,
        }
    }
}

impl Stage for BasicStage {
    fn draw(&mut self, surface: &mut dyn Surface) {
        self.drawables.draw(surface);
    }

    fn on_mouse_move(&mut self, point: Point) {
        self.mouse_position = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_basic_stage_tracks_mouse_and_ignores_clicks() {
        let mut stage = BasicStage::new();
        stage.on_mouse_move(Point::new(12.0, 34.0));
        stage.on_mouse_down(Point::new(1.0, 1.0));
        stage.on_mouse_held_down();
        assert_eq!(stage.mouse_position, Point::new(12.0, 34.0));
        assert!(stage.drawables.is_empty());
    }

    #[test]
    fn test_stage_ref_dispatches_through_trait_object() {
        let stage = stage_ref(BasicStage::new());
        stage.borrow_mut().on_mouse_move(Point::new(3.0, 4.0));
        let log = RecordingSurface::new();
        let mut surface = log.clone();
        stage.borrow_mut().draw(&mut surface);
        assert!(log.commands().is_empty());
        assert_eq!(stage.borrow().name(), "stage");
    }
}
