//! Opening stage: particle bursts on click and while held

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{BasicStage, Stage};
use crate::consts::{PARTICLES_PER_CLICK, PARTICLES_PER_HOLD};
use crate::particle::Particle;
use crate::point::Point;
use crate::surface::Surface;

/// Spawns particles where the player clicks and, while the button is held,
/// at the tracked pointer position.
pub struct Opening {
    base: BasicStage,
    rng: Pcg32,
}

impl Opening {
    pub fn new(seed: u64) -> Self {
        Self::with_limit(seed, None)
    }

    pub fn with_limit(seed: u64, limit: Option<usize>) -> Self {
        Self {
            base: BasicStage::with_limit(limit),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn drawable_count(&self) -> usize {
        self.base.drawables.len()
    }

    pub fn mouse_position(&self) -> Point {
        self.base.mouse_position
    }

    fn spawn(&mut self, origin: Point, count: usize) {
        for _ in 0..count {
            let particle = Particle::random(origin, &mut self.rng);
            self.base.drawables.push(Box::new(particle));
        }
    }
}

impl Stage for Opening {
    fn name(&self) -> &str {
        "opening"
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        self.base.draw(surface);
    }

    fn on_mouse_down(&mut self, point: Point) {
        self.spawn(point, PARTICLES_PER_CLICK);
    }

    fn on_mouse_held_down(&mut self) {
        let origin = self.base.mouse_position;
        self.spawn(origin, PARTICLES_PER_HOLD);
    }

    fn on_mouse_move(&mut self, point: Point) {
        self.base.on_mouse_move(point);
    }
}
