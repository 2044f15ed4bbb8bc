//! Self-animating radial particle

use glam::DVec2;
use rand::Rng;

use crate::point::Point;
use crate::stage::Drawable;
use crate::surface::{Color, Fill, RadialGradient, Rect, Surface};

/// A particle moving in a straight line at a constant per-frame step.
///
/// Parameters are sampled once at spawn and never change. Motion is applied
/// on every draw call, so speed is in pixels per frame rather than per second.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Point,
    /// Glow radius in pixels
    radius: f64,
    /// Heading, used directly as radians
    direction: f64,
    size: f64,
    /// Pixels per frame
    speed: f64,
    /// Opacity hint (0-99); carried but not applied when painting
    alpha: f64,
    color: Color,
}

impl Particle {
    /// Spawn a particle at `position` with randomized shape and color
    pub fn random<R: Rng>(position: Point, rng: &mut R) -> Self {
        let radius = f64::from(rng.random_range(10_u32..20));
        let direction = f64::from(rng.random_range(1_u32..360));
        let size = f64::from(rng.random_range(50_u32..150));
        let speed = f64::from(rng.random_range(1_u32..26));
        let alpha = f64::from(rng.random_range(0_u32..100));
        let color = Color::rgb(
            rng.random_range(0_u8..100),
            rng.random_range(0_u8..100),
            rng.random_range(0_u8..100),
        );

        Self {
            position,
            radius,
            direction,
            size,
            speed,
            alpha,
            color,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Displacement applied per frame
    pub fn velocity(&self) -> DVec2 {
        DVec2::new(self.direction.sin(), self.direction.cos()) * self.speed
    }

    /// Advance one frame
    pub fn step(&mut self) {
        self.position += self.velocity();
    }

    fn gradient(&self) -> RadialGradient {
        RadialGradient {
            center: self.position,
            radius: self.radius,
            inner: self.color,
            outer: Color::TRANSPARENT_WHITE,
        }
    }
}

impl Drawable for Particle {
    fn draw(&mut self, surface: &mut dyn Surface) {
        self.step();

        let rect = Rect::centered_square(self.position, self.radius);
        surface.fill_rect(rect, &Fill::Radial(self.gradient()));
    }
}
