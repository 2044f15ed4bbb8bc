//! Immediate-mode 2D drawing surface
//!
//! The engine only needs four primitives: clear, fill a rectangle (solid or
//! radial gradient), and draw text. The browser canvas implements this in
//! `platform::web`; [`RecordingSurface`] captures commands for headless runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::point::Point;

/// An RGBA color. Channels are 0-255, alpha is 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Fully transparent white, the outer stop of particle gradients
    pub const TRANSPARENT_WHITE: Color = Color::rgba(255, 255, 255, 0.0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// CSS color syntax, usable directly as a canvas fill style
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Square of side `2 * half` centered on `center`
    pub fn centered_square(center: Point, half: f64) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }
}

/// Two-stop radial gradient from `inner` at the center to `outer` at `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub radius: f64,
    pub inner: Color,
    pub outer: Color,
}

/// Fill style for rectangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    Radial(RadialGradient),
}

/// A 2D paint target.
///
/// Implementations are infallible from the caller's point of view; a backend
/// that can fail logs and drops the command.
pub trait Surface {
    /// Wipe the whole surface
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, fill: &Fill);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

/// A captured drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect { rect: Rect, fill: Fill },
    FillText { text: String, x: f64, y: f64 },
}

/// Surface that records every call instead of painting.
///
/// Clones share the same log, so a caller can keep a handle while the game
/// loop owns the boxed surface.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    /// Commands issued since the most recent clear
    pub fn current_frame(&self) -> Vec<DrawCommand> {
        let commands = self.commands.borrow();
        let start = commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        commands[start..].to_vec()
    }

    pub fn clear_count(&self) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| **c == DrawCommand::Clear)
            .count()
    }

    pub fn reset(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.borrow_mut().push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        self.commands
            .borrow_mut()
            .push(DrawCommand::FillRect { rect, fill: *fill });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.borrow_mut().push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css_format() {
        assert_eq!(Color::rgb(12, 0, 99).to_string(), "rgb(12,0,99)");
        assert_eq!(Color::TRANSPARENT_WHITE.to_string(), "rgba(255,255,255,0)");
    }

    #[test]
    fn test_centered_square() {
        let rect = Rect::centered_square(Point::new(50.0, 60.0), 10.0);
        assert_eq!(rect, Rect::new(40.0, 50.0, 20.0, 20.0));
    }

    #[test]
    fn test_recording_surface_shares_log_between_clones() {
        let handle = RecordingSurface::new();
        let mut surface: Box<dyn Surface> = Box::new(handle.clone());
        surface.clear();
        surface.fill_text("hi", 1.0, 2.0);
        surface.clear();
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &Fill::Solid(Color::BLACK));

        assert_eq!(handle.commands().len(), 4);
        assert_eq!(handle.clear_count(), 2);
        assert_eq!(handle.current_frame().len(), 1);

        handle.reset();
        assert!(handle.commands().is_empty());
    }
}
