//! 2D point in surface space

use std::ops::{AddAssign, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A mutable 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Copy both coordinates from another point
    pub fn set(&mut self, other: Point) {
        self.x = other.x;
        self.y = other.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign<DVec2> for Point {
    fn add_assign(&mut self, delta: DVec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        DVec2::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_copies_both_coordinates() {
        let mut p = Point::new(1.0, 2.0);
        p.set(Point::new(-4.5, 9.0));
        assert_eq!(p, Point::new(-4.5, 9.0));
    }

    #[test]
    fn test_sub_and_translate() {
        let mut p = Point::new(30.0, 40.0) - Point::new(10.0, 5.0);
        assert_eq!(p, Point::new(20.0, 35.0));
        p += DVec2::new(0.5, -1.0);
        assert_eq!((p.x(), p.y()), (20.5, 34.0));
    }
}
