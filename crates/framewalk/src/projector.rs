//! Projection of a composed matrix onto screen-space boxes, corners and angles.

use crate::geom::{Point, point};
use crate::matrix::Matrix;
use serde::{Serialize, Serializer};
use std::f64::consts::PI;

/// Orientation of a projected quad in Y-down screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

/// A projected element box.
///
/// `left/top/right/bottom` are absolute; corners and origin are relative to `(left, top)`.
/// Corners follow local order: `pos1 = (0, 0)`, `pos2 = (w, 0)`, `pos3 = (0, h)`,
/// `pos4 = (w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub origin: Point,
    pub pos1: Point,
    pub pos2: Point,
    pub pos3: Point,
    pub pos4: Point,
    pub direction: Direction,
}

impl Default for ProjectedBox {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            origin: Point::zero(),
            pos1: Point::zero(),
            pos2: Point::zero(),
            pos3: Point::zero(),
            pos4: Point::zero(),
            direction: Direction::Clockwise,
        }
    }
}

impl ProjectedBox {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn corners(&self) -> [Point; 4] {
        [self.pos1, self.pos2, self.pos3, self.pos4]
    }

    /// Corners translated back to absolute coordinates.
    pub fn absolute_corners(&self) -> [Point; 4] {
        let shift = point(self.left, self.top).to_vector();
        self.corners().map(|p| p + shift)
    }

    /// Rotation of the `pos1 → pos2` edge, see [`rotation_rad`].
    pub fn rotation_rad(&self) -> f64 {
        rotation_rad(self.pos1, self.pos2, self.direction)
    }
}

/// The four local corners `(0,0), (w,0), (0,h), (w,h)` mapped through `matrix`.
pub fn corner_points(matrix: &Matrix, width: f64, height: f64) -> [Point; 4] {
    [
        point(0.0, 0.0),
        point(width, 0.0),
        point(0.0, height),
        point(width, height),
    ]
    .map(|p| matrix.transform_point(p))
}

/// Winding of corners given in local order. Degenerate quads count as clockwise.
pub fn shape_direction(corners: &[Point; 4]) -> Direction {
    // Perimeter order is pos1, pos2, pos4, pos3.
    let ring = [corners[0], corners[1], corners[3], corners[2]];
    let mut area = 0.0;
    for i in 0..4 {
        let a = ring[i];
        let b = ring[(i + 1) % 4];
        area += a.x * b.y - b.x * a.y;
    }
    if area < 0.0 {
        Direction::CounterClockwise
    } else {
        Direction::Clockwise
    }
}

fn rebase(v: f64, base: f64) -> f64 {
    let d = v - base;
    // Also folds -0 and NaN.
    if d == 0.0 || d.is_nan() { 0.0 } else { d }
}

pub fn project(matrix: &Matrix, origin: Point, width: f64, height: f64) -> ProjectedBox {
    let corners = corner_points(matrix, width, height);
    let projected_origin = matrix.transform_point(origin);
    let (mut left, mut top) = (f64::INFINITY, f64::INFINITY);
    let (mut right, mut bottom) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in &corners {
        left = left.min(p.x);
        top = top.min(p.y);
        right = right.max(p.x);
        bottom = bottom.max(p.y);
    }
    let rel = |p: Point| point(rebase(p.x, left), rebase(p.y, top));

    ProjectedBox {
        left,
        top,
        right,
        bottom,
        origin: rel(projected_origin),
        pos1: rel(corners[0]),
        pos2: rel(corners[1]),
        pos3: rel(corners[2]),
        pos4: rel(corners[3]),
        direction: shape_direction(&corners),
    }
}

/// Angle of `from → to` in `[0, 2π)`, Y-down.
pub fn rad_between(from: Point, to: Point) -> f64 {
    let rad = (to.y - from.y).atan2(to.x - from.x);
    if rad >= 0.0 { rad } else { rad + PI * 2.0 }
}

/// Rotation of an element from its first two projected corners.
///
/// A mirrored element has its first edge reversed, so the corners are swapped to keep the
/// angle continuous across flips.
pub fn rotation_rad(pos1: Point, pos2: Point, direction: Direction) -> f64 {
    match direction {
        Direction::Clockwise => rad_between(pos1, pos2),
        Direction::CounterClockwise => rad_between(pos2, pos1),
    }
}

/// Rotation in degrees in `[0, 360)`, mirrored for counter-clockwise quads.
pub fn absolute_rotation_deg(pos1: Point, pos2: Point, direction: Direction) -> f64 {
    let mut deg = rad_between(pos1, pos2).to_degrees();
    if direction == Direction::CounterClockwise {
        deg = 180.0 - deg;
    }
    if deg >= 0.0 { deg } else { 360.0 + deg }
}

/// Maps a point back through `matrix`; `None` when the matrix is singular.
pub fn inverse_position(matrix: &Matrix, p: Point) -> Option<Point> {
    matrix.inverse().map(|inv| inv.transform_point(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::vector;
    use crate::matrix::Dimension;

    #[test]
    fn identity_projection_is_the_plain_box() {
        let b = project(&Matrix::identity(Dimension::Planar), point(50.0, 25.0), 100.0, 50.0);
        assert_eq!((b.left, b.top, b.right, b.bottom), (0.0, 0.0, 100.0, 50.0));
        assert_eq!(b.pos4, point(100.0, 50.0));
        assert_eq!(b.origin, point(50.0, 25.0));
        assert_eq!(b.direction, Direction::Clockwise);
    }

    #[test]
    fn horizontal_flip_is_counter_clockwise() {
        let flip = Matrix::scale(Dimension::Planar, -1.0, 1.0);
        let b = project(&flip, Point::zero(), 100.0, 50.0);
        assert_eq!(b.direction, Direction::CounterClockwise);
        assert_eq!(b.left, -100.0);
        assert_eq!(b.pos1, point(100.0, 0.0));
        // The flipped element still reads as unrotated.
        assert!(b.rotation_rad().abs() < 1e-9);
    }

    #[test]
    fn far_corners_keep_the_exact_maximum() {
        // x spans [-1e17, 1]; `left + (max - left)` would round `right` to 0.
        let skew = Matrix::from_affine(1.0, 0.0, -1e17, 1.0, 0.0, 0.0);
        let b = project(&skew, Point::zero(), 1.0, 1.0);
        assert_eq!(b.left, -1e17);
        assert_eq!(b.right, 1.0);
        assert_eq!(b.bottom, 1.0);
    }

    #[test]
    fn negative_zero_is_normalized() {
        let m = Matrix::translation(Dimension::Planar, vector(-0.0, -0.0));
        let b = project(&m, Point::zero(), 0.0, 0.0);
        assert!(b.pos1.x.is_sign_positive());
        assert!(b.origin.y.is_sign_positive());
    }

    #[test]
    fn absolute_rotation_wraps_into_positive_degrees() {
        let deg = absolute_rotation_deg(point(0.0, 0.0), point(0.0, -10.0), Direction::Clockwise);
        assert!((deg - 270.0).abs() < 1e-9);
    }
}
