//! Planar geometry used by the collision resolver.
//!
//! Coordinates are pixels with the origin at the top-left of the level and
//! `y` growing downwards, matching cell placement `x = col * CELL_SIZE`,
//! `y = row * CELL_SIZE`.

/// A point in level space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate in pixels.
    pub x: f32,
    /// Vertical coordinate in pixels.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        distance(*self, other)
    }
}

/// A line segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
}

impl Line {
    /// Creates a segment from raw coordinates.
    pub fn new(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            start: Point::new(ax, ay),
            end: Point::new(bx, by),
        }
    }
}

/// A circle, used as the bounding shape of every moving entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Centre of the circle.
    pub center: Point,
    /// Radius in pixels.
    pub radius: f32,
}

impl Circle {
    /// Creates a circle centred at `(x, y)`.
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Point::new(x, y),
            radius,
        }
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Tests whether a circle crosses the interior of a segment.
///
/// The segment is parametrised as `P(t) = A + t(B - A)` after translating the
/// circle centre to the origin, and `|P(t)| = r` is solved for `t`.
///
/// # Returns
/// `true` only when the discriminant is strictly positive and at least one
/// root lies in the open interval `(0, 1)`. Tangency and intersections at the
/// endpoints count as no collision, which lets an entity rest flush against a
/// wall without being flagged.
pub fn segment_intersects_circle(line: &Line, circle: &Circle) -> bool {
    let ax = line.start.x - circle.center.x;
    let ay = line.start.y - circle.center.y;
    let bx = line.end.x - circle.center.x;
    let by = line.end.y - circle.center.y;

    let dx = bx - ax;
    let dy = by - ay;
    let a = dx * dx + dy * dy;
    let b = 2.0 * (ax * dx + ay * dy);
    let c = ax * ax + ay * ay - circle.radius * circle.radius;

    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 || a == 0.0 {
        return false;
    }

    let sqrt_disc = disc.sqrt();
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    let t2 = (-b - sqrt_disc) / (2.0 * a);

    (0.0 < t1 && t1 < 1.0) || (0.0 < t2 && t2 < 1.0)
}
