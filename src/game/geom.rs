//! Geometry kernel: segment intersection and axis-aligned rectangles.
//!
//! All public angles are in degrees; radians appear only inside trig calls.
//! Degenerate inputs (parallel lines, zero-length segments) are treated as
//! "no intersection" rather than errors.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Axis-aligned rectangle, also the wire shape of a wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on a point
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Counter-clockwise orientation test. Strict inequality: collinear triples
/// count as not-ccw, so touching endpoints do not register as intersections.
#[inline]
fn ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether segments p1-p2 and p3-p4 properly intersect
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

/// Intersection point of segments p1-p2 and p3-p4.
///
/// Solves the parametric system; a zero determinant (parallel or collinear)
/// yields `None` with no special handling for collinear overlap.
pub fn segment_intersection(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let den = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if den == 0.0 {
        return None;
    }

    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / den;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / den;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(p1 + (p2 - p1) * ua)
    } else {
        None
    }
}

/// Intersection of a segment with a rectangle's edges.
///
/// Edges are tested in fixed order (top, right, bottom, left) and the first
/// hit wins; this is NOT the nearest hit. Callers that need the closest
/// intersection, like the laser sensor, compare distances themselves.
pub fn segment_rect_intersection(p1: Vec2, p2: Vec2, rect: &Rect) -> Option<Vec2> {
    let tl = Vec2::new(rect.x, rect.y);
    let tr = Vec2::new(rect.right(), rect.y);
    let br = Vec2::new(rect.right(), rect.bottom());
    let bl = Vec2::new(rect.x, rect.bottom());

    let edges = [(tl, tr), (tr, br), (br, bl), (bl, tl)];

    for (a, b) in edges {
        if let Some(hit) = segment_intersection(p1, p2, a, b) {
            return Some(hit);
        }
    }
    None
}

/// Normalize an absolute heading to [0, 360)
#[inline]
pub fn normalize_heading(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

/// Normalize a relative bearing to (-180, 180]
#[inline]
pub fn normalize_bearing(degrees: f32) -> f32 {
    let a = degrees.rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}
