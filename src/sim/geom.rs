//! Axis-aligned boxes and segment intersection
//!
//! Screen-space convention: +x right, +y down. Rects are anchored at their
//! top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Strict point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    /// The four edges as segments: top, bottom, left, right
    fn edges(&self) -> [(Vec2, Vec2); 4] {
        let tl = self.pos;
        let tr = Vec2::new(self.right(), self.top());
        let bl = Vec2::new(self.left(), self.bottom());
        let br = Vec2::new(self.right(), self.bottom());
        [(tl, tr), (bl, br), (tl, bl), (tr, br)]
    }
}

/// Intersect segment `a0→a1` with segment `b0→b1`
///
/// Returns the parameter `t ∈ [0, 1]` along `a` of the crossing point, or
/// `None` for disjoint or parallel segments.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<f32> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = db.y * da.x - db.x * da.y;
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let offset = a0 - b0;
    let ta = (db.x * offset.y - db.y * offset.x) / denom;
    let tb = (da.x * offset.y - da.y * offset.x) / denom;
    if (0.0..=1.0).contains(&ta) && (0.0..=1.0).contains(&tb) {
        Some(ta)
    } else {
        None
    }
}

/// Nearest crossing of segment `a0→a1` with any edge of `rect`
///
/// Returns the parameter along the segment. A segment lying entirely inside
/// the rect crosses no edge and yields `None`.
pub fn segment_rect_intersection(a0: Vec2, a1: Vec2, rect: &Rect) -> Option<f32> {
    rect.edges()
        .iter()
        .filter_map(|&(b0, b1)| segment_intersection(a0, a1, b0, b1))
        .min_by(|x, y| x.total_cmp(y))
}

/// Whether segment `a0→a1` touches `rect` at all
pub fn segment_hits_rect(a0: Vec2, a1: Vec2, rect: &Rect) -> bool {
    rect.contains(a0) || rect.contains(a1) || segment_rect_intersection(a0, a1, rect).is_some()
}

/// Cast a ray of length `max_len` from `origin` along `dir` (unit vector),
/// stopping at the nearest obstacle. Returns the far endpoint.
pub fn clip_ray<'a>(
    origin: Vec2,
    dir: Vec2,
    max_len: f32,
    obstacles: impl IntoIterator<Item = &'a Rect>,
) -> Vec2 {
    let far = origin + dir * max_len;
    let t = obstacles
        .into_iter()
        .filter_map(|r| segment_rect_intersection(origin, far, r))
        .fold(1.0_f32, f32::min);
    origin + (far - origin) * t
}
