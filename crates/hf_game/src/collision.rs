//! Rectangle collision between a moving body and static obstacles.
//!
//! Resolution is **axis-separated**: the full delta is applied first, then the
//! moved rectangle is resolved on X and afterwards on Y. Each pass collects its
//! overlap set once, then corrects against the obstacles in iteration order.
//! Which side the body is pushed to comes from comparing centers at the moment
//! of each correction, so the last correction wins when two disagree. A body
//! moving vertically past a wall corner is nudged sideways by the X pass and
//! keeps going; inside corners can feel sticky.
//!
//! Overlap is strict: rectangles that only share an edge do not collide. Tiles
//! sit edge to edge on the grid, so anything else would make a player standing
//! next to a wall collide with it.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            center_x: top_left.x + size.x * 0.5,
            center_y: top_left.y + size.y * 0.5,
            half_w: size.x * 0.5,
            half_h: size.y * 0.5,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    pub fn width(&self) -> f32 {
        self.half_w * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_h * 2.0
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.top())
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            center_x: self.center_x + dx,
            center_y: self.center_y + dy,
            ..*self
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    /// A horizontal correction was applied.
    pub blocked_x: bool,
    /// A vertical correction was applied.
    pub blocked_y: bool,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Moves `aabb` by `(dx, dy)` and pushes the moved rectangle out of
/// `obstacles`, X first.
pub fn resolve_against_obstacles(
    aabb: Aabb,
    dx: f32,
    dy: f32,
    obstacles: &[Aabb],
) -> CollisionMoveResult {
    let moved = aabb.translated(dx, dy);
    let (after_x, blocked_x) = resolve_axis(moved, obstacles, Axis::X);
    let (after_y, blocked_y) = resolve_axis(after_x, obstacles, Axis::Y);
    CollisionMoveResult {
        aabb: after_y,
        blocked_x,
        blocked_y,
    }
}

fn resolve_axis(mut body: Aabb, obstacles: &[Aabb], axis: Axis) -> (Aabb, bool) {
    let hits: Vec<usize> = overlapping(&body, obstacles).collect();
    let mut corrected = false;
    for hit in hits.into_iter().map(|i| &obstacles[i]) {
        match axis {
            Axis::X => {
                if body.center_x < hit.center_x {
                    body.center_x = hit.left() - body.half_w;
                    corrected = true;
                } else if body.center_x > hit.center_x {
                    body.center_x = hit.right() + body.half_w;
                    corrected = true;
                }
            }
            Axis::Y => {
                if body.center_y < hit.center_y {
                    body.center_y = hit.top() - body.half_h;
                    corrected = true;
                } else if body.center_y > hit.center_y {
                    body.center_y = hit.bottom() + body.half_h;
                    corrected = true;
                }
            }
        }
    }
    (body, corrected)
}

/// Indices of every rectangle in `others` that overlaps `aabb`.
pub fn overlapping<'a>(aabb: &'a Aabb, others: &'a [Aabb]) -> impl Iterator<Item = usize> + 'a {
    others
        .iter()
        .enumerate()
        .filter(move |(_, other)| aabb.overlaps(other))
        .map(|(i, _)| i)
}
