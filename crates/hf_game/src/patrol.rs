//! Enemy patrol: a reflecting back-and-forth walk along the horizontal axis.
//!
//! Each tick the enemy steps one unit in its heading and the signed travel
//! counter follows. When the counter's magnitude reaches `max_travel` the
//! heading flips, so the enemy sweeps between `-max_travel` and `+max_travel`
//! steps around its spawn column. Patrols ignore walls.

use rand::Rng;

use crate::animation::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolHeading {
    Left,
    Right,
}

impl PatrolHeading {
    pub fn sign(self) -> i32 {
        match self {
            PatrolHeading::Left => -1,
            PatrolHeading::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            PatrolHeading::Left => PatrolHeading::Right,
            PatrolHeading::Right => PatrolHeading::Left,
        }
    }

    pub fn facing(self) -> Facing {
        match self {
            PatrolHeading::Left => Facing::Left,
            PatrolHeading::Right => Facing::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patrol {
    pub heading: PatrolHeading,
    /// Signed steps away from the spawn point.
    pub travel: i32,
    pub max_travel: i32,
}

impl Patrol {
    pub fn new(heading: PatrolHeading, max_travel: i32) -> Self {
        Self {
            heading,
            travel: 0,
            max_travel: max_travel.max(1),
        }
    }

    /// Draws heading first, then `max_travel` from `min..=max`. The order of
    /// draws is part of the seeded replay contract.
    pub fn random(rng: &mut impl Rng, min_travel: i32, max_travel: i32) -> Self {
        let heading = if rng.gen_bool(0.5) {
            PatrolHeading::Left
        } else {
            PatrolHeading::Right
        };
        let max_travel = rng.gen_range(min_travel..=max_travel.max(min_travel));
        Self::new(heading, max_travel)
    }

    /// Advances one tick. Returns the signed unit step taken (-1 or +1).
    pub fn step(&mut self) -> i32 {
        let sign = self.heading.sign();
        self.travel += sign;
        if self.travel * sign >= self.max_travel {
            self.heading = self.heading.flipped();
        }
        sign
    }
}
