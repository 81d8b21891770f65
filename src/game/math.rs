//! Deterministic fixed-point math shared by the steering core.
//!
//! Every position, cost and timer the steering manager touches is a
//! [`FixedNum`], so two simulations fed the same inputs and seed produce
//! identical routes and movement vectors on any platform.

use bevy::prelude::*;
use fixed::types::I48F16;
use serde::{Deserialize, Serialize};

/// Fixed-point scalar: 48 integer bits, 16 fractional bits.
pub type FixedNum = I48F16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };
    pub const UNIT_X: Self = Self { x: FixedNum::ONE, y: FixedNum::ZERO };
    pub const UNIT_Y: Self = Self { x: FixedNum::ZERO, y: FixedNum::ONE };

    pub fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub fn from_f32(x: f32, y: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_num(), self.y.to_num())
    }

    pub fn length(self) -> FixedNum {
        let len_sq = self.length_squared();
        if len_sq == FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        len_sq.sqrt()
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (other - self).length()
    }

    pub fn distance_squared(self, other: Self) -> FixedNum {
        (other - self).length_squared()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == FixedNum::ZERO {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    /// Counter-clockwise perpendicular.
    pub fn perp(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Self) -> FixedNum {
        self.x * other.y - self.y * other.x
    }

    /// Shrinks the vector to `max_len` if it is longer.
    pub fn clamp_length(self, max_len: FixedNum) -> Self {
        if self.length_squared() > max_len * max_len {
            self.normalize() * max_len
        } else {
            self
        }
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for FixedVec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}

/// Linear interpolation between `a` and `b`; `t` is not clamped.
pub fn lerp(a: FixedNum, b: FixedNum, t: FixedNum) -> FixedNum {
    a + (b - a) * t
}

/// Clamp to [0, 1].
pub fn saturate(t: FixedNum) -> FixedNum {
    t.clamp(FixedNum::ZERO, FixedNum::ONE)
}

/// -1, 0 or 1.
pub fn sign(value: FixedNum) -> FixedNum {
    if value > FixedNum::ZERO {
        FixedNum::ONE
    } else if value < FixedNum::ZERO {
        -FixedNum::ONE
    } else {
        FixedNum::ZERO
    }
}

/// Shorthand for literal tuning constants.
#[inline]
pub fn fx(value: f32) -> FixedNum {
    FixedNum::from_num(value)
}
