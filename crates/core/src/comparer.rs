//! Float comparisons with a fixed tolerance band.
//!
//! Belief values drift by tiny amounts as moves are stacked (`0.1 + 0.1 + 0.1`),
//! so every boundary check goes through a [`FloatComparer`] instead of raw
//! operators. The non-strict variants include the epsilon band, the strict ones
//! exclude it.

pub const DEFAULT_EPSILON: f32 = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatComparer {
    epsilon: f32,
}

impl Default for FloatComparer {
    fn default() -> Self {
        Self { epsilon: DEFAULT_EPSILON }
    }
}

impl FloatComparer {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn equal(&self, a: f32, b: f32) -> bool {
        (a - b).abs() <= self.epsilon
    }

    pub fn greater_than(&self, a: f32, b: f32) -> bool {
        a - b > self.epsilon
    }

    pub fn less_than(&self, a: f32, b: f32) -> bool {
        b - a > self.epsilon
    }

    pub fn greater_or_equal(&self, a: f32, b: f32) -> bool {
        self.greater_than(a, b) || self.equal(a, b)
    }

    pub fn less_or_equal(&self, a: f32, b: f32) -> bool {
        self.less_than(a, b) || self.equal(a, b)
    }
}
