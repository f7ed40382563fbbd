/// An eased scroll animation between two body positions.
///
/// Both axes share one clock and one easing curve, so a tween to a cell arrives at the row and
/// the column in the same frame. Tweens are driven by the adapter's clock: sample them with the
/// current time each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from_top: u64,
    pub to_top: u64,
    pub from_left: f64,
    pub to_left: f64,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    /// A tween that only moves the vertical offset. Zero durations are bumped to one millisecond.
    pub fn vertical(from: u64, to: u64, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from_top: from,
            to_top: to,
            from_left: 0.0,
            to_left: 0.0,
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    pub fn with_left(mut self, from: f64, to: f64) -> Self {
        self.from_left = from;
        self.to_left = to;
        self
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let t = (elapsed as f64 / self.duration_ms as f64).clamp(0.0, 1.0);
        self.easing.sample(t)
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.duration_ms
            .saturating_sub(now_ms.saturating_sub(self.start_ms))
    }

    /// Returns `(top, left)` at `now_ms`. A finished tween lands exactly on its target.
    pub fn sample(&self, now_ms: u64) -> (u64, f64) {
        if self.is_done(now_ms) {
            return (self.to_top, self.to_left);
        }
        let p = self.progress(now_ms);
        let top = self.from_top as f64 + (self.to_top as f64 - self.from_top as f64) * p;
        let left = self.from_left + (self.to_left - self.from_left) * p;
        (top.max(0.0) as u64, left.max(0.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseInOutCubic,
    EaseOutCubic,
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t * t * t,
            Self::EaseInOutCubic => {
                let u = 2.0 - 2.0 * t;
                1.0 - u * u * u / 2.0
            }
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}
