use core::cmp;
use core::fmt;

use crate::error::{GridError, Result};

/// An immutable half-open integer interval `[start, end)`.
///
/// Used for visible-row tracking, selection spans, focused column spans and data-availability
/// windows. Every operation returns a new value.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    start: usize,
    end: usize,
}

impl Range {
    /// Creates `[start, end)`, rejecting `end < start`.
    pub fn between(start: usize, end: usize) -> Result<Self> {
        if end < start {
            return Err(GridError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn with_length(start: usize, length: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(length),
        }
    }

    pub const fn empty_at(start: usize) -> Self {
        Self { start, end: start }
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Two ranges intersect when they share at least one index. Empty ranges never intersect.
    pub const fn intersects(&self, other: &Range) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    pub const fn is_subset_of(&self, other: &Range) -> bool {
        self.is_empty() || (other.start <= self.start && self.end <= other.end)
    }

    /// Shifts the range by `delta`, saturating at zero.
    pub fn offset_by(&self, delta: isize) -> Range {
        let shift = |v: usize| {
            if delta >= 0 {
                v.saturating_add(delta as usize)
            } else {
                v.saturating_sub(delta.unsigned_abs())
            }
        };
        Range {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    /// Grows the range by `before` at the start and `after` at the end.
    pub fn expand(&self, before: usize, after: usize) -> Range {
        Range {
            start: self.start.saturating_sub(before),
            end: self.end.saturating_add(after),
        }
    }

    /// Clamps this range into `bounds`. The result may be empty.
    pub fn restrict_to(&self, bounds: &Range) -> Range {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(start, bounds.end);
        Range { start, end }
    }

    /// Returns the smallest range covering both, or `None` if they neither touch nor overlap.
    pub fn combine_with(&self, other: &Range) -> Option<Range> {
        if self.is_empty() {
            return Some(*other);
        }
        if other.is_empty() {
            return Some(*self);
        }
        if self.start > other.end || other.start > self.end {
            return None;
        }
        Some(Range {
            start: cmp::min(self.start, other.start),
            end: cmp::max(self.end, other.end),
        })
    }

    /// Splits this range into the parts `(before, inside, after)` relative to `other`.
    pub fn partition_with(&self, other: &Range) -> [Range; 3] {
        let before_end = cmp::min(self.end, other.start).max(self.start);
        let after_start = cmp::max(self.start, other.end).min(self.end);
        let inside_start = before_end;
        let inside_end = after_start.max(inside_start);
        [
            Range {
                start: self.start,
                end: before_end,
            },
            Range {
                start: inside_start,
                end: inside_end,
            },
            Range {
                start: inside_end.max(after_start),
                end: self.end,
            },
        ]
    }

    pub fn iter(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<Range> for core::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

impl IntoIterator for Range {
    type Item = usize;
    type IntoIter = core::ops::Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}
