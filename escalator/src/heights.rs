//! Body row geometry.
//!
//! Every row is `default` pixels tall unless it was given an explicit height. Only the explicit
//! rows are stored, so memory and structural edits scale with the number of explicit rows, not
//! with the row count.

use alloc::vec::Vec;

/// Row heights as a default plus sparse per-row overrides.
#[derive(Clone, Debug)]
pub(crate) struct RowHeights {
    count: usize,
    default: u32,
    /// Row indices with an explicit height, ascending.
    rows: Vec<usize>,
    /// Explicit heights, parallel to `rows`.
    heights: Vec<u32>,
    sums: ExplicitSums,
}

impl RowHeights {
    pub(crate) fn new(default: u32) -> Self {
        Self {
            count: 0,
            default,
            rows: Vec::new(),
            heights: Vec::new(),
            sums: ExplicitSums::default(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn explicit_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn default_height(&self) -> u32 {
        self.default
    }

    /// Explicit rows keep their height.
    pub(crate) fn set_default_height(&mut self, px: u32) {
        self.default = px;
    }

    pub(crate) fn set_len(&mut self, count: usize) {
        if count < self.count {
            let keep = self.rank(count);
            if keep < self.rows.len() {
                self.rows.truncate(keep);
                self.heights.truncate(keep);
                self.sums.truncate(keep);
            }
        }
        self.count = count;
    }

    /// Inserts `count` default-height rows before `at`.
    pub(crate) fn insert(&mut self, at: usize, count: usize) {
        let at = at.min(self.count);
        let first = self.rank(at);
        for row in &mut self.rows[first..] {
            *row += count;
        }
        self.count += count;
    }

    /// Removes `count` rows starting at `at`, with their explicit heights.
    pub(crate) fn remove(&mut self, at: usize, count: usize) {
        let at = at.min(self.count);
        let count = count.min(self.count - at);
        let first = self.rank(at);
        let last = self.rank(at + count);
        if first < last {
            self.rows.drain(first..last);
            self.heights.drain(first..last);
            self.sums = ExplicitSums::from_heights(&self.heights);
        }
        for row in &mut self.rows[first..] {
            *row -= count;
        }
        self.count -= count;
    }

    pub(crate) fn clear_explicit(&mut self) {
        self.rows.clear();
        self.heights.clear();
        self.sums = ExplicitSums::default();
    }

    /// Gives `index` an explicit height. Returns the previous height.
    pub(crate) fn set(&mut self, index: usize, px: u32) -> Option<u32> {
        if index >= self.count {
            return None;
        }
        match self.rows.binary_search(&index) {
            Ok(j) => {
                let old = self.heights[j];
                self.heights[j] = px;
                self.sums.add(j, px as i64 - old as i64);
                Some(old)
            }
            Err(j) => {
                self.rows.insert(j, index);
                self.heights.insert(j, px);
                if j + 1 == self.heights.len() {
                    self.sums.push(px as u64);
                } else {
                    self.sums = ExplicitSums::from_heights(&self.heights);
                }
                Some(self.default)
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<u32> {
        if index >= self.count {
            return None;
        }
        Some(match self.rows.binary_search(&index) {
            Ok(j) => self.heights[j],
            Err(_) => self.default,
        })
    }

    /// Top edge of row `index`. `index == len()` gives the total height.
    pub(crate) fn top(&self, index: usize) -> u64 {
        let index = index.min(self.count);
        let r = self.rank(index);
        (index - r) as u64 * self.default as u64 + self.sums.prefix_sum(r)
    }

    pub(crate) fn total(&self) -> u64 {
        self.top(self.count)
    }

    /// The row containing `offset`, or `len()` when the offset is past the last row.
    pub(crate) fn row_at(&self, offset: u64) -> usize {
        // Explicit rows starting at or above `offset`.
        let (mut lo, mut hi) = (0usize, self.rows.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.explicit_top(mid) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let (base_row, base_top) = match lo.checked_sub(1) {
            Some(j) => {
                let top = self.explicit_top(j);
                let bottom = top + self.heights[j] as u64;
                if offset < bottom {
                    return self.rows[j];
                }
                (self.rows[j] + 1, bottom)
            }
            None => (0, 0),
        };
        let default = (self.default as u64).max(1);
        let row = base_row as u64 + (offset - base_top) / default;
        (row.min(self.count as u64)) as usize
    }

    /// Number of explicit rows below `index`.
    fn rank(&self, index: usize) -> usize {
        self.rows.partition_point(|&r| r < index)
    }

    fn explicit_top(&self, j: usize) -> u64 {
        (self.rows[j] - j) as u64 * self.default as u64 + self.sums.prefix_sum(j)
    }
}

/// Fenwick tree over the explicit heights, in row order.
#[derive(Clone, Debug, Default)]
struct ExplicitSums {
    tree: Vec<u64>, // 1-indexed once non-empty
    total: u64,
}

impl ExplicitSums {
    fn from_heights(heights: &[u32]) -> Self {
        let n = heights.len();
        let mut tree = alloc::vec![0u64; n + 1];
        for (i, &h) in heights.iter().enumerate() {
            let i = i + 1;
            tree[i] += h as u64;
            let parent = i + lsb(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self {
            tree,
            total: heights.iter().map(|&h| h as u64).sum(),
        }
    }

    fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.total = self.prefix_sum(len);
            self.tree.truncate(len + 1);
        }
    }

    fn push(&mut self, height: u64) {
        if self.tree.is_empty() {
            self.tree.push(0);
        }
        let i = self.tree.len();
        // The new node covers the `lsb(i)` heights ending at `i`.
        let covered = self.prefix_sum(i - 1) - self.prefix_sum(i - lsb(i));
        self.tree.push(covered + height);
        self.total += height;
    }

    fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        self.total = self.total.saturating_add_signed(delta);
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = self.tree[i].saturating_add_signed(delta);
            i += lsb(i);
        }
    }

    fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum += self.tree[i];
            i &= i - 1;
        }
        sum
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}
