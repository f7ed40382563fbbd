use alloc::vec::Vec;
use core::cmp;

use crate::error::{GridError, Result};
use crate::heights::RowHeights;
use crate::{GridOptions, Range, ScrollDestination, ScrollDirection, Viewport};

/// A lightweight, serializable snapshot of both scroll offsets.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub top: u64,
    pub left: f64,
    pub is_scrolling: bool,
}

/// Scroll geometry of the body: row heights, column widths, viewport and both offsets.
///
/// The controller is pure bookkeeping. It never touches slots; the engine asks it which rows
/// and columns should be live and reacts to the answer.
#[derive(Clone, Debug)]
pub struct ScrollController {
    viewport: Viewport,
    scroll_top: u64,
    scroll_left: f64,
    scroll_direction: Option<ScrollDirection>,
    is_scrolling: bool,
    last_scroll_event_ms: Option<u64>,
    is_scrolling_reset_delay_ms: u64,

    rows: RowHeights,
    overscan: usize,

    column_widths: Vec<f64>,
    frozen_columns: usize,
    column_overscan: usize,
}

impl ScrollController {
    pub fn new(options: &GridOptions) -> Self {
        Self {
            viewport: options.viewport,
            scroll_top: options.initial_scroll_top,
            scroll_left: options.initial_scroll_left.max(0.0),
            scroll_direction: None,
            is_scrolling: false,
            last_scroll_event_ms: None,
            is_scrolling_reset_delay_ms: options.is_scrolling_reset_delay_ms,
            rows: RowHeights::new(options.default_row_height.max(1)),
            overscan: options.overscan,
            column_widths: Vec::new(),
            frozen_columns: 0,
            column_overscan: options.column_overscan,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.reclamp();
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub(crate) fn set_overscan(&mut self, overscan: usize) {
        self.overscan = overscan;
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            top: self.scroll_top,
            left: self.scroll_left,
            is_scrolling: self.is_scrolling,
        }
    }

    // --- rows -----------------------------------------------------------------------------

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn default_row_height(&self) -> u32 {
        self.rows.default_height()
    }

    /// Number of rows with an explicit height.
    pub fn explicit_row_count(&self) -> usize {
        self.rows.explicit_count()
    }

    /// Changes the height of every row that has not been given an explicit height.
    pub(crate) fn set_default_row_height(&mut self, px: u32) {
        let px = px.max(1);
        if px == self.rows.default_height() {
            return;
        }
        self.rows.set_default_height(px);
        self.reclamp();
    }

    pub(crate) fn set_row_count(&mut self, count: usize) {
        self.rows.set_len(count);
        self.reclamp();
    }

    pub(crate) fn insert_rows(&mut self, at: usize, count: usize) {
        self.rows.insert(at, count);
        self.reclamp();
    }

    pub(crate) fn remove_rows(&mut self, at: usize, count: usize) {
        self.rows.remove(at, count);
        self.reclamp();
    }

    /// Forgets every explicit row height.
    pub(crate) fn reset_row_heights(&mut self) {
        self.rows.clear_explicit();
        self.reclamp();
    }

    /// Sets an explicit height for one row (details rows, measured content).
    ///
    /// When the row starts above the current scroll offset the offset moves by the same delta,
    /// keeping the visible content in place. Returns the applied offset adjustment.
    pub(crate) fn set_row_height(&mut self, index: usize, px: u32) -> i64 {
        let top = self.rows.top(index);
        let Some(cur) = self.rows.set(index, px) else {
            return 0;
        };
        if cur == px {
            return 0;
        }
        let delta = px as i64 - cur as i64;

        let adjust = top < self.scroll_top;
        if adjust {
            self.scroll_top = self.scroll_top.saturating_add_signed(delta);
        }
        self.reclamp();
        if adjust { delta } else { 0 }
    }

    pub fn row_height(&self, index: usize) -> Option<u32> {
        self.rows.get(index)
    }

    pub fn row_top(&self, index: usize) -> Option<u64> {
        (index < self.rows.len()).then(|| self.rows.top(index))
    }

    pub fn scroll_height(&self) -> u64 {
        self.rows.total()
    }

    pub fn max_scroll_top(&self) -> u64 {
        self.scroll_height()
            .saturating_sub(self.viewport.height as u64)
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    /// Sets the vertical offset, clamped. Returns the applied value.
    pub(crate) fn set_scroll_top(&mut self, px: u64) -> u64 {
        let px = px.min(self.max_scroll_top());
        self.scroll_direction = match px.cmp(&self.scroll_top) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.scroll_top = px;
        px
    }

    /// The body rows that intersect the viewport.
    pub fn visible_row_range(&self) -> Range {
        let count = self.rows.len();
        let view = self.viewport.height as u64;
        if count == 0 || view == 0 {
            return Range::empty_at(0);
        }
        let top = self.scroll_top.min(self.max_scroll_top());
        let total = self.scroll_height();
        if top >= total {
            return Range::empty_at(count);
        }
        let bottom_inclusive = top.saturating_add(view).saturating_sub(1);
        let start = self.rows.row_at(top).min(count - 1);
        let end = self
            .rows
            .row_at(cmp::max(bottom_inclusive, top))
            .min(count - 1)
            + 1;
        Range::with_length(start, end - start)
    }

    /// The visible rows plus overscan on both sides: the rows that get live slots.
    pub fn materialized_row_range(&self) -> Range {
        let visible = self.visible_row_range();
        if visible.is_empty() {
            return visible;
        }
        visible
            .expand(self.overscan, self.overscan)
            .restrict_to(&self.all_rows())
    }

    /// Upper bound of rows that can be visible at once with default-height rows.
    pub fn max_visible_row_count(&self) -> usize {
        let h = self.rows.default_height() as usize;
        (self.viewport.height as usize).div_ceil(h) + 1
    }

    fn all_rows(&self) -> Range {
        Range::with_length(0, self.rows.len())
    }

    /// Computes the clamped offset that brings `index` into view.
    pub fn scroll_to_row_offset(
        &self,
        index: usize,
        destination: ScrollDestination,
        padding: u32,
    ) -> Result<u64> {
        let count = self.rows.len();
        let Some(height) = self.rows.get(index) else {
            return Err(GridError::RowOutOfBounds {
                index,
                max: count.saturating_sub(1),
            });
        };
        if destination == ScrollDestination::Middle && padding != 0 {
            return Err(GridError::PaddingWithMiddle(padding));
        }
        let top = self.rows.top(index);
        let height = height as u64;
        let bottom = top + height;
        let view = self.viewport.height as u64;
        let padding = padding as u64;

        let target = match destination {
            ScrollDestination::Start => top.saturating_sub(padding),
            ScrollDestination::End => (bottom + padding).saturating_sub(view),
            ScrollDestination::Middle => (top + height / 2).saturating_sub(view / 2),
            ScrollDestination::Any => {
                let cur = self.scroll_top;
                if top.saturating_sub(padding) < cur {
                    top.saturating_sub(padding)
                } else if bottom + padding > cur + view {
                    (bottom + padding).saturating_sub(view)
                } else {
                    cur
                }
            }
        };
        Ok(target.min(self.max_scroll_top()))
    }

    /// Recomputes clamped offsets after geometry changes.
    pub(crate) fn reclamp(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        self.scroll_left = clamp_px(self.scroll_left, self.max_scroll_left());
    }

    // --- is-scrolling debounce -------------------------------------------------------------

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub(crate) fn notify_scroll_event(&mut self, now_ms: u64) {
        self.last_scroll_event_ms = Some(now_ms);
        self.is_scrolling = true;
    }

    /// Clears `is_scrolling` once no scroll event arrived for the reset delay. Returns `true`
    /// when the flag changed.
    pub(crate) fn update_scrolling(&mut self, now_ms: u64) -> bool {
        if !self.is_scrolling {
            return false;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return false;
        };
        if now_ms.saturating_sub(last) >= self.is_scrolling_reset_delay_ms {
            self.is_scrolling = false;
            self.scroll_direction = None;
            self.last_scroll_event_ms = None;
            return true;
        }
        false
    }

    // --- columns --------------------------------------------------------------------------

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    pub fn column_width(&self, index: usize) -> Option<f64> {
        self.column_widths.get(index).copied()
    }

    pub fn column_left(&self, index: usize) -> Option<f64> {
        (index < self.column_widths.len()).then(|| self.column_widths[..index].iter().sum())
    }

    pub(crate) fn insert_columns(&mut self, at: usize, count: usize, width: f64) {
        let at = at.min(self.column_widths.len());
        self.column_widths
            .splice(at..at, core::iter::repeat_n(width.max(0.0), count));
        if at < self.frozen_columns {
            self.frozen_columns += count;
        }
        self.reclamp();
    }

    pub(crate) fn remove_columns(&mut self, at: usize, count: usize) {
        let removed = Range::with_length(at, count)
            .restrict_to(&Range::with_length(0, self.column_widths.len()));
        self.column_widths.drain(removed.iter());
        let frozen = Range::with_length(0, self.frozen_columns);
        let [_, frozen_removed, _] = frozen.partition_with(&removed);
        self.frozen_columns -= frozen_removed.len();
        self.reclamp();
    }

    pub(crate) fn set_column_width(&mut self, index: usize, px: f64) {
        if let Some(w) = self.column_widths.get_mut(index) {
            *w = px.max(0.0);
        }
    }

    pub(crate) fn permute_columns(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.column_widths.len());
        let widths = order.iter().map(|&i| self.column_widths[i]).collect();
        self.column_widths = widths;
    }

    pub fn frozen_column_count(&self) -> usize {
        self.frozen_columns
    }

    pub(crate) fn set_frozen_column_count(&mut self, count: usize) {
        self.frozen_columns = count.min(self.column_widths.len());
        self.reclamp();
    }

    pub fn frozen_width(&self) -> f64 {
        self.column_widths[..self.frozen_columns].iter().sum()
    }

    pub fn scroll_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn max_scroll_left(&self) -> f64 {
        let max = self.scroll_width() - self.viewport.width;
        if max > 0.0 { max } else { 0.0 }
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub(crate) fn set_scroll_left(&mut self, px: f64) -> f64 {
        self.scroll_left = clamp_px(px, self.max_scroll_left());
        self.scroll_left
    }

    /// Columns that are always live regardless of horizontal scroll.
    pub fn frozen_column_range(&self) -> Range {
        Range::with_length(0, self.frozen_columns)
    }

    /// Non-frozen columns intersecting the horizontal viewport, plus column overscan.
    pub fn live_column_range(&self) -> Range {
        let n = self.column_widths.len();
        let f = self.frozen_columns.min(n);
        let scrolled = Range::with_length(f, n - f);
        if scrolled.is_empty() || self.viewport.width <= 0.0 {
            return Range::empty_at(f);
        }

        let view_left = self.scroll_left + self.frozen_width();
        let view_right = self.scroll_left + self.viewport.width;
        let mut left = self.frozen_width();
        let mut start = None;
        let mut end = f;
        for i in f..n {
            let right = left + self.column_widths[i];
            if right > view_left && left < view_right {
                start.get_or_insert(i);
                end = i + 1;
            }
            left = right;
        }
        let Some(start) = start else {
            return Range::empty_at(f);
        };
        Range::with_length(start, end - start)
            .expand(self.column_overscan, self.column_overscan)
            .restrict_to(&scrolled)
    }

    /// Whether the column at `index` currently has live cells.
    pub fn is_column_live(&self, index: usize) -> bool {
        index < self.frozen_columns || self.live_column_range().contains(index)
    }

    /// Computes the clamped horizontal offset that brings column `index` into view.
    ///
    /// Frozen columns are always visible, so the current offset is returned for them.
    pub fn scroll_to_column_offset(
        &self,
        index: usize,
        destination: ScrollDestination,
        padding: u32,
    ) -> Result<f64> {
        let count = self.column_widths.len();
        if index >= count {
            return Err(GridError::ColumnOutOfBounds { index, count });
        }
        if destination == ScrollDestination::Middle && padding != 0 {
            return Err(GridError::PaddingWithMiddle(padding));
        }
        if index < self.frozen_columns {
            return Ok(self.scroll_left);
        }
        let left = self.column_widths[..index].iter().sum::<f64>();
        let width = self.column_widths[index];
        let frozen = self.frozen_width();
        let view = self.viewport.width;
        let padding = padding as f64;

        let target = match destination {
            ScrollDestination::Start => left - frozen - padding,
            ScrollDestination::End => left + width + padding - view,
            ScrollDestination::Middle => left + width / 2.0 - (frozen + view) / 2.0,
            ScrollDestination::Any => {
                let cur = self.scroll_left;
                if left - padding < cur + frozen {
                    left - frozen - padding
                } else if left + width + padding > cur + view {
                    left + width + padding - view
                } else {
                    cur
                }
            }
        };
        Ok(clamp_px(target, self.max_scroll_left()))
    }
}

fn clamp_px(px: f64, max: f64) -> f64 {
    if px.is_nan() || px < 0.0 {
        0.0
    } else if px > max {
        max
    } else {
        px
    }
}
