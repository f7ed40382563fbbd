use escalator::{
    CellRenderer, DataSource, EventOutcome, Grid, GridEvent, Result, ScrollDestination,
};

use crate::{Easing, Tween};

#[cfg(feature = "std")]
use crate::{Deceleration, ScrollExtent, TouchConfig, TouchInertiaController, TouchPoint};

/// A framework-neutral controller that wraps an [`escalator::Grid`] and feeds it synthetic scroll
/// events from animations and touch gestures.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_scroll` when the UI reports a native scroll
/// - `on_touch_start` / `on_touch_move` / `on_touch_end` for touch input (`std` only)
/// - `tick(now_ms)` each frame; this also starts the grid's next turn
///
/// Every position change reaches the grid as a [`GridEvent::Scroll`], so `is_scrolling`
/// debouncing and data fetching behave the same as for native scrolling.
pub struct Controller<D: DataSource, R: CellRenderer<D::Row>> {
    grid: Grid<D, R>,
    tween: Option<Tween>,
    #[cfg(feature = "std")]
    touch: TouchInertiaController,
}

impl<D: DataSource, R: CellRenderer<D::Row>> Controller<D, R> {
    pub fn new(grid: Grid<D, R>) -> Self {
        Self {
            grid,
            tween: None,
            #[cfg(feature = "std")]
            touch: TouchInertiaController::default(),
        }
    }

    #[cfg(feature = "std")]
    pub fn with_touch_config(mut self, config: TouchConfig) -> Self {
        self.touch.set_config(config);
        self
    }

    pub fn grid(&self) -> &Grid<D, R> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<D, R> {
        &mut self.grid
    }

    pub fn into_grid(self) -> Grid<D, R> {
        self.grid
    }

    #[cfg(feature = "std")]
    pub fn touch(&self) -> &TouchInertiaController {
        &self.touch
    }

    pub fn is_animating(&self) -> bool {
        #[cfg(feature = "std")]
        if self.touch.is_decelerating() {
            return true;
        }
        self.tween.is_some()
    }

    /// Stops any tween or touch deceleration, leaving the scroll where it is.
    pub fn cancel_animation(&mut self) {
        self.tween = None;
        #[cfg(feature = "std")]
        self.touch.cancel();
    }

    /// Call this when the UI reports a native scroll. Cancels any running animation.
    pub fn on_scroll(&mut self, top: u64, left: f64, now_ms: u64) -> EventOutcome {
        self.cancel_animation();
        self.apply(top, left, now_ms)
    }

    /// Advances running animations and starts the grid's next turn.
    ///
    /// Returns the applied vertical offset if an animation moved the grid this frame.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        let mut moved = None;

        if let Some(tween) = self.tween {
            let (top, left) = tween.sample(now_ms);
            self.apply(top, left, now_ms);
            if tween.is_done(now_ms) {
                self.tween = None;
            }
            moved = Some(self.grid.scroll_top());
        }

        #[cfg(feature = "std")]
        if let Some(step) = self.touch.step(now_ms) {
            if !step.is_empty() {
                let top = step.top.map_or(self.grid.scroll_top(), to_offset);
                let left = step.left.unwrap_or(self.grid.scroll_left());
                self.apply(top, left, now_ms);
                moved = Some(self.grid.scroll_top());
            }
        }

        self.grid.next_turn(now_ms);
        moved
    }

    /// Scrolls a body row into view immediately. Returns the applied offset.
    pub fn scroll_to_row(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: u32,
        now_ms: u64,
    ) -> Result<u64> {
        let to = self
            .grid
            .scroll()
            .scroll_to_row_offset(row, destination, padding)?;
        self.cancel_animation();
        let left = self.grid.scroll_left();
        self.apply(to, left, now_ms);
        Ok(self.grid.scroll_top())
    }

    /// Starts a tween that brings a body row into view. Returns the clamped target offset.
    pub fn start_tween_to_row(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: u32,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Result<u64> {
        let to = self
            .grid
            .scroll()
            .scroll_to_row_offset(row, destination, padding)?;
        Ok(self.start_tween_to_offset(to, now_ms, duration_ms, easing))
    }

    /// Starts a tween to a vertical offset. Returns the clamped target offset.
    pub fn start_tween_to_offset(
        &mut self,
        offset: u64,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> u64 {
        let left = self.grid.scroll_left();
        self.start_tween(offset, left, now_ms, duration_ms, easing).0
    }

    /// Starts a tween that brings a body cell into view on both axes. `column` is a visible
    /// column index. Returns the clamped `(top, left)` target.
    #[allow(clippy::too_many_arguments)]
    pub fn start_tween_to_cell(
        &mut self,
        row: usize,
        column: usize,
        destination: ScrollDestination,
        padding: u32,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Result<(u64, f64)> {
        let scroll = self.grid.scroll();
        let top = scroll.scroll_to_row_offset(row, destination, padding)?;
        let left = scroll.scroll_to_column_offset(column, destination, padding)?;
        Ok(self.start_tween(top, left, now_ms, duration_ms, easing))
    }

    fn start_tween(
        &mut self,
        top: u64,
        left: f64,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> (u64, f64) {
        self.cancel_animation();
        let scroll = self.grid.scroll();
        let to_top = top.min(scroll.max_scroll_top());
        let to_left = left.clamp(0.0, scroll.max_scroll_left());
        let tween = Tween::vertical(scroll.scroll_top(), to_top, now_ms, duration_ms, easing)
            .with_left(scroll.scroll_left(), to_left);
        vdebug!(
            from_top = tween.from_top,
            to_top,
            to_left,
            duration_ms,
            "tween started"
        );
        self.tween = Some(tween);
        (to_top, to_left)
    }

    /// Returns `true` when the adapter should consume the native event.
    #[cfg(feature = "std")]
    pub fn on_touch_start(&mut self, touches: usize, point: TouchPoint) -> bool {
        self.tween = None;
        let extent = self.extent();
        self.touch.touch_start(touches, point, extent)
    }

    /// Returns `true` when the gesture scrolled the grid; the adapter should then consume the
    /// native event.
    #[cfg(feature = "std")]
    pub fn on_touch_move(&mut self, touches: usize, cancelable: bool, point: TouchPoint) -> bool {
        let extent = self.extent();
        let Some(scroll) = self.touch.touch_move(touches, cancelable, point, extent) else {
            return false;
        };
        let top = scroll.top.map_or(self.grid.scroll_top(), to_offset);
        let left = scroll.left.unwrap_or(self.grid.scroll_left());
        self.apply(top, left, point.time_ms);
        true
    }

    #[cfg(feature = "std")]
    pub fn on_touch_end(&mut self, now_ms: u64) -> Option<Deceleration> {
        let extent = self.extent();
        self.touch.touch_end(now_ms, extent)
    }

    #[cfg(feature = "std")]
    fn extent(&self) -> ScrollExtent {
        let scroll = self.grid.scroll();
        ScrollExtent {
            top: scroll.scroll_top() as f64,
            left: scroll.scroll_left(),
            max_top: scroll.max_scroll_top() as f64,
            max_left: scroll.max_scroll_left(),
        }
    }

    fn apply(&mut self, top: u64, left: f64, now_ms: u64) -> EventOutcome {
        self.grid
            .handle_event(GridEvent::Scroll { top, left, now_ms })
    }
}

#[cfg(feature = "std")]
fn to_offset(px: f64) -> u64 {
    px.round().max(0.0) as u64
}
