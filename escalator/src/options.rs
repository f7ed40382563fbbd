use alloc::sync::Arc;

use crate::width::SubpixelPolicy;
use crate::{SortEvent, Viewport};

/// A summary of what changed during one grid call (or one batch).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridChange {
    /// Body rows were bound, rebound, re-rendered or shifted.
    pub rows: bool,
    /// Columns, their widths or their order changed.
    pub columns: bool,
    pub scroll: bool,
    pub focus: bool,
    pub selection: bool,
    /// Header or footer content or layout changed.
    pub sections: bool,
    pub is_scrolling: bool,
}

impl GridChange {
    pub const ROWS: GridChange = GridChange::only(0);
    pub const COLUMNS: GridChange = GridChange::only(1);
    pub const SCROLL: GridChange = GridChange::only(2);
    pub const FOCUS: GridChange = GridChange::only(3);
    pub const SELECTION: GridChange = GridChange::only(4);
    pub const SECTIONS: GridChange = GridChange::only(5);

    const fn only(flag: u8) -> GridChange {
        GridChange {
            rows: flag == 0,
            columns: flag == 1,
            scroll: flag == 2,
            focus: flag == 3,
            selection: flag == 4,
            sections: flag == 5,
            is_scrolling: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.rows || self.columns || self.scroll || self.focus || self.selection || self.sections)
    }

    pub(crate) fn merge(self, other: GridChange) -> GridChange {
        GridChange {
            rows: self.rows || other.rows,
            columns: self.columns || other.columns,
            scroll: self.scroll || other.scroll,
            focus: self.focus || other.focus,
            selection: self.selection || other.selection,
            sections: self.sections || other.sections,
            is_scrolling: other.is_scrolling,
        }
    }
}

/// A callback fired after the grid's state changed.
pub type OnChangeCallback = Arc<dyn Fn(GridChange) + Send + Sync>;

/// A callback fired when the sort order changes.
pub type OnSortCallback = Arc<dyn Fn(&SortEvent) + Send + Sync>;

/// Configuration for [`crate::Grid`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
pub struct GridOptions {
    /// Size of the body viewport (width in px, height in px).
    pub viewport: Viewport,

    /// Height used for rows that have no explicit height.
    pub default_row_height: u32,

    /// Extra rows materialized on each side of the visible range.
    pub overscan: usize,

    /// Extra non-frozen columns kept live on each side of the horizontal viewport.
    pub column_overscan: usize,

    /// Natural width assumed for auto-sized columns that were never measured.
    pub default_column_width: f64,

    pub subpixel_policy: SubpixelPolicy,

    /// Debounce after the last scroll event before `is_scrolling` turns false.
    pub is_scrolling_reset_delay_ms: u64,

    /// Time an editor bind/save may take before a warning is logged.
    pub operation_budget_ms: u64,

    /// End-of-turn retries of the width recalculation while header/footer refresh is pending.
    pub width_retry_limit: u32,

    pub initial_scroll_top: u64,
    pub initial_scroll_left: f64,

    pub on_sort: Option<OnSortCallback>,
    pub on_change: Option<OnChangeCallback>,
}

impl Clone for GridOptions {
    fn clone(&self) -> Self {
        Self {
            viewport: self.viewport,
            default_row_height: self.default_row_height,
            overscan: self.overscan,
            column_overscan: self.column_overscan,
            default_column_width: self.default_column_width,
            subpixel_policy: self.subpixel_policy,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            operation_budget_ms: self.operation_budget_ms,
            width_retry_limit: self.width_retry_limit,
            initial_scroll_top: self.initial_scroll_top,
            initial_scroll_left: self.initial_scroll_left,
            on_sort: self.on_sort.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl GridOptions {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            default_row_height: 32,
            overscan: 1,
            column_overscan: 1,
            default_column_width: 100.0,
            subpixel_policy: SubpixelPolicy::default(),
            is_scrolling_reset_delay_ms: 150,
            operation_budget_ms: 5000,
            width_retry_limit: 10,
            initial_scroll_top: 0,
            initial_scroll_left: 0.0,
            on_sort: None,
            on_change: None,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_default_row_height(mut self, px: u32) -> Self {
        self.default_row_height = px;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_column_overscan(mut self, overscan: usize) -> Self {
        self.column_overscan = overscan;
        self
    }

    pub fn with_default_column_width(mut self, px: f64) -> Self {
        self.default_column_width = px;
        self
    }

    pub fn with_subpixel_policy(mut self, policy: SubpixelPolicy) -> Self {
        self.subpixel_policy = policy;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_operation_budget_ms(mut self, budget_ms: u64) -> Self {
        self.operation_budget_ms = budget_ms;
        self
    }

    pub fn with_width_retry_limit(mut self, limit: u32) -> Self {
        self.width_retry_limit = limit;
        self
    }

    pub fn with_initial_scroll(mut self, top: u64, left: f64) -> Self {
        self.initial_scroll_top = top;
        self.initial_scroll_left = left;
        self
    }

    pub fn with_on_sort(mut self, on_sort: Option<impl Fn(&SortEvent) + Send + Sync + 'static>) -> Self {
        self.on_sort = on_sort.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(GridChange) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridOptions")
            .field("viewport", &self.viewport)
            .field("default_row_height", &self.default_row_height)
            .field("overscan", &self.overscan)
            .field("column_overscan", &self.column_overscan)
            .field("default_column_width", &self.default_column_width)
            .field("subpixel_policy", &self.subpixel_policy)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .field("operation_budget_ms", &self.operation_budget_ms)
            .field("width_retry_limit", &self.width_retry_limit)
            .field("initial_scroll_top", &self.initial_scroll_top)
            .field("initial_scroll_left", &self.initial_scroll_left)
            .finish_non_exhaustive()
    }
}
