use alloc::string::String;

use crate::error::{GridError, Result};

/// Identity of a column attached to a grid.
///
/// Assigned by the grid when a [`Column`] is attached; never reused within one grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnId(pub u64);

/// How a column takes part in distributing leftover viewport width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpandRatio {
    /// No ratio defined. If no visible column defines a ratio, every auto column expands
    /// with weight 1; otherwise this column does not expand.
    #[default]
    Default,
    /// An explicit weight. `Ratio(0)` never expands.
    Ratio(u32),
}

/// Configuration of one logical grid column.
///
/// A column is created detached and handed to [`crate::Grid::add_column`], which takes
/// ownership. Removing it from the grid hands the value back, detached.
///
/// Width conventions follow the resolver: `None` means "auto" (natural content width plus a
/// share of leftover space), `Some(px)` means a fixed user width.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    caption: String,
    width: Option<f64>,
    min_width: Option<f64>,
    max_width: Option<f64>,
    expand_ratio: ExpandRatio,
    hidden: bool,
    sortable: bool,
    resizable: bool,
    hidable: bool,
    editable: bool,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            caption: String::new(),
            width: None,
            min_width: None,
            max_width: None,
            expand_ratio: ExpandRatio::Default,
            hidden: false,
            sortable: false,
            resizable: true,
            hidable: false,
            editable: true,
        }
    }
}

fn non_negative(px: f64) -> Option<f64> {
    (px >= 0.0).then_some(px)
}

impl Column {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            ..Self::default()
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    /// The user-specified width, or `None` for auto sizing.
    pub fn width(&self) -> Option<f64> {
        self.width
    }

    /// Sets the width in pixels. Negative values switch the column to auto sizing.
    pub fn set_width(&mut self, px: f64) {
        self.width = non_negative(px);
    }

    pub fn min_width(&self) -> Option<f64> {
        self.min_width
    }

    /// Sets the minimum width. Negative values clear the constraint.
    pub fn set_min_width(&mut self, px: f64) -> Result<()> {
        let min = non_negative(px);
        if let (Some(min), Some(max)) = (min, self.max_width) {
            if min > max {
                return Err(GridError::MinExceedsMax { min, max });
            }
        }
        self.min_width = min;
        Ok(())
    }

    pub fn max_width(&self) -> Option<f64> {
        self.max_width
    }

    /// Sets the maximum width. Negative values clear the constraint.
    pub fn set_max_width(&mut self, px: f64) -> Result<()> {
        let max = non_negative(px);
        if let (Some(min), Some(max)) = (self.min_width, max) {
            if max < min {
                return Err(GridError::MinExceedsMax { min, max });
            }
        }
        self.max_width = max;
        Ok(())
    }

    pub fn expand_ratio(&self) -> ExpandRatio {
        self.expand_ratio
    }

    pub fn set_expand_ratio(&mut self, ratio: ExpandRatio) {
        self.expand_ratio = ratio;
    }

    pub fn clear_expand_ratio(&mut self) {
        self.expand_ratio = ExpandRatio::Default;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn set_hidden_flag(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn is_hidable(&self) -> bool {
        self.hidable
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn with_width(mut self, px: f64) -> Self {
        self.set_width(px);
        self
    }

    pub fn with_min_width(mut self, px: f64) -> Result<Self> {
        self.set_min_width(px)?;
        Ok(self)
    }

    pub fn with_max_width(mut self, px: f64) -> Result<Self> {
        self.set_max_width(px)?;
        Ok(self)
    }

    pub fn with_expand_ratio(mut self, ratio: u32) -> Self {
        self.expand_ratio = ExpandRatio::Ratio(ratio);
        self
    }

    /// Columns added hidden stay out of the engine until shown.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_hidable(mut self, hidable: bool) -> Self {
        self.hidable = hidable;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}
