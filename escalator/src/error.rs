use alloc::boxed::Box;

use crate::ColumnId;

/// Errors returned synchronously by configuration calls.
///
/// These are programmer errors: the call that produced one left the grid untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid range: end ({end}) is before start ({start})")]
    InvalidRange { start: usize, end: usize },

    #[error("minimum width ({min}px) is greater than maximum width ({max}px)")]
    MinExceedsMax { min: f64, max: f64 },

    #[error("column {0:?} is not attached to this grid")]
    UnknownColumn(ColumnId),

    #[error("row index ({index}) is above maximum ({max})")]
    RowOutOfBounds { index: usize, max: usize },

    #[error("column index ({index}) is out of bounds (count: {count})")]
    ColumnOutOfBounds { index: usize, count: usize },

    #[error("frozen column count ({count}) must be between -1 and {max}")]
    InvalidFrozenCount { count: isize, max: usize },

    #[error("padding ({0}px) is not supported with the middle scroll destination")]
    PaddingWithMiddle(u32),

    #[error("at least two columns are needed to join cells (got {0})")]
    JoinTooFewColumns(usize),

    #[error("column {0:?} is already part of a joined cell")]
    ColumnAlreadyJoined(ColumnId),

    #[error("static row index ({index}) is out of bounds (rows: {count})")]
    StaticRowOutOfBounds { index: usize, count: usize },

    #[error("column order must list every attached column exactly once")]
    InvalidColumnOrder,

    #[error("no column reorder session is active")]
    NoActiveSession,
}

/// Error type produced by external renderers and style generators.
///
/// The grid never propagates these; they are logged and the affected cell is left empty.
pub type RenderError = Box<dyn core::error::Error + Send + Sync>;

pub type Result<T, E = GridError> = core::result::Result<T, E>;
