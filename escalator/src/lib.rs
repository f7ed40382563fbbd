//! A headless, virtualized data grid engine.
//!
//! For adapter-level utilities (touch inertia, tweens, a frame-driven controller), see the
//! `escalator-adapter` crate.
//!
//! The grid renders an arbitrarily large data set into a fixed viewport by keeping only a small
//! pool of live row slots and rebinding them as the user scrolls. Around that engine it
//! resolves column widths (fixed widths, min/max constraints and expand ratios), keeps cell
//! focus, selection and sort order consistent under structural changes, and manages header and
//! footer rows with joined cells.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`DataSource`] for the body rows, and deliver its callbacks as [`DataChange`]s
//! - a [`CellRenderer`] that fills the cells of bound slots
//! - viewport size, input events ([`GridEvent`]) and turn boundaries
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod column;
mod data;
mod engine;
mod error;
mod event;
mod focus;
mod grid;
mod heights;
mod options;
mod range;
mod renderer;
mod reorder;
mod scheduler;
mod scroll;
mod section;
mod sort;
mod types;
mod watchdog;
mod width;

#[cfg(test)]
mod tests;

pub use column::{Column, ColumnId, ExpandRatio};
pub use data::{DataChange, DataSource};
pub use engine::{BodyContext, BodyFocus, Escalator, Slot, SlotCell};
pub use error::{GridError, RenderError, Result};
pub use event::{EventOutcome, GridEvent};
pub use focus::{CellFocusController, FocusBounds, FocusChange, FocusedCell, Key, Modifiers};
pub use grid::Grid;
pub use options::{GridChange, GridOptions, OnChangeCallback, OnSortCallback};
pub use range::Range;
pub use renderer::{CellKind, CellRef, CellRenderer, SlotId};
pub use reorder::ColumnReorderSession;
pub use scheduler::{Scheduler, Tier};
pub use scroll::{ScrollController, ScrollState};
pub use section::{CellContent, StaticCell, StaticRow, StaticSection};
pub use sort::{SortEvent, SortOrder, SortOrderController};
pub use types::{RowShift, ScrollDestination, ScrollDirection, Section, SortDirection, Viewport};
pub use watchdog::{OperationId, OperationKind, OperationWatchdog};
pub use width::{
    ResolutionMode, SubpixelPolicy, WidthInput, WidthResolution, resolve_column_widths,
};
