use alloc::string::String;

use crate::ColumnId;
use crate::error::RenderError;

/// Stable identity of a live presentation slot.
///
/// A slot keeps its id while it is rebound to other rows; ids are never reused once the slot
/// is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

/// Lifecycle needs of the cells of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellKind {
    /// Plain content; only `render`/`clear` are called.
    #[default]
    Simple,
    /// Stateful content; additionally gets exactly one `attach` and one `detach` per binding.
    Widget,
}

/// Address of one live body cell handed to a [`CellRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub slot: SlotId,
    /// Logical body row the slot is bound to.
    pub row: usize,
    /// Index among the visible columns.
    pub column: usize,
    pub column_id: ColumnId,
}

/// Produces cell content for bound slots.
///
/// Errors returned from `render` and the style hooks are logged and leave the affected cell
/// (or row) in its empty state; they never abort the rest of the pass.
pub trait CellRenderer<T> {
    fn cell_kind(&self, _column: ColumnId) -> CellKind {
        CellKind::Simple
    }

    fn attach(&mut self, _cell: CellRef) {}

    fn detach(&mut self, _cell: CellRef) {}

    fn render(&mut self, cell: CellRef, row: &T) -> Result<(), RenderError>;

    /// Resets a cell to its empty state (no data, or a failed render).
    fn clear(&mut self, _cell: CellRef) {}

    /// Shows or hides widget content while its row has no data.
    fn set_content_visible(&mut self, _cell: CellRef, _visible: bool) {}

    fn row_style(&mut self, _row_index: usize, _row: &T) -> Result<Option<String>, RenderError> {
        Ok(None)
    }

    fn cell_style(&mut self, _cell: CellRef, _row: &T) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}
