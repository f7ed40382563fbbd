use alloc::vec::Vec;

use crate::ColumnId;
use crate::error::{GridError, Result};

/// An in-progress column drag.
///
/// Created by [`crate::Grid::start_column_reorder`] and owned by the caller for the lifetime of
/// the gesture. Moving the column only changes the session's preview order; the grid adopts it
/// on [`crate::Grid::finish_column_reorder`]. A session is invalidated when columns are added
/// or removed while it is open.
#[derive(Clone, Debug)]
pub struct ColumnReorderSession {
    column: ColumnId,
    original: Vec<ColumnId>,
    order: Vec<ColumnId>,
    generation: u64,
}

impl ColumnReorderSession {
    pub(crate) fn new(column: ColumnId, order: Vec<ColumnId>, generation: u64) -> Self {
        Self {
            column,
            original: order.clone(),
            order,
            generation,
        }
    }

    /// The dragged column.
    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn original_order(&self) -> &[ColumnId] {
        &self.original
    }

    pub fn order(&self) -> &[ColumnId] {
        &self.order
    }

    /// Where the dragged column currently sits in the preview order.
    pub fn position(&self) -> usize {
        self.order
            .iter()
            .position(|id| *id == self.column)
            .unwrap_or_default()
    }

    /// Moves the dragged column to `index` of the preview order.
    pub fn move_to(&mut self, index: usize) -> Result<()> {
        if index >= self.order.len() {
            return Err(GridError::ColumnOutOfBounds {
                index,
                count: self.order.len(),
            });
        }
        let from = self.position();
        let id = self.order.remove(from);
        self.order.insert(index, id);
        Ok(())
    }

    /// Whether the preview differs from the order the drag started with.
    pub fn is_moved(&self) -> bool {
        self.order != self.original
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
