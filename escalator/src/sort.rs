use alloc::vec::Vec;

use crate::{Column, ColumnId, SortDirection};

/// One entry of a sort specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortOrder {
    pub column: ColumnId,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// Fired whenever the sort order changes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortEvent {
    pub order: Vec<SortOrder>,
    pub user_originated: bool,
}

/// Turns header interaction into an ordered multi-column sort specification.
///
/// The controller never sorts data itself; consumers react to [`SortEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct SortOrderController {
    order: Vec<SortOrder>,
    delayed: Option<(ColumnId, bool)>,
}

impl SortOrderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self) -> &[SortOrder] {
        &self.order
    }

    pub fn sort_order_for(&self, column: ColumnId) -> Option<SortDirection> {
        self.order
            .iter()
            .find(|o| o.column == column)
            .map(|o| o.direction)
    }

    /// User-initiated sort on the column `id`. Returns `None` when the column is not sortable.
    pub fn sort(&mut self, id: ColumnId, column: &Column, multi: bool) -> Option<SortEvent> {
        if !column.is_sortable() {
            return None;
        }

        if multi {
            match self.order.iter_mut().find(|o| o.column == id) {
                Some(existing) => existing.direction = existing.direction.opposite(),
                None => self.order.push(SortOrder::ascending(id)),
            }
        } else {
            let next = match self.order.as_slice() {
                [only] if only.column == id => SortOrder {
                    column: id,
                    direction: only.direction.opposite(),
                },
                _ => SortOrder::ascending(id),
            };
            self.order.clear();
            self.order.push(next);
        }
        vdebug!(column = id.0, multi, len = self.order.len(), "sort order changed");

        Some(SortEvent {
            order: self.order.clone(),
            user_originated: true,
        })
    }

    /// Replaces the order programmatically. Later duplicates of a column are dropped.
    pub fn set_sort_order(&mut self, order: &[SortOrder]) -> SortEvent {
        self.order.clear();
        for entry in order {
            if !self.order.iter().any(|o| o.column == entry.column) {
                self.order.push(*entry);
            }
        }
        SortEvent {
            order: self.order.clone(),
            user_originated: false,
        }
    }

    /// Clears the order without firing an event.
    pub fn clear_sort_order(&mut self) {
        self.order.clear();
    }

    /// Drops a removed column. Returns the event to fire if the order changed.
    pub fn remove_column(&mut self, column: ColumnId) -> Option<SortEvent> {
        if self.delayed.is_some_and(|(c, _)| c == column) {
            self.delayed = None;
        }
        let before = self.order.len();
        self.order.retain(|o| o.column != column);
        (self.order.len() != before).then(|| SortEvent {
            order: self.order.clone(),
            user_originated: false,
        })
    }

    pub(crate) fn set_delayed(&mut self, column: ColumnId, multi: bool) {
        self.delayed = Some((column, multi));
    }

    pub(crate) fn take_delayed(&mut self) -> Option<(ColumnId, bool)> {
        self.delayed.take()
    }

    pub fn is_delayed_sort_scheduled(&self) -> bool {
        self.delayed.is_some()
    }
}
