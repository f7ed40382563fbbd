use crate::Range;

/// The backing store of the body rows.
///
/// The grid never fetches on its own: it asks the source to make a range available and waits
/// for the adapter to deliver the outcome as [`DataChange`] values through
/// [`crate::Grid::handle_data_change`].
pub trait DataSource {
    type Row;

    /// Total number of rows, or `None` while not yet known.
    fn size(&self) -> Option<usize>;

    /// Asks the source to load `range`. Completion is reported asynchronously.
    fn ensure_availability(&mut self, range: Range);

    /// The row at `index` if it is currently loaded.
    fn row(&self, index: usize) -> Option<&Self::Row>;
}

/// A callback from the data source, delivered by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataChange {
    /// Rows in the range were loaded and can be rendered.
    Available(Range),
    /// Rows were inserted at the range.
    Added(Range),
    /// Rows in the range were removed.
    Removed(Range),
    /// Rows in the range changed in place.
    Updated(Range),
    /// Every row changed; the source now has this many rows.
    SizeReset(usize),
}

impl<T> DataSource for alloc::vec::Vec<T> {
    type Row = T;

    fn size(&self) -> Option<usize> {
        Some(self.len())
    }

    fn ensure_availability(&mut self, _range: Range) {}

    fn row(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}
