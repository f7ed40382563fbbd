use crate::Range;

/// One of the three row containers of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Section {
    Header,
    Body,
    Footer,
}

impl Section {
    /// Tab order: header → body → footer → header.
    pub fn next(self) -> Section {
        match self {
            Section::Header => Section::Body,
            Section::Body => Section::Footer,
            Section::Footer => Section::Header,
        }
    }

    pub fn previous(self) -> Section {
        match self {
            Section::Header => Section::Footer,
            Section::Body => Section::Header,
            Section::Footer => Section::Body,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Where a scrolled-to row or column should end up in the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDestination {
    /// Scroll the minimum amount needed to make the target fully visible.
    #[default]
    Any,
    Start,
    Middle,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn opposite(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Viewport geometry in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: u32,
}

/// A notification that logical body rows moved.
///
/// Produced by the engine for every structural change so index-based state elsewhere
/// (focus, selection, availability tracking) can be shifted in the same call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowShift {
    Inserted(Range),
    Removed(Range),
}

impl RowShift {
    /// Maps an index through this shift. Returns `None` if the row was removed.
    pub fn map_index(&self, index: usize) -> Option<usize> {
        match *self {
            RowShift::Inserted(r) => {
                if index >= r.start() {
                    Some(index + r.len())
                } else {
                    Some(index)
                }
            }
            RowShift::Removed(r) => {
                if r.contains(index) {
                    None
                } else if index >= r.end() {
                    Some(index - r.len())
                } else {
                    Some(index)
                }
            }
        }
    }
}
