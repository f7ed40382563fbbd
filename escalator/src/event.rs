use crate::Section;
use crate::focus::{Key, Modifiers};

/// Input delivered to [`crate::Grid::handle_event`] by the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridEvent {
    /// A pointer click on a cell. `column` is a visible column index.
    Click {
        section: Section,
        row: usize,
        column: usize,
        modifiers: Modifiers,
    },
    /// A key press while the grid has keyboard focus.
    KeyDown { key: Key, modifiers: Modifiers },
    /// The viewport scrolled, natively or through a synthetic delta.
    Scroll { top: u64, left: f64, now_ms: u64 },
}

/// What an event caused, for adapters that need to react.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventOutcome {
    pub focus_changed: bool,
    pub sort: Option<crate::SortEvent>,
    pub scrolled: bool,
}
