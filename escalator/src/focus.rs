//! Keyboard and pointer cell focus across the header, body and footer.

use crate::{Range, RowShift, Section};

/// Navigation keys understood by [`CellFocusController::handle_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Space,
    Escape,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// The single focused coordinate of a grid.
///
/// `columns` spans more than one column when a joined header/footer cell has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FocusedCell {
    pub section: Section,
    pub row: usize,
    pub columns: Range,
}

/// What the focus controller needs to know about the grid.
pub trait FocusBounds {
    fn row_count(&self, section: Section) -> usize;

    /// Number of visible columns.
    fn column_count(&self) -> usize;

    /// Body rows currently inside the viewport.
    fn visible_body_rows(&self) -> Range;

    fn frozen_column_count(&self) -> usize;

    /// The columns covered by the cell at `(row, column)` of a static section.
    fn cell_span(&self, _section: Section, _row: usize, column: usize) -> Range {
        Range::with_length(column, 1)
    }
}

/// Outcome of a focus transition.
///
/// The grid uses it to move slot focus flags and to bring the new cell into view, all within
/// the call that caused the change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusChange {
    pub previous: Option<FocusedCell>,
    pub current: Option<FocusedCell>,
    /// Body row to scroll into view.
    pub scroll_to_row: Option<usize>,
    /// Visible column to scroll into view (never a frozen one).
    pub scroll_to_column: Option<usize>,
}

impl FocusChange {
    fn unchanged(cell: Option<FocusedCell>) -> Self {
        Self {
            previous: cell,
            current: cell,
            scroll_to_row: None,
            scroll_to_column: None,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.previous != self.current
    }

    /// Whether either side of the change touches `section`.
    pub fn touches(&self, section: Section) -> bool {
        self.previous.is_some_and(|c| c.section == section)
            || self.current.is_some_and(|c| c.section == section)
    }
}

/// Tracks the focused cell and the last focused row of every section.
#[derive(Clone, Debug, Default)]
pub struct CellFocusController {
    focused: Option<FocusedCell>,
    last_rows: [usize; 3],
}

fn slot_of(section: Section) -> usize {
    match section {
        Section::Header => 0,
        Section::Body => 1,
        Section::Footer => 2,
    }
}

impl CellFocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<FocusedCell> {
        self.focused
    }

    /// The row focus returns to when `section` is entered again.
    pub fn last_focused_row(&self, section: Section) -> usize {
        match self.focused {
            Some(c) if c.section == section => c.row,
            _ => self.last_rows[slot_of(section)],
        }
    }

    /// Focuses a cell directly (click or programmatic). Out-of-range coordinates are clamped;
    /// an empty section or a grid without columns leaves focus unchanged.
    pub fn set_focus(
        &mut self,
        section: Section,
        row: usize,
        column: usize,
        bounds: &dyn FocusBounds,
    ) -> FocusChange {
        let rows = bounds.row_count(section);
        let columns = bounds.column_count();
        if rows == 0 || columns == 0 {
            return FocusChange::unchanged(self.focused);
        }
        let row = row.min(rows - 1);
        let column = column.min(columns - 1);
        let span = match section {
            Section::Body => Range::with_length(column, 1),
            _ => bounds.cell_span(section, row, column),
        };

        let previous = self.focused;
        if let Some(prev) = previous {
            if prev.section != section {
                self.last_rows[slot_of(prev.section)] = prev.row;
            }
        }
        let cell = FocusedCell {
            section,
            row,
            columns: span,
        };
        self.focused = Some(cell);
        vtrace!(?section, row, column, "CellFocusController::set_focus");

        FocusChange {
            previous,
            current: Some(cell),
            scroll_to_row: (section == Section::Body).then_some(row),
            scroll_to_column: (column >= bounds.frozen_column_count()).then_some(column),
        }
    }

    /// Moves focus in response to a key press. Keys that cannot move focus are no-ops.
    pub fn handle_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        bounds: &dyn FocusBounds,
    ) -> FocusChange {
        let Some(cur) = self.focused else {
            return FocusChange::unchanged(None);
        };
        let mut section = cur.section;
        let mut row = cur.row as isize;
        let mut column = cur.columns.start();
        let section_rows = bounds.row_count(section);

        match key {
            Key::Down => row += 1,
            Key::Up => row -= 1,
            Key::Right => {
                if cur.columns.end() >= bounds.column_count() {
                    return FocusChange::unchanged(self.focused);
                }
                column = cur.columns.end();
            }
            Key::Left => {
                if column == 0 {
                    return FocusChange::unchanged(self.focused);
                }
                column -= 1;
            }
            Key::Tab => {
                let next = if modifiers.shift {
                    cycle_section(section, false, bounds)
                } else {
                    cycle_section(section, true, bounds)
                };
                if next == section {
                    return FocusChange::unchanged(self.focused);
                }
                section = next;
            }
            Key::Home => {
                if section_rows > 0 {
                    row = 0;
                }
            }
            Key::End => {
                if section_rows > 0 {
                    row = section_rows as isize - 1;
                }
            }
            Key::PageUp | Key::PageDown => {
                if section_rows > 0 {
                    let down = key == Key::PageDown;
                    let visible = bounds.visible_body_rows();
                    let first = visible.start() as isize;
                    let last = visible.end().saturating_sub(1) as isize;
                    // Page from the nearest visible edge if the focused row is off screen.
                    if row < first || row > last {
                        row = if down { last } else { first };
                    }
                    let by = (last - first - 1).max(1);
                    row += if down { by } else { -by };
                    row = row.clamp(0, section_rows as isize - 1);
                }
            }
            Key::Enter | Key::Space | Key::Escape => return FocusChange::unchanged(self.focused),
        }

        let row = if section != cur.section {
            self.last_rows[slot_of(section)] as isize
        } else if row < 0 {
            match adjacent_section(section, false, bounds) {
                Some(prev) => {
                    section = prev;
                    if prev == Section::Body {
                        bounds.visible_body_rows().end().saturating_sub(1) as isize
                    } else {
                        bounds.row_count(prev) as isize - 1
                    }
                }
                None => 0,
            }
        } else if row >= section_rows as isize {
            match adjacent_section(section, true, bounds) {
                Some(next) => {
                    section = next;
                    if next == Section::Body {
                        bounds.visible_body_rows().start() as isize
                    } else {
                        0
                    }
                }
                None => section_rows as isize - 1,
            }
        } else {
            row
        };

        if bounds.row_count(section) == 0 {
            return FocusChange::unchanged(self.focused);
        }
        self.set_focus(section, row.max(0) as usize, column, bounds)
    }

    /// Adjusts a focused body row after a structural change of the body.
    pub fn apply_shift(&mut self, shift: RowShift, bounds: &dyn FocusBounds) -> FocusChange {
        match shift {
            RowShift::Inserted(added) => self.rows_added(added, bounds),
            RowShift::Removed(removed) => self.rows_removed(removed, bounds),
        }
    }

    fn rows_added(&mut self, added: Range, bounds: &dyn FocusBounds) -> FocusChange {
        let previous = self.focused;
        let Some(cell) = self.focused.as_mut() else {
            return FocusChange::unchanged(None);
        };
        if cell.section != Section::Body || added.is_empty() || added.start() > cell.row {
            return FocusChange::unchanged(previous);
        }
        let max = bounds.row_count(Section::Body).saturating_sub(1);
        cell.row = (cell.row + added.len()).min(max);
        self.changed_from(previous)
    }

    fn rows_removed(&mut self, removed: Range, bounds: &dyn FocusBounds) -> FocusChange {
        let previous = self.focused;
        let Some(cur) = self.focused else {
            return FocusChange::unchanged(None);
        };
        if cur.section != Section::Body || removed.is_empty() {
            return FocusChange::unchanged(previous);
        }

        let remaining = bounds.row_count(Section::Body);
        if !removed.contains(cur.row) {
            if removed.start() > cur.row {
                return FocusChange::unchanged(previous);
            }
            self.focused = Some(FocusedCell {
                row: cur.row - removed.len(),
                ..cur
            });
        } else if remaining > removed.start() {
            self.focused = Some(FocusedCell {
                row: removed.start(),
                ..cur
            });
        } else if removed.start() > 0 {
            self.focused = Some(FocusedCell {
                row: (removed.start() - 1).min(remaining.saturating_sub(1)),
                ..cur
            });
        } else {
            self.last_rows[slot_of(Section::Body)] = 0;
            self.focused = [Section::Header, Section::Footer]
                .into_iter()
                .find(|&s| bounds.row_count(s) > 0)
                .map(|s| {
                    let row = self.last_rows[slot_of(s)].min(bounds.row_count(s) - 1);
                    let column = cur.columns.start().min(bounds.column_count().saturating_sub(1));
                    FocusedCell {
                        section: s,
                        row,
                        columns: bounds.cell_span(s, row, column),
                    }
                });
            vdebug!(fallback = ?self.focused.map(|c| c.section), "focused body rows removed");
        }
        self.changed_from(previous)
    }

    /// Shifts the focused column range, following a moved column.
    pub fn offset_column_range(&mut self, delta: isize) {
        if let Some(cell) = self.focused.as_mut() {
            cell.columns = cell.columns.offset_by(delta);
        }
    }

    /// Re-validates the focused cell after rows or columns changed outside of body shifts
    /// (static rows removed, columns hidden or removed, joins changed).
    pub fn revalidate(&mut self, bounds: &dyn FocusBounds) -> FocusChange {
        let previous = self.focused;
        let Some(cur) = previous else {
            return FocusChange::unchanged(None);
        };
        let columns = bounds.column_count();
        let section = [cur.section, Section::Body, Section::Header, Section::Footer]
            .into_iter()
            .find(|&s| bounds.row_count(s) > 0);
        self.focused = match section {
            Some(section) if columns > 0 => {
                let row = if section == cur.section {
                    cur.row
                } else {
                    self.last_rows[slot_of(section)]
                }
                .min(bounds.row_count(section) - 1);
                let column = cur.columns.start().min(columns - 1);
                let span = match section {
                    Section::Body => Range::with_length(column, 1),
                    _ => bounds.cell_span(section, row, column),
                };
                Some(FocusedCell {
                    section,
                    row,
                    columns: span,
                })
            }
            _ => None,
        };
        self.changed_from(previous)
    }

    pub fn clear(&mut self) -> FocusChange {
        let previous = self.focused.take();
        self.changed_from(previous)
    }

    fn changed_from(&self, previous: Option<FocusedCell>) -> FocusChange {
        FocusChange {
            previous,
            current: self.focused,
            scroll_to_row: None,
            scroll_to_column: None,
        }
    }
}

/// Next non-empty section in Tab order, wrapping around. Returns `current` if every other
/// section is empty.
fn cycle_section(current: Section, forward: bool, bounds: &dyn FocusBounds) -> Section {
    let mut s = current;
    for _ in 0..2 {
        s = if forward { s.next() } else { s.previous() };
        if bounds.row_count(s) > 0 {
            return s;
        }
    }
    current
}

/// The nearest non-empty section above (`forward == false`) or below, without wrapping.
fn adjacent_section(current: Section, forward: bool, bounds: &dyn FocusBounds) -> Option<Section> {
    let order = [Section::Header, Section::Body, Section::Footer];
    let pos = order.iter().position(|&s| s == current)?;
    if forward {
        order[pos + 1..]
            .iter()
            .copied()
            .find(|&s| bounds.row_count(s) > 0)
    } else {
        order[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&s| bounds.row_count(s) > 0)
    }
}
