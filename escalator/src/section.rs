use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{GridError, Result};
use crate::{ColumnId, Range, Section};

/// Content of a header or footer cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellContent {
    #[default]
    Empty,
    Text(String),
    Html(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticCell {
    content: CellContent,
    style: Option<String>,
}

impl StaticCell {
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }
}

/// One header or footer row: a cell per attached column plus joined groups.
#[derive(Clone, Debug, Default)]
pub struct StaticRow {
    cells: BTreeMap<ColumnId, StaticCell>,
    groups: Vec<Vec<ColumnId>>,
    style: Option<String>,
}

impl StaticRow {
    fn with_columns(columns: &[ColumnId]) -> Self {
        Self {
            cells: columns.iter().map(|&id| (id, StaticCell::default())).collect(),
            ..Self::default()
        }
    }

    pub fn cell(&self, column: ColumnId) -> Option<&StaticCell> {
        self.cells.get(&column)
    }

    /// Joined column groups of this row.
    pub fn groups(&self) -> &[Vec<ColumnId>] {
        &self.groups
    }

    pub fn group_of(&self, column: ColumnId) -> Option<&[ColumnId]> {
        self.groups
            .iter()
            .find(|g| g.contains(&column))
            .map(Vec::as_slice)
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }
}

/// A small in-memory row container for the header or the footer.
///
/// Mutations mark the section dirty; the grid refreshes dirty sections at the end of the turn
/// and holds back column width recalculation until they are clean.
#[derive(Clone, Debug)]
pub struct StaticSection {
    kind: Section,
    rows: Vec<StaticRow>,
    visible: bool,
    default_row: Option<usize>,
    // Attached columns in display order, with their hidden flag.
    columns: Vec<(ColumnId, bool)>,
    dirty: bool,
}

impl StaticSection {
    pub(crate) fn new(kind: Section) -> Self {
        debug_assert!(kind != Section::Body);
        Self {
            kind,
            rows: Vec::new(),
            visible: true,
            default_row: None,
            columns: Vec::new(),
            dirty: false,
        }
    }

    pub fn kind(&self) -> Section {
        self.kind
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows taking part in layout: zero when the section is hidden.
    pub fn visible_row_count(&self) -> usize {
        if self.visible { self.rows.len() } else { 0 }
    }

    pub fn row(&self, index: usize) -> Option<&StaticRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[StaticRow] {
        &self.rows
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// The row whose cells act as sort controls.
    pub fn default_row(&self) -> Option<usize> {
        self.default_row
    }

    pub fn set_default_row(&mut self, row: Option<usize>) -> Result<()> {
        if let Some(index) = row {
            self.check_row(index)?;
        }
        self.default_row = row;
        self.dirty = true;
        Ok(())
    }

    pub fn append_row(&mut self) -> usize {
        let at = self.rows.len();
        self.rows.push(StaticRow::with_columns(&self.column_ids()));
        self.dirty = true;
        at
    }

    pub fn prepend_row(&mut self) -> usize {
        // Cannot fail: 0 is always a valid insertion point.
        let _ = self.insert_row(0);
        0
    }

    pub fn insert_row(&mut self, at: usize) -> Result<()> {
        if at > self.rows.len() {
            return Err(GridError::StaticRowOutOfBounds {
                index: at,
                count: self.rows.len(),
            });
        }
        self.rows.insert(at, StaticRow::with_columns(&self.column_ids()));
        if let Some(default) = self.default_row.as_mut() {
            if *default >= at {
                *default += 1;
            }
        }
        self.dirty = true;
        Ok(())
    }

    pub fn remove_row(&mut self, at: usize) -> Result<StaticRow> {
        self.check_row(at)?;
        let row = self.rows.remove(at);
        self.default_row = match self.default_row {
            Some(d) if d == at => None,
            Some(d) if d > at => Some(d - 1),
            other => other,
        };
        self.dirty = true;
        vtrace!(section = ?self.kind, at, "static row removed");
        Ok(row)
    }

    pub fn set_text(&mut self, row: usize, column: ColumnId, text: impl Into<String>) -> Result<()> {
        self.set_content(row, column, CellContent::Text(text.into()))
    }

    pub fn set_html(&mut self, row: usize, column: ColumnId, html: impl Into<String>) -> Result<()> {
        self.set_content(row, column, CellContent::Html(html.into()))
    }

    pub fn set_content(&mut self, row: usize, column: ColumnId, content: CellContent) -> Result<()> {
        self.check_row(row)?;
        let cell = self.rows[row]
            .cells
            .get_mut(&column)
            .ok_or(GridError::UnknownColumn(column))?;
        cell.content = content;
        self.dirty = true;
        Ok(())
    }

    pub fn set_cell_style(&mut self, row: usize, column: ColumnId, style: Option<String>) -> Result<()> {
        self.check_row(row)?;
        let cell = self.rows[row]
            .cells
            .get_mut(&column)
            .ok_or(GridError::UnknownColumn(column))?;
        cell.style = style;
        self.dirty = true;
        Ok(())
    }

    pub fn set_row_style(&mut self, row: usize, style: Option<String>) -> Result<()> {
        self.check_row(row)?;
        self.rows[row].style = style;
        self.dirty = true;
        Ok(())
    }

    /// Merges the cells of `columns` in `row` into one spanned cell.
    pub fn join(&mut self, row: usize, columns: &[ColumnId]) -> Result<()> {
        self.check_row(row)?;
        if columns.len() < 2 {
            return Err(GridError::JoinTooFewColumns(columns.len()));
        }
        let target = &self.rows[row];
        for (i, id) in columns.iter().enumerate() {
            if !target.cells.contains_key(id) {
                return Err(GridError::UnknownColumn(*id));
            }
            if target.group_of(*id).is_some() || columns[..i].contains(id) {
                return Err(GridError::ColumnAlreadyJoined(*id));
            }
        }
        self.rows[row].groups.push(columns.to_vec());
        self.dirty = true;
        Ok(())
    }

    /// Dissolves the group containing `column`. Returns whether a group was found.
    pub fn unjoin(&mut self, row: usize, column: ColumnId) -> Result<bool> {
        self.check_row(row)?;
        let groups = &mut self.rows[row].groups;
        let before = groups.len();
        groups.retain(|g| !g.contains(&column));
        let found = groups.len() != before;
        self.dirty |= found;
        Ok(found)
    }

    /// Number of visible columns the cell of `column` spans, or 0 when it is covered by another
    /// cell of its group.
    ///
    /// A group spans its non-hidden members when they are continuous in column order; otherwise
    /// every member is rendered on its own.
    pub fn colspan(&self, row: usize, column: ColumnId) -> usize {
        let Some(group) = self.rows.get(row).and_then(|r| r.group_of(column)) else {
            return 1;
        };
        if !self.is_continuous(group) {
            return 1;
        }
        let first_visible = self
            .columns
            .iter()
            .find(|(id, hidden)| !*hidden && group.contains(id))
            .map(|(id, _)| *id);
        match first_visible {
            Some(first) if first == column => self
                .columns
                .iter()
                .filter(|(id, hidden)| !*hidden && group.contains(id))
                .count()
                .max(1),
            Some(_) => 0,
            None => 1,
        }
    }

    /// The visible column range covered by the cell at `visible_column` in `row`.
    pub fn cell_range(&self, row: usize, visible_column: usize) -> Range {
        let single = Range::with_length(visible_column, 1);
        let visible: Vec<ColumnId> = self
            .columns
            .iter()
            .filter(|(_, hidden)| !*hidden)
            .map(|(id, _)| *id)
            .collect();
        let Some(&column) = visible.get(visible_column) else {
            return single;
        };
        let Some(group) = self.rows.get(row).and_then(|r| r.group_of(column)) else {
            return single;
        };
        if !self.is_continuous(group) {
            return single;
        }
        let members: Vec<usize> = visible
            .iter()
            .enumerate()
            .filter(|(_, id)| group.contains(*id))
            .map(|(i, _)| i)
            .collect();
        match (members.first(), members.last()) {
            (Some(&first), Some(&last)) => Range::with_length(first, last - first + 1),
            _ => single,
        }
    }

    fn is_continuous(&self, group: &[ColumnId]) -> bool {
        let mut positions: Vec<usize> = group
            .iter()
            .filter_map(|id| self.columns.iter().position(|(c, _)| c == id))
            .collect();
        positions.sort_unstable();
        positions.windows(2).all(|w| w[1] == w[0] + 1)
    }

    /// Follows the grid's attached columns: new columns get empty cells, removed columns lose
    /// theirs and leave their groups.
    pub(crate) fn sync_columns(&mut self, columns: &[(ColumnId, bool)]) {
        self.columns = columns.to_vec();
        for row in &mut self.rows {
            row.cells.retain(|id, _| columns.iter().any(|(c, _)| c == id));
            for (id, _) in columns {
                row.cells.entry(*id).or_default();
            }
            for group in &mut row.groups {
                group.retain(|id| columns.iter().any(|(c, _)| c == id));
            }
            row.groups.retain(|g| g.len() >= 2);
        }
        self.dirty = true;
    }

    fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|(id, _)| *id).collect()
    }

    fn check_row(&self, index: usize) -> Result<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(GridError::StaticRowOutOfBounds {
                index,
                count: self.rows.len(),
            })
        }
    }
}
