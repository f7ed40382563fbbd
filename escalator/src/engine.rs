//! The body virtualization engine.
//!
//! An [`Escalator`] keeps a small arena of presentation [`Slot`]s, each bound to at most one
//! logical body row. Scrolling, resizing and structural changes never create one slot per row:
//! slots that leave the materialized range are released and rebound to the rows entering it,
//! and the pool only grows or shrinks with the size of the materialized range itself.
//!
//! Columns are virtualized the same way inside every bound slot: frozen columns are always
//! live, the rest only while they intersect the horizontal viewport (plus column overscan).

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::data::DataSource;
use crate::renderer::{CellKind, CellRef, CellRenderer, SlotId};
use crate::scroll::ScrollController;
use crate::{ColumnId, GridOptions, Range, RowShift, Section, Viewport};

/// The focused body cell, as far as slot flags are concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyFocus {
    pub row: usize,
    pub columns: Range,
}

/// Everything a render pass needs from outside the engine.
pub struct BodyContext<'a, D: DataSource, R> {
    data: &'a D,
    renderer: &'a mut R,
    selection: Option<&'a BTreeSet<usize>>,
    focus: Option<BodyFocus>,
}

impl<'a, D: DataSource, R: CellRenderer<D::Row>> BodyContext<'a, D, R> {
    pub fn new(data: &'a D, renderer: &'a mut R) -> Self {
        Self {
            data,
            renderer,
            selection: None,
            focus: None,
        }
    }

    pub fn with_selection(mut self, selection: &'a BTreeSet<usize>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_focus(mut self, focus: Option<BodyFocus>) -> Self {
        self.focus = focus;
        self
    }

    fn is_selected(&self, row: usize) -> bool {
        self.selection.is_some_and(|s| s.contains(&row))
    }
}

/// Per-cell state of a slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotCell {
    live: bool,
    attached: bool,
    has_content: bool,
    focused: bool,
    style: Option<String>,
}

impl SlotCell {
    /// The cell is present in the slot (its column is live).
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// A widget is attached to the cell.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The last render succeeded.
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }
}

/// A reusable presentation row.
#[derive(Clone, Debug)]
pub struct Slot {
    id: SlotId,
    binding: Option<usize>,
    has_data: bool,
    stripe: bool,
    selected: bool,
    focused: bool,
    style: Option<String>,
    cells: Vec<SlotCell>,
}

impl Slot {
    fn new(id: SlotId, columns: usize) -> Self {
        Self {
            id,
            binding: None,
            has_data: false,
            stripe: false,
            selected: false,
            focused: false,
            style: None,
            cells: alloc::vec![SlotCell::default(); columns],
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn binding(&self) -> Option<usize> {
        self.binding
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Odd rows are striped.
    pub fn is_stripe(&self) -> bool {
        self.stripe
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn cells(&self) -> &[SlotCell] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&SlotCell> {
        self.cells.get(column)
    }

    fn reset_flags(&mut self) {
        self.has_data = false;
        self.stripe = false;
        self.selected = false;
        self.focused = false;
        self.style = None;
    }
}

/// Column facts shared by every slot during one pass.
struct ColumnView<'a> {
    ids: &'a [ColumnId],
    kinds: &'a [CellKind],
    frozen: usize,
    live: Range,
}

impl ColumnView<'_> {
    fn is_live(&self, column: usize) -> bool {
        column < self.frozen || self.live.contains(column)
    }

    fn cell_ref(&self, slot: SlotId, row: usize, column: usize) -> CellRef {
        CellRef {
            slot,
            row,
            column,
            column_id: self.ids[column],
        }
    }

    fn is_widget(&self, column: usize) -> bool {
        self.kinds[column] == CellKind::Widget
    }
}

/// The row/column virtualization engine of a grid body.
#[derive(Clone, Debug)]
pub struct Escalator {
    scroll: ScrollController,
    columns: Vec<ColumnId>,
    kinds: Vec<CellKind>,
    default_column_width: f64,
    slots: Vec<Slot>,
    next_slot_id: u64,
    materialized: Range,
    pending_availability: Option<Range>,
    header_rows: usize,
    footer_rows: usize,
}

impl Escalator {
    pub fn new(options: &GridOptions) -> Self {
        vdebug!(
            overscan = options.overscan,
            row_height = options.default_row_height,
            "Escalator::new"
        );
        Self {
            scroll: ScrollController::new(options),
            columns: Vec::new(),
            kinds: Vec::new(),
            default_column_width: options.default_column_width,
            slots: Vec::new(),
            next_slot_id: 0,
            materialized: Range::empty_at(0),
            pending_availability: None,
            header_rows: 0,
            footer_rows: 0,
        }
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn row_count(&self) -> usize {
        self.scroll.row_count()
    }

    /// Row count of any of the three containers.
    pub fn section_row_count(&self, section: Section) -> usize {
        match section {
            Section::Header => self.header_rows,
            Section::Body => self.scroll.row_count(),
            Section::Footer => self.footer_rows,
        }
    }

    pub(crate) fn set_static_row_counts(&mut self, header: usize, footer: usize) {
        self.header_rows = header;
        self.footer_rows = footer;
    }

    /// The logical rows that currently have live slots.
    pub fn visible_row_range(&self) -> Range {
        self.materialized
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn live_slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_for_row(&self, row: usize) -> Option<&Slot> {
        self.slots.iter().find(|s| s.binding == Some(row))
    }

    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn live_column_range(&self) -> Range {
        self.scroll.live_column_range()
    }

    /// Takes the data availability request produced by the last change of the materialized
    /// range, if any.
    pub fn take_availability_request(&mut self) -> Option<Range> {
        self.pending_availability.take()
    }

    /// Verifies slot bookkeeping: every logical row has at most one slot, every slot is bound
    /// inside the materialized range and the pool is no larger than that range.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if self.slots.len() > self.materialized.len() {
            return Err("slot pool is larger than the materialized range");
        }
        let mut seen = BTreeSet::new();
        for slot in &self.slots {
            let Some(row) = slot.binding else {
                return Err("free slot left in the pool");
            };
            if !self.materialized.contains(row) {
                return Err("slot bound outside the materialized range");
            }
            if !seen.insert(row) {
                return Err("two slots bound to the same row");
            }
            if slot.cells.len() != self.columns.len() {
                return Err("slot cell count does not match column count");
            }
        }
        Ok(())
    }

    // --- rows -----------------------------------------------------------------------------

    /// Resizes the logical row space. Slots bound past the new end are released; growth
    /// materializes nothing that is not visible.
    pub fn set_row_count<D, R>(&mut self, count: usize, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        vtrace!(count, "Escalator::set_row_count");
        self.scroll.set_row_count(count);
        self.sync_rows(cx);
    }

    /// Inserts `count` rows at `at`, shifting the bindings of every slot at or after it.
    pub fn insert_rows<D, R>(
        &mut self,
        at: usize,
        count: usize,
        cx: &mut BodyContext<'_, D, R>,
    ) -> RowShift
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let at = at.min(self.row_count());
        let added = Range::with_length(at, count);
        if count == 0 {
            return RowShift::Inserted(added);
        }
        vtrace!(at, count, "Escalator::insert_rows");

        let visible_start = self.scroll.visible_row_range().start();
        let top_before = self.scroll.scroll_top();
        self.scroll.insert_rows(at, count);
        if at < visible_start {
            // Keep the visible rows in place when rows appear above them.
            let added_height = self.height_of(added);
            self.scroll.set_scroll_top(top_before.saturating_add(added_height));
        }

        for slot in &mut self.slots {
            if let Some(row) = slot.binding.as_mut() {
                if *row >= at {
                    *row += count;
                }
            }
        }
        self.sync_rows(cx);
        self.refresh_bound(|row| row >= added.end(), cx);
        RowShift::Inserted(added)
    }

    /// Removes rows, destroying the slots bound inside the removed range.
    pub fn remove_rows<D, R>(
        &mut self,
        at: usize,
        count: usize,
        cx: &mut BodyContext<'_, D, R>,
    ) -> RowShift
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let removed =
            Range::with_length(at, count).restrict_to(&Range::with_length(0, self.row_count()));
        if removed.is_empty() {
            return RowShift::Removed(removed);
        }
        vtrace!(at = removed.start(), count = removed.len(), "Escalator::remove_rows");

        // Removed content above the viewport top: whole rows above the first visible row,
        // plus the scrolled-off part of that row when it goes too.
        let top_before = self.scroll.scroll_top();
        let visible_start = self.scroll.visible_row_range().start();
        let mut removed_above =
            self.height_of(removed.restrict_to(&Range::with_length(0, visible_start)));
        if removed.contains(visible_start) {
            let row_top = self.scroll.row_top(visible_start).unwrap_or(top_before);
            removed_above += top_before.saturating_sub(row_top);
        }

        let view = ColumnView {
            ids: &self.columns,
            kinds: &self.kinds,
            frozen: self.scroll.frozen_column_count(),
            live: self.scroll.live_column_range(),
        };
        for slot in &mut self.slots {
            if slot.binding.is_some_and(|row| removed.contains(row)) {
                release(slot, &view, cx);
            }
        }
        let before = self.slots.len();
        self.slots.retain(|s| s.binding.is_some());
        if before != self.slots.len() {
            vtrace!(destroyed = before - self.slots.len(), "Escalator::remove_rows: slots destroyed");
        }

        for slot in &mut self.slots {
            if let Some(row) = slot.binding.as_mut() {
                if *row >= removed.end() {
                    *row -= removed.len();
                }
            }
        }

        self.scroll.remove_rows(removed.start(), removed.len());
        if removed_above > 0 {
            self.scroll
                .set_scroll_top(top_before.saturating_sub(removed_above));
        }
        self.sync_rows(cx);
        self.refresh_bound(|row| row >= removed.start(), cx);
        RowShift::Removed(removed)
    }

    /// Re-renders already-bound slots in `[at, at + count)` without structural change.
    pub fn refresh_rows<D, R>(&mut self, at: usize, count: usize, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let range = Range::with_length(at, count);
        self.refresh_bound(|row| range.contains(row), cx);
    }

    pub fn refresh_all<D, R>(&mut self, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.refresh_bound(|_| true, cx);
    }

    pub fn set_default_row_height<D, R>(&mut self, px: u32, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.scroll.set_default_row_height(px);
        self.sync_rows(cx);
    }

    /// Gives one row an explicit height, e.g. to make room for a details area.
    pub fn set_row_height<D, R>(&mut self, index: usize, px: u32, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let adjusted = self.scroll.set_row_height(index, px);
        if adjusted != 0 {
            vtrace!(index, adjusted, "Escalator::set_row_height: scroll adjusted");
        }
        self.sync_rows(cx);
    }

    pub fn reset_row_heights<D, R>(&mut self, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.scroll.reset_row_heights();
        self.sync_rows(cx);
    }

    pub fn row_top(&self, index: usize) -> Option<u64> {
        self.scroll.row_top(index)
    }

    // --- scrolling ------------------------------------------------------------------------

    pub fn set_viewport<D, R>(&mut self, viewport: Viewport, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.scroll.set_viewport(viewport);
        self.sync_rows(cx);
        self.sync_columns(cx);
    }

    pub fn set_overscan<D, R>(&mut self, overscan: usize, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.scroll.set_overscan(overscan);
        self.sync_rows(cx);
    }

    /// Applies a vertical offset (clamped). Returns the applied offset.
    pub fn set_scroll_top<D, R>(&mut self, px: u64, cx: &mut BodyContext<'_, D, R>) -> u64
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let applied = self.scroll.set_scroll_top(px);
        self.sync_rows(cx);
        applied
    }

    /// Applies a horizontal offset (clamped). Returns the applied offset.
    pub fn set_scroll_left<D, R>(&mut self, px: f64, cx: &mut BodyContext<'_, D, R>) -> f64
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let applied = self.scroll.set_scroll_left(px);
        self.sync_columns(cx);
        applied
    }

    pub(crate) fn notify_scroll_event(&mut self, now_ms: u64) {
        self.scroll.notify_scroll_event(now_ms);
    }

    pub(crate) fn update_scrolling(&mut self, now_ms: u64) -> bool {
        self.scroll.update_scrolling(now_ms)
    }

    // --- columns --------------------------------------------------------------------------

    /// Inserts columns at `at`. New columns start at the default natural width until the
    /// width resolver assigns them a final one.
    pub fn insert_columns<D, R>(
        &mut self,
        at: usize,
        ids: &[ColumnId],
        cx: &mut BodyContext<'_, D, R>,
    ) where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        if ids.is_empty() {
            return;
        }
        let at = at.min(self.columns.len());
        vtrace!(at, count = ids.len(), "Escalator::insert_columns");

        // Cells are addressed by column index, so every live cell is re-rendered after the
        // structural change.
        self.release_all_cells(cx);
        let kinds: Vec<CellKind> = ids.iter().map(|&id| cx.renderer.cell_kind(id)).collect();
        self.columns.splice(at..at, ids.iter().copied());
        self.kinds.splice(at..at, kinds);
        self.scroll
            .insert_columns(at, ids.len(), self.default_column_width);
        for slot in &mut self.slots {
            slot.cells.splice(
                at..at,
                core::iter::repeat_n(SlotCell::default(), ids.len()),
            );
        }
        self.sync_columns(cx);
        self.refresh_all(cx);
    }

    pub fn remove_columns<D, R>(&mut self, at: usize, count: usize, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let removed = Range::with_length(at, count)
            .restrict_to(&Range::with_length(0, self.columns.len()));
        if removed.is_empty() {
            return;
        }
        vtrace!(at = removed.start(), count = removed.len(), "Escalator::remove_columns");

        self.release_all_cells(cx);
        self.columns.drain(removed.iter());
        self.kinds.drain(removed.iter());
        for slot in &mut self.slots {
            slot.cells.drain(removed.iter());
        }
        self.scroll.remove_columns(removed.start(), removed.len());
        self.sync_columns(cx);
        self.refresh_all(cx);
    }

    /// Reorders columns. `order[i]` is the current index of the column that moves to `i`.
    pub fn reorder_columns<D, R>(&mut self, order: &[usize], cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        debug_assert_eq!(order.len(), self.columns.len());
        if order.len() != self.columns.len() {
            return;
        }
        self.release_all_cells(cx);
        self.columns = order.iter().map(|&i| self.columns[i]).collect();
        self.kinds = order.iter().map(|&i| self.kinds[i]).collect();
        self.scroll.permute_columns(order);
        self.sync_columns(cx);
        self.refresh_all(cx);
    }

    /// Applies final column widths, e.g. from the width resolver.
    pub fn set_column_widths<D, R>(&mut self, widths: &[(usize, f64)], cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        for &(index, px) in widths {
            self.scroll.set_column_width(index, px);
        }
        self.scroll.reclamp();
        self.sync_columns(cx);
    }

    pub fn set_frozen_column_count<D, R>(&mut self, count: usize, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        self.scroll.set_frozen_column_count(count);
        self.sync_columns(cx);
    }

    // --- flags ----------------------------------------------------------------------------

    /// Moves the focus flags of slots and cells without re-rendering.
    pub fn set_focus(&mut self, focus: Option<BodyFocus>) {
        for slot in &mut self.slots {
            let focused_row = focus.filter(|f| slot.binding == Some(f.row));
            slot.focused = focused_row.is_some();
            for (column, cell) in slot.cells.iter_mut().enumerate() {
                cell.focused =
                    cell.live && focused_row.is_some_and(|f| f.columns.contains(column));
            }
        }
    }

    pub fn set_selected(&mut self, row: usize, selected: bool) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.binding == Some(row)) {
            slot.selected = selected;
        }
    }

    pub fn clear_selected(&mut self) {
        for slot in &mut self.slots {
            slot.selected = false;
        }
    }

    // --- internals ------------------------------------------------------------------------

    fn height_of(&self, range: Range) -> u64 {
        if range.is_empty() {
            return 0;
        }
        let top = self.scroll.row_top(range.start()).unwrap_or(0);
        let bottom = self
            .scroll
            .row_top(range.end())
            .unwrap_or_else(|| self.scroll.scroll_height());
        bottom.saturating_sub(top)
    }

    /// Rebinds slots so that exactly the materialized range is covered.
    fn sync_rows<D, R>(&mut self, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let target = self.scroll.materialized_row_range();
        let view = ColumnView {
            ids: &self.columns,
            kinds: &self.kinds,
            frozen: self.scroll.frozen_column_count(),
            live: self.scroll.live_column_range(),
        };

        let mut free = Vec::new();
        let mut covered = alloc::vec![false; target.len()];
        for (i, slot) in self.slots.iter_mut().enumerate() {
            match slot.binding {
                Some(row) if target.contains(row) => covered[row - target.start()] = true,
                Some(_) => {
                    release(slot, &view, cx);
                    free.push(i);
                }
                None => free.push(i),
            }
        }

        let mut rebound = 0usize;
        let mut created = 0usize;
        for row in target {
            if covered[row - target.start()] {
                continue;
            }
            let index = match free.pop() {
                Some(i) => {
                    rebound += 1;
                    i
                }
                None => {
                    let id = SlotId(self.next_slot_id);
                    self.next_slot_id += 1;
                    self.slots.push(Slot::new(id, view.ids.len()));
                    created += 1;
                    self.slots.len() - 1
                }
            };
            bind(&mut self.slots[index], row, &view, cx);
        }

        let before = self.slots.len();
        self.slots.retain(|s| s.binding.is_some());
        let destroyed = before - self.slots.len();
        self.slots.sort_by_key(|s| s.binding);

        if rebound + created + destroyed > 0 {
            vtrace!(
                start = target.start(),
                end = target.end(),
                rebound,
                created,
                destroyed,
                "Escalator::sync_rows"
            );
        }

        if target != self.materialized {
            self.materialized = target;
            if !target.is_empty() {
                self.pending_availability = Some(target);
            }
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }

    /// Makes the live cells of every bound slot match the live column set.
    fn sync_columns<D, R>(&mut self, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let view = ColumnView {
            ids: &self.columns,
            kinds: &self.kinds,
            frozen: self.scroll.frozen_column_count(),
            live: self.scroll.live_column_range(),
        };
        for slot in &mut self.slots {
            let Some(row) = slot.binding else {
                continue;
            };
            let data = cx.data;
            let data_row = data.row(row);
            for column in 0..view.ids.len() {
                let live = view.is_live(column);
                if live && !slot.cells[column].live {
                    show_cell(slot, row, column, &view, cx);
                    render_cell(slot, row, column, data_row, &view, cx);
                } else if !live && slot.cells[column].live {
                    hide_cell(slot, row, column, &view, cx);
                }
            }
        }
    }

    fn release_all_cells<D, R>(&mut self, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let view = ColumnView {
            ids: &self.columns,
            kinds: &self.kinds,
            frozen: self.scroll.frozen_column_count(),
            live: self.scroll.live_column_range(),
        };
        for slot in &mut self.slots {
            let Some(row) = slot.binding else {
                continue;
            };
            for column in 0..view.ids.len() {
                if slot.cells[column].live {
                    hide_cell(slot, row, column, &view, cx);
                }
            }
        }
    }

    fn refresh_bound<D, R>(&mut self, mut filter: impl FnMut(usize) -> bool, cx: &mut BodyContext<'_, D, R>)
    where
        D: DataSource,
        R: CellRenderer<D::Row>,
    {
        let view = ColumnView {
            ids: &self.columns,
            kinds: &self.kinds,
            frozen: self.scroll.frozen_column_count(),
            live: self.scroll.live_column_range(),
        };
        for slot in &mut self.slots {
            if slot.binding.is_some_and(&mut filter) {
                render_row(slot, &view, cx);
            }
        }
    }
}

fn bind<D, R>(slot: &mut Slot, row: usize, view: &ColumnView<'_>, cx: &mut BodyContext<'_, D, R>)
where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    debug_assert!(slot.binding.is_none(), "binding a slot that is still bound");
    slot.binding = Some(row);
    slot.reset_flags();
    for column in 0..view.ids.len() {
        if view.is_live(column) {
            show_cell(slot, row, column, view, cx);
        }
    }
    render_row(slot, view, cx);
}

/// Detaches every cell of the slot and returns it to the free state.
fn release<D, R>(slot: &mut Slot, view: &ColumnView<'_>, cx: &mut BodyContext<'_, D, R>)
where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    let Some(row) = slot.binding else {
        return;
    };
    for column in 0..slot.cells.len() {
        if slot.cells[column].live {
            hide_cell(slot, row, column, view, cx);
        }
    }
    slot.reset_flags();
    slot.binding = None;
}

fn show_cell<D, R>(
    slot: &mut Slot,
    row: usize,
    column: usize,
    view: &ColumnView<'_>,
    cx: &mut BodyContext<'_, D, R>,
) where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    let cell = &mut slot.cells[column];
    cell.live = true;
    if view.is_widget(column) && !cell.attached {
        cell.attached = true;
        cx.renderer.attach(view.cell_ref(slot.id, row, column));
    }
}

fn hide_cell<D, R>(
    slot: &mut Slot,
    row: usize,
    column: usize,
    view: &ColumnView<'_>,
    cx: &mut BodyContext<'_, D, R>,
) where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    let cell = &mut slot.cells[column];
    if cell.attached {
        cx.renderer.detach(view.cell_ref(slot.id, row, column));
    }
    *cell = SlotCell::default();
}

fn render_row<D, R>(slot: &mut Slot, view: &ColumnView<'_>, cx: &mut BodyContext<'_, D, R>)
where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    let Some(row) = slot.binding else {
        return;
    };
    let data = cx.data;
    let data_row = data.row(row);
    slot.has_data = data_row.is_some();
    slot.stripe = row % 2 == 1;
    slot.selected = cx.is_selected(row);
    slot.focused = cx.focus.is_some_and(|f| f.row == row);
    slot.style = match data_row {
        Some(value) => match cx.renderer.row_style(row, value) {
            Ok(style) => style,
            Err(err) => {
                log_render_error(row, None, &*err, "row style generator failed");
                None
            }
        },
        None => None,
    };
    for column in 0..slot.cells.len() {
        if slot.cells[column].live {
            render_cell(slot, row, column, data_row, view, cx);
        }
    }
}

fn render_cell<D, R>(
    slot: &mut Slot,
    row: usize,
    column: usize,
    data_row: Option<&D::Row>,
    view: &ColumnView<'_>,
    cx: &mut BodyContext<'_, D, R>,
) where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    let cell_ref = view.cell_ref(slot.id, row, column);
    let widget = view.is_widget(column);
    let focused = cx
        .focus
        .is_some_and(|f| f.row == row && f.columns.contains(column));
    let cell = &mut slot.cells[column];
    cell.focused = focused;

    let Some(data) = data_row else {
        cx.renderer.clear(cell_ref);
        cell.has_content = false;
        cell.style = None;
        if widget {
            cx.renderer.set_content_visible(cell_ref, false);
        }
        return;
    };

    match cx.renderer.render(cell_ref, data) {
        Ok(()) => cell.has_content = true,
        Err(err) => {
            log_render_error(row, Some(column), &*err, "cell renderer failed");
            cx.renderer.clear(cell_ref);
            cell.has_content = false;
        }
    }
    cell.style = match cx.renderer.cell_style(cell_ref, data) {
        Ok(style) => style,
        Err(err) => {
            log_render_error(row, Some(column), &*err, "cell style generator failed");
            None
        }
    };
    if widget {
        cx.renderer.set_content_visible(cell_ref, true);
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_render_error(
    row: usize,
    column: Option<usize>,
    err: &(dyn core::error::Error + Send + Sync),
    what: &str,
) {
    vwarn!(row, column = ?column, error = %err, "{what}");
}
