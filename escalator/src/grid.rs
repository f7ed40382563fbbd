//! The grid façade.
//!
//! [`Grid`] owns the body engine, the column model, the header and footer, focus, sorting,
//! selection and the work scheduler, and keeps them consistent: every structural change of the
//! body is applied to slots, focus and selection inside the same call.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::data::{DataChange, DataSource};
use crate::engine::{BodyContext, BodyFocus, Escalator};
use crate::error::{GridError, Result};
use crate::event::{EventOutcome, GridEvent};
use crate::focus::{CellFocusController, FocusBounds, FocusChange, FocusedCell, Key};
use crate::renderer::CellRenderer;
use crate::reorder::ColumnReorderSession;
use crate::scroll::ScrollController;
use crate::scheduler::{Scheduler, Tier, WidthRetry, WidthStep};
use crate::section::StaticSection;
use crate::sort::{SortEvent, SortOrder, SortOrderController};
use crate::watchdog::{OperationId, OperationKind, OperationWatchdog};
use crate::width::{ResolutionMode, WidthInput, resolve_column_widths};
use crate::{
    Column, ColumnId, ExpandRatio, GridChange, GridOptions, Range, RowShift, ScrollDestination,
    Section, SortDirection, Viewport,
};

/// Horizontal padding used when focus brings a column into view.
const FOCUS_COLUMN_PADDING: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum GridTask {
    RefreshSections,
    ColumnWidths,
    DelayedSort,
}

#[derive(Clone, Debug)]
struct AttachedColumn {
    id: ColumnId,
    column: Column,
    natural_width: Option<f64>,
}

struct Bounds<'a> {
    escalator: &'a Escalator,
    header: &'a StaticSection,
    footer: &'a StaticSection,
}

impl FocusBounds for Bounds<'_> {
    fn row_count(&self, section: Section) -> usize {
        match section {
            Section::Header => self.header.visible_row_count(),
            Section::Body => self.escalator.row_count(),
            Section::Footer => self.footer.visible_row_count(),
        }
    }

    fn column_count(&self) -> usize {
        self.escalator.column_count()
    }

    fn visible_body_rows(&self) -> Range {
        self.escalator.scroll().visible_row_range()
    }

    fn frozen_column_count(&self) -> usize {
        self.escalator.scroll().frozen_column_count()
    }

    fn cell_span(&self, section: Section, row: usize, column: usize) -> Range {
        match section {
            Section::Header => self.header.cell_range(row, column),
            Section::Footer => self.footer.cell_range(row, column),
            Section::Body => Range::with_length(column, 1),
        }
    }
}

/// A virtualized data grid over a [`DataSource`], rendered through a [`CellRenderer`].
///
/// The grid is single-threaded and clock-less: the adapter feeds it events, data callbacks and
/// turn boundaries ([`Grid::end_of_turn`], [`Grid::next_turn`]).
pub struct Grid<D: DataSource, R: CellRenderer<D::Row>> {
    options: GridOptions,
    data: D,
    renderer: R,
    escalator: Escalator,

    columns: Vec<AttachedColumn>,
    next_column_id: u64,
    frozen_column_count: isize,
    header: StaticSection,
    footer: StaticSection,

    focus: CellFocusController,
    sort: SortOrderController,
    selection: BTreeSet<usize>,

    scheduler: Scheduler<GridTask>,
    width_retry: WidthRetry,
    data_is_being_fetched: bool,
    last_calculated_width: Option<f64>,
    width_mode: Option<ResolutionMode>,

    watchdog: OperationWatchdog,
    reorder_generation: u64,
    active_reorder: Option<u64>,
    now_ms: u64,

    batch_depth: u32,
    pending_change: Option<GridChange>,
}

impl<D: DataSource, R: CellRenderer<D::Row>> Grid<D, R> {
    /// Creates a grid with one (default) header row and an empty footer.
    ///
    /// When the source does not know its size yet, the body starts with as many rows as can be
    /// visible at once.
    pub fn new(data: D, renderer: R, options: GridOptions) -> Self {
        let escalator = Escalator::new(&options);
        let mut header = StaticSection::new(Section::Header);
        let default_row = header.append_row();
        // Row 0 was just appended.
        let _ = header.set_default_row(Some(default_row));

        let mut grid = Self {
            width_retry: WidthRetry::new(options.width_retry_limit),
            watchdog: OperationWatchdog::new(options.operation_budget_ms),
            options,
            data,
            renderer,
            escalator,
            columns: Vec::new(),
            next_column_id: 0,
            frozen_column_count: 0,
            header,
            footer: StaticSection::new(Section::Footer),
            focus: CellFocusController::new(),
            sort: SortOrderController::new(),
            selection: BTreeSet::new(),
            scheduler: Scheduler::new(),
            data_is_being_fetched: false,
            last_calculated_width: None,
            width_mode: None,
            reorder_generation: 0,
            active_reorder: None,
            now_ms: 0,
            batch_depth: 0,
            pending_change: None,
        };

        let rows = match grid.data.size() {
            Some(n) => n,
            None => {
                let guess = grid.escalator.scroll().max_visible_row_count();
                vdebug!(guess, "data size unknown, guessing row count");
                guess
            }
        };
        {
            let (engine, mut cx) = grid.body();
            engine.set_row_count(rows, &mut cx);
        }
        grid.flush_availability();
        grid.schedule(GridTask::RefreshSections, Tier::Finally);
        grid
    }

    // --- accessors ------------------------------------------------------------------------

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Direct access to the source. Structural changes made through it must be reported with
    /// [`Grid::handle_data_change`].
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn escalator(&self) -> &Escalator {
        &self.escalator
    }

    /// Body scroll geometry: offsets, extents and the visible row range.
    pub fn scroll(&self) -> &ScrollController {
        self.escalator.scroll()
    }

    pub fn row_count(&self) -> usize {
        self.escalator.row_count()
    }

    pub fn data_is_being_fetched(&self) -> bool {
        self.data_is_being_fetched
    }

    pub fn check_invariants(&self) -> core::result::Result<(), &'static str> {
        self.escalator.check_invariants()
    }

    // --- columns --------------------------------------------------------------------------

    /// Attaches `column` after the existing ones.
    pub fn add_column(&mut self, column: Column) -> ColumnId {
        let at = self.columns.len();
        self.attach_column(at, column)
    }

    /// Attaches `column` at position `at` of the column order.
    pub fn insert_column(&mut self, at: usize, column: Column) -> Result<ColumnId> {
        if at > self.columns.len() {
            return Err(GridError::ColumnOutOfBounds {
                index: at,
                count: self.columns.len(),
            });
        }
        Ok(self.attach_column(at, column))
    }

    fn attach_column(&mut self, at: usize, column: Column) -> ColumnId {
        let id = ColumnId(self.next_column_id);
        self.next_column_id += 1;
        vdebug!(column = id.0, at, "column attached");
        self.columns.insert(
            at,
            AttachedColumn {
                id,
                column,
                natural_width: None,
            },
        );
        if (at as isize) < self.frozen_column_count {
            self.frozen_column_count += 1;
        }
        self.active_reorder = None;
        self.columns_changed();
        id
    }

    /// Detaches a column, releasing its live cells before returning it.
    pub fn remove_column(&mut self, id: ColumnId) -> Result<Column> {
        let index = self.column_index(id)?;
        let removed = self.columns.remove(index);
        if (index as isize) < self.frozen_column_count {
            self.frozen_column_count -= 1;
        }
        self.active_reorder = None;
        if let Some(event) = self.sort.remove_column(id) {
            self.fire_sort(&event);
        }
        if !self.sort.is_delayed_sort_scheduled() {
            self.scheduler.cancel(GridTask::DelayedSort);
        }
        vdebug!(column = id.0, "column detached");
        self.columns_changed();
        Ok(removed.column)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id).map(|c| &c.column)
    }

    /// Every attached column in order, hidden ones included.
    pub fn columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> + '_ {
        self.columns.iter().map(|c| (c.id, &c.column))
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id).collect()
    }

    /// Columns taking part in layout, in display order.
    pub fn visible_columns(&self) -> impl Iterator<Item = (ColumnId, &Column)> + '_ {
        self.columns()
            .filter(|(_, c)| !c.is_hidden())
    }

    /// Index of the column among the visible ones.
    pub fn visible_index(&self, id: ColumnId) -> Option<usize> {
        self.escalator.columns().iter().position(|c| *c == id)
    }

    /// Final widths of the visible columns, in display order.
    pub fn column_widths(&self) -> &[f64] {
        self.escalator.scroll().column_widths()
    }

    /// The resolved width of a visible column. `None` for hidden or unknown columns.
    pub fn column_width_actual(&self, id: ColumnId) -> Option<f64> {
        let index = self.visible_index(id)?;
        self.escalator.scroll().column_width(index)
    }

    /// How the last width calculation resolved, `None` before the first one ran.
    pub fn width_mode(&self) -> Option<ResolutionMode> {
        self.width_mode
    }

    pub fn set_column_width(&mut self, id: ColumnId, px: f64) -> Result<()> {
        self.update_column(id, |c| {
            c.set_width(px);
            Ok(())
        })
    }

    pub fn set_column_min_width(&mut self, id: ColumnId, px: f64) -> Result<()> {
        self.update_column(id, |c| c.set_min_width(px))
    }

    pub fn set_column_max_width(&mut self, id: ColumnId, px: f64) -> Result<()> {
        self.update_column(id, |c| c.set_max_width(px))
    }

    pub fn set_column_expand_ratio(&mut self, id: ColumnId, ratio: ExpandRatio) -> Result<()> {
        self.update_column(id, |c| {
            c.set_expand_ratio(ratio);
            Ok(())
        })
    }

    /// Records the content-measured width of an auto column.
    pub fn measure_column(&mut self, id: ColumnId, px: f64) -> Result<()> {
        let index = self.column_index(id)?;
        self.columns[index].natural_width = Some(px.max(0.0));
        self.recalculate_column_widths();
        Ok(())
    }

    pub fn set_column_hidden(&mut self, id: ColumnId, hidden: bool) -> Result<()> {
        let index = self.column_index(id)?;
        if self.columns[index].column.is_hidden() == hidden {
            return Ok(());
        }
        self.columns[index].column.set_hidden_flag(hidden);
        self.columns_changed();
        Ok(())
    }

    fn update_column(
        &mut self,
        id: ColumnId,
        f: impl FnOnce(&mut Column) -> Result<()>,
    ) -> Result<()> {
        let index = self.column_index(id)?;
        f(&mut self.columns[index].column)?;
        self.recalculate_column_widths();
        Ok(())
    }

    fn column_index(&self, id: ColumnId) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.id == id)
            .ok_or(GridError::UnknownColumn(id))
    }

    pub fn frozen_column_count(&self) -> isize {
        self.frozen_column_count
    }

    /// Freezes the first `count` columns. `-1` and `0` both freeze nothing; hidden columns
    /// inside the frozen prefix do not count towards the frozen width.
    pub fn set_frozen_column_count(&mut self, count: isize) -> Result<()> {
        let max = self.columns.len();
        if count < -1 || count > max as isize {
            return Err(GridError::InvalidFrozenCount { count, max });
        }
        self.frozen_column_count = count;
        let frozen = self.engine_frozen_count();
        {
            let (engine, mut cx) = self.body();
            engine.set_frozen_column_count(frozen, &mut cx);
        }
        self.notify(GridChange::COLUMNS);
        Ok(())
    }

    fn engine_frozen_count(&self) -> usize {
        let prefix = self.frozen_column_count.max(0) as usize;
        self.columns
            .iter()
            .take(prefix)
            .filter(|c| !c.column.is_hidden())
            .count()
    }

    /// Reorders every attached column at once.
    pub fn set_column_order(&mut self, order: &[ColumnId]) -> Result<()> {
        self.apply_column_order(order)?;
        self.active_reorder = None;
        Ok(())
    }

    fn apply_column_order(&mut self, order: &[ColumnId]) -> Result<()> {
        let unique: BTreeSet<ColumnId> = order.iter().copied().collect();
        if order.len() != self.columns.len()
            || unique.len() != order.len()
            || self.columns.iter().any(|c| !unique.contains(&c.id))
        {
            return Err(GridError::InvalidColumnOrder);
        }

        let focused_id = self
            .focus
            .focused()
            .and_then(|f| self.escalator.columns().get(f.columns.start()).copied());

        let mut columns = core::mem::take(&mut self.columns);
        let mut reordered = Vec::with_capacity(columns.len());
        for id in order {
            if let Some(pos) = columns.iter().position(|c| c.id == *id) {
                reordered.push(columns.swap_remove(pos));
            }
        }
        self.columns = reordered;
        let before = focused_id.and_then(|id| self.visible_index(id));
        self.columns_changed();

        if let (Some(id), Some(before)) = (focused_id, before) {
            if let Some(after) = self.visible_index(id) {
                self.focus
                    .offset_column_range(after as isize - before as isize);
                let change = self.focus.revalidate(&Bounds {
                    escalator: &self.escalator,
                    header: &self.header,
                    footer: &self.footer,
                });
                self.apply_focus_change(change);
            }
        }
        Ok(())
    }

    /// Starts a column drag gesture.
    pub fn start_column_reorder(&mut self, id: ColumnId) -> Result<ColumnReorderSession> {
        self.column_index(id)?;
        self.reorder_generation += 1;
        self.active_reorder = Some(self.reorder_generation);
        vtrace!(column = id.0, "column reorder started");
        Ok(ColumnReorderSession::new(
            id,
            self.column_ids(),
            self.reorder_generation,
        ))
    }

    /// Adopts the session's order. Fails if the session was cancelled or invalidated.
    pub fn finish_column_reorder(&mut self, session: ColumnReorderSession) -> Result<()> {
        if self.active_reorder != Some(session.generation()) {
            return Err(GridError::NoActiveSession);
        }
        self.active_reorder = None;
        if session.is_moved() {
            self.apply_column_order(session.order())?;
        }
        Ok(())
    }

    /// Ends a drag without changing the order. Returns `false` for a stale session.
    pub fn cancel_column_reorder(&mut self, session: ColumnReorderSession) -> bool {
        if self.active_reorder != Some(session.generation()) {
            return false;
        }
        self.active_reorder = None;
        true
    }

    /// Brings the engine and the static sections in line with the column model.
    fn columns_changed(&mut self) {
        let desired: Vec<ColumnId> = self
            .columns
            .iter()
            .filter(|c| !c.column.is_hidden())
            .map(|c| c.id)
            .collect();
        let frozen = self.engine_frozen_count();
        {
            let (engine, mut cx) = self.body();

            let current = engine.columns().to_vec();
            for (index, id) in current.iter().enumerate().rev() {
                if !desired.contains(id) {
                    engine.remove_columns(index, 1, &mut cx);
                }
            }

            let kept: Vec<ColumnId> = desired
                .iter()
                .copied()
                .filter(|id| engine.columns().contains(id))
                .collect();
            if kept.as_slice() != engine.columns() {
                let order: Vec<usize> = kept
                    .iter()
                    .filter_map(|id| engine.columns().iter().position(|c| c == id))
                    .collect();
                engine.reorder_columns(&order, &mut cx);
            }

            for (index, id) in desired.iter().enumerate() {
                if engine.columns().get(index) != Some(id) {
                    engine.insert_columns(index, &[*id], &mut cx);
                }
            }

            if engine.scroll().frozen_column_count() != frozen {
                engine.set_frozen_column_count(frozen, &mut cx);
            }
        }

        let layout: Vec<(ColumnId, bool)> = self
            .columns
            .iter()
            .map(|c| (c.id, c.column.is_hidden()))
            .collect();
        self.header.sync_columns(&layout);
        self.footer.sync_columns(&layout);
        self.schedule(GridTask::RefreshSections, Tier::Finally);
        self.recalculate_column_widths();

        let change = self.focus.revalidate(&Bounds {
            escalator: &self.escalator,
            header: &self.header,
            footer: &self.footer,
        });
        self.apply_focus_change(change);
        self.notify(GridChange::COLUMNS);
    }

    // --- column widths --------------------------------------------------------------------

    /// Schedules a width recalculation at the end of the turn. Repeated requests coalesce.
    pub fn recalculate_column_widths(&mut self) {
        self.schedule(GridTask::ColumnWidths, Tier::Finally);
    }

    pub fn is_width_recalculation_pending(&self) -> bool {
        self.scheduler.is_scheduled(GridTask::ColumnWidths)
    }

    #[cfg(test)]
    pub(crate) fn width_retries(&self) -> u32 {
        self.width_retry.retries()
    }

    fn run_width_task(&mut self) {
        let dirty = self.header.is_dirty() || self.footer.is_dirty();
        match self.width_retry.next_step(dirty, self.data_is_being_fetched) {
            WidthStep::Run => self.apply_column_widths(),
            WidthStep::Again(tier) => {
                vtrace!(?tier, dirty, fetching = self.data_is_being_fetched, "width recalculation postponed");
                self.scheduler.reschedule(GridTask::ColumnWidths, tier);
            }
        }
    }

    fn apply_column_widths(&mut self) {
        let viewport_width = self.escalator.scroll().viewport().width;
        let natural = self.options.default_column_width;
        let inputs: Vec<WidthInput> = self
            .columns
            .iter()
            .filter(|c| !c.column.is_hidden())
            .map(|c| WidthInput::from_column(&c.column, c.natural_width.unwrap_or(natural)))
            .collect();
        let resolution = resolve_column_widths(&inputs, viewport_width, self.options.subpixel_policy);
        vdebug!(
            columns = inputs.len(),
            viewport_width,
            total = resolution.total(),
            mode = ?resolution.mode,
            "column widths resolved"
        );
        let widths: Vec<(usize, f64)> = resolution.widths.iter().copied().enumerate().collect();
        {
            let (engine, mut cx) = self.body();
            engine.set_column_widths(&widths, &mut cx);
        }
        self.last_calculated_width = Some(viewport_width);
        self.width_mode = Some(resolution.mode);
        self.notify(GridChange::COLUMNS);
    }

    // --- header / footer ------------------------------------------------------------------

    pub fn header(&self) -> &StaticSection {
        &self.header
    }

    pub fn footer(&self) -> &StaticSection {
        &self.footer
    }

    /// Edits the header. The grid refreshes it at the end of the turn.
    pub fn update_header<T>(&mut self, f: impl FnOnce(&mut StaticSection) -> T) -> T {
        let out = f(&mut self.header);
        self.sections_changed();
        out
    }

    /// Edits the footer. The grid refreshes it at the end of the turn.
    pub fn update_footer<T>(&mut self, f: impl FnOnce(&mut StaticSection) -> T) -> T {
        let out = f(&mut self.footer);
        self.sections_changed();
        out
    }

    fn sections_changed(&mut self) {
        self.schedule(GridTask::RefreshSections, Tier::Finally);
        self.recalculate_column_widths();
        let change = self.focus.revalidate(&Bounds {
            escalator: &self.escalator,
            header: &self.header,
            footer: &self.footer,
        });
        self.apply_focus_change(change);
    }

    fn refresh_sections(&mut self) {
        self.escalator.set_static_row_counts(
            self.header.visible_row_count(),
            self.footer.visible_row_count(),
        );
        let was_dirty = self.header.is_dirty() || self.footer.is_dirty();
        self.header.mark_clean();
        self.footer.mark_clean();
        if was_dirty {
            self.notify(GridChange::SECTIONS);
        }
    }

    // --- data -----------------------------------------------------------------------------

    /// Applies a callback of the data source.
    pub fn handle_data_change(&mut self, change: DataChange) {
        vtrace!(?change, "Grid::handle_data_change");
        match change {
            DataChange::Available(range) => {
                self.data_is_being_fetched = false;
                let (engine, mut cx) = self.body();
                engine.refresh_rows(range.start(), range.len(), &mut cx);
                self.notify(GridChange::ROWS);
            }
            DataChange::Updated(range) => {
                let (engine, mut cx) = self.body();
                engine.refresh_rows(range.start(), range.len(), &mut cx);
                self.notify(GridChange::ROWS);
            }
            DataChange::Added(range) => self.insert_body_rows(range.start(), range.len()),
            DataChange::Removed(range) => self.remove_body_rows(range.start(), range.len()),
            DataChange::SizeReset(size) => self.reset_size(size),
        }
    }

    fn insert_body_rows(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let shift = {
            let (engine, mut cx) = self.body();
            engine.insert_rows(at, count, &mut cx)
        };
        self.apply_shift(shift);
        self.flush_availability();
    }

    fn remove_body_rows(&mut self, at: usize, count: usize) {
        let shift = {
            let (engine, mut cx) = self.body();
            engine.remove_rows(at, count, &mut cx)
        };
        if let RowShift::Removed(r) = shift {
            if r.is_empty() {
                return;
            }
        }
        self.apply_shift(shift);
        self.flush_availability();
    }

    fn reset_size(&mut self, size: usize) {
        let current = self.escalator.row_count();
        if size > current {
            self.insert_body_rows(current, size - current);
        } else if size < current {
            self.remove_body_rows(size, current - size);
        }
        {
            let (engine, mut cx) = self.body();
            engine.reset_row_heights(&mut cx);
            engine.refresh_all(&mut cx);
        }
        // The whole materialized range is requested below.
        let _ = self.escalator.take_availability_request();
        let range = self.escalator.visible_row_range();
        if size > 0 && !range.is_empty() {
            self.request_rows(range);
        } else {
            self.data_is_being_fetched = false;
        }
        self.notify(GridChange::ROWS);
    }

    /// Maps selection and focus through a body shift, then refreshes slot flags.
    fn apply_shift(&mut self, shift: RowShift) {
        self.selection = self
            .selection
            .iter()
            .filter_map(|&row| shift.map_index(row))
            .collect();
        let change = self.focus.apply_shift(
            shift,
            &Bounds {
                escalator: &self.escalator,
                header: &self.header,
                footer: &self.footer,
            },
        );
        self.sync_slot_flags();
        if change.is_changed() {
            self.notify(GridChange::FOCUS);
        }
        self.notify(GridChange::ROWS);
    }

    fn sync_slot_flags(&mut self) {
        self.escalator.clear_selected();
        let live = self.escalator.visible_row_range();
        for &row in self.selection.range(live.start()..live.end()) {
            self.escalator.set_selected(row, true);
        }
        let focus = self.body_focus();
        self.escalator.set_focus(focus);
    }

    fn flush_availability(&mut self) {
        let Some(range) = self.escalator.take_availability_request() else {
            return;
        };
        if self.escalator.row_count() == 0 || range.is_empty() {
            return;
        }
        self.request_rows(range);
    }

    fn request_rows(&mut self, range: Range) {
        vdebug!(start = range.start(), end = range.end(), "ensure_availability");
        self.data.ensure_availability(range);
        // Sources that hold every row in memory answer synchronously.
        self.data_is_being_fetched = !range.iter().all(|row| self.data.row(row).is_some());
    }

    // --- scrolling ------------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Viewport) {
        {
            let (engine, mut cx) = self.body();
            engine.set_viewport(viewport, &mut cx);
        }
        self.flush_availability();
        if self.last_calculated_width != Some(viewport.width) {
            self.recalculate_column_widths();
        }
        self.notify(GridChange::SCROLL);
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        {
            let (engine, mut cx) = self.body();
            engine.set_overscan(overscan, &mut cx);
        }
        self.flush_availability();
        self.notify(GridChange::ROWS);
    }

    pub fn set_default_row_height(&mut self, px: u32) {
        {
            let (engine, mut cx) = self.body();
            engine.set_default_row_height(px, &mut cx);
        }
        self.flush_availability();
        self.notify(GridChange::ROWS);
    }

    /// Gives a body row an explicit height, e.g. while its details area is open.
    pub fn set_row_height(&mut self, row: usize, px: u32) -> Result<()> {
        let count = self.escalator.row_count();
        if row >= count {
            return Err(GridError::RowOutOfBounds {
                index: row,
                max: count.saturating_sub(1),
            });
        }
        {
            let (engine, mut cx) = self.body();
            engine.set_row_height(row, px, &mut cx);
        }
        self.flush_availability();
        self.notify(GridChange::ROWS);
        Ok(())
    }

    pub fn reset_row_heights(&mut self) {
        {
            let (engine, mut cx) = self.body();
            engine.reset_row_heights(&mut cx);
        }
        self.flush_availability();
        self.notify(GridChange::ROWS);
    }

    pub fn scroll_top(&self) -> u64 {
        self.escalator.scroll().scroll_top()
    }

    pub fn scroll_left(&self) -> f64 {
        self.escalator.scroll().scroll_left()
    }

    pub fn is_scrolling(&self) -> bool {
        self.escalator.scroll().is_scrolling()
    }

    /// Sets the vertical offset (clamped). Returns the applied offset.
    pub fn set_scroll_top(&mut self, px: u64) -> u64 {
        let applied = {
            let (engine, mut cx) = self.body();
            engine.set_scroll_top(px, &mut cx)
        };
        self.flush_availability();
        self.notify(GridChange::SCROLL);
        applied
    }

    /// Sets the horizontal offset (clamped). Returns the applied offset.
    pub fn set_scroll_left(&mut self, px: f64) -> f64 {
        let applied = {
            let (engine, mut cx) = self.body();
            engine.set_scroll_left(px, &mut cx)
        };
        self.notify(GridChange::SCROLL);
        applied
    }

    pub fn scroll_to_row(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: u32,
    ) -> Result<()> {
        let offset = self
            .escalator
            .scroll()
            .scroll_to_row_offset(row, destination, padding)?;
        self.set_scroll_top(offset);
        Ok(())
    }

    /// Scrolls a visible column into view. Frozen columns never need scrolling.
    pub fn scroll_to_column(
        &mut self,
        column: usize,
        destination: ScrollDestination,
        padding: u32,
    ) -> Result<()> {
        let offset = self
            .escalator
            .scroll()
            .scroll_to_column_offset(column, destination, padding)?;
        if offset != self.scroll_left() {
            self.set_scroll_left(offset);
        }
        Ok(())
    }

    pub fn scroll_to_start(&mut self) {
        self.set_scroll_top(0);
    }

    pub fn scroll_to_end(&mut self) {
        let max = self.escalator.scroll().max_scroll_top();
        self.set_scroll_top(max);
    }

    // --- events ---------------------------------------------------------------------------

    pub fn handle_event(&mut self, event: GridEvent) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        match event {
            GridEvent::Click {
                section,
                row,
                column,
                modifiers,
            } => {
                let change = self.focus.set_focus(
                    section,
                    row,
                    column,
                    &Bounds {
                        escalator: &self.escalator,
                        header: &self.header,
                        footer: &self.footer,
                    },
                );
                outcome.focus_changed = change.is_changed();
                self.apply_focus_change(change);
                if section == Section::Header {
                    outcome.sort = self.sort_from_header(row, column, modifiers.shift);
                }
            }
            GridEvent::KeyDown { key, modifiers } => match key {
                Key::Enter => {
                    if let Some(cell) = self.focus.focused() {
                        if cell.section == Section::Header {
                            outcome.sort =
                                self.sort_from_header(cell.row, cell.columns.start(), modifiers.shift);
                        }
                    }
                }
                Key::Space => {
                    if let Some(cell) = self.focus.focused() {
                        if cell.section == Section::Body {
                            if self.is_selected(cell.row) {
                                self.deselect(cell.row);
                            } else {
                                let _ = self.select(cell.row);
                            }
                        }
                    }
                }
                _ => {
                    let change = self.focus.handle_key(
                        key,
                        modifiers,
                        &Bounds {
                            escalator: &self.escalator,
                            header: &self.header,
                            footer: &self.footer,
                        },
                    );
                    outcome.focus_changed = change.is_changed();
                    self.apply_focus_change(change);
                }
            },
            GridEvent::Scroll { top, left, now_ms } => {
                self.now_ms = self.now_ms.max(now_ms);
                self.escalator.notify_scroll_event(now_ms);
                let before = (self.scroll_top(), self.scroll_left());
                {
                    let (engine, mut cx) = self.body();
                    engine.set_scroll_top(top, &mut cx);
                    engine.set_scroll_left(left, &mut cx);
                }
                self.flush_availability();
                outcome.scrolled = before != (self.scroll_top(), self.scroll_left());
                self.notify(GridChange::SCROLL);
            }
        }
        outcome
    }

    /// Sorts by the header cell at `(row, column)` if it belongs to the default row and spans
    /// exactly one column.
    fn sort_from_header(&mut self, row: usize, column: usize, multi: bool) -> Option<SortEvent> {
        if self.header.default_row() != Some(row) || self.header.cell_range(row, column).len() != 1 {
            return None;
        }
        let id = *self.escalator.columns().get(column)?;
        self.sort(id, multi).ok().flatten()
    }

    // --- focus ----------------------------------------------------------------------------

    pub fn focused_cell(&self) -> Option<FocusedCell> {
        self.focus.focused()
    }

    /// Focuses a cell programmatically, scrolling it into view.
    pub fn focus_cell(&mut self, section: Section, row: usize, column: usize) {
        let change = self.focus.set_focus(
            section,
            row,
            column,
            &Bounds {
                escalator: &self.escalator,
                header: &self.header,
                footer: &self.footer,
            },
        );
        self.apply_focus_change(change);
    }

    pub fn clear_focus(&mut self) {
        let change = self.focus.clear();
        self.apply_focus_change(change);
    }

    fn body_focus(&self) -> Option<BodyFocus> {
        self.focus
            .focused()
            .filter(|c| c.section == Section::Body)
            .map(|c| BodyFocus {
                row: c.row,
                columns: c.columns,
            })
    }

    fn apply_focus_change(&mut self, change: FocusChange) {
        if change.is_changed() {
            let focus = self.body_focus();
            self.escalator.set_focus(focus);
        }
        if let Some(row) = change.scroll_to_row {
            if let Ok(offset) =
                self.escalator
                    .scroll()
                    .scroll_to_row_offset(row, ScrollDestination::Any, 0)
            {
                if offset != self.scroll_top() {
                    self.set_scroll_top(offset);
                }
            }
        }
        if let Some(column) = change.scroll_to_column {
            let _ = self.scroll_to_column(column, ScrollDestination::Any, FOCUS_COLUMN_PADDING);
        }
        if change.is_changed() {
            // Scrolling may have rebound the focused row's slot.
            let focus = self.body_focus();
            self.escalator.set_focus(focus);
            self.notify(GridChange::FOCUS);
        }
    }

    // --- selection ------------------------------------------------------------------------

    /// Selects a body row. Returns `false` if it was already selected.
    pub fn select(&mut self, row: usize) -> Result<bool> {
        let count = self.escalator.row_count();
        if row >= count {
            return Err(GridError::RowOutOfBounds {
                index: row,
                max: count.saturating_sub(1),
            });
        }
        let inserted = self.selection.insert(row);
        if inserted {
            self.escalator.set_selected(row, true);
            self.notify(GridChange::SELECTION);
        }
        Ok(inserted)
    }

    pub fn deselect(&mut self, row: usize) -> bool {
        let removed = self.selection.remove(&row);
        if removed {
            self.escalator.set_selected(row, false);
            self.notify(GridChange::SELECTION);
        }
        removed
    }

    pub fn deselect_all(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.escalator.clear_selected();
        self.notify(GridChange::SELECTION);
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.selection.contains(&row)
    }

    pub fn selected_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection.iter().copied()
    }

    // --- sorting --------------------------------------------------------------------------

    /// User-initiated sort. Returns the fired event, or `None` for non-sortable columns.
    pub fn sort(&mut self, id: ColumnId, multi: bool) -> Result<Option<SortEvent>> {
        let index = self.column_index(id)?;
        let event = self.sort.sort(id, &self.columns[index].column, multi);
        if let Some(event) = &event {
            self.fire_sort(event);
        }
        Ok(event)
    }

    /// Replaces the sort order programmatically.
    pub fn set_sort_order(&mut self, order: &[SortOrder]) -> Result<()> {
        for entry in order {
            self.column_index(entry.column)?;
        }
        let event = self.sort.set_sort_order(order);
        self.fire_sort(&event);
        Ok(())
    }

    /// Clears the sort order without firing an event.
    pub fn clear_sort_order(&mut self) {
        self.sort.clear_sort_order();
        self.header.mark_dirty();
        self.schedule(GridTask::RefreshSections, Tier::Finally);
    }

    pub fn sort_order(&self) -> &[SortOrder] {
        self.sort.order()
    }

    pub fn sort_order_for(&self, id: ColumnId) -> Option<SortDirection> {
        self.sort.sort_order_for(id)
    }

    /// Sorts after `delay_ms`, e.g. once a long press on a header cell completes.
    pub fn sort_after_delay(&mut self, id: ColumnId, multi: bool, delay_ms: u64) -> Result<()> {
        self.column_index(id)?;
        self.sort.set_delayed(id, multi);
        self.scheduler
            .schedule_at(GridTask::DelayedSort, self.now_ms.saturating_add(delay_ms));
        Ok(())
    }

    pub fn is_delayed_sort_scheduled(&self) -> bool {
        self.sort.is_delayed_sort_scheduled()
    }

    pub fn cancel_delayed_sort(&mut self) {
        self.sort.take_delayed();
        self.scheduler.cancel(GridTask::DelayedSort);
    }

    fn fire_sort(&mut self, event: &SortEvent) {
        self.header.mark_dirty();
        self.schedule(GridTask::RefreshSections, Tier::Finally);
        if let Some(cb) = &self.options.on_sort {
            cb(event);
        }
    }

    // --- editor operations ----------------------------------------------------------------

    /// Tracks an asynchronous editor bind or save.
    pub fn begin_operation(&mut self, kind: OperationKind, row: usize, now_ms: u64) -> OperationId {
        self.now_ms = self.now_ms.max(now_ms);
        self.watchdog.begin(kind, row, now_ms)
    }

    pub fn complete_operation(&mut self, id: OperationId) -> bool {
        self.watchdog.complete(id)
    }

    pub fn watchdog(&self) -> &OperationWatchdog {
        &self.watchdog
    }

    // --- turns ----------------------------------------------------------------------------

    /// Runs the coalesced end-of-turn work until none is left.
    pub fn end_of_turn(&mut self) {
        while self.scheduler.has_finally() {
            for task in self.scheduler.drain_finally() {
                self.run_task(task);
            }
        }
    }

    /// Starts a new turn at `now_ms`: settles `is_scrolling`, runs deferred work and due timers,
    /// checks pending editor operations, then runs the end-of-turn work they caused.
    pub fn next_turn(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        if self.escalator.update_scrolling(now_ms) {
            self.notify(GridChange::SCROLL);
        }
        for task in self.scheduler.drain_deferred() {
            self.run_task(task);
        }
        for task in self.scheduler.drain_due(now_ms) {
            self.run_task(task);
        }
        self.watchdog.check(now_ms);
        self.end_of_turn();
    }

    /// Whether any scheduled work is pending.
    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_idle()
    }

    /// The earliest timer deadline, for adapters that sleep between turns.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    fn schedule(&mut self, task: GridTask, tier: Tier) {
        self.scheduler.schedule_coalesced(task, tier);
    }

    fn run_task(&mut self, task: GridTask) {
        match task {
            GridTask::RefreshSections => self.refresh_sections(),
            GridTask::ColumnWidths => self.run_width_task(),
            GridTask::DelayedSort => {
                if let Some((id, multi)) = self.sort.take_delayed() {
                    let _ = self.sort(id, multi);
                }
            }
        }
    }

    // --- notifications --------------------------------------------------------------------

    fn notify(&mut self, change: GridChange) {
        let change = GridChange {
            is_scrolling: self.escalator.scroll().is_scrolling(),
            ..change
        };
        if self.batch_depth > 0 {
            self.pending_change = Some(match self.pending_change {
                Some(pending) => pending.merge(change),
                None => change,
            });
            return;
        }
        if let Some(cb) = &self.options.on_change {
            cb(change);
        }
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.batch_depth = self.batch_depth.saturating_add(1);
        f(self);
        debug_assert!(self.batch_depth > 0, "batch_depth underflow");
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            if let Some(change) = self.pending_change.take() {
                if let Some(cb) = &self.options.on_change {
                    cb(change);
                }
            }
        }
    }

    fn body(&mut self) -> (&mut Escalator, BodyContext<'_, D, R>) {
        let focus = self.body_focus();
        (
            &mut self.escalator,
            BodyContext::new(&self.data, &mut self.renderer)
                .with_selection(&self.selection)
                .with_focus(focus),
        )
    }
}

impl<D, R> core::fmt::Debug for Grid<D, R>
where
    D: DataSource,
    R: CellRenderer<D::Row>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.escalator.row_count())
            .field("columns", &self.columns.len())
            .field("focus", &self.focus.focused())
            .field("sort", &self.sort.order())
            .field("data_is_being_fetched", &self.data_is_being_fetched)
            .finish_non_exhaustive()
    }
}
