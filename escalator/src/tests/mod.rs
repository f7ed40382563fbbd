use crate::*;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

mod engine;
mod scheduler;
mod section;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Records every renderer call and checks attach/detach symmetry as it goes.
#[derive(Debug, Default)]
struct RecordingRenderer {
    widget_columns: BTreeSet<ColumnId>,
    attached: BTreeSet<(SlotId, ColumnId)>,
    /// Row value last rendered into each cell.
    content: BTreeMap<(SlotId, ColumnId), u32>,
    attach_calls: usize,
    detach_calls: usize,
    renders: usize,
    clears: usize,
    failing_rows: BTreeSet<usize>,
}

impl RecordingRenderer {
    fn with_widgets(columns: &[ColumnId]) -> Self {
        Self {
            widget_columns: columns.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl CellRenderer<u32> for RecordingRenderer {
    fn cell_kind(&self, column: ColumnId) -> CellKind {
        if self.widget_columns.contains(&column) {
            CellKind::Widget
        } else {
            CellKind::Simple
        }
    }

    fn attach(&mut self, cell: CellRef) {
        assert!(
            self.attached.insert((cell.slot, cell.column_id)),
            "attached twice: {cell:?}"
        );
        self.attach_calls += 1;
    }

    fn detach(&mut self, cell: CellRef) {
        assert!(
            self.attached.remove(&(cell.slot, cell.column_id)),
            "detached without attach: {cell:?}"
        );
        self.detach_calls += 1;
    }

    fn render(&mut self, cell: CellRef, row: &u32) -> core::result::Result<(), RenderError> {
        self.renders += 1;
        if self.failing_rows.contains(&cell.row) {
            self.content.remove(&(cell.slot, cell.column_id));
            return Err("renderer failed".into());
        }
        self.content.insert((cell.slot, cell.column_id), *row);
        Ok(())
    }

    fn clear(&mut self, cell: CellRef) {
        self.clears += 1;
        self.content.remove(&(cell.slot, cell.column_id));
    }
}

/// A source that only knows rows after they were explicitly loaded.
#[derive(Debug, Default)]
struct PagedSource {
    size: Option<usize>,
    loaded: BTreeMap<usize, u32>,
    requests: Vec<Range>,
}

impl PagedSource {
    fn new(size: Option<usize>) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    fn load(&mut self, range: Range) {
        for row in range {
            self.loaded.insert(row, row as u32);
        }
    }
}

impl DataSource for PagedSource {
    type Row = u32;

    fn size(&self) -> Option<usize> {
        self.size
    }

    fn ensure_availability(&mut self, range: Range) {
        self.requests.push(range);
    }

    fn row(&self, index: usize) -> Option<&u32> {
        self.loaded.get(&index)
    }
}

fn options(width: f64, height: u32, row_height: u32, overscan: usize) -> GridOptions {
    GridOptions::new(Viewport { width, height })
        .with_default_row_height(row_height)
        .with_overscan(overscan)
}

fn rows(n: usize) -> Vec<u32> {
    (0..n as u32).collect()
}

fn vec_grid(n: usize, options: GridOptions) -> Grid<Vec<u32>, RecordingRenderer> {
    Grid::new(rows(n), RecordingRenderer::default(), options)
}

fn bound_rows(escalator: &Escalator) -> Vec<usize> {
    escalator.slots().iter().filter_map(|s| s.binding()).collect()
}

fn slot_ids(escalator: &Escalator) -> BTreeSet<SlotId> {
    escalator.slots().iter().map(|s| s.id()).collect()
}
