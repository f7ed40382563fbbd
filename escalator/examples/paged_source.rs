// Example: an asynchronous data source that loads pages on request.
use escalator::{
    CellRef, CellRenderer, Column, DataChange, DataSource, Grid, GridOptions, Range, RenderError,
    Viewport,
};

struct Paged {
    rows: Vec<Option<String>>,
    pending: Vec<Range>,
}

impl DataSource for Paged {
    type Row = String;

    fn size(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn ensure_availability(&mut self, range: Range) {
        self.pending.push(range);
    }

    fn row(&self, index: usize) -> Option<&String> {
        self.rows.get(index)?.as_ref()
    }
}

struct Print;

impl CellRenderer<String> for Print {
    fn render(&mut self, cell: CellRef, row: &String) -> Result<(), RenderError> {
        if cell.column == 0 && cell.row % 10 == 0 {
            println!("  slot {:?} row {} -> {row}", cell.slot, cell.row);
        }
        Ok(())
    }
}

fn main() {
    let source = Paged {
        rows: vec![None; 10_000],
        pending: Vec::new(),
    };
    let options = GridOptions::new(Viewport {
        width: 400.0,
        height: 400,
    })
    .with_default_row_height(20)
    .with_overscan(0);
    let mut grid = Grid::new(source, Print, options);
    grid.add_column(Column::new("Text"));

    for top in [0, 2_800, 100_000] {
        grid.set_scroll_top(top);
        // The "network" answers every pending request.
        let requests: Vec<Range> = grid.data_mut().pending.drain(..).collect();
        for range in requests {
            println!("fetching {range:?}");
            for i in range.iter() {
                grid.data_mut().rows[i] = Some(format!("row {i}"));
            }
            grid.handle_data_change(DataChange::Available(range));
        }
        grid.next_turn(top);
        println!("top={top} fetching={}", grid.data_is_being_fetched());
    }
}
