// Example: a million-row grid with a handful of columns, scrolled to the end.
use escalator::{CellRef, CellRenderer, Column, Grid, GridOptions, RenderError, Viewport};

#[derive(Default)]
struct CountingRenderer {
    rendered: usize,
}

impl CellRenderer<u64> for CountingRenderer {
    fn render(&mut self, _cell: CellRef, _row: &u64) -> Result<(), RenderError> {
        self.rendered += 1;
        Ok(())
    }
}

fn main() {
    let rows: Vec<u64> = (0..1_000_000).collect();
    let options = GridOptions::new(Viewport {
        width: 800.0,
        height: 600,
    })
    .with_default_row_height(24)
    .with_overscan(2);
    let mut grid = Grid::new(rows, CountingRenderer::default(), options);

    let id = grid.add_column(Column::new("Id").with_width(80.0));
    let name = grid.add_column(Column::new("Name").with_expand_ratio(2));
    grid.add_column(Column::new("Value").with_expand_ratio(1));
    let _ = grid.update_header(|h| h.set_text(0, id, "#"));
    let _ = grid.update_header(|h| h.set_text(0, name, "Name"));

    // Widths are resolved at the end of the turn.
    grid.end_of_turn();
    println!("widths={:?} mode={:?}", grid.column_widths(), grid.width_mode());
    println!(
        "scroll_height={} live_slots={}",
        grid.scroll().scroll_height(),
        grid.escalator().live_slot_count()
    );

    grid.scroll_to_end();
    println!(
        "after scroll_to_end: top={} visible={:?}",
        grid.scroll_top(),
        grid.escalator().visible_row_range()
    );
    println!(
        "live_slots={} cells_rendered={}",
        grid.escalator().live_slot_count(),
        grid.renderer().rendered
    );
}
