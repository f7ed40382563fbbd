use escalator::{CellRef, CellRenderer, Grid, GridOptions, RenderError, ScrollDestination, Viewport};
use escalator_adapter::{Controller, Easing};

struct Noop;

impl CellRenderer<u64> for Noop {
    fn render(&mut self, _cell: CellRef, _row: &u64) -> Result<(), RenderError> {
        Ok(())
    }
}

fn main() {
    // Example: a controller driving tween scrolling without holding any UI objects.
    //
    // An adapter would:
    // - start a tween (e.g. in response to a "scroll to row" command)
    // - call tick(now_ms) in a frame loop / timer
    // - apply the returned offset to the real scroll container (if any)
    // - render the grid's live slots
    let rows: Vec<u64> = (0..10_000).collect();
    let options = GridOptions::new(Viewport {
        width: 640.0,
        height: 480,
    })
    .with_default_row_height(24);
    let mut c = Controller::new(Grid::new(rows, Noop, options));

    let target = c
        .start_tween_to_row(2_000, ScrollDestination::Middle, 0, 0, 240, Easing::SmoothStep)
        .unwrap_or_default();
    println!("target_offset={target}");

    let mut now_ms = 0u64;
    while c.is_animating() {
        now_ms += 16;
        if let Some(off) = c.tick(now_ms) {
            if now_ms % 80 == 0 {
                println!(
                    "t={now_ms} off={off} visible={:?}",
                    c.grid().escalator().visible_row_range()
                );
            }
        }
    }

    println!(
        "done: off={} slots={}",
        c.grid().scroll_top(),
        c.grid().escalator().live_slot_count()
    );
}
