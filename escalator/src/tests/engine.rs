use super::*;

struct Harness<D: DataSource<Row = u32>> {
    data: D,
    renderer: RecordingRenderer,
    engine: Escalator,
}

impl<D: DataSource<Row = u32>> Harness<D> {
    fn new(data: D, renderer: RecordingRenderer, options: &GridOptions, rows: usize) -> Self {
        let mut h = Self {
            data,
            renderer,
            engine: Escalator::new(options),
        };
        h.run(|e, cx| e.set_row_count(rows, cx));
        h
    }

    fn run<T>(
        &mut self,
        f: impl FnOnce(&mut Escalator, &mut BodyContext<'_, D, RecordingRenderer>) -> T,
    ) -> T {
        let mut cx = BodyContext::new(&self.data, &mut self.renderer);
        f(&mut self.engine, &mut cx)
    }

    fn live_widget_cells(&self) -> usize {
        self.engine
            .slots()
            .iter()
            .map(|s| s.cells().iter().filter(|c| c.is_attached()).count())
            .sum()
    }
}

fn column_ids(n: u64) -> Vec<ColumnId> {
    (0..n).map(ColumnId).collect()
}

type RowSnapshot = (bool, bool, Vec<SlotCell>, Vec<Option<u32>>);

/// What the slot bound to `row` presents, independent of which slot it is.
fn row_snapshot<D: DataSource<Row = u32>>(h: &Harness<D>, row: usize, ids: &[ColumnId]) -> RowSnapshot {
    let slot = h.engine.slot_for_row(row).unwrap();
    let content = ids
        .iter()
        .map(|id| h.renderer.content.get(&(slot.id(), *id)).copied())
        .collect();
    (slot.has_data(), slot.is_stripe(), slot.cells().to_vec(), content)
}

#[test]
fn materializes_only_the_visible_window() {
    let opts = options(300.0, 400, 20, 2);
    let mut h = Harness::new(rows(1000), RecordingRenderer::default(), &opts, 1000);
    assert_eq!(h.engine.visible_row_range(), Range::with_length(0, 22));
    assert_eq!(h.engine.live_slot_count(), 22);
    assert_eq!(bound_rows(&h.engine), (0..22).collect::<Vec<_>>());

    h.run(|e, cx| e.set_scroll_top(1000, cx));
    // Rows 50..70 are visible, plus two rows of overscan on each side.
    assert_eq!(h.engine.visible_row_range(), Range::with_length(48, 24));
    assert_eq!(h.engine.check_invariants(), Ok(()));
}

#[test]
fn virtualization_bound_holds_for_a_million_rows() {
    let opts = options(300.0, 400, 20, 2);
    let n = 1_000_000;
    let mut h = Harness::new(PagedSource::new(Some(n)), RecordingRenderer::default(), &opts, n);
    let bound = 400 / 20 + 1 + 2 * 2;

    let mut rng = Lcg::new(42);
    let max = h.engine.scroll().max_scroll_top();
    assert_eq!(max, n as u64 * 20 - 400);
    for _ in 0..200 {
        let top = rng.gen_range_u64(0, max + 1);
        h.run(|e, cx| e.set_scroll_top(top, cx));
        assert!(h.engine.live_slot_count() <= bound);
        assert_eq!(h.engine.check_invariants(), Ok(()));
    }
    h.run(|e, cx| e.set_scroll_top(u64::MAX, cx));
    assert_eq!(h.engine.scroll().scroll_top(), max);
    assert_eq!(h.engine.visible_row_range().end(), n);
    assert!(h.engine.live_slot_count() <= bound);
}

#[test]
fn scrolling_rebinds_slots_instead_of_creating_them() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(PagedSource::new(Some(1000)), RecordingRenderer::default(), &opts, 1000);
    assert_eq!(h.engine.take_availability_request(), Some(Range::with_length(0, 20)));
    let ids = slot_ids(&h.engine);

    h.run(|e, cx| e.set_scroll_top(2800, cx));
    assert_eq!(h.engine.take_availability_request(), Some(Range::with_length(140, 20)));
    assert_eq!(h.engine.take_availability_request(), None);
    assert_eq!(slot_ids(&h.engine), ids);
    assert_eq!(bound_rows(&h.engine), (140..160).collect::<Vec<_>>());
    // Nothing is loaded yet.
    assert!(h.engine.slots().iter().all(|s| !s.has_data()));
}

#[test]
fn repeated_scroll_to_the_same_offset_is_idempotent() {
    let opts = options(300.0, 400, 20, 1);
    let mut h = Harness::new(rows(500), RecordingRenderer::default(), &opts, 500);
    h.run(|e, cx| e.insert_columns(0, &column_ids(2), cx));
    h.run(|e, cx| e.set_scroll_top(777, cx));
    let bindings = bound_rows(&h.engine);
    let ids = slot_ids(&h.engine);
    let renders = h.renderer.renders;

    h.run(|e, cx| e.set_scroll_top(777, cx));
    assert_eq!(bound_rows(&h.engine), bindings);
    assert_eq!(slot_ids(&h.engine), ids);
    assert_eq!(h.renderer.renders, renders);

    h.run(|e, cx| e.set_scroll_top(5010, cx));
    h.run(|e, cx| e.set_scroll_top(777, cx));
    assert_eq!(bound_rows(&h.engine), bindings);
    assert_eq!(slot_ids(&h.engine), ids);
}

#[test]
fn inserting_above_the_viewport_keeps_visible_rows_in_place() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(rows(200), RecordingRenderer::default(), &opts, 200);
    h.run(|e, cx| e.set_scroll_top(400, cx));
    assert_eq!(h.engine.visible_row_range().start(), 20);

    let shift = h.run(|e, cx| e.insert_rows(0, 5, cx));
    assert_eq!(shift, RowShift::Inserted(Range::with_length(0, 5)));
    assert_eq!(h.engine.row_count(), 205);
    assert_eq!(h.engine.scroll().scroll_top(), 500);
    assert_eq!(h.engine.visible_row_range().start(), 25);
    assert_eq!(h.engine.check_invariants(), Ok(()));
}

#[test]
fn inserting_inside_the_viewport_shifts_bindings() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(rows(200), RecordingRenderer::default(), &opts, 200);
    let slot_of_row_10 = h.engine.slot_for_row(10).map(Slot::id);

    h.run(|e, cx| e.insert_rows(5, 3, cx));
    assert_eq!(h.engine.scroll().scroll_top(), 0);
    assert_eq!(h.engine.slot_for_row(13).map(Slot::id), slot_of_row_10);
    assert_eq!(bound_rows(&h.engine), (0..20).collect::<Vec<_>>());
    assert_eq!(h.engine.check_invariants(), Ok(()));
}

#[test]
fn rebinding_a_slot_back_matches_a_fresh_bind() {
    let opts = options(300.0, 400, 20, 0);
    let ids = column_ids(3);
    let harness = || {
        let mut h = Harness::new(
            rows(200),
            RecordingRenderer::with_widgets(&[ids[1]]),
            &opts,
            200,
        );
        h.run(|e, cx| e.insert_columns(0, &ids, cx));
        h
    };
    let fresh = harness();
    let mut h = harness();
    let slots = slot_ids(&h.engine);

    // Every slot goes i -> j -> i.
    h.run(|e, cx| e.set_scroll_top(2000, cx));
    assert_eq!(slot_ids(&h.engine), slots);
    assert_eq!(bound_rows(&h.engine), (100..120).collect::<Vec<_>>());
    assert_eq!(row_snapshot(&h, 100, &ids).3, vec![Some(100); 3]);
    h.run(|e, cx| e.set_scroll_top(0, cx));
    assert_eq!(slot_ids(&h.engine), slots);
    assert_eq!(bound_rows(&h.engine), (0..20).collect::<Vec<_>>());

    for row in 0..20 {
        assert_eq!(row_snapshot(&h, row, &ids), row_snapshot(&fresh, row, &ids));
    }
    assert_eq!(h.renderer.attached, {
        let mut live = BTreeSet::new();
        for slot in h.engine.slots() {
            live.insert((slot.id(), ids[1]));
        }
        live
    });
    assert_eq!(h.renderer.attach_calls - h.renderer.detach_calls, 20);
    assert_eq!(h.live_widget_cells(), 20);
    assert_eq!(h.engine.check_invariants(), Ok(()));
}

#[test]
fn removing_rows_destroys_their_slots_and_keeps_widgets_balanced() {
    let opts = options(300.0, 400, 20, 0);
    let ids = column_ids(3);
    let renderer = RecordingRenderer::with_widgets(&[ids[1]]);
    let mut h = Harness::new(rows(100), renderer, &opts, 100);
    h.run(|e, cx| e.insert_columns(0, &ids, cx));
    assert_eq!(h.renderer.attached.len(), 20);

    let shift = h.run(|e, cx| e.remove_rows(5, 10, cx));
    assert_eq!(shift, RowShift::Removed(Range::with_length(5, 10)));
    assert_eq!(h.engine.row_count(), 90);
    assert_eq!(bound_rows(&h.engine), (0..20).collect::<Vec<_>>());
    assert_eq!(h.renderer.attached.len(), h.live_widget_cells());
    assert_eq!(h.renderer.attach_calls - h.renderer.detach_calls, 20);

    h.run(|e, cx| e.set_row_count(0, cx));
    assert_eq!(h.engine.live_slot_count(), 0);
    assert!(h.renderer.attached.is_empty());
}

#[test]
fn removing_above_the_viewport_moves_the_offset_back() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(rows(200), RecordingRenderer::default(), &opts, 200);
    h.run(|e, cx| e.set_scroll_top(1000, cx));
    h.run(|e, cx| e.remove_rows(0, 10, cx));
    assert_eq!(h.engine.scroll().scroll_top(), 800);
    assert_eq!(h.engine.visible_row_range().start(), 40);
}

#[test]
fn removal_straddling_the_viewport_top_keeps_following_rows_in_place() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(rows(200), RecordingRenderer::default(), &opts, 200);
    h.run(|e, cx| e.set_scroll_top(1000, cx));
    h.run(|e, cx| e.remove_rows(40, 20, cx));
    // Only the ten rows above the viewport move the offset; old row 60 takes the top.
    assert_eq!(h.engine.scroll().scroll_top(), 800);
    assert_eq!(h.engine.visible_row_range().start(), 40);
    assert_eq!(h.engine.check_invariants(), Ok(()));

    // A partially scrolled-off first row that is removed takes its hidden part along.
    h.run(|e, cx| e.set_scroll_top(1010, cx));
    h.run(|e, cx| e.remove_rows(45, 10, cx));
    assert_eq!(h.engine.scroll().scroll_top(), 900);
    assert_eq!(h.engine.visible_row_range().start(), 45);
    assert_eq!(h.engine.check_invariants(), Ok(()));
}

#[test]
fn render_failures_leave_the_cell_empty() {
    let opts = options(300.0, 400, 20, 0);
    let mut renderer = RecordingRenderer::default();
    renderer.failing_rows.insert(3);
    let mut h = Harness::new(rows(50), renderer, &opts, 50);
    h.run(|e, cx| e.insert_columns(0, &column_ids(2), cx));

    let failed = h.engine.slot_for_row(3).unwrap();
    assert!(failed.has_data());
    assert!(failed.cells().iter().all(|c| c.is_live() && !c.has_content()));
    let fine = h.engine.slot_for_row(4).unwrap();
    assert!(fine.cells().iter().all(|c| c.has_content()));
    assert!(h.renderer.clears >= 2);
}

#[test]
fn missing_rows_render_as_empty_until_refreshed() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(PagedSource::new(Some(100)), RecordingRenderer::default(), &opts, 100);
    h.run(|e, cx| e.insert_columns(0, &column_ids(1), cx));
    assert!(!h.engine.slot_for_row(0).unwrap().has_data());

    h.data.load(Range::with_length(0, 20));
    h.run(|e, cx| e.refresh_rows(0, 20, cx));
    let slot = h.engine.slot_for_row(0).unwrap();
    assert!(slot.has_data());
    assert!(slot.cells()[0].has_content());
    assert!(!slot.is_stripe());
    assert!(h.engine.slot_for_row(1).unwrap().is_stripe());
}

#[test]
fn frozen_columns_stay_live_while_scrolling_horizontally() {
    let opts = options(300.0, 100, 20, 0).with_column_overscan(0);
    let mut h = Harness::new(rows(10), RecordingRenderer::default(), &opts, 10);
    h.run(|e, cx| e.insert_columns(0, &column_ids(10), cx));
    h.run(|e, cx| e.set_frozen_column_count(1, cx));
    assert_eq!(h.engine.live_column_range(), Range::with_length(1, 2));

    let applied = h.run(|e, cx| e.set_scroll_left(250.0, cx));
    assert_eq!(applied, 250.0);
    assert_eq!(h.engine.live_column_range(), Range::with_length(3, 3));
    for slot in h.engine.slots() {
        let live: Vec<bool> = slot.cells().iter().map(|c| c.is_live()).collect();
        assert_eq!(
            live,
            vec![true, false, false, true, true, true, false, false, false, false]
        );
    }
}

#[test]
fn scroll_to_row_destinations() {
    let opts = options(300.0, 400, 20, 0);
    let h = Harness::new(rows(1000), RecordingRenderer::default(), &opts, 1000);
    let scroll = h.engine.scroll();
    assert_eq!(scroll.scroll_to_row_offset(100, ScrollDestination::Start, 0), Ok(2000));
    assert_eq!(scroll.scroll_to_row_offset(100, ScrollDestination::End, 0), Ok(1620));
    assert_eq!(scroll.scroll_to_row_offset(100, ScrollDestination::Middle, 0), Ok(1810));
    assert_eq!(scroll.scroll_to_row_offset(100, ScrollDestination::Any, 10), Ok(1630));
    assert_eq!(scroll.scroll_to_row_offset(5, ScrollDestination::Any, 0), Ok(0));
    assert_eq!(
        scroll.scroll_to_row_offset(999, ScrollDestination::Start, 0),
        Ok(scroll.max_scroll_top())
    );
    assert_eq!(
        scroll.scroll_to_row_offset(1000, ScrollDestination::Any, 0),
        Err(GridError::RowOutOfBounds { index: 1000, max: 999 })
    );
    assert_eq!(
        scroll.scroll_to_row_offset(3, ScrollDestination::Middle, 4),
        Err(GridError::PaddingWithMiddle(4))
    );
}

#[test]
fn row_height_changes_above_the_offset_adjust_scrolling() {
    let opts = options(300.0, 400, 20, 0);
    let mut h = Harness::new(rows(100), RecordingRenderer::default(), &opts, 100);
    h.run(|e, cx| e.set_scroll_top(400, cx));
    h.run(|e, cx| e.set_row_height(2, 120, cx));
    assert_eq!(h.engine.scroll().scroll_top(), 500);
    assert_eq!(h.engine.row_top(3), Some(160));

    h.run(|e, cx| e.set_row_height(50, 60, cx));
    assert_eq!(h.engine.scroll().scroll_top(), 500);
    assert_eq!(h.engine.scroll().explicit_row_count(), 2);

    // Inserting above an explicit row carries its height along.
    h.run(|e, cx| e.insert_rows(0, 5, cx));
    assert_eq!(h.engine.scroll().row_height(7), Some(120));
    assert_eq!(h.engine.scroll().row_height(55), Some(60));

    h.run(|e, cx| e.reset_row_heights(cx));
    assert_eq!(h.engine.scroll().explicit_row_count(), 0);
    assert_eq!(h.engine.row_top(3), Some(60));
}

#[test]
fn is_scrolling_resets_after_the_debounce_delay() {
    let opts = options(300.0, 400, 20, 0).with_is_scrolling_reset_delay_ms(150);
    let mut h = Harness::new(rows(100), RecordingRenderer::default(), &opts, 100);
    h.engine.notify_scroll_event(1000);
    assert!(h.engine.scroll().is_scrolling());
    assert!(!h.engine.update_scrolling(1100));
    assert!(h.engine.scroll().is_scrolling());
    assert!(h.engine.update_scrolling(1150));
    assert!(!h.engine.scroll().is_scrolling());
}

#[test]
fn randomized_mutations_keep_slot_bookkeeping_consistent() {
    let opts = options(350.0, 300, 20, 1).with_column_overscan(0);
    let ids = column_ids(6);
    let renderer = RecordingRenderer::with_widgets(&[ids[0], ids[3]]);
    let mut h = Harness::new(rows(10_000), renderer, &opts, 400);
    h.run(|e, cx| e.insert_columns(0, &ids, cx));

    let mut rng = Lcg::new(0xe5ca_1a70);
    for _ in 0..400 {
        match rng.gen_range_u32(0, 7) {
            0 => {
                let top = rng.gen_range_u64(0, h.engine.scroll().max_scroll_top() + 1);
                h.run(|e, cx| e.set_scroll_top(top, cx));
            }
            1 => {
                let at = rng.gen_range_usize(0, h.engine.row_count() + 1);
                let count = rng.gen_range_usize(1, 30);
                h.run(|e, cx| e.insert_rows(at, count, cx));
            }
            2 if h.engine.row_count() > 0 => {
                let at = rng.gen_range_usize(0, h.engine.row_count());
                let count = rng.gen_range_usize(1, 40);
                h.run(|e, cx| e.remove_rows(at, count, cx));
            }
            3 => {
                let left = rng.gen_range_u32(0, 400) as f64;
                h.run(|e, cx| e.set_scroll_left(left, cx));
            }
            4 if h.engine.row_count() > 0 => {
                let row = rng.gen_range_usize(0, h.engine.row_count());
                let px = rng.gen_range_u32(10, 80);
                h.run(|e, cx| e.set_row_height(row, px, cx));
            }
            5 => {
                let frozen = rng.gen_range_usize(0, 3);
                h.run(|e, cx| e.set_frozen_column_count(frozen, cx));
            }
            _ => {
                let n = rng.gen_range_usize(0, 600);
                h.run(|e, cx| e.set_row_count(n, cx));
            }
        }
        assert_eq!(h.engine.check_invariants(), Ok(()));
        assert_eq!(h.renderer.attached.len(), h.live_widget_cells());
        let max_rows = 300 / 10 + 1 + 2;
        assert!(h.engine.live_slot_count() <= max_rows);
        for slot in h.engine.slots() {
            for (column, cell) in slot.cells().iter().enumerate() {
                assert_eq!(cell.is_live(), h.engine.scroll().is_column_live(column));
            }
        }
    }

    h.run(|e, cx| e.set_row_count(0, cx));
    assert!(h.renderer.attached.is_empty());
    assert_eq!(h.renderer.attach_calls, h.renderer.detach_calls);
}
