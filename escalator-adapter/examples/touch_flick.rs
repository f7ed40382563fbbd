use escalator_adapter::{ScrollExtent, TouchConfig, TouchInertiaController, TouchPoint};

fn main() {
    // Example: feeding timestamped touch samples and applying the deceleration frames.
    let mut touch = TouchInertiaController::new(TouchConfig::default().with_duration_base_ms(800.0));
    let mut top = 1_000.0;
    let max_top = 50_000.0;
    let extent = |top| ScrollExtent {
        top,
        left: 0.0,
        max_top,
        max_left: 0.0,
    };

    touch.touch_start(1, TouchPoint::new(160.0, 600.0, 0), extent(top));
    for (i, y) in [570.0, 530.0, 480.0].into_iter().enumerate() {
        let t = 10 * (i as u64 + 1);
        if let Some(scroll) = touch.touch_move(1, true, TouchPoint::new(160.0, y, t), extent(top)) {
            top = scroll.top.unwrap_or(top);
        }
    }
    println!("after drag: top={top}");

    let Some(run) = touch.touch_end(30, extent(top)) else {
        println!("release too slow, no inertia");
        return;
    };
    println!(
        "deceleration: {:.0}px over {:.0}ms",
        run.offset_top, run.duration_ms
    );

    let mut now_ms = run.start_ms;
    while let Some(frame) = touch.step(now_ms) {
        top = frame.top.unwrap_or(top);
        if (now_ms - run.start_ms) % 160 == 0 {
            println!("t={now_ms} top={top:.1}");
        }
        now_ms += 16;
    }
    println!("rest: top={top:.1}");
}
