use alloc::collections::VecDeque;

/// Tuning constants of the touch inertia controller.
///
/// The defaults are empirically tuned for phones and tablets. `duration_base_ms` scales the
/// deceleration length; larger screens usually want a longer base.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchConfig {
    /// Speeds (px/ms) at or below this are treated as standing still.
    pub min_velocity: f64,
    /// Speed (px/ms) where the throw distance curve saturates.
    pub max_velocity: f64,
    /// Throw distance per px/ms of release velocity.
    pub velocity_factor: f64,
    /// Added to the acceleration multiplier by a touch that interrupts a deceleration.
    pub acceleration_step: f64,
    pub max_acceleration: f64,
    /// An axis only scrolls while the other axis' delta stays below this fraction of its own.
    pub axis_ratio: f64,
    pub duration_base_ms: f64,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            min_velocity: 0.6,
            max_velocity: 4.0,
            velocity_factor: 1500.0,
            acceleration_step: 0.7,
            max_acceleration: 5.0,
            axis_ratio: 1.0,
            duration_base_ms: 600.0,
        }
    }
}

impl TouchConfig {
    pub fn with_min_velocity(mut self, px_per_ms: f64) -> Self {
        self.min_velocity = px_per_ms;
        self
    }

    pub fn with_max_velocity(mut self, px_per_ms: f64) -> Self {
        self.max_velocity = px_per_ms;
        self
    }

    pub fn with_velocity_factor(mut self, factor: f64) -> Self {
        self.velocity_factor = factor;
        self
    }

    pub fn with_acceleration(mut self, step: f64, max: f64) -> Self {
        self.acceleration_step = step;
        self.max_acceleration = max;
        self
    }

    pub fn with_axis_ratio(mut self, ratio: f64) -> Self {
        self.axis_ratio = ratio;
        self
    }

    pub fn with_duration_base_ms(mut self, ms: f64) -> Self {
        self.duration_base_ms = ms;
        self
    }
}

/// One touch sample in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub time_ms: u64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64, time_ms: u64) -> Self {
        Self { x, y, time_ms }
    }
}

/// Current scroll positions and their limits, as seen by the gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollExtent {
    pub top: f64,
    pub left: f64,
    pub max_top: f64,
    pub max_left: f64,
}

/// Absolute scroll positions the adapter should apply. `None` leaves an axis alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchScroll {
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl TouchScroll {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.left.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchPhase {
    #[default]
    Idle,
    Tracking,
    Decelerating,
}

/// A running deceleration, as started by [`TouchInertiaController::touch_end`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deceleration {
    pub start_ms: u64,
    pub duration_ms: f64,
    /// Throw distance per axis in px. Positive values scroll towards the end.
    pub offset_top: f64,
    pub offset_left: f64,
}

#[derive(Clone, Debug, Default)]
struct Axis {
    speeds: VecDeque<f64>,
    position: f64,
    offset: f64,
    velocity: f64,
    prev_pos: f64,
    prev_time: u64,
    delta: f64,
    scroll_max: f64,
    run: bool,
}

impl Axis {
    fn start(&mut self, page: f64, now_ms: u64, scroll_max: f64) {
        self.speeds.clear();
        self.prev_pos = page;
        self.prev_time = now_ms;
        self.scroll_max = scroll_max;
        self.delta = 0.0;
        self.offset = 0.0;
        self.run = false;
    }

    fn track(&mut self, page: f64, now_ms: u64, position: f64, config: &TouchConfig) {
        self.run = false;
        // Nothing to scroll on this axis.
        if self.scroll_max <= 1.0 {
            return;
        }
        self.delta = self.prev_pos - page;
        let elapsed = now_ms.saturating_sub(self.prev_time).max(1) as f64;
        self.velocity = self.delta / elapsed;
        // A slow sample ends the previous flick; only the terminal one counts on release.
        if self
            .speeds
            .front()
            .is_some_and(|s| !is_valid_speed(*s, config))
        {
            self.speeds.clear();
        }
        self.speeds.push_front(self.velocity);
        self.prev_time = now_ms;
        self.prev_pos = page;
        self.position = position;
    }

    fn validate(&mut self, other_delta: f64, config: &TouchConfig) {
        self.run = self.delta != 0.0
            && self.in_range(self.position + self.delta)
            && (other_delta / self.delta).abs() < config.axis_ratio;
        if !self.run {
            self.delta = 0.0;
        }
    }

    fn release(&mut self, position: f64, acceleration: f64, config: &TouchConfig) {
        let n = self.speeds.len() as f64;
        self.velocity = self.speeds.iter().map(|s| s / n).sum();
        self.position = position;
        self.offset = config.velocity_factor
            * self.velocity
            * acceleration
            * ease_in_out_cos(self.velocity, config.max_velocity);
    }

    fn step(&mut self, progress: f64) -> Option<f64> {
        if !self.run {
            return None;
        }
        let p = self.position + self.offset * progress;
        self.run = self.in_range(p);
        Some(p.clamp(0.0, self.scroll_max.max(0.0)))
    }

    fn in_range(&self, p: f64) -> bool {
        p > 0.0 && p < self.scroll_max
    }
}

fn is_valid_speed(speed: f64, config: &TouchConfig) -> bool {
    speed.abs() > config.min_velocity
}

/// Sign-preserving, saturating at `max`. Maps `0` to `0` and `±max` to `1`.
fn ease_in_out_cos(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    0.5 - 0.5 * (core::f64::consts::PI * value.abs().min(max) / max).cos()
}

fn ease_out_exp(distance: f64) -> f64 {
    1.0 - 2f64.powf(-distance / 1000.0)
}

pub(crate) fn ease_out_circ(progress: f64) -> f64 {
    let t = progress - 1.0;
    (1.0 - t * t).max(0.0).sqrt()
}

/// Converts single-finger drags into scroll positions and runs inertial deceleration after a
/// flick.
///
/// Each axis is tracked independently; per sample only an axis whose delta dominates the other
/// one is allowed to scroll, so a mostly vertical drag never jitters horizontally. A touch that
/// lands while a deceleration is running stops it where it is and compounds the next throw.
///
/// The controller owns no clock. Given the same timestamped samples and extents it produces the
/// same trajectory.
#[derive(Clone, Debug)]
pub struct TouchInertiaController {
    config: TouchConfig,
    phase: TouchPhase,
    acceleration: f64,
    x: Axis,
    y: Axis,
    deceleration: Option<Deceleration>,
}

impl Default for TouchInertiaController {
    fn default() -> Self {
        Self::new(TouchConfig::default())
    }
}

impl TouchInertiaController {
    pub fn new(config: TouchConfig) -> Self {
        Self {
            config,
            phase: TouchPhase::Idle,
            acceleration: 1.0,
            x: Axis::default(),
            y: Axis::default(),
            deceleration: None,
        }
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TouchConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn deceleration(&self) -> Option<Deceleration> {
        self.deceleration
    }

    pub fn is_decelerating(&self) -> bool {
        self.phase == TouchPhase::Decelerating
    }

    /// Starts tracking a gesture.
    ///
    /// Only single-finger gestures are tracked; anything else aborts so multi-finger gestures
    /// (pinch zoom) stay with the platform. Returns `true` when the touch interrupted a running
    /// deceleration, in which case the adapter should consume the event.
    pub fn touch_start(&mut self, touches: usize, point: TouchPoint, extent: ScrollExtent) -> bool {
        if touches != 1 {
            self.finish();
            return false;
        }
        let interrupted = self.phase == TouchPhase::Decelerating;
        if interrupted {
            self.acceleration =
                (self.acceleration + self.config.acceleration_step).min(self.config.max_acceleration);
            self.deceleration = None;
            vtrace!(acceleration = self.acceleration, "deceleration interrupted");
        } else {
            self.acceleration = 1.0;
        }
        self.x.start(point.x, point.time_ms, extent.max_left);
        self.y.start(point.y, point.time_ms, extent.max_top);
        self.phase = TouchPhase::Tracking;
        interrupted
    }

    /// Feeds one move sample. Returns the positions to scroll to, if any axis moves.
    ///
    /// A multi-finger or non-cancelable move aborts tracking.
    pub fn touch_move(
        &mut self,
        touches: usize,
        cancelable: bool,
        point: TouchPoint,
        extent: ScrollExtent,
    ) -> Option<TouchScroll> {
        if self.phase != TouchPhase::Tracking {
            return None;
        }
        if touches != 1 || !cancelable {
            self.finish();
            return None;
        }
        self.x.track(point.x, point.time_ms, extent.left, &self.config);
        self.y.track(point.y, point.time_ms, extent.top, &self.config);
        self.validate_axes();

        let scroll = TouchScroll {
            top: self.y.run.then(|| self.y.position + self.y.delta),
            left: self.x.run.then(|| self.x.position + self.x.delta),
        };
        (!scroll.is_empty()).then_some(scroll)
    }

    /// Ends the gesture and starts a deceleration if the release was fast enough.
    pub fn touch_end(&mut self, now_ms: u64, extent: ScrollExtent) -> Option<Deceleration> {
        if self.phase != TouchPhase::Tracking {
            return None;
        }
        self.x.release(extent.left, self.acceleration, &self.config);
        self.y.release(extent.top, self.acceleration, &self.config);
        self.validate_axes();
        self.x.run &= is_valid_speed(self.x.velocity, &self.config);
        self.y.run &= is_valid_speed(self.y.velocity, &self.config);

        if !self.x.run && !self.y.run {
            self.finish();
            return None;
        }

        // The dominant axis decides how long the run lasts.
        let vertical = !self.x.run || (self.y.run && self.y.offset.abs() > self.x.offset.abs());
        let distance = if vertical { self.y.offset } else { self.x.offset }.abs();
        let deceleration = Deceleration {
            start_ms: now_ms,
            duration_ms: 3.0 * self.config.duration_base_ms * ease_out_exp(distance),
            offset_top: if self.y.run { self.y.offset } else { 0.0 },
            offset_left: if self.x.run { self.x.offset } else { 0.0 },
        };
        vdebug!(
            duration_ms = deceleration.duration_ms,
            offset_top = deceleration.offset_top,
            offset_left = deceleration.offset_left,
            "deceleration started"
        );
        self.deceleration = Some(deceleration);
        self.phase = TouchPhase::Decelerating;
        Some(deceleration)
    }

    /// Advances a running deceleration to `now_ms`.
    ///
    /// Returns the clamped positions to apply this frame. An axis stops once it leaves its scroll
    /// range; the run ends when both axes stopped or the duration elapsed.
    pub fn step(&mut self, now_ms: u64) -> Option<TouchScroll> {
        let deceleration = self.deceleration?;
        let elapsed = now_ms.saturating_sub(deceleration.start_ms) as f64;
        let progress = if deceleration.duration_ms > 0.0 {
            (elapsed / deceleration.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = ease_out_circ(progress);
        let scroll = TouchScroll {
            top: self.y.step(eased),
            left: self.x.step(eased),
        };
        if progress >= 1.0 || (!self.x.run && !self.y.run) {
            self.finish();
        }
        Some(scroll)
    }

    /// Stops a running deceleration. The scroll stays wherever the last step put it.
    pub fn cancel(&mut self) {
        if self.deceleration.is_some() {
            self.finish();
        }
    }

    /// Ends the gesture. Only an interrupted run carries its acceleration into the next one.
    fn finish(&mut self) {
        self.deceleration = None;
        self.x.run = false;
        self.y.run = false;
        self.phase = TouchPhase::Idle;
        self.acceleration = 1.0;
    }

    fn validate_axes(&mut self) {
        let y_delta = self.y.delta;
        self.x.validate(y_delta, &self.config);
        let x_delta = self.x.delta;
        self.y.validate(x_delta, &self.config);
    }
}
