//! Cursor interpolation toward a fixed target.
//!
//! The interpolator is a pure function: given the current cursor position
//! and the target, it produces the next position one tick later. The caller
//! (the capture sequencer) schedules ticks and pushes each position into
//! the rendered page.

use serde::Deserialize;

/// A point in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// How the per-tick step magnitude is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpeedMode {
    /// Constant pixels per tick.
    Fixed(f64),
    /// Distance-scaled: `clamp(distance / divisor, min, max)`. Slows down
    /// near the target, caps out far from it.
    Adaptive { min: f64, max: f64, divisor: f64 },
}

impl SpeedMode {
    /// Step magnitude for a given remaining distance.
    pub fn magnitude(&self, distance: f64) -> f64 {
        match *self {
            SpeedMode::Fixed(speed) => speed,
            SpeedMode::Adaptive { min, max, divisor } => (distance / divisor).clamp(min, max),
        }
    }

    /// Smallest step this mode can produce. Bounds the tick count needed
    /// to cover any distance.
    pub fn min_step(&self) -> f64 {
        match *self {
            SpeedMode::Fixed(speed) => speed,
            SpeedMode::Adaptive { min, .. } => min,
        }
    }
}

fn default_speed() -> SpeedMode {
    SpeedMode::Fixed(10.0)
}

fn default_snap_threshold() -> f64 {
    1.0
}

fn default_initial_delay() -> u64 {
    500
}

fn default_hover_delay() -> u64 {
    500
}

fn default_settle_delay() -> u64 {
    200
}

fn default_reach_timeout() -> u64 {
    5000
}

/// Animation tuning, immutable once a capture run starts.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSettings {
    /// Cursor speed per tick.
    #[serde(default = "default_speed")]
    pub speed: SpeedMode,

    /// Distance below which the cursor snaps onto the target exactly.
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,

    /// Delay before the cursor starts moving (ms).
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Hover duration before the click (ms).
    #[serde(default = "default_hover_delay")]
    pub hover_delay_ms: u64,

    /// Settle duration after the click (ms).
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Bounded wait for the cursor to reach the button (ms). On expiry the
    /// run continues from the last known position.
    #[serde(default = "default_reach_timeout")]
    pub reach_timeout_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            snap_threshold: default_snap_threshold(),
            initial_delay_ms: default_initial_delay(),
            hover_delay_ms: default_hover_delay(),
            settle_delay_ms: default_settle_delay(),
            reach_timeout_ms: default_reach_timeout(),
        }
    }
}

/// Advance the cursor one tick toward `target`.
///
/// Returns the next position and whether the target was reached. Once the
/// remaining distance drops below the snap threshold the target is returned
/// exactly, so repeated application terminates without oscillating around
/// the target.
pub fn step(current: Position, target: Position, settings: &AnimationSettings) -> (Position, bool) {
    let dx = target.x - current.x;
    let dy = target.y - current.y;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance < settings.snap_threshold {
        return (target, true);
    }

    let magnitude = settings.speed.magnitude(distance);
    if magnitude >= distance {
        // A full step would overshoot; land on the target instead.
        return (target, true);
    }

    let next = Position::new(
        current.x + dx / distance * magnitude,
        current.y + dy / distance * magnitude,
    );
    (next, false)
}

/// Upper bound on the number of ticks needed to travel from `from` to `to`:
/// `ceil(distance / min_step)` plus the snapping tick.
pub fn max_steps(from: Position, to: Position, settings: &AnimationSettings) -> u32 {
    let distance = from.distance_to(to);
    let min_step = settings.speed.min_step().max(f64::MIN_POSITIVE);
    (distance / min_step).ceil() as u32 + 1
}
