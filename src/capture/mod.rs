//! The capture sequencer.
//!
//! One pass drives the rendered header through its phases (idle, move to
//! the star button, hover, click, move away) and requests one screenshot
//! per frame from the capture target, in strict sequential order with no
//! retries.

mod phase;
mod plan;

pub use phase::Phase;
pub use plan::FramePlan;

use crate::animation::{self, Position};
use crate::browser::CaptureTarget;
use crate::config::{Config, PartitionMode};
use crate::Result;
use phase::AFTER_CLICK_LABEL;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tick period for the bounded settle loop after the movement budget is
/// spent.
const SETTLE_TICK: Duration = Duration::from_millis(16);

/// Cursor offset below the viewport bottom edge when off screen.
const OFFSCREEN_MARGIN: f64 = 50.0;

/// Computes the cursor target from the star button's rendered rect, so the
/// cursor rect center lands on the button center.
const BUTTON_TARGET_JS: &str = r#"(() => {
    const rect = document.getElementById('star-button').getBoundingClientRect();
    const cursor = document.getElementById('cursor');
    return {
        x: rect.left + rect.width / 2 - cursor.offsetWidth / 2,
        y: rect.top + rect.height / 2 - cursor.offsetHeight / 2
    };
})()"#;

/// True when the rendered cursor center is within 10px of the button
/// center on both axes.
const CURSOR_NEAR_BUTTON_JS: &str = r#"(() => {
    const c = document.getElementById('cursor').getBoundingClientRect();
    const b = document.getElementById('star-button').getBoundingClientRect();
    return Math.abs(c.left + c.width / 2 - (b.left + b.width / 2)) < 10 &&
           Math.abs(c.top + c.height / 2 - (b.top + b.height / 2)) < 10;
})()"#;

/// Outcome of one capture pass.
#[derive(Debug)]
pub struct CaptureReport {
    /// Saved frame paths, in capture order.
    pub frames: Vec<PathBuf>,
    /// Whether the cursor verifiably reached the star button.
    pub reached_button: bool,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Drives one capture pass over a [`CaptureTarget`].
pub struct Sequencer<'a> {
    config: &'a Config,
    plan: FramePlan,
}

/// Create the output directory if absent. Returns whether it was created.
pub(crate) fn ensure_output_dir(dir: &Path) -> Result<bool> {
    if dir.exists() {
        debug!("output directory exists: {}", dir.display());
        return Ok(false);
    }
    std::fs::create_dir_all(dir)?;
    info!("created output directory: {}", dir.display());
    Ok(true)
}

/// Allocates frame indices and filenames up to the plan's cap.
struct FrameWriter {
    dir: PathBuf,
    label_frames: bool,
    cap: u32,
    next: u32,
    saved: Vec<PathBuf>,
}

impl FrameWriter {
    fn new(dir: PathBuf, label_frames: bool, cap: u32) -> Self {
        Self {
            dir,
            label_frames,
            cap,
            next: 0,
            saved: Vec::new(),
        }
    }

    fn next_path(&mut self, label: &str) -> Option<(u32, PathBuf)> {
        if self.next >= self.cap {
            return None;
        }
        let name = if self.label_frames {
            format!("frame_{:03}_{}.png", self.next, label)
        } else {
            format!("frame_{:03}.png", self.next)
        };
        let index = self.next;
        self.next += 1;
        Some((index, self.dir.join(name)))
    }
}

async fn capture_frame<T: CaptureTarget>(
    target: &T,
    frames: &mut FrameWriter,
    label: &str,
) -> Result<bool> {
    let Some((index, path)) = frames.next_path(label) else {
        debug!("frame budget reached, skipping {} frame", label);
        return Ok(false);
    };
    target.screenshot(&path).await?;
    debug!("captured frame {} ({})", index, label);
    frames.saved.push(path);
    Ok(true)
}

impl<'a> Sequencer<'a> {
    pub fn new(config: &'a Config) -> Self {
        let plan = match config.capture.mode {
            PartitionMode::Proportional => {
                FramePlan::proportional(config.capture.frames, config.capture.movement_fraction)
            }
            PartitionMode::EqualSplit => FramePlan::equal_split(config.capture.frames),
        };
        Self { config, plan }
    }

    pub fn plan(&self) -> FramePlan {
        self.plan
    }

    /// Run one capture pass. The page must already be loaded.
    pub async fn run<T: CaptureTarget>(&self, target: &T) -> Result<CaptureReport> {
        let start = Instant::now();
        let settings = &self.config.animation;
        let capture = &self.config.capture;
        let interval = Duration::from_millis(capture.interval_ms);
        let reach_timeout = Duration::from_millis(settings.reach_timeout_ms);

        ensure_output_dir(Path::new(&capture.output_dir))?;
        let mut frames = FrameWriter::new(
            PathBuf::from(&capture.output_dir),
            capture.label_frames,
            self.plan.cap(),
        );

        info!(
            "capturing '{}': {} frames ({} movement / {} interaction / {} exit)",
            self.config.name,
            self.plan.total,
            self.plan.movement,
            self.plan.interaction,
            self.plan.exit
        );

        // Customize the header and reset the animation state.
        let header = &self.config.header;
        let setup = serde_json::json!({
            "repo": header.repo,
            "stars": header.stars,
            "forks": header.forks,
            "showForks": header.show_forks,
        });
        target.execute(&format!("window.repogifSetup({})", setup)).await?;
        target
            .wait_for_element_visible("#cursor", reach_timeout)
            .await?;

        let viewport = self.config.browser.viewport;
        let button: Position = {
            #[derive(serde::Deserialize)]
            struct Point {
                x: f64,
                y: f64,
            }
            let p: Point = target.evaluate(BUTTON_TARGET_JS).await?;
            Position::new(p.x, p.y)
        };
        let start_pos = Position::new(
            viewport.width as f64 / 2.0,
            viewport.height as f64 + OFFSCREEN_MARGIN,
        );
        let exit_pos = Position::new(button.x, viewport.height as f64 + OFFSCREEN_MARGIN);

        // Idle: cursor shown at the start position.
        let mut pos = start_pos;
        self.push_cursor(target, pos).await?;
        target.execute("window.repogifShowCursor()").await?;
        capture_frame(target, &mut frames, Phase::Idle.label()).await?;
        tokio::time::sleep(Duration::from_millis(settings.initial_delay_ms)).await;

        // MovingToTarget: one interpolation step per frame.
        info!("phase {}: cursor movement", Phase::MovingToTarget);
        let mut reached = false;
        for _ in 0..self.plan.movement {
            let (next, done) = animation::step(pos, button, settings);
            pos = next;
            self.push_cursor(target, pos).await?;
            tokio::time::sleep(interval).await;
            capture_frame(target, &mut frames, Phase::MovingToTarget.label()).await?;
            if done {
                reached = true;
                break;
            }
        }

        // Movement budget spent before the target: keep ticking without
        // capturing, bounded by the reach timeout.
        if !reached {
            let deadline = Instant::now() + reach_timeout;
            let bound = animation::max_steps(pos, button, settings);
            let mut ticks = 0;
            while !reached && ticks < bound && Instant::now() < deadline {
                let (next, done) = animation::step(pos, button, settings);
                pos = next;
                reached = done;
                ticks += 1;
                self.push_cursor(target, pos).await?;
                tokio::time::sleep(SETTLE_TICK).await;
            }
            if !reached {
                warn!(
                    "cursor did not reach the star button within {}ms, continuing from ({:.0}, {:.0})",
                    settings.reach_timeout_ms, pos.x, pos.y
                );
            }
        }

        // Cross-check against the rendered DOM, same timeout policy.
        let near_button = target
            .wait_for_condition(CURSOR_NEAR_BUTTON_JS, reach_timeout)
            .await?;
        if !near_button {
            warn!("rendered cursor not near the star button, capturing hover frame anyway");
        }

        // Hovering: hover frame plus any pre-click pause frames.
        info!("phase {}: hover and click", Phase::Hovering);
        let (pre_click, click_transition) = self.plan.extra_interaction();
        capture_frame(target, &mut frames, Phase::Hovering.label()).await?;
        for _ in 0..pre_click {
            tokio::time::sleep(interval).await;
            capture_frame(target, &mut frames, Phase::Hovering.label()).await?;
        }
        tokio::time::sleep(Duration::from_millis(settings.hover_delay_ms)).await;

        // Clicking: trigger the page effect, then the click moment and its
        // transition frames.
        target.execute("window.repogifClick()").await?;
        capture_frame(target, &mut frames, Phase::Clicking.label()).await?;
        for _ in 0..click_transition {
            tokio::time::sleep(interval).await;
            capture_frame(target, &mut frames, Phase::Clicking.label()).await?;
        }
        tokio::time::sleep(Duration::from_millis(settings.settle_delay_ms)).await;
        capture_frame(target, &mut frames, AFTER_CLICK_LABEL).await?;

        // MovingAway: interpolate toward the exit point; once there, the
        // remaining exit frames show the settled header.
        info!("phase {}: cursor exit", Phase::MovingAway);
        let mut exited = false;
        for _ in 0..self.plan.exit {
            if !exited {
                let (next, done) = animation::step(pos, exit_pos, settings);
                pos = next;
                exited = done;
                self.push_cursor(target, pos).await?;
                if exited {
                    target.execute("window.repogifHideCursor()").await?;
                }
            }
            tokio::time::sleep(interval).await;
            capture_frame(target, &mut frames, Phase::MovingAway.label()).await?;
        }

        let report = CaptureReport {
            frames: frames.saved,
            reached_button: reached && near_button,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "capture complete: {} frames in {}ms",
            report.frames.len(),
            report.duration_ms
        );
        Ok(report)
    }

    async fn push_cursor<T: CaptureTarget>(&self, target: &T, pos: Position) -> Result<()> {
        target
            .execute(&format!(
                "window.repogifMoveCursor({:.2}, {:.2})",
                pos.x, pos.y
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SpeedMode;
    use crate::config::Config;
    use std::cell::RefCell;
    use std::time::Duration;

    struct MockTarget {
        shots: RefCell<Vec<PathBuf>>,
        scripts: RefCell<Vec<String>>,
        near_button: bool,
    }

    impl MockTarget {
        fn new(near_button: bool) -> Self {
            Self {
                shots: RefCell::new(Vec::new()),
                scripts: RefCell::new(Vec::new()),
                near_button,
            }
        }

        fn frame_names(&self) -> Vec<String> {
            self.shots
                .borrow()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        }
    }

    impl CaptureTarget for MockTarget {
        async fn screenshot(&self, path: &Path) -> Result<()> {
            self.shots.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        async fn evaluate<T: serde::de::DeserializeOwned>(&self, _js: &str) -> Result<T> {
            // Only the button target query deserializes a value.
            Ok(serde_json::from_value(serde_json::json!({
                "x": 620.0,
                "y": 96.0
            }))?)
        }

        async fn execute(&self, js: &str) -> Result<()> {
            self.scripts.borrow_mut().push(js.to_string());
            Ok(())
        }

        async fn wait_for_condition(&self, _js: &str, _timeout: Duration) -> Result<bool> {
            Ok(self.near_button)
        }

        async fn wait_for_element_visible(&self, _sel: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }
    }

    fn fast_config(dir: &Path, frames: u32, mode: crate::config::PartitionMode) -> Config {
        let mut config = Config::default();
        config.capture.frames = frames;
        config.capture.mode = mode;
        config.capture.interval_ms = 1;
        config.capture.output_dir = dir.to_string_lossy().into_owned();
        config.animation.speed = SpeedMode::Fixed(1.0);
        config.animation.initial_delay_ms = 0;
        config.animation.hover_delay_ms = 0;
        config.animation.settle_delay_ms = 0;
        config.animation.reach_timeout_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_equal_split_emits_total_plus_one_frames() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path(), 20, crate::config::PartitionMode::EqualSplit);
        let target = MockTarget::new(true);

        let report = Sequencer::new(&config).run(&target).await.unwrap();
        let names = target.frame_names();

        assert_eq!(report.frames.len(), 21);
        assert_eq!(names[0], "frame_000_initial.png");
        assert_eq!(names[10], "frame_010_moving.png");
        assert_eq!(names[11], "frame_011_hover.png");
        assert_eq!(names[12], "frame_012_click.png");
        assert_eq!(names[13], "frame_013_after_click.png");
        assert_eq!(names[14], "frame_014_exit.png");
        assert_eq!(names[20], "frame_020_exit.png");
    }

    #[tokio::test]
    async fn test_proportional_never_exceeds_budget() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config(dir.path(), 12, crate::config::PartitionMode::Proportional);
        config.capture.movement_fraction = 0.5;
        let target = MockTarget::new(true);

        // Planned 1 + 6 + 9 + 1 frames exceed the 12-frame cap; capture
        // must stop early instead.
        let report = Sequencer::new(&config).run(&target).await.unwrap();
        let names = target.frame_names();

        assert_eq!(report.frames.len(), 12);
        assert_eq!(names.last().unwrap(), "frame_011_click.png");
        for name in &names {
            let index: u32 = name[6..9].parse().unwrap();
            assert!(index < 12, "frame index {} exceeds the cap", index);
        }
    }

    #[tokio::test]
    async fn test_timeout_still_captures_hover_frame() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path(), 20, crate::config::PartitionMode::EqualSplit);
        let target = MockTarget::new(false);

        let report = Sequencer::new(&config).run(&target).await.unwrap();

        assert!(!report.reached_button);
        assert!(target
            .frame_names()
            .iter()
            .any(|n| n.ends_with("_hover.png")));
    }

    #[tokio::test]
    async fn test_fast_cursor_finishes_movement_early() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config(dir.path(), 20, crate::config::PartitionMode::EqualSplit);
        config.animation.speed = SpeedMode::Fixed(10_000.0);
        let target = MockTarget::new(true);

        let report = Sequencer::new(&config).run(&target).await.unwrap();
        let names = target.frame_names();

        assert!(report.reached_button);
        // One moving frame, then straight to the interaction.
        assert_eq!(names[1], "frame_001_moving.png");
        assert_eq!(names[2], "frame_002_hover.png");
        assert!(report.frames.len() < 21);
    }

    #[tokio::test]
    async fn test_unlabeled_frame_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config(dir.path(), 8, crate::config::PartitionMode::EqualSplit);
        config.capture.label_frames = false;
        let target = MockTarget::new(true);

        Sequencer::new(&config).run(&target).await.unwrap();

        for name in target.frame_names() {
            assert!(name.starts_with("frame_"));
            assert!(name.ends_with(".png"));
            assert_eq!(name.len(), "frame_000.png".len());
        }
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames");

        assert!(ensure_output_dir(&path).unwrap());
        assert!(path.is_dir());
        // Second call is a no-op, not an error.
        assert!(!ensure_output_dir(&path).unwrap());
    }
}
