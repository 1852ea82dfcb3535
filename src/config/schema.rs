use crate::animation::AnimationSettings;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level capture config.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of this capture config.
    pub name: String,

    /// Rendered header customization.
    #[serde(default)]
    pub header: HeaderConfig,

    /// Browser configuration.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Path to the page to capture. Defaults to the bundled web template.
    pub page: Option<String>,

    /// Frame capture settings.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Cursor animation settings.
    #[serde(default)]
    pub animation: AnimationSettings,
}

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("name is required".into()));
        }
        if self.capture.frames < 5 {
            return Err(Error::Config("capture.frames must be at least 5".into()));
        }
        if self.capture.interval_ms == 0 {
            return Err(Error::Config("capture.interval_ms must be positive".into()));
        }
        let fraction = self.capture.movement_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::Config(
                "capture.movement_fraction must be between 0 and 1".into(),
            ));
        }
        if self.animation.snap_threshold <= 0.0 {
            return Err(Error::Config(
                "animation.snap_threshold must be positive".into(),
            ));
        }
        match self.animation.speed {
            crate::animation::SpeedMode::Fixed(speed) if speed <= 0.0 => {
                return Err(Error::Config("animation.speed must be positive".into()));
            }
            crate::animation::SpeedMode::Adaptive { min, max, divisor }
                if min <= 0.0 || max < min || divisor <= 0.0 =>
            {
                return Err(Error::Config(
                    "animation.speed requires 0 < min <= max and a positive divisor".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "repogif".into(),
            header: HeaderConfig::default(),
            browser: BrowserConfig::default(),
            page: None,
            capture: CaptureConfig::default(),
            animation: AnimationSettings::default(),
        }
    }
}

fn default_repo() -> String {
    "repogif".into()
}

fn default_stars() -> String {
    "5.8k".into()
}

fn default_forks() -> String {
    "397".into()
}

fn default_true() -> bool {
    true
}

/// What the rendered repository header displays.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderConfig {
    /// Repository display name.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Star count label (e.g. "5.8k").
    #[serde(default = "default_stars")]
    pub stars: String,

    /// Fork count label.
    #[serde(default = "default_forks")]
    pub forks: String,

    /// Whether the fork section is visible.
    #[serde(default = "default_true")]
    pub show_forks: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            stars: default_stars(),
            forks: default_forks(),
            show_forks: true,
        }
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Viewport size.
    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
        }
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 450,
        }
    }
}

fn default_frames() -> u32 {
    20
}

fn default_interval() -> u64 {
    100
}

fn default_output_dir() -> String {
    "./output".into()
}

fn default_movement_fraction() -> f64 {
    0.6
}

/// How the frame budget is spent.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Total frame budget.
    #[serde(default = "default_frames")]
    pub frames: u32,

    /// Interval between frames in milliseconds.
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Directory frames are written to. Created if absent.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Fraction of the budget spent on cursor movement (proportional mode).
    #[serde(default = "default_movement_fraction")]
    pub movement_fraction: f64,

    /// Budget partition mode.
    #[serde(default)]
    pub mode: PartitionMode,

    /// Append the phase label to frame filenames.
    #[serde(default = "default_true")]
    pub label_frames: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            interval_ms: default_interval(),
            output_dir: default_output_dir(),
            movement_fraction: default_movement_fraction(),
            mode: PartitionMode::default(),
            label_frames: true,
        }
    }
}

/// Frame budget partition mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionMode {
    /// Movement-fraction allocation with a fixed interaction reserve.
    Proportional,
    /// Legacy half-and-half split.
    #[default]
    EqualSplit,
}
