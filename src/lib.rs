//! # repogif
//!
//! Captures a numbered frame sequence of an animated GitHub-style
//! repository header: a cursor moves to the Star button, clicks it, and
//! moves away. Frames are PNG files named for later GIF assembly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repogif::{Config, Sequencer, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> repogif::Result<()> {
//! let config = Config::load("capture.yaml")?;
//! let url = repogif::template::materialize()?;
//! let session = Session::launch(&config.browser, &url).await?;
//! let report = Sequencer::new(&config).run(&session).await?;
//! session.close().await?;
//! println!("captured {} frames", report.frames.len());
//! # Ok(())
//! # }
//! ```

pub mod animation;
mod browser;
mod capture;
mod config;
pub mod template;

pub use animation::{AnimationSettings, Position, SpeedMode};
pub use browser::{CaptureTarget, Session};
pub use capture::{CaptureReport, FramePlan, Phase, Sequencer};
pub use config::{BrowserConfig, CaptureConfig, Config, HeaderConfig, PartitionMode, Viewport};

/// Result type for repogif operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or capture.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("evaluate result error: {0}")]
    Evaluate(#[from] serde_json::Error),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
name: "Test"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.header.repo, "repogif");
        assert_eq!(config.header.stars, "5.8k");
        assert!(config.header.show_forks);
        assert!(config.browser.headless);
        assert_eq!(config.capture.frames, 20);
        assert_eq!(config.capture.mode, PartitionMode::EqualSplit);
    }

    #[test]
    fn test_parse_header_config() {
        let yaml = r#"
name: "Test"
header:
  repo: "my-project"
  stars: "1.2k"
  forks: "88"
  show_forks: false
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.header.repo, "my-project");
        assert_eq!(config.header.stars, "1.2k");
        assert_eq!(config.header.forks, "88");
        assert!(!config.header.show_forks);
    }

    #[test]
    fn test_parse_browser_config() {
        let yaml = r#"
name: "Test"
browser:
  headless: false
  viewport:
    width: 1600
    height: 600
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.viewport.width, 1600);
        assert_eq!(config.browser.viewport.height, 600);
    }

    #[test]
    fn test_parse_capture_config() {
        let yaml = r#"
name: "Test"
capture:
  frames: 46
  interval_ms: 120
  output_dir: "./frames"
  movement_fraction: 0.6
  mode: proportional
  label_frames: false
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.capture.frames, 46);
        assert_eq!(config.capture.interval_ms, 120);
        assert_eq!(config.capture.output_dir, "./frames");
        assert_eq!(config.capture.mode, PartitionMode::Proportional);
        assert!(!config.capture.label_frames);
    }

    #[test]
    fn test_parse_fixed_speed() {
        let yaml = r#"
name: "Test"
animation:
  speed: 12.5
  snap_threshold: 2.0
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.animation.speed, SpeedMode::Fixed(12.5));
        assert_eq!(config.animation.snap_threshold, 2.0);
    }

    #[test]
    fn test_parse_adaptive_speed() {
        let yaml = r#"
name: "Test"
animation:
  speed:
    min: 2.0
    max: 25.0
    divisor: 8.0
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(
            config.animation.speed,
            SpeedMode::Adaptive {
                min: 2.0,
                max: 25.0,
                divisor: 8.0
            }
        );
    }

    #[test]
    fn test_animation_delay_defaults() {
        let config = Config::parse("name: \"Test\"").unwrap();
        assert_eq!(config.animation.initial_delay_ms, 500);
        assert_eq!(config.animation.hover_delay_ms, 500);
        assert_eq!(config.animation.settle_delay_ms, 200);
        assert_eq!(config.animation.reach_timeout_ms, 5000);
    }

    #[test]
    fn test_validation_empty_name() {
        let result = Config::parse("name: \"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_too_few_frames() {
        let yaml = r#"
name: "Test"
capture:
  frames: 3
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least 5"));
    }

    #[test]
    fn test_validation_movement_fraction_bounds() {
        for fraction in ["0.0", "1.0", "1.5"] {
            let yaml = format!(
                "name: \"Test\"\ncapture:\n  movement_fraction: {}\n",
                fraction
            );
            assert!(Config::parse(&yaml).is_err(), "fraction {}", fraction);
        }
    }

    #[test]
    fn test_validation_negative_speed() {
        let yaml = r#"
name: "Test"
animation:
  speed: -1.0
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_validation_bad_adaptive_speed() {
        let yaml = r#"
name: "Test"
animation:
  speed:
    min: 10.0
    max: 2.0
    divisor: 8.0
"#;
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_load_example_config() {
        let config = Config::load("configs/example.yaml").unwrap();
        assert_eq!(config.name, "Example Capture");
        assert_eq!(config.capture.mode, PartitionMode::Proportional);
        assert_eq!(config.capture.frames, 46);
    }
}
