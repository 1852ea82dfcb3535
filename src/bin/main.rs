use clap::Parser;
use repogif::{Config, Sequencer, Session};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "repogif")]
#[command(about = "Capture animated repository header frames with headless Chrome")]
#[command(version)]
struct Cli {
    /// Capture config to run (built-in defaults when omitted)
    config: Option<PathBuf>,

    /// Repository display name
    #[arg(short, long)]
    repo: Option<String>,

    /// Star count label (e.g. "5.8k")
    #[arg(short, long)]
    stars: Option<String>,

    /// Fork count label
    #[arg(short, long)]
    forks: Option<String>,

    /// Hide the fork section
    #[arg(long)]
    no_forks: bool,

    /// Output directory for frames
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Total frame budget
    #[arg(long)]
    frames: Option<u32>,

    /// Interval between frames (ms)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Validate config without launching a browser
    #[arg(long)]
    check: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Fold CLI overrides into the loaded config.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref repo) = self.repo {
            config.header.repo = repo.clone();
        }
        if let Some(ref stars) = self.stars {
            config.header.stars = stars.clone();
        }
        if let Some(ref forks) = self.forks {
            config.header.forks = forks.clone();
        }
        if self.no_forks {
            config.header.show_forks = false;
        }
        if let Some(ref output) = self.output {
            config.capture.output_dir = output.to_string_lossy().into_owned();
        }
        if let Some(frames) = self.frames {
            config.capture.frames = frames;
        }
        if let Some(interval) = self.interval {
            config.capture.interval_ms = interval;
        }
        if self.headed {
            config.browser.headless = false;
        }
    }
}

#[tokio::main]
async fn main() -> repogif::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let sequencer = Sequencer::new(&config);

    if cli.check {
        let plan = sequencer.plan();
        println!("Config valid: {}", config.name);
        println!("  Header: {} ({} stars, {} forks)", config.header.repo, config.header.stars, config.header.forks);
        println!(
            "  Frames: {} ({} movement / {} interaction / {} exit)",
            plan.total, plan.movement, plan.interaction, plan.exit
        );
        println!("  Output: {}", config.capture.output_dir);
        return Ok(());
    }

    let url = match config.page {
        Some(ref page) => repogif::template::page_url(std::path::Path::new(page))?,
        None => repogif::template::materialize()?,
    };

    println!("Running: {}", config.name);

    let session = Session::launch(&config.browser, &url).await?;
    let result = sequencer.run(&session).await;
    let closed = session.close().await;
    let report = result?;
    closed?;

    println!();
    println!("✓ Captured {} frames", report.frames.len());
    println!("  Duration: {}ms", report.duration_ms);
    println!("  Output: {}", config.capture.output_dir);
    if !report.reached_button {
        println!("  Note: cursor did not verifiably reach the star button");
    }

    Ok(())
}
