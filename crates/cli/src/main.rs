//! `seqcut`: applies a scripted list of strip edits to a sequence timeline
//! and renders the result with FFmpeg.
//!
//! ```bash
//! seqcut new project_config.json
//! seqcut plan project_config.json
//! seqcut run project_config.json --output renders/
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sequencer::{Engine, Event, Fps, ProjectConfig, RunReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seqcut")]
#[command(about = "Apply scripted strip edits to a video timeline and render it")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load media, apply the operation list and render once
    Run(RunArgs),
    /// Apply the operation list and print the timeline as JSON without rendering
    Plan {
        /// Project configuration file
        config: PathBuf,
    },
    /// Write an example project configuration
    New {
        /// Where to write the configuration
        config: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Project configuration file
    config: PathBuf,

    /// Override the project frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Override the render output (file ending in .mp4, or a directory)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Apply operations but skip rendering
    #[arg(long)]
    no_render: bool,

    /// Write the final timeline as JSON
    #[arg(long, value_name = "PATH")]
    dump_timeline: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Plan { config } => plan(&config),
        Commands::New { config, force } => new_project(&config, force),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(fps) = args.fps {
        config.fps = Fps::new(fps).context("invalid --fps")?;
    }
    if let Some(output) = &args.output {
        config.output_path = std::path::absolute(output)
            .with_context(|| format!("failed to resolve output path {}", output.display()))?;
    }

    let mut engine = Engine::with_ffmpeg(config.fps);
    let outcome = if args.no_render {
        engine.load_project(&config)
    } else {
        engine.run(&config)
    };
    let report = outcome.with_context(|| format!("project {} failed", args.config.display()))?;

    if let Some(path) = &args.dump_timeline {
        let json = serde_json::to_vec_pretty(engine.timeline())
            .context("failed to serialize timeline")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write timeline to {}", path.display()))?;
        info!(path = %path.display(), "timeline written");
    }

    print_report(&report);
    Ok(())
}

fn plan(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let mut engine = Engine::with_ffmpeg(config.fps);
    let report = engine
        .load_project(&config)
        .with_context(|| format!("project {} failed", config_path.display()))?;

    let json =
        serde_json::to_string_pretty(engine.timeline()).context("failed to serialize timeline")?;
    println!("{json}");
    info!(
        applied = report.applied,
        skipped = report.skipped,
        strips = engine.timeline().len(),
        "plan finished"
    );
    Ok(())
}

fn new_project(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite",
            config_path.display()
        );
    }
    ProjectConfig::example()
        .save(config_path)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    println!("wrote example project to {}", config_path.display());
    Ok(())
}

fn load_config(path: &Path) -> Result<ProjectConfig> {
    ProjectConfig::load(path).with_context(|| format!("failed to load project {}", path.display()))
}

fn print_report(report: &RunReport) {
    for event in &report.events {
        match event {
            Event::OperationSkipped {
                index,
                operation,
                error,
            } => println!("skipped operation #{index} ({operation}): {}", error.message),
            Event::OperationIgnored { index } => {
                println!("ignored operation #{index}: unknown type")
            }
            _ => {}
        }
    }
    println!(
        "{} operation(s) applied, {} skipped",
        report.applied, report.skipped
    );
    match &report.output {
        Some(path) => println!("rendered {}", path.display()),
        None => println!("render skipped"),
    }
}
