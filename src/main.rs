mod metrics;
mod render;
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};

use twin_paradox::{DiagramStyle, RenderMode, Scene, SceneParams, compose};

/// Twin paradox - Minkowski diagrams for a round trip at constant speed
#[derive(Parser, Debug)]
#[command(name = "twin-paradox", about = "Spacetime diagrams of the twin paradox")]
struct Cli {
    /// Log verbosity: -v info, -vv debug, -vvv trace (RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Explore parameters interactively, render on quit
    Tui(SceneArgs),
    /// Render the Earth-frame and traveler-frame diagrams to PNG or SVG
    Render {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(long, value_enum, default_value_t = Mode::Combined)]
        mode: Mode,
        #[arg(short, long, default_value = "twin_paradox.png")]
        output: PathBuf,
    },
    /// Export the traveler's age markers to CSV
    Markers {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(short, long, default_value = "markers.csv")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct SceneArgs {
    /// Distance to the turnaround point (ly)
    #[arg(long, default_value_t = 10.0)]
    distance: f64,
    /// Traveler speed as a fraction of c, strictly between 0 and 1
    #[arg(long, default_value_t = 0.5)]
    speed: f64,
    /// Proper time between age markers (y)
    #[arg(long, default_value_t = 2.0)]
    age_step: f64,
    /// Padding around each diagram
    #[arg(long, default_value_t = 0.5)]
    margin: f64,
}

impl From<&SceneArgs> for SceneParams {
    fn from(args: &SceneArgs) -> Self {
        SceneParams {
            distance: args.distance,
            speed: args.speed,
            age_step: args.age_step,
            margin: args.margin,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// One traveler diagram with both legs
    Combined,
    /// One traveler diagram per leg
    Split,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Combined => RenderMode::Combined,
            Mode::Split => RenderMode::SplitLegs,
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Command-line args: {:?}", cli);

    match cli.command {
        Some(Commands::Tui(args)) => tui::start(SceneParams::from(&args))?,
        Some(Commands::Render {
            scene,
            mode,
            output,
        }) => run_render(&scene, mode.into(), output)?,
        Some(Commands::Markers { scene, output }) => run_markers(&scene, output)?,
        None => tui::start(SceneParams::default())?, // default
    }

    Ok(())
}

fn build(args: &SceneArgs) -> Result<Scene> {
    Scene::new(SceneParams::from(args)).context("building scene")
}

fn run_render(args: &SceneArgs, mode: RenderMode, output: PathBuf) -> Result<()> {
    let scene = build(args)?;
    let diagrams = compose(&scene, mode, &DiagramStyle::default())?;
    info!(
        "traveler ages {:.2} y while Earth ages {:.2} y",
        scene.reunion_age(),
        scene.t_reunion()
    );
    render::render(&diagrams, &output)
}

fn run_markers(args: &SceneArgs, output: PathBuf) -> Result<()> {
    let scene = build(args)?;
    metrics::export_csv(&scene, &output)
}
