//! Brickfall — catch the falling brick with the floating one, in the terminal.

mod app;
mod game;
mod game_loop;
mod grid;
mod input;
mod platform;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use game_loop::{GameError, SessionSummary};
use std::path::Path;
use std::process::ExitCode;
use theme::Theme;

/// Options derived from CLI that shape one session (grid, lives, speed, pacing).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub columns: u16,
    pub rows: u16,
    pub max_lives: u32,
    /// Row advances per second at session start.
    pub initial_speed: u32,
    pub fps: u32,
    /// Rows kept free around the grid (columns get twice as many).
    pub padding: u16,
    pub x_interspace: u16,
    pub y_interspace: u16,
    pub seed: Option<u64>,
    pub animation: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 10,
            max_lives: 5,
            initial_speed: 2,
            fps: 30,
            padding: 2,
            x_interspace: 1,
            y_interspace: 0,
            seed: None,
            animation: true,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let theme = Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        log::warn!("ignoring theme file: {err}");
        let mut theme = Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let config = GameConfig {
        columns: args.cols,
        rows: args.rows,
        max_lives: args.lives,
        initial_speed: args.speed,
        fps: args.fps,
        padding: args.padding,
        x_interspace: args.x_spacing,
        y_interspace: args.y_spacing,
        seed: args.seed,
        animation: !args.no_animation,
    };

    let mut app = App::new(config, theme);
    exit_status(app.run())
}

/// Init failures are a diagnostic and a failure code; anything else is a terminal error with context.
fn exit_status(result: Result<SessionSummary, GameError>) -> Result<ExitCode> {
    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err @ GameError::Init(_)) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err).context("terminal session failed"),
    }
}

/// Logs go to `--log-file` only; the terminal belongs to the game.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Falling-brick catcher in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "brickfall",
    version,
    about = "Catch the falling red brick with your blue one before it hits the floor.",
    long_about = "Brickfall is a tiny arcade catcher. A brick drops down a fixed grid; steer the \
        floating brick under it. Every catch scores a point and speeds the drop up. Every miss \
        costs a life; losing the last one refills your lives but takes a point off your score.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move    Esc / q / Ctrl-C  Quit"
)]
pub struct Args {
    /// Grid width in cells.
    #[arg(long, default_value = "10", value_name = "COLS", value_parser = clap::value_parser!(u16).range(2..=64))]
    pub cols: u16,

    /// Grid height in cells. The floating brick sits on the second-to-last row.
    #[arg(long, default_value = "10", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(2..=64))]
    pub rows: u16,

    /// Lives per round; losing them all refills them at the cost of one point.
    #[arg(long, default_value = "5", value_name = "N", value_parser = clap::value_parser!(u32).range(1..=99))]
    pub lives: u32,

    /// Starting drop speed in rows per second. Each catch adds one.
    #[arg(long, default_value = "2", value_name = "RATE", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub speed: u32,

    /// Target render frames per second.
    #[arg(long, default_value = "30", value_name = "RATE", value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Empty rows kept around the grid (twice as many columns).
    #[arg(long, default_value = "2", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(1..=20))]
    pub padding: u16,

    /// Blank columns between neighbouring cells.
    #[arg(long, default_value = "1", value_name = "N", value_parser = clap::value_parser!(u16).range(0..=8))]
    pub x_spacing: u16,

    /// Blank rows between neighbouring cells.
    #[arg(long, default_value = "0", value_name = "N", value_parser = clap::value_parser!(u16).range(0..=8))]
    pub y_spacing: u16,

    /// Seed for spawn columns (random if not set).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette for the two bricks: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the catch/miss flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs here (filter with RUST_LOG). Logging is off otherwise.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
