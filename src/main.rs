use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use oled_rows::{DisplayConfig, RowDisplay, StatusBoard, TerminalSink, ToolTemperature};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Preview the printer status display in the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML display configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Length of the simulated print job in seconds
    #[arg(short, long, default_value_t = 10)]
    seconds: u64,

    /// Override the refresh rate (Hz)
    #[arg(short, long)]
    refresh_rate: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Log to stderr so the preview on stdout stays intact
    let level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to set global default subscriber")?;

    let mut config = match &args.config {
        Some(path) => DisplayConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DisplayConfig::default(),
    };
    if let Some(rate) = args.refresh_rate {
        config.refresh_rate = rate;
    }

    execute!(
        io::stdout(),
        terminal::Clear(terminal::ClearType::All),
        cursor::Hide
    )?;

    let display = RowDisplay::open(config, |_| Ok(TerminalSink::new(io::stdout(), 0, 0)))
        .context("Failed to create display")?;
    let board = StatusBoard::new(Arc::new(display));
    board.display().start()?;

    board.initialized();
    run_job(&board, args.seconds);
    board.shutdown();

    execute!(io::stdout(), cursor::Show, cursor::MoveTo(0, 20))?;
    Ok(())
}

/// Feed the board with a fake print job.
#[allow(clippy::cast_precision_loss)]
fn run_job(board: &StatusBoard, seconds: u64) {
    let steps = seconds.max(1) * 4;
    board.printer_state("Printing", false);
    board.gcode_sent("M117 Preview job running");

    for step in 0..=steps {
        let done = step as f64 / steps as f64;
        board.temperatures(&[
            ToolTemperature::new("bed", 20.0 + 40.0 * done.min(0.5) * 2.0, 60.0),
            ToolTemperature::new("tool0", 20.0 + 190.0 * done.min(0.5) * 2.0, 210.0),
        ]);
        board.progress(Some(done * 100.0), Some((steps - step) * 900));
        thread::sleep(Duration::from_millis(250));
    }

    board.printer_state("Operational", false);
    board.progress(None, None);
}
