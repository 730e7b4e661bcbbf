//! rollwatch - terminal console for roll-to-roll print monitoring.
//!
//! Renders a scrolling virtual roll with simulated defect overlays, panels
//! for triaging defects and auxiliary dashboards. All defect data is
//! synthesized by a clock-driven simulation; nothing talks to real hardware.

mod app;
mod config;
mod models;
mod rail;
mod roll;
mod sim;
mod theme;
mod ui;
mod viewport;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use app::App;
use config::AppConfig;
use sim::{SimCommand, SimMessage};

/// Frame rate for animations (approximately 30 FPS)
const FRAME_DURATION: Duration = Duration::from_millis(33);
/// Period of the roll simulation clock
const TICK_PERIOD: Duration = Duration::from_millis(3000);

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    // Optional config file path as the first argument
    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    run_tui(&config).await
}

/// Run the TUI application
async fn run_tui(config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create communication channels
    let (sim_tx, mut sim_rx) = mpsc::channel::<SimMessage>(8);
    let (cmd_tx, cmd_rx) = mpsc::channel::<SimCommand>(8);

    // Spawn the simulation clock worker
    let clock_task = tokio::spawn(run_clock_worker(sim_tx, cmd_rx, TICK_PERIOD));

    // Create application state and arm the clock to the initial job state
    let mut app = App::new(config)?;
    cmd_tx
        .send(SimCommand::SetRunning(app.job.is_advancing()))
        .await
        .ok();

    // Main event loop
    let result = run_event_loop(&mut terminal, &mut app, &mut sim_rx, &cmd_tx).await;

    // Cleanup
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    // No pending timer may outlive the UI
    clock_task.abort();

    result
}

/// Run the simulation clock worker.
///
/// One-shot sleep, emit a tick, re-arm. While the press is paused or stopped
/// no timer is armed at all, so no stray tick can mutate state after a
/// pause, stop or teardown.
async fn run_clock_worker(
    tx: mpsc::Sender<SimMessage>,
    mut rx: mpsc::Receiver<SimCommand>,
    period: Duration,
) {
    let mut running = false;
    loop {
        if running {
            tokio::select! {
                _ = tokio::time::sleep(period) => {
                    if tx.send(SimMessage::Tick).await.is_err() {
                        break;
                    }
                }
                cmd = rx.recv() => match cmd {
                    Some(SimCommand::SetRunning(value)) => running = value,
                    Some(SimCommand::Shutdown) | None => break,
                },
            }
        } else {
            match rx.recv().await {
                Some(SimCommand::SetRunning(value)) => running = value,
                Some(SimCommand::Shutdown) | None => break,
            }
        }
    }
}

/// Run the main event loop
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    sim_rx: &mut mpsc::Receiver<SimMessage>,
    cmd_tx: &mpsc::Sender<SimCommand>,
) -> Result<()> {
    loop {
        // Update animations and derived view state
        let size = terminal.size()?;
        app.tick(size.width, size.height);

        // Render the UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Drain clock ticks (non-blocking)
        while let Ok(SimMessage::Tick) = sim_rx.try_recv() {
            app.handle_sim_tick();
        }

        // Handle input events with timeout for animation
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = app.handle_key(key) {
                        cmd_tx.send(cmd).await.ok();
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
