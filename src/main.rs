mod app;
mod config;
mod data;
mod fit;
mod plot;
mod ui;
mod watcher;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, error, info};
use ratatui::prelude::*;
use simplelog::{Config, WriteLogger};
use tokio::sync::mpsc;

use app::{App, InitialSelection};
use config::Settings;
use data::Activity;

/// Chart the records of a FIT activity file
#[derive(Parser, Debug)]
#[command(version, about = "Interactive charts for FIT activity files")]
struct Args {
    /// FIT file to open on startup
    file: Option<PathBuf>,

    /// Directory to browse for FIT files (default: $FITCHART_DIR or the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Initial X-axis column, e.g. "Timestamp"
    #[arg(long)]
    x: Option<String>,

    /// Initial Y-axis column (repeat for a second axis)
    #[arg(long)]
    y: Vec<String>,

    /// Plot the second Y column on its own right-hand axis
    #[arg(long)]
    separate_axes: bool,

    /// Smooth with a centered moving average of this many samples (1-100)
    #[arg(long, value_name = "WINDOW")]
    smooth: Option<usize>,

    /// Print the chart description as JSON and exit
    #[arg(long, requires = "file")]
    print_chart: bool,
}

impl Args {
    fn initial_selection(&self) -> InitialSelection {
        InitialSelection {
            x: self.x.clone(),
            ys: self.y.clone(),
            shared_y_axis: !self.separate_axes,
            smooth: self.smooth,
        }
    }
}

enum AppEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    FilesChanged,
    Loaded(Box<Result<Activity, String>>),
    Tick,
}

fn init_logging(settings: &Settings) {
    if let Some(parent) = settings.log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(log_file) = File::create(&settings.log_path) {
        let _ = WriteLogger::init(settings.log_level, Config::default(), log_file);
        info!("fitchart started");
    }
}

/// Decode a file and describe its chart as pretty JSON
fn chart_json(path: &Path, initial: &InitialSelection) -> Result<String> {
    let activity = fit::load_activity(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let columns = activity.frame.available_columns();
    let options = initial.options_for(&columns);

    let (ys, too_many) = plot::limit_y_columns(&options.ys);
    if let Some(warning) = too_many {
        eprintln!("{}", warning);
    }
    let options = plot::PlotOptions { ys, ..options };

    let spec = match plot::build_chart(&activity.frame, &options) {
        Ok(spec) => spec,
        Err(e) => bail!("{} Available columns: {}", e, columns.join(", ")),
    };
    Ok(serde_json::to_string_pretty(&spec)?)
}

/// Print a file's chart without starting the TUI
fn print_chart(path: &Path, initial: &InitialSelection) -> Result<()> {
    println!("{}", chart_json(path, initial)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from current dir or parent dirs)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let settings = Settings::resolve(args.dir.clone());
    init_logging(&settings);
    debug!("Settings: {:?}", settings);

    let initial = args.initial_selection();

    if args.print_chart {
        if let Some(ref path) = args.file {
            return print_chart(path, &initial);
        }
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(settings.dir.clone(), initial);
    app.refresh_files();
    if let Some(path) = args.file {
        app.request_load(path);
    }

    // Set up event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(32);

    // Spawn directory watcher with adapter channel
    let watcher_tx = tx.clone();
    let watch_dir = settings.dir.clone();
    tokio::spawn(async move {
        let (change_tx, mut change_rx) = mpsc::channel::<()>(16);

        let watcher_handle = tokio::spawn(async move {
            if let Err(e) = watcher::watch_dir(watch_dir, change_tx).await {
                error!("Directory watcher error: {}", e);
            }
        });

        // Forward change notifications to main channel
        while change_rx.recv().await.is_some() {
            if watcher_tx.send(AppEvent::FilesChanged).await.is_err() {
                break;
            }
        }

        let _ = watcher_handle.await;
    });

    // Spawn input event handler (keyboard + mouse)
    let input_tx = tx.clone();
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => {
                        if key.kind == KeyEventKind::Press
                            && input_tx.send(AppEvent::Key(key)).await.is_err()
                        {
                            break;
                        }
                    }
                    Ok(Event::Mouse(mouse)) => {
                        if input_tx.send(AppEvent::Mouse(mouse)).await.is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    });

    // Clone tx for decode results before moving to tick generator
    let load_tx = tx.clone();

    // Spawn tick generator for animations
    let tick_tx = tx;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Decode requested files off the event loop
        if let Some(path) = app.take_pending_load() {
            let tx_clone = load_tx.clone();
            tokio::task::spawn_blocking(move || {
                let result = fit::load_activity(&path).map_err(|e| {
                    error!("Failed to load {}: {}", path.display(), e);
                    e.to_string()
                });
                let _ = tx_clone.blocking_send(AppEvent::Loaded(Box::new(result)));
            });
        }

        if let Some(event) = rx.recv().await {
            match event {
                AppEvent::Key(key) => app.handle_key(key),
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
                AppEvent::FilesChanged => {
                    debug!("Directory changed, rescanning");
                    app.refresh_files();
                }
                AppEvent::Loaded(result) => match *result {
                    Ok(activity) => app.on_load_success(activity),
                    Err(e) => app.on_load_error(e),
                },
                AppEvent::Tick => app.tick(),
            }
        }

        if !app.running {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    info!("fitchart exiting");

    // Background tasks (watcher, input, tick) would otherwise keep the process alive
    std::process::exit(0);
}
