//! Passbook - a terminal password manager
//!
//! Built with Ratatui and crossterm.

mod app;
mod config;
mod handlers;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use passbook_core::{CredentialStore, FileStore, KeyValueStore, NAMESPACE_KEY};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use app::{App, AppState};

/// Passbook - a terminal password manager
#[derive(Parser, Debug)]
#[command(name = "passbook")]
#[command(about = "A terminal password manager")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the stored credentials (overrides config)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("passbook=info".parse()?)
                .add_directive("passbook_core=info".parse()?),
        )
        .with_writer(std::io::stderr) // Write logs to stderr to not interfere with TUI
        .init();

    let args = Args::parse();

    let mut config = config::Config::load(args.config)?;
    if let Some(data_dir) = args.data_dir {
        tracing::info!("Overriding data directory from CLI: {}", data_dir.display());
        config.data_dir = data_dir;
    }

    let storage = FileStore::new(&config.data_dir);
    let storage_label = storage
        .path_for(NAMESPACE_KEY)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| config.data_dir.display().to_string());
    tracing::info!("Starting Passbook with store: {}", storage_label);

    let store = CredentialStore::open(Box::new(storage) as Box<dyn KeyValueStore>)
        .context("Failed to open credential store")?;
    let mut app = App::new(store, storage_label, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    if app.store.is_dirty() {
        eprintln!("Warning: the last change could not be saved");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.expire_toasts(Instant::now());
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll with a timeout so toasts expire without input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }

        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
