//! redline — side-by-side document comparison viewer with AI review sync.
//!
//! Entry point for the `redline` binary. Wires together the terminal lifecycle
//! (`tui`), the unified event bus (`event`), the UI (`ui`), the theme system
//! (`theme`), page size probing (`surface`) and the review sync controller
//! from `redline-core`.
//!
//! # Startup sequence
//!
//! 1. Parse arguments, load the config and open the log file. The terminal
//!    belongs to the TUI, so tracing writes to `$XDG_STATE_HOME/redline/redline.log`.
//! 2. Load the comparison result. Failures here print to stderr and exit
//!    before the terminal is touched.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Spawn the event task, start review sync and measure the first page.
//!
//! `restore_tui()` runs once after the event loop returns, whatever the exit
//! reason; the panic hook covers panics.

mod app;
mod event;
mod surface;
mod theme;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use redline_core::client::ReviewClient;
use redline_core::config::{self, Config};
use redline_core::review_sync::{ReviewSyncController, ReviewSyncState, SyncListener};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[derive(Debug, Parser)]
#[command(name = "redline", version, about = "Review document differences with AI commentary")]
struct Cli {
    /// Comparison result JSON produced by the diff backend.
    result: PathBuf,

    /// Base URL of the review service.
    #[arg(long, env = "REDLINE_API")]
    api: Option<String>,

    /// Colour theme (`dark` or `catppuccin-mocha`).
    #[arg(long)]
    theme: Option<String>,

    /// Config file to use instead of the XDG default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not poll for AI review results even if the comparison enables them.
    #[arg(long)]
    no_review: bool,
}

/// Installs the global tracing subscriber writing to the log file.
///
/// `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Returns `Err` if the log directory or file cannot be created.
fn init_logging(config: &Config) -> std::io::Result<PathBuf> {
    let path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config::state_dir().join("redline.log"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config_file = cli.config.clone().unwrap_or_else(config::config_path);
    let loaded = config::load(&config_file);
    let config = loaded.as_ref().cloned().unwrap_or_default();
    let log_path = init_logging(&config)?;
    if let Err(e) = &loaded {
        warn!(error = %e, "using default configuration");
    }
    info!(log = %log_path.display(), config = %config_file.display(), "redline starting");

    let comparison = redline_core::load_comparison(&cli.result).map_err(std::io::Error::other)?;
    let theme = theme::Theme::from_name(cli.theme.as_deref().unwrap_or(&config.theme));
    let image_root = cli
        .result
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;

    let mut state = AppState::new(
        comparison,
        config.navigation.into(),
        config.review.max_attempts,
        image_root,
        &tx,
    );

    let base_url = cli.api.as_deref().unwrap_or(&config.api_base_url);
    let listener: SyncListener = {
        let tx = tx.clone();
        Arc::new(move |snapshot: &ReviewSyncState| {
            let _ = tx.send(AppEvent::ReviewUpdate(Box::new(snapshot.clone())));
        })
    };
    let sync = ReviewSyncController::new(
        Arc::new(ReviewClient::new(base_url)),
        config.review.into(),
        Some(listener),
    );
    let enabled = state.comparison.ai_review_enabled && !cli.no_review;
    sync.activate(&state.comparison.comparison_id, enabled);
    measure_pages(&mut state, &tx);

    let result = run(&mut terminal, &mut state, &theme, &sync, handler.rx, &tx, &term_flag).await;

    sync.deactivate();
    tui::restore_tui()?;
    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    info!("redline exiting");
    result
}

/// Starts a size read for every on-screen page whose size is still unknown.
fn measure_pages(state: &mut AppState, tx: &UnboundedSender<AppEvent>) {
    for (variant, page, path) in state.pages_to_measure() {
        surface::spawn_size_read(tx.clone(), variant, page, path);
    }
}

/// The event loop. Returns on quit, SIGTERM, channel close, or a draw error.
async fn run(
    terminal: &mut tui::Tui,
    state: &mut AppState,
    theme: &theme::Theme,
    sync: &ReviewSyncController,
    mut rx: UnboundedReceiver<AppEvent>,
    tx: &UnboundedSender<AppEvent>,
    term_flag: &AtomicBool,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            // Heartbeat: SIGTERM is polled even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else {
                    return Ok(());
                };
                match event {
                    AppEvent::Render => {
                        terminal.draw(|frame| ui::render(frame, state, theme))?;
                    }
                    AppEvent::Key(key) => match handle_key(key, state) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::RetryReviews => {
                            if !sync.retry() {
                                debug!(status = state.review.status.as_str(), "nothing to retry");
                            }
                        }
                        KeyAction::Continue => {}
                    },
                    AppEvent::Mouse(mouse) => handle_mouse(mouse, state),
                    AppEvent::ReviewUpdate(snapshot) => state.apply_review_update(*snapshot),
                    AppEvent::SurfaceLoaded { variant, page, size } => {
                        state.surface_loaded(variant, page, size);
                    }
                    AppEvent::DiffSelected(id) => state.select_diff(&id),
                    // Page changes from input are picked up here, at most 250 ms late.
                    AppEvent::Tick => measure_pages(state, tx),
                    AppEvent::Resize(_, _) => {}
                }
            }
        }
        if term_flag.load(Ordering::Relaxed) {
            info!("SIGTERM received");
            return Ok(());
        }
    }
}
