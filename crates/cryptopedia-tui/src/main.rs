//! Cryptopedia - terminal front end for the Cryptopedia market intelligence API.
//!
//! Sign in or request access, then watch the ticker banner, RVOL heatmap and
//! market alerts. Run with `--logout` to clear stored tokens and exit.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cryptopedia_core::api::ApiClient;
use cryptopedia_core::auth::{SessionProvider, TokenStore};
use cryptopedia_core::config::Config;
use cryptopedia_core::navigation::{Route, RouteState};
use cryptopedia_core::notify::NotificationQueue;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::{render, render_initializing};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the cache directory
const LOG_FILE: &str = "cryptopedia.log";

/// Initialize the tracing subscriber, writing to a log file so output
/// never lands on the terminal.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {:#}", e);
            Config::default()
        }
    };

    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
    let _log_guard = match init_tracing(&log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--logout" {
        return logout(&config);
    }

    info!("Cryptopedia starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
    }

    info!("Cryptopedia shutting down");
    Ok(())
}

/// Clear stored tokens without starting the UI.
fn logout(config: &Config) -> Result<()> {
    let store = config.token_store().context("Failed to open token storage")?;
    store.clear();
    println!("Logged out.");
    Ok(())
}

/// Hydrate the session behind a placeholder, then hand over to the main loop.
async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: Config) -> Result<()> {
    terminal.draw(render_initializing)?;

    let routes = RouteState::new(Route::Dashboard);
    let notifications = NotificationQueue::new();

    let store = match config.token_store() {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Token storage unavailable, session will not persist");
            TokenStore::in_memory()
        }
    };
    let mut provider = SessionProvider::new(store, Arc::new(routes.clone()));
    let session = provider.hydrate();

    let api_url = config.api_url();
    info!(api_url = %api_url, "Using API endpoint");
    let api = ApiClient::new(&api_url, session, Arc::new(notifications.clone()))
        .context("Failed to create API client")?;

    let mut app = App::new(config, api, routes, notifications);
    app.start();

    run_app(terminal, &mut app).await
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input (press only; some terminals also report releases)
                if key.kind == KeyEventKind::Press && handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.tick();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
