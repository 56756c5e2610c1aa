//! PantryChef - a terminal client for the recipe recommendation service.
//!
//! This application provides a fast, keyboard-driven interface for turning
//! the contents of your pantry into recipe suggestions: generate matches,
//! browse the catalog, keep favorites and rate what you cooked.

mod api;
mod app;
mod auth;
mod cache;
mod config;
mod models;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return login_cli().await;
    }

    // Initialize logging
    init_tracing();
    info!("PantryChef starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new().await?;

    // Load cached data first (for display behind login)
    app.load_from_cache();

    // Check if we need to login
    if !app.is_authenticated() {
        app.start_login();
    } else if app.is_cache_stale() {
        // Refresh in the background if the cache has gone stale
        app.refresh_all_background();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("PantryChef shutting down");
    Ok(())
}

/// Log in from the terminal and store the session, without entering the
/// TUI. Useful for scripted setups and headless boxes.
async fn login_cli() -> Result<()> {
    println!("\n=== PantryChef Login ===\n");

    let mut config = config::Config::load()?;

    let email = {
        let default = config.last_email.clone().unwrap_or_default();
        if default.is_empty() {
            print!("Email: ");
        } else {
            print!("Email [{}]: ", default);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            default
        } else {
            input.to_string()
        }
    };

    if email.is_empty() {
        return Err(anyhow::anyhow!("An email address is required"));
    }

    let password = if auth::CredentialStore::has_credentials(&email) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            auth::CredentialStore::get_password(&email)?
        } else {
            rpassword::prompt_password("Password: ")?
        }
    } else {
        rpassword::prompt_password("Password: ")?
    };

    println!("\nAuthenticating...");

    let api = api::ApiClient::new(config.server_url())?;
    let session_data = api.login(&email, &password).await?;

    if let Err(e) = auth::CredentialStore::store(&email, &password) {
        eprintln!("Warning: could not store password in keychain: {}", e);
    }

    config.last_email = Some(email);
    config.save()?;

    let mut session = auth::Session::new(config.cache_dir()?);
    session.update(session_data);
    session.save()?;

    println!("Login successful!\n");
    Ok(())
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

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Expire the status message and run a deferred logout if due
        app.tick();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
