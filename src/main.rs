use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::DisableMouseCapture,
    execute,
    style::ResetColor,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use tuirealm::{
    PollStrategy, Update,
    listener::EventListenerCfg,
    terminal::{CrosstermTerminalAdapter, TerminalBridge},
};

use teamboard::{
    app::polling::spawn_board_poller,
    auth::Session,
    cli::{self, RootCommand},
    db::Database,
    events::ChangeBus,
    keybindings::{KeybindingDispatcher, default_config, user_config_path},
    logging::{init_logging, print_log_location},
    settings::Settings,
    theme::ThemePreset,
    ui_realm::{Model, TuiApplication},
};

#[derive(Parser, Debug)]
#[command(
    name = "teamboard",
    about = "Terminal kanban board with team messaging",
    long_about = "A TUI kanban board for small teams: drag tasks across columns, \
                  sort them in a table view, and chat with teammates without leaving \
                  the terminal.",
    version = env!("TEAMBOARD_BUILD_VERSION"),
)]
struct Cli {
    /// Path to the board database. Overrides the settings file.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Theme preset to use for this run (dark, light, high-contrast).
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Emit machine-readable JSON on stdout (headless commands only).
    #[arg(long, global = true)]
    json: bool,

    /// Suppress informational output.
    #[arg(long)]
    quiet: bool,

    /// Log level filter override (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

enum RunOutcome {
    Continue,
    Exit(i32),
}

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_path = match init_logging(cli.log_level.as_deref()) {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: failed to initialise logging: {err}");
            None
        }
    };
    install_panic_hook(log_path.clone());

    match run_app(cli).await {
        Ok(RunOutcome::Continue) => {}
        Ok(RunOutcome::Exit(code)) => std::process::exit(code),
        Err(err) => {
            restore_terminal();
            eprintln!("error: {err:#}");
            if let Some(path) = log_path {
                print_log_location(&path);
            }
            std::process::exit(1);
        }
    }
}

async fn run_app(cli: Cli) -> Result<RunOutcome> {
    let mut settings = Settings::load();
    if let Some(theme) = cli.theme.as_deref() {
        if ThemePreset::from_str(theme).is_ok() {
            settings.theme = theme.to_string();
        } else {
            eprintln!("warning: unknown theme '{theme}', keeping '{}'", settings.theme);
        }
    }

    let db_path = resolve_db_path(cli.db.as_ref(), &settings)?;

    if let Some(command) = cli.command {
        let code = cli::run(&db_path, command, cli.json, cli.quiet);
        return Ok(RunOutcome::Exit(code));
    }

    let db = Database::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let Some(session) = Session::load() else {
        eprintln!("error[NOT_LOGGED_IN]: no active session; run 'teamboard auth login'");
        return Ok(RunOutcome::Exit(2));
    };
    let Some(user) = session.validate(&db)? else {
        eprintln!("error[SESSION_INVALID]: session user is missing or inactive; run 'teamboard auth login'");
        return Ok(RunOutcome::Exit(2));
    };
    tracing::info!(email = %user.email, "session validated");

    let keybindings = load_dispatcher();
    let bus = ChangeBus::default();
    let mut model = Model::new(db, bus, user, settings)?;

    let stop = Arc::new(AtomicBool::new(false));
    let (tick_tx, tick_rx) = tokio::sync::mpsc::unbounded_channel();
    let poller = spawn_board_poller(stop.clone(), model.settings.poll_interval_ms, tick_tx);
    model.attach_poller(tick_rx);

    let _guard = TerminalGuard;
    let mut terminal = setup_terminal()?;

    let listener = EventListenerCfg::default()
        .crossterm_input_listener(Duration::from_millis(20), 3)
        .poll_timeout(Duration::from_millis(10))
        .tick_interval(Duration::from_millis(500));
    let mut app = TuiApplication::with_listener(listener, keybindings);
    app.wire_components(&model)?;
    app.sync_focus(&model)?;

    let mut redraw = true;
    while !model.should_quit() {
        if redraw {
            terminal
                .draw(|frame| app.render(&model, frame))
                .context("drawing frame")?;
            redraw = false;
        }

        match app.tick(PollStrategy::Once) {
            Ok(messages) => {
                for msg in messages {
                    if app.handle_resize(&model, &msg)? {
                        redraw = true;
                        continue;
                    }
                    let mut next = Some(msg);
                    while next.is_some() {
                        next = model.update(next);
                    }
                }
            }
            Err(err) => {
                tracing::error!(%err, "event poll failed");
            }
        }

        if model.take_dirty() {
            app.wire_components(&model)?;
            app.sync_focus(&model)?;
            redraw = true;
        }
    }

    stop.store(true, Ordering::SeqCst);
    poller.abort();

    disable_raw_mode().ok();
    execute!(
        std::io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show,
        ResetColor
    )
    .ok();
    TERMINAL_RESTORED.store(true, Ordering::SeqCst);

    Ok(RunOutcome::Continue)
}

/// CLI flag wins over settings, which win over the platform data dir.
fn resolve_db_path(flag: Option<&PathBuf>, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.clone());
    }
    if let Some(path) = &settings.db_path {
        return Ok(path.clone());
    }
    let mut dir = dirs::data_dir().context("could not determine the platform data directory")?;
    dir.push("teamboard");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    dir.push("teamboard.db");
    Ok(dir)
}

fn load_dispatcher() -> KeybindingDispatcher {
    if let Some(path) = user_config_path() {
        if path.exists() {
            match KeybindingDispatcher::load(&path) {
                Ok(dispatcher) => return dispatcher,
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "keybinding config rejected, using defaults");
                }
            }
        }
    }
    KeybindingDispatcher::from_config(default_config())
}

fn setup_terminal() -> Result<TerminalBridge<CrosstermTerminalAdapter>> {
    let mut terminal = TerminalBridge::new_crossterm().context("initialising terminal")?;
    terminal
        .enable_raw_mode()
        .context("enabling raw terminal mode")?;
    terminal
        .enter_alternate_screen()
        .context("entering alternate screen")?;
    terminal.clear_screen().context("clearing screen")?;
    Ok(terminal)
}

fn install_panic_hook(log_path: Option<PathBuf>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        eprintln!("teamboard crashed: {info}");
        if let Some(path) = &log_path {
            eprintln!("log file: {}", path.display());
        }
        default_hook(info);
    }));
}

/// Best-effort terminal restore that is safe to call from a panic hook.
fn restore_terminal() {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return;
    }
    disable_raw_mode().ok();
    execute!(
        std::io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show,
        ResetColor
    )
    .ok();
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}
