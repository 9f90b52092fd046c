use std::io::Stdout;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod discovery;
mod engine;
mod remote;

use app::App;
use config::Config;
use engine::{FileBufferStore, ProcessRunner, Session};
use remote::{ListService, OfflineListService, TcpListService};

const LOG_ENV: &str = "OAK_LOG";
const LOG_FILE: &str = "oak.log";

fn main() -> Result<()> {
    let config = match Config::parse() {
        Ok(config) => config,
        Err(err) => exit_with_config_error(&err),
    };
    let engine = match discovery::discover_engine(config.engine.as_deref()) {
        Ok(path) => path,
        Err(err) => exit_with_config_error(&err),
    };

    std::fs::create_dir_all(&config.buffer_dir)
        .with_context(|| format!("create buffer dir {}", config.buffer_dir.display()))?;
    init_logging(&config.buffer_dir)?;
    tracing::info!(engine = %engine.display(), server = %config.server, "starting oak");

    let store = FileBufferStore::create(&config.buffer_dir).context("prepare buffers")?;
    let runner = ProcessRunner::new(engine, config.engine_timeout);
    let session = Session::new(Box::new(store), Box::new(runner));
    let service: Box<dyn ListService> = if config.offline {
        Box::new(OfflineListService)
    } else {
        Box::new(TcpListService::new(
            config.server.clone(),
            config.connect_timeout,
            config.io_timeout,
        ))
    };
    let app = App::new(session, service, &config);

    let mut terminal = setup_terminal()?;
    let result = app::run_app(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    result
}

fn exit_with_config_error(err: &config::ConfigError) -> ! {
    eprintln!("oak: {err}");
    std::process::exit(2);
}

fn init_logging(dir: &Path) -> Result<()> {
    let log_file = std::fs::File::create(dir.join(LOG_FILE)).context("create log file")?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen)
        .context("enter alternate screen")?;

    if matches!(supports_keyboard_enhancement(), Ok(true)) {
        crossterm::execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .ok();
    }
    crossterm::execute!(std::io::stdout(), EnableBracketedPaste).ok();

    let terminal =
        Terminal::new(CrosstermBackend::new(std::io::stdout())).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    crossterm::execute!(std::io::stdout(), DisableBracketedPaste).ok();
    crossterm::execute!(std::io::stdout(), PopKeyboardEnhancementFlags).ok();
    disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}
