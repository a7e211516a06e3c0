use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use nback::{
    app_dirs::{AppDirs, LOG_FILE_NAME},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    App, Control, Engine,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

/// n-back working-memory trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Letters appear one at a time. Press space when the current letter matches the one shown n steps earlier."
)]
pub struct Cli {
    /// how many steps back to compare against (1-9)
    #[clap(short = 'l', long)]
    level: Option<usize>,

    /// number of letters in a run
    #[clap(short = 't', long)]
    max_ticks: Option<u32>,

    /// milliseconds between letters
    #[clap(short = 'i', long)]
    interval_ms: Option<u64>,

    /// letters to draw from, e.g. "AOPF"
    #[clap(short = 'a', long)]
    alphabet: Option<String>,

    /// seed the letter generator for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// config file to read (and write with --save-config)
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the effective settings to the config file before starting
    #[clap(long)]
    save_config: bool,

    /// log filter used when NBACK_LOG is unset
    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Command line values override the loaded config
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(level) = self.level {
            cfg.level = level;
        }
        if let Some(max_ticks) = self.max_ticks {
            cfg.max_ticks = max_ticks;
        }
        if let Some(interval_ms) = self.interval_ms {
            cfg.tick_interval_ms = interval_ms;
        }
        if let Some(alphabet) = &self.alphabet {
            cfg.alphabet = alphabet.clone();
        }
        cfg
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn build_app(cli: &Cli) -> Result<App, Box<dyn Error>> {
    let store = cli.config_store();
    let cfg = cli.apply(store.load());
    let engine = Engine::random(cfg.session_config()?, cfg.alphabet()?, cli.seed)?;
    if cli.save_config {
        store.save(&cfg)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }
    Ok(App::new(engine))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = match AppDirs::log_dir() {
        Some(dir) => match logging::init_file_logging(&dir, LOG_FILE_NAME, &cli.log_level) {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("nback: logging disabled, cannot use {}: {err}", dir.display());
                None
            }
        },
        None => {
            eprintln!("nback: logging disabled, no home or data directory found");
            None
        }
    };

    let mut app = match build_app(&cli) {
        Ok(app) => app,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let redraw = match runner.step() {
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => true,
            AppEvent::Closed => {
                tracing::warn!("terminal input closed, exiting");
                break;
            }
            AppEvent::Key(key) => {
                if app.on_key(key, Instant::now()) == Control::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    tracing::info!(score = app.engine.score(), phase = %app.engine.phase(), "exiting");
    Ok(())
}
