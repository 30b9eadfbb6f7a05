use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use fifty_counter::config::TableConfig;
use fifty_counter::tui::{app::AppState, controller};
use ratatui::prelude::*;
use std::fs::File;
use std::io::{self, IsTerminal, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fifty-counter")]
#[command(about = "Terminal card game: keep the table sum at or under 50", version)]
struct Args {
    /// Players at the table, including you (2-4)
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Seed for shuffles and CPU pacing; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Shortest CPU thinking time in milliseconds
    #[arg(long, default_value_t = 2000)]
    min_delay_ms: u64,

    /// Longest CPU thinking time in milliseconds
    #[arg(long, default_value_t = 4000)]
    max_delay_ms: u64,

    /// Where log output goes (RUST_LOG picks the level, default warn)
    #[arg(long, default_value = "fifty-counter.log")]
    log_file: PathBuf,
}

impl Args {
    fn table_config(&self) -> TableConfig {
        let cfg = TableConfig::default()
            .with_players(self.players)
            .with_delay(self.min_delay_ms, self.max_delay_ms);
        match self.seed {
            Some(seed) => cfg.with_seed(seed),
            None => cfg,
        }
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = args.table_config();
    if let Err(err) = config.validate() {
        eprintln!("fifty-counter: {err}");
        std::process::exit(2);
    }
    if !io::stdout().is_terminal() {
        println!(
            "fifty-counter needs a real terminal (TTY).\nRun it in a terminal and press q to quit. Version: {}",
            fifty_counter::VERSION
        );
        return Ok(());
    }
    init_logging(&args.log_file)?;
    tracing::info!(?config, "starting");

    let mut terminal = setup_terminal()?;
    let tick_rate = Duration::from_millis(100);
    let mut app = AppState::new(config);

    let res = controller::run(&mut terminal, &mut app, tick_rate);

    // Stop the CPU worker before leaving the alternate screen
    drop(app);
    restore_terminal(terminal)?;
    res
}
