#![feature(int_roundings)]

mod app;
mod config;
mod data;
mod input;
mod logging;
mod ui;

use std::io;
use std::time::Duration;

use app::App;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use config::{config_path, ensure_dirs, LogLevel, UserConfig};
use data::{project, HttpMeterClient, MeterSource};
use logging::LogMode;
use plugwatch_protocol::Granularity;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Launch the TUI dashboard (default)
    #[command(alias = "tui")]
    Ui,

    /// Output aggregated readings as JSON (suitable for piping)
    #[command(alias = "raw")]
    Pipe {
        /// Number of samples to output (0 = infinite)
        #[arg(short, long, default_value_t = 1)]
        samples: u32,

        /// Seconds between samples
        #[arg(short, long, default_value_t = 30)]
        interval: u64,

        /// Compact JSON output (one line per sample)
        #[arg(short, long)]
        compact: bool,
    },

    /// Show or edit configuration
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },
}

/// Terminal dashboard for smart plug energy aggregates
#[derive(Debug, Parser)]
#[command(name = "plugwatch", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the metering endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Initial granularity (minute, hourly, daily, weekly, monthly, yearly)
    #[arg(short, long, global = true)]
    granularity: Option<String>,

    /// Seconds between automatic refreshes
    #[arg(short, long, global = true)]
    poll_interval: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let mut config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);

    let granularity = cli
        .granularity
        .as_deref()
        .map(|s| {
            s.parse::<Granularity>()
                .map_err(|e| eyre!("invalid --granularity: {e}"))
        })
        .transpose()?;
    config.merge_with_args(cli.endpoint.as_deref(), granularity, cli.poll_interval);

    match cli.command {
        Some(Commands::Pipe {
            samples,
            interval,
            compact,
        }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            run_pipe(&config, samples, interval, compact)
        }
        Some(Commands::Config { path, reset, edit }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            run_config(path, reset, edit)
        }
        Some(Commands::Ui) | None => {
            let _guard = logging::init(config.log_level, LogMode::File, log_level_override);
            run_tui(config)
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_tui(user_config: UserConfig) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_tui_loop(&mut terminal, user_config);
    restore_terminal(&mut terminal)?;
    result
}

fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    user_config: UserConfig,
) -> Result<()> {
    let mut app = App::new(user_config)?;
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = input::handle_key(&app, key);
                    if !app.handle_action(action) {
                        break;
                    }
                }
                _ => {}
            }
        }

        app.tick();
    }

    Ok(())
}

fn run_pipe(config: &UserConfig, samples: u32, interval: u64, compact: bool) -> Result<()> {
    let client = HttpMeterClient::new(&config.endpoint);
    let mut counter = 0u32;

    loop {
        let records = client.fetch(config.granularity)?;
        let projection = project(records, config.granularity);

        let doc = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "endpoint": config.endpoint,
            "projection": projection,
        });

        if compact {
            println!("{}", serde_json::to_string(&doc)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        counter += 1;
        if samples > 0 && counter >= samples {
            break;
        }

        std::thread::sleep(Duration::from_secs(interval.max(1)));
    }

    Ok(())
}

fn run_config(path: bool, reset: bool, edit: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        let config = UserConfig::default();
        config.save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    if edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());

        if !config_file.exists() {
            let config = UserConfig::default();
            config.save()?;
        }

        std::process::Command::new(editor)
            .arg(&config_file)
            .status()?;

        return Ok(());
    }

    let config = UserConfig::load();
    println!("Config file: {}", config_file.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
