use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::{self, File};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod command;
mod config;
mod dispatcher;
mod error;
mod models;
mod probe;
mod prompt;
mod render;
mod ssh_service;
mod store;

use app::App;
use command::SystemEnvironment;
use config::{AppConfig, ConfigManager};
use prompt::StdinPrompter;
use render::Renderer;
use ssh_service::ShellLauncher;
use store::AliasStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Manage and connect to SSH/Mosh aliases.
#[derive(Debug, Parser)]
#[command(name = "ssha", version, disable_help_flag = true)]
struct Cli {
    /// Alias to connect to directly, skipping the prompt
    alias: Option<String>,

    /// Print the command reference and exit
    #[arg(short, long)]
    help: bool,
}

fn main() -> Result<()> {
    if !cfg!(unix) {
        println!(
            "{}",
            Renderer::new(true).error("Sorry, this program only supports Linux at this time...")
        );
        return Ok(());
    }

    let program = std::env::args()
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let Some(cli) = parse_cli(std::env::args_os()) else {
        return Ok(());
    };

    // Usage must print even when the config directory is unusable
    if cli.help {
        print!("{}", Renderer::new(true).usage(&program));
        return Ok(());
    }

    if let Err(err) = run(cli, &program) {
        eprintln!("Error: {:#}", err);
    }

    Ok(())
}

/// Parses arguments, printing clap's message (error, `--version`) itself.
/// `None` means there is nothing left to run; the exit status stays 0.
fn parse_cli<I, T>(args: I) -> Option<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Some(cli),
        Err(err) => {
            if let Err(e) = err.print() {
                eprintln!("Error: {}", e);
            }
            None
        }
    }
}

fn run(cli: Cli, program: &str) -> Result<()> {
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load_config()?;
    init_logging(&config_manager, &config)?;

    let renderer = Renderer::new(config.color);

    debug!(
        "Starting with config {:?} from {:?}",
        config,
        config_manager.config_dir()
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let session_active = Arc::new(AtomicBool::new(false));
    runtime.spawn(watch_interrupt(session_active.clone(), renderer));

    let store = AliasStore::open_with_legacy(
        config_manager.store_path(&config),
        config.legacy_store_path().as_deref(),
    )?;
    debug!("Using alias store {:?}", store.path());

    let mut app = App::new(
        store,
        renderer,
        Box::new(SystemEnvironment),
        Box::new(StdinPrompter),
        Box::new(ShellLauncher::new(session_active)),
        runtime.handle().clone(),
        config.probe_timeout(),
        program.to_string(),
        io::stdout(),
    );

    match cli.alias {
        Some(alias) => app.quick_connect(&alias),
        None => app.run_interactive(VERSION)?,
    }

    Ok(())
}

fn init_logging(config_manager: &ConfigManager, config: &AppConfig) -> Result<()> {
    let log_dir = config_manager.log_dir();
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!(
        "ssha_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file).context("Failed to create log file")?;

    let directive = format!("ssha={}", config.log_level);
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    debug!("Logging to {:?}", log_file);
    Ok(())
}

/// Exits cleanly on Ctrl-C, except while a session child owns the terminal.
async fn watch_interrupt(session_active: Arc<AtomicBool>, renderer: Renderer) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Unable to listen for interrupts: {}", e);
            return;
        }

        if session_active.load(Ordering::SeqCst) {
            debug!("Interrupt forwarded to the running session");
            continue;
        }

        tracing::info!("Interrupted, exiting");
        println!("\n{}", renderer.farewell());
        std::process::exit(0);
    }
}
