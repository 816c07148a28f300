//! Study Planner - CLI entry point
//!
//! Launches the widget, the development host, or prints the configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use studyplanner::cli::{Cli, Command, get_log_path};
use studyplanner::config::Config;
use studyplanner::host::{self, DevHostConfig, HostActivity, HostConnection, listener, socket};
use studyplanner::planner::{PlannerManager, SaveMode};
use studyplanner::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't up yet, so nothing here can log
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run { host_socket, save_mode }) => cmd_run(&config, host_socket, save_mode).await,
        Some(Command::Host {
            socket,
            email,
            data,
            reject_saves,
        }) => {
            let dev_config = DevHostConfig {
                email,
                data_file: data,
                reject_saves,
            };
            cmd_host(socket, dev_config).await
        }
        Some(Command::Config) => cmd_config(&config),
        None => {
            debug!("main: no command specified, launching widget");
            cmd_run(&config, None, None).await
        }
    }
}

/// Launch the widget, embedded if a host socket is known
async fn cmd_run(config: &Config, host_socket: Option<PathBuf>, save_mode: Option<SaveMode>) -> Result<()> {
    debug!(?host_socket, ?save_mode, "cmd_run: called");
    let mut settings = config.planner_settings()?;
    if let Some(mode) = save_mode {
        settings.save_mode = mode;
    }

    let connection = match host_socket.or_else(|| config.host.socket.clone()) {
        Some(path) => {
            let timeout = Duration::from_millis(config.host.connect_timeout_ms);
            socket::connect(&path, timeout)
                .await
                .context(format!("Failed to connect to host at {}", path.display()))?
        }
        None => {
            info!("No host socket configured, running standalone");
            HostConnection::standalone()
        }
    };

    let manager = PlannerManager::spawn(settings, connection);
    tui::run(manager).await
}

/// Run the development host until Ctrl+C
async fn cmd_host(socket_path: Option<PathBuf>, dev_config: DevHostConfig) -> Result<()> {
    debug!(?socket_path, ?dev_config, "cmd_host: called");
    let socket_path = socket_path.unwrap_or_else(host::default_socket_path);
    let listener = listener::create_listener_at(&socket_path)?;

    println!("{} {}", "Host listening on".bold(), socket_path.display().to_string().cyan());
    println!("  email: {}", dev_config.email);
    if let Some(data) = &dev_config.data_file {
        println!("  data:  {}", data.display());
    }
    if dev_config.reject_saves {
        println!("  {}", "saves will be rejected".yellow());
    }
    println!("Run `sp run --host-socket {}` to connect. Ctrl+C to stop.", socket_path.display());

    let (activity_tx, mut activity_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(activity) = activity_rx.recv().await {
            print_activity(&activity);
        }
    });

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let result = listener::serve(listener, dev_config, Some(activity_tx), shutdown).await;

    listener::cleanup_socket(&socket_path);
    let _ = printer.await;
    println!("{}", "Host stopped".dimmed());
    result
}

fn print_activity(activity: &HostActivity) {
    match activity {
        HostActivity::Connected => println!("{} widget connected", "●".green()),
        HostActivity::Received(kind) => println!("{} {}", "←".cyan(), kind),
        HostActivity::SentUserInfo { items } => {
            println!("{} USER_INFO ({} saved items)", "→".cyan(), items)
        }
        HostActivity::Saved { items } => println!("{} saved {} items", "✓".green(), items),
        HostActivity::SaveRejected { reason } => println!("{} save rejected: {}", "✗".red(), reason),
        HostActivity::Disconnected => println!("{} widget disconnected", "○".dimmed()),
    }
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
