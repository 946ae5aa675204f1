//! Entry point for the **desktop-automater** daemon.
//!
//! ```text
//! desktop-automater [--config <path>] [--socket <path>]
//! ```
//!
//! Loads (or creates) the config file, installs SIGINT/SIGTERM handlers and
//! serves the control socket on the main thread until shutdown.

use desktop_automater::config::{default_config_path, Config};
use desktop_automater::daemon;
use desktop_automater::ipc::shutdown::Shutdown;
use log::{error, info};
use std::path::PathBuf;

/// Command-line overrides.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    socket: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(it.next().ok_or("--config needs a path")?.into());
            }
            "--socket" => {
                args.socket = Some(it.next().ok_or("--socket needs a path")?.into());
            }
            other => return Err(format!("unknown argument {}", other)),
        }
    }
    Ok(args)
}

/// Load the config, falling back to compiled-in defaults if the file can
/// neither be read nor created.
fn load_config(path: &std::path::Path) -> Config {
    match Config::load_or_create(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            error!("{}, using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            eprintln!("usage: desktop-automater [--config <path>] [--socket <path>]");
            std::process::exit(2);
        }
    };

    let config_path = args.config.unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path);
    if let Some(socket) = args.socket {
        config.server.listen_socket = socket;
    }

    let shutdown = Shutdown::new();
    if let Err(e) = shutdown.install_signal_handlers() {
        error!("failed to install signal handlers: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = daemon::run(&config, shutdown) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("server session terminated");
}
