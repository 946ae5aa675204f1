//! Command-line client for the desktop-automater daemon.
//!
//! ```text
//! deskctl [--socket <path>] <verb> [args...]
//! deskctl [--socket <path>]            # read one command per stdin line
//! ```
//!
//! With a verb, spaces inside each argument are escaped so they reach the
//! handler intact, the status is printed and becomes the exit code.
//! Without one, every non-empty stdin line is sent as-is on its own
//! connection and each reply is printed.

use desktop_automater::command::format_request;
use desktop_automater::config::{default_config_path, Config};
use desktop_automater::ipc::client::send_command;
use log::{debug, error};
use std::io::BufRead;
use std::path::PathBuf;

/// Resolve the daemon socket: `--socket`, then the config file, then the
/// compiled-in default.  The config file is only read, never created.
fn socket_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    match Config::load(&default_config_path()) {
        Ok(cfg) => cfg.server.listen_socket,
        Err(e) => {
            debug!("{}, using default socket", e);
            Config::default().server.listen_socket
        }
    }
}

fn interactive(path: &std::path::Path) -> i32 {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("read error: {}", e);
                return 1;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match send_command(path, line) {
            Ok(status) => println!("{}", status),
            Err(e) => {
                error!("{}", e);
                return 1;
            }
        }
    }
    0
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut explicit = None;
    if args.first().map(String::as_str) == Some("--socket") {
        if args.len() < 2 {
            eprintln!("usage: deskctl [--socket <path>] [verb args...]");
            std::process::exit(2);
        }
        explicit = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }
    let path = socket_path(explicit);

    let code = match args.split_first() {
        None => interactive(&path),
        Some((verb, rest)) => match send_command(&path, &format_request(verb, rest)) {
            Ok(status) => {
                println!("{}", status);
                i32::from(status)
            }
            Err(e) => {
                error!("{}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
