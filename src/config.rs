//! Application configuration.
//!
//! The configuration is a JSON file, by default
//! `$XDG_CONFIG_HOME/desktop-automater/config.json`.  It is written with
//! defaults on first start.  Every field is optional, so a minimal `{}` file
//! is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "server": {
//!     "listen_socket": "/run/user/1000/desktop-automater.sock",
//!     "wm_socket": "/tmp/bspwm_0_0-socket"
//!   },
//!   "launcher": {
//!     "settle_delay_ms": 200,
//!     "report_spawn_failures": false
//!   }
//! }
//! ```
//!
//! Socket paths may start with `~/`, which is expanded against `$HOME`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Socket locations.
    #[serde(default)]
    pub server: ServerConfig,

    /// Program launcher behaviour.
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// Where the daemon listens and where the window manager listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// This daemon's own socket.
    pub listen_socket: PathBuf,
    /// The window manager's control socket.
    pub wm_socket: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_socket: default_listen_socket(),
            wm_socket: default_wm_socket(),
        }
    }
}

/// Program launcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Pause after spawning a program, giving its window time to appear
    /// before the next command runs (ms).
    pub settle_delay_ms: u64,
    /// Return [`SPAWN_FAILED`](crate::command::StatusCode::SPAWN_FAILED)
    /// when a program cannot be started, instead of logging and reporting
    /// success.
    pub report_spawn_failures: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 200,
            report_spawn_failures: false,
        }
    }
}

impl LauncherConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Default socket path for the daemon: `$XDG_RUNTIME_DIR/desktop-automater.sock`.
pub fn default_listen_socket() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("desktop-automater.sock")
}

/// Default bspwm control socket: `$BSPWM_SOCKET` or `/tmp/bspwm_0_0-socket`.
pub fn default_wm_socket() -> PathBuf {
    std::env::var("BSPWM_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/bspwm_0_0-socket"))
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/desktop-automater`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("desktop-automater")
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Expand a leading `~/` against `$HOME`.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let mut config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        config.expand_paths();
        Ok(config)
    }

    /// Load `path`, first writing the defaults there if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::default().save(path)?;
        }
        Self::load(path)
    }

    /// Write this configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ConfigError(format!("failed to create {}: {}", dir.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| ConfigError(format!("failed to write {}: {}", path.display(), e)))
    }

    fn expand_paths(&mut self) {
        self.server.listen_socket = expand_tilde(&self.server.listen_socket);
        self.server.wm_socket = expand_tilde(&self.server.wm_socket);
    }
}

/// Error from loading, parsing or writing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
