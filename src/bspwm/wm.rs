//! [`WindowManager`] implementation backed by the bspwm control socket.
//!
//! Each call opens a fresh connection to the socket (default
//! `/tmp/bspwm_0_0-socket`), writes one NUL-framed command, reads the reply
//! and closes the connection.  A reply starting with the BEL byte (`0x07`)
//! means bspwm rejected the command.

use super::wire;
use crate::traits::{Reply, WindowManager};
use log::debug;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Leading reply byte that marks a failure.
pub const FAILURE_MARKER: u8 = 0x07;

/// Upper bound on the reply size read per command.
pub const REPLY_BUFFER_SIZE: usize = 1024;

/// How long to wait for bspwm to answer before giving up.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// bspwm-backed window manager.
#[derive(Debug, Clone)]
pub struct BspwmWm {
    socket: PathBuf,
}

/// Errors that can occur when talking to bspwm.
#[derive(Debug, thiserror::Error)]
#[error("bspwm IPC error: {0}")]
pub struct BspwmWmError(String);

impl BspwmWm {
    /// Create a handle for the control socket at `socket`.
    ///
    /// No connection is opened eagerly.
    pub fn new(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }
}

/// Interpret raw reply bytes.
pub fn parse_reply(reply: &[u8]) -> Reply {
    match reply.split_first() {
        Some((&FAILURE_MARKER, message)) => {
            Reply::Rejected(String::from_utf8_lossy(message).trim().to_string())
        }
        _ => Reply::Accepted(reply.to_vec()),
    }
}

impl WindowManager for BspwmWm {
    type Error = BspwmWmError;

    fn send(&self, command: &str) -> Result<Reply, Self::Error> {
        let mut stream = UnixStream::connect(&self.socket).map_err(|e| {
            BspwmWmError(format!("connect to {}: {}", self.socket.display(), e))
        })?;
        stream
            .set_read_timeout(Some(REPLY_TIMEOUT))
            .map_err(|e| BspwmWmError(format!("set timeout: {}", e)))?;

        debug!("-> bspwm {:?}", command);
        stream
            .write_all(&wire::encode(command))
            .map_err(|e| BspwmWmError(format!("write: {}", e)))?;

        let mut buf = [0u8; REPLY_BUFFER_SIZE];
        let n = stream
            .read(&mut buf)
            .map_err(|e| BspwmWmError(format!("read: {}", e)))?;

        let reply = parse_reply(&buf[..n]);
        debug!("<- bspwm {:?}", reply);
        Ok(reply)
    }
}

//  Tests
