//! The control socket server.
//!
//! Binds a Unix stream socket and serves one connection at a time:
//! read the request once, dispatch it, write the status code, close.
//!
//! # Wire format
//!
//! The client sends one request of at most [`REQUEST_BUFFER_SIZE`] bytes
//! (longer requests are truncated) and receives the decimal status code:
//!
//! ```text
//! -> move-to desktop\sname
//! <- 0
//! ```
//!
//! # Lifecycle
//!
//! [`ControlServer::bind`] removes a stale socket file and binds the path;
//! a live socket or a path that is not a socket is a fatal error.
//! [`BoundServer::run`] accepts connections until the shared
//! [`Shutdown`] flag is raised (by the `kill` verb or by SIGINT/SIGTERM),
//! then removes the socket file.  The listener is polled in non-blocking
//! mode so a raised flag is noticed even when no client connects.

use super::shutdown::Shutdown;
use crate::dispatch::Dispatcher;
use log::{debug, error, info, warn};
use std::io::{self, Read, Write};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest request read from a client.
pub const REQUEST_BUFFER_SIZE: usize = 1024;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// How long a client may stay silent, or leave its reply unread, before the
/// connection is dropped.  Bounds how long one client can hold the loop away
/// from the shutdown flag.
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

/// Errors produced while setting up the server.  All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{path} exists and is not a socket")]
    NotSocket { path: String },
    #[error("{path} is in use by a running daemon")]
    InUse { path: String },
    #[error("could not remove stale socket {path}: {source}")]
    StaleSocket {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not bind {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A server that has not bound its socket yet.
pub struct ControlServer {
    path: PathBuf,
    dispatcher: Dispatcher,
    shutdown: Shutdown,
}

impl ControlServer {
    /// Create a server for `path`.  Nothing touches the filesystem until
    /// [`bind`](Self::bind).
    pub fn new(path: impl AsRef<Path>, dispatcher: Dispatcher, shutdown: Shutdown) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            dispatcher,
            shutdown,
        }
    }

    /// Clear a stale socket file and bind the path.
    pub fn bind(self) -> Result<BoundServer, ServerError> {
        clear_stale_socket(&self.path)?;
        let listener = UnixListener::bind(&self.path).map_err(|source| ServerError::Bind {
            path: self.path.display().to_string(),
            source,
        })?;
        let socket = SocketFile(self.path);
        listener.set_nonblocking(true)?;
        info!("listening on {}", socket.0.display());

        Ok(BoundServer {
            listener,
            socket,
            dispatcher: self.dispatcher,
            shutdown: self.shutdown,
        })
    }
}

/// Removes the socket path when dropped.
struct SocketFile(PathBuf);

impl Drop for SocketFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => info!("removed {}", self.0.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove {}: {}", self.0.display(), e),
        }
    }
}

/// A server with a bound socket, ready to accept connections.
pub struct BoundServer {
    listener: UnixListener,
    socket: SocketFile,
    dispatcher: Dispatcher,
    shutdown: Shutdown,
}

impl BoundServer {
    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.socket.0
    }

    /// Serve connections until shutdown is requested.
    ///
    /// This method **blocks**.  Per-connection failures are logged and the
    /// loop carries on; only the shutdown flag ends it.  The socket file is
    /// removed on return.
    pub fn run(self) {
        let mut last_error = None::<io::ErrorKind>;
        while !self.shutdown.is_requested() {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    last_error = None;
                    self.handle(stream);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_BACKOFF);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    if last_error != Some(e.kind()) {
                        error!("accept error: {}", e);
                    }
                    last_error = Some(e.kind());
                    std::thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!("shutting down listener on {}", self.path().display());
    }

    /// Read one request, dispatch it and write the status back.
    fn handle(&self, mut stream: UnixStream) {
        debug!("client connected");
        let configured = stream
            .set_nonblocking(false)
            .and_then(|()| stream.set_read_timeout(Some(CLIENT_TIMEOUT)))
            .and_then(|()| stream.set_write_timeout(Some(CLIENT_TIMEOUT)));
        if let Err(e) = configured {
            error!("could not configure client stream: {}", e);
            return;
        }

        let mut buf = [0u8; REQUEST_BUFFER_SIZE];
        let n = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(e) if is_timeout(&e) => {
                warn!("client sent nothing within {:?}, dropping it", CLIENT_TIMEOUT);
                return;
            }
            Err(e) => {
                error!("read error: {}", e);
                return;
            }
        };
        let request = String::from_utf8_lossy(&buf[..n]);
        debug!("received {:?}", request);

        let status = self.dispatcher.dispatch(&request);
        if let Err(e) = stream.write_all(&status.to_wire()) {
            error!("could not send status {}: {}", status, e);
        }
        debug!("client disconnected");
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Remove a leftover socket file at `path`, refusing to touch anything
/// that is not a socket or that still has a live listener.
fn clear_stale_socket(path: &Path) -> Result<(), ServerError> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ServerError::Io(e)),
    };
    if !metadata.file_type().is_socket() {
        return Err(ServerError::NotSocket {
            path: path.display().to_string(),
        });
    }
    match UnixStream::connect(path) {
        Ok(_) => Err(ServerError::InUse {
            path: path.display().to_string(),
        }),
        Err(e)
            if e.kind() == io::ErrorKind::ConnectionRefused
                || e.kind() == io::ErrorKind::NotFound =>
        {
            info!("removing stale socket {}", path.display());
            std::fs::remove_file(path).map_err(|source| ServerError::StaleSocket {
                path: path.display().to_string(),
                source,
            })
        }
        Err(e) => Err(ServerError::Io(e)),
    }
}

//  Tests
