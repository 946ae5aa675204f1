//! Client side of the control socket, used by `deskctl` and by tests.

use crate::command::StatusCode;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Errors a client can hit while talking to the daemon.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected reply {0:?}")]
    BadReply(String),
}

/// Send one request line and return the daemon's raw reply.
pub fn send_request(path: &Path, request: &str) -> Result<String, ClientError> {
    let mut stream = UnixStream::connect(path).map_err(|source| ClientError::Connect {
        path: path.display().to_string(),
        source,
    })?;
    stream.write_all(request.as_bytes())?;
    // The daemon reads once; closing our half just signals we are done.
    let _ = stream.shutdown(Shutdown::Write);

    let mut reply = String::new();
    stream.read_to_string(&mut reply)?;
    Ok(reply)
}

/// Send one request line and parse the reply as a [`StatusCode`].
pub fn send_command(path: &Path, request: &str) -> Result<StatusCode, ClientError> {
    let reply = send_request(path, request)?;
    reply
        .trim()
        .parse::<u8>()
        .map(StatusCode)
        .map_err(|_| ClientError::BadReply(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;

    fn tmp_socket_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "desktop-automater-client-{}-{}.sock",
            tag,
            std::process::id()
        ))
    }

    /// Answer a single connection with `reply`.
    fn one_shot(path: &Path, reply: &'static str) {
        let _ = std::fs::remove_file(path);
        let listener = UnixListener::bind(path).unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).unwrap();
            stream.write_all(reply.as_bytes()).unwrap();
        });
    }

    #[test]
    fn parses_numeric_reply() {
        let path = tmp_socket_path("ok");
        one_shot(&path, "4");
        assert_eq!(send_command(&path, "move-to 1").unwrap(), StatusCode(4));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_garbage_reply() {
        let path = tmp_socket_path("garbage");
        one_shot(&path, "oops");
        assert!(matches!(
            send_command(&path, "move-to 1"),
            Err(ClientError::BadReply(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_daemon_is_connect_error() {
        let path = tmp_socket_path("missing");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            send_command(&path, "kill"),
            Err(ClientError::Connect { .. })
        ));
    }
}
