//! The daemon's control socket.
//!
//! External tools (key-bind helpers, scripts, `deskctl`) connect to the
//! socket, send a single command line and read back a status code.

pub mod client;
pub mod listener;
pub mod shutdown;
