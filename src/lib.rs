//! **desktop-automater**: a command daemon for bspwm desktops.
//!
//! The daemon listens on a Unix socket.  Each connection carries one text
//! command such as `open-at kitty 4` or `move-to 3`; the daemon runs the
//! matching handler and answers with a numeric status code.
//!
//! # Architecture
//!
//! * [`command`]: request parsing (`\s` escapes a space inside an argument)
//!   and [`StatusCode`](command::StatusCode).
//! * [`registry`]: verb → handler map, merged from [`traits::Plugin`]s.
//! * [`dispatch`]: runs handlers and converts their faults to status codes.
//! * [`bspwm`]: the window manager's NUL-framed protocol and verbs.
//! * [`launcher`]: fire-and-forget program launching plus system verbs.
//! * [`media`]: volume and playback verbs.
//! * [`ipc`]: the control socket server, its client, and shutdown handling.
//!
//! The window manager and process spawning sit behind
//! [`traits::WindowManager`] and [`traits::Spawner`] so handlers can be
//! exercised without a running bspwm.

pub mod bspwm;
pub mod command;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod ipc;
pub mod launcher;
pub mod media;
pub mod registry;
pub mod traits;
