//! Core traits that decouple the dispatcher from concrete handlers, window
//! managers and process spawning.
//!
//! * [`Handler`]: one control action, taking positional string arguments and
//!   returning a [`StatusCode`].
//! * [`Plugin`]: a named source of handlers, merged into the
//!   [`Registry`](crate::registry::Registry) at startup.
//! * [`WindowManager`]: the downstream control socket of an external
//!   window manager.
//! * [`Spawner`]: the sink that launches external processes.
//!
//! Tests substitute recording doubles for the last two.

use crate::command::StatusCode;
use crate::registry::Registry;

/// Errors a [`Handler`] can raise.  The dispatcher turns every variant into
/// [`StatusCode::HANDLER_FAULT`].
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: String, got: usize },
    #[error("invalid argument {arg:?}: {reason}")]
    InvalidArgument { arg: String, reason: String },
    #[error("downstream error: {0}")]
    Downstream(String),
}

/// Check that `args` holds between `min` and `max` entries (inclusive).
pub fn expect_args(args: &[String], min: usize, max: usize) -> Result<(), HandlerError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{}..={}", min, max)
    };
    Err(HandlerError::Arity {
        expected,
        got: args.len(),
    })
}

/// A registered control action.
///
/// Arguments always arrive as strings; handlers do their own numeric
/// parsing.  `Ok` carries the status forwarded to the client, which may be
/// a handler-specific non-zero code.
pub trait Handler: Send + Sync {
    fn execute(&self, args: &[String]) -> Result<StatusCode, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&[String]) -> Result<StatusCode, HandlerError> + Send + Sync,
{
    fn execute(&self, args: &[String]) -> Result<StatusCode, HandlerError> {
        self(args)
    }
}

/// A named set of handlers.
///
/// Plugins are installed in a fixed order; a later plugin overwrites any
/// verb an earlier one registered.
pub trait Plugin {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Register this plugin's handlers.
    fn install(&self, registry: &mut Registry);
}

/// Reply from a downstream window-manager socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command was accepted.  Carries the raw reply bytes (query
    /// output, usually empty for actions).
    Accepted(Vec<u8>),
    /// The reply began with the BEL control byte.  Carries the error text.
    Rejected(String),
}

/// Abstraction over a window manager's control socket.
///
/// Every call is a self-contained round trip: connect, send one command,
/// read the reply, close.
pub trait WindowManager: Send + Sync {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Send one space-separated command and return the reply.
    fn send(&self, command: &str) -> Result<Reply, Self::Error>;
}

/// Launches external processes without waiting for them.
pub trait Spawner: Send + Sync {
    /// Start `program` with `args`, discarding its output.
    fn spawn(&self, program: &str, args: &[String]) -> std::io::Result<()>;
}

#[cfg(test)]
pub(crate) mod mocks {
    //! Recording doubles shared by the tests of several modules.

    use super::*;
    use std::sync::Mutex;

    /// A window manager that records every command and answers from a
    /// fixed rule set.
    #[derive(Debug, Default)]
    pub struct MockWm {
        pub log: Mutex<Vec<String>>,
        /// Commands starting with one of these prefixes are rejected.
        pub reject_prefixes: Vec<String>,
        /// When set, every call fails as if the socket were unreachable.
        pub unreachable: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock wm unreachable")]
    pub struct MockWmError;

    impl MockWm {
        pub fn commands(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl WindowManager for MockWm {
        type Error = MockWmError;

        fn send(&self, command: &str) -> Result<Reply, MockWmError> {
            if self.unreachable {
                return Err(MockWmError);
            }
            self.log.lock().unwrap().push(command.to_string());
            if self.reject_prefixes.iter().any(|p| command.starts_with(p)) {
                Ok(Reply::Rejected("rejected".into()))
            } else {
                Ok(Reply::Accepted(Vec::new()))
            }
        }
    }

    /// A spawner that records launches instead of starting processes.
    #[derive(Debug, Default)]
    pub struct MockSpawner {
        pub log: Mutex<Vec<(String, Vec<String>)>>,
        pub fail: bool,
    }

    impl MockSpawner {
        pub fn launched(&self) -> Vec<(String, Vec<String>)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Spawner for MockSpawner {
        fn spawn(&self, program: &str, args: &[String]) -> std::io::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            if self.fail {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"))
            } else {
                Ok(())
            }
        }
    }

    /// A spawner that appends a marker to a shared event log, so tests can
    /// check the interleaving of launches and downstream commands.
    pub struct SequencedSpawner {
        pub wm: std::sync::Arc<MockWm>,
    }

    impl Spawner for SequencedSpawner {
        fn spawn(&self, program: &str, _args: &[String]) -> std::io::Result<()> {
            self.wm.log.lock().unwrap().push(format!("<spawn {}>", program));
            Ok(())
        }
    }
}
