//! Requests and status codes shared by every component.
//!
//! A [`Request`] is the parsed form of the single text line a client sends:
//! a verb followed by positional string arguments.  A [`StatusCode`] is the
//! integer outcome written back to the client as its decimal string.

use std::fmt;

/// Two-character sequence that stands for a literal space inside a token.
pub const SPACE_ESCAPE: &str = "\\s";

/// Outcome of one dispatched request.
///
/// The well-known codes are exposed as associated constants.  Handlers may
/// return any other value to signal a handler-specific failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(pub u8);

impl StatusCode {
    /// The handler ran and reported success.
    pub const SUCCESS: StatusCode = StatusCode(0);
    /// The verb is not registered.
    pub const UNKNOWN_VERB: StatusCode = StatusCode(1);
    /// The handler failed (bad arguments, I/O error, …).
    pub const HANDLER_FAULT: StatusCode = StatusCode(2);
    /// A program could not be spawned (only when spawn failures are reported).
    pub const SPAWN_FAILED: StatusCode = StatusCode(3);
    /// The downstream window manager rejected a command.
    pub const DOWNSTREAM_REJECTED: StatusCode = StatusCode(4);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// The bytes sent back to the client.
    pub fn to_wire(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> i32 {
        i32::from(code.0)
    }
}

/// Errors produced while parsing a request line.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("empty request")]
    Empty,
}

/// A parsed request: the verb and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub verb: String,
    pub args: Vec<String>,
}

impl Request {
    /// Parse a raw request line.
    ///
    /// The line is split on single spaces.  Each token is trimmed and every
    /// [`SPACE_ESCAPE`] inside it is replaced with a real space, so arguments
    /// can carry embedded spaces.  Empty tokens between consecutive spaces
    /// are kept as empty arguments.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let mut tokens = raw
            .split(' ')
            .map(|token| token.trim().replace(SPACE_ESCAPE, " "));

        let verb = match tokens.next() {
            Some(verb) if !verb.is_empty() => verb,
            _ => return Err(RequestError::Empty),
        };

        Ok(Self {
            verb,
            args: tokens.collect(),
        })
    }
}

/// Escape the spaces of a single argument so it survives [`Request::parse`].
pub fn escape_arg(arg: &str) -> String {
    arg.replace(' ', SPACE_ESCAPE)
}

/// Build a request line from a verb and raw arguments, escaping each
/// argument's inner spaces.
pub fn format_request<S: AsRef<str>>(verb: &str, args: &[S]) -> String {
    std::iter::once(verb.to_string())
        .chain(args.iter().map(|a| escape_arg(a.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

//  Tests
