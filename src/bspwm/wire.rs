//! bspwm control-socket framing.
//!
//! A command is split on single spaces and every token is followed by one
//! NUL byte: `"node -d 3"` becomes `b"node\0-d\0\x33\0"`.  Consecutive
//! spaces yield empty tokens, each contributing a lone NUL.  Tokens are not
//! escaped; a NUL inside a token is passed through unchanged.
//!
//! Callers strip wrapper text (such as a leading `bspc `) before encoding.

/// Token terminator.
pub const NUL: u8 = 0;

/// Encode a space-separated command as a NUL-terminated token frame.
pub fn encode(command: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(command.len() + 1);
    for token in command.split(' ') {
        frame.extend_from_slice(token.as_bytes());
        frame.push(NUL);
    }
    frame
}
