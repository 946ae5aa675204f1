//! Shutdown flag shared by the accept loop, the reserved shutdown verb and
//! the process signal handlers.

use log::info;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to a single shutdown flag.
///
/// Once raised the flag stays raised.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the accept loop to drain and stop.
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag when the process receives SIGINT or SIGTERM.
    ///
    /// The handlers only set the flag; the accept loop notices it on its
    /// next poll and removes the socket path before returning.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        }
        info!("signal handlers installed");
        Ok(())
    }
}
