//! Verb → handler mapping.
//!
//! The registry is built once at startup by installing [`Plugin`]s in a
//! fixed order.  A later registration silently replaces an earlier one with
//! the same verb.  The reserved [`SHUTDOWN_VERB`] is registered after every
//! plugin so it can never be shadowed.

use crate::command::StatusCode;
use crate::ipc::shutdown::Shutdown;
use crate::traits::{Handler, HandlerError, Plugin};
use log::{debug, info};
use std::collections::HashMap;

/// Verb that always triggers a graceful daemon shutdown.
pub const SHUTDOWN_VERB: &str = "kill";

/// Mapping from verb to handler.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the daemon's registry: install `plugins` in order, then bind
    /// [`SHUTDOWN_VERB`] to `shutdown`.
    pub fn from_plugins(plugins: &[&dyn Plugin], shutdown: &Shutdown) -> Self {
        let mut registry = Self::new();
        for plugin in plugins {
            let before = registry.len();
            plugin.install(&mut registry);
            info!(
                "installed plugin {} ({} new verb(s))",
                plugin.name(),
                registry.len() - before
            );
        }
        registry.register_shutdown(shutdown);
        registry
    }

    /// Add `handler` under `verb`, replacing any existing entry.
    pub fn register(&mut self, verb: impl Into<String>, handler: impl Handler + 'static) {
        let verb = verb.into();
        if self.handlers.insert(verb.clone(), Box::new(handler)).is_some() {
            debug!("verb {} overridden", verb);
        }
    }

    /// Bind [`SHUTDOWN_VERB`] to a handler that raises the shutdown flag.
    pub fn register_shutdown(&mut self, shutdown: &Shutdown) {
        let shutdown = shutdown.clone();
        self.register(
            SHUTDOWN_VERB,
            move |_: &[String]| -> Result<StatusCode, HandlerError> {
                info!("shutdown requested by client");
                shutdown.request();
                Ok(StatusCode::SUCCESS)
            },
        );
    }

    /// Look up the handler for `verb`.
    pub fn resolve(&self, verb: &str) -> Option<&dyn Handler> {
        self.handlers.get(verb).map(|h| h.as_ref())
    }

    /// All registered verbs, sorted.
    pub fn verbs(&self) -> Vec<&str> {
        let mut verbs: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        verbs.sort_unstable();
        verbs
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

//  Tests
