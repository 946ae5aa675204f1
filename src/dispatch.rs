//! Turns a raw request line into a [`StatusCode`].
//!
//! The [`Dispatcher`] is the fault boundary: whatever a handler does, the
//! caller gets a status code back.
//!
//! | outcome                          | status                        |
//! |----------------------------------|-------------------------------|
//! | verb not registered / empty line | [`StatusCode::UNKNOWN_VERB`]  |
//! | handler returned `Err`           | [`StatusCode::HANDLER_FAULT`] |
//! | handler returned `Ok(code)`      | `code`                        |

use crate::command::{Request, StatusCode};
use crate::registry::Registry;
use log::{info, warn};

/// Resolves and runs handlers for incoming requests.
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Parse `raw`, run the matching handler and return its status.
    pub fn dispatch(&self, raw: &str) -> StatusCode {
        let status = match Request::parse(raw) {
            Ok(request) => self.dispatch_request(&request),
            Err(e) => {
                warn!("rejecting request {:?}: {}", raw, e);
                StatusCode::UNKNOWN_VERB
            }
        };
        info!("status {}", status);
        status
    }

    /// Run the handler for an already parsed request.
    pub fn dispatch_request(&self, request: &Request) -> StatusCode {
        info!("dispatching {:?} {:?}", request.verb, request.args);

        let Some(handler) = self.registry.resolve(&request.verb) else {
            warn!("unknown verb {:?}", request.verb);
            return StatusCode::UNKNOWN_VERB;
        };

        match handler.execute(&request.args) {
            Ok(status) => status,
            Err(e) => {
                warn!("{} failed: {}", request.verb, e);
                StatusCode::HANDLER_FAULT
            }
        }
    }
}

//  Tests
