//! Window-manager verbs for bspwm.
//!
//! | verb                        | downstream command(s)                    |
//! |-----------------------------|------------------------------------------|
//! | `close-focused`             | `node -c`                                |
//! | `move-to <desktop>`         | `node -d <desktop>`                      |
//! | `focus-on <desktop>`        | `desktop -f <desktop>`                   |
//! | `switch-to <desktop>`       | alias of `focus-on`                      |
//! | `bspc <args…>`              | the arguments, re-joined with spaces     |
//! | `open-at <program> <desk>`  | see [`open_on_desktop`]                  |

use crate::command::StatusCode;
use crate::launcher::Launcher;
use crate::registry::Registry;
use crate::traits::{expect_args, HandlerError, Plugin, Reply, Spawner, WindowManager};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Temporary desktop that catches a newly launched window.
pub const SCRATCH_DESKTOP: &str = "Desktop";

/// Send `command` and translate the reply into a status.
///
/// A rejected command yields `rejected`; a connection failure is a
/// [`HandlerError::Downstream`].
pub fn forward<W: WindowManager>(
    wm: &W,
    command: &str,
    rejected: StatusCode,
) -> Result<StatusCode, HandlerError> {
    match wm.send(command) {
        Ok(Reply::Accepted(_)) => Ok(StatusCode::SUCCESS),
        Ok(Reply::Rejected(message)) => {
            warn!("window manager rejected {:?}: {}", command, message);
            Ok(rejected)
        }
        Err(e) => Err(HandlerError::Downstream(e.to_string())),
    }
}

/// Open `program` and place its window on `desktop`.
///
/// The steps run in this order:
///
/// 1. add the scratch desktop and focus it, so the new window lands there;
/// 2. launch the program and wait out the settle delay;
/// 3. move the focused node (the new window) to `desktop`, following it,
///    and remove the scratch desktop.
///
/// Every step runs even if an earlier one was rejected, so the scratch
/// desktop is always torn down.  The first non-success status is returned.
/// A connection failure aborts the sequence.
pub fn open_on_desktop<W: WindowManager, S: Spawner>(
    wm: &W,
    launcher: &Launcher<S>,
    program: &str,
    desktop: &str,
) -> Result<StatusCode, HandlerError> {
    info!("opening {} on desktop {}", program, desktop);

    let pre = [
        format!("monitor -a {}", SCRATCH_DESKTOP),
        format!("desktop {} -f", SCRATCH_DESKTOP),
    ];
    let post = [
        format!("node -d {} --follow", desktop),
        format!("desktop {} --remove", SCRATCH_DESKTOP),
    ];

    let mut outcome = StatusCode::SUCCESS;
    let mut record = |status: StatusCode| {
        if outcome.is_success() {
            outcome = status;
        }
    };

    for command in &pre {
        record(forward(wm, command, StatusCode::DOWNSTREAM_REJECTED)?);
    }
    record(launcher.launch(program, Duration::ZERO)?);
    for command in &post {
        record(forward(wm, command, StatusCode::DOWNSTREAM_REJECTED)?);
    }

    Ok(outcome)
}

/// Registers the bspwm verbs.
pub struct BspwmPlugin<W: WindowManager, S: Spawner> {
    wm: Arc<W>,
    launcher: Arc<Launcher<S>>,
}

impl<W: WindowManager, S: Spawner> BspwmPlugin<W, S> {
    pub fn new(wm: Arc<W>, launcher: Arc<Launcher<S>>) -> Self {
        Self { wm, launcher }
    }

    /// Register a verb that forwards `template` with its single argument
    /// appended.
    fn register_targeted(&self, registry: &mut Registry, verb: &str, template: &'static str)
    where
        W: 'static,
    {
        let wm = Arc::clone(&self.wm);
        registry.register(
            verb,
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 1, 1)?;
                let command = format!("{} {}", template, args[0]);
                forward(wm.as_ref(), &command, StatusCode::DOWNSTREAM_REJECTED)
            },
        );
    }
}

impl<W: WindowManager + 'static, S: Spawner + 'static> Plugin for BspwmPlugin<W, S> {
    fn name(&self) -> &str {
        "bspwm"
    }

    fn install(&self, registry: &mut Registry) {
        let wm = Arc::clone(&self.wm);
        registry.register(
            "close-focused",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 0, 0)?;
                forward(wm.as_ref(), "node -c", StatusCode::DOWNSTREAM_REJECTED)
            },
        );

        self.register_targeted(registry, "move-to", "node -d");
        self.register_targeted(registry, "focus-on", "desktop -f");
        self.register_targeted(registry, "switch-to", "desktop -f");

        let wm = Arc::clone(&self.wm);
        registry.register(
            "bspc",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                if args.is_empty() {
                    return Err(HandlerError::Arity {
                        expected: "at least 1".into(),
                        got: 0,
                    });
                }
                forward(wm.as_ref(), &args.join(" "), StatusCode::DOWNSTREAM_REJECTED)
            },
        );

        let wm = Arc::clone(&self.wm);
        let launcher = Arc::clone(&self.launcher);
        registry.register(
            "open-at",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 2, 2)?;
                open_on_desktop(wm.as_ref(), launcher.as_ref(), &args[0], &args[1])
            },
        );
    }
}

//  Tests
