//! Audio and playback verbs.
//!
//! Volume goes through `amixer`, playback through `playerctl`.  Both are
//! started through the shared [`Launcher`] so they follow the same
//! spawn-failure policy as every other launched program.

use crate::command::StatusCode;
use crate::launcher::{parse_amount, Launcher};
use crate::registry::Registry;
use crate::traits::{expect_args, HandlerError, Plugin, Spawner};
use std::sync::Arc;

/// Playback verbs and the `playerctl` subcommand each one runs.
pub const PLAYBACK_COMMANDS: &[(&str, &str)] = &[
    ("play/pause", "play-pause"),
    ("play-track", "play"),
    ("pause-track", "pause"),
    ("stop-track", "stop"),
    ("next-track", "next"),
    ("last-track", "previous"),
];

/// `amixer` arguments that change the master volume by `amount` percent.
fn volume_args(amount: u32, raise: bool) -> Vec<String> {
    let sign = if raise { '+' } else { '-' };
    vec!["set".into(), "Master".into(), format!("{}%{}", amount, sign)]
}

/// `vol-up`, `vol-down`, `mute` and the playback verbs.
pub struct MediaPlugin<S: Spawner> {
    launcher: Arc<Launcher<S>>,
}

impl<S: Spawner> MediaPlugin<S> {
    pub fn new(launcher: Arc<Launcher<S>>) -> Self {
        Self { launcher }
    }
}

impl<S: Spawner + 'static> Plugin for MediaPlugin<S> {
    fn name(&self) -> &str {
        "media"
    }

    fn install(&self, registry: &mut Registry) {
        for (verb, raise) in [("vol-up", true), ("vol-down", false)] {
            let launcher = Arc::clone(&self.launcher);
            registry.register(
                verb,
                move |args: &[String]| -> Result<StatusCode, HandlerError> {
                    expect_args(args, 1, 1)?;
                    let amount = parse_amount(&args[0])?;
                    Ok(launcher.run("amixer", &volume_args(amount, raise)))
                },
            );
        }

        let launcher = Arc::clone(&self.launcher);
        registry.register(
            "mute",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 0, 0)?;
                launcher.spawn_detached("amixer -D pulse set Master 1+ toggle")
            },
        );

        for (verb, action) in PLAYBACK_COMMANDS {
            let launcher = Arc::clone(&self.launcher);
            registry.register(
                *verb,
                move |args: &[String]| -> Result<StatusCode, HandlerError> {
                    expect_args(args, 0, 0)?;
                    Ok(launcher.run("playerctl", &[action.to_string()]))
                },
            );
        }
    }
}
