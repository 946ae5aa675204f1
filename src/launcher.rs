//! Program launching.
//!
//! [`Launcher`] spawns a program without waiting for it, then sleeps for a
//! settle delay so the new window can register with the window manager
//! before the next command runs.  The delay is a timing heuristic, not a
//! readiness check; it is configurable through
//! [`LauncherConfig`](crate::config::LauncherConfig).
//!
//! This module also provides the two plugins built on top of it:
//! [`CommonPlugin`] (`open-here`, backlight and monitor verbs) and
//! [`SystemPlugin`] (power and session verbs).

use crate::command::StatusCode;
use crate::config::LauncherConfig;
use crate::registry::Registry;
use crate::traits::{expect_args, HandlerError, Plugin, Spawner};
use log::{debug, info, warn};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

/// Spawns real child processes with all standard streams detached.
///
/// Each child is reaped by its own background thread so finished programs
/// do not linger as zombies.  That thread lives as long as the program, so a
/// daemon that has started many long-running programs also holds one parked
/// thread (and its stack) per program.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> std::io::Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let name = program.to_string();
        std::thread::spawn(move || match child.wait() {
            Ok(status) => debug!("{} exited with {}", name, status),
            Err(e) => debug!("could not wait for {}: {}", name, e),
        });
        Ok(())
    }
}

/// Turn a program string into an executable and its arguments.
///
/// `*.desktop` entries are started through `gtk-launch`; anything else is
/// split on whitespace.
fn command_line(program: &str) -> Option<(String, Vec<String>)> {
    let program = program.trim();
    if program.ends_with(".desktop") {
        return Some(("gtk-launch".into(), vec![program.to_string()]));
    }
    let mut parts = program.split_whitespace().map(str::to_string);
    let exe = parts.next()?;
    Some((exe, parts.collect()))
}

/// Fire-and-forget program launcher with a settle delay.
pub struct Launcher<S: Spawner> {
    spawner: S,
    settle_delay: Duration,
    report_spawn_failures: bool,
}

impl<S: Spawner> Launcher<S> {
    pub fn new(spawner: S, config: &LauncherConfig) -> Self {
        Self {
            spawner,
            settle_delay: config.settle_delay(),
            report_spawn_failures: config.report_spawn_failures,
        }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Launch `program`, then wait the settle delay plus `extra_delay`.
    ///
    /// Spawn failures are logged.  They only change the returned status when
    /// the launcher is configured to report them, in which case the delay
    /// is skipped and [`StatusCode::SPAWN_FAILED`] is returned.
    pub fn launch(&self, program: &str, extra_delay: Duration) -> Result<StatusCode, HandlerError> {
        let status = self.spawn_detached(program)?;
        if !status.is_success() {
            return Ok(status);
        }
        std::thread::sleep(self.settle_delay + extra_delay);
        Ok(StatusCode::SUCCESS)
    }

    /// Spawn `program` without any delay.
    pub fn spawn_detached(&self, program: &str) -> Result<StatusCode, HandlerError> {
        let (exe, args) = command_line(program).ok_or_else(|| HandlerError::InvalidArgument {
            arg: program.to_string(),
            reason: "empty program".into(),
        })?;
        Ok(self.run(&exe, &args))
    }

    /// Spawn `exe` with `args` exactly as given, without any delay.
    pub fn run(&self, exe: &str, args: &[String]) -> StatusCode {
        match self.spawner.spawn(exe, args) {
            Ok(()) => {
                info!("launched {} {:?}", exe, args);
                StatusCode::SUCCESS
            }
            Err(e) if self.report_spawn_failures => {
                warn!("could not launch {}: {}", exe, e);
                StatusCode::SPAWN_FAILED
            }
            Err(e) => {
                warn!("could not launch {}: {} (not reported)", exe, e);
                StatusCode::SUCCESS
            }
        }
    }
}

/// Parse an optional extra delay given in whole seconds.
fn parse_delay(arg: Option<&String>) -> Result<Duration, HandlerError> {
    match arg {
        None => Ok(Duration::ZERO),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| HandlerError::InvalidArgument {
                arg: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

/// Parse a non-negative whole-number amount such as a volume or brightness
/// step.
pub(crate) fn parse_amount(raw: &str) -> Result<u32, HandlerError> {
    raw.parse::<u32>().map_err(|e| HandlerError::InvalidArgument {
        arg: raw.to_string(),
        reason: e.to_string(),
    })
}

//  Common plugin

/// Verbs that work under any window manager:
///
/// * `open-here <program> [delay-seconds]`: launch on the focused desktop.
/// * `inc-bl <amount>` / `dec-bl <amount>`: step the backlight via
///   `xbacklight`.
/// * `add-monitor <output>`: enable an output at its preferred mode via
///   `xrandr`.
pub struct CommonPlugin<S: Spawner> {
    launcher: Arc<Launcher<S>>,
}

impl<S: Spawner> CommonPlugin<S> {
    pub fn new(launcher: Arc<Launcher<S>>) -> Self {
        Self { launcher }
    }
}

impl<S: Spawner + 'static> Plugin for CommonPlugin<S> {
    fn name(&self) -> &str {
        "common"
    }

    fn install(&self, registry: &mut Registry) {
        let launcher = Arc::clone(&self.launcher);
        registry.register(
            "open-here",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 1, 2)?;
                let delay = parse_delay(args.get(1))?;
                launcher.launch(&args[0], delay)
            },
        );

        for (verb, flag) in [("inc-bl", "-inc"), ("dec-bl", "-dec")] {
            let launcher = Arc::clone(&self.launcher);
            registry.register(
                verb,
                move |args: &[String]| -> Result<StatusCode, HandlerError> {
                    expect_args(args, 1, 1)?;
                    let amount = parse_amount(&args[0])?;
                    Ok(launcher.run("xbacklight", &[flag.to_string(), amount.to_string()]))
                },
            );
        }

        let launcher = Arc::clone(&self.launcher);
        registry.register(
            "add-monitor",
            move |args: &[String]| -> Result<StatusCode, HandlerError> {
                expect_args(args, 1, 1)?;
                if args[0].is_empty() {
                    return Err(HandlerError::InvalidArgument {
                        arg: String::new(),
                        reason: "empty output name".into(),
                    });
                }
                let argv = ["--output".to_string(), args[0].clone(), "--auto".to_string()];
                Ok(launcher.run("xrandr", &argv))
            },
        );
    }
}

//  System plugin

/// Power and session verbs and the command each one runs.
pub const SYSTEM_COMMANDS: &[(&str, &str)] = &[
    ("poweroff", "systemctl poweroff"),
    ("reboot", "systemctl reboot"),
    ("hibernate", "systemctl hibernate"),
    ("suspend", "systemctl suspend-then-hibernate"),
    ("sleep", "systemctl suspend-then-hibernate"),
    ("lock", "loginctl lock-session"),
    ("logout", "pkill bspwm"),
];

/// Power and session control.  None of these verbs take arguments.
pub struct SystemPlugin<S: Spawner> {
    launcher: Arc<Launcher<S>>,
}

impl<S: Spawner> SystemPlugin<S> {
    pub fn new(launcher: Arc<Launcher<S>>) -> Self {
        Self { launcher }
    }
}

impl<S: Spawner + 'static> Plugin for SystemPlugin<S> {
    fn name(&self) -> &str {
        "system"
    }

    fn install(&self, registry: &mut Registry) {
        for (verb, command) in SYSTEM_COMMANDS {
            let launcher = Arc::clone(&self.launcher);
            registry.register(
                *verb,
                move |args: &[String]| -> Result<StatusCode, HandlerError> {
                    expect_args(args, 0, 0)?;
                    launcher.spawn_detached(command)
                },
            );
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::traits::mocks::MockSpawner;
    use std::time::Instant;

    fn config(settle_delay_ms: u64, report: bool) -> LauncherConfig {
        LauncherConfig {
            settle_delay_ms,
            report_spawn_failures: report,
        }
    }

    fn launcher(report: bool, fail: bool) -> Arc<Launcher<MockSpawner>> {
        let spawner = MockSpawner {
            fail,
            ..Default::default()
        };
        Arc::new(Launcher::new(spawner, &config(0, report)))
    }

    fn dispatcher(launcher: &Arc<Launcher<MockSpawner>>) -> Dispatcher {
        let mut registry = Registry::new();
        CommonPlugin::new(Arc::clone(launcher)).install(&mut registry);
        SystemPlugin::new(Arc::clone(launcher)).install(&mut registry);
        Dispatcher::new(registry)
    }

    #[test]
    fn command_line_splitting() {
        assert_eq!(command_line("kitty"), Some(("kitty".into(), vec![])));
        assert_eq!(
            command_line("firefox --private-window"),
            Some(("firefox".into(), vec!["--private-window".into()]))
        );
        assert_eq!(
            command_line("org.gnome.Nautilus.desktop"),
            Some(("gtk-launch".into(), vec!["org.gnome.Nautilus.desktop".into()]))
        );
        assert_eq!(command_line("   "), None);
    }

    #[test]
    fn open_here_spawns_once() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here /bin/true"), StatusCode::SUCCESS);
        assert_eq!(l.spawner().launched(), vec![("/bin/true".to_string(), vec![])]);
    }

    #[test]
    fn open_here_passes_escaped_arguments() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here firefox\\s--new-window"), StatusCode::SUCCESS);
        assert_eq!(
            l.spawner().launched(),
            vec![("firefox".to_string(), vec!["--new-window".to_string()])]
        );
    }

    #[test]
    fn open_here_bad_delay_is_fault() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here kitty soon"), StatusCode::HANDLER_FAULT);
        assert!(l.spawner().launched().is_empty());
    }

    #[test]
    fn open_here_wrong_arity_is_fault() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here"), StatusCode::HANDLER_FAULT);
        assert_eq!(d.dispatch("open-here a 1 extra"), StatusCode::HANDLER_FAULT);
    }

    #[test]
    fn spawn_failure_is_silent_by_default() {
        let l = launcher(false, true);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here missing-program"), StatusCode::SUCCESS);
    }

    #[test]
    fn spawn_failure_can_be_reported() {
        let l = launcher(true, true);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("open-here missing-program"), StatusCode::SPAWN_FAILED);
    }

    #[test]
    fn launch_waits_settle_delay() {
        let l = Launcher::new(MockSpawner::default(), &config(50, false));
        let start = Instant::now();
        assert_eq!(l.launch("kitty", Duration::ZERO).unwrap(), StatusCode::SUCCESS);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn system_verbs_spawn_fixed_commands() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("lock"), StatusCode::SUCCESS);
        assert_eq!(d.dispatch("poweroff now"), StatusCode::HANDLER_FAULT);
        assert_eq!(
            l.spawner().launched(),
            vec![("loginctl".to_string(), vec!["lock-session".to_string()])]
        );
    }

    #[test]
    fn backlight_steps_by_amount() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("inc-bl 10"), StatusCode::SUCCESS);
        assert_eq!(d.dispatch("dec-bl 5"), StatusCode::SUCCESS);
        assert_eq!(d.dispatch("inc-bl bright"), StatusCode::HANDLER_FAULT);
        assert_eq!(d.dispatch("dec-bl"), StatusCode::HANDLER_FAULT);
        assert_eq!(
            l.spawner().launched(),
            vec![
                ("xbacklight".to_string(), vec!["-inc".to_string(), "10".to_string()]),
                ("xbacklight".to_string(), vec!["-dec".to_string(), "5".to_string()]),
            ]
        );
    }

    #[test]
    fn add_monitor_enables_output() {
        let l = launcher(false, false);
        let d = dispatcher(&l);
        assert_eq!(d.dispatch("add-monitor HDMI-1"), StatusCode::SUCCESS);
        assert_eq!(d.dispatch("add-monitor"), StatusCode::HANDLER_FAULT);
        assert_eq!(d.dispatch("add-monitor  "), StatusCode::HANDLER_FAULT);
        assert_eq!(
            l.spawner().launched(),
            vec![(
                "xrandr".to_string(),
                vec!["--output".to_string(), "HDMI-1".to_string(), "--auto".to_string()]
            )]
        );
    }

    #[test]
    fn real_spawner_runs_true() {
        assert!(ProcessSpawner.spawn("/bin/true", &[]).is_ok());
        assert!(ProcessSpawner
            .spawn("/definitely/not/a/program", &[])
            .is_err());
    }
}
