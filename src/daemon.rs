//! Startup wiring: build the registry from the configured plugins and run
//! the control server.

use crate::bspwm::actions::BspwmPlugin;
use crate::bspwm::wm::BspwmWm;
use crate::config::{Config, LauncherConfig};
use crate::dispatch::Dispatcher;
use crate::ipc::listener::{ControlServer, ServerError};
use crate::ipc::shutdown::Shutdown;
use crate::launcher::{CommonPlugin, Launcher, ProcessSpawner, SystemPlugin};
use crate::media::MediaPlugin;
use crate::registry::Registry;
use crate::traits::{Plugin, Spawner, WindowManager};
use log::info;
use std::sync::Arc;

/// Build the daemon registry.
///
/// Plugin order is `bspwm`, `common`, `system`, `media`; the shutdown verb is
/// registered last.
pub fn build_registry<W, S>(
    wm: W,
    spawner: S,
    launcher: &LauncherConfig,
    shutdown: &Shutdown,
) -> Registry
where
    W: WindowManager + 'static,
    S: Spawner + 'static,
{
    let wm = Arc::new(wm);
    let launcher = Arc::new(Launcher::new(spawner, launcher));

    let bspwm = BspwmPlugin::new(wm, Arc::clone(&launcher));
    let common = CommonPlugin::new(Arc::clone(&launcher));
    let system = SystemPlugin::new(Arc::clone(&launcher));
    let media = MediaPlugin::new(launcher);

    let plugins: [&dyn Plugin; 4] = [&bspwm, &common, &system, &media];
    Registry::from_plugins(&plugins, shutdown)
}

/// Bind the configured socket and serve until `shutdown` is raised.
pub fn run(config: &Config, shutdown: Shutdown) -> Result<(), ServerError> {
    let registry = build_registry(
        BspwmWm::new(&config.server.wm_socket),
        ProcessSpawner,
        &config.launcher,
        &shutdown,
    );
    info!("verbs: {}", registry.verbs().join(", "));
    info!("window manager socket: {}", config.server.wm_socket.display());

    let server = ControlServer::new(
        &config.server.listen_socket,
        Dispatcher::new(registry),
        shutdown,
    )
    .bind()?;
    server.run();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::StatusCode;
    use crate::traits::mocks::{MockSpawner, MockWm};

    fn quick() -> LauncherConfig {
        LauncherConfig {
            settle_delay_ms: 0,
            report_spawn_failures: false,
        }
    }

    #[test]
    fn registry_contains_every_plugin_verb() {
        let registry = build_registry(MockWm::default(), MockSpawner::default(), &quick(), &Shutdown::new());
        for verb in [
            "open-at",
            "close-focused",
            "move-to",
            "focus-on",
            "switch-to",
            "bspc",
            "open-here",
            "inc-bl",
            "dec-bl",
            "add-monitor",
            "poweroff",
            "vol-up",
            "mute",
            "next-track",
            "lock",
            "kill",
        ] {
            assert!(registry.resolve(verb).is_some(), "missing {}", verb);
        }
    }

    #[test]
    fn kill_verb_raises_shutdown() {
        let shutdown = Shutdown::new();
        let registry = build_registry(MockWm::default(), MockSpawner::default(), &quick(), &shutdown);
        let dispatcher = Dispatcher::new(registry);
        assert_eq!(dispatcher.dispatch("kill"), StatusCode::SUCCESS);
        assert!(shutdown.is_requested());
    }

    #[test]
    fn unknown_verb_does_not_shut_down() {
        let shutdown = Shutdown::new();
        let registry = build_registry(MockWm::default(), MockSpawner::default(), &quick(), &shutdown);
        let dispatcher = Dispatcher::new(registry);
        assert_eq!(dispatcher.dispatch("foo bar"), StatusCode::UNKNOWN_VERB);
        assert!(!shutdown.is_requested());
    }
}
