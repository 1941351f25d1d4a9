//! Runner invocation for a game
//!
//! A game is never executed directly: `umu-run` is started with the game's
//! executable as its only argument and the launch parameters passed as
//! environment variables on top of the inherited environment.

use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::LaunchError;
use crate::game::Game;
use crate::logging::log_launch;
use crate::proton::resolve_proton_path;

pub const DEFAULT_RUNNER: &str = "umu-run";

/// Value of `STORE` for games with a catalog id.
pub const STORE_STEAM: &str = "steam";

/// Everything needed to start the runner for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub game_name: String,
    pub runner: String,
    pub args: Vec<String>,
    /// Overrides applied on top of the inherited environment, in this order
    pub env: Vec<(String, OsString)>,
}

impl LaunchSpec {
    /// Build the invocation for `game` with the default runner.
    pub fn for_game(game: &Game, home: &Path) -> Self {
        Self::with_runner(game, home, DEFAULT_RUNNER)
    }

    pub fn with_runner(game: &Game, home: &Path, runner: &str) -> Self {
        let mut env = Vec::new();

        if !game.prefix.is_empty() {
            env.push(("WINEPREFIX".to_string(), OsString::from(&game.prefix)));
        }
        if !game.proton_ver.is_empty() {
            let proton_path = resolve_proton_path(home, &game.proton_ver);
            env.push(("PROTONPATH".to_string(), proton_path.into_os_string()));
        }
        if !game.id.is_empty() {
            env.push(("GAMEID".to_string(), OsString::from(format!("umu-{}", game.id))));
            env.push(("STORE".to_string(), OsString::from(STORE_STEAM)));
        }
        if !game.dll_overrides.is_empty() {
            env.push(("WINEDLLOVERRIDES".to_string(), OsString::from(&game.dll_overrides)));
        }

        Self {
            game_name: game.name.clone(),
            runner: runner.to_string(),
            args: vec![game.exec_path.clone()],
            env,
        }
    }

    /// Look up one override by name.
    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// The command, inheriting environment, stdout and stderr.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.runner);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Start the runner without waiting for it. Returns the child PID.
    pub fn spawn(&self) -> Result<u32, LaunchError> {
        if self.args.first().map_or(true, |exe| exe.is_empty()) {
            return Err(LaunchError::MissingExecutable(self.game_name.clone()));
        }

        log_launch(&format!("Launching {} via {}", self.game_name, self.runner));
        for (key, value) in &self.env {
            log_launch(&format!("  {}={}", key, value.to_string_lossy()));
        }

        let child = self.command().spawn().map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                LaunchError::RunnerNotFound(self.runner.clone())
            } else {
                LaunchError::Spawn {
                    runner: self.runner.clone(),
                    source,
                }
            }
        })?;

        // Fire and forget: the runner outlives this handle.
        Ok(child.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tf2() -> Game {
        Game {
            id: "440".to_string(),
            name: "Team Fortress 2".to_string(),
            exec_path: "/games/tf2/hl2.exe".to_string(),
            prefix: "/home/u/.wine440".to_string(),
            proton_ver: "Proton 9.0-3".to_string(),
            image_url: String::new(),
            dll_overrides: "d3d11=n,b".to_string(),
        }
    }

    #[test]
    fn test_full_environment() {
        let spec = LaunchSpec::for_game(&tf2(), Path::new("/home/u"));

        assert_eq!(spec.runner, "umu-run");
        assert_eq!(spec.args, vec!["/games/tf2/hl2.exe".to_string()]);
        assert_eq!(spec.env_var("GAMEID"), Some(OsStr::new("umu-440")));
        assert_eq!(spec.env_var("STORE"), Some(OsStr::new("steam")));
        assert_eq!(spec.env_var("WINEPREFIX"), Some(OsStr::new("/home/u/.wine440")));
        assert_eq!(spec.env_var("WINEDLLOVERRIDES"), Some(OsStr::new("d3d11=n,b")));
        assert_eq!(
            spec.env_var("PROTONPATH"),
            Some(OsStr::new("/home/u/.steam/steam/compatibilitytools.d/Proton 9.0-3"))
        );
        assert_eq!(spec.env.len(), 5);
    }

    #[test]
    fn test_empty_fields_add_nothing() {
        let game = Game {
            name: "Bare".to_string(),
            exec_path: "/games/bare.exe".to_string(),
            ..Default::default()
        };
        let spec = LaunchSpec::for_game(&game, Path::new("/home/u"));
        assert!(spec.env.is_empty());
        assert_eq!(spec.args, vec!["/games/bare.exe".to_string()]);
    }

    #[test]
    fn test_dll_overrides_pass_through_verbatim() {
        let mut game = tf2();
        game.dll_overrides = "winmm,version=n,b;dxgi=".to_string();
        let spec = LaunchSpec::for_game(&game, Path::new("/home/u"));
        assert_eq!(spec.env_var("WINEDLLOVERRIDES"), Some(OsStr::new("winmm,version=n,b;dxgi=")));
    }

    #[test]
    fn test_command_targets_runner_not_game() {
        let spec = LaunchSpec::with_runner(&tf2(), Path::new("/home/u"), "/opt/umu/umu-run");
        let cmd = spec.command();
        assert_eq!(cmd.get_program(), "/opt/umu/umu-run");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["/games/tf2/hl2.exe"]);
        let envs: Vec<_> = cmd.get_envs().collect();
        assert_eq!(envs.len(), 5);
    }

    #[test]
    fn test_missing_runner_is_reported() {
        let spec = LaunchSpec::with_runner(&tf2(), Path::new("/home/u"), "umu-run-does-not-exist-42");
        match spec.spawn() {
            Err(LaunchError::RunnerNotFound(runner)) => assert_eq!(runner, "umu-run-does-not-exist-42"),
            other => panic!("expected RunnerNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_executable_is_rejected() {
        let mut game = tf2();
        game.exec_path.clear();
        let spec = LaunchSpec::for_game(&game, Path::new("/home/u"));
        assert!(matches!(spec.spawn(), Err(LaunchError::MissingExecutable(_))));
    }

    #[test]
    fn test_spawn_does_not_wait_for_runner() {
        let mut game = tf2();
        game.exec_path = "5".to_string();
        let spec = LaunchSpec::with_runner(&game, Path::new("/home/u"), "sleep");

        let started = std::time::Instant::now();
        let pid = spec.spawn().unwrap();
        assert!(pid > 0);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_non_utf8_home_is_kept_intact() {
        use std::os::unix::ffi::OsStrExt;

        let home = Path::new(OsStr::from_bytes(b"/home/\xffuser"));
        let spec = LaunchSpec::for_game(&tf2(), home);

        let proton_path = spec.env_var("PROTONPATH").unwrap();
        assert!(proton_path.as_bytes().starts_with(b"/home/\xffuser/.steam/"));
        assert!(proton_path.as_bytes().ends_with(b"compatibilitytools.d/Proton 9.0-3"));
    }
}
