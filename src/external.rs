use crate::command::Termination;
use crate::env::Environment;
use crate::parser::ArgumentVector;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a command could not be run to completion.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{program}: command not found")]
    NotFound { program: String },

    /// The program exists but could not be executed.
    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The system could not create another process right now.
    #[error("{program}: cannot spawn process: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program}: failed to wait for process: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Spawns a command in the foreground and blocks until it has terminated.
pub trait Launcher {
    fn launch(
        &mut self,
        argv: &ArgumentVector,
        env: &Environment,
    ) -> Result<Termination, LaunchError>;
}

/// Launcher backed by [`std::process::Command`].
///
/// The child inherits the standard streams, gets `env.vars` on top of the
/// process environment, and runs in `env.current_dir`.
#[derive(Debug, Default)]
pub struct ForegroundLauncher;

impl Launcher for ForegroundLauncher {
    fn launch(
        &mut self,
        argv: &ArgumentVector,
        env: &Environment,
    ) -> Result<Termination, LaunchError> {
        let program = argv.program().unwrap_or_default();
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(program))
            .ok_or_else(|| LaunchError::NotFound {
                program: program.to_owned(),
            })?;

        let mut child = Command::new(&*executable)
            .args(argv.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|source| classify_spawn_error(program, source))?;
        debug!(pid = child.id(), program, "spawned foreground child");

        let status = child.wait().map_err(|source| LaunchError::Wait {
            program: program.to_owned(),
            source,
        })?;
        let termination = Termination::from(status);
        info!(program, %termination, "foreground child finished");
        Ok(termination)
    }
}

fn classify_spawn_error(program: &str, source: io::Error) -> LaunchError {
    let program = program.to_owned();
    warn!(%program, error = %source, "spawn failed");
    match source.kind() {
        io::ErrorKind::NotFound => LaunchError::NotFound { program },
        io::ErrorKind::OutOfMemory | io::ErrorKind::WouldBlock => {
            LaunchError::Spawn { program, source }
        }
        _ => LaunchError::Exec { program, source },
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(cmd))
        .find(|path| path.exists())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::fs::File;

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn launch(tokens: &[&str]) -> Result<Termination, LaunchError> {
        let _lock = crate::builtin::tests::lock_current_dir();
        let argv: ArgumentVector = tokens.iter().copied().collect();
        ForegroundLauncher.launch(&argv, &Environment::new())
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(osstr("/bin"), path);
        assert!(res.is_some(), "Expected to find /bin/sh via absolute path");
        assert_eq!(res.unwrap().as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let res = find_command_path(osstr("/bin"), Path::new("/bin/nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let res = find_command_path(osstr("/nonexistent_dir_xyz:/bin"), Path::new("sh"));
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found.as_ref(), Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("nonexisting"));
        assert!(res.is_none(), "Expected not to find 'nonexisting' in PATH");
    }

    #[test]
    #[cfg(unix)]
    fn empty_path_entries_are_skipped() {
        let res = find_command_path(osstr(""), Path::new("Cargo.toml"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn multiple_components_relative_existing() {
        let _lock = crate::builtin::tests::lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_mc", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(tmp_base.join("bin")).expect("create temp bin dir");
        File::create(tmp_base.join("bin").join("sh")).expect("touch bin/sh");

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/does/not/matter"), Path::new("bin/sh"));
        // Restore cwd early to avoid interference even on failure
        std::env::set_current_dir(&cwd_before).ok();

        let found = res.expect("Expected to find relative 'bin/sh' in current dir");
        assert!(found.as_ref().ends_with("bin/sh"));
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    fn empty_path_is_none() {
        let res = find_command_path(OsStr::new("/bin"), Path::new(""));
        assert!(res.is_none(), "Empty path should not resolve to anything");
    }

    #[test]
    #[cfg(unix)]
    fn launch_true_exits_zero() {
        assert_eq!(launch(&["true"]).unwrap(), Termination::Exited(0));
    }

    #[test]
    #[cfg(unix)]
    fn launch_passes_arguments() {
        let res = launch(&["sh", "-c", "exit 7"]).unwrap();
        assert_eq!(res, Termination::Exited(7));
    }

    #[test]
    #[cfg(unix)]
    fn launch_reports_signal() {
        let res = launch(&["sh", "-c", "kill -TERM $$"]).unwrap();
        assert!(matches!(res, Termination::Signaled { signal: 15, .. }));
    }

    #[test]
    fn launch_missing_program_is_not_found() {
        let err = launch(&["not_a_real_command_xyz"]).unwrap_err();
        assert!(matches!(
            err,
            LaunchError::NotFound { ref program } if program == "not_a_real_command_xyz"
        ));
        assert_eq!(err.to_string(), "not_a_real_command_xyz: command not found");
    }

    #[test]
    #[cfg(unix)]
    fn launch_directory_is_exec_error() {
        let err = launch(&["/"]).unwrap_err();
        assert!(matches!(err, LaunchError::Exec { .. }), "got {:?}", err);
    }
}
