use crate::command::Streams;
use crate::env::Environment;
use crate::parser::ArgumentVector;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Other names the command answers to.
    fn aliases() -> &'static [&'static str] {
        &[]
    }

    /// One-line description shown by `help`.
    fn summary() -> &'static str;

    /// Executes the command using the session's output channels and environment.
    ///
    /// Returns whether the session should keep going.
    fn execute(self, streams: &mut Streams, env: &mut Environment) -> Result<bool>;
}

/// Object-safe handle the registry hands out for a builtin name.
pub trait BuiltinHandler {
    fn name(&self) -> &'static str;

    fn matches(&self, name: &str) -> bool;

    /// Runs the builtin. Argument misuse and handler failures are reported on
    /// the diagnostic channel and never stop the session.
    fn run(&self, argv: &ArgumentVector, streams: &mut Streams, env: &mut Environment) -> bool;
}

/// Factory allows creating instances of a [`BuiltinCommand`] from its arguments.
pub struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand> BuiltinHandler for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn matches(&self, name: &str) -> bool {
        name == T::name() || T::aliases().iter().any(|alias| *alias == name)
    }

    fn run(&self, argv: &ArgumentVector, streams: &mut Streams, env: &mut Environment) -> bool {
        let name = argv.program().unwrap_or(T::name());
        let args: Vec<&str> = argv.args().iter().map(String::as_str).collect();
        debug!(builtin = T::name(), ?args, "running builtin");

        match T::from_args(&[name], &args) {
            Ok(cmd) => match cmd.execute(streams, env) {
                Ok(continue_session) => continue_session,
                Err(e) => {
                    streams.diagnostic(format_args!("{:#}", e));
                    true
                }
            },
            Err(EarlyExit { output, status }) => {
                if status.is_ok() {
                    let _ = streams.out.write_all(output.as_bytes());
                    let _ = streams.out.flush();
                } else {
                    streams.diagnostic(output.trim_end());
                }
                true
            }
        }
    }
}

/// Static mapping from command name to builtin handler.
pub struct BuiltinRegistry {
    handlers: Vec<Box<dyn BuiltinHandler>>,
}

impl BuiltinRegistry {
    pub fn new(handlers: Vec<Box<dyn BuiltinHandler>>) -> Self {
        Self { handlers }
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn BuiltinHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.matches(name))
            .map(|handler| handler.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|handler| handler.name())
    }
}

impl Default for BuiltinRegistry {
    /// The builtin set: `cd`, `cwd`, `help` and `exit`.
    fn default() -> Self {
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Cwd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Exit>::default()),
        ])
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "change the working directory"
    }

    fn execute(self, _streams: &mut Streams, env: &mut Environment) -> Result<bool> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => bail!("expected argument to \"cd\""),
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(true)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Cwd {
    #[argh(positional, greedy)]
    /// ignored; a warning is printed when present.
    pub extra: Vec<String>,
}

impl BuiltinCommand for Cwd {
    fn name() -> &'static str {
        "cwd"
    }

    fn aliases() -> &'static [&'static str] {
        &["pwd"]
    }

    fn summary() -> &'static str {
        "print the working directory"
    }

    fn execute(self, streams: &mut Streams, env: &mut Environment) -> Result<bool> {
        if !self.extra.is_empty() {
            streams.diagnostic("cwd: unexpected arguments ignored");
        }
        writeln!(streams.out, "{}", env.current_dir.to_string_lossy())?;
        Ok(true)
    }
}

#[derive(FromArgs)]
/// List the built-in commands.
pub struct Help {}

impl Help {
    fn line<T: BuiltinCommand>(out: &mut dyn Write) -> std::io::Result<()> {
        let mut names = vec![T::name()];
        names.extend_from_slice(T::aliases());
        writeln!(out, "  {:<16} {}", names.join(", "), T::summary())
    }
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "show this list"
    }

    fn execute(self, streams: &mut Streams, _env: &mut Environment) -> Result<bool> {
        let out = &mut *streams.out;
        writeln!(out, "cshell: these are the built-in commands")?;
        Self::line::<Cd>(out)?;
        Self::line::<Cwd>(out)?;
        Self::line::<Help>(out)?;
        Self::line::<Exit>(out)?;
        writeln!(out, "Anything else is run as an external program.")?;
        Ok(true)
    }
}

#[derive(FromArgs)]
/// Exit shell process
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn aliases() -> &'static [&'static str] {
        &["sayonara"]
    }

    fn summary() -> &'static str {
        "end the session"
    }

    fn execute(self, streams: &mut Streams, _env: &mut Environment) -> Result<bool> {
        writeln!(streams.out, "Closing cshell ...")?;
        Ok(false)
    }
}
