use crate::external::LaunchError;
use crate::lexer::ParseError;
use std::fmt;
use std::io::{self, Write};
use std::process::ExitStatus;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// The two independent output channels of a session.
///
/// `out` carries normal output (prompts, builtin results); `err` carries
/// one line per diagnostic.
pub struct Streams {
    pub out: Box<dyn Write>,
    pub err: Box<dyn Write>,
}

impl Streams {
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self { out, err }
    }

    /// Standard output and standard error of the current process.
    pub fn inherit() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Writes a single `cshell: ...` line to the diagnostic channel.
    ///
    /// A failing diagnostic channel has nowhere left to report to, so write
    /// errors are dropped.
    pub fn diagnostic(&mut self, message: impl fmt::Display) {
        let _ = writeln!(self.err, "cshell: {}", message);
        let _ = self.err.flush();
    }
}

/// How a foreground child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(ExitCode),
    Signaled { signal: i32, core_dumped: bool },
}

impl Termination {
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Termination::Exited(code),
            None => terminated_by_signal(status),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> Termination {
    use std::os::unix::process::ExitStatusExt;
    Termination::Signaled {
        signal: status.signal().unwrap_or(-1),
        core_dumped: status.core_dumped(),
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> Termination {
    Termination::Signaled {
        signal: -1,
        core_dumped: false,
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exited with status {}", code),
            Termination::Signaled { signal, core_dumped } => {
                write!(f, "terminated by signal {}", signal)?;
                if *core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of dispatching one line; drives whether the session continues.
#[derive(Debug)]
pub enum CommandOutcome {
    BuiltinHandled {
        continue_session: bool,
    },
    Launched {
        program: String,
        termination: Termination,
    },
    LaunchFailed(LaunchError),
    ParseError(ParseError),
}

impl CommandOutcome {
    pub fn continues_session(&self) -> bool {
        match self {
            CommandOutcome::BuiltinHandled { continue_session } => *continue_session,
            _ => true,
        }
    }

    /// The diagnostic line for this outcome, if it warrants one.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            CommandOutcome::BuiltinHandled { .. } => None,
            CommandOutcome::Launched { termination, .. } if termination.success() => None,
            CommandOutcome::Launched {
                program,
                termination,
            } => Some(format!("{}: {}", program, termination)),
            CommandOutcome::LaunchFailed(err) => Some(err.to_string()),
            CommandOutcome::ParseError(err) => Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Exited(2).to_string(), "exited with status 2");
        assert_eq!(
            Termination::Signaled {
                signal: 11,
                core_dumped: true
            }
            .to_string(),
            "terminated by signal 11 (core dumped)"
        );
    }

    #[test]
    fn test_only_exit_builtin_stops_session() {
        let stop = CommandOutcome::BuiltinHandled {
            continue_session: false,
        };
        assert!(!stop.continues_session());

        let failed = CommandOutcome::LaunchFailed(LaunchError::NotFound {
            program: "nope".to_string(),
        });
        assert!(failed.continues_session());

        let signaled = CommandOutcome::Launched {
            program: "sleep".to_string(),
            termination: Termination::Signaled {
                signal: 9,
                core_dumped: false,
            },
        };
        assert!(signaled.continues_session());
    }

    #[test]
    fn test_diagnostics() {
        let ok = CommandOutcome::Launched {
            program: "true".to_string(),
            termination: Termination::Exited(0),
        };
        assert_eq!(ok.diagnostic(), None);

        let failed = CommandOutcome::Launched {
            program: "false".to_string(),
            termination: Termination::Exited(1),
        };
        assert_eq!(
            failed.diagnostic().as_deref(),
            Some("false: exited with status 1")
        );

        let parse = CommandOutcome::ParseError(ParseError::UnbalancedQuote {
            quote: '"',
            column: 3,
        });
        assert_eq!(
            parse.diagnostic().as_deref(),
            Some("unbalanced \" quote starting at column 3")
        );
    }

    #[test]
    fn test_streams_diagnostic_prefix() {
        let (out, _out_buf) = crate::io_adapters::MemWriter::with_handle();
        let (err, err_buf) = crate::io_adapters::MemWriter::with_handle();
        let mut streams = Streams::new(Box::new(out), Box::new(err));
        streams.diagnostic("boom");
        assert_eq!(err_buf.borrow().as_slice(), b"cshell: boom\n");
    }
}
