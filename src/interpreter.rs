use crate::builtin::BuiltinRegistry;
use crate::command::{CommandOutcome, Streams};
use crate::config::Config;
use crate::env::Environment;
use crate::external::{ForegroundLauncher, Launcher};
use crate::parser::{self, ArgumentVector};
use crate::reader::{AcquireError, Line, LineSource, RawLine};
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Where the session loop currently is.
#[derive(Debug)]
pub enum State {
    Prompting,
    Reading,
    Parsing(RawLine),
    Dispatching(ArgumentVector),
    Reporting(CommandOutcome),
    Ended(SessionEnd),
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A builtin asked to stop.
    Exited,
    EndOfInput,
    /// Reading input failed; nothing more can be read.
    InputFailed,
    /// The line buffer could not grow.
    OutOfMemory,
}

impl SessionEnd {
    /// Whether the program should terminate with a failure status.
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionEnd::InputFailed | SessionEnd::OutOfMemory)
    }
}

/// Answer given at the restart prompt once a session has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartChoice {
    Restart,
    Exit,
}

pub const RESTART_PROMPT: &str = "restart or exit? ";

/// A minimal shell-like interpreter that runs built-in and external commands.
///
/// The interpreter owns an [`Environment`], a [`BuiltinRegistry`] consulted
/// first for every command name, and a [`Launcher`] used for everything else.
///
/// Example
/// ```
/// use cshell::Interpreter;
/// let mut sh = Interpreter::default();
/// assert!(sh.run_line("   "));
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinRegistry,
    launcher: Box<dyn Launcher>,
    streams: Streams,
    prompt: String,
    offer_restart: bool,
}

impl Interpreter {
    /// Create a new interpreter with a custom builtin set, launcher and channels.
    pub fn new(builtins: BuiltinRegistry, launcher: Box<dyn Launcher>, streams: Streams) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            launcher,
            streams,
            prompt: Config::default().prompt,
            offer_restart: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::default()
            .with_prompt(&config.prompt)
            .with_restart_prompt(config.offer_restart)
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        prompt.clone_into(&mut self.prompt);
        self
    }

    /// When enabled, the user is asked whether to restart after each session.
    pub fn with_restart_prompt(mut self, offer_restart: bool) -> Self {
        self.offer_restart = offer_restart;
        self
    }

    /// Run sessions until the user is done.
    ///
    /// Returns how the last session ended. Fatal ends never offer a restart.
    pub fn run(&mut self, source: &mut dyn LineSource) -> SessionEnd {
        loop {
            let end = self.run_session(source);
            if !self.offer_restart || end.is_failure() {
                return end;
            }
            match self.await_restart_choice(source) {
                RestartChoice::Restart => info!("restarting session"),
                RestartChoice::Exit => return end,
            }
        }
    }

    /// Run one session from the first prompt until it ends.
    pub fn run_session(&mut self, source: &mut dyn LineSource) -> SessionEnd {
        info!("session started");
        let mut state = State::Prompting;
        loop {
            state = match self.step(state, source) {
                State::Ended(end) => {
                    info!(?end, "session ended");
                    return end;
                }
                next => next,
            };
        }
    }

    /// Parse, dispatch and report a single line.
    ///
    /// Returns whether the session would continue afterwards.
    pub fn run_line(&mut self, line: &str) -> bool {
        // Parsing never reads input, so the source is never touched.
        let mut exhausted = crate::reader::ReaderSource::new(std::io::empty());
        let mut state = State::Parsing(RawLine::new(line));
        loop {
            state = match self.step(state, &mut exhausted) {
                State::Prompting => return true,
                State::Ended(_) => return false,
                next => next,
            };
        }
    }

    /// Perform one transition of the session state machine.
    pub fn step(&mut self, state: State, source: &mut dyn LineSource) -> State {
        match state {
            State::Prompting => match source.prompt(&self.prompt, &mut *self.streams.out) {
                Ok(()) => State::Reading,
                Err(err) => {
                    self.streams.diagnostic(format_args!("failed to show prompt: {}", err));
                    State::Ended(SessionEnd::InputFailed)
                }
            },
            State::Reading => match source.next_line() {
                Ok(Line::Text(line)) => {
                    debug!(line = line.as_str(), "read command line");
                    State::Parsing(line)
                }
                Ok(Line::EndOfInput) => State::Ended(SessionEnd::EndOfInput),
                Err(err @ AcquireError::OutOfMemory { .. }) => {
                    error!(%err, "fatal allocation failure");
                    self.streams.diagnostic(&err);
                    State::Ended(SessionEnd::OutOfMemory)
                }
                Err(err) => {
                    warn!(%err, "input failed");
                    self.streams.diagnostic(&err);
                    State::Ended(SessionEnd::InputFailed)
                }
            },
            State::Parsing(line) => match parser::tokenize(line.as_str()) {
                Ok(argv) if argv.is_empty() => State::Prompting,
                Ok(argv) => {
                    debug!(tokens = ?argv.as_slice(), "tokenized");
                    State::Dispatching(argv)
                }
                Err(err) => {
                    debug!(%err, "parse error");
                    self.streams.diagnostic(&err);
                    State::Prompting
                }
            },
            State::Dispatching(argv) => State::Reporting(self.dispatch(&argv)),
            State::Reporting(outcome) => {
                if let Some(message) = outcome.diagnostic() {
                    self.streams.diagnostic(message);
                }
                if outcome.continues_session() {
                    State::Prompting
                } else {
                    State::Ended(SessionEnd::Exited)
                }
            }
            ended @ State::Ended(_) => ended,
        }
    }

    fn dispatch(&mut self, argv: &ArgumentVector) -> CommandOutcome {
        let program = argv.program().unwrap_or_default();
        if let Some(handler) = self.builtins.lookup(program) {
            let continue_session = handler.run(argv, &mut self.streams, &mut self.env);
            let _ = self.streams.out.flush();
            return CommandOutcome::BuiltinHandled { continue_session };
        }

        // The child writes straight to the inherited stdout.
        let _ = self.streams.out.flush();
        match self.launcher.launch(argv, &self.env) {
            Ok(termination) => CommandOutcome::Launched {
                program: program.to_owned(),
                termination,
            },
            Err(err) => CommandOutcome::LaunchFailed(err),
        }
    }

    /// Ask whether to start another session.
    ///
    /// Unrecognised answers re-prompt; end of input or a read failure means exit.
    pub fn await_restart_choice(&mut self, source: &mut dyn LineSource) -> RestartChoice {
        loop {
            if source.prompt(RESTART_PROMPT, &mut *self.streams.out).is_err() {
                return RestartChoice::Exit;
            }
            match source.next_line() {
                Ok(Line::Text(line)) => match line.as_str() {
                    "restart" | "r" => return RestartChoice::Restart,
                    "exit" | "e" => return RestartChoice::Exit,
                    _ => continue,
                },
                Ok(Line::EndOfInput) | Err(_) => return RestartChoice::Exit,
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default builtins, the foreground
    /// launcher and the process's standard streams.
    fn default() -> Self {
        Self::new(
            BuiltinRegistry::default(),
            Box::new(ForegroundLauncher),
            Streams::inherit(),
        )
    }
}
