//! Command-line and environment configuration for the `cshell` binary.

use argh::FromArgs;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "> ";
/// Overrides the prompt when `--prompt` is not given.
pub const PROMPT_ENV: &str = "CSHELL_PROMPT";
/// Log file path used when `--log-file` is not given.
pub const LOG_ENV: &str = "CSHELL_LOG";

#[derive(FromArgs, Debug)]
/// A small interactive command interpreter.
pub struct Args {
    #[argh(option)]
    /// text shown before each command line.
    pub prompt: Option<String>,

    #[argh(switch)]
    /// do not print the startup banner.
    pub no_banner: bool,

    #[argh(switch)]
    /// ask whether to restart once a session ends.
    pub offer_restart: bool,

    #[argh(option)]
    /// write trace logs to this file; filtered by RUST_LOG.
    pub log_file: Option<PathBuf>,
}

/// Resolved settings for one run of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub banner: bool,
    pub offer_restart: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            banner: true,
            offer_restart: false,
            log_file: None,
        }
    }
}

impl Args {
    /// Resolve against the process environment.
    pub fn into_config(self) -> Config {
        self.resolve(|key| env::var_os(key).and_then(|v| v.into_string().ok()))
    }

    /// Resolve with `lookup` standing in for the environment.
    pub fn resolve(self, lookup: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            prompt: self
                .prompt
                .or_else(|| lookup(PROMPT_ENV))
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            banner: !self.no_banner,
            offer_restart: self.offer_restart,
            log_file: self
                .log_file
                .or_else(|| lookup(LOG_ENV).filter(|p| !p.is_empty()).map(PathBuf::from)),
        }
    }
}
