use cshell::Interpreter;
use cshell::config::Args;
use cshell::logging;
use cshell::reader::{EditorSource, ReaderSource};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let config = argh::from_env::<Args>().into_config();
    logging::init_tracing(config.log_file.as_deref());

    if config.banner {
        println!("\t\t\t\t <<-- This is C-SHELL -->> ");
    }

    let mut interpreter = Interpreter::from_config(&config);
    let end = if io::stdin().is_terminal() {
        let mut source = EditorSource::new()
            .map_err(|err| anyhow::anyhow!("failed to start line editor: {}", err))?;
        interpreter.run(&mut source)
    } else {
        let mut source = ReaderSource::new(io::stdin().lock());
        interpreter.run(&mut source)
    };

    Ok(if end.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
