//! Line acquisition from a byte stream or an interactive line editor.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Capacity a fresh line buffer starts with.
pub const INITIAL_CAPACITY: usize = 1024;
/// Amount the line buffer grows by whenever it fills up.
pub const GROWTH_INCREMENT: usize = 1024;

/// One line of input with the terminator removed and surrounding whitespace trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLine(String);

impl RawLine {
    pub fn new(text: &str) -> Self {
        Self(text.trim().to_owned())
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(&String::from_utf8_lossy(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a single read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(RawLine),
    /// Input ended before any character of a new line was read.
    EndOfInput,
}

#[derive(Debug, Error)]
pub enum AcquireError {
    /// The line buffer could not grow. Nothing more can be read.
    #[error("allocation error: could not grow line buffer to {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("line editor failed: {0}")]
    Editor(#[from] ReadlineError),
}

/// Source of command lines for a session.
pub trait LineSource {
    /// Shows `prompt` to the user ahead of the next read.
    fn prompt(&mut self, prompt: &str, out: &mut dyn Write) -> io::Result<()>;

    /// Blocks until a full line or the end of input is available.
    fn next_line(&mut self) -> Result<Line, AcquireError>;
}

/// Reads lines from any buffered byte stream, such as a locked stdin or a `Cursor`.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn prompt(&mut self, prompt: &str, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(prompt.as_bytes())?;
        out.flush()
    }

    fn next_line(&mut self) -> Result<Line, AcquireError> {
        let mut buffer = Vec::new();
        grow(&mut buffer, INITIAL_CAPACITY)?;
        let mut saw_input = false;

        loop {
            let chunk = match self.reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if chunk.is_empty() {
                break;
            }
            saw_input = true;

            let (taken, used, complete) = match chunk.iter().position(|&b| b == b'\n') {
                Some(newline) => (newline, newline + 1, true),
                None => (chunk.len(), chunk.len(), false),
            };
            grow(&mut buffer, taken)?;
            buffer.extend_from_slice(&chunk[..taken]);
            self.reader.consume(used);

            if complete {
                return Ok(Line::Text(RawLine::from_bytes(&buffer)));
            }
        }

        if saw_input {
            Ok(Line::Text(RawLine::from_bytes(&buffer)))
        } else {
            Ok(Line::EndOfInput)
        }
    }
}

/// Makes room for `additional` more bytes, growing capacity in fixed increments.
fn grow(buffer: &mut Vec<u8>, additional: usize) -> Result<(), AcquireError> {
    let needed = buffer.len() + additional;
    if needed <= buffer.capacity() {
        return Ok(());
    }
    let mut target = buffer.capacity().max(INITIAL_CAPACITY);
    while target < needed {
        target += GROWTH_INCREMENT;
    }
    buffer
        .try_reserve_exact(target - buffer.len())
        .map_err(|_| AcquireError::OutOfMemory { requested: target })
}

/// Interactive source backed by [`rustyline`]. No history is kept.
pub struct EditorSource {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorSource {
    pub fn new() -> Result<Self, AcquireError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            prompt: String::new(),
        })
    }
}

impl LineSource for EditorSource {
    fn prompt(&mut self, prompt: &str, _out: &mut dyn Write) -> io::Result<()> {
        prompt.clone_into(&mut self.prompt);
        Ok(())
    }

    fn next_line(&mut self) -> Result<Line, AcquireError> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => Ok(Line::Text(RawLine::new(&line))),
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Line::Text(RawLine::default())),
            Err(ReadlineError::Eof) => Ok(Line::EndOfInput),
            Err(err) => Err(err.into()),
        }
    }
}
