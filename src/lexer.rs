//! Lexical analysis of a single command line.
//!
//! The lexer produces two independent views of the same line: the quote spans
//! found by a left-to-right scan, and the plain words obtained by splitting on
//! runs of delimiters. [`crate::parser`] reconciles the two into the final
//! argument vector.

use thiserror::Error;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quote was opened and the line ended before the matching quote.
    ///
    /// `column` is the 1-based character position of the opening quote.
    #[error("unbalanced {quote} quote starting at column {column}")]
    UnbalancedQuote { quote: char, column: usize },
}

/// A region of the line enclosed by a matching pair of identical quotes.
///
/// `open` and `close` are byte offsets of the quote characters themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteSpan {
    pub open: usize,
    pub close: usize,
    pub quote: char,
}

impl QuoteSpan {
    /// The text between the quotes, with both quotes stripped.
    pub fn inner<'a>(&self, line: &'a str) -> &'a str {
        // Both quote characters are ASCII, so `open + 1` is a char boundary.
        &line[self.open + 1..self.close]
    }
}

/// Byte range of a maximal run of non-delimiter characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    InSingle(usize),
    InDouble(usize),
}

/// Characters that separate plain words.
pub fn is_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x07')
}

/// Finds every quote span in `line`, in order of appearance.
///
/// A quote of the other kind inside an active span is an ordinary character.
/// Fails if the line ends while a span is still open.
pub fn scan_quotes(line: &str) -> Result<Vec<QuoteSpan>, ParseError> {
    let mut spans = Vec::new();
    let mut state = QuoteState::Unquoted;

    for (pos, ch) in line.char_indices() {
        state = match (state, ch) {
            (QuoteState::Unquoted, '\'') => QuoteState::InSingle(pos),
            (QuoteState::Unquoted, '"') => QuoteState::InDouble(pos),
            (QuoteState::InSingle(open), '\'') | (QuoteState::InDouble(open), '"') => {
                spans.push(QuoteSpan {
                    open,
                    close: pos,
                    quote: ch,
                });
                QuoteState::Unquoted
            }
            (current, _) => current,
        };
    }

    match state {
        QuoteState::Unquoted => Ok(spans),
        QuoteState::InSingle(open) => Err(unbalanced(line, '\'', open)),
        QuoteState::InDouble(open) => Err(unbalanced(line, '"', open)),
    }
}

fn unbalanced(line: &str, quote: char, open: usize) -> ParseError {
    ParseError::UnbalancedQuote {
        quote,
        column: line[..open].chars().count() + 1,
    }
}

/// Splits `line` on runs of delimiters, ignoring quotes entirely.
pub fn split_words(line: &str) -> Vec<WordSpan> {
    let mut words = Vec::new();
    let mut start = None;

    for (pos, ch) in line.char_indices() {
        match (start, is_delimiter(ch)) {
            (None, false) => start = Some(pos),
            (Some(begin), true) => {
                words.push(WordSpan { start: begin, end: pos });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push(WordSpan {
            start: begin,
            end: line.len(),
        });
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<&str> {
        split_words(line)
            .into_iter()
            .map(|w| &line[w.start..w.end])
            .collect()
    }

    #[test]
    fn test_scan_finds_single_and_double_spans() {
        let line = r#"echo 'a b' "c""#;
        let spans = scan_quotes(line).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].quote, '\'');
        assert_eq!(spans[0].inner(line), "a b");
        assert_eq!(spans[1].quote, '"');
        assert_eq!(spans[1].inner(line), "c");
    }

    #[test]
    fn test_other_quote_is_literal_inside_span() {
        let line = r#"say "it's" 'a "b" c'"#;
        let spans = scan_quotes(line).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].inner(line), "it's");
        assert_eq!(spans[1].inner(line), r#"a "b" c"#);
    }

    #[test]
    fn test_unbalanced_single_quote_reports_column() {
        let err = scan_quotes("echo 'unterminated").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnbalancedQuote {
                quote: '\'',
                column: 6
            }
        );
    }

    #[test]
    fn test_unbalanced_double_after_closed_single() {
        let err = scan_quotes(r#"'ok' "open"#).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnbalancedQuote {
                quote: '"',
                column: 6
            }
        );
    }

    #[test]
    fn test_column_counts_chars_not_bytes() {
        let err = scan_quotes("échо 'x").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnbalancedQuote {
                quote: '\'',
                column: 6
            }
        );
    }

    #[test]
    fn test_no_quotes_no_spans() {
        assert!(scan_quotes("ls -la /tmp").unwrap().is_empty());
        assert!(scan_quotes("").unwrap().is_empty());
    }

    #[test]
    fn test_split_words_on_delimiter_runs() {
        assert_eq!(words("ls   -l\t\t/tmp"), vec!["ls", "-l", "/tmp"]);
        assert_eq!(words("a\x07b\r\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_words_keeps_quotes_in_words() {
        assert_eq!(words("echo 'hello world'"), vec!["echo", "'hello", "world'"]);
    }

    #[test]
    fn test_split_words_blank_line() {
        assert!(split_words("").is_empty());
        assert!(split_words(" \t ").is_empty());
    }
}
