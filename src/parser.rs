use crate::lexer::{self, ParseError, QuoteSpan, WordSpan};

/// Ordered argument list of one command; the first element is the program name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The command name, if any.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentVector {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Splits a trimmed command line into an [`ArgumentVector`].
///
/// Quoted spans become single tokens with the quotes removed and their inner
/// whitespace preserved. Adjacent spans are kept as separate tokens. Unquoted
/// text touching a span is not dropped in favour of the span: `pre'mid'post`
/// yields `pre`, `mid` and `post` rather than just `mid`. An unbalanced quote
/// yields an error and no vector at all.
///
/// ```
/// use cshell::parser::tokenize;
/// let argv = tokenize("echo 'hello world'").unwrap();
/// assert_eq!(argv.into_vec(), vec!["echo", "hello world"]);
/// ```
pub fn tokenize(line: &str) -> Result<ArgumentVector, ParseError> {
    let spans = lexer::scan_quotes(line)?;
    let words = lexer::split_words(line);
    Ok(ArgumentVector(reconcile(line, &words, &spans)))
}

/// Merges the whitespace-split words with the quote spans.
///
/// A span is emitted once, at the word holding its opening quote; words that
/// lie inside an already emitted span contribute nothing.
fn reconcile(line: &str, words: &[WordSpan], spans: &[QuoteSpan]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(words.len());
    let mut next_span = 0;
    // Byte offset just past the last emitted span.
    let mut consumed = 0;

    for word in words {
        let mut pos = word.start.max(consumed);
        while pos < word.end {
            match spans.get(next_span) {
                Some(span) if span.open < word.end => {
                    if pos < span.open {
                        tokens.push(line[pos..span.open].to_owned());
                    }
                    tokens.push(span.inner(line).to_owned());
                    pos = span.close + 1;
                    next_span += 1;
                }
                _ => {
                    tokens.push(line[pos..word.end].to_owned());
                    pos = word.end;
                }
            }
        }
        consumed = consumed.max(pos);
    }

    tokens
}
