use crate::pipeline::traits::SentenceSplitter;

/// Splits on `.`, `!` or `?` followed by whitespace or the end of the text.
///
/// Whitespace runs inside a sentence collapse to one space so that every
/// sentence fits on one subtitle line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminatorSplitter;

impl SentenceSplitter for TerminatorSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        split_sentences(text)
    }
}

pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            if !current.is_empty() && !current.ends_with(' ') {
                current.push(' ');
            }
            continue;
        }
        current.push(c);
        let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            sentences.push(std::mem::take(&mut current));
        }
    }

    let rest = current.trim_end();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}
