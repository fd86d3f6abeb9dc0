use once_cell::sync::Lazy;
use regex::{Matches, Regex};

/// A maximal run of word characters (Unicode `\w`: alphanumerics, marks and
/// connector punctuation, which includes `_`)
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+").expect("word pattern is a valid regex"));

/// A single whole-word occurrence in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The lowercased word
    pub word: String,
    /// Character offset of the first character of the word
    pub start: usize,
    /// Character offset one past the last character of the word
    pub end: usize,
}

/// Splits `text` into lowercased whole-word tokens, left to right.
///
/// Offsets are character (not byte) offsets into the original text. The
/// iterator is lazy and scans the input once; calling `tokenize` again
/// restarts the scan.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        matches: WORD_PATTERN.find_iter(text),
        byte_cursor: 0,
        char_cursor: 0,
    }
}

/// Iterator returned by [`tokenize`]
#[derive(Debug)]
pub struct Tokens<'t> {
    text: &'t str,
    matches: Matches<'static, 't>,
    // Byte and char offset of the end of the previous match
    byte_cursor: usize,
    char_cursor: usize,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let m = self.matches.next()?;
        let start = self.char_cursor + self.text[self.byte_cursor..m.start()].chars().count();
        let end = start + m.as_str().chars().count();
        self.byte_cursor = m.end();
        self.char_cursor = end;
        Some(Token {
            word: m.as_str().to_lowercase(),
            start,
            end,
        })
    }
}

/// Splits a raw query on runs of whitespace and lowercases each word.
///
/// An empty or whitespace-only query yields no words.
pub fn query_words(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}
