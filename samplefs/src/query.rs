//! Multi-word AND queries over the inverted index.
//!
//! A file matches when it contains every query word as a whole word,
//! anywhere and in any order. This is not phrase matching: word positions
//! are never compared with each other.
//!
//! For a matching file the regions are concatenated per query word, in
//! query order, without re-sorting:
//!
//! ```text
//! query "hello world", file "To the world, hello to you!"
//!   hello -> [14..19]
//!   world -> [7..12]
//!   result -> [14..19, 7..12]
//! ```
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::index::{FileId, InvertedIndex, MatchRegion};
use crate::tokenizer::query_words;

/// Matching files and their concatenated regions
pub type QueryResult = BTreeMap<FileId, Vec<MatchRegion>>;

/// A parsed query: lowercased words in the order they were typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    words: Vec<String>,
}

impl Query {
    /// Splits a raw query on whitespace. Repeated words are kept.
    pub fn parse(raw: &str) -> Self {
        Self {
            words: query_words(raw),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Runs the query against `index`.
    ///
    /// An empty query matches no files. A word absent from the index empties
    /// the result. A word repeated in the query contributes its regions once
    /// per occurrence.
    pub fn execute(&self, index: &InvertedIndex) -> QueryResult {
        let mut words = self.words.iter();
        let Some(first) = words.next() else {
            debug!("Empty query, no files match");
            return QueryResult::new();
        };

        let mut result = index.postings(first).cloned().unwrap_or_default();
        trace!("'{}' matched {} files", first, result.len());

        for word in words {
            if result.is_empty() {
                break;
            }
            let Some(postings) = index.postings(word) else {
                trace!("'{}' matched no files", word);
                result.clear();
                break;
            };

            result.retain(|file, _| postings.contains_key(file));
            for (file, regions) in result.iter_mut() {
                if let Some(more) = postings.get(file) {
                    regions.extend_from_slice(more);
                }
            }
            trace!("'{}' narrowed the result to {} files", word, result.len());
        }

        debug!(
            "Query {:?} matched {} files",
            self.words,
            result.len()
        );
        result
    }
}
