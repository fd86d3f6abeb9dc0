//! Search result records.
//!
//! A [`SearchMatch`] is what the reporter streams for every (file, region)
//! pair. [`SearchSummary`] groups a finished stream per file for display.
use serde::{Deserialize, Serialize};

use crate::document::Range;
use crate::index::FileId;

/// The line a match starts on, with the match highlighted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Full text of the match's starting line
    pub text: String,
    /// Highlight within `text`. Always on line 0 of the preview; the columns
    /// are the match's start and end columns, even when the match ends on a
    /// later line.
    pub matches: Range,
}

/// A single reported match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub file: FileId,
    /// Location of the match in the file
    pub range: Range,
    pub preview: Preview,
}

/// Signals the end of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchComplete {
    /// Whether a result cap cut the search short. Never set: there is no cap.
    pub limit_hit: bool,
}

/// All matches reported for one file, in report order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub file: FileId,
    pub matches: Vec<SearchMatch>,
}

/// Reported matches grouped by file
#[derive(Debug, Clone, Default)]
pub struct SearchSummary {
    /// Results per file, in the order each file was first seen
    pub file_results: Vec<FileResult>,
    /// Total number of matches
    pub total_matches: usize,
    /// Total number of files with matches
    pub files_with_matches: usize,
}

impl SearchSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Groups a stream of matches by file, keeping each file's match order
    pub fn from_matches(matches: impl IntoIterator<Item = SearchMatch>) -> Self {
        let mut summary = Self::new();
        for m in matches {
            summary.add_match(m);
        }
        summary
    }

    /// Orders the per-file results by file identifier. Matches within a
    /// file keep their report order.
    pub fn sort_by_file(&mut self) {
        self.file_results.sort_by(|a, b| a.file.cmp(&b.file));
    }

    pub fn add_match(&mut self, m: SearchMatch) {
        self.total_matches += 1;
        match self.file_results.iter_mut().find(|r| r.file == m.file) {
            Some(result) => result.matches.push(m),
            None => {
                self.files_with_matches += 1;
                self.file_results.push(FileResult {
                    file: m.file.clone(),
                    matches: vec![m],
                });
            }
        }
    }
}
