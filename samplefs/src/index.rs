//! Whole-word inverted index over the contents of a virtual tree.
//!
//! The index maps each lowercased word to its posting list: for every file
//! containing the word, the ordered list of regions where it occurs.
//!
//! ```text
//! "hello" -> { "readme.md"    -> [0..5],
//!              "src/hello.py" -> [7..12] }
//! ```
//!
//! It is built once, eagerly, by a full traversal of the tree and is never
//! updated afterwards. A different tree needs a new index.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

use crate::tokenizer::tokenize;
use crate::tree::VirtualNode;

/// Root-relative path of a leaf, e.g. `src/hello.py`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the identifier as a URI under `scheme`, e.g. `samplefs:///src/hello.py`
    pub fn to_uri(&self, scheme: &str) -> String {
        format!("{}:///{}", scheme, self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Half-open character range `[start, end)` of one word occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRegion {
    pub start: usize,
    pub end: usize,
}

impl MatchRegion {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Regions of one word, per file
pub type PostingList = BTreeMap<FileId, Vec<MatchRegion>>;

/// Word → file → ascending regions
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingList>,
    files: Vec<FileId>,
}

impl InvertedIndex {
    /// Builds the index for every leaf under `root`.
    ///
    /// Leaves are tokenized in parallel, each by a single left-to-right scan,
    /// so every per-file region list comes out sorted by `start`.
    pub fn build(root: &VirtualNode) -> Self {
        let leaves = root.leaves();
        debug!("Indexing {} files", leaves.len());

        let tokenized: Vec<(FileId, Vec<(String, MatchRegion)>)> = leaves
            .par_iter()
            .map(|(path, content)| {
                let tokens = tokenize(content)
                    .map(|t| (t.word, MatchRegion::new(t.start, t.end)))
                    .collect();
                (FileId::new(path.as_str()), tokens)
            })
            .collect();

        let mut index = InvertedIndex::default();
        for (file, tokens) in tokenized {
            for (word, region) in tokens {
                index
                    .postings
                    .entry(word)
                    .or_default()
                    .entry(file.clone())
                    .or_default()
                    .push(region);
            }
            index.files.push(file);
        }

        info!(
            "Indexed {} words across {} files",
            index.postings.len(),
            index.files.len()
        );
        index
    }

    /// Posting list for an already-lowercased word, if any file contains it
    pub fn postings(&self, word: &str) -> Option<&PostingList> {
        self.postings.get(word)
    }

    /// Every indexed file, in traversal order
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// Number of distinct words
    pub fn word_count(&self) -> usize {
        self.postings.len()
    }
}
