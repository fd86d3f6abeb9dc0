//! Result reporting: turns a query result into streamed [`SearchMatch`] records.
//!
//! Files are reported in parallel on the rayon pool; no order is promised
//! across files. Within one file the regions are reported strictly in the
//! order the query produced them.
//!
//! Each record is handed to the caller's [`ProgressSink`] as soon as it is
//! built and mirrored as one line on the [`OutputChannel`]:
//!
//! ```text
//! samplefs:///src/hello.py (0, 7) (0, 12)
//! ```
//!
//! A [`CancellationToken`] is checked before each file and each region.
//! Cancelling stops the remaining work; records already delivered stay
//! delivered.
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::document::{Position, Range, TextDocument};
use crate::errors::FsResult;
use crate::index::{FileId, MatchRegion};
use crate::metrics::SearchMetrics;
use crate::output::OutputChannel;
use crate::query::QueryResult;
use crate::results::{Preview, SearchComplete, SearchMatch};

/// Receives search matches as they are produced
pub trait ProgressSink: Sync {
    fn report(&self, m: SearchMatch);
}

impl ProgressSink for Mutex<Vec<SearchMatch>> {
    fn report(&self, m: SearchMatch) {
        match self.lock() {
            Ok(mut matches) => matches.push(m),
            Err(poisoned) => poisoned.into_inner().push(m),
        }
    }
}

impl ProgressSink for Sender<SearchMatch> {
    fn report(&self, m: SearchMatch) {
        // A dropped receiver means nobody is listening any more
        if self.send(m).is_err() {
            trace!("Progress receiver dropped, discarding match");
        }
    }
}

/// Opens the line index of a file's content
pub trait DocumentProvider: Sync {
    fn open_document(&self, file: &FileId) -> FsResult<Arc<TextDocument>>;
}

/// Converts query results to positions and streams them out
pub struct ResultReporter<'a> {
    documents: &'a dyn DocumentProvider,
    output: &'a dyn OutputChannel,
    metrics: &'a SearchMetrics,
    scheme: &'a str,
}

impl<'a> ResultReporter<'a> {
    pub fn new(
        documents: &'a dyn DocumentProvider,
        output: &'a dyn OutputChannel,
        metrics: &'a SearchMetrics,
        scheme: &'a str,
    ) -> Self {
        Self {
            documents,
            output,
            metrics,
            scheme,
        }
    }

    /// Reports every (file, region) pair of `result` to `sink`.
    ///
    /// Fails only when a region cannot be mapped into its document, which
    /// means the index and the tree disagree.
    pub fn report(
        &self,
        result: &QueryResult,
        sink: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> FsResult<SearchComplete> {
        debug!("Reporting matches in {} files", result.len());

        let skipped = AtomicBool::new(false);
        result.par_iter().try_for_each(|(file, regions)| -> FsResult<()> {
            if !self.report_file(file, regions, sink, token)? {
                skipped.store(true, Ordering::Relaxed);
            }
            Ok(())
        })?;

        if skipped.load(Ordering::Relaxed) {
            debug!("Search cancelled, partial results were reported");
            self.metrics.record_cancellation();
        }
        Ok(SearchComplete { limit_hit: false })
    }

    /// Reports one file's regions. Returns `false` when cancellation cut
    /// the file short.
    fn report_file(
        &self,
        file: &FileId,
        regions: &[MatchRegion],
        sink: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> FsResult<bool> {
        if token.is_cancelled() {
            return Ok(false);
        }
        let document = self.documents.open_document(file)?;
        self.metrics.record_file();

        for region in regions {
            if token.is_cancelled() {
                trace!("Cancelled while reporting {}", file);
                return Ok(false);
            }
            let m = build_match(file, &document, *region)?;
            self.output.append_line(&format_match_line(
                &file.to_uri(self.scheme),
                m.range,
            ));
            sink.report(m);
            self.metrics.record_match();
        }
        Ok(true)
    }
}

/// Builds the record for one region.
///
/// The preview highlight uses the start and end columns on the starting
/// line, so a match that spans lines gets a truncated highlight.
pub fn build_match(
    file: &FileId,
    document: &TextDocument,
    region: MatchRegion,
) -> FsResult<SearchMatch> {
    let start = document.position_at(region.start)?;
    let end = document.position_at(region.end)?;
    let line = document.line_at(start.line)?;

    Ok(SearchMatch {
        file: file.clone(),
        range: Range::new(start, end),
        preview: Preview {
            text: line.to_string(),
            matches: Range::new(
                Position::new(0, start.character),
                Position::new(0, end.character),
            ),
        },
    })
}

/// `<uri> (<line>, <col>) (<line>, <col>)`
pub fn format_match_line(uri: &str, range: Range) -> String {
    format!(
        "{} ({}, {}) ({}, {})",
        uri, range.start.line, range.start.character, range.end.line, range.end.character
    )
}
