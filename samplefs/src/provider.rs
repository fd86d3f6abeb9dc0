//! The read-only filesystem and text search provider over a virtual tree.
//!
//! [`SampleFileSystem`] owns the tree and its inverted index, both built
//! once at construction and only read afterwards, so a single instance can
//! serve concurrent reads and searches without locking. The only shared
//! mutable state is the open-document cache and the metrics counters.
//!
//! ```rust,ignore
//! let fs = SampleFileSystem::activate(&SampleFsConfig::load()?, Arc::new(TracingChannel))?;
//! let bytes = fs.read_file("/src/hello.py")?;
//! let matches = fs.search("hello world", &CancellationToken::new())?;
//! ```
use dashmap::DashMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace};

use crate::cancel::CancellationToken;
use crate::config::SampleFsConfig;
use crate::document::TextDocument;
use crate::errors::{FsError, FsResult};
use crate::index::{FileId, InvertedIndex};
use crate::metrics::SearchMetrics;
use crate::output::OutputChannel;
use crate::query::Query;
use crate::results::{SearchComplete, SearchMatch};
use crate::search::{DocumentProvider, ProgressSink, ResultReporter};
use crate::tree::{load_disk, FileType, VirtualNode};

/// Metadata returned by `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub file_type: FileType,
    /// Always zero: the tree has no history
    pub ctime: u64,
    /// Always zero: the tree has no history
    pub mtime: u64,
    /// Byte length for files, number of children for directories
    pub size: u64,
}

/// Options a host registers the provider with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub is_case_sensitive: bool,
    pub is_readonly: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub recursive: bool,
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub create: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteOptions {
    pub overwrite: bool,
}

/// A change subscription. The tree never changes, so it never fires.
#[derive(Debug)]
#[must_use = "dropping a subscription disposes it"]
pub struct Subscription {
    path: String,
}

impl Subscription {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn dispose(self) {}
}

/// The filesystem contract a host consumes
pub trait FileSystemProvider {
    fn watch(&self, path: &str, options: &WatchOptions) -> Subscription;
    fn stat(&self, path: &str) -> FsResult<FileStat>;
    fn read_directory(&self, path: &str) -> FsResult<Vec<(String, FileType)>>;
    fn create_directory(&self, path: &str) -> FsResult<()>;
    fn read_file(&self, path: &str) -> FsResult<Vec<u8>>;
    fn write_file(&self, path: &str, content: &[u8], options: WriteOptions) -> FsResult<()>;
    fn delete(&self, path: &str, options: DeleteOptions) -> FsResult<()>;
    fn rename(&self, from: &str, to: &str, options: OverwriteOptions) -> FsResult<()>;
    fn copy(&self, from: &str, to: &str, options: OverwriteOptions) -> FsResult<()>;
}

/// The text search contract a host consumes
pub trait TextSearchProvider {
    /// Streams every match of `query` to `sink` until done or cancelled
    fn provide_text_search_results(
        &self,
        query: &str,
        sink: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> FsResult<SearchComplete>;
}

/// Read-only filesystem over a [`VirtualNode`] tree, with whole-word search
pub struct SampleFileSystem {
    root: VirtualNode,
    index: InvertedIndex,
    documents: DashMap<FileId, Arc<TextDocument>>,
    output: Arc<dyn OutputChannel>,
    metrics: SearchMetrics,
    scheme: String,
    pool: ThreadPool,
}

impl SampleFileSystem {
    /// Builds the filesystem and its index for `root`
    pub fn new(
        root: VirtualNode,
        output: Arc<dyn OutputChannel>,
        config: &SampleFsConfig,
    ) -> FsResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count.get())
            .build()
            .map_err(|e| FsError::config_error(format!("failed to start thread pool: {}", e)))?;

        let index = pool.install(|| InvertedIndex::build(&root));

        Ok(Self {
            root,
            index,
            documents: DashMap::new(),
            output,
            metrics: SearchMetrics::new(),
            scheme: config.scheme.clone(),
            pool,
        })
    }

    /// Loads the configured disk (or the default one) and builds the filesystem
    pub fn activate(config: &SampleFsConfig, output: Arc<dyn OutputChannel>) -> FsResult<Self> {
        let root = load_disk(config.disk_path.as_deref());
        let fs = Self::new(root, output, config)?;
        info!(
            "samplefs is active: scheme '{}', {} files indexed",
            fs.scheme,
            fs.index.files().len()
        );
        Ok(fs)
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            is_case_sensitive: true,
            is_readonly: true,
        }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Runs a search and collects every match
    pub fn search(&self, query: &str, token: &CancellationToken) -> FsResult<Vec<SearchMatch>> {
        let sink: Mutex<Vec<SearchMatch>> = Mutex::new(Vec::new());
        self.provide_text_search_results(query, &sink, token)?;
        Ok(match sink.into_inner() {
            Ok(matches) => matches,
            Err(poisoned) => poisoned.into_inner(),
        })
    }
}

impl FileSystemProvider for SampleFileSystem {
    fn watch(&self, path: &str, options: &WatchOptions) -> Subscription {
        trace!(
            "watch {} (recursive: {}, {} excludes) is a no-op",
            path,
            options.recursive,
            options.excludes.len()
        );
        Subscription {
            path: path.to_string(),
        }
    }

    fn stat(&self, path: &str) -> FsResult<FileStat> {
        let node = self.root.resolve(path)?;
        let size = match node {
            VirtualNode::Leaf(content) => content.len(),
            VirtualNode::Directory(children) => children.len(),
        };
        Ok(FileStat {
            file_type: node.file_type(),
            ctime: 0,
            mtime: 0,
            size: size as u64,
        })
    }

    fn read_directory(&self, path: &str) -> FsResult<Vec<(String, FileType)>> {
        self.root.resolve(path)?.list(path)
    }

    fn create_directory(&self, path: &str) -> FsResult<()> {
        Err(FsError::permission_denied(path))
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        match self.root.resolve(path)? {
            VirtualNode::Leaf(content) => Ok(content.as_bytes().to_vec()),
            VirtualNode::Directory(_) => Err(FsError::is_a_directory(path)),
        }
    }

    fn write_file(&self, path: &str, _content: &[u8], _options: WriteOptions) -> FsResult<()> {
        Err(FsError::permission_denied(path))
    }

    fn delete(&self, path: &str, _options: DeleteOptions) -> FsResult<()> {
        Err(FsError::permission_denied(path))
    }

    fn rename(&self, from: &str, _to: &str, _options: OverwriteOptions) -> FsResult<()> {
        Err(FsError::permission_denied(from))
    }

    fn copy(&self, from: &str, _to: &str, _options: OverwriteOptions) -> FsResult<()> {
        Err(FsError::permission_denied(from))
    }
}

impl DocumentProvider for SampleFileSystem {
    fn open_document(&self, file: &FileId) -> FsResult<Arc<TextDocument>> {
        if let Some(document) = self.documents.get(file) {
            return Ok(Arc::clone(document.value()));
        }

        let bytes = self.read_file(file.as_str())?;
        let text =
            String::from_utf8(bytes).map_err(|e| FsError::encoding_error(file.as_str(), e))?;
        self.metrics.record_document_open();
        debug!("Opened document {}", file);

        let document = self
            .documents
            .entry(file.clone())
            .or_insert_with(|| Arc::new(TextDocument::new(text)));
        Ok(Arc::clone(document.value()))
    }
}

impl TextSearchProvider for SampleFileSystem {
    fn provide_text_search_results(
        &self,
        query: &str,
        sink: &dyn ProgressSink,
        token: &CancellationToken,
    ) -> FsResult<SearchComplete> {
        self.output.append_line(&format!("query: {}", query));
        self.metrics.record_query();

        let query = Query::parse(query);
        let result = query.execute(&self.index);

        let reporter = ResultReporter::new(self, self.output.as_ref(), &self.metrics, &self.scheme);
        let complete = self
            .pool
            .install(|| reporter.report(&result, sink, token))?;

        self.metrics.log_stats();
        Ok(complete)
    }
}
