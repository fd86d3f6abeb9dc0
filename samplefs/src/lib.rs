pub mod cancel;
pub mod config;
pub mod document;
pub mod errors;
pub mod index;
pub mod metrics;
pub mod output;
pub mod provider;
pub mod query;
pub mod results;
pub mod search;
pub mod tokenizer;
pub mod tree;

pub use cancel::CancellationToken;
pub use config::SampleFsConfig;
pub use errors::{FsError, FsResult};
pub use provider::{FileSystemProvider, SampleFileSystem, TextSearchProvider};
pub use results::{SearchComplete, SearchMatch, SearchSummary};
pub use tree::{FileType, VirtualNode};
