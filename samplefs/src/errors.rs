//! Error types for samplefs.
//!
//! Every filesystem operation returns an [`FsResult`]. The four filesystem
//! kinds (`NotFound`, `NotADirectory`, `IsADirectory`, `PermissionDenied`)
//! are surfaced straight to the caller of the operation that produced them;
//! nothing is retried or recovered internally.
//!
//! ```rust,ignore
//! match fs.read_file("src") {
//!     Ok(bytes) => // Use the content,
//!     Err(FsError::IsADirectory(path)) => // Caller asked for a directory,
//!     Err(e) => // Anything else
//! }
//! ```
//!
//! Search never fails on unknown words or empty queries; those degrade to
//! empty results. The only search-time error is [`FsError::InvariantViolation`],
//! raised when an indexed offset cannot be mapped back into its document.
use thiserror::Error;

/// Result type for filesystem and search operations
pub type FsResult<T> = Result<T, FsError>;

/// Errors that can occur while navigating, reading or searching the tree
#[derive(Error, Debug)]
pub enum FsError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Is a directory: {0}")]
    IsADirectory(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: String,
        source: std::string::FromUtf8Error,
    },
    #[error("Internal consistency fault: {0}")]
    InvariantViolation(String),
}

impl FsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<String>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Host-facing error code, named after the editor filesystem error codes
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FileNotFound",
            Self::NotADirectory(_) => "FileNotADirectory",
            Self::IsADirectory(_) => "FileIsADirectory",
            Self::PermissionDenied(_) => "NoPermissions",
            _ => "Unknown",
        }
    }
}

impl From<config::ConfigError> for FsError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FsError::not_found("src/missing.py");
        assert!(matches!(err, FsError::NotFound(_)));

        let err = FsError::not_a_directory("readme.md/child");
        assert!(matches!(err, FsError::NotADirectory(_)));

        let err = FsError::is_a_directory("src");
        assert!(matches!(err, FsError::IsADirectory(_)));

        let err = FsError::permission_denied("readme.md");
        assert!(matches!(err, FsError::PermissionDenied(_)));

        let err = FsError::invariant_violation("offset 99 past end");
        assert!(matches!(err, FsError::InvariantViolation(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = FsError::not_found("src/missing.py");
        assert_eq!(err.to_string(), "File not found: src/missing.py");

        let err = FsError::permission_denied("readme.md");
        assert_eq!(err.to_string(), "Permission denied: readme.md");

        let err = FsError::config_error("Missing required field");
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FsError::not_found("a").code(), "FileNotFound");
        assert_eq!(FsError::not_a_directory("a").code(), "FileNotADirectory");
        assert_eq!(FsError::is_a_directory("a").code(), "FileIsADirectory");
        assert_eq!(FsError::permission_denied("a").code(), "NoPermissions");
        assert_eq!(FsError::config_error("bad").code(), "Unknown");
    }
}
