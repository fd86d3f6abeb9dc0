use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Settings for a samplefs instance.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.samplefs.yaml` in the current directory
/// 3. Global `$HOME/.config/samplefs/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # File holding the disk tree (YAML, or JSON with a .json extension)
/// disk_path: "disk.yaml"
///
/// # URI scheme used in log lines
/// scheme: "samplefs"
///
/// # Worker threads for indexing and reporting (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// The disk tree itself is kept in its own file rather than inline, so that
/// file names keep their exact case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleFsConfig {
    /// Disk tree file. When absent or invalid, the built-in default disk is used.
    #[serde(default)]
    pub disk_path: Option<PathBuf>,

    /// URI scheme for file identifiers in log lines
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Number of threads to use for indexing and reporting
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_scheme() -> String {
    "samplefs".to_string()
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SampleFsConfig {
    fn default() -> Self {
        Self {
            disk_path: None,
            scheme: default_scheme(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl SampleFsConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("samplefs/config.yaml")),
            // Local config
            Some(PathBuf::from(".samplefs.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        // CLI values take precedence over config file values
        if cli.disk_path.is_some() {
            self.disk_path = cli.disk_path;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }
}

/// Values given on the command line, each overriding the file value when set
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub disk_path: Option<PathBuf>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            disk_path: "disk.yaml"
            scheme: "memfs"
            thread_count: 4
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SampleFsConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.disk_path, Some(PathBuf::from("disk.yaml")));
        assert_eq!(config.scheme, "memfs");
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = SampleFsConfig {
            disk_path: Some(PathBuf::from("file.yaml")),
            scheme: "samplefs".to_string(),
            thread_count: NonZeroUsize::new(4).unwrap(),
            log_level: "warn".to_string(),
        };

        let cli = CliOverrides {
            disk_path: Some(PathBuf::from("cli.json")),
            thread_count: NonZeroUsize::new(8),
            log_level: None,
        };

        let merged = config_file.merge_with_cli(cli);
        assert_eq!(merged.disk_path, Some(PathBuf::from("cli.json"))); // CLI value
        assert_eq!(merged.thread_count, NonZeroUsize::new(8).unwrap()); // CLI value
        assert_eq!(merged.log_level, "warn"); // File value (CLI None)
        assert_eq!(merged.scheme, "samplefs");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"log_level: \"info\"\n").unwrap();

        let config = SampleFsConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.disk_path, None);
        assert_eq!(config.scheme, "samplefs");
        assert_eq!(
            config.thread_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            disk_path: []  # Should be string
            thread_count: "invalid"  # Should be number
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = SampleFsConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SampleFsConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
