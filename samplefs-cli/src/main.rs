use clap::{Parser, Subcommand};
use colored::Colorize;
use samplefs::{
    config::CliOverrides,
    output::{OutputChannel, StderrChannel, TracingChannel},
    provider::{DeleteOptions, OverwriteOptions, WriteOptions},
    CancellationToken, FileSystemProvider, FileType, FsError, SampleFileSystem, SampleFsConfig,
    SearchSummary,
};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode, sync::Arc};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Result<T> = std::result::Result<T, FsError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disk tree file (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    disk: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short = 'j', long, global = true)]
    threads: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write query and match log lines to stderr instead of the tracing log
    #[arg(long, global = true)]
    log_to_stderr: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search file contents for whole words (every word must appear)
    Search {
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,

        /// Show only statistics, not matches
        #[arg(short, long)]
        stats: bool,
    },

    /// Show the metadata of a file or directory
    Stat { path: String },

    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Print a file
    Cat { path: String },

    /// Show how the provider is registered
    Info,

    /// Write a file (always denied)
    Write { path: String, text: String },

    /// Delete a file or directory (always denied)
    Rm {
        path: String,
        #[arg(short, long)]
        recursive: bool,
    },

    /// Create a directory (always denied)
    Mkdir { path: String },

    /// Rename a file or directory (always denied)
    Mv { from: String, to: String },

    /// Copy a file or directory (always denied)
    Cp { from: String, to: String },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore a second initialization
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = SampleFsConfig::load_from(cli.config.as_deref())?.merge_with_cli(CliOverrides {
        disk_path: cli.disk,
        thread_count: cli.threads,
        log_level: cli.log_level,
    });
    init_tracing(&config.log_level);
    debug!("Using configuration: {:?}", config);

    let output: Arc<dyn OutputChannel> = if cli.log_to_stderr {
        Arc::new(StderrChannel)
    } else {
        Arc::new(TracingChannel)
    };
    let fs = SampleFileSystem::activate(&config, output)?;

    match cli.command {
        Commands::Search { query, stats } => {
            let query = query.join(" ");
            let matches = fs.search(&query, &CancellationToken::new())?;
            let mut summary = SearchSummary::from_matches(matches);
            summary.sort_by_file();
            print_search_results(&summary, stats);
            Ok(())
        }
        Commands::Stat { path } => {
            let stat = fs.stat(&path)?;
            println!(
                "{}: {} (size {}, ctime {}, mtime {})",
                path,
                file_type_name(stat.file_type),
                stat.size,
                stat.ctime,
                stat.mtime
            );
            Ok(())
        }
        Commands::Ls { path } => {
            for (name, file_type) in fs.read_directory(&path)? {
                match file_type {
                    FileType::Directory => println!("{}", format!("{}/", name).blue()),
                    FileType::File => println!("{}", name),
                }
            }
            Ok(())
        }
        Commands::Cat { path } => {
            let bytes = fs.read_file(&path)?;
            let text = String::from_utf8(bytes).map_err(|e| FsError::encoding_error(&path, e))?;
            println!("{}", text);
            Ok(())
        }
        Commands::Info => {
            let caps = fs.capabilities();
            println!("scheme: {}", fs.scheme());
            println!("case sensitive: {}", caps.is_case_sensitive);
            println!("read only: {}", caps.is_readonly);
            println!("files indexed: {}", fs.index().files().len());
            println!("distinct words: {}", fs.index().word_count());
            Ok(())
        }
        Commands::Write { path, text } => fs.write_file(
            &path,
            text.as_bytes(),
            WriteOptions {
                create: true,
                overwrite: true,
            },
        ),
        Commands::Rm { path, recursive } => fs.delete(&path, DeleteOptions { recursive }),
        Commands::Mkdir { path } => fs.create_directory(&path),
        Commands::Mv { from, to } => fs.rename(&from, &to, OverwriteOptions::default()),
        Commands::Cp { from, to } => fs.copy(&from, &to, OverwriteOptions::default()),
    }
}

fn file_type_name(file_type: FileType) -> &'static str {
    match file_type {
        FileType::File => "file",
        FileType::Directory => "directory",
    }
}

fn print_search_results(summary: &SearchSummary, stats_only: bool) {
    if stats_only {
        println!(
            "Found {} matches in {} files",
            summary.total_matches, summary.files_with_matches
        );
        return;
    }

    for file_result in &summary.file_results {
        println!("\n{}", file_result.file.to_string().blue());
        for m in &file_result.matches {
            println!(
                "{}:{}: {}",
                (m.range.start.line + 1).to_string().green(),
                (m.range.start.character + 1).to_string().green(),
                highlight(
                    &m.preview.text,
                    m.preview.matches.start.character,
                    m.preview.matches.end.character
                )
            );
        }
    }

    println!(
        "\nFound {} matches in {} files",
        summary.total_matches, summary.files_with_matches
    );
}

/// Colors the columns `start..end` of `line`
fn highlight(line: &str, start: usize, end: usize) -> String {
    let before: String = line.chars().take(start).collect();
    let matched: String = line.chars().skip(start).take(end.saturating_sub(start)).collect();
    let after: String = line.chars().skip(end.max(start)).collect();
    format!("{}{}{}", before, matched.red().bold(), after)
}
