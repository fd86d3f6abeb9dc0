use anyhow::Result;
use samplefs::document::TextDocument;
use samplefs::index::{FileId, InvertedIndex};
use samplefs::output::MemoryChannel;
use samplefs::provider::{OverwriteOptions, WriteOptions};
use samplefs::query::Query;
use samplefs::{
    CancellationToken, FileSystemProvider, FsError, SampleFileSystem, SampleFsConfig,
    SearchSummary, TextSearchProvider, VirtualNode,
};
use std::fs;
use std::num::NonZeroUsize;
use std::sync::{mpsc, Arc};
use std::thread;
use tempfile::tempdir;

fn create_disk(files: &[(&str, &str)]) -> VirtualNode {
    let value: serde_json::Map<String, serde_json::Value> = files
        .iter()
        .map(|(name, content)| (name.to_string(), serde_json::Value::from(*content)))
        .collect();
    VirtualNode::from_value(serde_json::Value::Object(value)).unwrap()
}

fn create_fs(disk: VirtualNode) -> Result<(SampleFileSystem, Arc<MemoryChannel>)> {
    let output = Arc::new(MemoryChannel::new());
    let config = SampleFsConfig {
        thread_count: NonZeroUsize::new(4).unwrap(),
        ..SampleFsConfig::default()
    };
    let fs = SampleFileSystem::new(disk, output.clone(), &config)?;
    Ok((fs, output))
}

fn hello_world_files() -> VirtualNode {
    create_disk(&[
        ("file1", "I say Hello world!"),
        ("file2", "To the world, hello to you!"),
    ])
}

#[test]
fn test_default_disk_search() -> Result<()> {
    let (fs, _) = create_fs(samplefs::tree::default_disk())?;
    let summary = SearchSummary::from_matches(fs.search("hello", &CancellationToken::new())?);

    assert_eq!(summary.files_with_matches, 2);
    assert_eq!(summary.total_matches, 2);

    let mut files: Vec<_> = summary
        .file_results
        .iter()
        .map(|r| r.file.as_str())
        .collect();
    files.sort();
    assert_eq!(files, vec!["readme.md", "src/hello.py"]);

    for result in &summary.file_results {
        let m = &result.matches[0];
        let highlighted: String = m
            .preview
            .text
            .chars()
            .skip(m.preview.matches.start.character)
            .take(m.preview.matches.end.character - m.preview.matches.start.character)
            .collect();
        assert_eq!(highlighted, "Hello");
    }
    Ok(())
}

#[test]
fn test_file_names_are_not_searched() -> Result<()> {
    let (fs, _) = create_fs(samplefs::tree::default_disk())?;
    assert!(fs.search("py", &CancellationToken::new())?.is_empty());
    assert!(fs.search("readme", &CancellationToken::new())?.is_empty());
    Ok(())
}

#[test]
fn test_two_word_query() -> Result<()> {
    let (fs, _) = create_fs(hello_world_files())?;
    let summary = SearchSummary::from_matches(fs.search("hello world", &CancellationToken::new())?);

    assert_eq!(summary.files_with_matches, 2);
    for result in &summary.file_results {
        assert_eq!(result.matches.len(), 2);
        let words: Vec<String> = result
            .matches
            .iter()
            .map(|m| {
                m.preview
                    .text
                    .chars()
                    .skip(m.range.start.character)
                    .take(m.range.end.character - m.range.start.character)
                    .collect::<String>()
                    .to_lowercase()
            })
            .collect();
        assert_eq!(words, vec!["hello", "world"]);
    }
    Ok(())
}

#[test]
fn test_partial_word_query() -> Result<()> {
    let (fs, output) = create_fs(hello_world_files())?;
    let matches = fs.search("hello wor", &CancellationToken::new())?;
    assert!(matches.is_empty());
    assert_eq!(output.lines(), vec!["query: hello wor"]);
    Ok(())
}

#[test]
fn test_and_semantics_match_set_intersection() -> Result<()> {
    let disk = create_disk(&[
        ("a.txt", "red green"),
        ("b.txt", "green blue"),
        ("c.txt", "blue red green"),
        ("d.txt", "yellow"),
    ]);
    let index = InvertedIndex::build(&disk);

    for (first, second) in [("red", "green"), ("green", "blue"), ("red", "yellow")] {
        let a: Vec<FileId> = Query::parse(first).execute(&index).into_keys().collect();
        let b: Vec<FileId> = Query::parse(second).execute(&index).into_keys().collect();
        let expected: Vec<FileId> = a.into_iter().filter(|f| b.contains(f)).collect();

        let combined: Vec<FileId> = Query::parse(&format!("{} {}", first, second))
            .execute(&index)
            .into_keys()
            .collect();
        assert_eq!(combined, expected, "query '{} {}'", first, second);
    }
    Ok(())
}

#[test]
fn test_regions_round_trip_through_positions() -> Result<()> {
    let content = "Alpha beta\r\ngamma_delta, ALPHA!\n\nnaïve café alpha";
    let disk = create_disk(&[("notes.txt", content)]);
    let index = InvertedIndex::build(&disk);
    let document = TextDocument::new(content);

    for word in ["alpha", "beta", "gamma_delta", "naïve", "café"] {
        let result = Query::parse(word).execute(&index);
        let regions = &result[&FileId::from("notes.txt")];
        assert!(!regions.is_empty(), "no regions for {}", word);
        for region in regions {
            let start = document.position_at(region.start)?;
            let end = document.position_at(region.end)?;
            assert_eq!(document.offset_at(start)?, region.start);
            assert_eq!(document.offset_at(end)?, region.end);
            let text = document.slice(region.start, region.end)?;
            assert_eq!(text.to_lowercase(), word);
        }
    }
    Ok(())
}

#[test]
fn test_streaming_over_channel() -> Result<()> {
    let (fs, output) = create_fs(hello_world_files())?;
    let (tx, rx) = mpsc::channel();

    let complete = fs.provide_text_search_results("world", &tx, &CancellationToken::new())?;
    drop(tx);

    assert!(!complete.limit_hit);
    let received: Vec<_> = rx.iter().collect();
    assert_eq!(received.len(), 2);
    // one query line plus one line per match
    assert_eq!(output.lines().len(), 3);
    Ok(())
}

#[test]
fn test_cancelled_search_completes_without_results() -> Result<()> {
    let (fs, _) = create_fs(hello_world_files())?;
    let token = CancellationToken::new();
    token.cancel();

    let (tx, rx) = mpsc::channel();
    let complete = fs.provide_text_search_results("hello", &tx, &token)?;
    drop(tx);

    assert!(!complete.limit_hit);
    assert_eq!(rx.iter().count(), 0);
    assert_eq!(fs.metrics().get_stats().cancelled_searches, 1);
    Ok(())
}

#[test]
fn test_concurrent_searches() -> Result<()> {
    let (fs, _) = create_fs(hello_world_files())?;
    let fs = Arc::new(fs);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                let query = if i % 2 == 0 { "hello" } else { "hello world" };
                fs.search(query, &CancellationToken::new())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let matches = handle.join().expect("search thread panicked")?;
        let expected = if i % 2 == 0 { 2 } else { 4 };
        assert_eq!(matches.len(), expected);
    }
    assert_eq!(fs.metrics().get_stats().queries, 8);
    Ok(())
}

#[test]
fn test_mutations_always_denied() -> Result<()> {
    let (fs, _) = create_fs(hello_world_files())?;
    for path in ["/file1", "/missing", "/", ""] {
        assert!(matches!(
            fs.write_file(path, b"data", WriteOptions::default()),
            Err(FsError::PermissionDenied(_))
        ));
        assert!(matches!(
            fs.copy(path, "/elsewhere", OverwriteOptions { overwrite: true }),
            Err(FsError::PermissionDenied(_))
        ));
    }
    Ok(())
}

#[test]
fn test_activate_from_config_file() -> Result<()> {
    let dir = tempdir()?;
    let disk_path = dir.path().join("disk.yaml");
    fs::write(
        &disk_path,
        "README.md: \"Project Notes\"\ndocs:\n  Guide.md: \"notes on the project\"\n",
    )?;
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "disk_path: \"{}\"\nscheme: \"memfs\"\nthread_count: 2\n",
            disk_path.display()
        ),
    )?;

    let config = SampleFsConfig::load_from(Some(&config_path))?;
    let output = Arc::new(MemoryChannel::new());
    let fs = SampleFileSystem::activate(&config, output.clone())?;

    // file names keep their case
    assert_eq!(fs.read_file("/README.md")?, b"Project Notes");
    assert_eq!(fs.read_directory("/docs")?.len(), 1);

    let matches = fs.search("project notes", &CancellationToken::new())?;
    assert_eq!(matches.len(), 4);
    assert!(output
        .lines()
        .iter()
        .any(|line| line.starts_with("memfs:///docs/Guide.md ")));
    Ok(())
}

#[test]
fn test_activate_with_invalid_disk_uses_default() -> Result<()> {
    let dir = tempdir()?;
    let disk_path = dir.path().join("disk.json");
    fs::write(&disk_path, r#"{"a.txt": 42}"#)?;

    let config = SampleFsConfig {
        disk_path: Some(disk_path),
        ..SampleFsConfig::default()
    };
    let fs = SampleFileSystem::activate(&config, Arc::new(MemoryChannel::new()))?;
    assert_eq!(fs.read_file("/readme.md")?, b"Hello!");
    Ok(())
}
