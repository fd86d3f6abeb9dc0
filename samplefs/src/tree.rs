//! The virtual tree: an immutable hierarchy of named text files and directories.
//!
//! A tree is built once from a configuration value (or the built-in default
//! disk) and never mutated afterwards. Directory children live in a
//! `BTreeMap`, so listings and traversal are ordered by name.
//!
//! # Configuration Format
//!
//! A disk is any nesting of strings (file contents) and mappings
//! (directories). In YAML:
//! ```yaml
//! readme.md: "Hello!"
//! src:
//!   hello.py: "print 'Hello world'"
//! ```
//!
//! Anything else (numbers, booleans, null, sequences) is rejected by
//! [`validate_file`] and the default disk is used instead.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::errors::{FsError, FsResult};

/// A node in the virtual tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VirtualNode {
    /// A text file
    Leaf(String),
    /// A directory of uniquely named children
    Directory(BTreeMap<String, VirtualNode>),
}

/// Kind of an entry, as reported by `stat` and directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    File,
    Directory,
}

impl VirtualNode {
    /// Creates an empty directory
    pub fn empty_dir() -> Self {
        VirtualNode::Directory(BTreeMap::new())
    }

    pub fn file_type(&self) -> FileType {
        match self {
            VirtualNode::Leaf(_) => FileType::File,
            VirtualNode::Directory(_) => FileType::Directory,
        }
    }

    /// Builds a tree from an untyped configuration value.
    ///
    /// Returns `None` when the value fails [`validate_file`].
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        if !validate_file(&value) {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Walks `path` from this node.
    ///
    /// A leading `/` and a single trailing `/` are ignored, so `/`, `""` and
    /// `"/src/"` address the root and `src` respectively.
    pub fn resolve(&self, path: &str) -> FsResult<&VirtualNode> {
        let mut node = self;
        for component in components(path) {
            match node {
                VirtualNode::Leaf(_) => return Err(FsError::not_a_directory(path)),
                VirtualNode::Directory(children) => {
                    node = children
                        .get(component)
                        .ok_or_else(|| FsError::not_found(path))?;
                }
            }
        }
        Ok(node)
    }

    /// Lists a directory's children by name.
    ///
    /// `path` is only used in the error when this node is a leaf.
    pub fn list(&self, path: &str) -> FsResult<Vec<(String, FileType)>> {
        match self {
            VirtualNode::Leaf(_) => Err(FsError::not_a_directory(path)),
            VirtualNode::Directory(children) => Ok(children
                .iter()
                .map(|(name, child)| (name.clone(), child.file_type()))
                .collect()),
        }
    }

    /// Collects every leaf as `(root-relative path, content)`, depth first
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        collect_leaves(self, String::new(), &mut out);
        out
    }
}

fn collect_leaves<'a>(node: &'a VirtualNode, prefix: String, out: &mut Vec<(String, &'a str)>) {
    match node {
        VirtualNode::Leaf(content) => out.push((prefix, content.as_str())),
        VirtualNode::Directory(children) => {
            for (name, child) in children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                collect_leaves(child, path, out);
            }
        }
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    let path = path.strip_suffix('/').unwrap_or(path);
    let path = path.trim_start_matches('/');
    path.split('/').filter(move |_| !path.is_empty())
}

/// Checks that a value is a plain string, or a mapping whose values all
/// validate recursively. Never panics.
pub fn validate_file(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(_) => true,
        serde_json::Value::Object(map) => map.values().all(validate_file),
        _ => false,
    }
}

/// The disk used when no valid configuration is supplied
pub fn default_disk() -> VirtualNode {
    let mut src = BTreeMap::new();
    src.insert(
        "hello.py".to_string(),
        VirtualNode::Leaf("print 'Hello world'".to_string()),
    );

    let mut root = BTreeMap::new();
    root.insert(
        "readme.md".to_string(),
        VirtualNode::Leaf("Hello!".to_string()),
    );
    root.insert("src".to_string(), VirtualNode::Directory(src));
    VirtualNode::Directory(root)
}

/// Reads a disk description file into an untyped value.
///
/// `.json` files are parsed as JSON, everything else as YAML.
pub fn read_disk_file(path: &Path) -> FsResult<serde_json::Value> {
    let text = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value = if is_json {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(value)
}

/// Loads the disk from `path`, falling back to [`default_disk`] when the
/// setting is absent, unreadable or invalid.
pub fn load_disk(path: Option<&Path>) -> VirtualNode {
    let Some(path) = path else {
        debug!("No disk configured, using default disk");
        return default_disk();
    };

    let value = match read_disk_file(path) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read disk {}: {}", path.display(), e);
            return default_disk();
        }
    };

    match VirtualNode::from_value(value) {
        Some(node @ VirtualNode::Directory(_)) => node,
        Some(VirtualNode::Leaf(_)) => {
            warn!("Disk {} is a single file, not a directory", path.display());
            default_disk()
        }
        None => {
            warn!("Disk {} failed validation", path.display());
            default_disk()
        }
    }
}
