//! Run configuration — source groups and descriptors.
//!
//! The on-disk format is JSON. Relative paths are resolved against the
//! configuration file's directory (current directory when the config comes
//! from stdin or tests). Assembly paths may be glob patterns; matches are
//! expanded sorted and deduped so runs are deterministic.

use crate::diag::Diagnostics;
use crate::model::Topic;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration consumed by the pipeline.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub groups: Vec<SourceGroup>,
    /// Hand-authored topic tree, registered after the code graph.
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// An ordered set of sources merged into the same API surface.
#[derive(Debug, Default, Deserialize)]
pub struct SourceGroup {
    /// Merge-group name; defaults to "default" when unset.
    #[serde(default)]
    pub merge_group: Option<String>,
    /// Additional directories searched when resolving referenced modules.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One source descriptor: a metadata path and/or a doc-comment file path.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub assembly: Option<PathBuf>,
    /// Explicit doc path; defaults to the assembly path with a `.xml`
    /// extension when unset.
    #[serde(default)]
    pub doc: Option<PathBuf>,
}

impl Config {
    /// Loads and normalizes a configuration file.
    pub fn load(path: &Path, diag: &mut Diagnostics) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config: {}", path.display()))?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.normalize(&base, diag);
        Ok(config)
    }

    /// Resolves relative paths against `base` and expands assembly globs.
    pub fn normalize(&mut self, base: &Path, diag: &mut Diagnostics) {
        for group in &mut self.groups {
            for dir in &mut group.search_dirs {
                *dir = resolve(base, dir);
            }

            let sources = std::mem::take(&mut group.sources);
            for source in sources {
                group.sources.extend(expand_source(base, source, diag));
            }
        }
    }
}

/// Resolve a possibly-relative path against a base directory.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expand one descriptor: resolve its paths and, when the assembly path is a
/// glob pattern, fan it out into one descriptor per match (derived doc
/// paths; an explicit doc path only makes sense for a non-pattern).
fn expand_source(base: &Path, source: SourceConfig, diag: &mut Diagnostics) -> Vec<SourceConfig> {
    let doc = source.doc.as_ref().map(|d| resolve(base, d));

    let assembly = match source.assembly {
        Some(a) => resolve(base, &a),
        None => {
            return vec![SourceConfig {
                assembly: None,
                doc,
            }]
        }
    };

    let pattern = assembly.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return vec![SourceConfig {
            assembly: Some(assembly),
            doc,
        }];
    }

    let mut matches: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(|r| r.ok()).filter(|p| p.is_file()).collect(),
        Err(e) => {
            diag.error(format!("invalid glob pattern [{}]: {}", pattern, e));
            return Vec::new();
        }
    };
    matches.sort();
    matches.dedup();

    if matches.is_empty() {
        diag.warning(format!("no files matched: {}", pattern));
        return Vec::new();
    }
    if doc.is_some() {
        diag.warning(format!(
            "explicit doc path ignored for glob source: {}",
            pattern
        ));
    }

    matches
        .into_iter()
        .map(|path| SourceConfig {
            assembly: Some(path),
            doc: None,
        })
        .collect()
}
