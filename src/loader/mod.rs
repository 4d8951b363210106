//! Assembly/Doc Loader — turns configured source groups into loaded
//! (metadata tree, doc tree) pairs.
//!
//! Per descriptor: the metadata side loads through the [`MetadataReader`]
//! seam with dependency resolution against the group's search directories;
//! the doc side defaults its path from the metadata path by extension swap.
//! Configuration-level problems skip only what they affect so one run
//! surfaces every issue.

pub mod metadata;
pub mod reconcile;
pub mod xmldoc;

use crate::config::{Config, SourceConfig, SourceGroup};
use crate::diag::Diagnostics;
use crate::loader::metadata::{
    AssemblyTree, DependencyResolver, MetadataReader, UnresolvedReferences, BINARY_EXTENSIONS,
    DOC_EXTENSION,
};
use crate::loader::xmldoc::DocFile;
use std::path::{Path, PathBuf};

/// One loaded source pair. Consumed by the reconciler; not part of the
/// long-lived model.
#[derive(Debug)]
pub struct LoadedSource {
    pub metadata: Option<AssemblyTree>,
    pub doc: Option<DocFile>,
    pub merge_group: String,
    /// Originating file path, for diagnostics.
    pub path: PathBuf,
}

/// Loads every descriptor of every group, in declared order.
pub fn load_all(
    config: &Config,
    reader: &dyn MetadataReader,
    diag: &mut Diagnostics,
) -> Vec<LoadedSource> {
    let mut sources = Vec::new();
    for group in &config.groups {
        let merge_group = group
            .merge_group
            .clone()
            .unwrap_or_else(|| "default".to_string());
        for source in &group.sources {
            if let Some(loaded) = load_source(group, &merge_group, source, reader, diag) {
                sources.push(loaded);
            }
        }
    }
    sources
}

fn load_source(
    group: &SourceGroup,
    merge_group: &str,
    source: &SourceConfig,
    reader: &dyn MetadataReader,
    diag: &mut Diagnostics,
) -> Option<LoadedSource> {
    if source.assembly.is_none() && source.doc.is_none() {
        diag.error("source descriptor has neither an assembly nor a doc path");
        return None;
    }

    let mut tree: Option<AssemblyTree> = None;
    if let Some(assembly_path) = &source.assembly {
        if !assembly_path.is_file() {
            // Metadata side aborted; doc-only processing may still apply.
            diag.error(format!(
                "assembly file [{}] not found",
                assembly_path.display()
            ));
        } else if !has_extension(assembly_path, BINARY_EXTENSIONS) {
            diag.fatal(format!(
                "invalid assembly source [{}]: not a recognized binary extension",
                assembly_path.display()
            ));
            return None;
        } else {
            let dir = assembly_path
                .parent()
                .unwrap_or_else(|| Path::new("."));
            let resolver = DependencyResolver::new(dir, &group.search_dirs);
            match reader.read(assembly_path, &resolver, diag) {
                Ok(t) => tree = Some(t),
                Err(e) if e.downcast_ref::<UnresolvedReferences>().is_some() => {
                    diag.fatal(format!(
                        "failed to load assembly [{}]: {e}",
                        assembly_path.display()
                    ));
                    return None;
                }
                Err(e) => {
                    // Present but unreadable: skip this descriptor.
                    diag.error(format!(
                        "cannot read assembly [{}]: {e}",
                        assembly_path.display()
                    ));
                    return None;
                }
            }
        }
    }

    // Doc path defaults to the assembly path with the doc extension.
    let doc_path = source.doc.clone().or_else(|| {
        source
            .assembly
            .as_ref()
            .map(|a| a.with_extension(DOC_EXTENSION))
    });

    let mut doc: Option<DocFile> = None;
    if let Some(doc_path) = doc_path {
        if !has_extension(&doc_path, &[DOC_EXTENSION]) {
            diag.fatal(format!(
                "invalid doc source [{}]: must be an xml comment file",
                doc_path.display()
            ));
        } else if !doc_path.is_file() {
            // The reconciler escalates if nothing else pairs this source.
            diag.error(format!(
                "documentation file [{}] not found",
                doc_path.display()
            ));
        } else {
            match DocFile::load(&doc_path) {
                Ok(d) => doc = Some(d),
                Err(e) => diag.fatal(format!(
                    "not valid xml documentation for source [{}]: {e}",
                    doc_path.display()
                )),
            }
        }
    }

    if tree.is_none() && doc.is_none() {
        return None;
    }
    let path = source
        .assembly
        .clone()
        .or_else(|| source.doc.clone())
        .unwrap_or_default();
    Some(LoadedSource {
        metadata: tree,
        doc,
        merge_group: merge_group.to_string(),
        path,
    })
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
