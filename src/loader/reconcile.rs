//! Source Reconciler — pairs every metadata source with exactly one
//! documentation source.
//!
//! Doc files are matched by their declared content, not by originating
//! group: a stray doc-only source can satisfy any metadata source. Zero and
//! multiple matches are fatal; all sources are checked before the run halts
//! so every pairing failure is reported in one pass.

use crate::diag::Diagnostics;
use crate::loader::metadata::AssemblyTree;
use crate::loader::xmldoc::DocFile;
use crate::loader::LoadedSource;

/// Pluggable metadata↔doc matching policy.
pub trait DocMatcher {
    fn matches(&self, metadata: &AssemblyTree, doc: &DocFile) -> bool;
}

/// Default policy: the doc file's declared assembly name equals the
/// metadata's self-reported name — exact, trimmed, case-sensitive.
pub struct AssemblyNameMatcher;

impl DocMatcher for AssemblyNameMatcher {
    fn matches(&self, metadata: &AssemblyTree, doc: &DocFile) -> bool {
        doc.assembly_name == metadata.name
    }
}

/// A reconciled source, ready for graph building.
#[derive(Debug)]
pub struct PairedSource {
    pub metadata: AssemblyTree,
    pub doc: DocFile,
    pub merge_group: String,
}

/// Validates 1:1 pairing across all loaded sources. Loaded Source Pairs are
/// consumed here; only paired sources survive into the model.
pub fn pair(
    sources: Vec<LoadedSource>,
    matcher: &dyn DocMatcher,
    diag: &mut Diagnostics,
) -> Vec<PairedSource> {
    let mut doc_only: Vec<DocFile> = Vec::new();
    let mut with_metadata = Vec::new();

    for source in sources {
        match source.metadata {
            Some(tree) => {
                with_metadata.push((tree, source.doc, source.merge_group, source.path))
            }
            None => {
                if let Some(doc) = source.doc {
                    doc_only.push(doc);
                }
            }
        }
    }

    let mut paired = Vec::new();
    for (metadata, own_doc, merge_group, path) in with_metadata {
        // Candidate pool: the source's own doc entry plus every doc-only
        // entry from any group.
        let matches: Vec<&DocFile> = own_doc
            .iter()
            .chain(doc_only.iter())
            .filter(|doc| matcher.matches(&metadata, doc))
            .collect();

        match matches.as_slice() {
            [] => diag.fatal(format!(
                "unable to find documentation for assembly [{}] ({})",
                metadata.name,
                path.display()
            )),
            [doc] => {
                let doc = (*doc).clone();
                paired.push(PairedSource {
                    metadata,
                    doc,
                    merge_group,
                });
            }
            many => {
                let paths: Vec<String> = many
                    .iter()
                    .map(|d| d.path.display().to_string())
                    .collect();
                diag.fatal(format!(
                    "cannot resolve from multiple ({}) documentation sources for assembly [{}]: {}",
                    many.len(),
                    metadata.name,
                    paths.join(", ")
                ));
            }
        }
    }

    paired
}
