//! Metadata-reading seam — the opaque provider of a symbol tree.
//!
//! The pipeline only depends on [`MetadataReader`]; the shipped
//! [`ManifestReader`] parses a line-oriented assembly manifest carrying the
//! same declarative facts a reflection reader would enumerate: assembly
//! name, referenced modules, namespaces, types and members with their
//! override/implementation links.

use crate::diag::Diagnostics;
use crate::model::MemberKind;
use anyhow::{anyhow, bail, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions recognized as binary metadata sources.
pub const BINARY_EXTENSIONS: &[&str] = &["dll", "exe"];

/// Alternate module extension tried when a reference fails to resolve.
pub const ALTERNATE_EXTENSION: &str = "winmd";

/// Extension of documentation-comment files.
pub const DOC_EXTENSION: &str = "xml";

// -- Symbol tree produced by a reader -----------------------------------------

#[derive(Debug, Default)]
pub struct AssemblyTree {
    /// Self-reported assembly name; reconciliation key.
    pub name: String,
    /// Referenced module names, resolved during reading.
    pub references: Vec<String>,
    pub namespaces: Vec<NamespaceDecl>,
}

#[derive(Debug, Default)]
pub struct NamespaceDecl {
    pub name: String,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Default)]
pub struct TypeDecl {
    /// Short name; the namespace provides qualification.
    pub name: String,
    /// Fully qualified base type name, if declared.
    pub base: Option<String>,
    pub members: Vec<MemberDecl>,
}

#[derive(Debug)]
pub struct MemberDecl {
    pub kind: MemberKind,
    pub name: String,
    pub params: Vec<ParamDecl>,
    /// Fully qualified overridden member (signature included, no kind
    /// prefix), e.g. `Acme.Base.Helper.Trim(System.String)`.
    pub overrides: Option<String>,
    /// Fully qualified implemented interface member, same form.
    pub implements: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub type_name: String,
}

/// Error marker for a read that failed because referenced modules could not
/// be resolved. The loader escalates this to a fatal-class diagnostic, while
/// other read failures only skip the descriptor.
#[derive(Debug)]
pub struct UnresolvedReferences {
    pub count: usize,
}

impl std::fmt::Display for UnresolvedReferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} unresolved reference(s)", self.count)
    }
}

impl std::error::Error for UnresolvedReferences {}

/// The external collaborator boundary: anything that can turn a metadata
/// path into a symbol tree.
pub trait MetadataReader {
    fn read(
        &self,
        path: &Path,
        resolver: &DependencyResolver,
        diag: &mut Diagnostics,
    ) -> Result<AssemblyTree>;
}

// -- Dependency resolution ----------------------------------------------------

/// Resolves referenced module names against an explicit, ordered set of
/// directories: the metadata file's own directory first, then each group
/// search directory in declared order. System locations are never searched.
#[derive(Debug)]
pub struct DependencyResolver {
    search_dirs: Vec<PathBuf>,
}

impl DependencyResolver {
    pub fn new(assembly_dir: &Path, group_search_dirs: &[PathBuf]) -> Self {
        let mut search_dirs = vec![assembly_dir.to_path_buf()];
        search_dirs.extend(group_search_dirs.iter().cloned());
        DependencyResolver { search_dirs }
    }

    /// Resolves one referenced module name to a file path.
    ///
    /// First pass probes every directory for the recognized binary
    /// extensions; the fallback pass retries with the alternate module
    /// extension, accepting the first candidate that actually loads.
    pub fn resolve(&self, name: &str, diag: &mut Diagnostics) -> Result<PathBuf> {
        for dir in &self.search_dirs {
            for ext in BINARY_EXTENSIONS {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        // Alternate-extension fallback, trying each search directory until
        // one candidate loads.
        for dir in &self.search_dirs {
            let candidate = dir.join(format!("{name}.{ALTERNATE_EXTENSION}"));
            if !candidate.is_file() {
                continue;
            }
            match fs::read_to_string(&candidate) {
                Ok(content) if parse_manifest(&content).is_ok() => return Ok(candidate),
                _ => continue,
            }
        }

        diag.error(format!("failed to resolve {name}"));
        bail!("unresolved reference: {name}")
    }
}

// -- Manifest reader ----------------------------------------------------------

static RE_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(#.*)?$").unwrap());

static RE_ASSEMBLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^assembly\s+(\S+)\s*$").unwrap());

static RE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^reference\s+(\S+)\s*$").unwrap());

static RE_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^namespace\s+([A-Za-z_][A-Za-z0-9_.]*)\s*$").unwrap());

static RE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^type\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*:\s*([A-Za-z_][A-Za-z0-9_.]*))?\s*$")
        .unwrap()
});

static RE_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s+(method|property|field|event)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\(([^)]*)\))?(.*)$",
    )
    .unwrap()
});

static RE_OVERRIDES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\boverrides\s+(\S+)").unwrap());

static RE_IMPLEMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimplements\s+(\S+)").unwrap());

/// Default [`MetadataReader`] over the line-oriented manifest format.
pub struct ManifestReader;

impl MetadataReader for ManifestReader {
    fn read(
        &self,
        path: &Path,
        resolver: &DependencyResolver,
        diag: &mut Diagnostics,
    ) -> Result<AssemblyTree> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        let tree = parse_manifest(&content)
            .map_err(|e| anyhow!("{}: {e}", path.display()))?;

        // Every referenced module must resolve; exhausting the candidates
        // fails the whole read.
        let mut unresolved = 0usize;
        for reference in &tree.references {
            if resolver.resolve(reference, diag).is_err() {
                unresolved += 1;
            }
        }
        if unresolved > 0 {
            return Err(UnresolvedReferences { count: unresolved }.into());
        }

        Ok(tree)
    }
}

/// Parse manifest text into a symbol tree.
fn parse_manifest(content: &str) -> Result<AssemblyTree> {
    let mut tree = AssemblyTree::default();

    for (lineno, line) in content.lines().enumerate() {
        let lineno = lineno + 1;
        if RE_BLANK.is_match(line) {
            continue;
        }

        if let Some(caps) = RE_ASSEMBLY.captures(line) {
            if !tree.name.is_empty() {
                bail!("line {lineno}: duplicate assembly declaration");
            }
            tree.name = caps[1].to_string();
            continue;
        }

        if let Some(caps) = RE_REFERENCE.captures(line) {
            tree.references.push(caps[1].to_string());
            continue;
        }

        if let Some(caps) = RE_NAMESPACE.captures(line) {
            tree.namespaces.push(NamespaceDecl {
                name: caps[1].to_string(),
                types: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = RE_TYPE.captures(line) {
            let namespace = tree
                .namespaces
                .last_mut()
                .ok_or_else(|| anyhow!("line {lineno}: type outside a namespace"))?;
            namespace.types.push(TypeDecl {
                name: caps[1].to_string(),
                base: caps.get(2).map(|m| m.as_str().to_string()),
                members: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = RE_MEMBER.captures(line) {
            let ty = tree
                .namespaces
                .last_mut()
                .and_then(|ns| ns.types.last_mut())
                .ok_or_else(|| anyhow!("line {lineno}: member outside a type"))?;

            let kind = match &caps[1] {
                "method" => MemberKind::Method,
                "property" => MemberKind::Property,
                "field" => MemberKind::Field,
                _ => MemberKind::Event,
            };
            let rest = caps.get(4).map(|m| m.as_str()).unwrap_or("");
            ty.members.push(MemberDecl {
                kind,
                name: caps[2].to_string(),
                params: parse_params(caps.get(3).map(|m| m.as_str()).unwrap_or("")),
                overrides: RE_OVERRIDES.captures(rest).map(|c| c[1].to_string()),
                implements: RE_IMPLEMENTS.captures(rest).map(|c| c[1].to_string()),
            });
            continue;
        }

        bail!("line {lineno}: unrecognized directive: {}", line.trim());
    }

    if tree.name.is_empty() {
        bail!("missing assembly declaration");
    }
    Ok(tree)
}

/// Parse a parameter list: `value:System.String, count:System.Int32`.
/// A token without a name keeps the type as its display name.
fn parse_params(raw: &str) -> Vec<ParamDecl> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| match token.split_once(':') {
            Some((name, type_name)) => ParamDecl {
                name: name.trim().to_string(),
                type_name: type_name.trim().to_string(),
            },
            None => ParamDecl {
                name: token.to_string(),
                type_name: token.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
# sample assembly
assembly Acme.Core
reference Acme.Base

namespace Acme.Text
type StringHelper : Acme.Base.Helper
  method Trim(value:System.String) overrides Acme.Base.Helper.Trim(System.String)
  method Trim
  property Length
  field count
  event Changed implements Acme.Base.INotify.Changed
";

    #[test]
    fn parses_full_manifest() {
        let tree = parse_manifest(MANIFEST).unwrap();
        assert_eq!(tree.name, "Acme.Core");
        assert_eq!(tree.references, vec!["Acme.Base"]);
        assert_eq!(tree.namespaces.len(), 1);

        let ty = &tree.namespaces[0].types[0];
        assert_eq!(ty.name, "StringHelper");
        assert_eq!(ty.base.as_deref(), Some("Acme.Base.Helper"));
        assert_eq!(ty.members.len(), 5);

        let trim = &ty.members[0];
        assert_eq!(trim.kind, MemberKind::Method);
        assert_eq!(trim.params[0].name, "value");
        assert_eq!(trim.params[0].type_name, "System.String");
        assert_eq!(
            trim.overrides.as_deref(),
            Some("Acme.Base.Helper.Trim(System.String)")
        );

        let event = &ty.members[4];
        assert_eq!(event.kind, MemberKind::Event);
        assert_eq!(
            event.implements.as_deref(),
            Some("Acme.Base.INotify.Changed")
        );
    }

    #[test]
    fn missing_assembly_name_rejected() {
        assert!(parse_manifest("namespace Foo\ntype Bar\n").is_err());
    }

    #[test]
    fn member_outside_type_rejected() {
        let err = parse_manifest("assembly A\n  method Foo\n").unwrap_err();
        assert!(err.to_string().contains("member outside a type"));
    }

    #[test]
    fn unrecognized_directive_rejected() {
        assert!(parse_manifest("assembly A\nbogus line\n").is_err());
    }

    #[test]
    fn params_without_names_keep_type() {
        let params = parse_params("System.String, count:System.Int32");
        assert_eq!(params[0].name, "System.String");
        assert_eq!(params[1].name, "count");
        assert_eq!(params[1].type_name, "System.Int32");
    }

    #[test]
    fn resolver_prefers_own_directory() {
        let own = tempfile::TempDir::new().unwrap();
        let search = tempfile::TempDir::new().unwrap();
        fs::write(own.path().join("Dep.dll"), "assembly Dep\n").unwrap();
        fs::write(search.path().join("Dep.dll"), "assembly Dep\n").unwrap();

        let resolver = DependencyResolver::new(own.path(), &[search.path().to_path_buf()]);
        let mut diag = Diagnostics::new();
        let resolved = resolver.resolve("Dep", &mut diag).unwrap();
        assert_eq!(resolved, own.path().join("Dep.dll"));
    }

    #[test]
    fn resolver_falls_back_to_alternate_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("Dep.winmd"), "assembly Dep\n").unwrap();

        let resolver = DependencyResolver::new(dir.path(), &[]);
        let mut diag = Diagnostics::new();
        let resolved = resolver.resolve("Dep", &mut diag).unwrap();
        assert_eq!(resolved, dir.path().join("Dep.winmd"));
    }

    #[test]
    fn resolver_reports_exhaustion() {
        let dir = tempfile::TempDir::new().unwrap();
        let resolver = DependencyResolver::new(dir.path(), &[]);
        let mut diag = Diagnostics::new();
        assert!(resolver.resolve("Missing", &mut diag).is_err());
        assert_eq!(diag.error_count(), 1);
    }
}
