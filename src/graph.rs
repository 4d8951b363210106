//! Model Graph builder — populates the registry from reconciled sources.
//!
//! Every node is registered as it is created, so the identifier index and
//! the inherited-doc list are complete the moment the last source is
//! processed. Namespaces shared across sources merge; any other identifier
//! collision keeps the first registration.

use crate::diag::Diagnostics;
use crate::loader::metadata::{MemberDecl, NamespaceDecl, TypeDecl};
use crate::loader::reconcile::PairedSource;
use crate::loader::xmldoc::DocFile;
use crate::model::{ident, DocBlock, MemberData, ModelNode, NodeData};
use crate::registry::MemberRegistry;

/// Builds graph nodes for every paired source, in order.
pub fn build(sources: Vec<PairedSource>, registry: &mut MemberRegistry, diag: &mut Diagnostics) {
    for source in sources {
        for ns in &source.metadata.namespaces {
            build_namespace(ns, &source.doc, &source.merge_group, registry, diag);
        }
    }
}

fn build_namespace(
    ns: &NamespaceDecl,
    doc: &DocFile,
    merge_group: &str,
    registry: &mut MemberRegistry,
    diag: &mut Diagnostics,
) {
    let ns_id = ident::namespace(&ns.name);
    let mut node = ModelNode::namespace(ns_id.clone(), ns.name.clone(), merge_group.to_string());
    node.doc = doc_block(doc, &ns_id);
    // A namespace seen before is a merge across sources, not a collision.
    registry.register(node);

    for ty in &ns.types {
        build_type(ty, &ns.name, &ns_id, doc, merge_group, registry, diag);
    }
}

fn build_type(
    ty: &TypeDecl,
    ns_name: &str,
    ns_id: &str,
    doc: &DocFile,
    merge_group: &str,
    registry: &mut MemberRegistry,
    diag: &mut Diagnostics,
) {
    let full_name = format!("{}.{}", ns_name, ty.name);
    let ty_id = ident::type_id(&full_name);
    let node = ModelNode {
        id: ty_id.clone(),
        name: ty.name.clone(),
        merge_group: merge_group.to_string(),
        parent: Some(ns_id.to_string()),
        children: Vec::new(),
        data: NodeData::Type {
            base: ty.base.as_deref().map(ident::type_id),
        },
        doc: doc_block(doc, &ty_id),
    };

    if registry.register(node) {
        if let Some(ns_node) = registry.find_mut(ns_id) {
            ns_node.children.push(ty_id.clone());
        }
    } else {
        diag.warning(format!(
            "duplicate identifier [{}]; first registration wins",
            ty_id
        ));
    }

    for member in &ty.members {
        build_member(member, &full_name, &ty_id, doc, merge_group, registry, diag);
    }
}

fn build_member(
    member: &MemberDecl,
    type_full: &str,
    ty_id: &str,
    doc: &DocFile,
    merge_group: &str,
    registry: &mut MemberRegistry,
    diag: &mut Diagnostics,
) {
    let param_types: Vec<String> = member.params.iter().map(|p| p.type_name.clone()).collect();
    let id = ident::member(member.kind, type_full, &member.name, &param_types);
    let prefix = member.kind.prefix();

    let node = ModelNode {
        id: id.clone(),
        name: member.name.clone(),
        merge_group: merge_group.to_string(),
        parent: Some(ty_id.to_string()),
        children: Vec::new(),
        data: NodeData::Member(MemberData {
            kind: Some(member.kind),
            overrides: member.overrides.as_ref().map(|o| format!("{prefix}:{o}")),
            implements: member.implements.as_ref().map(|i| format!("{prefix}:{i}")),
            param_names: member.params.iter().map(|p| p.name.clone()).collect(),
        }),
        doc: doc_block(doc, &id),
    };

    if registry.register(node) {
        if let Some(ty_node) = registry.find_mut(ty_id) {
            ty_node.children.push(id);
        }
    } else {
        diag.warning(format!(
            "duplicate identifier [{}]; first registration wins",
            id
        ));
    }
}

fn doc_block(doc: &DocFile, id: &str) -> DocBlock {
    doc.member(id).cloned().unwrap_or_default()
}
