//! Documentation Inheritance Resolver.
//!
//! Runs once, after the Model Graph is complete. Each member flagged with an
//! inheritance pointer gets the missing parts of its documentation copied
//! from the designated source: an explicit identifier, or the nearest
//! documented node along the override/implementation chain. A member's own
//! prose always wins; only empty fields are filled.

use crate::diag::Diagnostics;
use crate::model::{DocBlock, InheritDoc, MemberKind, ParamDoc};
use crate::registry::MemberRegistry;
use std::collections::HashSet;

/// Resolves every member on the registry's inherited-doc list.
pub fn resolve(registry: &mut MemberRegistry, diag: &mut Diagnostics) {
    for id in registry.take_inherited_doc_members() {
        resolve_member(&id, registry, diag);
    }
}

fn resolve_member(id: &str, registry: &mut MemberRegistry, diag: &mut Diagnostics) {
    let Some(node) = registry.find_by_id(id) else {
        return;
    };
    let pointer = node.doc.inherit.clone();

    let source_id = match pointer {
        Some(InheritDoc::From(target)) => match registry.find_by_id(&target) {
            Some(source) => Some(source.id.clone()),
            None => {
                diag.warning(format!(
                    "unresolved inheritdoc target [{target}] for [{id}]; keeping own documentation"
                ));
                None
            }
        },
        Some(InheritDoc::Auto) => nearest_documented_base(id, registry, diag),
        None => None,
    };

    let Some(source_id) = source_id else { return };
    let Some(source) = registry.find_by_id(&source_id) else {
        return;
    };
    let source_doc = source.doc.clone();
    let source_is_property = matches!(
        source.member().and_then(|m| m.kind),
        Some(MemberKind::Property)
    );

    if let Some(node) = registry.find_mut(id) {
        let is_property = matches!(
            node.member().and_then(|m| m.kind),
            Some(MemberKind::Property)
        );
        let param_names = node
            .member()
            .map(|m| m.param_names.clone())
            .unwrap_or_default();
        fill_missing(
            &mut node.doc,
            &source_doc,
            is_property && source_is_property,
            &param_names,
        );
    }
}

/// Walks the override/implementation chain from `id` until a node with
/// non-empty documentation is found or the chain ends. A visited set keyed
/// by identifier guards against malformed cyclic chains.
fn nearest_documented_base(
    id: &str,
    registry: &MemberRegistry,
    diag: &mut Diagnostics,
) -> Option<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = id.to_string();

    loop {
        visited.insert(current.clone());
        let node = registry.find_by_id(&current)?;
        let next_id = node
            .member()
            .and_then(|m| m.overrides.clone().or_else(|| m.implements.clone()))?;

        let Some(next) = registry.find_by_id(&next_id) else {
            diag.warning(format!(
                "unresolved base member [{next_id}] while inheriting documentation for [{id}]"
            ));
            return None;
        };
        if visited.contains(&next.id) {
            diag.warning(format!(
                "cyclic override chain detected at [{}] while inheriting documentation for [{id}]",
                next.id
            ));
            return None;
        }
        if !next.doc.is_empty() {
            return Some(next.id.clone());
        }
        current = next.id.clone();
    }
}

/// Copies fields the receiving block left empty. Parameter and return
/// descriptions only transfer for matching parameter names; the value
/// description only transfers between properties.
fn fill_missing(dst: &mut DocBlock, src: &DocBlock, copy_value: bool, param_names: &[String]) {
    if dst.summary.is_none() {
        dst.summary = src.summary.clone();
    }
    if dst.remarks.is_none() {
        dst.remarks = src.remarks.clone();
    }
    if dst.obsolete.is_none() {
        dst.obsolete = src.obsolete.clone();
    }
    if dst.returns.is_none() {
        dst.returns = src.returns.clone();
    }
    if copy_value && dst.value.is_none() {
        dst.value = src.value.clone();
    }
    for name in param_names {
        if dst.param(name).is_none() {
            if let Some(text) = src.param(name) {
                dst.params.push(ParamDoc {
                    name: name.clone(),
                    text: text.to_string(),
                });
            }
        }
    }
}
