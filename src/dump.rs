//! Model dump — JSON export of the completed graph.
//!
//! This is the surface handed to a downstream renderer: ordered namespaces
//! with nested types and members, resolved doc blocks, merge-group tags and
//! the topic tree. Children are resolved through the registry so the dump
//! mirrors registration order.

use crate::model::{ModelNode, NodeData};
use crate::registry::MemberRegistry;
use anyhow::Result;
use serde_json::{json, Map, Value};

/// Serializes the whole model, pretty-printed with a trailing newline.
pub fn render(registry: &MemberRegistry) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&model_json(registry))?;
    out.push('\n');
    Ok(out)
}

fn model_json(registry: &MemberRegistry) -> Value {
    json!({
        "symbols": registry.len(),
        "namespaces": collect(registry, registry.namespaces()),
        "topics": collect(registry, registry.topics()),
    })
}

fn collect(registry: &MemberRegistry, ids: &[String]) -> Vec<Value> {
    ids.iter()
        .filter_map(|id| registry.find_by_id(id))
        .map(|node| node_json(registry, node))
        .collect()
}

fn node_json(registry: &MemberRegistry, node: &ModelNode) -> Value {
    let mut obj = Map::new();
    obj.insert("id".into(), json!(node.id));
    obj.insert("name".into(), json!(node.name));
    obj.insert("kind".into(), json!(node.kind_name()));
    if !node.merge_group.is_empty() {
        obj.insert("merge_group".into(), json!(node.merge_group));
    }

    match &node.data {
        NodeData::Type { base: Some(base) } => {
            obj.insert("base".into(), json!(base));
        }
        NodeData::Member(m) => {
            if let Some(overrides) = &m.overrides {
                obj.insert("overrides".into(), json!(overrides));
            }
            if let Some(implements) = &m.implements {
                obj.insert("implements".into(), json!(implements));
            }
        }
        _ => {}
    }

    let doc = serde_json::to_value(&node.doc).unwrap_or(Value::Null);
    if doc.as_object().map(|o| !o.is_empty()).unwrap_or(false) {
        obj.insert("doc".into(), doc);
    }

    if !node.children.is_empty() {
        obj.insert("children".into(), json!(collect(registry, &node.children)));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostics;
    use crate::model::{DocBlock, ModelNode, Topic};

    #[test]
    fn dump_nests_children_in_order() {
        let mut registry = MemberRegistry::new();
        let mut ns = ModelNode::namespace(
            "N:Acme".to_string(),
            "Acme".to_string(),
            "core".to_string(),
        );
        ns.children.push("T:Acme.Helper".to_string());
        registry.register(ns);
        registry.register(ModelNode {
            id: "T:Acme.Helper".to_string(),
            name: "Helper".to_string(),
            merge_group: "core".to_string(),
            parent: Some("N:Acme".to_string()),
            children: Vec::new(),
            data: NodeData::Type { base: None },
            doc: DocBlock {
                summary: Some("A helper.".to_string()),
                ..DocBlock::default()
            },
        });

        let value = model_json(&registry);
        let ns = &value["namespaces"][0];
        assert_eq!(ns["id"], "N:Acme");
        assert_eq!(ns["merge_group"], "core");
        assert_eq!(ns["children"][0]["doc"]["summary"], "A helper.");
    }

    #[test]
    fn topics_appear_in_dump() {
        let mut registry = MemberRegistry::new();
        let mut diag = Diagnostics::new();
        registry.register_topic(
            Topic {
                id: "intro".to_string(),
                title: "Introduction".to_string(),
                summary: None,
                sub_topics: vec![],
            },
            &mut diag,
        );

        let value = model_json(&registry);
        assert_eq!(value["topics"][0]["name"], "Introduction");
        assert_eq!(value["topics"][0]["kind"], "topic");
    }
}
