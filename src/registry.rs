//! Member Registry — the global identifier-to-node map over the Model Graph.
//!
//! Registration order is preserved (namespaces list, children vectors) so a
//! run produces reproducible output. An identifier, once registered, maps to
//! the same node for the lifetime of the run: re-registration is a no-op.

use crate::diag::Diagnostics;
use crate::model::{ident, DocBlock, ModelNode, NodeData, Topic};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemberRegistry {
    nodes: HashMap<String, ModelNode>,
    /// Namespace ids in registration order.
    namespaces: Vec<String>,
    /// Root topic ids in registration order.
    topics: Vec<String>,
    /// Member ids whose doc block declares an inheritance pointer.
    /// Appended at registration time, consumed once by the resolver.
    inherited_doc_members: Vec<String>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node under its identifier. Returns false on collision;
    /// the first registration always wins.
    pub fn register(&mut self, node: ModelNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }

        if node.is_member() && node.doc.inherit.is_some() {
            self.inherited_doc_members.push(node.id.clone());
        }
        if matches!(node.data, NodeData::Namespace) {
            self.namespaces.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Registers a topic and all its sub-topics, depth-first, parent before
    /// children.
    ///
    /// A pre-existing topic under the same id is a duplicate declaration:
    /// reported, skipped. A pre-existing code symbol under the same id is
    /// expected (a topic annotating a class) and wins silently.
    pub fn register_topic(&mut self, topic: Topic, diag: &mut Diagnostics) {
        self.register_topic_inner(topic, None, diag);
    }

    fn register_topic_inner(&mut self, topic: Topic, parent: Option<String>, diag: &mut Diagnostics) {
        if let Some(existing) = self.find_by_id(&topic.id) {
            if existing.is_topic() {
                diag.error(format!("the topic [{}] is already declared", topic.id));
            }
            // A code symbol under this id keeps its place; the topic is
            // merely an annotation and is not registered.
            return;
        }

        let node = ModelNode {
            id: topic.id.clone(),
            name: topic.title,
            merge_group: String::new(),
            parent: parent.clone(),
            children: topic.sub_topics.iter().map(|t| t.id.clone()).collect(),
            data: NodeData::Topic,
            doc: DocBlock {
                summary: topic.summary,
                ..DocBlock::default()
            },
        };
        let id = node.id.clone();
        self.register(node);
        if parent.is_none() {
            self.topics.push(id.clone());
        }

        for sub in topic.sub_topics {
            self.register_topic_inner(sub, Some(id.clone()), diag);
        }
    }

    /// Looks up a node by identifier. An id carrying the external marker
    /// falls back to the unmarked form when the direct lookup misses.
    pub fn find_by_id(&self, id: &str) -> Option<&ModelNode> {
        self.nodes.get(id).or_else(|| {
            ident::strip_external(id)
                .and_then(|stripped| self.nodes.get(stripped))
        })
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ModelNode> {
        if self.nodes.contains_key(id) {
            return self.nodes.get_mut(id);
        }
        match ident::strip_external(id) {
            Some(stripped) => self.nodes.get_mut(stripped),
            None => None,
        }
    }

    /// Namespace ids in registration order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Root topic ids in registration order.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Hands the inherited-doc member list to the resolver. Consumed once.
    pub fn take_inherited_doc_members(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inherited_doc_members)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocBlock, InheritDoc, MemberData, MemberKind};

    fn type_node(id: &str) -> ModelNode {
        ModelNode {
            id: id.to_string(),
            name: id.rsplit('.').next().unwrap().to_string(),
            merge_group: "default".to_string(),
            parent: None,
            children: Vec::new(),
            data: NodeData::Type { base: None },
            doc: DocBlock::default(),
        }
    }

    fn member_node(id: &str, inherit: Option<InheritDoc>) -> ModelNode {
        ModelNode {
            id: id.to_string(),
            name: "m".to_string(),
            merge_group: "default".to_string(),
            parent: None,
            children: Vec::new(),
            data: NodeData::Member(MemberData {
                kind: Some(MemberKind::Method),
                ..MemberData::default()
            }),
            doc: DocBlock {
                inherit,
                ..DocBlock::default()
            },
        }
    }

    fn topic(id: &str, subs: Vec<Topic>) -> Topic {
        Topic {
            id: id.to_string(),
            title: id.to_string(),
            summary: None,
            sub_topics: subs,
        }
    }

    #[test]
    fn register_is_idempotent_first_wins() {
        let mut reg = MemberRegistry::new();
        let mut first = type_node("T:Foo");
        first.name = "first".to_string();
        let mut second = type_node("T:Foo");
        second.name = "second".to_string();

        assert!(reg.register(first));
        assert!(!reg.register(second));
        assert_eq!(reg.find_by_id("T:Foo").unwrap().name, "first");
    }

    #[test]
    fn external_id_falls_back() {
        let mut reg = MemberRegistry::new();
        reg.register(type_node("T:Foo"));
        assert!(reg.find_by_id("X:T:Foo").is_some());
        assert!(reg.find_by_id("X:T:Bar").is_none());
    }

    #[test]
    fn namespaces_keep_registration_order() {
        let mut reg = MemberRegistry::new();
        for name in ["N:Zeta", "N:Alpha", "N:Mid"] {
            reg.register(ModelNode::namespace(
                name.to_string(),
                name[2..].to_string(),
                "default".to_string(),
            ));
        }
        assert_eq!(reg.namespaces(), &["N:Zeta", "N:Alpha", "N:Mid"]);
    }

    #[test]
    fn inherited_doc_members_collected_once() {
        let mut reg = MemberRegistry::new();
        reg.register(member_node("M:Foo.A", Some(InheritDoc::Auto)));
        reg.register(member_node("M:Foo.B", None));
        // Second registration of the same id must not duplicate the entry.
        reg.register(member_node("M:Foo.A", Some(InheritDoc::Auto)));

        assert_eq!(reg.take_inherited_doc_members(), vec!["M:Foo.A"]);
        assert!(reg.take_inherited_doc_members().is_empty());
    }

    #[test]
    fn duplicate_topic_is_reported() {
        let mut reg = MemberRegistry::new();
        let mut diag = Diagnostics::new();
        reg.register_topic(topic("intro", vec![]), &mut diag);
        reg.register_topic(topic("intro", vec![]), &mut diag);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn topic_never_overwrites_code_symbol() {
        let mut reg = MemberRegistry::new();
        let mut diag = Diagnostics::new();
        reg.register(type_node("T:Foo"));
        reg.register_topic(topic("T:Foo", vec![]), &mut diag);

        assert_eq!(diag.error_count(), 0);
        assert!(!reg.find_by_id("T:Foo").unwrap().is_topic());
        assert!(reg.topics().is_empty());
    }

    #[test]
    fn subtopics_register_depth_first() {
        let mut reg = MemberRegistry::new();
        let mut diag = Diagnostics::new();
        let tree = topic("root", vec![topic("a", vec![topic("a1", vec![])]), topic("b", vec![])]);
        reg.register_topic(tree, &mut diag);

        assert_eq!(reg.topics(), &["root"]);
        let root = reg.find_by_id("root").unwrap();
        assert_eq!(root.children, vec!["a", "b"]);
        assert_eq!(reg.find_by_id("a1").unwrap().parent.as_deref(), Some("a"));
    }
}
