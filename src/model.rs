//! Unified symbol-graph model — source-format agnostic.
//!
//! Every namespace, type, member and topic becomes a [`ModelNode`] keyed by
//! a deterministic string Identifier. Ownership is flat: the registry owns
//! the nodes, parent/child navigation goes through Identifiers.

use serde::{Deserialize, Serialize};

/// Prefix marking an identifier that refers to a symbol outside the loaded
/// sources. Lookup falls back to the unprefixed form.
pub const EXTERNAL_PREFIX: &str = "X:";

/// Member category carried in the identifier's kind prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    Field,
    Event,
}

impl MemberKind {
    pub fn prefix(self) -> char {
        match self {
            MemberKind::Method => 'M',
            MemberKind::Property => 'P',
            MemberKind::Field => 'F',
            MemberKind::Event => 'E',
        }
    }
}

/// Inheritance pointer declared by a documentation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InheritDoc {
    /// `<inheritdoc/>` — walk the override/implementation chain for the
    /// nearest documented base.
    Auto,
    /// `<inheritdoc cref="…"/>` — inherit from the named identifier.
    From(String),
}

/// Per-parameter description from a documentation block.
#[derive(Debug, Clone, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub text: String,
}

/// Parsed documentation content attached to a node.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DocBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Obsolete/deprecation message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obsolete: Option<String>,
    /// Property value description (`<value>` tag).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDoc>,
    #[serde(skip)]
    pub inherit: Option<InheritDoc>,
}

impl DocBlock {
    /// True when the block carries no prose at all. The nearest-base walk
    /// skips empty blocks.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.remarks.is_none()
            && self.example.is_none()
            && self.value.is_none()
            && self.returns.is_none()
            && self.params.is_empty()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.text.as_str())
    }
}

/// Declared relationships specific to a member.
#[derive(Debug, Default, Clone)]
pub struct MemberData {
    pub kind: Option<MemberKind>,
    /// Identifier of the overridden base member, if any.
    pub overrides: Option<String>,
    /// Identifier of the implemented interface member, if any.
    pub implements: Option<String>,
    /// Declared parameter names, in position order.
    pub param_names: Vec<String>,
}

/// Variant payload of a model node.
#[derive(Debug)]
pub enum NodeData {
    Namespace,
    Type {
        /// Identifier of the base type, if declared.
        base: Option<String>,
    },
    Member(MemberData),
    Topic,
}

/// One node of the Model Graph. Parent and children are Identifiers; the
/// registry resolves them, so upward links never own anything.
#[derive(Debug)]
pub struct ModelNode {
    pub id: String,
    /// Short display name (no container qualification).
    pub name: String,
    /// Merge group this node was produced from ("" for topics).
    pub merge_group: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub data: NodeData,
    pub doc: DocBlock,
}

impl ModelNode {
    pub fn namespace(id: String, name: String, merge_group: String) -> Self {
        ModelNode {
            id,
            name,
            merge_group,
            parent: None,
            children: Vec::new(),
            data: NodeData::Namespace,
            doc: DocBlock::default(),
        }
    }

    pub fn is_topic(&self) -> bool {
        matches!(self.data, NodeData::Topic)
    }

    pub fn is_member(&self) -> bool {
        matches!(self.data, NodeData::Member(_))
    }

    pub fn member(&self) -> Option<&MemberData> {
        match &self.data {
            NodeData::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            NodeData::Namespace => "namespace",
            NodeData::Type { .. } => "type",
            NodeData::Member(m) => match m.kind {
                Some(MemberKind::Method) => "method",
                Some(MemberKind::Property) => "property",
                Some(MemberKind::Field) => "field",
                Some(MemberKind::Event) => "event",
                None => "member",
            },
            NodeData::Topic => "topic",
        }
    }
}

/// Hand-authored documentation unit from the configuration. Parent owns its
/// sub-topics until registration flattens the tree into the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "topics")]
    pub sub_topics: Vec<Topic>,
}

/// Identifier construction — kind prefix + qualified name + signature
/// disambiguator, matching the doc-comment id convention.
pub mod ident {
    use super::MemberKind;

    pub fn namespace(full_name: &str) -> String {
        format!("N:{full_name}")
    }

    pub fn type_id(full_name: &str) -> String {
        format!("T:{full_name}")
    }

    /// Member id; parameterless members carry no parentheses.
    pub fn member(kind: MemberKind, type_full: &str, name: &str, param_types: &[String]) -> String {
        if param_types.is_empty() {
            format!("{}:{}.{}", kind.prefix(), type_full, name)
        } else {
            format!(
                "{}:{}.{}({})",
                kind.prefix(),
                type_full,
                name,
                param_types.join(",")
            )
        }
    }

    /// Strip the external-reference marker, if present.
    pub fn strip_external(id: &str) -> Option<&str> {
        id.strip_prefix(super::EXTERNAL_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_id_with_signature() {
        let id = ident::member(
            MemberKind::Method,
            "Acme.Text.StringHelper",
            "Trim",
            &["System.String".to_string()],
        );
        assert_eq!(id, "M:Acme.Text.StringHelper.Trim(System.String)");
    }

    #[test]
    fn member_id_parameterless() {
        let id = ident::member(MemberKind::Property, "Acme.Text.StringHelper", "Length", &[]);
        assert_eq!(id, "P:Acme.Text.StringHelper.Length");
    }

    #[test]
    fn external_marker_strips() {
        assert_eq!(ident::strip_external("X:T:Foo"), Some("T:Foo"));
        assert_eq!(ident::strip_external("T:Foo"), None);
    }

    #[test]
    fn empty_doc_block() {
        let mut doc = DocBlock::default();
        assert!(doc.is_empty());
        doc.summary = Some("hi".into());
        assert!(!doc.is_empty());
    }
}
