//! Lookups for XML-Schema documents, keyed by the local name of an element.
//!
//! These work on any [`DataSourceNode`] so they can be applied to query results
//! as well as to nodes reached by navigation.

use crate::error::SourceError;
use xmlquery_xpath1::{DataSourceNode, NodeType};

/// The structural role of an XML-Schema element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticKind {
    Schema,
    All,
    ComplexType,
    Sequence,
    Group,
    AttributeGroup,
    Choice,
    Any,
    AnyAttribute,
    Attribute,
    ComplexContent,
    SimpleContent,
    SimpleType,
    Element,
}

const KINDS: &[(&str, SemanticKind)] = &[
    ("schema", SemanticKind::Schema),
    ("all", SemanticKind::All),
    ("complexType", SemanticKind::ComplexType),
    ("sequence", SemanticKind::Sequence),
    ("group", SemanticKind::Group),
    ("attributeGroup", SemanticKind::AttributeGroup),
    ("choice", SemanticKind::Choice),
    ("any", SemanticKind::Any),
    ("anyAttribute", SemanticKind::AnyAttribute),
    ("attribute", SemanticKind::Attribute),
    ("complexContent", SemanticKind::ComplexContent),
    ("simpleContent", SemanticKind::SimpleContent),
    ("simpleType", SemanticKind::SimpleType),
    ("element", SemanticKind::Element),
];

impl SemanticKind {
    /// Looks up the kind for an unprefixed tag name.
    pub fn of(tag: &str) -> Option<SemanticKind> {
        KINDS.iter().find(|(name, _)| *name == tag).map(|(_, kind)| *kind)
    }

    /// The kind of an element node; `None` for other nodes and unknown tags.
    pub fn of_node<'a, N: DataSourceNode<'a>>(node: N) -> Option<SemanticKind> {
        if node.node_type() != NodeType::Element {
            return None;
        }
        node.name().and_then(|name| Self::of(name.local_part))
    }

    pub fn tag(&self) -> &'static str {
        KINDS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }
}

fn find_attribute<'a, N: DataSourceNode<'a>>(node: N, name: &str) -> Option<N> {
    node.attributes()
        .find(|attr| attr.name().is_some_and(|q| q.prefix.is_none() && q.local_part == name))
}

/// Returns the value of an unprefixed attribute, failing if the element lacks it.
pub fn attribute_value<'a, N: DataSourceNode<'a>>(node: N, name: &str) -> Result<String, SourceError> {
    find_attribute(node, name)
        .map(|attr| attr.string_value())
        .ok_or_else(|| SourceError::MissingAttribute {
            element: node
                .name()
                .map(|q| q.to_string())
                .unwrap_or_default(),
            attribute: name.to_string(),
        })
}

/// An element that points at a global declaration through `ref="..."`.
pub fn is_ref_element<'a, N: DataSourceNode<'a>>(node: N) -> bool {
    find_attribute(node, "ref").is_some()
}
