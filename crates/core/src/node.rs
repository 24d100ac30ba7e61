//! Classification of matched nodes into the two kinds a table cell can hold.

use crate::error::QueryError;
use xmlquery_xpath1::{DataSourceNode, NodeType};

/// A node that can back a result cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef<N> {
    Element(N),
    Attribute(N),
}

impl<'a, N: DataSourceNode<'a>> NodeRef<N> {
    /// Fails with `UnsupportedNodeKind` for text, comments, processing instructions
    /// and the document root.
    pub fn classify(node: N) -> Result<Self, QueryError> {
        match node.node_type() {
            NodeType::Element => Ok(NodeRef::Element(node)),
            NodeType::Attribute => Ok(NodeRef::Attribute(node)),
            other => Err(QueryError::UnsupportedNodeKind(format!("{:?}", other))),
        }
    }

    pub fn node(&self) -> N {
        match self {
            NodeRef::Element(n) | NodeRef::Attribute(n) => *n,
        }
    }

    /// The name as written in the document, prefix included.
    pub fn qualified_name(&self) -> String {
        self.node().name().map(|q| q.to_string()).unwrap_or_default()
    }

    /// The value stored in a cell when no key is requested: the trimmed text directly
    /// inside an element, or an attribute's value as is.
    pub fn raw_value(&self) -> String {
        match self {
            NodeRef::Element(n) => {
                let text: String = n
                    .children()
                    .filter(|c| c.node_type() == NodeType::Text)
                    .map(|c| c.string_value())
                    .collect();
                text.trim().to_string()
            }
            NodeRef::Attribute(n) => n.string_value(),
        }
    }
}
