//! Absolute locations of elements and attributes.
//!
//! A location names a node by its position in the tree:
//!
//! - the document element: `/order`
//! - any other element: `/order/item[2]`, where the index counts preceding siblings
//!   with the same local name, starting at 1
//! - an attribute: `/order/item[2]@sku`
//!
//! Names keep their prefix as written in the document.

use crate::error::QueryError;
use crate::node::NodeRef;
use std::collections::HashMap;
use xmlquery_xpath1::{DataSourceNode, NodeType};

/// Computes locations, optionally remembering those already seen.
///
/// Locations only depend on tree position, so the cache never goes stale for the
/// lifetime of the document.
#[derive(Debug)]
pub struct LocationResolver<N> {
    cache: Option<HashMap<N, String>>,
}

impl<N> Default for LocationResolver<N> {
    fn default() -> Self {
        Self { cache: None }
    }
}

impl<'a, N: DataSourceNode<'a>> LocationResolver<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver that remembers every element it has located, so siblings and
    /// descendants do not recompute their ancestors' paths.
    pub fn memoized() -> Self {
        Self {
            cache: Some(HashMap::new()),
        }
    }

    /// Fails with `UnsupportedNodeKind` unless `node` is an element or an attribute.
    pub fn resolve(&mut self, node: N) -> Result<String, QueryError> {
        match NodeRef::classify(node)? {
            NodeRef::Element(element) => Ok(self.element_location(element)),
            NodeRef::Attribute(attr) => {
                let owner = attr
                    .parent()
                    .map(|p| self.element_location(p))
                    .unwrap_or_default();
                Ok(format!("{}@{}", owner, NodeRef::Attribute(attr).qualified_name()))
            }
        }
    }

    fn element_location(&mut self, element: N) -> String {
        if let Some(location) = self.cache.as_ref().and_then(|c| c.get(&element)) {
            return location.clone();
        }
        let name = NodeRef::Element(element).qualified_name();
        let location = match element.parent() {
            Some(parent) if parent.node_type() == NodeType::Element => {
                let base = self.element_location(parent);
                format!("{}/{}[{}]", base, name, sibling_ordinal(parent, element))
            }
            _ => format!("/{}", name),
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(element, location.clone());
        }
        location
    }
}

/// Resolves a single location without caching.
pub fn absolute_location<'a, N: DataSourceNode<'a>>(node: N) -> Result<String, QueryError> {
    LocationResolver::new().resolve(node)
}

fn same_local_name<'a, N: DataSourceNode<'a>>(a: N, b: N) -> bool {
    a.node_type() == NodeType::Element
        && a.name().map(|q| q.local_part) == b.name().map(|q| q.local_part)
}

/// 1-based position of `element` among its parent's children of the same local name.
fn sibling_ordinal<'a, N: DataSourceNode<'a>>(parent: N, element: N) -> usize {
    parent
        .children()
        .take_while(|c| *c != element)
        .filter(|c| same_local_name(*c, element))
        .count()
        + 1
}

/// Maps every element and attribute location in a document back to its node.
#[derive(Debug, Clone)]
pub struct LocationIndex<N> {
    nodes: HashMap<String, N>,
}

impl<'a, N: DataSourceNode<'a> + 'a> LocationIndex<N> {
    /// Indexes the subtree under `root`, which may be the document root or the
    /// document element.
    pub fn build(root: N) -> Self {
        let mut index = Self {
            nodes: HashMap::new(),
        };
        let top: Vec<N> = if root.node_type() == NodeType::Root {
            root.children()
                .filter(|c| c.node_type() == NodeType::Element)
                .collect()
        } else {
            vec![root]
        };
        for element in top {
            let location = format!("/{}", NodeRef::Element(element).qualified_name());
            index.visit(element, location);
        }
        log::debug!("Indexed {} locations", index.nodes.len());
        index
    }

    fn visit(&mut self, element: N, location: String) {
        for attr in element.attributes() {
            let attr_location = format!("{}@{}", location, NodeRef::Attribute(attr).qualified_name());
            self.nodes.insert(attr_location, attr);
        }
        let mut ordinals: HashMap<&'a str, usize> = HashMap::new();
        for child in element.children() {
            if child.node_type() != NodeType::Element {
                continue;
            }
            let Some(name) = child.name() else { continue };
            let ordinal = ordinals.entry(name.local_part).or_insert(0);
            *ordinal += 1;
            let child_location = format!("{}/{}[{}]", location, name, ordinal);
            self.visit(child, child_location);
        }
        self.nodes.insert(location, element);
    }

    pub fn get(&self, location: &str) -> Option<N> {
        self.nodes.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All indexed locations, in the document order of their nodes.
    pub fn locations(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &N)> = self.nodes.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        entries.into_iter().map(|(loc, _)| loc.as_str()).collect()
    }
}
