//! An implementation of the `DataSourceNode` trait for the `roxmltree` crate.

use crate::error::SourceError;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use xmlquery_xpath1::{DataSourceNode, NodeType, QName};

/// A wrapper around a `roxmltree::Document` that acts as the entry point
/// for querying an XML document.
///
/// The document owns every node; [`XmlNode`] handles borrow it and stay valid for as
/// long as the document does.
pub struct XmlDocument<'a> {
    doc: roxmltree::Document<'a>,
}

impl<'a> XmlDocument<'a> {
    /// Parses an XML string into a navigable document.
    pub fn parse(text: &'a str) -> Result<Self, SourceError> {
        let doc = roxmltree::Document::parse(text)?;
        log::debug!(
            "Parsed XML document with {} nodes",
            doc.descendants().count()
        );
        Ok(XmlDocument { doc })
    }

    /// Returns the root node of the document. In the XPath data model this is the
    /// parent of the document element, and the context `/` refers to.
    pub fn root_node(&'a self) -> XmlNode<'a> {
        XmlNode::Node(self.doc.root())
    }

    /// Returns the document element.
    pub fn root_element(&'a self) -> XmlNode<'a> {
        XmlNode::Node(self.doc.root_element())
    }
}

/// Any kind of node in the XML tree (element, attribute, text, etc.).
/// `roxmltree` treats `Node` and `Attribute` as distinct types, but the XPath data
/// model treats them both as nodes. This enum unifies them.
#[derive(Clone, Copy)]
pub enum XmlNode<'a> {
    Node(roxmltree::Node<'a, 'a>),
    Attribute {
        attr: roxmltree::Attribute<'a, 'a>,
        parent: roxmltree::Node<'a, 'a>,
        /// Position of the attribute on its element; fixes its document order.
        index: usize,
    },
}

impl<'a> XmlNode<'a> {
    /// Document-order key: an element sorts before its attributes, which sort before
    /// its children because children always have larger node ids.
    fn order_key(&self) -> (usize, usize) {
        match self {
            XmlNode::Node(n) => (n.id().get_usize(), 0),
            XmlNode::Attribute { parent, index, .. } => (parent.id().get_usize(), index + 1),
        }
    }
}

// Manual trait implementations are required because roxmltree's types don't derive them.
impl Debug for XmlNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlNode::Node(n) => n.fmt(f),
            XmlNode::Attribute { attr, .. } => attr.fmt(f),
        }
    }
}

impl PartialEq for XmlNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}
impl Eq for XmlNode<'_> {}

impl PartialOrd for XmlNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XmlNode<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

/// Splits a qualified name as written in the source into prefix and local part.
///
/// Two prefixes may be bound to one namespace, so the prefix is read back from the
/// document text. When the text does not spell out `local_part` (a name produced by
/// entity expansion, say), the first prefix in scope for the namespace is used instead.
fn qualified<'a>(
    scope: roxmltree::Node<'a, 'a>,
    written: &'a str,
    namespace: Option<&'a str>,
    local_part: &'a str,
) -> QName<'a> {
    let prefix = match written.split_once(':') {
        Some((prefix, local)) if local == local_part => Some(prefix),
        None if written == local_part => None,
        _ => namespace.and_then(|uri| scope.lookup_prefix(uri)),
    };
    QName { prefix, local_part }
}

/// The tag name of an element as it appears in its start tag.
fn written_tag<'a>(n: roxmltree::Node<'a, 'a>) -> &'a str {
    let start = n.document().input_text().get(n.range()).unwrap_or("");
    let tag = start.strip_prefix('<').unwrap_or("");
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(tag.len());
    &tag[..end]
}

impl<'a> DataSourceNode<'a> for XmlNode<'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Node(n) => match n.node_type() {
                roxmltree::NodeType::Root => NodeType::Root,
                roxmltree::NodeType::Element => NodeType::Element,
                roxmltree::NodeType::Text => NodeType::Text,
                roxmltree::NodeType::Comment => NodeType::Comment,
                roxmltree::NodeType::PI => NodeType::ProcessingInstruction,
            },
            XmlNode::Attribute { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Node(n) if n.is_element() => {
                let tag_name = n.tag_name();
                Some(qualified(*n, written_tag(*n), tag_name.namespace(), tag_name.name()))
            }
            XmlNode::Node(n) => n.pi().map(|pi| QName {
                prefix: None,
                local_part: pi.target,
            }),
            XmlNode::Attribute { attr, parent, .. } => {
                let input = parent.document().input_text();
                let written = input.get(attr.range_qname()).unwrap_or("");
                Some(qualified(*parent, written, attr.namespace(), attr.name()))
            }
        }
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        match self {
            XmlNode::Node(n) if n.is_element() => n.tag_name().namespace(),
            XmlNode::Node(_) => None,
            XmlNode::Attribute { attr, .. } => attr.namespace(),
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Attribute { attr, .. } => attr.value().to_string(),
            XmlNode::Node(n) if n.is_root() || n.is_element() => n
                .descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect(),
            XmlNode::Node(n) => match n.pi() {
                Some(pi) => pi.value.unwrap_or("").to_string(),
                None => n.text().unwrap_or("").to_string(),
            },
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(n) if n.is_element() => {
                let parent = *n;
                Box::new(
                    n.attributes()
                        .enumerate()
                        .map(move |(index, attr)| XmlNode::Attribute { attr, parent, index }),
                )
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(n) => Box::new(
                n.children()
                    // Implicit strip-space: whitespace-only text nodes are not part of the tree.
                    .filter(|c| !c.is_text() || c.text().is_some_and(|t| !t.trim().is_empty()))
                    .map(XmlNode::Node),
            ),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Node(n) => n.parent().map(XmlNode::Node),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Node(*parent)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlquery_xpath1::{CompiledQuery, select_nodes};

    const TEST_XML: &str = r#"<root id="rootId" xmlns:ns="http://example.com/ns" ns:attr="val">
        <child1>Hello</child1>
        <child2 type="a">
            <grandchild/>
        </child2>
        <!-- comment -->
        <ns:child1> World</ns:child1>
    </root>"#;

    #[test]
    fn test_parse_and_get_root() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let root = doc.root_node();
        assert_eq!(root.node_type(), NodeType::Root);
        let doc_element = root.children().find(|n| n.node_type() == NodeType::Element).unwrap();
        assert_eq!(doc_element.name().unwrap().local_part, "root");
        assert_eq!(doc_element, doc.root_element());
    }

    #[test]
    fn test_node_navigation() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let doc_element = doc.root_element();

        let children: Vec<_> = doc_element
            .children()
            .filter(|n| n.node_type() == NodeType::Element)
            .collect();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].string_value(), "Hello");
        assert_eq!(children[1].parent().unwrap(), doc_element);
        // The comment survives as a child; whitespace-only text does not.
        assert_eq!(doc_element.children().count(), 4);
    }

    #[test]
    fn test_prefixed_names() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let doc_element = doc.root_element();
        let names: Vec<String> = doc_element
            .attributes()
            .map(|a| a.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["id", "ns:attr"]);

        let last = doc_element.children().last().unwrap();
        assert_eq!(last.name().unwrap().to_string(), "ns:child1");
    }

    #[test]
    fn test_names_keep_the_prefix_as_written() {
        let xml = r#"<r xmlns="urn:x" xmlns:p="urn:x" xmlns:q="urn:y"><p:a q:k="1"/><a/></r>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let children: Vec<_> = doc.root_element().children().collect();
        assert_eq!(children[0].name().unwrap().to_string(), "p:a");
        assert_eq!(children[1].name().unwrap().to_string(), "a");
        let attr = children[0].attributes().next().unwrap();
        assert_eq!(attr.name().unwrap().to_string(), "q:k");
        assert_eq!(doc.root_element().name().unwrap().to_string(), "r");
    }

    #[test]
    fn test_unprefixed_name_tests_match_any_namespace() {
        let xml = r#"<r xmlns="urn:x" xmlns:p="urn:y"><item/><p:item/></r>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(select_nodes(doc.root_node(), "/r/item").unwrap().len(), 2);
        let prefixed = select_nodes(doc.root_node(), "//p:item").unwrap();
        assert_eq!(prefixed.len(), 1);
        assert_eq!(prefixed[0].namespace_uri(), Some("urn:y"));
    }

    #[test]
    fn test_namespace_uri() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let doc_element = doc.root_element();
        assert_eq!(doc_element.namespace_uri(), None);
        let ns_attr = doc_element.attributes().nth(1).unwrap();
        assert_eq!(ns_attr.namespace_uri(), Some("http://example.com/ns"));

        let query = CompiledQuery::compile("namespace-uri(//ns:child1)").unwrap();
        let uri = query.evaluate(doc.root_node()).unwrap();
        assert_eq!(uri.to_string(), "http://example.com/ns");

        let lang = XmlDocument::parse(r#"<a xml:lang="de-AT"><b/></a>"#).unwrap();
        let query = CompiledQuery::compile("//b[lang('de')]").unwrap();
        assert_eq!(query.select(lang.root_node()).unwrap().len(), 1);
    }

    #[test]
    fn test_document_order_places_attributes_before_children() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let doc_element = doc.root_element();
        let attr = doc_element.attributes().next().unwrap();
        let first_child = doc_element.children().next().unwrap();
        assert!(doc_element < attr);
        assert!(attr < first_child);
        assert_eq!(attr.parent(), Some(doc_element));
    }

    #[test]
    fn test_queries_over_roxmltree() {
        let doc = XmlDocument::parse(TEST_XML).unwrap();
        let nodes = select_nodes(doc.root_node(), "/root/child2/@type").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].string_value(), "a");

        let both = select_nodes(doc.root_node(), "//child1").unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both[1].string_value(), " World");
    }

    #[test]
    fn test_malformed_xml_is_reported() {
        let err = XmlDocument::parse("<a><b></a>").err().unwrap();
        assert!(matches!(err, SourceError::Xml(_)));
    }
}
