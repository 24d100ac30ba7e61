//! Defines the core abstraction for a navigable, read-only data source tree.
use std::fmt;
use std::hash::Hash;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

impl fmt::Display for QName<'_> {
    /// Formats the name as it would be written in the document, e.g. `xs:element`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) if !prefix.is_empty() => write!(f, "{}:{}", prefix, self.local_part),
            _ => f.write_str(self.local_part),
        }
    }
}

/// The type of a node in the data source tree, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// The universal contract for a node in a read-only, hierarchical data source.
///
/// The XPath engine is written exclusively against this trait. Nodes are cheap `Copy`
/// handles into a tree owned elsewhere; `'a` is the lifetime of that tree.
///
/// `Ord` must follow document order: a node sorts before its attributes, its attributes
/// sort before its children, and children sort in the order they appear.
pub trait DataSourceNode<'a>:
    fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    /// The type of the node (Element, Text, Attribute, etc.).
    fn node_type(&self) -> NodeType;

    /// The qualified name of the node. Returns `None` for node types that do not have
    /// names, such as text or root nodes. For a processing-instruction, this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The namespace URI of an element or attribute name. Sources without namespace
    /// information report `None`, which `namespace-uri()` turns into an empty string.
    fn namespace_uri(&self) -> Option<&'a str> {
        None
    }

    /// The string value of the node, as defined by the XPath 1.0 `string()` function.
    /// - For a text node, this is its content.
    /// - For an element or the root, the concatenation of all descendant text nodes.
    /// - For an attribute, this is its value.
    fn string_value(&self) -> String;

    /// An iterator over the attribute nodes of this node.
    /// The iterator will be empty for non-element nodes.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// An iterator over the child nodes of this node, in document order.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The parent node. Attributes report their owning element as parent.
    /// Returns `None` only for the root node.
    fn parent(&self) -> Option<Self>;

    /// Walks the parent chain up to the root of the tree.
    fn root(&self) -> Self {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        prefix: Option<String>,
        name: Option<String>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// An in-memory tree for exercising the engine without a real XML parser.
    ///
    /// Node ids are handed out in creation order and double as the document order, so
    /// attributes must be added to an element before any of its children.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    impl Default for MockTree {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTree {
        /// Creates a tree holding only the root node (id 0).
        pub fn new() -> Self {
            MockTree {
                nodes: vec![MockNodeData {
                    node_type: NodeType::Root,
                    prefix: None,
                    name: None,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                }],
            }
        }

        fn push(&mut self, parent: usize, data: MockNodeData) -> usize {
            let id = self.nodes.len();
            self.nodes.push(MockNodeData {
                parent: Some(parent),
                ..data
            });
            id
        }

        fn leaf(node_type: NodeType, name: Option<&str>, value: &str) -> MockNodeData {
            let (prefix, local) = match name.and_then(|n| n.split_once(':')) {
                Some((p, l)) => (Some(p.to_string()), Some(l.to_string())),
                None => (None, name.map(str::to_string)),
            };
            MockNodeData {
                node_type,
                prefix,
                name: local,
                value: value.to_string(),
                parent: None,
                children: vec![],
                attributes: vec![],
            }
        }

        pub fn element(&mut self, parent: usize, name: &str) -> usize {
            let id = self.push(parent, Self::leaf(NodeType::Element, Some(name), ""));
            self.nodes[parent].children.push(id);
            id
        }

        pub fn attribute(&mut self, owner: usize, name: &str, value: &str) -> usize {
            let id = self.push(owner, Self::leaf(NodeType::Attribute, Some(name), value));
            self.nodes[owner].attributes.push(id);
            id
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            let id = self.push(parent, Self::leaf(NodeType::Text, None, value));
            self.nodes[parent].children.push(id);
            id
        }

        pub fn comment(&mut self, parent: usize, value: &str) -> usize {
            let id = self.push(parent, Self::leaf(NodeType::Comment, None, value));
            self.nodes[parent].children.push(id);
            id
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }

        pub fn root(&self) -> MockNode<'_> {
            self.node(0)
        }
    }

    /// A node handle that holds a reference to its tree so it can navigate itself.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}

    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl Hash for MockNode<'_> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> MockNode<'a> {
        fn data(&self) -> &'a MockNodeData {
            &self.tree.nodes[self.id]
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.data().node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            let data = self.data();
            data.name.as_deref().map(|local_part| QName {
                prefix: data.prefix.as_deref(),
                local_part,
            })
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => {
                    let mut s = String::new();
                    let mut stack: Vec<MockNode<'a>> = self.children().collect();
                    stack.reverse();
                    while let Some(node) = stack.pop() {
                        if node.node_type() == NodeType::Text {
                            s.push_str(&node.data().value);
                        }
                        let mut children: Vec<_> = node.children().collect();
                        children.reverse();
                        stack.extend(children);
                    }
                    s
                }
                _ => self.data().value.clone(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                self.data()
                    .attributes
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(
                self.data()
                    .children
                    .iter()
                    .map(move |&id| MockNode { id, tree }),
            )
        }

        fn parent(&self) -> Option<Self> {
            self.data().parent.map(|id| MockNode {
                id,
                tree: self.tree,
            })
        }
    }

    /// Creates a simple mock tree for testing:
    /// ```text
    /// <root>                                   <!-- id 1 -->
    ///   <para id="p1" xml:lang="en">Hello</para> <!-- id 2, attrs 3 & 4, text 5 -->
    ///   <!-- note -->                          <!-- id 6 -->
    ///   <div/>                                 <!-- id 7 -->
    ///   <para>World</para>                     <!-- id 8, text 9 -->
    /// </root>
    /// ```
    /// The document root node is id 0.
    pub fn create_test_tree() -> MockTree {
        let mut tree = MockTree::new();
        let root = tree.element(0, "root");
        let para = tree.element(root, "para");
        tree.attribute(para, "id", "p1");
        tree.attribute(para, "xml:lang", "en");
        tree.text(para, "Hello");
        tree.comment(root, " note ");
        tree.element(root, "div");
        let para2 = tree.element(root, "para");
        tree.text(para2, "World");
        tree
    }

    #[cfg(test)]
    mod mock_tests {
        use super::*;

        #[test]
        fn test_mock_tree_navigation() {
            let tree = create_test_tree();
            let root = tree.root();
            let doc_element = root.children().next().unwrap();
            assert_eq!(doc_element.name().unwrap().local_part, "root");
            assert_eq!(doc_element.children().count(), 4);
            assert_eq!(doc_element.string_value(), "HelloWorld");

            let lang = tree.node(4);
            assert_eq!(lang.name().unwrap().to_string(), "xml:lang");
            assert_eq!(lang.parent(), Some(tree.node(2)));
            assert_eq!(lang.root(), root);
        }
    }
}
