//! Contains pure functions for collecting nodes along each XPath axis.
//!
//! Every collector returns nodes in *axis order*: document order for forward axes,
//! nearest-first for reverse axes. Proximity positions in predicates depend on it.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};

/// Collects the nodes reachable from `node` along `axis`, in axis order.
pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N) -> Vec<N> {
    match axis {
        Axis::Child => node.children().collect(),
        Axis::Attribute => node.attributes().collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Descendant => descendants(node),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(descendants(node));
            nodes
        }
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(ancestors(node));
            nodes
        }
        Axis::FollowingSibling => following_siblings(node),
        Axis::PrecedingSibling => preceding_siblings(node),
        Axis::Following => following(node),
        Axis::Preceding => preceding(node),
    }
}

/// Pre-order walk below `node`, which yields document order.
pub fn descendants<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        results.push(current);
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        stack.extend(children);
    }
    results
}

pub fn ancestors<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut current = node.parent();
    while let Some(p) = current {
        results.push(p);
        current = p.parent();
    }
    results
}

/// Attributes have no siblings; the sibling axes are empty for them.
fn is_attribute<'a, N: DataSourceNode<'a>>(node: N) -> bool {
    node.node_type() == NodeType::Attribute
}

pub fn following_siblings<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    match node.parent() {
        Some(parent) if !is_attribute(node) => parent
            .children()
            .skip_while(|sibling| *sibling != node)
            .skip(1)
            .collect(),
        _ => vec![],
    }
}

pub fn preceding_siblings<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    match node.parent() {
        Some(parent) if !is_attribute(node) => {
            let mut siblings: Vec<N> = parent
                .children()
                .take_while(|sibling| *sibling != node)
                .collect();
            siblings.reverse();
            siblings
        }
        _ => vec![],
    }
}

pub fn following<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    // The content of an attribute's owner element follows the attribute.
    let mut current = if is_attribute(node) {
        let Some(owner) = node.parent() else {
            return results;
        };
        results.extend(descendants(owner));
        owner
    } else {
        node
    };
    loop {
        for sibling in following_siblings(current) {
            results.push(sibling);
            results.extend(descendants(sibling));
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    results
}

pub fn preceding<'a, N: DataSourceNode<'a>>(node: N) -> Vec<N> {
    let mut results = Vec::new();
    let mut current = node;
    if is_attribute(node) {
        match node.parent() {
            Some(owner) => current = owner,
            None => return results,
        }
    }
    loop {
        for sibling in preceding_siblings(current) {
            results.push(sibling);
            results.extend(descendants(sibling));
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    // Ancestors are excluded by construction; put the rest nearest-first.
    results.sort_unstable_by(|a, b| b.cmp(a));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::create_test_tree;

    #[test]
    fn test_collect_child() {
        let tree = create_test_tree();
        let root_el = tree.node(1);
        let ids: Vec<usize> = collect(Axis::Child, root_el).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 6, 7, 8]);
    }

    #[test]
    fn test_collect_ancestor() {
        let tree = create_test_tree();
        let text = tree.node(5);
        let ids: Vec<usize> = collect(Axis::Ancestor, text).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn test_collect_descendant_in_document_order() {
        let tree = create_test_tree();
        let ids: Vec<usize> = descendants(tree.root()).iter().map(|n| n.id).collect();
        // Attributes (3, 4) are not on the descendant axis.
        assert_eq!(ids, vec![1, 2, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_collect_siblings() {
        let tree = create_test_tree();
        let para1 = tree.node(2);
        let para2 = tree.node(8);

        let following: Vec<usize> = following_siblings(para1).iter().map(|n| n.id).collect();
        assert_eq!(following, vec![6, 7, 8]);

        let preceding: Vec<usize> = preceding_siblings(para2).iter().map(|n| n.id).collect();
        assert_eq!(preceding, vec![7, 6, 2]);

        assert!(following_siblings(tree.node(3)).is_empty());
    }

    #[test]
    fn test_collect_following_preceding() {
        let tree = create_test_tree();

        let following: Vec<usize> = following(tree.node(5)).iter().map(|n| n.id).collect();
        assert_eq!(following, vec![6, 7, 8, 9]);

        let preceding: Vec<usize> = preceding(tree.node(7)).iter().map(|n| n.id).collect();
        assert_eq!(preceding, vec![6, 5, 2]);

        let after_attr: Vec<usize> = super::following(tree.node(3)).iter().map(|n| n.id).collect();
        assert_eq!(after_attr, vec![5, 6, 7, 8, 9]);
    }
}
