//! Binary operator semantics, including the XPath 1.0 rules for comparing node-sets.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, document_order, string_to_number};
use crate::error::XPathError;

/// A non-node-set operand after node-sets have been expanded into string values.
#[derive(Debug, Clone, PartialEq)]
enum Atom {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Atom {
    fn number(&self) -> f64 {
        match self {
            Atom::String(s) => string_to_number(s),
            Atom::Number(n) => *n,
            Atom::Boolean(b) => f64::from(u8::from(*b)),
        }
    }

    fn boolean(&self) -> bool {
        match self {
            Atom::String(s) => !s.is_empty(),
            Atom::Number(n) => *n != 0.0 && !n.is_nan(),
            Atom::Boolean(b) => *b,
        }
    }
}

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    let result = match op {
        BinaryOperator::Or => XPathValue::Boolean(left.to_bool() || right.to_bool()),
        BinaryOperator::And => XPathValue::Boolean(left.to_bool() && right.to_bool()),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => XPathValue::Boolean(compare(op, left, right)),
        BinaryOperator::Plus => XPathValue::Number(left.to_number() + right.to_number()),
        BinaryOperator::Minus => XPathValue::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => XPathValue::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => XPathValue::Number(left.to_number() / right.to_number()),
        // Rust's `%` truncates like XPath's `mod`: the result takes the dividend's sign.
        BinaryOperator::Modulo => XPathValue::Number(left.to_number() % right.to_number()),
        BinaryOperator::Union => match (left, right) {
            (XPathValue::NodeSet(mut l), XPathValue::NodeSet(r)) => {
                l.extend(r);
                XPathValue::NodeSet(document_order(l))
            }
            _ => {
                return Err(XPathError::TypeError(
                    "Operands of '|' must be node-sets".to_string(),
                ));
            }
        },
    };
    Ok(result)
}

/// Expands a value into the atoms it is compared through. A node-set contributes
/// one string per node.
fn atoms<'a, N: DataSourceNode<'a>>(value: XPathValue<N>) -> Vec<Atom> {
    match value {
        XPathValue::NodeSet(nodes) => nodes
            .iter()
            .map(|n| Atom::String(n.string_value()))
            .collect(),
        XPathValue::String(s) => vec![Atom::String(s)],
        XPathValue::Number(n) => vec![Atom::Number(n)],
        XPathValue::Boolean(b) => vec![Atom::Boolean(b)],
    }
}

fn compare<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> bool {
    // A node-set compared with a boolean is first converted to a boolean.
    let (left, right) = match (left, right) {
        (l @ XPathValue::NodeSet(_), r @ XPathValue::Boolean(_)) => {
            (XPathValue::Boolean(l.to_bool()), r)
        }
        (l @ XPathValue::Boolean(_), r @ XPathValue::NodeSet(_)) => {
            (l, XPathValue::Boolean(r.to_bool()))
        }
        other => other,
    };
    let left_atoms = atoms(left);
    let right_atoms = atoms(right);
    left_atoms
        .iter()
        .any(|l| right_atoms.iter().any(|r| compare_atoms(op, l, r)))
}

fn compare_atoms(op: BinaryOperator, left: &Atom, right: &Atom) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Atom::Boolean(_), _) | (_, Atom::Boolean(_)) => left.boolean() == right.boolean(),
                (Atom::Number(_), _) | (_, Atom::Number(_)) => left.number() == right.number(),
                (Atom::String(l), Atom::String(r)) => l == r,
            };
            if op == BinaryOperator::Equals {
                equal
            } else {
                !equal
            }
        }
        BinaryOperator::LessThan => left.number() < right.number(),
        BinaryOperator::LessThanOrEqual => left.number() <= right.number(),
        BinaryOperator::GreaterThan => left.number() > right.number(),
        BinaryOperator::GreaterThanOrEqual => left.number() >= right.number(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, create_test_tree};

    fn boolean(value: XPathValue<MockNode<'_>>) -> bool {
        match value {
            XPathValue::Boolean(b) => b,
            other => panic!("Expected a boolean, got {:?}", other),
        }
    }

    #[test]
    fn test_node_set_equality_is_existential() {
        let tree = create_test_tree();
        let paras = XPathValue::NodeSet(vec![tree.node(2), tree.node(8)]);
        let eq = evaluate(BinaryOperator::Equals, paras.clone(), XPathValue::String("World".into()));
        assert!(boolean(eq.unwrap()));
        // Both = and != can hold at once for a multi-node set.
        let ne = evaluate(BinaryOperator::NotEquals, paras, XPathValue::String("World".into()));
        assert!(boolean(ne.unwrap()));
    }

    #[test]
    fn test_empty_node_set_against_boolean() {
        let empty: XPathValue<MockNode<'_>> = XPathValue::NodeSet(vec![]);
        let result = evaluate(BinaryOperator::Equals, empty, XPathValue::Boolean(false));
        assert!(boolean(result.unwrap()));
    }

    #[test]
    fn test_relational_compares_numbers() {
        let lt = evaluate::<MockNode<'_>>(
            BinaryOperator::LessThan,
            XPathValue::String("2".into()),
            XPathValue::String("10".into()),
        );
        assert!(boolean(lt.unwrap()));
    }

    #[test]
    fn test_arithmetic() {
        let value = evaluate::<MockNode<'_>>(
            BinaryOperator::Modulo,
            XPathValue::Number(-5.0),
            XPathValue::Number(2.0),
        )
        .unwrap();
        assert_eq!(value, XPathValue::Number(-1.0));
    }

    #[test]
    fn test_union_requires_node_sets() {
        let err = evaluate::<MockNode<'_>>(
            BinaryOperator::Union,
            XPathValue::Number(1.0),
            XPathValue::NodeSet(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, XPathError::TypeError(_)));
    }
}
