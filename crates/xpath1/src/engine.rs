//! The evaluation engine for executing a parsed XPath AST against a generic `DataSourceNode`.

use super::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, PathStart, Step};
use super::{axes, functions, operators};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::parser::parse_expression;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// Coerces the XPath value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the XPath value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => string_to_number(s),
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::NodeSet(nodes) => {
                string_to_number(&nodes.first().map(|n| n.string_value()).unwrap_or_default())
            }
        }
    }
}

/// `number()` conversion: surrounding whitespace is ignored, anything else that is not a
/// plain decimal yields NaN.
pub(crate) fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits != ".";
    if well_formed {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `string()` conversion of a number: integers print without a fractional part.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        // Also folds -0 into "0".
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// Coerces the XPath value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A container for all state needed during expression evaluation.
/// `'a` is the lifetime of the underlying data source.
/// `'d` is the lifetime of the evaluation context itself.
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
    pub variables: &'d HashMap<String, XPathValue<N>>,
    _marker: PhantomData<&'a ()>,
}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    pub fn new(
        context_node: N,
        root_node: N,
        context_position: usize,
        context_size: usize,
        variables: &'d HashMap<String, XPathValue<N>>,
    ) -> Self {
        Self {
            context_node,
            root_node,
            context_position,
            context_size,
            variables,
            _marker: PhantomData,
        }
    }

    /// A context focused on `node`, sharing the root and variables of `self`.
    fn focus(&self, node: N, position: usize, size: usize) -> Self {
        Self::new(node, self.root_node, position, size, self.variables)
    }
}

/// A parsed query ready to be evaluated against any number of context nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    source: String,
    expression: Expression,
}

impl CompiledQuery {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expression = parse_expression(source)?;
        log::trace!("Compiled XPath '{}': {:?}", source, expression);
        Ok(Self {
            source: source.to_string(),
            expression,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Evaluates the query with `context` as the context node and its tree's root as `/`.
    pub fn evaluate<'a, N>(&self, context: N) -> Result<XPathValue<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let variables = HashMap::new();
        let e_ctx = EvaluationContext::new(context, context.root(), 1, 1, &variables);
        evaluate(&self.expression, &e_ctx)
    }

    /// Evaluates the query and requires a node-set, returned in document order.
    pub fn select<'a, N>(&self, context: N) -> Result<Vec<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        match self.evaluate(context)? {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            _ => Err(XPathError::NotANodeSet(self.source.clone())),
        }
    }
}

/// Parses and evaluates `query` against `context`, requiring a node-set result.
///
/// Unprefixed name tests match on local name whatever the node's namespace; prefixed
/// ones must match the prefix written in the document.
pub fn select_nodes<'a, N>(context: N, query: &str) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    CompiledQuery::compile(query)?.select(context)
}

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let nodes = evaluate_location_path(path, e_ctx)?;
            Ok(XPathValue::NodeSet(nodes))
        }
        Expression::Variable(name) => e_ctx
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| XPathError::UnknownVariable(name.clone())),
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::Filter { base, predicates } => {
            let nodes = expect_node_set(evaluate(base, e_ctx)?, "filter expression")?;
            Ok(XPathValue::NodeSet(apply_predicates(nodes, predicates, e_ctx)?))
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            // `and` / `or` short-circuit on the left operand.
            match op {
                BinaryOperator::And if !left_val.to_bool() => Ok(XPathValue::Boolean(false)),
                BinaryOperator::Or if left_val.to_bool() => Ok(XPathValue::Boolean(true)),
                _ => {
                    let right_val = evaluate(right, e_ctx)?;
                    operators::evaluate(*op, left_val, right_val)
                }
            }
        }
        Expression::Negate(expr) => Ok(XPathValue::Number(-evaluate(expr, e_ctx)?.to_number())),
    }
}

fn expect_node_set<N>(value: XPathValue<N>, what: &str) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        _ => Err(XPathError::TypeError(format!(
            "{} must evaluate to a node-set",
            what
        ))),
    }
}

/// Sorts into document order and drops duplicates.
pub(crate) fn document_order<'a, N: DataSourceNode<'a>>(mut nodes: Vec<N>) -> Vec<N> {
    nodes.sort();
    nodes.dedup();
    nodes
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let initial_context = match &path.start {
        PathStart::Context => vec![e_ctx.context_node],
        PathStart::Root => vec![e_ctx.root_node],
        PathStart::Expression(start_expr) => {
            expect_node_set(evaluate(start_expr, e_ctx)?, "path start")?
        }
    };

    let mut current_nodes = initial_context;
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

/// Evaluates one step: each context node contributes its own axis, node-test and
/// predicate pipeline, and the union is returned in document order.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut results = Vec::new();
    for &node in context_nodes {
        let axis_nodes = axes::collect(step.axis, node);
        let tested_nodes = filter_by_node_test(axis_nodes, &step.node_test, step.axis);
        results.extend(apply_predicates(tested_nodes, &step.predicates, e_ctx)?);
    }
    Ok(document_order(results))
}

/// Filters nodes by a `NodeTest`. Name and wildcard tests only match the axis's
/// principal node type: attributes on the attribute axis, elements everywhere else.
fn filter_by_node_test<'a, N>(nodes: Vec<N>, test: &NodeTest, axis: Axis) -> Vec<N>
where
    N: DataSourceNode<'a> + 'a,
{
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    nodes
        .into_iter()
        .filter(|node| match test {
            NodeTest::Wildcard => node.node_type() == principal,
            NodeTest::Name(name_to_test) => {
                node.node_type() == principal
                    && node.name().is_some_and(|q_name| {
                        // Unprefixed tests ignore namespaces, default namespace included.
                        if name_to_test.contains(':') {
                            q_name.to_string() == *name_to_test
                        } else {
                            q_name.local_part == name_to_test
                        }
                    })
            }
            NodeTest::NodeType(ntt) => match ntt {
                NodeTypeTest::Text => node.node_type() == NodeType::Text,
                NodeTypeTest::Comment => node.node_type() == NodeType::Comment,
                NodeTypeTest::ProcessingInstruction => {
                    node.node_type() == NodeType::ProcessingInstruction
                }
                NodeTypeTest::Node => true,
            },
        })
        .collect()
}

/// Filters nodes by a series of predicates. Positions are taken from the order of
/// `nodes`, which callers keep in axis order.
fn apply_predicates<'a, N>(
    nodes: Vec<N>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut final_nodes = nodes;
    for predicate in predicates {
        let context_size = final_nodes.len();
        let mut kept = Vec::with_capacity(context_size);
        for (i, node) in final_nodes.into_iter().enumerate() {
            let predicate_e_ctx = e_ctx.focus(node, i + 1, context_size);
            let keep = match evaluate(predicate, &predicate_e_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        final_nodes = kept;
    }
    Ok(final_nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::{MockNode, MockTree, create_test_tree};

    fn ids(nodes: &[MockNode<'_>]) -> Vec<usize> {
        nodes.iter().map(|n| n.id).collect()
    }

    fn select<'t>(tree: &'t MockTree, context: usize, query: &str) -> Vec<MockNode<'t>> {
        select_nodes(tree.node(context), query).unwrap()
    }

    #[test]
    fn test_absolute_path_from_any_context() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 0, "/root/para")), vec![2, 8]);
        assert_eq!(ids(&select(&tree, 9, "/root/para")), vec![2, 8]);
        assert_eq!(ids(&select(&tree, 5, "/")), vec![0]);
    }

    #[test]
    fn test_relative_paths() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 2, ".")), vec![2]);
        assert_eq!(ids(&select(&tree, 2, "..")), vec![1]);
        assert_eq!(ids(&select(&tree, 2, "@id")), vec![3]);
        assert_eq!(ids(&select(&tree, 2, "@*")), vec![3, 4]);
        assert_eq!(ids(&select(&tree, 2, "text()")), vec![5]);
        assert_eq!(ids(&select(&tree, 3, "..")), vec![2]);
    }

    #[test]
    fn test_prefixed_name_test() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 2, "@xml:lang")), vec![4]);
        assert_eq!(ids(&select(&tree, 2, "@lang")), vec![4]);
    }

    #[test]
    fn test_descendant_results_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 0, "//para | //div")), vec![2, 7, 8]);
        assert_eq!(ids(&select(&tree, 0, "//node()")), vec![1, 2, 5, 6, 7, 8, 9]);
        assert_eq!(ids(&select(&tree, 0, "//comment()")), vec![6]);
    }

    #[test]
    fn test_predicate_by_position() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 0, "/root/para[2]")), vec![8]);
        assert_eq!(ids(&select(&tree, 0, "/root/para[last()]")), vec![8]);
        assert_eq!(ids(&select(&tree, 0, "(//para)[1]")), vec![2]);
    }

    #[test]
    fn test_reverse_axis_positions() {
        let tree = create_test_tree();
        // The nearest preceding sibling comes first on a reverse axis.
        assert_eq!(ids(&select(&tree, 8, "preceding-sibling::*[1]")), vec![7]);
        assert_eq!(ids(&select(&tree, 5, "ancestor::*[1]")), vec![2]);
    }

    #[test]
    fn test_predicate_by_attribute() {
        let tree = create_test_tree();
        assert_eq!(ids(&select(&tree, 0, "//para[@id='p1']")), vec![2]);
        assert_eq!(ids(&select(&tree, 0, "//para[not(@id)]")), vec![8]);
        assert_eq!(ids(&select(&tree, 0, "//para[. = 'World']")), vec![8]);
    }

    #[test]
    fn test_non_node_set_is_rejected_by_select() {
        let tree = create_test_tree();
        let err = select_nodes(tree.root(), "count(//para)").unwrap_err();
        assert_eq!(err, XPathError::NotANodeSet("count(//para)".to_string()));

        let value = CompiledQuery::compile("count(//para)")
            .unwrap()
            .evaluate(tree.root())
            .unwrap();
        assert_eq!(value, XPathValue::Number(2.0));
    }

    #[test]
    fn test_unknown_variable() {
        let tree = create_test_tree();
        let err = select_nodes(tree.root(), "$missing/para").unwrap_err();
        assert_eq!(err, XPathError::UnknownVariable("missing".to_string()));
    }

    #[test]
    fn test_path_from_variable_node_set() {
        let tree = create_test_tree();
        let mut vars = HashMap::new();
        vars.insert("p".to_string(), XPathValue::NodeSet(vec![tree.node(2)]));
        let e_ctx = EvaluationContext::new(tree.root(), tree.root(), 1, 1, &vars);

        let expr = parse_expression("$p/text()").unwrap();
        let XPathValue::NodeSet(nodes) = evaluate(&expr, &e_ctx).unwrap() else {
            panic!("Expected a NodeSet");
        };
        assert_eq!(ids(&nodes), vec![5]);
        assert_eq!(nodes[0].string_value(), "Hello");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number_to_string(2.0), "2");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(2.5), "2.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert!(string_to_number(" 12 ") == 12.0);
        assert!(string_to_number("1e3").is_nan());
    }
}
