//! Syntax tree produced by the parser and walked by the engine.
//!
//! Abbreviations are expanded while parsing: `//` becomes a `descendant-or-self::node()`
//! step, `.` and `..` become `self::node()` and `parent::node()`, `@x` becomes an
//! attribute-axis step. The tree therefore only holds full-form steps.

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    /// `$name`, resolved against the evaluation context's variables.
    Variable(String),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    /// A primary expression narrowed by predicates, e.g. `(//item)[2]`.
    Filter {
        base: Box<Expression>,
        predicates: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// Unary `-`.
    Negate(Box<Expression>),
}

/// Binary operators, loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    /// `|`, only defined between node-sets.
    Union,
}

/// Where a location path begins.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStart {
    /// A relative path such as `a/b` or `../c`.
    Context,
    /// A path beginning with `/`.
    Root,
    /// A path hanging off a primary expression, as in `$rows/cell` or `(//a)[1]/b`.
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<Step>,
}

impl LocationPath {
    pub fn is_absolute(&self) -> bool {
        self.start == PathStart::Root
    }
}

/// `axis::node-test[predicate]...`
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    /// The step `descendant-or-self::node()` that `//` abbreviates.
    pub fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            node_test: NodeTest::NodeType(NodeTypeTest::Node),
            predicates: vec![],
        }
    }
}

/// The thirteen XPath 1.0 axes, less `namespace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name as written in the query, with its prefix if any: `item`, `ext:gift`.
    Name(String),
    /// `*`, any node of the axis' principal type.
    Wildcard,
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}
