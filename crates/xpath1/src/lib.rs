//! XPath 1.0 evaluation over a read-only tree.
//!
//! The engine is written against [`DataSourceNode`], so any document model that can
//! report its node kinds, names, attributes, children and parent can be queried.
//! Node-set results are always returned in document order without duplicates.
//!
//! Queries carry no namespace bindings. An unprefixed name test such as `item` matches
//! by local name in any namespace, the default namespace included, so `//item` finds
//! `<item xmlns="urn:x"/>` and `<p:item/>` alike. A prefixed test such as `p:item`
//! compares the prefix as written in the document.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{CompiledQuery, EvaluationContext, XPathValue, evaluate, select_nodes};

// Re-export test utilities for integration testing in downstream crates
pub use datasource::tests;
pub use error::XPathError;
pub use parser::parse_expression;
