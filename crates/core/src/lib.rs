//! # xmlquery-core
//!
//! Flattens an XML tree into a table by evaluating an ordered list of XPath
//! expressions, one column per expression:
//!
//! - **expression**: the per-column description ([`ExpressionSpec`])
//! - **location**: absolute locations of matched nodes and the reverse index
//! - **keys**: surrogate keys replacing locations or values in keyed columns
//! - **table**: result cells, the result table and its owned [`RecordSet`] form
//! - **processor**: the column-by-column expansion ([`ExpressionProcessor`])
//!
//! The crate works over any [`xmlquery_xpath1::DataSourceNode`]; cells hold node
//! handles, so a table cannot outlive the document it was built from.

pub use xmlquery_xpath1 as xpath;

pub mod config;
pub mod error;
pub mod expression;
pub mod keys;
pub mod location;
pub mod node;
pub mod processor;
pub mod table;

pub use config::{ContextStrategy, ProcessorConfig};
pub use error::QueryError;
pub use expression::{ExpressionSpec, KeyMode};
pub use keys::{KeySpaces, SurrogateKeyGenerator};
pub use location::{LocationIndex, LocationResolver, absolute_location};
pub use node::NodeRef;
pub use processor::ExpressionProcessor;
pub use table::{RecordSet, ResultCell, ResultTable, Row};
