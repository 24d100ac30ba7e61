//! The single failure type surfaced by table expansion.

use thiserror::Error;
use xmlquery_source::SourceError;
use xmlquery_xpath1::XPathError;

/// Every way a run can fail. There is no partial result: a run either produces the
/// whole table or returns one of these.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Source document could not be obtained: {0}")]
    SourceAccess(#[from] SourceError),

    #[error("Evaluation of expression '{expression}' failed: {source}")]
    QueryEvaluation {
        expression: String,
        #[source]
        source: XPathError,
    },

    #[error("Unsupported node kind '{0}': only elements and attributes can be tabulated")]
    UnsupportedNodeKind(String),

    #[error("Maximum number of surrogate keys generated (namespace '{namespace}')")]
    KeySpaceExhausted { namespace: String },

    #[error("Row {row} has no cell to use as evaluation context")]
    MissingContextRow { row: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
