use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("XPath parse error in '{0}': {1}")]
    XPathParse(String, String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Variable '{0}' not found")]
    UnknownVariable(String),

    #[error("Expression '{0}' does not select a node-set")]
    NotANodeSet(String),
}

impl XPathError {
    pub(crate) fn function(function: &str, message: impl Into<String>) -> Self {
        XPathError::FunctionError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
