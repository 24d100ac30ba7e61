use std::path::PathBuf;
use thiserror::Error;

/// Failures while obtaining or inspecting a source document.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("XML parsing error (roxmltree): {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document location '{0}': only plain paths and file: URLs can be opened")]
    UnsupportedLocation(String),

    #[error("'{0}' is not a readable directory")]
    NotADirectory(PathBuf),

    #[error("No '{attribute}' attribute found in element '{element}'")]
    MissingAttribute { element: String, attribute: String },
}
