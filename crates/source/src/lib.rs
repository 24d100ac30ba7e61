//! Obtaining XML documents and exposing them to the XPath engine.
//!
//! [`XmlDocument`] parses text with `roxmltree`; its [`XmlNode`] handles implement
//! [`xmlquery_xpath1::DataSourceNode`] so they can be queried and tabulated.

pub mod error;
pub mod loader;
pub mod schema;
pub mod xml;

pub use error::SourceError;
pub use loader::{load_text, read_text, resolve_path, xml_file_names};
pub use schema::{SemanticKind, attribute_value, is_ref_element};
pub use xml::{XmlDocument, XmlNode};
