//! Reading document text from the filesystem.
//!
//! A location is either a plain filesystem path or a `file:` URL. Any other
//! URL scheme is rejected rather than fetched.

use crate::error::SourceError;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

/// Turns a location string into a filesystem path.
pub fn resolve_path(location: &str) -> Result<PathBuf, SourceError> {
    let unsupported = || SourceError::UnsupportedLocation(location.to_string());
    match Url::parse(location) {
        // `to_file_path` decodes escapes and rejects hosts other than `localhost`.
        Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|_| unsupported()),
        // A one-letter scheme is a Windows drive such as `C:\`.
        Ok(url) if url.scheme().len() > 1 => Err(unsupported()),
        _ => Ok(PathBuf::from(location)),
    }
}

/// Reads the whole document at `location` into a string.
pub fn load_text(location: &str) -> Result<String, SourceError> {
    let path = resolve_path(location)?;
    log::debug!("Loading document from {}", path.display());
    fs::read_to_string(&path).map_err(|source| SourceError::Io { path, source })
}

/// Reads a document from any reader, such as stdin or an in-memory buffer.
pub fn read_text(mut reader: impl Read) -> Result<String, SourceError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| SourceError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
    Ok(text)
}

/// Lists the `.xml` files directly inside a directory, each joined to the directory path.
pub fn xml_file_names(location: &str) -> Result<BTreeSet<PathBuf>, SourceError> {
    let dir = resolve_path(location)?;
    let entries = fs::read_dir(&dir).map_err(|_| SourceError::NotADirectory(dir.clone()))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: dir.clone(),
            source,
        })?;
        let file_name = PathBuf::from(entry.file_name());
        if is_xml_file(&file_name) {
            names.insert(dir.join(file_name));
        }
    }
    log::debug!("Found {} XML files in {}", names.len(), dir.display());
    Ok(names)
}

fn is_xml_file(name: &Path) -> bool {
    name.extension().is_some_and(|ext| ext == "xml")
}
