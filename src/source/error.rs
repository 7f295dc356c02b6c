use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SourceError {
    /// A file-backed source cannot be located or opened.
    UnreadableSource(PathBuf, String),
    /// A file-backed source's content cannot be parsed into a value set.
    MalformedSource(PathBuf, String),
    /// A value set cannot be serialized or persisted at the target.
    UnwritableTarget(PathBuf, String),
}

impl std::error::Error for SourceError {}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::UnreadableSource(location, reason) => {
                write!(f, "Unreadable source {}: {}", location.display(), reason)
            }
            SourceError::MalformedSource(location, reason) => {
                write!(f, "Malformed source {}: {}", location.display(), reason)
            }
            SourceError::UnwritableTarget(location, reason) => {
                write!(f, "Unwritable target {}: {}", location.display(), reason)
            }
        }
    }
}
