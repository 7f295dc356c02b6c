//! Source classification and the ordered aggregation pipeline.
//!
//! A caller hands `read_custom` an ordered list of [`Source`]s. Each is
//! classified once into a [`Descriptor`] (inline values, or a typed file)
//! and read through the matching format adapter. The resulting value sets
//! are folded strictly in input order, later sources overriding earlier
//! ones key-by-key; any read or parse failure aborts the whole aggregation.

mod error;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use log::debug;

pub use error::SourceError;

use crate::adapters;
use crate::values::ValueSet;

pub type DeferredSource = Pin<Box<dyn Future<Output = Source> + Send>>;
pub type ProducerFn = Box<dyn FnOnce() -> Source + Send>;

/// One input to the aggregation pipeline, before classification.
pub enum Source {
    /// An already constructed value set.
    Values(ValueSet),
    /// A bare path; the kind is inferred from its extension.
    Path(PathBuf),
    /// A path with an optional explicit kind overriding the extension.
    File {
        location: PathBuf,
        kind: Option<SourceKind>,
    },
    /// A pending source; awaited, then classified recursively.
    Deferred(DeferredSource),
    /// A zero-argument producer; invoked, then classified recursively.
    Producer(ProducerFn),
}

impl Source {
    pub fn deferred<F>(pending: F) -> Self
    where
        F: Future<Output = Source> + Send + 'static,
    {
        Source::Deferred(Box::pin(pending))
    }

    pub fn producer<F>(produce: F) -> Self
    where
        F: FnOnce() -> Source + Send + 'static,
    {
        Source::Producer(Box::new(produce))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Source::Path(location) => f.debug_tuple("Path").field(location).finish(),
            Source::File { location, kind } => f
                .debug_struct("File")
                .field("location", location)
                .field("kind", kind)
                .finish(),
            Source::Deferred(_) => f.write_str("Deferred(..)"),
            Source::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<ValueSet> for Source {
    fn from(values: ValueSet) -> Self {
        Source::Values(values)
    }
}

impl From<PathBuf> for Source {
    fn from(location: PathBuf) -> Self {
        Source::Path(location)
    }
}

impl From<&str> for Source {
    fn from(location: &str) -> Self {
        Source::Path(PathBuf::from(location))
    }
}

impl From<String> for Source {
    fn from(location: String) -> Self {
        Source::Path(PathBuf::from(location))
    }
}

/// The format a file-backed source is read or written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Css,
    Js,
    Mjs,
    Json,
    Other,
}

impl SourceKind {
    /// Kind inferred from a file extension, lower-cased. Anything
    /// unrecognized maps to `Other`, which is not an error until (and
    /// unless) the source is written.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "css" => SourceKind::Css,
            "js" => SourceKind::Js,
            "mjs" => SourceKind::Mjs,
            "json" => SourceKind::Json,
            _ => SourceKind::Other,
        }
    }
}

/// A classified source. Downstream code switches on the variant and never
/// re-inspects the original input's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Descriptor {
    Inline(ValueSet),
    File {
        kind: SourceKind,
        location: PathBuf,
    },
}

/// Classify a source, awaiting deferred values and invoking producers until
/// a concrete input remains. Touches the filesystem only to resolve the
/// current directory.
pub async fn resolve(source: Source) -> Result<Descriptor, SourceError> {
    match source {
        Source::Values(values) => Ok(Descriptor::Inline(values)),
        Source::Deferred(pending) => Box::pin(resolve(pending.await)).await,
        Source::Producer(produce) => Box::pin(resolve(produce())).await,
        Source::Path(location) => {
            let (kind, location) = classify_file(location, None)?;
            Ok(Descriptor::File { kind, location })
        }
        Source::File { location, kind } => {
            let (kind, location) = classify_file(location, kind)?;
            Ok(Descriptor::File { kind, location })
        }
    }
}

fn classify_file(
    location: PathBuf,
    kind: Option<SourceKind>,
) -> Result<(SourceKind, PathBuf), SourceError> {
    let location = absolutize(location)?;
    let kind = match kind {
        Some(kind) => kind,
        None => location
            .extension()
            .and_then(|extension| extension.to_str())
            .map(SourceKind::from_extension)
            .unwrap_or(SourceKind::Other),
    };
    Ok((kind, location))
}

fn absolutize(location: PathBuf) -> Result<PathBuf, SourceError> {
    if location.is_absolute() {
        return Ok(location);
    }
    match std::env::current_dir() {
        Ok(current) => Ok(current.join(location)),
        Err(error) => Err(SourceError::UnreadableSource(location, error.to_string())),
    }
}

/// Resolve every source in input order and fold the resulting value sets
/// left to right. The effective value for any alias is the one supplied by
/// the last source that defines it; a failed read aborts the whole
/// aggregation with no partial result.
pub async fn read_custom(sources: Vec<Source>) -> Result<ValueSet, SourceError> {
    let mut merged = ValueSet::new();
    for source in sources {
        let values = match resolve(source).await? {
            Descriptor::Inline(values) => values,
            Descriptor::File { kind, location } => {
                debug!(target: "source", "reading {:?} source {}", kind, location.display());
                adapters::read_value_set(kind, &location).await?
            }
        };
        merged.merge_from(values);
    }
    Ok(merged)
}

/// Serialize a value set at `location`, in the form given by `kind` or
/// inferred from the extension.
pub async fn write_custom(
    values: &ValueSet,
    location: impl AsRef<Path>,
    kind: Option<SourceKind>,
) -> Result<(), SourceError> {
    let (kind, location) = classify_file(location.as_ref().to_path_buf(), kind)?;
    debug!(target: "source", "writing {:?} target {}", kind, location.display());
    adapters::write_value_set(values, kind, &location).await
}
