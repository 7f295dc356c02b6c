//! Format adapters for the supported source forms.
//!
//! Each adapter owns its form's conventions, such as the recognized key
//! spellings and the at-rule syntax, and converts between file content
//! and a [`ValueSet`]. The pipeline in [`crate::source`] never inspects
//! formats itself.

mod css;
mod json;
mod module;

use std::path::Path;

use log::warn;
use tokio::fs;

use crate::source::{SourceError, SourceKind};
use crate::values::ValueSet;

/// Read one file-backed source into a value set. An `Other` kind has no
/// reader and contributes an empty set rather than failing.
pub async fn read_value_set(kind: SourceKind, location: &Path) -> Result<ValueSet, SourceError> {
    if kind == SourceKind::Other {
        warn!(
            target: "adapter",
            "no reader for {}, treating it as an empty value set",
            location.display()
        );
        return Ok(ValueSet::new());
    }

    let content = fs::read_to_string(location)
        .await
        .map_err(|error| SourceError::UnreadableSource(location.to_path_buf(), error.to_string()))?;

    let parsed = match kind {
        SourceKind::Css => css::parse(&content),
        SourceKind::Js | SourceKind::Mjs => module::parse(&content),
        SourceKind::Json => json::parse(&content),
        SourceKind::Other => Ok(ValueSet::new()),
    };
    parsed.map_err(|reason| SourceError::MalformedSource(location.to_path_buf(), reason))
}

/// Serialize a value set at `location` in the requested form.
pub async fn write_value_set(
    values: &ValueSet,
    kind: SourceKind,
    location: &Path,
) -> Result<(), SourceError> {
    let rendered = match kind {
        SourceKind::Css => css::render(values),
        SourceKind::Js => module::render_cjs(values),
        SourceKind::Mjs => module::render_esm(values),
        SourceKind::Json => json::render(values)
            .map_err(|reason| SourceError::UnwritableTarget(location.to_path_buf(), reason))?,
        SourceKind::Other => {
            return Err(SourceError::UnwritableTarget(
                location.to_path_buf(),
                "unrecognized output form".to_string(),
            ));
        }
    };
    fs::write(location, rendered)
        .await
        .map_err(|error| SourceError::UnwritableTarget(location.to_path_buf(), error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "cascara-adapter-{}-{}-{}",
            std::process::id(),
            unique,
            name
        ))
    }

    fn sample() -> ValueSet {
        ValueSet::new()
            .with_media("--mq-a", "(max-width: 30em), (max-height: 30em)")
            .with_property("--length-0", "5px")
            .with_selector(":--heading", &["h1", "h2", "h3"])
    }

    #[tokio::test]
    async fn round_trips_every_supported_form() {
        for (kind, name) in [
            (SourceKind::Css, "export.css"),
            (SourceKind::Js, "export.js"),
            (SourceKind::Mjs, "export.mjs"),
            (SourceKind::Json, "export.json"),
        ] {
            let location = temp_path(name);
            write_value_set(&sample(), kind, &location).await.unwrap();
            let read_back = read_value_set(kind, &location).await.unwrap();
            assert_eq!(read_back, sample(), "round trip through {:?}", kind);
            let _ = std::fs::remove_file(&location);
        }
    }

    #[tokio::test]
    async fn a_missing_file_is_an_unreadable_source() {
        let location = temp_path("missing.css");
        match read_value_set(SourceKind::Css, &location).await {
            Err(SourceError::UnreadableSource(reported, _)) => assert_eq!(reported, location),
            other => panic!("expected an unreadable source error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparseable_content_is_a_malformed_source() {
        let location = temp_path("bad.json");
        std::fs::write(&location, "[1, 2, 3]").unwrap();
        match read_value_set(SourceKind::Json, &location).await {
            Err(SourceError::MalformedSource(reported, _)) => assert_eq!(reported, location),
            other => panic!("expected a malformed source error, got {:?}", other),
        }
        let _ = std::fs::remove_file(&location);
    }

    #[tokio::test]
    async fn an_unrecognized_kind_reads_as_empty() {
        let location = temp_path("values.toml");
        let values = read_value_set(SourceKind::Other, &location).await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn an_unrecognized_kind_cannot_be_written() {
        let location = temp_path("values.toml");
        match write_value_set(&sample(), SourceKind::Other, &location).await {
            Err(SourceError::UnwritableTarget(reported, _)) => assert_eq!(reported, location),
            other => panic!("expected an unwritable target error, got {:?}", other),
        }
    }
}
