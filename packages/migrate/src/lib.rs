//! Schema upgrades for pipeline-flow documents.
//!
//! Works on raw `serde_json::Value` so documents can be brought to the
//! current version before the typed model ever sees them. The caller hands
//! ownership in and gets the upgraded document back; already-current (or
//! newer) documents pass through untouched.

mod error;
mod steps;

use serde_json::Value;
use tracing::debug;

pub use error::MigrateError;

/// Newest schema version these crates read and write
pub const LATEST_VERSION: u32 = 3;

/// The integer prefix of the top-level `version` string ("2.5" → 2)
pub fn base_version(doc: &Value) -> Result<u32, MigrateError> {
    let version = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or(MigrateError::MissingVersion)?;
    let base = version.split_once('.').map(|(b, _)| b).unwrap_or(version);
    base.parse::<u32>()
        .map_err(|_| MigrateError::MalformedVersion(version.to_string()))
}

/// Runs every step from the document's base version up to
/// [`LATEST_VERSION`]. Versions at or beyond the latest are returned as-is;
/// steps never look ahead, so `upgrade(upgrade(d)) == upgrade(d)`.
pub fn upgrade(mut doc: Value) -> Result<Value, MigrateError> {
    let base = base_version(&doc)?;
    if base == 0 {
        return Err(MigrateError::MalformedVersion(format!("{base}.x")));
    }
    if base >= LATEST_VERSION {
        return Ok(doc);
    }
    for version in (base + 1)..=LATEST_VERSION {
        doc = match version {
            2 => steps::to_v2(doc)?,
            3 => steps::to_v3(doc)?,
            _ => doc,
        };
        debug!(version, "applied schema upgrade step");
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_version_parses_prefix() {
        let doc = json!({ "version": "2.5" });
        assert_eq!(base_version(&doc).unwrap(), 2);

        let doc = json!({ "version": "3" });
        assert_eq!(base_version(&doc).unwrap(), 3);
    }

    #[test]
    fn test_base_version_rejects_garbage() {
        let doc = json!({ "id": "no-version" });
        assert!(matches!(
            base_version(&doc),
            Err(MigrateError::MissingVersion)
        ));

        let doc = json!({ "version": "three.oh" });
        assert!(matches!(
            base_version(&doc),
            Err(MigrateError::MalformedVersion(_))
        ));

        let doc = json!({ "version": 3 });
        assert!(matches!(
            base_version(&doc),
            Err(MigrateError::MissingVersion)
        ));
    }

    #[test]
    fn test_current_version_passes_through() {
        let doc = json!({ "version": "3.0", "pipelines": [] });
        let upgraded = upgrade(doc.clone()).unwrap();
        assert_eq!(upgraded, doc);
    }

    #[test]
    fn test_future_version_passes_through() {
        let doc = json!({ "version": "7.1", "some_future_field": true });
        let upgraded = upgrade(doc.clone()).unwrap();
        assert_eq!(upgraded, doc);
    }
}
