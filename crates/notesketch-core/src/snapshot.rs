//! Encoded sketch image exchanged with the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of snapshots produced by the PNG encoder.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An encoded raster image of a sketch's visible pixels.
///
/// The contents are opaque to the drawing core; the renderer produces
/// PNG data URLs and accepts any data URL or bare base64 image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    /// Wrap an encoded snapshot string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Build a PNG data URL from base64 payload.
    pub fn from_png_base64(payload: &str) -> Self {
        Self(format!("{PNG_DATA_URL_PREFIX}{payload}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The base64 payload, stripping a `data:<mime>;base64,` header if present.
    ///
    /// Returns `None` for data URLs that are not base64-encoded.
    pub fn base64_payload(&self) -> Option<&str> {
        let encoded = self.0.trim();
        match encoded.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',')?;
                header.ends_with(";base64").then_some(payload)
            }
            None => Some(encoded),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_data_url() {
        let snapshot = Snapshot::from_png_base64("iVBORw0KGgo=");
        assert_eq!(snapshot.as_str(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(snapshot.base64_payload(), Some("iVBORw0KGgo="));
    }

    #[test]
    fn test_payload_bare_base64() {
        assert_eq!(Snapshot::new("  abcd ").base64_payload(), Some("abcd"));
    }

    #[test]
    fn test_payload_rejects_non_base64_urls() {
        assert_eq!(Snapshot::new("data:text/plain,hello").base64_payload(), None);
        assert_eq!(Snapshot::new("data:image/png;base64").base64_payload(), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let snapshot = Snapshot::new("data:image/png;base64,AAAA");
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, "\"data:image/png;base64,AAAA\"");
    }
}
