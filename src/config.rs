//! Configuration for image post-processing.
//!
//! This module defines [`ProcessOptions`], which controls how strictly parts
//! are parsed, whether leaked payload text is scrubbed, and which marker is
//! written for QR-code images.
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default marker prepended to the media data of QR-code pictures.
pub const DEFAULT_QR_PREFIX: &str = "qrcode://";

/// What to do with a part that is not well-formed XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStrictness {
    /// Record the parse failure in the report.
    #[default]
    Strict,
    /// Log a warning and list the part as skipped.
    Lenient,
}

/// Options controlling [`postprocess`](crate::postprocess::postprocess).
///
/// In every mode a part that fails to parse is left byte-for-byte unchanged;
/// strictness only decides how the failure is reported.
///
/// # Examples
///
/// ```rust
/// use blipswap::config::{ParseStrictness, ProcessOptions};
///
/// let options = ProcessOptions::new()
///     .with_strictness(ParseStrictness::Lenient)
///     .with_qr_prefix("qr:");
/// assert_eq!(options.qr_prefix, "qr:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Handling of malformed parts
    pub strictness: ParseStrictness,
    /// Replace leftover payload text in a part with the relationship id
    pub scrub_payload_text: bool,
    /// Marker written before the payload of QR-code pictures
    pub qr_prefix: String,
    /// Also process documents embedded in the package
    pub process_embeddings: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            strictness: ParseStrictness::Strict,
            scrub_payload_text: true,
            qr_prefix: DEFAULT_QR_PREFIX.to_string(),
            process_embeddings: true,
        }
    }
}

impl ProcessOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how malformed parts are reported.
    #[inline]
    pub fn with_strictness(mut self, strictness: ParseStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set whether leaked payload text is replaced by relationship ids.
    #[inline]
    pub fn with_scrub_payload_text(mut self, scrub: bool) -> Self {
        self.scrub_payload_text = scrub;
        self
    }

    /// Set the QR-code marker.
    #[inline]
    pub fn with_qr_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.qr_prefix = prefix.into();
        self
    }

    /// Set whether embedded documents are processed too.
    #[inline]
    pub fn with_process_embeddings(mut self, process: bool) -> Self {
        self.process_embeddings = process;
        self
    }

    /// Load options from YAML. Missing keys keep their defaults.
    ///
    /// ```rust
    /// use blipswap::config::{ParseStrictness, ProcessOptions};
    ///
    /// let yaml = "strictness: lenient\nprocess_embeddings: false\n";
    /// let options = ProcessOptions::from_yaml_str(yaml).unwrap();
    /// assert_eq!(options.strictness, ParseStrictness::Lenient);
    /// assert!(!options.process_embeddings);
    /// assert!(options.scrub_payload_text);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serialize options to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProcessOptions::new();
        assert_eq!(options.strictness, ParseStrictness::Strict);
        assert!(options.scrub_payload_text);
        assert_eq!(options.qr_prefix, "qrcode://");
        assert!(options.process_embeddings);
    }

    #[test]
    fn test_yaml_round_trip() {
        let options = ProcessOptions::new()
            .with_strictness(ParseStrictness::Lenient)
            .with_scrub_payload_text(false);
        let yaml = options.to_yaml_string().unwrap();
        assert_eq!(ProcessOptions::from_yaml_str(&yaml).unwrap(), options);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = ProcessOptions::from_yaml_str("strictness: sloppy\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
