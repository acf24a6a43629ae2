//! Classification of substitution payloads.
//!
//! The payload carried by a dynamic placeholder is a free-form string. For
//! sizing purposes only two shapes matter: a local file (`file://` URL or an
//! absolute path) and an inline base64 image (`data:image/png;base64,...`).
//! Everything else, typically a remote URL, has no dimensions available.

use super::probe::{DimensionProber, Dimensions};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::path::Path;

const FILE_SCHEME: &str = "file://";
const BASE64_MARKER: &str = ";base64,";

/// Padding is optional in data URIs found in the wild.
const LENIENT_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

/// Where the image behind a payload can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource<'a> {
    /// A file on the local filesystem
    File(&'a Path),
    /// Base64 text following the `;base64,` marker
    Base64(&'a str),
    /// Nothing readable (remote URL, plain text)
    Unavailable,
}

impl<'a> PayloadSource<'a> {
    /// Classify a payload string.
    ///
    /// ```
    /// use blipswap::images::PayloadSource;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     PayloadSource::classify("file:///tmp/logo.png"),
    ///     PayloadSource::File(Path::new("/tmp/logo.png"))
    /// );
    /// assert_eq!(
    ///     PayloadSource::classify("data:image/png;base64,iVBO"),
    ///     PayloadSource::Base64("iVBO")
    /// );
    /// assert_eq!(PayloadSource::classify("http://img/a.png"), PayloadSource::Unavailable);
    /// ```
    pub fn classify(payload: &'a str) -> Self {
        if let Some(pos) = payload.find(FILE_SCHEME) {
            let path = &payload[pos + FILE_SCHEME.len()..];
            if !path.is_empty() {
                return PayloadSource::File(Path::new(path));
            }
        }
        if let Some((_, tail)) = payload.rsplit_once(BASE64_MARKER) {
            return PayloadSource::Base64(tail);
        }
        if Path::new(payload).is_absolute() {
            return PayloadSource::File(Path::new(payload));
        }
        PayloadSource::Unavailable
    }

    /// Probe the natural dimensions of the image behind this source.
    pub fn dimensions(&self, prober: &dyn DimensionProber) -> Option<Dimensions> {
        match self {
            PayloadSource::File(path) => prober.probe_path(path),
            PayloadSource::Base64(text) => prober.probe_bytes(&decode_base64(text)?),
            PayloadSource::Unavailable => None,
        }
    }
}

/// Decode base64 text, ignoring ASCII whitespace and missing padding.
///
/// Both the standard and the URL-safe alphabet are accepted.
pub fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD_LENIENT
        .decode(&compact)
        .or_else(|_| URL_SAFE_LENIENT.decode(&compact))
        .map_err(|e| log::debug!("Invalid base64 image payload: {}", e))
        .ok()
}
