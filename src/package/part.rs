//! Named members of an in-memory package.
//!
//! A [`Part`] is one file of the package: the main document, a header, a
//! relationship table, a media file. Parts are addressed by their zip
//! member name (`word/document.xml`) and hold raw bytes; XML parts are
//! decoded on demand.
use crate::common::xml::XmlDocument;
use crate::common::{Error, Result};
use crate::ooxml::opc::packuri::PackURI;

/// A single named part of a [`Package`](super::Package).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Zip member name, without leading slash
    name: String,

    /// Raw content of the part
    data: Vec<u8>,
}

impl Part {
    /// Create a new part.
    ///
    /// # Arguments
    /// * `name` - Zip member name (a leading slash is stripped)
    /// * `data` - Raw content
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let name = match name.strip_prefix('/') {
            Some(stripped) => stripped.to_string(),
            None => name,
        };
        Self {
            name,
            data: data.into(),
        }
    }

    /// The part's member name, e.g. `word/document.xml`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part's name as a [`PackURI`].
    pub fn uri(&self) -> PackURI {
        PackURI::from_member(&self.name)
    }

    /// Raw content.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the content of the part.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    /// Content decoded as UTF-8 text.
    ///
    /// Fails with [`Error::ParseFailure`] if the part is not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).map_err(|e| Error::parse(&self.name, e))
    }

    /// Parse the content into an XML tree.
    pub fn parse_xml(&self) -> Result<XmlDocument> {
        XmlDocument::parse(&self.name, self.text()?)
    }
}
