//! In-memory package file store.
//!
//! This module provides the [`Package`] type that the image post-processor
//! mutates: an ordered list of named [`Part`]s plus nested [`Embedding`]s
//! (documents embedded inside the document). The core only ever replaces
//! part data and appends new parts; it never removes a part.
//!
//! Loading from and saving to a zip container lives in [`archive`].
pub mod archive;
pub mod part;

pub use part::Part;

use crate::common::{Error, Result};

/// Document sub-format of a package, selecting the processing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// WordprocessingML (.docx), the box-model format with relationship tables
    Docx,
    /// OpenDocument Text (.odt), the flow format with a single content part
    Odt,
}

impl DocumentFormat {
    /// Map a file extension (without dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" | "docm" | "dotx" | "dotm" => Some(Self::Docx),
            "odt" | "ott" => Some(Self::Odt),
            _ => None,
        }
    }

    /// Map a file name or path to a format by its extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        let file = name.rsplit('/').next().unwrap_or(name);
        let (_, ext) = file.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

/// A document nested inside a package (e.g. `word/embeddings/sheet.docx`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedding {
    /// Member name of the embedded file in the outer package
    name: String,

    /// The embedded package itself
    package: Package,
}

impl Embedding {
    /// Create a new embedding.
    pub fn new(name: impl Into<String>, package: Package) -> Self {
        Self {
            name: name.into(),
            package,
        }
    }

    /// Member name of the embedded file.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The embedded package.
    #[inline]
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Mutable access to the embedded package.
    #[inline]
    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    /// Format of the embedded document, from its file extension.
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_filename(&self.name)
    }
}

/// An office document held in memory as an ordered collection of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// File name the package was loaded from, used to pick the format
    filename: Option<String>,

    /// All parts in file order
    parts: Vec<Part>,

    /// Nested documents, in file order
    embeddings: Vec<Embedding>,
}

impl Package {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty package remembering the file name it stands for.
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    /// File name the package was created for, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Document format of this package.
    ///
    /// Uses the file name's extension when known, otherwise sniffs the
    /// parts: `word/document.xml` means docx, `content.xml` means odt.
    pub fn format(&self) -> Option<DocumentFormat> {
        if let Some(format) = self.filename.as_deref().and_then(DocumentFormat::from_filename) {
            return Some(format);
        }
        if self.contains_part("word/document.xml") {
            Some(DocumentFormat::Docx)
        } else if self.contains_part("content.xml") {
            Some(DocumentFormat::Odt)
        } else {
            None
        }
    }

    /// All parts in file order.
    #[inline]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Get a part by member name.
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name() == name)
    }

    /// Get a mutable part by member name.
    pub fn part_mut(&mut self, name: &str) -> Option<&mut Part> {
        self.parts.iter_mut().find(|p| p.name() == name)
    }

    /// Get a part by member name, failing with [`Error::PartNotFound`].
    pub fn require_part(&self, name: &str) -> Result<&Part> {
        self.part(name)
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Mutable variant of [`Package::require_part`].
    pub fn require_part_mut(&mut self, name: &str) -> Result<&mut Part> {
        self.part_mut(name)
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Append a new part at the end of the package.
    ///
    /// Part names are unique; adding a name that already exists fails with
    /// [`Error::InvalidFormat`] and leaves the package unchanged.
    pub fn push_part(&mut self, part: Part) -> Result<()> {
        if self.contains_part(part.name()) {
            return Err(Error::InvalidFormat(format!(
                "Duplicate part name: {}",
                part.name()
            )));
        }
        self.parts.push(part);
        Ok(())
    }

    /// Number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Names of parts under `prefix` ending with `suffix`, in file order.
    ///
    /// Used to pick out headers (`word/header`, `.xml`) and footers.
    pub fn part_names_matching(&self, prefix: &str, suffix: &str) -> Vec<String> {
        self.parts
            .iter()
            .map(Part::name)
            .filter(|name| name.starts_with(prefix) && name.ends_with(suffix))
            .map(str::to_string)
            .collect()
    }

    /// Nested documents in file order.
    #[inline]
    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    /// Mutable access to the nested documents.
    #[inline]
    pub fn embeddings_mut(&mut self) -> &mut [Embedding] {
        &mut self.embeddings
    }

    /// Append a nested document.
    pub fn push_embedding(&mut self, embedding: Embedding) {
        self.embeddings.push(embedding);
    }
}
