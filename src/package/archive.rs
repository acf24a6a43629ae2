//! Reading and writing a [`Package`] as a ZIP archive.
//!
//! The post-processor works on an in-memory package; this module is the thin
//! file-store boundary around it. Part entries keep their order on the way
//! out and the ODF `mimetype` entry is written first and stored uncompressed.
//! Documents found under an `embeddings/` directory are opened as nested
//! packages and written back under their original names, after all parts.

use super::{DocumentFormat, Embedding, Package, Part};
use crate::common::Result;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Directory segment under which nested documents are stored.
const EMBEDDINGS_DIR: &str = "embeddings/";

/// ODF mimetype entry, which must be the first, uncompressed member.
const MIMETYPE: &str = "mimetype";

impl Package {
    /// Open a package from a file.
    ///
    /// The file name is remembered and used to select the document format.
    ///
    /// # Example
    /// ```no_run
    /// use blipswap::package::Package;
    ///
    /// let pkg = Package::open("template.docx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Self::from_reader(std::io::BufReader::new(file), filename.as_deref())
    }

    /// Load a package from a reader.
    ///
    /// # Arguments
    /// * `reader` - A reader that implements Read + Seek
    /// * `filename` - Optional file name, used to select the document format
    pub fn from_reader<R: Read + Seek>(reader: R, filename: Option<&str>) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = match filename {
            Some(name) => Package::with_filename(name),
            None => Package::new(),
        };

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            if let Some(embedding) = Self::load_embedding(&name, &data) {
                package.push_embedding(embedding);
            } else {
                package.push_part(Part::new(name, data))?;
            }
        }

        Ok(package)
    }

    /// Load a package from an in-memory archive.
    pub fn from_bytes(bytes: &[u8], filename: Option<&str>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes), filename)
    }

    /// Try to open a member as a nested document.
    ///
    /// Only recognised formats under an embeddings directory qualify; anything
    /// that fails to open is kept as a plain part.
    fn load_embedding(name: &str, data: &[u8]) -> Option<Embedding> {
        let in_embeddings = name.starts_with(EMBEDDINGS_DIR) || name.contains("/embeddings/");
        if !in_embeddings || DocumentFormat::from_filename(name).is_none() {
            return None;
        }
        match Self::from_bytes(data, Some(name)) {
            Ok(nested) => Some(Embedding::new(name, nested)),
            Err(e) => {
                log::debug!("Keeping '{}' as an opaque part: {}", name, e);
                None
            },
        }
    }

    /// Write the package as a ZIP archive into `writer`.
    ///
    /// Returns the writer once the archive is finished.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        if let Some(mimetype) = self.part(MIMETYPE) {
            zip.start_file(MIMETYPE, stored)?;
            zip.write_all(mimetype.data())?;
        }

        for part in self.parts().iter().filter(|p| p.name() != MIMETYPE) {
            zip.start_file(part.name(), deflated)?;
            zip.write_all(part.data())?;
        }

        for embedding in self.embeddings() {
            let bytes = embedding.package().to_bytes()?;
            zip.start_file(embedding.name(), deflated)?;
            zip.write_all(&bytes)?;
        }

        Ok(zip.finish()?)
    }

    /// Serialize the package to an in-memory ZIP archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Save the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_odt() -> Package {
        let mut pkg = Package::with_filename("inner.odt");
        pkg.push_part(Part::new("content.xml", "<office:document-content/>")).unwrap();
        pkg.push_part(Part::new("mimetype", "application/vnd.oasis.opendocument.text"))
            .unwrap();
        pkg
    }

    #[test]
    fn test_round_trip_preserves_parts() {
        let mut pkg = Package::with_filename("report.docx");
        pkg.push_part(Part::new("word/document.xml", "<w:document/>")).unwrap();
        pkg.push_part(Part::new("word/media/image1.png", vec![0x89, 0x50, 0x4E, 0x47]))
            .unwrap();

        let bytes = pkg.to_bytes().unwrap();
        let reopened = Package::from_bytes(&bytes, Some("report.docx")).unwrap();
        assert_eq!(reopened, pkg);
    }

    #[test]
    fn test_mimetype_is_written_first() {
        let bytes = sample_odt().to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_embeddings_are_opened_and_written_back() {
        let mut outer = Package::with_filename("outer.docx");
        outer.push_part(Part::new("word/document.xml", "<w:document/>")).unwrap();
        outer.push_embedding(Embedding::new("word/embeddings/inner.odt", sample_odt()));

        let bytes = outer.to_bytes().unwrap();
        let reopened = Package::from_bytes(&bytes, Some("outer.docx")).unwrap();

        assert_eq!(reopened.embeddings().len(), 1);
        let inner = &reopened.embeddings()[0];
        assert_eq!(inner.name(), "word/embeddings/inner.odt");
        assert_eq!(inner.format(), Some(DocumentFormat::Odt));
        assert!(inner.package().contains_part("content.xml"));
        assert!(!reopened.contains_part("word/embeddings/inner.odt"));
    }

    #[test]
    fn test_embeddings_follow_parts() {
        let mut outer = Package::with_filename("outer.docx");
        outer.push_embedding(Embedding::new("word/embeddings/inner.odt", sample_odt()));
        outer.push_part(Part::new("word/document.xml", "<w:document/>")).unwrap();
        outer.push_part(Part::new("word/styles.xml", "<w:styles/>")).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(outer.to_bytes().unwrap())).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["word/document.xml", "word/styles.xml", "word/embeddings/inner.odt"]);
    }

    #[test]
    fn test_unreadable_embedding_stays_a_part() {
        let mut outer = Package::with_filename("outer.docx");
        outer
            .push_part(Part::new("word/embeddings/broken.docx", b"not a zip".to_vec()))
            .unwrap();
        let reopened = Package::from_bytes(&outer.to_bytes().unwrap(), None).unwrap();
        assert!(reopened.embeddings().is_empty());
        assert!(reopened.contains_part("word/embeddings/broken.docx"));
    }

    #[test]
    fn test_save_and_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.odt");
        sample_odt().save(&path).unwrap();

        let reopened = Package::open(&path).unwrap();
        assert_eq!(reopened.filename(), Some("saved.odt"));
        assert_eq!(reopened.format(), Some(DocumentFormat::Odt));
        assert_eq!(reopened.part_count(), 2);
    }
}
