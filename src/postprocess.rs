//! Top-level dispatch over a whole package.
//!
//! [`postprocess`] picks the processing path from the package's format and
//! runs it part by part: for Word packages the main document, then headers,
//! then footers, each through [`process_part`](crate::ooxml::docx::process_part);
//! for OpenDocument text the content part through
//! [`odf::frame`](crate::odf::frame). Embedded documents are processed the
//! same way, each by its own format.
//!
//! Failures are scoped. A drawing that cannot be substituted is recorded in
//! its part's report; a part that cannot be processed is recorded in the
//! package report (or listed as skipped, see
//! [`ParseStrictness`](crate::config::ParseStrictness)) and the next part
//! is processed.

use crate::common::{Error, Result};
use crate::config::{ParseStrictness, ProcessOptions};
use crate::images::{DimensionProber, ImageSizeProber};
#[cfg(feature = "ooxml")]
use crate::ooxml::opc::constants::part_name;
use crate::package::{DocumentFormat, Package};

/// What happened to one part.
#[derive(Debug, Default)]
pub struct PartReport {
    /// Member name of the part
    pub part: String,
    /// Unreplaced placeholders detached
    pub cleaned: usize,
    /// Drawings whose existing media was repointed
    pub substituted: usize,
    /// Drawings that received a new relationship and media part
    pub duplicated: usize,
    /// Frames rewritten in a flow-format content part
    pub frames: usize,
    /// Media parts whose data was replaced in place, in drawing order
    pub repointed: Vec<String>,
    /// Drawings that could not be substituted
    pub failures: Vec<Error>,
}

impl PartReport {
    /// Create an empty report for `part`.
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            part: part.into(),
            ..Self::default()
        }
    }

    /// Whether the part's content was changed.
    pub fn is_modified(&self) -> bool {
        self.cleaned + self.substituted + self.duplicated + self.frames > 0
    }
}

/// Outcome of post-processing one package.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Format the package was processed as, `None` if unsupported
    pub format: Option<DocumentFormat>,
    /// Reports of processed parts, in processing order
    pub parts: Vec<PartReport>,
    /// Parts that could not be processed
    pub part_failures: Vec<Error>,
    /// Malformed parts passed over in lenient mode
    pub skipped: Vec<String>,
    /// Reports of embedded documents, by member name
    pub embeddings: Vec<(String, ProcessReport)>,
}

impl ProcessReport {
    fn sum(&self, count: impl Fn(&PartReport) -> usize + Copy) -> usize {
        self.parts.iter().map(count).sum::<usize>()
            + self.embeddings.iter().map(|(_, r)| r.sum(count)).sum::<usize>()
    }

    /// Drawings detached, including embedded documents.
    pub fn cleaned(&self) -> usize {
        self.sum(|p| p.cleaned)
    }

    /// Drawings substituted in place, including embedded documents.
    pub fn substituted(&self) -> usize {
        self.sum(|p| p.substituted)
    }

    /// Drawings that received a new relationship, including embedded documents.
    pub fn duplicated(&self) -> usize {
        self.sum(|p| p.duplicated)
    }

    /// Frames rewritten, including embedded documents.
    pub fn frames(&self) -> usize {
        self.sum(|p| p.frames)
    }

    /// Number of part and drawing failures, including embedded documents.
    pub fn failure_count(&self) -> usize {
        self.part_failures.len()
            + self.parts.iter().map(|p| p.failures.len()).sum::<usize>()
            + self
                .embeddings
                .iter()
                .map(|(_, r)| r.failure_count())
                .sum::<usize>()
    }

    /// Report of the part with the given name.
    pub fn part(&self, name: &str) -> Option<&PartReport> {
        self.parts.iter().find(|p| p.part == name)
    }

    /// Record the result of processing one part.
    fn record(&mut self, name: &str, result: Result<PartReport>, options: &ProcessOptions) {
        match result {
            Ok(report) => self.parts.push(report),
            Err(e @ Error::ParseFailure { .. })
                if options.strictness == ParseStrictness::Lenient =>
            {
                log::warn!("Skipping malformed part '{}': {}", name, e);
                self.skipped.push(name.to_string());
            },
            Err(e) => {
                log::warn!("Part '{}' left unmodified: {}", name, e);
                self.part_failures.push(e);
            },
        }
    }
}

/// Post-process a package with the default dimension prober.
///
/// # Example
///
/// ```rust,no_run
/// use blipswap::config::ProcessOptions;
/// use blipswap::package::Package;
/// use blipswap::postprocess::postprocess;
///
/// let mut pkg = Package::open("report.docx")?;
/// let report = postprocess(&mut pkg, &ProcessOptions::new())?;
/// if report.failure_count() > 0 {
///     eprintln!("{} image(s) could not be substituted", report.failure_count());
/// }
/// pkg.save("report.out.docx")?;
/// # Ok::<(), blipswap::common::Error>(())
/// ```
///
/// # Errors
/// [`Error::PartNotFound`] if the package lacks its main part
/// (`word/document.xml` or `content.xml`). Problems inside parts are
/// reported in the returned [`ProcessReport`] instead.
pub fn postprocess(package: &mut Package, options: &ProcessOptions) -> Result<ProcessReport> {
    postprocess_with(package, options, &ImageSizeProber)
}

/// Post-process a package with a caller-supplied dimension prober.
pub fn postprocess_with(
    package: &mut Package,
    options: &ProcessOptions,
    prober: &dyn DimensionProber,
) -> Result<ProcessReport> {
    let format = package.format();
    process_package(package, format, options, prober)
}

fn process_package(
    package: &mut Package,
    format: Option<DocumentFormat>,
    options: &ProcessOptions,
    prober: &dyn DimensionProber,
) -> Result<ProcessReport> {
    let mut report = ProcessReport {
        format,
        ..ProcessReport::default()
    };

    match format {
        Some(DocumentFormat::Docx) => process_docx(package, options, prober, &mut report)?,
        Some(DocumentFormat::Odt) => process_odt(package, options, &mut report)?,
        None => {
            log::debug!(
                "Unsupported package format for {:?}, leaving it untouched",
                package.filename()
            );
            report.format = None;
        },
    }

    if options.process_embeddings {
        for embedding in package.embeddings_mut() {
            let format = embedding.format().or_else(|| embedding.package().format());
            let name = embedding.name().to_string();
            let nested = match process_package(embedding.package_mut(), format, options, prober) {
                Ok(nested) => nested,
                Err(e) => {
                    log::warn!("Embedded document '{}' left unmodified: {}", name, e);
                    ProcessReport {
                        format,
                        part_failures: vec![e],
                        ..ProcessReport::default()
                    }
                },
            };
            report.embeddings.push((name, nested));
        }
    }

    Ok(report)
}

#[cfg(feature = "ooxml")]
fn process_docx(
    package: &mut Package,
    options: &ProcessOptions,
    prober: &dyn DimensionProber,
    report: &mut ProcessReport,
) -> Result<()> {
    use crate::ooxml::docx::process_part;
    use std::collections::HashSet;

    package.require_part(part_name::DOCUMENT)?;
    let mut names = vec![part_name::DOCUMENT.to_string()];
    names.extend(package.part_names_matching(part_name::HEADER_PREFIX, part_name::XML_SUFFIX));
    names.extend(package.part_names_matching(part_name::FOOTER_PREFIX, part_name::XML_SUFFIX));

    let mut repointed: HashSet<String> = HashSet::new();
    for name in names {
        let result = process_part(package, &name, options, prober);
        if let Ok(part) = &result {
            for media in &part.repointed {
                if !repointed.insert(media.clone()) {
                    log::warn!(
                        "{}: media '{}' was already substituted, earlier payload overwritten",
                        name,
                        media
                    );
                }
            }
        }
        report.record(&name, result, options);
    }
    Ok(())
}

#[cfg(not(feature = "ooxml"))]
fn process_docx(
    _package: &mut Package,
    _options: &ProcessOptions,
    _prober: &dyn DimensionProber,
    report: &mut ProcessReport,
) -> Result<()> {
    log::debug!("Word support is disabled, leaving package untouched");
    report.format = None;
    Ok(())
}

#[cfg(feature = "odf")]
fn process_odt(
    package: &mut Package,
    options: &ProcessOptions,
    report: &mut ProcessReport,
) -> Result<()> {
    use crate::odf::frame::{CONTENT_PART, process_content_part};

    let part = package.require_part_mut(CONTENT_PART)?;
    let result = process_content_part(part).map(|frames| PartReport {
        frames,
        ..PartReport::new(CONTENT_PART)
    });
    report.record(CONTENT_PART, result, options);
    Ok(())
}

#[cfg(not(feature = "odf"))]
fn process_odt(
    _package: &mut Package,
    _options: &ProcessOptions,
    report: &mut ProcessReport,
) -> Result<()> {
    log::debug!("OpenDocument support is disabled, leaving package untouched");
    report.format = None;
    Ok(())
}

#[cfg(all(test, feature = "ooxml", feature = "odf"))]
mod tests {
    use super::*;
    use crate::images::Dimensions;
    use crate::ooxml::docx::drawing::tests::drawing_xml;
    use crate::ooxml::opc::rel::RelationshipTable;
    use crate::package::{Embedding, Part};
    use std::path::Path;

    const IMAGE_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

    fn rels(entries: &[(&str, &str)]) -> String {
        let body: String = entries
            .iter()
            .map(|(id, target)| {
                format!(r#"<Relationship Id="{id}" Type="{IMAGE_TYPE}" Target="{target}"/>"#)
            })
            .collect();
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<Relationships "#,
                r#"xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                "{}</Relationships>"
            ),
            body
        )
    }

    fn wrap(root: &str, drawings: &[String]) -> String {
        let runs: String = drawings
            .iter()
            .map(|d| format!("<w:p><w:r>{}</w:r></w:p>", d))
            .collect();
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<{root} xmlns:w="urn:w" xmlns:wp="urn:wp" xmlns:a="urn:a" "#,
                r#"xmlns:pic="urn:pic" xmlns:r="urn:r">{runs}</{root}>"#
            ),
            root = root,
            runs = runs
        )
    }

    fn dynamic(payload: &str, extra: &str, r_id: &str) -> String {
        let props = format!(r#"descr="{}" dynamic="true" {}"#, payload, extra);
        drawing_xml("wp:anchor", props.trim_end(), r_id, 4000, 3000)
    }

    /// A docx with `rId5 -> media/image1.png` and the given body drawings.
    fn docx(drawings: &[String]) -> Package {
        let mut pkg = Package::with_filename("template.docx");
        pkg.push_part(Part::new("word/document.xml", wrap("w:document", drawings)))
            .unwrap();
        pkg.push_part(Part::new(
            "word/_rels/document.xml.rels",
            rels(&[("rId5", "media/image1.png")]),
        ))
        .unwrap();
        pkg.push_part(Part::new("word/media/image1.png", vec![0x89, b'P', b'N', b'G']))
            .unwrap();
        pkg
    }

    fn text<'a>(pkg: &'a Package, name: &str) -> &'a str {
        pkg.part(name).unwrap().text().unwrap()
    }

    struct FixedProber(Dimensions);

    impl DimensionProber for FixedProber {
        fn probe_bytes(&self, _data: &[u8]) -> Option<Dimensions> {
            Some(self.0)
        }

        fn probe_path(&self, _path: &Path) -> Option<Dimensions> {
            Some(self.0)
        }
    }

    #[test]
    fn test_first_use_repoints_without_new_entries() {
        let mut pkg = docx(&[dynamic("http://img/a.png", "", "rId5")]);
        let part_count = pkg.part_count();

        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(report.format, Some(DocumentFormat::Docx));
        assert_eq!(report.substituted(), 1);
        assert_eq!(report.duplicated(), 0);
        assert_eq!(report.failure_count(), 0);

        assert_eq!(pkg.part("word/media/image1.png").unwrap().data(), b"http://img/a.png");
        assert_eq!(pkg.part_count(), part_count);
        let doc = text(&pkg, "word/document.xml");
        assert!(!doc.contains("http://img/a.png"));
        assert!(doc.contains(r#"descr="rId5""#));
        let table =
            RelationshipTable::parse("rels", text(&pkg, "word/_rels/document.xml.rels")).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_qr_section_writes_marker() {
        let mut pkg = docx(&[dynamic("http://img/a.png", r#"qrcode="true""#, "rId5")]);
        postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(
            pkg.part("word/media/image1.png").unwrap().data(),
            b"qrcode://http://img/a.png"
        );
    }

    #[test]
    fn test_duplicates_are_numbered_and_unique() {
        let drawings: Vec<String> = (1..=4)
            .map(|i| dynamic(&format!("http://img/{}.png", i), "", "rId5"))
            .collect();
        let mut pkg = docx(&drawings);

        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(report.substituted(), 1);
        assert_eq!(report.duplicated(), 3);

        for (suffix, payload) in [("", "1"), ("_2", "2"), ("_3", "3"), ("_4", "4")] {
            let media = format!("word/media/image1{}.png", suffix);
            let expected = format!("http://img/{}.png", payload);
            assert_eq!(pkg.part(&media).unwrap().data(), expected.as_bytes());
        }
        let table =
            RelationshipTable::parse("rels", text(&pkg, "word/_rels/document.xml.rels")).unwrap();
        let ids: Vec<String> = table.iter().map(|r| r.r_id().to_string()).collect();
        assert_eq!(ids, ["rId5", "rId5_2", "rId5_3", "rId5_4"]);
        assert!(table.duplicate_ids().is_empty());
    }

    #[test]
    fn test_state_resets_between_parts() {
        let mut pkg = docx(&[dynamic("http://img/a.png", "", "rId5")]);
        let header = wrap("w:hdr", &[dynamic("http://img/h.png", "", "rId1")]);
        pkg.push_part(Part::new("word/header1.xml", header)).unwrap();
        pkg.push_part(Part::new(
            "word/_rels/header1.xml.rels",
            rels(&[("rId1", "media/image1.png")]),
        ))
        .unwrap();
        let footer = wrap("w:ftr", &[dynamic("http://img/f.png", "", "rId1")]);
        pkg.push_part(Part::new("word/footer1.xml", footer)).unwrap();
        pkg.push_part(Part::new(
            "word/_rels/footer1.xml.rels",
            rels(&[("rId1", "media/image2.png")]),
        ))
        .unwrap();
        pkg.push_part(Part::new("word/media/image2.png", vec![0x89])).unwrap();

        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        let order: Vec<&str> = report.parts.iter().map(|p| p.part.as_str()).collect();
        assert_eq!(order, ["word/document.xml", "word/header1.xml", "word/footer1.xml"]);
        // Each part starts over, so every drawing is a first use.
        assert_eq!(report.substituted(), 3);
        assert_eq!(report.duplicated(), 0);
        // The header shares the media file with the body and is processed after it.
        assert_eq!(report.part("word/document.xml").unwrap().repointed, ["word/media/image1.png"]);
        assert_eq!(report.part("word/header1.xml").unwrap().repointed, ["word/media/image1.png"]);
        assert_eq!(pkg.part("word/media/image1.png").unwrap().data(), b"http://img/h.png");
        assert_eq!(pkg.part("word/media/image2.png").unwrap().data(), b"http://img/f.png");
        assert!(text(&pkg, "word/footer1.xml").contains(r#"descr="rId1""#));
    }

    #[test]
    fn test_header_reuse_extends_its_own_table() {
        let mut pkg = docx(&[dynamic("http://img/a.png", "", "rId5")]);
        let header = wrap(
            "w:hdr",
            &[
                dynamic("http://img/h1.png", "", "rId1"),
                dynamic("http://img/h2.png", "", "rId1"),
            ],
        );
        pkg.push_part(Part::new("word/header1.xml", header)).unwrap();
        pkg.push_part(Part::new(
            "word/_rels/header1.xml.rels",
            rels(&[("rId1", "media/image3.png")]),
        ))
        .unwrap();
        pkg.push_part(Part::new("word/media/image3.png", vec![0x89])).unwrap();
        let body_rels = pkg.part("word/_rels/document.xml.rels").unwrap().clone();

        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        let header_report = report.part("word/header1.xml").unwrap();
        assert_eq!(header_report.substituted, 1);
        assert_eq!(header_report.duplicated, 1);
        assert!(header_report.failures.is_empty());

        let table =
            RelationshipTable::parse("rels", text(&pkg, "word/_rels/header1.xml.rels")).unwrap();
        let ids: Vec<String> = table.iter().map(|r| r.r_id().to_string()).collect();
        assert_eq!(ids, ["rId1", "rId1_2"]);
        assert_eq!(table.get("rId1_2").unwrap().target_ref(), "media/image3_2.png");

        assert_eq!(pkg.part("word/media/image3.png").unwrap().data(), b"http://img/h1.png");
        assert_eq!(pkg.part("word/media/image3_2.png").unwrap().data(), b"http://img/h2.png");
        assert_eq!(pkg.part("word/_rels/document.xml.rels"), Some(&body_rels));
        assert!(text(&pkg, "word/header1.xml").contains(r#"r:embed="rId1_2""#));
    }

    #[test]
    fn test_unreplaced_and_static_images() {
        let mut pkg = docx(&[
            drawing_xml("wp:anchor", r#"descr="" dynamic="true""#, "rId5", 4000, 3000),
            drawing_xml("wp:anchor", r#"descr="logo" dynamic="false""#, "rId5", 4000, 3000),
        ]);
        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(report.cleaned(), 1);
        assert_eq!(report.substituted(), 0);

        let doc = text(&pkg, "word/document.xml");
        assert_eq!(doc.matches("<wp:anchor/>").count(), 1);
        assert!(doc.contains(r#"descr="logo" dynamic="false""#));
        assert_eq!(pkg.part("word/media/image1.png").unwrap().data(), b"\x89PNG");
    }

    #[test]
    fn test_contained_image_uses_prober() {
        let mut pkg = docx(&[dynamic("file:///srv/a.png", r#"contains="true""#, "rId5")]);
        let prober = FixedProber(Dimensions::new(300, 600));
        postprocess_with(&mut pkg, &ProcessOptions::new(), &prober).unwrap();
        let doc = text(&pkg, "word/document.xml");
        assert_eq!(doc.matches(r#"cx="1500" cy="3000""#).count(), 2);
    }

    #[test]
    fn test_parse_strictness() {
        let mut strict = docx(&[]);
        strict
            .push_part(Part::new("word/header1.xml", "<w:hdr><w:p></w:hdr>"))
            .unwrap();
        let mut lenient = strict.clone();

        let report = postprocess(&mut strict, &ProcessOptions::new()).unwrap();
        assert_eq!(report.part_failures.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(strict.part("word/header1.xml").unwrap().data(), b"<w:hdr><w:p></w:hdr>");

        let options = ProcessOptions::new().with_strictness(ParseStrictness::Lenient);
        let report = postprocess(&mut lenient, &options).unwrap();
        assert!(report.part_failures.is_empty());
        assert_eq!(report.skipped, ["word/header1.xml"]);
        assert_eq!(lenient.part("word/header1.xml").unwrap().data(), b"<w:hdr><w:p></w:hdr>");
    }

    #[test]
    fn test_missing_main_document() {
        let mut pkg = Package::with_filename("empty.docx");
        assert!(matches!(
            postprocess(&mut pkg, &ProcessOptions::new()),
            Err(Error::PartNotFound(ref name)) if name == "word/document.xml"
        ));
    }

    #[test]
    fn test_unknown_format_is_untouched() {
        let mut pkg = Package::with_filename("sheet.xlsx");
        pkg.push_part(Part::new("xl/workbook.xml", "<workbook/>")).unwrap();
        let before = pkg.clone();
        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(report.format, None);
        assert_eq!(pkg, before);
    }

    #[test]
    fn test_odt_frames() {
        let mut pkg = Package::with_filename("letter.odt");
        pkg.push_part(Part::new(
            "content.xml",
            concat!(
                r#"<office:document-content><draw:frame>"#,
                r#"<draw:image xlink:href="Pictures/x.png"/><svg:desc>http://img/a.png</svg:desc>"#,
                r#"</draw:frame></office:document-content>"#
            ),
        ))
        .unwrap();

        let report = postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        assert_eq!(report.format, Some(DocumentFormat::Odt));
        assert_eq!(report.frames(), 1);
        assert!(text(&pkg, "content.xml").contains(concat!(
            r#"<draw:frame><draw:image><office:binary-data>http://img/a.png</office:binary-data>"#,
            r#"</draw:image><svg:desc>0</svg:desc></draw:frame>"#
        )));
    }

    #[test]
    fn test_embeddings_are_processed_by_their_own_format() {
        let mut outer = docx(&[dynamic("http://img/a.png", "", "rId5")]);
        let inner = docx(&[dynamic("http://img/b.png", "", "rId5")]);
        outer.push_embedding(Embedding::new("word/embeddings/inner.docx", inner));
        let mut broken = Package::new();
        broken.push_part(Part::new("readme.txt", "hi")).unwrap();
        outer.push_embedding(Embedding::new("word/embeddings/broken.odt", broken));

        let report = postprocess(&mut outer, &ProcessOptions::new()).unwrap();
        assert_eq!(report.substituted(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.embeddings.len(), 2);
        assert!(matches!(report.embeddings[1].1.part_failures[0], Error::PartNotFound(_)));

        let inner = outer.embeddings()[0].package();
        assert_eq!(inner.part("word/media/image1.png").unwrap().data(), b"http://img/b.png");

        let mut skipped = docx(&[]);
        let untouched = docx(&[dynamic("x", "", "rId5")]);
        skipped.push_embedding(Embedding::new("word/embeddings/inner.docx", untouched));
        let options = ProcessOptions::new().with_process_embeddings(false);
        let report = postprocess(&mut skipped, &options).unwrap();
        assert!(report.embeddings.is_empty());
        let media = skipped.embeddings()[0].package().part("word/media/image1.png").unwrap();
        assert_eq!(media.data(), b"\x89PNG");
    }

    #[test]
    fn test_zip_round_trip() {
        let mut pkg = docx(&[
            dynamic("http://img/a.png", "", "rId5"),
            dynamic("http://img/b.png", "", "rId5"),
        ]);
        let bytes = pkg.to_bytes().unwrap();
        let mut reopened = Package::from_bytes(&bytes, Some("template.docx")).unwrap();

        postprocess(&mut pkg, &ProcessOptions::new()).unwrap();
        postprocess(&mut reopened, &ProcessOptions::new()).unwrap();
        assert_eq!(reopened, pkg);

        let saved = Package::from_bytes(&reopened.to_bytes().unwrap(), Some("out.docx")).unwrap();
        assert_eq!(saved.part("word/media/image1_2.png").unwrap().data(), b"http://img/b.png");
    }
}
