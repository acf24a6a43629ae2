//! Image substitution for OpenDocument text (`content.xml`).
//!
//! ODF has no relationship tables: a picture is a `draw:frame` whose
//! `draw:image` either links a file (`xlink:href`) or embeds its data in an
//! `office:binary-data` child. Templates carry the payload in the frame's
//! `svg:desc`. Rewriting a frame moves the payload into the image as inline
//! binary data and replaces the description with the frame's index.

use crate::common::Result;
use crate::common::xml::{XmlDocument, XmlElement};
use crate::package::{Package, Part};

/// Member name of the content part.
pub const CONTENT_PART: &str = "content.xml";

const FRAME: &str = "draw:frame";
const IMAGE: &str = "draw:image";
const DESC: &str = "svg:desc";
const BINARY_DATA: &str = "office:binary-data";
const HREF: &str = "xlink:href";
const MIME_TYPE: &str = "loext:mime-type";

/// Rewrite one frame with the given document-order index.
///
/// Frames without a description, with an empty one, or without an image are
/// left alone. Returns whether the frame was rewritten.
pub fn rewrite_frame(frame: &mut XmlElement, index: usize) -> bool {
    let payload = match frame.child(DESC).map(XmlElement::text) {
        Some(payload) if !payload.is_empty() => payload,
        _ => return false,
    };

    let mut rewritten = false;
    frame.visit_mut(IMAGE, &mut |image: &mut XmlElement| {
        if rewritten {
            return;
        }
        image.remove_attribute(HREF);
        image.remove_attribute(MIME_TYPE);
        image.remove_children(BINARY_DATA);
        let mut data = XmlElement::new(BINARY_DATA);
        data.set_text(&payload);
        image.push_element(data);
        rewritten = true;
    });

    if !rewritten {
        return false;
    }
    if let Some(desc) = frame.child_mut(DESC) {
        desc.set_text(&index.to_string());
    }
    true
}

/// Rewrite every described frame under `root`. Returns how many were rewritten.
///
/// The index written into a description counts all frames, described or not.
pub fn rewrite_frames(root: &mut XmlElement) -> usize {
    let mut index = 0;
    let mut rewritten = 0;
    root.visit_mut(FRAME, &mut |frame: &mut XmlElement| {
        if rewrite_frame(frame, index) {
            rewritten += 1;
        }
        index += 1;
    });
    rewritten
}

/// Rewrite the frames of a content part in place.
///
/// The bytes are only rewritten when at least one frame changed.
pub fn process_content_part(part: &mut Part) -> Result<usize> {
    let mut doc: XmlDocument = part.parse_xml()?;
    let rewritten = rewrite_frames(doc.root_mut());
    if rewritten > 0 {
        log::debug!("{}: moved {} image payload(s) inline", part.name(), rewritten);
        part.set_data(doc.to_xml());
    }
    Ok(rewritten)
}

/// Rewrite the frames of a package's `content.xml`.
///
/// # Errors
/// [`Error::PartNotFound`](crate::common::Error::PartNotFound) without a
/// content part, [`Error::ParseFailure`](crate::common::Error::ParseFailure)
/// if it is malformed.
pub fn process_package(package: &mut Package) -> Result<usize> {
    process_content_part(package.require_part_mut(CONTENT_PART)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn frame(desc: Option<&str>) -> String {
        let desc = desc.map_or(String::new(), |d| format!("<svg:desc>{}</svg:desc>", d));
        format!(
            concat!(
                r#"<draw:frame draw:name="img"><draw:image xlink:href="Pictures/1.png" "#,
                r#"xlink:type="simple" loext:mime-type="image/png"><text:p/></draw:image>"#,
                "{}</draw:frame>"
            ),
            desc
        )
    }

    fn content(frames: &[String]) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content>"#,
                "<office:body><office:text><text:p>{}</text:p></office:text></office:body>",
                "</office:document-content>"
            ),
            frames.concat()
        )
    }

    #[test]
    fn test_described_frame_gets_inline_payload() {
        let mut part = Part::new(
            CONTENT_PART,
            content(&[frame(None), frame(Some("http://img/a.png?x=1&amp;y=2"))]),
        );
        assert_eq!(process_content_part(&mut part).unwrap(), 1);

        let xml = part.text().unwrap();
        assert!(xml.contains(concat!(
            r#"<draw:image xlink:type="simple"><text:p/>"#,
            r#"<office:binary-data>http://img/a.png?x=1&amp;y=2</office:binary-data></draw:image>"#,
            "<svg:desc>1</svg:desc>"
        )));
        // The undescribed frame keeps its link.
        assert_eq!(xml.matches(r#"xlink:href="Pictures/1.png""#).count(), 1);
    }

    #[test]
    fn test_existing_binary_data_is_replaced() {
        let xml = concat!(
            "<draw:frame><draw:image><office:binary-data>AAAA</office:binary-data></draw:image>",
            "<svg:desc>data:image/png;base64,QUJD</svg:desc></draw:frame>"
        );
        let mut doc = XmlDocument::parse(CONTENT_PART, xml).unwrap();
        assert!(rewrite_frame(doc.root_mut(), 7));
        assert_eq!(
            doc.root().to_xml_string(),
            concat!(
                "<draw:frame><draw:image>",
                "<office:binary-data>data:image/png;base64,QUJD</office:binary-data>",
                "</draw:image><svg:desc>7</svg:desc></draw:frame>"
            )
        );
    }

    #[test]
    fn test_empty_desc_and_missing_image_are_skipped() {
        let mut part = Part::new(
            CONTENT_PART,
            content(&[
                frame(Some("")),
                r#"<draw:frame><svg:desc>x</svg:desc></draw:frame>"#.to_string(),
            ]),
        );
        let before = part.clone();
        assert_eq!(process_content_part(&mut part).unwrap(), 0);
        assert_eq!(part, before);
    }

    #[test]
    fn test_missing_content_part() {
        let mut pkg = Package::with_filename("a.odt");
        assert!(matches!(process_package(&mut pkg), Err(Error::PartNotFound(_))));
    }
}
