//! Removal of dynamic placeholders that received no payload.
//!
//! A picture flagged `dynamic="true"` whose `descr` is empty was meant to be
//! filled at render time but got nothing. Its anchor is emptied in place so
//! the drawing takes no layout space. The `w:drawing` element and the
//! relationship table are left alone.

use super::drawing::Drawing;
use crate::common::Result;
use crate::common::xml::XmlElement;
use crate::ooxml::opc::constants::drawing::DRAWING;
use crate::package::Part;

/// Detach every unreplaced placeholder under `root`.
///
/// Returns the number of drawings detached. Already-detached drawings are
/// not counted, so a second pass returns 0.
pub fn clean_tree(root: &mut XmlElement) -> usize {
    let mut cleaned = 0;
    root.visit_mut(DRAWING, &mut |element: &mut XmlElement| {
        let mut drawing = Drawing::new(element);
        let unreplaced = drawing.props().is_some_and(|props| props.is_unreplaced());
        if unreplaced && drawing.detach() {
            cleaned += 1;
        }
    });
    cleaned
}

/// Clean a single part in place.
///
/// The part's bytes are only rewritten when at least one drawing was
/// detached.
///
/// # Errors
/// [`Error::ParseFailure`](crate::common::Error::ParseFailure) if the part is
/// not well-formed XML; the part is then left unchanged.
pub fn clean_part(part: &mut Part) -> Result<usize> {
    let mut doc = part.parse_xml()?;
    let cleaned = clean_tree(doc.root_mut());
    if cleaned > 0 {
        log::debug!("{}: detached {} unreplaced image(s)", part.name(), cleaned);
        part.set_data(doc.to_xml());
    }
    Ok(cleaned)
}
