//! XML helpers shared by both package formats.
//!
//! - [`element`]: owned XML tree used to parse, edit and re-serialize parts
//! - [`escape`]: entity escaping and the serialized spellings of a value

pub mod element;
pub mod escape;

pub use element::{XmlDocument, XmlElement, XmlNode};
pub use escape::{escape_text, escape_xml, serialized_spellings};
