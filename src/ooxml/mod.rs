//! Office Open XML (OOXML) support.
//!
//! Two layers are involved in rewriting images of a WordprocessingML
//! package:
//!
//! 1. **OPC layer** (`opc`): part naming and relationship tables
//! 2. **Document layer** (`docx`): drawings, substitution and cleaning
#[cfg(feature = "ooxml")]
pub mod docx;
pub mod opc;
