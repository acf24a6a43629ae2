//! OpenDocument (.odt) support.
//!
//! The flow format needs no relationship bookkeeping; see [`frame`].
pub mod frame;

pub use frame::{process_content_part, process_package, rewrite_frames};
