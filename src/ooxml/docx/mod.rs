//! Image post-processing for Word (.docx) packages.
//!
//! Templates mark pictures as dynamic placeholders through attributes on
//! `pic:cNvPr`. This module rewrites such pictures in the main document,
//! headers and footers:
//!
//! - [`drawing`]: typed view over `w:drawing` and its extents
//! - [`resolver`]: blip id to relationship to media part, and id allocation
//! - [`substitute`]: per-drawing substitution and payload scrubbing
//! - [`cleaner`]: detaches placeholders that received no payload
//! - [`processor`]: the pipeline for one part
//!
//! # Example
//!
//! ```rust,no_run
//! use blipswap::config::ProcessOptions;
//! use blipswap::images::ImageSizeProber;
//! use blipswap::ooxml::docx::process_part;
//! use blipswap::package::Package;
//!
//! let mut pkg = Package::open("invoice.docx")?;
//! let options = ProcessOptions::new();
//! let report = process_part(&mut pkg, "word/document.xml", &options, &ImageSizeProber)?;
//! println!("{} images substituted", report.substituted + report.duplicated);
//! pkg.save("invoice.out.docx")?;
//! # Ok::<(), blipswap::common::Error>(())
//! ```
pub mod cleaner;
pub mod drawing;
pub mod processor;
pub mod resolver;
pub mod substitute;

pub use cleaner::{clean_part, clean_tree};
pub use drawing::{Drawing, Extent, PictureProps};
pub use processor::process_part;
pub use resolver::{SubstitutionState, rels_part_name};
pub use substitute::{
    PayloadScrub, SubstitutionContext, SubstitutionOutcome, scrub_payloads, substitute,
};
