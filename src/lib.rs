//! Blipswap - dynamic image substitution for office document templates
//!
//! A template engine fills text placeholders, but pictures need a second
//! pass: templates mark pictures as dynamic and carry the image to show (a
//! URL, a file path, or a base64 data URI) in the picture's description.
//! This crate rewrites the package so that each such picture points at its
//! own media part holding that payload, ready for a downstream fetcher.
//!
//! # Features
//!
//! - **Word (.docx)**: main document, headers and footers; per-occurrence
//!   relationship and media duplication when one placeholder is reused
//! - **OpenDocument (.odt)**: payloads moved inline into `draw:image`
//! - **Contained sizing**: aspect-preserving boxes from probed image headers
//! - **Cleaning**: placeholders that received no payload are detached
//! - **Embedded documents**: processed recursively by their own format
//!
//! # Example
//!
//! ```no_run
//! use blipswap::{Package, ProcessOptions, postprocess};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("rendered.docx")?;
//! let report = postprocess(&mut pkg, &ProcessOptions::new())?;
//!
//! println!(
//!     "{} substituted, {} duplicated, {} cleaned",
//!     report.substituted(),
//!     report.duplicated(),
//!     report.cleaned()
//! );
//! pkg.save("final.docx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade. The library never installs a
//! logger.

pub mod common;
pub mod config;
pub mod images;
#[cfg(feature = "odf")]
pub mod odf;
pub mod ooxml;
pub mod package;
pub mod postprocess;

pub use common::{Error, Result};
pub use config::{ParseStrictness, ProcessOptions};
pub use package::{DocumentFormat, Package, Part};
pub use postprocess::{PartReport, ProcessReport, postprocess, postprocess_with};
