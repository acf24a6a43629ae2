//! Image payload helpers for contained sizing.
//!
//! - [`probe`]: natural dimensions through a pluggable [`DimensionProber`]
//! - [`payload`]: classification of payload strings ([`PayloadSource`])
//! - [`resize`]: aspect-preserving box computation

pub mod payload;
pub mod probe;
#[cfg(feature = "ooxml")]
pub mod resize;

pub use payload::PayloadSource;
pub use probe::{DimensionProber, Dimensions, ImageSizeProber};
#[cfg(feature = "ooxml")]
pub use resize::{fit_contained, resize};
