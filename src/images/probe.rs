//! Natural pixel dimensions of image payloads.
//!
//! Probing is an external concern of the post-processor: callers may plug in
//! their own [`DimensionProber`]. [`ImageSizeProber`] is the default and reads
//! only the image header through the `imagesize` crate, so large images are
//! never fully decoded.

use std::path::Path;

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u64,
    pub height: u64,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero, which makes the aspect ratio undefined.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Landscape means strictly wider than tall; squares count as portrait.
    #[inline]
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Source of image dimensions.
///
/// A failed probe is not an error for the caller: both methods return
/// `None` and the image is then laid out with a zero box.
pub trait DimensionProber {
    /// Probe an in-memory image.
    fn probe_bytes(&self, data: &[u8]) -> Option<Dimensions>;

    /// Probe an image file on disk.
    fn probe_path(&self, path: &Path) -> Option<Dimensions>;
}

/// [`DimensionProber`] backed by the `imagesize` crate.
///
/// Recognises the formats `imagesize` does (PNG, JPEG, GIF, BMP, TIFF, WebP
/// and others).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSizeProber;

impl DimensionProber for ImageSizeProber {
    fn probe_bytes(&self, data: &[u8]) -> Option<Dimensions> {
        match imagesize::blob_size(data) {
            Ok(size) => Some(Dimensions::new(size.width as u64, size.height as u64)),
            Err(e) => {
                log::debug!("Could not probe {} byte image: {}", data.len(), e);
                None
            },
        }
    }

    fn probe_path(&self, path: &Path) -> Option<Dimensions> {
        match imagesize::size(path) {
            Ok(size) => Some(Dimensions::new(size.width as u64, size.height as u64)),
            Err(e) => {
                log::debug!("Could not probe image '{}': {}", path.display(), e);
                None
            },
        }
    }
}
