//! Contained (aspect-preserving) image sizing.
//!
//! A contained image keeps the template box's side along its own longer
//! axis and recomputes the other side from the image's natural aspect
//! ratio. When no dimensions are available the box collapses to zero so
//! that a wrong placeholder size is never rendered.

use super::payload::PayloadSource;
use super::probe::{DimensionProber, Dimensions};
use crate::ooxml::docx::drawing::Extent;

/// `round(value * numerator / denominator)` with halves rounded up.
///
/// Computed in 128 bits so EMU-sized boxes cannot overflow.
fn scale_rounded(value: u64, numerator: u64, denominator: u64) -> u64 {
    let (value, numerator, denominator) = (value as u128, numerator as u128, denominator as u128);
    let scaled = (2 * value * numerator + denominator) / (2 * denominator);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Fit an image with natural size `natural` into `bounds`.
///
/// Landscape images keep `cx`; portrait and square images keep `cy`.
pub fn fit_contained(bounds: Extent, natural: Dimensions) -> Extent {
    if natural.is_degenerate() {
        return Extent::ZERO;
    }
    if natural.is_landscape() {
        Extent::new(bounds.cx, scale_rounded(bounds.cx, natural.height, natural.width))
    } else {
        Extent::new(scale_rounded(bounds.cy, natural.width, natural.height), bounds.cy)
    }
}

/// Compute the box for a contained image given its payload.
///
/// Returns [`Extent::ZERO`] when the payload's dimensions cannot be probed.
pub fn resize(bounds: Extent, payload: &str, prober: &dyn DimensionProber) -> Extent {
    match PayloadSource::classify(payload).dimensions(prober) {
        Some(natural) => fit_contained(bounds, natural),
        None => Extent::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::probe::ImageSizeProber;
    use proptest::prelude::*;
    use std::path::Path;

    /// Prober returning fixed dimensions for every source.
    struct FixedProber(Option<Dimensions>);

    impl DimensionProber for FixedProber {
        fn probe_bytes(&self, _data: &[u8]) -> Option<Dimensions> {
            self.0
        }

        fn probe_path(&self, _path: &Path) -> Option<Dimensions> {
            self.0
        }
    }

    #[test]
    fn test_landscape_keeps_width() {
        let fitted = fit_contained(Extent::new(4000, 3000), Dimensions::new(800, 400));
        assert_eq!(fitted, Extent::new(4000, 2000));
    }

    #[test]
    fn test_portrait_keeps_height() {
        let fitted = fit_contained(Extent::new(3000, 4000), Dimensions::new(300, 600));
        assert_eq!(fitted, Extent::new(2000, 4000));
    }

    #[test]
    fn test_square_counts_as_portrait() {
        let fitted = fit_contained(Extent::new(5000, 1000), Dimensions::new(64, 64));
        assert_eq!(fitted, Extent::new(1000, 1000));
    }

    #[test]
    fn test_halves_round_up() {
        // 5 * 1 / 2 = 2.5
        assert_eq!(fit_contained(Extent::new(5, 9), Dimensions::new(2, 1)), Extent::new(5, 3));
        // 10 * 1 / 3 = 3.33
        assert_eq!(fit_contained(Extent::new(10, 9), Dimensions::new(3, 1)), Extent::new(10, 3));
    }

    #[test]
    fn test_unrecognised_payload_collapses() {
        let prober = FixedProber(Some(Dimensions::new(800, 400)));
        assert_eq!(resize(Extent::new(4000, 3000), "http://img/a.png", &prober), Extent::ZERO);
        let not_an_image = "data:image/png;base64,bm90IGFuIGltYWdl";
        assert_eq!(resize(Extent::new(4000, 3000), not_an_image, &ImageSizeProber), Extent::ZERO);
    }

    #[test]
    fn test_resize_uses_prober() {
        let prober = FixedProber(Some(Dimensions::new(800, 400)));
        assert_eq!(
            resize(Extent::new(4000, 3000), "file:///x.png", &prober),
            Extent::new(4000, 2000)
        );
        let failing = FixedProber(None);
        assert_eq!(resize(Extent::new(4000, 3000), "file:///x.png", &failing), Extent::ZERO);
        let flat = FixedProber(Some(Dimensions::new(0, 400)));
        assert_eq!(resize(Extent::new(4000, 3000), "file:///x.png", &flat), Extent::ZERO);
    }

    proptest! {
        #[test]
        fn prop_fitted_box_keeps_one_side(
            cx in 1u64..20_000_000,
            cy in 1u64..20_000_000,
            width in 1u64..10_000,
            height in 1u64..10_000,
        ) {
            let fitted = fit_contained(Extent::new(cx, cy), Dimensions::new(width, height));
            if width > height {
                prop_assert_eq!(fitted.cx, cx);
                prop_assert!(fitted.cy <= cx);
            } else {
                prop_assert_eq!(fitted.cy, cy);
                prop_assert!(fitted.cx <= cy);
            }
        }

        #[test]
        fn prop_fitted_box_preserves_ratio(
            side in 1_000u64..20_000_000,
            width in 1u64..10_000,
            height in 1u64..10_000,
        ) {
            let fitted = fit_contained(Extent::new(side, side), Dimensions::new(width, height));
            // Cross-multiplied error is bounded by half a unit of the rounded side.
            let lhs = fitted.cx as u128 * height as u128;
            let rhs = fitted.cy as u128 * width as u128;
            let tolerance = width.max(height) as u128;
            prop_assert!(lhs.abs_diff(rhs) <= tolerance);
        }
    }
}
