use tracing::debug;

use crate::math::sampler::HeightExtent;

pub type Rgb = [f32; 3];

/// Color used when every sampled height is identical.
pub const FLAT_COLOR: Rgb = [1.0, 1.0, 0.0];

// red (low) -> yellow (mid) -> green (high)
//
// Works on half ranges so extents near +-f64::MAX stay finite.
pub fn color_for(height: f64, min_y: f64, max_y: f64) -> Rgb {
    let half = max_y / 2.0 - min_y / 2.0;
    if half == 0.0 || height.is_nan() {
        return FLAT_COLOR;
    }

    let mid = min_y / 2.0 + max_y / 2.0;
    let (r, g) = if height < mid {
        (1.0, 1.0 - (mid - height) / half / 4.0)
    } else {
        (1.0 - (height - mid) / half / 4.0, 1.0)
    };

    [r.clamp(0.0, 1.0) as f32, g.clamp(0.0, 1.0) as f32, 0.0]
}

pub fn colors_for(averages: &[f64], extent: HeightExtent) -> Vec<Rgb> {
    if extent.is_flat() {
        debug!(height = extent.min, "flat height range, using uniform color");
    }

    averages
        .iter()
        .map(|&avg| color_for(avg, extent.min, extent.max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn extremes_and_midpoint() {
        let low = color_for(-4.0, -4.0, 4.0);
        assert_eq!(low[0], 1.0);
        assert_relative_eq!(low[1], 0.75);

        let high = color_for(4.0, -4.0, 4.0);
        assert_eq!(high[1], 1.0);
        assert_relative_eq!(high[0], 0.75);

        let mid = color_for(0.0, -4.0, 4.0);
        assert_eq!(mid[0], mid[1]);
        assert_eq!(mid, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn blue_is_always_zero() {
        for h in [-10.0, -1.0, 0.0, 3.0, 10.0] {
            assert_eq!(color_for(h, -10.0, 10.0)[2], 0.0);
        }
    }

    #[test]
    fn flat_range_is_yellow() {
        assert_eq!(color_for(5.0, 5.0, 5.0), FLAT_COLOR);
        assert_eq!(
            colors_for(&[5.0, 5.0], HeightExtent::seeded(5.0)),
            vec![FLAT_COLOR; 2]
        );
    }

    #[test]
    fn extent_near_f64_limits_stays_in_unit_range() {
        for (height, min_y, max_y) in [
            (0.0, -1e308, 1e308),
            (-f64::MAX, -f64::MAX, f64::MAX),
            (f64::MAX, -f64::MAX, f64::MAX),
            (f64::INFINITY, -f64::MAX, f64::MAX),
            (f64::NEG_INFINITY, 0.0, f64::MAX),
        ] {
            let rgb = color_for(height, min_y, max_y);
            assert!(
                rgb.iter().all(|c| (0.0..=1.0).contains(c)),
                "{rgb:?} for {height} in [{min_y}, {max_y}]"
            );
        }
        assert_eq!(color_for(0.0, -1e308, 1e308), [1.0, 1.0, 0.0]);
        assert_eq!(color_for(-1e308, -1e308, 1e308), [1.0, 0.75, 0.0]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let c = color_for(1000.0, 0.0, 1.0);
        assert_eq!(c, [0.0, 1.0, 0.0]);
    }
}
