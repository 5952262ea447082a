//! Camera-centred polar sampling grid.
//!
//! The disk is built from an inner fan around the centre followed by rings of
//! quads, each quad split into two triangles. Ring radii follow
//! `max_radius * (i / rings) ^ (exponent_base / density)`, so rings crowd
//! towards the centre when the camera is close to the surface and spread out
//! evenly when it is far away.

use std::f64::consts::TAU;

use crate::error::GridConfigError;

pub const MAX_RADIUS: f64 = 10_000.0;
pub const EXPONENT_BASE: f64 = 100.0;
pub const RING_COUNT: usize = 100;
pub const ANGULAR_SEGMENTS: usize = 32;
/// Densities below this (camera resting on the surface) are clamped up to it.
pub const MIN_DENSITY: f64 = 1e-3;
/// Upper bound on triangles per grid. At 36 bytes of positions per triangle
/// this keeps each vertex buffer under wgpu's default 256 MiB buffer limit.
pub const MAX_TRIANGLES: usize = 5_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub max_radius: f64,
    pub exponent_base: f64,
    pub ring_count: usize,
    pub angular_segments: usize,
    pub min_density: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_radius: MAX_RADIUS,
            exponent_base: EXPONENT_BASE,
            ring_count: RING_COUNT,
            angular_segments: ANGULAR_SEGMENTS,
            min_density: MIN_DENSITY,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.ring_count == 0 {
            return Err(GridConfigError::NoRings);
        }
        if self.angular_segments < 3 {
            return Err(GridConfigError::TooFewSegments(self.angular_segments));
        }
        if self.triangle_count() > MAX_TRIANGLES {
            return Err(GridConfigError::TooLarge {
                rings: self.ring_count,
                segments: self.angular_segments,
                max: MAX_TRIANGLES,
            });
        }
        for (name, value) in [
            ("max radius", self.max_radius),
            ("exponent base", self.exponent_base),
            ("minimum density", self.min_density),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }

    /// Inner fan plus two triangles per quad of every outer ring. Saturates
    /// instead of wrapping for configurations `validate` would reject.
    pub fn triangle_count(&self) -> usize {
        let per_segment = self.ring_count.saturating_sub(1).saturating_mul(2).saturating_add(1);
        self.angular_segments.saturating_mul(per_segment)
    }

    pub fn vertex_count(&self) -> usize {
        self.triangle_count().saturating_mul(3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplePoint {
    pub x: f64,
    pub z: f64,
}

impl SamplePoint {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Corner coordinates of one triangle.
pub type Triple = [SamplePoint; 3];

/// Generates polar grids for a fixed configuration. The trig table only
/// depends on the segment count, so it is built once and reused.
#[derive(Debug, Clone)]
pub struct PolarGridGenerator {
    config: GridConfig,
    sin: Vec<f64>,
    cos: Vec<f64>,
    max_exponent: f64,
}

impl PolarGridGenerator {
    pub fn new(config: GridConfig) -> Result<Self, GridConfigError> {
        config.validate()?;

        let segments = config.angular_segments;
        let (sin, cos) = (0..=segments)
            .map(|i| (TAU * i as f64 / segments as f64).sin_cos())
            .unzip();

        Ok(Self {
            config,
            sin,
            cos,
            max_exponent: max_exponent(&config),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn exponent(&self, density: f64) -> f64 {
        let density = if density.is_finite() {
            density.max(self.config.min_density)
        } else {
            self.config.min_density
        };
        (self.config.exponent_base / density).min(self.max_exponent)
    }

    /// `ring_count + 1` radii starting at 0 and ending at `max_radius`.
    pub fn radii(&self, density: f64) -> Vec<f64> {
        let rings = self.config.ring_count;
        let exponent = self.exponent(density);

        let mut radii = Vec::with_capacity(rings + 1);
        radii.push(0.0);
        radii.extend(
            (1..=rings).map(|i| self.config.max_radius * (i as f64 / rings as f64).powf(exponent)),
        );
        radii
    }

    pub fn generate(&self, center: SamplePoint, density: f64) -> Vec<Triple> {
        let radii = self.radii(density);
        let rings = self.config.ring_count;
        let segments = self.config.angular_segments;

        let at = |angle: usize, ring: usize| SamplePoint {
            x: center.x + self.cos[angle] * radii[ring],
            z: center.z + self.sin[angle] * radii[ring],
        };

        let mut triples = Vec::with_capacity(self.config.triangle_count());

        for j in 0..segments {
            triples.push([at(j, 1), center, at(j + 1, 1)]);
        }

        for i in 1..rings {
            for j in 0..segments {
                let inner = (at(j, i), at(j + 1, i));
                let outer = (at(j, i + 1), at(j + 1, i + 1));

                triples.push([outer.0, inner.0, outer.1]);
                triples.push([inner.0, inner.1, outer.1]);
            }
        }

        triples
    }
}

/// Largest exponent for which the innermost ring radius is still a normal,
/// positive `f64`. Past it `(1 / rings) ^ exponent` underflows and the inner
/// rings collapse onto the centre.
fn max_exponent(config: &GridConfig) -> f64 {
    if config.ring_count < 2 {
        return f64::INFINITY;
    }
    let floor = (f64::MIN_POSITIVE / config.max_radius).ln().min(-1.0);
    floor / (1.0 / config.ring_count as f64).ln()
}

/// One-shot generation without keeping the trig table around.
pub fn generate(
    center: SamplePoint,
    density: f64,
    ring_count: usize,
    angular_segments: usize,
) -> Result<Vec<Triple>, GridConfigError> {
    let generator = PolarGridGenerator::new(GridConfig {
        ring_count,
        angular_segments,
        ..GridConfig::default()
    })?;
    Ok(generator.generate(center, density))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn small_grid_has_expected_triangles() {
        let triples = generate(SamplePoint::new(0.0, 0.0), 1.0, 2, 4).unwrap();
        assert_eq!(triples.len(), 12);

        for point in triples.iter().flatten() {
            assert!(point.x.abs() <= MAX_RADIUS + 1e-9);
            assert!(point.z.abs() <= MAX_RADIUS + 1e-9);
        }
    }

    #[test]
    fn default_grid_size() {
        let generator = PolarGridGenerator::new(GridConfig::default()).unwrap();
        assert_eq!(generator.config().triangle_count(), 32 * 199);
        assert_eq!(
            generator.generate(SamplePoint::default(), 30.0).len(),
            32 * 199
        );
    }

    #[test]
    fn inner_fan_touches_center() {
        let center = SamplePoint::new(12.5, -3.0);
        let generator = PolarGridGenerator::new(GridConfig {
            ring_count: 3,
            angular_segments: 8,
            ..GridConfig::default()
        })
        .unwrap();
        let radii = generator.radii(50.0);
        let triples = generator.generate(center, 50.0);

        for triple in &triples[..8] {
            assert_eq!(triple[1], center);
            for corner in [triple[0], triple[2]] {
                let r = (corner.x - center.x).hypot(corner.z - center.z);
                assert_abs_diff_eq!(r, radii[1], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn quads_follow_winding() {
        let generator = PolarGridGenerator::new(GridConfig {
            ring_count: 2,
            angular_segments: 4,
            ..GridConfig::default()
        })
        .unwrap();
        let radii = generator.radii(100.0);
        let triples = generator.generate(SamplePoint::default(), 100.0);

        // first quad of ring 1: angles 0 and 90 degrees
        let [a, b] = [triples[4], triples[5]];
        let (r_in, r_out) = (radii[1], radii[2]);

        assert_abs_diff_eq!(a[0].x, r_out, epsilon = 1e-9);
        assert_abs_diff_eq!(a[1].x, r_in, epsilon = 1e-9);
        assert_abs_diff_eq!(a[2].z, r_out, epsilon = 1e-9);
        assert_eq!(b[0], a[1]);
        assert_abs_diff_eq!(b[1].z, r_in, epsilon = 1e-9);
        assert_eq!(b[2], a[2]);
    }

    #[test]
    fn radii_span_zero_to_max() {
        let generator = PolarGridGenerator::new(GridConfig::default()).unwrap();
        for density in [1.0, 30.0, 100.0, 5000.0] {
            let radii = generator.radii(density);
            assert_eq!(radii.len(), RING_COUNT + 1);
            assert_eq!(radii[0], 0.0);
            assert_eq!(radii[RING_COUNT], MAX_RADIUS);
            assert!(radii.windows(2).skip(1).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn zero_density_is_clamped() {
        let generator = PolarGridGenerator::new(GridConfig::default()).unwrap();
        for density in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let radii = generator.radii(density);
            assert!(radii.iter().all(|r| r.is_finite()));
            assert_eq!(radii[RING_COUNT], MAX_RADIUS);
        }
    }

    #[test]
    fn inner_rings_never_collapse() {
        let generator = PolarGridGenerator::new(GridConfig::default()).unwrap();
        for density in [MIN_DENSITY, 0.0, 0.01, 0.3, 0.6] {
            let radii = generator.radii(density);
            assert!(radii[1] > 0.0, "density {density}: {}", radii[1]);
            assert!(
                radii.windows(2).skip(1).all(|w| w[0] < w[1]),
                "density {density}"
            );
        }

        // the cap only bites where the plain formula would underflow
        assert_eq!(generator.radii(1.0), {
            let exponent = EXPONENT_BASE / 1.0;
            let mut plain = vec![0.0];
            plain.extend((1..=RING_COUNT).map(|i| MAX_RADIUS * (i as f64 / RING_COUNT as f64).powf(exponent)));
            plain
        });
    }

    #[test]
    fn far_camera_spreads_rings() {
        let generator = PolarGridGenerator::new(GridConfig::default()).unwrap();
        let near = generator.radii(10.0);
        let far = generator.radii(1000.0);
        assert!(far[RING_COUNT / 2] > near[RING_COUNT / 2]);
    }

    #[test]
    fn rejects_bad_config() {
        let bad = |config: GridConfig| PolarGridGenerator::new(config).unwrap_err();
        assert_eq!(
            bad(GridConfig {
                ring_count: 0,
                ..GridConfig::default()
            }),
            GridConfigError::NoRings
        );
        assert_eq!(
            bad(GridConfig {
                angular_segments: 2,
                ..GridConfig::default()
            }),
            GridConfigError::TooFewSegments(2)
        );
        assert!(matches!(
            bad(GridConfig {
                max_radius: -1.0,
                ..GridConfig::default()
            }),
            GridConfigError::NotPositive { .. }
        ));
    }

    #[test]
    fn rejects_oversized_grids() {
        let config = |ring_count, angular_segments| GridConfig {
            ring_count,
            angular_segments,
            ..GridConfig::default()
        };

        assert!(matches!(
            PolarGridGenerator::new(config(5000, 1000)).unwrap_err(),
            GridConfigError::TooLarge { rings: 5000, segments: 1000, .. }
        ));
        assert!(matches!(
            PolarGridGenerator::new(config(usize::MAX, 3)).unwrap_err(),
            GridConfigError::TooLarge { .. }
        ));
        assert!(matches!(
            PolarGridGenerator::new(config(4, usize::MAX)).unwrap_err(),
            GridConfigError::TooLarge { .. }
        ));

        // 2500 segments * (1 + 2 * 999) = 4_997_500
        assert!(PolarGridGenerator::new(config(1000, 2500)).is_ok());
    }

    #[test]
    fn sizes_saturate_instead_of_wrapping() {
        let unvalidated = GridConfig {
            ring_count: 0,
            angular_segments: 8,
            ..GridConfig::default()
        };
        assert_eq!(unvalidated.triangle_count(), 8);

        let huge = GridConfig {
            ring_count: usize::MAX,
            angular_segments: usize::MAX,
            ..GridConfig::default()
        };
        assert_eq!(huge.triangle_count(), usize::MAX);
        assert_eq!(huge.vertex_count(), usize::MAX);
    }
}
