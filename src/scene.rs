//! Refresh pipeline and the boundary to whatever draws the surface.
//!
//! A refresh reads the camera from the [`Scene`], lays a polar grid around the
//! point below it, samples and colors that grid, and only once all of that has
//! succeeded swaps the new [`Mesh`] into the scene.

use std::time::{Duration, Instant};

use glam::DVec3;
use tracing::{debug, warn};

use crate::error::{EvaluationError, GridConfigError, RefreshError};
use crate::math::color::colors_for;
use crate::math::expression::Expression;
use crate::math::field::ScalarField;
use crate::math::grid::{GridConfig, PolarGridGenerator, SamplePoint};
use crate::math::mesh::{Mesh, assemble};
use crate::math::sampler::{HeightExtent, sample};

/// Rendering side of the viewer.
pub trait Scene {
    fn camera_position(&self) -> DVec3;

    fn remove_current_mesh(&mut self);

    fn add_mesh(&mut self, mesh: Mesh);

    fn render_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshStats {
    pub triangles: usize,
    pub extent: HeightExtent,
    /// Surface height directly below (or above) the camera.
    pub surface_height: f64,
    pub density: f64,
    pub elapsed: Duration,
}

pub struct SurfaceMesher {
    grid: PolarGridGenerator,
}

impl SurfaceMesher {
    pub fn new(config: GridConfig) -> Result<Self, GridConfigError> {
        Ok(Self {
            grid: PolarGridGenerator::new(config)?,
        })
    }

    pub fn config(&self) -> &GridConfig {
        self.grid.config()
    }

    /// Builds the mesh for a camera at `camera` without touching any scene.
    pub fn build(
        &self,
        expr: &Expression,
        camera: DVec3,
    ) -> Result<(Mesh, RefreshStats), EvaluationError> {
        let started = Instant::now();

        let surface_height = expr.evaluate(camera.x, camera.z)?;
        let density = (surface_height - camera.y).abs();

        let triples = self
            .grid
            .generate(SamplePoint::new(camera.x, camera.z), density);
        let surface = sample(&triples, expr, surface_height)?;
        let colors = colors_for(&surface.averages, surface.extent);
        let mesh = assemble(&surface.triangles, &colors);

        let stats = RefreshStats {
            triangles: mesh.triangle_count(),
            extent: surface.extent,
            surface_height,
            density,
            elapsed: started.elapsed(),
        };
        Ok((mesh, stats))
    }

    /// Rebuilds the surface around the scene's camera and publishes it. On
    /// error the scene keeps showing the previous mesh.
    pub fn refresh<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        field: &ScalarField,
    ) -> Result<RefreshStats, RefreshError> {
        let expr = field.expression().ok_or(RefreshError::NoExpression)?;
        let camera = scene.camera_position();

        let (mesh, stats) = self.build(expr, camera).inspect_err(|err| {
            warn!(%err, camera = ?camera, "refresh abandoned, keeping previous mesh");
        })?;

        scene.remove_current_mesh();
        scene.add_mesh(mesh);

        debug!(
            triangles = stats.triangles,
            min_y = stats.extent.min,
            max_y = stats.extent.max,
            density = stats.density,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "surface refreshed"
        );
        Ok(stats)
    }
}
