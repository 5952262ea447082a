use crate::error::EvaluationError;
use crate::math::expression::Expression;
use crate::math::grid::Triple;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Lowest and highest height seen during one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightExtent {
    pub min: f64,
    pub max: f64,
}

impl HeightExtent {
    pub fn seeded(height: f64) -> Self {
        Self {
            min: height,
            max: height,
        }
    }

    pub fn include(&mut self, height: f64) {
        if height < self.min {
            self.min = height;
        }
        if height > self.max {
            self.max = height;
        }
    }

    /// May be infinite when the extent spans more than `f64::MAX`.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn mid(&self) -> f64 {
        self.min / 2.0 + self.max / 2.0
    }

    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }
}

pub struct SampledSurface {
    pub triangles: Vec<[Vertex; 3]>,
    pub averages: Vec<f64>,
    pub extent: HeightExtent,
}

const VERTEX_LIMIT: f64 = f32::MAX as f64;

/// Vertices are uploaded as `f32`, so every component must fit one.
fn check_vertex(vertex: Vertex) -> Result<Vertex, EvaluationError> {
    let Vertex { x, y, z } = vertex;
    match [x, y, z].into_iter().find(|v| v.abs() > VERTEX_LIMIT) {
        Some(value) => Err(EvaluationError::OutOfRange { value, x, z }),
        None => Ok(vertex),
    }
}

/// Evaluates every corner of `triples`. The extent starts at
/// `reference_height`, the surface height under the camera, so the color
/// scale always covers what the viewer is standing over. Any failed point
/// discards the whole pass.
pub fn sample(
    triples: &[Triple],
    expr: &Expression,
    reference_height: f64,
) -> Result<SampledSurface, EvaluationError> {
    let mut triangles = Vec::with_capacity(triples.len());
    let mut averages = Vec::with_capacity(triples.len());
    let mut extent = HeightExtent::seeded(reference_height);

    for triple in triples {
        let mut triangle = [Vertex::default(); 3];
        for (vertex, point) in triangle.iter_mut().zip(triple) {
            let y = expr.evaluate(point.x, point.z)?;
            *vertex = check_vertex(Vertex {
                x: point.x,
                y,
                z: point.z,
            })?;
            extent.include(y);
        }

        averages.push((triangle[0].y + triangle[1].y + triangle[2].y) / 3.0);
        triangles.push(triangle);
    }

    Ok(SampledSurface {
        triangles,
        averages,
        extent,
    })
}
