use crate::math::color::Rgb;
use crate::math::sampler::Vertex;

/// Flat, unindexed triangle list ready for upload. `positions` and `colors`
/// run in parallel, three floats per vertex, nine per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub fn assemble(triangles: &[[Vertex; 3]], colors: &[Rgb]) -> Mesh {
    debug_assert_eq!(triangles.len(), colors.len());

    let floats = triangles.len() * 9;
    let mut positions = Vec::with_capacity(floats);
    let mut flat_colors = Vec::with_capacity(floats);

    for (triangle, color) in triangles.iter().zip(colors) {
        for vertex in triangle {
            positions.extend_from_slice(&[vertex.x as f32, vertex.y as f32, vertex.z as f32]);
            flat_colors.extend_from_slice(color);
        }
    }

    Mesh {
        positions,
        colors: flat_colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64, z: f64) -> Vertex {
        Vertex { x, y, z }
    }

    #[test]
    fn flattens_in_order() {
        let triangles = [
            [v(0.0, 1.0, 2.0), v(3.0, 4.0, 5.0), v(6.0, 7.0, 8.0)],
            [v(9.0, 10.0, 11.0), v(12.0, 13.0, 14.0), v(15.0, 16.0, 17.0)],
        ];
        let colors = [[1.0, 0.5, 0.0], [0.25, 1.0, 0.0]];
        let mesh = assemble(&triangles, &colors);

        assert_eq!(mesh.positions, (0..18).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(&mesh.colors[..9], &[1.0, 0.5, 0.0, 1.0, 0.5, 0.0, 1.0, 0.5, 0.0]);
        assert_eq!(&mesh.colors[9..12], &[0.25, 1.0, 0.0]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn empty_input_gives_empty_mesh() {
        let mesh = assemble(&[], &[]);
        assert!(mesh.is_empty());
        assert_eq!(mesh, Mesh::default());
    }
}
