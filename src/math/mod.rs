pub mod color;
pub mod expression;
pub mod field;
pub mod grid;
pub mod mesh;
pub mod presets;
pub mod sampler;

pub use color::{Rgb, color_for, colors_for};
pub use expression::{Expression, compile, evaluate};
pub use field::ScalarField;
pub use grid::{GridConfig, PolarGridGenerator, SamplePoint, Triple};
pub use mesh::{Mesh, assemble};
pub use presets::PRESETS;
pub use sampler::{HeightExtent, SampledSurface, Vertex, sample};
