pub mod error;
pub mod math;
pub mod scene;

pub use error::{EvaluationError, ExpressionSyntaxError, GridConfigError, RefreshError};
pub use math::{Expression, GridConfig, HeightExtent, Mesh, ScalarField};
pub use scene::{RefreshStats, Scene, SurfaceMesher};
