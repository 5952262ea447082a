pub mod camera;
pub mod gpu;
pub mod mesh_buffers;
pub mod scene_view;

pub use camera::Camera;
pub use gpu::GpuState;
pub use scene_view::SceneView;
