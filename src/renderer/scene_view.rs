use glam::DVec3;
use surface3d::{Mesh, Scene};
use winit::window::Window;

use crate::renderer::{Camera, GpuState};

/// The window, camera and GPU buffers seen as a [`Scene`] for one refresh.
pub struct SceneView<'a> {
    pub camera: &'a Camera,
    pub gpu: &'a mut GpuState,
    pub window: &'a Window,
}

impl Scene for SceneView<'_> {
    fn camera_position(&self) -> DVec3 {
        self.camera.position.as_dvec3()
    }

    fn remove_current_mesh(&mut self) {
        self.gpu.mesh_buffers.clear();
    }

    fn add_mesh(&mut self, mesh: Mesh) {
        let gpu = &mut *self.gpu;
        gpu.mesh_buffers.upload(&gpu.queue, &mesh);
    }

    fn render_frame(&mut self) {
        self.window.request_redraw();
    }
}
