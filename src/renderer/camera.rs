use glam::{Mat4, Vec2, Vec3};

pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub speed_step: f32,
}

const MAX_PITCH_DEG: f32 = 89.0;

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 30.0, 0.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,

            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 20000.0,

            move_speed: 20.0,
            mouse_sensitivity: 0.002,
            speed_step: 5.0,
        }
    }
}

impl Camera {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    /// Turns the camera towards `target`. Straight up or down is clamped to
    /// the pitch limit so the view matrix stays defined.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() == 0.0 {
            return;
        }
        let dir = dir.normalize();
        let max_pitch = MAX_PITCH_DEG.to_radians();

        self.pitch = dir.y.asin().clamp(-max_pitch, max_pitch);
        if dir.x != 0.0 || dir.z != 0.0 {
            self.yaw = dir.z.atan2(dir.x);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn process_keyboard(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let speed = self.move_speed * dt;
        let front = self.front();
        let right_vec = self.right();

        self.position += front * forward * speed;
        self.position += right_vec * right * speed;
        self.position.y += up * speed;
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        let dx = delta.x * self.mouse_sensitivity;
        let dy = delta.y * self.mouse_sensitivity;

        self.yaw += dx;
        self.pitch -= dy;

        let max_pitch = MAX_PITCH_DEG.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.move_speed = (self.move_speed + delta * self.speed_step).clamp(1.0, 5000.0);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_down_is_clamped() {
        let mut camera = Camera::at(Vec3::new(0.0, 30.0, 0.0));
        camera.look_at(Vec3::ZERO);
        assert!((camera.pitch + MAX_PITCH_DEG.to_radians()).abs() < 1e-6);
        assert!(camera.front().y < -0.99);
    }

    #[test]
    fn scroll_speed_is_bounded() {
        let mut camera = Camera::default();
        camera.process_scroll(-1000.0);
        assert_eq!(camera.move_speed, 1.0);
        camera.process_scroll(10_000.0);
        assert_eq!(camera.move_speed, 5000.0);
    }

    #[test]
    fn moving_forward_follows_front() {
        let mut camera = Camera::at(Vec3::ZERO);
        camera.look_at(Vec3::new(10.0, 0.0, 0.0));
        camera.process_keyboard(1.0, 0.0, 0.0, 0.5);
        assert!((camera.position - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
    }
}
