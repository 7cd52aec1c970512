//! Camera, projection and the optional orbit controller.
//!
//! The preview camera is fixed just in front of the garment; an orbit
//! controller exists for poking around but ships disabled by default.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, Y: Into<Rad<f32>>>(position: P, yaw: Y, pitch: Y) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }
}

/// Perspective projection; only the aspect changes after creation.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }

    /// Inverse of projection*rotation, for turning clip positions back into
    /// world-space view rays in the background pass.
    pub fn inverse_view_proj(camera: &Camera, projection: &Projection) -> [[f32; 4]; 4] {
        use cgmath::SquareMatrix;
        let rotation = Matrix4::look_to_rh(Point3::new(0.0, 0.0, 0.0), camera.forward(), Vector3::unit_y());
        let view_proj = projection.calc_matrix() * rotation;
        view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse-driven orbit around a target point. Off by default; the app only
/// forwards mouse motion here when the config enables it.
#[derive(Clone, Copy, Debug)]
pub struct OrbitController {
    pub target: Point3<f32>,
    sensitivity: f32,
    pending: (f32, f32),
}

impl OrbitController {
    pub fn new<P: Into<Point3<f32>>>(target: P, sensitivity: f32) -> Self {
        Self {
            target: target.into(),
            sensitivity,
            pending: (0.0, 0.0),
        }
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.pending.0 += dx as f32;
        self.pending.1 += dy as f32;
    }

    /// Apply accumulated mouse motion: rotate the camera around the target
    /// keeping the current distance.
    pub fn update(&mut self, camera: &mut Camera, dt_secs: f32) {
        let (dx, dy) = std::mem::take(&mut self.pending);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        camera.yaw += Rad(dx * self.sensitivity * dt_secs);
        camera.pitch += Rad(-dy * self.sensitivity * dt_secs);
        // Stop short of the poles so the up vector stays meaningful.
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        camera.pitch.0 = camera.pitch.0.clamp(-limit, limit);

        let offset = camera.position - self.target;
        let distance = offset.magnitude();
        camera.position = self.target - camera.forward() * distance;
    }
}

/// GPU-side camera state: the uniform plus its buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    #[test]
    fn resize_tracks_aspect_exactly() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        projection.resize(1024, 768);
        assert_eq!(projection.aspect(), 1024.0 / 768.0);
        projection.resize(333, 777);
        assert_eq!(projection.aspect(), 333.0 / 777.0);
    }

    #[test]
    fn default_camera_faces_negative_z() {
        let camera = Camera::new((0.0, 0.0, 0.7), Deg(-90.0), Deg(0.0));
        let forward = camera.forward();
        assert!(forward.z < -0.999);
        assert!(forward.x.abs() < 1e-6 && forward.y.abs() < 1e-6);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = Camera::new((0.0, 0.0, 0.7), Deg(-90.0), Deg(0.0));
        let mut orbit = OrbitController::new((0.0, 0.0, -1.0), 0.5);
        let before = (camera.position - orbit.target).magnitude();
        orbit.handle_mouse(120.0, -40.0);
        orbit.update(&mut camera, 1.0 / 60.0);
        let after = (camera.position - orbit.target).magnitude();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn orbit_without_input_leaves_the_camera_alone() {
        let mut camera = Camera::new((0.0, 0.0, 0.7), Deg(-90.0), Deg(0.0));
        let reference = camera.position;
        let mut orbit = OrbitController::new((0.0, 0.0, -1.0), 0.5);
        orbit.update(&mut camera, 1.0 / 60.0);
        assert_eq!(camera.position, reference);
    }
}
