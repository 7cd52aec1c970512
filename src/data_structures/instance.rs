//! Per-mesh world transforms.
//!
//! GLB nodes carry translation/rotation/scale; the loader flattens the node
//! hierarchy by composing transforms on the way down and every mesh ends up
//! with exactly one [`Instance`], uploaded as a one-element instance buffer.

use std::ops::Mul;

use cgmath::One;

use crate::data_structures::model;

/// A decomposed world transform: position, rotation and scale.
#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    pub fn identity() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

/// Parent-child transform composition, used when flattening GLB nodes.
impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Instance {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: cgmath::Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

/// The raw per-instance data as the vertex shader sees it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(dead_code)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // The model matrix occupies four vec4 slots.
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // The normal matrix as three vec3 slots.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rotation3, Zero};

    #[test]
    fn identity_produces_the_identity_matrix() {
        let m = Instance::identity().to_matrix();
        assert_eq!(m, cgmath::Matrix4::from_scale(1.0));
    }

    #[test]
    fn composition_applies_parent_scale_to_child_position() {
        let parent = Instance {
            position: cgmath::Vector3::new(1.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(2.0, 2.0, 2.0),
        };
        let child = Instance::from(cgmath::Vector3::new(0.0, 3.0, 0.0));
        let combined = parent * child;
        assert_eq!(combined.position, cgmath::Vector3::new(1.0, 6.0, 0.0));
        assert_eq!(combined.scale, cgmath::Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn composition_rotates_child_offsets() {
        let parent = Instance {
            position: cgmath::Vector3::zero(),
            rotation: cgmath::Quaternion::from_angle_y(cgmath::Deg(90.0)),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        };
        let child = Instance::from(cgmath::Vector3::new(1.0, 0.0, 0.0));
        let combined = parent * child;
        assert!((combined.position.x).abs() < 1e-6);
        assert!((combined.position.z - -1.0).abs() < 1e-6);
    }
}
