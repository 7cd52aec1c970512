//! Scene lighting: one ambient term plus a fixed pair of point lights.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    // Uniform structs want 16 byte spacing, hence the explicit padding
    _padding: u32,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl PointLightUniform {
    pub fn new(position: [f32; 3], color: [f32; 3], intensity: f32) -> Self {
        Self {
            position,
            _padding: 0,
            color,
            intensity,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub points: [PointLightUniform; 2],
}

impl LightsUniform {
    /// The fixed preview lighting rig: soft white ambient, a key light up
    /// and to the right, and a strong fill straight at the garment.
    pub fn preview_rig() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.5,
            points: [
                PointLightUniform::new([2.0, 3.0, 4.0], [1.0, 1.0, 1.0], 0.5),
                PointLightUniform::new([0.0, 0.0, 2.0], [1.0, 1.0, 1.0], 2.0),
            ],
        }
    }
}

#[derive(Debug)]
pub struct LightsResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightsResources {
    pub fn new(device: &wgpu::Device, uniform: LightsUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lights buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("lights bind group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("lights bind group layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }

    #[test]
    fn preview_rig_matches_the_scene_setup() {
        let rig = LightsUniform::preview_rig();
        assert_eq!(rig.ambient_intensity, 0.5);
        assert_eq!(rig.points[0].position, [2.0, 3.0, 4.0]);
        assert_eq!(rig.points[1].intensity, 2.0);
    }
}
