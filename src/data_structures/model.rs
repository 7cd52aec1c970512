//! Meshes, materials and model drawing.
//!
//! A [`Model`] is a flat list of meshes plus the materials they index. The
//! CPU side of a material lives in [`MaterialParams`]; the binding state is
//! written into the params every tick, and the GPU uniform is refreshed from
//! them during scene sync. Bind groups reference the sampled texture and are
//! only rebuilt when that texture changes.

use wgpu::util::DeviceExt;

use crate::{
    bindings::Logo,
    data_structures::{instance::Instance, texture::Texture},
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU-side material state, the target of the panel bindings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    /// Base colour in linear space, multiplied with the sampled map.
    pub base_color: [f32; 4],
    /// Which logo texture to sample, if any. `None` samples the neutral
    /// white fallback so the shader never branches on a missing map.
    pub logo: Option<Logo>,
    /// Skip lighting entirely (the white backdrop quad).
    pub unlit: bool,
    /// Draw with alpha blending in the transparent pass.
    pub transparent: bool,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            logo: None,
            unlit: false,
            transparent: false,
        }
    }
}

impl MaterialParams {
    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            unlit: if self.unlit { 1.0 } else { 0.0 },
            _padding: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub unlit: f32,
    _padding: [f32; 3],
}

/// A material's GPU resources plus the params they were built from.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub params: MaterialParams,
    /// The logo the current bind group samples, paired with the logo-set
    /// revision it was resolved against. Diverging from `params.logo` (or a
    /// newer revision) forces a bind-group rebuild during sync.
    pub bound: (Option<Logo>, u64),
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        params: MaterialParams,
        texture: &Texture,
        revision: u64,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} material params")),
            contents: bytemuck::cast_slice(&[params.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(device, name, layout, texture, &buffer);
        Self {
            name: name.to_string(),
            bound: (params.logo, revision),
            params,
            buffer,
            bind_group,
        }
    }

    /// Push the current params into the uniform buffer.
    pub fn write_params(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.params.to_uniform()]));
    }

    /// Rebuild the bind group against a new texture.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        texture: &Texture,
        revision: u64,
        layout: &wgpu::BindGroupLayout,
    ) {
        self.bind_group = mk_bind_group(device, &self.name, layout, texture, &self.buffer);
        self.bound = (self.params.logo, revision);
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    name: &str,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(
                    texture.sampler.as_ref().expect("material textures carry a sampler"),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
        label: Some(&format!("{name} material bind group")),
    })
}

/// The layout every material bind group follows: map, sampler, params.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("material bind group layout"),
    })
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
    /// One world transform per mesh; GLB node hierarchies arrive flattened.
    pub instance_buffer: wgpu::Buffer,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
        transform: &Instance,
        material: usize,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} vertex buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} index buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} instance buffer")),
            contents: bytemuck::cast_slice(&[transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            material,
            instance_buffer,
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

pub trait DrawModel {
    fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
    fn draw_model(
        &mut self,
        model: &Model,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }

    fn draw_model(
        &mut self,
        model: &Model,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        for mesh in &model.meshes {
            let material = &model.materials[mesh.material];
            self.draw_mesh(mesh, material, camera_bind_group, light_bind_group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_a_neutral_placeholder() {
        let params = MaterialParams::default();
        assert_eq!(params.base_color, [1.0; 4]);
        assert_eq!(params.logo, None);
        assert!(!params.unlit && !params.transparent);
    }

    #[test]
    fn uniform_reflects_the_unlit_flag() {
        let mut params = MaterialParams::default();
        assert_eq!(params.to_uniform().unlit, 0.0);
        params.unlit = true;
        assert_eq!(params.to_uniform().unlit, 1.0);
    }

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }

    #[test]
    fn vertex_stride_matches_the_attributes() {
        let desc = ModelVertex::desc();
        assert_eq!(desc.array_stride as usize, std::mem::size_of::<ModelVertex>());
        assert_eq!(desc.attributes.len(), 3);
    }
}
