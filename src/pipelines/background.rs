//! Environment background pass.
//!
//! Draws a single fullscreen triangle and looks every pixel up in the
//! equirectangular HDR map by its view direction. Depth writes are off and
//! the depth test always passes, so the pass runs first and the scene draws
//! over it.

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

/// Inverse of the rotation-only view-projection, refreshed every frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BackgroundUniform {
    pub inv_view_proj: [[f32; 4]; 4],
}

/// The uniform buffer plus the bind group against the loaded sky texture.
///
/// `bind_group` stays `None` until the environment map arrives; the frame
/// simply skips the pass while it is.
#[derive(Debug)]
pub struct BackgroundResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: Option<wgpu::BindGroup>,
}

impl BackgroundResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = BackgroundUniform {
            inv_view_proj: cgmath::Matrix4::from_scale(1.0f32).into(),
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("background uniform"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            bind_group: None,
        }
    }

    /// Bind the freshly uploaded sky texture.
    pub fn attach(&mut self, device: &wgpu::Device, sky: &Texture) {
        let layout = background_layout(device);
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&sky.view),
                },
            ],
            label: Some("background bind group"),
        }));
    }

    pub fn write(&self, queue: &wgpu::Queue, inv_view_proj: [[f32; 4]; 4]) {
        let uniform = BackgroundUniform { inv_view_proj };
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

pub fn background_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Rgba32Float is read with textureLoad, so unfilterable is fine
            // and no sampler entry is needed.
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
        ],
        label: Some("background bind group layout"),
    })
}

pub fn mk_background_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("background pipeline layout"),
        bind_group_layouts: &[&background_layout(device)],
        push_constant_ranges: &[],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("background shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("background pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
