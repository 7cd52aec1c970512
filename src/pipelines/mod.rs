//! Render pipeline definitions.
//!
//! - `standard` draws the lit garment meshes and the unlit backdrop, in an
//!   opaque and an alpha-blended variant
//! - `background` fills the frame with the equirectangular environment

pub mod background;
pub mod standard;

/// All pipelines the frame uses, created once at context setup.
#[derive(Debug)]
pub struct Pipelines {
    pub standard: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            standard: standard::mk_standard_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            transparent: standard::mk_transparent_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            background: background::mk_background_pipeline(device, config),
        }
    }
}
