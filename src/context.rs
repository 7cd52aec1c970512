//! The application context: window, GPU handles and shared render state.
//!
//! One struct owns what the frame needs, passed by reference into the
//! render loop and the resize path.

use std::sync::Arc;

use anyhow::Result;
use cgmath::Deg;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, CameraUniform, Projection},
    data_structures::{lights, texture::Texture},
    pipelines::{Pipelines, background::BackgroundResources},
    viewport::Viewport,
};

#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    pub depth_texture: Texture,
    pub camera: CameraResources,
    pub background: BackgroundResources,
    pub pipelines: Pipelines,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height, window.scale_factor());

        log::debug!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("no suitable GPU adapter");

        log::debug!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tee studio device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        log::debug!("surface configuration");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colour and rely on an sRGB surface for
        // the final transfer.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let (surface_width, surface_height) = viewport.surface_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: surface_width,
            height: surface_height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // The preview camera sits just in front of the garment, looking
        // down negative z.
        let camera = Camera::new((0.0, 0.0, 0.7), Deg(-90.0), Deg(0.0));
        let (window_width, window_height) = viewport.physical_size();
        let projection = Projection::new(window_width, window_height, Deg(75.0), 0.1, 100.0);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera bind group layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera bind group"),
        });

        let pipelines = Pipelines::new(
            &device,
            &config,
            &camera_bind_group_layout,
            &lights::mk_bind_group_layout(&device),
        );

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth texture");
        let background = BackgroundResources::new(&device);

        let camera = CameraResources {
            camera,
            projection,
            uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            viewport,
            depth_texture,
            camera,
            background,
            pipelines,
        })
    }

    /// Reconfigure the surface and dependent state for the current
    /// viewport. Safe to call repeatedly.
    pub fn reconfigure(&mut self) {
        let (width, height) = self.viewport.surface_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth texture");
        // The projection tracks the window itself, not the (possibly
        // clamped) render resolution; the two only differ in scale.
        let (window_width, window_height) = self.viewport.physical_size();
        self.camera.projection.resize(window_width, window_height);
    }

    /// Push the current camera state to the GPU, including the inverse
    /// matrix the background pass uses.
    pub fn write_camera(&mut self) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.camera, &self.camera.projection);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
        let inverse = CameraUniform::inverse_view_proj(&self.camera.camera, &self.camera.projection);
        self.background.write(&self.queue, inverse);
    }
}
