//! Application event loop and render loop.
//!
//! The app owns the winit event loop, the GPU context, the scene registry
//! and the debug panel. Asset loads run on a tokio runtime and report back
//! as user events; the render loop re-applies the panel bindings onto the
//! materials every frame and keeps requesting redraws until the window is
//! closed.
//!
//! # Frame lifecycle
//!
//! 1. Window/device events are distributed (panel first, then camera)
//! 2. Pending asset events are integrated into the scene as they arrive
//! 3. On redraw: bindings -> material params -> GPU sync -> one frame
//!    (background, opaque, transparent, panel) -> present -> request next

use std::{iter, sync::Arc};

use anyhow::Result;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    bindings::BindingState,
    camera::OrbitController,
    color::Rgb,
    context::Context,
    data_structures::{model::DrawModel, scene::Scene},
    panel::Panel,
    resources::{self, AssetEvent, AssetPaths},
};

/// Everything the demo can be configured with.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    pub title: String,
    pub window_size: (u32, u32),
    pub assets: AssetPaths,
    pub default_tint: Rgb,
    /// Orbit camera; off by default, the preview uses a fixed view.
    pub orbit_controls: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "Tee Studio".into(),
            window_size: (1280, 720),
            assets: AssetPaths::default(),
            default_tint: Rgb::from_hex("#110d0d").expect("default tint is well formed"),
            orbit_controls: false,
        }
    }
}

/// Live state once the window and GPU exist.
struct AppState {
    ctx: Context,
    scene: Scene,
    bindings: BindingState,
    panel: Panel,
    orbit: OrbitController,
    orbit_enabled: bool,
    mouse_pressed: bool,
    is_surface_configured: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.viewport.resize(width, height);
            self.ctx.reconfigure();
            self.is_surface_configured = true;
        }
    }

    fn set_scale_factor(&mut self, scale_factor: f64) {
        self.ctx.viewport.set_scale_factor(scale_factor);
        self.ctx.reconfigure();
    }

    fn render(&mut self, dt: instant::Duration) -> Result<(), wgpu::SurfaceError> {
        // The next tick is requested before this one draws, keeping the
        // loop continuous.
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        if self.orbit_enabled {
            self.orbit
                .update(&mut self.ctx.camera.camera, dt.as_secs_f32());
        }
        self.ctx.write_camera();

        // Re-derive material state from the bindings, every tick.
        self.scene.apply_bindings(&self.bindings);
        self.scene.sync(&self.ctx.device, &self.ctx.queue);

        let surface_size = (self.ctx.config.width, self.ctx.config.height);
        let frame = self
            .panel
            .run(&self.ctx.window, surface_size, &mut self.bindings);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });
        self.panel
            .prepare(&self.ctx.device, &self.ctx.queue, &mut encoder, &frame);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Environment behind everything, once it is loaded.
            if let Some(bind_group) = &self.ctx.background.bind_group {
                render_pass.set_pipeline(&self.ctx.pipelines.background);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_pipeline(&self.ctx.pipelines.standard);
            render_pass.draw_model(
                &self.scene.backdrop,
                &self.ctx.camera.bind_group,
                &self.scene.lights.bind_group,
            );
            if let Some(model) = &self.scene.shirt.model {
                render_pass.draw_model(
                    model,
                    &self.ctx.camera.bind_group,
                    &self.scene.lights.bind_group,
                );
            }

            if self.scene.logo_plane.template.transparent {
                render_pass.set_pipeline(&self.ctx.pipelines.transparent);
            }
            if let Some(model) = &self.scene.logo_plane.model {
                render_pass.draw_model(
                    model,
                    &self.ctx.camera.bind_group,
                    &self.scene.lights.bind_group,
                );
            }

            // The panel draws last, on top; this consumes the pass.
            self.panel.paint(render_pass, &frame);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.panel.cleanup(frame);

        Ok(())
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AssetEvent>,
    config: StudioConfig,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AssetEvent>, config: StudioConfig) -> Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            last_time: Instant::now(),
        })
    }
}

impl ApplicationHandler<AssetEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_size.0,
                self.config.window_size.1,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("window creation failed"),
        );

        let ctx = match self.async_runtime.block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            Err(e) => panic!("app initialization failed, cannot create the main context: {e:#}"),
        };

        let scene = Scene::new(&ctx.device, &ctx.queue);
        let panel = Panel::new(&ctx.device, &ctx.window, ctx.config.format);
        let bindings = BindingState::new(self.config.default_tint);
        // The orbit target matches where the garment hangs, a little behind
        // the camera's focus plane.
        let orbit = OrbitController::new((0.0, 0.0, -1.0), 0.4);

        resources::spawn_loads(&self.async_runtime, &self.config.assets, self.proxy.clone());

        let state = AppState {
            ctx,
            scene,
            bindings,
            panel,
            orbit,
            orbit_enabled: self.config.orbit_controls,
            mouse_pressed: false,
            is_surface_configured: false,
        };
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AssetEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        state
            .scene
            .integrate(event, &state.ctx.device, &state.ctx.queue);
        // A freshly arrived environment map still needs its bind group.
        if state.ctx.background.bind_group.is_none() {
            if let Some(sky) = &state.scene.background {
                state.ctx.background.attach(&state.ctx.device, sky);
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.orbit_enabled && state.mouse_pressed {
                state.orbit.handle_mouse(dx, dy);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        // The panel sees every event first; events it consumes (clicks on
        // the controls, typing) stop here.
        let consumed = state.panel.on_window_event(&state.ctx.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.set_scale_factor(scale_factor)
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } if !consumed => {
                state.mouse_pressed = button_state == ElementState::Pressed;
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(dt) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("unable to render: {e}");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Run the studio until its window is closed.
///
/// Closing the window exits the event loop; dropping the app afterwards
/// drops the tokio runtime, which cancels any load still in flight.
pub fn run(config: StudioConfig) -> Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("warning: could not initialize logger: {e}");
    }

    let event_loop: EventLoop<AssetEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
