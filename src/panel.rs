//! The floating debug panel.
//!
//! An egui window with exactly two controls, one per binding: a colour
//! picker for the shirt tint and a combo box for the logo texture. All
//! writes go through the typed descriptors in [`BindingState`]; nothing
//! else happens on change.

use winit::window::Window;

use crate::{bindings::BindingState, color::Rgb, data_structures::texture::Texture};

/// egui context, winit glue and the wgpu paint renderer.
pub struct Panel {
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Everything one frame of panel UI produces, handed from `run` to
/// `prepare`/`paint`.
pub struct PanelFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl Panel {
    pub fn new(
        device: &wgpu::Device,
        window: &Window,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context,
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            Some(winit::window::Theme::Dark),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            Some(Texture::DEPTH_FORMAT),
            1,
            false,
        );
        Self { state, renderer }
    }

    /// Feed a window event to egui. Returns true when egui consumed it and
    /// the rest of the app should ignore it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run one frame of UI against the bindings and tessellate it.
    pub fn run(
        &mut self,
        window: &Window,
        surface_size: (u32, u32),
        bindings: &mut BindingState,
    ) -> PanelFrame {
        let input = self.state.take_egui_input(window);
        self.state.egui_ctx().begin_pass(input);

        egui::Window::new("Controls")
            .default_pos([16.0, 16.0])
            .resizable(false)
            .show(self.state.egui_ctx(), |ui| {
                ui.horizontal(|ui| {
                    let tint = bindings.tint.get();
                    let mut rgb = [tint.r, tint.g, tint.b];
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        bindings.tint.set(Rgb {
                            r: rgb[0],
                            g: rgb[1],
                            b: rgb[2],
                        });
                    }
                    ui.label(bindings.tint.label());
                });

                let names: Vec<String> =
                    bindings.logo.option_names().map(str::to_owned).collect();
                let mut selected = bindings.logo.selected_index();
                egui::ComboBox::from_label(bindings.logo.label().to_owned()).show_index(
                    ui,
                    &mut selected,
                    names.len(),
                    |i| names[i].clone(),
                );
                if selected != bindings.logo.selected_index() {
                    if let Err(error) = bindings.logo.select_index(selected) {
                        log::warn!("panel selection rejected: {error}");
                    }
                }
            });

        let output = self.state.egui_ctx().end_pass();
        self.state
            .handle_platform_output(window, output.platform_output);
        let paint_jobs = self
            .state
            .egui_ctx()
            .tessellate(output.shapes, output.pixels_per_point);

        PanelFrame {
            paint_jobs,
            textures_delta: output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [surface_size.0, surface_size.1],
                pixels_per_point: output.pixels_per_point,
            },
        }
    }

    /// Upload egui textures and vertex data before the render pass opens.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &PanelFrame,
    ) {
        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let _ = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.paint_jobs,
            &frame.screen_descriptor,
        );
    }

    /// Paint the panel into the (already open) main render pass.
    pub fn paint(&mut self, render_pass: wgpu::RenderPass<'_>, frame: &PanelFrame) {
        let mut render_pass = render_pass.forget_lifetime();
        self.renderer
            .render(&mut render_pass, &frame.paint_jobs, &frame.screen_descriptor);
    }

    /// Drop textures egui no longer needs, after the pass closed.
    pub fn cleanup(&mut self, frame: PanelFrame) {
        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
