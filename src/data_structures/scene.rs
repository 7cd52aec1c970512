//! The scene registry.
//!
//! A flat collection of everything visible: the lighting rig, the white
//! backdrop quad, the two loadable model slots (shirt and logo plane), the
//! logo texture set and the optional environment background. Slots start
//! empty with placeholder material parameters; async load events fill them
//! in whatever order they arrive, and the render loop re-applies the panel
//! bindings onto the parameters every tick before syncing them to the GPU.

use crate::{
    bindings::{BindingState, Logo},
    data_structures::{
        instance::Instance,
        lights::{LightsResources, LightsUniform},
        model::{Material, MaterialParams, Mesh, Model, ModelVertex, material_layout},
        texture::Texture,
    },
    resources::{AssetEvent, MeshData, ModelKind},
};

/// A loadable model plus the material parameters its meshes follow.
///
/// `template` exists from startup and absorbs binding writes even while
/// `model` is still `None`; when the load lands, each mesh's material is
/// built from the template as it is at that moment.
#[derive(Debug)]
pub struct ModelSlot {
    pub label: &'static str,
    pub template: MaterialParams,
    pub model: Option<Model>,
}

impl ModelSlot {
    pub fn empty(label: &'static str, template: MaterialParams) -> Self {
        Self {
            label,
            template,
            model: None,
        }
    }

    /// Mutate the template and every loaded material the same way.
    pub fn apply(&mut self, f: impl Fn(&mut MaterialParams)) {
        f(&mut self.template);
        if let Some(model) = &mut self.model {
            for material in &mut model.materials {
                f(&mut material.params);
            }
        }
    }
}

/// The loaded logo textures plus the neutral fallback.
///
/// `revision` bumps whenever a texture lands so materials know their bind
/// groups are stale.
#[derive(Debug)]
pub struct LogoTextures {
    color: Option<Texture>,
    white: Option<Texture>,
    fallback: Texture,
    revision: u64,
}

impl LogoTextures {
    fn new(fallback: Texture) -> Self {
        Self {
            color: None,
            white: None,
            fallback,
            revision: 0,
        }
    }

    fn set(&mut self, logo: Logo, texture: Texture) {
        match logo {
            Logo::Color => self.color = Some(texture),
            Logo::White => self.white = Some(texture),
        }
        self.revision += 1;
    }

    /// Resolve a map choice to a texture, falling back to the white pixel
    /// while the real one is still loading.
    pub fn resolve(&self, logo: Option<Logo>) -> &Texture {
        let loaded = match logo {
            Some(Logo::Color) => self.color.as_ref(),
            Some(Logo::White) => self.white.as_ref(),
            None => None,
        };
        loaded.unwrap_or(&self.fallback)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Debug)]
pub struct Scene {
    pub lights: LightsResources,
    pub backdrop: Model,
    pub shirt: ModelSlot,
    pub logo_plane: ModelSlot,
    pub logos: LogoTextures,
    /// Set once by the environment load event, never cleared afterwards.
    pub background: Option<Texture>,
    material_layout: wgpu::BindGroupLayout,
}

impl Scene {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let material_layout = material_layout(device);
        let fallback = Texture::white_pixel(device, queue);
        let lights = LightsResources::new(device, LightsUniform::preview_rig());
        let backdrop = mk_backdrop(device, &fallback, &material_layout);

        let shirt = ModelSlot::empty("shirt", MaterialParams::default());
        let logo_plane = ModelSlot::empty(
            "logo plane",
            MaterialParams {
                logo: Some(Logo::Color),
                transparent: true,
                ..Default::default()
            },
        );

        Self {
            lights,
            backdrop,
            shirt,
            logo_plane,
            logos: LogoTextures::new(fallback),
            background: None,
            material_layout,
        }
    }

    /// Copy the current binding values onto the material parameters.
    ///
    /// Runs every tick; it is a plain overwrite, so repeated application is
    /// idempotent and a load landing between ticks is caught on the next.
    pub fn apply_bindings(&mut self, bindings: &BindingState) {
        let tint = bindings.tint.get().to_linear();
        self.shirt.apply(|params| params.base_color = tint);

        let logo = bindings.logo.selected();
        self.logo_plane.apply(|params| params.logo = Some(logo));
    }

    /// Push material parameters to the GPU and rebuild any bind group whose
    /// texture choice went stale.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let revision = self.logos.revision();
        for model in [&mut self.backdrop]
            .into_iter()
            .chain(self.shirt.model.iter_mut())
            .chain(self.logo_plane.model.iter_mut())
        {
            for material in &mut model.materials {
                material.write_params(queue);
                let stale = material.params.logo != material.bound.0
                    || (material.params.logo.is_some() && material.bound.1 != revision);
                if stale {
                    let texture = self.logos.resolve(material.params.logo);
                    material.rebind(device, texture, revision, &self.material_layout);
                }
            }
        }
    }

    /// Fold one asset completion into the registry.
    pub fn integrate(&mut self, event: AssetEvent, device: &wgpu::Device, queue: &wgpu::Queue) {
        match event {
            AssetEvent::Texture { logo, image } => {
                let label = match logo {
                    Logo::Color => "LogoColor",
                    Logo::White => "LogoWhite",
                };
                match Texture::from_image(device, queue, &image, Some(label)) {
                    Ok(texture) => {
                        log::info!("logo texture {label} loaded");
                        self.logos.set(logo, texture);
                    }
                    Err(error) => log::warn!("uploading {label} failed: {error:#}"),
                }
            }
            AssetEvent::Environment { image } => {
                log::info!(
                    "environment map loaded ({}x{})",
                    image.width(),
                    image.height()
                );
                self.background = Some(Texture::from_equirect(device, queue, &image, Some("sky")));
            }
            AssetEvent::Model { kind, meshes } => {
                let slot = match kind {
                    ModelKind::Shirt => &mut self.shirt,
                    ModelKind::LogoPlane => &mut self.logo_plane,
                };
                log::info!("model for slot {:?} loaded, {} meshes", slot.label, meshes.len());
                slot.model = Some(mk_model(
                    device,
                    &meshes,
                    slot.template,
                    self.logos.resolve(slot.template.logo),
                    self.logos.revision(),
                    &self.material_layout,
                ));
            }
            AssetEvent::Failed { path, error } => {
                log::warn!("loading {} failed: {error:#}", path.display());
            }
        }
    }
}

/// Build a GPU model from decoded meshes, one material per mesh so every
/// mesh follows the slot template independently.
fn mk_model(
    device: &wgpu::Device,
    meshes: &[MeshData],
    template: MaterialParams,
    texture: &Texture,
    revision: u64,
    layout: &wgpu::BindGroupLayout,
) -> Model {
    let mut model = Model::default();
    for (index, data) in meshes.iter().enumerate() {
        model.materials.push(Material::new(
            device,
            &data.name,
            template,
            texture,
            revision,
            layout,
        ));
        model.meshes.push(Mesh::new(
            device,
            &data.name,
            &data.vertices,
            &data.indices,
            &data.transform,
            index,
        ));
    }
    model
}

/// The static white backdrop: a 10x10 quad two units behind the garment,
/// unlit so it reads as a plain studio wall.
fn mk_backdrop(device: &wgpu::Device, texture: &Texture, layout: &wgpu::BindGroupLayout) -> Model {
    let (vertices, indices) = quad_mesh(10.0, 10.0);
    let params = MaterialParams {
        unlit: true,
        ..Default::default()
    };
    let mut model = Model::default();
    model
        .materials
        .push(Material::new(device, "backdrop", params, texture, 0, layout));
    model.meshes.push(Mesh::new(
        device,
        "backdrop",
        &vertices,
        &indices,
        &Instance::from(cgmath::Vector3::new(0.0, 0.0, -2.0)),
        0,
    ));
    model
}

/// A unit quad in the XY plane facing +Z, indexed as two triangles.
fn quad_mesh(width: f32, height: f32) -> (Vec<ModelVertex>, Vec<u32>) {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let vertices = vec![
        ModelVertex {
            position: [-hw, -hh, 0.0],
            tex_coords: [0.0, 1.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [hw, -hh, 0.0],
            tex_coords: [1.0, 1.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [hw, hh, 0.0],
            tex_coords: [1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [-hw, hh, 0.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn empty_slots_absorb_binding_writes() {
        // No assets loaded at all: applying bindings must not panic and the
        // templates must track the bound values.
        let mut shirt = ModelSlot::empty("shirt", MaterialParams::default());
        let tint = Rgb::from_hex("#110d0d").unwrap().to_linear();
        shirt.apply(|p| p.base_color = tint);
        assert_eq!(shirt.template.base_color, tint);
        assert!(shirt.model.is_none());
    }

    #[test]
    fn reapplication_tracks_the_latest_tint() {
        let mut shirt = ModelSlot::empty("shirt", MaterialParams::default());
        let first = Rgb::from_hex("#110d0d").unwrap().to_linear();
        let second = Rgb::from_hex("#3fa9c1").unwrap().to_linear();
        shirt.apply(|p| p.base_color = first);
        shirt.apply(|p| p.base_color = second);
        assert_eq!(shirt.template.base_color, second);
    }

    #[test]
    fn logo_template_follows_the_selection() {
        let mut plane = ModelSlot::empty(
            "logo plane",
            MaterialParams {
                logo: Some(Logo::Color),
                transparent: true,
                ..Default::default()
            },
        );
        plane.apply(|p| p.logo = Some(Logo::White));
        assert_eq!(plane.template.logo, Some(Logo::White));
        assert!(plane.template.transparent);
    }

    #[test]
    fn quad_is_two_ccw_triangles() {
        let (vertices, indices) = quad_mesh(10.0, 10.0);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert!(vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(vertices[0].position, [-5.0, -5.0, 0.0]);
        assert_eq!(vertices[2].position, [5.0, 5.0, 0.0]);
    }
}
