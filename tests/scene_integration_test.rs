//! Scene-level tests that need a real GPU device (no window required).
//! Run with `cargo test --features integration-tests`.

#![cfg(feature = "integration-tests")]

use tee_studio::{
    BindingState, Logo, Rgb,
    data_structures::{model::ModelVertex, scene::Scene},
    resources::{AssetEvent, MeshData, ModelKind},
};

fn gpu() -> (wgpu::Device, wgpu::Queue) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    runtime.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no suitable GPU adapter");
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("test device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .expect("request_device failed")
    })
}

fn triangle_mesh(name: &str) -> MeshData {
    MeshData {
        name: name.to_string(),
        vertices: vec![
            ModelVertex {
                position: [0.0, 0.0, 0.0],
                tex_coords: [0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
            },
            ModelVertex {
                position: [1.0, 0.0, 0.0],
                tex_coords: [1.0, 0.0],
                normal: [0.0, 0.0, 1.0],
            },
            ModelVertex {
                position: [0.0, 1.0, 0.0],
                tex_coords: [0.0, 1.0],
                normal: [0.0, 0.0, 1.0],
            },
        ],
        indices: vec![0, 1, 2],
        transform: Default::default(),
    }
}

#[test]
fn loaded_meshes_pick_up_the_tint_current_at_load_time() {
    let (device, queue) = gpu();
    let mut scene = Scene::new(&device, &queue);
    let mut bindings = BindingState::new(Rgb::from_hex("#110d0d").unwrap());

    // A couple of ticks happen before the model arrives.
    scene.apply_bindings(&bindings);
    scene.sync(&device, &queue);

    bindings.tint.set(Rgb::from_hex("#3fa9c1").unwrap());
    scene.apply_bindings(&bindings);

    scene.integrate(
        AssetEvent::Model {
            kind: ModelKind::Shirt,
            meshes: vec![triangle_mesh("front"), triangle_mesh("back")],
        },
        &device,
        &queue,
    );

    let expected = Rgb::from_hex("#3fa9c1").unwrap().to_linear();
    let model = scene.shirt.model.as_ref().expect("shirt model loaded");
    assert_eq!(model.materials.len(), 2);
    for material in &model.materials {
        assert_eq!(material.params.base_color, expected);
    }
}

#[test]
fn a_later_tint_change_reaches_loaded_materials_on_the_next_tick() {
    let (device, queue) = gpu();
    let mut scene = Scene::new(&device, &queue);
    let mut bindings = BindingState::new(Rgb::from_hex("#110d0d").unwrap());

    scene.integrate(
        AssetEvent::Model {
            kind: ModelKind::Shirt,
            meshes: vec![triangle_mesh("shirt")],
        },
        &device,
        &queue,
    );
    scene.apply_bindings(&bindings);
    scene.sync(&device, &queue);

    bindings.tint.set(Rgb::from_hex("#ff0000").unwrap());
    scene.apply_bindings(&bindings);
    scene.sync(&device, &queue);

    let expected = Rgb::from_hex("#ff0000").unwrap().to_linear();
    let model = scene.shirt.model.as_ref().unwrap();
    assert_eq!(model.materials[0].params.base_color, expected);
}

#[test]
fn switching_the_logo_rebinds_the_plane_material() {
    let (device, queue) = gpu();
    let mut scene = Scene::new(&device, &queue);
    let mut bindings = BindingState::new(Rgb::from_hex("#110d0d").unwrap());

    scene.integrate(
        AssetEvent::Model {
            kind: ModelKind::LogoPlane,
            meshes: vec![triangle_mesh("plane")],
        },
        &device,
        &queue,
    );
    let white = image::DynamicImage::new_rgba8(2, 2);
    scene.integrate(
        AssetEvent::Texture {
            logo: Logo::White,
            image: white,
        },
        &device,
        &queue,
    );

    scene.apply_bindings(&bindings);
    scene.sync(&device, &queue);
    assert_eq!(
        scene.logo_plane.model.as_ref().unwrap().materials[0].params.logo,
        Some(Logo::Color)
    );

    bindings.logo.select(Logo::White).unwrap();
    scene.apply_bindings(&bindings);
    scene.sync(&device, &queue);
    let material = &scene.logo_plane.model.as_ref().unwrap().materials[0];
    assert_eq!(material.params.logo, Some(Logo::White));
    assert_eq!(material.bound.0, Some(Logo::White));
}

#[test]
fn ticks_before_any_load_complete_without_panic() {
    let (device, queue) = gpu();
    let mut scene = Scene::new(&device, &queue);
    let bindings = BindingState::new(Rgb::from_hex("#110d0d").unwrap());

    for _ in 0..3 {
        scene.apply_bindings(&bindings);
        scene.sync(&device, &queue);
    }
    assert!(scene.shirt.model.is_none());
    assert!(scene.logo_plane.model.is_none());
    assert!(scene.background.is_none());
}

#[test]
fn the_environment_background_sticks_once_loaded() {
    let (device, queue) = gpu();
    let mut scene = Scene::new(&device, &queue);
    let bindings = BindingState::new(Rgb::from_hex("#110d0d").unwrap());

    let sky = image::Rgb32FImage::from_pixel(4, 2, image::Rgb([0.5f32, 0.7, 2.0]));
    scene.integrate(AssetEvent::Environment { image: sky }, &device, &queue);
    assert!(scene.background.is_some());

    // Subsequent ticks never clear it.
    for _ in 0..3 {
        scene.apply_bindings(&bindings);
        scene.sync(&device, &queue);
    }
    assert!(scene.background.is_some());
}
