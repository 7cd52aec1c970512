//! Asset loading.
//!
//! Every asset the studio shows is loaded by its own tokio task: bytes are
//! read and decoded off the event-loop thread, then exactly one
//! [`AssetEvent`] per asset is pushed through the winit event-loop proxy.
//! GPU upload happens on the main thread when the event is integrated into
//! the scene. A failed load produces [`AssetEvent::Failed`], which the app
//! logs and otherwise ignores: the placeholder materials stay in place and
//! the render loop keeps going.

use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use winit::event_loop::EventLoopProxy;

use crate::{
    bindings::Logo,
    data_structures::{instance::Instance, model::ModelVertex},
};

/// Which model slot a decoded GLB belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Shirt,
    LogoPlane,
}

/// CPU-side mesh: what a GLB primitive decodes to before GPU upload.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub transform: Instance,
}

/// One completion message per asset, delivered as a winit user event.
#[derive(Debug)]
pub enum AssetEvent {
    Texture {
        logo: Logo,
        image: image::DynamicImage,
    },
    Environment {
        image: image::Rgb32FImage,
    },
    Model {
        kind: ModelKind,
        meshes: Vec<MeshData>,
    },
    Failed {
        path: PathBuf,
        error: anyhow::Error,
    },
}

/// Relative paths of everything the studio loads, resolved under `assets/`.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    pub shirt: String,
    pub logo_plane: String,
    pub logo_color: String,
    pub logo_white: String,
    pub environment: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            shirt: "Tshirt.glb".into(),
            logo_plane: "Plane.glb".into(),
            logo_color: "textures/Logo/LogoColor.png".into(),
            logo_white: "textures/Logo/LogoWhite.png".into(),
            environment: "sky.hdr".into(),
        }
    }
}

async fn load_binary(file_name: &str) -> Result<Vec<u8>> {
    let path = Path::new("./").join("assets").join(file_name);
    let data = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(data)
}

async fn load_logo(file_name: &str, logo: Logo) -> Result<AssetEvent> {
    let bytes = load_binary(file_name).await?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding logo texture {file_name}"))?;
    Ok(AssetEvent::Texture { logo, image })
}

async fn load_environment(file_name: &str) -> Result<AssetEvent> {
    let bytes = load_binary(file_name).await?;
    let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Hdr)
        .with_context(|| format!("decoding environment map {file_name}"))?;
    Ok(AssetEvent::Environment {
        image: image.to_rgb32f(),
    })
}

async fn load_model(file_name: &str, kind: ModelKind) -> Result<AssetEvent> {
    let bytes = load_binary(file_name).await?;
    let meshes = extract_meshes(&bytes).with_context(|| format!("parsing model {file_name}"))?;
    Ok(AssetEvent::Model { kind, meshes })
}

/// Decode a GLB and flatten its node hierarchy into per-mesh data.
///
/// Transforms are composed parent-to-child, so every mesh carries its world
/// transform; materials from the file are ignored since the scene replaces
/// them with its own.
pub fn extract_meshes(glb: &[u8]) -> Result<Vec<MeshData>> {
    let reader = BufReader::new(Cursor::new(glb));
    let gltf = gltf::Gltf::from_reader(reader)?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                anyhow::bail!("external buffer {uri:?}: only self-contained .glb files are shipped")
            }
        }
    }

    let mut meshes = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            collect_node(&node, Instance::identity(), &buffer_data, &mut meshes);
        }
    }
    Ok(meshes)
}

fn collect_node(
    node: &gltf::scene::Node,
    parent: Instance,
    buffer_data: &[Vec<u8>],
    out: &mut Vec<MeshData>,
) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let local = Instance {
        position: translation.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

            let mut vertices = Vec::new();
            if let Some(positions) = reader.read_positions() {
                for position in positions {
                    vertices.push(ModelVertex {
                        position,
                        tex_coords: Default::default(),
                        normal: Default::default(),
                    });
                }
            }
            if let Some(normals) = reader.read_normals() {
                for (i, normal) in normals.enumerate() {
                    if let Some(vertex) = vertices.get_mut(i) {
                        vertex.normal = normal;
                    }
                }
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|tc| tc.into_f32()) {
                for (i, uv) in tex_coords.enumerate() {
                    if let Some(vertex) = vertices.get_mut(i) {
                        vertex.tex_coords = uv;
                    }
                }
            }

            let indices = match reader.read_indices() {
                Some(raw) => raw.into_u32().collect(),
                // Unindexed primitives draw their vertices in order.
                None => (0..vertices.len() as u32).collect(),
            };

            if vertices.is_empty() {
                log::warn!(
                    "mesh {:?} has a primitive without positions, skipping",
                    mesh.name()
                );
                continue;
            }

            out.push(MeshData {
                name: mesh.name().unwrap_or("unnamed_mesh").to_string(),
                vertices,
                indices,
                transform: world,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffer_data, out);
    }
}

/// Kick off one load task per asset. Each task reports back through the
/// event-loop proxy; a send failure only means the loop is already gone.
pub fn spawn_loads(
    runtime: &tokio::runtime::Runtime,
    paths: &AssetPaths,
    proxy: EventLoopProxy<AssetEvent>,
) {
    let jobs: Vec<(String, LoadJob)> = vec![
        (paths.logo_color.clone(), LoadJob::Logo(Logo::Color)),
        (paths.logo_white.clone(), LoadJob::Logo(Logo::White)),
        (paths.environment.clone(), LoadJob::Environment),
        (paths.shirt.clone(), LoadJob::Model(ModelKind::Shirt)),
        (paths.logo_plane.clone(), LoadJob::Model(ModelKind::LogoPlane)),
    ];

    for (path, job) in jobs {
        let proxy = proxy.clone();
        runtime.spawn(async move {
            let result = match job {
                LoadJob::Logo(logo) => load_logo(&path, logo).await,
                LoadJob::Environment => load_environment(&path).await,
                LoadJob::Model(kind) => load_model(&path, kind).await,
            };
            let event = result.unwrap_or_else(|error| AssetEvent::Failed {
                path: PathBuf::from(&path),
                error,
            });
            if proxy.send_event(event).is_err() {
                log::debug!("event loop closed before {path} finished loading");
            }
        });
    }
}

#[derive(Clone, Copy)]
enum LoadJob {
    Logo(Logo),
    Environment,
    Model(ModelKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal single-triangle GLB in memory: one node with a
    /// translation, one mesh, positions + u16 indices.
    fn triangle_glb(translation: [f32; 3]) -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let indices: [u16; 3] = [0, 1, 2];

        let mut bin = Vec::new();
        for p in &positions {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let indices_offset = bin.len();
        for i in &indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            concat!(
                "{{\"asset\":{{\"version\":\"2.0\"}},",
                "\"scene\":0,",
                "\"scenes\":[{{\"nodes\":[0]}}],",
                "\"nodes\":[{{\"mesh\":0,\"translation\":[{tx},{ty},{tz}],\"name\":\"tri\"}}],",
                "\"meshes\":[{{\"name\":\"tri\",\"primitives\":[{{\"attributes\":{{\"POSITION\":0}},\"indices\":1}}]}}],",
                "\"accessors\":[",
                "{{\"bufferView\":0,\"componentType\":5126,\"count\":3,\"type\":\"VEC3\",",
                "\"min\":[0.0,0.0,0.0],\"max\":[1.0,1.0,0.0]}},",
                "{{\"bufferView\":1,\"componentType\":5123,\"count\":3,\"type\":\"SCALAR\"}}",
                "],",
                "\"bufferViews\":[",
                "{{\"buffer\":0,\"byteOffset\":0,\"byteLength\":36}},",
                "{{\"buffer\":0,\"byteOffset\":{ioff},\"byteLength\":6}}",
                "],",
                "\"buffers\":[{{\"byteLength\":{blen}}}]}}"
            ),
            tx = translation[0],
            ty = translation[1],
            tz = translation[2],
            ioff = indices_offset,
            blen = bin.len(),
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn extracts_a_triangle_with_its_node_transform() {
        let glb = triangle_glb([1.0, 2.0, -3.0]);
        let meshes = extract_meshes(&glb).unwrap();
        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(
            mesh.transform.position,
            cgmath::Vector3::new(1.0, 2.0, -3.0)
        );
    }

    #[test]
    fn missing_attributes_decode_to_defaults() {
        let glb = triangle_glb([0.0, 0.0, 0.0]);
        let meshes = extract_meshes(&glb).unwrap();
        for vertex in &meshes[0].vertices {
            assert_eq!(vertex.normal, [0.0; 3]);
            assert_eq!(vertex.tex_coords, [0.0; 2]);
        }
    }

    #[test]
    fn garbage_bytes_fail_cleanly() {
        assert!(extract_meshes(b"not a glb at all").is_err());
    }

    #[test]
    fn default_paths_point_into_the_assets_layout() {
        let paths = AssetPaths::default();
        assert!(paths.shirt.ends_with(".glb"));
        assert!(paths.logo_color.starts_with("textures/"));
        assert!(paths.environment.ends_with(".hdr"));
    }
}
