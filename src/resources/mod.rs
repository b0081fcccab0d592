//! Asset fetching and glTF decoding.
//!
//! The studio asset is a packaged binary glTF identified by a URL/path.
//! [`load_studio_scene`] fetches it, decodes buffers, materials and the
//! node hierarchy, uploads everything to the GPU and returns an attached
//! [`SceneRoot`]. Decode progress is published through a shared
//! [`LoadProgress`] so the render loop can keep drawing the loading
//! overlay while the decode runs off the frame path.

use std::{
    io::{BufReader, Cursor},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    pipelines::mesh::node_transform_layout,
    scene::{
        graph::{DrawItem, NodeGpu, NodeUniform, Primitive, SceneGpu, SceneNode, SceneRoot},
        material::{MaterialGpu, MaterialRecord, material_layout},
        mesh::{GpuMesh, MeshVertex},
        texture::{Texture, create_default_sampler},
    },
};

/// Decode failure taxonomy. Fatal to the mount that requested the load;
/// there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },
    #[error("failed to decode glTF `{url}`")]
    Decode {
        url: String,
        #[source]
        source: gltf::Error,
    },
    #[error("failed to decode a texture payload of `{url}`")]
    Texture {
        url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("glTF `{url}` references buffer `{uri}` that could not be read")]
    MissingBuffer { url: String, uri: String },
}

impl AssetLoadError {
    fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Shared decode progress in percent, `[0, 100]`. Written by the loader,
/// read by the progress overlay every frame.
#[derive(Clone, Debug, Default)]
pub struct LoadProgress(Arc<AtomicU32>);

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f32 {
        self.0.load(Ordering::Relaxed) as f32
    }

    pub fn set(&self, percent: u32) {
        self.0.store(percent.min(100), Ordering::Relaxed);
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = location.origin().unwrap();
    let base = reqwest::Url::parse(&format!("{}/assets/", origin)).unwrap();
    base.join(file_name).unwrap()
}

/// Read an asset file relative to the `assets/` directory (native) or the
/// page origin (web).
pub async fn load_binary(file_name: &str) -> Result<Vec<u8>, AssetLoadError> {
    #[cfg(target_arch = "wasm32")]
    {
        let url = format_url(file_name);
        let response = reqwest::get(url)
            .await
            .map_err(|e| AssetLoadError::fetch(file_name, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssetLoadError::fetch(file_name, e))?;
        Ok(bytes.to_vec())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(path).map_err(|e| AssetLoadError::fetch(file_name, e))
    }
}

/// Fetch, decode and upload the studio scene identified by `url`.
pub async fn load_studio_scene(
    url: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    progress: LoadProgress,
) -> Result<SceneRoot, AssetLoadError> {
    log::info!("loading studio scene from `{url}`");
    let bytes = load_binary(url).await?;
    progress.set(20);

    let gltf = gltf::Gltf::from_reader(BufReader::new(Cursor::new(bytes))).map_err(|source| {
        AssetLoadError::Decode {
            url: url.to_string(),
            source,
        }
    })?;
    progress.set(30);

    // Buffers: the embedded bin chunk plus any external payloads.
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    let buffer_count = gltf.buffers().len().max(1);
    for (idx, buffer) in gltf.buffers().enumerate() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.to_vec()),
                None => {
                    return Err(AssetLoadError::MissingBuffer {
                        url: url.to_string(),
                        uri: "<bin chunk>".to_string(),
                    });
                }
            },
            gltf::buffer::Source::Uri(uri) => {
                let bin =
                    load_binary(uri)
                        .await
                        .map_err(|_| AssetLoadError::MissingBuffer {
                            url: url.to_string(),
                            uri: uri.to_string(),
                        })?;
                buffer_data.push(bin);
            }
        }
        progress.set(30 + (10 * (idx + 1) / buffer_count) as u32);
    }

    // Materials: one record plus one GPU mirror per glTF material.
    let mat_layout = material_layout(device);
    let fallback_sampler = create_default_sampler(device);
    let mut records = Vec::new();
    let mut material_gpu = Vec::new();
    let material_count = gltf.materials().len().max(1);
    for (idx, material) in gltf.materials().enumerate() {
        let pbr = material.pbr_metallic_roughness();
        let record = MaterialRecord {
            name: material.name().unwrap_or("<unnamed>").to_string(),
            base_color: pbr.base_color_factor(),
            roughness: pbr.roughness_factor(),
            metalness: pbr.metallic_factor(),
            env_intensity: 1.0,
            needs_update: false,
        };
        let base_color = match pbr.base_color_texture() {
            Some(info) => {
                decode_texture(&info.texture(), &buffer_data, url, device, queue).await?
            }
            None => Texture::create_default_base_color(device, queue),
        };
        material_gpu.push(MaterialGpu::new(
            device,
            &record,
            &base_color,
            &fallback_sampler,
            &mat_layout,
        ));
        records.push(record);
        progress.set(40 + (40 * (idx + 1) / material_count) as u32);
    }
    let default_material = MaterialGpu::new(
        device,
        &MaterialRecord::default(),
        &Texture::create_default_base_color(device, queue),
        &fallback_sampler,
        &mat_layout,
    );
    progress.set(80);

    // Node hierarchy with uploaded primitives.
    let mut meshes = Vec::new();
    let mut root = SceneNode::group("scene");
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            root.children
                .push(build_node(&node, &buffer_data, device, &mut meshes));
        }
    }
    progress.set(90);

    // Resolve world transforms into a flat draw list; the scene is static,
    // so this happens exactly once.
    let node_layout = node_transform_layout(device);
    let mut nodes = Vec::new();
    let mut draws = Vec::new();
    flatten_draws(
        &root,
        Matrix4::identity(),
        device,
        &node_layout,
        &mut nodes,
        &mut draws,
    );
    progress.set(100);
    log::info!(
        "studio scene ready: {} draw(s), {} material(s)",
        draws.len(),
        records.len()
    );

    let gpu = SceneGpu {
        meshes,
        materials: material_gpu,
        default_material,
        nodes,
        draws,
    };
    Ok(SceneRoot::attached(root, records, gpu))
}

async fn decode_texture(
    texture: &gltf::Texture<'_>,
    buffer_data: &[Vec<u8>],
    url: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<Texture, AssetLoadError> {
    match texture.source().source() {
        gltf::image::Source::View { view, mime_type } => {
            let bytes = view_bytes(
                buffer_data,
                view.buffer().index(),
                view.offset(),
                view.length(),
            )
            .ok_or_else(|| AssetLoadError::MissingBuffer {
                url: url.to_string(),
                uri: format!("<buffer view {}+{}>", view.offset(), view.length()),
            })?;
            Texture::from_bytes(device, queue, bytes, url, mime_type.split('/').last(), true)
                .map_err(|source| AssetLoadError::Texture {
                    url: url.to_string(),
                    source,
                })
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            let bytes = load_binary(uri).await?;
            let format = mime_type.and_then(|mt| mt.split('/').last());
            Texture::from_bytes(device, queue, &bytes, uri, format, true).map_err(|source| {
                AssetLoadError::Texture {
                    url: url.to_string(),
                    source,
                }
            })
        }
    }
}

/// Byte slice a buffer view describes, `None` when the payload is missing
/// or shorter than the view declares (truncated downloads happen).
fn view_bytes(
    buffer_data: &[Vec<u8>],
    buffer: usize,
    offset: usize,
    length: usize,
) -> Option<&[u8]> {
    buffer_data
        .get(buffer)?
        .get(offset..offset.checked_add(length)?)
}

fn build_node(
    node: &gltf::Node<'_>,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    meshes: &mut Vec<GpuMesh>,
) -> SceneNode {
    let name = node.name().unwrap_or("").to_string();
    let mut scene_node = match node.mesh() {
        Some(mesh) => {
            let mut primitives = Vec::new();
            for primitive in mesh.primitives() {
                let reader =
                    primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
                let Some(positions) = reader.read_positions() else {
                    log::warn!(
                        "primitive without positions in mesh {:?}, skipping",
                        mesh.name()
                    );
                    continue;
                };
                let mut vertices: Vec<MeshVertex> = positions
                    .map(|position| MeshVertex {
                        position,
                        normal: [0.0, 0.0, 1.0],
                        tex_coords: [0.0; 2],
                    })
                    .collect();
                if let Some(normals) = reader.read_normals() {
                    for (vertex, normal) in vertices.iter_mut().zip(normals) {
                        vertex.normal = normal;
                    }
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|tc| tc.into_f32()) {
                    for (vertex, uv) in vertices.iter_mut().zip(tex_coords) {
                        vertex.tex_coords = uv;
                    }
                }
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..vertices.len() as u32).collect(),
                };

                let mesh_idx = meshes.len();
                meshes.push(GpuMesh::new(
                    device,
                    mesh.name().unwrap_or("unnamed mesh"),
                    &vertices,
                    &indices,
                ));
                primitives.push(Primitive {
                    mesh: mesh_idx,
                    material: primitive.material().index(),
                });
            }
            SceneNode::mesh(name, primitives)
        }
        None => SceneNode::group(name),
    };
    scene_node.transform = node.transform().matrix().into();
    for child in node.children() {
        scene_node
            .children
            .push(build_node(&child, buffer_data, device, meshes));
    }
    scene_node
}

fn flatten_draws(
    node: &SceneNode,
    parent: Matrix4<f32>,
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    nodes: &mut Vec<NodeGpu>,
    draws: &mut Vec<DrawItem>,
) {
    let world = parent * node.transform;
    if !node.primitives.is_empty() {
        let uniform = NodeUniform {
            model: world.into(),
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Transform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("node_transform_bind_group"),
        });
        let node_idx = nodes.len();
        nodes.push(NodeGpu { buffer, bind_group });
        for primitive in &node.primitives {
            draws.push(DrawItem {
                mesh: primitive.mesh,
                material: primitive.material,
                node: node_idx,
            });
        }
    }
    for child in &node.children {
        flatten_draws(child, world, device, layout, nodes, draws);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_saturates_at_one_hundred() {
        let progress = LoadProgress::new();
        assert_eq!(progress.get(), 0.0);
        progress.set(42);
        assert_eq!(progress.get(), 42.0);
        progress.set(250);
        assert_eq!(progress.get(), 100.0);
    }

    #[test]
    fn progress_is_shared_between_clones() {
        let progress = LoadProgress::new();
        let observer = progress.clone();
        progress.set(73);
        assert_eq!(observer.get(), 73.0);
    }

    #[test]
    fn truncated_buffer_view_is_rejected_not_panicking() {
        let buffers = vec![vec![0u8; 16]];
        assert_eq!(view_bytes(&buffers, 0, 0, 16).map(<[u8]>::len), Some(16));
        assert_eq!(view_bytes(&buffers, 0, 8, 8).map(<[u8]>::len), Some(8));
        // View reaches past the end of a truncated payload.
        assert!(view_bytes(&buffers, 0, 4, 16).is_none());
        // View points at a buffer that was never loaded.
        assert!(view_bytes(&buffers, 1, 0, 1).is_none());
        // Offset + length overflows.
        assert!(view_bytes(&buffers, 0, usize::MAX, 2).is_none());
    }
}
