//! Material records and their GPU mirror.
//!
//! A [`MaterialRecord`] is plain CPU state: the physically-based factors
//! the floor pass reads and rewrites, plus a dirty flag. The GPU side is a
//! uniform buffer per material; [`crate::scene::graph::SceneRoot::sync`]
//! rewrites the buffer for every dirty record so the renderer picks the
//! change up on the next draw.

use wgpu::util::DeviceExt;

use crate::scene::texture::Texture;

/// CPU-side physically-based material state.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialRecord {
    pub name: String,
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    /// Scale on the environment reflection term, `>= 0`.
    pub env_intensity: f32,
    /// Set whenever a factor changed and the uniform buffer is stale.
    pub needs_update: bool,
}

impl Default for MaterialRecord {
    fn default() -> Self {
        // glTF metallic-roughness defaults.
        Self {
            name: "<unnamed>".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 1.0,
            env_intensity: 1.0,
            needs_update: false,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub env_intensity: f32,
    pub _padding: f32,
}

impl From<&MaterialRecord> for MaterialUniform {
    fn from(record: &MaterialRecord) -> Self {
        Self {
            base_color: record.base_color,
            roughness: record.roughness,
            metalness: record.metalness,
            env_intensity: record.env_intensity,
            _padding: 0.0,
        }
    }
}

/// GPU resources backing one material record.
#[derive(Debug)]
pub(crate) struct MaterialGpu {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialGpu {
    pub fn new(
        device: &wgpu::Device,
        record: &MaterialRecord,
        base_color: &Texture,
        fallback_sampler: &wgpu::Sampler,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = MaterialUniform::from(record);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", record.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = base_color.sampler.as_ref().unwrap_or(fallback_sampler);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&base_color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some(&format!("{} Material Bind Group", record.name)),
        });

        Self { buffer, bind_group }
    }
}

/// Layout shared by all studio materials: factors, base color map, sampler.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}
