//! Fixed studio lighting rig: one ambient term plus three directional
//! lights. Installed once at viewport creation and never changed.
//!
//! Environment-based lighting is intentionally absent; ambient plus
//! directional is the intended studio look, so the only reflection
//! control left is the per-material environment intensity factor.

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLight {
    /// Unit vector pointing from the lit surface towards the light.
    pub direction: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    /// A light sitting at `position`, aimed at the origin.
    pub fn from_position(position: [f32; 3], intensity: f32) -> Self {
        let direction: Vector3<f32> = position.into();
        Self {
            direction: direction.normalize().into(),
            intensity,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRigUniform {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub lights: [DirectionalLight; 3],
}

impl LightRigUniform {
    /// The studio rig: white ambient at intensity 2, a key light from
    /// (5,5,5) at intensity 4 and two fills at intensity 2.
    pub fn studio() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 2.0,
            lights: [
                DirectionalLight::from_position([5.0, 5.0, 5.0], 4.0),
                DirectionalLight::from_position([-5.0, 2.0, 5.0], 2.0),
                DirectionalLight::from_position([0.0, 4.0, -5.0], 2.0),
            ],
        }
    }
}

pub struct LightResources {
    pub uniform: LightRigUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightRigUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Rig Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_rig_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_rig_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_rig_matches_the_fixed_setup() {
        let rig = LightRigUniform::studio();
        assert_eq!(rig.ambient_intensity, 2.0);
        assert_eq!(rig.lights[0].intensity, 4.0);
        assert_eq!(rig.lights[1].intensity, 2.0);
        assert_eq!(rig.lights[2].intensity, 2.0);
    }

    #[test]
    fn light_directions_are_unit_length() {
        let rig = LightRigUniform::studio();
        for light in rig.lights {
            let d: Vector3<f32> = light.direction.into();
            assert!((d.magnitude() - 1.0).abs() < 1e-6);
        }
    }
}
