//! Fixed camera rig with pointer-driven parallax.
//!
//! The camera never moves: its world position is set once when the rig is
//! mounted. What changes every frame is the look-at target, which is the
//! base target of the studio plus a bounded offset derived from the current
//! pointer position. The mapping is a pure function of the pointer and the
//! rig configuration, so repeated frames with the same pointer produce the
//! same view with no drift.

use cgmath::{Deg, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use winit::dpi::PhysicalPosition;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Geometry and sensitivity of the studio camera.
///
/// The defaults are tuned against the packaged studio asset: X=38 on the
/// base target keeps the rotation angle relative to the fixed position,
/// Z=-20 is the depth of the room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    pub fixed_position: Point3<f32>,
    pub base_look_at: Point3<f32>,
    pub horizontal_sensitivity: f32,
    pub vertical_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fixed_position: Point3::new(30.0, 2.0, -10.0),
            base_look_at: Point3::new(38.0, 1.6, -20.0),
            // High sensitivity on the horizontal axis covers a wide angle
            // of the room; the vertical axis stays subtle.
            horizontal_sensitivity: 15.0,
            vertical_sensitivity: 5.0,
        }
    }
}

impl CameraConfig {
    /// Parallax mapping from pointer position to look-at target.
    ///
    /// Recomputed fresh from the constant base target, never accumulated
    /// across frames. Depth is untouched.
    pub fn look_target(&self, pointer: PointerState) -> Point3<f32> {
        Point3::new(
            self.base_look_at.x + pointer.x * self.horizontal_sensitivity,
            self.base_look_at.y + pointer.y * self.vertical_sensitivity,
            self.base_look_at.z,
        )
    }
}

/// Normalized pointer coordinates in `[-1, 1]` on both axes, y pointing up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// Convert a window-space cursor position to normalized coordinates.
    ///
    /// Positions outside the surface (reported during drags) are clamped to
    /// the `[-1, 1]` range.
    pub fn from_window(position: PhysicalPosition<f64>, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        let x = (position.x / width as f64) * 2.0 - 1.0;
        let y = -((position.y / height as f64) * 2.0 - 1.0);
        Self {
            x: x.clamp(-1.0, 1.0) as f32,
            y: y.clamp(-1.0, 1.0) as f32,
        }
    }
}

/// The mounted camera: a configuration plus the world position fixed at
/// mount time. The position is never mutated afterwards.
#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    config: CameraConfig,
    position: Point3<f32>,
}

impl CameraRig {
    pub fn mount(config: CameraConfig) -> Self {
        Self {
            position: config.fixed_position,
            config,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Per-frame transition: aim at the parallax target for this pointer.
    pub fn view_matrix(&self, pointer: PointerState) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            self.position,
            self.config.look_target(pointer),
            Vector3::unit_y(),
        )
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Field of view of the studio viewport: 70 degrees, near 0.1, far 1000.
    pub fn studio(width: u32, height: u32) -> Self {
        Self::new(width, height, Deg(70.0), 0.1, 1000.0)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, rig: &CameraRig, pointer: PointerState, projection: &Projection) {
        self.view_position = rig.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * rig.view_matrix(pointer)).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU-side camera state: the rig plus its uniform buffer and bind group.
pub struct CameraResources {
    pub rig: CameraRig,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

pub fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("camera_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_pointer_aims_at_base_target() {
        let config = CameraConfig::default();
        let target = config.look_target(PointerState { x: 0.0, y: 0.0 });
        assert_eq!(target, Point3::new(38.0, 1.6, -20.0));
    }

    #[test]
    fn corner_pointer_applies_full_offsets() {
        let config = CameraConfig::default();
        let target = config.look_target(PointerState { x: 1.0, y: -1.0 });
        assert_eq!(target, Point3::new(53.0, -3.4, -20.0));
    }

    #[test]
    fn mapping_is_stateless() {
        let config = CameraConfig::default();
        let pointer = PointerState { x: 0.37, y: -0.81 };
        let first = config.look_target(pointer);
        // A detour over other pointer positions must not leak into later frames.
        config.look_target(PointerState { x: -1.0, y: 1.0 });
        let second = config.look_target(pointer);
        assert_eq!(first, second);
    }

    #[test]
    fn offsets_scale_with_sensitivity() {
        let config = CameraConfig {
            horizontal_sensitivity: 2.0,
            vertical_sensitivity: 1.0,
            ..CameraConfig::default()
        };
        let target = config.look_target(PointerState { x: 0.5, y: 0.5 });
        assert_eq!(target.x, 39.0);
        assert_eq!(target.y, 2.1);
        assert_eq!(target.z, -20.0);
    }

    #[test]
    fn position_is_fixed_across_frames() {
        let rig = CameraRig::mount(CameraConfig::default());
        assert_eq!(rig.position(), Point3::new(30.0, 2.0, -10.0));
        for i in 0..100 {
            let pointer = PointerState {
                x: (i as f32 / 50.0) - 1.0,
                y: 1.0 - (i as f32 / 50.0),
            };
            rig.view_matrix(pointer);
            assert_eq!(rig.position(), Point3::new(30.0, 2.0, -10.0));
        }
    }

    #[test]
    fn window_coordinates_normalize_to_unit_range() {
        // Center of a 800x600 surface.
        let center = PointerState::from_window(PhysicalPosition::new(400.0, 300.0), 800, 600);
        assert_eq!(center, PointerState { x: 0.0, y: 0.0 });
        // Top-right corner maps to (1, 1); winit y grows downward.
        let corner = PointerState::from_window(PhysicalPosition::new(800.0, 0.0), 800, 600);
        assert_eq!(corner, PointerState { x: 1.0, y: 1.0 });
        // Outside the surface clamps instead of overshooting.
        let outside = PointerState::from_window(PhysicalPosition::new(-50.0, 900.0), 800, 600);
        assert_eq!(outside, PointerState { x: -1.0, y: -1.0 });
    }

    #[test]
    fn degenerate_surface_yields_neutral_pointer() {
        let pointer = PointerState::from_window(PhysicalPosition::new(10.0, 10.0), 0, 0);
        assert_eq!(pointer, PointerState::default());
    }
}
