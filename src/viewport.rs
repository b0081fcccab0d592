//! GPU viewport: surface, device, renderer configuration and the fixed
//! studio rig. Everything here is configured once at creation; only the
//! camera uniform changes afterwards, once per rendered frame.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{CameraConfig, CameraResources, CameraRig, CameraUniform, PointerState, Projection,
        camera_layout},
    pipelines::{
        lights::{LightResources, LightRigUniform},
        mesh::mk_studio_pipeline,
        overlay::{mk_overlay_pipeline, overlay_layout},
    },
    scene::{material::material_layout, texture::Texture},
};

/// 4x multisampling for the studio viewport.
pub const MSAA_SAMPLES: u32 = 4;

/// Background #0a0a0a, converted to the linear space `wgpu` clears in.
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.003035,
    g: 0.003035,
    b: 0.003035,
    a: 1.0,
};

pub struct Viewport {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub(crate) msaa_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub lights: LightResources,
    pub(crate) mesh_pipeline: wgpu::RenderPipeline,
    pub(crate) overlay_pipeline: wgpu::RenderPipeline,
    pub(crate) overlay_layout: wgpu::BindGroupLayout,
}

impl Viewport {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance.create_surface(window.clone())?;

        // Prefer the discrete GPU, but degraded capability is not fatal.
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::warn!("no high-performance adapter ({e}), taking whatever is available");
                instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::default(),
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await?
            }
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The studio look depends on standard sRGB gamma on output; tone
        // mapping happens in the shader.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Mount transition: the rig position is fixed here, for good.
        let rig = CameraRig::mount(CameraConfig::default());
        let projection = Projection::studio(config.width, config.height);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&rig, PointerState::default(), &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout = camera_layout(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        let camera = CameraResources {
            rig,
            uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        let lights = LightResources::new(&device, LightRigUniform::studio());

        let depth_texture = Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            MSAA_SAMPLES,
            "depth_texture",
        );
        let msaa_texture = Texture::create_msaa_target(
            &device,
            [config.width, config.height],
            MSAA_SAMPLES,
            config.format,
            "msaa_target",
        );

        let mesh_pipeline = mk_studio_pipeline(
            &device,
            &config,
            MSAA_SAMPLES,
            &material_layout(&device),
            &camera.bind_group_layout,
            &lights.bind_group_layout,
        );
        let overlay_bind_group_layout = overlay_layout(&device);
        let overlay_pipeline =
            mk_overlay_pipeline(&device, &config, MSAA_SAMPLES, &overlay_bind_group_layout);

        Ok(Self {
            window,
            depth_texture,
            msaa_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            lights,
            mesh_pipeline,
            overlay_pipeline,
            overlay_layout: overlay_bind_group_layout,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], MSAA_SAMPLES, "depth_texture");
        self.msaa_texture = Texture::create_msaa_target(
            &self.device,
            [width, height],
            MSAA_SAMPLES,
            self.config.format,
            "msaa_target",
        );
    }

    /// Per-frame camera transition: re-aim at the parallax target for the
    /// current pointer and push the uniform.
    pub(crate) fn update_camera(&mut self, pointer: PointerState) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.rig, pointer, &self.projection);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
    }
}
