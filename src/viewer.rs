//! Viewer lifecycle: window, event loop and the asset load state machine.
//!
//! The render loop is single-threaded and cooperative: one camera update
//! per rendered frame, driven by redraw events. The asset decode is the
//! only asynchronous part; it runs off the frame path and delivers its
//! result through a winit user event, so while it is pending every frame
//! shows the progress overlay instead of the scene.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and mounts the [`Viewport`]
//! 2. the decode task is spawned; [`LoadState`] starts `Pending`
//! 3. every `RedrawRequested` re-aims the camera and draws either the
//!    overlay or the scene
//! 4. `SceneDecoded` runs the floor pass once, then flips to `Ready` (or
//!    `Failed`, which leaves the dark background up and logs the error)

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::{
    camera::PointerState,
    overlay::ProgressReporter,
    pass,
    resources::{AssetLoadError, LoadProgress, load_studio_scene},
    scene::graph::SceneRoot,
    viewport::{BACKGROUND, Viewport},
};

const WINDOW_TITLE: &str = "studio viewer";

/// Recognized viewer options.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Asset to load, relative to the `assets/` directory (native) or the
    /// page origin (web).
    pub url: String,
    /// Initial viewport width in logical pixels; `None` leaves sizing to
    /// the platform (the "fill" case).
    pub width: Option<u32>,
    /// Initial viewport height in logical pixels.
    pub height: Option<u32>,
}

impl ViewerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }
}

/// Where the one asset load of this mount currently stands.
pub enum LoadState {
    Pending(LoadProgress),
    Ready(SceneRoot),
    Failed(AssetLoadError),
}

pub(crate) enum ViewerEvent {
    /// The viewport finished its async setup (web path).
    #[allow(dead_code)]
    Mounted(Viewport),
    SceneDecoded(Result<SceneRoot, AssetLoadError>),
}

pub struct Viewer {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    viewport: Option<Viewport>,
    reporter: Option<ProgressReporter>,
    load: LoadState,
    pointer: PointerState,
    is_surface_configured: bool,
}

impl Viewer {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy: event_loop.create_proxy(),
            config,
            viewport: None,
            reporter: None,
            load: LoadState::Pending(LoadProgress::new()),
            pointer: PointerState::default(),
            is_surface_configured: false,
        }
    }

    fn mounted(&mut self, mut viewport: Viewport) {
        let size = viewport.window.inner_size();
        if size.width > 0 && size.height > 0 {
            viewport.resize(size.width, size.height);
            self.is_surface_configured = true;
        }
        self.reporter = Some(ProgressReporter::new(
            &viewport.device,
            &viewport.overlay_layout,
        ));
        self.begin_load(&viewport);
        viewport.window.request_redraw();
        self.viewport = Some(viewport);
    }

    /// Kick off the one decode of this mount. The render loop keeps
    /// ticking; the result arrives as a [`ViewerEvent::SceneDecoded`].
    fn begin_load(&mut self, viewport: &Viewport) {
        let progress = LoadProgress::new();
        self.load = LoadState::Pending(progress.clone());

        let url = self.config.url.clone();
        let device = viewport.device.clone();
        let queue = viewport.queue.clone();
        let proxy = self.proxy.clone();
        let task = async move {
            let started = Instant::now();
            let result = load_studio_scene(&url, &device, &queue, progress).await;
            if result.is_ok() {
                log::info!("decoded `{url}` in {:?}", started.elapsed());
            }
            // If the viewer was torn down while the decode was in flight
            // the send fails and the resolved scene is simply dropped.
            if proxy.send_event(ViewerEvent::SceneDecoded(result)).is_err() {
                log::warn!("viewer closed before `{url}` finished decoding");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        let Some(viewport) = &mut self.viewport else {
            return Ok(());
        };

        // Keep the loop hot; the camera re-aims every frame.
        viewport.window.request_redraw();
        if !self.is_surface_configured {
            return Ok(());
        }

        viewport.update_camera(self.pointer);
        match (&mut self.load, &mut self.reporter) {
            (LoadState::Ready(scene), _) => scene.sync(&viewport.queue),
            (LoadState::Pending(progress), Some(reporter)) => {
                reporter.update(&viewport.queue, &viewport.window, progress.get());
            }
            _ => (),
        }

        let output = match viewport.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            err => return Err(err),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = viewport
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Studio Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &viewport.msaa_texture.view,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &viewport.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            match &self.load {
                LoadState::Ready(scene) => {
                    render_pass.set_pipeline(&viewport.mesh_pipeline);
                    render_pass.set_bind_group(1, &viewport.camera.bind_group, &[]);
                    render_pass.set_bind_group(2, &viewport.lights.bind_group, &[]);
                    scene.draw(&mut render_pass);
                }
                LoadState::Pending(_) => {
                    if let Some(reporter) = &self.reporter {
                        render_pass.set_pipeline(&viewport.overlay_pipeline);
                        reporter.draw(&mut render_pass);
                    }
                }
                // Failure was logged when it arrived; the dark background
                // stays up.
                LoadState::Failed(_) => (),
            }
        }

        viewport.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl ApplicationHandler<ViewerEvent> for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);

        if self.config.width.is_some() || self.config.height.is_some() {
            // A missing dimension falls back to a 16:9 default.
            let width = self.config.width.unwrap_or(1280);
            let height = self.config.height.unwrap_or(720);
            window_attributes =
                window_attributes.with_inner_size(winit::dpi::LogicalSize::new(width, height));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let viewport = match self.async_runtime.block_on(Viewport::new(window)) {
                Ok(viewport) => viewport,
                Err(e) => panic!("viewer initialization failed, cannot create the viewport: {e}"),
            };
            self.mounted(viewport);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let viewport = Viewport::new(window)
                    .await
                    .expect("viewer initialization failed, cannot create the viewport");
                assert!(proxy.send_event(ViewerEvent::Mounted(viewport)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Mounted(viewport) => self.mounted(viewport),
            ViewerEvent::SceneDecoded(Ok(mut scene)) => {
                // The floor pass runs exactly once per decoded root,
                // before the first frame that displays it.
                pass::apply(&mut scene);
                if let Some(viewport) = &self.viewport {
                    scene.sync(&viewport.queue);
                    viewport.window.set_title(WINDOW_TITLE);
                }
                self.load = LoadState::Ready(scene);
            }
            ViewerEvent::SceneDecoded(Err(e)) => {
                log::error!("failed to materialize the studio scene: {e}");
                self.load = LoadState::Failed(e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(viewport) = &mut self.viewport {
                    viewport.resize(size.width, size.height);
                    self.is_surface_configured = size.width > 0 && size.height > 0;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(viewport) = &self.viewport {
                    self.pointer = PointerState::from_window(
                        position,
                        viewport.config.width,
                        viewport.config.height,
                    );
                }
            }
            WindowEvent::RedrawRequested => match self.render() {
                Ok(()) => (),
                // Reconfigure the surface if it's lost or outdated.
                Err(
                    wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated,
                ) => {
                    if let Some(viewport) = &mut self.viewport {
                        let size = viewport.window.inner_size();
                        viewport.resize(size.width, size.height);
                    }
                }
                Err(e) => log::error!("unable to render: {e:?}"),
            },
            _ => (),
        }
    }
}

/// Open the studio viewport and run until the window closes.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut viewer = Viewer::new(&event_loop, config);
    event_loop.run_app(&mut viewer)?;

    Ok(())
}
