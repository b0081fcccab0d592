//! Loading feedback while the studio asset is decoding.
//!
//! The reporter owns no state of its own beyond the last shown percentage:
//! it reads the loader's progress value each frame, puts the textual
//! "LOADING {n}%" readout into the window title and draws a centered bar
//! over the dark viewport. Once the asset resolves, the viewer simply
//! stops drawing it.

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::pipelines::overlay::{OverlayVertex, ProgressUniform};

// Centered bar in clip space, roughly a quarter of the viewport wide.
const BAR_VERTICES: [OverlayVertex; 4] = [
    OverlayVertex {
        position: [-0.25, -0.02],
        uv: [0.0, 1.0],
    },
    OverlayVertex {
        position: [0.25, -0.02],
        uv: [1.0, 1.0],
    },
    OverlayVertex {
        position: [0.25, 0.02],
        uv: [1.0, 0.0],
    },
    OverlayVertex {
        position: [-0.25, 0.02],
        uv: [0.0, 0.0],
    },
];
const BAR_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub struct ProgressReporter {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    last_percent: u32,
}

impl ProgressReporter {
    /// The textual readout for a progress percentage in `[0, 100]`.
    pub fn label(percent: f32) -> String {
        format!("LOADING {}%", percent.clamp(0.0, 100.0).round() as u32)
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(&BAR_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(&BAR_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = ProgressUniform {
            progress: 0.0,
            _padding: [0.0; 3],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Progress Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("overlay_bind_group"),
        });

        Self {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            last_percent: u32::MAX,
        }
    }

    /// Refresh the bar fill and, when the rounded percentage changed, the
    /// window title.
    pub fn update(&mut self, queue: &wgpu::Queue, window: &Window, percent: f32) {
        let uniform = ProgressUniform {
            progress: (percent / 100.0).clamp(0.0, 1.0),
            _padding: [0.0; 3],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let rounded = percent.clamp(0.0, 100.0).round() as u32;
        if rounded != self.last_percent {
            window.set_title(&Self::label(percent));
            self.last_percent = rounded;
        }
    }

    /// Record the bar draw. The overlay pipeline is already set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..BAR_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rounds_to_whole_percent() {
        assert_eq!(ProgressReporter::label(0.0), "LOADING 0%");
        assert_eq!(ProgressReporter::label(42.4), "LOADING 42%");
        assert_eq!(ProgressReporter::label(99.5), "LOADING 100%");
        assert_eq!(ProgressReporter::label(100.0), "LOADING 100%");
    }

    #[test]
    fn label_clamps_out_of_range_progress() {
        assert_eq!(ProgressReporter::label(-3.0), "LOADING 0%");
        assert_eq!(ProgressReporter::label(180.0), "LOADING 100%");
    }
}
