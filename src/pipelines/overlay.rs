//! Frame-rate graph in the top-left corner of the output.
//!
//! The panel is built on the CPU as coloured quads in clip space every frame
//! and drawn without depth testing on top of the scene.

use crate::{
    data_structures::model::colour_from_hex,
    stats::{FrameStats, HISTORY_LEN},
};

pub const PANEL_WIDTH: f32 = 80.0;
pub const PANEL_HEIGHT: f32 = 48.0;
const GRAPH_X: f32 = 3.0;
const GRAPH_Y: f32 = 15.0;
const GRAPH_WIDTH: f32 = 74.0;
const GRAPH_HEIGHT: f32 = 30.0;

const FOREGROUND: u32 = 0x00ffff;
const BACKGROUND: u32 = 0x000022;
// foreground seen through the 90% opaque background
const GRAPH_BACKGROUND: u32 = 0x001a33;

/// Panel, graph background and one bar per sample, six vertices each.
pub const MAX_VERTICES: usize = (2 + HISTORY_LEN) * 6;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub colour: [f32; 3],
}

impl OverlayVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Pushes a pixel-space rectangle as two counter-clockwise triangles.
fn push_rect(
    out: &mut Vec<OverlayVertex>,
    (x, y, w, h): (f32, f32, f32, f32),
    colour: [f32; 3],
    (width, height): (f32, f32),
) {
    let left = x / width * 2.0 - 1.0;
    let right = (x + w) / width * 2.0 - 1.0;
    let top = 1.0 - y / height * 2.0;
    let bottom = 1.0 - (y + h) / height * 2.0;
    for position in [
        [left, bottom],
        [right, bottom],
        [right, top],
        [left, bottom],
        [right, top],
        [left, top],
    ] {
        out.push(OverlayVertex { position, colour });
    }
}

/// Builds the overlay for a `width` x `height` pixel target.
///
/// `history` is oldest first; the newest sample sits at the right edge of the
/// graph and bar heights are relative to `max`.
pub fn overlay_vertices(history: &[f32], max: f32, width: u32, height: u32) -> Vec<OverlayVertex> {
    let target = (width.max(1) as f32, height.max(1) as f32);
    let mut out = Vec::with_capacity(MAX_VERTICES);

    push_rect(
        &mut out,
        (0.0, 0.0, PANEL_WIDTH, PANEL_HEIGHT),
        colour_from_hex(BACKGROUND),
        target,
    );
    push_rect(
        &mut out,
        (GRAPH_X, GRAPH_Y, GRAPH_WIDTH, GRAPH_HEIGHT),
        colour_from_hex(GRAPH_BACKGROUND),
        target,
    );

    if max <= 0.0 {
        return out;
    }
    let samples = &history[history.len().saturating_sub(HISTORY_LEN)..];
    let first_x = GRAPH_X + GRAPH_WIDTH - samples.len() as f32;
    for (i, &sample) in samples.iter().enumerate() {
        let bar = (sample / max).clamp(0.0, 1.0) * GRAPH_HEIGHT;
        push_rect(
            &mut out,
            (
                first_x + i as f32,
                GRAPH_Y + GRAPH_HEIGHT - bar,
                1.0,
                bar,
            ),
            colour_from_hex(FOREGROUND),
            target,
        );
    }
    out
}

pub struct StatsOverlay {
    pub vertex_buffer: wgpu::Buffer,
    pub render_pipeline: wgpu::RenderPipeline,
    pub num_vertices: u32,
}

impl StatsOverlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Stats Overlay Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<OverlayVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Stats Overlay Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Stats Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("overlay.wgsl").into()),
        };
        let render_pipeline = crate::pipelines::basic::mk_render_pipeline(
            device,
            &layout,
            format,
            Some(wgpu::BlendState::REPLACE),
            None,
            &[OverlayVertex::desc()],
            shader,
        );
        Self {
            vertex_buffer,
            render_pipeline,
            num_vertices: 0,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, stats: &FrameStats, width: u32, height: u32) {
        let history: Vec<f32> = stats.history().collect();
        let max = stats.max_fps().unwrap_or(0.0);
        let vertices = overlay_vertices(&history, max, width, height);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        self.num_vertices = vertices.len() as u32;
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.num_vertices == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.num_vertices, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    fn signed_area(v: &[OverlayVertex]) -> f32 {
        let [a, b, c] = [v[0].position, v[1].position, v[2].position];
        (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
    }

    #[test]
    fn empty_history_draws_only_the_panel() {
        let vertices = overlay_vertices(&[], 0.0, 800, 600);
        assert_eq!(vertices.len(), 12);
    }

    #[test]
    fn panel_covers_the_top_left_corner() {
        let vertices = overlay_vertices(&[], 0.0, 800, 480);
        let xs: Vec<f32> = vertices[..6].iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = vertices[..6].iter().map(|v| v.position[1]).collect();
        assert_close(xs.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_close(xs.iter().cloned().fold(f32::MIN, f32::max), -0.8);
        assert_close(ys.iter().cloned().fold(f32::MIN, f32::max), 1.0);
        assert_close(ys.iter().cloned().fold(f32::MAX, f32::min), 0.8);
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let vertices = overlay_vertices(&[30.0, 60.0], 60.0, 640, 480);
        for triangle in vertices.chunks(3) {
            assert!(signed_area(triangle) > 0.0);
        }
    }

    #[test]
    fn bars_scale_against_the_max_and_end_at_the_right_edge() {
        let (width, height) = (800u32, 600u32);
        let vertices = overlay_vertices(&[30.0, 60.0], 60.0, width, height);
        assert_eq!(vertices.len(), 4 * 6);

        let to_px = |v: &OverlayVertex| {
            (
                (v.position[0] + 1.0) / 2.0 * width as f32,
                (1.0 - v.position[1]) / 2.0 * height as f32,
            )
        };
        let newest: Vec<_> = vertices[18..].iter().map(to_px).collect();
        let right = newest.iter().map(|p| p.0).fold(f32::MIN, f32::max);
        let top = newest.iter().map(|p| p.1).fold(f32::MAX, f32::min);
        assert!((right - (GRAPH_X + GRAPH_WIDTH)).abs() < 1e-3);
        // full height bar
        assert!((top - GRAPH_Y).abs() < 1e-3);

        let older: Vec<_> = vertices[12..18].iter().map(to_px).collect();
        let top = older.iter().map(|p| p.1).fold(f32::MAX, f32::min);
        assert!((top - (GRAPH_Y + GRAPH_HEIGHT / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn never_exceeds_the_vertex_buffer() {
        let history = vec![60.0; HISTORY_LEN * 2];
        assert_eq!(overlay_vertices(&history, 60.0, 800, 600).len(), MAX_VERTICES);
    }
}
