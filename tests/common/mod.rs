#![cfg(feature = "integration-tests")]

use anyhow::Context as _;
use orbit_cubes::{
    data_structures::texture::Texture,
    pipelines::overlay::StatsOverlay,
    render,
    resources::SceneResources,
    scene::DemoScene,
    stats::FrameStats,
};

/// Width and height of the capture. 256 * 4 bytes keeps rows aligned for the copy.
pub const SIZE: u32 = 256;
pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Renders frames into an offscreen texture instead of a window.
pub struct Headless {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Texture,
    depth: Texture,
    resources: SceneResources,
    overlay: StatsOverlay,
}

impl Headless {
    pub async fn new(scene: &DemoScene) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter available")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .context("Cannot open the graphics device")?;

        let target = Texture::create_render_target(&device, [SIZE, SIZE], FORMAT, "capture");
        let depth = Texture::create_depth_texture(&device, [SIZE, SIZE], "capture_depth");
        let resources = SceneResources::new(&device, FORMAT, scene.graph());
        let overlay = StatsOverlay::new(&device, FORMAT);
        Ok(Self {
            device,
            queue,
            target,
            depth,
            resources,
            overlay,
        })
    }

    /// Draws `scene`, with the stats overlay when `stats` is given, and reads the frame back.
    pub async fn capture(
        &mut self,
        scene: &DemoScene,
        stats: Option<&FrameStats>,
    ) -> anyhow::Result<image::RgbaImage> {
        self.resources.update(&self.device, &self.queue, scene);
        if let Some(stats) = stats {
            self.overlay.update(&self.queue, stats, SIZE, SIZE);
        }

        let bytes_per_row = 4 * SIZE;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Buffer"),
            size: (bytes_per_row * SIZE) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        render::encode_frame(
            &mut encoder,
            &self.target.view,
            &self.depth.view,
            scene.graph().background,
            &self.resources,
            stats.map(|_| &self.overlay),
        );
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(std::time::Duration::from_secs(3)),
            })
            .context("Device poll failed")?;
        rx.receive()
            .await
            .context("Map callback dropped")?
            .context("Cannot map the capture buffer")?;

        let data = buffer_slice.get_mapped_range().to_vec();
        output_buffer.unmap();
        image::RgbaImage::from_raw(SIZE, SIZE, data).context("Capture has the wrong size")
    }
}
