use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::SceneGraph;

/// Number of light slots in the lights uniform.
pub const MAX_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 3],
    pub range: f32,
    pub colour: [f32; 3],
    pub intensity: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub lights: [PointLightRaw; MAX_LIGHTS],
    pub count: u32,
    // Uniform structs are sized in multiples of 16 bytes
    _padding: [u32; 3],
}

impl LightsUniform {
    /// Packs the graph's lights in creation order. Lights beyond
    /// [`MAX_LIGHTS`] are dropped.
    pub fn from_graph(graph: &SceneGraph) -> Self {
        let mut uniform = Self::zeroed_uniform();
        let mut total = 0;
        for (transform, light) in graph.lights() {
            if total < MAX_LIGHTS {
                uniform.lights[total] = PointLightRaw {
                    position: transform.position.into(),
                    range: light.range,
                    colour: light.colour,
                    intensity: light.intensity,
                };
            }
            total += 1;
        }
        if total > MAX_LIGHTS {
            log::warn!(
                "scene has {} lights, only the first {} are shaded",
                total,
                MAX_LIGHTS
            );
        }
        uniform.count = total.min(MAX_LIGHTS) as u32;
        uniform
    }

    fn zeroed_uniform() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

pub struct LightResources {
    pub uniform: LightsUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, graph: &SceneGraph) -> Self {
        let uniform = LightsUniform::from_graph(graph);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, graph: &SceneGraph) {
        self.uniform = LightsUniform::from_graph(graph);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Lights Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
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
        label: Some("lights_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("lights_bind_group"),
    })
}
