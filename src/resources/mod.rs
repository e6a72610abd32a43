//! GPU resources backing a scene.
//!
//! [`SceneResources`] uploads every registered geometry and material once and
//! keeps one instance buffer per draw batch. Per frame only the camera, the
//! lights and the instance transforms are written.

use std::collections::HashMap;

use crate::{
    camera::CameraResources,
    data_structures::{
        instance::InstanceRaw,
        model::{self, DrawModel, GpuMaterial},
        scene_graph::{GeometryId, MaterialId, SceneGraph},
    },
    pipelines::{basic, light::LightResources},
    render::{self, Batch},
    scene::DemoScene,
};

struct InstanceBuffer {
    geometry: GeometryId,
    material: MaterialId,
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, batch: &Batch) -> Self {
        let capacity = batch.len().max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            geometry: batch.geometry,
            material: batch.material,
            buffer,
            capacity,
            len: 0,
        }
    }
}

pub struct SceneResources {
    meshes: HashMap<GeometryId, model::Mesh>,
    materials: HashMap<MaterialId, GpuMaterial>,
    pub camera: CameraResources,
    pub lights: LightResources,
    instance_buffers: Vec<InstanceBuffer>,
    render_pipeline: wgpu::RenderPipeline,
}

impl SceneResources {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, graph: &SceneGraph) -> Self {
        let registry = graph.registry();
        let meshes = registry
            .geometries()
            .map(|(id, geometry)| {
                let name = format!("{:?}", id);
                (id, model::Mesh::from_box(device, &name, geometry))
            })
            .collect();

        let material_layout = model::material_bind_group_layout(device);
        let materials = registry
            .materials()
            .map(|(id, material)| (id, GpuMaterial::new(device, &material_layout, material)))
            .collect();

        let camera = CameraResources::new(device);
        let lights = LightResources::new(device, graph);
        let render_pipeline = basic::mk_basic_pipeline(
            device,
            format,
            &camera.bind_group_layout,
            &lights.bind_group_layout,
            &material_layout,
        );

        Self {
            meshes,
            materials,
            camera,
            lights,
            instance_buffers: Vec::new(),
            render_pipeline,
        }
    }

    /// Uploads the scene's current camera, lights and instance transforms.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &DemoScene) {
        if let Some((transform, projection)) = scene.camera() {
            self.camera.write(queue, transform, projection);
        }
        self.lights.write(queue, scene.graph());

        let batches = render::collect_batches(scene.graph());
        self.instance_buffers.truncate(batches.len());
        for (i, batch) in batches.iter().enumerate() {
            let reusable = self.instance_buffers.get(i).is_some_and(|slot| {
                slot.capacity >= batch.len()
                    && slot.geometry == batch.geometry
                    && slot.material == batch.material
            });
            if !reusable {
                let slot = InstanceBuffer::new(device, batch);
                if i < self.instance_buffers.len() {
                    self.instance_buffers[i] = slot;
                } else {
                    self.instance_buffers.push(slot);
                }
            }
            let slot = &mut self.instance_buffers[i];
            queue.write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&batch.instances));
            slot.len = batch.len() as u32;
        }
    }

    /// Records one instanced draw per batch.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.render_pipeline);
        for slot in &self.instance_buffers {
            let (Some(mesh), Some(material)) = (
                self.meshes.get(&slot.geometry),
                self.materials.get(&slot.material),
            ) else {
                log::warn!(
                    "skipping batch with unregistered {:?} or {:?}",
                    slot.geometry,
                    slot.material
                );
                continue;
            };
            if slot.len == 0 {
                continue;
            }
            render_pass.set_vertex_buffer(1, slot.buffer.slice(..));
            render_pass.draw_mesh_instanced(
                mesh,
                material,
                0..slot.len,
                &self.camera.bind_group,
                &self.lights.bind_group,
            );
        }
    }
}
