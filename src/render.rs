//! Frame composition and instanced batching.
//!
//! Mesh nodes sharing both geometry and material are drawn with one instanced
//! draw call. [`collect_batches`] groups them in the order each pair first
//! appears in the scene graph, keeping node order inside a batch.
//!
//! [`encode_frame`] records a whole frame: the lit scene in a first pass that
//! clears colour and depth, then the stats overlay loaded on top of it.

use crate::{
    data_structures::{
        instance::InstanceRaw,
        scene_graph::{GeometryId, MaterialId, SceneGraph},
    },
    pipelines::overlay::StatsOverlay,
    resources::SceneResources,
};

/// One instanced draw: a geometry, a material and a transform per instance.
#[derive(Debug, Clone)]
pub struct Batch {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub instances: Vec<InstanceRaw>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

pub fn collect_batches(graph: &SceneGraph) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for (transform, mesh) in graph.meshes() {
        let raw = transform.to_raw();
        match batches
            .iter_mut()
            .find(|batch| batch.geometry == mesh.geometry && batch.material == mesh.material)
        {
            Some(batch) => batch.instances.push(raw),
            None => batches.push(Batch {
                geometry: mesh.geometry,
                material: mesh.material,
                instances: vec![raw],
            }),
        }
    }
    batches
}

pub fn encode_frame(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    background: wgpu::Color,
    resources: &SceneResources,
    overlay: Option<&StatsOverlay>,
) {
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        resources.draw(&mut render_pass);
    }

    let Some(overlay) = overlay else {
        return;
    };
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Stats Overlay Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
    overlay.draw(&mut render_pass);
}
