//! The demo scene: a pulsing master cube orbited by six cubes under five point lights.
//!
//! [`DemoScene::new`] builds the whole topology once. Afterwards only
//! transforms change (see [`crate::animation`]); nodes are never added or
//! removed and the orbiting cubes keep their creation order.

use std::f32::consts::PI;

use cgmath::{Deg, Point3, Vector3};

use crate::{
    camera::{self, Projection},
    data_structures::{
        instance::Instance,
        model::{BoxGeometry, Material},
        scene_graph::{Mesh, NodeId, NodeKind, PointLight, SceneGraph, SceneNode},
    },
};

/// Tunables of the demo. `Default` holds the values the scene is designed around.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub background: wgpu::Color,
    pub orbit_radius: f32,
    /// Elapsed seconds are divided by this before they shift the orbit angle.
    pub orbit_time_scale: f32,
    /// Radians added to the orbiting cubes' X/Y rotation on every frame.
    pub spin_per_frame: [f64; 2],
    /// Sideways camera step on every frame.
    pub camera_drift_per_frame: f32,
    pub camera_position: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub light_range: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: wgpu::Color::BLACK,
            orbit_radius: 5.0,
            orbit_time_scale: 5.0,
            spin_per_frame: [0.01, 0.02],
            camera_drift_per_frame: 0.05,
            camera_position: Vector3::new(0.0, 0.0, 10.0),
            fovy: Deg(75.0),
            znear: 0.1,
            zfar: 1000.0,
            light_range: 75.0,
        }
    }
}

/// Number of orbiting cubes. Their start angles are spaced for exactly six.
pub const ORBIT_COUNT: usize = 6;

/// Name, position, colour and intensity of every light.
const LIGHTS: [(&str, [f32; 3], u32, f32); 5] = [
    ("ambient light", [0.0, 0.0, 0.0], 0xffffff, 2.0),
    ("red light", [-25.0, 50.0, 25.0], 0xffcccc, 1.0),
    ("green light", [25.0, 50.0, 25.0], 0xccffcc, 1.0),
    ("blue light", [0.0, 50.0, -25.0], 0xccccff, 1.0),
    ("white light", [0.0, -50.0, 0.0], 0xffffff, 0.5),
];

#[derive(Debug)]
pub struct DemoScene {
    pub settings: SceneSettings,
    graph: SceneGraph,
    camera: NodeId,
    master_cube: NodeId,
    cubes: Vec<NodeId>,
    /// Unwrapped X/Y spin of each orbiting cube, in radians.
    spins: Vec<[f64; 2]>,
}

impl DemoScene {
    pub fn new(settings: SceneSettings, width: u32, height: u32) -> Self {
        let mut graph = SceneGraph::new(settings.background);

        let mut camera_transform = Instance::from(settings.camera_position);
        camera::look_at(&mut camera_transform, Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(width, height, settings.fovy, settings.znear, settings.zfar);
        let camera = graph.add(SceneNode::new(
            "camera",
            camera_transform,
            NodeKind::Camera(projection),
        ));

        for (name, position, colour, intensity) in LIGHTS {
            graph.add(SceneNode::new(
                name,
                Vector3::from(position).into(),
                NodeKind::Light(PointLight::new(colour, intensity, settings.light_range)),
            ));
        }

        let registry = graph.registry_mut();
        let emissive = registry.add_material(
            Material::standard("emissive", 0xffffff, 5.0).with_emissive(0xffffff, 1.0),
        );
        let standard = registry.add_material(Material::standard("standard", 0xcccccc, 1.0));
        let master_geometry = registry.add_geometry(BoxGeometry::new(3.0, 3.0, 3.0));
        let cube_geometry = registry.add_geometry(BoxGeometry::new(1.0, 1.0, 1.0));

        let master_cube = graph.add(SceneNode::new(
            "master cube",
            Instance {
                rotation: Vector3::new(PI / 4.0, PI / 4.0, 0.0),
                ..Default::default()
            },
            NodeKind::Mesh(Mesh {
                geometry: master_geometry,
                material: emissive,
            }),
        ));

        // The cubes are labelled "1".."6" and placed by label, not by index,
        // so the first one starts at pi/3 and the last one at 2pi.
        let cubes: Vec<NodeId> = (1..=ORBIT_COUNT)
            .map(|label| {
                let angle = (label as f32 / 3.0) * PI;
                let position = Vector3::new(
                    settings.orbit_radius * angle.cos(),
                    settings.orbit_radius * angle.sin(),
                    0.0,
                );
                graph.add(SceneNode::new(
                    &format!("cube {}", label),
                    position.into(),
                    NodeKind::Mesh(Mesh {
                        geometry: cube_geometry,
                        material: standard,
                    }),
                ))
            })
            .collect();

        log::info!("scene built with {} nodes", graph.len());

        let spins = vec![[0.0; 2]; cubes.len()];
        Self {
            settings,
            graph,
            camera,
            master_cube,
            cubes,
            spins,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera_id(&self) -> NodeId {
        self.camera
    }

    pub fn master_cube_id(&self) -> NodeId {
        self.master_cube
    }

    /// The orbiting cubes in creation order.
    pub fn cube_ids(&self) -> &[NodeId] {
        &self.cubes
    }

    /// Total X/Y spin of the `index`-th orbiting cube since the scene was built.
    ///
    /// The cube's transform only holds this angle wrapped into `[0, 2pi)`.
    pub fn spin(&self, index: usize) -> Option<[f64; 2]> {
        self.spins.get(index).copied()
    }

    pub fn spin_mut(&mut self, index: usize) -> Option<&mut [f64; 2]> {
        self.spins.get_mut(index)
    }

    pub fn transform(&self, id: NodeId) -> Option<&Instance> {
        self.graph.get(id).map(|node| &node.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Instance> {
        self.graph.get_mut(id).map(|node| &mut node.transform)
    }

    /// The camera's transform and lens.
    pub fn camera(&self) -> Option<(&Instance, &Projection)> {
        self.graph.get(self.camera).and_then(|node| match &node.kind {
            NodeKind::Camera(projection) => Some((&node.transform, projection)),
            _ => None,
        })
    }

    /// Applies a new viewport size to the camera lens.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(node) = self.graph.get_mut(self.camera) {
            if let NodeKind::Camera(projection) = &mut node.kind {
                projection.resize(width, height);
            }
        }
    }
}
