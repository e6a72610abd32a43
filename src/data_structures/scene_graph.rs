//! Scene graph: a flat, ordered list of tagged nodes under one root.
//!
//! Every node carries a transform ([`Instance`]) and a [`NodeKind`] telling the
//! renderer what it is: a point light, a mesh or a camera. Meshes reference
//! their shape and appearance through typed handles into the [`Registry`], so
//! several meshes share one descriptor instead of owning copies.
//!
//! Nodes are only ever added; [`NodeId`]s stay valid for the scene's lifetime
//! and iteration follows creation order.

use crate::{
    camera::Projection,
    data_structures::{
        instance::Instance,
        model::{BoxGeometry, Material, colour_from_hex},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(usize);

/// Write-once storage for geometries and materials.
///
/// Descriptors can be added and read but never mutated, so every mesh holding
/// a handle sees the same value for the whole run.
#[derive(Debug, Default)]
pub struct Registry {
    geometries: Vec<BoxGeometry>,
    materials: Vec<Material>,
}

impl Registry {
    pub fn add_geometry(&mut self, geometry: BoxGeometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&BoxGeometry> {
        self.geometries.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &BoxGeometry)> {
        self.geometries
            .iter()
            .enumerate()
            .map(|(i, geometry)| (GeometryId(i), geometry))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, material)| (MaterialId(i), material))
    }
}

/// An omnidirectional light.
///
/// `range` is the distance at which the light has faded out completely; `0.0`
/// means no falloff.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub colour: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

impl PointLight {
    pub fn new(colour: u32, intensity: f32, range: f32) -> Self {
        Self {
            colour: colour_from_hex(colour),
            intensity,
            range,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Light(PointLight),
    Mesh(Mesh),
    Camera(Projection),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Instance,
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn new(name: &str, transform: Instance, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            transform,
            kind,
        }
    }
}

/// The scene root: background colour, registry and all nodes.
#[derive(Debug)]
pub struct SceneGraph {
    pub background: wgpu::Color,
    registry: Registry,
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new(background: wgpu::Color) -> Self {
        Self {
            background,
            registry: Registry::default(),
            nodes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    pub fn lights(&self) -> impl Iterator<Item = (&Instance, &PointLight)> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Light(light) => Some((&node.transform, light)),
            _ => None,
        })
    }

    pub fn meshes(&self) -> impl Iterator<Item = (&Instance, &Mesh)> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Mesh(mesh) => Some((&node.transform, mesh)),
            _ => None,
        })
    }
}
