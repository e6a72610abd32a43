//! Engine data structures: models, textures, scene graph, and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `model` contains box geometry, materials and their GPU resources
//! - `texture` contains the depth and offscreen render targets
//! - `instance` holds per-instance transformation data
//! - `scene_graph` holds the tagged scene nodes and the shared registry

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
