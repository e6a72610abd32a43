//! orbit-cubes
//!
//! A small real-time 3D demo: a pulsing, self-lit master cube at the origin,
//! six smaller cubes orbiting it while spinning, five coloured point lights and
//! a camera that drifts sideways while always facing the centre. Runs natively
//! and in the browser (WebGL2) on top of wgpu and winit.
//!
//! High-level modules
//! - `scene`: the demo's node topology and its tunables
//! - `animation`: the per-frame transform updates driven by elapsed time
//! - `camera`: perspective lens, look-at and the camera uniform
//! - `data_structures`: transforms, the scene graph, geometry and materials
//! - `stats`: frames-per-second measurement
//! - `pipelines`: the lit mesh pipeline, the lights uniform and the stats overlay
//! - `render`/`resources`: instanced batching and the GPU resources behind it
//! - `context`: window surface, device and queue
//! - `flow`: the event loop tying it all together
//!

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod stats;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    flow::run().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
