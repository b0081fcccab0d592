//! studio-viewer
//!
//! An interactive 3D studio scene viewer. A packaged glTF asset is decoded
//! into a GPU-resident scene graph and rendered with a camera that is fixed
//! in place but continuously re-aimed from the pointer position, giving a
//! parallax "looking around" effect. After decoding, a one-shot material
//! pass retints floor-like surfaces so the parquet texture reads against
//! the bright studio lighting.
//!
//! While the asset is decoding, in-viewport feedback is a centered
//! progress bar; the textual "LOADING {n}%" readout goes to the window
//! title, which has no effect where there is no title bar (web embeds).
//!
//! High-level modules
//! - `camera`: fixed camera rig, pointer state and the parallax mapping
//! - `overlay`: loading feedback while the asset is decoding
//! - `pass`: the one-shot floor material classification and rewrite
//! - `pipelines`: render pipeline definitions (studio mesh, overlay, lights)
//! - `resources`: asset fetching and glTF decoding
//! - `scene`: scene graph, materials and GPU mesh data
//! - `viewer`: window, event loop and the asset load state machine
//! - `viewport`: GPU surface, renderer configuration and the light rig
//!

pub mod camera;
pub mod overlay;
pub mod pass;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod viewer;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;

pub use viewer::{LoadState, ViewerConfig, run};
