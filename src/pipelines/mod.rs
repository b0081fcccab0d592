//! Render pipeline definitions.
//!
//! - `lights` carries the fixed studio lighting rig uniform
//! - `mesh` is the lit pipeline all scene geometry goes through
//! - `overlay` draws the loading bar while the asset is pending

pub mod lights;
pub mod mesh;
pub mod overlay;
