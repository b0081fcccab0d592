//! Scene data model for the decoded studio asset.
//!
//! - `graph` holds the node hierarchy and the attached/detached scene root
//! - `material` holds CPU material records and their GPU mirror
//! - `mesh` holds vertex layout and uploaded mesh buffers
//! - `texture` wraps GPU textures (base color, depth, multisample targets)

pub mod graph;
pub mod material;
pub mod mesh;
pub mod texture;
