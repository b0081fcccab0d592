//! One-shot floor material rewrite.
//!
//! Studio assets name their surfaces inconsistently, so floor detection is
//! a name heuristic: a mesh node whose lowercased name contains one of the
//! floor hints is floor-like, unless the name also mentions a mirror.
//! Matching materials are pinned to a fixed mid-gray, matte, low-reflection
//! parquet look; everything else is left completely untouched. The rewrite
//! is commutative across nodes and idempotent across repeated runs.

use crate::scene::graph::{NodeKind, SceneRoot};

/// What a mesh node's name says about the surface it represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceClass {
    /// A ground surface eligible for the material rewrite.
    Floor,
    /// A floor-named mirror prop; excluded from the rewrite.
    Mirror,
    /// Anything else; never touched.
    Other,
}

/// Common floor names across the studio assets, including the Turkish
/// "zemin" (floor) and "parke" (parquet).
const FLOOR_HINTS: [&str; 5] = ["floor", "plane", "zemin", "parke", "ground"];
const MIRROR_HINT: &str = "mirror";

/// Base color the floor is darkened to: 0x888888, so the parquet texture
/// reads against the bright studio lights instead of washing out.
pub const FLOOR_BASE_COLOR: [f32; 4] = [
    0x88 as f32 / 255.0,
    0x88 as f32 / 255.0,
    0x88 as f32 / 255.0,
    1.0,
];
pub const FLOOR_ROUGHNESS: f32 = 0.8;
pub const FLOOR_METALNESS: f32 = 0.1;
pub const FLOOR_ENV_INTENSITY: f32 = 0.2;

/// Classify a node name. Case-insensitive; the mirror exclusion is only
/// consulted after an inclusion hint matched.
pub fn classify(name: &str) -> SurfaceClass {
    let name = name.to_lowercase();
    if !FLOOR_HINTS.iter().any(|hint| name.contains(hint)) {
        return SurfaceClass::Other;
    }
    if name.contains(MIRROR_HINT) {
        return SurfaceClass::Mirror;
    }
    SurfaceClass::Floor
}

/// Rewrite every material attached to a floor-like mesh node.
///
/// Runs once per decoded root, before the first frame that displays it.
/// Safe on a detached root; primitives without a material are skipped
/// silently.
pub fn apply(scene: &mut SceneRoot) {
    let mut indices = Vec::new();
    scene.root.visit(&mut |node| {
        if node.kind == NodeKind::Mesh && classify(&node.name) == SurfaceClass::Floor {
            indices.extend(node.primitives.iter().filter_map(|prim| prim.material));
        }
    });
    indices.sort_unstable();
    indices.dedup();

    for idx in &indices {
        let Some(record) = scene.materials.get_mut(*idx) else {
            log::warn!("floor mesh references missing material slot {idx}");
            continue;
        };
        record.base_color = FLOOR_BASE_COLOR;
        record.roughness = FLOOR_ROUGHNESS;
        record.metalness = FLOOR_METALNESS;
        record.env_intensity = FLOOR_ENV_INTENSITY;
        record.needs_update = true;
    }
    log::info!("floor rewrite pinned {} material(s)", indices.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_hints_match_case_insensitively() {
        assert_eq!(classify("Floor_Parquet"), SurfaceClass::Floor);
        assert_eq!(classify("GROUND_01"), SurfaceClass::Floor);
        assert_eq!(classify("Zemin"), SurfaceClass::Floor);
        assert_eq!(classify("parke_detail"), SurfaceClass::Floor);
        assert_eq!(classify("BackPlane"), SurfaceClass::Floor);
    }

    #[test]
    fn mirror_exclusion_applies_after_inclusion() {
        assert_eq!(classify("Mirror_Floor"), SurfaceClass::Mirror);
        assert_eq!(classify("floor_mirror_prop"), SurfaceClass::Mirror);
        // A mirror that never matched a floor hint is simply "other".
        assert_eq!(classify("Mirror_Wall"), SurfaceClass::Other);
    }

    #[test]
    fn unrelated_and_empty_names_are_other() {
        assert_eq!(classify("Wall_01"), SurfaceClass::Other);
        assert_eq!(classify(""), SurfaceClass::Other);
        assert_eq!(classify("Sofa"), SurfaceClass::Other);
    }
}
