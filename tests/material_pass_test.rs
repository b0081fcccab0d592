//! Floor rewrite behavior on detached scene roots.

use studio_viewer::pass::{
    self, FLOOR_BASE_COLOR, FLOOR_ENV_INTENSITY, FLOOR_METALNESS, FLOOR_ROUGHNESS,
};
use studio_viewer::scene::{
    graph::{Primitive, SceneNode, SceneRoot},
    material::MaterialRecord,
};

fn named_material(name: &str) -> MaterialRecord {
    MaterialRecord {
        name: name.to_string(),
        base_color: [0.42, 0.31, 0.20, 1.0],
        roughness: 0.5,
        metalness: 0.0,
        env_intensity: 1.0,
        needs_update: false,
    }
}

fn studio_root(children: Vec<SceneNode>, materials: Vec<MaterialRecord>) -> SceneRoot {
    let mut root = SceneNode::group("scene");
    root.children = children;
    SceneRoot::detached(root, materials)
}

#[test]
fn floor_mesh_material_is_pinned() {
    let floor = SceneNode::mesh(
        "Floor_Parquet",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    );
    let mut scene = studio_root(vec![floor], vec![named_material("parquet")]);

    pass::apply(&mut scene);

    let record = &scene.materials[0];
    assert_eq!(record.base_color, FLOOR_BASE_COLOR);
    assert_eq!(record.roughness, FLOOR_ROUGHNESS);
    assert_eq!(record.metalness, FLOOR_METALNESS);
    assert_eq!(record.env_intensity, FLOOR_ENV_INTENSITY);
    assert!(record.needs_update);
}

#[test]
fn mirrors_and_walls_keep_their_materials() {
    let mirror = SceneNode::mesh(
        "Mirror_Floor",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    );
    let wall = SceneNode::mesh(
        "Wall_01",
        vec![Primitive {
            mesh: 1,
            material: Some(1),
        }],
    );
    let materials = vec![named_material("mirror"), named_material("plaster")];
    let untouched = materials.clone();
    let mut scene = studio_root(vec![mirror, wall], materials);

    pass::apply(&mut scene);

    assert_eq!(scene.materials, untouched);
}

#[test]
fn floor_primitive_without_material_is_skipped() {
    let floor = SceneNode::mesh(
        "ground",
        vec![Primitive {
            mesh: 0,
            material: None,
        }],
    );
    let mut scene = studio_root(vec![floor], vec![named_material("unreferenced")]);

    pass::apply(&mut scene);

    assert!(!scene.materials[0].needs_update);
    assert_eq!(scene.materials[0], named_material("unreferenced"));
}

#[test]
fn floor_named_group_does_not_trigger_the_rewrite() {
    // Only mesh nodes are classified; a grouping node named like a floor
    // must not drag its children's materials into the rewrite.
    let mut group = SceneNode::group("FloorProps");
    group.children.push(SceneNode::mesh(
        "Lamp",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    ));
    let mut scene = studio_root(vec![group], vec![named_material("brass")]);

    pass::apply(&mut scene);

    assert!(!scene.materials[0].needs_update);
}

#[test]
fn nested_floor_meshes_are_found() {
    let mut room = SceneNode::group("Room");
    room.children.push(SceneNode::mesh(
        "zemin_parke",
        vec![Primitive {
            mesh: 0,
            material: Some(1),
        }],
    ));
    let mut scene = studio_root(
        vec![room],
        vec![named_material("plaster"), named_material("parquet")],
    );

    pass::apply(&mut scene);

    assert!(!scene.materials[0].needs_update);
    assert!(scene.materials[1].needs_update);
    assert_eq!(scene.materials[1].base_color, FLOOR_BASE_COLOR);
}

#[test]
fn shared_floor_material_is_rewritten_once_per_run() {
    // Two floor meshes share one material slot; the rewrite must not care.
    let a = SceneNode::mesh(
        "Floor_A",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    );
    let b = SceneNode::mesh(
        "Floor_B",
        vec![Primitive {
            mesh: 1,
            material: Some(0),
        }],
    );
    let mut scene = studio_root(vec![a, b], vec![named_material("parquet")]);

    pass::apply(&mut scene);

    assert_eq!(scene.materials[0].base_color, FLOOR_BASE_COLOR);
    assert!(scene.materials[0].needs_update);
}

#[test]
fn rewrite_is_idempotent() {
    let floor = SceneNode::mesh(
        "BackPlane",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    );
    let mut scene = studio_root(vec![floor], vec![named_material("parquet")]);

    pass::apply(&mut scene);
    let after_first = scene.materials.clone();
    pass::apply(&mut scene);

    assert_eq!(scene.materials, after_first);
}

#[test]
fn detached_root_stays_detached() {
    let floor = SceneNode::mesh(
        "Floor",
        vec![Primitive {
            mesh: 0,
            material: Some(0),
        }],
    );
    let mut scene = studio_root(vec![floor], vec![named_material("parquet")]);
    assert!(!scene.is_attached());

    pass::apply(&mut scene);

    assert!(!scene.is_attached());
}
