//! Parallax mapping checks against the mounted studio rig.

use cgmath::{Point3, Vector4};
use studio_viewer::camera::{CameraConfig, CameraRig, PointerState};
use winit::dpi::PhysicalPosition;

#[test]
fn pointer_sweep_pans_the_target_symmetrically() {
    let config = CameraConfig::default();
    let left = config.look_target(PointerState { x: -1.0, y: 0.0 });
    let right = config.look_target(PointerState { x: 1.0, y: 0.0 });

    assert_eq!(left.x, 38.0 - 15.0);
    assert_eq!(right.x, 38.0 + 15.0);
    assert_eq!(left.y, right.y);
    assert_eq!(left.z, right.z);
}

#[test]
fn view_space_puts_the_target_straight_ahead() {
    let rig = CameraRig::mount(CameraConfig::default());
    for pointer in [
        PointerState { x: 0.0, y: 0.0 },
        PointerState { x: 0.6, y: -0.4 },
        PointerState { x: -1.0, y: 1.0 },
    ] {
        let view = rig.view_matrix(pointer);
        let target = rig.config().look_target(pointer);
        let eye_space = view * Vector4::new(target.x, target.y, target.z, 1.0);

        assert!(eye_space.x.abs() < 1e-3, "target off axis: {eye_space:?}");
        assert!(eye_space.y.abs() < 1e-3, "target off axis: {eye_space:?}");
        assert!(eye_space.z < 0.0);
    }
}

#[test]
fn cursor_position_maps_to_target_end_to_end() {
    let config = CameraConfig::default();
    // 600/800 normalizes to x = 0.5; 150/600 to y = 0.5 with y pointing up.
    let pointer = PointerState::from_window(PhysicalPosition::new(600.0, 150.0), 800, 600);
    let target = config.look_target(pointer);

    assert_eq!(target, Point3::new(38.0 + 7.5, 1.6 + 2.5, -20.0));
}

#[test]
fn repeated_frames_produce_identical_views() {
    let rig = CameraRig::mount(CameraConfig::default());
    let pointer = PointerState { x: 0.25, y: 0.75 };
    let first = rig.view_matrix(pointer);
    for _ in 0..10 {
        rig.view_matrix(PointerState { x: -0.9, y: -0.9 });
    }

    assert_eq!(first, rig.view_matrix(pointer));
    assert_eq!(rig.position(), CameraConfig::default().fixed_position);
}

#[test]
fn custom_rig_geometry_is_honored() {
    let config = CameraConfig {
        fixed_position: Point3::new(0.0, 1.0, 5.0),
        base_look_at: Point3::new(0.0, 1.0, 0.0),
        horizontal_sensitivity: 4.0,
        vertical_sensitivity: 2.0,
    };
    let rig = CameraRig::mount(config);

    assert_eq!(rig.position(), Point3::new(0.0, 1.0, 5.0));
    let target = rig.config().look_target(PointerState { x: -0.5, y: 1.0 });
    assert_eq!(target, Point3::new(-2.0, 3.0, 0.0));
}
