use std::f32::consts::PI;
use std::f64::consts::TAU;

use cgmath::{InnerSpace, Vector3};
use orbit_cubes::{
    animation::animate,
    camera,
    scene::{DemoScene, ORBIT_COUNT, SceneSettings},
};

const FRAMES: usize = 600;
const DT: f64 = 1.0 / 60.0;

fn assert_close(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() < eps, "{} != {}", a, b);
}

#[test]
fn cubes_stay_on_the_orbit_circle() {
    let mut scene = DemoScene::new(SceneSettings::default(), 1024, 768);
    for frame in 0..FRAMES {
        animate(&mut scene, frame as f64 * DT);
        assert_eq!(scene.cube_ids().len(), ORBIT_COUNT);
        for &id in scene.cube_ids() {
            let position = scene.transform(id).unwrap().position;
            assert_close(position.truncate().magnitude(), 5.0, 1e-3);
            assert_eq!(position.z, 0.0);
        }
    }
}

#[test]
fn cubes_are_evenly_spaced_after_the_first_frame() {
    let mut scene = DemoScene::new(SceneSettings::default(), 1024, 768);
    animate(&mut scene, 3.0);
    let positions: Vec<Vector3<f32>> = scene
        .cube_ids()
        .iter()
        .map(|&id| scene.transform(id).unwrap().position)
        .collect();
    for pair in positions.windows(2) {
        let angle = pair[0].angle(pair[1]).0;
        assert_close(angle, PI / 3.0, 1e-3);
    }
}

#[test]
fn spin_grows_by_a_fixed_step_every_frame() {
    let mut scene = DemoScene::new(SceneSettings::default(), 1024, 768);
    for frame in 0..FRAMES {
        animate(&mut scene, frame as f64 * DT);
    }
    for (i, &id) in scene.cube_ids().iter().enumerate() {
        let [x, y] = scene.spin(i).unwrap();
        assert!((x - 0.01 * FRAMES as f64).abs() < 1e-9, "{}", x);
        assert!((y - 0.02 * FRAMES as f64).abs() < 1e-9, "{}", y);
        let rotation = scene.transform(id).unwrap().rotation;
        assert_close(rotation.x, x.rem_euclid(TAU) as f32, 1e-5);
        assert_close(rotation.y, y.rem_euclid(TAU) as f32, 1e-5);
        assert_eq!(rotation.z, 0.0);
    }
}

#[test]
fn master_cube_pulses_within_bounds_and_keeps_its_tilt() {
    let mut scene = DemoScene::new(SceneSettings::default(), 1024, 768);
    for frame in 0..FRAMES {
        animate(&mut scene, frame as f64 * DT);
        let master = scene.transform(scene.master_cube_id()).unwrap();
        assert!((0.875..=1.125).contains(&master.scale.x));
        assert!((0.8..=1.2).contains(&master.scale.y));
        assert_eq!(master.scale.x, master.scale.z);
        assert_eq!(master.position, Vector3::new(0.0, 0.0, 0.0));
        assert_close(master.rotation.x, PI / 4.0, 1e-6);
        assert_close(master.rotation.y, PI / 4.0, 1e-6);
    }
}

#[test]
fn camera_keeps_facing_the_origin_while_it_drifts() {
    let mut scene = DemoScene::new(SceneSettings::default(), 1024, 768);
    let mut previous = scene.camera().unwrap().0.position;
    for frame in 0..FRAMES {
        animate(&mut scene, frame as f64 * DT);
        let (transform, _) = scene.camera().unwrap();
        let position = transform.position;
        // sideways steps keep the camera at or beyond its start distance
        assert!(position.magnitude() >= 10.0 - 1e-3);
        assert_close((position - previous).magnitude(), 0.05, 1e-4);
        let to_origin = -position.normalize();
        assert_close(camera::forward(transform).dot(to_origin), 1.0, 1e-4);
        previous = position;
    }
}

#[test]
fn custom_settings_shape_the_orbit() {
    let settings = SceneSettings {
        orbit_radius: 2.0,
        ..Default::default()
    };
    let mut scene = DemoScene::new(settings, 640, 480);
    animate(&mut scene, 1.0);
    assert_eq!(scene.cube_ids().len(), ORBIT_COUNT);
    for &id in scene.cube_ids() {
        let position = scene.transform(id).unwrap().position;
        assert_close(position.truncate().magnitude(), 2.0, 1e-4);
    }
}
