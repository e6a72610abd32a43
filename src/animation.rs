//! Per-frame animation of the demo scene.
//!
//! [`animate`] is called once per frame with the elapsed time read from the
//! [`Clock`] exactly once for that frame. Time based motion (the pulse and the
//! orbit) uses that value; spin and camera drift advance by a fixed step per
//! call, so they run faster on displays with a higher refresh rate.

use std::f64::consts::{PI, TAU};

use cgmath::{Point3, Vector3};
use instant::Instant;

use crate::{camera, scene::DemoScene};

/// Monotonic elapsed-time source started when the scene starts.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since the clock was started.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Anisotropic breathing of the master cube.
pub fn pulse_scale(t: f64) -> Vector3<f32> {
    let c = t.cos();
    Vector3::new(
        (1.0 + c / 8.0) as f32,
        (1.0 + c / 5.0) as f32,
        (1.0 + c / 8.0) as f32,
    )
}

/// Orbit angle of cube `index` (0-based) at time `t`.
pub fn orbit_angle(index: usize, count: usize, time_scale: f32, t: f64) -> f64 {
    ((index as f64 - t / time_scale as f64) / (count as f64 / 2.0)) * PI
}

/// Advances the scene to elapsed time `t` (seconds).
pub fn animate(scene: &mut DemoScene, t: f64) {
    let settings = scene.settings.clone();

    if let Some(master) = scene.transform_mut(scene.master_cube_id()) {
        master.scale = pulse_scale(t);
    }

    if let Some(camera_transform) = scene.transform_mut(scene.camera_id()) {
        camera::translate_x(camera_transform, settings.camera_drift_per_frame);
        camera::look_at(camera_transform, Point3::new(0.0, 0.0, 0.0));
    }

    let cubes = scene.cube_ids().to_vec();
    let count = cubes.len();
    for (i, id) in cubes.into_iter().enumerate() {
        let Some(spin) = scene.spin_mut(i) else {
            continue;
        };
        spin[0] += settings.spin_per_frame[0];
        spin[1] += settings.spin_per_frame[1];
        let wrapped = spin.map(|angle| angle.rem_euclid(TAU) as f32);

        let Some(cube) = scene.transform_mut(id) else {
            continue;
        };
        cube.rotation.x = wrapped[0];
        cube.rotation.y = wrapped[1];

        let angle = orbit_angle(i, count, settings.orbit_time_scale, t);
        let radius = settings.orbit_radius as f64;
        cube.position = Vector3::new(
            (radius * angle.cos()) as f32,
            (radius * angle.sin()) as f32,
            cube.position.z,
        );
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;
    use crate::scene::SceneSettings;

    fn scene() -> DemoScene {
        DemoScene::new(SceneSettings::default(), 800, 600)
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn pulse_scale_at_rest_and_at_half_period() {
        let s = pulse_scale(0.0);
        assert_close(s.x, 1.125);
        assert_close(s.y, 1.2);
        assert_close(s.z, 1.125);
        let s = pulse_scale(PI);
        assert_close(s.x, 0.875);
        assert_close(s.y, 0.8);
        assert_close(s.z, 0.875);
    }

    #[test]
    fn pulse_scale_stays_within_bounds() {
        for step in 0..1000 {
            let s = pulse_scale(step as f64 * 0.037);
            assert_eq!(s.x, s.z);
            assert!((0.875..=1.125).contains(&s.x));
            assert!((0.8..=1.2).contains(&s.y));
        }
    }

    #[test]
    fn pulse_stays_smooth_after_a_day() {
        // one day in, consecutive 60 Hz frames still see distinct times
        let day = 86_400.0;
        let a = pulse_scale(day);
        let b = pulse_scale(day + 1.0 / 60.0);
        assert_ne!(a.y, b.y);
        let step = orbit_angle(0, 6, 5.0, day + 1.0 / 60.0) - orbit_angle(0, 6, 5.0, day);
        assert!((step + (1.0 / 60.0) / 15.0 * PI).abs() < 1e-9, "step {}", step);
    }

    #[test]
    fn first_cube_sits_on_the_x_axis_at_time_zero() {
        let mut scene = scene();
        animate(&mut scene, 0.0);
        let first = scene.transform(scene.cube_ids()[0]).unwrap();
        assert_close(first.position.x, 5.0);
        assert_close(first.position.y, 0.0);
        assert_eq!(first.position.z, 0.0);
    }

    #[test]
    fn orbit_angle_at_five_pi_seconds() {
        let t = 5.0 * PI;
        let angle = orbit_angle(0, 6, 5.0, t);
        assert_eq!(angle, ((0.0 - t / 5.0) / 3.0) * PI);
        assert!((angle + PI * PI / 3.0).abs() < 1e-12);

        let mut scene = scene();
        animate(&mut scene, t);
        let first = scene.transform(scene.cube_ids()[0]).unwrap();
        assert_close(first.position.x, 5.0 * angle.cos() as f32);
        assert_close(first.position.y, 5.0 * angle.sin() as f32);
    }

    #[test]
    fn master_cube_scale_follows_the_clock() {
        let mut scene = scene();
        animate(&mut scene, PI);
        let master = scene.transform(scene.master_cube_id()).unwrap();
        assert_close(master.scale.y, 0.8);
        // rotation set at construction is untouched
        assert_close(master.rotation.x, std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn spin_accumulates_per_frame_regardless_of_time() {
        let mut scene = scene();
        let id = scene.cube_ids()[3];
        animate(&mut scene, 0.0);
        let before = scene.transform(id).unwrap().rotation;
        // a long gap between frames adds exactly one step
        animate(&mut scene, 120.0);
        let after = scene.transform(id).unwrap().rotation;
        assert_close(after.x - before.x, 0.01);
        assert_close(after.y - before.y, 0.02);
        assert_eq!(after.z, 0.0);
        assert_eq!(scene.spin(3), Some([0.01 + 0.01, 0.02 + 0.02]));
    }

    #[test]
    fn spin_keeps_growing_from_a_large_total() {
        let mut scene = scene();
        let id = scene.cube_ids()[0];
        // far past the point where an f32 sum stops changing
        let start = [262_144.0, 524_288.0];
        *scene.spin_mut(0).unwrap() = start;
        animate(&mut scene, 1.0);
        let [x, y] = scene.spin(0).unwrap();
        assert_eq!(x, start[0] + 0.01);
        assert_eq!(y, start[1] + 0.02);

        let rotation = scene.transform(id).unwrap().rotation;
        assert_close(rotation.x, x.rem_euclid(TAU) as f32);
        assert_close(rotation.y, y.rem_euclid(TAU) as f32);
        animate(&mut scene, 1.0);
        let next = scene.transform(id).unwrap().rotation;
        assert_close(next.x - rotation.x, 0.01);
        assert_close(next.y - rotation.y, 0.02);
    }

    #[test]
    fn wrapped_spin_stays_within_one_turn() {
        let mut scene = scene();
        for _ in 0..1000 {
            animate(&mut scene, 0.0);
        }
        let rotation = scene.transform(scene.cube_ids()[0]).unwrap().rotation;
        assert!((0.0..std::f32::consts::TAU).contains(&rotation.x));
        assert!((0.0..std::f32::consts::TAU).contains(&rotation.y));
        let [x, y] = scene.spin(0).unwrap();
        assert!((x - 10.0).abs() < 1e-9 && (y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn camera_drifts_sideways_and_keeps_facing_the_origin() {
        let mut scene = scene();
        let start = scene.camera().unwrap().0.position;
        animate(&mut scene, 0.0);
        let (camera_transform, _) = scene.camera().unwrap();
        let moved = camera_transform.position;
        assert_close((moved - start).magnitude(), 0.05);
        assert_close(moved.magnitude(), (100.0f32 + 0.05 * 0.05).sqrt());
        let towards_origin = -moved.normalize();
        assert_close((camera::forward(camera_transform) - towards_origin).magnitude(), 0.0);
    }
}
