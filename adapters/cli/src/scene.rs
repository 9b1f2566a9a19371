//! Probe-only stand-in for the demo arena geometry.

use glam::Vec3;
use pillow_siege_core::{RayHit, SceneProbe};

/// Training yard the scripted session marches through.
///
/// A flat plain is broken by a narrow pit whose far wall tops out in a
/// climbable shelf. Walking off the pit edge while holding forward leaves the
/// body descending right in front of that wall, which is the grab condition,
/// so every session demonstrates one ledge climb before the route returns to
/// open ground. Features are bounded in `x` so a wandering body crosses the
/// pit line safely once the scripted sweeps kick in.
pub(crate) struct TrainingYard;

impl TrainingYard {
    const YARD_HALF_WIDTH: f32 = 8.0;
    const PIT_NEAR_Z: f32 = 18.0;
    const PIT_FAR_Z: f32 = 18.8;
    const PIT_FLOOR_Y: f32 = -10.0;
    const SHELF_TOP_Y: f32 = 1.2;
    const SHELF_END_Z: f32 = 30.0;

    /// Topmost walkable surface under a column.
    fn surface_height(x: f32, z: f32) -> f32 {
        if x.abs() > Self::YARD_HALF_WIDTH {
            return 0.0;
        }
        if z < Self::PIT_NEAR_Z {
            0.0
        } else if z < Self::PIT_FAR_Z {
            Self::PIT_FLOOR_Y
        } else if z <= Self::SHELF_END_Z {
            Self::SHELF_TOP_Y
        } else {
            0.0
        }
    }

    fn floor_below(origin: Vec3, max_distance: f32) -> Option<RayHit> {
        let surface = Self::surface_height(origin.x, origin.z);
        let distance = origin.y - surface;
        (distance >= 0.0 && distance <= max_distance).then_some(RayHit {
            point: Vec3::new(origin.x, surface, origin.z),
            normal: Vec3::Y,
            distance,
        })
    }

    fn shelf_face(origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if direction.z <= 0.0 {
            return None;
        }
        let distance = (Self::PIT_FAR_Z - origin.z) / direction.z;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }
        let point = origin + direction * distance;
        let on_face = point.x.abs() <= Self::YARD_HALF_WIDTH
            && point.y >= Self::PIT_FLOOR_Y
            && point.y <= Self::SHELF_TOP_Y;
        on_face.then_some(RayHit {
            point,
            normal: Vec3::new(0.0, 0.0, -1.0),
            distance,
        })
    }
}

/// Answers the locomotion probes honestly: straight-down rays report the
/// surface under the column, forward rays report the shelf face, anything
/// else misses.
impl SceneProbe for TrainingYard {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if direction.y < -0.9 {
            return Self::floor_below(origin, max_distance);
        }
        if direction.y.abs() < 0.5 && direction.z > 0.5 {
            return Self::shelf_face(origin, direction, max_distance);
        }
        None
    }
}
