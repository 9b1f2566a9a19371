//! Spawn-anchor ring generation.

use glam::Vec3;
use pillow_siege_core::{SpawnRingConfig, SplitMix64};

/// Lays out the spawn anchors for a configured ring.
///
/// Anchors sit evenly spaced on a circle of `radius` world units around the
/// ring origin, lifted by `height_offset`. Each anchor is then jittered on x
/// and z independently within `[-radius_jitter, radius_jitter)` and lifted
/// again by a draw from `[0, height_jitter)`. The draw order per anchor is
/// fixed (x, z, height), so a seed always reproduces the same ring.
pub(crate) fn generate_anchors(config: &SpawnRingConfig, rng: &mut SplitMix64) -> Vec<Vec3> {
    let count = config.anchor_count;
    if count == 0 {
        return Vec::new();
    }

    let mut anchors = Vec::with_capacity(count as usize);
    for index in 0..count {
        let angle = (index as f32 / count as f32) * std::f32::consts::TAU;
        let mut anchor = config.origin
            + Vec3::new(
                angle.cos() * config.radius,
                config.height_offset,
                angle.sin() * config.radius,
            );
        anchor.x += rng.next_range_f32(-config.radius_jitter, config.radius_jitter);
        anchor.z += rng.next_range_f32(-config.radius_jitter, config.radius_jitter);
        anchor.y += rng.next_range_f32(0.0, config.height_jitter);
        anchors.push(anchor);
    }

    anchors
}
