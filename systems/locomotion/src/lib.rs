#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player locomotion state machine.
//!
//! Owns the authoritative player pose: position, velocity, facing, and the
//! support stance. Per-frame input (turning, jumping, firing, climb
//! interpolation) runs in [`Locomotion::tick`]; physics integration
//! (movement, gravity shaping, ledge detection, floor settling) runs in
//! [`Locomotion::fixed_tick`]. Both emit [`Command::SyncPlayerPose`] so the
//! arena mirror stays current, and collision geometry is reached only
//! through the [`SceneProbe`] seam.

use std::{error::Error, fmt, time::Duration};

use glam::Vec3;
use pillow_siege_core::{Command, Event, InputSample, ProjectileSource, SceneProbe};

/// Fraction of the body radius at which the four outer ground probes sit.
const GROUND_PROBE_SPREAD: f32 = 0.8;

/// Configuration parameters required to construct the locomotion system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Horizontal movement speed in units per second.
    pub move_speed: f32,
    /// Vertical velocity applied on the frame a jump is accepted.
    pub jump_velocity: f32,
    /// Baseline downward acceleration in units per second².
    pub gravity: f32,
    /// Gravity scale while descending; the surplus over one is applied as
    /// extra downward acceleration.
    pub fall_multiplier: f32,
    /// Gravity scale while ascending, shortening floaty jump arcs.
    pub low_jump_multiplier: f32,
    /// Capsule radius used to spread the ground probe fan.
    pub body_radius: f32,
    /// Ground probes start this far above the feet.
    pub ground_probe_lift: f32,
    /// Length of each downward ground probe.
    pub ground_probe_range: f32,
    /// Height above the feet the chest-level ledge probe starts at.
    pub ledge_probe_height: f32,
    /// Forward reach of the chest-level ledge probe.
    pub ledge_probe_range: f32,
    /// Ledges at or below this height are stepped, not climbed.
    pub min_ledge_height: f32,
    /// Ledges above this height are out of reach.
    pub max_ledge_height: f32,
    /// Minimum upward normal component for a surface to count as a ledge top.
    pub min_ledge_flatness: f32,
    /// Duration of the scripted climb interpolation.
    pub climb_duration: Duration,
    /// Forward inset applied to the climb landing point, past the ledge lip.
    pub climb_forward_inset: f32,
    /// Cooldown between player shots.
    pub fire_cooldown: Duration,
    /// Muzzle speed of player projectiles in units per second.
    pub projectile_speed: f32,
    /// Height of the muzzle above the feet.
    pub muzzle_height: f32,
    /// Forward offset of the muzzle from the body center.
    pub muzzle_reach: f32,
    /// World-space position the player's feet start at.
    pub spawn_position: Vec3,
    /// Initial facing angle around the vertical axis, in radians.
    pub initial_yaw: f32,
}

impl Config {
    /// Checks the tuning for values the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.move_speed) {
            return Err(ConfigError::NonPositiveMoveSpeed(self.move_speed));
        }
        if !positive(self.jump_velocity) {
            return Err(ConfigError::NonPositiveJumpVelocity(self.jump_velocity));
        }
        if !positive(self.gravity) {
            return Err(ConfigError::NonPositiveGravity(self.gravity));
        }
        if !(self.fall_multiplier >= 1.0) {
            return Err(ConfigError::WeakGravityMultiplier(self.fall_multiplier));
        }
        if !(self.low_jump_multiplier >= 1.0) {
            return Err(ConfigError::WeakGravityMultiplier(self.low_jump_multiplier));
        }
        if !positive(self.body_radius) {
            return Err(ConfigError::NonPositiveBodyRadius(self.body_radius));
        }
        if self.climb_duration.is_zero() {
            return Err(ConfigError::EmptyClimbDuration);
        }
        if !positive(self.min_ledge_height) || !(self.max_ledge_height > self.min_ledge_height) {
            return Err(ConfigError::InvalidLedgeWindow {
                min: self.min_ledge_height,
                max: self.max_ledge_height,
            });
        }
        if !positive(self.projectile_speed) {
            return Err(ConfigError::NonPositiveProjectileSpeed(
                self.projectile_speed,
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_velocity: 10.0,
            gravity: 9.81,
            fall_multiplier: 2.5,
            low_jump_multiplier: 2.0,
            body_radius: 0.5,
            ground_probe_lift: 0.05,
            ground_probe_range: 0.15,
            ledge_probe_height: 1.2,
            ledge_probe_range: 0.6,
            min_ledge_height: 1.0,
            max_ledge_height: 1.5,
            min_ledge_flatness: 0.8,
            climb_duration: Duration::from_millis(500),
            climb_forward_inset: 0.3,
            fire_cooldown: Duration::from_millis(500),
            projectile_speed: 20.0,
            muzzle_height: 1.5,
            muzzle_reach: 1.5,
            spawn_position: Vec3::ZERO,
            initial_yaw: 0.0,
        }
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Errors reported by [`Config::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Movement speed must be a positive, finite value.
    NonPositiveMoveSpeed(f32),
    /// Jump velocity must be a positive, finite value.
    NonPositiveJumpVelocity(f32),
    /// Gravity must be a positive, finite value.
    NonPositiveGravity(f32),
    /// Gravity multipliers below one would push the body upward.
    WeakGravityMultiplier(f32),
    /// Body radius must be a positive, finite value.
    NonPositiveBodyRadius(f32),
    /// The climb interpolation needs a non-zero duration.
    EmptyClimbDuration,
    /// The accepted ledge window must span upward from a positive base.
    InvalidLedgeWindow {
        /// Lower edge of the rejected window.
        min: f32,
        /// Upper edge of the rejected window.
        max: f32,
    },
    /// Projectile speed must be a positive, finite value.
    NonPositiveProjectileSpeed(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMoveSpeed(value) => {
                write!(f, "move speed {value} must be positive")
            }
            Self::NonPositiveJumpVelocity(value) => {
                write!(f, "jump velocity {value} must be positive")
            }
            Self::NonPositiveGravity(value) => write!(f, "gravity {value} must be positive"),
            Self::WeakGravityMultiplier(value) => {
                write!(f, "gravity multiplier {value} must not drop below one")
            }
            Self::NonPositiveBodyRadius(value) => {
                write!(f, "body radius {value} must be positive")
            }
            Self::EmptyClimbDuration => write!(f, "climb duration must not be zero"),
            Self::InvalidLedgeWindow { min, max } => {
                write!(f, "ledge window [{min}, {max}] must span upward from a positive base")
            }
            Self::NonPositiveProjectileSpeed(value) => {
                write!(f, "projectile speed {value} must be positive")
            }
        }
    }
}

impl Error for ConfigError {}

/// Externally visible support state of the player's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    /// Feet planted on supporting geometry.
    Grounded,
    /// Rising or falling freely under gravity.
    Airborne,
    /// Scripted ledge climb in progress.
    Climbing,
}

/// Player locomotion state machine driven by explicit frame and fixed ticks.
#[derive(Debug)]
pub struct Locomotion {
    config: Config,
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    support: Support,
    current_input: InputSample,
    fire_ready_in: Duration,
    enabled: bool,
}

impl Locomotion {
    /// Creates a new locomotion system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        debug_assert!(config.validate().is_ok(), "locomotion config must be valid");
        Self {
            position: config.spawn_position,
            velocity: Vec3::ZERO,
            yaw: config.initial_yaw,
            support: Support::Grounded,
            current_input: InputSample::default(),
            fire_ready_in: Duration::ZERO,
            enabled: true,
            config,
        }
    }

    /// Per-frame update: event handling, turning, ground classification,
    /// jump and fire edges, and climb interpolation.
    pub fn tick<S>(
        &mut self,
        events: &[Event],
        input: InputSample,
        dt: Duration,
        scene: &S,
        out: &mut Vec<Command>,
    ) where
        S: SceneProbe,
    {
        for event in events {
            match event {
                Event::PlayerPushed { impulse } => {
                    // Scripted climb motion is not deflected by knockback.
                    if !self.is_climbing() {
                        self.velocity += *impulse;
                    }
                }
                Event::PlayerDied => self.enabled = false,
                Event::PlayerHealthReset => self.enabled = true,
                _ => {}
            }
        }

        self.fire_ready_in = self.fire_ready_in.saturating_sub(dt);
        self.current_input = if self.enabled {
            input
        } else {
            InputSample::default()
        };

        if self.enabled && !self.is_climbing() {
            self.yaw += input.turn;
        }

        if let Support::Climbing(mut track) = self.support {
            track.elapsed = track.elapsed.saturating_add(dt);
            let progress = climb_progress(track.elapsed, self.config.climb_duration);
            self.position = track.from.lerp(track.to, ease_out_cubic(progress));
            self.support = if progress >= 1.0 {
                self.position = track.to;
                self.velocity = Vec3::ZERO;
                Support::Grounded
            } else {
                Support::Climbing(track)
            };
        } else {
            self.support = if classify_ground(self.position, self.yaw, &self.config, scene) {
                Support::Grounded
            } else {
                Support::Airborne
            };

            if self.enabled && input.jump_pressed && self.is_grounded() {
                self.velocity.y = self.config.jump_velocity;
            }
        }

        if self.enabled && input.fire_pressed && self.fire_ready_in.is_zero() {
            let forward = yaw_forward(self.yaw);
            out.push(Command::FireProjectile {
                source: ProjectileSource::Player,
                origin: self.position
                    + Vec3::Y * self.config.muzzle_height
                    + forward * self.config.muzzle_reach,
                velocity: forward * self.config.projectile_speed,
            });
            self.fire_ready_in = self.config.fire_cooldown;
        }

        self.push_pose(out);
    }

    /// Fixed-rate update: ledge detection, horizontal movement, gravity
    /// shaping, integration, and floor settling.
    pub fn fixed_tick<S>(&mut self, dt: Duration, scene: &S, out: &mut Vec<Command>)
    where
        S: SceneProbe,
    {
        if self.is_climbing() {
            self.push_pose(out);
            return;
        }

        if self.enabled
            && !self.is_grounded()
            && self.velocity.y <= 0.0
            && self.current_input.move_axes.y > 0.0
        {
            if let Some(track) = self.find_ledge(scene) {
                self.velocity = Vec3::ZERO;
                self.support = Support::Climbing(track);
                self.push_pose(out);
                return;
            }
        }

        if self.enabled {
            let forward = yaw_forward(self.yaw);
            let right = yaw_right(self.yaw);
            let intent =
                forward * self.current_input.move_axes.y + right * self.current_input.move_axes.x;
            if intent.length_squared() > f32::EPSILON {
                let direction = intent.normalize();
                self.velocity.x = direction.x * self.config.move_speed;
                self.velocity.z = direction.z * self.config.move_speed;
            } else {
                self.velocity.x = 0.0;
                self.velocity.z = 0.0;
            }
        }

        let dt_secs = dt.as_secs_f32();
        if self.is_grounded() && self.velocity.y <= 0.0 {
            // A supported body carries no fall speed, even when only a side
            // probe holds it up.
            self.velocity.y = 0.0;
        } else {
            if self.velocity.y < 0.0 {
                self.velocity.y -=
                    self.config.gravity * (self.config.fall_multiplier - 1.0) * dt_secs;
            } else if self.velocity.y > 0.0 {
                self.velocity.y -=
                    self.config.gravity * (self.config.low_jump_multiplier - 1.0) * dt_secs;
            }
            self.velocity.y -= self.config.gravity * dt_secs;
        }

        let previous_height = self.position.y;
        self.position += self.velocity * dt_secs;
        self.settle_on_floor(previous_height, scene);

        self.push_pose(out);
    }

    /// World-space position of the player's feet.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Facing angle around the vertical axis, in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current support state.
    #[must_use]
    pub fn stance(&self) -> Stance {
        match self.support {
            Support::Grounded => Stance::Grounded,
            Support::Airborne => Stance::Airborne,
            Support::Climbing(_) => Stance::Climbing,
        }
    }

    /// Reports whether the body currently counts as supported.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        matches!(self.support, Support::Grounded)
    }

    /// Reports whether the controller currently responds to input.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_climbing(&self) -> bool {
        matches!(self.support, Support::Climbing(_))
    }

    /// Probes for a climbable ledge ahead of the chest: a wall hit, then a
    /// flat top within the accepted height window above the feet.
    fn find_ledge<S>(&self, scene: &S) -> Option<ClimbTrack>
    where
        S: SceneProbe,
    {
        let forward = yaw_forward(self.yaw);
        let chest_origin = self.position + Vec3::Y * self.config.ledge_probe_height;
        let wall = scene.raycast(chest_origin, forward, self.config.ledge_probe_range)?;

        let crest_origin = wall.point + Vec3::Y * self.config.max_ledge_height;
        let crest = scene.raycast(crest_origin, -Vec3::Y, self.config.max_ledge_height)?;
        if crest.normal.y <= self.config.min_ledge_flatness {
            return None;
        }

        let ledge_height = crest.point.y - self.position.y;
        if ledge_height <= self.config.min_ledge_height
            || ledge_height > self.config.max_ledge_height
        {
            return None;
        }

        let mut landing = crest.point + forward * self.config.climb_forward_inset;
        landing.y = crest.point.y;
        Some(ClimbTrack {
            from: self.position,
            to: landing,
            elapsed: Duration::ZERO,
        })
    }

    /// Stand-in for solid collision: a descending body lands on the first
    /// floor the center probe crosses during the step.
    fn settle_on_floor<S>(&mut self, previous_height: f32, scene: &S)
    where
        S: SceneProbe,
    {
        if self.velocity.y > 0.0 {
            return;
        }

        let lift = self.config.ground_probe_lift;
        let descent = (previous_height - self.position.y).max(0.0);
        let origin = Vec3::new(self.position.x, previous_height + lift, self.position.z);
        let reach = lift + descent + self.config.ground_probe_range;
        if let Some(hit) = scene.raycast(origin, -Vec3::Y, reach) {
            if self.position.y <= hit.point.y {
                self.position.y = hit.point.y;
                self.velocity.y = 0.0;
                self.support = Support::Grounded;
            }
        }
    }

    fn push_pose(&self, out: &mut Vec<Command>) {
        out.push(Command::SyncPlayerPose {
            position: self.position,
            velocity: self.velocity,
            grounded: self.is_grounded(),
        });
    }
}

#[derive(Clone, Copy, Debug)]
enum Support {
    Grounded,
    Airborne,
    Climbing(ClimbTrack),
}

#[derive(Clone, Copy, Debug)]
struct ClimbTrack {
    from: Vec3,
    to: Vec3,
    elapsed: Duration,
}

/// Five-probe ground fan: feet center plus four offsets at a fraction of
/// the body radius, each cast downward from just above the feet. Any hit
/// counts as support.
fn classify_ground<S>(position: Vec3, yaw: f32, config: &Config, scene: &S) -> bool
where
    S: SceneProbe,
{
    let lift = Vec3::Y * config.ground_probe_lift;
    let spread = GROUND_PROBE_SPREAD * config.body_radius;
    let forward = yaw_forward(yaw) * spread;
    let right = yaw_right(yaw) * spread;

    let origins = [
        position,
        position + forward,
        position - forward,
        position + right,
        position - right,
    ];
    origins.iter().any(|origin| {
        scene
            .raycast(*origin + lift, -Vec3::Y, config.ground_probe_range)
            .is_some()
    })
}

fn climb_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

fn yaw_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pillow_siege_core::RayHit;

    /// Floor plane at y = 0 covering only x >= 0.
    fn half_floor(origin: Vec3, direction: Vec3, max: f32) -> Option<RayHit> {
        if direction.y >= 0.0 || origin.x < 0.0 {
            return None;
        }
        let distance = origin.y;
        (distance >= 0.0 && distance <= max).then_some(RayHit {
            point: Vec3::new(origin.x, 0.0, origin.z),
            normal: Vec3::Y,
            distance,
        })
    }

    #[test]
    fn ground_fan_accepts_any_probe_hit() {
        let config = Config::default();

        // Center probe over the floor.
        assert!(classify_ground(
            Vec3::new(0.1, 0.0, 0.0),
            0.0,
            &config,
            &half_floor
        ));
        // Center misses, a side probe still reaches the floor edge.
        assert!(classify_ground(
            Vec3::new(-0.1, 0.0, 0.0),
            0.0,
            &config,
            &half_floor
        ));
        // Entire fan past the edge.
        assert!(!classify_ground(
            Vec3::new(-0.5, 0.0, 0.0),
            0.0,
            &config,
            &half_floor
        ));
        // Too high above the floor for the short probes.
        assert!(!classify_ground(
            Vec3::new(1.0, 0.5, 0.0),
            0.0,
            &config,
            &half_floor
        ));
    }

    #[test]
    fn classification_repeats_over_a_static_scene() {
        let config = Config::default();

        for (position, expected) in [
            (Vec3::new(0.1, 0.0, 0.0), true),
            (Vec3::new(-0.5, 0.0, 0.0), false),
        ] {
            for _ in 0..3 {
                assert_eq!(
                    classify_ground(position, 0.0, &config, &half_floor),
                    expected
                );
            }
        }
    }

    #[test]
    fn ease_out_cubic_hits_both_ends() {
        assert_relative_eq!(ease_out_cubic(0.0), 0.0);
        assert_relative_eq!(ease_out_cubic(0.5), 0.875);
        assert_relative_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn climb_progress_clamps_and_survives_zero_duration() {
        let duration = Duration::from_millis(500);
        assert_relative_eq!(climb_progress(Duration::from_millis(250), duration), 0.5);
        assert_relative_eq!(climb_progress(Duration::from_secs(4), duration), 1.0);
        assert_relative_eq!(climb_progress(Duration::ZERO, Duration::ZERO), 1.0);
    }

    #[test]
    fn facing_vectors_stay_orthogonal() {
        for yaw in [0.0_f32, 0.7, 1.9, -2.4] {
            let forward = yaw_forward(yaw);
            let right = yaw_right(yaw);
            assert_relative_eq!(forward.dot(right), 0.0, epsilon = 1e-6);
            assert_relative_eq!(forward.length(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(right.length(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn validate_rejects_broken_tuning() {
        let valid = Config::default();
        assert!(valid.validate().is_ok());

        let mut config = valid;
        config.move_speed = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveMoveSpeed(0.0))
        );

        let mut config = valid;
        config.gravity = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveGravity(_))
        ));

        let mut config = valid;
        config.fall_multiplier = 0.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::WeakGravityMultiplier(0.5))
        );

        let mut config = valid;
        config.climb_duration = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::EmptyClimbDuration));

        let mut config = valid;
        config.max_ledge_height = config.min_ledge_height;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLedgeWindow { .. })
        ));

        let mut config = valid;
        config.projectile_speed = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveProjectileSpeed(-1.0))
        );
    }
}
