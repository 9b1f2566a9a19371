#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives hostile fire control and drone pursuit.
//!
//! Each tick the system reads the current cannon and drone views plus the
//! player snapshot and emits steering and fire commands. Cannons shoot a
//! jittered horizontal shot whenever their cooldown view reads zero; drones
//! chase the player in full 3D, brake inside their stop distance, and shoot
//! whenever the player sits inside their range. Cooldown bookkeeping stays
//! in the arena, so the system itself holds nothing but tuning and its
//! spread random stream.

use std::{error::Error, fmt};

use glam::Vec3;
use pillow_siege_core::{
    CannonId, CannonView, Command, Event, NpcId, NpcView, PlayerSnapshot, ProjectileSource,
    SplitMix64,
};

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Muzzle speed of cannon shots in units per second.
    pub cannon_projectile_speed: f32,
    /// Half-angle of the cannon's aim jitter cone, in radians.
    pub cannon_spread: f32,
    /// Cannon muzzle offset along the horizontal aim.
    pub cannon_muzzle_reach: f32,
    /// Drone pursuit speed in units per second.
    pub npc_seek_speed: f32,
    /// Drones stop closing once the player is within this distance.
    pub npc_stop_distance: f32,
    /// Drones shoot only when the player is within this distance.
    pub npc_fire_range: f32,
    /// Muzzle speed of drone shots in units per second.
    pub npc_projectile_speed: f32,
    /// Height of the drone muzzle above its center.
    pub npc_muzzle_height: f32,
    /// Forward offset of the drone muzzle toward the player.
    pub npc_muzzle_reach: f32,
    /// Seed for the aim jitter stream.
    pub rng_seed: u64,
}

impl Config {
    /// Checks the tuning for values the system cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.cannon_projectile_speed) {
            return Err(ConfigError::NonPositiveCannonSpeed(
                self.cannon_projectile_speed,
            ));
        }
        if !self.cannon_spread.is_finite() || self.cannon_spread < 0.0 {
            return Err(ConfigError::NegativeCannonSpread(self.cannon_spread));
        }
        if !positive(self.npc_seek_speed) {
            return Err(ConfigError::NonPositiveSeekSpeed(self.npc_seek_speed));
        }
        if !self.npc_stop_distance.is_finite() || self.npc_stop_distance < 0.0 {
            return Err(ConfigError::NegativeStopDistance(self.npc_stop_distance));
        }
        if !self.npc_fire_range.is_finite() || self.npc_fire_range < 0.0 {
            return Err(ConfigError::NegativeFireRange(self.npc_fire_range));
        }
        if !positive(self.npc_projectile_speed) {
            return Err(ConfigError::NonPositiveNpcProjectileSpeed(
                self.npc_projectile_speed,
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cannon_projectile_speed: 15.0,
            cannon_spread: 5.0_f32.to_radians(),
            cannon_muzzle_reach: 1.0,
            npc_seek_speed: 3.0,
            npc_stop_distance: 10.0,
            npc_fire_range: 15.0,
            npc_projectile_speed: 20.0,
            npc_muzzle_height: 1.0,
            npc_muzzle_reach: 0.5,
            rng_seed: 0,
        }
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Errors reported by [`Config::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Cannon projectile speed must be a positive, finite value.
    NonPositiveCannonSpeed(f32),
    /// Cannon spread must be a finite, non-negative angle.
    NegativeCannonSpread(f32),
    /// Drone seek speed must be a positive, finite value.
    NonPositiveSeekSpeed(f32),
    /// Drone stop distance must be a finite, non-negative distance.
    NegativeStopDistance(f32),
    /// Drone fire range must be a finite, non-negative distance.
    NegativeFireRange(f32),
    /// Drone projectile speed must be a positive, finite value.
    NonPositiveNpcProjectileSpeed(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveCannonSpeed(value) => {
                write!(f, "cannon projectile speed {value} must be positive")
            }
            Self::NegativeCannonSpread(value) => {
                write!(f, "cannon spread {value} must not be negative")
            }
            Self::NonPositiveSeekSpeed(value) => {
                write!(f, "drone seek speed {value} must be positive")
            }
            Self::NegativeStopDistance(value) => {
                write!(f, "drone stop distance {value} must not be negative")
            }
            Self::NegativeFireRange(value) => {
                write!(f, "drone fire range {value} must not be negative")
            }
            Self::NonPositiveNpcProjectileSpeed(value) => {
                write!(f, "drone projectile speed {value} must be positive")
            }
        }
    }
}

impl Error for ConfigError {}

/// Pure system that emits steering and fire commands for hostile units.
#[derive(Debug)]
pub struct Combat {
    config: Config,
    rng: SplitMix64,
}

impl Combat {
    /// Creates a new combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        debug_assert!(config.validate().is_ok(), "combat config must be valid");
        Self {
            rng: SplitMix64::new(config.rng_seed),
            config,
        }
    }

    /// Runs one firing pass over the hostile population. Does nothing unless
    /// the event batch carries an advanced-time announcement, so repeated
    /// deliveries of the same batch cannot double-fire.
    pub fn handle(
        &mut self,
        events: &[Event],
        cannons: &CannonView,
        npcs: &NpcView,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) {
        let time_advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !time_advanced {
            return;
        }

        for cannon in cannons.iter() {
            if !cannon.ready_in.is_zero() {
                continue;
            }
            self.fire_cannon(cannon.id, cannon.position, player.position, out);
        }

        for npc in npcs.iter() {
            let to_player = player.position - npc.position;
            let distance = to_player.length();

            let velocity = if distance > self.config.npc_stop_distance {
                to_player.normalize_or_zero() * self.config.npc_seek_speed
            } else {
                Vec3::ZERO
            };
            out.push(Command::SteerNpc {
                npc: npc.id,
                velocity,
            });

            if distance <= self.config.npc_fire_range && npc.ready_in.is_zero() {
                self.fire_npc(npc.id, npc.position, player.position, out);
            }
        }
    }

    /// Cannons aim flat at the player and jitter the shot by up to the
    /// spread angle in pitch and yaw. A player straight overhead leaves no
    /// horizontal aim, so the shot is skipped.
    fn fire_cannon(&mut self, id: CannonId, position: Vec3, target: Vec3, out: &mut Vec<Command>) {
        let mut aim = target - position;
        aim.y = 0.0;
        let forward = aim.normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }

        let spread = self.config.cannon_spread;
        let pitch = self.rng.next_range_f32(-spread, spread);
        let yaw = forward.x.atan2(forward.z) + self.rng.next_range_f32(-spread, spread);
        let direction = Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos());

        out.push(Command::FireProjectile {
            source: ProjectileSource::Cannon(id),
            origin: position + forward * self.config.cannon_muzzle_reach,
            velocity: direction * self.config.cannon_projectile_speed,
        });
    }

    fn fire_npc(&mut self, id: NpcId, position: Vec3, target: Vec3, out: &mut Vec<Command>) {
        let facing = Vec3::new(target.x - position.x, 0.0, target.z - position.z)
            .normalize_or_zero();
        let muzzle = position
            + Vec3::Y * self.config.npc_muzzle_height
            + facing * self.config.npc_muzzle_reach;
        let aim = (target - muzzle).normalize_or_zero();
        if aim == Vec3::ZERO {
            return;
        }

        out.push(Command::FireProjectile {
            source: ProjectileSource::Npc(id),
            origin: muzzle,
            velocity: aim * self.config.npc_projectile_speed,
        });
    }
}
