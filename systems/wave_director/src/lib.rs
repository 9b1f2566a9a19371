#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that schedules assault waves.
//!
//! The director sits idle until the assault starts, counts down a startup
//! delay, then launches a wave every interval. Each launch emits
//! [`Command::BeginWave`] followed by the wave's spawn commands, with every
//! placement drawn from a wave-scoped random stream so identical seeds
//! replay identical assaults regardless of tick sizes.

use std::{error::Error, fmt, time::Duration};

use glam::Vec3;
use pillow_siege_core::{
    Command, Event, SpawnRingView, SplitMix64, WaveNumber, RNG_STREAM_PLACEMENT,
};
use sha2::{Digest, Sha256};

const TAU: f32 = std::f32::consts::TAU;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Delay between the assault starting and the first wave.
    pub startup_delay: Duration,
    /// Pause between consecutive waves.
    pub wave_interval: Duration,
    /// Cannons fielded by the first wave.
    pub starting_cannons: u32,
    /// Additional cannons fielded per wave after the first.
    pub cannons_per_wave: u32,
    /// First wave that fields hunting drones.
    pub npc_unlock_wave: u32,
    /// Drones added per wave from the unlock onward.
    pub npcs_per_wave: u32,
    /// Horizontal distance between a unit and its ring anchor.
    pub placement_radius: f32,
    /// Units spawn at least this far above their anchor.
    pub min_height: f32,
    /// Units spawn below this height above their anchor.
    pub max_height: f32,
    /// Seed all wave-scoped random streams derive from.
    pub rng_seed: u64,
}

impl Config {
    /// Checks the tuning for values the director cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wave_interval.is_zero() {
            return Err(ConfigError::EmptyWaveInterval);
        }
        if !self.placement_radius.is_finite() || self.placement_radius < 0.0 {
            return Err(ConfigError::NegativePlacementRadius(self.placement_radius));
        }
        if !self.min_height.is_finite()
            || !self.max_height.is_finite()
            || self.min_height < 0.0
            || self.max_height < self.min_height
        {
            return Err(ConfigError::InvalidHeightWindow {
                min: self.min_height,
                max: self.max_height,
            });
        }
        if self.npc_unlock_wave == 0 {
            return Err(ConfigError::NpcUnlockBeforeFirstWave);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(2),
            wave_interval: Duration::from_secs(30),
            starting_cannons: 1,
            cannons_per_wave: 1,
            npc_unlock_wave: 5,
            npcs_per_wave: 1,
            placement_radius: 10.0,
            min_height: 0.0,
            max_height: 5.0,
            rng_seed: 0,
        }
    }
}

/// Errors reported by [`Config::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A zero wave interval would launch waves without end.
    EmptyWaveInterval,
    /// Placement radius must be a finite, non-negative distance.
    NegativePlacementRadius(f32),
    /// The spawn height window must rise from a non-negative base.
    InvalidHeightWindow {
        /// Lower edge of the rejected window.
        min: f32,
        /// Upper edge of the rejected window.
        max: f32,
    },
    /// Wave numbering starts at one, so the drone unlock must too.
    NpcUnlockBeforeFirstWave,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWaveInterval => write!(f, "wave interval must not be zero"),
            Self::NegativePlacementRadius(value) => {
                write!(f, "placement radius {value} must not be negative")
            }
            Self::InvalidHeightWindow { min, max } => {
                write!(
                    f,
                    "spawn height window [{min}, {max}) must rise from a non-negative base"
                )
            }
            Self::NpcUnlockBeforeFirstWave => {
                write!(f, "npc unlock wave must be at least one")
            }
        }
    }
}

impl Error for ConfigError {}

/// Pure system that turns elapsed time into wave launches.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    phase: Phase,
    next_wave: WaveNumber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending { remaining: Duration },
}

impl WaveDirector {
    /// Creates a new director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        debug_assert!(config.validate().is_ok(), "director config must be valid");
        Self {
            config,
            phase: Phase::Idle,
            next_wave: WaveNumber::first(),
        }
    }

    /// Consumes simulation events and appends launch commands for every wave
    /// whose deadline passed during the advanced time.
    pub fn handle(&mut self, events: &[Event], ring: SpawnRingView<'_>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::AssaultStarted => {
                    // A repeated start announcement never rewinds the clock.
                    if self.phase == Phase::Idle {
                        self.phase = Phase::Pending {
                            remaining: self.config.startup_delay,
                        };
                    }
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, ring, out),
                _ => {}
            }
        }
    }

    /// Time left until the next wave launches, when one is scheduled.
    #[must_use]
    pub fn time_until_wave(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pending { remaining } => Some(remaining),
        }
    }

    /// Number of the next wave to launch.
    #[must_use]
    pub const fn next_wave(&self) -> WaveNumber {
        self.next_wave
    }

    /// Drains the advanced time, launching one wave per elapsed deadline so
    /// a single oversized step cannot skip waves.
    fn advance(&mut self, dt: Duration, ring: SpawnRingView<'_>, out: &mut Vec<Command>) {
        let mut budget = dt;
        while let Phase::Pending { remaining } = &mut self.phase {
            if *remaining > budget {
                *remaining -= budget;
                break;
            }
            budget -= *remaining;
            let wave = self.next_wave;
            self.next_wave = wave.next();
            self.phase = Phase::Pending {
                remaining: self.config.wave_interval,
            };
            self.launch(wave, ring, out);
        }
    }

    fn launch(&self, wave: WaveNumber, ring: SpawnRingView<'_>, out: &mut Vec<Command>) {
        out.push(Command::BeginWave { wave });

        let placement_seed =
            derive_labeled_seed(derive_wave_seed(self.config.rng_seed, wave), RNG_STREAM_PLACEMENT);
        let mut rng = SplitMix64::new(placement_seed);

        for _ in 0..self.cannon_count(wave) {
            out.push(Command::SpawnCannon {
                position: self.place_unit(ring, &mut rng),
            });
        }
        let npcs = self.npc_count(wave);
        if npcs == 0 && wave.get() >= self.config.npc_unlock_wave {
            log::warn!(
                "drone loadout is empty, skipping drone spawns for wave {}",
                wave.get()
            );
        }
        for _ in 0..npcs {
            out.push(Command::SpawnNpc {
                position: self.place_unit(ring, &mut rng),
            });
        }
    }

    fn cannon_count(&self, wave: WaveNumber) -> u32 {
        let growth = self
            .config
            .cannons_per_wave
            .saturating_mul(wave.get().saturating_sub(1));
        self.config.starting_cannons.saturating_add(growth)
    }

    fn npc_count(&self, wave: WaveNumber) -> u32 {
        if wave.get() < self.config.npc_unlock_wave {
            return 0;
        }
        let waves_since_unlock = wave.get() - self.config.npc_unlock_wave;
        self.config
            .npcs_per_wave
            .saturating_mul(waves_since_unlock.saturating_add(1))
    }

    /// One placement consumes three draws: anchor pick, orbit angle, lift.
    fn place_unit(&self, ring: SpawnRingView<'_>, rng: &mut SplitMix64) -> Vec3 {
        let anchor = ring.random_anchor(rng);
        let angle = rng.next_range_f32(0.0, TAU);
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * self.config.placement_radius;
        let lift = rng.next_range_f32(self.config.min_height, self.config.max_height);
        anchor + offset + Vec3::Y * lift
    }
}

fn derive_wave_seed(global_seed: u64, wave: WaveNumber) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.get().to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
