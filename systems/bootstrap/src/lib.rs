#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that commissions a Pillow Siege session.
//!
//! Turns the session settings picked on the menu, a seed and a difficulty,
//! into the concrete numbers the rest of the simulation runs on: the
//! difficulty-scaled arena configuration, per-subsystem random seeds, the
//! paced wave interval, and the opening command batch.

use std::time::Duration;

use pillow_siege_core::{ArenaConfig, Command, Difficulty, Health, RNG_STREAM_ARENA};
use sha2::{Digest, Sha256};

/// Choices made before a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Seed every subsystem stream derives from.
    pub seed: u64,
    /// Difficulty tier scaling vitals, damage, and wave pace.
    pub difficulty: Difficulty,
}

/// Produces the configuration a session runs on.
#[derive(Clone, Copy, Debug)]
pub struct Bootstrap {
    settings: SessionSettings,
}

impl Bootstrap {
    /// Creates a bootstrap for the supplied session settings.
    #[must_use]
    pub const fn new(settings: SessionSettings) -> Self {
        Self { settings }
    }

    /// Arena configuration with the difficulty applied: player vitals scale
    /// with the tier, hostile pillows hit softer or harder, and the spawn
    /// ring draws from a session-derived seed.
    #[must_use]
    pub fn arena_config(&self) -> ArenaConfig {
        let difficulty = self.settings.difficulty;
        let mut config = ArenaConfig {
            rng_seed: self.subsystem_seed(RNG_STREAM_ARENA),
            ..ArenaConfig::default()
        };
        config.player_max_health = scale_health(
            config.player_max_health,
            difficulty.player_health_multiplier(),
        );
        config.projectiles.hostile_damage = scale(
            config.projectiles.hostile_damage,
            difficulty.hostile_damage_multiplier(),
        );
        config
    }

    /// Derives a named subsystem seed from the session seed.
    #[must_use]
    pub fn subsystem_seed(&self, stream: &str) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.settings.seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        let digest = hasher.finalize();
        let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
        u64::from_le_bytes(bytes)
    }

    /// Applies the wave pace to a base interval. Harder tiers launch waves
    /// faster, so the interval shrinks as the multiplier grows.
    #[must_use]
    pub fn paced_interval(&self, base: Duration) -> Duration {
        base.div_f32(self.settings.difficulty.wave_pace_multiplier())
    }

    /// Command batch that brings a fresh arena into the configured session.
    #[must_use]
    pub fn opening_commands(&self) -> Vec<Command> {
        vec![
            Command::ConfigureArena {
                config: self.arena_config(),
            },
            Command::StartAssault,
        ]
    }

    /// Settings the session was commissioned with.
    #[must_use]
    pub const fn settings(&self) -> SessionSettings {
        self.settings
    }
}

fn scale_health(base: Health, factor: f32) -> Health {
    Health::new(scale(base.get(), factor))
}

fn scale(base: u32, factor: f32) -> u32 {
    (f64::from(base) * f64::from(factor)).round() as u32
}
