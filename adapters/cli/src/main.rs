#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Pillow Siege session.
//!
//! The driver commissions every subsystem from one seed and difficulty,
//! marches a scripted player through the training yard at a fixed step, and
//! narrates the assault through the logger. Subsystems whose tuning fails
//! validation are logged and left out of the session instead of aborting it.

mod logging;
mod scene;

use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use glam::Vec2;
use pillow_siege_core::{
    notify_health_observer, Command, Difficulty, Event, Health, HealthObserver, HitTarget,
    InputSample, RNG_STREAM_PLACEMENT, RNG_STREAM_SPREAD,
};
use pillow_siege_system_bootstrap::{Bootstrap, SessionSettings};
use pillow_siege_system_combat::{Combat, Config as CombatConfig};
use pillow_siege_system_locomotion::{Config as LocomotionConfig, Locomotion};
use pillow_siege_system_wave_director::{Config as DirectorConfig, WaveDirector};
use pillow_siege_world::{apply, query, World};

use crate::scene::TrainingYard;

/// Headless Pillow Siege session driver.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Session seed shared by every subsystem stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Session length in seconds.
    #[arg(long, default_value_t = 120)]
    duration: u64,
    /// Difficulty tier.
    #[arg(long, value_enum, default_value = "normal")]
    difficulty: DifficultyArg,
    /// Frame tick rate in hertz.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=1000))]
    frame_hz: u32,
    /// Fixed tick rate in hertz.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fixed_hz: u32,
    /// Log per-spawn and stance detail.
    #[arg(short, long)]
    verbose: bool,
}

/// Difficulty tier as spelled on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    /// More player health, softer and slower waves.
    Easy,
    /// Baseline tuning.
    Normal,
    /// Less player health, harder and faster waves.
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

/// Entry point for the Pillow Siege command-line interface.
fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let difficulty = Difficulty::from(args.difficulty);
    let bootstrap = Bootstrap::new(SessionSettings {
        seed: args.seed,
        difficulty,
    });
    println!(
        "Pillow Siege: seed {}, {:?} difficulty, {} s session",
        args.seed, difficulty, args.duration
    );

    let locomotion_config = LocomotionConfig::default();
    let mut director_config = DirectorConfig {
        rng_seed: bootstrap.subsystem_seed(RNG_STREAM_PLACEMENT),
        ..DirectorConfig::default()
    };
    director_config.wave_interval = bootstrap.paced_interval(director_config.wave_interval);
    let combat_config = CombatConfig {
        rng_seed: bootstrap.subsystem_seed(RNG_STREAM_SPREAD),
        ..CombatConfig::default()
    };

    let mut locomotion = commission("locomotion", locomotion_config.validate(), || {
        Locomotion::new(locomotion_config)
    });
    let mut director = commission("wave director", director_config.validate(), || {
        WaveDirector::new(director_config)
    });
    let mut combat = commission("combat", combat_config.validate(), || {
        Combat::new(combat_config)
    });

    let mut world = World::new();
    let mut events = Vec::new();
    for command in bootstrap.opening_commands() {
        apply(&mut world, command, &mut events);
    }

    let scene = TrainingYard;
    let frame_dt = Duration::from_secs(1) / args.frame_hz;
    let fixed_dt = Duration::from_secs(1) / args.fixed_hz;
    let total_steps = args.duration * u64::from(args.frame_hz);

    let mut vitals = VitalsLog;
    let mut stats = SessionStats::default();
    let mut commands: Vec<Command> = Vec::new();
    let mut fixed_budget = Duration::ZERO;
    let mut last_stance = locomotion.as_ref().map(|system| system.stance());

    stats.absorb(&events);
    notify_health_observer(&events, &mut vitals);

    for step in 0..total_steps {
        // Systems consume the previous step's events before the arena moves.
        if let Some(director) = director.as_mut() {
            director.handle(&events, query::spawn_ring(&world), &mut commands);
        }
        if let Some(combat) = combat.as_mut() {
            let cannons = query::cannon_view(&world);
            let npcs = query::npc_view(&world);
            let player = query::player(&world);
            combat.handle(&events, &cannons, &npcs, &player, &mut commands);
        }
        if let Some(locomotion) = locomotion.as_mut() {
            locomotion.tick(&events, scripted_input(step), frame_dt, &scene, &mut commands);
            fixed_budget += frame_dt;
            while fixed_budget >= fixed_dt {
                fixed_budget -= fixed_dt;
                locomotion.fixed_tick(fixed_dt, &scene, &mut commands);
            }
        }

        events.clear();
        for command in commands.drain(..) {
            apply(&mut world, command, &mut events);
        }
        apply(&mut world, Command::Tick { dt: frame_dt }, &mut events);

        stats.absorb(&events);
        notify_health_observer(&events, &mut vitals);

        if let Some(locomotion) = locomotion.as_ref() {
            let stance = locomotion.stance();
            if last_stance != Some(stance) {
                log::debug!("stance changed to {stance:?} at {}", locomotion.position());
                last_stance = Some(stance);
            }
        }
    }

    let player = query::player(&world);
    log::info!(
        "session over: {} waves, {} cannons and {} drones fielded, {} drones downed",
        stats.waves,
        stats.cannons_fielded,
        stats.npcs_fielded,
        stats.npcs_downed
    );
    log::info!(
        "pillows thrown {}, player struck {} times, drones struck {} times, player {}/{} ({})",
        stats.pillows_thrown,
        stats.player_hits,
        stats.npc_hits,
        player.health.get(),
        player.max_health.get(),
        if player.alive { "standing" } else { "down" }
    );
}

/// Builds a subsystem when its tuning passes validation; otherwise logs the
/// rejection and leaves the subsystem out of the session.
fn commission<S, E>(name: &str, verdict: Result<(), E>, build: impl FnOnce() -> S) -> Option<S>
where
    E: fmt::Display,
{
    match verdict {
        Ok(()) => Some(build()),
        Err(error) => {
            log::error!("{name} disabled by invalid tuning: {error}");
            None
        }
    }
}

/// Scripted route through the training yard, tuned for the default 50 Hz
/// frame rate.
///
/// The body marches forward all session, which walks it off the pit edge and
/// into the ledge grab early on. It pulls the trigger a little slower than
/// the cooldown, hops periodically once past the yard, and sweeps left now
/// and then so the route wanders the open plain.
fn scripted_input(step: u64) -> InputSample {
    let fire_pressed = step % 30 == 0;
    let jump_pressed = step >= 600 && step % 300 == 0;
    let turn = if step >= 1000 && step % 700 < 80 {
        0.012
    } else {
        0.0
    };
    InputSample {
        move_axes: Vec2::new(0.0, 1.0),
        turn,
        jump_pressed,
        fire_pressed,
    }
}

/// Logs player vitals as the arena reports them.
struct VitalsLog;

impl HealthObserver for VitalsLog {
    fn health_changed(&mut self, current: Health, max: Health) {
        log::info!("player vitals {}/{}", current.get(), max.get());
    }

    fn died(&mut self) {
        log::warn!("player is down");
    }
}

/// Running tallies for the end-of-session summary.
#[derive(Default)]
struct SessionStats {
    waves: u32,
    cannons_fielded: u32,
    npcs_fielded: u32,
    npcs_downed: u32,
    pillows_thrown: u32,
    player_hits: u32,
    npc_hits: u32,
}

impl SessionStats {
    /// Folds one step's events into the tallies and narrates milestones.
    fn absorb(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted {
                    wave,
                    cannons_cleared,
                    npcs_cleared,
                } => {
                    self.waves = self.waves.max(wave.get());
                    log::info!(
                        "wave {} ({} cannons and {} drones cleared)",
                        wave.get(),
                        cannons_cleared,
                        npcs_cleared
                    );
                }
                Event::CannonSpawned { cannon, position } => {
                    self.cannons_fielded = self.cannons_fielded.saturating_add(1);
                    log::debug!("cannon {} deployed at {position}", cannon.get());
                }
                Event::NpcSpawned { npc, position } => {
                    self.npcs_fielded = self.npcs_fielded.saturating_add(1);
                    log::debug!("drone {} deployed at {position}", npc.get());
                }
                Event::NpcDestroyed { npc } => {
                    self.npcs_downed = self.npcs_downed.saturating_add(1);
                    log::debug!("drone {} downed", npc.get());
                }
                Event::ProjectileSpawned { .. } => {
                    self.pillows_thrown = self.pillows_thrown.saturating_add(1);
                }
                Event::ProjectileHit { target, .. } => match target {
                    HitTarget::Player => {
                        self.player_hits = self.player_hits.saturating_add(1);
                    }
                    HitTarget::Npc(npc) => {
                        self.npc_hits = self.npc_hits.saturating_add(1);
                        log::debug!("drone {} took a pillow", npc.get());
                    }
                },
                _ => {}
            }
        }
    }
}
