#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pillow Siege simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative arena, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the arena executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches. Collision geometry stays outside the simulation behind the
//! [`SceneProbe`] seam.

use std::time::Duration;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Commands that express all permissible arena mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the arena: spawn ring, projectile tuning, and player vitals.
    ConfigureArena {
        /// Complete arena configuration to install.
        config: ArenaConfig,
    },
    /// Signals that the session started and waves may begin counting down.
    StartAssault,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Opens a new wave: the previous population is destroyed before any
    /// spawn command of the new wave applies.
    BeginWave {
        /// One-based number of the wave that is starting.
        wave: WaveNumber,
    },
    /// Requests that a cannon be instantiated at the provided position.
    SpawnCannon {
        /// World-space position the cannon occupies.
        position: Vec3,
    },
    /// Requests that a hostile NPC be instantiated at the provided position.
    SpawnNpc {
        /// World-space position the NPC starts from.
        position: Vec3,
    },
    /// Overwrites the velocity an NPC travels with until re-steered.
    SteerNpc {
        /// Identifier of the NPC being steered.
        npc: NpcId,
        /// Velocity the NPC should travel with, in units per second.
        velocity: Vec3,
    },
    /// Launches a projectile from the provided muzzle position.
    FireProjectile {
        /// Entity responsible for the shot.
        source: ProjectileSource,
        /// World-space muzzle position the projectile spawns at.
        origin: Vec3,
        /// Initial velocity of the projectile in units per second.
        velocity: Vec3,
    },
    /// Mirrors the locomotion controller's pose into the arena so other
    /// systems observe a single authoritative player state.
    SyncPlayerPose {
        /// World-space position of the player's feet.
        position: Vec3,
        /// Current player velocity in units per second.
        velocity: Vec3,
        /// Whether ground classification currently reports support.
        grounded: bool,
    },
    /// Applies damage to the player, subject to the invincibility window.
    DamagePlayer {
        /// Amount of health to remove before clamping.
        amount: u32,
    },
    /// Restores player health, clamped to the configured maximum.
    HealPlayer {
        /// Amount of health to add before clamping.
        amount: u32,
    },
    /// Restores full health, clears invincibility, and re-enables control.
    ResetPlayerHealth,
    /// Applies damage to an NPC, destroying it when health reaches zero.
    DamageNpc {
        /// Identifier of the NPC taking damage.
        npc: NpcId,
        /// Amount of health to remove before clamping.
        amount: u32,
    },
}

/// Events broadcast by the arena after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the arena accepted a configuration.
    ArenaConfigured {
        /// Number of spawn anchors generated for the ring.
        anchors: u32,
    },
    /// Announces that the session started.
    AssaultStarted,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a wave opened and the prior population was replaced.
    WaveStarted {
        /// One-based number of the wave that started.
        wave: WaveNumber,
        /// Cannons removed while clearing the previous wave.
        cannons_cleared: u32,
        /// NPCs removed while clearing the previous wave.
        npcs_cleared: u32,
    },
    /// Confirms that a cannon was instantiated.
    CannonSpawned {
        /// Identifier assigned to the cannon by the arena.
        cannon: CannonId,
        /// World-space position the cannon occupies.
        position: Vec3,
    },
    /// Confirms that an NPC was instantiated.
    NpcSpawned {
        /// Identifier assigned to the NPC by the arena.
        npc: NpcId,
        /// World-space position the NPC starts from.
        position: Vec3,
    },
    /// Confirms that a cannon was destroyed.
    CannonDestroyed {
        /// Identifier of the destroyed cannon.
        cannon: CannonId,
    },
    /// Confirms that an NPC was destroyed.
    NpcDestroyed {
        /// Identifier of the destroyed NPC.
        npc: NpcId,
    },
    /// Reports that an NPC survived damage.
    NpcDamaged {
        /// Identifier of the damaged NPC.
        npc: NpcId,
        /// Health the NPC retains after the hit.
        remaining: Health,
    },
    /// Confirms that a projectile was launched.
    ProjectileSpawned {
        /// Identifier assigned to the projectile by the arena.
        projectile: ProjectileId,
        /// Entity responsible for the shot.
        source: ProjectileSource,
        /// World-space position the projectile spawned at.
        origin: Vec3,
        /// Initial velocity of the projectile in units per second.
        velocity: Vec3,
    },
    /// Reports that a projectile reached the end of its lifetime unscathed.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
    /// Reports that a projectile struck a target and despawned.
    ProjectileHit {
        /// Identifier of the projectile that hit.
        projectile: ProjectileId,
        /// Target the projectile struck.
        target: HitTarget,
    },
    /// Reports the knockback impulse a hostile projectile applied. The
    /// locomotion controller adds the impulse to its velocity directly.
    PlayerPushed {
        /// Velocity change in units per second.
        impulse: Vec3,
    },
    /// Reports the player's health after a change.
    PlayerHealthChanged {
        /// Health remaining after the change.
        current: Health,
        /// Configured health ceiling.
        max: Health,
    },
    /// Announces that the player's health reached zero.
    PlayerDied,
    /// Announces that player health was reset and control re-enabled.
    PlayerHealthReset,
}

/// Entity responsible for launching a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileSource {
    /// Launched by a wave cannon.
    Cannon(CannonId),
    /// Launched by a hostile NPC.
    Npc(NpcId),
    /// Launched by the player.
    Player,
}

impl ProjectileSource {
    /// Reports whether the projectile should harm the player on contact.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Cannon(_) | Self::Npc(_))
    }
}

/// Target a projectile collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTarget {
    /// The projectile struck the player.
    Player,
    /// The projectile struck the identified NPC.
    Npc(NpcId),
}

/// Unique identifier assigned to a cannon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CannonId(u32);

impl CannonId {
    /// Creates a new cannon identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a hostile NPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(u32);

impl NpcId {
    /// Creates a new NPC identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based wave counter. Wave numbers only ever grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a wave number with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The first wave of a session.
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// Retrieves the numeric representation of the wave number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Hit points carried by the player or an NPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a health value with the provided amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Removes the provided amount, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Adds the provided amount, clamping at the supplied ceiling.
    #[must_use]
    pub fn saturating_add_clamped(self, amount: u32, max: Health) -> Self {
        Self(self.0.saturating_add(amount).min(max.0))
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// One frame's worth of player intent, sampled by the embedding loop.
///
/// Axes are normalized to `[-1, 1]`; button fields are edges that stay true
/// for exactly the frame the press happened on.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputSample {
    /// Movement intent relative to facing: `x` strafes right, `y` moves
    /// forward.
    pub move_axes: Vec2,
    /// Yaw delta for this frame in radians, positive turning right.
    pub turn: f32,
    /// True on the frame the jump button was pressed.
    pub jump_pressed: bool,
    /// True on the frame the fire button was pressed.
    pub fire_pressed: bool,
}

/// Result of a successful raycast against scene collision geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space point where the ray met the surface.
    pub point: Vec3,
    /// Unit surface normal at the hit point.
    pub normal: Vec3,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
}

/// Collision query seam the locomotion controller probes through.
///
/// The simulation never owns collision geometry; embedders supply it. Any
/// closure with the matching shape implements the trait, which keeps test
/// scenes as simple as a closure literal.
pub trait SceneProbe {
    /// Casts a ray and reports the nearest hit within `max_distance`, if any.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

impl<F> SceneProbe for F
where
    F: Fn(Vec3, Vec3, f32) -> Option<RayHit>,
{
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self(origin, direction, max_distance)
    }
}

/// Layout of the spawn-anchor ring generated once at configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRingConfig {
    /// World-space center the ring is laid out around.
    pub origin: Vec3,
    /// Radius of the anchor circle in world units.
    pub radius: f32,
    /// Number of anchors distributed around the circle.
    pub anchor_count: u32,
    /// Height of the ring plane above the origin.
    pub height_offset: f32,
    /// Uniform jitter applied independently to each anchor's x and z,
    /// drawn from `[-radius_jitter, radius_jitter)`.
    pub radius_jitter: f32,
    /// Uniform jitter added to each anchor's height, drawn from
    /// `[0, height_jitter)`.
    pub height_jitter: f32,
}

impl Default for SpawnRingConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            radius: 15.0,
            anchor_count: 10,
            height_offset: 2.0,
            radius_jitter: 2.0,
            height_jitter: 1.0,
        }
    }
}

/// Ballistics and contact tuning shared by every projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// Damage dealt to the player by cannon and NPC projectiles.
    pub hostile_damage: u32,
    /// Damage dealt to NPCs by player projectiles.
    pub player_damage: u32,
    /// Knockback applied to the player on a hostile hit, in units per second.
    pub push_strength: f32,
    /// Downward acceleration applied to projectiles, in units per second².
    pub gravity: f32,
    /// Lifetime of cannon projectiles.
    pub cannon_lifetime: Duration,
    /// Lifetime of NPC projectiles.
    pub npc_lifetime: Duration,
    /// Lifetime of player projectiles.
    pub player_lifetime: Duration,
    /// Center-to-center contact distance for a hit.
    pub hit_radius: f32,
}

impl ProjectileTuning {
    /// Lifetime granted to a projectile launched by the provided source.
    #[must_use]
    pub const fn lifetime_for(&self, source: ProjectileSource) -> Duration {
        match source {
            ProjectileSource::Cannon(_) => self.cannon_lifetime,
            ProjectileSource::Npc(_) => self.npc_lifetime,
            ProjectileSource::Player => self.player_lifetime,
        }
    }
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            hostile_damage: 10,
            player_damage: 10,
            push_strength: 10.0,
            gravity: 9.81,
            cannon_lifetime: Duration::from_secs(10),
            npc_lifetime: Duration::from_secs(5),
            player_lifetime: Duration::from_secs(5),
            hit_radius: 0.75,
        }
    }
}

/// Complete arena configuration installed by [`Command::ConfigureArena`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Seed for the arena's deterministic random stream (ring jitter).
    pub rng_seed: u64,
    /// Spawn-anchor ring layout.
    pub spawn_ring: SpawnRingConfig,
    /// Projectile ballistics and contact tuning.
    pub projectiles: ProjectileTuning,
    /// Cooldown between cannon shots. Freshly spawned cannons wait one full
    /// cooldown before their first shot.
    pub cannon_fire_interval: Duration,
    /// Cooldown between NPC shots. Freshly spawned NPCs may fire at once.
    pub npc_fire_interval: Duration,
    /// Health granted to each NPC at spawn.
    pub npc_health: Health,
    /// Health ceiling granted to the player.
    pub player_max_health: Health,
    /// Duration of the post-hit invincibility window.
    pub invincibility: Duration,
    /// World-space position the player's feet start at.
    pub player_spawn: Vec3,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0,
            spawn_ring: SpawnRingConfig::default(),
            projectiles: ProjectileTuning::default(),
            cannon_fire_interval: Duration::from_millis(500),
            npc_fire_interval: Duration::from_secs(3),
            npc_health: Health::new(25),
            player_max_health: Health::new(100),
            invincibility: Duration::from_secs(1),
            player_spawn: Vec3::ZERO,
        }
    }
}

/// Immutable representation of a single cannon's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CannonSnapshot {
    /// Identifier allocated to the cannon by the arena.
    pub id: CannonId,
    /// World-space position the cannon occupies.
    pub position: Vec3,
    /// Time remaining until the cannon may fire again.
    pub ready_in: Duration,
    /// Wave the cannon was spawned for.
    pub wave: WaveNumber,
}

/// Read-only snapshot describing all cannons in the arena.
#[derive(Clone, Debug, Default)]
pub struct CannonView {
    snapshots: Vec<CannonSnapshot>,
}

impl CannonView {
    /// Creates a new cannon view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CannonSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured cannon snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &CannonSnapshot> {
        self.snapshots.iter()
    }

    /// Number of cannons captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no cannons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CannonSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single NPC's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NpcSnapshot {
    /// Identifier allocated to the NPC by the arena.
    pub id: NpcId,
    /// World-space position of the NPC.
    pub position: Vec3,
    /// Velocity the NPC currently travels with.
    pub velocity: Vec3,
    /// Health the NPC retains.
    pub health: Health,
    /// Time remaining until the NPC may fire again.
    pub ready_in: Duration,
    /// Wave the NPC was spawned for.
    pub wave: WaveNumber,
}

/// Read-only snapshot describing all NPCs in the arena.
#[derive(Clone, Debug, Default)]
pub struct NpcView {
    snapshots: Vec<NpcSnapshot>,
}

impl NpcView {
    /// Creates a new NPC view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<NpcSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured NPC snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &NpcSnapshot> {
        self.snapshots.iter()
    }

    /// Number of NPCs captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no NPCs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<NpcSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the arena.
    pub id: ProjectileId,
    /// Entity responsible for the shot.
    pub source: ProjectileSource,
    /// World-space position of the projectile.
    pub position: Vec3,
    /// Velocity the projectile travels with.
    pub velocity: Vec3,
    /// Time remaining before the projectile expires.
    pub ttl: Duration,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// World-space position of the player's feet.
    pub position: Vec3,
    /// Velocity mirrored from the locomotion controller.
    pub velocity: Vec3,
    /// Whether ground classification reported support at the last sync.
    pub grounded: bool,
    /// Health the player retains.
    pub health: Health,
    /// Configured health ceiling.
    pub max_health: Health,
    /// Time remaining in the invincibility window.
    pub invincible_for: Duration,
    /// Whether the player is alive and controllable.
    pub alive: bool,
}

/// Read-only view of the spawn-anchor ring.
///
/// Lookups never fail: per the spawner's error contract an invalid index or
/// an empty ring logs a warning and falls back to the ring origin.
#[derive(Clone, Copy, Debug)]
pub struct SpawnRingView<'a> {
    anchors: &'a [Vec3],
    origin: Vec3,
}

impl<'a> SpawnRingView<'a> {
    /// Captures a new ring view backed by the provided anchor slice.
    #[must_use]
    pub fn new(anchors: &'a [Vec3], origin: Vec3) -> Self {
        Self { anchors, origin }
    }

    /// Center the ring was generated around.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Number of anchors in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Reports whether the ring holds no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Returns the anchor at `index`, if it exists.
    #[must_use]
    pub fn anchor(&self, index: usize) -> Option<Vec3> {
        self.anchors.get(index).copied()
    }

    /// Returns the anchor at `index`, falling back to the ring origin when
    /// the index is out of range.
    #[must_use]
    pub fn anchor_or_origin(&self, index: usize) -> Vec3 {
        match self.anchor(index) {
            Some(anchor) => anchor,
            None => {
                log::warn!("spawn ring: invalid anchor index {index}, using origin");
                self.origin
            }
        }
    }

    /// Draws a uniformly random anchor, with replacement. An empty ring logs
    /// a warning and yields the origin.
    #[must_use]
    pub fn random_anchor(&self, rng: &mut SplitMix64) -> Vec3 {
        if self.anchors.is_empty() {
            log::warn!("spawn ring: no anchors generated, using origin");
            return self.origin;
        }
        self.anchors[rng.next_index(self.anchors.len())]
    }
}

/// Session difficulty selected before commissioning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// More player health, softer and slower waves.
    Easy,
    /// Baseline tuning.
    #[default]
    Normal,
    /// Less player health, harder and faster waves.
    Hard,
}

impl Difficulty {
    /// Scale applied to the player's maximum health.
    #[must_use]
    pub const fn player_health_multiplier(self) -> f32 {
        match self {
            Self::Easy => 1.5,
            Self::Normal => 1.0,
            Self::Hard => 0.5,
        }
    }

    /// Scale applied to damage dealt by hostile projectiles.
    #[must_use]
    pub const fn hostile_damage_multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.7,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
        }
    }

    /// Scale applied to wave pacing; intervals divide by this value.
    #[must_use]
    pub const fn wave_pace_multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.7,
            Self::Normal => 1.0,
            Self::Hard => 1.3,
        }
    }
}

/// Typed notifications mirroring the player-vitals events.
///
/// The surrounding presentation layer registers an observer; dispatch is
/// synchronous and happens in event order.
pub trait HealthObserver {
    /// Invoked whenever the player's health changes.
    fn health_changed(&mut self, current: Health, max: Health);
    /// Invoked when the player's health reaches zero.
    fn died(&mut self);
}

/// Routes player-vitals events to an observer, in order.
pub fn notify_health_observer<O>(events: &[Event], observer: &mut O)
where
    O: HealthObserver + ?Sized,
{
    for event in events {
        match event {
            Event::PlayerHealthChanged { current, max } => {
                observer.health_changed(*current, *max);
            }
            Event::PlayerDied => observer.died(),
            _ => {}
        }
    }
}

/// Stream label for the arena's spawn ring seed.
pub const RNG_STREAM_ARENA: &str = "arena";
/// Stream label for unit placement draws within a wave.
pub const RNG_STREAM_PLACEMENT: &str = "placement";
/// Stream label for cannon aim spread draws.
pub const RNG_STREAM_SPREAD: &str = "spread";

/// Deterministic pseudo-random generator used across the simulation.
///
/// Every consumer owns its own stream, so system ordering never perturbs
/// another system's draws.
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    /// Creates a generator from the provided seed. A zero seed is remapped
    /// to a fixed non-zero constant so the stream never degenerates.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state: seed }
    }

    /// Produces the next 64-bit value in the stream.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Produces a uniform value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        let value = self.next_u64() >> 11;
        (value as f64) * SCALE
    }

    /// Produces a uniform `f32` in the half-open range `[min, max)`; returns
    /// `min` when the bounds collapse.
    pub fn next_range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        let span = f64::from(max) - f64::from(min);
        let value = (f64::from(min) + self.next_unit() * span) as f32;
        // The f64 draw lies below max, but rounding to f32 can land on it.
        if value >= max {
            return max.next_down();
        }
        value.max(min)
    }

    /// Produces a uniform index in `[0, len)`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index requires a non-empty range");
        usize::try_from(self.next_u64() % (len as u64)).unwrap_or(0)
    }
}
