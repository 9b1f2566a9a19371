#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state for Pillow Siege.
//!
//! The [`World`] owns the hostile population, projectiles in flight, the
//! spawn-anchor ring, and the player's vitals and mirrored pose. All
//! mutation flows through [`apply`]; systems and adapters read back through
//! [`query`].

use std::time::Duration;

use glam::Vec3;
use pillow_siege_core::{
    ArenaConfig, CannonId, Command, Event, Health, HitTarget, NpcId, ProjectileId,
    ProjectileSource, SplitMix64, WaveNumber,
};

mod spawn_ring;

/// Height above the feet position used as the player's contact point for
/// projectile hits and knockback direction.
const PLAYER_CONTACT_HEIGHT: f32 = 1.0;

/// Represents the authoritative Pillow Siege arena state.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    spawn_anchors: Vec<Vec3>,
    assault_started: bool,
    wave: Option<WaveNumber>,
    cannons: Vec<Cannon>,
    npcs: Vec<Npc>,
    projectiles: Vec<Projectile>,
    next_cannon_id: u32,
    next_npc_id: u32,
    next_projectile_id: u32,
    player: PlayerState,
}

impl World {
    /// Creates a new arena configured with default tuning.
    #[must_use]
    pub fn new() -> Self {
        let config = ArenaConfig::default();
        let mut world = Self {
            spawn_anchors: Vec::new(),
            assault_started: false,
            wave: None,
            cannons: Vec::new(),
            npcs: Vec::new(),
            projectiles: Vec::new(),
            next_cannon_id: 0,
            next_npc_id: 0,
            next_projectile_id: 0,
            player: PlayerState::spawned_at(config.player_spawn, config.player_max_health),
            config,
        };
        world.install(world.config);
        world
    }

    fn install(&mut self, config: ArenaConfig) {
        let mut rng = SplitMix64::new(config.rng_seed);
        self.spawn_anchors = spawn_ring::generate_anchors(&config.spawn_ring, &mut rng);
        self.cannons.clear();
        self.npcs.clear();
        self.projectiles.clear();
        self.next_cannon_id = 0;
        self.next_npc_id = 0;
        self.next_projectile_id = 0;
        self.wave = None;
        self.assault_started = false;
        self.player = PlayerState::spawned_at(config.player_spawn, config.player_max_health);
        self.config = config;
    }

    fn allocate_cannon_id(&mut self) -> CannonId {
        let id = CannonId::new(self.next_cannon_id);
        self.next_cannon_id = self.next_cannon_id.saturating_add(1);
        id
    }

    fn allocate_npc_id(&mut self) -> NpcId {
        let id = NpcId::new(self.next_npc_id);
        self.next_npc_id = self.next_npc_id.saturating_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        id
    }

    fn npc_index(&self, id: NpcId) -> Option<usize> {
        self.npcs.iter().position(|npc| npc.id == id)
    }

    fn player_contact_point(&self) -> Vec3 {
        self.player.position + Vec3::new(0.0, PLAYER_CONTACT_HEIGHT, 0.0)
    }

    /// Marks the shooter's cooldown spent. Returns false when the source no
    /// longer exists, which silently drops the stale command.
    fn acknowledge_shot(&mut self, source: ProjectileSource) -> bool {
        match source {
            ProjectileSource::Cannon(id) => {
                match self.cannons.iter_mut().find(|cannon| cannon.id == id) {
                    Some(cannon) => {
                        cannon.ready_in = self.config.cannon_fire_interval;
                        true
                    }
                    None => false,
                }
            }
            ProjectileSource::Npc(id) => match self.npcs.iter_mut().find(|npc| npc.id == id) {
                Some(npc) => {
                    npc.ready_in = self.config.npc_fire_interval;
                    true
                }
                None => false,
            },
            ProjectileSource::Player => self.player.alive,
        }
    }

    fn damage_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if !self.player.alive || !self.player.invincible_for.is_zero() {
            return;
        }

        self.player.health = self.player.health.saturating_sub(amount);
        out_events.push(Event::PlayerHealthChanged {
            current: self.player.health,
            max: self.player.max_health,
        });

        if self.player.health.is_zero() {
            self.player.alive = false;
            out_events.push(Event::PlayerDied);
        } else {
            self.player.invincible_for = self.config.invincibility;
        }
    }

    /// Knockback points from the projectile toward the player's contact
    /// point, with the vertical component pinned to 0.5 before scaling.
    fn push_player(&mut self, from: Vec3, out_events: &mut Vec<Event>) {
        let mut direction = (self.player_contact_point() - from).normalize_or_zero();
        direction.y = 0.5;
        out_events.push(Event::PlayerPushed {
            impulse: direction * self.config.projectiles.push_strength,
        });
    }

    fn contacted_npc(&self, position: Vec3, hit_radius: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, npc) in self.npcs.iter().enumerate() {
            let distance = npc.position.distance(position);
            if distance <= hit_radius {
                let closer = best.map_or(true, |(_, closest)| distance < closest);
                if closer {
                    best = Some((index, distance));
                }
            }
        }
        best.map(|(index, _)| index)
    }

    fn damage_npc_at(&mut self, index: usize, amount: u32, out_events: &mut Vec<Event>) {
        let npc = &mut self.npcs[index];
        npc.health = npc.health.saturating_sub(amount);
        if npc.health.is_zero() {
            out_events.push(Event::NpcDestroyed { npc: npc.id });
            let _ = self.npcs.remove(index);
        } else {
            out_events.push(Event::NpcDamaged {
                npc: npc.id,
                remaining: npc.health,
            });
        }
    }

    fn step_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt_secs = dt.as_secs_f32();
        let tuning = self.config.projectiles;

        let mut index = 0;
        while index < self.projectiles.len() {
            {
                let projectile = &mut self.projectiles[index];
                projectile.velocity.y -= tuning.gravity * dt_secs;
                projectile.position += projectile.velocity * dt_secs;
            }
            let (id, source, position) = {
                let projectile = &self.projectiles[index];
                (projectile.id, projectile.source, projectile.position)
            };

            if source.is_hostile() {
                if position.distance(self.player_contact_point()) <= tuning.hit_radius {
                    out_events.push(Event::ProjectileHit {
                        projectile: id,
                        target: HitTarget::Player,
                    });
                    self.push_player(position, out_events);
                    self.damage_player(tuning.hostile_damage, out_events);
                    let _ = self.projectiles.remove(index);
                    continue;
                }
            } else if let Some(npc_index) = self.contacted_npc(position, tuning.hit_radius) {
                let npc = self.npcs[npc_index].id;
                out_events.push(Event::ProjectileHit {
                    projectile: id,
                    target: HitTarget::Npc(npc),
                });
                self.damage_npc_at(npc_index, tuning.player_damage, out_events);
                let _ = self.projectiles.remove(index);
                continue;
            }

            let projectile = &mut self.projectiles[index];
            projectile.ttl = projectile.ttl.saturating_sub(dt);
            if projectile.ttl.is_zero() {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
                let _ = self.projectiles.remove(index);
            } else {
                index += 1;
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena { config } => {
            world.install(config);
            let anchors = u32::try_from(world.spawn_anchors.len()).unwrap_or(u32::MAX);
            out_events.push(Event::ArenaConfigured { anchors });
            out_events.push(Event::PlayerHealthChanged {
                current: world.player.health,
                max: world.player.max_health,
            });
        }
        Command::StartAssault => {
            if world.assault_started {
                log::warn!("assault already started, ignoring");
            } else {
                world.assault_started = true;
                out_events.push(Event::AssaultStarted);
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });

            world.player.invincible_for = world.player.invincible_for.saturating_sub(dt);
            let dt_secs = dt.as_secs_f32();
            for cannon in world.cannons.iter_mut() {
                cannon.ready_in = cannon.ready_in.saturating_sub(dt);
            }
            for npc in world.npcs.iter_mut() {
                npc.ready_in = npc.ready_in.saturating_sub(dt);
                npc.position += npc.velocity * dt_secs;
            }
            world.step_projectiles(dt, out_events);
        }
        Command::BeginWave { wave } => {
            if let Some(current) = world.wave.filter(|current| wave <= *current) {
                log::warn!(
                    "ignoring wave {}: wave {} already in progress",
                    wave.get(),
                    current.get()
                );
            } else {
                let cannons_cleared = u32::try_from(world.cannons.len()).unwrap_or(u32::MAX);
                let npcs_cleared = u32::try_from(world.npcs.len()).unwrap_or(u32::MAX);
                for cannon in world.cannons.drain(..) {
                    out_events.push(Event::CannonDestroyed { cannon: cannon.id });
                }
                for npc in world.npcs.drain(..) {
                    out_events.push(Event::NpcDestroyed { npc: npc.id });
                }
                world.wave = Some(wave);
                out_events.push(Event::WaveStarted {
                    wave,
                    cannons_cleared,
                    npcs_cleared,
                });
            }
        }
        Command::SpawnCannon { position } => {
            let id = world.allocate_cannon_id();
            let wave = world.wave.unwrap_or_else(WaveNumber::first);
            world.cannons.push(Cannon {
                id,
                position,
                ready_in: world.config.cannon_fire_interval,
                wave,
            });
            out_events.push(Event::CannonSpawned {
                cannon: id,
                position,
            });
        }
        Command::SpawnNpc { position } => {
            let id = world.allocate_npc_id();
            let wave = world.wave.unwrap_or_else(WaveNumber::first);
            world.npcs.push(Npc {
                id,
                position,
                velocity: Vec3::ZERO,
                health: world.config.npc_health,
                ready_in: Duration::ZERO,
                wave,
            });
            out_events.push(Event::NpcSpawned { npc: id, position });
        }
        Command::SteerNpc { npc, velocity } => {
            if let Some(index) = world.npc_index(npc) {
                world.npcs[index].velocity = velocity;
            }
        }
        Command::FireProjectile {
            source,
            origin,
            velocity,
        } => {
            if world.acknowledge_shot(source) {
                let id = world.allocate_projectile_id();
                let ttl = world.config.projectiles.lifetime_for(source);
                world.projectiles.push(Projectile {
                    id,
                    source,
                    position: origin,
                    velocity,
                    ttl,
                });
                out_events.push(Event::ProjectileSpawned {
                    projectile: id,
                    source,
                    origin,
                    velocity,
                });
            }
        }
        Command::SyncPlayerPose {
            position,
            velocity,
            grounded,
        } => {
            world.player.position = position;
            world.player.velocity = velocity;
            world.player.grounded = grounded;
        }
        Command::DamagePlayer { amount } => {
            world.damage_player(amount, out_events);
        }
        Command::HealPlayer { amount } => {
            world.player.health = world
                .player
                .health
                .saturating_add_clamped(amount, world.player.max_health);
            out_events.push(Event::PlayerHealthChanged {
                current: world.player.health,
                max: world.player.max_health,
            });
        }
        Command::ResetPlayerHealth => {
            world.player.health = world.player.max_health;
            world.player.invincible_for = Duration::ZERO;
            world.player.alive = true;
            out_events.push(Event::PlayerHealthChanged {
                current: world.player.health,
                max: world.player.max_health,
            });
            out_events.push(Event::PlayerHealthReset);
        }
        Command::DamageNpc { npc, amount } => {
            if let Some(index) = world.npc_index(npc) {
                world.damage_npc_at(index, amount, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use pillow_siege_core::{
        CannonSnapshot, CannonView, NpcSnapshot, NpcView, PlayerSnapshot, ProjectileSnapshot,
        ProjectileView, SpawnRingView, WaveNumber,
    };

    /// Captures a read-only view of the cannons standing in the arena.
    #[must_use]
    pub fn cannon_view(world: &World) -> CannonView {
        CannonView::from_snapshots(
            world
                .cannons
                .iter()
                .map(|cannon| CannonSnapshot {
                    id: cannon.id,
                    position: cannon.position,
                    ready_in: cannon.ready_in,
                    wave: cannon.wave,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the NPCs roaming the arena.
    #[must_use]
    pub fn npc_view(world: &World) -> NpcView {
        NpcView::from_snapshots(
            world
                .npcs
                .iter()
                .map(|npc| NpcSnapshot {
                    id: npc.id,
                    position: npc.position,
                    velocity: npc.velocity,
                    health: npc.health,
                    ready_in: npc.ready_in,
                    wave: npc.wave,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    source: projectile.source,
                    position: projectile.position,
                    velocity: projectile.velocity,
                    ttl: projectile.ttl,
                })
                .collect(),
        )
    }

    /// Exposes the spawn-anchor ring generated at configuration.
    #[must_use]
    pub fn spawn_ring(world: &World) -> SpawnRingView<'_> {
        SpawnRingView::new(&world.spawn_anchors, world.config.spawn_ring.origin)
    }

    /// Captures the player's mirrored pose and vitals.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            grounded: world.player.grounded,
            health: world.player.health,
            max_health: world.player.max_health,
            invincible_for: world.player.invincible_for,
            alive: world.player.alive,
        }
    }

    /// Wave currently in progress, if any has started.
    #[must_use]
    pub fn current_wave(world: &World) -> Option<WaveNumber> {
        world.wave
    }

    /// Reports whether the assault has been started.
    #[must_use]
    pub fn assault_started(world: &World) -> bool {
        world.assault_started
    }
}

#[derive(Clone, Copy, Debug)]
struct Cannon {
    id: CannonId,
    position: Vec3,
    ready_in: Duration,
    wave: WaveNumber,
}

#[derive(Clone, Copy, Debug)]
struct Npc {
    id: NpcId,
    position: Vec3,
    velocity: Vec3,
    health: Health,
    ready_in: Duration,
    wave: WaveNumber,
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    source: ProjectileSource,
    position: Vec3,
    velocity: Vec3,
    ttl: Duration,
}

#[derive(Clone, Copy, Debug)]
struct PlayerState {
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    health: Health,
    max_health: Health,
    invincible_for: Duration,
    alive: bool,
}

impl PlayerState {
    fn spawned_at(position: Vec3, max_health: Health) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: true,
            health: max_health,
            max_health,
            invincible_for: Duration::ZERO,
            alive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pillow_siege_core::ProjectileTuning;

    fn arena_with(config: ArenaConfig) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::ConfigureArena { config }, &mut events);
        world
    }

    /// Gravity-free tuning so contact trajectories stay hand-computable.
    fn drift_config() -> ArenaConfig {
        ArenaConfig {
            projectiles: ProjectileTuning {
                gravity: 0.0,
                ..ProjectileTuning::default()
            },
            ..ArenaConfig::default()
        }
    }

    #[test]
    fn configure_generates_ring_and_announces_vitals() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureArena {
                config: ArenaConfig {
                    rng_seed: 99,
                    ..ArenaConfig::default()
                },
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::ArenaConfigured { anchors: 10 },
                Event::PlayerHealthChanged {
                    current: Health::new(100),
                    max: Health::new(100),
                },
            ]
        );

        let player = query::player(&world);
        assert!(player.alive);
        assert_eq!(player.health, Health::new(100));
        assert_eq!(player.position, Vec3::ZERO);
        assert_eq!(query::spawn_ring(&world).len(), 10);
        assert_eq!(query::current_wave(&world), None);
        assert!(!query::assault_started(&world));
    }

    #[test]
    fn ring_is_reproducible_per_seed() {
        let config = ArenaConfig {
            rng_seed: 4242,
            ..ArenaConfig::default()
        };
        let first = arena_with(config);
        let second = arena_with(config);
        let other = arena_with(ArenaConfig {
            rng_seed: 4243,
            ..ArenaConfig::default()
        });

        let collect = |world: &World| -> Vec<Vec3> {
            let ring = query::spawn_ring(world);
            (0..ring.len()).filter_map(|index| ring.anchor(index)).collect()
        };

        assert_eq!(collect(&first), collect(&second));
        assert_ne!(collect(&first), collect(&other));
    }

    #[test]
    fn start_assault_announces_once() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(&mut world, Command::StartAssault, &mut events);
        assert_eq!(events, vec![Event::AssaultStarted]);

        events.clear();
        apply(&mut world, Command::StartAssault, &mut events);
        assert!(events.is_empty());
        assert!(query::assault_started(&world));
    }

    #[test]
    fn begin_wave_replaces_previous_population() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginWave {
                wave: WaveNumber::first(),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnCannon {
                position: Vec3::new(15.0, 2.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnCannon {
                position: Vec3::new(-15.0, 2.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnNpc {
                position: Vec3::new(0.0, 2.0, 15.0),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::BeginWave {
                wave: WaveNumber::new(2),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::CannonDestroyed {
                    cannon: CannonId::new(0),
                },
                Event::CannonDestroyed {
                    cannon: CannonId::new(1),
                },
                Event::NpcDestroyed { npc: NpcId::new(0) },
                Event::WaveStarted {
                    wave: WaveNumber::new(2),
                    cannons_cleared: 2,
                    npcs_cleared: 1,
                },
            ]
        );
        assert!(query::cannon_view(&world).is_empty());
        assert!(query::npc_view(&world).is_empty());
        assert_eq!(query::current_wave(&world), Some(WaveNumber::new(2)));
    }

    #[test]
    fn begin_wave_ignores_stale_wave_numbers() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginWave {
                wave: WaveNumber::new(2),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::BeginWave {
                wave: WaveNumber::first(),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::BeginWave {
                wave: WaveNumber::new(2),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::current_wave(&world), Some(WaveNumber::new(2)));
    }

    #[test]
    fn cannons_wait_one_cooldown_while_npcs_start_ready() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnCannon {
                position: Vec3::new(15.0, 2.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnNpc {
                position: Vec3::new(0.0, 2.0, 15.0),
            },
            &mut events,
        );

        let cannons = query::cannon_view(&world).into_vec();
        assert_eq!(cannons.len(), 1);
        assert_eq!(cannons[0].ready_in, Duration::from_millis(500));

        let npcs = query::npc_view(&world).into_vec();
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].ready_in, Duration::ZERO);
        assert_eq!(npcs[0].health, Health::new(25));
    }

    #[test]
    fn firing_resets_the_source_cooldown() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnCannon {
                position: Vec3::new(15.0, 2.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        assert_eq!(
            query::cannon_view(&world).into_vec()[0].ready_in,
            Duration::ZERO
        );

        events.clear();
        apply(
            &mut world,
            Command::FireProjectile {
                source: ProjectileSource::Cannon(CannonId::new(0)),
                origin: Vec3::new(14.0, 2.0, 0.0),
                velocity: Vec3::new(-15.0, 0.0, 0.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ProjectileSpawned {
                projectile: ProjectileId::new(0),
                source: ProjectileSource::Cannon(CannonId::new(0)),
                origin: Vec3::new(14.0, 2.0, 0.0),
                velocity: Vec3::new(-15.0, 0.0, 0.0),
            }]
        );
        assert_eq!(
            query::cannon_view(&world).into_vec()[0].ready_in,
            Duration::from_millis(500)
        );
        let projectiles = query::projectile_view(&world).into_vec();
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].ttl, Duration::from_secs(10));
    }

    #[test]
    fn tick_integrates_npc_motion() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnNpc {
                position: Vec3::ZERO,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SteerNpc {
                npc: NpcId::new(0),
                velocity: Vec3::new(3.0, 0.0, 0.0),
            },
            &mut events,
        );

        let dt = Duration::from_micros(16_667);
        apply(&mut world, Command::Tick { dt }, &mut events);

        let npcs = query::npc_view(&world).into_vec();
        assert_relative_eq!(npcs[0].position.x, 3.0 * dt.as_secs_f32(), epsilon = 1e-6);
        assert_relative_eq!(npcs[0].position.y, 0.0);
        assert_relative_eq!(npcs[0].position.z, 0.0);
    }

    #[test]
    fn hostile_hit_pushes_and_damages_player() {
        let mut world = arena_with(drift_config());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnCannon {
                position: Vec3::new(0.0, 1.0, -10.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireProjectile {
                source: ProjectileSource::Cannon(CannonId::new(0)),
                origin: Vec3::new(0.0, 1.0, -0.5),
                velocity: Vec3::new(0.0, 0.0, 1.0),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: Duration::from_millis(250),
                },
                Event::ProjectileHit {
                    projectile: ProjectileId::new(0),
                    target: HitTarget::Player,
                },
                Event::PlayerPushed {
                    impulse: Vec3::new(0.0, 5.0, 10.0),
                },
                Event::PlayerHealthChanged {
                    current: Health::new(90),
                    max: Health::new(100),
                },
            ]
        );
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn invincibility_absorbs_followup_hits() {
        let mut world = arena_with(drift_config());
        let mut events = Vec::new();

        apply(&mut world, Command::DamagePlayer { amount: 10 }, &mut events);
        assert_eq!(
            events,
            vec![Event::PlayerHealthChanged {
                current: Health::new(90),
                max: Health::new(100),
            }]
        );

        events.clear();
        apply(&mut world, Command::DamagePlayer { amount: 10 }, &mut events);
        assert!(events.is_empty());

        // The window runs out after a full second of simulated time.
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::DamagePlayer { amount: 10 }, &mut events);
        assert_eq!(
            events,
            vec![Event::PlayerHealthChanged {
                current: Health::new(80),
                max: Health::new(100),
            }]
        );
    }

    #[test]
    fn fatal_damage_announces_death_and_blocks_further_damage() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamagePlayer { amount: 100 },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::PlayerHealthChanged {
                    current: Health::new(0),
                    max: Health::new(100),
                },
                Event::PlayerDied,
            ]
        );
        assert!(!query::player(&world).alive);

        events.clear();
        apply(&mut world, Command::DamagePlayer { amount: 10 }, &mut events);
        assert!(events.is_empty());

        // A dead player cannot fire.
        apply(
            &mut world,
            Command::FireProjectile {
                source: ProjectileSource::Player,
                origin: Vec3::ZERO,
                velocity: Vec3::new(0.0, 0.0, 20.0),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn heal_clamps_and_always_notifies() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(&mut world, Command::HealPlayer { amount: 20 }, &mut events);
        assert_eq!(
            events,
            vec![Event::PlayerHealthChanged {
                current: Health::new(100),
                max: Health::new(100),
            }]
        );

        events.clear();
        apply(&mut world, Command::DamagePlayer { amount: 30 }, &mut events);
        events.clear();
        apply(&mut world, Command::HealPlayer { amount: 50 }, &mut events);
        assert_eq!(
            events,
            vec![Event::PlayerHealthChanged {
                current: Health::new(100),
                max: Health::new(100),
            }]
        );
    }

    #[test]
    fn reset_restores_vitals_and_control() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamagePlayer { amount: 100 },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::ResetPlayerHealth, &mut events);

        assert_eq!(
            events,
            vec![
                Event::PlayerHealthChanged {
                    current: Health::new(100),
                    max: Health::new(100),
                },
                Event::PlayerHealthReset,
            ]
        );
        let player = query::player(&world);
        assert!(player.alive);
        assert_eq!(player.health, Health::new(100));
        assert_eq!(player.invincible_for, Duration::ZERO);
    }

    #[test]
    fn player_projectile_wears_down_npcs() {
        let mut world = arena_with(drift_config());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnNpc {
                position: Vec3::new(0.0, 0.0, 2.0),
            },
            &mut events,
        );

        let volley = |world: &mut World| -> Vec<Event> {
            let mut events = Vec::new();
            apply(
                world,
                Command::FireProjectile {
                    source: ProjectileSource::Player,
                    origin: Vec3::new(0.0, 0.0, 1.5),
                    velocity: Vec3::new(0.0, 0.0, 1.0),
                },
                &mut events,
            );
            events.clear();
            apply(
                world,
                Command::Tick {
                    dt: Duration::from_millis(250),
                },
                &mut events,
            );
            events
        };

        let first = volley(&mut world);
        assert!(first.contains(&Event::NpcDamaged {
            npc: NpcId::new(0),
            remaining: Health::new(15),
        }));

        let second = volley(&mut world);
        assert!(second.contains(&Event::NpcDamaged {
            npc: NpcId::new(0),
            remaining: Health::new(5),
        }));

        let third = volley(&mut world);
        assert!(third.contains(&Event::NpcDestroyed { npc: NpcId::new(0) }));
        assert!(query::npc_view(&world).is_empty());
    }

    #[test]
    fn projectiles_expire_at_end_of_life() {
        let mut world = arena_with(drift_config());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FireProjectile {
                source: ProjectileSource::Player,
                origin: Vec3::new(50.0, 0.0, 50.0),
                velocity: Vec3::ZERO,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced {
                    dt: Duration::from_secs(5),
                },
                Event::ProjectileExpired {
                    projectile: ProjectileId::new(0),
                },
            ]
        );
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn stale_steer_and_fire_commands_are_ignored() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SteerNpc {
                npc: NpcId::new(99),
                velocity: Vec3::new(1.0, 0.0, 0.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireProjectile {
                source: ProjectileSource::Cannon(CannonId::new(7)),
                origin: Vec3::ZERO,
                velocity: Vec3::new(0.0, 0.0, 15.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageNpc {
                npc: NpcId::new(99),
                amount: 10,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn sync_pose_updates_player_snapshot() {
        let mut world = arena_with(ArenaConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SyncPlayerPose {
                position: Vec3::new(3.0, 0.0, 4.0),
                velocity: Vec3::new(1.0, 2.0, 3.0),
                grounded: false,
            },
            &mut events,
        );

        let player = query::player(&world);
        assert_eq!(player.position, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(player.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert!(!player.grounded);
        assert!(events.is_empty());
    }
}
