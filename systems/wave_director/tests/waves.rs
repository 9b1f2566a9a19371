//! Wave cadence, composition, and placement geometry.

use std::time::Duration;

use approx::assert_relative_eq;
use glam::Vec3;
use pillow_siege_core::{Command, Event, SpawnRingView, WaveNumber};
use pillow_siege_system_wave_director::{Config, WaveDirector};

fn advanced(dt: Duration) -> Event {
    Event::TimeAdvanced { dt }
}

fn wave_markers(commands: &[Command]) -> Vec<WaveNumber> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::BeginWave { wave } => Some(*wave),
            _ => None,
        })
        .collect()
}

fn spawn_counts(commands: &[Command]) -> (usize, usize) {
    let cannons = commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnCannon { .. }))
        .count();
    let npcs = commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnNpc { .. }))
        .count();
    (cannons, npcs)
}

#[test]
fn startup_delay_gates_the_first_wave() {
    let anchors = [Vec3::ZERO];
    let ring = SpawnRingView::new(&anchors, Vec3::ZERO);
    let mut director = WaveDirector::new(Config {
        rng_seed: 11,
        ..Config::default()
    });
    let mut out = Vec::new();

    // Idle time before the assault starts does not count down anything.
    director.handle(&[advanced(Duration::from_secs(60))], ring, &mut out);
    assert!(out.is_empty());
    assert_eq!(director.time_until_wave(), None);

    director.handle(&[Event::AssaultStarted], ring, &mut out);
    director.handle(&[advanced(Duration::from_millis(1999))], ring, &mut out);
    assert!(out.is_empty());

    // The millisecond that completes the startup delay launches wave one.
    director.handle(&[advanced(Duration::from_millis(1))], ring, &mut out);
    assert_eq!(wave_markers(&out), vec![WaveNumber::new(1)]);
    assert_eq!(spawn_counts(&out), (1, 0));
}

#[test]
fn oversized_steps_launch_every_due_wave() {
    let anchors = [Vec3::ZERO];
    let ring = SpawnRingView::new(&anchors, Vec3::ZERO);
    let mut director = WaveDirector::new(Config {
        rng_seed: 11,
        ..Config::default()
    });
    let mut out = Vec::new();

    director.handle(&[Event::AssaultStarted], ring, &mut out);
    // 2 s startup plus two full 30 s intervals in a single step.
    director.handle(&[advanced(Duration::from_secs(62))], ring, &mut out);

    assert_eq!(
        wave_markers(&out),
        vec![WaveNumber::new(1), WaveNumber::new(2), WaveNumber::new(3)]
    );
    assert_eq!(director.next_wave(), WaveNumber::new(4));
    assert_eq!(director.time_until_wave(), Some(Duration::from_secs(30)));
}

#[test]
fn composition_follows_the_wave_number() {
    let anchors = [Vec3::ZERO];
    let ring = SpawnRingView::new(&anchors, Vec3::ZERO);
    let mut director = WaveDirector::new(Config {
        rng_seed: 11,
        ..Config::default()
    });
    let mut out = Vec::new();

    director.handle(&[Event::AssaultStarted], ring, &mut out);
    // Wave five arrives after the startup delay plus four intervals.
    director.handle(&[advanced(Duration::from_secs(122))], ring, &mut out);
    assert_eq!(wave_markers(&out).len(), 5);

    let boundary = out
        .iter()
        .rposition(|command| matches!(command, Command::BeginWave { .. }))
        .unwrap();
    let fifth = &out[boundary..];
    assert_eq!(spawn_counts(fifth), (5, 1));

    // Cannons deploy before drones within a wave.
    let first_npc = fifth
        .iter()
        .position(|command| matches!(command, Command::SpawnNpc { .. }))
        .unwrap();
    let last_cannon = fifth
        .iter()
        .rposition(|command| matches!(command, Command::SpawnCannon { .. }))
        .unwrap();
    assert!(last_cannon < first_npc);
}

#[test]
fn placement_orbits_a_ring_anchor() {
    // Anchors far enough apart that the closest one is unambiguous.
    let anchors = [
        Vec3::new(120.0, 2.0, 0.0),
        Vec3::new(-120.0, 2.0, 0.0),
        Vec3::new(0.0, 2.0, 150.0),
    ];
    let ring = SpawnRingView::new(&anchors, Vec3::ZERO);
    let mut director = WaveDirector::new(Config {
        rng_seed: 3,
        ..Config::default()
    });
    let mut out = Vec::new();

    director.handle(&[Event::AssaultStarted], ring, &mut out);
    director.handle(&[advanced(Duration::from_secs(122))], ring, &mut out);

    let mut checked = 0;
    for command in &out {
        let position = match command {
            Command::SpawnCannon { position } | Command::SpawnNpc { position } => *position,
            _ => continue,
        };
        let anchor = anchors
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (position - *a).length();
                let db = (position - *b).length();
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        let planar = Vec3::new(position.x - anchor.x, 0.0, position.z - anchor.z).length();
        assert_relative_eq!(planar, 10.0, epsilon = 1e-3);
        assert!(position.y >= anchor.y && position.y < anchor.y + 5.0);
        checked += 1;
    }
    // Waves one through five field 1+2+3+4+5 cannons and a single drone.
    assert_eq!(checked, 16);
}

#[test]
fn placement_lift_honors_a_raised_height_window() {
    let anchors = [Vec3::new(15.0, 2.0, 0.0)];
    let ring = SpawnRingView::new(&anchors, Vec3::ZERO);
    let mut director = WaveDirector::new(Config {
        rng_seed: 17,
        min_height: 2.0,
        max_height: 5.0,
        ..Config::default()
    });
    let mut out = Vec::new();

    director.handle(&[Event::AssaultStarted], ring, &mut out);
    director.handle(&[advanced(Duration::from_secs(122))], ring, &mut out);

    let mut checked = 0;
    for command in &out {
        let position = match command {
            Command::SpawnCannon { position } | Command::SpawnNpc { position } => *position,
            _ => continue,
        };
        // Every unit floats at least two units above the anchor, strictly
        // below the window's upper edge.
        assert!(position.y >= anchors[0].y + 2.0);
        assert!(position.y < anchors[0].y + 5.0);
        checked += 1;
    }
    assert_eq!(checked, 16);
}
