use crate::camera::CameraRig;
use crate::config::*;
use crate::events::SpecialSighted;
use crate::fish::{Enemy, Fish, Player};
use crate::game::Score;
use crate::species::SpecialKind;
use crate::task::ScheduledTask;
use crate::world::{Viewport, WorldBounds};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Pending spawn work for the current run
#[derive(Resource, Debug, Default)]
pub struct SpawnSchedule {
    pub population: ScheduledTask,
    pub special: ScheduledTask,
    pub opening: ScheduledTask,
    pub opening_left: u32,
}

impl SpawnSchedule {
    /// Arm every spawner for a fresh run
    pub fn start(&mut self, config: &GameConfig) {
        self.population.schedule(0.0);
        self.special.schedule(config.special.interval);
        self.opening_left = config.spawn.opening_school;
        if self.opening_left > 0 {
            self.opening.schedule(0.0);
        } else {
            self.opening.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        self.population.cancel();
        self.special.cancel();
        self.opening.cancel();
        self.opening_left = 0;
    }

    pub fn is_idle(&self) -> bool {
        !self.population.is_armed() && !self.special.is_armed() && !self.opening.is_armed()
    }
}

/// What the population spawner does when its timer fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopulationStep {
    /// Add one fish and come back after `next_delay` seconds
    Spawn { next_delay: f32 },
    /// Population is full; check again after `retry` seconds
    Hold { retry: f32 },
}

/// Soft population control: spawn quickly while the screen is sparse, slowly
/// when it is busy, and not at all at the hard cap or above the high-water
/// mark
pub fn population_step(
    on_screen: usize,
    live: usize,
    cap: usize,
    tuning: &SpawnTuning,
    rng: &mut impl Rng,
) -> PopulationStep {
    if live >= cap || on_screen >= tuning.screen_high_water {
        return PopulationStep::Hold {
            retry: tuning.saturated_delay,
        };
    }
    let next_delay = if on_screen < tuning.screen_low_water {
        tuning.fast_delay
    } else {
        tuning.normal_delay.sample(rng)
    };
    PopulationStep::Spawn { next_delay }
}

/// Size for a new enemy, relative to the current player size
pub fn roll_spawn_size(player_size: f32, tuning: &SpawnTuning, growth: &GrowthTuning, rng: &mut impl Rng) -> f32 {
    let band = if rng.gen_bool(tuning.eatable_chance.clamp(0.0, 1.0)) {
        tuning.eatable_band
    } else {
        tuning.danger_band
    };
    growth.clamp_size(player_size * band.sample(rng))
}

/// Position just outside a random world edge and a heading pointing back in
pub fn edge_spawn(bounds: &WorldBounds, margin: f32, jitter: f32, rng: &mut impl Rng) -> (Vec2, f32) {
    let half = bounds.half_extents;
    let along_x = rng.gen_range(-half.x..=half.x);
    let along_y = rng.gen_range(-half.y..=half.y);
    let (position, inward) = match rng.gen_range(0..4) {
        0 => (Vec2::new(along_x, half.y + margin), -FRAC_PI_2),
        1 => (Vec2::new(half.x + margin, along_y), PI),
        2 => (Vec2::new(along_x, -half.y - margin), FRAC_PI_2),
        _ => (Vec2::new(-half.x - margin, along_y), 0.0),
    };
    let wobble = if jitter > 0.0 {
        rng.gen_range(-jitter * 0.5..jitter * 0.5)
    } else {
        0.0
    };
    (position, inward + wobble)
}

/// Special fish for one roll in `[0, 1)`; the bands are disjoint and the
/// remainder means no special this time
pub fn roll_special(tuning: &SpecialTuning, roll: f64) -> Option<SpecialKind> {
    let mut threshold = 0.0;
    for (kind, chance) in [
        (SpecialKind::Golden, tuning.golden_chance),
        (SpecialKind::Rainbow, tuning.rainbow_chance),
        (SpecialKind::Ghost, tuning.ghost_chance),
    ] {
        threshold += chance;
        if roll < threshold {
            return Some(kind);
        }
    }
    None
}

/// Opening-school placement: a ring around the player, each fish swimming
/// back toward it
pub fn opening_spawn(player: Vec2, viewport: &Viewport, tuning: &SpawnTuning, rng: &mut impl Rng) -> (Vec2, f32) {
    let bearing = rng.gen_range(0.0..TAU);
    let distance = viewport.size.x * tuning.opening_distance_factor;
    let position = player + Vec2::from_angle(bearing) * distance;
    (position, bearing - PI)
}

fn tail_rate(rng: &mut impl Rng) -> f32 {
    rng.gen_range(0.1..0.2)
}

fn spawn_enemy(
    commands: &mut Commands,
    config: &GameConfig,
    position: Vec2,
    size: f32,
    heading: f32,
    rng: &mut impl Rng,
) {
    let speed = config.growth.speed_for_size(size) * config.enemy.cruise.sample(rng);
    let lifetime = config.enemy.lifetime.sample(rng);
    let fish = Fish::enemy(position, size, speed, heading, lifetime).with_tail_rate(tail_rate(rng));
    commands.spawn((Name::new(fish.kind.name()), Enemy, fish));
}

/// Run the three spawners. Every insertion in one frame is counted against
/// the cap before the next one is considered.
pub fn run_spawners(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    viewport: Res<Viewport>,
    rig: Res<CameraRig>,
    score: Res<Score>,
    mut schedule: ResMut<SpawnSchedule>,
    players: Query<&Fish, (With<Player>, Without<Enemy>)>,
    enemies: Query<&Fish, (With<Enemy>, Without<Player>)>,
    mut sighted: EventWriter<SpecialSighted>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let delta = time.delta();
    let mut rng = rand::thread_rng();
    let cap = config.spawn.max_enemies(score.points);
    let mut live = enemies.iter().count();

    if schedule.opening.tick(delta) {
        if live < cap {
            let size = config.growth.clamp_size(config.spawn.opening_size.sample(&mut rng));
            let (position, heading) = opening_spawn(player.position, &viewport, &config.spawn, &mut rng);
            spawn_enemy(&mut commands, &config, position, size, heading, &mut rng);
            live += 1;
        }
        schedule.opening_left = schedule.opening_left.saturating_sub(1);
        if schedule.opening_left > 0 {
            schedule.opening.schedule(config.spawn.opening_interval);
        }
    }

    if schedule.population.tick(delta) {
        let on_screen = enemies
            .iter()
            .filter(|fish| rig.is_on_screen(fish.position, &viewport, config.spawn.on_screen_margin))
            .count();
        match population_step(on_screen, live, cap, &config.spawn, &mut rng) {
            PopulationStep::Spawn { next_delay } => {
                let size = roll_spawn_size(player.size, &config.spawn, &config.growth, &mut rng);
                let (position, heading) =
                    edge_spawn(&bounds, config.spawn.spawn_margin, config.spawn.heading_jitter, &mut rng);
                spawn_enemy(&mut commands, &config, position, size, heading, &mut rng);
                live += 1;
                schedule.population.schedule(next_delay);
            }
            PopulationStep::Hold { retry } => {
                debug!("Population held at {} live, {} on screen (cap {})", live, on_screen, cap);
                schedule.population.schedule(retry);
            }
        }
    }

    if schedule.special.tick(delta) {
        schedule.special.schedule(config.special.interval);
        if let Some(kind) = roll_special(&config.special, rng.gen_range(0.0..1.0)) {
            if live < cap {
                let (position, heading) = edge_spawn(
                    &bounds,
                    config.special.spawn_margin,
                    config.spawn.heading_jitter,
                    &mut rng,
                );
                let lifetime = config.special.lifetime.sample(&mut rng);
                let fish = Fish::special(kind, position, heading, lifetime).with_tail_rate(tail_rate(&mut rng));
                commands.spawn((Name::new(fish.kind.name()), Enemy, fish));
                info!("{} sighted", kind);
                sighted.send(SpecialSighted { kind });
            }
        }
    }
}

/// Arm the spawners when a run begins
pub fn start_spawners(config: Res<GameConfig>, mut schedule: ResMut<SpawnSchedule>) {
    schedule.start(&config);
}

/// Cancel every pending spawn so nothing lands in a finished run
pub fn stop_spawners(mut schedule: ResMut<SpawnSchedule>) {
    schedule.cancel_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn spawn_sizes_follow_the_two_bands() {
        let tuning = SpawnTuning::default();
        let growth = GrowthTuning::default();
        let mut rng = rng();
        let mut eatable = 0;
        let draws = 4000;
        for _ in 0..draws {
            let size = roll_spawn_size(20.0, &tuning, &growth, &mut rng);
            assert!(size >= growth.min_size && size <= growth.max_size);
            if size < 20.0 {
                assert!(size >= 6.0 - 1e-4 && size <= 18.0 + 1e-4);
                eatable += 1;
            } else {
                assert!(size >= 22.0 - 1e-4 && size <= 40.0 + 1e-4);
            }
        }
        let share = eatable as f64 / draws as f64;
        assert!((0.70..=0.80).contains(&share), "eatable share {share}");
    }

    #[test]
    fn spawn_sizes_respect_floor_and_cap() {
        let tuning = SpawnTuning::default();
        let growth = GrowthTuning::default();
        let mut rng = rng();
        for _ in 0..500 {
            let tiny = roll_spawn_size(6.0, &tuning, &growth, &mut rng);
            assert!(tiny >= growth.min_size);
            let huge = roll_spawn_size(70.0, &tuning, &growth, &mut rng);
            assert!(huge <= growth.max_size);
        }
    }

    #[test]
    fn edge_spawns_start_outside_and_head_inward() {
        let bounds = WorldBounds {
            half_extents: Vec2::new(1000.0, 500.0),
        };
        let mut rng = rng();
        for _ in 0..200 {
            let (position, heading) = edge_spawn(&bounds, 200.0, 0.5, &mut rng);
            assert!(bounds.is_beyond(position, 199.0));
            assert!(!bounds.is_beyond(position, 201.0));
            let ahead = position + Vec2::from_angle(heading) * 300.0;
            assert!(ahead.length() < position.length(), "heading should point into the world");
        }
    }

    #[test]
    fn population_step_tracks_water_marks() {
        let tuning = SpawnTuning::default();
        let mut rng = rng();
        assert_eq!(
            population_step(2, 2, 25, &tuning, &mut rng),
            PopulationStep::Spawn {
                next_delay: tuning.fast_delay
            }
        );
        match population_step(10, 10, 25, &tuning, &mut rng) {
            PopulationStep::Spawn { next_delay } => assert!((2.0..3.0).contains(&next_delay)),
            other => panic!("expected a spawn, got {other:?}"),
        }
        assert_eq!(
            population_step(15, 15, 25, &tuning, &mut rng),
            PopulationStep::Hold { retry: 3.0 }
        );
        assert_eq!(
            population_step(0, 25, 25, &tuning, &mut rng),
            PopulationStep::Hold { retry: 3.0 }
        );
    }

    #[test]
    fn special_bands_are_disjoint_with_a_common_miss() {
        let tuning = SpecialTuning::default();
        assert_eq!(roll_special(&tuning, 0.0), Some(SpecialKind::Golden));
        assert_eq!(roll_special(&tuning, 0.019), Some(SpecialKind::Golden));
        assert_eq!(roll_special(&tuning, 0.02), Some(SpecialKind::Rainbow));
        assert_eq!(roll_special(&tuning, 0.049), Some(SpecialKind::Rainbow));
        assert_eq!(roll_special(&tuning, 0.05), Some(SpecialKind::Ghost));
        assert_eq!(roll_special(&tuning, 0.089), Some(SpecialKind::Ghost));
        assert_eq!(roll_special(&tuning, 0.09), None);
        assert_eq!(roll_special(&tuning, 0.99), None);
    }

    #[test]
    fn opening_school_rings_the_player() {
        let tuning = SpawnTuning::default();
        let viewport = Viewport::default();
        let player = Vec2::new(100.0, -50.0);
        let mut rng = rng();
        for _ in 0..50 {
            let (position, heading) = opening_spawn(player, &viewport, &tuning, &mut rng);
            assert!((position.distance(player) - 1024.0).abs() < 1e-2);
            let closer = position + Vec2::from_angle(heading) * 10.0;
            assert!(closer.distance(player) < position.distance(player));
        }
    }

    #[test]
    fn cancelled_schedule_is_idle() {
        let config = GameConfig::default();
        let mut schedule = SpawnSchedule::default();
        schedule.start(&config);
        assert!(!schedule.is_idle());
        assert_eq!(schedule.opening_left, 5);
        schedule.cancel_all();
        assert!(schedule.is_idle());
        assert!(!schedule.population.tick(std::time::Duration::from_secs(60)));
    }
}
