use crate::camera::CameraRig;
use crate::config::*;
use crate::input::Pointer;
use crate::species::{FishKind, SpecialKind, Species};
use crate::world::{Viewport, WorldBounds, frame_blend, frames_in};
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Marker for the fish the player steers
#[derive(Component, Debug, Default)]
pub struct Player;

/// Marker for every other fish
#[derive(Component, Debug, Default)]
pub struct Enemy;

/// Which way the fish's sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Fish component: simulation state shared by the player and enemies.
/// Positions are world units with y pointing up; speeds are units per
/// reference frame; ages are seconds.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Fish {
    pub kind: FishKind,
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    pub heading: f32,
    pub facing: Facing,
    pub tail_phase: f32,
    pub tail_rate: f32,
    pub age: f32,
    pub max_lifetime: f32,
    pub leaving: bool,
}

impl Fish {
    pub const DEFAULT_TAIL_RATE: f32 = 0.15;

    pub fn new(kind: FishKind, position: Vec2, size: f32, speed: f32, heading: f32, max_lifetime: f32) -> Self {
        let mut fish = Self {
            kind,
            position,
            size,
            speed,
            heading,
            facing: Facing::Right,
            tail_phase: 0.0,
            tail_rate: Self::DEFAULT_TAIL_RATE,
            age: 0.0,
            max_lifetime,
            leaving: false,
        };
        fish.face_heading();
        fish
    }

    /// Freshly hatched player fish; it never ages out
    pub fn player(position: Vec2, growth: &GrowthTuning) -> Self {
        let size = growth.clamp_size(growth.start_size);
        Self::new(
            FishKind::Normal(Species::for_size(size)),
            position,
            size,
            growth.speed_for_size(size),
            0.0,
            f32::INFINITY,
        )
    }

    /// Ordinary enemy whose species follows from its size
    pub fn enemy(position: Vec2, size: f32, speed: f32, heading: f32, max_lifetime: f32) -> Self {
        Self::new(
            FishKind::Normal(Species::for_size(size)),
            position,
            size,
            speed,
            heading,
            max_lifetime,
        )
    }

    /// Special fish with its fixed size and speed
    pub fn special(kind: SpecialKind, position: Vec2, heading: f32, max_lifetime: f32) -> Self {
        let profile = kind.profile();
        Self::new(
            FishKind::Special(kind),
            position,
            profile.size,
            profile.speed,
            heading,
            max_lifetime,
        )
    }

    pub fn with_tail_rate(mut self, tail_rate: f32) -> Self {
        self.tail_rate = tail_rate;
        self
    }

    pub fn with_age(mut self, age: f32) -> Self {
        self.age = age;
        self
    }

    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    /// Grow by `raw * growth_rate`, clamped to the size limits. Returns
    /// whether the fish moved into a different species band.
    pub fn grow(&mut self, raw: f32, growth: &GrowthTuning) -> bool {
        let previous = self.kind;
        self.size = growth.clamp_size(self.size + raw.max(0.0) * growth.growth_rate);
        if let FishKind::Normal(_) = self.kind {
            self.speed = growth.speed_for_size(self.size);
            self.kind = FishKind::Normal(Species::for_size(self.size));
        }
        previous != self.kind
    }

    pub fn is_expired(&self) -> bool {
        self.age > self.max_lifetime
    }

    /// Whether this enemy should be removed from the world
    pub fn should_despawn(&self) -> bool {
        self.leaving || self.is_expired()
    }

    /// Speed multiplier that fades as the fish nears the end of its life
    pub fn age_factor(&self, tuning: &EnemyTuning) -> f32 {
        let life = if self.max_lifetime.is_finite() && self.max_lifetime > 0.0 {
            (self.age / self.max_lifetime).max(0.0)
        } else {
            0.0
        };
        (1.0 - life * tuning.age_slowdown).clamp(tuning.age_speed_floor, 1.0)
    }

    /// Whether `other` is close and large enough to make this fish flee
    pub fn is_threatened_by(&self, other: &Fish, tuning: &EnemyTuning) -> bool {
        other.size > self.size * tuning.escape_size_ratio
            && self.position.distance(other.position) < tuning.escape_radius
    }

    /// Advance the clock and the tail animation
    pub fn tick(&mut self, delta_secs: f32, frames: f32) {
        self.age += delta_secs;
        self.tail_phase = (self.tail_phase + self.tail_rate * frames) % TAU;
    }

    /// Player policy: swim toward `target`, easing in once close
    pub fn seek(&mut self, target: Vec2, frames: f32, tuning: &PlayerTuning, bounds: &WorldBounds) {
        let delta = target - self.position;
        let distance = delta.length();

        if distance > tuning.arrive_radius {
            let step = (distance * tuning.seek_gain).min(self.speed * tuning.burst_multiplier) * frames;
            self.position += delta / distance * step.min(distance);
        } else {
            self.position += delta * frame_blend(tuning.arrive_easing, frames);
        }

        if delta.x.abs() > tuning.facing_deadzone {
            self.facing = if delta.x > 0.0 { Facing::Right } else { Facing::Left };
        }
        if delta.length_squared() > 0.0 {
            self.heading = delta.y.atan2(delta.x);
        }

        self.position = bounds.clamp_inside(self.position, self.size);
    }

    /// Enemy policy: swim straight ahead, veering away from a larger fish
    /// nearby, and mark the fish as leaving once it is well outside the world
    pub fn cruise(&mut self, threat: Option<&Fish>, frames: f32, tuning: &EnemyTuning, bounds: &WorldBounds) {
        if let Some(threat) = threat {
            if self.is_threatened_by(threat, tuning) {
                let away = self.position - threat.position;
                let escape = away.y.atan2(away.x);
                let turn = wrap_angle(escape - self.heading);
                self.heading = wrap_angle(self.heading + turn * frame_blend(tuning.escape_turn_rate, frames));
            }
        }

        let step = self.speed * self.age_factor(tuning) * frames;
        self.position += Vec2::from_angle(self.heading) * step;
        self.face_heading();

        if bounds.is_beyond(self.position, tuning.exit_margin(self.size)) {
            self.leaving = true;
        }
    }

    fn face_heading(&mut self) {
        self.facing = if self.heading.cos() >= 0.0 { Facing::Right } else { Facing::Left };
    }
}

/// Wrap an angle into [-PI, PI)
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// System moving the player toward the pointer
pub fn steer_player(
    time: Res<Time>,
    config: Res<GameConfig>,
    pointer: Res<Pointer>,
    rig: Res<CameraRig>,
    viewport: Res<Viewport>,
    bounds: Res<WorldBounds>,
    mut players: Query<&mut Fish, With<Player>>,
) {
    let delta = time.delta_secs();
    let frames = frames_in(delta, config.world.reference_fps);
    let target = rig.viewport_to_world(pointer.screen, &viewport);

    for mut fish in players.iter_mut() {
        fish.seek(target, frames, &config.player, &bounds);
        fish.tick(delta, frames);
    }
}

/// System moving every enemy along its heading
pub fn steer_enemies(
    time: Res<Time>,
    config: Res<GameConfig>,
    bounds: Res<WorldBounds>,
    players: Query<&Fish, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<&mut Fish, (With<Enemy>, Without<Player>)>,
) {
    let delta = time.delta_secs();
    let frames = frames_in(delta, config.world.reference_fps);
    let player = players.get_single().ok();

    for mut fish in enemies.iter_mut() {
        fish.cruise(player, frames, &config.enemy, &bounds);
        fish.tick(delta, frames);
    }
}

/// System removing enemies that aged out or swam off the world
pub fn prune_enemies(mut commands: Commands, enemies: Query<(Entity, &Fish), With<Enemy>>) {
    for (entity, fish) in enemies.iter() {
        if fish.should_despawn() {
            debug!(
                "{} (size {:.1}) left the world: expired={} leaving={}",
                fish.kind.name(),
                fish.size,
                fish.is_expired(),
                fish.leaving
            );
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds {
            half_extents: Vec2::new(1000.0, 1000.0),
        }
    }

    #[test]
    fn grow_never_leaves_size_limits() {
        let growth = GrowthTuning::default();
        let mut fish = Fish::player(Vec2::ZERO, &growth);
        for step in 0..10_000 {
            fish.grow((step % 97) as f32, &growth);
            assert!(fish.size >= growth.min_size && fish.size <= growth.max_size);
        }
        assert_eq!(fish.size, growth.max_size);
        assert_eq!(fish.kind, FishKind::Normal(Species::BlueWhale));
    }

    #[test]
    fn grow_is_monotonic_and_ignores_negative_amounts() {
        let growth = GrowthTuning::default();
        let mut fish = Fish::player(Vec2::ZERO, &growth);
        let before = fish.size;
        fish.grow(-50.0, &growth);
        assert_eq!(fish.size, before);
        fish.grow(10.0, &growth);
        assert!((fish.size - (before + 10.0 * growth.growth_rate)).abs() < 1e-5);
    }

    #[test]
    fn grow_reports_category_change_and_speed_drops() {
        let growth = GrowthTuning::default();
        let mut fish = Fish::player(Vec2::ZERO, &growth);
        assert_eq!(fish.kind, FishKind::Normal(Species::Guppy));
        let slow_before = fish.speed;

        assert!(!fish.grow(1.0, &growth));
        // 15.15 + 25 * 0.15 = 18.9 crosses into the Neon Tetra band
        assert!(fish.grow(25.0, &growth));
        assert_eq!(fish.kind, FishKind::Normal(Species::NeonTetra));
        assert!(fish.speed < slow_before);
        assert!((fish.speed - growth.speed_for_size(fish.size)).abs() < 1e-6);
    }

    #[test]
    fn player_seek_moves_fast_then_eases() {
        let tuning = PlayerTuning::default();
        let mut fish = Fish::player(Vec2::ZERO, &GrowthTuning::default());

        fish.seek(Vec2::new(200.0, 0.0), 1.0, &tuning, &bounds());
        // capped at speed * 3 since 200 * 0.15 is larger
        assert!((fish.position.x - fish.speed * 3.0).abs() < 1e-4);
        assert_eq!(fish.facing, Facing::Right);

        let mut close = Fish::player(Vec2::ZERO, &GrowthTuning::default());
        close.seek(Vec2::new(-4.0, 0.0), 1.0, &tuning, &bounds());
        assert!((close.position.x + 0.4).abs() < 1e-5);
        // inside the facing dead-zone
        assert_eq!(close.facing, Facing::Right);
    }

    #[test]
    fn player_never_leaves_the_world() {
        let tuning = PlayerTuning::default();
        let mut fish = Fish::player(Vec2::new(990.0, 0.0), &GrowthTuning::default());
        let limit = 1000.0 - fish.size;
        for _ in 0..100 {
            fish.seek(Vec2::new(5000.0, 5000.0), 1.0, &tuning, &bounds());
            assert!(fish.position.x.abs() <= limit && fish.position.y.abs() <= limit);
        }
        assert_eq!(fish.position.x, limit);
    }

    #[test]
    fn aging_enemies_slow_down_to_the_floor() {
        let tuning = EnemyTuning::default();
        let young = Fish::enemy(Vec2::ZERO, 10.0, 2.0, 0.0, 60.0);
        let old = young.clone().with_age(60.0);
        assert_eq!(young.age_factor(&tuning), 1.0);
        assert!((old.age_factor(&tuning) - 0.7).abs() < 1e-6);

        let mut tuning_floor = tuning.clone();
        tuning_floor.age_slowdown = 5.0;
        assert_eq!(old.age_factor(&tuning_floor), tuning_floor.age_speed_floor);
    }

    #[test]
    fn enemy_turns_away_gradually_from_larger_player() {
        let tuning = EnemyTuning::default();
        let player = Fish::player(Vec2::new(100.0, 0.0), &GrowthTuning::default());
        // heading straight at the player
        let mut enemy = Fish::enemy(Vec2::ZERO, 8.0, 2.0, 0.0, 60.0);
        enemy.cruise(Some(&player), 1.0, &tuning, &bounds());
        assert!(enemy.heading.abs() > 0.0);
        assert!(enemy.heading.abs() < 0.2, "turn should be gradual");

        for _ in 0..400 {
            enemy.cruise(Some(&player), 1.0, &tuning, &bounds());
        }
        assert!(enemy.heading.cos() < 0.0, "enemy should end up swimming away");
    }

    #[test]
    fn enemy_ignores_player_that_is_not_much_larger() {
        let tuning = EnemyTuning::default();
        let player = Fish::player(Vec2::new(50.0, 0.0), &GrowthTuning::default());
        let mut enemy = Fish::enemy(Vec2::ZERO, 14.0, 2.0, 0.0, 60.0);
        enemy.cruise(Some(&player), 1.0, &tuning, &bounds());
        assert_eq!(enemy.heading, 0.0);
        assert!((enemy.position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn enemy_ignores_larger_player_outside_escape_radius() {
        let tuning = EnemyTuning::default();
        let player = Fish::player(Vec2::new(300.0, 0.0), &GrowthTuning::default());
        let mut enemy = Fish::enemy(Vec2::ZERO, 8.0, 2.0, 0.0, 60.0);
        assert!(!enemy.is_threatened_by(&player, &tuning));
        enemy.cruise(Some(&player), 1.0, &tuning, &bounds());
        assert_eq!(enemy.heading, 0.0);
        assert!((enemy.position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn classic_preset_notices_the_player_later() {
        let deep = GameConfig::preset(Revision::Deep).enemy;
        let classic = GameConfig::preset(Revision::Classic).enemy;
        let player = Fish::player(Vec2::new(225.0, 0.0), &GrowthTuning::default());
        let enemy = Fish::enemy(Vec2::ZERO, 8.0, 2.0, 0.0, 60.0);
        assert!(enemy.is_threatened_by(&player, &deep));
        assert!(!enemy.is_threatened_by(&player, &classic));

        let mut calm = enemy.clone();
        calm.cruise(Some(&player), 1.0, &classic, &bounds());
        assert_eq!(calm.heading, 0.0);
    }

    #[test]
    fn enemy_far_outside_is_marked_leaving() {
        let tuning = EnemyTuning::default();
        let mut enemy = Fish::enemy(Vec2::new(1000.0 + 200.0, 0.0), 10.0, 2.0, 0.0, 60.0);
        enemy.cruise(None, 1.0, &tuning, &bounds());
        assert!(!enemy.leaving, "a fresh spawn must not be culled immediately");

        enemy.position.x = 1000.0 + tuning.exit_margin(10.0);
        enemy.cruise(None, 1.0, &tuning, &bounds());
        assert!(enemy.leaving);
        assert!(enemy.should_despawn());
    }

    #[test]
    fn expiry_is_strictly_after_lifetime() {
        let fish = Fish::enemy(Vec2::ZERO, 10.0, 2.0, 0.0, 30.0);
        assert!(!fish.clone().with_age(30.0).is_expired());
        assert!(fish.with_age(31.0).is_expired());
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for raw in [-10.0_f32, -PI, 0.0, PI, 7.0, 100.0] {
            let wrapped = wrap_angle(raw);
            assert!((-PI..PI).contains(&wrapped));
            assert!((raw.cos() - wrapped.cos()).abs() < 1e-3);
            assert!((raw.sin() - wrapped.sin()).abs() < 1e-3);
        }
    }
}
