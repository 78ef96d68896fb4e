use crate::config::*;
use crate::events::{FishEaten, PlayerDevoured, PlayerEvolved};
use crate::fish::{Enemy, Fish, Player};
use crate::game::{GameState, Score};
use crate::spawner::SpawnSchedule;
use crate::species::FishKind;
use bevy::prelude::*;

/// Outcome of the player touching another fish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Circles do not overlap
    Apart,
    /// Player is big enough to swallow the other fish
    Devour,
    /// The other fish is big enough to swallow the player
    Devoured,
    /// Too close in size for either to eat the other
    Standoff,
}

/// Classify an encounter. Circles overlap when the centre distance is
/// strictly below the sum of the radii.
pub fn classify_contact(player: &Fish, other: &Fish, tuning: &ContactTuning) -> Contact {
    if player.position.distance(other.position) >= player.size + other.size {
        return Contact::Apart;
    }
    if player.size > other.size * tuning.eat_threshold {
        Contact::Devour
    } else if player.size < other.size * tuning.death_threshold {
        Contact::Devoured
    } else {
        Contact::Standoff
    }
}

/// Points awarded for eating `fish`
pub fn meal_points(fish: &Fish) -> u32 {
    match fish.kind {
        FishKind::Special(kind) => kind.profile().points,
        FishKind::Normal(_) => fish.size.max(0.0).floor() as u32,
    }
}

/// Growth input awarded for eating `fish`, before the growth rate applies
pub fn meal_growth(fish: &Fish, growth: &GrowthTuning) -> f32 {
    fish.size * growth.meal_factor
}

/// System resolving player contacts, once per frame after movement
pub fn resolve_collisions(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut score: ResMut<Score>,
    mut schedule: ResMut<SpawnSchedule>,
    mut players: Query<&mut Fish, (With<Player>, Without<Enemy>)>,
    enemies: Query<(Entity, &Fish), (With<Enemy>, Without<Player>)>,
    mut eaten: EventWriter<FishEaten>,
    mut evolved: EventWriter<PlayerEvolved>,
    mut devoured: EventWriter<PlayerDevoured>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };

    for (entity, other) in enemies.iter() {
        match classify_contact(&player, other, &config.contact) {
            Contact::Apart | Contact::Standoff => {}
            Contact::Devour => {
                let points = meal_points(other);
                score.points = score.points.saturating_add(points);
                commands.entity(entity).despawn_recursive();
                eaten.send(FishEaten {
                    kind: other.kind,
                    size: other.size,
                    position: other.position,
                    points,
                });

                if player.grow(meal_growth(other, &config.growth), &config.growth) {
                    if let FishKind::Normal(species) = player.kind {
                        info!("Player evolved into {} at size {:.1}", species, player.size);
                        evolved.send(PlayerEvolved { species });
                    }
                }
            }
            Contact::Devoured => {
                info!(
                    "Player (size {:.1}) was eaten by {} (size {:.1}) with {} points",
                    player.size,
                    other.kind.name(),
                    other.size,
                    score.points
                );
                devoured.send(PlayerDevoured {
                    by: other.kind,
                    score: score.points,
                });
                // the state change lands next frame; the spawners stop now
                schedule.cancel_all();
                next_state.set(GameState::GameOver);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{SpecialKind, Species};

    fn player_at(size: f32) -> Fish {
        let mut fish = Fish::player(Vec2::ZERO, &GrowthTuning::default());
        fish.size = size;
        fish
    }

    #[test]
    fn larger_player_devours_small_fish() {
        let tuning = ContactTuning::default();
        let prey = Fish::enemy(Vec2::new(20.0, 0.0), 10.0, 0.0, 0.0, 60.0);
        assert_eq!(classify_contact(&player_at(15.0), &prey, &tuning), Contact::Devour);
        assert_eq!(meal_points(&prey), 10);
    }

    #[test]
    fn much_larger_enemy_devours_player() {
        let tuning = ContactTuning::default();
        let predator = Fish::enemy(Vec2::new(30.0, 0.0), 20.0, 0.0, 0.0, 60.0);
        assert_eq!(classify_contact(&player_at(15.0), &predator, &tuning), Contact::Devoured);
    }

    #[test]
    fn similar_sizes_are_a_standoff() {
        let tuning = ContactTuning::default();
        let rival = Fish::enemy(Vec2::new(25.0, 0.0), 14.0, 0.0, 0.0, 60.0);
        assert_eq!(classify_contact(&player_at(15.0), &rival, &tuning), Contact::Standoff);
    }

    #[test]
    fn touching_circles_do_not_count() {
        let tuning = ContactTuning::default();
        let prey = Fish::enemy(Vec2::new(25.0, 0.0), 10.0, 0.0, 0.0, 60.0);
        assert_eq!(classify_contact(&player_at(15.0), &prey, &tuning), Contact::Apart);

        let far = Fish::enemy(Vec2::new(0.0, 300.0), 10.0, 0.0, 0.0, 60.0);
        assert_eq!(classify_contact(&player_at(15.0), &far, &tuning), Contact::Apart);
    }

    #[test]
    fn specials_pay_their_bonus() {
        let golden = Fish::special(SpecialKind::Golden, Vec2::ZERO, 0.0, 100.0);
        assert_eq!(meal_points(&golden), 500);
        let tuna = Fish::enemy(Vec2::ZERO, 47.9, 0.0, 0.0, 60.0);
        assert_eq!(tuna.kind, FishKind::Normal(Species::Tuna));
        assert_eq!(meal_points(&tuna), 47);
    }

    #[test]
    fn meal_growth_scales_with_prey() {
        let growth = GrowthTuning::default();
        let prey = Fish::enemy(Vec2::ZERO, 10.0, 0.0, 0.0, 60.0);
        assert!((meal_growth(&prey, &growth) - 0.5).abs() < 1e-6);
    }
}
