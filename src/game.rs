use crate::camera::CameraRig;
use crate::config::*;
use crate::events::{RunEnded, StartRejected, StartRequested};
use crate::fish::{Fish, Player};
use crate::score_store::HighScoreStore;
use crate::world::Viewport;
use bevy::prelude::*;
use thiserror::Error;

/// Lifecycle of a run
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Title screen, before the first run
    #[default]
    Idle,
    Running,
    GameOver,
}

/// Points earned in the current run
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub points: u32,
}

/// Best score seen by this install
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BestScore {
    pub points: u32,
}

/// Result of the last finished run, for the game-over screen
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LastRun(pub Option<RunEnded>);

#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("viewport {width}x{height} is too small to play in")]
    Viewport { width: f32, height: f32 },
}

/// Everything that must hold before a run may begin
pub fn check_start(config: &GameConfig, viewport: &Viewport) -> Result<(), StartError> {
    if viewport.is_degenerate() {
        return Err(StartError::Viewport {
            width: viewport.size.x,
            height: viewport.size.y,
        });
    }
    config.validate()?;
    Ok(())
}

/// Whether `score` beats the stored best
pub fn is_new_record(score: u32, best: u32) -> bool {
    score > best
}

/// Turn start requests into a transition to Running, or a rejection that
/// leaves the current state alone
pub fn handle_start_requests(
    mut requests: EventReader<StartRequested>,
    config: Res<GameConfig>,
    viewport: Res<Viewport>,
    mut next_state: ResMut<NextState<GameState>>,
    mut rejected: EventWriter<StartRejected>,
) {
    if requests.read().count() == 0 {
        return;
    }
    match check_start(&config, &viewport) {
        Ok(()) => next_state.set(GameState::Running),
        Err(err) => {
            error!("Could not start a run: {}", err);
            rejected.send(StartRejected {
                reason: err.to_string(),
            });
        }
    }
}

/// Reset the world for a fresh run: clear all fish, hatch the player at the
/// world centre, zero the score and recentre the camera
pub fn begin_run(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut score: ResMut<Score>,
    mut rig: ResMut<CameraRig>,
    leftovers: Query<Entity, With<Fish>>,
) {
    for entity in leftovers.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let player = Fish::player(Vec2::ZERO, &config.growth);
    info!(
        "Run started ({:?}): {} at size {:.1}",
        config.revision,
        player.kind.name(),
        player.size
    );
    commands.spawn((Name::new("Player"), Player, player));

    *score = Score::default();
    *rig = CameraRig::default();
}

/// Settle the run: update and persist the best score and announce the result
pub fn end_run(
    score: Res<Score>,
    mut best: ResMut<BestScore>,
    mut store: ResMut<HighScoreStore>,
    mut last_run: ResMut<LastRun>,
    mut ended: EventWriter<RunEnded>,
) {
    let new_record = is_new_record(score.points, best.points);
    if new_record {
        best.points = score.points;
        if let Err(err) = store.0.save_best(best.points) {
            warn!("Could not save best score {}: {}", best.points, err);
        }
    }

    let summary = RunEnded {
        score: score.points,
        best: best.points,
        new_record,
    };
    info!(
        "Game over with {} points (best {}{})",
        summary.score,
        summary.best,
        if new_record { ", new record" } else { "" }
    );
    last_run.0 = Some(summary);
    ended.send(summary);
}

/// Startup system reading the persisted best score
pub fn load_best_score(store: Res<HighScoreStore>, mut best: ResMut<BestScore>) {
    match store.0.load_best() {
        Ok(points) => best.points = points,
        Err(err) => warn!("Could not read best score, starting from 0: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_rejected_for_bad_config_or_viewport() {
        let viewport = Viewport::default();
        assert!(check_start(&GameConfig::default(), &viewport).is_ok());

        let mut config = GameConfig::default();
        config.contact.eat_threshold = 0.95;
        assert!(matches!(check_start(&config, &viewport), Err(StartError::Config(_))));

        let flat = Viewport { size: Vec2::new(0.0, 720.0) };
        assert!(matches!(
            check_start(&GameConfig::default(), &flat),
            Err(StartError::Viewport { .. })
        ));
    }

    #[test]
    fn record_needs_a_strictly_higher_score() {
        assert!(is_new_record(10, 0));
        assert!(!is_new_record(10, 10));
        assert!(!is_new_record(0, 0));
    }
}
