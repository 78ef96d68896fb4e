//! Big Fish: an arcade game about growing from a clownfish into a blue whale
//! by eating anything smaller and fleeing anything bigger.

pub mod camera;
pub mod collision;
pub mod config;
pub mod events;
pub mod fish;
pub mod game;
pub mod hud;
pub mod input;
pub mod score_store;
pub mod sound;
pub mod spawner;
pub mod species;
pub mod task;
pub mod visuals;
pub mod world;

use bevy::prelude::*;
use camera::{CameraRig, update_camera_rig};
use collision::resolve_collisions;
use config::GameConfig;
use events::*;
use fish::{prune_enemies, steer_enemies, steer_player};
use game::*;
use input::Pointer;
use score_store::HighScoreStore;
use spawner::{SpawnSchedule, run_spawners, start_spawners, stop_spawners};
use world::{Viewport, WorldBounds, refresh_world_bounds};

/// Per-frame simulation pipeline, active only while a run is going
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;

/// Game rules without any rendering, windowing or audio. Runs headless.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<HighScoreStore>() {
            app.insert_resource(HighScoreStore::in_memory());
        }

        app.init_state::<GameState>()
            .init_resource::<GameConfig>()
            .init_resource::<Viewport>()
            .init_resource::<WorldBounds>()
            .init_resource::<Pointer>()
            .init_resource::<CameraRig>()
            .init_resource::<Score>()
            .init_resource::<BestScore>()
            .init_resource::<LastRun>()
            .init_resource::<SpawnSchedule>()
            .add_event::<StartRequested>()
            .add_event::<StartRejected>()
            .add_event::<FishEaten>()
            .add_event::<PlayerEvolved>()
            .add_event::<PlayerDevoured>()
            .add_event::<SpecialSighted>()
            .add_event::<RunEnded>()
            .add_systems(Startup, load_best_score)
            .add_systems(OnEnter(GameState::Running), (begin_run, start_spawners))
            .add_systems(OnExit(GameState::Running), stop_spawners)
            .add_systems(OnEnter(GameState::GameOver), end_run)
            .add_systems(
                Update,
                (
                    refresh_world_bounds,
                    handle_start_requests.run_if(not(in_state(GameState::Running))),
                )
                    .before(SimulationSet),
            )
            .add_systems(
                Update,
                (
                    update_camera_rig,
                    steer_player,
                    steer_enemies,
                    prune_enemies,
                    resolve_collisions,
                    run_spawners,
                )
                    .chain()
                    .in_set(SimulationSet)
                    .run_if(in_state(GameState::Running)),
            );
    }
}
