use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bigfish::SimulationPlugin;
use bigfish::camera::setup_camera;
use bigfish::config::*;
use bigfish::hud::HudPlugin;
use bigfish::input::PointerPlugin;
use bigfish::score_store::{BEST_SCORE_FILE, HighScoreStore, JsonScoreStore};
use bigfish::sound::{SoundDevice, SoundPlugin, ToneLog};
use bigfish::visuals::FishVisualsPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Big Fish".to_string(),
                resolution: (DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(HighScoreStore::new(JsonScoreStore::new(BEST_SCORE_FILE)))
        .insert_resource(SoundDevice::new(ToneLog))
        .add_plugins((
            SimulationPlugin,
            PointerPlugin,
            FishVisualsPlugin,
            SoundPlugin,
            HudPlugin,
        ))
        // before any Startup system reads the config
        .add_systems(PreStartup, load_game_config)
        .add_systems(Startup, setup_camera)
        .run();
}
