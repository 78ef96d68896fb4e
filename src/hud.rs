use crate::config::*;
use crate::events::{PlayerEvolved, SpecialSighted, StartRejected, StartRequested};
use crate::fish::{Fish, Player};
use crate::game::{BestScore, GameState, LastRun, Score};
use crate::sound::SoundDevice;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

/// Short message shown over the game, fading with age
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub age: f32,
}

#[derive(Resource, Debug, Default)]
pub struct Notices {
    pub items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, text: impl Into<String>) {
        self.items.push(Notice {
            text: text.into(),
            age: 0.0,
        });
    }

    /// Age every notice and drop the ones older than `duration`
    pub fn advance(&mut self, delta_secs: f32, duration: f32) {
        for notice in self.items.iter_mut() {
            notice.age += delta_secs;
        }
        self.items.retain(|notice| notice.age < duration);
    }

    pub fn opacity(notice: &Notice, duration: f32) -> f32 {
        if duration <= 0.0 {
            return 0.0;
        }
        (1.0 - notice.age / duration).clamp(0.0, 1.0)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Turn gameplay events into notices
pub fn collect_notices(
    mut notices: ResMut<Notices>,
    mut evolved: EventReader<PlayerEvolved>,
    mut sighted: EventReader<SpecialSighted>,
    mut rejected: EventReader<StartRejected>,
) {
    for event in evolved.read() {
        notices.push(format!("Evolved into {}!", event.species));
    }
    for event in sighted.read() {
        notices.push(format!("A {} appeared!", event.kind));
    }
    for event in rejected.read() {
        notices.push(format!("Could not start: {}", event.reason));
    }
}

pub fn age_notices(time: Res<Time>, config: Res<GameConfig>, mut notices: ResMut<Notices>) {
    notices.advance(time.delta_secs(), config.presentation.notice_duration);
}

pub fn clear_notices(mut notices: ResMut<Notices>) {
    notices.clear();
}

pub fn hud_ui(
    mut contexts: EguiContexts,
    state: Res<State<GameState>>,
    config: Res<GameConfig>,
    score: Res<Score>,
    best: Res<BestScore>,
    last_run: Res<LastRun>,
    notices: Res<Notices>,
    players: Query<&Fish, With<Player>>,
    mut sound: ResMut<SoundDevice>,
    mut starts: EventWriter<StartRequested>,
) {
    let ctx = contexts.ctx_mut();
    let running = *state.get() == GameState::Running;

    match state.get() {
        GameState::Idle => {
            egui::Window::new("Big Fish")
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.heading("Eat smaller fish. Avoid bigger ones.");
                    ui.label("Steer with the mouse or a finger.");
                    ui.label("Grow large enough to become a Blue Whale.");
                    ui.separator();
                    ui.label(format!("Best score: {}", best.points));
                    if ui.button("▶ Start").clicked() {
                        starts.send(StartRequested);
                    }
                });
        }
        GameState::Running => {
            egui::Window::new("Stats")
                .default_pos(egui::pos2(10.0, 10.0))
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Score: {}", score.points));
                    if let Ok(fish) = players.get_single() {
                        ui.label(format!("Size: {:.1}", fish.size));
                        ui.label(format!("Species: {}", fish.kind.name()));

                        let growth = &config.growth;
                        let progress = (fish.size - growth.min_size) / (growth.max_size - growth.min_size);
                        ui.add(
                            egui::ProgressBar::new(progress.clamp(0.0, 1.0))
                                .text(format!("{:.0}%", progress.clamp(0.0, 1.0) * 100.0)),
                        );
                    }
                    ui.separator();
                    ui.label(format!("Best: {}", best.points));
                });
        }
        GameState::GameOver => {
            egui::Window::new("Game Over")
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    let summary = last_run.0.unwrap_or_default();
                    ui.heading(format!("Final score: {}", summary.score));
                    ui.label(format!("Best score: {}", summary.best));
                    if summary.new_record {
                        ui.colored_label(egui::Color32::from_rgb(255, 215, 0), "New record!");
                    }
                    ui.separator();
                    if ui.button("↻ Play again").clicked() {
                        starts.send(StartRequested);
                    }
                });
        }
    }

    egui::Area::new(egui::Id::new("sound_toggle"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            let label = if sound.enabled { "Sound: on" } else { "Sound: off" };
            if ui.button(label).clicked() {
                let enabled = sound.toggle(running);
                info!("Sound {}", if enabled { "enabled" } else { "disabled" });
            }
        });

    let duration = config.presentation.notice_duration;
    egui::Area::new(egui::Id::new("notices"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 60.0])
        .interactable(false)
        .show(ctx, |ui| {
            for notice in notices.items.iter() {
                let alpha = (Notices::opacity(notice, duration) * 255.0) as u8;
                ui.label(
                    egui::RichText::new(&notice.text)
                        .size(22.0)
                        .color(egui::Color32::from_rgba_unmultiplied(255, 230, 120, alpha)),
                );
            }
        });
}

/// Score readouts, menus and notices drawn with egui
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Notices>()
            .add_systems(OnEnter(GameState::Running), clear_notices)
            .add_systems(Update, (collect_notices, age_notices, hud_ui).chain());
    }
}
