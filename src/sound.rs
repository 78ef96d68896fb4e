use crate::config::*;
use crate::events::{FishEaten, PlayerEvolved, RunEnded};
use crate::game::GameState;
use crate::task::ScheduledTask;
use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// One synthesised note, `offset` seconds after the cue starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f32,
    pub offset: f32,
    pub duration: f32,
    pub gain: f32,
}

/// A short sound effect described as a list of notes
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCue {
    pub name: &'static str,
    pub waveform: Waveform,
    pub notes: Vec<Note>,
}

const C5: f32 = 523.25;
const E5: f32 = 659.25;
const G5: f32 = 783.99;
const C6: f32 = 1046.50;

/// Lowest pitch the eat tone drops to for very large prey
const EAT_TONE_FLOOR: f32 = 100.0;

fn arpeggio(frequencies: &[f32], step: f32, duration: f32, gain: f32) -> Vec<Note> {
    frequencies
        .iter()
        .enumerate()
        .map(|(i, &frequency)| Note {
            frequency,
            offset: i as f32 * step,
            duration,
            gain,
        })
        .collect()
}

impl ToneCue {
    /// Blip whose pitch falls as the prey gets bigger
    pub fn eat(size: f32) -> Self {
        Self {
            name: "eat",
            waveform: Waveform::Sine,
            notes: vec![Note {
                frequency: (800.0 - size * 5.0).max(EAT_TONE_FLOOR),
                offset: 0.0,
                duration: 0.1,
                gain: 0.1,
            }],
        }
    }

    pub fn special_chime() -> Self {
        Self {
            name: "special",
            waveform: Waveform::Sine,
            notes: arpeggio(&[C5, E5, G5], 0.1, 0.3, 0.1),
        }
    }

    pub fn evolution() -> Self {
        Self {
            name: "evolution",
            waveform: Waveform::Sine,
            notes: arpeggio(&[C5, E5, G5, C6], 0.1, 0.4, 0.15),
        }
    }

    pub fn game_over() -> Self {
        Self {
            name: "game over",
            waveform: Waveform::Triangle,
            notes: arpeggio(&[392.0, 370.0, 349.0, 311.0], 0.15, 0.4, 0.15),
        }
    }
}

/// One voice of the ambient drone; `lfo` slowly modulates its gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLayer {
    pub frequency: f32,
    pub lfo: Option<f32>,
    pub gain: f32,
}

/// Underwater drone: five slowly breathing voices over a 40 Hz bed
pub fn ambient_layers() -> Vec<AmbientLayer> {
    let mut layers: Vec<AmbientLayer> = [80.0, 120.0, 180.0, 250.0, 350.0]
        .iter()
        .enumerate()
        .map(|(i, &frequency)| AmbientLayer {
            frequency,
            lfo: Some(0.1 + i as f32 * 0.05),
            gain: 0.02,
        })
        .collect();
    layers.push(AmbientLayer {
        frequency: 40.0,
        lfo: None,
        gain: 0.015,
    });
    layers
}

/// Audio backend. Implementations must not block the frame.
pub trait SoundSink: Send + Sync + 'static {
    fn init(&mut self) -> Result<(), SoundError>;
    fn play(&mut self, cue: &ToneCue);
    fn start_ambience(&mut self, layers: &[AmbientLayer]);
    fn stop_ambience(&mut self);
}

/// Backend that traces every cue to the log instead of a device
#[derive(Debug, Default)]
pub struct ToneLog;

impl SoundSink for ToneLog {
    fn init(&mut self) -> Result<(), SoundError> {
        Ok(())
    }

    fn play(&mut self, cue: &ToneCue) {
        let pitches: Vec<String> = cue.notes.iter().map(|n| format!("{:.0}Hz", n.frequency)).collect();
        debug!("cue {} ({:?}): {}", cue.name, cue.waveform, pitches.join(" "));
    }

    fn start_ambience(&mut self, layers: &[AmbientLayer]) {
        debug!("ambience on ({} layers)", layers.len());
    }

    fn stop_ambience(&mut self) {
        debug!("ambience off");
    }
}

/// Backend that drops everything
#[derive(Debug, Default)]
pub struct Silent;

impl SoundSink for Silent {
    fn init(&mut self) -> Result<(), SoundError> {
        Ok(())
    }
    fn play(&mut self, _cue: &ToneCue) {}
    fn start_ambience(&mut self, _layers: &[AmbientLayer]) {}
    fn stop_ambience(&mut self) {}
}

/// Game-facing audio: turns game events into cues and owns the on/off switch
#[derive(Resource)]
pub struct SoundDevice {
    sink: Box<dyn SoundSink>,
    pub enabled: bool,
    ambience_on: bool,
    ambience_timer: ScheduledTask,
}

impl Default for SoundDevice {
    fn default() -> Self {
        Self::new(Silent)
    }
}

impl SoundDevice {
    pub fn new(sink: impl SoundSink) -> Self {
        Self {
            sink: Box::new(sink),
            enabled: true,
            ambience_on: false,
            ambience_timer: ScheduledTask::default(),
        }
    }

    /// Bring up the backend, falling back to silence when it is unavailable
    pub fn initialize(&mut self) -> Result<(), SoundError> {
        if let Err(err) = self.sink.init() {
            self.sink = Box::new(Silent);
            self.enabled = false;
            return Err(err);
        }
        Ok(())
    }

    pub fn ambience_on(&self) -> bool {
        self.ambience_on
    }

    pub fn on_consume(&mut self, size: f32, special: bool) {
        if !self.enabled {
            return;
        }
        let cue = if special {
            ToneCue::special_chime()
        } else {
            ToneCue::eat(size)
        };
        self.sink.play(&cue);
    }

    pub fn on_evolve(&mut self) {
        if self.enabled {
            self.sink.play(&ToneCue::evolution());
        }
    }

    pub fn on_game_over(&mut self) {
        if self.enabled {
            self.sink.play(&ToneCue::game_over());
        }
    }

    pub fn ambience_start(&mut self) {
        if self.enabled && !self.ambience_on {
            self.sink.start_ambience(&ambient_layers());
            self.ambience_on = true;
        }
    }

    pub fn ambience_stop(&mut self) {
        self.ambience_timer.cancel();
        if self.ambience_on {
            self.sink.stop_ambience();
            self.ambience_on = false;
        }
    }

    /// Flip sound on or off; the ambience follows only while a run is going.
    /// Returns the new setting.
    pub fn toggle(&mut self, running: bool) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            if running {
                self.ambience_start();
            }
        } else {
            self.ambience_stop();
        }
        self.enabled
    }
}

pub fn init_sound(mut device: ResMut<SoundDevice>) {
    if let Err(err) = device.initialize() {
        warn!("Sound disabled: {}", err);
    }
}

/// Start the ambience shortly after a run begins
pub fn schedule_ambience(config: Res<GameConfig>, mut device: ResMut<SoundDevice>) {
    device.ambience_timer.schedule(config.presentation.ambience_delay);
}

pub fn start_ambience_when_due(time: Res<Time>, mut device: ResMut<SoundDevice>) {
    if device.ambience_timer.tick(time.delta()) {
        device.ambience_start();
    }
}

/// Forward gameplay events to the device
pub fn play_cues(
    mut device: ResMut<SoundDevice>,
    mut eaten: EventReader<FishEaten>,
    mut evolved: EventReader<PlayerEvolved>,
    mut ended: EventReader<RunEnded>,
) {
    for meal in eaten.read() {
        device.on_consume(meal.size, meal.kind.is_special());
    }
    for _ in evolved.read() {
        device.on_evolve();
    }
    for _ in ended.read() {
        device.ambience_stop();
        device.on_game_over();
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SoundDevice>()
            .add_systems(Startup, init_sound)
            .add_systems(OnEnter(GameState::Running), schedule_ambience)
            .add_systems(
                Update,
                (
                    start_ambience_when_due.run_if(in_state(GameState::Running)),
                    play_cues,
                ),
            );
    }
}
