use crate::species::{FishKind, SpecialKind, Species};
use bevy::prelude::*;

/// Ask for a new run from the title or game-over screen
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct StartRequested;

/// A start request was refused; the game stays where it was
#[derive(Event, Debug, Clone)]
pub struct StartRejected {
    pub reason: String,
}

/// The player swallowed a fish
#[derive(Event, Debug, Clone, Copy)]
pub struct FishEaten {
    pub kind: FishKind,
    pub size: f32,
    pub position: Vec2,
    pub points: u32,
}

/// The player grew into a new species band
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerEvolved {
    pub species: Species,
}

/// A larger fish caught the player
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerDevoured {
    pub by: FishKind,
    pub score: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SpecialSighted {
    pub kind: SpecialKind,
}

/// Final tally of a finished run
#[derive(Event, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunEnded {
    pub score: u32,
    pub best: u32,
    pub new_record: bool,
}
