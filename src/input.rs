use crate::events::StartRequested;
use crate::game::GameState;
use crate::world::Viewport;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Latest pointer position in viewport pixels (origin top-left). Mouse and
/// touch write into the same slot; an active touch takes precedence.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub screen: Vec2,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            screen: Viewport::default().size * 0.5,
        }
    }
}

impl Pointer {
    pub fn centered(viewport: &Viewport) -> Self {
        Self {
            screen: viewport.size * 0.5,
        }
    }

    /// Store a new position, clamped to the viewport
    pub fn set_clamped(&mut self, position: Vec2, viewport: &Viewport) {
        self.screen = position.clamp(Vec2::ZERO, viewport.size.max(Vec2::ZERO));
    }
}

/// Pick up window resizes. The pointer goes back to the centre so the player
/// does not dart toward a stale corner.
pub fn track_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
    mut pointer: ResMut<Pointer>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size == viewport.size {
        return;
    }
    let next = Viewport { size };
    if next.is_degenerate() {
        // minimised windows report a zero size
        return;
    }
    debug!("Viewport resized to {}x{}", size.x, size.y);
    *viewport = next;
    *pointer = Pointer::centered(&viewport);
}

/// Follow the mouse cursor, or the first finger while the screen is touched
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    touches: Res<Touches>,
    viewport: Res<Viewport>,
    mut pointer: ResMut<Pointer>,
) {
    if let Some(touch) = touches.first_pressed_position() {
        pointer.set_clamped(touch, &viewport);
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        pointer.set_clamped(cursor, &viewport);
    }
}

/// Space or Enter starts a run from the title or game-over screen
pub fn request_start_from_keys(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut starts: EventWriter<StartRequested>,
) {
    if *state.get() == GameState::Running {
        return;
    }
    if keys.any_just_pressed([KeyCode::Space, KeyCode::Enter]) {
        starts.send(StartRequested);
    }
}

/// Window and touch input. Needs the windowing and input plugins, so the
/// headless simulation leaves it out.
pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (track_viewport, track_pointer)
                .chain()
                .after(bevy::input::InputSystem),
        )
        .add_systems(Update, request_start_from_keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_starts_at_viewport_centre() {
        assert_eq!(Pointer::default().screen, Vec2::new(640.0, 360.0));
    }

    #[test]
    fn pointer_is_clamped_to_viewport() {
        let viewport = Viewport {
            size: Vec2::new(800.0, 600.0),
        };
        let mut pointer = Pointer::centered(&viewport);
        pointer.set_clamped(Vec2::new(-20.0, 900.0), &viewport);
        assert_eq!(pointer.screen, Vec2::new(0.0, 600.0));
        pointer.set_clamped(Vec2::new(120.0, 80.0), &viewport);
        assert_eq!(pointer.screen, Vec2::new(120.0, 80.0));
    }
}
