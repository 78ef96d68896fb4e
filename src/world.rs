use crate::config::*;
use bevy::prelude::*;

/// Size of the visible area in logical pixels
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}

impl Viewport {
    pub fn is_degenerate(&self) -> bool {
        !(self.size.x >= 1.0 && self.size.y >= 1.0)
    }
}

/// Playable rectangle, centred on the origin
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub half_extents: Vec2,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::from_viewport(&Viewport::default(), WORLD_SCALE)
    }
}

impl WorldBounds {
    pub fn from_viewport(viewport: &Viewport, world_scale: f32) -> Self {
        Self {
            half_extents: viewport.size * world_scale * 0.5,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Clamp a point so a circle of `inset` radius stays inside the world
    pub fn clamp_inside(&self, position: Vec2, inset: f32) -> Vec2 {
        let limit = (self.half_extents - Vec2::splat(inset)).max(Vec2::ZERO);
        position.clamp(-limit, limit)
    }

    /// Whether a point lies outside the world by more than `margin`
    pub fn is_beyond(&self, position: Vec2, margin: f32) -> bool {
        let limit = self.half_extents + Vec2::splat(margin);
        position.x.abs() > limit.x || position.y.abs() > limit.y
    }
}

/// Number of reference frames covered by a time step
pub fn frames_in(delta_secs: f32, reference_fps: f32) -> f32 {
    delta_secs * reference_fps
}

/// Per-frame easing fraction stretched over `frames` reference frames
pub fn frame_blend(rate: f32, frames: f32) -> f32 {
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(frames.max(0.0))
}

/// System keeping the world bounds in step with the viewport
pub fn refresh_world_bounds(
    viewport: Res<Viewport>,
    config: Res<GameConfig>,
    mut bounds: ResMut<WorldBounds>,
) {
    let next = WorldBounds::from_viewport(&viewport, config.world.world_scale);
    if *bounds != next {
        *bounds = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_is_three_viewports_wide() {
        let bounds = WorldBounds::default();
        assert_eq!(bounds.size(), Vec2::new(3840.0, 2160.0));
    }

    #[test]
    fn clamp_keeps_radius_inside() {
        let bounds = WorldBounds {
            half_extents: Vec2::new(100.0, 50.0),
        };
        let clamped = bounds.clamp_inside(Vec2::new(500.0, -500.0), 10.0);
        assert_eq!(clamped, Vec2::new(90.0, -40.0));
    }

    #[test]
    fn beyond_respects_margin() {
        let bounds = WorldBounds {
            half_extents: Vec2::new(100.0, 100.0),
        };
        assert!(!bounds.is_beyond(Vec2::new(120.0, 0.0), 30.0));
        assert!(bounds.is_beyond(Vec2::new(131.0, 0.0), 30.0));
        assert!(bounds.is_beyond(Vec2::new(0.0, -131.0), 30.0));
    }

    #[test]
    fn frame_blend_matches_single_frame_rate() {
        assert!((frame_blend(0.1, 1.0) - 0.1).abs() < 1e-6);
        assert!(frame_blend(0.1, 2.0) > 0.1);
        assert_eq!(frame_blend(0.1, 0.0), 0.0);
    }
}
