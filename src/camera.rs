use crate::config::*;
use crate::fish::{Fish, Player};
use crate::input::Pointer;
use crate::world::{Viewport, WorldBounds, frame_blend, frames_in};
use bevy::prelude::*;

#[derive(Component)]
pub struct MainCamera;

/// View transform applied before rendering. `scale` is the zoom factor
/// (1.0 = one world unit per pixel, smaller = zoomed out) and `center` is
/// the world point in the middle of the viewport.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub scale: f32,
    pub target_scale: f32,
    pub center: Vec2,
    pub target_center: Vec2,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            target_scale: 1.0,
            center: Vec2::ZERO,
            target_center: Vec2::ZERO,
        }
    }
}

impl CameraRig {
    /// Zoom for a player of the given size: 1.0 at the starting size, falling
    /// linearly to `min_scale` at the maximum size
    pub fn target_scale_for(size: f32, growth: &GrowthTuning, tuning: &CameraTuning) -> f32 {
        let span = (growth.max_size - growth.start_size).max(f32::EPSILON);
        let progress = (size - growth.start_size) / span;
        (1.0 - progress * (1.0 - tuning.min_scale)).clamp(tuning.min_scale, 1.0)
    }

    /// Half the visible area in world units
    pub fn visible_half_extents(&self, viewport: &Viewport) -> Vec2 {
        viewport.size * 0.5 / self.scale
    }

    /// Clamp a centre so the view never shows space outside the world
    pub fn clamp_center(&self, center: Vec2, viewport: &Viewport, bounds: &WorldBounds) -> Vec2 {
        let limit = (bounds.half_extents - self.visible_half_extents(viewport)).max(Vec2::ZERO);
        center.clamp(-limit, limit)
    }

    /// Per-frame pan requested by a pointer sitting inside the edge band, in
    /// world units
    pub fn edge_nudge(&self, pointer: Vec2, viewport: &Viewport, tuning: &CameraTuning) -> Vec2 {
        let margin = viewport.size.x * tuning.edge_margin;
        let depth = |p: f32, extent: f32| {
            if p < margin {
                -(margin - p)
            } else if p > extent - margin {
                p - (extent - margin)
            } else {
                0.0
            }
        };
        // screen y grows downward, world y upward
        let screen = Vec2::new(depth(pointer.x, viewport.size.x), depth(pointer.y, viewport.size.y));
        Vec2::new(screen.x, -screen.y) * tuning.edge_scroll_speed / self.scale
    }

    /// Advance zoom and pan by `frames` reference frames
    pub fn update(
        &mut self,
        focus: Option<&Fish>,
        pointer: Vec2,
        viewport: &Viewport,
        bounds: &WorldBounds,
        config: &GameConfig,
        frames: f32,
    ) {
        let tuning = &config.camera;

        if let Some(fish) = focus {
            self.target_scale = Self::target_scale_for(fish.size, &config.growth, tuning);
        }
        self.scale += (self.target_scale - self.scale) * frame_blend(tuning.zoom_damping, frames);
        self.scale = self.scale.clamp(tuning.min_scale, 1.0);

        let target = match (tuning.pan_policy, focus) {
            (PanPolicy::FollowPlayer, Some(fish)) => fish.position,
            (PanPolicy::FollowPlayer, None) => self.target_center,
            (PanPolicy::EdgeScroll, _) => self.center + self.edge_nudge(pointer, viewport, tuning) * frames,
        };
        self.target_center = self.clamp_center(target, viewport, bounds);
        self.center += (self.target_center - self.center) * frame_blend(tuning.pan_damping, frames);
        self.center = self.clamp_center(self.center, viewport, bounds);
    }

    /// Map a viewport position (pixels, origin top-left) to world space
    pub fn viewport_to_world(&self, screen: Vec2, viewport: &Viewport) -> Vec2 {
        let offset = screen - viewport.size * 0.5;
        self.center + Vec2::new(offset.x, -offset.y) / self.scale
    }

    /// Map a world position to the viewport (pixels, origin top-left)
    pub fn world_to_viewport(&self, world: Vec2, viewport: &Viewport) -> Vec2 {
        let offset = (world - self.center) * self.scale;
        Vec2::new(offset.x, -offset.y) + viewport.size * 0.5
    }

    /// Whether a world point is within `margin` pixels of the viewport
    pub fn is_on_screen(&self, world: Vec2, viewport: &Viewport, margin: f32) -> bool {
        let screen = self.world_to_viewport(world, viewport);
        screen.x >= -margin
            && screen.x <= viewport.size.x + margin
            && screen.y >= -margin
            && screen.y <= viewport.size.y + margin
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        MainCamera,
        Transform::from_xyz(0.0, 0.0, 0.0),
        OrthographicProjection {
            scale: 1.0,
            ..OrthographicProjection::default_2d()
        },
    ));
}

/// System easing the camera rig toward the player
pub fn update_camera_rig(
    time: Res<Time>,
    config: Res<GameConfig>,
    pointer: Res<Pointer>,
    viewport: Res<Viewport>,
    bounds: Res<WorldBounds>,
    players: Query<&Fish, With<Player>>,
    mut rig: ResMut<CameraRig>,
) {
    let frames = frames_in(time.delta_secs(), config.world.reference_fps);
    rig.update(
        players.get_single().ok(),
        pointer.screen,
        &viewport,
        &bounds,
        &config,
        frames,
    );
}

/// System copying the rig onto the render camera
pub fn sync_camera(
    rig: Res<CameraRig>,
    mut query: Query<(&mut Transform, &mut OrthographicProjection), With<MainCamera>>,
) {
    if let Ok((mut transform, mut projection)) = query.get_single_mut() {
        transform.translation.x = rig.center.x;
        transform.translation.y = rig.center.y;
        // a larger projection scale shows more of the world
        projection.scale = 1.0 / rig.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            size: Vec2::new(800.0, 600.0),
        }
    }

    fn bounds() -> WorldBounds {
        WorldBounds::from_viewport(&viewport(), 3.0)
    }

    #[test]
    fn target_scale_spans_one_to_floor() {
        let growth = GrowthTuning::default();
        let tuning = CameraTuning::default();
        assert_eq!(CameraRig::target_scale_for(15.0, &growth, &tuning), 1.0);
        assert!((CameraRig::target_scale_for(80.0, &growth, &tuning) - 0.4).abs() < 1e-6);
        assert!((CameraRig::target_scale_for(47.5, &growth, &tuning) - 0.7).abs() < 1e-5);
        assert_eq!(CameraRig::target_scale_for(5.0, &growth, &tuning), 1.0);
        assert_eq!(CameraRig::target_scale_for(200.0, &growth, &tuning), 0.4);
    }

    #[test]
    fn zoom_eases_instead_of_snapping() {
        let config = GameConfig::default();
        let mut fish = Fish::player(Vec2::ZERO, &config.growth);
        fish.size = 80.0;
        let mut rig = CameraRig::default();
        rig.update(Some(&fish), Vec2::new(400.0, 300.0), &viewport(), &bounds(), &config, 1.0);
        assert!((rig.scale - 0.97).abs() < 1e-5);

        for _ in 0..1000 {
            rig.update(Some(&fish), Vec2::new(400.0, 300.0), &viewport(), &bounds(), &config, 1.0);
            assert!(rig.scale >= config.camera.min_scale && rig.scale <= 1.0);
        }
        assert!((rig.scale - 0.4).abs() < 1e-3);
    }

    #[test]
    fn edge_scroll_pans_toward_pointer_edge_and_stays_in_world() {
        let config = GameConfig::default();
        let mut rig = CameraRig::default();
        // pointer hugging the right edge
        for _ in 0..10_000 {
            rig.update(None, Vec2::new(799.0, 300.0), &viewport(), &bounds(), &config, 1.0);
        }
        let limit = bounds().half_extents - rig.visible_half_extents(&viewport());
        assert!(rig.center.x > 0.0);
        assert!(rig.center.x <= limit.x + 1e-3);
        assert_eq!(rig.center.y, 0.0);

        // pointer at the top edge pans upward in world space
        let mut rig = CameraRig::default();
        rig.update(None, Vec2::new(400.0, 0.0), &viewport(), &bounds(), &config, 1.0);
        assert!(rig.center.y > 0.0);
    }

    #[test]
    fn pointer_in_middle_keeps_camera_still() {
        let config = GameConfig::default();
        let mut rig = CameraRig::default();
        rig.update(None, Vec2::new(400.0, 300.0), &viewport(), &bounds(), &config, 1.0);
        assert_eq!(rig.center, Vec2::ZERO);
    }

    #[test]
    fn follow_policy_tracks_player_within_clamp() {
        let mut config = GameConfig::default();
        config.camera.pan_policy = PanPolicy::FollowPlayer;
        let fish = Fish::player(Vec2::new(5000.0, -5000.0), &config.growth);
        let mut rig = CameraRig::default();
        for _ in 0..500 {
            rig.update(Some(&fish), Vec2::ZERO, &viewport(), &bounds(), &config, 1.0);
        }
        let limit = bounds().half_extents - rig.visible_half_extents(&viewport());
        assert!((rig.center.x - limit.x).abs() < 1e-2);
        assert!((rig.center.y + limit.y).abs() < 1e-2);
    }

    #[test]
    fn view_wider_than_world_is_centred() {
        let rig = CameraRig {
            scale: 0.1,
            ..CameraRig::default()
        };
        let clamped = rig.clamp_center(Vec2::new(300.0, 300.0), &viewport(), &bounds());
        assert_eq!(clamped, Vec2::ZERO);
    }

    #[test]
    fn viewport_mapping_round_trips_through_zoom() {
        let rig = CameraRig {
            scale: 0.5,
            center: Vec2::new(100.0, 50.0),
            ..CameraRig::default()
        };
        let centre = rig.viewport_to_world(Vec2::new(400.0, 300.0), &viewport());
        assert_eq!(centre, Vec2::new(100.0, 50.0));
        let top_left = rig.viewport_to_world(Vec2::ZERO, &viewport());
        assert_eq!(top_left, Vec2::new(100.0 - 800.0, 50.0 + 600.0));
        assert_eq!(rig.world_to_viewport(top_left, &viewport()), Vec2::ZERO);
        assert!(rig.is_on_screen(top_left, &viewport(), 0.0));
        assert!(!rig.is_on_screen(top_left - Vec2::splat(500.0), &viewport(), 100.0));
    }
}
