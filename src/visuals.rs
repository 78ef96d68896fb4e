use crate::camera::sync_camera;
use crate::config::*;
use crate::events::FishEaten;
use crate::fish::{Facing, Fish, Player};
use crate::game::GameState;
use crate::species::{FishKind, SpecialKind};
use crate::world::{WorldBounds, frames_in};
use crate::SimulationSet;
use bevy::prelude::*;
use rand::Rng;

/// Water colour outside the world rectangle
pub const ABYSS_COLOR: Color = Color::srgb(0.02, 0.05, 0.12);
/// Water colour inside the world rectangle
pub const WATER_COLOR: Color = Color::srgb(0.05, 0.22, 0.38);

/// Shared meshes, built once at startup. Fish meshes are unit sized and
/// scaled by the fish's size.
#[derive(Resource)]
pub struct FishMeshes {
    pub body: Handle<Mesh>,
    pub tail: Handle<Mesh>,
    pub eye: Handle<Mesh>,
    pub eye_material: Handle<ColorMaterial>,
    pub particle: Handle<Mesh>,
}

/// Render-side state attached to every fish
#[derive(Component)]
pub struct FishVisual {
    pub tail: Entity,
    pub material: Handle<ColorMaterial>,
    pub shown: FishKind,
}

#[derive(Component)]
pub struct FishTail;

#[derive(Component)]
pub struct Backdrop;

/// Burst fragment left behind by a meal
#[derive(Component, Debug, Clone)]
pub struct Particle {
    pub velocity: Vec2,
    pub life: f32,
    pub decay: f32,
}

impl Particle {
    /// Pull applied to the vertical velocity each frame
    pub const SINK: f32 = 0.1;

    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            velocity: Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)),
            life: 1.0,
            decay: rng.gen_range(0.02..0.04),
        }
    }

    /// Advance by `frames` reference frames and return the displacement
    pub fn step(&mut self, frames: f32) -> Vec2 {
        let moved = self.velocity * frames;
        self.velocity.y -= Self::SINK * frames;
        self.life -= self.decay * frames;
        moved
    }

    pub fn is_spent(&self) -> bool {
        self.life <= 0.0
    }
}

/// Number of particles a meal may add without going over the cap
pub fn burst_size(special: bool, live: usize, tuning: &PresentationTuning) -> usize {
    let wanted = if special {
        tuning.special_meal_particles
    } else {
        tuning.meal_particles
    };
    wanted.min(tuning.max_particles.saturating_sub(live))
}

/// Colour a fish is drawn with at its current age
pub fn display_color(fish: &Fish) -> Color {
    match fish.kind {
        FishKind::Special(SpecialKind::Rainbow) => Color::hsl((fish.age * 120.0).rem_euclid(360.0), 0.9, 0.6),
        FishKind::Special(SpecialKind::Ghost) => fish
            .kind
            .color()
            .with_alpha(0.45 + 0.25 * (fish.age * 3.0).sin()),
        kind => kind.color(),
    }
}

fn draw_depth(fish: &Fish, is_player: bool) -> f32 {
    if is_player {
        2.0
    } else {
        // larger fish swim over smaller ones
        1.0 + fish.size * 0.001
    }
}

pub fn setup_fish_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.insert_resource(FishMeshes {
        body: meshes.add(Ellipse::new(1.0, 0.6)),
        tail: meshes.add(Triangle2d::new(
            Vec2::ZERO,
            Vec2::new(-0.7, 0.5),
            Vec2::new(-0.7, -0.5),
        )),
        eye: meshes.add(Circle::new(0.12)),
        eye_material: materials.add(ColorMaterial::from_color(Color::srgb(0.95, 0.95, 0.95))),
        particle: meshes.add(Circle::new(1.0)),
    });
}

pub fn spawn_backdrop(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    bounds: Res<WorldBounds>,
) {
    commands.spawn((
        Backdrop,
        Mesh2d(meshes.add(Rectangle::new(1.0, 1.0))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(WATER_COLOR))),
        Transform::from_xyz(0.0, 0.0, -10.0).with_scale(bounds.size().extend(1.0)),
    ));
}

pub fn resize_backdrop(bounds: Res<WorldBounds>, mut backdrops: Query<&mut Transform, With<Backdrop>>) {
    if !bounds.is_changed() {
        return;
    }
    for mut transform in backdrops.iter_mut() {
        transform.scale = bounds.size().extend(1.0);
    }
}

/// Give newly spawned fish a body, tail and eye
pub fn attach_fish_visuals(
    mut commands: Commands,
    assets: Res<FishMeshes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    fish: Query<(Entity, &Fish, Has<Player>), Added<Fish>>,
) {
    for (entity, fish, is_player) in fish.iter() {
        let material = materials.add(ColorMaterial::from_color(display_color(fish)));
        let mut tail = Entity::PLACEHOLDER;

        commands
            .entity(entity)
            .insert((
                Mesh2d(assets.body.clone()),
                MeshMaterial2d(material.clone()),
                Transform::from_translation(fish.position.extend(draw_depth(fish, is_player)))
                    .with_scale(Vec3::new(fish.size, fish.size, 1.0)),
            ))
            .with_children(|parent| {
                tail = parent
                    .spawn((
                        FishTail,
                        Mesh2d(assets.tail.clone()),
                        MeshMaterial2d(material.clone()),
                        Transform::from_xyz(-0.8, 0.0, -0.01),
                    ))
                    .id();
                parent.spawn((
                    Mesh2d(assets.eye.clone()),
                    MeshMaterial2d(assets.eye_material.clone()),
                    Transform::from_xyz(0.55, 0.15, 0.01),
                ));
            });

        commands.entity(entity).insert(FishVisual {
            tail,
            material,
            shown: fish.kind,
        });
    }
}

/// Copy simulation state onto transforms: position, size, facing, tail wag
pub fn sync_fish_transforms(
    mut fish: Query<(&Fish, &FishVisual, &mut Transform, Has<Player>), Without<FishTail>>,
    mut tails: Query<&mut Transform, (With<FishTail>, Without<Fish>)>,
) {
    for (fish, visual, mut transform, is_player) in fish.iter_mut() {
        transform.translation = fish.position.extend(draw_depth(fish, is_player));

        if is_player {
            let flip = if fish.facing == Facing::Left { -1.0 } else { 1.0 };
            transform.rotation = Quat::IDENTITY;
            transform.scale = Vec3::new(fish.size * flip, fish.size, 1.0);
        } else {
            // keep the fish belly-down when it swims leftward
            let flip = if fish.facing == Facing::Left { -1.0 } else { 1.0 };
            transform.rotation = Quat::from_rotation_z(fish.heading);
            transform.scale = Vec3::new(fish.size, fish.size * flip, 1.0);
        }

        if let Ok(mut tail) = tails.get_mut(visual.tail) {
            tail.rotation = Quat::from_rotation_z(fish.tail_phase.sin() * 0.35);
        }
    }
}

/// Follow species changes and the animated special colours
pub fn recolor_fish(mut materials: ResMut<Assets<ColorMaterial>>, mut fish: Query<(&Fish, &mut FishVisual)>) {
    for (fish, mut visual) in fish.iter_mut() {
        if visual.shown == fish.kind && !fish.is_special() {
            continue;
        }
        if let Some(material) = materials.get_mut(&visual.material) {
            material.color = display_color(fish);
        }
        visual.shown = fish.kind;
    }
}

pub fn spawn_meal_particles(
    mut commands: Commands,
    config: Res<GameConfig>,
    assets: Res<FishMeshes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut eaten: EventReader<FishEaten>,
    particles: Query<(), With<Particle>>,
) {
    let mut live = particles.iter().count();
    let mut rng = rand::thread_rng();

    for meal in eaten.read() {
        let count = burst_size(meal.kind.is_special(), live, &config.presentation);
        let color = meal.kind.color();
        for _ in 0..count {
            let radius = rng.gen_range(2.0..7.0);
            commands.spawn((
                Particle::random(&mut rng),
                Mesh2d(assets.particle.clone()),
                MeshMaterial2d(materials.add(ColorMaterial::from_color(color))),
                Transform::from_translation(meal.position.extend(3.0)).with_scale(Vec3::splat(radius)),
            ));
        }
        live += count;
    }
}

pub fn update_particles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut particles: Query<(Entity, &mut Particle, &mut Transform, &MeshMaterial2d<ColorMaterial>)>,
) {
    let frames = frames_in(time.delta_secs(), config.world.reference_fps);
    for (entity, mut particle, mut transform, material) in particles.iter_mut() {
        let moved = particle.step(frames);
        if particle.is_spent() {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation += moved.extend(0.0);
        if let Some(material) = materials.get_mut(&material.0) {
            material.color.set_alpha(particle.life.clamp(0.0, 1.0));
        }
    }
}

pub fn clear_particles(mut commands: Commands, particles: Query<Entity, With<Particle>>) {
    for entity in particles.iter() {
        commands.entity(entity).despawn();
    }
}

/// Meshes, particles and camera sync for the windowed game
pub struct FishVisualsPlugin;

impl Plugin for FishVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(ABYSS_COLOR))
            .add_systems(Startup, (setup_fish_meshes, spawn_backdrop))
            .add_systems(OnEnter(GameState::Running), clear_particles)
            .add_systems(
                Update,
                (
                    attach_fish_visuals,
                    sync_fish_transforms,
                    recolor_fish,
                    spawn_meal_particles,
                    update_particles,
                    resize_backdrop,
                    sync_camera,
                )
                    .chain()
                    .after(SimulationSet),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn bursts_respect_the_particle_cap() {
        let tuning = PresentationTuning::default();
        assert_eq!(burst_size(false, 0, &tuning), 15);
        assert_eq!(burst_size(true, 0, &tuning), 30);
        assert_eq!(burst_size(true, 90, &tuning), 10);
        assert_eq!(burst_size(false, 100, &tuning), 0);
        assert_eq!(burst_size(false, 250, &tuning), 0);
    }

    #[test]
    fn particles_fall_and_fade() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut particle = Particle::random(&mut rng);
        let start_vy = particle.velocity.y;
        particle.step(1.0);
        assert!((particle.velocity.y - (start_vy - Particle::SINK)).abs() < 1e-6);
        assert!(particle.life < 1.0);

        let mut frames = 0;
        while !particle.is_spent() {
            particle.step(1.0);
            frames += 1;
        }
        assert!(frames <= 50);
    }

    #[test]
    fn ghost_fish_are_translucent() {
        let ghost = Fish::special(SpecialKind::Ghost, Vec2::ZERO, 0.0, 100.0);
        assert!(display_color(&ghost).alpha() < 1.0);
        let normal = Fish::enemy(Vec2::ZERO, 10.0, 1.0, 0.0, 60.0);
        assert_eq!(display_color(&normal), normal.kind.color());
    }
}
