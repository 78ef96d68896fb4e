//! Configuration constants and the tunable game configuration resource

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// WORLD SETTINGS
// ============================================================================

/// Viewport size assumed before a window reports its real size
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

/// World extents as a multiple of the viewport (3x3 screens)
pub const WORLD_SCALE: f32 = 3.0;

/// Frame rate the per-frame tuning values were authored against
pub const REFERENCE_FPS: f32 = 60.0;

// ============================================================================
// FISH SIZE & GROWTH
// ============================================================================

/// Smallest size any fish can have
pub const MIN_FISH_SIZE: f32 = 5.0;

/// Largest size any fish can reach
pub const MAX_FISH_SIZE: f32 = 80.0;

/// Size the player starts each run with
pub const PLAYER_START_SIZE: f32 = 15.0;

/// Multiplier applied to every raw growth amount
pub const GROWTH_RATE: f32 = 0.15;

/// Raw growth gained per unit of eaten fish size
pub const MEAL_GROWTH_FACTOR: f32 = 0.05;

/// Speed formula: speed = SPEED_BASE + SPEED_SIZE_FACTOR / size (units per frame)
pub const SPEED_BASE: f32 = 3.0;
pub const SPEED_SIZE_FACTOR: f32 = 20.0;

// ============================================================================
// PLAYER MOVEMENT
// ============================================================================

/// Fraction of the distance to the pointer covered per frame while seeking
pub const PLAYER_SEEK_GAIN: f32 = 0.15;

/// Seek speed is capped at speed * PLAYER_BURST_MULTIPLIER
pub const PLAYER_BURST_MULTIPLIER: f32 = 3.0;

/// Inside this distance the player eases onto the pointer instead of swimming
pub const PLAYER_ARRIVE_RADIUS: f32 = 10.0;

/// Easing fraction per frame inside the arrive radius
pub const PLAYER_ARRIVE_EASING: f32 = 0.1;

/// Horizontal delta below which the player keeps its current facing
pub const FACING_DEADZONE: f32 = 5.0;

// ============================================================================
// CONTACT RULES
// ============================================================================

/// Player eats an enemy when player.size > enemy.size * EAT_THRESHOLD
pub const EAT_THRESHOLD: f32 = 1.1;

/// Player is eaten when player.size < enemy.size * DEATH_THRESHOLD
pub const DEATH_THRESHOLD: f32 = 0.9;

// ============================================================================
// ENEMY BEHAVIOUR
// ============================================================================

/// Distance at which an enemy notices the player
pub const ESCAPE_RADIUS: f32 = 250.0;

/// Player must be this many times larger for an enemy to flee
pub const ESCAPE_SIZE_RATIO: f32 = 1.2;

/// Heading blend per frame while fleeing
pub const ESCAPE_TURN_RATE: f32 = 0.03;

/// How much an enemy slows down over its lifetime
pub const AGE_SLOWDOWN: f32 = 0.3;

/// Lower bound on the age speed factor
pub const AGE_SPEED_FLOOR: f32 = 0.5;

/// Lifetime of a normal enemy in seconds
pub const ENEMY_LIFETIME_MIN: f32 = 40.0;
pub const ENEMY_LIFETIME_MAX: f32 = 80.0;

/// Lifetime of a special fish in seconds
pub const SPECIAL_LIFETIME_MIN: f32 = 80.0;
pub const SPECIAL_LIFETIME_MAX: f32 = 120.0;

/// Cruise speed of a normal enemy as a fraction of its size-derived speed
pub const ENEMY_CRUISE_MIN: f32 = 0.3;
pub const ENEMY_CRUISE_MAX: f32 = 0.6;

/// Enemies outside the world by more than EXIT_MARGIN_BASE + size * EXIT_MARGIN_SIZE_FACTOR swim off
pub const EXIT_MARGIN_BASE: f32 = 250.0;
pub const EXIT_MARGIN_SIZE_FACTOR: f32 = 3.0;

// ============================================================================
// POPULATION
// ============================================================================

/// Share of spawns sized to be eatable by the player
pub const EATABLE_SPAWN_CHANCE: f64 = 0.75;

/// Eatable spawns are sized within this fraction of the player size
pub const EATABLE_BAND_MIN: f32 = 0.3;
pub const EATABLE_BAND_MAX: f32 = 0.9;

/// Dangerous spawns are sized within this multiple of the player size
pub const DANGER_BAND_MIN: f32 = 1.1;
pub const DANGER_BAND_MAX: f32 = 2.0;

/// Distance outside the world edge where enemies appear
pub const SPAWN_MARGIN: f32 = 200.0;

/// Total spread (radians) around the inward heading of a new enemy
pub const SPAWN_HEADING_JITTER: f32 = 0.5;

/// On-screen population band the spawner steers toward
pub const SCREEN_LOW_WATER: usize = 8;
pub const SCREEN_HIGH_WATER: usize = 15;

/// Fish this far outside the view still count as on screen
pub const ON_SCREEN_MARGIN: f32 = 100.0;

/// Delay before the next spawn when the screen is sparse
pub const FAST_SPAWN_DELAY: f32 = 0.8;

/// Delay range before the next spawn under normal density
pub const NORMAL_SPAWN_DELAY_MIN: f32 = 2.0;
pub const NORMAL_SPAWN_DELAY_MAX: f32 = 3.0;

/// Delay before retrying when the population is saturated
pub const SATURATED_SPAWN_DELAY: f32 = 3.0;

/// Hard cap on live enemies: MAX_ENEMIES_BASE + MAX_ENEMIES_PER_100_POINTS per 100 points
pub const MAX_ENEMIES_BASE: usize = 25;
pub const MAX_ENEMIES_PER_100_POINTS: usize = 5;

/// Opening school released when a run starts
pub const OPENING_SCHOOL_SIZE: u32 = 5;
pub const OPENING_SCHOOL_INTERVAL: f32 = 0.4;
pub const OPENING_FISH_SIZE_MIN: f32 = 8.0;
pub const OPENING_FISH_SIZE_MAX: f32 = 15.0;

/// Opening fish appear this many viewport widths away from the player
pub const OPENING_DISTANCE_FACTOR: f32 = 0.8;

// ============================================================================
// SPECIAL FISH
// ============================================================================

/// Seconds between special fish rolls
pub const SPECIAL_SPAWN_INTERVAL: f32 = 20.0;

/// Distance outside the world edge where special fish appear
pub const SPECIAL_SPAWN_MARGIN: f32 = 50.0;

/// Independent chance per roll for each special kind (disjoint bands)
pub const GOLDEN_CHANCE: f64 = 0.02;
pub const RAINBOW_CHANCE: f64 = 0.03;
pub const GHOST_CHANCE: f64 = 0.04;

// ============================================================================
// CAMERA
// ============================================================================

/// Zoom floor reached when the player is fully grown
pub const MIN_CAMERA_SCALE: f32 = 0.4;

/// Per-frame easing of the zoom toward its target
pub const ZOOM_DAMPING: f32 = 0.05;

/// Per-frame easing of the camera centre toward its target
pub const PAN_DAMPING: f32 = 0.1;

/// Edge-scroll trigger band as a fraction of the viewport width
pub const EDGE_MARGIN: f32 = 0.15;

/// Edge-scroll nudge per pixel of pointer depth into the band
pub const EDGE_SCROLL_SPEED: f32 = 0.03;

// ============================================================================
// PRESENTATION
// ============================================================================

/// Maximum number of live particles
pub const MAX_PARTICLES: usize = 100;

/// Particles released by an ordinary and a special meal
pub const MEAL_PARTICLES: usize = 15;
pub const SPECIAL_MEAL_PARTICLES: usize = 30;

/// Seconds a HUD notice stays visible
pub const NOTICE_DURATION: f32 = 3.0;

/// Delay between run start and the ambience starting
pub const AMBIENCE_START_DELAY: f32 = 0.5;

// ============================================================================
// CONFIGURATION RESOURCE
// ============================================================================

/// Config file read at startup when present
pub const CONFIG_FILE: &str = "bigfish.toml";

/// Environment variable overriding the config file path
pub const CONFIG_ENV_VAR: &str = "BIGFISH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Tuning presets matching the successive revisions of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    /// Short-lived fish with a tighter escape radius
    Classic,
    /// Long-lived fish and the wider escape radius
    #[default]
    Deep,
}

/// Half-open float range, written as `{ min = .., max = .. }` in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value, tolerating degenerate spans
    pub fn sample(&self, rng: &mut impl rand::Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub world_scale: f32,
    pub reference_fps: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            world_scale: WORLD_SCALE,
            reference_fps: REFERENCE_FPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthTuning {
    pub min_size: f32,
    pub max_size: f32,
    pub start_size: f32,
    pub growth_rate: f32,
    pub meal_factor: f32,
    pub speed_base: f32,
    pub speed_size_factor: f32,
}

impl Default for GrowthTuning {
    fn default() -> Self {
        Self {
            min_size: MIN_FISH_SIZE,
            max_size: MAX_FISH_SIZE,
            start_size: PLAYER_START_SIZE,
            growth_rate: GROWTH_RATE,
            meal_factor: MEAL_GROWTH_FACTOR,
            speed_base: SPEED_BASE,
            speed_size_factor: SPEED_SIZE_FACTOR,
        }
    }
}

impl GrowthTuning {
    /// Speed for a fish of the given size; smaller fish are faster
    pub fn speed_for_size(&self, size: f32) -> f32 {
        self.speed_base + self.speed_size_factor / size.max(f32::EPSILON)
    }

    pub fn clamp_size(&self, size: f32) -> f32 {
        size.clamp(self.min_size, self.max_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub seek_gain: f32,
    pub burst_multiplier: f32,
    pub arrive_radius: f32,
    pub arrive_easing: f32,
    pub facing_deadzone: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            seek_gain: PLAYER_SEEK_GAIN,
            burst_multiplier: PLAYER_BURST_MULTIPLIER,
            arrive_radius: PLAYER_ARRIVE_RADIUS,
            arrive_easing: PLAYER_ARRIVE_EASING,
            facing_deadzone: FACING_DEADZONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    pub eat_threshold: f32,
    pub death_threshold: f32,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            eat_threshold: EAT_THRESHOLD,
            death_threshold: DEATH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub escape_radius: f32,
    pub escape_size_ratio: f32,
    pub escape_turn_rate: f32,
    pub age_slowdown: f32,
    pub age_speed_floor: f32,
    pub lifetime: Span,
    pub cruise: Span,
    pub exit_margin_base: f32,
    pub exit_margin_size_factor: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            escape_radius: ESCAPE_RADIUS,
            escape_size_ratio: ESCAPE_SIZE_RATIO,
            escape_turn_rate: ESCAPE_TURN_RATE,
            age_slowdown: AGE_SLOWDOWN,
            age_speed_floor: AGE_SPEED_FLOOR,
            lifetime: Span::new(ENEMY_LIFETIME_MIN, ENEMY_LIFETIME_MAX),
            cruise: Span::new(ENEMY_CRUISE_MIN, ENEMY_CRUISE_MAX),
            exit_margin_base: EXIT_MARGIN_BASE,
            exit_margin_size_factor: EXIT_MARGIN_SIZE_FACTOR,
        }
    }
}

impl EnemyTuning {
    pub fn exit_margin(&self, size: f32) -> f32 {
        self.exit_margin_base + size * self.exit_margin_size_factor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub eatable_chance: f64,
    pub eatable_band: Span,
    pub danger_band: Span,
    pub spawn_margin: f32,
    pub heading_jitter: f32,
    pub screen_low_water: usize,
    pub screen_high_water: usize,
    pub on_screen_margin: f32,
    pub fast_delay: f32,
    pub normal_delay: Span,
    pub saturated_delay: f32,
    pub max_enemies_base: usize,
    pub max_enemies_per_100_points: usize,
    pub opening_school: u32,
    pub opening_interval: f32,
    pub opening_size: Span,
    pub opening_distance_factor: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            eatable_chance: EATABLE_SPAWN_CHANCE,
            eatable_band: Span::new(EATABLE_BAND_MIN, EATABLE_BAND_MAX),
            danger_band: Span::new(DANGER_BAND_MIN, DANGER_BAND_MAX),
            spawn_margin: SPAWN_MARGIN,
            heading_jitter: SPAWN_HEADING_JITTER,
            screen_low_water: SCREEN_LOW_WATER,
            screen_high_water: SCREEN_HIGH_WATER,
            on_screen_margin: ON_SCREEN_MARGIN,
            fast_delay: FAST_SPAWN_DELAY,
            normal_delay: Span::new(NORMAL_SPAWN_DELAY_MIN, NORMAL_SPAWN_DELAY_MAX),
            saturated_delay: SATURATED_SPAWN_DELAY,
            max_enemies_base: MAX_ENEMIES_BASE,
            max_enemies_per_100_points: MAX_ENEMIES_PER_100_POINTS,
            opening_school: OPENING_SCHOOL_SIZE,
            opening_interval: OPENING_SCHOOL_INTERVAL,
            opening_size: Span::new(OPENING_FISH_SIZE_MIN, OPENING_FISH_SIZE_MAX),
            opening_distance_factor: OPENING_DISTANCE_FACTOR,
        }
    }
}

impl SpawnTuning {
    /// Live enemy cap for the given score
    pub fn max_enemies(&self, score: u32) -> usize {
        self.max_enemies_base + self.max_enemies_per_100_points * (score as usize / 100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTuning {
    pub interval: f32,
    pub spawn_margin: f32,
    pub golden_chance: f64,
    pub rainbow_chance: f64,
    pub ghost_chance: f64,
    pub lifetime: Span,
}

impl Default for SpecialTuning {
    fn default() -> Self {
        Self {
            interval: SPECIAL_SPAWN_INTERVAL,
            spawn_margin: SPECIAL_SPAWN_MARGIN,
            golden_chance: GOLDEN_CHANCE,
            rainbow_chance: RAINBOW_CHANCE,
            ghost_chance: GHOST_CHANCE,
            lifetime: Span::new(SPECIAL_LIFETIME_MIN, SPECIAL_LIFETIME_MAX),
        }
    }
}

impl SpecialTuning {
    pub fn total_chance(&self) -> f64 {
        self.golden_chance + self.rainbow_chance + self.ghost_chance
    }
}

/// How the camera picks where to look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanPolicy {
    /// Centre on the player
    FollowPlayer,
    /// Pan only while the pointer sits near a viewport edge
    #[default]
    EdgeScroll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub pan_policy: PanPolicy,
    pub min_scale: f32,
    pub zoom_damping: f32,
    pub pan_damping: f32,
    pub edge_margin: f32,
    pub edge_scroll_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            pan_policy: PanPolicy::default(),
            min_scale: MIN_CAMERA_SCALE,
            zoom_damping: ZOOM_DAMPING,
            pan_damping: PAN_DAMPING,
            edge_margin: EDGE_MARGIN,
            edge_scroll_speed: EDGE_SCROLL_SPEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationTuning {
    pub max_particles: usize,
    pub meal_particles: usize,
    pub special_meal_particles: usize,
    pub notice_duration: f32,
    pub ambience_delay: f32,
}

impl Default for PresentationTuning {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            meal_particles: MEAL_PARTICLES,
            special_meal_particles: SPECIAL_MEAL_PARTICLES,
            notice_duration: NOTICE_DURATION,
            ambience_delay: AMBIENCE_START_DELAY,
        }
    }
}

/// Every tunable of the game, grouped by concern
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub revision: Revision,
    pub world: WorldTuning,
    pub growth: GrowthTuning,
    pub player: PlayerTuning,
    pub contact: ContactTuning,
    pub enemy: EnemyTuning,
    pub spawn: SpawnTuning,
    pub special: SpecialTuning,
    pub camera: CameraTuning,
    pub presentation: PresentationTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Revision::Deep)
    }
}

impl GameConfig {
    /// Defaults for a given revision of the game
    pub fn preset(revision: Revision) -> Self {
        let mut enemy = EnemyTuning::default();
        if revision == Revision::Classic {
            enemy.escape_radius = 200.0;
            enemy.lifetime = Span::new(15.0, 30.0);
        }
        Self {
            revision,
            world: WorldTuning::default(),
            growth: GrowthTuning::default(),
            player: PlayerTuning::default(),
            contact: ContactTuning::default(),
            enemy,
            spawn: SpawnTuning::default(),
            special: SpecialTuning::default(),
            camera: CameraTuning::default(),
            presentation: PresentationTuning::default(),
        }
    }

    /// Parse a TOML document. A `revision` key picks the preset the remaining
    /// keys are layered over.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(contents)?;
        let revision = match table.get("revision") {
            Some(value) => Revision::deserialize(value.clone())?,
            None => Revision::default(),
        };
        let mut merged = match toml::Value::try_from(Self::preset(revision)) {
            Ok(toml::Value::Table(preset)) => preset,
            Ok(_) => return Err(ConfigError::Invalid("preset is not a table".to_string())),
            Err(err) => return Err(ConfigError::Invalid(err.to_string())),
        };
        merge_tables(&mut merged, table);
        let config = Self::deserialize(toml::Value::Table(merged))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Reject tunings that would break the simulation rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let g = &self.growth;
        if !(g.min_size > 0.0 && g.min_size <= g.start_size && g.start_size <= g.max_size) {
            return invalid("sizes must satisfy 0 < min_size <= start_size <= max_size");
        }
        if g.growth_rate < 0.0 || g.meal_factor < 0.0 {
            return invalid("growth rates must not be negative");
        }

        let c = &self.contact;
        if !(c.eat_threshold > 1.0 && 1.0 > c.death_threshold && c.death_threshold > 0.0) {
            return invalid("contact thresholds must satisfy eat > 1 > death > 0");
        }

        let e = &self.enemy;
        if !e.lifetime.is_ordered() || e.lifetime.min <= 0.0 || !e.cruise.is_ordered() {
            return invalid("enemy lifetime and cruise spans must be ordered and positive");
        }
        if !(e.age_speed_floor > 0.0 && e.age_speed_floor <= 1.0) {
            return invalid("age speed floor must lie in (0, 1]");
        }

        let s = &self.spawn;
        if !(0.0..=1.0).contains(&s.eatable_chance) {
            return invalid("eatable spawn chance must lie in [0, 1]");
        }
        if !s.eatable_band.is_ordered() || !s.danger_band.is_ordered() || !s.normal_delay.is_ordered() {
            return invalid("spawn bands must be ordered");
        }
        if s.screen_low_water > s.screen_high_water {
            return invalid("screen low water must not exceed high water");
        }
        if s.max_enemies_base == 0 {
            return invalid("max enemies must be at least one");
        }

        let sp = &self.special;
        if sp.interval <= 0.0 || !sp.lifetime.is_ordered() {
            return invalid("special interval and lifetime must be positive and ordered");
        }
        if sp.total_chance() >= 1.0 {
            return invalid("special chances must sum below 1");
        }

        let cam = &self.camera;
        if !(cam.min_scale > 0.0 && cam.min_scale <= 1.0) {
            return invalid("camera min scale must lie in (0, 1]");
        }
        if !(0.0..=1.0).contains(&cam.zoom_damping) || !(0.0..=1.0).contains(&cam.pan_damping) {
            return invalid("camera damping must lie in [0, 1]");
        }

        if self.world.world_scale < 1.0 || self.world.reference_fps <= 0.0 {
            return invalid("world must be at least one viewport and fps positive");
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Path of the config file the binary should read
pub fn config_path() -> std::path::PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(Into::into)
        .unwrap_or_else(|| CONFIG_FILE.into())
}

/// Startup system: replace the default config with the on-disk one when present
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = config_path();
    if !path.exists() {
        info!("No config at {}, using {:?} defaults", path.display(), config.revision);
        return;
    }
    match GameConfig::load(&path) {
        Ok(loaded) => {
            info!("Loaded {:?} config from {}", loaded.revision, path.display());
            *config = loaded;
        }
        Err(err) => warn!("Ignoring config at {}: {}", path.display(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::preset(Revision::Classic).validate().is_ok());
    }

    #[test]
    fn classic_preset_uses_early_constants() {
        let classic = GameConfig::preset(Revision::Classic);
        assert_eq!(classic.enemy.escape_radius, 200.0);
        assert_eq!(classic.enemy.lifetime, Span::new(15.0, 30.0));
        assert_eq!(GameConfig::default().enemy.escape_radius, 250.0);
    }

    #[test]
    fn overlapping_thresholds_are_rejected() {
        let mut config = GameConfig::default();
        config.contact.eat_threshold = 0.95;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn special_chances_must_leave_room_for_nothing() {
        let mut config = GameConfig::default();
        config.special.ghost_chance = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config = GameConfig::from_toml(
            r#"
            revision = "classic"

            [contact]
            eat_threshold = 1.25

            [camera]
            pan_policy = "follow_player"
            "#,
        )
        .unwrap();
        assert_eq!(config.revision, Revision::Classic);
        assert_eq!(config.contact.eat_threshold, 1.25);
        assert_eq!(config.contact.death_threshold, DEATH_THRESHOLD);
        assert_eq!(config.camera.pan_policy, PanPolicy::FollowPlayer);
        assert_eq!(config.enemy.escape_radius, 200.0);
    }

    #[test]
    fn invalid_toml_values_fail_validation() {
        let result = GameConfig::from_toml("[camera]\nmin_scale = 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn enemy_cap_grows_with_score() {
        let spawn = SpawnTuning::default();
        assert_eq!(spawn.max_enemies(0), 25);
        assert_eq!(spawn.max_enemies(99), 25);
        assert_eq!(spawn.max_enemies(250), 35);
    }
}
