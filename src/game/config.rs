use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::game::math::{fx, FixedNum};
use crate::game::steering::SteeringRng;

pub const NAV_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Navigation tuning loaded once at startup from RON.
///
/// Values are plain floats for readability; [`SteeringConfig`] holds the
/// fixed-point copy the simulation actually uses. Changing these mid-game
/// would desync lockstep peers, so there is no hot reload.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct NavConfig {
    // Simulation
    pub tick_rate: f64,
    pub rng_seed: u64,

    // Replan policy
    pub replan_priority_threshold: f32,
    pub target_moved_threshold: f32,
    pub replan_interval_low_priority: f32,
    pub replan_interval_high_priority: f32,
    pub replan_jitter: f32,
    pub forced_recheck_floor: f32,
    pub cost_hysteresis: f32,
    pub stale_anchor_ratio: f32,

    // Edge penalties
    pub full_open_threshold: f32,
    pub closed_door_penalty: f32,
    pub max_unassisted_climb: f32,
    pub fire_penalty_per_size: f32,
    pub deep_water_depth: f32,
    pub deep_water_penalty: f32,
    pub flooded_penalty: f32,
    pub pressure_protection_threshold: f32,
    pub climb_penalty_per_unit: f32,
    pub outside_node_penalty: f32,

    // Door & ladder protocol
    pub button_press_interval: f32,
    pub door_check_span: usize,
    pub door_speed_margin: f32,
    pub ladder_release_distance: f32,
    pub ladder_adjacency_tolerance: f32,

    // Body
    pub min_body_height: f32,
    pub min_body_width: f32,

    // Wander
    pub small_room_size: f32,
    pub wander_jitter: f32,

    // Path oracle
    pub max_search_iterations: usize,
    pub visibility_candidates: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            rng_seed: 0x5EA5_1DE5,
            replan_priority_threshold: 0.5,
            target_moved_threshold: 1.0,
            replan_interval_low_priority: 3.0,
            replan_interval_high_priority: 1.0,
            replan_jitter: 1.2,
            forced_recheck_floor: 1.0,
            cost_hysteresis: 0.95,
            stale_anchor_ratio: 3.0,
            full_open_threshold: 0.9,
            closed_door_penalty: 10.0,
            max_unassisted_climb: 1.0,
            fire_penalty_per_size: 10.0,
            deep_water_depth: 1.0,
            deep_water_penalty: 500.0,
            flooded_penalty: 1000.0,
            pressure_protection_threshold: 10.0,
            climb_penalty_per_unit: 10.0,
            outside_node_penalty: 100.0,
            button_press_interval: 0.25,
            door_check_span: 5,
            door_speed_margin: 2.0,
            ladder_release_distance: 0.5,
            ladder_adjacency_tolerance: 0.05,
            min_body_height: 1.6125,
            min_body_width: 0.3225,
            small_room_size: 5.0,
            wander_jitter: 0.3,
            max_search_iterations: 10_000,
            visibility_candidates: 8,
        }
    }
}

/// Fixed-point navigation parameters, converted once from [`NavConfig`].
#[derive(Resource, Clone, Debug)]
pub struct SteeringConfig {
    pub tick_rate: f64,
    pub rng_seed: u64,
    pub replan_priority_threshold: FixedNum,
    pub target_moved_threshold: FixedNum,
    pub replan_interval_low_priority: FixedNum,
    pub replan_interval_high_priority: FixedNum,
    pub replan_jitter: f32,
    pub forced_recheck_floor: FixedNum,
    pub cost_hysteresis: FixedNum,
    pub stale_anchor_ratio: FixedNum,
    pub full_open_threshold: FixedNum,
    pub closed_door_penalty: FixedNum,
    pub max_unassisted_climb: FixedNum,
    pub fire_penalty_per_size: FixedNum,
    pub deep_water_depth: FixedNum,
    pub deep_water_penalty: FixedNum,
    pub flooded_penalty: FixedNum,
    pub pressure_protection_threshold: FixedNum,
    pub climb_penalty_per_unit: FixedNum,
    pub outside_node_penalty: FixedNum,
    pub button_press_interval: FixedNum,
    pub door_check_span: usize,
    pub door_speed_margin: FixedNum,
    pub ladder_release_distance: FixedNum,
    pub ladder_adjacency_tolerance: FixedNum,
    pub min_body_height: FixedNum,
    pub min_body_width: FixedNum,
    pub small_room_size: FixedNum,
    pub wander_jitter: FixedNum,
    pub max_search_iterations: usize,
    pub visibility_candidates: usize,
}

impl SteeringConfig {
    /// Duration of one simulation tick.
    pub fn tick_delta(&self) -> FixedNum {
        FixedNum::ONE / FixedNum::from_num(self.tick_rate)
    }
}

impl From<&NavConfig> for SteeringConfig {
    fn from(config: &NavConfig) -> Self {
        Self {
            // At least one tick per second, so `tick_delta` is always defined
            tick_rate: config.tick_rate.max(1.0),
            rng_seed: config.rng_seed,
            replan_priority_threshold: fx(config.replan_priority_threshold),
            target_moved_threshold: fx(config.target_moved_threshold),
            replan_interval_low_priority: fx(config.replan_interval_low_priority),
            replan_interval_high_priority: fx(config.replan_interval_high_priority),
            // Stays a float: it only bounds a random range
            replan_jitter: config.replan_jitter.max(1.0),
            forced_recheck_floor: fx(config.forced_recheck_floor),
            cost_hysteresis: fx(config.cost_hysteresis),
            stale_anchor_ratio: fx(config.stale_anchor_ratio),
            full_open_threshold: fx(config.full_open_threshold),
            closed_door_penalty: fx(config.closed_door_penalty),
            max_unassisted_climb: fx(config.max_unassisted_climb),
            fire_penalty_per_size: fx(config.fire_penalty_per_size),
            deep_water_depth: fx(config.deep_water_depth),
            deep_water_penalty: fx(config.deep_water_penalty),
            flooded_penalty: fx(config.flooded_penalty),
            pressure_protection_threshold: fx(config.pressure_protection_threshold),
            climb_penalty_per_unit: fx(config.climb_penalty_per_unit),
            outside_node_penalty: fx(config.outside_node_penalty),
            button_press_interval: fx(config.button_press_interval),
            door_check_span: config.door_check_span,
            door_speed_margin: fx(config.door_speed_margin),
            ladder_release_distance: fx(config.ladder_release_distance),
            ladder_adjacency_tolerance: fx(config.ladder_adjacency_tolerance),
            min_body_height: fx(config.min_body_height),
            min_body_width: fx(config.min_body_width),
            small_room_size: fx(config.small_room_size),
            wander_jitter: fx(config.wander_jitter),
            max_search_iterations: config.max_search_iterations,
            visibility_candidates: config.visibility_candidates,
        }
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self::from(&NavConfig::default())
    }
}

pub struct NavConfigPlugin;

impl Plugin for NavConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SteeringConfig>()
           .add_systems(Startup, load_nav_config);
    }
}

/// Parse a RON navigation config.
pub fn parse_nav_config(contents: &str) -> Result<NavConfig, ron::error::SpannedError> {
    ron::from_str::<NavConfig>(contents)
}

/// Load navigation configuration synchronously at startup.
/// Must complete before the first steering tick.
fn load_nav_config(mut commands: Commands) {
    let config = match std::fs::read_to_string(NAV_CONFIG_PATH) {
        Ok(contents) => match parse_nav_config(&contents) {
            Ok(config) => {
                info!("Loaded navigation config from {}", NAV_CONFIG_PATH);
                config
            }
            Err(e) => {
                error!("Failed to parse navigation config: {}", e);
                error!("Using default NavConfig");
                NavConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", NAV_CONFIG_PATH, e);
            error!("Using default NavConfig");
            NavConfig::default()
        }
    };

    commands.insert_resource(SteeringRng::from_seed(config.rng_seed));
    commands.insert_resource(SteeringConfig::from(&config));
    commands.insert_resource(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config = parse_nav_config("(tick_rate: 30.0, closed_door_penalty: 25.0)")
            .expect("Partial config should parse");

        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.closed_door_penalty, 25.0);
        assert_eq!(config.button_press_interval, NavConfig::default().button_press_interval);
    }

    #[test]
    fn test_shipped_config_parses() {
        let contents = include_str!("../../assets/nav_config.ron");
        let config = parse_nav_config(contents).expect("assets/nav_config.ron should parse");
        let steering = SteeringConfig::from(&config);

        assert!(steering.tick_rate > 0.0);
        assert!(steering.replan_interval_high_priority <= steering.replan_interval_low_priority);
    }

    #[test]
    fn test_tick_delta() {
        let config = SteeringConfig::from(&NavConfig { tick_rate: 20.0, ..Default::default() });
        // 1/20 is not exact in 16 fractional bits
        let expected = FixedNum::ONE / FixedNum::from_num(20);
        assert_eq!(config.tick_delta(), expected);
        assert!((config.tick_delta() - fx(0.05)).abs() <= FixedNum::DELTA);
    }

    #[test]
    fn test_zero_tick_rate_is_clamped() {
        for tick_rate in [0.0, -30.0] {
            let config = SteeringConfig::from(&NavConfig { tick_rate, ..Default::default() });
            assert_eq!(config.tick_rate, 1.0);
            assert_eq!(config.tick_delta(), FixedNum::ONE);
        }

        let parsed = parse_nav_config("(tick_rate: 0.0)").expect("zero tick rate still parses");
        assert_eq!(SteeringConfig::from(&parsed).tick_delta(), FixedNum::ONE);
    }
}
