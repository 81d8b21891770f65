/// Indoor steering - turning routes into per-tick movement.
///
/// This module is organized into:
/// - **agent**: what an agent can do and the body the steering drives
/// - **components**: seek/wander inputs, steering output, interaction messages
/// - **route**: the planned node sequence and its cursor
/// - **penalty**: per-edge cost and access rules handed to the oracle
/// - **manager**: replanning policy and path following
/// - **doors** / **ladders**: interaction proposals along the route
/// - **wander**: idle movement
/// - **systems**: ECS glue

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::game::config::SteeringConfig;
use crate::game::layout::VesselLayout;
use crate::game::waypoints::WaypointGraph;

mod agent;
mod components;
mod route;
mod penalty;
mod manager;
mod doors;
mod ladders;
mod wander;
pub mod systems;

pub use agent::{AgentBody, AgentCapabilities};
pub use components::{
    DesiredMovement, InteractRequest, InteractTarget, RouteUnreachable, SeekTarget, SteeringCommand,
    WanderTarget,
};
pub use manager::{AgentLabel, IndoorSteering, SteeringContext};
pub use penalty::{can_access_door, should_break_door, EdgePenalty};
pub use route::Route;

/// Shared random stream for replan jitter and wandering.
#[derive(Resource)]
pub struct SteeringRng(pub StdRng);

impl SteeringRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SteeringRng {
    fn default() -> Self {
        Self::from_seed(SteeringConfig::default().rng_seed)
    }
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavSet {
    Init,   // Attaching steering state to new agents
    Steer,  // Seek/wander, door and ladder proposals
}

pub struct SteeringPlugin;

impl Plugin for SteeringPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SteeringConfig>();
        app.init_resource::<SteeringRng>();
        app.init_resource::<WaypointGraph>();
        app.init_resource::<VesselLayout>();

        app.add_message::<InteractRequest>();
        app.add_message::<RouteUnreachable>();

        app.configure_sets(FixedUpdate, (
            NavSet::Init,
            NavSet::Steer,
        ).chain());

        // The chained sets get a sync point, so agents spawned this tick steer right away
        app.add_systems(FixedUpdate, (
            systems::init_steering.in_set(NavSet::Init),
            systems::steer_agents.in_set(NavSet::Steer),
        ));
    }
}
