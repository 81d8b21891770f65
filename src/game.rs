use bevy::prelude::*;

pub mod math;
pub mod config;
pub mod layout;
pub mod waypoints;
pub mod pathfinding;
pub mod steering;
pub mod sandbox;
pub mod demo;

use config::NavConfigPlugin;
use steering::SteeringPlugin;

/// Navigation config plus the steering core. Physics and door state
/// machines are left to the host (see [`sandbox::SandboxPlugin`]).
pub struct PetrelPlugin;

impl Plugin for PetrelPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            NavConfigPlugin,
            SteeringPlugin,
        ));
    }
}
