use bevy::prelude::*;
use crate::game::config::SteeringConfig;
use crate::game::layout::VesselLayout;
use crate::game::pathfinding::WaypointPathFinder;
use crate::game::waypoints::WaypointGraph;
use super::agent::{AgentBody, AgentCapabilities};
use super::components::{DesiredMovement, InteractRequest, RouteUnreachable, SeekTarget, SteeringCommand, WanderTarget};
use super::manager::{AgentLabel, IndoorSteering, SteeringContext};
use super::SteeringRng;

/// Attaches a steering manager to every new agent body.
pub fn init_steering(
    mut commands: Commands,
    mut rng: ResMut<SteeringRng>,
    query: Query<Entity, (With<AgentBody>, Without<IndoorSteering>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert((
            IndoorSteering::new(&mut rng.0),
            DesiredMovement::default(),
        ));
    }
}

/// Runs one steering tick for every agent and publishes the proposed
/// interactions.
pub fn steer_agents(
    graph: Res<WaypointGraph>,
    layout: Res<VesselLayout>,
    config: Res<SteeringConfig>,
    mut rng: ResMut<SteeringRng>,
    mut query: Query<(
        Entity,
        &AgentBody,
        &AgentCapabilities,
        &mut IndoorSteering,
        &mut DesiredMovement,
        Option<&SeekTarget>,
        Option<&WanderTarget>,
    )>,
    mut interactions: MessageWriter<InteractRequest>,
    mut unreachable: MessageWriter<RouteUnreachable>,
) {
    let oracle = WaypointPathFinder::new(&graph, &layout, &config);
    let dt = config.tick_delta();
    let mut commands: Vec<SteeringCommand> = Vec::new();

    // Entity order keeps the shared rng stream deterministic
    let mut agents: Vec<_> = query.iter_mut().collect();
    agents.sort_by_key(|(entity, ..)| *entity);

    for (entity, body, caps, mut steering, mut desired, seek, wander) in agents {
        let ctx = SteeringContext {
            body,
            caps,
            graph: &graph,
            layout: &layout,
            config: &config,
            label: AgentLabel::Entity(entity),
        };

        let was_unreachable = steering.current_route().map_or(false, |r| r.is_unreachable());
        let generation = steering.route_generation();

        // Steering is rebuilt every tick
        steering.reset();
        if let Some(seek) = seek {
            steering.seek_towards(&ctx, &oracle, &mut rng.0, seek, &mut commands);
        } else if let Some(wander) = wander {
            steering.wander(&ctx, &mut rng.0, wander.wall_avoid_distance, wander.stay_still_in_tight_space);
        }
        desired.0 = steering.update(dt, body.max_speed);

        for command in commands.drain(..) {
            interactions.write(InteractRequest { agent: entity, command });
        }

        let now_unreachable = steering.current_route().map_or(false, |r| r.is_unreachable());
        if now_unreachable && (!was_unreachable || generation != steering.route_generation()) {
            let target = seek.map_or(steering.current_target(), |s| s.position);
            warn!("{}: no route to {:?}", ctx.label, target);
            unreachable.write(RouteUnreachable { agent: entity, target });
        }
    }
}
