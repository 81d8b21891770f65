/// Minimal body physics and interaction handling for running the steering
/// core headless: the demo binary and integration tests drive agents
/// through this instead of a real physics engine.

use bevy::prelude::*;
use crate::game::config::SteeringConfig;
use crate::game::layout::{ControlId, DoorId, VesselLayout};
use crate::game::math::FixedNum;
use crate::game::steering::{AgentBody, DesiredMovement, InteractRequest, InteractTarget, NavSet, SteeringCommand};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SandboxSet {
    Interact,    // Applying door/ladder requests
    Integration, // Moving bodies by their desired movement
}

pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(FixedUpdate, (
            SandboxSet::Interact,
            SandboxSet::Integration,
        ).chain().after(NavSet::Steer));

        app.add_systems(FixedUpdate, (
            apply_interactions.in_set(SandboxSet::Interact),
            integrate_bodies.in_set(SandboxSet::Integration),
        ));
    }
}

fn toggle_door(layout: &mut VesselLayout, id: DoorId) {
    let Some(door) = layout.door(id) else {
        return;
    };
    if door.is_stuck || door.is_jammed || door.is_broken || !door.interactable {
        debug!("Door {:?} won't move", id);
        return;
    }
    let open = !door.is_open;
    layout.set_door_open(id, open);
}

fn doors_wired_to(layout: &VesselLayout, control: ControlId) -> Vec<DoorId> {
    layout.doors
        .iter()
        .filter(|door| door.controls.contains(&control))
        .map(|door| door.id)
        .collect()
}

/// Carries out what the steering core proposed. Everything is granted;
/// access rules were already checked on the steering side.
pub fn apply_interactions(
    mut requests: MessageReader<InteractRequest>,
    mut layout: ResMut<VesselLayout>,
    mut bodies: Query<&mut AgentBody>,
) {
    for request in requests.read() {
        let Ok(mut body) = bodies.get_mut(request.agent) else {
            continue;
        };
        match request.command {
            SteeringCommand::Interact(InteractTarget::Door(id)) => toggle_door(&mut layout, id),
            SteeringCommand::Interact(InteractTarget::Control(id)) => {
                for door in doors_wired_to(&layout, id) {
                    toggle_door(&mut layout, door);
                }
            }
            SteeringCommand::Interact(InteractTarget::Ladder(id)) => {
                body.is_climbing = true;
                body.selected_ladder = Some(id);
            }
            SteeringCommand::ReleaseLadder => {
                body.is_climbing = false;
                body.selected_ladder = None;
            }
            SteeringCommand::BreakDoor(id) => {
                layout.set_door_open(id, true);
                if let Some(door) = layout.door_mut(id) {
                    door.is_open = false;
                    door.is_broken = true;
                }
                info!("{:?} broke door {:?}", request.agent, id);
            }
        }
    }
}

/// Moves every body by its desired movement and refreshes hull, floor and
/// water state. Walkers stay on the floor; climbers and swimmers move freely.
pub fn integrate_bodies(
    config: Res<SteeringConfig>,
    layout: Res<VesselLayout>,
    mut query: Query<(&mut AgentBody, &DesiredMovement)>,
) {
    let delta = config.tick_delta();
    let two = FixedNum::from_num(2);

    for (mut body, desired) in query.iter_mut() {
        let mut step = desired.0 * delta;
        if !body.is_climbing && !body.in_water {
            step.y = FixedNum::ZERO;
        }
        body.velocity = desired.0;
        let world = body.world_position(&layout) + step;

        // Re-home the body into the frame of whatever hull it is in now
        let hull = layout.hull_at(world).and_then(|id| layout.hull(id));
        body.hull = hull.map(|h| h.id);
        body.region = hull.and_then(|h| h.region);
        body.position = world - layout.origin(body.region);

        match hull {
            Some(hull) => {
                body.floor_y = hull.min.y;
                let surface = layout.hull_surface_world(hull);
                let feet = world.y - body.size.y / two;
                body.in_water = surface > feet;
                body.head_in_water = surface > world.y + body.size.y / two;
            }
            None => {
                // Open water
                body.floor_y = body.position.y - body.size.y;
                body.in_water = true;
                body.head_in_water = true;
            }
        }

        if !body.is_climbing && !body.in_water {
            body.position.y = body.floor_y + body.size.y / two + body.collider_height_from_floor;
        }
    }
}
