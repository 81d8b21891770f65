use crate::game::math::{fx, lerp, saturate, sign, FixedNum, FixedVec2};
use crate::game::layout::{ControlId, Door, PassageAxis, RegionId};
use crate::game::waypoints::Waypoint;
use super::components::{InteractTarget, SteeringCommand};
use super::manager::SteeringContext;
use super::penalty::{can_access_door, should_break_door};
use super::route::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DoorOutcome {
    Idle,
    /// A command was pushed; the caller starts the button cooldown.
    Proposed,
    /// The route was marked unreachable.
    Unreachable,
}

/// Coordinate of `v` along the axis an agent moves through the door.
fn along(axis: PassageAxis, v: FixedVec2) -> FixedNum {
    match axis {
        PassageAxis::Horizontal => v.x,
        PassageAxis::Vertical => v.y,
    }
}

fn in_ruin_or_wreck(ctx: &SteeringContext, region: Option<RegionId>) -> bool {
    region
        .and_then(|id| ctx.layout.region(id))
        .map_or(false, |r| r.is_ruin || r.is_wreck)
}

/// Whether the door between the agent and `next` still lies ahead of the
/// agent, with half a body of slack that grows with speed.
fn door_ahead(ctx: &SteeringContext, door: &Door, next: &Waypoint, agent: FixedVec2) -> bool {
    let body = ctx.body;
    let door_pos = ctx.layout.door_world_position(door);
    let next_pos = next.world_position(ctx.layout);
    let size = match door.axis {
        PassageAxis::Horizontal if !body.in_water => body.size.x,
        _ => body.collider_length(),
    };
    let speed_scale = lerp(FixedNum::ONE, ctx.config.door_speed_margin, saturate(body.velocity.length() / fx(5.0)));
    let margin = size / FixedNum::from_num(2) * speed_scale;
    let dir = sign(along(door.axis, next_pos) - along(door.axis, door_pos));
    (along(door.axis, door_pos) - along(door.axis, agent)) * dir > -margin
}

/// Examines up to `door_check_span` node pairs around the cursor and proposes
/// at most one door interaction.
///
/// Pair 0 is current -> next. With `keep_doors_closed`, pairs i >= 1 are
/// `nodes[cursor - i]` -> current so doors behind the agent get shut again.
/// Every proposal ends the run for this tick.
pub(super) fn run_door_protocol(
    route: &mut Route,
    ctx: &SteeringContext,
    commands: &mut Vec<SteeringCommand>,
) -> DoorOutcome {
    let caps = ctx.caps;
    if !caps.can_open_doors && !caps.can_break_doors {
        return DoorOutcome::Idle;
    }
    let agent = ctx.agent_world();

    for i in 0..ctx.config.door_check_span {
        // Node the agent travels toward through the door, if any
        let mut heading_to: Option<&Waypoint> = None;
        let door: Option<&Door>;
        let should_be_open: bool;

        if route.len() == 1 {
            if i > 0 {
                break;
            }
            door = route.node_at(0)
                .and_then(|id| ctx.node(id))
                .and_then(|node| node.door)
                .and_then(|id| ctx.layout.door(id));
            should_be_open = door.is_some();
        } else {
            let (current, next) = if i == 0 {
                (route.current_node(), route.next_node())
            } else if caps.keep_doors_closed {
                let Some(previous) = route.cursor().checked_sub(i) else {
                    break;
                };
                (route.node_at(previous), route.current_node())
            } else {
                break;
            };
            let Some(current) = current.and_then(|id| ctx.node(id)) else {
                continue;
            };
            let Some(found) = current.door.and_then(|id| ctx.layout.door(id)) else {
                continue;
            };
            let next = next.and_then(|id| ctx.node(id));
            heading_to = Some(next.unwrap_or(current));

            match next {
                None => {
                    // Last node sits in a doorway: only open it between rooms,
                    // airlocks stay shut unless this is a ruin or wreck
                    let opens = found.gap
                        .and_then(|id| ctx.layout.gap(id))
                        .map_or(false, |gap| gap.room_to_room || in_ruin_or_wreck(ctx, current.region));
                    door = opens.then_some(found);
                    should_be_open = opens;
                }
                Some(next) => {
                    door = Some(found);
                    should_be_open = door_ahead(ctx, found, next, agent);
                }
            }
        }

        let Some(door) = door else {
            return DoorOutcome::Idle;
        };
        // Broken doors can't be shut again
        if door.can_be_traversed() == should_be_open || door.is_broken {
            continue;
        }

        let door_pos = ctx.layout.door_world_position(door);
        let travel = heading_to.map_or(FixedNum::ZERO, |node| {
            sign(along(door.axis, node.world_position(ctx.layout)) - along(door.axis, door_pos))
        });
        let mut closest: Option<(ControlId, FixedNum)> = None;
        let accessible = can_access_door(ctx.layout, caps, door, |control| {
            let control_pos = ctx.layout.control_world_position(control);
            // Controls past the door in the travel direction are out of reach
            if (along(door.axis, control_pos) - along(door.axis, door_pos)) * travel > FixedNum::ZERO {
                return false;
            }
            let dist_sq = control_pos.distance_squared(agent);
            if closest.map_or(true, |(_, best)| dist_sq < best) {
                closest = Some((control.id, dist_sq));
            }
            true
        });

        if !accessible {
            if should_be_open {
                route.mark_unreachable();
                return DoorOutcome::Unreachable;
            }
            continue;
        }

        let breaking = should_break_door(ctx.layout, caps, door);
        let operable = caps.can_open_doors && !caps.hands_locked;

        if door.integrated_buttons {
            if door.is_open || (operable && door.access.grants(caps.team)) {
                commands.push(SteeringCommand::Interact(InteractTarget::Door(door.id)));
            } else {
                commands.push(SteeringCommand::BreakDoor(door.id));
            }
            return DoorOutcome::Proposed;
        }

        if operable {
            if let Some(control) = closest.and_then(|(id, _)| ctx.layout.control(id)) {
                let control_pos = ctx.layout.control_world_position(control);
                let reach = control.interact_distance + ctx.body.collider_length();
                if control_pos.distance_squared(agent) < reach * reach {
                    commands.push(SteeringCommand::Interact(InteractTarget::Control(control.id)));
                    return DoorOutcome::Proposed;
                }
                // Out of reach: a wall or closed door in between means the
                // control is on the wrong side and never will be reachable
                if ctx.layout.pick_obstruction(agent, control_pos).is_some() {
                    route.mark_unreachable();
                    return DoorOutcome::Unreachable;
                }
                return DoorOutcome::Idle;
            }
        }

        if should_be_open && breaking && !door.can_be_traversed() {
            commands.push(SteeringCommand::BreakDoor(door.id));
            return DoorOutcome::Proposed;
        }
    }

    DoorOutcome::Idle
}
