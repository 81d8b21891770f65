use crate::game::math::{fx, sign, FixedNum, FixedVec2};
use crate::game::layout::LadderId;
use crate::game::waypoints::Waypoint;
use super::components::{InteractTarget, SteeringCommand};
use super::manager::{IndoorSteering, SteeringContext};
use super::route::Route;

fn usable(ctx: &SteeringContext, id: LadderId) -> bool {
    ctx.layout.ladder(id).map_or(false, |ladder| ladder.interactable)
}

fn within_reach(ctx: &SteeringContext, id: LadderId, agent: FixedVec2) -> bool {
    ctx.layout
        .ladder(id)
        .map_or(false, |ladder| ladder.interactable && ctx.layout.ladder_in_range(ladder, agent))
}

/// Ladder on the next node, or on the node after it. A hatch node in
/// between is looked through.
pub(super) fn next_ladder(route: &Route, ctx: &SteeringContext) -> Option<LadderId> {
    let next = route.next_node().and_then(|id| ctx.node(id))?;
    if let Some(ladder) = next.ladder.filter(|&id| usable(ctx, id)) {
        return Some(ladder);
    }

    let mut index = route.cursor() + 2;
    let node = route.node_at(index).and_then(|id| ctx.node(id))?;
    if let Some(ladder) = node.ladder.filter(|&id| usable(ctx, id)) {
        return Some(ladder);
    }
    let hatch = node.door
        .and_then(|id| ctx.layout.door(id))
        .map_or(false, |door| door.is_hatch());
    if !hatch {
        return None;
    }
    index += 1;
    route.node_at(index)
        .and_then(|id| ctx.node(id))
        .and_then(|node| node.ladder)
        .filter(|&id| usable(ctx, id))
}

pub(super) fn next_ladder_same_as_current(route: &Route, ctx: &SteeringContext) -> bool {
    let current = route.current_node()
        .and_then(|id| ctx.node(id))
        .and_then(|node| node.ladder)
        .filter(|&id| usable(ctx, id));
    match current {
        Some(current) => route.next_node().is_some() && next_ladder(route, ctx) == Some(current),
        None => false,
    }
}

impl IndoorSteering {
    /// True if the current or the next node is on a usable ladder.
    pub fn in_ladders(&self, ctx: &SteeringContext) -> bool {
        let Some(route) = self.route.as_ref() else {
            return false;
        };
        [route.current_node(), route.next_node()]
            .into_iter()
            .flatten()
            .filter_map(|id| ctx.node(id))
            .any(|node| node.ladder.map_or(false, |id| usable(ctx, id)))
    }

    /// True if any node of the route is on stairs.
    pub fn in_stairs(&self, ctx: &SteeringContext) -> bool {
        self.route.as_ref().map_or(false, |route| {
            route.nodes().iter().filter_map(|&id| ctx.node(id)).any(|node| node.stairs)
        })
    }

    /// Grabs, transfers between and releases ladders along the route.
    ///
    /// Returns the movement toward the current node while the agent is on a
    /// ladder it should keep using, `None` when normal walking or swimming
    /// logic applies. `pos` is the agent in `node`'s frame.
    pub(super) fn follow_ladders(
        &mut self,
        ctx: &SteeringContext,
        node: &Waypoint,
        pos: FixedVec2,
        doors_checked: bool,
        commands: &mut Vec<SteeringCommand>,
    ) -> Option<FixedVec2> {
        let route = self.route.as_ref()?;
        let body = ctx.body;
        let agent = ctx.agent_world();

        let can_climb = ctx.caps.can_climb && !ctx.caps.hands_locked;
        let current_ladder = node.ladder.filter(|&id| usable(ctx, id));
        let next_ladder = next_ladder(route, ctx);
        let same_ladder = next_ladder_same_as_current(route, ctx);
        let prev_ladder = route.prev_node().and_then(|id| ctx.node(id)).and_then(|n| n.ladder);
        let next_world = route.next_node().and_then(|id| ctx.node_world(id));
        let ladder = current_ladder.or(next_ladder);

        // Divers only take ladders when last tick's movement was mostly
        // straight up or down
        let heading = self.last_movement.normalize();
        let vertical_dive = heading.x.abs() < fx(0.1) && heading.y.abs() > fx(0.9);
        let use_ladders = can_climb && ladder.is_some() && (!body.is_diving() || vertical_dive);

        if let Some(ladder) = ladder.filter(|_| use_ladders) {
            if body.selected_ladder != Some(ladder) {
                if within_reach(ctx, ladder, agent) {
                    commands.push(SteeringCommand::Interact(InteractTarget::Ladder(ladder)));
                } else if let Some(prev) = prev_ladder {
                    // Hold on to the previous ladder of a double ladder
                    // instead of dropping between the two
                    let adjacent = match (ctx.layout.ladder(prev), ctx.layout.ladder(ladder)) {
                        (Some(a), Some(b)) => {
                            (ctx.layout.ladder_world_x(a) - ctx.layout.ladder_world_x(b)).abs()
                                < ctx.config.ladder_adjacency_tolerance
                        }
                        _ => false,
                    };
                    if prev != ladder && body.selected_ladder != Some(prev) && adjacent && within_reach(ctx, prev, agent) {
                        commands.push(SteeringCommand::Interact(InteractTarget::Ladder(prev)));
                    }
                }
            }
        }

        if body.is_climbing && !use_ladders {
            commands.push(SteeringCommand::ReleaseLadder);
        }
        if !(body.is_climbing && use_ladders) {
            return None;
        }

        let mut diff = node.position - pos;
        if same_ladder {
            // Stay on the rungs
            diff.x = FixedNum::ZERO;
        }

        let node_world = node.world_position(ctx.layout);
        let half_height = body.size.y / FixedNum::from_num(2);
        if (pos.y - node.position.y).abs() < half_height * fx(1.25) {
            let height_from_floor = body.height_from_floor();
            if height_from_floor <= FixedNum::ZERO {
                diff.y = diff.y.max(FixedNum::ONE);
            }
            // A hatch that just closed can leave the collider slightly below the floor
            let above_floor = height_from_floor > fx(-0.1);
            let next_far = next_world.map_or(true, |next| {
                (node_world.x - next.x).abs() > ctx.config.ladder_release_distance
            });

            if above_floor && (next_ladder.is_none() || next_far) {
                commands.push(SteeringCommand::ReleaseLadder);
            } else if let Some(next) = next_ladder {
                // Changing ladders, e.g. through a hatch between two vessels
                if !same_ladder && body.selected_ladder != Some(next) && within_reach(ctx, next, agent) {
                    commands.push(SteeringCommand::Interact(InteractTarget::Ladder(next)));
                }
            }
            if above_floor || same_ladder {
                self.next_node(ctx, !doors_checked, commands);
            }
        } else if next_ladder.is_some() {
            // Current node is on one side of the agent and the next on the
            // other: no point climbing back to the first one
            if let Some(next) = next_world {
                if sign(node_world.y - agent.y) != sign(next.y - agent.y) {
                    self.next_node(ctx, !doors_checked, commands);
                }
            }
        }

        Some(diff)
    }
}
