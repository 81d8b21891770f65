use crate::game::config::SteeringConfig;
use crate::game::math::{sign, FixedNum, FixedVec2};
use crate::game::layout::{Control, Door, PassageAxis, VesselLayout};
use crate::game::waypoints::Waypoint;
use super::agent::AgentCapabilities;

/// Whether this agent should smash `door` rather than operate it.
pub fn should_break_door(layout: &VesselLayout, caps: &AgentCapabilities, door: &Door) -> bool {
    caps.can_break_doors &&
    !door.indestructible &&
    door.region
        .and_then(|id| layout.region(id))
        .map_or(true, |region| region.team != caps.team)
}

/// Whether the agent can get through `door` at all.
///
/// `control_filter` sees every control that grants access to the agent; it is
/// called for all of them (not short-circuited) so callers can use it to
/// track the best candidate. Has no other side effects.
pub fn can_access_door(
    layout: &VesselLayout,
    caps: &AgentCapabilities,
    door: &Door,
    mut control_filter: impl FnMut(&Control) -> bool,
) -> bool {
    if door.is_broken {
        return true;
    }
    let breaking = should_break_door(layout, caps, door);
    if !door.is_open {
        if !door.interactable {
            return false;
        }
        if !breaking {
            if door.is_stuck || door.is_jammed {
                return false;
            }
            if !caps.can_open_doors || caps.hands_locked {
                return false;
            }
        }
    }

    if door.integrated_buttons {
        return door.is_open || door.access.grants(caps.team) || breaking;
    }

    let mut any_control = false;
    for control in door.controls.iter().filter_map(|&id| layout.control(id)) {
        if control.access.grants(caps.team) && control_filter(control) {
            any_control = true;
        }
    }
    any_control || door.is_open || breaking
}

/// Edge cost function handed to the path oracle.
///
/// `None` means the edge is impassable, which is distinct from a free edge.
pub struct EdgePenalty<'a> {
    pub layout: &'a VesselLayout,
    pub caps: &'a AgentCapabilities,
    /// Agent world position, used to pick door controls on the agent's side.
    pub agent: FixedVec2,
    pub config: &'a SteeringConfig,
}

impl<'a> EdgePenalty<'a> {
    pub fn evaluate(&self, from: &Waypoint, to: &Waypoint) -> Option<FixedNum> {
        if to.obstructed {
            return None;
        }
        let mut penalty = FixedNum::ZERO;

        let closed_gap = to.gap
            .and_then(|id| self.layout.gap(id))
            .filter(|gap| gap.open < self.config.full_open_threshold);
        if closed_gap.is_some() {
            let door_id = to.door?;
            if let Some(door) = self.layout.door(door_id) {
                if !self.can_pass_door(door) {
                    return None;
                }
                if !door.can_be_traversed() && door.integrated_buttons {
                    penalty += self.config.closed_door_penalty;
                }
            }
        }

        let from_world = from.world_position(self.layout);
        let to_world = to.world_position(self.layout);
        let to_above_water = to.hull
            .and_then(|id| self.layout.hull(id))
            .map_or(false, |hull| self.layout.hull_surface_world(hull) < to_world.y);

        if !self.caps.can_climb {
            let ladder_blocked = match (from.ladder, to.ladder) {
                (Some(_), Some(ladder)) => {
                    let usable = self.layout.ladder(ladder).map_or(true, |l| l.interactable);
                    !usable || self.caps.hands_locked
                }
                _ => false,
            };
            let climbs = to_world.y - from_world.y > self.config.max_unassisted_climb;
            if ladder_blocked || (climbs && to_above_water) {
                return None;
            }
        }

        let Some(hull) = from.hull.and_then(|id| self.layout.hull(id)) else {
            return Some(penalty);
        };

        for &size in &hull.fire_sizes {
            penalty += size * self.config.fire_penalty_per_size;
        }

        if self.caps.needs_air {
            if hull.water_depth() > self.config.deep_water_depth && !self.caps.has_diving_gear {
                penalty += self.config.deep_water_penalty;
            }
            if self.caps.pressure_protection < self.config.pressure_protection_threshold && hull.is_flooded() {
                penalty += self.config.flooded_penalty;
            }
        }

        let assisted = from.ladder.is_some() || to.ladder.is_some() || from.stairs || to.stairs;
        if to_above_water && !assisted {
            penalty += (to_world.y - from_world.y).abs() * self.config.climb_penalty_per_unit;
        }

        Some(penalty)
    }

    /// Door access with controls restricted to the agent's side of the door.
    fn can_pass_door(&self, door: &Door) -> bool {
        let door_pos = self.layout.door_world_position(door);
        let agent = self.agent;
        can_access_door(self.layout, self.caps, door, |control| {
            let control_pos = self.layout.control_world_position(control);
            match door.axis {
                PassageAxis::Vertical => sign(control_pos.y - door_pos.y) == sign(agent.y - door_pos.y),
                PassageAxis::Horizontal => sign(control_pos.x - door_pos.x) == sign(agent.x - door_pos.x),
            }
        })
    }
}

#[cfg(test)]
#[path = "penalty_tests.rs"]
mod tests;
