use bevy::prelude::*;
use std::sync::Arc;
use crate::game::math::{fx, FixedNum, FixedVec2};
use crate::game::layout::{ControlId, DoorId, LadderId};
use crate::game::pathfinding::NodeFilter;
use crate::game::waypoints::Waypoint;

/// Where the agent wants to go, set by the decision layer.
///
/// `position` is in the agent's frame, like [`super::AgentBody::position`].
#[derive(Component, Clone)]
pub struct SeekTarget {
    pub position: FixedVec2,
    pub weight: FixedNum,
    pub min_gap_width: FixedNum,
    pub start_filter: Option<NodeFilter>,
    pub end_filter: Option<NodeFilter>,
    pub node_filter: Option<NodeFilter>,
    pub check_visibility: bool,
}

impl SeekTarget {
    pub fn new(position: FixedVec2) -> Self {
        Self {
            position,
            weight: FixedNum::ONE,
            min_gap_width: FixedNum::ZERO,
            start_filter: None,
            end_filter: None,
            node_filter: None,
            check_visibility: true,
        }
    }

    pub fn with_weight(mut self, weight: FixedNum) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_min_gap_width(mut self, width: FixedNum) -> Self {
        self.min_gap_width = width;
        self
    }

    pub fn with_start_filter(mut self, filter: impl Fn(&Waypoint) -> bool + Send + Sync + 'static) -> Self {
        self.start_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_end_filter(mut self, filter: impl Fn(&Waypoint) -> bool + Send + Sync + 'static) -> Self {
        self.end_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_node_filter(mut self, filter: impl Fn(&Waypoint) -> bool + Send + Sync + 'static) -> Self {
        self.node_filter = Some(Arc::new(filter));
        self
    }

    pub fn without_visibility_check(mut self) -> Self {
        self.check_visibility = false;
        self
    }
}

/// Idle behaviour used when there is no seek target.
#[derive(Component, Clone, Debug)]
pub struct WanderTarget {
    pub wall_avoid_distance: FixedNum,
    pub stay_still_in_tight_space: bool,
}

impl Default for WanderTarget {
    fn default() -> Self {
        Self {
            wall_avoid_distance: fx(1.5),
            stay_still_in_tight_space: true,
        }
    }
}

/// Movement the physics layer should apply this tick.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct DesiredMovement(pub FixedVec2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractTarget {
    /// Door with integrated buttons.
    Door(DoorId),
    Control(ControlId),
    Ladder(LadderId),
}

/// Interaction proposed by the steering core. External state machines
/// decide whether and how it takes effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteeringCommand {
    Interact(InteractTarget),
    BreakDoor(DoorId),
    ReleaseLadder,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct InteractRequest {
    pub agent: Entity,
    pub command: SteeringCommand,
}

/// The agent's route became unreachable this tick.
#[derive(Message, Debug, Clone, Copy)]
pub struct RouteUnreachable {
    pub agent: Entity,
    pub target: FixedVec2,
}
