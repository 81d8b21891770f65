use std::fmt;
use bevy::prelude::*;
use rand::Rng;
use crate::game::config::SteeringConfig;
use crate::game::math::{fx, lerp, saturate, FixedNum, FixedVec2};
use crate::game::layout::{RegionId, VesselLayout};
use crate::game::pathfinding::{PathOracle, RouteRequest};
use crate::game::waypoints::{Waypoint, WaypointGraph, WaypointId};
use super::agent::{AgentBody, AgentCapabilities};
use super::components::{SeekTarget, SteeringCommand};
use super::doors::{run_door_protocol, DoorOutcome};
use super::penalty::EdgePenalty;
use super::route::Route;

/// Names the agent in log messages and oracle requests. Only formatted when
/// something is actually logged or planned.
#[derive(Clone, Copy, Debug)]
pub enum AgentLabel<'a> {
    Named(&'a str),
    Entity(Entity),
}

impl fmt::Display for AgentLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentLabel::Named(name) => f.write_str(name),
            AgentLabel::Entity(entity) => write!(f, "{:?}", entity),
        }
    }
}

impl<'a> From<&'a str> for AgentLabel<'a> {
    fn from(name: &'a str) -> Self {
        AgentLabel::Named(name)
    }
}

/// Read-only inputs for one steering call.
pub struct SteeringContext<'a> {
    pub body: &'a AgentBody,
    pub caps: &'a AgentCapabilities,
    pub graph: &'a WaypointGraph,
    pub layout: &'a VesselLayout,
    pub config: &'a SteeringConfig,
    pub label: AgentLabel<'a>,
}

impl<'a> SteeringContext<'a> {
    pub fn agent_world(&self) -> FixedVec2 {
        self.body.world_position(self.layout)
    }

    pub(super) fn node(&self, id: WaypointId) -> Option<&'a Waypoint> {
        self.graph.node(id)
    }

    pub(super) fn node_world(&self, id: WaypointId) -> Option<FixedVec2> {
        self.graph.world_position(id, self.layout)
    }
}

/// Path-following steering for one agent.
///
/// Owns the current [`Route`], decides when it is worth asking the oracle for
/// a new one, and turns the current route segment into a movement vector.
/// Door and ladder interactions are proposed through the command buffer
/// passed into each call; nothing here mutates the world.
#[derive(Component, Clone, Debug)]
pub struct IndoorSteering {
    pub(super) route: Option<Route>,
    /// Goal of the last plan, local to `target_region`.
    pub(super) target: FixedVec2,
    /// Agent's region when `target` was recorded.
    pub(super) target_region: Option<RegionId>,
    pub(super) replan_timer: FixedNum,
    pub(super) button_cooldown: FixedNum,
    pub(super) route_stale: bool,
    /// Accumulated steering; persists between ticks, clamped by `update`.
    pub(super) steering: FixedVec2,
    /// What `update` returned last tick.
    pub(super) last_movement: FixedVec2,
    pub(super) wander_heading: FixedVec2,
    /// Bumped every time a new route is adopted.
    pub(super) generation: u32,
}

impl IndoorSteering {
    /// Starts with a random replan delay so agents spawned together don't
    /// all query the oracle on the same tick.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::with_replan_timer(fx(rng.random_range(0.0f32..1.0)))
    }

    pub fn with_replan_timer(replan_timer: FixedNum) -> Self {
        Self {
            route: None,
            target: FixedVec2::ZERO,
            target_region: None,
            replan_timer,
            button_cooldown: FixedNum::ZERO,
            route_stale: false,
            steering: FixedVec2::ZERO,
            last_movement: FixedVec2::ZERO,
            wander_heading: FixedVec2::UNIT_X,
            generation: 0,
        }
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn current_target(&self) -> FixedVec2 {
        self.target
    }

    /// True while a replan is wanted but has not happened yet.
    pub fn is_route_stale(&self) -> bool {
        self.route_stale
    }

    pub fn replan_timer(&self) -> FixedNum {
        self.replan_timer
    }

    pub fn button_cooldown(&self) -> FixedNum {
        self.button_cooldown
    }

    pub fn steering(&self) -> FixedVec2 {
        self.steering
    }

    pub fn route_generation(&self) -> u32 {
        self.generation
    }

    /// Adopts a route built elsewhere. The stored target becomes its last node.
    pub fn set_route(&mut self, route: Route, ctx: &SteeringContext) {
        if let Some(last) = route.last_node().and_then(|id| ctx.node_world(id)) {
            self.target = last - ctx.layout.origin(ctx.body.region);
            self.target_region = ctx.body.region;
        }
        self.route = Some(route);
        self.generation = self.generation.wrapping_add(1);
        self.replan_timer = self.replan_timer.min(FixedNum::ONE);
        self.route_stale = false;
    }

    pub fn reset_route(&mut self) {
        self.route = None;
        self.route_stale = true;
    }

    /// Drops any accumulated steering.
    pub fn reset(&mut self) {
        self.steering = FixedVec2::ZERO;
    }

    /// Adds a straight-line seek toward `target` (agent frame), ignoring the graph.
    pub fn seek_direct(&mut self, ctx: &SteeringContext, target: FixedVec2, weight: FixedNum) -> FixedVec2 {
        let movement = (target - ctx.body.position).normalize() * weight;
        self.steering += movement;
        movement
    }

    /// Adds `velocity` to the steering as is.
    pub fn steer_manual(&mut self, velocity: FixedVec2) {
        self.steering += velocity;
    }

    /// Follows the graph toward `seek`, replanning when needed, and adds the
    /// resulting movement to the steering.
    pub fn seek_towards(
        &mut self,
        ctx: &SteeringContext,
        oracle: &dyn PathOracle,
        rng: &mut impl Rng,
        seek: &SeekTarget,
        commands: &mut Vec<SteeringCommand>,
    ) -> FixedVec2 {
        let movement = self.calculate_seek(ctx, oracle, rng, seek, commands);
        self.steering += movement;
        movement
    }

    /// Ticks timers and clamps the accumulated steering to `speed`.
    pub fn update(&mut self, dt: FixedNum, speed: FixedNum) -> FixedVec2 {
        self.button_cooldown -= dt;
        self.replan_timer -= dt;
        let speed = speed.abs();
        if self.steering.length_squared() > speed * speed {
            self.steering = self.steering.normalize() * speed;
        }
        self.last_movement = self.steering;
        self.steering
    }

    /// Movement returned by the last `update`.
    pub fn last_movement(&self) -> FixedVec2 {
        self.last_movement
    }

    // ========================================================================
    // Replanning
    // ========================================================================

    fn calculate_seek(
        &mut self,
        ctx: &SteeringContext,
        oracle: &dyn PathOracle,
        rng: &mut impl Rng,
        seek: &SeekTarget,
        commands: &mut Vec<SteeringCommand>,
    ) -> FixedVec2 {
        let config = ctx.config;
        let mut needs_new_path = self.route
            .as_ref()
            .map_or(true, |route| route.is_unreachable() || route.is_finished());

        if !needs_new_path && ctx.caps.replan_priority > config.replan_priority_threshold {
            let threshold_sq = config.target_moved_threshold * config.target_moved_threshold;
            let mut target_diff = seek.position - self.target;
            // Target tracked in another region's frame: compare in a common one
            if let Some(route_region) = self.route.as_ref().and_then(|route| route_region(route, ctx)) {
                if Some(route_region) != ctx.body.region && target_diff.length_squared() > threshold_sq {
                    target_diff += ctx.layout.origin(ctx.body.region) - ctx.layout.origin(Some(route_region));
                }
            }
            if target_diff.length_squared() > threshold_sq {
                needs_new_path = true;
            }
        }

        if needs_new_path || self.replan_timer < -config.forced_recheck_floor {
            self.route_stale = true;
            if self.replan_timer < FixedNum::ZERO {
                self.replan(ctx, oracle, rng, seek, needs_new_path, commands);
            }
        }

        let mut diff = self.diff_to_current_node(ctx, commands);
        let body = ctx.body;
        // Already level with the node: no need to seek vertically
        if ctx.caps.can_climb && !body.in_water && !body.is_climbing && diff.y < body.size.y / FixedNum::from_num(2) {
            diff.y = FixedNum::ZERO;
        }
        if diff == FixedVec2::ZERO {
            return FixedVec2::ZERO;
        }
        diff.normalize() * seek.weight
    }

    fn replan(
        &mut self,
        ctx: &SteeringContext,
        oracle: &dyn PathOracle,
        rng: &mut impl Rng,
        seek: &SeekTarget,
        needs_new_path: bool,
        commands: &mut Vec<SteeringCommand>,
    ) {
        self.skip_ahead(ctx);
        self.target = seek.position;
        self.target_region = ctx.body.region;

        let agent = ctx.agent_world();
        let region = ctx.body.region.and_then(|id| ctx.layout.region(id));
        let request = RouteRequest {
            start: agent,
            target: ctx.layout.to_world(ctx.body.region, seek.position),
            region: ctx.body.region,
            label: ctx.label.to_string(),
            min_gap_width: seek.min_gap_width,
            start_filter: seek.start_filter.clone(),
            end_filter: seek.end_filter.clone(),
            node_filter: seek.node_filter.clone(),
            check_visibility: seek.check_visibility,
            inside_vessel: region.map_or(false, |r| !r.is_ruin),
            penalize_outside_nodes: region.is_some() && ctx.caps.pressure_protection <= FixedNum::ZERO,
        };
        let penalty = EdgePenalty {
            layout: ctx.layout,
            caps: ctx.caps,
            agent,
            config: ctx.config,
        };
        let new_route = oracle.find_route(&request, &|from, to| penalty.evaluate(from, to));

        if self.should_adopt(&new_route, needs_new_path, ctx) {
            if self.route.is_some() {
                // Leave doors on the old route in a sane state
                self.check_doors(ctx, commands);
            }
            debug!("{}: adopted route of {} nodes (cost {})", ctx.label, new_route.len(), new_route.cost());
            self.route = Some(new_route);
            self.generation = self.generation.wrapping_add(1);
        }

        let interval = lerp(
            ctx.config.replan_interval_low_priority,
            ctx.config.replan_interval_high_priority,
            ctx.caps.replan_priority,
        );
        let jitter = rng.random_range(1.0f32..=ctx.config.replan_jitter);
        self.replan_timer = interval * fx(jitter);
        self.route_stale = false;
    }

    /// Anti-thrash policy for replacing a route that is still being followed.
    fn should_adopt(&self, new_route: &Route, needs_new_path: bool, ctx: &SteeringContext) -> bool {
        let Some(old) = self.route.as_ref() else {
            return true;
        };
        let Some(old_current) = old.current_node() else {
            return true;
        };
        if needs_new_path {
            return true;
        }
        if new_route.is_unreachable() || new_route.is_empty() {
            return false;
        }
        if new_route.is_identical(old) {
            // Keep the old one so progress isn't reset
            return false;
        }

        // The further along the old route, the bigger the saving must be
        if let Some(t) = old.progress() {
            if new_route.cost() < old.cost() * lerp(ctx.config.cost_hysteresis, FixedNum::ZERO, t) {
                return true;
            }
        }

        // Old route may have been planned from a start that no longer makes sense
        let agent = ctx.agent_world();
        let old_pos = ctx.node_world(old_current);
        let new_pos = new_route.node_at(0).and_then(|id| ctx.node_world(id));
        match (old_pos, new_pos) {
            (Some(old_pos), Some(new_pos)) => {
                let anchor = agent.distance(new_pos) * ctx.config.stale_anchor_ratio;
                agent.distance_squared(old_pos) > anchor * anchor
            }
            _ => false,
        }
    }

    /// While swimming in open water, cut straight to a later node when the
    /// direct line is clear and no longer than following the route.
    fn skip_ahead(&mut self, ctx: &SteeringContext) {
        if !ctx.body.in_water || ctx.body.region.is_some() {
            return;
        }
        let Some(route) = self.route.as_mut() else {
            return;
        };
        if route.is_unreachable() || route.is_finished() || route.cursor() + 1 >= route.len() {
            return;
        }
        let agent = ctx.agent_world();
        let Some(current) = route.current_node().and_then(|id| ctx.node_world(id)) else {
            return;
        };

        let cursor = route.cursor();
        let mut path_distance = agent.distance(current) + route.length_from(cursor, ctx.graph, ctx.layout);
        for i in (cursor + 2..route.len()).rev() {
            let Some(waypoint) = route.node_at(i).and_then(|id| ctx.node_world(id)) else {
                continue;
            };
            let direct_sq = agent.distance_squared(waypoint);
            if direct_sq > path_distance * path_distance || !ctx.layout.has_line_of_sight(agent, waypoint) {
                path_distance -= route.length_between(i - 1, i, ctx.graph, ctx.layout);
                continue;
            }
            route.skip_to(i);
            break;
        }
    }

    // ========================================================================
    // Path following
    // ========================================================================

    pub(super) fn check_doors(&mut self, ctx: &SteeringContext, commands: &mut Vec<SteeringCommand>) {
        let Some(route) = self.route.as_mut() else {
            return;
        };
        match run_door_protocol(route, ctx, commands) {
            DoorOutcome::Proposed => self.button_cooldown = ctx.config.button_press_interval,
            DoorOutcome::Unreachable => debug!("{}: route blocked by a door", ctx.label),
            DoorOutcome::Idle => {}
        }
    }

    pub(super) fn next_node(&mut self, ctx: &SteeringContext, check_doors: bool, commands: &mut Vec<SteeringCommand>) {
        if check_doors {
            self.check_doors(ctx, commands);
        }
        if let Some(route) = self.route.as_mut() {
            route.advance();
        }
    }

    pub(super) fn current_waypoint<'a>(&self, ctx: &SteeringContext<'a>) -> Option<&'a Waypoint> {
        self.route.as_ref()?.current_node().and_then(|id| ctx.node(id))
    }

    /// Vector from the agent to the current node, advancing the cursor when
    /// the node has been reached.
    fn diff_to_current_node(&mut self, ctx: &SteeringContext, commands: &mut Vec<SteeringCommand>) -> FixedVec2 {
        let Some(route) = self.route.as_ref() else {
            return FixedVec2::ZERO;
        };
        if route.is_unreachable() {
            return FixedVec2::ZERO;
        }
        if route.is_finished() {
            // The agent may have moved into another region since the plan
            return ctx.layout.to_world(self.target_region, self.target) - ctx.agent_world();
        }

        let mut doors_checked = false;
        if !ctx.caps.hands_locked && self.button_cooldown <= FixedNum::ZERO {
            self.check_doors(ctx, commands);
            doors_checked = true;
        }

        let Some(node) = self.current_waypoint(ctx) else {
            return FixedVec2::ZERO;
        };
        let body = ctx.body;
        let agent = ctx.agent_world();
        // Agent position in the node's frame
        let pos = agent - ctx.layout.origin(node.region);

        if let Some(diff) = self.follow_ladders(ctx, node, pos, doors_checked, commands) {
            return diff;
        }

        let door_passable = node.door
            .and_then(|id| ctx.layout.door(id))
            .map_or(true, |door| door.can_be_traversed());
        let two = FixedNum::from_num(2);

        if body.in_water {
            if door_passable {
                let margin = lerp(FixedNum::ONE, fx(5.0), saturate(body.velocity.length() / fx(10.0)));
                let target_distance = (body.collider_length() / two * margin).max(fx(0.5));
                let node_world = node.world_position(ctx.layout);
                let horizontal = (agent.x - node_world.x).abs();
                let mut vertical = (agent.y - node_world.y).abs();
                if body.hull != node.hull {
                    vertical *= two;
                }
                if horizontal + vertical < target_distance {
                    self.next_node(ctx, !doors_checked, commands);
                }
            }
        } else {
            // Anything smaller than a human is treated as human sized, or it
            // would never reach nodes placed for humans.
            let bottom = pos.y - body.size.y / two;
            let height = (body.size.y + body.collider_height_from_floor).max(ctx.config.min_body_height);
            let horizontal = (pos.x - node.position.x).abs();
            let above_feet = node.position.y > bottom;
            let not_too_high = node.position.y < bottom + height;
            let margin = lerp(FixedNum::ONE, fx(10.0), saturate(body.velocity.x.abs() / fx(5.0)));
            let target_distance = (body.size.x / two * margin).max(ctx.config.min_body_width / two);
            if horizontal < target_distance && above_feet && not_too_high && door_passable {
                self.next_node(ctx, !doors_checked, commands);
            }
        }

        match self.current_waypoint(ctx) {
            Some(node) => node.position - (agent - ctx.layout.origin(node.region)),
            None => FixedVec2::ZERO,
        }
    }
}

/// Region the route is tracked in: the current node's, or the last node's if
/// the current one is in the agent's own region.
fn route_region(route: &Route, ctx: &SteeringContext) -> Option<RegionId> {
    let current = route.current_node().and_then(|id| ctx.node(id)).map(|node| node.region);
    if current == Some(ctx.body.region) {
        route.last_node().and_then(|id| ctx.node(id)).and_then(|node| node.region)
    } else {
        current.flatten()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
