use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use crate::game::config::SteeringConfig;
use crate::game::math::{FixedNum, FixedVec2};
use crate::game::layout::VesselLayout;
use crate::game::steering::Route;
use crate::game::waypoints::{Waypoint, WaypointGraph, WaypointId};
use super::oracle::{NodeFilter, PathOracle, RouteRequest};

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: FixedNum,
    node: WaypointId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn passes(filter: &Option<NodeFilter>, node: &Waypoint) -> bool {
    filter.as_ref().map_or(true, |f| f(node))
}

/// Reference A* oracle over the waypoint graph.
///
/// Edge cost is world distance plus the caller's penalty; vetoed edges,
/// filtered nodes and gaps narrower than the request allows are skipped.
pub struct WaypointPathFinder<'a> {
    graph: &'a WaypointGraph,
    layout: &'a VesselLayout,
    config: &'a SteeringConfig,
}

impl<'a> WaypointPathFinder<'a> {
    pub fn new(graph: &'a WaypointGraph, layout: &'a VesselLayout, config: &'a SteeringConfig) -> Self {
        Self { graph, layout, config }
    }

    fn world(&self, node: &Waypoint) -> FixedVec2 {
        node.world_position(self.layout)
    }

    /// Closest acceptable node to `position`, preferring one in plain sight.
    fn endpoint(&self, position: FixedVec2, filter: &Option<NodeFilter>, request: &RouteRequest) -> Option<WaypointId> {
        let mut candidates: Vec<(FixedNum, WaypointId)> = self.graph
            .nodes()
            .filter(|node| !node.obstructed)
            .filter(|node| !request.inside_vessel || node.region.is_some())
            .filter(|node| passes(filter, node) && passes(&request.node_filter, node))
            .map(|node| (position.distance_squared(self.world(node)), node.id))
            .collect();
        candidates.sort_unstable();

        let nearest = candidates.first().map(|&(_, id)| id);
        if !request.check_visibility {
            return nearest;
        }
        candidates
            .iter()
            .take(self.config.visibility_candidates)
            .find(|(_, id)| {
                self.graph
                    .world_position(*id, self.layout)
                    .map_or(false, |p| self.layout.has_line_of_sight(position, p))
            })
            .map(|&(_, id)| id)
            .or(nearest)
    }

    fn reconstruct(came_from: &FxHashMap<WaypointId, WaypointId>, goal: WaypointId) -> Vec<WaypointId> {
        let mut nodes = vec![goal];
        let mut current = goal;
        while let Some(&prev) = came_from.get(&current) {
            nodes.push(prev);
            current = prev;
        }
        nodes.reverse();
        nodes
    }
}

impl<'a> PathOracle for WaypointPathFinder<'a> {
    fn find_route(
        &self,
        request: &RouteRequest,
        penalty: &dyn Fn(&Waypoint, &Waypoint) -> Option<FixedNum>,
    ) -> Route {
        let Some(start) = self.endpoint(request.start, &request.start_filter, request) else {
            debug!("[PATHFINDING] {}: no start node near {:?}", request.label, request.start.to_vec2());
            return Route::unreachable();
        };
        let Some(goal) = self.endpoint(request.target, &request.end_filter, request) else {
            debug!("[PATHFINDING] {}: no end node near {:?}", request.label, request.target.to_vec2());
            return Route::unreachable();
        };
        if start == goal {
            return Route::new([start], FixedNum::ZERO);
        }
        let Some(goal_pos) = self.graph.world_position(goal, self.layout) else {
            return Route::unreachable();
        };

        let max_iterations = self.config.max_search_iterations;
        let mut iterations = 0;

        let mut open_set = BinaryHeap::new();
        let mut came_from: FxHashMap<WaypointId, WaypointId> = FxHashMap::default();
        let mut g_score: FxHashMap<WaypointId, FixedNum> = FxHashMap::default();
        let mut closed = FixedBitSet::with_capacity(self.graph.len());

        g_score.insert(start, FixedNum::ZERO);
        open_set.push(State { cost: FixedNum::ZERO, node: start });

        while let Some(State { cost: _, node: current }) = open_set.pop() {
            iterations += 1;
            if iterations > max_iterations {
                error!("[PATHFINDING] {}: A* exceeded max iterations ({}) between {:?} and {:?}",
                       request.label, max_iterations, start, goal);
                return Route::unreachable();
            }

            if current == goal {
                let cost = g_score.get(&goal).copied().unwrap_or(FixedNum::ZERO);
                return Route::new(Self::reconstruct(&came_from, goal), cost);
            }

            if closed.contains(current.index()) {
                continue;
            }
            closed.insert(current.index());

            let Some(node) = self.graph.node(current) else {
                continue;
            };
            let node_pos = self.world(node);
            let current_g = g_score.get(&current).copied().unwrap_or(FixedNum::MAX);

            for &next_id in &node.links {
                if closed.contains(next_id.index()) {
                    continue;
                }
                let Some(next) = self.graph.node(next_id) else {
                    continue;
                };
                if next_id != goal && !passes(&request.node_filter, next) {
                    continue;
                }
                let too_narrow = next.gap
                    .and_then(|id| self.layout.gap(id))
                    .map_or(false, |gap| gap.width < request.min_gap_width);
                if too_narrow {
                    continue;
                }
                let Some(extra) = penalty(node, next) else {
                    continue;
                };

                let next_pos = self.world(next);
                let mut step = node_pos.distance(next_pos) + extra;
                if request.penalize_outside_nodes && next.region.is_none() {
                    step += self.config.outside_node_penalty;
                }

                let tentative = current_g + step;
                if tentative < g_score.get(&next_id).copied().unwrap_or(FixedNum::MAX) {
                    came_from.insert(next_id, current);
                    g_score.insert(next_id, tentative);
                    open_set.push(State { cost: tentative + next_pos.distance(goal_pos), node: next_id });
                }
            }
        }

        debug!("[PATHFINDING] {}: no route from {:?} to {:?}", request.label, start, goal);
        Route::unreachable()
    }
}
