use smallvec::SmallVec;
use crate::game::math::FixedNum;
use crate::game::layout::VesselLayout;
use crate::game::waypoints::{WaypointGraph, WaypointId};

/// A planned node sequence plus a cursor marking progress along it.
///
/// Invariant: `cursor <= len`, and the route is finished exactly when
/// `cursor == len`. An empty route is always unreachable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    nodes: SmallVec<[WaypointId; 16]>,
    cost: FixedNum,
    unreachable: bool,
    cursor: usize,
}

impl Route {
    pub fn new(nodes: impl IntoIterator<Item = WaypointId>, cost: FixedNum) -> Self {
        let nodes: SmallVec<[WaypointId; 16]> = nodes.into_iter().collect();
        let unreachable = nodes.is_empty();
        Self {
            nodes,
            cost,
            unreachable,
            cursor: 0,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            nodes: SmallVec::new(),
            cost: FixedNum::ZERO,
            unreachable: true,
            cursor: 0,
        }
    }

    pub fn nodes(&self) -> &[WaypointId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cost(&self) -> FixedNum {
        self.cost
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_unreachable(&self) -> bool {
        self.unreachable
    }

    pub fn mark_unreachable(&mut self) {
        self.unreachable = true;
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.nodes.len()
    }

    pub fn current_node(&self) -> Option<WaypointId> {
        self.nodes.get(self.cursor).copied()
    }

    pub fn next_node(&self) -> Option<WaypointId> {
        self.nodes.get(self.cursor + 1).copied()
    }

    pub fn prev_node(&self) -> Option<WaypointId> {
        self.cursor.checked_sub(1).and_then(|i| self.nodes.get(i).copied())
    }

    pub fn last_node(&self) -> Option<WaypointId> {
        self.nodes.last().copied()
    }

    pub fn node_at(&self, index: usize) -> Option<WaypointId> {
        self.nodes.get(index).copied()
    }

    /// Moves the cursor one node forward; stops at `len` (finished).
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.nodes.len());
    }

    pub fn skip_to(&mut self, index: usize) {
        self.cursor = index.min(self.nodes.len());
    }

    /// Fraction of the route already consumed, `cursor / (len - 1)`.
    /// `None` for routes shorter than two nodes.
    pub fn progress(&self) -> Option<FixedNum> {
        if self.nodes.len() < 2 {
            return None;
        }
        Some(FixedNum::from_num(self.cursor) / FixedNum::from_num(self.nodes.len() - 1))
    }

    /// Same length and the same nodes up to, but not including, the last one.
    /// The final node is the target itself and may be re-snapped between plans.
    pub fn is_identical(&self, other: &Route) -> bool {
        let len = self.nodes.len();
        if len != other.nodes.len() {
            return false;
        }
        let compared = len.saturating_sub(1);
        self.nodes[..compared] == other.nodes[..compared]
    }

    /// World length of the polyline from node `start` to node `end` (inclusive).
    pub fn length_between(&self, start: usize, end: usize, graph: &WaypointGraph, layout: &VesselLayout) -> FixedNum {
        let end = end.min(self.nodes.len().saturating_sub(1));
        if start >= end {
            return FixedNum::ZERO;
        }
        graph.polyline_length(&self.nodes[start..=end], layout)
    }

    /// World length of the remaining polyline starting at node `start`.
    pub fn length_from(&self, start: usize, graph: &WaypointGraph, layout: &VesselLayout) -> FixedNum {
        self.length_between(start, self.nodes.len().saturating_sub(1), graph, layout)
    }
}
