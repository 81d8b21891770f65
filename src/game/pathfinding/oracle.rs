use std::sync::Arc;
use crate::game::math::{FixedNum, FixedVec2};
use crate::game::layout::RegionId;
use crate::game::steering::Route;
use crate::game::waypoints::Waypoint;

/// Node acceptance predicate. Shared so seek targets can be cloned cheaply.
pub type NodeFilter = Arc<dyn Fn(&Waypoint) -> bool + Send + Sync>;

/// Everything a path oracle needs to plan one route.
#[derive(Clone, Default)]
pub struct RouteRequest {
    /// World position of the agent.
    pub start: FixedVec2,
    /// World position of the goal.
    pub target: FixedVec2,
    /// Region the agent is currently in.
    pub region: Option<RegionId>,
    /// Free-form context for log messages.
    pub label: String,
    pub min_gap_width: FixedNum,
    pub start_filter: Option<NodeFilter>,
    pub end_filter: Option<NodeFilter>,
    pub node_filter: Option<NodeFilter>,
    /// Require a clear line from start/target to the chosen end nodes.
    pub check_visibility: bool,
    /// Agent is inside a (non-ruin) vessel: ignore outside nodes as endpoints.
    pub inside_vessel: bool,
    /// Agent would be hurt outside: surcharge nodes in open water.
    pub penalize_outside_nodes: bool,
}

impl std::fmt::Debug for RouteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRequest")
            .field("start", &self.start)
            .field("target", &self.target)
            .field("region", &self.region)
            .field("label", &self.label)
            .field("min_gap_width", &self.min_gap_width)
            .field("check_visibility", &self.check_visibility)
            .finish_non_exhaustive()
    }
}

/// Graph search behind the steering manager.
///
/// Implementations must be pure given the request, the penalty callback and
/// the current graph/door state, and must report failure by returning an
/// unreachable route rather than panicking.
pub trait PathOracle {
    fn find_route(
        &self,
        request: &RouteRequest,
        penalty: &dyn Fn(&Waypoint, &Waypoint) -> Option<FixedNum>,
    ) -> Route;
}
