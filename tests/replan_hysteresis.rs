use std::cell::RefCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use petrel::game::config::SteeringConfig;
use petrel::game::layout::{RegionId, TeamId, VesselLayout};
use petrel::game::math::{fx, FixedNum, FixedVec2};
use petrel::game::pathfinding::{PathOracle, RouteRequest};
use petrel::game::steering::{AgentBody, AgentCapabilities, IndoorSteering, Route, SeekTarget, SteeringContext};
use petrel::game::waypoints::{Waypoint, WaypointGraph, WaypointId};

/// Always answers with one fixed route.
struct FixedOracle(RefCell<Option<Route>>);

impl PathOracle for FixedOracle {
    fn find_route(
        &self,
        _request: &RouteRequest,
        _penalty: &dyn Fn(&Waypoint, &Waypoint) -> Option<FixedNum>,
    ) -> Route {
        self.0.borrow_mut().take().unwrap_or_else(Route::unreachable)
    }
}

struct Corridor {
    layout: VesselLayout,
    graph: WaypointGraph,
    region: RegionId,
    nodes: Vec<WaypointId>,
}

/// Eleven nodes one metre apart along a straight corridor.
fn corridor() -> Corridor {
    let mut layout = VesselLayout::new();
    let region = layout.add_region("sub", FixedVec2::ZERO, TeamId(0));
    layout.add_hull(Some(region), FixedVec2::ZERO, FixedVec2::from_f32(12.0, 3.0));
    let mut graph = WaypointGraph::new();
    let nodes: Vec<_> = (0..=10)
        .map(|x| graph.add_node(Some(region), FixedVec2::from_f32(x as f32 + 1.0, 1.0)))
        .collect();
    graph.link_chain(&nodes);
    Corridor { layout, graph, region, nodes }
}

/// Runs one forced recheck with the agent standing on the route's current
/// node and reports whether the candidate replaced the old route.
fn adopts(c: &Corridor, old_cost: f32, cursor: usize, new_cost: f32) -> bool {
    let config = SteeringConfig::default();
    let agent_at = c.graph.node(c.nodes[cursor]).unwrap().position;
    let body = AgentBody::new(Some(c.region), agent_at);
    let caps = AgentCapabilities::humanoid(TeamId(0));
    let ctx = SteeringContext {
        body: &body,
        caps: &caps,
        graph: &c.graph,
        layout: &c.layout,
        config: &config,
        label: "hysteresis".into(),
    };

    let mut old = Route::new(c.nodes.iter().copied(), fx(old_cost));
    old.skip_to(cursor);
    let mut steering = IndoorSteering::with_replan_timer(fx(-1.5));
    steering.set_route(old, &ctx);

    // Same start node, different tail: never "identical"
    let candidate = Route::new([c.nodes[cursor], c.nodes[10], c.nodes[9]], fx(new_cost));
    let oracle = FixedOracle(RefCell::new(Some(candidate)));
    let seek = SeekTarget::new(FixedVec2::from_f32(11.0, 1.0));
    let mut rng = StdRng::seed_from_u64(5);
    let mut commands = Vec::new();
    steering.seek_towards(&ctx, &oracle, &mut rng, &seek, &mut commands);

    steering.current_route().map_or(false, |r| r.len() == 3)
}

#[test]
fn test_hysteresis_threshold_at_route_start() {
    let c = corridor();
    let mut rng = fastrand::Rng::with_seed(0xC0FFEE);
    for _ in 0..50 {
        let old_cost = 10.0 + rng.f32() * 90.0;
        // Stay clear of the exact boundary, fixed-point rounding sits there
        let cheap = old_cost * (0.5 + rng.f32() * 0.4);
        let pricey = old_cost * (0.97 + rng.f32() * 0.5);
        assert!(adopts(&c, old_cost, 0, cheap), "{} should replace {}", cheap, old_cost);
        assert!(!adopts(&c, old_cost, 0, pricey), "{} should not replace {}", pricey, old_cost);
    }
}

#[test]
fn test_required_saving_grows_with_progress() {
    let c = corridor();
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..30 {
        let old_cost = 20.0 + rng.f32() * 80.0;
        let cursor = rng.usize(1..10);
        let t = cursor as f32 / 10.0;
        let bar = old_cost * 0.95 * (1.0 - t);
        assert!(adopts(&c, old_cost, cursor, bar * 0.9), "cursor {}: {} < {}", cursor, bar * 0.9, bar);
        assert!(!adopts(&c, old_cost, cursor, bar * 1.1 + 0.01), "cursor {}: {} >= {}", cursor, bar * 1.1, bar);
    }
    // Nothing replaces a route that is at its last node
    assert!(!adopts(&c, 50.0, 10, 0.0));
}
