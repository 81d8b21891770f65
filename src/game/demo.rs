use crate::game::layout::io::LayoutData;
use crate::game::layout::{DoorId, HullId, PassageAxis, RegionId, TeamId, VesselLayout};
use crate::game::math::{fx, FixedNum, FixedVec2};
use crate::game::waypoints::{WaypointGraph, WaypointId};

/// Handles into the demo scene for spawning agents and checking results.
#[derive(Clone, Debug)]
pub struct DemoScene {
    pub data: LayoutData,
    pub region: RegionId,
    pub lower_deck: HullId,
    pub upper_deck: HullId,
    pub door: DoorId,
    /// Walking positions at either end of each deck, in the region frame.
    pub lower_left: FixedVec2,
    pub upper_left: FixedVec2,
}

fn node(graph: &mut WaypointGraph, region: RegionId, hull: HullId, x: f32, y: f32) -> WaypointId {
    let id = graph.add_node(Some(region), FixedVec2::from_f32(x, y));
    if let Some(waypoint) = graph.node_mut(id) {
        waypoint.hull = Some(hull);
    }
    id
}

/// Two-deck vessel: a bulkhead door with a button on each side splits the
/// lower deck, a ladder at the right end leads up.
///
/// ```text
///   |  u3   u2   u1   u0  L1 |   upper deck  y 3..6
///   |  l0 l1 l2 [D] l3 l4 L0 |   lower deck  y 0..3
///   0          6          10 12
/// ```
pub fn demo_scene() -> DemoScene {
    let mut layout = VesselLayout::new();
    let region = layout.add_region("demo_sub", FixedVec2::from_f32(50.0, -20.0), TeamId(0));
    let lower_deck = layout.add_hull(Some(region), FixedVec2::ZERO, FixedVec2::from_f32(12.0, 3.0));
    let upper_deck = layout.add_hull(Some(region), FixedVec2::from_f32(0.0, 3.0), FixedVec2::from_f32(12.0, 6.0));

    layout.add_wall(Some(region), FixedVec2::ZERO, FixedVec2::from_f32(0.0, 6.0));
    layout.add_wall(Some(region), FixedVec2::from_f32(12.0, 0.0), FixedVec2::from_f32(12.0, 6.0));

    let door = layout.add_door(Some(region), FixedVec2::from_f32(6.0, 1.0), fx(1.0), PassageAxis::Horizontal);
    layout.add_control(door, FixedVec2::from_f32(5.2, 1.2), fx(1.0));
    layout.add_control(door, FixedVec2::from_f32(6.8, 1.2), fx(1.0));
    let gap = layout.door(door).and_then(|d| d.gap);

    let ladder = layout.add_ladder(Some(region), fx(10.0), FixedNum::ZERO, fx(6.0));

    let mut graph = WaypointGraph::new();
    let lower: Vec<_> = [1.0, 3.0, 5.0, 6.0, 7.0, 9.0, 10.0]
        .into_iter()
        .map(|x| node(&mut graph, region, lower_deck, x, 1.0))
        .collect();
    let rung = node(&mut graph, region, upper_deck, 10.0, 4.0);
    let upper: Vec<_> = [9.0, 6.0, 3.0, 1.0]
        .into_iter()
        .map(|x| node(&mut graph, region, upper_deck, x, 4.0))
        .collect();

    if let Some(doorway) = graph.node_mut(lower[3]) {
        doorway.door = Some(door);
        doorway.gap = gap;
    }
    for id in [lower[6], rung] {
        if let Some(waypoint) = graph.node_mut(id) {
            waypoint.ladder = Some(ladder);
        }
    }

    let mut chain = lower;
    chain.push(rung);
    chain.extend(upper);
    graph.link_chain(&chain);

    DemoScene {
        data: LayoutData::new(graph, layout),
        region,
        lower_deck,
        upper_deck,
        door,
        lower_left: FixedVec2::from_f32(1.0, 1.0),
        upper_left: FixedVec2::from_f32(1.0, 4.0),
    }
}
