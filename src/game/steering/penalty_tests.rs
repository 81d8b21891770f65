use super::*;
use crate::game::math::fx;
use crate::game::layout::{AccessRule, DoorId, HullId, RegionId, TeamId};
use crate::game::waypoints::{WaypointGraph, WaypointId};

struct Fixture {
    layout: VesselLayout,
    graph: WaypointGraph,
    hull: HullId,
    door: DoorId,
    before: WaypointId,
    at_door: WaypointId,
    after: WaypointId,
}

/// One room, a closed door at x = 5 and three nodes across it.
fn fixture() -> Fixture {
    let mut layout = VesselLayout::new();
    let sub = layout.add_region("sub", FixedVec2::ZERO, TeamId(0));
    let hull = layout.add_hull(Some(sub), FixedVec2::from_f32(0.0, 0.0), FixedVec2::from_f32(10.0, 3.0));
    let door = layout.add_door(Some(sub), FixedVec2::from_f32(5.0, 1.0), fx(1.0), PassageAxis::Horizontal);
    let gap = layout.door(door).and_then(|d| d.gap);

    let mut graph = WaypointGraph::new();
    let before = graph.add_node(Some(sub), FixedVec2::from_f32(4.0, 1.0));
    let at_door = graph.add_node(Some(sub), FixedVec2::from_f32(5.0, 1.0));
    let after = graph.add_node(Some(sub), FixedVec2::from_f32(6.0, 1.0));
    for id in [before, at_door, after] {
        graph.node_mut(id).unwrap().hull = Some(hull);
    }
    let node = graph.node_mut(at_door).unwrap();
    node.door = Some(door);
    node.gap = gap;
    graph.link_chain(&[before, at_door, after]);

    Fixture { layout, graph, hull, door, before, at_door, after }
}

fn evaluate(f: &Fixture, caps: &AgentCapabilities, from: WaypointId, to: WaypointId) -> Option<FixedNum> {
    let config = SteeringConfig::default();
    let penalty = EdgePenalty {
        layout: &f.layout,
        caps,
        agent: FixedVec2::from_f32(3.0, 1.0),
        config: &config,
    };
    penalty.evaluate(f.graph.node(from).unwrap(), f.graph.node(to).unwrap())
}

#[test]
fn test_obstructed_node_is_impassable() {
    let mut f = fixture();
    f.graph.set_obstructed(f.after, true);
    let caps = AgentCapabilities::humanoid(TeamId(0));
    assert_eq!(evaluate(&f, &caps, f.at_door, f.after), None);
}

#[test]
fn test_closed_door_without_usable_control_is_impassable() {
    let f = fixture();
    let caps = AgentCapabilities::humanoid(TeamId(0));
    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), None, "No controls at all");

    let creature = AgentCapabilities::creature(TeamId(0));
    assert_eq!(evaluate(&f, &creature, f.before, f.at_door), None);
}

#[test]
fn test_control_must_be_on_agent_side() {
    let mut f = fixture();
    let caps = AgentCapabilities::humanoid(TeamId(0));

    // Agent stands at x = 3, the control is past the door
    f.layout.add_control(f.door, FixedVec2::from_f32(5.5, 1.0), fx(1.0));
    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), None);

    f.layout.add_control(f.door, FixedVec2::from_f32(4.5, 1.0), fx(1.0));
    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), Some(FixedNum::ZERO));
}

#[test]
fn test_control_access_rule_is_checked() {
    let mut f = fixture();
    let control = f.layout.add_control(f.door, FixedVec2::from_f32(4.5, 1.0), fx(1.0));
    f.layout.controls[control.0 as usize].access = AccessRule::Teams(smallvec::smallvec![TeamId(7)]);

    let outsider = AgentCapabilities::humanoid(TeamId(0));
    assert_eq!(evaluate(&f, &outsider, f.before, f.at_door), None);

    let insider = AgentCapabilities::humanoid(TeamId(7));
    assert_eq!(evaluate(&f, &insider, f.before, f.at_door), Some(FixedNum::ZERO));
}

#[test]
fn test_integrated_door_adds_surcharge() {
    let mut f = fixture();
    f.layout.doors[f.door.0 as usize].integrated_buttons = true;
    let caps = AgentCapabilities::humanoid(TeamId(0));
    let config = SteeringConfig::default();

    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), Some(config.closed_door_penalty));

    f.layout.set_door_open(f.door, true);
    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), Some(FixedNum::ZERO), "Open gap needs no check");
}

#[test]
fn test_jammed_door_only_passable_by_breaking() {
    let mut f = fixture();
    f.layout.doors[f.door.0 as usize].integrated_buttons = true;
    f.layout.doors[f.door.0 as usize].is_jammed = true;

    let crew = AgentCapabilities::humanoid(TeamId(0));
    assert_eq!(evaluate(&f, &crew, f.before, f.at_door), None);

    // Breakers only smash doors of other teams
    let own_breaker = AgentCapabilities { can_break_doors: true, ..AgentCapabilities::creature(TeamId(0)) };
    assert_eq!(evaluate(&f, &own_breaker, f.before, f.at_door), None);

    let hostile = AgentCapabilities { can_break_doors: true, ..AgentCapabilities::creature(TeamId(3)) };
    assert!(evaluate(&f, &hostile, f.before, f.at_door).is_some());

    f.layout.doors[f.door.0 as usize].indestructible = true;
    assert_eq!(evaluate(&f, &hostile, f.before, f.at_door), None);
}

#[test]
fn test_gap_without_door_is_impassable() {
    let mut f = fixture();
    let gap = f.layout.add_gap(Some(RegionId(0)), FixedVec2::from_f32(6.0, 1.0), fx(1.0), PassageAxis::Horizontal);
    f.layout.gaps[gap.0 as usize].open = fx(0.5);
    f.graph.node_mut(f.after).unwrap().gap = Some(gap);

    let caps = AgentCapabilities::humanoid(TeamId(0));
    assert_eq!(evaluate(&f, &caps, f.at_door, f.after), None);
}

#[test]
fn test_dangling_door_is_permissive() {
    let mut f = fixture();
    f.graph.node_mut(f.at_door).unwrap().door = Some(DoorId(42));
    let caps = AgentCapabilities::creature(TeamId(0));
    assert_eq!(evaluate(&f, &caps, f.before, f.at_door), Some(FixedNum::ZERO));
}

#[test]
fn test_non_climber_cannot_rise_above_water() {
    let mut f = fixture();
    let high = f.graph.add_node(Some(RegionId(0)), FixedVec2::from_f32(4.0, 2.5));
    f.graph.node_mut(high).unwrap().hull = Some(f.hull);

    let creature = AgentCapabilities::creature(TeamId(0));
    assert_eq!(evaluate(&f, &creature, f.before, high), None);

    // Submerged destination is reachable by swimming
    f.layout.hulls[f.hull.0 as usize].water_volume = fx(30.0);
    assert!(evaluate(&f, &creature, f.before, high).is_some());
}

#[test]
fn test_non_climber_cannot_use_ladders() {
    let mut f = fixture();
    let ladder = f.layout.add_ladder(Some(RegionId(0)), fx(4.0), fx(0.0), fx(3.0));
    let top = f.graph.add_node(Some(RegionId(0)), FixedVec2::from_f32(4.0, 1.5));
    f.graph.node_mut(top).unwrap().ladder = Some(ladder);
    f.graph.node_mut(f.before).unwrap().ladder = Some(ladder);

    let creature = AgentCapabilities::creature(TeamId(0));
    assert!(evaluate(&f, &creature, f.before, top).is_some(), "Interactable ladder, small rise");

    f.layout.ladders[ladder.0 as usize].interactable = false;
    assert_eq!(evaluate(&f, &creature, f.before, top), None);

    let crew = AgentCapabilities::humanoid(TeamId(0));
    assert!(evaluate(&f, &crew, f.before, top).is_some(), "Climbers ignore the ladder veto");
}

#[test]
fn test_climb_penalty_scales_with_height() {
    let mut f = fixture();
    let high = f.graph.add_node(Some(RegionId(0)), FixedVec2::from_f32(4.0, 2.5));
    f.graph.node_mut(high).unwrap().hull = Some(f.hull);
    let caps = AgentCapabilities { needs_air: false, ..AgentCapabilities::humanoid(TeamId(0)) };

    let cost = evaluate(&f, &caps, f.before, high).expect("Climbers may climb");
    assert_eq!(cost, fx(15.0));

    f.graph.node_mut(high).unwrap().stairs = true;
    assert_eq!(evaluate(&f, &caps, f.before, high), Some(FixedNum::ZERO), "Stairs are free");
}

#[test]
fn test_hazard_surcharges() {
    let mut f = fixture();
    let hull = &mut f.layout.hulls[f.hull.0 as usize];
    hull.fire_sizes.push(fx(2.0));
    // 10 wide, 3 tall: depth 3 means fully flooded
    hull.water_volume = fx(30.0);

    let crew = AgentCapabilities::humanoid(TeamId(0));
    let cost = evaluate(&f, &crew, f.after, f.before).unwrap();
    assert_eq!(cost, fx(20.0 + 500.0 + 1000.0));

    let diver = AgentCapabilities {
        has_diving_gear: true,
        pressure_protection: fx(100.0),
        ..AgentCapabilities::humanoid(TeamId(0))
    };
    assert_eq!(evaluate(&f, &diver, f.after, f.before), Some(fx(20.0)));

    let fish = AgentCapabilities::creature(TeamId(0));
    assert_eq!(evaluate(&f, &fish, f.after, f.before), Some(fx(20.0)), "No air, no water surcharge");
}

#[test]
fn test_access_filter_sees_every_control() {
    let mut f = fixture();
    f.layout.add_control(f.door, FixedVec2::from_f32(4.0, 1.0), fx(1.0));
    f.layout.add_control(f.door, FixedVec2::from_f32(4.5, 1.0), fx(1.0));
    let caps = AgentCapabilities::humanoid(TeamId(0));
    let door = f.layout.door(f.door).unwrap();

    let mut seen = 0;
    assert!(can_access_door(&f.layout, &caps, door, |_| {
        seen += 1;
        true
    }));
    assert_eq!(seen, 2);
}
