use bevy::prelude::*;
use petrel::game::demo::{demo_scene, DemoScene};
use petrel::game::layout::{ControlId, TeamId};
use petrel::game::math::{fx, FixedVec2};
use petrel::game::sandbox::SandboxPlugin;
use petrel::game::steering::{
    AgentBody, AgentCapabilities, IndoorSteering, InteractRequest, InteractTarget, NavSet, RouteUnreachable,
    SeekTarget, SteeringCommand, SteeringPlugin,
};

/// Everything the steering core published, in order.
#[derive(Resource, Default)]
struct Published {
    interactions: Vec<InteractRequest>,
    unreachable: Vec<RouteUnreachable>,
}

fn record_messages(
    mut published: ResMut<Published>,
    mut interactions: MessageReader<InteractRequest>,
    mut unreachable: MessageReader<RouteUnreachable>,
) {
    published.interactions.extend(interactions.read().copied());
    published.unreachable.extend(unreachable.read().copied());
}

fn setup_app(scene: &DemoScene) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SteeringPlugin);
    app.insert_resource(scene.data.graph.clone());
    app.insert_resource(scene.data.layout.clone());
    app.init_resource::<Published>();
    app.add_systems(FixedUpdate, record_messages.after(NavSet::Steer));
    app
}

fn spawn_agent(app: &mut App, scene: &DemoScene, caps: AgentCapabilities, at: FixedVec2, target: FixedVec2) -> Entity {
    app.world_mut().spawn((
        AgentBody::new(Some(scene.region), at),
        caps,
        SeekTarget::new(target),
    )).id()
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn doorway_index(app: &App, agent: Entity, scene: &DemoScene) -> Option<usize> {
    let steering = app.world().get::<IndoorSteering>(agent)?;
    let route = steering.current_route()?;
    route.nodes().iter().position(|&id| {
        scene.data.graph.node(id).and_then(|n| n.door) == Some(scene.door)
    })
}

#[test]
fn test_crew_presses_button_before_passing_door() {
    let scene = demo_scene();
    let mut app = setup_app(&scene);
    // Standing on the node before the bulkhead, heading two nodes past it
    let agent = spawn_agent(
        &mut app,
        &scene,
        AgentCapabilities::humanoid(TeamId(0)),
        FixedVec2::from_f32(5.0, 1.0),
        FixedVec2::from_f32(9.0, 1.0),
    );

    run_ticks(&mut app, 120);

    let published = app.world().resource::<Published>();
    let presses: Vec<_> = published.interactions.iter().filter(|r| r.agent == agent).collect();
    assert!(!presses.is_empty(), "Agent should have asked for the door to open");
    // Control 0 is on the agent's side, control 1 across the door
    assert_eq!(presses[0].command, SteeringCommand::Interact(InteractTarget::Control(ControlId(0))));
    assert!(published.unreachable.is_empty());

    let steering = app.world().get::<IndoorSteering>(agent).unwrap();
    let route = steering.current_route().expect("Route should have been planned");
    let doorway = doorway_index(&app, agent, &scene).expect("Route should go through the door");
    assert!(route.cursor() <= doorway, "Cursor must not pass the shut door");
}

#[test]
fn test_creature_cannot_plan_through_shut_door() {
    let scene = demo_scene();
    let mut app = setup_app(&scene);
    let agent = spawn_agent(
        &mut app,
        &scene,
        AgentCapabilities::creature(TeamId(0)),
        FixedVec2::from_f32(5.0, 1.0),
        FixedVec2::from_f32(9.0, 1.0),
    );

    run_ticks(&mut app, 120);

    let published = app.world().resource::<Published>();
    assert!(published.interactions.is_empty(), "No interactions for an agent that can't open doors");
    assert!(published.unreachable.iter().any(|m| m.agent == agent));

    let steering = app.world().get::<IndoorSteering>(agent).unwrap();
    assert!(steering.current_route().unwrap().is_unreachable());
}

#[test]
fn test_moved_target_flags_replan_before_timer() {
    let scene = demo_scene();
    let mut app = setup_app(&scene);
    let mut caps = AgentCapabilities::humanoid(TeamId(0));
    caps.replan_priority = fx(0.9);
    let agent = spawn_agent(&mut app, &scene, caps, FixedVec2::from_f32(1.0, 1.0), FixedVec2::from_f32(5.0, 1.0));

    // The first plan happens within a second
    run_ticks(&mut app, 62);
    let (generation, timer) = {
        let steering = app.world().get::<IndoorSteering>(agent).unwrap();
        assert!(steering.current_route().is_some());
        assert!(!steering.is_route_stale());
        (steering.route_generation(), steering.replan_timer())
    };
    assert!(timer > fx(0.1), "Timer should still be running, got {}", timer);

    app.world_mut().get_mut::<SeekTarget>(agent).unwrap().position = scene.upper_left;
    run_ticks(&mut app, 1);

    let steering = app.world().get::<IndoorSteering>(agent).unwrap();
    assert!(steering.is_route_stale(), "Large target move should demand a new path");
    assert_eq!(steering.route_generation(), generation, "Replan itself still waits for the timer");
}

#[test]
fn test_crew_walks_to_upper_deck() {
    let scene = demo_scene();
    let mut app = setup_app(&scene);
    app.add_plugins(SandboxPlugin);
    let agent = spawn_agent(
        &mut app,
        &scene,
        AgentCapabilities::humanoid(TeamId(0)),
        scene.lower_left,
        scene.upper_left,
    );

    run_ticks(&mut app, 2400);

    let body = app.world().get::<AgentBody>(agent).unwrap();
    assert_eq!(body.hull, Some(scene.upper_deck), "Agent should have climbed up, at {:?}", body.position);
    assert!(!body.is_climbing);
    assert!(
        body.position.distance(scene.upper_left) < fx(0.5),
        "Agent should have reached the target, at {:?}", body.position
    );

    let published = app.world().resource::<Published>();
    let pressed_control = published.interactions.iter()
        .any(|r| matches!(r.command, SteeringCommand::Interact(InteractTarget::Control(_))));
    let grabbed_ladder = published.interactions.iter()
        .any(|r| matches!(r.command, SteeringCommand::Interact(InteractTarget::Ladder(_))));
    assert!(pressed_control && grabbed_ladder);
    assert!(published.unreachable.is_empty());
}
