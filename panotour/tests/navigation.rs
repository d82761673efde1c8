use panotour::model::{
    Euler, Node, NodeSource, SessionConfig, TourSource, TransitPhase, Vec3,
};
use panotour::Tour;

fn node(id: u32, x: f32, y: f32, connections: &[u32]) -> NodeSource {
    NodeSource {
        node: Node {
            id,
            location: String::new(),
            url_high: format!("{}_h.jpg", id),
            url_mid: None,
            url_low: format!("{}_l.jpg", id),
            center: Vec3::new(x, y, 0.0),
            rotation: Euler::default(),
            radius: 25.0,
        },
        connections: connections.to_vec(),
    }
}

// 3 -- 4 -- 5, with 1 hanging off 3
fn corridor() -> Tour {
    Tour::new(
        TourSource {
            start_node: 3,
            tripod_height: 150.0,
            nodes: vec![
                node(1, -300.0, 0.0, &[3]),
                node(3, 0.0, 0.0, &[1, 4]),
                node(4, 0.0, 300.0, &[3, 5]),
                node(5, 0.0, 600.0, &[4]),
            ],
            ..TourSource::default()
        },
        SessionConfig::default(),
    )
    .unwrap()
}

fn settle_loads(t: &mut Tour) {
    loop {
        let requests = t.take_load_requests();
        if requests.is_empty() {
            break;
        }
        for r in requests {
            t.complete_load(r.node, r.resolution, r.generation);
        }
    }
}

fn run_transit(t: &mut Tour) {
    for _ in 0..100 {
        t.tick(25.0);
        if t.phase() == TransitPhase::Idle {
            return;
        }
    }
    panic!("transition did not finish");
}

#[test]
fn store_queries_never_panic_on_invalid_ids() {
    let t = corridor();
    assert!(t.is_valid_node(3));
    assert!(!t.is_valid_node(0)); // sparse slot
    assert!(!t.is_valid_node(99));
    assert_eq!(t.neighbors(3), &[1, 4]);
    assert!(t.neighbors(0).is_empty());
    assert!(t.neighbors(99).is_empty());
    assert!(t.is_valid_move(3, 4));
    assert!(!t.is_valid_move(3, 5));
    assert!(!t.is_valid_move(99, 3));
}

#[test]
fn walk_to_adjacent_node_completes() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert!(t.walk_to(4));
    assert_eq!(t.phase(), TransitPhase::Animating);
    run_transit(&mut t);
    assert_eq!(t.current_node(), 4);
    assert_eq!(t.phase(), TransitPhase::Idle);
}

#[test]
fn walk_rejects_non_adjacent_and_self() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert!(!t.walk_to(5)); // two hops away
    assert!(!t.walk_to(3)); // self
    assert!(!t.walk_to(99));
    assert_eq!(t.current_node(), 3);
    assert_eq!(t.phase(), TransitPhase::Idle);
}

#[test]
fn jump_skips_adjacency_but_not_validity() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert!(t.jump_to(5)); // not adjacent to 3
    // destination was not resident; the jump waits for its low-res
    assert_eq!(t.phase(), TransitPhase::AwaitingResource);
    settle_loads(&mut t);
    t.tick(250.0);
    assert_eq!(t.phase(), TransitPhase::Idle);
    assert_eq!(t.current_node(), 5);

    assert!(!t.jump_to(99));
    assert_eq!(t.current_node(), 5);
}

#[test]
fn jump_to_displayable_node_relocates_immediately() {
    let mut t = corridor();
    settle_loads(&mut t);
    // 4 is a neighbor of the start node, already resident
    assert!(t.jump_to(4));
    assert_eq!(t.phase(), TransitPhase::Idle);
    assert_eq!(t.current_node(), 4);
}

#[test]
fn requests_during_transition_are_dropped() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert!(t.walk_to(4));
    assert_eq!(t.phase(), TransitPhase::Animating);
    // competing requests while animating
    assert!(!t.walk_to(1));
    assert!(!t.jump_to(1));
    assert!(!t.walk(0.0));
    run_transit(&mut t);
    assert_eq!(t.current_node(), 4);
}

#[test]
fn requests_while_awaiting_resource_are_dropped() {
    let mut t = corridor();
    // hold the initial loads so the walk target is not displayable
    let initial = t.take_load_requests();
    assert!(t.walk_to(4));
    assert_eq!(t.phase(), TransitPhase::AwaitingResource);
    assert!(!t.walk_to(1));
    assert!(!t.jump_to(5));
    assert_eq!(t.current_node(), 3);

    for r in initial {
        t.complete_load(r.node, r.resolution, r.generation);
    }
    // completion between polls is only observed at the next boundary
    t.tick(100.0);
    assert_eq!(t.phase(), TransitPhase::AwaitingResource);
    t.tick(150.0);
    assert_eq!(t.phase(), TransitPhase::Animating);
    run_transit(&mut t);
    assert_eq!(t.current_node(), 4);
}

#[test]
fn markers_switch_to_destination_at_walk_request() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert_eq!(t.visible_markers(), t.neighbors(3));
    assert!(t.walk_to(4));
    // destination neighborhood is navigable before the animation lands
    assert_eq!(t.visible_markers(), &[3, 5]);
    run_transit(&mut t);
    assert_eq!(t.visible_markers(), t.neighbors(4));
}

#[test]
fn visibility_swaps_across_a_walk() {
    let mut t = corridor();
    settle_loads(&mut t);
    let visible = |t: &Tour| {
        t.displays()
            .into_iter()
            .filter(|d| d.visible)
            .map(|d| d.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(visible(&t), vec![3]);
    t.walk_to(4);
    // both endpoints visible while the cross-fade runs
    let mid = visible(&t);
    assert!(mid.contains(&3) && mid.contains(&4));
    let fading = t
        .displays()
        .into_iter()
        .find(|d| d.id == 4)
        .unwrap();
    assert_eq!(fading.opacity, 0.0);
    run_transit(&mut t);
    assert_eq!(visible(&t), vec![4]);
}

#[test]
fn camera_follows_the_move() {
    let mut t = corridor();
    settle_loads(&mut t);
    assert_eq!(t.camera().position, Vec3::new(0.0, 0.0, 0.0));
    t.walk_to(4);
    run_transit(&mut t);
    assert_eq!(t.camera().position, Vec3::new(0.0, 300.0, 0.0));
}

#[test]
fn busy_flag_tracks_loading_and_transit() {
    let mut t = corridor();
    assert!(t.is_loading()); // nothing resident yet
    settle_loads(&mut t);
    assert!(!t.is_loading());
    t.walk_to(4);
    assert!(t.is_loading());
    run_transit(&mut t);
    assert!(!t.is_loading());
}
