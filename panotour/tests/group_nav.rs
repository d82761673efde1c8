use panotour::model::{
    Euler, Group, GroupView, Node, NodeSource, SessionConfig, TourSource, TransitPhase, Vec3,
};
use panotour::Tour;
use std::cell::RefCell;
use std::rc::Rc;

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

fn group(
    id: u32,
    parent: u32,
    children: &[u32],
    members: &[u32],
    start_group: u32,
    start_node: Option<u32>,
) -> Group {
    Group {
        id,
        parent,
        children: children.to_vec(),
        members: members.to_vec(),
        start_group,
        start_node,
        start_orientation: 0.0,
        title: format!("G{}", id),
        description: format!("group {}", id),
        tags: Vec::new(),
    }
}

// root group 0 is virtual; groups 1 and 2 hold two nodes each, bridged by
// the 1 -> 2 edge between nodes 1 and 2
fn estate() -> Tour {
    let mut g2 = group(2, 0, &[], &[2, 3], 2, Some(2));
    g2.start_orientation = 90.0;
    g2.tags = vec![("floor".into(), "2".into()), ("area".into(), "80 sqm".into())];
    Tour::new(
        TourSource {
            tripod_height: 150.0,
            nodes: vec![
                node(0, 0.0, 0.0, &[1]),
                node(1, 0.0, 300.0, &[0, 2]),
                node(2, 0.0, 600.0, &[1, 3]),
                node(3, 0.0, 900.0, &[2]),
            ],
            groups: Some(vec![
                group(0, 0, &[1, 2], &[], 1, None),
                group(1, 0, &[], &[0, 1], 1, Some(0)),
                g2,
            ]),
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
fn startup_enters_the_resolved_start_group() {
    let mut t = estate();
    // root is virtual; its chain lands in group 1, which starts at node 0
    assert_eq!(t.current_node(), 0);
    assert_eq!(t.current_group(), Some(1));
    assert!(t.take_group_changed());
    let view = t.group_view().unwrap();
    assert_eq!(view.primary.title, "G0");
    assert_eq!(view.secondary.title, "G1");
    // group 1 has no children, so the refs are its siblings (itself included)
    let refs: Vec<u32> = view.nav_refs.iter().map(|r| r.id).collect();
    assert_eq!(refs, vec![1, 2]);
}

#[test]
fn moves_inside_a_group_do_not_republish() {
    let mut t = estate();
    settle_loads(&mut t);
    assert!(t.take_group_changed());
    t.walk_to(1);
    run_transit(&mut t);
    assert_eq!(t.current_group(), Some(1));
    assert!(!t.take_group_changed());
}

#[test]
fn group_crossing_updates_the_metadata_view() {
    let mut t = estate();
    settle_loads(&mut t);
    t.take_group_changed();
    t.walk_to(1);
    run_transit(&mut t);
    settle_loads(&mut t);
    t.walk_to(2);
    run_transit(&mut t);
    assert_eq!(t.current_group(), Some(2));
    assert!(t.take_group_changed());
    let view = t.group_view().unwrap();
    assert_eq!(view.primary.title, "G0");
    assert_eq!(view.secondary.title, "G2");
    assert_eq!(
        view.secondary.tags_concat(),
        "floor: 2\narea: 80 sqm\n"
    );
}

#[test]
fn registered_callback_fires_on_crossing_and_registration() {
    let mut t = estate();
    settle_loads(&mut t);
    let seen: Rc<RefCell<Vec<GroupView>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    t.on_group_change(Box::new(move |v| sink.borrow_mut().push(v.clone())));
    // registration delivers the current view immediately
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].current_group, 1);

    t.walk_to(1);
    run_transit(&mut t);
    assert_eq!(seen.borrow().len(), 1); // same group, no publish

    settle_loads(&mut t);
    t.walk_to(2);
    run_transit(&mut t);
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[1].current_group, 2);
}

#[test]
fn re_registering_replaces_the_callback() {
    let mut t = estate();
    settle_loads(&mut t);
    let first: Rc<RefCell<u32>> = Rc::new(RefCell::new(0));
    let second: Rc<RefCell<u32>> = Rc::new(RefCell::new(0));
    let a = first.clone();
    t.on_group_change(Box::new(move |_| *a.borrow_mut() += 1));
    let b = second.clone();
    t.on_group_change(Box::new(move |_| *b.borrow_mut() += 1));
    let first_count = *first.borrow();

    t.walk_to(1);
    run_transit(&mut t);
    settle_loads(&mut t);
    t.walk_to(2);
    run_transit(&mut t);
    assert_eq!(*first.borrow(), first_count); // old callback silent
    assert_eq!(*second.borrow(), 2); // registration + crossing
}

#[test]
fn jump_to_group_enters_through_its_start_node() {
    let mut t = estate();
    settle_loads(&mut t);
    assert!(t.jump_to_group(2));
    settle_loads(&mut t);
    t.tick(250.0);
    assert_eq!(t.phase(), TransitPhase::Idle);
    assert_eq!(t.current_node(), 2);
    assert_eq!(t.current_group(), Some(2));
    // the group's start orientation is adopted
    assert_eq!(t.view().longitude(), 90.0);
}

#[test]
fn jump_to_virtual_group_descends_to_its_start_group() {
    let mut t = estate();
    settle_loads(&mut t);
    t.walk_to(1);
    run_transit(&mut t);
    assert!(t.jump_to_group(0)); // virtual root resolves to group 1
    t.tick(250.0);
    assert_eq!(t.current_node(), 0);
    assert_eq!(t.current_group(), Some(1));
}

#[test]
fn jump_to_unknown_group_is_ignored() {
    let mut t = estate();
    settle_loads(&mut t);
    assert!(!t.jump_to_group(9));
    assert_eq!(t.current_node(), 0);
    assert_eq!(t.phase(), TransitPhase::Idle);
}
