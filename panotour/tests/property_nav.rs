use panotour::model::{
    Euler, LoadRequest, LoadState, Node, NodeSource, SessionConfig, TourSource, TransitPhase,
    Vec3,
};
use panotour::Tour;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Jump { idx: u8 },
    WalkTo { idx: u8 },
    WalkHeading { deg: i16 },
    Turn { dx: i8, dy: i8 },
    Tick { ms: u16 },
    CompleteNext,
    DropNext,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(|idx| Op::Jump { idx }),
        any::<u8>().prop_map(|idx| Op::WalkTo { idx }),
        (-180i16..=180).prop_map(|deg| Op::WalkHeading { deg }),
        (any::<i8>(), any::<i8>()).prop_map(|(dx, dy)| Op::Turn { dx, dy }),
        (0u16..=600).prop_map(|ms| Op::Tick { ms }),
        Just(Op::CompleteNext),
        Just(Op::DropNext),
    ]
}

const IDS: [u32; 6] = [0, 1, 2, 3, 4, 6]; // id 5 left sparse on purpose

fn ring() -> Tour {
    let node = |id: u32, x: f32, y: f32, connections: &[u32]| NodeSource {
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
    };
    Tour::new(
        TourSource {
            start_node: 0,
            tripod_height: 150.0,
            nodes: vec![
                node(0, 0.0, 0.0, &[1, 2]),
                node(1, 300.0, 0.0, &[0, 3]),
                node(2, 0.0, 300.0, &[0]),
                node(3, 300.0, 300.0, &[1, 4]),
                node(4, 300.0, 600.0, &[3, 6]),
                node(6, 0.0, 600.0, &[4, 0]),
            ],
            ..TourSource::default()
        },
        SessionConfig::default(),
    )
    .unwrap()
}

struct ModelState {
    inflight: Vec<LoadRequest>,
    dropped: Vec<LoadRequest>,
    states: Vec<(u32, LoadState)>,
}

fn check_invariants(t: &Tour, state: &mut ModelState) {
    // the current node is always a defined node
    assert!(t.is_valid_node(t.current_node()));

    // load states only ever progress one stage at a time and reset to
    // Unloaded; LowLoaded is never skipped
    for (id, prev) in state.states.iter_mut() {
        let next = t.load_state(*id);
        let legal = next == *prev
            || next == LoadState::Unloaded
            || (*prev == LoadState::Unloaded && next == LoadState::LowLoaded)
            || (*prev == LoadState::LowLoaded && next == LoadState::HighLoaded);
        assert!(legal, "node {} jumped {:?} -> {:?}", id, prev, next);
        *prev = next;
    }

    // whenever the machine is idle, the navigable markers are exactly the
    // neighbors of the current node
    if t.phase() == TransitPhase::Idle {
        assert_eq!(t.visible_markers(), t.neighbors(t.current_node()));
        // and the current node's imagery is kept resident
        assert!(t.is_node_resident(t.current_node()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_interleavings_preserve_engine_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..80)
    ) {
        let mut t = ring();
        let mut state = ModelState {
            inflight: Vec::new(),
            dropped: Vec::new(),
            states: IDS.iter().map(|&id| (id, LoadState::Unloaded)).collect(),
        };

        for op in ops {
            match op {
                Op::Jump { idx } => {
                    // sometimes a defined node, sometimes garbage
                    let target = if idx % 3 == 0 { idx as u32 } else { IDS[idx as usize % IDS.len()] };
                    let before = t.current_node();
                    let accepted = t.jump_to(target);
                    if !accepted {
                        prop_assert_eq!(t.current_node(), before);
                    }
                }
                Op::WalkTo { idx } => {
                    let target = IDS[idx as usize % IDS.len()];
                    let before = t.current_node();
                    let accepted = t.walk_to(target);
                    if accepted {
                        prop_assert!(t.is_valid_move(before, target));
                    } else {
                        prop_assert_eq!(t.current_node(), before);
                    }
                }
                Op::WalkHeading { deg } => {
                    t.walk(deg as f32);
                }
                Op::Turn { dx, dy } => {
                    t.turn(dx as f32 / 127.0, dy as f32 / 127.0);
                }
                Op::Tick { ms } => {
                    t.tick(ms as f32);
                }
                Op::CompleteNext => {
                    state.inflight.extend(t.take_load_requests());
                    if !state.inflight.is_empty() {
                        let r = state.inflight.remove(0);
                        t.complete_load(r.node, r.resolution, r.generation);
                    }
                }
                Op::DropNext => {
                    // a failed fetch: the request goes unanswered for now
                    state.inflight.extend(t.take_load_requests());
                    if !state.inflight.is_empty() {
                        let r = state.inflight.remove(0);
                        state.dropped.push(r);
                    }
                }
            }
            check_invariants(&t, &mut state);
        }

        // a machine stuck waiting can always be drained to idle once the
        // host answers everything, retried fetches included; completions
        // for released generations are discarded harmlessly
        for _ in 0..200 {
            if t.phase() == TransitPhase::Idle {
                break;
            }
            state.inflight.extend(t.take_load_requests());
            state.inflight.extend(state.dropped.drain(..));
            for r in state.inflight.drain(..) {
                t.complete_load(r.node, r.resolution, r.generation);
            }
            t.tick(250.0);
        }
        prop_assert_eq!(t.phase(), TransitPhase::Idle);
        prop_assert!(t.is_valid_node(t.current_node()));
    }
}
