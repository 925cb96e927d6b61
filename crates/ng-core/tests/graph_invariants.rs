//! Integration tests: graph store invariants under random edit sequences.
//!
//! Drives `GraphStore` through long seeded sequences of adds, removals,
//! connections and selections, checking after every step that no
//! connection outlives its endpoints.

use ng_core::{
    ConnectionAnchor, EdgeId, GraphMutation, GraphStore, Handle, NoteId, NotePatch, Point,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_no_dangling(store: &GraphStore) {
    for edge in store.connections() {
        assert!(
            store.contains_note(edge.source),
            "edge {} has dangling source {}",
            edge.id,
            edge.source
        );
        assert!(
            store.contains_note(edge.target),
            "edge {} has dangling target {}",
            edge.id,
            edge.target
        );
        assert_ne!(edge.source, edge.target, "self-connection {}", edge.id);
    }
    assert_eq!(store.connections().count(), store.edge_count());
    assert_eq!(store.notes().count(), store.note_count());
}

fn random_handle(rng: &mut StdRng) -> Handle {
    Handle::ALL[rng.random_range(0..Handle::ALL.len())]
}

// ─── Random sequences ───────────────────────────────────────────────────

#[test]
fn random_add_remove_never_leaves_dangling_edges() {
    init_logger();
    for seed in 0..16u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = GraphStore::new();
        let mut live: Vec<NoteId> = Vec::new();
        let mut removed: Vec<NoteId> = Vec::new();

        for _ in 0..400 {
            match rng.random_range(0..10) {
                0..=2 => {
                    let p = Point::new(rng.random_range(-500.0..500.0), rng.random_range(-500.0..500.0));
                    let id = store.add_node(p, "");
                    if rng.random_bool(0.8) {
                        store.update_node(id, &NotePatch::editing(false));
                    }
                    live.push(id);
                }
                3..=5 if live.len() >= 2 => {
                    let a = live[rng.random_range(0..live.len())];
                    let b = live[rng.random_range(0..live.len())];
                    let (ha, hb) = (random_handle(&mut rng), random_handle(&mut rng));
                    let before = store.edge_count();
                    let result = store.add_edge(a, ha, b, hb);
                    let editing = store.note(a).is_some_and(|n| n.editing)
                        || store.note(b).is_some_and(|n| n.editing);
                    if a == b || editing {
                        assert_eq!(result, None);
                        assert_eq!(store.edge_count(), before);
                    } else {
                        assert!(result.is_some());
                    }
                }
                6 | 7 if !live.is_empty() => {
                    let i = rng.random_range(0..live.len());
                    let id = live.swap_remove(i);
                    store.remove_node(id);
                    assert!(store.connections_of(id).is_empty());
                    removed.push(id);
                }
                8 if !removed.is_empty() => {
                    // Stale removal must be a no-op
                    let ghost = removed[rng.random_range(0..removed.len())];
                    let notes = store.note_count();
                    let edges = store.edge_count();
                    assert!(store.remove_node(ghost).is_none());
                    assert_eq!(store.note_count(), notes);
                    assert_eq!(store.edge_count(), edges);
                }
                _ => {
                    let edges: Vec<EdgeId> = store.connections().map(|c| c.id).collect();
                    if let Some(&e) = edges.first() {
                        store.toggle_edge_selection(e);
                    }
                }
            }
            assert_no_dangling(&store);
        }
    }
}

// ─── Scenario ───────────────────────────────────────────────────────────

#[test]
fn removing_source_drops_edge_and_keeps_target() {
    init_logger();
    let mut store = GraphStore::new();
    let n1 = store.add_node(Point::new(1.0, 1.0), "");
    let n2 = store.add_node(Point::new(241.0, 1.0), "");
    store.update_node(n1, &NotePatch::content("first"));
    store.update_node(n2, &NotePatch::content("second"));
    store.update_node(n1, &NotePatch::editing(false));
    store.update_node(n2, &NotePatch::editing(false));

    let edge = store
        .add_edge(n1, Handle::Right, n2, Handle::Left)
        .expect("distinct committed notes connect");

    store.remove_node(n1);

    assert!(store.connection(edge).is_none());
    assert_eq!(store.edge_count(), 0);
    let survivor = store.note(n2).expect("target survives");
    assert_eq!(survivor.content, "second");
    assert_eq!(survivor.position, Point::new(241.0, 1.0));
}

#[test]
fn mutation_batch_matches_direct_calls() {
    init_logger();
    let mut store = GraphStore::new();
    let a = NoteId::fresh();
    let b = NoteId::fresh();
    let e = EdgeId::fresh();

    let changed = store.apply_all([
        GraphMutation::AddNote {
            id: a,
            position: Point::new(1.0, 1.0),
            content: "a".to_string(),
        },
        GraphMutation::AddNote {
            id: b,
            position: Point::new(49.0, 1.0),
            content: "b".to_string(),
        },
        GraphMutation::UpdateNote {
            id: a,
            patch: NotePatch::editing(false),
        },
        GraphMutation::UpdateNote {
            id: b,
            patch: NotePatch::editing(false),
        },
        GraphMutation::AddEdge {
            id: e,
            from: ConnectionAnchor::new(a, Handle::Bottom),
            to: ConnectionAnchor::new(b, Handle::Top),
        },
        GraphMutation::ToggleEdgeSelection { id: e },
    ]);

    assert!(changed);
    let edge = store.connection(e).unwrap();
    assert!(edge.selected);
    assert_eq!(edge.source_handle, Handle::Bottom);
    assert_eq!(edge.target_handle, Handle::Top);
}
