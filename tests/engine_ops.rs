//! # Engine Operation Tests
//!
//! End-to-end sequences against the in-memory store. Every mutation is
//! followed by a full integrity check, so a shift pass that silently corrupts
//! unrelated rows fails here even when the op's own result looks right.

use test_case::test_case;

use nestdb::{
    assemble, verify, MemoryStore, MoveDirection, NodeId, NodeStore, TreeEngine, TreeError,
    TreeView,
};

fn engine() -> TreeEngine<MemoryStore> {
    TreeEngine::new(MemoryStore::new())
}

/// Snapshot of the forest as (id, left, right, parent), ordered by left.
fn layout(engine: &TreeEngine<MemoryStore>) -> Vec<(u64, i64, i64, Option<u64>)> {
    let rows = engine.store().all_ordered_by_left().unwrap();
    verify(&rows).unwrap();
    rows.iter()
        .map(|n| (n.id.get(), n.left, n.right, n.parent.map(|p| p.get())))
        .collect()
}

#[test]
fn test_insert_root_into_empty_tree() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    assert_eq!((root.left, root.right), (1, 2));
    assert_eq!(root.parent, None);
}

#[test]
fn test_insert_roots_are_sequential() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let r2 = engine.insert(None).unwrap();
    let r3 = engine.insert(None).unwrap();
    assert_eq!(
        layout(&engine),
        vec![
            (r1.id.get(), 1, 2, None),
            (r2.id.get(), 3, 4, None),
            (r3.id.get(), 5, 6, None),
        ]
    );
}

#[test]
fn test_insert_widens_parent_by_exactly_two() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let c1 = engine.insert(Some(root.id)).unwrap();
    assert_eq!((c1.left, c1.right), (2, 3));

    let c2 = engine.insert(Some(root.id)).unwrap();
    assert_eq!((c2.left, c2.right), (4, 5));

    assert_eq!(
        layout(&engine),
        vec![
            (root.id.get(), 1, 6, None),
            (c1.id.get(), 2, 3, Some(root.id.get())),
            (c2.id.get(), 4, 5, Some(root.id.get())),
        ]
    );
}

#[test]
fn test_insert_shifts_only_rows_past_the_gap() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let a = engine.insert(Some(r1.id)).unwrap();
    let r2 = engine.insert(None).unwrap();

    // inserting under `a` must widen r1 on the right only and push r2 whole
    let new = engine.insert(Some(a.id)).unwrap();
    assert_eq!(
        layout(&engine),
        vec![
            (r1.id.get(), 1, 6, None),
            (a.id.get(), 2, 5, Some(r1.id.get())),
            (new.id.get(), 3, 4, Some(a.id.get())),
            (r2.id.get(), 7, 8, None),
        ]
    );
}

#[test]
fn test_insert_under_missing_parent() {
    let engine = engine();
    let err = engine.insert(Some(NodeId::new(42))).unwrap_err();
    assert!(matches!(err, TreeError::NotFound(_)));
    assert!(engine.store().is_empty());
}

#[test]
fn test_delete_leaf_closes_gap() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let c1 = engine.insert(Some(root.id)).unwrap();
    let c2 = engine.insert(Some(root.id)).unwrap();

    assert_eq!(engine.delete(c1.id).unwrap(), 1);
    assert_eq!(
        layout(&engine),
        vec![
            (root.id.get(), 1, 4, None),
            (c2.id.get(), 2, 3, Some(root.id.get())),
        ]
    );
}

#[test]
fn test_delete_removes_whole_subtree() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let a = engine.insert(Some(root.id)).unwrap();
    let _a1 = engine.insert(Some(a.id)).unwrap();
    let b = engine.insert(Some(root.id)).unwrap();

    assert_eq!(engine.delete(a.id).unwrap(), 2);
    assert_eq!(
        layout(&engine),
        vec![
            (root.id.get(), 1, 4, None),
            (b.id.get(), 2, 3, Some(root.id.get())),
        ]
    );
}

#[test]
fn test_delete_missing_node() {
    let engine = engine();
    let err = engine.delete(NodeId::new(9)).unwrap_err();
    assert!(matches!(err, TreeError::NotFound(_)));
}

fn two_children_second_with_grandchild(
    engine: &TreeEngine<MemoryStore>,
) -> (nestdb::Node, nestdb::Node, nestdb::Node, nestdb::Node) {
    let root = engine.insert(None).unwrap();
    let c1 = engine.insert(Some(root.id)).unwrap();
    let c2 = engine.insert(Some(root.id)).unwrap();
    let g = engine.insert(Some(c2.id)).unwrap();
    (root, c1, c2, g)
}

#[test]
fn test_move_up_swaps_with_preceding_sibling() {
    let engine = engine();
    let (root, c1, c2, g) = two_children_second_with_grandchild(&engine);

    let moved = engine.move_node(c2.id, MoveDirection::Up).unwrap();
    assert_eq!((moved.left, moved.right), (2, 5));
    assert_eq!(
        layout(&engine),
        vec![
            (root.id.get(), 1, 8, None),
            (c2.id.get(), 2, 5, Some(root.id.get())),
            (g.id.get(), 3, 4, Some(c2.id.get())),
            (c1.id.get(), 6, 7, Some(root.id.get())),
        ]
    );
}

#[test]
fn test_move_up_then_down_round_trips() {
    let engine = engine();
    let (_root, _c1, c2, _g) = two_children_second_with_grandchild(&engine);
    let before = layout(&engine);

    engine.move_node(c2.id, MoveDirection::Up).unwrap();
    engine.move_node(c2.id, MoveDirection::Down).unwrap();
    assert_eq!(layout(&engine), before);
}

#[test_case(MoveDirection::Up; "up")]
#[test_case(MoveDirection::Down; "down")]
fn test_move_without_adjacent_sibling_is_noop(direction: MoveDirection) {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let only = engine.insert(Some(root.id)).unwrap();
    let before = layout(&engine);

    let unchanged = engine.move_node(only.id, direction).unwrap();
    assert_eq!(unchanged, only);
    assert_eq!(layout(&engine), before);
}

#[test]
fn test_move_first_root_up_is_noop() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let _r2 = engine.insert(None).unwrap();
    let before = layout(&engine);

    engine.move_node(r1.id, MoveDirection::Up).unwrap();
    assert_eq!(layout(&engine), before);
}

#[test]
fn test_roots_are_siblings_for_moves() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let r2 = engine.insert(None).unwrap();

    engine.move_node(r2.id, MoveDirection::Up).unwrap();
    assert_eq!(
        layout(&engine),
        vec![(r2.id.get(), 1, 2, None), (r1.id.get(), 3, 4, None)]
    );
}

#[test]
fn test_reparent_leaf_under_new_parent() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let r2 = engine.insert(None).unwrap();

    let moved = engine.reparent(r2.id, Some(r1.id)).unwrap();
    assert_eq!(moved.parent, Some(r1.id));
    assert_eq!(
        layout(&engine),
        vec![
            (r1.id.get(), 1, 4, None),
            (r2.id.get(), 2, 3, Some(r1.id.get())),
        ]
    );
}

#[test]
fn test_reparent_rehomes_entire_subtree() {
    let engine = engine();
    let r1 = engine.insert(None).unwrap();
    let a = engine.insert(Some(r1.id)).unwrap();
    let b = engine.insert(Some(r1.id)).unwrap();
    let r2 = engine.insert(None).unwrap();
    let c = engine.insert(Some(r2.id)).unwrap();

    // move r1 (with both children) under r2
    let moved = engine.reparent(r1.id, Some(r2.id)).unwrap();
    assert_eq!(moved.parent, Some(r2.id));
    assert_eq!(
        layout(&engine),
        vec![
            (r2.id.get(), 1, 10, None),
            (c.id.get(), 2, 3, Some(r2.id.get())),
            (r1.id.get(), 4, 9, Some(r2.id.get())),
            (a.id.get(), 5, 6, Some(r1.id.get())),
            (b.id.get(), 7, 8, Some(r1.id.get())),
        ]
    );
}

#[test]
fn test_reparent_to_root_level() {
    let engine = engine();
    let (root, c1, c2, g) = two_children_second_with_grandchild(&engine);

    let moved = engine.reparent(c2.id, None).unwrap();
    assert_eq!(moved.parent, None);
    assert_eq!(
        layout(&engine),
        vec![
            (root.id.get(), 1, 4, None),
            (c1.id.get(), 2, 3, Some(root.id.get())),
            (c2.id.get(), 5, 8, None),
            (g.id.get(), 6, 7, Some(c2.id.get())),
        ]
    );
}

#[test]
fn test_reparent_under_own_descendant_is_rejected() {
    let engine = engine();
    let (root, _c1, _c2, g) = two_children_second_with_grandchild(&engine);
    let before = layout(&engine);

    let err = engine.reparent(root.id, Some(g.id)).unwrap_err();
    assert!(matches!(err, TreeError::CycleRejected { .. }));
    assert_eq!(layout(&engine), before, "rejected reparent must not mutate");
}

#[test]
fn test_reparent_under_itself_is_rejected() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let err = engine.reparent(root.id, Some(root.id)).unwrap_err();
    assert!(matches!(err, TreeError::CycleRejected { .. }));
}

#[test]
fn test_reparent_to_current_parent_is_noop() {
    let engine = engine();
    let (root, c1, _c2, _g) = two_children_second_with_grandchild(&engine);
    let before = layout(&engine);

    let unchanged = engine.reparent(c1.id, Some(root.id)).unwrap();
    assert_eq!(unchanged, c1);
    assert_eq!(layout(&engine), before);
}

#[test]
fn test_rebuild_preserves_a_valid_dense_forest() {
    let engine = engine();
    let (_root, _c1, _c2, _g) = two_children_second_with_grandchild(&engine);
    let before = layout(&engine);

    assert_eq!(engine.rebuild().unwrap(), 4);
    assert_eq!(layout(&engine), before);
}

#[test]
fn test_rebuild_is_idempotent() {
    let engine = engine();
    seed_scrambled(&engine);

    engine.rebuild().unwrap();
    let first = layout(&engine);
    engine.rebuild().unwrap();
    assert_eq!(layout(&engine), first);
}

#[test]
fn test_rebuild_repairs_scrambled_intervals() {
    let engine = engine();
    seed_scrambled(&engine);

    engine.rebuild().unwrap();
    // sibling order follows the prior left values: 3 came before 2
    assert_eq!(
        layout(&engine),
        vec![(1, 1, 6, None), (3, 2, 3, Some(1)), (2, 4, 5, Some(1))]
    );
}

/// One root (id 1) with children 2 and 3, intervals drifted far from any
/// valid encoding. Written straight through the store, bypassing the engine.
fn seed_scrambled(engine: &TreeEngine<MemoryStore>) {
    let rows = vec![
        nestdb::Node::new(NodeId::new(1), 100, 200, None),
        nestdb::Node::new(NodeId::new(2), 150, 160, Some(NodeId::new(1))),
        nestdb::Node::new(NodeId::new(3), 10, 20, Some(NodeId::new(1))),
    ];
    engine.store().save_all(&rows).unwrap();
}

#[test]
fn test_rebuild_adopts_rows_with_dangling_parents() {
    let engine = engine();
    let rows = vec![nestdb::Node::new(
        NodeId::new(1),
        7,
        9,
        Some(NodeId::new(99)),
    )];
    engine.store().save_all(&rows).unwrap();

    engine.rebuild().unwrap();
    assert_eq!(layout(&engine), vec![(1, 1, 2, None)]);
}

#[test]
fn test_assemble_reflects_engine_state() {
    let engine = engine();
    let (root, c1, c2, g) = two_children_second_with_grandchild(&engine);

    let rows = engine.store().all_ordered_by_left().unwrap();
    let forest: Vec<TreeView> = assemble(&rows, |n| TreeView::from(n));

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, root.id);
    let child_ids: Vec<NodeId> = forest[0].children.iter().map(|c| c.id).collect();
    assert_eq!(child_ids, vec![c1.id, c2.id]);
    assert_eq!(forest[0].children[1].children[0].id, g.id);
}

#[test]
fn test_descendant_count_tracks_structure() {
    let engine = engine();
    let (root, _c1, c2, _g) = two_children_second_with_grandchild(&engine);

    let fresh = engine.store().get(root.id).unwrap().unwrap();
    assert_eq!(fresh.descendant_count(), 3);

    engine.delete(c2.id).unwrap();
    let fresh = engine.store().get(root.id).unwrap().unwrap();
    assert_eq!(fresh.descendant_count(), 1);
}

#[test]
fn test_ancestors_and_descendants_queries() {
    let engine = engine();
    let (root, _c1, c2, g) = two_children_second_with_grandchild(&engine);

    let up: Vec<NodeId> = engine
        .ancestors_of(g.id)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(up, vec![root.id, c2.id]);

    let down: Vec<NodeId> = engine
        .descendants_of(c2.id)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(down, vec![g.id]);
}

#[test]
fn test_long_mixed_sequence_stays_valid() {
    let engine = engine();
    let root = engine.insert(None).unwrap();
    let mut ids = vec![root.id];
    for i in 0..20 {
        let parent = ids[i * 7 % ids.len()];
        let node = engine.insert(Some(parent)).unwrap();
        ids.push(node.id);
        layout(&engine);
    }
    let picks: Vec<usize> = (0..ids.len()).step_by(3).collect();
    for &i in picks.iter().rev().take(4) {
        // some of these may already be gone with their subtree
        match engine.delete(ids[i]) {
            Ok(_) | Err(TreeError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
        layout(&engine);
    }
    engine.rebuild().unwrap();
    layout(&engine);
}
