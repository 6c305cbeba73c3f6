//! Integration tests: structural edits on whole forests (arbor-core).
//!
//! Covers the end-to-end editing scenarios and the algebraic properties the
//! engine promises (round-trip, conservation, sharing).

use arbor_core::{Forest, NodeId, NodePatch, Relation, TreeNode, sample_forest};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn add_child_appends_after_existing_children() {
    let forest = Forest::from_roots([TreeNode::new("a", "A").with_children([TreeNode::new("b", "B")])]);

    let after = forest.add_child(id("a"), TreeNode::new("c", "C"));

    let expected = Forest::from_roots([TreeNode::new("a", "A")
        .with_children([TreeNode::new("b", "B"), TreeNode::new("c", "C")])]);
    assert_eq!(after, expected);
    assert!(!after.find(id("a")).unwrap().has_lazy_children);
}

#[test]
fn move_before_swaps_two_roots() {
    let forest = Forest::from_roots([TreeNode::new("a", "A"), TreeNode::new("b", "B")]);

    let after = forest.move_node(id("b"), id("a"), Relation::Before);

    assert_eq!(
        after,
        Forest::from_roots([TreeNode::new("b", "B"), TreeNode::new("a", "A")])
    );
}

#[test]
fn move_inside_nests_under_target() {
    let forest = Forest::from_roots([TreeNode::new("a", "A"), TreeNode::new("b", "B")]);

    let after = forest.move_node(id("a"), id("b"), Relation::Inside);

    assert_eq!(
        after,
        Forest::from_roots([TreeNode::new("b", "B").with_children([TreeNode::new("a", "A")])])
    );
}

#[test]
fn lazy_load_sequence_materializes_children() {
    let forest = Forest::from_roots([TreeNode::new("x", "X").lazy()]);

    let loading = forest.update(id("x"), &NodePatch::loading(true));
    assert!(loading.find(id("x")).unwrap().is_loading);

    let loaded = loading.materialize_lazy_children(id("x"), [TreeNode::new("y", "Y")]);

    let mut expected = TreeNode::new("x", "X")
        .expanded()
        .with_children([TreeNode::new("y", "Y")]);
    expected.is_loading = false;
    expected.has_lazy_children = false;
    assert_eq!(loaded, Forest::from_roots([expected]));
}

// ─── Properties ─────────────────────────────────────────────────────────

#[test]
fn remove_undoes_add_child() {
    let forest = sample_forest();
    let added = forest.add_child(id("doc-1"), TreeNode::new("doc-1-new", "Draft.md"));
    assert_eq!(added.node_count(), forest.node_count() + 1);

    assert_eq!(added.remove(id("doc-1-new")), forest);
}

#[test]
fn every_valid_move_conserves_nodes() {
    init_logs();
    let forest = sample_forest();
    let ids: Vec<NodeId> = forest.iter().map(|(_, n)| n.id).collect();
    let total = forest.node_count();

    for &dragged in &ids {
        for &target in &ids {
            if dragged == target || forest.is_ancestor_of(dragged, target) {
                continue;
            }
            for relation in [Relation::Before, Relation::After, Relation::Inside] {
                let after = forest.move_node(dragged, target, relation);
                assert_eq!(after.node_count(), total, "{dragged} {relation} {target}");
                assert!(after.contains(dragged), "{dragged} lost moving {relation} {target}");
                assert_eq!(after.validate(), Ok(()));
            }
        }
    }
}

#[test]
fn moves_into_own_subtree_leave_forest_unchanged() {
    init_logs();
    let forest = sample_forest();
    for (dragged, target) in [("root-1", "doc-2-2"), ("doc-1", "doc-1-3"), ("root-2", "proj-1")] {
        for relation in [Relation::Before, Relation::After, Relation::Inside] {
            assert_eq!(forest.move_node(id(dragged), id(target), relation), forest);
        }
    }
}

#[test]
fn move_places_node_at_target_relation() {
    let forest = sample_forest();

    let after = forest.move_node(id("down-2"), id("doc-1-2"), Relation::Before);
    let work: Vec<String> = after
        .find(id("doc-1"))
        .unwrap()
        .children
        .iter()
        .flatten()
        .map(|c| c.id.to_string())
        .collect();
    assert_eq!(work, ["doc-1-1", "down-2", "doc-1-2", "doc-1-3"]);

    let after = forest.move_node(id("doc-3"), id("root-4"), Relation::After);
    assert_eq!(after.roots().last().unwrap().id, id("doc-3"));
}

#[test]
fn untouched_subtrees_are_shared_after_move() {
    let forest = sample_forest();
    let after = forest.move_node(id("doc-3"), id("doc-1"), Relation::Inside);

    for untouched in ["root-2", "root-3", "root-4", "doc-2", "doc-1-1"] {
        assert!(
            Arc::ptr_eq(
                forest.find_shared(id(untouched)).unwrap(),
                after.find_shared(id(untouched)).unwrap()
            ),
            "{untouched} was reallocated"
        );
    }
}

#[test]
fn json_snapshot_round_trips_the_sample() {
    let forest = sample_forest();
    let json = serde_json::to_string(&forest).unwrap();
    let parsed: Forest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, forest);
}

#[test]
fn lazy_results_never_duplicate_ids() {
    init_logs();
    let forest = sample_forest();

    // A fetch that echoes an id living elsewhere in the forest.
    let clash = forest.materialize_lazy_children(id("root-4"), [TreeNode::new("doc-1-1", "Copy")]);
    assert_eq!(clash, forest);

    // The same result delivered twice.
    let batch = || [TreeNode::new("media-1", "Clip.mp4"), TreeNode::new("media-2", "Song.mp3")];
    let once = forest.materialize_lazy_children(id("root-4"), batch());
    let twice = once.materialize_lazy_children(id("root-4"), batch());
    assert_eq!(twice, once);
    assert_eq!(twice.node_count(), forest.node_count() + 2);
    assert_eq!(twice.validate(), Ok(()));
}
