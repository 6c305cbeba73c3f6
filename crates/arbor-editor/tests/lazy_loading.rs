//! Integration tests: lazy child fetching through the tree view (arbor-editor).
//!
//! Sources are injected, so every test runs on tokio's paused clock with no
//! real waiting.

#![cfg(feature = "runtime")]

use arbor_core::{NodeId, TreeNode, sample_forest};
use arbor_editor::lazy::{Deadline, MockChildSource};
use arbor_editor::{ChildSource, FetchError, ToggleOutcome, TreeView};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Always answers with the same children (re-minted ids each call).
struct FixedSource(Vec<&'static str>);

impl ChildSource for FixedSource {
    async fn fetch_children(&self, _id: NodeId) -> Result<Vec<TreeNode>, FetchError> {
        Ok(self
            .0
            .iter()
            .map(|name| TreeNode::new(NodeId::generate(), *name))
            .collect())
    }
}

struct OfflineSource;

impl ChildSource for OfflineSource {
    async fn fetch_children(&self, id: NodeId) -> Result<Vec<TreeNode>, FetchError> {
        Err(FetchError::Failed {
            id,
            reason: "network unreachable".into(),
        })
    }
}

// ─── Toggle-driven loading ──────────────────────────────────────────────

#[tokio::test]
async fn toggle_fetches_and_expands_lazy_node() {
    init_logs();
    let mut view = TreeView::new(sample_forest());
    let source = FixedSource(vec!["Holiday", "Family"]);

    let outcome = view.toggle_with(id("root-4"), &source).await;
    assert_eq!(outcome, ToggleOutcome::Expanded);

    let media = view.forest().find(id("root-4")).unwrap();
    assert!(media.is_expanded);
    assert!(!media.is_loading);
    assert!(!media.has_lazy_children);
    let names: Vec<&str> = media
        .children
        .iter()
        .flatten()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, ["Holiday", "Family"]);
    assert_eq!(view.forest().validate(), Ok(()));
}

#[tokio::test]
async fn second_toggle_collapses_without_refetch() {
    let mut view = TreeView::new(sample_forest());
    let source = FixedSource(vec!["Only"]);

    view.toggle_with(id("proj-2"), &source).await;
    let outcome = view.toggle_with(id("proj-2"), &OfflineSource).await;

    assert_eq!(outcome, ToggleOutcome::Collapsed);
    let node = view.forest().find(id("proj-2")).unwrap();
    assert_eq!(node.children.as_ref().map(|c| c.len()), Some(1));
}

#[tokio::test]
async fn failed_fetch_leaves_node_retryable() {
    init_logs();
    let mut view = TreeView::new(sample_forest());

    let outcome = view.toggle_with(id("proj-2"), &OfflineSource).await;
    assert_eq!(outcome, ToggleOutcome::Collapsed);
    let node = view.forest().find(id("proj-2")).unwrap();
    assert!(!node.is_loading);
    assert!(node.has_lazy_children);
    assert!(node.children.is_none());

    assert!(view.load_children(id("proj-2"), &FixedSource(vec!["Retry"])).await);
    assert!(view.forest().find(id("proj-2")).unwrap().has_children());
}

#[tokio::test]
async fn load_children_skips_non_lazy_nodes() {
    let mut view = TreeView::new(sample_forest());
    let before = view.snapshot();
    assert!(!view.load_children(id("doc-3"), &FixedSource(vec!["x"])).await);
    assert!(!view.load_children(id("ghost"), &FixedSource(vec!["x"])).await);
    assert_eq!(view.forest(), &before);
}

// ─── Interleaving with other edits ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn result_arriving_after_removal_is_dropped() {
    let mut view = TreeView::new(sample_forest());
    let source = MockChildSource::default();

    assert!(view.begin_load(id("proj-1-1")));
    let pending = source.fetch_children(id("proj-1-1"));

    // User deletes the parent folder while the fetch is in flight.
    assert!(view.remove(id("proj-1")));
    let snapshot = view.snapshot();

    let result = pending.await;
    assert!(result.is_ok());
    assert!(!view.complete_load(id("proj-1-1"), result));
    assert_eq!(view.forest(), &snapshot);
}

/// Replays the same ids on every fetch, like a misbehaving backend.
struct EchoSource;

impl ChildSource for EchoSource {
    async fn fetch_children(&self, _id: NodeId) -> Result<Vec<TreeNode>, FetchError> {
        Ok(vec![TreeNode::new("echo-kid", "Echo")])
    }
}

#[tokio::test]
async fn duplicate_completion_keeps_ids_unique() {
    init_logs();
    let mut view = TreeView::new(sample_forest());

    assert_eq!(view.toggle(id("root-4")), ToggleOutcome::FetchRequired);
    let first = EchoSource.fetch_children(id("root-4")).await;
    let second = EchoSource.fetch_children(id("root-4")).await;

    assert!(view.complete_load(id("root-4"), first));
    let loaded = view.snapshot();
    assert!(!view.complete_load(id("root-4"), second));

    assert_eq!(view.forest(), &loaded);
    assert_eq!(view.forest().validate(), Ok(()));
}

#[tokio::test]
async fn fetch_returning_existing_ids_is_refused() {
    let mut view = TreeView::new(sample_forest());
    let before = view.snapshot();

    assert!(view.load_children(id("doc-2-2"), &EchoSource).await);
    assert!(!view.load_children(id("proj-2"), &EchoSource).await);

    let mobile = view.forest().find(id("proj-2")).unwrap();
    assert!(mobile.has_lazy_children);
    assert!(!mobile.is_loading);
    assert_eq!(view.forest().node_count(), before.node_count() + 1);
    assert_eq!(view.forest().validate(), Ok(()));
}

#[tokio::test(start_paused = true)]
async fn mock_source_children_are_fresh_and_sometimes_lazy() {
    let mut view = TreeView::new(sample_forest());
    let source = MockChildSource {
        latency: Duration::from_millis(800),
        max_children: 3,
    };

    assert!(view.load_children(id("root-4"), &source).await);
    let media = view.forest().find(id("root-4")).unwrap();
    let count = media.children.as_ref().map_or(0, |c| c.len());
    assert!((1..=3).contains(&count));
    assert_eq!(view.forest().validate(), Ok(()));
}

#[tokio::test(start_paused = true)]
async fn deadline_failure_unsticks_loading_flag() {
    let mut view = TreeView::new(sample_forest());
    let slow = MockChildSource {
        latency: Duration::from_secs(60),
        ..Default::default()
    };
    let source = Deadline::new(slow, Duration::from_secs(5));

    assert!(!view.load_children(id("doc-2-2"), &source).await);
    let photos = view.forest().find(id("doc-2-2")).unwrap();
    assert!(!photos.is_loading);
    assert!(photos.has_lazy_children);
}
