//! Lazily fetched children.
//!
//! The tree never performs I/O itself. A `ChildSource` is injected by the
//! owner of the view; `TreeView::load_children` marks the node as loading,
//! awaits the source, then folds the result back in by id.

use arbor_core::{NodeId, TreeNode};
use std::future::Future;

/// A failed child fetch. The node stays lazy, so the fetch can be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetching children of {id} failed: {reason}")]
    Failed { id: NodeId, reason: String },

    #[error("fetching children of {id} timed out")]
    TimedOut { id: NodeId },
}

/// Supplies the children of a lazy node.
///
/// Returned nodes must carry fresh ids (`NodeId::generate`); each may itself
/// be lazy.
pub trait ChildSource {
    fn fetch_children(
        &self,
        id: NodeId,
    ) -> impl Future<Output = Result<Vec<TreeNode>, FetchError>>;
}

#[cfg(feature = "runtime")]
pub use runtime::{Deadline, MockChildSource};

#[cfg(feature = "runtime")]
mod runtime {
    use super::{ChildSource, FetchError};
    use arbor_core::{NodeId, TreeNode};
    use rand::Rng;
    use std::time::Duration;

    /// Demo source: answers after a fixed latency with a random handful of
    /// `Lazy Child N` nodes, about half of which are lazy again.
    #[derive(Debug, Clone)]
    pub struct MockChildSource {
        /// Simulated round trip. Default: **800 ms**.
        pub latency: Duration,
        /// Upper bound on children per fetch (at least one is returned).
        /// Default: **3**.
        pub max_children: usize,
    }

    impl Default for MockChildSource {
        fn default() -> Self {
            Self {
                latency: Duration::from_millis(800),
                max_children: 3,
            }
        }
    }

    impl MockChildSource {
        pub fn generate(&self) -> Vec<TreeNode> {
            let mut rng = rand::rng();
            let count = rng.random_range(1..=self.max_children.max(1));
            (1..=count)
                .map(|i| {
                    let node = TreeNode::new(NodeId::generate(), format!("Lazy Child {i}"));
                    if rng.random_bool(0.5) { node.lazy() } else { node }
                })
                .collect()
        }
    }

    impl ChildSource for MockChildSource {
        async fn fetch_children(&self, id: NodeId) -> Result<Vec<TreeNode>, FetchError> {
            log::trace!("mock fetch for {id}, {:?} latency", self.latency);
            tokio::time::sleep(self.latency).await;
            Ok(self.generate())
        }
    }

    /// Bounds any source with a timeout.
    #[derive(Debug, Clone)]
    pub struct Deadline<S> {
        inner: S,
        timeout: Duration,
    }

    impl<S> Deadline<S> {
        pub fn new(inner: S, timeout: Duration) -> Self {
            Self { inner, timeout }
        }

        pub fn into_inner(self) -> S {
            self.inner
        }
    }

    impl<S: ChildSource> ChildSource for Deadline<S> {
        async fn fetch_children(&self, id: NodeId) -> Result<Vec<TreeNode>, FetchError> {
            match tokio::time::timeout(self.timeout, self.inner.fetch_children(id)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimedOut { id }),
            }
        }
    }

}
