//! Execution-context scopes and snapshot inheritance.
//!
//! Slot values are multiplexed per execution context, and this module provides
//! the explicit context boundaries:
//!
//! - [`scope`] - run a future as a child context inheriting the caller's values
//! - [`isolated`] - run a future with a fresh, empty context
//! - [`spawn`] - `tokio::spawn` with snapshot inheritance at the call site
//! - [`ContextSnapshot`] - capture a context now, enter it later
//!
//! A child context starts from a value-snapshot of its parent taken when the
//! scope is created, not a live alias: afterwards the two diverge freely and
//! neither observes the other's writes. Outside any scope, the calling OS
//! thread itself acts as the context.
//!
//! # Example
//!
//! ```
//! use taskscope::{scope, ContextInstance};
//!
//! #[derive(Debug)]
//! struct Session {
//!     id: u32,
//! }
//!
//! impl ContextInstance for Session {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! scope::isolated(async {
//!     Session::set_current(Session { id: 1 });
//!
//!     // The child task starts from a snapshot taken at this spawn call.
//!     let child = scope::spawn(async { Session::current().unwrap().id });
//!     assert_eq!(child.await.unwrap(), 1);
//! })
//! .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;

use tokio::task::JoinHandle;

use super::storage::{self, SlotMap};

/// Value-snapshot of one context's slot values.
///
/// Capturing is cheap: slot values are `Arc`s, so a snapshot is one pointer
/// clone per occupied slot. Entering the snapshot with [`scope`](Self::scope)
/// seeds a new child context; the snapshot itself never changes afterwards
/// and can be entered any number of times.
#[derive(Clone)]
pub struct ContextSnapshot {
    slots: SlotMap,
}

impl ContextSnapshot {
    /// Capture the calling context's current slot values.
    pub fn capture() -> Self {
        Self {
            slots: storage::clone_map(),
        }
    }

    /// A snapshot with every slot empty.
    pub fn empty() -> Self {
        Self {
            slots: SlotMap::new(),
        }
    }

    /// Number of slots holding a value.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot holds a value.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Run `fut` as a child context seeded with this snapshot.
    ///
    /// Mutations made inside the future stay inside it; when it completes,
    /// the caller's own context is exactly as it was.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        storage::scoped(self.slots, fut).await
    }
}

impl fmt::Debug for ContextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSnapshot")
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Run `fut` as a child context inheriting a snapshot of the caller's values.
pub async fn scope<F: Future>(fut: F) -> F::Output {
    ContextSnapshot::capture().scope(fut).await
}

/// Run `fut` with a fresh, empty context.
pub async fn isolated<F: Future>(fut: F) -> F::Output {
    ContextSnapshot::empty().scope(fut).await
}

/// Spawn `fut` on the tokio runtime as a child context of the caller.
///
/// The snapshot is taken here, at the spawn call, not when the task first
/// polls: values the spawning context sets afterwards are invisible to the
/// child, and the child's own writes never reach the parent.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, as `tokio::spawn` does.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let snapshot = ContextSnapshot::capture();
    tracing::trace!(slots = snapshot.len(), "spawning context-inheriting task");
    tokio::spawn(snapshot.scope(fut))
}
