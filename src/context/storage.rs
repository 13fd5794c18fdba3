//! Per-context slot storage.
//!
//! Each execution context owns one `TypeId`-keyed map of slot values. Inside a
//! scope (see [`scope`](super::scope)) the map lives in a tokio task-local;
//! outside any scope the calling OS thread's own map is used, so synchronous
//! and plain-thread code gets per-thread isolation without ceremony.
//!
//! Maps belonging to different contexts are disjoint storage locations, never
//! a shared cell behind a lock: isolation holds by construction and no
//! synchronization is involved in reads or writes.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Type-erased slot value as stored in a context's map.
pub(crate) type SlotValue = Arc<dyn Any + Send + Sync>;

/// One context's view of all slots.
pub(crate) type SlotMap = HashMap<TypeId, SlotValue>;

tokio::task_local! {
    /// Slot map of the innermost active scope, if any.
    static SCOPED: RefCell<SlotMap>;
}

thread_local! {
    /// Fallback map for code running outside any scope.
    static THREAD_ROOT: RefCell<SlotMap> = RefCell::new(SlotMap::new());
}

/// Run `f` against the calling context's slot map.
///
/// `f` must not suspend; every caller in this crate passes a short synchronous
/// closure, so the `RefCell` borrow never spans an await point.
pub(crate) fn with_map<R>(f: impl FnOnce(&mut SlotMap) -> R) -> R {
    // Probe first: `try_with` consumes the closure even on the failure path.
    if SCOPED.try_with(|_| ()).is_ok() {
        SCOPED.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_ROOT.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Clone the calling context's slot map.
///
/// Cheap: values are `Arc`s, so this is one pointer clone per occupied slot.
pub(crate) fn clone_map() -> SlotMap {
    with_map(|map| map.clone())
}

/// Run `fut` with `map` as its own, independent slot map.
///
/// Nests: a scope entered inside another shadows it for the duration and the
/// outer map is untouched when the inner future completes.
pub(crate) async fn scoped<F: Future>(map: SlotMap, fut: F) -> F::Output {
    SCOPED.scope(RefCell::new(map), fut).await
}
