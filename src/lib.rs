//! # taskscope
//!
//! Context-scoped "current instance" tracking and ad hoc data attachment for
//! async Rust.
//!
//! Concurrently running units of work (one tokio task per inbound event, say)
//! often want "the current `Bot`" available deep in a call chain, without a
//! global mutable singleton and without threading the value through every
//! signature. This crate gives each execution context its own view of a
//! per-type slot:
//!
//! - **Isolation**: sibling contexts never observe each other's writes
//! - **Snapshot inheritance**: a child context starts from a value-snapshot
//!   of its parent taken at spawn time, then diverges freely
//! - **Nested override**: `set_current` returns a [`RestoreToken`] that
//!   undoes exactly that write, independent of later sets
//!
//! [`AttachedData`] is the second, independent piece: a lazily-allocated
//! key/value store an object embeds to carry ad hoc named state.
//!
//! ## Example
//!
//! ```
//! use taskscope::{scope, ContextInstance};
//!
//! #[derive(Debug)]
//! struct Bot {
//!     id: u64,
//! }
//!
//! impl ContextInstance for Bot {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     scope::isolated(async {
//!         Bot::set_current(Bot { id: 1 });
//!
//!         // The spawned task inherits a snapshot of the caller's context.
//!         let child = scope::spawn(async { Bot::current().unwrap().id });
//!         assert_eq!(child.await.unwrap(), 1);
//!     })
//!     .await;
//! }
//! ```

pub mod context;
pub mod error;

mod attached;

pub use attached::AttachedData;
pub use context::scope;
pub use context::{current, get_current, reset_current, set_current};
pub use context::{AnyInstance, ContextInstance, ContextSlot, RestoreToken};
pub use error::{ContextError, Result};
