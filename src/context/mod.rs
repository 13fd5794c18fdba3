//! Context module - context-scoped current-instance tracking.
//!
//! Provides:
//! - [`ContextSlot`] - typed handle to the per-context slot for one type
//! - [`ContextInstance`] - mixin-style trait surface (`Bot::current()`, ...)
//! - [`RestoreToken`] - undo handle for nested overrides
//! - [`AnyInstance`] - type-erased value for runtime-checked writes
//! - [`scope`] - context boundaries, snapshot inheritance, spawning
//!
//! # Example
//!
//! ```
//! use taskscope::{scope, ContextInstance};
//!
//! struct Bot {
//!     name: &'static str,
//! }
//!
//! impl ContextInstance for Bot {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // One scope per inbound unit of work; each sees only its own bot.
//! scope::scope(async {
//!     Bot::set_current(Bot { name: "marvin" });
//!     assert_eq!(Bot::current().unwrap().name, "marvin");
//! })
//! .await;
//! # }
//! ```

mod instance;
mod slot;
mod storage;

pub mod scope;

pub use instance::{AnyInstance, ContextInstance};
pub use slot::{ContextSlot, RestoreToken};

use std::sync::Arc;

use crate::error::Result;

/// Non-strict read of the current instance of `T` in the calling context.
///
/// Free-function twin of [`ContextInstance::get_current`] for types that do
/// not implement the trait.
pub fn get_current<T: Send + Sync + 'static>() -> Option<Arc<T>> {
    ContextSlot::<T>::new().get()
}

/// Strict read of the current instance of `T` in the calling context.
///
/// # Errors
///
/// [`ContextError::Unset`](crate::ContextError::Unset) when no instance is
/// set.
pub fn current<T: Send + Sync + 'static>() -> Result<Arc<T>> {
    ContextSlot::<T>::new().current()
}

/// Make `value` the current instance of `T` for the calling context.
pub fn set_current<T: Send + Sync + 'static>(value: impl Into<Arc<T>>) -> RestoreToken<T> {
    ContextSlot::<T>::new().set(value)
}

/// Restore the state captured by `token`.
pub fn reset_current<T: Send + Sync + 'static>(token: RestoreToken<T>) {
    ContextSlot::<T>::new().reset(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_functions_share_the_type_slot() {
        struct Plain {
            n: u8,
        }

        assert!(get_current::<Plain>().is_none());
        let token = set_current(Plain { n: 9 });
        assert_eq!(current::<Plain>().unwrap().n, 9);

        // Same slot as any handle for the type.
        assert_eq!(ContextSlot::<Plain>::new().current().unwrap().n, 9);

        reset_current(token);
        assert!(get_current::<Plain>().is_none());
    }
}
