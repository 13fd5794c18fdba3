//! Type-erased instances and the mixin-style trait surface.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use super::slot::{ContextSlot, RestoreToken};
use crate::error::Result;

/// A type-erased instance carrying its concrete type name.
///
/// `dyn Any` cannot name its concrete type after erasure, so the name is
/// recorded here at construction time. This is what lets
/// [`ContextSlot::set_erased`] report expected vs. actual types when a value
/// does not conform to the slot it is written into.
pub struct AnyInstance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AnyInstance {
    /// Erase an owned value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Erase an already-shared value without cloning it.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    /// Concrete type name of the wrapped value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `T`.
    #[inline]
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub(crate) fn into_value(self) -> Arc<dyn Any + Send + Sync> {
        self.value
    }
}

impl fmt::Debug for AnyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyInstance")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Mixin-style surface for types that opt into context-instance tracking.
///
/// An empty `impl` is the registration: it happens at type-definition time,
/// once per type, and gives the type `get_current`/`current`/`set_current`/
/// `reset_current` as associated functions. All methods have defaults; there
/// is nothing to implement.
///
/// # Example
///
/// ```
/// use taskscope::ContextInstance;
///
/// struct Bot {
///     token: String,
/// }
///
/// impl ContextInstance for Bot {}
///
/// let restore = Bot::set_current(Bot {
///     token: "42:abc".into(),
/// });
/// assert_eq!(Bot::current().unwrap().token, "42:abc");
/// Bot::reset_current(restore);
/// assert!(Bot::get_current().is_none());
/// ```
pub trait ContextInstance: Send + Sync + Sized + 'static {
    /// Handle to this type's slot.
    fn slot() -> ContextSlot<Self> {
        ContextSlot::new()
    }

    /// Current instance in the calling context, if any.
    fn get_current() -> Option<Arc<Self>> {
        Self::slot().get()
    }

    /// Current instance in the calling context.
    ///
    /// # Errors
    ///
    /// [`ContextError::Unset`](crate::ContextError::Unset) when no instance
    /// is set.
    fn current() -> Result<Arc<Self>> {
        Self::slot().current()
    }

    /// Make `value` the current instance; the returned token undoes the write.
    fn set_current<V: Into<Arc<Self>>>(value: V) -> RestoreToken<Self> {
        Self::slot().set(value)
    }

    /// Restore the state captured by `token`.
    fn reset_current(token: RestoreToken<Self>) {
        Self::slot().reset(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: u64,
    }

    impl ContextInstance for Counter {}

    #[test]
    fn test_any_instance_reports_type() {
        let erased = AnyInstance::new(Counter { hits: 0 });
        assert!(erased.is::<Counter>());
        assert!(!erased.is::<String>());
        assert!(erased.type_name().contains("Counter"));
    }

    #[test]
    fn test_from_arc_shares_instance() {
        let shared = Arc::new(Counter { hits: 7 });
        let erased = AnyInstance::from_arc(shared.clone());
        let token = Counter::slot().set_erased(erased).unwrap();
        assert!(Arc::ptr_eq(&Counter::current().unwrap(), &shared));
        Counter::reset_current(token);
    }

    #[test]
    fn test_trait_surface_round_trip() {
        assert!(Counter::get_current().is_none());
        let token = Counter::set_current(Counter { hits: 3 });
        assert_eq!(Counter::current().unwrap().hits, 3);
        Counter::reset_current(token);
        assert!(Counter::get_current().is_none());
    }
}
