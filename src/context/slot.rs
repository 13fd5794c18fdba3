//! Typed context slots and restore tokens.
//!
//! A [`ContextSlot<T>`] is the per-type storage location for "the current
//! instance of `T`", multiplexed per execution context. Handles are zero-sized
//! and keyed by the type itself, so every handle for the same `T` denotes the
//! same slot and constructing one is free and idempotent.

use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::instance::AnyInstance;
use super::storage::{self, SlotValue};
use crate::error::{ContextError, Result};

/// Handle to the context-local slot for `T`.
///
/// Reads and writes go through the calling context's own view of the slot;
/// concurrent contexts never observe each other's mutations (see
/// [`scope`](super::scope) for how contexts are entered and inherited).
///
/// # Example
///
/// ```
/// use taskscope::ContextSlot;
///
/// struct Bot {
///     name: &'static str,
/// }
///
/// static BOT: ContextSlot<Bot> = ContextSlot::new();
///
/// let token = BOT.set(Bot { name: "marvin" });
/// assert_eq!(BOT.current().unwrap().name, "marvin");
/// BOT.reset(token);
/// assert!(BOT.get().is_none());
/// ```
pub struct ContextSlot<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextSlot<T> {
    /// Create a handle to the slot for `T`.
    ///
    /// All handles for one type are interchangeable; calling this twice does
    /// not create a second slot.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> ContextSlot<T> {
    #[inline]
    fn key() -> TypeId {
        TypeId::of::<T>()
    }

    /// Read the current instance in the calling context, if any.
    ///
    /// Never falls back to another context's value: an empty slot here is
    /// empty regardless of what sibling contexts hold.
    pub fn get(&self) -> Option<Arc<T>> {
        storage::with_map(|map| map.get(&Self::key()).cloned())
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Read the current instance, failing when the slot is empty.
    ///
    /// # Errors
    ///
    /// [`ContextError::Unset`] when no value is present in the calling
    /// context's slot.
    pub fn current(&self) -> Result<Arc<T>> {
        self.get().ok_or(ContextError::Unset {
            type_name: type_name::<T>(),
        })
    }

    /// Write `value` as the current instance for the calling context.
    ///
    /// Returns a token capturing whatever occupied the slot immediately
    /// before, so the write can be undone with [`reset`](Self::reset). The
    /// write is visible to this context and to contexts spawned from it
    /// afterwards, never to siblings or to contexts spawned earlier.
    pub fn set(&self, value: impl Into<Arc<T>>) -> RestoreToken<T> {
        let value: Arc<T> = value.into();
        let prior = storage::with_map(|map| map.insert(Self::key(), value));
        tracing::trace!(slot = type_name::<T>(), "set current instance");
        RestoreToken {
            prior,
            _marker: PhantomData,
        }
    }

    /// Write a type-erased value as the current instance.
    ///
    /// For framework plumbing that holds instances behind [`AnyInstance`];
    /// prefer [`set`](Self::set) when the concrete type is at hand.
    ///
    /// # Errors
    ///
    /// [`ContextError::InvalidInstanceType`] when the wrapped value is not a
    /// `T`. The check runs before any mutation: on failure the slot keeps its
    /// prior value.
    pub fn set_erased(&self, instance: AnyInstance) -> Result<RestoreToken<T>> {
        if !instance.is::<T>() {
            return Err(ContextError::InvalidInstanceType {
                expected: type_name::<T>(),
                actual: instance.type_name(),
            });
        }
        let prior = storage::with_map(|map| map.insert(Self::key(), instance.into_value()));
        tracing::trace!(slot = type_name::<T>(), "set current instance (erased)");
        Ok(RestoreToken {
            prior,
            _marker: PhantomData,
        })
    }

    /// Restore the value captured by `token`, possibly clearing the slot.
    ///
    /// Tokens are self-contained: intervening `set` calls do not invalidate
    /// them and they need not be used in LIFO order.
    ///
    /// # Contract
    ///
    /// The token must have been issued in the calling context or an ancestor
    /// of it. Using a token from an unrelated context is not detected and
    /// leaves that context's slot unchanged while overwriting this one.
    pub fn reset(&self, token: RestoreToken<T>) {
        storage::with_map(|map| match token.prior {
            Some(prior) => {
                map.insert(Self::key(), prior);
            }
            None => {
                map.remove(&Self::key());
            }
        });
        tracing::trace!(slot = type_name::<T>(), "reset current instance");
    }
}

impl<T> Clone for ContextSlot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextSlot<T> {}

impl<T> Default for ContextSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ContextSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSlot")
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// Opaque capture of a slot's prior value, issued by [`ContextSlot::set`].
///
/// `reset` with this token restores exactly the captured state, which may be
/// "empty". The type parameter ties the token to its slot at compile time.
///
/// # Contract
///
/// A token is only meaningful in the context that issued it or a descendant
/// of one; cross-context use is a caller error the implementation does not
/// attempt to detect.
pub struct RestoreToken<T> {
    prior: Option<SlotValue>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for RestoreToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreToken")
            .field("slot", &type_name::<T>())
            .field("restores_value", &self.prior.is_some())
            .finish()
    }
}
