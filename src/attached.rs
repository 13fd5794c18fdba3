//! Ad hoc per-object data attachment.
//!
//! [`AttachedData`] lets an object carry named values without declaring fields
//! up front: embed one as a field and forward to it. The backing map is
//! allocated lazily on the first write, so a never-written store costs one
//! `Option` discriminant.
//!
//! No synchronization is provided. The store offers exactly the guarantees
//! its host object does, which is the point: it is a bare convenience
//! container, not a shared one.
//!
//! # Example
//!
//! ```
//! use taskscope::AttachedData;
//!
//! let mut data = AttachedData::new();
//! data.set("retries", 3u32);
//! assert_eq!(data.get::<u32>("retries"), Some(&3));
//! assert!(data.contains("retries"));
//!
//! data.delete("retries").unwrap();
//! assert!(!data.contains("retries"));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ContextError, Result};

type Entry = Box<dyn Any + Send + Sync>;

/// Lazily-allocated key/value store for ad hoc object state.
///
/// Values are stored type-erased; reads are typed and return `None` on a type
/// mismatch rather than failing.
#[derive(Default)]
pub struct AttachedData {
    entries: Option<HashMap<String, Entry>>,
}

impl AttachedData {
    /// Create an empty store. Allocates nothing.
    pub const fn new() -> Self {
        Self { entries: None }
    }

    /// Read the value under `key` as a `V`.
    ///
    /// Returns `None` when the key is absent or holds a value of a different
    /// type.
    pub fn get<V: 'static>(&self, key: &str) -> Option<&V> {
        self.entries.as_ref()?.get(key)?.downcast_ref::<V>()
    }

    /// Read the value under `key`, falling back to `default`.
    pub fn get_or<'a, V: 'static>(&'a self, key: &str, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set<V: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: V) {
        self.entries
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), Box::new(value));
    }

    /// Remove the entry under `key`.
    ///
    /// # Errors
    ///
    /// [`ContextError::KeyNotFound`] when there is no entry for `key`.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        match self.entries.as_mut().and_then(|map| map.remove(key)) {
            Some(_) => Ok(()),
            None => Err(ContextError::KeyNotFound(key.to_string())),
        }
    }

    /// Remove and return the entry under `key` as a `V`.
    ///
    /// Returns `None` without removing anything when the key is absent or the
    /// entry holds a different type.
    pub fn remove<V: Send + Sync + 'static>(&mut self, key: &str) -> Option<V> {
        let map = self.entries.as_mut()?;
        if !map.get(key)?.is::<V>() {
            return None;
        }
        let entry = map.remove(key)?;
        entry.downcast::<V>().ok().map(|boxed| *boxed)
    }

    /// Whether an entry exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|map| map.contains_key(key))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, HashMap::len)
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the keys with an entry, in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .as_ref()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    /// Drop every entry, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        if let Some(map) = self.entries.as_mut() {
            map.clear();
        }
    }
}

impl fmt::Debug for AttachedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedData")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
