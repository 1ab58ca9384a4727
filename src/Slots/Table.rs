// Fixed-capacity registry: an id from the SlotPool names a stored value.

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::fmt;

use super::Pool::SlotPool;
use super::Structs::Table_Structs::TableState;
use crate::Core::error::{ConfigError, TableError};
use crate::Core::trace;

/// Maps ids handed out by an internal [`SlotPool`] to values.
///
/// The pool side is lock-free. Values and in-use bits live behind one
/// `parking_lot::RwLock`: `get` takes it shared, every mutation takes it
/// exclusively. A table holds at most 256 entries, so this is never the
/// per-packet path.
pub struct SlotTable<T> {
    pool: SlotPool,
    state: RwLock<TableState<T>>,
}

impl<T> SlotTable<T> {
    /// `capacity` must be a power of two in `1..=256`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        let pool = SlotPool::with_ids(capacity)?;
        Ok(Self {
            pool,
            state: RwLock::new(TableState::new(capacity)),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    fn check_range(&self, id: u8) -> Result<usize, TableError> {
        let index = id as usize;
        if index >= self.capacity() {
            return Err(TableError::OutOfRange {
                id,
                capacity: self.capacity(),
            });
        }
        Ok(index)
    }

    /// Take a free id and store `value` under it.
    pub fn insert(&self, value: T) -> Result<u8, TableError> {
        let id = self.pool.try_acquire().map_err(|_| TableError::PoolEmpty)?;

        let mut state = self.state.write();
        let fresh = state.in_use.insert(id);
        debug_assert!(fresh, "slot pool handed out id {id} twice");
        state.values[id as usize] = Some(value);
        drop(state);

        trace::trace!(id, "slot acquired");
        Ok(id)
    }

    /// Take a free id and store `T::default()` under it.
    pub fn acquire(&self) -> Result<u8, TableError>
    where
        T: Default,
    {
        self.insert(T::default())
    }

    /// Shared borrow of the value stored under `id`. Holds the read lock
    /// until the guard is dropped.
    pub fn get(&self, id: u8) -> Result<MappedRwLockReadGuard<'_, T>, TableError> {
        let index = self.check_range(id)?;
        RwLockReadGuard::try_map(self.state.read(), |state| {
            if state.in_use.contains(id) {
                state.values[index].as_ref()
            } else {
                None
            }
        })
        .map_err(|_| TableError::NotInUse(id))
    }

    pub fn get_cloned(&self, id: u8) -> Result<T, TableError>
    where
        T: Clone,
    {
        self.get(id).map(|value| value.clone())
    }

    /// Overwrite the value under `id`, returning the previous one.
    pub fn replace(&self, id: u8, value: T) -> Result<T, TableError> {
        let index = self.check_range(id)?;
        let mut state = self.state.write();
        if !state.in_use.contains(id) {
            return Err(TableError::NotInUse(id));
        }
        match state.values[index].as_mut() {
            Some(current) => Ok(std::mem::replace(current, value)),
            None => Err(TableError::NotInUse(id)),
        }
    }

    /// Remove the value under `id` and return the id to the pool.
    pub fn release(&self, id: u8) -> Result<T, TableError> {
        let index = self.check_range(id)?;

        let mut state = self.state.write();
        if !state.in_use.remove(id) {
            return Err(TableError::NotInUse(id));
        }
        let value = state.values[index].take();
        drop(state);

        self.pool.try_release(id).map_err(|_| {
            trace::warn!(id, "slot pool refused a released id");
            TableError::PoolRejected(id)
        })?;

        trace::trace!(id, "slot released");
        value.ok_or(TableError::NotInUse(id))
    }

    pub fn is_in_use(&self, id: u8) -> bool {
        self.state.read().in_use.contains(id)
    }

    pub fn in_use_count(&self) -> usize {
        self.state.read().in_use.count()
    }

    /// Number of ids still available to `acquire`.
    pub fn available(&self) -> usize {
        self.pool.len()
    }

    /// Snapshot of the ids currently in use, ascending.
    pub fn ids(&self) -> Vec<u8> {
        self.state.read().in_use.iter().collect()
    }

    /// Visit every stored value under a single read lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(u8, &T),
    {
        let state = self.state.read();
        for id in state.in_use.iter() {
            if let Some(value) = state.values[id as usize].as_ref() {
                f(id, value);
            }
        }
    }
}

impl<T> fmt::Debug for SlotTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_slot_table(self, f)
    }
}
