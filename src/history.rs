//! Linear undo/redo history of whole-project snapshots.
//!
//! The stack holds owned copies; nothing outside the stack can reach a
//! stored snapshot mutably, so later edits to the live project never alter
//! history. A new save while the cursor sits below the top discards the
//! redo branch. An optional depth limit drops the oldest snapshots.

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Availability of the undo and redo controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UndoState {
    pub can_undo: bool,
    pub can_redo: bool,
}

struct Persistence {
    store: Box<dyn KeyValueStore>,
    key: String,
}

#[derive(Serialize)]
struct PersistedRef<'a, S> {
    stack: &'a [S],
    cursor: i64,
}

#[derive(Deserialize)]
struct Persisted<S> {
    stack: Vec<S>,
    cursor: i64,
}

/// Undo/redo stack with a cursor.
pub struct HistoryStack<S> {
    stack: Vec<S>,
    cursor: Option<usize>,
    limit: Option<usize>,
    persistence: Option<Persistence>,
}

impl<S> core::fmt::Debug for HistoryStack<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HistoryStack")
            .field("len", &self.stack.len())
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl<S> Default for HistoryStack<S> {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            cursor: None,
            limit: None,
            persistence: None,
        }
    }
}

impl<S> HistoryStack<S>
where
    S: Clone + Serialize + DeserializeOwned,
{
    /// Creates an empty, in-memory history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history mirrored to `store` under `key`.
    ///
    /// Previously stored state is loaded if present. Unreadable or
    /// inconsistent state is logged and replaced by an empty history.
    pub fn persistent(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (stack, cursor) = match Self::load(store.as_ref(), &key) {
            Ok(Some(loaded)) => loaded,
            Ok(None) => (Vec::new(), None),
            Err(e) => {
                log::warn!("discarding stored history {key:?}: {e}");
                (Vec::new(), None)
            }
        };
        Self {
            stack,
            cursor,
            limit: None,
            persistence: Some(Persistence { store, key }),
        }
    }

    /// Keeps at most `limit` snapshots; zero means unbounded.
    ///
    /// A stack already deeper than the limit is trimmed right away, oldest
    /// entries first and then redo entries, so the cursor snapshot survives.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = (limit > 0).then_some(limit);
        if self.enforce_limit() {
            self.persist();
        }
    }

    /// Builder form of [`set_limit`](Self::set_limit).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.set_limit(limit);
        self
    }

    /// Returns the depth limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn load(
        store: &dyn KeyValueStore,
        key: &str,
    ) -> Result<Option<(Vec<S>, Option<usize>)>, StorageError> {
        let Some(raw) = store.get(key)? else {
            return Ok(None);
        };
        let persisted: Persisted<S> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let cursor = match usize::try_from(persisted.cursor) {
            Ok(c) if c < persisted.stack.len() => Some(c),
            Err(_) if persisted.cursor == -1 && persisted.stack.is_empty() => None,
            _ => {
                return Err(StorageError::Corrupt(format!(
                    "cursor {} outside stack of {}",
                    persisted.cursor,
                    persisted.stack.len()
                )));
            }
        };
        Ok(Some((persisted.stack, cursor)))
    }

    /// Records a new snapshot after the cursor, discarding any redo branch.
    pub fn save(&mut self, snapshot: &S) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.stack.truncate(keep);
        self.stack.push(snapshot.clone());
        self.cursor = Some(self.stack.len() - 1);
        self.enforce_limit();
        log::debug!("history save, {} entries", self.stack.len());
        self.persist();
    }

    /// Replaces the snapshot at the cursor without creating an undo step.
    ///
    /// On an empty history this records the first snapshot.
    pub fn overwrite(&mut self, snapshot: &S) {
        match self.cursor {
            Some(c) => self.stack[c] = snapshot.clone(),
            None => {
                self.stack.push(snapshot.clone());
                self.cursor = Some(0);
            }
        }
        self.persist();
    }

    /// Returns the snapshot [`undo`](Self::undo) would move to, without
    /// moving the cursor.
    pub fn peek_undo(&self) -> Option<&S> {
        match self.cursor {
            Some(c) if c > 0 => self.stack.get(c - 1),
            _ => None,
        }
    }

    /// Returns the snapshot [`redo`](Self::redo) would move to, without
    /// moving the cursor.
    pub fn peek_redo(&self) -> Option<&S> {
        self.cursor.and_then(|c| self.stack.get(c + 1))
    }

    /// Steps back and returns the snapshot now at the cursor.
    ///
    /// Returns `None` (and changes nothing) at the bottom of the stack.
    pub fn undo(&mut self) -> Option<&S> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.persist();
                self.retrieve()
            }
            _ => None,
        }
    }

    /// Steps forward and returns the snapshot now at the cursor.
    ///
    /// Returns `None` (and changes nothing) at the top of the stack.
    pub fn redo(&mut self) -> Option<&S> {
        match self.cursor {
            Some(c) if c + 1 < self.stack.len() => {
                self.cursor = Some(c + 1);
                self.persist();
                self.retrieve()
            }
            _ => None,
        }
    }

    /// Returns the snapshot at the cursor.
    pub fn retrieve(&self) -> Option<&S> {
        self.cursor.and_then(|c| self.stack.get(c))
    }

    /// Reports whether undo and redo would do anything.
    pub fn has_undo(&self) -> UndoState {
        match self.cursor {
            Some(c) => UndoState {
                can_undo: c > 0,
                can_redo: c + 1 < self.stack.len(),
            },
            None => UndoState::default(),
        }
    }

    /// Returns the cursor, or `None` for an empty history.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Returns the number of stored snapshots.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if nothing has been saved.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn enforce_limit(&mut self) -> bool {
        let (Some(limit), Some(cursor)) = (self.limit, self.cursor) else {
            return false;
        };
        if self.stack.len() <= limit {
            return false;
        }
        let front = (self.stack.len() - limit).min(cursor);
        self.stack.drain(..front);
        self.stack.truncate(limit);
        self.cursor = Some(cursor - front);
        true
    }

    fn persist(&mut self) {
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };
        let record = PersistedRef {
            stack: &self.stack,
            cursor: self.cursor.map_or(-1, |c| c as i64),
        };
        let result = serde_json::to_string(&record)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
            .and_then(|json| persistence.store.set(&persistence.key, &json));
        if let Err(e) = result {
            log::warn!("failed to persist history {:?}: {e}", persistence.key);
        }
    }
}
