//! Newest-first log of calculation results.
//!
//! The store owns the in-memory sequence and is its only writer. Other stores
//! may share the durable slot; appends re-read it so none are lost. Readers either
//! take a snapshot with [`HistoryStore::current`] or subscribe and receive a
//! fresh snapshot after every append.

use std::sync::{mpsc, Arc, Mutex, PoisonError, RwLock};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use crate::error::HistoryDecodeError;
use crate::history::{codec, HistoryStorage};
use crate::models::CalculationResult;

pub type HistorySnapshot = Arc<Vec<CalculationResult>>;

/// Why the store started from less than what was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRecovery {
    /// Nothing in the slot could be read; the history starts empty.
    Discarded { reason: HistoryDecodeError },
    /// Some entries were unusable and were dropped.
    Partial { skipped: Vec<String> },
}

impl std::fmt::Display for HistoryRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryRecovery::Discarded { reason } => {
                write!(f, "stored history was unreadable and has been reset: {reason}")
            }
            HistoryRecovery::Partial { skipped } => {
                write!(f, "dropped {} unreadable history entries", skipped.len())
            }
        }
    }
}

pub struct HistoryStore {
    storage: Box<dyn HistoryStorage>,
    results: RwLock<HistorySnapshot>,
    subscribers: Mutex<Vec<mpsc::Sender<HistorySnapshot>>>,
    recovery: Option<HistoryRecovery>,
}

impl HistoryStore {
    /// Load whatever the slot holds. A corrupt slot is not an error: the store
    /// starts empty and [`HistoryStore::recovery`] says why.
    pub fn open(storage: Box<dyn HistoryStorage>) -> Result<Self> {
        let payload = storage
            .read()
            .with_context(|| format!("failed to load history from {}", storage.describe()))?;
        let (results, recovery) = recover(payload, storage.as_ref());

        info!(
            "Loaded {} calculation results from {}",
            results.len(),
            storage.describe()
        );

        Ok(Self {
            storage,
            results: RwLock::new(Arc::new(results)),
            subscribers: Mutex::new(Vec::new()),
            recovery,
        })
    }

    pub fn recovery(&self) -> Option<&HistoryRecovery> {
        self.recovery.as_ref()
    }

    pub fn current(&self) -> HistorySnapshot {
        let guard = self.results.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn latest(&self) -> Option<CalculationResult> {
        self.current().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Prepend `result`, persist the full history, then notify subscribers.
    ///
    /// The slot is re-read inside the storage lock, so results appended by
    /// another store on the same slot since [`HistoryStore::open`] are kept.
    /// The write guard is held until subscribers have been sent the new
    /// snapshot. On a failed write nothing changes.
    pub fn append(&self, result: CalculationResult) -> Result<HistorySnapshot> {
        let mut guard = self
            .results
            .write()
            .map_err(|_| anyhow!("history lock poisoned"))?;

        let mut updated = Vec::new();
        self.storage
            .update(&mut |stored| {
                let (existing, _) = recover(stored, self.storage.as_ref());
                let mut merged = Vec::with_capacity(existing.len() + 1);
                merged.push(result.clone());
                merged.extend(existing);

                let payload = codec::encode(&merged)?;
                updated = merged;
                Ok(payload)
            })
            .with_context(|| format!("failed to persist history to {}", self.storage.describe()))?;

        *guard = Arc::new(updated);
        let snapshot = Arc::clone(&guard);
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Receive the current history right away and again after every append.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::Receiver<HistorySnapshot> {
        let (tx, rx) = mpsc::channel();
        // Same lock order as append: results, then subscribers.
        let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        // Sending on a fresh channel only fails if rx is gone, and we still hold it.
        let _ = tx.send(Arc::clone(&results));
        subscribers.push(tx);
        rx
    }

    fn publish(&self, snapshot: &HistorySnapshot) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(Arc::clone(snapshot)).is_ok());
    }
}

/// Decode a slot payload, falling back to an empty history when it is unusable.
fn recover(
    payload: Option<String>,
    storage: &dyn HistoryStorage,
) -> (Vec<CalculationResult>, Option<HistoryRecovery>) {
    let Some(payload) = payload.filter(|p| !p.trim().is_empty()) else {
        return (Vec::new(), None);
    };

    match codec::decode(&payload) {
        Ok(decoded) if decoded.skipped.is_empty() => (decoded.results, None),
        Ok(decoded) => {
            for note in &decoded.skipped {
                warn!("Skipping stored calculation result ({note})");
            }
            (
                decoded.results,
                Some(HistoryRecovery::Partial {
                    skipped: decoded.skipped,
                }),
            )
        }
        Err(reason) => {
            warn!(
                "Stored history in {} is unreadable, starting empty: {reason}",
                storage.describe()
            );
            (Vec::new(), Some(HistoryRecovery::Discarded { reason }))
        }
    }
}
