//! The query cache.
//!
//! Entries are JSON values keyed by [`QueryKey`]. Reads within the stale
//! time are served from memory; concurrent misses on one key share a
//! single in-flight request. A unit epoch, bumped on every unit switch,
//! keeps fetches started under the previous unit from writing; a
//! generation, bumped by [`QueryCache::clear`], does the same for every
//! key once the session ends.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use barbearia_core::error::CoreError;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::key::QueryKey;
use crate::mutation::{Mutation, MutationId};

/// Default time a fetched entry is served without refetching.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Loaded from the backend.
    Fresh,
    /// Invalidated; the next read refetches.
    Stale,
    /// Holds a local guess written by a pending mutation.
    Optimistic(MutationId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub status: EntryStatus,
    pub updated_at: Instant,
}

impl CacheEntry {
    fn fresh(data: Value) -> Self {
        Self {
            data,
            status: EntryStatus::Fresh,
            updated_at: Instant::now(),
        }
    }

    fn is_servable(&self, stale_time: Duration) -> bool {
        match self.status {
            EntryStatus::Optimistic(_) => true,
            EntryStatus::Stale => false,
            EntryStatus::Fresh => self.updated_at.elapsed() < stale_time,
        }
    }
}

/// Point-in-time copy of every entry.
pub type CacheSnapshot = HashMap<QueryKey, CacheEntry>;

type InFlight = Shared<BoxFuture<'static, Result<Value, CoreError>>>;

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, CacheEntry>,
    unit_epoch: u64,
    generation: u64,
}

impl Inner {
    fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.starts_with(prefix) && !matches!(entry.status, EntryStatus::Optimistic(_)) {
                entry.status = EntryStatus::Stale;
                count += 1;
            }
        }
        count
    }

    fn confirm(&mut self, id: MutationId, invalidates: &[QueryKey]) {
        let now = Instant::now();
        for entry in self.entries.values_mut() {
            if entry.status == EntryStatus::Optimistic(id) {
                entry.status = EntryStatus::Fresh;
                entry.updated_at = now;
            }
        }
        for prefix in invalidates {
            self.invalidate(prefix);
        }
    }

    /// Mark what `id` still owns as stale so the next read refetches it.
    fn mark_stale(&mut self, id: MutationId) {
        for entry in self.entries.values_mut() {
            if entry.status == EntryStatus::Optimistic(id) {
                entry.status = EntryStatus::Stale;
            }
        }
    }

    /// Restore what `id` replaced. Returns the number of restored keys.
    ///
    /// Nothing is restored across a [`QueryCache::clear`], and unit-scoped
    /// keys are not restored across a unit switch. A key that is gone is
    /// only brought back when this mutation removed it.
    fn restore(&mut self, id: MutationId, rollback: Rollback, stale: bool) -> usize {
        if self.generation != rollback.generation {
            return 0;
        }
        let unit_changed = self.unit_epoch != rollback.unit_epoch;
        let mut restored = 0;

        for (key, old) in rollback.previous {
            if unit_changed && key.is_unit_scoped() {
                continue;
            }
            let ours = match self.entries.get(&key) {
                Some(entry) => entry.status == EntryStatus::Optimistic(id),
                None => rollback.removed.contains(&key),
            };
            if !ours {
                continue;
            }
            match old {
                Some(mut entry) => {
                    if stale {
                        entry.status = EntryStatus::Stale;
                    }
                    self.entries.insert(key, entry);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
            restored += 1;
        }
        restored
    }
}

/// Entries a mutation replaced, restored on failure.
struct Rollback {
    unit_epoch: u64,
    generation: u64,
    previous: HashMap<QueryKey, Option<CacheEntry>>,
    removed: HashSet<QueryKey>,
}

enum Settlement {
    Pending(Rollback),
    Accepted,
    Settled,
}

/// Owns the optimistic entries of one mutation until it settles.
///
/// Dropping it unsettled, e.g. when the caller stops waiting, restores the
/// previous entries marked stale, or marks the accepted ones stale, so no
/// entry stays optimistic forever.
struct PendingMutation {
    inner: Arc<RwLock<Inner>>,
    id: MutationId,
    settlement: Settlement,
}

impl PendingMutation {
    async fn confirm(mut self, invalidates: &[QueryKey]) {
        self.settlement = Settlement::Accepted;
        let lock = Arc::clone(&self.inner);
        let mut inner = lock.write().await;
        self.settlement = Settlement::Settled;
        inner.confirm(self.id, invalidates);
    }

    async fn roll_back(mut self) -> usize {
        let lock = Arc::clone(&self.inner);
        let mut inner = lock.write().await;
        match std::mem::replace(&mut self.settlement, Settlement::Settled) {
            Settlement::Pending(rollback) => inner.restore(self.id, rollback, false),
            _ => 0,
        }
    }
}

impl Drop for PendingMutation {
    fn drop(&mut self) {
        let settlement = std::mem::replace(&mut self.settlement, Settlement::Settled);
        if matches!(settlement, Settlement::Settled) {
            return;
        }
        let id = self.id;
        tracing::warn!(mutation_id = %id, "Mutation abandoned before settling, optimistic entries marked stale");

        let abandon = move |inner: &mut Inner| match settlement {
            Settlement::Pending(rollback) => {
                inner.restore(id, rollback, true);
            }
            _ => inner.mark_stale(id),
        };
        if let Ok(mut inner) = self.inner.try_write() {
            abandon(&mut *inner);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let lock = Arc::clone(&self.inner);
                handle.spawn(async move {
                    let mut inner = lock.write().await;
                    abandon(&mut *inner);
                });
            }
            Err(_) => {
                tracing::error!(mutation_id = %id, "No runtime to release abandoned mutation");
            }
        }
    }
}

pub struct QueryCache {
    inner: Arc<RwLock<Inner>>,
    inflight: Mutex<HashMap<QueryKey, InFlight>>,
    stale_time: Duration,
    next_mutation: AtomicU64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            inflight: Mutex::new(HashMap::new()),
            stale_time,
            next_mutation: AtomicU64::new(1),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Return the cached value for `key`, or run `fetcher` and store its
    /// result.
    ///
    /// A result that arrives after [`clear`](Self::clear), or after a unit
    /// switch for unit-scoped keys, is handed to the caller but not
    /// stored. A result that arrives while the key holds an optimistic
    /// write does not replace it; the optimistic value is returned instead.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Value, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, CoreError>> + Send + 'static,
    {
        let (epoch, generation) = {
            let inner = self.inner.read().await;
            if let Some(entry) = inner.entries.get(&key) {
                if entry.is_servable(self.stale_time) {
                    return Ok(entry.data.clone());
                }
            }
            (inner.unit_epoch, inner.generation)
        };

        let request = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(&key) {
                Some(request) => request.clone(),
                None => {
                    let request = fetcher().boxed().shared();
                    inflight.insert(key.clone(), request.clone());
                    request
                }
            }
        };

        let result = request.clone().await;
        {
            let mut inflight = self.inflight.lock().await;
            if inflight.get(&key).is_some_and(|r| r.ptr_eq(&request)) {
                inflight.remove(&key);
            }
        }
        let value = result?;

        let mut inner = self.inner.write().await;
        let outdated = inner.generation != generation
            || (key.is_unit_scoped() && inner.unit_epoch != epoch);
        if outdated {
            tracing::debug!(%key, "Discarding result fetched before the cache was reset");
            return Ok(value);
        }
        if let Some(entry) = inner.entries.get(&key) {
            if matches!(entry.status, EntryStatus::Optimistic(_)) {
                return Ok(entry.data.clone());
            }
        }
        inner.entries.insert(key, CacheEntry::fresh(value.clone()));
        Ok(value)
    }

    /// Typed variant of [`fetch`](Self::fetch).
    pub async fn fetch_as<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let value = self
            .fetch(key, move || {
                let fut = fetcher();
                async move { fut.await.and_then(|v| to_value(&v)) }
            })
            .await?;
        from_value(value)
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.inner.read().await.entries.get(key).cloned()
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.get(key).await?;
        serde_json::from_value(entry.data).ok()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store a value as freshly fetched, e.g. a server response.
    pub async fn set_query_data(&self, key: QueryKey, data: Value) {
        self.inner
            .write()
            .await
            .entries
            .insert(key, CacheEntry::fresh(data));
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.inner.write().await.invalidate(prefix)
    }

    /// Drop every entry under `prefix`.
    pub async fn remove(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.starts_with(prefix));
        before - inner.entries.len()
    }

    /// Drop every unit-scoped entry and start a new unit epoch.
    pub async fn clear_unit_scoped(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.is_unit_scoped());
        inner.unit_epoch += 1;
        before - inner.entries.len()
    }

    /// Drop everything, e.g. on sign-out. Pending fetches and mutations
    /// started before the call never write afterwards.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.unit_epoch += 1;
        inner.generation += 1;
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        self.inner.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Run `request` with `mutation` applied optimistically.
    ///
    /// On success the optimistic entries become fresh and the mutation's
    /// invalidation prefixes go stale. On failure every entry the mutation
    /// touched is restored to its exact previous state, unless a later
    /// write has replaced it since. Failed requests are never retried.
    ///
    /// If the returned future is dropped before the request settles, the
    /// previous entries are restored and marked stale.
    pub async fn mutate<T, Fut>(&self, mutation: Mutation, request: Fut) -> Result<T, CoreError>
    where
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let id = MutationId(self.next_mutation.fetch_add(1, Ordering::Relaxed));
        let pending = self.apply_optimistic(id, &mutation).await;

        match request.await {
            Ok(value) => {
                pending.confirm(&mutation.invalidates).await;
                Ok(value)
            }
            Err(err) => {
                let restored = pending.roll_back().await;
                tracing::warn!(
                    mutation = %mutation.label,
                    mutation_id = %id,
                    restored,
                    error = %err,
                    "Mutation failed, optimistic update rolled back"
                );
                Err(err)
            }
        }
    }

    async fn apply_optimistic(&self, id: MutationId, mutation: &Mutation) -> PendingMutation {
        let mut inner = self.inner.write().await;
        let mut previous: HashMap<QueryKey, Option<CacheEntry>> = HashMap::new();
        let mut removed = HashSet::new();
        let now = Instant::now();

        for (target, patch) in &mutation.patches {
            let keys: Vec<QueryKey> = inner
                .entries
                .keys()
                .filter(|key| target.matches(key))
                .cloned()
                .collect();
            for key in keys {
                if let Some(entry) = inner.entries.get_mut(&key) {
                    previous.entry(key).or_insert_with(|| Some(entry.clone()));
                    patch(&mut entry.data);
                    entry.status = EntryStatus::Optimistic(id);
                    entry.updated_at = now;
                }
            }
        }

        for prefix in &mutation.removals {
            let keys: Vec<QueryKey> = inner
                .entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            for key in keys {
                let old = inner.entries.remove(&key);
                removed.insert(key.clone());
                previous.entry(key).or_insert(old);
            }
        }

        for (key, value) in &mutation.inserts {
            let old = inner.entries.insert(
                key.clone(),
                CacheEntry {
                    data: value.clone(),
                    status: EntryStatus::Optimistic(id),
                    updated_at: now,
                },
            );
            previous.entry(key.clone()).or_insert(old);
        }

        tracing::debug!(mutation = %mutation.label, mutation_id = %id, touched = previous.len(), "Applied optimistic update");
        PendingMutation {
            inner: Arc::clone(&self.inner),
            id,
            settlement: Settlement::Pending(Rollback {
                unit_epoch: inner.unit_epoch,
                generation: inner.generation,
                previous,
                removed,
            }),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Internal(format!("cache encode: {e}")))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, CoreError> {
    serde_json::from_value(value).map_err(|e| CoreError::Internal(format!("cache decode: {e}")))
}
