// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time-bounded cache of authorization decisions.
//!
//! Decisions are keyed by actor and resource. Entries expire after a fixed
//! TTL; a role change for an actor must call [`PermissionCache::invalidate_actor`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PermissionKey {
    actor: String,
    resource: String,
}

#[derive(Debug, Clone, Copy)]
struct CachedDecision {
    allowed: bool,
    expires_at: Instant,
}

/// A thread-safe TTL cache of authorization decisions.
#[derive(Debug)]
pub struct PermissionCache {
    ttl: Duration,
    entries: Mutex<HashMap<PermissionKey, CachedDecision>>,
}

impl PermissionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The time-to-live of new entries.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PermissionKey, CachedDecision>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(actor: &str, resource: &str) -> PermissionKey {
        PermissionKey {
            actor: actor.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Returns the cached decision if it has not expired.
    #[must_use]
    pub fn get(&self, actor: &str, resource: &str) -> Option<bool> {
        self.get_at(actor, resource, Instant::now())
    }

    /// Returns the cached decision as seen at `now`.
    #[must_use]
    pub fn get_at(&self, actor: &str, resource: &str, now: Instant) -> Option<bool> {
        self.entries()
            .get(&Self::key(actor, resource))
            .filter(|decision| decision.expires_at > now)
            .map(|decision| decision.allowed)
    }

    /// Caches a decision.
    pub fn insert(&self, actor: &str, resource: &str, allowed: bool) {
        self.insert_at(actor, resource, allowed, Instant::now());
    }

    /// Caches a decision as if made at `now`.
    pub fn insert_at(&self, actor: &str, resource: &str, allowed: bool, now: Instant) {
        self.entries().insert(
            Self::key(actor, resource),
            CachedDecision {
                allowed,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Returns the cached decision, or computes and caches it.
    pub fn check_or_insert_with<F>(&self, actor: &str, resource: &str, decide: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if let Some(allowed) = self.get(actor, resource) {
            debug!(actor, resource, allowed, "Permission cache hit");
            return allowed;
        }
        let allowed: bool = decide();
        self.insert(actor, resource, allowed);
        debug!(actor, resource, allowed, "Permission cache miss");
        allowed
    }

    /// Drops every decision cached for an actor and returns how many were dropped.
    pub fn invalidate_actor(&self, actor: &str) -> usize {
        let mut entries: MutexGuard<'_, HashMap<PermissionKey, CachedDecision>> = self.entries();
        let before: usize = entries.len();
        entries.retain(|key, _| key.actor != actor);
        before - entries.len()
    }

    /// Drops expired decisions and returns how many were dropped.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    /// Drops decisions expired at `now`.
    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let mut entries: MutexGuard<'_, HashMap<PermissionKey, CachedDecision>> = self.entries();
        let before: usize = entries.len();
        entries.retain(|_, decision| decision.expires_at > now);
        before - entries.len()
    }

    /// Drops every decision.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of cached decisions, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds no decisions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
