//! Mutual exclusion between an actor's generation and build workflows.
//!
//! A lease is taken before a generation request is sent and held until the
//! resulting build finishes or the workflow fails. Leases expire after a TTL
//! so a lost completion can never lock an actor out for good.

use crate::core::ids::ActorId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default lifetime of a lease.
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(5 * 60);

/// Identifies one acquisition of a lease.
///
/// Releasing requires the token handed out by the acquire, so a workflow that
/// outlived its lease cannot drop the lease of the workflow that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeaseToken(u64);

/// An active lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobLease {
    pub token: LeaseToken,
    pub acquired_at: Instant,
    pub expires_at: Instant,
}

impl JobLease {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Lease table keyed by actor.
///
/// The `*_at` variants take the current time explicitly; the plain variants
/// read the monotonic clock.
#[derive(Debug)]
pub struct JobLock {
    ttl: Duration,
    next_token: u64,
    leases: HashMap<ActorId, JobLease>,
}

impl Default for JobLock {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE_TTL)
    }
}

impl JobLock {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_token: 0,
            leases: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn try_acquire(&mut self, actor: &ActorId) -> Option<LeaseToken> {
        self.try_acquire_at(actor, Instant::now())
    }

    /// Take a lease unless a live one exists. Never mutates on failure.
    pub fn try_acquire_at(&mut self, actor: &ActorId, now: Instant) -> Option<LeaseToken> {
        if self.is_held_at(actor, now) {
            return None;
        }
        self.next_token += 1;
        let token = LeaseToken(self.next_token);
        self.leases.insert(
            actor.clone(),
            JobLease {
                token,
                acquired_at: now,
                expires_at: now + self.ttl,
            },
        );
        Some(token)
    }

    /// Drop the actor's lease if it is still the one `token` was issued for.
    /// Returns whether a lease was removed.
    pub fn release(&mut self, actor: &ActorId, token: LeaseToken) -> bool {
        match self.leases.get(actor) {
            Some(lease) if lease.token == token => {
                self.leases.remove(actor);
                true
            }
            _ => false,
        }
    }

    pub fn is_held(&mut self, actor: &ActorId) -> bool {
        self.is_held_at(actor, Instant::now())
    }

    /// True for a live lease. An expired lease is removed on the way.
    pub fn is_held_at(&mut self, actor: &ActorId, now: Instant) -> bool {
        match self.leases.get(actor) {
            Some(lease) if lease.is_expired(now) => {
                self.leases.remove(actor);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn lease(&self, actor: &ActorId) -> Option<&JobLease> {
        self.leases.get(actor)
    }

    /// Remove every expired lease; returns how many were dropped.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.leases.len();
        self.leases.retain(|_, lease| !lease.is_expired(now));
        before - self.leases.len()
    }

    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ActorId {
        ActorId::new("alice")
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let mut lock = JobLock::default();
        let now = Instant::now();
        assert!(lock.try_acquire_at(&actor(), now).is_some());
        assert!(lock.try_acquire_at(&actor(), now + Duration::from_secs(1)).is_none());
        assert!(lock.is_held_at(&actor(), now));
    }

    #[test]
    fn test_failed_acquire_does_not_extend_lease() {
        let mut lock = JobLock::new(Duration::from_secs(10));
        let now = Instant::now();
        lock.try_acquire_at(&actor(), now);
        lock.try_acquire_at(&actor(), now + Duration::from_secs(5));
        assert_eq!(
            lock.lease(&actor()).unwrap().expires_at,
            now + Duration::from_secs(10)
        );
    }

    #[test]
    fn test_acquire_succeeds_after_release() {
        let mut lock = JobLock::default();
        let now = Instant::now();
        let token = lock.try_acquire_at(&actor(), now).unwrap();
        assert!(lock.release(&actor(), token));
        assert!(!lock.release(&actor(), token));
        assert!(lock.try_acquire_at(&actor(), now).is_some());
    }

    #[test]
    fn test_stale_token_cannot_release_newer_lease() {
        let mut lock = JobLock::new(Duration::from_secs(60));
        let now = Instant::now();
        let first = lock.try_acquire_at(&actor(), now).unwrap();

        let later = now + Duration::from_secs(61);
        let second = lock.try_acquire_at(&actor(), later).unwrap();
        assert_ne!(first, second);

        assert!(!lock.release(&actor(), first));
        assert!(lock.is_held_at(&actor(), later));
        assert!(lock.try_acquire_at(&actor(), later).is_none());
        assert!(lock.release(&actor(), second));
    }

    #[test]
    fn test_lease_expires_after_ttl() {
        let mut lock = JobLock::new(Duration::from_secs(300));
        let now = Instant::now();
        assert!(lock.try_acquire_at(&actor(), now).is_some());

        assert!(lock.is_held_at(&actor(), now + Duration::from_secs(299)));
        assert!(!lock.is_held_at(&actor(), now + Duration::from_secs(300)));
        // Read removed the stale lease.
        assert!(lock.lease(&actor()).is_none());
        assert!(lock.try_acquire_at(&actor(), now + Duration::from_secs(300)).is_some());
    }

    #[test]
    fn test_actors_do_not_contend() {
        let mut lock = JobLock::default();
        let now = Instant::now();
        assert!(lock.try_acquire_at(&actor(), now).is_some());
        assert!(lock.try_acquire_at(&ActorId::new("bob"), now).is_some());
        assert_eq!(lock.len(), 2);
    }

    #[test]
    fn test_purge_drops_only_expired() {
        let mut lock = JobLock::new(Duration::from_secs(10));
        let now = Instant::now();
        lock.try_acquire_at(&actor(), now);
        lock.try_acquire_at(&ActorId::new("bob"), now + Duration::from_secs(5));
        assert_eq!(lock.purge_expired(now + Duration::from_secs(12)), 1);
        assert!(lock.lease(&ActorId::new("bob")).is_some());
    }
}
