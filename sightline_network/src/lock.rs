// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The network lock and evaluation requests.
//!
//! While the lock is held, evaluation requests are only recorded. When the
//! outermost holder releases it, a single request is issued if any were
//! recorded, so a burst of nested modifications triggers one evaluation.

use core::ops::{Deref, DerefMut};

use crate::network::{Network, NetworkEvent};

/// Scoped network lock; releasing happens on drop.
///
/// ```rust
/// use sightline_network::{Network, ProcessorInfo, PropertyBuilder};
///
/// let mut net = Network::new();
/// let p = net.add_processor("p", ProcessorInfo::new("org.example.P", "P"));
/// let a = net.add_property(p, PropertyBuilder::new("a", "A", 0_i32));
/// let b = net.add_property(p, PropertyBuilder::new("b", "B", 0_i32));
/// net.evaluate();
/// let before = net.evaluation_requests();
/// {
///     let mut locked = net.lock();
///     locked.set(a, 1);
///     locked.set(b, 2);
///     assert!(locked.is_evaluation_pending());
/// }
/// assert_eq!(net.evaluation_requests(), before + 1);
/// ```
#[derive(Debug)]
pub struct NetworkLock<'a> {
    network: &'a mut Network,
}

impl Deref for NetworkLock<'_> {
    type Target = Network;

    fn deref(&self) -> &Network {
        self.network
    }
}

impl DerefMut for NetworkLock<'_> {
    fn deref_mut(&mut self) -> &mut Network {
        self.network
    }
}

impl Drop for NetworkLock<'_> {
    fn drop(&mut self) {
        self.network.release_lock();
    }
}

impl Network {
    /// Acquires the network lock until the returned guard is dropped.
    pub fn lock(&mut self) -> NetworkLock<'_> {
        self.acquire_lock();
        NetworkLock { network: self }
    }

    /// Runs `f` while holding the network lock.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut lock = self.lock();
        f(&mut *lock)
    }

    /// Increments the lock depth.
    ///
    /// Prefer [`lock`](Self::lock) or [`batch`](Self::batch); every call must
    /// be paired with [`release_lock`](Self::release_lock).
    pub fn acquire_lock(&mut self) {
        self.lock_depth += 1;
    }

    /// Decrements the lock depth, issuing the deferred evaluation request when
    /// the outermost lock is released.
    pub fn release_lock(&mut self) {
        if self.lock_depth == 0 {
            log::warn!("release_lock called without a matching acquire_lock");
            return;
        }
        self.lock_depth -= 1;
        if self.lock_depth == 0 && self.evaluation_pending && !self.evaluating {
            self.evaluation_pending = false;
            self.request_evaluation();
        }
    }

    /// Whether the lock is held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock_depth > 0
    }

    /// Current nesting depth of the lock.
    #[must_use]
    pub fn lock_depth(&self) -> u32 {
        self.lock_depth
    }

    /// Asks for the network to be evaluated.
    ///
    /// Under the lock or during evaluation the request is deferred. Otherwise
    /// [`NetworkEvent::EvaluationRequested`] is emitted and, with
    /// [`auto_evaluate`](crate::NetworkConfig::auto_evaluate), the network is
    /// evaluated right away.
    pub fn request_evaluation(&mut self) {
        if self.is_locked() || self.evaluating {
            self.evaluation_pending = true;
            return;
        }
        self.evaluation_requests += 1;
        log::trace!("evaluation requested (#{})", self.evaluation_requests);
        self.emit(NetworkEvent::EvaluationRequested);
        if self.config.auto_evaluate {
            self.evaluate();
        }
    }

    /// Number of evaluation requests issued so far.
    #[must_use]
    pub fn evaluation_requests(&self) -> u64 {
        self.evaluation_requests
    }

    /// Whether a request is being held back by the lock or a running
    /// evaluation.
    #[must_use]
    pub fn is_evaluation_pending(&self) -> bool {
        self.evaluation_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_locks_release_once() {
        let mut net = Network::new();
        net.acquire_lock();
        net.acquire_lock();
        net.request_evaluation();
        net.request_evaluation();
        assert_eq!(net.evaluation_requests(), 0);
        net.release_lock();
        assert_eq!(net.evaluation_requests(), 0);
        assert!(net.is_locked());
        net.release_lock();
        assert_eq!(net.evaluation_requests(), 1);
        assert!(!net.is_evaluation_pending());
    }

    #[test]
    fn unbalanced_release_is_ignored() {
        let mut net = Network::new();
        net.release_lock();
        assert_eq!(net.lock_depth(), 0);
    }

    #[test]
    fn batch_returns_value() {
        let mut net = Network::new();
        let depth = net.batch(|net| net.lock_depth());
        assert_eq!(depth, 1);
        assert!(!net.is_locked());
    }
}
