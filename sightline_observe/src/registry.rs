// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Observers`] list and its handles.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

/// Source of every [`ObserverId`], shared by all lists.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Observers::subscribe`].
///
/// Handles are unique process-wide and never reused, so a stale handle or one
/// issued by another list can not remove a subscriber.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Returns the raw sequence number of this handle.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObserverId").field(&self.0).finish()
    }
}

/// Entries captured at the start of a notification pass.
pub type Snapshot<H> = SmallVec<[(ObserverId, H); 4]>;

struct Inner<H> {
    entries: SmallVec<[(ObserverId, H); 2]>,
}

/// An ordered list of observer handles.
///
/// `H` is whatever the owner delivers to: a boxed callback, a weak reference
/// to a widget, and so on. Every method takes `&self`, so an observer may
/// subscribe or unsubscribe (itself or others) while a notification pass over
/// the same list is in flight. Passes deliver in subscription order from a
/// snapshot:
///
/// - an observer removed during the pass is skipped if it has not been reached;
/// - an observer added during the pass is first notified by the next pass;
/// - no observer is delivered to twice in one pass.
///
/// The list is single-threaded (`!Sync`).
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use sightline_observe::Observers;
///
/// let hits = Rc::new(Cell::new(0));
/// let list: Observers<Rc<dyn Fn(&u32)>> = Observers::new();
///
/// let h = hits.clone();
/// let id = list.subscribe(Rc::new(move |v: &u32| h.set(h.get() + *v)));
/// list.notify(&2);
/// list.notify(&3);
/// assert_eq!(hits.get(), 5);
///
/// assert!(list.unsubscribe(id));
/// list.notify(&100);
/// assert_eq!(hits.get(), 5);
/// ```
pub struct Observers<H> {
    inner: RefCell<Inner<H>>,
}

impl<H> Default for Observers<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Observers<H> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                entries: SmallVec::new(),
            }),
        }
    }

    /// Appends `handle` and returns its id.
    pub fn subscribe(&self, handle: H) -> ObserverId {
        let id = ObserverId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        self.inner.borrow_mut().entries.push((id, handle));
        id
    }

    /// Removes the observer with the given id.
    ///
    /// Returns `false` if it was not subscribed (already removed, or issued by
    /// another list).
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.entries.iter().position(|(e, _)| *e == id) {
            Some(index) => {
                inner.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is currently subscribed.
    #[must_use]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.inner.borrow().entries.iter().any(|(e, _)| *e == id)
    }

    /// Number of subscribed observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Removes every observer.
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    /// Keeps only the observers for which `keep` returns `true`.
    pub fn retain(&self, mut keep: impl FnMut(&H) -> bool) {
        self.inner.borrow_mut().entries.retain(|(_, h)| keep(h));
    }
}

impl<H: Clone> Observers<H> {
    /// Returns the current entries in subscription order.
    ///
    /// Callers that cannot hand a closure to [`notify_all`](Self::notify_all)
    /// (for example because delivery needs `&mut` access to the owner of this
    /// list) iterate the snapshot themselves and check
    /// [`contains`](Self::contains) before each delivery.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<H> {
        self.inner.borrow().entries.iter().cloned().collect()
    }

    /// Runs one notification pass, calling `deliver` for each live observer.
    pub fn notify_all(&self, mut deliver: impl FnMut(ObserverId, &H)) {
        for (id, handle) in self.snapshot() {
            if self.contains(id) {
                deliver(id, &handle);
            }
        }
    }
}

/// An observer list of plain event callbacks.
pub type Notifier<E> = Observers<Rc<dyn Fn(&E)>>;

impl<E: ?Sized> Notifier<E> {
    /// Delivers `event` to every subscribed callback.
    pub fn notify(&self, event: &E) {
        self.notify_all(|_, callback| callback(event));
    }
}

impl<H> fmt::Debug for Observers<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observers")
            .field("len", &inner.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::cell::Cell;

    type Callbacks = Observers<Rc<dyn Fn(&())>>;

    #[test]
    fn ids_are_never_reused() {
        let list: Observers<u8> = Observers::new();
        let a = list.subscribe(1);
        assert!(list.unsubscribe(a));
        let b = list.subscribe(2);
        assert_ne!(a, b);
        assert!(!list.unsubscribe(a));
        assert!(list.contains(b));
    }

    #[test]
    fn ids_are_not_shared_between_lists() {
        let first: Observers<u8> = Observers::new();
        let second: Observers<u8> = Observers::new();
        let a = first.subscribe(1);
        let b = second.subscribe(2);
        assert_ne!(a, b);
        assert!(!second.unsubscribe(a));
        assert!(second.contains(b));
        assert!(first.contains(a));
    }

    #[test]
    fn delivery_in_subscription_order() {
        let list: Observers<u8> = Observers::new();
        list.subscribe(3);
        list.subscribe(1);
        list.subscribe(2);
        let mut seen = Vec::new();
        list.notify_all(|_, h| seen.push(*h));
        assert_eq!(seen, [3, 1, 2]);
    }

    #[test]
    fn self_removal_during_pass() {
        let list = Rc::new(Callbacks::new());
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let (l, c, s) = (list.clone(), calls.clone(), slot.clone());
        let id = list.subscribe(Rc::new(move |_: &()| {
            c.set(c.get() + 1);
            if let Some(me) = s.get() {
                l.unsubscribe(me);
            }
        }));
        slot.set(Some(id));

        list.notify(&());
        list.notify(&());
        assert_eq!(calls.get(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn removal_of_later_observer_skips_it() {
        let list = Rc::new(Callbacks::new());
        let second_calls = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let (l, v) = (list.clone(), victim.clone());
        list.subscribe(Rc::new(move |_: &()| {
            if let Some(id) = v.get() {
                l.unsubscribe(id);
            }
        }));
        let sc = second_calls.clone();
        victim.set(Some(
            list.subscribe(Rc::new(move |_: &()| sc.set(sc.get() + 1))),
        ));

        list.notify(&());
        assert_eq!(second_calls.get(), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn added_during_pass_waits_for_next_pass() {
        let list = Rc::new(Callbacks::new());
        let late_calls = Rc::new(Cell::new(0));

        let (l, lc) = (list.clone(), late_calls.clone());
        list.subscribe(Rc::new(move |_: &()| {
            let lc = lc.clone();
            l.subscribe(Rc::new(move |_: &()| lc.set(lc.get() + 1)));
        }));

        list.notify(&());
        assert_eq!(late_calls.get(), 0);
        list.notify(&());
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn retain_prunes_dead_weak_handles() {
        let alive = Rc::new(1_u8);
        let dead = Rc::new(2_u8);
        let list = Observers::new();
        list.subscribe(Rc::downgrade(&alive));
        list.subscribe(Rc::downgrade(&dead));
        drop(dead);
        list.retain(|w| w.strong_count() > 0);
        assert_eq!(list.len(), 1);
    }
}
