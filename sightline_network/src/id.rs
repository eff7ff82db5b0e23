// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle types.
//!
//! [`PropertyId`], [`OwnerId`] and [`ProcessorId`] are generational handles into
//! a [`Network`](crate::Network): they stay valid while the entry lives and go
//! stale (without ever aliasing a newer entry) once it is removed.
//! [`Property<T>`] adds the value type of a property for compile-time checked
//! access.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use crate::arena::Key;

/// Runtime handle of a property.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(pub(crate) Key);

/// Runtime handle of a property owner: a group or a processor.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(pub(crate) Key);

/// Handle of an owner that is known to be a processor.
///
/// Every processor is also an owner; use [`ProcessorId::owner`] (or `into()`)
/// wherever an [`OwnerId`] is expected.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessorId(pub(crate) OwnerId);

impl ProcessorId {
    /// The owner handle of this processor.
    #[must_use]
    #[inline]
    pub const fn owner(self) -> OwnerId {
        self.0
    }
}

impl From<ProcessorId> for OwnerId {
    #[inline]
    fn from(id: ProcessorId) -> Self {
        id.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({:?})", self.0)
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({:?})", self.0)
    }
}

impl fmt::Debug for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessorId({:?})", self.0.0)
    }
}

/// A typed property handle.
///
/// This wraps a [`PropertyId`] with a phantom type parameter `T` naming the
/// value type, so [`Network::get`](crate::Network::get) and
/// [`Network::set`](crate::Network::set) are checked at compile time:
///
/// ```rust
/// use sightline_network::{Network, ProcessorInfo, PropertyBuilder};
///
/// let mut net = Network::new();
/// let p = net.add_processor("p", ProcessorInfo::new("org.example.P", "P"));
/// let iso = net.add_property(p, PropertyBuilder::new("iso", "Iso Value", 0.5_f64));
///
/// net.set(iso, 0.75);
/// assert_eq!(net.get(iso), Some(&0.75));
/// // net.set(iso, "not a number"); // Would not compile!
/// ```
///
/// `Property<T>` is the same size as [`PropertyId`].
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    pub(crate) const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped handle.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> From<Property<T>> for PropertyId {
    #[inline]
    fn from(property: Property<T>) -> Self {
        property.id
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn property_id_debug() {
        let mut arena = Arena::new();
        let id = PropertyId(arena.insert(()));
        assert_eq!(format!("{id:?}"), "PropertyId(0v1)");
    }

    #[test]
    fn processor_id_is_an_owner() {
        let mut arena = Arena::new();
        let owner = OwnerId(arena.insert(()));
        let processor = ProcessorId(owner);
        assert_eq!(OwnerId::from(processor), owner);
        assert_eq!(processor.owner(), owner);
        assert_eq!(format!("{processor:?}"), "ProcessorId(0v1)");
    }

    #[test]
    fn property_copy_and_size() {
        let mut arena = Arena::new();
        let prop: Property<f64> = Property::from_id(PropertyId(arena.insert(())));
        let copy = prop;
        assert_eq!(prop, copy);
        assert_eq!(PropertyId::from(prop), copy.id());
        assert_eq!(
            size_of::<Property<String>>(),
            size_of::<PropertyId>()
        );
    }
}
