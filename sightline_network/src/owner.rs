// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property owner tree: groups, paths and upward invalidation.
//!
//! Every property belongs to at most one owner. Owners are either groups
//! (composite properties) nested inside another owner, or processors at the
//! root of a tree. A property's path is the identifier chain from its
//! processor down to the property itself.

use crate::attributes::{InvalidationLevel, Tracked};
use crate::builder::PropertyBuilder;
use crate::id::{OwnerId, Property, PropertyId, ProcessorId};
use crate::network::Network;
use crate::processor::ProcessorState;
use crate::property::PropertyData;
use crate::value::PropertyValue;

/// An entry in an owner's child list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    /// A property.
    Property(PropertyId),
    /// A nested group.
    Owner(OwnerId),
}

pub(crate) struct OwnerData {
    pub(crate) identifier: String,
    pub(crate) display_name: Tracked<String>,
    pub(crate) parent: Option<OwnerId>,
    pub(crate) children: Vec<Child>,
    pub(crate) level: InvalidationLevel,
    pub(crate) processor: Option<Box<ProcessorState>>,
}

impl OwnerData {
    pub(crate) fn new(identifier: String, display_name: String, parent: Option<OwnerId>) -> Self {
        Self {
            identifier,
            display_name: Tracked::new("displayName", display_name),
            parent,
            children: Vec::new(),
            level: InvalidationLevel::Valid,
            processor: None,
        }
    }
}

// ============================================================================
// Structure
// ============================================================================

impl Network {
    pub(crate) fn owner_data(&self, id: OwnerId) -> Option<&OwnerData> {
        self.owners.get(id.0)
    }

    pub(crate) fn owner_data_mut(&mut self, id: OwnerId) -> Option<&mut OwnerData> {
        self.owners.get_mut(id.0)
    }

    /// Returns `true` if `id` refers to a live owner.
    #[must_use]
    pub fn contains_owner(&self, id: impl Into<OwnerId>) -> bool {
        self.owners.contains(id.into().0)
    }

    /// Whether a child of `owner` other than `except` uses `identifier`.
    pub(crate) fn identifier_taken(
        &self,
        owner: OwnerId,
        identifier: &str,
        except: Option<Child>,
    ) -> bool {
        self.owner_data(owner).is_some_and(|data| {
            data.children
                .iter()
                .filter(|child| Some(**child) != except)
                .any(|child| self.child_identifier(*child) == Some(identifier))
        })
    }

    fn child_identifier(&self, child: Child) -> Option<&str> {
        match child {
            Child::Property(p) => self.property(p).map(|p| p.identifier.as_str()),
            Child::Owner(o) => self.owner_data(o).map(|o| o.identifier.as_str()),
        }
    }

    /// Adds a group (composite property) to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale or already has a child named `identifier`.
    pub fn add_group(
        &mut self,
        parent: impl Into<OwnerId>,
        identifier: impl Into<String>,
        display_name: impl Into<String>,
    ) -> OwnerId {
        let parent = parent.into();
        let identifier = identifier.into();
        assert!(
            self.contains_owner(parent),
            "add_group: stale owner handle {parent:?}"
        );
        assert!(
            !self.identifier_taken(parent, &identifier, None),
            "identifier `{identifier}` already exists in `{}`",
            self.owner_path(parent).join(".")
        );
        let id = OwnerId(self.owners.insert(OwnerData::new(
            identifier,
            display_name.into(),
            Some(parent),
        )));
        if let Some(data) = self.owner_data_mut(parent) {
            data.children.push(Child::Owner(id));
        }
        id
    }

    /// Creates a property and attaches it to `owner`.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is stale or already has a child with the builder's
    /// identifier.
    pub fn add_property<T: PropertyValue>(
        &mut self,
        owner: impl Into<OwnerId>,
        builder: PropertyBuilder<T>,
    ) -> Property<T> {
        let property = self.create_property(builder);
        self.attach_property(owner, property.id());
        property
    }

    /// Creates a property without an owner. Changes to it run callbacks and
    /// update widgets but invalidate nothing until it is attached.
    pub fn create_property<T: PropertyValue>(&mut self, builder: PropertyBuilder<T>) -> Property<T> {
        let data = PropertyData::from_builder(builder, self.config.default_serialization_mode);
        Property::from_id(PropertyId(self.properties.insert(data)))
    }

    /// Attaches an unowned property to `owner`.
    ///
    /// # Panics
    ///
    /// Panics if the property or owner is stale, the property already has an
    /// owner, or the identifier is taken.
    pub fn attach_property(&mut self, owner: impl Into<OwnerId>, property: impl Into<PropertyId>) {
        let owner = owner.into();
        let property = property.into();
        assert!(
            self.contains_owner(owner),
            "attach_property: stale owner handle {owner:?}"
        );
        let Some(data) = self.property(property) else {
            panic!("attach_property: stale property handle {property:?}");
        };
        assert!(
            data.owner.is_none(),
            "property `{}` already has an owner",
            data.identifier
        );
        assert!(
            !self.identifier_taken(owner, &data.identifier, None),
            "identifier `{}` already exists in `{}`",
            data.identifier,
            self.owner_path(owner).join(".")
        );
        if let Some(data) = self.property_mut(property) {
            data.owner = Some(owner);
        }
        if let Some(data) = self.owner_data_mut(owner) {
            data.children.push(Child::Property(property));
        }
    }

    /// Detaches a property from its owner and returns the former owner.
    ///
    /// The property stays alive and keeps its value. Stale handles return
    /// `None`.
    ///
    /// # Panics
    ///
    /// Panics if the property is live but has no owner.
    pub fn detach_property(&mut self, property: impl Into<PropertyId>) -> Option<OwnerId> {
        let property = property.into();
        let Some(data) = self.property_mut(property) else {
            log::warn!("detach_property: stale property handle {property:?}");
            return None;
        };
        let Some(owner) = data.owner.take() else {
            panic!("property `{}` is not attached to an owner", data.identifier);
        };
        if let Some(data) = self.owner_data_mut(owner) {
            data.children.retain(|c| *c != Child::Property(property));
        }
        Some(owner)
    }

    /// Removes a property, detaching it and dropping its links. Returns
    /// `false` for a stale handle.
    pub fn remove_property(&mut self, property: impl Into<PropertyId>) -> bool {
        let property = property.into();
        let Some(data) = self.properties.remove(property.0) else {
            return false;
        };
        if let Some(owner) = data.owner
            && let Some(owner) = self.owner_data_mut(owner)
        {
            owner.children.retain(|c| *c != Child::Property(property));
        }
        self.links
            .retain(|l| l.source != property && l.destination != property);
        true
    }

    /// Removes every child of a group (or processor) recursively.
    pub fn clear_group(&mut self, owner: impl Into<OwnerId>) {
        let owner = owner.into();
        let children = self
            .owner_data_mut(owner)
            .map(|data| core::mem::take(&mut data.children))
            .unwrap_or_default();
        for child in children {
            match child {
                Child::Property(p) => {
                    if let Some(data) = self.property_mut(p) {
                        data.owner = None;
                    }
                    self.remove_property(p);
                }
                Child::Owner(o) => {
                    if let Some(data) = self.owner_data_mut(o) {
                        data.parent = None;
                    }
                    self.remove_owner(o);
                }
            }
        }
    }

    /// Removes an owner together with everything below it.
    ///
    /// Removing a processor also drops its connections. Returns `false` for a
    /// stale handle.
    pub fn remove_owner(&mut self, owner: impl Into<OwnerId>) -> bool {
        let owner = owner.into();
        if !self.contains_owner(owner) {
            return false;
        }
        self.clear_group(owner);
        let Some(data) = self.owners.remove(owner.0) else {
            return false;
        };
        if let Some(parent) = data.parent
            && let Some(parent) = self.owner_data_mut(parent)
        {
            parent.children.retain(|c| *c != Child::Owner(owner));
        }
        if data.processor.is_some() {
            let processor = ProcessorId(owner);
            self.processors.retain(|p| *p != processor);
            self.connections.retain(|c| {
                c.outport.processor != processor && c.inport.processor != processor
            });
            log::debug!("removed processor `{}`", data.identifier);
        }
        true
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Network {
    /// Owner of a property.
    #[must_use]
    pub fn owner(&self, property: impl Into<PropertyId>) -> Option<OwnerId> {
        self.property(property.into())?.owner
    }

    /// Parent of a group; `None` for processors and stale handles.
    #[must_use]
    pub fn parent(&self, owner: impl Into<OwnerId>) -> Option<OwnerId> {
        self.owner_data(owner.into())?.parent
    }

    /// Children of an owner in insertion order.
    #[must_use]
    pub fn children(&self, owner: impl Into<OwnerId>) -> &[Child] {
        self.owner_data(owner.into())
            .map(|data| data.children.as_slice())
            .unwrap_or_default()
    }

    /// Properties directly owned by `owner`, in insertion order.
    pub fn properties_of(&self, owner: impl Into<OwnerId>) -> impl Iterator<Item = PropertyId> + '_ {
        self.children(owner).iter().filter_map(|child| match child {
            Child::Property(p) => Some(*p),
            Child::Owner(_) => None,
        })
    }

    /// Identifier of an owner.
    #[must_use]
    pub fn owner_identifier(&self, owner: impl Into<OwnerId>) -> Option<&str> {
        self.owner_data(owner.into()).map(|o| o.identifier.as_str())
    }

    /// Display name of an owner.
    #[must_use]
    pub fn owner_display_name(&self, owner: impl Into<OwnerId>) -> Option<&str> {
        self.owner_data(owner.into())
            .map(|o| o.display_name.value().as_str())
    }

    /// Sets the display name of an owner.
    pub fn set_owner_display_name(&mut self, owner: impl Into<OwnerId>, name: impl Into<String>) {
        if let Some(data) = self.owner_data_mut(owner.into()) {
            data.display_name.set(name.into());
        }
    }

    /// Identifier path of a property, processor first.
    ///
    /// An unattached property's path is just its own identifier.
    #[must_use]
    pub fn path(&self, property: impl Into<PropertyId>) -> Vec<String> {
        let Some(data) = self.property(property.into()) else {
            return Vec::new();
        };
        let mut path = data.owner.map(|o| self.owner_path(o)).unwrap_or_default();
        path.push(data.identifier.clone());
        path
    }

    /// Identifier path of an owner, processor first.
    #[must_use]
    pub fn owner_path(&self, owner: impl Into<OwnerId>) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(owner.into());
        while let Some(id) = current {
            let Some(data) = self.owner_data(id) else {
                break;
            };
            path.push(data.identifier.clone());
            current = data.parent;
        }
        path.reverse();
        path
    }

    /// Resolves an owner path produced by [`owner_path`](Self::owner_path).
    #[must_use]
    pub fn find_owner<S: AsRef<str>>(&self, path: &[S]) -> Option<OwnerId> {
        let (root, rest) = path.split_first()?;
        let mut current = self.find_processor(root.as_ref())?.owner();
        for segment in rest {
            current = self.children(current).iter().find_map(|child| match child {
                Child::Owner(o) if self.owner_identifier(*o) == Some(segment.as_ref()) => Some(*o),
                _ => None,
            })?;
        }
        Some(current)
    }

    /// Resolves a property path produced by [`path`](Self::path).
    #[must_use]
    pub fn find_property<S: AsRef<str>>(&self, path: &[S]) -> Option<PropertyId> {
        let (last, owner_path) = path.split_last()?;
        let owner = self.find_owner(owner_path)?;
        self.properties_of(owner)
            .find(|p| self.identifier(*p) == Some(last.as_ref()))
    }

    /// The processor at the root of `owner`'s tree.
    #[must_use]
    pub fn processor_of_owner(&self, owner: impl Into<OwnerId>) -> Option<ProcessorId> {
        let mut current = owner.into();
        loop {
            let data = self.owner_data(current)?;
            if data.processor.is_some() {
                return Some(ProcessorId(current));
            }
            current = data.parent?;
        }
    }

    /// The processor a property ultimately belongs to.
    #[must_use]
    pub fn processor_of(&self, property: impl Into<PropertyId>) -> Option<ProcessorId> {
        self.processor_of_owner(self.owner(property)?)
    }

    /// Accumulated invalidation level of an owner.
    #[must_use]
    pub fn owner_invalidation_level(&self, owner: impl Into<OwnerId>) -> InvalidationLevel {
        self.owner_data(owner.into())
            .map_or(InvalidationLevel::Valid, |o| o.level)
    }

    /// Raises the level of `owner` and every ancestor up to the processor,
    /// which is then [invalidated](Self::invalidate).
    ///
    /// `source` names the property that caused the invalidation, if any.
    pub fn invalidate_owner(
        &mut self,
        owner: impl Into<OwnerId>,
        level: InvalidationLevel,
        source: Option<PropertyId>,
    ) {
        let mut current = Some(owner.into());
        while let Some(id) = current {
            let Some(data) = self.owner_data_mut(id) else {
                return;
            };
            if data.processor.is_some() {
                log::trace!("invalidating `{}` ({level:?}) from {source:?}", data.identifier);
                self.invalidate(ProcessorId(id), level);
                return;
            }
            data.level = data.level.max(level);
            current = data.parent;
        }
    }

    /// Marks an owner tree valid and clears the modified flags of its
    /// properties.
    pub(crate) fn set_owner_valid(&mut self, owner: OwnerId) {
        let Some(data) = self.owner_data_mut(owner) else {
            return;
        };
        data.level = InvalidationLevel::Valid;
        let children = data.children.clone();
        for child in children {
            match child {
                Child::Property(p) => self.set_property_modified(p, false),
                Child::Owner(o) => self.set_owner_valid(o),
            }
        }
    }
}
