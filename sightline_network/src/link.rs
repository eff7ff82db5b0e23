// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property links: value propagation between properties of different
//! processors.

use crate::error::NetworkError;
use crate::id::PropertyId;
use crate::network::Network;

/// A one-way link copying the source's value to the destination whenever the
/// source is modified.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    /// Property whose changes are propagated.
    pub source: PropertyId,
    /// Property receiving the value.
    pub destination: PropertyId,
}

impl Network {
    /// Links `source` to `destination`. Adding an existing link is a no-op.
    ///
    /// Links only fire for properties owned by a processor.
    ///
    /// # Errors
    ///
    /// Fails if either property is stale, both are the same property, or
    /// their value types differ.
    pub fn add_link(
        &mut self,
        source: impl Into<PropertyId>,
        destination: impl Into<PropertyId>,
    ) -> Result<(), NetworkError> {
        let source = source.into();
        let destination = destination.into();
        let from = self
            .property(source)
            .ok_or(NetworkError::StaleProperty(source))?;
        let to = self
            .property(destination)
            .ok_or(NetworkError::StaleProperty(destination))?;
        if source == destination {
            return Err(NetworkError::SelfLink(source));
        }
        if from.value.type_id() != to.value.type_id() {
            return Err(NetworkError::LinkTypeMismatch {
                from: from.value.type_name(),
                to: to.value.type_name(),
            });
        }
        let link = Link {
            source,
            destination,
        };
        if !self.links.contains(&link) {
            self.links.push(link);
        }
        Ok(())
    }

    /// Links two properties in both directions.
    ///
    /// # Errors
    ///
    /// See [`add_link`](Self::add_link).
    pub fn add_bidirectional_link(
        &mut self,
        a: impl Into<PropertyId>,
        b: impl Into<PropertyId>,
    ) -> Result<(), NetworkError> {
        let (a, b) = (a.into(), b.into());
        self.add_link(a, b)?;
        self.add_link(b, a)
    }

    /// Removes a link; returns `false` if it did not exist.
    pub fn remove_link(
        &mut self,
        source: impl Into<PropertyId>,
        destination: impl Into<PropertyId>,
    ) -> bool {
        let link = Link {
            source: source.into(),
            destination: destination.into(),
        };
        let before = self.links.len();
        self.links.retain(|l| *l != link);
        self.links.len() != before
    }

    /// All links in creation order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Whether `source` is linked to `destination`.
    #[must_use]
    pub fn is_linked(
        &self,
        source: impl Into<PropertyId>,
        destination: impl Into<PropertyId>,
    ) -> bool {
        let link = Link {
            source: source.into(),
            destination: destination.into(),
        };
        self.links.contains(&link)
    }

    /// Copies the value of `source` to every linked destination.
    ///
    /// Properties already being propagated are skipped, so link cycles settle
    /// after one round.
    pub(crate) fn evaluate_links_from(&mut self, source: PropertyId) {
        if self.active_links.contains(&source) {
            return;
        }
        let destinations: Vec<PropertyId> = self
            .links
            .iter()
            .filter(|l| l.source == source && !self.active_links.contains(&l.destination))
            .map(|l| l.destination)
            .collect();
        if destinations.is_empty() {
            return;
        }
        self.active_links.push(source);
        for destination in destinations {
            let Some(value) = self.get_erased(source).map(|v| v.clone_value()) else {
                break;
            };
            self.set_erased(destination, value);
        }
        self.active_links.retain(|p| *p != source);
    }
}

#[cfg(test)]
mod tests {
    use crate::{InvalidationLevel, Network, NetworkError, ProcessorInfo, PropertyBuilder};

    #[test]
    fn link_propagates_and_invalidates_destination() {
        let mut net = Network::new();
        let a = net.add_processor("a", ProcessorInfo::new("org.test.A", "A"));
        let b = net.add_processor("b", ProcessorInfo::new("org.test.B", "B"));
        let x = net.add_property(a, PropertyBuilder::new("x", "X", 0.0_f32));
        let y = net.add_property(b, PropertyBuilder::new("y", "Y", 0.0_f32));
        net.evaluate();

        net.add_link(x, y).unwrap();
        net.set(x, 3.0);
        assert_eq!(net.get(y), Some(&3.0));
        assert_eq!(net.invalidation_level(b), InvalidationLevel::InvalidOutput);

        net.set(y, 4.0);
        assert_eq!(net.get(x), Some(&3.0));
    }

    #[test]
    fn bidirectional_links_settle() {
        let mut net = Network::new();
        let a = net.add_processor("a", ProcessorInfo::new("org.test.A", "A"));
        let b = net.add_processor("b", ProcessorInfo::new("org.test.B", "B"));
        let x = net.add_property(a, PropertyBuilder::new("x", "X", 0_i32));
        let y = net.add_property(b, PropertyBuilder::new("y", "Y", 0_i32));
        net.add_bidirectional_link(x, y).unwrap();
        net.set(y, 5);
        assert_eq!(net.get(x), Some(&5));
        net.set(x, 6);
        assert_eq!(net.get(y), Some(&6));
        assert_eq!(net.links().len(), 2);
    }

    #[test]
    fn link_errors() {
        let mut net = Network::new();
        let a = net.add_processor("a", ProcessorInfo::new("org.test.A", "A"));
        let x = net.add_property(a, PropertyBuilder::new("x", "X", 0_i32));
        let s = net.add_property(a, PropertyBuilder::new("s", "S", String::new()));
        assert!(matches!(net.add_link(x, x), Err(NetworkError::SelfLink(_))));
        assert!(matches!(
            net.add_link(x, s),
            Err(NetworkError::LinkTypeMismatch { .. })
        ));
        net.remove_property(s);
        assert!(matches!(
            net.add_link(x, s),
            Err(NetworkError::StaleProperty(_))
        ));
    }

    #[test]
    fn removing_property_drops_links() {
        let mut net = Network::new();
        let a = net.add_processor("a", ProcessorInfo::new("org.test.A", "A"));
        let x = net.add_property(a, PropertyBuilder::new("x", "X", 0_i32));
        let y = net.add_property(a, PropertyBuilder::new("y", "Y", 0_i32));
        net.add_link(x, y).unwrap();
        assert!(net.is_linked(x, y));
        net.remove_property(y);
        assert!(net.links().is_empty());
        assert!(!net.remove_link(x, y));
    }
}
