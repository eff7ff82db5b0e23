// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Network`] container.

use std::fmt;
use std::rc::Rc;

use sightline_observe::{Notifier, ObserverId};

use crate::arena::Arena;
use crate::attributes::InvalidationLevel;
use crate::config::NetworkConfig;
use crate::id::{PropertyId, ProcessorId};
use crate::link::Link;
use crate::owner::OwnerData;
use crate::port::Connection;
use crate::property::PropertyData;

/// Network-level notifications, see [`Network::observe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    /// Something became invalid and the network should be evaluated.
    ///
    /// Issued at most once per outermost network lock.
    EvaluationRequested,
    /// A processor's invalidation level was raised.
    ProcessorInvalidated {
        /// The processor.
        processor: ProcessorId,
        /// Its new level.
        level: InvalidationLevel,
    },
    /// A processor was processed and is valid again.
    ProcessorEvaluated(ProcessorId),
}

/// Owns every property, property owner and processor of one dataflow network
/// and drives change propagation between them.
///
/// See the [crate documentation](crate) for an overview.
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) properties: Arena<PropertyData>,
    pub(crate) owners: Arena<OwnerData>,
    /// Processors in creation order.
    pub(crate) processors: Vec<ProcessorId>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) links: Vec<Link>,
    pub(crate) lock_depth: u32,
    pub(crate) evaluation_pending: bool,
    pub(crate) evaluating: bool,
    /// The processor whose behavior is running.
    pub(crate) processing: Option<ProcessorId>,
    pub(crate) evaluation_requests: u64,
    /// Link sources currently being propagated.
    pub(crate) active_links: Vec<PropertyId>,
    pub(crate) observers: Notifier<NetworkEvent>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Creates an empty network with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    /// Creates an empty network.
    #[must_use]
    pub fn with_config(config: NetworkConfig) -> Self {
        Self {
            config,
            properties: Arena::new(),
            owners: Arena::new(),
            processors: Vec::new(),
            connections: Vec::new(),
            links: Vec::new(),
            lock_depth: 0,
            evaluation_pending: false,
            evaluating: false,
            processing: None,
            evaluation_requests: 0,
            active_links: Vec::new(),
            observers: Notifier::new(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut NetworkConfig {
        &mut self.config
    }

    /// Number of live properties, attached or not.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Number of live owners, processors included.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Subscribes to network events.
    pub fn observe(&mut self, callback: impl Fn(&NetworkEvent) + 'static) -> ObserverId {
        self.observers.subscribe(Rc::new(callback))
    }

    /// Removes an event subscription.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub(crate) fn emit(&self, event: NetworkEvent) {
        self.observers.notify(&event);
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("config", &self.config)
            .field("properties", &self.properties.len())
            .field("owners", &self.owners.len())
            .field("processors", &self.processors)
            .field("connections", &self.connections)
            .field("links", &self.links)
            .field("lock_depth", &self.lock_depth)
            .field("evaluation_pending", &self.evaluation_pending)
            .field("evaluating", &self.evaluating)
            .finish_non_exhaustive()
    }
}
