// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Processors: the evaluated nodes of a network.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use hashbrown::HashSet;
use sightline_observe::{ObserverId, Observers};

use crate::attributes::InvalidationLevel;
use crate::id::{OwnerId, ProcessorId, PropertyId};
use crate::network::{Network, NetworkEvent};
use crate::owner::OwnerData;
use crate::port::{Inport, Outport};

/// Maturity of a processor implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CodeState {
    /// Known not to work.
    Broken,
    /// Works, but may change.
    #[default]
    Experimental,
    /// Production quality.
    Stable,
    /// Scheduled for removal.
    Deprecated,
}

bitflags! {
    /// Where a processor does its work.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ProcessorTags: u8 {
        /// Runs on the CPU.
        const CPU = 1 << 0;
        /// Uses OpenGL.
        const GL = 1 << 1;
        /// Uses OpenCL.
        const CL = 1 << 2;
        /// Implemented in Python.
        const PY = 1 << 3;
    }
}

/// Static description of a processor class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorInfo {
    /// Unique class identifier, written as the `type` of the processor record.
    pub class_identifier: String,
    /// Human-readable class name.
    pub display_name: String,
    /// Menu category.
    pub category: String,
    /// Maturity.
    pub code_state: CodeState,
    /// Execution tags.
    pub tags: ProcessorTags,
}

impl ProcessorInfo {
    /// Describes an experimental processor class without category or tags.
    #[must_use]
    pub fn new(class_identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            class_identifier: class_identifier.into(),
            display_name: display_name.into(),
            category: String::new(),
            code_state: CodeState::default(),
            tags: ProcessorTags::empty(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the code state.
    #[must_use]
    pub fn code_state(mut self, code_state: CodeState) -> Self {
        self.code_state = code_state;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn tags(mut self, tags: ProcessorTags) -> Self {
        self.tags = tags;
        self
    }
}

/// Behavior attached to a processor with [`Network::set_behavior`].
///
/// The behavior is taken out of the network while it runs, so
/// [`Network::behavior`] returns `None` for the running processor.
pub trait Process: Any {
    /// Recomputes the processor's outputs from its inputs and properties.
    fn process(&mut self, network: &mut Network, processor: ProcessorId);

    /// Extra readiness condition on top of connected, filled inports.
    fn is_ready(&self, network: &Network, processor: ProcessorId) -> bool {
        let _ = (network, processor);
        true
    }

    /// Called once after the processor's state was loaded by
    /// [`Network::deserialize`](crate::Network::deserialize).
    fn deserialized(&mut self, network: &mut Network, processor: ProcessorId) {
        let _ = (network, processor);
    }
}

pub(crate) type PropertyChangeCallback = Rc<dyn Fn(ProcessorId, Option<PropertyId>)>;

pub(crate) struct ProcessorState {
    pub(crate) info: ProcessorInfo,
    pub(crate) inports: Vec<Inport>,
    pub(crate) outports: Vec<Outport>,
    pub(crate) behavior: Option<Box<dyn Process>>,
    pub(crate) property_observers: Observers<PropertyChangeCallback>,
}

impl fmt::Debug for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorState")
            .field("info", &self.info)
            .field("inports", &self.inports.len())
            .field("outports", &self.outports.len())
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}

impl Network {
    pub(crate) fn processor_state(&self, id: ProcessorId) -> Option<&ProcessorState> {
        self.owner_data(id.owner())?.processor.as_deref()
    }

    pub(crate) fn processor_state_mut(&mut self, id: ProcessorId) -> Option<&mut ProcessorState> {
        self.owner_data_mut(id.owner())?.processor.as_deref_mut()
    }

    /// Adds a processor at the top level of the network.
    ///
    /// New processors start out [`InvalidResources`](InvalidationLevel::InvalidResources)
    /// and an evaluation is requested.
    ///
    /// # Panics
    ///
    /// Panics if another processor already uses `identifier`.
    pub fn add_processor(&mut self, identifier: impl Into<String>, info: ProcessorInfo) -> ProcessorId {
        let identifier = identifier.into();
        assert!(
            self.find_processor(&identifier).is_none(),
            "a processor named `{identifier}` already exists"
        );
        log::debug!("adding processor `{identifier}` ({})", info.class_identifier);
        let mut data = OwnerData::new(identifier, info.display_name.clone(), None);
        data.level = InvalidationLevel::InvalidResources;
        data.processor = Some(Box::new(ProcessorState {
            info,
            inports: Vec::new(),
            outports: Vec::new(),
            behavior: None,
            property_observers: Observers::new(),
        }));
        let id = ProcessorId(OwnerId(self.owners.insert(data)));
        self.processors.push(id);
        self.request_evaluation();
        id
    }

    /// Sets the behavior run by [`evaluate`](Self::evaluate).
    pub fn set_behavior(&mut self, processor: ProcessorId, behavior: impl Process) {
        match self.processor_state_mut(processor) {
            Some(state) => state.behavior = Some(Box::new(behavior)),
            None => log::warn!("set_behavior: stale processor handle {processor:?}"),
        }
    }

    /// Downcasts the processor's behavior.
    #[must_use]
    pub fn behavior<P: Process>(&self, processor: ProcessorId) -> Option<&P> {
        let behavior: &dyn Any = self.processor_state(processor)?.behavior.as_deref()?;
        behavior.downcast_ref()
    }

    /// Mutable [`behavior`](Self::behavior).
    #[must_use]
    pub fn behavior_mut<P: Process>(&mut self, processor: ProcessorId) -> Option<&mut P> {
        let behavior: &mut dyn Any = self.processor_state_mut(processor)?.behavior.as_deref_mut()?;
        behavior.downcast_mut()
    }

    /// Class description of a processor.
    #[must_use]
    pub fn processor_info(&self, processor: ProcessorId) -> Option<&ProcessorInfo> {
        self.processor_state(processor).map(|s| &s.info)
    }

    /// Live processors in creation order.
    #[must_use]
    pub fn processors(&self) -> &[ProcessorId] {
        &self.processors
    }

    /// Looks up a processor by identifier.
    #[must_use]
    pub fn find_processor(&self, identifier: &str) -> Option<ProcessorId> {
        self.processors
            .iter()
            .copied()
            .find(|p| self.owner_identifier(*p) == Some(identifier))
    }

    /// Returns `true` if `processor` is live.
    #[must_use]
    pub fn contains_processor(&self, processor: ProcessorId) -> bool {
        self.processor_state(processor).is_some()
    }

    /// Current invalidation level; [`Valid`](InvalidationLevel::Valid) for
    /// stale handles.
    #[must_use]
    pub fn invalidation_level(&self, processor: ProcessorId) -> InvalidationLevel {
        self.owner_invalidation_level(processor)
    }

    /// Raises a processor's invalidation level and requests evaluation.
    ///
    /// Processors downstream of it become at least
    /// [`InvalidOutput`](InvalidationLevel::InvalidOutput). Invalidating the
    /// processor that is currently being processed has no effect, since it
    /// is about to become valid.
    pub fn invalidate(&mut self, processor: ProcessorId, level: InvalidationLevel) {
        if level == InvalidationLevel::Valid {
            return;
        }
        if self.processing == Some(processor) {
            log::trace!("ignoring invalidation of {processor:?} while it is processed");
            return;
        }
        if !self.raise_level(processor, level) && !self.contains_processor(processor) {
            log::warn!("invalidate: stale processor handle {processor:?}");
            return;
        }
        for downstream in self.downstream(processor) {
            if self.processing != Some(downstream) {
                self.raise_level(downstream, InvalidationLevel::InvalidOutput);
            }
        }
        self.request_evaluation();
    }

    /// Raises the level, emitting an event if it went up.
    fn raise_level(&mut self, processor: ProcessorId, level: InvalidationLevel) -> bool {
        let Some(data) = self.owner_data_mut(processor.owner()) else {
            return false;
        };
        if data.processor.is_none() || level <= data.level {
            return false;
        }
        data.level = level;
        self.emit(NetworkEvent::ProcessorInvalidated { processor, level });
        true
    }

    /// Subscribes to property changes of a processor's properties.
    ///
    /// The callback gets `Some(property)` for value modifications and `None`
    /// for attribute changes such as a new display name.
    pub fn on_property_change(
        &mut self,
        processor: ProcessorId,
        callback: impl Fn(ProcessorId, Option<PropertyId>) + 'static,
    ) -> Option<ObserverId> {
        let state = self.processor_state(processor)?;
        Some(state.property_observers.subscribe(Rc::new(callback)))
    }

    /// Removes a property-change subscription.
    pub fn remove_property_change_observer(
        &mut self,
        processor: ProcessorId,
        observer: ObserverId,
    ) -> bool {
        self.processor_state(processor)
            .is_some_and(|s| s.property_observers.unsubscribe(observer))
    }

    pub(crate) fn notify_property_change(&self, processor: ProcessorId, property: Option<PropertyId>) {
        if let Some(state) = self.processor_state(processor) {
            state
                .property_observers
                .notify_all(|_, callback| callback(processor, property));
        }
    }

    /// Whether the processor can be processed: every required inport is
    /// connected to an outport holding data, and the behavior agrees.
    #[must_use]
    pub fn is_ready(&self, processor: ProcessorId) -> bool {
        let Some(state) = self.processor_state(processor) else {
            return false;
        };
        let inports_ready = (0..state.inports.len()).all(|index| {
            state.inports[index].optional || self.has_input_at(processor, index)
        });
        inports_ready
            && state
                .behavior
                .as_ref()
                .is_none_or(|b| b.is_ready(self, processor))
    }

    /// Every processor reachable downstream through connections, in creation
    /// order.
    #[must_use]
    pub fn downstream(&self, processor: ProcessorId) -> Vec<ProcessorId> {
        let mut seen = HashSet::new();
        let mut stack = vec![processor];
        while let Some(current) = stack.pop() {
            for connection in &self.connections {
                if connection.outport.processor == current && seen.insert(connection.inport.processor)
                {
                    stack.push(connection.inport.processor);
                }
            }
        }
        self.processors
            .iter()
            .copied()
            .filter(|p| seen.contains(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn new_processor_requests_evaluation() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        assert_eq!(net.invalidation_level(p), InvalidationLevel::InvalidResources);
        assert_eq!(net.evaluation_requests(), 1);
        assert_eq!(net.processors(), [p]);
        assert_eq!(net.find_processor("p"), Some(p));
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn duplicate_processor_identifier_panics() {
        let mut net = Network::new();
        net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        net.add_processor("p", ProcessorInfo::new("org.test.Q", "Q"));
    }

    #[test]
    fn info_builder() {
        let info = ProcessorInfo::new("org.test.P", "P")
            .category("Volume Operation")
            .code_state(CodeState::Stable)
            .tags(ProcessorTags::CPU | ProcessorTags::GL);
        assert_eq!(info.category, "Volume Operation");
        assert!(info.tags.contains(ProcessorTags::GL));
        assert_eq!(ProcessorInfo::new("a", "b").code_state, CodeState::Experimental);
    }

    #[test]
    fn invalidation_keeps_the_maximum() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        net.evaluate();
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        net.observe(move |event| e.borrow_mut().push(*event));

        net.invalidate(p, InvalidationLevel::InvalidResources);
        net.invalidate(p, InvalidationLevel::InvalidOutput);
        assert_eq!(net.invalidation_level(p), InvalidationLevel::InvalidResources);
        assert_eq!(
            events
                .borrow()
                .iter()
                .filter(|e| matches!(e, NetworkEvent::ProcessorInvalidated { .. }))
                .count(),
            1
        );
    }

    struct Counter(u32);

    impl Process for Counter {
        fn process(&mut self, _: &mut Network, _: ProcessorId) {
            self.0 += 1;
        }
    }

    #[test]
    fn behavior_downcast() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        net.set_behavior(p, Counter(0));
        net.evaluate();
        assert_eq!(net.behavior::<Counter>(p).map(|c| c.0), Some(1));
        net.behavior_mut::<Counter>(p).unwrap().0 = 10;
        assert_eq!(net.behavior::<Counter>(p).map(|c| c.0), Some(10));
    }
}
