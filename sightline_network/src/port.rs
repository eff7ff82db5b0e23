// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed ports and the connections between them.
//!
//! An outport holds the latest data its processor produced; an inport reads
//! the data of the single outport it is connected to. Port data is shared
//! through `Rc`, so reading an input never copies it.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use std::any::{Any, TypeId};
use std::rc::Rc;

use sightline_observe::{ObserverId, Observers};

use crate::attributes::InvalidationLevel;
use crate::error::NetworkError;
use crate::id::ProcessorId;
use crate::network::Network;
use crate::property::ChangeCallback;

/// Untyped reference to a port: the processor and the port's index among the
/// processor's inports or outports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortRef {
    /// Processor owning the port.
    pub processor: ProcessorId,
    /// Index among the processor's ports of the same direction.
    pub index: usize,
}

/// A connection from an outport to an inport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Producing end.
    pub outport: PortRef,
    /// Consuming end.
    pub inport: PortRef,
}

macro_rules! port_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            port: PortRef,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            const fn new(port: PortRef) -> Self {
                Self {
                    port,
                    _marker: PhantomData,
                }
            }

            /// The untyped port reference.
            #[must_use]
            #[inline]
            pub const fn port(self) -> PortRef {
                self.port
            }

            /// The owning processor.
            #[must_use]
            #[inline]
            pub const fn processor(self) -> ProcessorId {
                self.port.processor
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> Clone for $name<T> {
            #[inline]
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> PartialEq for $name<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.port == other.port
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> Hash for $name<T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.port.hash(state);
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("port", &self.port)
                    .field("type", &core::any::type_name::<T>())
                    .finish()
            }
        }
    };
}

port_key! {
    /// Typed handle of an inport receiving `T`.
    InportKey
}

port_key! {
    /// Typed handle of an outport producing `T`.
    OutportKey
}

pub(crate) struct Inport {
    pub(crate) identifier: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) optional: bool,
    pub(crate) changed: bool,
    pub(crate) on_change: Observers<ChangeCallback>,
}

pub(crate) struct Outport {
    pub(crate) identifier: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) data: Option<Rc<dyn Any>>,
}

impl Network {
    fn inport(&self, port: PortRef) -> Option<&Inport> {
        self.processor_state(port.processor)?.inports.get(port.index)
    }

    fn inport_mut(&mut self, port: PortRef) -> Option<&mut Inport> {
        self.processor_state_mut(port.processor)?
            .inports
            .get_mut(port.index)
    }

    fn outport(&self, port: PortRef) -> Option<&Outport> {
        self.processor_state(port.processor)?.outports.get(port.index)
    }

    fn outport_mut(&mut self, port: PortRef) -> Option<&mut Outport> {
        self.processor_state_mut(port.processor)?
            .outports
            .get_mut(port.index)
    }

    fn push_inport<T: 'static>(
        &mut self,
        processor: ProcessorId,
        identifier: String,
        optional: bool,
    ) -> InportKey<T> {
        let Some(state) = self.processor_state_mut(processor) else {
            panic!("add_inport: stale processor handle {processor:?}");
        };
        assert!(
            state.inports.iter().all(|p| p.identifier != identifier),
            "inport `{identifier}` already exists"
        );
        state.inports.push(Inport {
            identifier,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            optional,
            changed: false,
            on_change: Observers::new(),
        });
        InportKey::new(PortRef {
            processor,
            index: state.inports.len() - 1,
        })
    }

    /// Adds a required inport. The processor is not ready until it is
    /// connected to an outport holding data.
    ///
    /// # Panics
    ///
    /// Panics on a stale processor or a duplicate inport identifier.
    pub fn add_inport<T: 'static>(
        &mut self,
        processor: ProcessorId,
        identifier: impl Into<String>,
    ) -> InportKey<T> {
        self.push_inport(processor, identifier.into(), false)
    }

    /// Adds an inport that does not gate readiness.
    ///
    /// # Panics
    ///
    /// Panics on a stale processor or a duplicate inport identifier.
    pub fn add_optional_inport<T: 'static>(
        &mut self,
        processor: ProcessorId,
        identifier: impl Into<String>,
    ) -> InportKey<T> {
        self.push_inport(processor, identifier.into(), true)
    }

    /// Adds an outport.
    ///
    /// # Panics
    ///
    /// Panics on a stale processor or a duplicate outport identifier.
    pub fn add_outport<T: 'static>(
        &mut self,
        processor: ProcessorId,
        identifier: impl Into<String>,
    ) -> OutportKey<T> {
        let identifier = identifier.into();
        let Some(state) = self.processor_state_mut(processor) else {
            panic!("add_outport: stale processor handle {processor:?}");
        };
        assert!(
            state.outports.iter().all(|p| p.identifier != identifier),
            "outport `{identifier}` already exists"
        );
        state.outports.push(Outport {
            identifier,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            data: None,
        });
        OutportKey::new(PortRef {
            processor,
            index: state.outports.len() - 1,
        })
    }

    /// Looks up an inport by identifier.
    #[must_use]
    pub fn find_inport(&self, processor: ProcessorId, identifier: &str) -> Option<PortRef> {
        let index = self
            .processor_state(processor)?
            .inports
            .iter()
            .position(|p| p.identifier == identifier)?;
        Some(PortRef { processor, index })
    }

    /// Looks up an outport by identifier.
    #[must_use]
    pub fn find_outport(&self, processor: ProcessorId, identifier: &str) -> Option<PortRef> {
        let index = self
            .processor_state(processor)?
            .outports
            .iter()
            .position(|p| p.identifier == identifier)?;
        Some(PortRef { processor, index })
    }

    /// Identifier of an inport.
    #[must_use]
    pub fn inport_identifier(&self, port: PortRef) -> Option<&str> {
        self.inport(port).map(|p| p.identifier.as_str())
    }

    /// Identifier of an outport.
    #[must_use]
    pub fn outport_identifier(&self, port: PortRef) -> Option<&str> {
        self.outport(port).map(|p| p.identifier.as_str())
    }

    /// Connects two typed ports, see [`connect_ports`](Self::connect_ports).
    pub fn connect<T: 'static>(
        &mut self,
        outport: OutportKey<T>,
        inport: InportKey<T>,
    ) -> Result<(), NetworkError> {
        self.connect_ports(outport.port(), inport.port())
    }

    /// Connects an outport to an inport.
    ///
    /// The receiving processor is invalidated and its inport is flagged as
    /// changed.
    ///
    /// # Errors
    ///
    /// Fails if either port does not exist, the data types differ, the inport
    /// is already connected, or the connection would close a cycle.
    pub fn connect_ports(&mut self, outport: PortRef, inport: PortRef) -> Result<(), NetworkError> {
        let out = self.outport(outport).ok_or(NetworkError::StalePort(outport))?;
        let inp = self.inport(inport).ok_or(NetworkError::StalePort(inport))?;
        if out.type_id != inp.type_id {
            return Err(NetworkError::PortTypeMismatch {
                outport: out.type_name,
                inport: inp.type_name,
            });
        }
        if self.connections.iter().any(|c| c.inport == inport) {
            return Err(NetworkError::InportOccupied(inport));
        }
        if outport.processor == inport.processor
            || self.downstream(inport.processor).contains(&outport.processor)
        {
            return Err(NetworkError::Cycle { outport, inport });
        }
        self.connections.push(Connection { outport, inport });
        if let Some(port) = self.inport_mut(inport) {
            port.changed = true;
        }
        self.invalidate(inport.processor, InvalidationLevel::InvalidOutput);
        Ok(())
    }

    /// Removes a connection; returns `false` if it did not exist.
    pub fn disconnect(&mut self, outport: PortRef, inport: PortRef) -> bool {
        let before = self.connections.len();
        self.connections
            .retain(|c| c.outport != outport || c.inport != inport);
        if self.connections.len() == before {
            return false;
        }
        if let Some(port) = self.inport_mut(inport) {
            port.changed = true;
        }
        self.invalidate(inport.processor, InvalidationLevel::InvalidOutput);
        true
    }

    /// All connections in creation order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Whether an inport has a connection.
    #[must_use]
    pub fn is_connected<T>(&self, inport: InportKey<T>) -> bool {
        self.connection_into(inport.port()).is_some()
    }

    fn connection_into(&self, inport: PortRef) -> Option<&Connection> {
        self.connections.iter().find(|c| c.inport == inport)
    }

    /// Publishes data on an outport and flags every connected inport as
    /// changed.
    pub fn set_output<T: 'static>(&mut self, outport: OutportKey<T>, data: T) {
        self.set_output_rc(outport, Rc::new(data));
    }

    /// [`set_output`](Self::set_output) for data that is already shared.
    pub fn set_output_rc<T: 'static>(&mut self, outport: OutportKey<T>, data: Rc<T>) {
        let Some(port) = self.outport_mut(outport.port()) else {
            log::warn!("set_output: stale outport {:?}", outport.port());
            return;
        };
        port.data = Some(data);
        self.flag_receivers(outport.port());
    }

    /// Clears an outport's data; connected inports are flagged as changed.
    pub fn detach_output<T>(&mut self, outport: OutportKey<T>) {
        if let Some(port) = self.outport_mut(outport.port()) {
            port.data = None;
            self.flag_receivers(outport.port());
        }
    }

    fn flag_receivers(&mut self, outport: PortRef) {
        let receivers: Vec<PortRef> = self
            .connections
            .iter()
            .filter(|c| c.outport == outport)
            .map(|c| c.inport)
            .collect();
        for inport in receivers {
            if let Some(port) = self.inport_mut(inport) {
                port.changed = true;
            }
        }
    }

    /// Current data of an outport.
    #[must_use]
    pub fn output<T: 'static>(&self, outport: OutportKey<T>) -> Option<Rc<T>> {
        let data = self.outport(outport.port())?.data.clone()?;
        data.downcast().ok()
    }

    /// Data of the outport an inport is connected to.
    #[must_use]
    pub fn input<T: 'static>(&self, inport: InportKey<T>) -> Option<Rc<T>> {
        let connection = self.connection_into(inport.port())?;
        let data = self.outport(connection.outport)?.data.clone()?;
        data.downcast().ok()
    }

    /// Whether an inport's connected outport holds data.
    #[must_use]
    pub fn has_input<T>(&self, inport: InportKey<T>) -> bool {
        self.has_input_at(inport.processor(), inport.port().index)
    }

    pub(crate) fn has_input_at(&self, processor: ProcessorId, index: usize) -> bool {
        self.connection_into(PortRef { processor, index })
            .and_then(|c| self.outport(c.outport))
            .is_some_and(|out| out.data.is_some())
    }

    /// Whether the inport received new data or a new connection since its
    /// processor was last processed.
    #[must_use]
    pub fn is_input_changed<T>(&self, inport: InportKey<T>) -> bool {
        self.inport(inport.port()).is_some_and(|p| p.changed)
    }

    /// Registers a callback run during evaluation, right before the processor
    /// is processed, whenever the inport changed.
    pub fn on_inport_change<T>(
        &mut self,
        inport: InportKey<T>,
        callback: impl Fn(&mut Self) + 'static,
    ) -> Option<ObserverId> {
        let port = self.inport(inport.port())?;
        Some(port.on_change.subscribe(Rc::new(callback)))
    }

    /// Runs the change callbacks of every changed inport of `processor`.
    pub(crate) fn fire_inport_changes(&mut self, processor: ProcessorId) {
        let Some(state) = self.processor_state(processor) else {
            return;
        };
        let changed: Vec<usize> = (0..state.inports.len())
            .filter(|i| state.inports[*i].changed)
            .collect();
        for index in changed {
            let port = PortRef { processor, index };
            let Some(callbacks) = self.inport(port).map(|p| p.on_change.snapshot()) else {
                continue;
            };
            for (id, callback) in callbacks {
                if self.inport(port).is_some_and(|p| p.on_change.contains(id)) {
                    callback(self);
                }
            }
        }
    }

    pub(crate) fn clear_inport_changes(&mut self, processor: ProcessorId) {
        if let Some(state) = self.processor_state_mut(processor) {
            for port in &mut state.inports {
                port.changed = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ProcessorInfo;

    fn two_processors() -> (Network, ProcessorId, ProcessorId) {
        let mut net = Network::new();
        let a = net.add_processor("a", ProcessorInfo::new("org.test.A", "A"));
        let b = net.add_processor("b", ProcessorInfo::new("org.test.B", "B"));
        (net, a, b)
    }

    #[test]
    fn connect_and_read_input() {
        let (mut net, a, b) = two_processors();
        let out = net.add_outport::<Vec<f32>>(a, "out");
        let inp = net.add_inport::<Vec<f32>>(b, "in");
        assert!(!net.is_ready(b));
        net.connect(out, inp).unwrap();
        assert!(net.is_connected(inp));
        assert!(!net.is_ready(b));

        net.set_output(out, vec![1.0, 2.0]);
        assert!(net.has_input(inp));
        assert!(net.is_input_changed(inp));
        assert_eq!(net.input(inp).as_deref(), Some(&vec![1.0, 2.0]));
        assert!(net.is_ready(b));
    }

    #[test]
    fn connection_errors() {
        let (mut net, a, b) = two_processors();
        let out_a = net.add_outport::<u8>(a, "out");
        let in_b = net.add_inport::<u8>(b, "in");
        let out_b = net.add_outport::<u8>(b, "out");
        let in_a = net.add_inport::<u8>(a, "in");
        let wrong = net.add_inport::<u16>(b, "wide");

        assert!(matches!(
            net.connect_ports(out_a.port(), wrong.port()),
            Err(NetworkError::PortTypeMismatch { .. })
        ));
        net.connect(out_a, in_b).unwrap();
        assert!(matches!(
            net.connect(out_a, in_b),
            Err(NetworkError::InportOccupied(_))
        ));
        assert!(matches!(
            net.connect(out_b, in_a),
            Err(NetworkError::Cycle { .. })
        ));
        assert!(matches!(
            net.connect(out_a, in_a),
            Err(NetworkError::Cycle { .. })
        ));
    }

    #[test]
    fn optional_inport_does_not_gate_readiness() {
        let (mut net, _, b) = two_processors();
        net.add_optional_inport::<u8>(b, "maybe");
        assert!(net.is_ready(b));
    }

    #[test]
    fn disconnect_invalidates_receiver() {
        let (mut net, a, b) = two_processors();
        let out = net.add_outport::<u8>(a, "out");
        let inp = net.add_inport::<u8>(b, "in");
        net.connect(out, inp).unwrap();
        net.set_output(out, 1);
        net.evaluate();
        assert_eq!(net.invalidation_level(b), InvalidationLevel::Valid);
        assert!(!net.is_input_changed(inp));

        assert!(net.disconnect(out.port(), inp.port()));
        assert!(!net.disconnect(out.port(), inp.port()));
        assert_eq!(net.invalidation_level(b), InvalidationLevel::InvalidOutput);
        assert!(net.input(inp).is_none());
    }

    #[test]
    fn removing_processor_drops_connections() {
        let (mut net, a, b) = two_processors();
        let out = net.add_outport::<u8>(a, "out");
        let inp = net.add_inport::<u8>(b, "in");
        net.connect(out, inp).unwrap();
        assert!(net.remove_owner(a));
        assert!(net.connections().is_empty());
        assert_eq!(net.processors(), [b]);
        assert_eq!(net.find_inport(b, "in"), Some(inp.port()));
    }
}
