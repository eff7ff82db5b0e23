// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Network: properties, processors and change propagation for
//! dataflow visualization networks.
//!
//! A [`Network`] owns every property, group and processor. Properties are
//! addressed through typed [`Property<T>`] handles; groups and processors
//! through [`OwnerId`] and [`ProcessorId`]. All handles are generational, so
//! a handle to something that was removed goes stale instead of pointing at
//! whatever reused its slot.
//!
//! ## Change Propagation
//!
//! Setting a property to a new value runs one cascade
//! ([`Network::property_modified`]):
//!
//! 1. the property's change callbacks run,
//! 2. the property is flagged modified,
//! 3. the owning processor hears about it and links copy the value on,
//! 4. owners up to the processor are invalidated, and downstream processors
//!    with them,
//! 5. widgets other than the one that made the edit refresh.
//!
//! Equal values are deduplicated before any of this happens. Cosmetic
//! changes (display name, visibility) go through
//! [`Network::notify_about_change`] instead, which invalidates nothing.
//!
//! ## Network Lock
//!
//! Every cascade runs under the [network lock](Network::lock). Invalidations
//! only record that an evaluation is needed; the outermost release issues a
//! single [`NetworkEvent::EvaluationRequested`]. Nothing is processed until
//! [`Network::evaluate`] runs (or immediately, with
//! [`NetworkConfig::auto_evaluate`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use sightline_network::{InvalidationLevel, Network, ProcessorInfo, PropertyBuilder};
//!
//! let mut net = Network::new();
//! let raycaster = net.add_processor(
//!     "raycaster",
//!     ProcessorInfo::new("org.example.Raycaster", "Raycaster"),
//! );
//! let rate = net.add_property(
//!     raycaster,
//!     PropertyBuilder::new("samplingRate", "Sampling Rate", 2.0_f32)
//!         .coerce(|v| v.clamp(0.1, 20.0)),
//! );
//! net.evaluate();
//!
//! let requests = Rc::new(Cell::new(0));
//! let r = requests.clone();
//! net.observe(move |_| r.set(r.get() + 1));
//!
//! assert!(net.set(rate, 50.0));
//! assert_eq!(net.get(rate), Some(&20.0));
//! assert!(!net.set(rate, 20.0));
//! assert_eq!(net.invalidation_level(raycaster), InvalidationLevel::InvalidOutput);
//!
//! assert_eq!(net.evaluate(), 1);
//! assert_eq!(net.invalidation_level(raycaster), InvalidationLevel::Valid);
//! ```
//!
//! ## Serialization
//!
//! [`Network::serialize_property`], [`Network::serialize_owner`] and
//! [`Network::serialize`] produce JSON records that omit default-valued
//! fields; the matching `deserialize_*` methods apply them tolerantly and
//! report [`DeserializeIssue`]s.

mod arena;
mod attributes;
mod builder;
mod config;
mod error;
mod evaluate;
mod id;
mod link;
mod lock;
mod network;
mod options;
mod owner;
mod port;
mod processor;
mod property;
mod serialize;
mod value;

pub use attributes::{
    AttributeChange, InvalidationLevel, PropertySemantics, SerializationMode, Tracked, UsageMode,
};
pub use builder::{PropertyBuilder, ordinal_color};
pub use config::{ConfigError, NetworkConfig};
pub use error::NetworkError;
pub use id::{OwnerId, ProcessorId, Property, PropertyId};
pub use link::Link;
pub use lock::NetworkLock;
pub use network::{Network, NetworkEvent};
pub use options::{OptionEntry, OptionValue, Options};
pub use owner::Child;
pub use port::{Connection, InportKey, OutportKey, PortRef};
pub use processor::{CodeState, Process, ProcessorInfo, ProcessorTags};
pub use property::{PropertyWidget, WidgetId};
pub use serialize::{COMPOSITE_CLASS_IDENTIFIER, DeserializeIssue};
pub use value::{Button, ErasedValue, PropertyValue};

pub use sightline_observe::ObserverId;
