// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by structural network operations.

use thiserror::Error;

use crate::id::{OwnerId, PropertyId, ProcessorId};
use crate::port::PortRef;

/// A structural operation on the [`Network`](crate::Network) that could not be
/// carried out.
///
/// These are recoverable user-level failures (a bad connection attempt, a
/// link between incompatible properties). Violations of ownership invariants,
/// such as duplicate identifiers within one owner, panic instead.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The property handle does not refer to a live property.
    #[error("stale property handle {0:?}")]
    StaleProperty(PropertyId),
    /// The owner handle does not refer to a live owner.
    #[error("stale owner handle {0:?}")]
    StaleOwner(OwnerId),
    /// The processor handle does not refer to a live processor.
    #[error("stale processor handle {0:?}")]
    StaleProcessor(ProcessorId),
    /// The port does not exist.
    #[error("no such port {0:?}")]
    StalePort(PortRef),
    /// The outport produces a different type than the inport accepts.
    #[error("port types differ: outport carries `{outport}`, inport expects `{inport}`")]
    PortTypeMismatch {
        /// Data type of the outport.
        outport: &'static str,
        /// Data type of the inport.
        inport: &'static str,
    },
    /// The inport already has a connection.
    #[error("inport {0:?} is already connected")]
    InportOccupied(PortRef),
    /// The connection would make the processor graph cyclic.
    #[error("connecting {outport:?} to {inport:?} would create a cycle")]
    Cycle {
        /// Upstream end of the rejected connection.
        outport: PortRef,
        /// Downstream end of the rejected connection.
        inport: PortRef,
    },
    /// Linked properties must hold the same value type.
    #[error("cannot link a `{from}` property to a `{to}` property")]
    LinkTypeMismatch {
        /// Value type of the link source.
        from: &'static str,
        /// Value type of the link destination.
        to: &'static str,
    },
    /// A property cannot be linked to itself.
    #[error("cannot link {0:?} to itself")]
    SelfLink(PropertyId),
    /// A value could not be converted to or from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
