// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Observe: observer lists for single-threaded notification.
//!
//! Property editors, processors and widgets subscribe to each other in
//! arbitrary patterns, and a callback frequently edits the very list it is
//! being called from: a widget unregisters itself while handling a change, a
//! processor replaces its change callbacks when its input changes shape.
//! [`Observers`] makes that safe by running every notification pass over a
//! snapshot and re-checking membership before each delivery.
//!
//! ## Handles
//!
//! The list is generic over the handle type `H`:
//!
//! - `Rc<dyn Fn(&E)>` for plain callbacks ([`Notifier`]), delivered with
//!   [`Observers::notify`];
//! - `Weak<W>` for observers owned elsewhere, pruned with [`Observers::retain`];
//! - any `Clone` handle with custom delivery through [`Observers::notify_all`]
//!   or [`Observers::snapshot`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod registry;

pub use registry::{Notifier, ObserverId, Observers, Snapshot};
