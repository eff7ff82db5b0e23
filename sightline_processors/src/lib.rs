// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Processors: volume data and processors working on it.
//!
//! [`Volume`] is a dense multi-channel grid carrying a
//! [`DataMapper`](sightline_datamapper::DataMapper).
//! [`VolumeNormalization`] maps selected channels to `[0, 1]`, keeping one
//! toggle property per channel of whatever volume it last received.

mod normalization;
mod volume;

pub use normalization::{VolumeNormalization, normalize_channels};
pub use volume::{Volume, VolumeError};
