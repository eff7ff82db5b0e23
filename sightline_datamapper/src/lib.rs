// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline Data Mapper: linear conversions between stored samples, physical
//! values and the unit interval.
//!
//! Volumes, images and buffers store raw numbers (`u8` CT slices, `i16`
//! Hounsfield units, `f32` simulation output, ...). Before those numbers can be
//! shown on an axis, fed through a transfer function or compared between
//! datasets they have to be related to the physical quantity they encode.
//! A [`DataMapper`] holds that relation: a [`data_range`](DataMapper::data_range)
//! for the stored numbers, a [`value_range`](DataMapper::value_range) plus
//! [`Axis`] for the physical quantity, and six linear conversions between
//! data, value and normalized space.
//!
//! ## Component-wise mapping
//!
//! Every conversion is generic over [`SameExtent`]: scalars, fixed-size arrays
//! and `kurbo` 2D types are widened to `f64` with their arity preserved and
//! mapped lane by lane.
//!
//! ```rust
//! use sightline_datamapper::{DataFormat, DataMapper, Span};
//!
//! let mut map = DataMapper::from_format(DataFormat::UINT16);
//! map.data_range = Span::new(0.0, 4095.0);
//! map.value_range = Span::new(-1024.0, 3071.0);
//!
//! let hu: [f64; 2] = map.map_from_data_to_value([0_u16, 4095]);
//! assert_eq!(hu, [-1024.0, 3071.0]);
//!
//! let t = map.map_from_value_to_normalized(-1024.0);
//! assert_eq!(t, 0.0);
//! ```
//!
//! ## Degenerate ranges
//!
//! A zero-width source range has no inverse. The infallible conversions return
//! the target range's lower endpoint in every lane; the `try_` conversions return
//! [`DomainError::ZeroWidthRange`] (and [`DomainError::NonFiniteRange`] for spans
//! that are not finite).
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc` for the axis labels. Enable the
//! `libm` feature instead of `std` on targets without a system math library.

#![no_std]

extern crate alloc;

mod format;
mod lanes;
mod mapper;
mod span;

pub use format::{DataFormat, NumericType, ScalarType};
pub use lanes::{Lanes, SameExtent};
pub use mapper::{
    Axis, DataMapper, DomainError, linear_map, linear_map_from_normalized,
    linear_map_to_normalized, try_linear_map,
};
pub use span::Span;
