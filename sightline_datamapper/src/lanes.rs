// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component-wise mapping over scalars and fixed-size vectors.
//!
//! [`SameExtent`] widens an input of any supported component type to `f64`
//! while keeping its arity, and [`Lanes`] applies a scalar function to each
//! component of the widened value. Together they let a single linear map work
//! for `u8` samples, `[f32; 3]` colors and `kurbo::Point`s alike.

use kurbo::{Point, Vec2};

/// A value made of one or more `f64` lanes.
pub trait Lanes: Copy {
    /// Applies `f` to every lane.
    #[must_use]
    fn map_lanes(self, f: impl FnMut(f64) -> f64) -> Self;
}

impl Lanes for f64 {
    #[inline]
    fn map_lanes(self, mut f: impl FnMut(f64) -> f64) -> Self {
        f(self)
    }
}

impl<const N: usize> Lanes for [f64; N] {
    #[inline]
    fn map_lanes(self, f: impl FnMut(f64) -> f64) -> Self {
        self.map(f)
    }
}

impl Lanes for Vec2 {
    #[inline]
    fn map_lanes(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }
}

impl Lanes for Point {
    #[inline]
    fn map_lanes(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y))
    }
}

/// Input types that can be widened to a double-precision value of the same arity.
///
/// A `u8` widens to `f64`, an `[i16; 3]` widens to `[f64; 3]`.
pub trait SameExtent: Copy {
    /// The double-precision counterpart of `Self`.
    type Wide: Lanes;

    /// Converts every component to `f64`.
    #[must_use]
    fn widen(self) -> Self::Wide;
}

macro_rules! lossless_scalar {
    ($($ty:ty),*) => {
        $(
            impl SameExtent for $ty {
                type Wide = f64;

                #[inline]
                fn widen(self) -> f64 {
                    f64::from(self)
                }
            }
        )*
    };
}

lossless_scalar!(f64, f32, i8, u8, i16, u16, i32, u32);

macro_rules! wide_scalar {
    ($($ty:ty),*) => {
        $(
            impl SameExtent for $ty {
                type Wide = f64;

                #[inline]
                fn widen(self) -> f64 {
                    // Values above 2^53 round to the nearest representable double.
                    self as f64
                }
            }
        )*
    };
}

wide_scalar!(i64, u64, isize, usize);

impl<T, const N: usize> SameExtent for [T; N]
where
    T: SameExtent<Wide = f64>,
{
    type Wide = [f64; N];

    #[inline]
    fn widen(self) -> [f64; N] {
        self.map(SameExtent::widen)
    }
}

impl SameExtent for Vec2 {
    type Wide = Self;

    #[inline]
    fn widen(self) -> Self {
        self
    }
}

impl SameExtent for Point {
    type Wide = Self;

    #[inline]
    fn widen(self) -> Self {
        self
    }
}
