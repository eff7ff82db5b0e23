// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed numeric intervals used as mapping endpoints.

use core::fmt;
use core::ops::Range;

/// A closed interval `[lo, hi]` on the real line.
///
/// `lo` does not have to be smaller than `hi`: a descending span is valid and
/// flips the direction of any mapping that uses it. A span whose endpoints are
/// equal is *degenerate*; mapping out of a degenerate span has no well-defined
/// result (see [`linear_map`](crate::linear_map)).
///
/// ```rust
/// use sightline_datamapper::Span;
///
/// let s = Span::new(10.0, -10.0);
/// assert_eq!(s.width(), -20.0);
/// assert!(!s.is_degenerate());
/// assert_eq!(Span::NORMALIZED.width(), 1.0);
/// ```
#[derive(Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Value the interval starts at.
    pub lo: f64,
    /// Value the interval ends at.
    pub hi: f64,
}

impl Span {
    /// The unit interval `[0, 1]`.
    pub const NORMALIZED: Self = Self { lo: 0.0, hi: 1.0 };

    /// Creates a span from its two endpoints.
    #[must_use]
    #[inline]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Signed width `hi - lo`.
    #[must_use]
    #[inline]
    pub fn width(self) -> f64 {
        self.hi - self.lo
    }

    /// Returns `true` when both endpoints are equal.
    #[must_use]
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.width() == 0.0
    }

    /// Returns `true` when both endpoints and the width are finite.
    #[must_use]
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.width().is_finite()
    }

    /// Returns `true` when `value` lies between the endpoints, in either direction.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (min, max) = if self.lo <= self.hi {
            (self.lo, self.hi)
        } else {
            (self.hi, self.lo)
        };
        (min..=max).contains(&value)
    }

    /// Returns the span with its endpoints swapped.
    #[must_use]
    #[inline]
    pub const fn reversed(self) -> Self {
        Self {
            lo: self.hi,
            hi: self.lo,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span[{}, {}]", self.lo, self.hi)
    }
}

impl From<(f64, f64)> for Span {
    fn from((lo, hi): (f64, f64)) -> Self {
        Self { lo, hi }
    }
}

impl From<[f64; 2]> for Span {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<Range<f64>> for Span {
    fn from(range: Range<f64>) -> Self {
        Self {
            lo: range.start,
            hi: range.end,
        }
    }
}
