// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear maps between data, value and normalized space.

use alloc::string::String;

use thiserror::Error;

use crate::format::{DataFormat, NumericType};
use crate::lanes::{Lanes, SameExtent};
use crate::span::Span;

/// Why a mapping could not be computed.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum DomainError {
    /// The source span has zero width, so every input maps to a single point.
    #[error("cannot map out of zero-width range [{at}, {at}]")]
    ZeroWidthRange {
        /// The coinciding endpoint.
        at: f64,
    },
    /// One of the spans has a non-finite endpoint or width.
    #[error("range [{lo}, {hi}] is not finite")]
    NonFiniteRange {
        /// Lower endpoint of the offending span.
        lo: f64,
        /// Upper endpoint of the offending span.
        hi: f64,
    },
}

#[inline]
fn map_scalar(x: f64, from: Span, to: Span) -> f64 {
    if from.is_degenerate() {
        return to.lo;
    }
    to.lo + (x - from.lo) * to.width() / from.width()
}

fn check(from: Span, to: Span) -> Result<(), DomainError> {
    for span in [from, to] {
        if !span.is_finite() {
            return Err(DomainError::NonFiniteRange {
                lo: span.lo,
                hi: span.hi,
            });
        }
    }
    if from.is_degenerate() {
        return Err(DomainError::ZeroWidthRange { at: from.lo });
    }
    Ok(())
}

/// Maps `value` from `from` to `to`, component-wise.
///
/// `to.lo + (x - from.lo) * (to.hi - to.lo) / (from.hi - from.lo)`
///
/// If `from` has zero width the result is `to.lo` in every component, never
/// NaN. Use [`try_linear_map`] to detect that case instead.
///
/// ```rust
/// use sightline_datamapper::{Span, linear_map};
///
/// let from = Span::new(0.0, 255.0);
/// let to = Span::new(-1.0, 1.0);
/// assert_eq!(linear_map(255_u8, from, to), 1.0);
/// assert_eq!(linear_map([0_u8, 255], from, to), [-1.0, 1.0]);
/// assert_eq!(linear_map(7.0, Span::new(3.0, 3.0), to), -1.0);
/// ```
#[must_use]
pub fn linear_map<T: SameExtent>(value: T, from: Span, to: Span) -> T::Wide {
    value.widen().map_lanes(|x| map_scalar(x, from, to))
}

/// Like [`linear_map`], but rejects zero-width and non-finite spans.
pub fn try_linear_map<T: SameExtent>(
    value: T,
    from: Span,
    to: Span,
) -> Result<T::Wide, DomainError> {
    check(from, to)?;
    Ok(linear_map(value, from, to))
}

/// Maps `value` from `from` onto `[0, 1]`.
#[must_use]
pub fn linear_map_to_normalized<T: SameExtent>(value: T, from: Span) -> T::Wide {
    linear_map(value, from, Span::NORMALIZED)
}

/// Maps `value` from `[0, 1]` onto `to`.
#[must_use]
pub fn linear_map_from_normalized<T: SameExtent>(value: T, to: Span) -> T::Wide {
    linear_map(value, Span::NORMALIZED, to)
}

/// A named, unit-carrying axis for physical values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axis {
    /// Human-readable quantity name, e.g. `"Density"`.
    pub name: String,
    /// Unit symbol, e.g. `"HU"` or `"kg/m^3"`.
    pub unit: String,
}

impl Axis {
    /// Creates an axis from a name and a unit.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// Relates stored sample values to the physical quantity they encode.
///
/// Three spaces are involved:
///
/// - **data**: the raw stored numbers, spanning [`data_range`](Self::data_range);
/// - **value**: physical units along [`value_axis`](Self::value_axis), spanning
///   [`value_range`](Self::value_range);
/// - **normalized**: the unit interval, used e.g. for transfer-function lookups.
///
/// All six conversions are linear, work component-wise on scalars and
/// fixed-size vectors, and widen their input to `f64`. The ranges may be
/// descending. They must be finite; the `try_` variants report violations,
/// while the plain variants map everything onto the target's lower endpoint
/// when the source range has zero width.
///
/// ```rust
/// use sightline_datamapper::{DataMapper, Span};
///
/// let mut map = DataMapper::default();
/// assert_eq!(map.data_range, Span::new(0.0, 255.0));
///
/// map.value_range = Span::new(-1000.0, 3000.0);
/// assert_eq!(map.map_from_data_to_value(0_u8), -1000.0);
/// assert_eq!(map.map_from_data_to_normalized([0_u8, 255]), [0.0, 1.0]);
/// assert_eq!(map.map_from_value_to_data(3000.0), 255.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataMapper {
    /// Extent of the raw stored numbers.
    pub data_range: Span,
    /// Extent of the physical values the data encodes.
    pub value_range: Span,
    /// Name and unit of the physical values.
    pub value_axis: Axis,
}

impl Default for DataMapper {
    fn default() -> Self {
        Self::from_format(DataFormat::UINT8)
    }
}

impl DataMapper {
    /// Creates a mapper with explicit ranges and an unnamed axis.
    #[must_use]
    pub fn new(data_range: Span, value_range: Span) -> Self {
        Self {
            data_range,
            value_range,
            value_axis: Axis::default(),
        }
    }

    /// Creates a mapper matching the natural extent of `format`.
    ///
    /// See [`init_with_format`](Self::init_with_format).
    #[must_use]
    pub fn from_format(format: DataFormat) -> Self {
        let mut map = Self::new(Span::NORMALIZED, Span::NORMALIZED);
        map.init_with_format(format);
        map
    }

    /// Resets both ranges to the natural extent of `format`.
    ///
    /// Integer formats span their full type range. Floating point formats
    /// use `[0, 1]`, since their type range has no finite width. The value
    /// axis is left untouched.
    pub fn init_with_format(&mut self, format: DataFormat) {
        self.data_range = match format.numeric_type() {
            NumericType::Float => Span::NORMALIZED,
            NumericType::SignedInteger | NumericType::UnsignedInteger => {
                Span::new(format.lowest(), format.max())
            }
        };
        self.value_range = self.data_range;
    }

    /// Raw data to physical value.
    #[must_use]
    pub fn map_from_data_to_value<T: SameExtent>(&self, data: T) -> T::Wide {
        linear_map(data, self.data_range, self.value_range)
    }

    /// Physical value to raw data.
    #[must_use]
    pub fn map_from_value_to_data<T: SameExtent>(&self, value: T) -> T::Wide {
        linear_map(value, self.value_range, self.data_range)
    }

    /// Raw data to `[0, 1]`.
    #[must_use]
    pub fn map_from_data_to_normalized<T: SameExtent>(&self, data: T) -> T::Wide {
        linear_map_to_normalized(data, self.data_range)
    }

    /// `[0, 1]` to raw data.
    #[must_use]
    pub fn map_from_normalized_to_data<T: SameExtent>(&self, normalized: T) -> T::Wide {
        linear_map_from_normalized(normalized, self.data_range)
    }

    /// Physical value to `[0, 1]`.
    #[must_use]
    pub fn map_from_value_to_normalized<T: SameExtent>(&self, value: T) -> T::Wide {
        linear_map_to_normalized(value, self.value_range)
    }

    /// `[0, 1]` to physical value.
    #[must_use]
    pub fn map_from_normalized_to_value<T: SameExtent>(&self, normalized: T) -> T::Wide {
        linear_map_from_normalized(normalized, self.value_range)
    }

    /// Checked [`map_from_data_to_value`](Self::map_from_data_to_value).
    pub fn try_map_from_data_to_value<T: SameExtent>(
        &self,
        data: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(data, self.data_range, self.value_range)
    }

    /// Checked [`map_from_value_to_data`](Self::map_from_value_to_data).
    pub fn try_map_from_value_to_data<T: SameExtent>(
        &self,
        value: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(value, self.value_range, self.data_range)
    }

    /// Checked [`map_from_data_to_normalized`](Self::map_from_data_to_normalized).
    pub fn try_map_from_data_to_normalized<T: SameExtent>(
        &self,
        data: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(data, self.data_range, Span::NORMALIZED)
    }

    /// Checked [`map_from_normalized_to_data`](Self::map_from_normalized_to_data).
    pub fn try_map_from_normalized_to_data<T: SameExtent>(
        &self,
        normalized: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(normalized, Span::NORMALIZED, self.data_range)
    }

    /// Checked [`map_from_value_to_normalized`](Self::map_from_value_to_normalized).
    pub fn try_map_from_value_to_normalized<T: SameExtent>(
        &self,
        value: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(value, self.value_range, Span::NORMALIZED)
    }

    /// Checked [`map_from_normalized_to_value`](Self::map_from_normalized_to_value).
    pub fn try_map_from_normalized_to_value<T: SameExtent>(
        &self,
        normalized: T,
    ) -> Result<T::Wide, DomainError> {
        try_linear_map(normalized, Span::NORMALIZED, self.value_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ScalarType;
    use kurbo::Point;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn default_is_uint8() {
        let map = DataMapper::default();
        assert_eq!(map.data_range, Span::new(0.0, 255.0));
        assert_eq!(map.value_range, Span::new(0.0, 255.0));
        assert_eq!(map.value_axis, Axis::default());
    }

    #[test]
    fn init_with_format_integer_and_float() {
        let mut map = DataMapper::default();
        map.value_axis = Axis::new("Density", "HU");
        map.init_with_format(DataFormat::INT16);
        assert_eq!(map.data_range, Span::new(-32768.0, 32767.0));
        assert_eq!(map.value_range, map.data_range);
        assert_eq!(map.value_axis.unit, "HU");

        map.init_with_format(DataFormat::new(ScalarType::Float32, 2));
        assert_eq!(map.data_range, Span::NORMALIZED);
    }

    #[test]
    fn descending_range_flips() {
        let map = DataMapper::new(Span::new(0.0, 10.0), Span::new(100.0, 0.0));
        assert_eq!(map.map_from_data_to_value(0.0), 100.0);
        assert_eq!(map.map_from_data_to_value(10.0), 0.0);
        assert_eq!(map.map_from_data_to_value(2.5), 75.0);
    }

    #[test]
    fn zero_width_source_uses_target_lower_bound() {
        let map = DataMapper::new(Span::new(4.0, 4.0), Span::new(-2.0, 2.0));
        assert_eq!(map.map_from_data_to_value(4.0), -2.0);
        assert_eq!(map.map_from_data_to_value([1.0, 9.0]), [-2.0, -2.0]);
        assert_eq!(map.map_from_data_to_normalized(123_u16), 0.0);
        assert_eq!(
            map.try_map_from_data_to_value(4.0),
            Err(DomainError::ZeroWidthRange { at: 4.0 })
        );
        // The reverse direction is fine.
        assert_eq!(map.try_map_from_value_to_data(0.0), Ok(4.0));
    }

    #[test]
    fn non_finite_ranges_rejected_by_try() {
        let map = DataMapper::new(Span::new(0.0, f64::INFINITY), Span::NORMALIZED);
        assert!(matches!(
            map.try_map_from_data_to_normalized(1.0),
            Err(DomainError::NonFiniteRange { .. })
        ));
    }

    #[test]
    fn round_trips_all_pairs() {
        let map = DataMapper::new(Span::new(-20.0, 300.0), Span::new(5.0, -7.5));
        for x in [-20.0, -3.25, 0.0, 17.0, 299.0] {
            let v = map.map_from_data_to_value(x);
            assert!(approx(map.map_from_value_to_data(v), x), "data/value {x}");
            let n = map.map_from_data_to_normalized(x);
            assert!(approx(map.map_from_normalized_to_data(n), x), "data/norm {x}");
        }
        for v in [5.0, 0.0, -7.5, 1.125] {
            let n = map.map_from_value_to_normalized(v);
            assert!(approx(map.map_from_normalized_to_value(n), v), "value/norm {v}");
        }
    }

    #[test]
    fn vector_and_point_inputs() {
        let map = DataMapper::new(Span::new(0.0, 2.0), Span::new(0.0, 20.0));
        assert_eq!(map.map_from_data_to_value([1_i32, 2]), [10.0, 20.0]);
        assert_eq!(
            map.map_from_data_to_value([0.5_f32, 1.0, 1.5, 2.0]),
            [5.0, 10.0, 15.0, 20.0]
        );
        assert_eq!(
            map.map_from_data_to_value(Point::new(1.0, 0.0)),
            Point::new(10.0, 0.0)
        );
    }

    #[test]
    fn domain_error_messages() {
        use alloc::string::ToString;
        assert_eq!(
            DomainError::ZeroWidthRange { at: 1.0 }.to_string(),
            "cannot map out of zero-width range [1, 1]"
        );
    }
}
