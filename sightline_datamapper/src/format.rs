// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample formats: component scalar type plus component count.

use core::fmt;

/// How a scalar component is interpreted numerically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericType {
    /// Two's complement signed integer.
    SignedInteger,
    /// Unsigned integer.
    UnsignedInteger,
    /// IEEE 754 floating point.
    Float,
}

/// Storage type of a single sample component.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarType {
    /// `i8`.
    Int8,
    /// `u8`.
    UInt8,
    /// `i16`.
    Int16,
    /// `u16`.
    UInt16,
    /// `i32`.
    Int32,
    /// `u32`.
    UInt32,
    /// `i64`.
    Int64,
    /// `u64`.
    UInt64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
}

impl ScalarType {
    /// Numeric interpretation of this type.
    #[must_use]
    pub const fn numeric_type(self) -> NumericType {
        match self {
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => NumericType::SignedInteger,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => {
                NumericType::UnsignedInteger
            }
            Self::Float32 | Self::Float64 => NumericType::Float,
        }
    }

    /// Size of one component in bytes.
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Smallest finite value the type can hold, as `f64`.
    #[must_use]
    pub const fn lowest(self) -> f64 {
        match self {
            Self::Int8 => i8::MIN as f64,
            Self::Int16 => i16::MIN as f64,
            Self::Int32 => i32::MIN as f64,
            Self::Int64 => i64::MIN as f64,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => 0.0,
            Self::Float32 => f32::MIN as f64,
            Self::Float64 => f64::MIN,
        }
    }

    /// Largest finite value the type can hold, as `f64`.
    #[must_use]
    pub const fn max(self) -> f64 {
        match self {
            Self::Int8 => i8::MAX as f64,
            Self::UInt8 => u8::MAX as f64,
            Self::Int16 => i16::MAX as f64,
            Self::UInt16 => u16::MAX as f64,
            Self::Int32 => i32::MAX as f64,
            Self::UInt32 => u32::MAX as f64,
            Self::Int64 => i64::MAX as f64,
            Self::UInt64 => u64::MAX as f64,
            Self::Float32 => f32::MAX as f64,
            Self::Float64 => f64::MAX,
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }
}

/// Format of a data sample: a scalar type repeated over `components` lanes.
///
/// ```rust
/// use sightline_datamapper::{DataFormat, ScalarType};
///
/// let rgba = DataFormat::new(ScalarType::UInt8, 4);
/// assert_eq!(rgba.size_in_bytes(), 4);
/// assert_eq!(rgba.to_string(), "Vec4UInt8");
/// assert_eq!(DataFormat::FLOAT32.to_string(), "Float32");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataFormat {
    scalar: ScalarType,
    components: u8,
}

impl DataFormat {
    /// Single-component unsigned 8-bit data.
    pub const UINT8: Self = Self::new(ScalarType::UInt8, 1);
    /// Single-component unsigned 16-bit data.
    pub const UINT16: Self = Self::new(ScalarType::UInt16, 1);
    /// Single-component signed 16-bit data.
    pub const INT16: Self = Self::new(ScalarType::Int16, 1);
    /// Single-component 32-bit float data.
    pub const FLOAT32: Self = Self::new(ScalarType::Float32, 1);
    /// Single-component 64-bit float data.
    pub const FLOAT64: Self = Self::new(ScalarType::Float64, 1);

    /// Creates a format with `components` lanes of `scalar`.
    ///
    /// # Panics
    ///
    /// Panics if `components` is not in `1..=4`.
    #[must_use]
    pub const fn new(scalar: ScalarType, components: u8) -> Self {
        assert!(
            components >= 1 && components <= 4,
            "data formats have between one and four components"
        );
        Self { scalar, components }
    }

    /// Scalar type of each component.
    #[must_use]
    #[inline]
    pub const fn scalar(self) -> ScalarType {
        self.scalar
    }

    /// Number of components.
    #[must_use]
    #[inline]
    pub const fn components(self) -> u8 {
        self.components
    }

    /// Numeric interpretation of the components.
    #[must_use]
    #[inline]
    pub const fn numeric_type(self) -> NumericType {
        self.scalar.numeric_type()
    }

    /// Bytes per sample.
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        self.scalar.size_in_bytes() * self.components as usize
    }

    /// Smallest finite component value.
    #[must_use]
    #[inline]
    pub const fn lowest(self) -> f64 {
        self.scalar.lowest()
    }

    /// Largest finite component value.
    #[must_use]
    #[inline]
    pub const fn max(self) -> f64 {
        self.scalar.max()
    }
}

impl Default for DataFormat {
    fn default() -> Self {
        Self::UINT8
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components == 1 {
            f.write_str(self.scalar.short_name())
        } else {
            write!(f, "Vec{}{}", self.components, self.scalar.short_name())
        }
    }
}
