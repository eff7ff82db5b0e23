// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property value capabilities and type-erased value storage.
//!
//! Every property kind stores its value behind [`ErasedValue`], which keeps the
//! operations the network needs without knowing the concrete type: equality
//! for change deduplication, cloning for links and defaults, and JSON
//! conversion for serialization.

use std::any::{Any, TypeId};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Types that can be stored in a property.
///
/// `CLASS_IDENTIFIER` is written as the `type` field of the serialized
/// property record.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use sightline_network::PropertyValue;
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// struct Isovalue(f32);
///
/// impl PropertyValue for Isovalue {
///     const CLASS_IDENTIFIER: &'static str = "org.example.IsovalueProperty";
/// }
/// ```
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Class identifier of the property kind storing this type.
    const CLASS_IDENTIFIER: &'static str;
}

macro_rules! property_values {
    ($($ty:ty => $class:literal),* $(,)?) => {
        $(
            impl PropertyValue for $ty {
                const CLASS_IDENTIFIER: &'static str = $class;
            }
        )*
    };
}

property_values! {
    bool => "org.sightline.BoolProperty",
    i32 => "org.sightline.IntProperty",
    i64 => "org.sightline.Int64Property",
    u32 => "org.sightline.UIntProperty",
    f32 => "org.sightline.FloatProperty",
    f64 => "org.sightline.DoubleProperty",
    [f32; 2] => "org.sightline.FloatVec2Property",
    [f32; 3] => "org.sightline.FloatVec3Property",
    [f32; 4] => "org.sightline.FloatVec4Property",
    [f64; 2] => "org.sightline.DoubleVec2Property",
    [f64; 3] => "org.sightline.DoubleVec3Property",
    [f64; 4] => "org.sightline.DoubleVec4Property",
    [i32; 2] => "org.sightline.IntVec2Property",
    [i32; 3] => "org.sightline.IntVec3Property",
    [i32; 4] => "org.sightline.IntVec4Property",
    String => "org.sightline.StringProperty",
    std::path::PathBuf => "org.sightline.FileProperty",
}

/// Value of a button property.
///
/// A button carries no state; pressing it is a modification without a value
/// change, see [`Network::press`](crate::Network::press).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button;

impl PropertyValue for Button {
    const CLASS_IDENTIFIER: &'static str = "org.sightline.ButtonProperty";
}

/// A type-erased property value.
///
/// ```rust
/// use sightline_network::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert!(value.value_eq(&ErasedValue::new(42_i32)));
/// assert!(!value.value_eq(&ErasedValue::new(42_i64)));
/// assert_eq!(value.to_json().unwrap(), serde_json::json!(42));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Creates a new erased value from a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    /// Attempts to downcast to a mutable reference of type `T`.
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut()
    }

    /// Clones the contained value into a new [`ErasedValue`].
    #[must_use]
    pub fn clone_value(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }

    /// Returns `true` if both values have the same type and compare equal.
    #[must_use]
    pub fn value_eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_dyn(other.inner.as_any())
    }

    /// Class identifier of the contained type.
    #[must_use]
    pub fn class_identifier(&self) -> &'static str {
        self.inner.class_identifier()
    }

    /// Rust type name of the contained value, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Serializes the contained value.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        self.inner.to_json()
    }

    /// Parses `json` as a value of the same type as `self`.
    pub fn parse_like(&self, json: &Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            inner: self.inner.parse_like(json)?,
            type_id: self.type_id,
        })
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        self.clone_value()
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_debug(f)
    }
}

/// Trait object for the capabilities of a [`PropertyValue`].
trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn eq_dyn(&self, other: &dyn Any) -> bool;
    fn class_identifier(&self) -> &'static str;
    fn type_name(&self) -> &'static str;
    fn to_json(&self) -> Result<Value, serde_json::Error>;
    fn parse_like(&self, json: &Value) -> Result<Box<dyn ErasedValueTrait>, serde_json::Error>;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn class_identifier(&self) -> &'static str {
        T::CLASS_IDENTIFIER
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn parse_like(&self, json: &Value) -> Result<Box<dyn ErasedValueTrait>, serde_json::Error> {
        Ok(Box::new(T::deserialize(json)?))
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
