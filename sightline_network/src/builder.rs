// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property construction.

use std::fmt;
use std::rc::Rc;

use crate::attributes::{InvalidationLevel, PropertySemantics, SerializationMode, UsageMode};
use crate::value::{ErasedValue, PropertyValue};

/// Type-erased coerce callback stored with a property.
pub(crate) type Coerce = Rc<dyn Fn(&mut ErasedValue)>;

/// Builder for properties, consumed by
/// [`Network::add_property`](crate::Network::add_property) and
/// [`Network::create_property`](crate::Network::create_property).
///
/// Defaults: invalidation level [`InvalidOutput`](InvalidationLevel::InvalidOutput),
/// [`DEFAULT`](PropertySemantics::DEFAULT) semantics, application usage mode,
/// visible, writable, the network's default serialization mode, no coercion.
///
/// ```rust
/// use sightline_network::{InvalidationLevel, PropertyBuilder, PropertySemantics};
///
/// let builder = PropertyBuilder::new("samplingRate", "Sampling Rate", 2.0_f32)
///     .invalidation_level(InvalidationLevel::InvalidResources)
///     .coerce(|v| v.clamp(0.1, 20.0));
/// assert_eq!(builder.identifier(), "samplingRate");
/// ```
pub struct PropertyBuilder<T: PropertyValue> {
    pub(crate) identifier: String,
    pub(crate) display_name: String,
    pub(crate) value: T,
    pub(crate) class_identifier: Option<&'static str>,
    pub(crate) invalidation_level: InvalidationLevel,
    pub(crate) semantics: PropertySemantics,
    pub(crate) usage_mode: UsageMode,
    pub(crate) read_only: bool,
    pub(crate) visible: bool,
    pub(crate) serialization_mode: Option<SerializationMode>,
    pub(crate) coerce: Option<Box<dyn Fn(T) -> T>>,
}

// Manual Debug impl since callbacks aren't Debug
impl<T: PropertyValue> fmt::Debug for PropertyBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBuilder")
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("value", &self.value)
            .field("class_identifier", &self.class_identifier)
            .field("invalidation_level", &self.invalidation_level)
            .field("semantics", &self.semantics)
            .field("usage_mode", &self.usage_mode)
            .field("read_only", &self.read_only)
            .field("visible", &self.visible)
            .field("serialization_mode", &self.serialization_mode)
            .field("has_coerce", &self.coerce.is_some())
            .finish()
    }
}

impl<T: PropertyValue> PropertyBuilder<T> {
    /// Starts a property with the given identifier, display name and initial
    /// (and default) value.
    #[must_use]
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>, value: T) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            value,
            class_identifier: None,
            invalidation_level: InvalidationLevel::InvalidOutput,
            semantics: PropertySemantics::DEFAULT,
            usage_mode: UsageMode::Application,
            read_only: false,
            visible: true,
            serialization_mode: None,
            coerce: None,
        }
    }

    /// Identifier the property will have.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Overrides the class identifier taken from [`PropertyValue`].
    #[must_use]
    pub fn class_identifier(mut self, class_identifier: &'static str) -> Self {
        self.class_identifier = Some(class_identifier);
        self
    }

    /// Sets how far a value change invalidates the owning processor.
    ///
    /// [`Valid`](InvalidationLevel::Valid) makes the property purely
    /// informational: changes still run callbacks and update widgets but never
    /// invalidate the owner.
    #[must_use]
    pub fn invalidation_level(mut self, level: InvalidationLevel) -> Self {
        self.invalidation_level = level;
        self
    }

    /// Sets the presentation hint.
    #[must_use]
    pub fn semantics(mut self, semantics: PropertySemantics) -> Self {
        self.semantics = semantics;
        self
    }

    /// Sets the usage mode.
    #[must_use]
    pub fn usage_mode(mut self, usage_mode: UsageMode) -> Self {
        self.usage_mode = usage_mode;
        self
    }

    /// Sets the read-only flag.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the serialization mode.
    #[must_use]
    pub fn serialization_mode(mut self, mode: SerializationMode) -> Self {
        self.serialization_mode = Some(mode);
        self
    }

    /// Sets a callback that adjusts every incoming value before it is compared
    /// and stored, e.g. to clamp it into a range.
    #[must_use]
    pub fn coerce(mut self, coerce: impl Fn(T) -> T + 'static) -> Self {
        self.coerce = Some(Box::new(coerce));
        self
    }

    pub(crate) fn erased_coerce(coerce: Option<Box<dyn Fn(T) -> T>>) -> Option<Coerce> {
        let coerce = coerce?;
        Some(Rc::new(move |value: &mut ErasedValue| {
            if let Some(v) = value.downcast_mut::<T>() {
                *v = coerce(v.clone());
            }
        }))
    }
}

/// A four-component color property clamped to `[0, 1]` with
/// [`COLOR`](PropertySemantics::COLOR) semantics.
///
/// ```rust
/// use sightline_network::{Network, ProcessorInfo, ordinal_color};
///
/// let mut net = Network::new();
/// let p = net.add_processor("p", ProcessorInfo::new("org.example.P", "P"));
/// let bg = net.add_property(p, ordinal_color("background", "Background", [0.0, 0.0, 0.0, 1.0]));
/// net.set(bg, [2.0, -1.0, 0.5, 1.0]);
/// assert_eq!(net.get(bg), Some(&[1.0, 0.0, 0.5, 1.0]));
/// ```
#[must_use]
pub fn ordinal_color(
    identifier: impl Into<String>,
    display_name: impl Into<String>,
    value: [f32; 4],
) -> PropertyBuilder<[f32; 4]> {
    PropertyBuilder::new(identifier, display_name, value)
        .semantics(PropertySemantics::COLOR)
        .coerce(|c| c.map(|x| x.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let b = PropertyBuilder::new("a", "A", 1_i32);
        assert_eq!(b.invalidation_level, InvalidationLevel::InvalidOutput);
        assert_eq!(b.semantics, PropertySemantics::DEFAULT);
        assert!(b.visible);
        assert!(!b.read_only);
        assert!(b.serialization_mode.is_none());
        assert!(b.coerce.is_none());
    }

    #[test]
    fn erased_coerce_applies_to_matching_type() {
        let b = PropertyBuilder::new("a", "A", 1_i32).coerce(|v| v.min(10));
        let coerce = PropertyBuilder::erased_coerce(b.coerce).unwrap();
        let mut value = ErasedValue::new(50_i32);
        coerce(&mut value);
        assert_eq!(value.downcast_ref::<i32>(), Some(&10));

        let mut other = ErasedValue::new(50_i64);
        coerce(&mut other);
        assert_eq!(other.downcast_ref::<i64>(), Some(&50));
    }

    #[test]
    fn ordinal_color_is_color() {
        let b = ordinal_color("c", "C", [0.5; 4]);
        assert_eq!(b.semantics, PropertySemantics::COLOR);
        assert!(b.coerce.is_some());
    }

    #[test]
    fn builder_debug_mentions_coerce() {
        let b = PropertyBuilder::new("a", "A", 1_i32).coerce(|v| v);
        assert!(format!("{b:?}").contains("has_coerce: true"));
    }
}
