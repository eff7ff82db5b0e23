// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property attributes and their default tracking.

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serialize::DeserializeIssue;

/// How much work a change requires from the owning processor.
///
/// Levels are ordered; combining two invalidations keeps the larger one.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum InvalidationLevel {
    /// Nothing to do.
    #[default]
    Valid,
    /// Outputs must be recomputed.
    InvalidOutput,
    /// Resources (shaders, buffers) must be rebuilt before recomputing outputs.
    InvalidResources,
}

/// Who a property is meant for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageMode {
    /// Shown to every user.
    #[default]
    Application,
    /// Only shown in developer mode.
    Development,
}

/// Which fields of a property record are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationMode {
    /// Only fields that differ from their default.
    #[default]
    Default,
    /// Every field.
    All,
    /// Nothing; the property is skipped when its owner is serialized.
    None,
}

/// Presentation hint for widgets, such as `Color` for a color picker.
///
/// Semantics are open-ended strings; the associated constants cover the
/// common cases.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySemantics(Cow<'static, str>);

impl PropertySemantics {
    /// Plain editor for the value type.
    pub const DEFAULT: Self = Self::from_static("Default");
    /// Color picker.
    pub const COLOR: Self = Self::from_static("Color");
    /// Single line text.
    pub const TEXT: Self = Self::from_static("Text");
    /// Multi-line text.
    pub const MULTILINE_TEXT: Self = Self::from_static("Multiline");
    /// Text editor window.
    pub const TEXT_EDITOR: Self = Self::from_static("TextEditor");
    /// Light position widget.
    pub const LIGHT_POSITION: Self = Self::from_static("LightPosition");
    /// Spherical coordinate editor.
    pub const SPHERICAL: Self = Self::from_static("Spherical");

    /// Creates a semantics tag from a static string.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a semantics tag from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The tag string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PropertySemantics {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for PropertySemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertySemantics({})", self.0)
    }
}

impl fmt::Display for PropertySemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attribute change delivered to attribute observers.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeChange {
    /// The identifier changed.
    Identifier(String),
    /// The display name changed.
    DisplayName(String),
    /// The read-only flag changed.
    ReadOnly(bool),
    /// The visibility changed.
    Visible(bool),
    /// The usage mode changed.
    UsageMode(UsageMode),
    /// The semantics changed.
    Semantics(PropertySemantics),
}

/// A value together with the default it is compared against for serialization.
///
/// ```rust
/// use sightline_network::Tracked;
///
/// let mut visible = Tracked::new("visible", true);
/// assert!(visible.is_default());
/// visible.set(false);
/// assert!(!visible.is_default());
/// visible.set_as_default();
/// assert!(visible.is_default());
/// visible.set(true);
/// visible.reset();
/// assert_eq!(*visible.value(), false);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tracked<T> {
    name: &'static str,
    value: T,
    default: T,
}

impl<T: Clone + PartialEq> Tracked<T> {
    /// Creates a tracked value whose default is `value`.
    #[must_use]
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            default: value.clone(),
            value,
        }
    }

    /// Field name used in serialized records.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Default snapshot.
    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Sets the value; returns `true` if it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Returns `true` if the value equals its default snapshot.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.value == self.default
    }

    /// Snapshots the current value as the default.
    pub fn set_as_default(&mut self) {
        self.default = self.value.clone();
    }

    /// Restores the default; returns `true` if the value changed.
    pub fn reset(&mut self) -> bool {
        let default = self.default.clone();
        self.set(default)
    }
}

impl<T: Clone + PartialEq + Serialize + DeserializeOwned> Tracked<T> {
    /// Writes the field if `mode` asks for it.
    pub(crate) fn write(
        &self,
        record: &mut Map<String, Value>,
        mode: SerializationMode,
    ) -> Result<(), serde_json::Error> {
        if mode == SerializationMode::All || !self.is_default() {
            record.insert(self.name.to_owned(), serde_json::to_value(&self.value)?);
        }
        Ok(())
    }

    /// Reads the field if present; a malformed field is reported and the
    /// current value kept.
    pub(crate) fn read(&mut self, record: &Map<String, Value>, issues: &mut Vec<DeserializeIssue>) {
        let Some(json) = record.get(self.name) else {
            return;
        };
        match T::deserialize(json) {
            Ok(value) => self.value = value,
            Err(err) => issues.push(DeserializeIssue::Field {
                field: self.name,
                message: err.to_string(),
            }),
        }
    }
}
