// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Option properties: a list of named choices plus a selection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::PropertyValue;

/// Types that can be offered as choices of an option property.
pub trait OptionValue: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Class identifier of option properties over this type.
    const OPTION_CLASS_IDENTIFIER: &'static str;
}

impl OptionValue for i32 {
    const OPTION_CLASS_IDENTIFIER: &'static str = "org.sightline.OptionPropertyInt";
}

impl OptionValue for String {
    const OPTION_CLASS_IDENTIFIER: &'static str = "org.sightline.OptionPropertyString";
}

/// One choice of an option property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry<T> {
    /// Stable identifier, used to restore the selection.
    pub identifier: String,
    /// Label shown to the user.
    pub display_name: String,
    /// The value selected by this choice.
    pub value: T,
}

impl<T> OptionEntry<T> {
    /// Creates an entry.
    #[must_use]
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>, value: T) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            value,
        }
    }
}

/// Value of an option property.
///
/// Replacing the choices keeps the selection if an entry with the same
/// identifier is still offered, and falls back to the first entry otherwise.
///
/// ```rust
/// use sightline_network::{OptionEntry, Options};
///
/// let mut shading = Options::new(vec![
///     OptionEntry::new("none", "No Shading", 0),
///     OptionEntry::new("phong", "Phong", 1),
/// ]);
/// assert!(shading.select_identifier("phong"));
/// assert_eq!(shading.selected_value(), Some(&1));
///
/// shading.replace(vec![
///     OptionEntry::new("phong", "Phong", 1),
///     OptionEntry::new("blinn", "Blinn-Phong", 2),
/// ]);
/// assert_eq!(shading.selected_identifier(), Some("phong"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options<T> {
    entries: Vec<OptionEntry<T>>,
    selected: usize,
}

impl<T> Default for Options<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
        }
    }
}

impl<T: PartialEq> Options<T> {
    /// Creates options with the first entry selected.
    #[must_use]
    pub fn new(entries: Vec<OptionEntry<T>>) -> Self {
        Self {
            entries,
            selected: 0,
        }
    }

    /// The offered entries, in display order.
    #[must_use]
    pub fn entries(&self) -> &[OptionEntry<T>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is nothing to choose from.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the selected entry, if any entries exist.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        (self.selected < self.entries.len()).then_some(self.selected)
    }

    /// The selected entry.
    #[must_use]
    pub fn selected(&self) -> Option<&OptionEntry<T>> {
        self.entries.get(self.selected)
    }

    /// Value of the selected entry.
    #[must_use]
    pub fn selected_value(&self) -> Option<&T> {
        self.selected().map(|e| &e.value)
    }

    /// Identifier of the selected entry.
    #[must_use]
    pub fn selected_identifier(&self) -> Option<&str> {
        self.selected().map(|e| e.identifier.as_str())
    }

    /// Selects by index; returns `false` if out of range.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Selects the first entry with the given identifier.
    pub fn select_identifier(&mut self, identifier: &str) -> bool {
        match self.entries.iter().position(|e| e.identifier == identifier) {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    /// Selects the first entry with the given value.
    pub fn select_value(&mut self, value: &T) -> bool {
        match self.entries.iter().position(|e| &e.value == value) {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    /// Replaces the entries, keeping the selection by identifier when possible.
    pub fn replace(&mut self, entries: Vec<OptionEntry<T>>) {
        let keep = self
            .selected()
            .and_then(|current| entries.iter().position(|e| e.identifier == current.identifier));
        self.entries = entries;
        self.selected = keep.unwrap_or(0);
    }
}

impl<T: OptionValue> PropertyValue for Options<T> {
    const CLASS_IDENTIFIER: &'static str = T::OPTION_CLASS_IDENTIFIER;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes() -> Options<i32> {
        Options::new(vec![
            OptionEntry::new("a", "A", 1),
            OptionEntry::new("b", "B", 2),
            OptionEntry::new("c", "C", 3),
        ])
    }

    #[test]
    fn selection_by_index_identifier_value() {
        let mut opts = modes();
        assert_eq!(opts.selected_index(), Some(0));
        assert!(opts.select_value(&3));
        assert_eq!(opts.selected_identifier(), Some("c"));
        assert!(opts.select_identifier("b"));
        assert_eq!(opts.selected_value(), Some(&2));
        assert!(!opts.select_index(9));
        assert!(!opts.select_identifier("zzz"));
        assert_eq!(opts.selected_index(), Some(1));
    }

    #[test]
    fn replace_falls_back_to_first() {
        let mut opts = modes();
        opts.select_identifier("c");
        opts.replace(vec![OptionEntry::new("x", "X", 9), OptionEntry::new("y", "Y", 8)]);
        assert_eq!(opts.selected_identifier(), Some("x"));
    }

    #[test]
    fn empty_options_have_no_selection() {
        let opts: Options<i32> = Options::default();
        assert!(opts.is_empty());
        assert_eq!(opts.selected_index(), None);
        assert_eq!(opts.selected_value(), None);
    }

    #[test]
    fn serialized_shape() {
        let opts = modes();
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["selected"], 0);
        assert_eq!(json["entries"][1]["displayName"], "B");
        assert_eq!(
            <Options<String> as PropertyValue>::CLASS_IDENTIFIER,
            "org.sightline.OptionPropertyString"
        );
    }
}
