// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! File extension filters.

use core::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sightline_network::{OptionValue, PropertyValue};

/// A file extension with a human-readable description, as used in file
/// dialog filters such as `Raw volume (*.raw)`.
///
/// The extension is stored lower-case and without the leading `*.`. An empty
/// extension, like `*`, matches every file.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileExtension {
    extension: String,
    description: String,
}

impl FileExtension {
    /// Creates an extension; `extension` is lower-cased.
    #[must_use]
    pub fn new(extension: impl AsRef<str>, description: impl Into<String>) -> Self {
        Self {
            extension: extension.as_ref().to_lowercase(),
            description: description.into(),
        }
    }

    /// The `All Files (*.*)` filter.
    #[must_use]
    pub fn all() -> Self {
        Self::new("*", "All Files")
    }

    /// Parses a filter string of the form `Description (*.ext)`.
    ///
    /// The description is everything before the first `(`, with trailing
    /// whitespace removed. The extension is what lies between that `(` and
    /// the last `)`, lower-cased, without a leading `*.`; `*` and `*.*` give
    /// the empty, match-anything extension. Strings without a parenthesized
    /// part give the default (empty) extension.
    ///
    /// ```rust
    /// use sightline_io::FileExtension;
    ///
    /// let ext = FileExtension::from_filter_string("Raw volume (*.RAW)");
    /// assert_eq!(ext.extension(), "raw");
    /// assert_eq!(ext.description(), "Raw volume");
    ///
    /// let any = FileExtension::from_filter_string("Everything (*.*)");
    /// assert!(any.extension().is_empty());
    ///
    /// assert_eq!(FileExtension::from_filter_string("no filter"), FileExtension::default());
    /// ```
    #[must_use]
    pub fn from_filter_string(filter: &str) -> Self {
        let Some(open) = filter.find('(') else {
            return Self::default();
        };
        let Some(close) = filter.rfind(')') else {
            return Self::default();
        };
        if close < open {
            return Self::default();
        }
        let description = filter[..open]
            .trim_end_matches([' ', '\t', '\n', '\r', '('])
            .to_owned();

        let mut extension = filter[open + 1..close].to_lowercase();
        if extension == "*" || extension == "*.*" {
            extension.clear();
        }
        if let Some(stripped) = extension.strip_prefix("*.") {
            extension = stripped.to_owned();
        }
        Self {
            extension,
            description,
        }
    }

    /// The lower-case extension, without a leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` for the empty extension, which also stands for "no
    /// reader" in reader selections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extension.is_empty()
    }

    /// Whether a file name ends in this extension, ignoring case.
    ///
    /// The empty extension and `*` match everything.
    ///
    /// ```rust
    /// use sightline_io::FileExtension;
    ///
    /// let dat = FileExtension::new("dat", "Volume descriptor");
    /// assert!(dat.matches("/data/Head.DAT"));
    /// assert!(!dat.matches("/data/head.raw"));
    /// assert!(!dat.matches("/data/dat"));
    /// assert!(FileExtension::all().matches("anything"));
    /// ```
    #[must_use]
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        if self.extension.is_empty() || self.extension == "*" {
            return true;
        }
        let Some(name) = path.as_ref().file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        name.len() > self.extension.len()
            && name.ends_with(&self.extension)
            && name[..name.len() - self.extension.len()].ends_with('.')
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extension.is_empty() {
            write!(f, "{} (*)", self.description)
        } else {
            write!(f, "{} (*.{})", self.description, self.extension)
        }
    }
}

impl PropertyValue for FileExtension {
    const CLASS_IDENTIFIER: &'static str = "org.sightline.FileExtensionProperty";
}

impl OptionValue for FileExtension {
    const OPTION_CLASS_IDENTIFIER: &'static str = "org.sightline.OptionPropertyFileExtension";
}
