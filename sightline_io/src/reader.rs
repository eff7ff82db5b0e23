// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data readers and reader lookup.

use core::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::extension::FileExtension;

/// A file could not be turned into data.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Nothing exists at the path.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but its contents are not valid for the reader.
    #[error("could not parse {}: {message}", path.display())]
    Parse {
        /// The file being read.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
    /// Reading the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Shorthand for [`ReadError::Parse`].
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Reads files with one of its extensions into values of type `T`.
pub trait DataReader<T> {
    /// Extensions this reader handles.
    fn extensions(&self) -> &[FileExtension];

    /// Reads the file at `path`.
    fn read(&self, path: &Path) -> Result<T, ReadError>;
}

/// Chooses a reader producing `T` for a file.
pub trait DataReaderFactory<T> {
    /// Every extension some reader handles.
    fn extensions(&self) -> Vec<FileExtension>;

    /// A reader for `path`, preferring one registered for `selected`.
    ///
    /// Returns `None` when no reader handles either the selected extension or
    /// the file's own.
    fn reader_for(&self, selected: &FileExtension, path: &Path) -> Option<Rc<dyn DataReader<T>>>;
}

/// A [`DataReader`] backed by a closure.
///
/// ```rust
/// use std::path::Path;
/// use sightline_io::{DataReader, FileExtension, FnReader, ReadError};
///
/// let reader = FnReader::new(vec![FileExtension::new("txt", "Text")], |path: &Path| {
///     std::fs::read_to_string(path).map_err(ReadError::from)
/// });
/// assert_eq!(reader.extensions()[0].extension(), "txt");
/// ```
pub struct FnReader<F> {
    extensions: Vec<FileExtension>,
    read: F,
}

impl<F> FnReader<F> {
    /// Creates a reader for `extensions` that reads with `read`.
    #[must_use]
    pub fn new(extensions: Vec<FileExtension>, read: F) -> Self {
        Self { extensions, read }
    }
}

impl<F> fmt::Debug for FnReader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReader")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl<T, F> DataReader<T> for FnReader<F>
where
    F: Fn(&Path) -> Result<T, ReadError>,
{
    fn extensions(&self) -> &[FileExtension] {
        &self.extensions
    }

    fn read(&self, path: &Path) -> Result<T, ReadError> {
        (self.read)(path)
    }
}

/// A list of readers, searched in registration order.
///
/// ```rust
/// use std::path::Path;
/// use sightline_io::{DataReaderFactory, FileExtension, FnReader, ReadError, ReaderRegistry};
///
/// let mut readers = ReaderRegistry::<String>::new();
/// readers.register(FnReader::new(
///     vec![FileExtension::new("txt", "Text")],
///     |_: &Path| Ok(String::new()),
/// ));
///
/// let none = FileExtension::default();
/// assert!(readers.reader_for(&none, Path::new("notes.TXT")).is_some());
/// assert!(readers.reader_for(&none, Path::new("notes.md")).is_none());
/// ```
pub struct ReaderRegistry<T> {
    readers: Vec<Rc<dyn DataReader<T>>>,
}

impl<T> Default for ReaderRegistry<T> {
    fn default() -> Self {
        Self {
            readers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for ReaderRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderRegistry")
            .field("readers", &self.readers.len())
            .finish()
    }
}

impl<T> ReaderRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reader after the ones already registered.
    pub fn register(&mut self, reader: impl DataReader<T> + 'static) {
        self.readers.push(Rc::new(reader));
    }

    /// Number of registered readers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    /// Returns `true` if no reader is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl<T> DataReaderFactory<T> for ReaderRegistry<T> {
    fn extensions(&self) -> Vec<FileExtension> {
        self.readers
            .iter()
            .flat_map(|r| r.extensions().iter().cloned())
            .collect()
    }

    fn reader_for(&self, selected: &FileExtension, path: &Path) -> Option<Rc<dyn DataReader<T>>> {
        if !selected.is_empty()
            && let Some(reader) = self.readers.iter().find(|r| {
                r.extensions()
                    .iter()
                    .any(|e| e.extension() == selected.extension())
            })
        {
            return Some(reader.clone());
        }
        self.readers
            .iter()
            .find(|r| r.extensions().iter().any(|e| !e.is_empty() && e.matches(path)))
            .cloned()
    }
}
