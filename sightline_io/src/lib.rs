// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sightline IO: file extension filters, data readers and a file source
//! processor for [`sightline_network`].
//!
//! - [`FileExtension`] parses and matches filter strings like
//!   `Raw volume (*.raw)`.
//! - [`DataReader`] and [`DataReaderFactory`] turn files into typed data;
//!   [`ReaderRegistry`] is a factory over a list of readers.
//! - [`DataSource`] is a processor behavior that loads the selected file with
//!   a matching reader and publishes the result on an outport.

mod extension;
mod reader;
mod source;

pub use extension::FileExtension;
pub use reader::{DataReader, DataReaderFactory, FnReader, ReadError, ReaderRegistry};
pub use source::{DataSource, update_filename_filters, update_reader_from_file};
