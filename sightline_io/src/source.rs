// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A source processor that loads a file into an outport.

use core::cell::Cell;
use core::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use sightline_network::{
    Button, Network, OptionEntry, Options, OutportKey, Process, ProcessorId, Property,
    PropertyBuilder,
};

use crate::extension::FileExtension;
use crate::reader::DataReaderFactory;

type DataHook<T> = Box<dyn FnMut(&mut Network, ProcessorId, &Rc<T>)>;

/// Processor behavior that reads a file with a reader chosen from a
/// [`DataReaderFactory`] and publishes the data on its `data` outport.
///
/// It adds three properties to its processor:
///
/// - `filename` (`File`): the path to load,
/// - `reader` (`Data Reader`): the selected [`FileExtension`], one entry per
///   extension the factory offers plus a `noreader` entry,
/// - `reload` (`Reload data`): a button that loads the file again.
///
/// Data is loaded when the processor is evaluated after the file changed or
/// reload was pressed. The processor is only ready while the file exists, a
/// reader is selected, and the last load did not fail. A failed load is
/// logged, detaches the outport, and keeps the processor from being ready
/// until one of the three properties changes.
///
/// ```rust
/// use std::path::Path;
/// use std::rc::Rc;
/// use sightline_io::{DataSource, FileExtension, FnReader, ReadError, ReaderRegistry};
/// use sightline_network::{Network, ProcessorInfo};
///
/// let mut readers = ReaderRegistry::<String>::new();
/// readers.register(FnReader::new(
///     vec![FileExtension::new("txt", "Text")],
///     |path: &Path| std::fs::read_to_string(path).map_err(ReadError::from),
/// ));
///
/// let mut net = Network::new();
/// let p = net.add_processor("text", ProcessorInfo::new("org.example.TextSource", "Text Source"));
/// let source = DataSource::<String>::new(&mut net, p, Rc::new(readers));
/// let reader = source.reader();
/// net.set_behavior(p, source);
///
/// let labels: Vec<&str> = net
///     .get(reader)
///     .unwrap()
///     .entries()
///     .iter()
///     .map(|e| e.display_name.as_str())
///     .collect();
/// assert_eq!(labels, ["Text (*.txt)", "No available reader"]);
/// ```
pub struct DataSource<T> {
    factory: Rc<dyn DataReaderFactory<T>>,
    file: Property<PathBuf>,
    reader: Property<Options<FileExtension>>,
    reload: Property<Button>,
    outport: OutportKey<T>,
    loading_failed: Rc<Cell<bool>>,
    deserialized: bool,
    loaded: Option<Rc<T>>,
    on_loaded: Option<DataHook<T>>,
    on_deserialized: Option<DataHook<T>>,
}

impl<T: 'static> DataSource<T> {
    /// Adds the properties and the `data` outport to `processor` and wires up
    /// their change callbacks.
    ///
    /// The returned behavior still has to be attached with
    /// [`Network::set_behavior`].
    ///
    /// # Panics
    ///
    /// Panics if `processor` is stale or already has one of the properties or
    /// the outport.
    pub fn new(
        network: &mut Network,
        processor: ProcessorId,
        factory: Rc<dyn DataReaderFactory<T>>,
    ) -> Self {
        let file = network.add_property(
            processor,
            PropertyBuilder::new("filename", "File", PathBuf::new()),
        );
        let reader = network.add_property(
            processor,
            PropertyBuilder::new("reader", "Data Reader", Options::default()),
        );
        let reload = network.add_property(
            processor,
            PropertyBuilder::new("reload", "Reload data", Button),
        );
        let outport = network.add_outport(processor, "data");

        update_filename_filters(network, &*factory, reader);
        update_reader_from_file(network, file, reader);

        let loading_failed = Rc::new(Cell::new(false));
        let failed = loading_failed.clone();
        network.on_change(file, move |network| {
            failed.set(false);
            update_reader_from_file(network, file, reader);
        });
        let failed = loading_failed.clone();
        network.on_change(reader, move |_| failed.set(false));
        let failed = loading_failed.clone();
        network.on_change(reload, move |_| failed.set(false));

        Self {
            factory,
            file,
            reader,
            reload,
            outport,
            loading_failed,
            deserialized: false,
            loaded: None,
            on_loaded: None,
            on_deserialized: None,
        }
    }

    /// Runs `hook` after every successful load, except the first load after
    /// the network was deserialized.
    #[must_use]
    pub fn on_data_loaded(
        mut self,
        hook: impl FnMut(&mut Network, ProcessorId, &Rc<T>) + 'static,
    ) -> Self {
        self.on_loaded = Some(Box::new(hook));
        self
    }

    /// Runs `hook` instead of the loaded hook for the first load after the
    /// network was deserialized.
    #[must_use]
    pub fn on_data_deserialized(
        mut self,
        hook: impl FnMut(&mut Network, ProcessorId, &Rc<T>) + 'static,
    ) -> Self {
        self.on_deserialized = Some(Box::new(hook));
        self
    }

    /// The `filename` property.
    #[must_use]
    pub fn file(&self) -> Property<PathBuf> {
        self.file
    }

    /// The `reader` property.
    #[must_use]
    pub fn reader(&self) -> Property<Options<FileExtension>> {
        self.reader
    }

    /// The `reload` button.
    #[must_use]
    pub fn reload(&self) -> Property<Button> {
        self.reload
    }

    /// The `data` outport.
    #[must_use]
    pub fn outport(&self) -> OutportKey<T> {
        self.outport
    }

    /// The data of the last successful load.
    #[must_use]
    pub fn loaded_data(&self) -> Option<&Rc<T>> {
        self.loaded.as_ref()
    }

    /// Whether the last load attempt failed.
    #[must_use]
    pub fn loading_failed(&self) -> bool {
        self.loading_failed.get()
    }

    fn load(&mut self, network: &mut Network, processor: ProcessorId, deserialized: bool) {
        let Some(path) = network.get(self.file).cloned() else {
            return;
        };
        if path.as_os_str().is_empty() {
            return;
        }
        let selected = network
            .get(self.reader)
            .and_then(|options| options.selected_value())
            .cloned()
            .unwrap_or_default();

        let Some(reader) = self.factory.reader_for(&selected, &path) else {
            log::error!(
                "{}: could not find a data reader for file: {}",
                processor_name(network, processor),
                path.display()
            );
            self.fail(network);
            return;
        };
        match reader.read(&path) {
            Ok(data) => {
                let data = Rc::new(data);
                network.set_output_rc(self.outport, data.clone());
                self.loaded = Some(data.clone());
                log::debug!("loaded {}", path.display());
                let hook = if deserialized {
                    &mut self.on_deserialized
                } else {
                    &mut self.on_loaded
                };
                if let Some(hook) = hook {
                    hook(network, processor, &data);
                }
            }
            Err(err) => {
                log::error!(
                    "{}: could not load data: {}, {err}",
                    processor_name(network, processor),
                    path.display()
                );
                self.fail(network);
            }
        }
    }

    fn fail(&self, network: &mut Network) {
        self.loading_failed.set(true);
        network.detach_output(self.outport);
    }
}

fn processor_name(network: &Network, processor: ProcessorId) -> String {
    network
        .owner_identifier(processor)
        .unwrap_or("<removed>")
        .to_owned()
}

impl<T: 'static> Process for DataSource<T> {
    fn process(&mut self, network: &mut Network, processor: ProcessorId) {
        if network.is_modified(self.file) || network.is_modified(self.reload) {
            let deserialized = core::mem::take(&mut self.deserialized);
            self.load(network, processor, deserialized);
        }
    }

    fn is_ready(&self, network: &Network, _: ProcessorId) -> bool {
        !self.loading_failed.get()
            && network.get(self.file).is_some_and(|path| path.is_file())
            && network
                .get(self.reader)
                .and_then(|options| options.selected_value())
                .is_some_and(|ext| !ext.is_empty())
    }

    fn deserialized(&mut self, network: &mut Network, _: ProcessorId) {
        update_filename_filters(network, &*self.factory, self.reader);
        self.deserialized = true;
    }
}

impl<T> fmt::Debug for DataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("file", &self.file)
            .field("reader", &self.reader)
            .field("reload", &self.reload)
            .field("outport", &self.outport)
            .field("loading_failed", &self.loading_failed.get())
            .field("deserialized", &self.deserialized)
            .field("loaded", &self.loaded.is_some())
            .finish_non_exhaustive()
    }
}

/// Rebuilds the reader choices from the extensions `factory` offers.
///
/// Extensions are sorted and labelled with their filter string; a final
/// `noreader` entry holds the empty extension. The current selection is kept
/// if it is still offered.
pub fn update_filename_filters<T>(
    network: &mut Network,
    factory: &dyn DataReaderFactory<T>,
    reader: Property<Options<FileExtension>>,
) {
    let mut extensions = factory.extensions();
    extensions.sort();
    let mut entries: Vec<OptionEntry<FileExtension>> = extensions
        .into_iter()
        .map(|ext| {
            let label = ext.to_string();
            OptionEntry::new(label.clone(), label, ext)
        })
        .collect();
    entries.push(OptionEntry::new(
        "noreader",
        "No available reader",
        FileExtension::default(),
    ));
    network.update(reader, |options| options.replace(entries));
}

/// Selects a reader matching the current file.
///
/// A selected reader that already matches the file is kept. Otherwise the
/// first non-empty choice matching the file is selected, or the empty
/// (`noreader`) choice if none does.
pub fn update_reader_from_file(
    network: &mut Network,
    file: Property<PathBuf>,
    reader: Property<Options<FileExtension>>,
) {
    let Some(path) = network.get(file).cloned() else {
        return;
    };
    network.update(reader, |options| {
        if options
            .selected_value()
            .is_some_and(|ext| !ext.is_empty() && ext.matches(&path))
        {
            return;
        }
        let entries = options.entries();
        let index = entries
            .iter()
            .position(|e| !e.value.is_empty() && e.value.matches(&path))
            .or_else(|| entries.iter().position(|e| e.value.is_empty()));
        if let Some(index) = index {
            options.select_index(index);
        }
    });
}
