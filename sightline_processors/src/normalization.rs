// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-channel volume normalization.

use sightline_datamapper::{DataFormat, ScalarType};
use sightline_network::{
    CodeState, InportKey, Network, OutportKey, OwnerId, Process, ProcessorId, ProcessorInfo,
    ProcessorTags, PropertyBuilder,
};

use crate::volume::Volume;

/// Maps the selected channels of a volume from its data range to `[0, 1]`.
///
/// Unselected channels are copied unchanged. The result is a `Float32`
/// volume whose data and value ranges are both `[0, 1]`.
///
/// A volume carries one [`DataMapper`](sightline_datamapper::DataMapper) for
/// all channels, so the `[0, 1]` ranges only describe the normalized ones.
/// Unselected channels keep their raw samples, which may lie outside `[0, 1]`;
/// callers that need their original range should read it from the input.
///
/// # Panics
///
/// Panics if `selected` has fewer entries than the volume has channels.
#[must_use]
pub fn normalize_channels(volume: &Volume, selected: &[bool]) -> Volume {
    let channels = volume.channels();
    let map = &volume.data_map;
    let mut out = volume.clone();
    for (index, sample) in out.data_mut().iter_mut().enumerate() {
        if selected[index % channels] {
            *sample = map.map_from_data_to_normalized(*sample);
        }
    }
    out.set_format(DataFormat::new(ScalarType::Float32, volume.format().components()));
    out
}

/// Processor behavior normalizing selected channels of its input volume.
///
/// The processor has a `volumeInport`, a `volumeOutport` and a `channels`
/// group holding one bool property per input channel (`channel0`,
/// `channel1`, ...), all enabled by default. The group is rebuilt whenever a
/// volume with a different channel count arrives; existing choices survive as
/// long as the count stays the same.
///
/// With no channel selected the input volume is passed through as is.
///
/// ```rust
/// use sightline_datamapper::DataFormat;
/// use sightline_network::{Network, ProcessorInfo};
/// use sightline_processors::{Volume, VolumeNormalization};
///
/// let mut net = Network::new();
/// let source = net.add_processor("source", ProcessorInfo::new("org.example.Source", "Source"));
/// let volume = net.add_outport::<Volume>(source, "volume");
/// let norm = VolumeNormalization::add(&mut net, "normalize");
/// let behavior = net.behavior::<VolumeNormalization>(norm).unwrap();
/// let (inport, outport) = (behavior.inport(), behavior.outport());
/// net.connect(volume, inport).unwrap();
///
/// net.set_output(volume, Volume::new([2, 1, 1], DataFormat::UINT8, vec![0.0, 51.0]).unwrap());
/// net.evaluate();
/// assert_eq!(net.output(outport).unwrap().data(), &[0.0, 0.2]);
/// ```
#[derive(Debug)]
pub struct VolumeNormalization {
    inport: InportKey<Volume>,
    outport: OutportKey<Volume>,
    channels: OwnerId,
}

impl VolumeNormalization {
    /// Class identifier of the processor.
    pub const CLASS_IDENTIFIER: &'static str = "org.sightline.VolumeNormalization";

    /// Processor description.
    #[must_use]
    pub fn info() -> ProcessorInfo {
        ProcessorInfo::new(Self::CLASS_IDENTIFIER, "Volume Normalization")
            .category("Volume Operation")
            .code_state(CodeState::Stable)
            .tags(ProcessorTags::CPU)
    }

    /// Adds a normalization processor with its ports, properties and behavior.
    ///
    /// # Panics
    ///
    /// Panics if `identifier` is already used by another processor.
    pub fn add(network: &mut Network, identifier: &str) -> ProcessorId {
        let processor = network.add_processor(identifier, Self::info());
        let behavior = Self::new(network, processor);
        network.set_behavior(processor, behavior);
        processor
    }

    /// Adds the ports and the `channels` group to `processor`.
    ///
    /// # Panics
    ///
    /// Panics if `processor` is stale or already has the ports or group.
    pub fn new(network: &mut Network, processor: ProcessorId) -> Self {
        let inport = network.add_inport::<Volume>(processor, "volumeInport");
        let outport = network.add_outport::<Volume>(processor, "volumeOutport");
        let channels = network.add_group(processor, "channels", "Channels");
        network.on_inport_change(inport, move |network| {
            update_channel_properties(network, inport, channels);
        });
        Self {
            inport,
            outport,
            channels,
        }
    }

    /// The volume inport.
    #[must_use]
    pub fn inport(&self) -> InportKey<Volume> {
        self.inport
    }

    /// The volume outport.
    #[must_use]
    pub fn outport(&self) -> OutportKey<Volume> {
        self.outport
    }

    /// The group holding the per-channel toggles.
    #[must_use]
    pub fn channels(&self) -> OwnerId {
        self.channels
    }

    fn selected_channels(&self, network: &Network) -> Vec<bool> {
        network
            .properties_of(self.channels)
            .map(|p| {
                network
                    .get_erased(p)
                    .and_then(|v| v.downcast_ref::<bool>())
                    .copied()
                    .unwrap_or(false)
            })
            .collect()
    }
}

fn update_channel_properties(network: &mut Network, inport: InportKey<Volume>, channels: OwnerId) {
    let Some(volume) = network.input(inport) else {
        return;
    };
    let count = volume.channels();
    if network.children(channels).len() == count {
        return;
    }
    log::debug!("rebuilding channel toggles for {count} channel(s)");
    let mut network = network.lock();
    network.clear_group(channels);
    for i in 0..count {
        network.add_property(
            channels,
            PropertyBuilder::new(format!("channel{i}"), format!("Channel {i}"), true),
        );
    }
}

impl Process for VolumeNormalization {
    fn process(&mut self, network: &mut Network, _: ProcessorId) {
        let Some(volume) = network.input(self.inport) else {
            network.detach_output(self.outport);
            return;
        };
        let mut selected = self.selected_channels(network);
        if !selected.iter().any(|s| *s) {
            network.set_output_rc(self.outport, volume);
            return;
        }
        selected.resize(volume.channels(), false);
        network.set_output(self.outport, normalize_channels(&volume, &selected));
    }
}
