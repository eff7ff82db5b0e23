// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `VolumeNormalization` processor inside a network.
//!
//! A behavior-less source processor holds the input volume; feeding a new
//! volume invalidates it so the normalization runs downstream of it.

use std::rc::Rc;

use sightline_datamapper::{DataFormat, ScalarType, Span};
use sightline_network::{
    InvalidationLevel, Network, OutportKey, ProcessorId, ProcessorInfo, Property,
};
use sightline_processors::{Volume, VolumeNormalization};

struct Setup {
    net: Network,
    source: ProcessorId,
    norm: ProcessorId,
    input: OutportKey<Volume>,
    output: OutportKey<Volume>,
}

impl Setup {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut net = Network::new();
        let source = net.add_processor(
            "source",
            ProcessorInfo::new("org.test.VolumeSource", "Volume Source"),
        );
        let input = net.add_outport::<Volume>(source, "volume");
        let norm = VolumeNormalization::add(&mut net, "normalize");
        let behavior = net.behavior::<VolumeNormalization>(norm).unwrap();
        let (inport, output) = (behavior.inport(), behavior.outport());
        net.connect(input, inport).unwrap();
        Self {
            net,
            source,
            norm,
            input,
            output,
        }
    }

    fn feed(&mut self, volume: Volume) {
        self.net.set_output(self.input, volume);
        self.net.invalidate(self.source, InvalidationLevel::InvalidOutput);
        self.net.evaluate();
    }

    fn channel_identifiers(&self) -> Vec<String> {
        let group = self.net.find_owner(&["normalize", "channels"]).unwrap();
        self.net
            .properties_of(group)
            .map(|p| self.net.identifier(p).unwrap().to_owned())
            .collect()
    }

    fn toggle(&self, channel: usize) -> Property<bool> {
        let name = format!("channel{channel}");
        let id = self
            .net
            .find_property(&["normalize", "channels", name.as_str()])
            .unwrap();
        self.net.typed(id).unwrap()
    }

    fn result(&self) -> Rc<Volume> {
        self.net.output(self.output).unwrap()
    }
}

fn volume(channels: u8, data: Vec<f64>) -> Volume {
    let format = DataFormat::new(ScalarType::UInt8, channels);
    let voxels = data.len() / usize::from(channels);
    Volume::new([voxels, 1, 1], format, data).unwrap()
}

#[test]
fn channel_toggles_follow_the_input() {
    let mut s = Setup::new();
    assert!(s.channel_identifiers().is_empty());

    s.feed(volume(2, vec![0.0, 255.0, 51.0, 102.0]));
    assert_eq!(s.channel_identifiers(), ["channel0", "channel1"]);
    assert_eq!(s.result().data(), &[0.0, 1.0, 0.2, 0.4]);

    s.feed(volume(3, vec![255.0, 0.0, 51.0]));
    assert_eq!(s.channel_identifiers(), ["channel0", "channel1", "channel2"]);
    assert_eq!(s.net.display_name(s.toggle(2)), Some("Channel 2"));
}

#[test]
fn toggles_survive_same_channel_count() {
    let mut s = Setup::new();
    s.feed(volume(2, vec![0.0, 255.0]));
    let first = s.toggle(0);
    s.net.set(first, false);
    assert_eq!(
        s.net.invalidation_level(s.norm),
        InvalidationLevel::InvalidOutput
    );
    s.net.evaluate();
    assert_eq!(s.result().data(), &[0.0, 1.0]);

    s.feed(volume(2, vec![255.0, 51.0]));
    assert_eq!(s.toggle(0), first);
    assert_eq!(s.net.get(first), Some(&false));
    assert_eq!(s.result().data(), &[255.0, 0.2]);
}

#[test]
fn nothing_selected_passes_the_volume_through() {
    let mut s = Setup::new();
    s.feed(volume(1, vec![0.0, 51.0]));
    let only = s.toggle(0);
    s.net.set(only, false);
    s.net.evaluate();

    let input = s.net.output(s.input).unwrap();
    let output = s.result();
    assert!(Rc::ptr_eq(&input, &output));
    assert_eq!(output.data_map.data_range, Span::new(0.0, 255.0));
}

#[test]
fn normalized_output_is_float_in_unit_range() {
    let mut s = Setup::new();
    let mut input = volume(1, vec![10.0, 20.0, 30.0]);
    input.data_map.data_range = Span::new(10.0, 30.0);
    s.feed(input);

    let out = s.result();
    assert_eq!(out.data(), &[0.0, 0.5, 1.0]);
    assert_eq!(out.format(), DataFormat::FLOAT32);
    assert_eq!(out.data_map.data_range, Span::NORMALIZED);
    assert_eq!(s.net.invalidation_level(s.norm), InvalidationLevel::Valid);
}
