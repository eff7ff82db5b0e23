// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for saving and restoring network state as JSON.
//!
//! A network is built, edited and serialized, then the record is applied to a
//! freshly built network of the same shape.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use sightline_network::{
    AttributeChange, DeserializeIssue, Network, OptionEntry, Options, Process, ProcessorId,
    ProcessorInfo, Property, PropertyBuilder, ordinal_color,
};

struct Handles {
    sink: ProcessorId,
    threshold: Property<f64>,
    color: Property<[f32; 4]>,
    mode: Property<Options<i32>>,
    mirror: Property<f64>,
}

fn build() -> (Network, Handles) {
    let mut net = Network::new();
    let source = net.add_processor("source", ProcessorInfo::new("org.test.Source", "Source"));
    let sink = net.add_processor("sink", ProcessorInfo::new("org.test.Sink", "Sink"));
    let out = net.add_outport::<u8>(source, "outport");
    let inp = net.add_inport::<u8>(sink, "inport");
    net.connect(out, inp).unwrap();

    let threshold = net.add_property(source, PropertyBuilder::new("threshold", "Threshold", 0.5));
    let style = net.add_group(source, "style", "Style");
    let color = net.add_property(style, ordinal_color("color", "Color", [1.0, 1.0, 1.0, 1.0]));
    let mode = net.add_property(
        style,
        PropertyBuilder::new(
            "mode",
            "Mode",
            Options::new(vec![
                OptionEntry::new("lines", "Lines", 0),
                OptionEntry::new("fill", "Fill", 1),
            ]),
        ),
    );
    let mirror = net.add_property(sink, PropertyBuilder::new("threshold", "Threshold", 0.5));
    (
        net,
        Handles {
            sink,
            threshold,
            color,
            mode,
            mirror,
        },
    )
}

#[test]
fn round_trip_restores_values_connections_and_links() {
    let (mut net, h) = build();
    net.add_link(h.threshold, h.mirror).unwrap();
    net.set(h.threshold, 0.8);
    net.set(h.color, [0.2, 0.4, 0.6, 1.0]);
    net.update(h.mode, |m| {
        m.select_identifier("fill");
    });
    net.set_visible(h.mode, false);
    let record = net.serialize().unwrap();

    let (mut fresh, f) = build();
    fresh.disconnect(
        fresh.connections()[0].outport,
        fresh.connections()[0].inport,
    );
    let issues = fresh.deserialize(&record);
    assert!(issues.is_empty(), "{issues:?}");

    assert_eq!(fresh.get(f.threshold), Some(&0.8));
    assert_eq!(fresh.get(f.mirror), Some(&0.8));
    assert_eq!(fresh.get(f.color), Some(&[0.2, 0.4, 0.6, 1.0]));
    assert_eq!(
        fresh.get(f.mode).and_then(|m| m.selected_identifier()),
        Some("fill")
    );
    assert!(!fresh.is_visible(f.mode));
    assert_eq!(fresh.connections().len(), 1);
    assert!(fresh.is_linked(f.threshold, f.mirror));
    assert_eq!(fresh.serialize().unwrap(), record);
}

#[test]
fn network_record_shape() {
    let (mut net, h) = build();
    net.add_link(h.threshold, h.mirror).unwrap();
    let record = net.serialize().unwrap();
    assert_eq!(
        record["connections"],
        json!([{ "outport": ["source", "outport"], "inport": ["sink", "inport"] }])
    );
    assert_eq!(
        record["links"],
        json!([{ "source": ["source", "threshold"], "destination": ["sink", "threshold"] }])
    );
    let source = &record["processors"][0];
    assert_eq!(source["type"], "org.test.Source");
    assert_eq!(source["properties"][1]["type"], "org.sightline.CompositeProperty");
    assert_eq!(source["properties"][1]["properties"][0]["identifier"], "color");
}

#[test]
fn unknown_entries_are_reported_not_fatal() {
    let (mut net, h) = build();
    let issues = net.deserialize(&json!({
        "processors": [
            { "type": "org.test.Gone", "identifier": "gone", "properties": [] },
            {
                "type": "org.test.Source",
                "identifier": "source",
                "properties": [
                    { "type": "org.sightline.DoubleProperty", "identifier": "threshold", "value": 0.25 },
                    { "type": "org.sightline.IntProperty", "identifier": "missing", "value": 1 },
                ],
            },
        ],
        "connections": [{ "outport": ["gone", "out"], "inport": ["sink", "inport"] }],
        "links": [{ "source": ["source", "nope"], "destination": ["sink", "threshold"] }],
    }));
    assert_eq!(net.get(h.threshold), Some(&0.25));
    assert!(matches!(issues[0], DeserializeIssue::UnknownProcessor(ref id) if id == "gone"));
    assert!(matches!(
        issues[1],
        DeserializeIssue::UnknownProperty { ref identifier, .. } if identifier == "missing"
    ));
    assert!(matches!(issues[2], DeserializeIssue::Connection(_)));
    assert!(matches!(issues[3], DeserializeIssue::Link(_)));
    assert_eq!(issues.len(), 4);
}

#[test]
fn deserialize_refires_attribute_notifications() {
    let (mut net, h) = build();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    net.observe_attributes(h.threshold, move |_, change| s.borrow_mut().push(change.clone()));

    let issues = net.deserialize_property(
        h.threshold,
        &json!({ "type": "org.sightline.DoubleProperty", "identifier": "threshold" }),
    );
    assert!(issues.is_empty());
    assert_eq!(
        seen.borrow().iter().filter(|c| matches!(c, AttributeChange::Visible(true))).count(),
        1
    );
    assert_eq!(seen.borrow().len(), 6);
}

struct Restored(Rc<RefCell<bool>>);

impl Process for Restored {
    fn process(&mut self, _: &mut Network, _: ProcessorId) {}

    fn deserialized(&mut self, _: &mut Network, _: ProcessorId) {
        *self.0.borrow_mut() = true;
    }
}

#[test]
fn deserialized_hook_runs_after_load() {
    let (mut net, h) = build();
    let flag = Rc::new(RefCell::new(false));
    net.set_behavior(h.sink, Restored(flag.clone()));
    let record = net.serialize().unwrap();
    net.deserialize(&record);
    assert!(*flag.borrow());
}
