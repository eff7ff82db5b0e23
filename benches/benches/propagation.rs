// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `sightline_network` change propagation, evaluation and
//! serialization.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use sightline_network::{
    InvalidationLevel, Network, ProcessorId, ProcessorInfo, Property, PropertyBuilder,
};

/// A chain of `len` processors, each with one `f64` property, connected
/// first to last.
fn chain(len: usize) -> (Network, Vec<ProcessorId>, Vec<Property<f64>>) {
    let mut net = Network::new();
    let mut processors = Vec::with_capacity(len);
    let mut properties = Vec::with_capacity(len);
    let mut previous = None;
    for i in 0..len {
        let p = net.add_processor(format!("p{i}"), ProcessorInfo::new("org.bench.Stage", "Stage"));
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 0.0_f64));
        let inport = net.add_optional_inport::<u32>(p, "in");
        let outport = net.add_outport::<u32>(p, "out");
        if let Some(previous) = previous {
            net.connect(previous, inport).unwrap();
        }
        net.set_output(outport, 0);
        previous = Some(outport);
        processors.push(p);
        properties.push(x);
    }
    net.evaluate();
    (net, processors, properties)
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/set");

    group.bench_function("dedup", |b| {
        let (mut net, _, props) = chain(1);
        net.set(props[0], 1.0);
        b.iter(|| black_box(net.set(props[0], 1.0)));
    });

    for len in [1_usize, 8, 64] {
        group.bench_with_input(BenchmarkId::new("cascade", len), &len, |b, &len| {
            let (mut net, _, props) = chain(len);
            let mut value = 0.0;
            b.iter(|| {
                value += 1.0;
                black_box(net.set(props[0], value))
            });
        });
    }

    group.bench_function("callbacks_16", |b| {
        let (mut net, _, props) = chain(1);
        for _ in 0..16 {
            net.on_change(props[0], |net| {
                black_box(net.is_locked());
            });
        }
        let mut value = 0.0;
        b.iter(|| {
            value += 1.0;
            black_box(net.set(props[0], value))
        });
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/batch");
    let (mut net, _, props) = chain(64);
    let mut value = 0.0;
    group.bench_function("64_sets", |b| {
        b.iter(|| {
            value += 1.0;
            net.batch(|net| {
                for prop in &props {
                    net.set(*prop, value);
                }
            });
            black_box(net.evaluation_requests())
        });
    });
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/evaluate");
    for len in [8_usize, 64, 256] {
        group.bench_with_input(BenchmarkId::new("chain", len), &len, |b, &len| {
            let (mut net, processors, _) = chain(len);
            b.iter(|| {
                net.invalidate(processors[0], InvalidationLevel::InvalidOutput);
                black_box(net.evaluate())
            });
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/serialize");
    let (mut net, _, props) = chain(64);
    for (i, prop) in props.iter().enumerate() {
        net.set(*prop, i as f64);
    }
    group.bench_function("chain_64", |b| {
        b.iter(|| black_box(net.serialize().unwrap()));
    });
    let record = net.serialize().unwrap();
    eprintln!(
        "chain_64 record: {} bytes",
        serde_json::to_string(&record).unwrap().len()
    );
    group.bench_function("restore_chain_64", |b| {
        b.iter(|| black_box(net.deserialize(&record)));
    });
    group.finish();
}

criterion_group!(benches, bench_set, bench_batch, bench_evaluate, bench_serialize);
criterion_main!(benches);
