// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `sightline_datamapper` conversions.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use sightline_datamapper::{DataFormat, DataMapper, Span};

fn bench_mapping(c: &mut Criterion) {
    let mut map = DataMapper::from_format(DataFormat::UINT16);
    map.value_range = Span::new(-1024.0, 3071.0);

    let samples: Vec<u16> = (0..4096_u32).map(|i| (i * 16) as u16).collect();
    let mut group = c.benchmark_group("datamapper");
    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("data_to_value/u16", |b| {
        b.iter(|| {
            samples
                .iter()
                .map(|s| map.map_from_data_to_value(*s))
                .sum::<f64>()
        });
    });

    group.bench_function("data_to_normalized/vec3_u16", |b| {
        b.iter(|| {
            samples
                .chunks_exact(3)
                .map(|c| map.map_from_data_to_normalized([c[0], c[1], c[2]])[2])
                .sum::<f64>()
        });
    });

    group.bench_function("try_value_to_data/f64", |b| {
        b.iter(|| {
            samples
                .iter()
                .filter_map(|s| map.try_map_from_value_to_data(f64::from(*s)).ok())
                .sum::<f64>()
        });
    });

    group.bench_function("degenerate", |b| {
        let flat = DataMapper::new(Span::new(5.0, 5.0), Span::NORMALIZED);
        b.iter(|| black_box(flat.map_from_data_to_value(black_box(5.0_f64))));
    });

    group.finish();
}

criterion_group!(benches, bench_mapping);
criterion_main!(benches);
