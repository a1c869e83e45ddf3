// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use criterion::{criterion_group, criterion_main, Criterion};
use domainflow_core::{ResourceAddress, ResourceTag};
use domainflow_telemetry::storage::InMemoryBackend;
use domainflow_telemetry::OperationalAnalysisRegistry;
use std::hint::black_box;
use std::sync::Arc;

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Operational Analysis");

    // Arrival + completion on one hot tag, the simulator's inner loop.
    let registry = OperationalAnalysisRegistry::new();
    let tag = ResourceTag::from_raw(1234);
    let mut t = 0u64;
    group.bench_function("Arrival+Completion (sharded, single tag)", |b| {
        b.iter(|| {
            registry.arrival(black_box(tag), t);
            let _ = registry.completion(black_box(tag), t + 5);
            t += 1;
        });
    });

    let coarse = OperationalAnalysisRegistry::with_backend(Arc::new(InMemoryBackend::new()));
    group.bench_function("Arrival+Completion (coarse, single tag)", |b| {
        b.iter(|| {
            coarse.arrival(black_box(tag), 0);
            let _ = coarse.completion(black_box(tag), 5);
        });
    });

    // Spread over a 64x64 plane of processing elements.
    let tags: Vec<ResourceTag> = (0..64u32)
        .flat_map(|i| (0..64u32).map(move |j| ResourceAddress::new(i, j, 0)))
        .map(|address| address.encode().unwrap())
        .collect();
    let spread = OperationalAnalysisRegistry::new();
    let mut next = 0usize;
    group.bench_function("Arrival+Completion (sharded, 4096 tags)", |b| {
        b.iter(|| {
            let tag = tags[next % tags.len()];
            spread.arrival(black_box(tag), 0);
            let _ = spread.completion(black_box(tag), 1);
            next += 1;
        });
    });

    group.bench_function("Encode", |b| {
        let address = ResourceAddress::new(17, 42, 3);
        b.iter(|| black_box(address).encode());
    });

    group.finish();
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
