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

use domainflow_core::{FlowCounter, ResourceAddress, ResourceTag};
use domainflow_telemetry::storage::InMemoryBackend;
use domainflow_telemetry::{OperationalAnalysisRegistry, Transaction};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const EVENTS_PER_THREAD: u64 = 10_000;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn hammer_single_tag(registry: &OperationalAnalysisRegistry) {
    let tag = ResourceTag::from_raw(1234);
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                for t in 0..EVENTS_PER_THREAD {
                    registry.arrival(tag, t);
                    registry
                        .completion(tag, t + 1)
                        .expect("each worker completes only what it admitted");
                }
            });
        }
    });

    let total = THREADS as u64 * EVENTS_PER_THREAD;
    assert_eq!(
        registry.get(tag),
        Some(FlowCounter::from_parts(total, 0, total))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_no_lost_updates_on_shared_tag_sharded() {
    init_logger();
    hammer_single_tag(&OperationalAnalysisRegistry::new());
}

#[test]
fn test_no_lost_updates_on_shared_tag_coarse() {
    init_logger();
    hammer_single_tag(&OperationalAnalysisRegistry::with_backend(Arc::new(
        InMemoryBackend::new(),
    )));
}

#[test]
fn test_racing_first_arrivals_create_one_counter_per_tag() {
    init_logger();
    // --- 1. ARRANGE ---
    let registry = OperationalAnalysisRegistry::new();
    let tags: Vec<ResourceTag> = (0..64)
        .map(|i| ResourceAddress::new(i, i + 1, 0).encode().unwrap())
        .collect();
    let barrier = Barrier::new(THREADS);

    // --- 2. ACT ---
    // Every worker races to be the first arrival on every tag.
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                for (t, tag) in tags.iter().enumerate() {
                    registry.arrival(*tag, t as u64);
                }
            });
        }
    });

    // --- 3. ASSERT ---
    assert_eq!(registry.len(), tags.len());
    for tag in &tags {
        let counter = registry.get(*tag).unwrap();
        assert_eq!(counter.snapshot(), (THREADS as u64, THREADS as u64, 0));
    }
}

#[test]
fn test_unmatched_completions_under_contention_never_corrupt_counters() {
    init_logger();
    let registry = OperationalAnalysisRegistry::new();
    let tag = ResourceTag::from_raw(42);
    let arrivals_per_thread = 1_000u64;

    // Half the workers only arrive, the other half try to complete twice as
    // often as anyone arrives. Excess completions must be rejected cleanly.
    let rejected: u64 = thread::scope(|s| {
        let mut completers = Vec::new();
        for worker in 0..THREADS {
            if worker % 2 == 0 {
                s.spawn(|| {
                    for t in 0..arrivals_per_thread {
                        registry.arrival(tag, t);
                    }
                });
            } else {
                completers.push(s.spawn(|| {
                    let mut rejected = 0u64;
                    for t in 0..2 * arrivals_per_thread {
                        if registry.completion(tag, t).is_err() {
                            rejected += 1;
                        }
                    }
                    rejected
                }));
            }
        }
        completers.into_iter().map(|h| h.join().unwrap()).sum()
    });

    let counter = registry.get(tag).unwrap();
    let (arrivals, in_flight, completions) = counter.snapshot();
    let attempts = (THREADS as u64 / 2) * 2 * arrivals_per_thread;

    assert_eq!(arrivals, (THREADS as u64 / 2) * arrivals_per_thread);
    assert!(completions <= arrivals);
    assert_eq!(in_flight, arrivals - completions);
    assert_eq!(completions + rejected, attempts);
}

#[test]
fn test_transactions_across_threads_balance() {
    init_logger();
    let registry = OperationalAnalysisRegistry::new();

    thread::scope(|s| {
        for worker in 0..THREADS as u32 {
            let registry = &registry;
            s.spawn(move || {
                for step in 0..500u32 {
                    let address = ResourceAddress::new(worker, step % 16, 0);
                    let tag = address.encode().unwrap();
                    let _transaction = Transaction::begin(registry, tag, u64::from(step));
                }
            });
        }
    });

    assert_eq!(registry.len(), THREADS * 16);
    assert!(registry.unbalanced().is_empty());
    let stats = registry.stats();
    assert_eq!(stats.total_arrivals, THREADS as u64 * 500);
    assert_eq!(stats.total_in_flight, 0);
}

#[test]
fn test_for_each_while_workers_record() {
    init_logger();
    let registry = OperationalAnalysisRegistry::new();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..5_000u64 {
                registry.arrival(ResourceTag::from_raw(i % 128), i);
            }
        });
        s.spawn(|| {
            for _ in 0..50 {
                registry.for_each(|_, counter| {
                    assert!(counter.completions() <= counter.arrivals());
                });
            }
        });
    });

    assert_eq!(registry.len(), 128);
}
