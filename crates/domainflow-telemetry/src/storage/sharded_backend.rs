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

//! Lock-sharded backend, the default for concurrent simulators.

use crate::storage::backend::FlowBackend;
use dashmap::DashMap;
use domainflow_core::{FlowCounter, MonitorError, MonitorResult, ResourceTag};

/// Sharded in-memory backend built on `DashMap`
///
/// Tags hash to independent shards, each guarded by its own lock, so workers
/// touching unrelated resources never contend on a global lock. Counter
/// creation goes through the shard's entry API, which makes the first arrival
/// for a tag install exactly one counter no matter how many threads race.
#[derive(Debug)]
pub struct ShardedBackend {
    counters: DashMap<ResourceTag, FlowCounter, ahash::RandomState>,
}

impl ShardedBackend {
    /// Create a new sharded backend
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new sharded backend with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counters: DashMap::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
        }
    }
}

impl Default for ShardedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowBackend for ShardedBackend {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn arrival(&self, tag: ResourceTag) -> FlowCounter {
        let mut counter = self.counters.entry(tag).or_insert_with(|| {
            log::debug!("Created flow counter for tag {tag}");
            FlowCounter::new()
        });
        counter.record_arrival();
        *counter
    }

    fn completion(&self, tag: ResourceTag) -> MonitorResult<FlowCounter> {
        let mut counter = self
            .counters
            .get_mut(&tag)
            .ok_or(MonitorError::UnmatchedCompletion { tag })?;
        counter
            .record_completion()
            .map_err(|_| MonitorError::UnmatchedCompletion { tag })?;
        Ok(*counter)
    }

    fn get(&self, tag: ResourceTag) -> Option<FlowCounter> {
        self.counters.get(&tag).map(|counter| *counter)
    }

    fn contains(&self, tag: ResourceTag) -> bool {
        self.counters.contains_key(&tag)
    }

    fn len(&self) -> usize {
        self.counters.len()
    }

    fn for_each(&self, f: &mut dyn FnMut(ResourceTag, &FlowCounter)) {
        for entry in self.counters.iter() {
            f(*entry.key(), entry.value());
        }
    }
}
