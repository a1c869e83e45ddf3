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

//! Single-lock backend.

use crate::storage::backend::FlowBackend;
use domainflow_core::{FlowCounter, MonitorError, MonitorResult, ResourceTag};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type CounterMap = HashMap<ResourceTag, FlowCounter, ahash::RandomState>;

/// Coarse-grained in-memory backend using `RwLock<HashMap>`
///
/// Every event takes the single write lock, so unrelated tags serialize
/// against each other. Suitable for single-threaded simulators or low event
/// rates; [`ShardedBackend`](crate::storage::sharded_backend::ShardedBackend)
/// is the default for concurrent workers.
#[derive(Debug)]
pub struct InMemoryBackend {
    storage: RwLock<CounterMap>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new in-memory backend with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                ahash::RandomState::new(),
            )),
        }
    }

    // Counters stay internally consistent even if a holder panicked, since
    // every mutation is a single in-place update.
    fn read(&self) -> RwLockReadGuard<'_, CounterMap> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CounterMap> {
        self.storage.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowBackend for InMemoryBackend {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn arrival(&self, tag: ResourceTag) -> FlowCounter {
        let mut storage = self.write();
        let counter = storage.entry(tag).or_insert_with(|| {
            log::debug!("Created flow counter for tag {tag}");
            FlowCounter::new()
        });
        counter.record_arrival();
        *counter
    }

    fn completion(&self, tag: ResourceTag) -> MonitorResult<FlowCounter> {
        let mut storage = self.write();
        let counter = storage
            .get_mut(&tag)
            .ok_or(MonitorError::UnmatchedCompletion { tag })?;
        counter
            .record_completion()
            .map_err(|_| MonitorError::UnmatchedCompletion { tag })?;
        Ok(*counter)
    }

    fn get(&self, tag: ResourceTag) -> Option<FlowCounter> {
        self.read().get(&tag).copied()
    }

    fn contains(&self, tag: ResourceTag) -> bool {
        self.read().contains_key(&tag)
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn for_each(&self, f: &mut dyn FnMut(ResourceTag, &FlowCounter)) {
        for (tag, counter) in self.read().iter() {
            f(*tag, counter);
        }
    }
}
