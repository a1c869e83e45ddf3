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

//! Registry mapping resource tags to their flow counters.

use crate::storage::{BackendStats, FlowBackend, ShardedBackend};
use dashmap::DashMap;
use domainflow_core::{FlowCounter, MonitorError, MonitorResult, ResourceAddress, ResourceTag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One resource's counter, as captured by
/// [`OperationalAnalysisRegistry::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    /// The resource tag.
    pub tag: ResourceTag,
    /// The address bound to the tag, when the registry tracks addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<ResourceAddress>,
    /// The counter at capture time.
    pub counter: FlowCounter,
}

/// Central registry for operational-analysis counters.
///
/// Simulation workers call [`arrival`](Self::arrival) and
/// [`completion`](Self::completion) on every event. A counter is created on
/// the first arrival for a tag and stays queryable for the rest of the
/// session, balanced or not. The registry is cheap to clone; clones share the
/// same counters.
#[derive(Debug, Clone)]
pub struct OperationalAnalysisRegistry {
    backend: Arc<dyn FlowBackend>,
    addresses: Option<Arc<DashMap<ResourceTag, ResourceAddress, ahash::RandomState>>>,
}

impl OperationalAnalysisRegistry {
    /// Create a new registry with the default sharded backend
    pub fn new() -> Self {
        Self::with_backend(Arc::new(ShardedBackend::new()))
    }

    /// Create a new registry with a custom backend
    pub fn with_backend(backend: Arc<dyn FlowBackend>) -> Self {
        Self {
            backend,
            addresses: None,
        }
    }

    /// Remember which address produced each tag seen through
    /// [`arrival_at`](Self::arrival_at), and reject any later address that
    /// encodes to an already-bound tag with [`MonitorError::TagCollision`].
    pub fn with_address_tracking(mut self) -> Self {
        self.addresses = Some(Arc::new(DashMap::with_hasher(ahash::RandomState::new())));
        self
    }

    /// Record a transaction arriving at `tag`. Never fails.
    pub fn arrival(&self, tag: ResourceTag, timestamp_ns: u64) {
        let counter = self.backend.arrival(tag);
        log::trace!("arrival tag={tag} t={timestamp_ns} flow={counter}");
    }

    /// Record a transaction completing at `tag`.
    ///
    /// Fails with [`MonitorError::UnmatchedCompletion`] when the tag has never
    /// seen an arrival or has nothing in flight; no state changes in that case.
    pub fn completion(&self, tag: ResourceTag, timestamp_ns: u64) -> MonitorResult<()> {
        let counter = self.backend.completion(tag)?;
        log::trace!("completion tag={tag} t={timestamp_ns} flow={counter}");
        Ok(())
    }

    /// Encode `address` and record an arrival for it.
    pub fn arrival_at(
        &self,
        address: ResourceAddress,
        timestamp_ns: u64,
    ) -> MonitorResult<ResourceTag> {
        let tag = self.resolve(address, true)?;
        self.arrival(tag, timestamp_ns);
        Ok(tag)
    }

    /// Encode `address` and record a completion for it.
    pub fn completion_at(
        &self,
        address: ResourceAddress,
        timestamp_ns: u64,
    ) -> MonitorResult<ResourceTag> {
        let tag = self.resolve(address, false)?;
        self.completion(tag, timestamp_ns)?;
        Ok(tag)
    }

    fn resolve(&self, address: ResourceAddress, bind: bool) -> MonitorResult<ResourceTag> {
        let tag = address.encode()?;
        let Some(addresses) = &self.addresses else {
            return Ok(tag);
        };

        let existing = if bind {
            Some(*addresses.entry(tag).or_insert(address))
        } else {
            addresses.get(&tag).map(|bound| *bound)
        };
        match existing {
            Some(existing) if existing != address => {
                log::error!(
                    "Addressing invariant violated: {address} and {existing} both encode to {tag}"
                );
                Err(MonitorError::TagCollision {
                    tag,
                    existing,
                    incoming: address,
                })
            }
            _ => Ok(tag),
        }
    }

    /// Get a copy of the counter for a tag
    pub fn get(&self, tag: ResourceTag) -> Option<FlowCounter> {
        self.backend.get(tag)
    }

    /// Get the address bound to a tag, when address tracking is enabled
    pub fn address_of(&self, tag: ResourceTag) -> Option<ResourceAddress> {
        self.addresses
            .as_ref()
            .and_then(|addresses| addresses.get(&tag).map(|bound| *bound))
    }

    /// Check if a tag has a counter
    pub fn contains(&self, tag: ResourceTag) -> bool {
        self.backend.contains(tag)
    }

    /// Get the number of counters
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Check whether no arrival has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Visit every `(tag, counter)` pair in unspecified order.
    ///
    /// Other threads may keep recording while this runs; each counter is
    /// observed consistently but different tags may be observed at different
    /// instants. The callback must not record events on this registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(ResourceTag, &FlowCounter),
    {
        self.backend.for_each(&mut f);
    }

    /// Get every tag with a counter, in unspecified order
    pub fn tags(&self) -> Vec<ResourceTag> {
        self.backend.tags()
    }

    /// Get a copy of every counter, sorted by tag
    pub fn snapshot_all(&self) -> Vec<(ResourceTag, FlowCounter)> {
        let mut all = Vec::with_capacity(self.len());
        self.for_each(|tag, counter| all.push((tag, *counter)));
        all.sort_unstable_by_key(|(tag, _)| *tag);
        all
    }

    /// Get every counter with its bound address, sorted by tag
    pub fn records(&self) -> Vec<CounterRecord> {
        self.snapshot_all()
            .into_iter()
            .map(|(tag, counter)| CounterRecord {
                tag,
                address: self.address_of(tag),
                counter,
            })
            .collect()
    }

    /// Get the tags whose arrivals and completions differ, sorted
    pub fn unbalanced(&self) -> Vec<ResourceTag> {
        let mut tags = Vec::new();
        self.for_each(|tag, counter| {
            if !counter.is_balanced() {
                tags.push(tag);
            }
        });
        tags.sort_unstable();
        tags
    }

    /// Aggregate statistics over every counter
    pub fn stats(&self) -> BackendStats {
        self.backend.stats()
    }

    /// Get direct access to the backend (for advanced operations)
    pub fn backend(&self) -> &Arc<dyn FlowBackend> {
        &self.backend
    }
}

impl Default for OperationalAnalysisRegistry {
    fn default() -> Self {
        Self::new()
    }
}
