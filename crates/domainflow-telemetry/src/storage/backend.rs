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

//! The storage contract behind the operational-analysis registry.

use domainflow_core::{FlowCounter, MonitorResult, ResourceTag};
use std::fmt::Debug;

/// Trait defining the interface for flow counter storage backends.
///
/// Implementations must make every per-tag update linearizable and must
/// install at most one counter per tag, even when several threads race on the
/// first arrival for that tag. Entries are never removed.
pub trait FlowBackend: Send + Sync + Debug + 'static {
    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Record an arrival, creating the counter if the tag is unseen.
    /// Returns the counter as it stands after the update.
    fn arrival(&self, tag: ResourceTag) -> FlowCounter;

    /// Record a completion against an existing counter.
    ///
    /// Returns `UnmatchedCompletion` without creating or mutating anything when
    /// the tag is unseen or has nothing in flight.
    fn completion(&self, tag: ResourceTag) -> MonitorResult<FlowCounter>;

    /// Retrieve a copy of the counter for a tag
    fn get(&self, tag: ResourceTag) -> Option<FlowCounter>;

    /// Check if a tag has been seen
    fn contains(&self, tag: ResourceTag) -> bool;

    /// Get the number of counters stored
    fn len(&self) -> usize;

    /// Visit every stored counter.
    ///
    /// The callback must not record events on the same backend.
    fn for_each(&self, f: &mut dyn FnMut(ResourceTag, &FlowCounter));

    /// Check whether no counter has been created yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get all tags currently stored, in unspecified order
    fn tags(&self) -> Vec<ResourceTag> {
        let mut tags = Vec::with_capacity(self.len());
        self.for_each(&mut |tag: ResourceTag, _: &FlowCounter| tags.push(tag));
        tags
    }

    /// Aggregate statistics over every stored counter
    fn stats(&self) -> BackendStats {
        let mut stats = BackendStats::default();
        self.for_each(&mut |_: ResourceTag, counter: &FlowCounter| {
            stats.total_resources += 1;
            if counter.is_balanced() {
                stats.balanced_resources += 1;
            }
            stats.total_arrivals += counter.arrivals();
            stats.total_in_flight += counter.in_flight();
            stats.total_completions += counter.completions();
        });
        stats
    }
}

/// Statistics about the flow backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Total number of resources with a counter
    pub total_resources: usize,
    /// Number of resources whose arrivals equal their completions
    pub balanced_resources: usize,
    /// Sum of arrivals over all resources
    pub total_arrivals: u64,
    /// Sum of in-flight counts over all resources
    pub total_in_flight: u64,
    /// Sum of completions over all resources
    pub total_completions: u64,
}
