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

//! Provides an RAII guard pairing an arrival with its completion.

use crate::analysis::OperationalAnalysisRegistry;
use domainflow_core::{MonitorResult, ResourceTag};
use std::time::Instant;

/// A transaction in flight at a resource.
///
/// Creating the guard records an arrival; finishing or dropping it records the
/// matching completion, so a transaction cannot leak in-flight work on an
/// early return or panic.
#[must_use = "dropping a Transaction records its completion immediately"]
pub struct Transaction<'a> {
    registry: &'a OperationalAnalysisRegistry,
    tag: ResourceTag,
    started_ns: u64,
    started_at: Instant,
    finished: bool,
}

impl<'a> Transaction<'a> {
    /// Records an arrival at `tag` and starts the transaction.
    pub fn begin(
        registry: &'a OperationalAnalysisRegistry,
        tag: ResourceTag,
        timestamp_ns: u64,
    ) -> Self {
        registry.arrival(tag, timestamp_ns);
        Self {
            registry,
            tag,
            started_ns: timestamp_ns,
            started_at: Instant::now(),
            finished: false,
        }
    }

    /// The resource this transaction is running on.
    pub fn tag(&self) -> ResourceTag {
        self.tag
    }

    /// Records the completion at an explicit simulation time.
    pub fn finish(mut self, timestamp_ns: u64) -> MonitorResult<()> {
        self.finished = true;
        self.registry.completion(self.tag, timestamp_ns)
    }
}

/// A guard dropped without `finish` completes at its start time plus the
/// wall-clock time it was held.
impl<'a> Drop for Transaction<'a> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let held_ns = u64::try_from(self.started_at.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let timestamp_ns = self.started_ns.saturating_add(held_ns);
        if let Err(e) = self.registry.completion(self.tag, timestamp_ns) {
            log::warn!("[Transaction] Failed to record completion: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_records_completion() {
        let registry = OperationalAnalysisRegistry::new();
        let tag = ResourceTag::from_raw(11);

        {
            let transaction = Transaction::begin(&registry, tag, 100);
            assert_eq!(transaction.tag(), tag);
            assert_eq!(registry.get(tag).unwrap().snapshot(), (1, 1, 0));
        }
        assert_eq!(registry.get(tag).unwrap().snapshot(), (1, 0, 1));
    }

    #[test]
    fn test_finish_records_completion_once() {
        let registry = OperationalAnalysisRegistry::new();
        let tag = ResourceTag::from_raw(12);

        let first = Transaction::begin(&registry, tag, 0);
        let second = Transaction::begin(&registry, tag, 1);
        first.finish(5).unwrap();
        second.finish(6).unwrap();

        let counter = registry.get(tag).unwrap();
        assert!(counter.is_balanced());
        assert_eq!(counter.snapshot(), (2, 0, 2));
    }

    #[test]
    fn test_nested_transactions() {
        let registry = OperationalAnalysisRegistry::new();
        let outer_tag = ResourceTag::from_raw(1);
        let inner_tag = ResourceTag::from_raw(2);

        let outer = Transaction::begin(&registry, outer_tag, 0);
        {
            let _inner = Transaction::begin(&registry, inner_tag, 1);
            assert_eq!(registry.stats().total_in_flight, 2);
        }
        assert_eq!(registry.stats().total_in_flight, 1);
        drop(outer);
        assert!(registry.unbalanced().is_empty());
    }

    #[test]
    fn test_bound_guard_stays_in_flight_until_scope_ends() {
        let registry = OperationalAnalysisRegistry::new();
        let tag = ResourceTag::from_raw(13);

        {
            let _transaction = Transaction::begin(&registry, tag, 0);
            registry.arrival(ResourceTag::from_raw(14), 1);
            assert_eq!(registry.get(tag).unwrap().in_flight(), 1);
        }
        assert_eq!(registry.get(tag).unwrap().snapshot(), (1, 0, 1));
    }
}
