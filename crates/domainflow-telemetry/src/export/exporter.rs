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

//! Maps trace events onto time-series points.

use crate::export::point::{PointBatch, TimeSeriesPoint};
use domainflow_core::TraceEvent;

/// Tag key holding the processing-element label.
pub const TAG_RESOURCE: &str = "pe";
/// Tag key holding the lattice point.
pub const TAG_LATTICE_POINT: &str = "lp";
/// Tag key holding the recurrence identifier.
pub const TAG_RECURRENCE: &str = "re";
/// Field key holding the traced value.
pub const FIELD_VALUE: &str = "value";

/// Converts recorded trace events into points for replay into a time-series store.
///
/// The exporter never transmits anything; it only builds [`PointBatch`]es
/// addressed to its database and retention policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceExporter {
    database: String,
    retention_policy: String,
}

impl TraceExporter {
    /// Creates an exporter targeting the given database and retention policy.
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: retention_policy.into(),
        }
    }

    /// The target database.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The target retention policy.
    pub fn retention_policy(&self) -> &str {
        &self.retention_policy
    }

    /// Maps a single event onto a point.
    pub fn to_point(event: &TraceEvent) -> TimeSeriesPoint {
        TimeSeriesPoint::new(event.element.clone(), event.time_ns)
            .with_tag(TAG_RESOURCE, event.resource.resource_label())
            .with_tag(TAG_LATTICE_POINT, event.lattice_point.lattice_point())
            .with_tag(TAG_RECURRENCE, event.recurrence.clone())
            .with_field(FIELD_VALUE, event.value)
    }

    /// Maps a sequence of events onto a batch, preserving order.
    pub fn export_batch<'a, I>(&self, events: I) -> PointBatch
    where
        I: IntoIterator<Item = &'a TraceEvent>,
    {
        let mut batch = PointBatch::new(self.database.clone(), self.retention_policy.clone());
        batch.points.extend(events.into_iter().map(Self::to_point));
        log::debug!(
            "Exported {} trace points for {}/{}",
            batch.len(),
            self.database,
            self.retention_policy
        );
        batch
    }
}

impl Default for TraceExporter {
    fn default() -> Self {
        Self::new("perfmonitor", "autogen")
    }
}
