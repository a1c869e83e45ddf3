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

//! Time-series point and batch types in the line-protocol JSON layout.
//!
//! A batch serializes as:
//!
//! ```json
//! {
//!   "database": "perfmonitor",
//!   "retentionPolicy": "autogen",
//!   "points": [
//!     {
//!       "name": "A(1,1)",
//!       "tags": { "lp": "(1,1,1)", "pe": "[1][1]", "re": "a" },
//!       "time": 1,
//!       "precision": "n",
//!       "fields": { "value": 1.0 }
//!     }
//!   ]
//! }
//! ```

use domainflow_core::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp precision of a point.
///
/// Trace events are timed in nanoseconds, so that is the only unit emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    /// Nanoseconds, serialized as `"n"`.
    #[default]
    #[serde(rename = "n")]
    Nanoseconds,
}

impl Precision {
    /// Returns the wire identifier of this precision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "n",
        }
    }
}

/// One point in a time series: measurement, indexed tags, timestamp, fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// The measurement name.
    pub name: String,
    /// Indexed string tags, kept sorted by key.
    pub tags: BTreeMap<String, String>,
    /// The timestamp, in units of `precision`.
    pub time: u64,
    /// The unit of `time`.
    pub precision: Precision,
    /// Unindexed numeric fields.
    pub fields: BTreeMap<String, f64>,
}

impl TimeSeriesPoint {
    /// Creates a point with no tags or fields and nanosecond precision.
    pub fn new(name: impl Into<String>, time: u64) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            time,
            precision: Precision::Nanoseconds,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a tag, returning the point.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a field, returning the point.
    pub fn with_field(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// A batch of points addressed to one database and retention policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    /// Target database.
    pub database: String,
    /// Target retention policy.
    #[serde(rename = "retentionPolicy")]
    pub retention_policy: String,
    /// The points in recording order.
    pub points: Vec<TimeSeriesPoint>,
}

impl PointBatch {
    /// Creates an empty batch.
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: retention_policy.into(),
            points: Vec::new(),
        }
    }

    /// Number of points in the batch.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the batch has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Checks that every field value is a finite number.
    ///
    /// JSON has no encoding for NaN or infinity, so such a value would be
    /// written as `null` and the batch could not be read back.
    pub fn validate(&self) -> MonitorResult<()> {
        for point in &self.points {
            if let Some((key, value)) = point.fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(MonitorError::Export(format!(
                    "field '{key}' of point '{}' at time {} is not finite: {value}",
                    point.name, point.time
                )));
            }
        }
        Ok(())
    }

    /// Serializes the batch as compact JSON.
    pub fn to_json(&self) -> MonitorResult<String> {
        self.validate()?;
        serde_json::to_string(self).map_err(|e| MonitorError::Export(e.to_string()))
    }

    /// Serializes the batch as indented JSON.
    pub fn to_json_pretty(&self) -> MonitorResult<String> {
        self.validate()?;
        serde_json::to_string_pretty(self).map_err(|e| MonitorError::Export(e.to_string()))
    }

    /// Parses a batch previously produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> MonitorResult<Self> {
        serde_json::from_str(json).map_err(|e| MonitorError::Export(e.to_string()))
    }
}
