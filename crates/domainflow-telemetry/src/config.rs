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

//! Configuration for a [`PerfMonitor`](crate::service::PerfMonitor).

use crate::storage::{FlowBackend, InMemoryBackend, ShardedBackend};
use domainflow_core::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which storage backend holds the flow counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Lock-sharded map; the right choice for concurrent workers.
    #[default]
    Sharded,
    /// A single `RwLock` around the whole map.
    Coarse,
}

impl BackendKind {
    /// Instantiates the backend with the given initial capacity.
    pub fn build(self, capacity: usize) -> Arc<dyn FlowBackend> {
        match self {
            BackendKind::Sharded => Arc::new(ShardedBackend::with_capacity(capacity)),
            BackendKind::Coarse => Arc::new(InMemoryBackend::with_capacity(capacity)),
        }
    }
}

/// Settings for a monitoring session.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use domainflow_telemetry::config::MonitorConfig;
///
/// let config = MonitorConfig::from_json_str(r#"{ "name": "matmul", "trace_events": true }"#).unwrap();
/// assert_eq!(config.name, "matmul");
/// assert!(config.trace_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name of the monitor, used in log output.
    pub name: String,
    /// Storage backend for the counters.
    pub backend: BackendKind,
    /// Number of resources to reserve room for up front.
    pub initial_capacity: usize,
    /// Bind each tag to its address and detect tag collisions.
    pub track_addresses: bool,
    /// Keep trace events for export.
    pub trace_events: bool,
    /// Database that exported batches are addressed to.
    pub database: String,
    /// Retention policy that exported batches are addressed to.
    pub retention_policy: String,
}

impl MonitorConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> MonitorResult<Self> {
        serde_json::from_str(json).map_err(|e| MonitorError::Config(e.to_string()))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: "perfmonitor".to_string(),
            backend: BackendKind::Sharded,
            initial_capacity: 0,
            track_addresses: false,
            trace_events: false,
            database: "perfmonitor".to_string(),
            retention_policy: "autogen".to_string(),
        }
    }
}
