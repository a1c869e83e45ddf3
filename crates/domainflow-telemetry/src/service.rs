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

//! Service tying together counters, trace recording, and export.

use crate::analysis::{CounterRecord, OperationalAnalysisRegistry};
use crate::config::MonitorConfig;
use crate::export::{PointBatch, TraceExporter};
use crate::trace::TraceRecorder;
use domainflow_core::{FlowCounter, MonitorError, MonitorResult, ResourceTag, TraceEvent};
use std::io::{self, Write};

/// An in-process performance monitor for one simulation session.
///
/// It owns the operational-analysis counters and, when tracing is enabled, a
/// recorder of transaction events that can be exported as time-series points
/// for inspection and debugging. Dropping the monitor ends the session.
#[derive(Debug)]
pub struct PerfMonitor {
    name: String,
    registry: OperationalAnalysisRegistry,
    recorder: Option<TraceRecorder>,
    exporter: TraceExporter,
}

impl PerfMonitor {
    /// Creates a monitor with default settings and the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(&MonitorConfig {
            name: name.into(),
            ..MonitorConfig::default()
        })
    }

    /// Creates a monitor from a configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let mut registry = OperationalAnalysisRegistry::with_backend(
            config.backend.build(config.initial_capacity),
        );
        if config.track_addresses {
            registry = registry.with_address_tracking();
        }
        let recorder = config.trace_events.then(TraceRecorder::new);
        log::info!(
            "Performance monitor '{}' started ({:?} backend, tracing {})",
            config.name,
            config.backend,
            if recorder.is_some() { "on" } else { "off" }
        );
        Self {
            name: config.name.clone(),
            registry,
            recorder,
            exporter: TraceExporter::new(config.database.clone(), config.retention_policy.clone()),
        }
    }

    /// The monitor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records a transaction arriving at `tag`.
    pub fn arrival(&self, tag: ResourceTag, timestamp_ns: u64) {
        self.registry.arrival(tag, timestamp_ns);
    }

    /// Records a transaction completing at `tag`.
    pub fn completion(&self, tag: ResourceTag, timestamp_ns: u64) -> MonitorResult<()> {
        self.registry.completion(tag, timestamp_ns)
    }

    /// Looks up the counter for a tag.
    pub fn observation(&self, tag: ResourceTag) -> Option<FlowCounter> {
        self.registry.get(tag)
    }

    /// Records a trace event. Returns `false` if tracing is disabled and the
    /// event was discarded.
    pub fn trace(&self, event: TraceEvent) -> bool {
        match &self.recorder {
            Some(recorder) => {
                recorder.record(event);
                true
            }
            None => false,
        }
    }

    /// Drains all recorded trace events into a batch of time-series points.
    pub fn export_traces(&self) -> PointBatch {
        let events = self
            .recorder
            .as_ref()
            .map(TraceRecorder::drain)
            .unwrap_or_default();
        self.exporter.export_batch(&events)
    }

    /// The counter registry, for sharing with worker threads.
    pub fn registry(&self) -> &OperationalAnalysisRegistry {
        &self.registry
    }

    /// The trace recorder, if tracing is enabled.
    pub fn recorder(&self) -> Option<&TraceRecorder> {
        self.recorder.as_ref()
    }

    /// The exporter used by [`export_traces`](Self::export_traces).
    pub fn exporter(&self) -> &TraceExporter {
        &self.exporter
    }

    /// Writes one `id[0x..] = [a,b,c]` line per resource, sorted by tag.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (tag, counter) in self.registry.snapshot_all() {
            writeln!(out, "id[{tag}] = {counter}")?;
        }
        Ok(())
    }

    /// Serializes every counter, sorted by tag, as a JSON array of records.
    pub fn snapshot_json(&self) -> MonitorResult<String> {
        serde_json::to_string(&self.registry.records())
            .map_err(|e| MonitorError::Export(e.to_string()))
    }

    /// Parses a snapshot written by [`snapshot_json`](Self::snapshot_json).
    ///
    /// Counters whose completions or in-flight work exceed their arrivals are
    /// rejected.
    pub fn parse_snapshot(json: &str) -> MonitorResult<Vec<CounterRecord>> {
        serde_json::from_str(json).map_err(|e| MonitorError::Export(e.to_string()))
    }

    /// Logs every counter at info level.
    pub fn report(&self) {
        let stats = self.registry.stats();
        log::info!(
            "[{}] {} resources, {} balanced, {} in flight",
            self.name,
            stats.total_resources,
            stats.balanced_resources,
            stats.total_in_flight
        );
        for (tag, counter) in self.registry.snapshot_all() {
            log::info!("[{}] id[{tag}] = {counter}", self.name);
        }
    }

    /// Prints every counter to standard output.
    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_report(&mut lock)
    }
}

impl Default for PerfMonitor {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domainflow_core::ResourceAddress;

    #[test]
    fn test_monitor_counts_events() {
        let monitor = PerfMonitor::new("Stringer");
        let tag = ResourceTag::from_raw(1234);

        for t in 0..11 {
            monitor.arrival(tag, t);
        }
        for t in 0..10 {
            monitor.completion(tag, t + 5).unwrap();
        }

        assert_eq!(monitor.name(), "Stringer");
        assert_eq!(monitor.observation(tag).unwrap().snapshot(), (11, 1, 10));
    }

    #[test]
    fn test_write_report() {
        let monitor = PerfMonitor::default();
        monitor.arrival(ResourceTag::from_raw(0x20), 0);
        monitor.arrival(ResourceTag::from_raw(0x10), 0);
        monitor.completion(ResourceTag::from_raw(0x10), 1).unwrap();

        let mut out = Vec::new();
        monitor.write_report(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id[0x10] = [1,0,1]\nid[0x20] = [1,1,0]\n"
        );
        monitor.report();
    }

    #[test]
    fn test_tracing_disabled_by_default() {
        let monitor = PerfMonitor::default();
        let event = TraceEvent::new(
            "A(1,1)",
            ResourceAddress::new(1, 1, 0),
            ResourceAddress::new(1, 1, 1),
            "a",
            1,
            1.0,
        )
        .unwrap();

        assert!(monitor.recorder().is_none());
        assert!(!monitor.trace(event));
        assert!(monitor.export_traces().is_empty());
    }

    #[test]
    fn test_export_traces_drains_recorder() {
        let config = MonitorConfig {
            trace_events: true,
            database: "foo".to_string(),
            retention_policy: "bar".to_string(),
            ..MonitorConfig::default()
        };
        let monitor = PerfMonitor::from_config(&config);

        for k in 1..=3 {
            let event = TraceEvent::new(
                "A(1,1)",
                ResourceAddress::new(1, k, 0),
                ResourceAddress::new(1, 1, k),
                "a",
                1,
                f64::from(k),
            )
            .unwrap();
            assert!(monitor.trace(event));
        }

        let batch = monitor.export_traces();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.database, "foo");
        assert_eq!(batch.points[1].fields["value"], 2.0);
        assert!(monitor.export_traces().is_empty());
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let monitor = PerfMonitor::from_config(&MonitorConfig {
            track_addresses: true,
            ..MonitorConfig::default()
        });
        let tag = monitor
            .registry()
            .arrival_at(ResourceAddress::new(1, 1, 0), 0)
            .unwrap();
        monitor.arrival(tag, 1);
        monitor.completion(tag, 2).unwrap();

        let json = monitor.snapshot_json().unwrap();
        assert_eq!(
            json,
            r#"[{"tag":65537,"address":{"i":1,"j":1,"k":0},"counter":{"arrivals":2,"in_flight":1,"completions":1}}]"#
        );
        assert_eq!(
            PerfMonitor::parse_snapshot(&json).unwrap(),
            monitor.registry().records()
        );
    }

    #[test]
    fn test_parse_snapshot_rejects_impossible_counter() {
        let err = PerfMonitor::parse_snapshot(
            r#"[{"tag":1,"counter":{"arrivals":0,"in_flight":0,"completions":5}}]"#,
        )
        .unwrap_err();
        match err {
            MonitorError::Export(msg) => assert!(msg.contains("Invalid counter [0,0,5]")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
