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

//! # Domainflow Telemetry
//!
//! The concurrent side of the performance monitor: the operational-analysis
//! registry that simulation workers record arrivals and completions into, the
//! trace recorder for transaction sequences, and the exporter that renders
//! recorded events as line-protocol time-series points.

#![warn(missing_docs)]

pub mod analysis;
pub mod config;
pub mod export;
pub mod service;
pub mod storage;
pub mod trace;
pub mod utils;

pub use analysis::{CounterRecord, OperationalAnalysisRegistry};
pub use config::{BackendKind, MonitorConfig};
pub use export::{PointBatch, Precision, TimeSeriesPoint, TraceExporter};
pub use service::PerfMonitor;
pub use trace::{TraceRecorder, TraceSender};
pub use utils::transaction::Transaction;
