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

//! Provides the foundational data structures for operational analysis.
//!
//! This module defines the "common language" spoken between a simulator and the
//! monitor: how a lattice point becomes a resource tag, what is counted per
//! resource, and what a traced transaction event carries. The concurrent
//! registry, the trace recorder and the exporter live in `domainflow-telemetry`.

pub mod addressing;
pub mod error;
pub mod event;
pub mod flow;

pub use self::addressing::{Axis, ResourceAddress, ResourceTag, MAX_COORDINATE};
pub use self::error::{MonitorError, MonitorResult};
pub use self::event::TraceEvent;
pub use self::flow::{FlowCounter, UnmatchedCompletion};
