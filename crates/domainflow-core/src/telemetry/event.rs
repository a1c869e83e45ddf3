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

//! Trace events describing one step in the evolution of a recurrence.

use super::addressing::{ResourceAddress, ResourceTag};
use super::error::MonitorResult;

/// A single observation of a data element passing through a resource.
///
/// Tracing an injected element such as `A(1,1)` through a domain of
/// computation yields a sequence of these, one per lattice point visited:
/// `A(1,1) (t0,R_a,v1) (t1,R_b,v2) ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// Logical name of the traced data element (e.g. `"A(1,1)"`).
    pub element: String,
    /// Tag of the resource that processed the element.
    pub tag: ResourceTag,
    /// Address of the processing element.
    pub resource: ResourceAddress,
    /// Lattice point of the computational event.
    pub lattice_point: ResourceAddress,
    /// Identifier of the recurrence equation being evaluated.
    pub recurrence: String,
    /// Event time in nanoseconds.
    pub time_ns: u64,
    /// Intermediate value produced at this step.
    pub value: f64,
}

impl TraceEvent {
    /// Creates an event, deriving its tag from `resource`.
    pub fn new(
        element: impl Into<String>,
        resource: ResourceAddress,
        lattice_point: ResourceAddress,
        recurrence: impl Into<String>,
        time_ns: u64,
        value: f64,
    ) -> MonitorResult<Self> {
        Ok(Self {
            element: element.into(),
            tag: resource.encode()?,
            resource,
            lattice_point,
            recurrence: recurrence.into(),
            time_ns,
            value,
        })
    }
}
