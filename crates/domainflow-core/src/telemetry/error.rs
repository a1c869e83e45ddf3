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

//! Error types for the monitoring subsystem.

use super::addressing::{Axis, ResourceAddress, ResourceTag};
use std::fmt::{self, Display};

/// A specialized `Result` type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// An error that can occur while recording or exporting monitor data.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// A lattice coordinate does not fit in the 16-bit packing budget.
    AddressOutOfRange {
        /// The axis holding the offending coordinate.
        axis: Axis,
        /// The rejected coordinate value.
        value: u32,
    },
    /// A completion was recorded for a resource with no work in flight.
    ///
    /// The counters are left untouched when this is returned.
    UnmatchedCompletion {
        /// The tag the completion was recorded against.
        tag: ResourceTag,
    },
    /// A counter was loaded with more completions or in-flight work than its
    /// arrivals account for.
    InvalidCounter {
        /// Cumulative arrivals.
        arrivals: u64,
        /// Live in-flight count.
        in_flight: u64,
        /// Cumulative completions.
        completions: u64,
    },
    /// Two distinct addresses produced the same tag.
    ///
    /// This can only happen if the addressing scheme is broken; callers should
    /// treat it as fatal.
    TagCollision {
        /// The shared tag.
        tag: ResourceTag,
        /// The address first bound to the tag.
        existing: ResourceAddress,
        /// The address that collided with it.
        incoming: ResourceAddress,
    },
    /// A batch of points could not be serialized.
    Export(String),
    /// A monitor configuration could not be parsed.
    Config(String),
}

impl Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::AddressOutOfRange { axis, value } => {
                write!(
                    f,
                    "Address out of range: coordinate {axis} = {value} exceeds 16 bits"
                )
            }
            MonitorError::UnmatchedCompletion { tag } => {
                write!(f, "Unmatched completion: tag {tag} has no pending arrival")
            }
            MonitorError::InvalidCounter {
                arrivals,
                in_flight,
                completions,
            } => write!(
                f,
                "Invalid counter [{arrivals},{in_flight},{completions}]: completions and in-flight work exceed arrivals"
            ),
            MonitorError::TagCollision {
                tag,
                existing,
                incoming,
            } => write!(
                f,
                "Tag collision: {incoming} encodes to {tag}, already bound to {existing}"
            ),
            MonitorError::Export(msg) => write!(f, "Export error: {msg}"),
            MonitorError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for MonitorError {}
