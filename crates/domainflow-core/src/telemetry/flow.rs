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

//! Per-resource job flow counters.

use super::error::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Raised by [`FlowCounter::record_completion`] when nothing is in flight.
///
/// The registry lifts this into
/// [`MonitorError::UnmatchedCompletion`](super::MonitorError::UnmatchedCompletion)
/// once it knows which tag the completion belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedCompletion;

impl Display for UnmatchedCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion recorded with no work in flight")
    }
}

impl std::error::Error for UnmatchedCompletion {}

/// Arrival, in-flight, and completion counts for a single resource.
///
/// `in_flight` is tracked directly rather than derived, so it always reflects
/// the live number of admitted but not yet completed transactions.
///
/// Deserialization goes through [`FlowCounter::checked`], so a loaded counter
/// never holds more completions than arrivals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFlowCounter")]
pub struct FlowCounter {
    arrivals: u64,
    in_flight: u64,
    completions: u64,
}

impl FlowCounter {
    /// Creates a counter with every field at zero.
    pub const fn new() -> Self {
        Self {
            arrivals: 0,
            in_flight: 0,
            completions: 0,
        }
    }

    /// Builds a counter from explicit values, for diagnostics and replay.
    pub const fn from_parts(arrivals: u64, in_flight: u64, completions: u64) -> Self {
        Self {
            arrivals,
            in_flight,
            completions,
        }
    }

    /// Builds a counter from explicit values, rejecting combinations that no
    /// sequence of arrivals and completions could produce.
    pub fn checked(arrivals: u64, in_flight: u64, completions: u64) -> MonitorResult<Self> {
        match arrivals.checked_sub(completions) {
            Some(open) if in_flight <= open => Ok(Self::from_parts(arrivals, in_flight, completions)),
            _ => Err(MonitorError::InvalidCounter {
                arrivals,
                in_flight,
                completions,
            }),
        }
    }

    /// Records a transaction entering the resource.
    pub fn record_arrival(&mut self) {
        self.arrivals = self.arrivals.saturating_add(1);
        self.in_flight = self.in_flight.saturating_add(1);
    }

    /// Records a transaction leaving the resource.
    ///
    /// Fails without touching any field when nothing is in flight.
    pub fn record_completion(&mut self) -> Result<(), UnmatchedCompletion> {
        if self.in_flight == 0 {
            return Err(UnmatchedCompletion);
        }
        self.in_flight -= 1;
        self.completions = self.completions.saturating_add(1);
        Ok(())
    }

    /// Returns `true` when cumulative arrivals equal cumulative completions.
    pub fn is_balanced(&self) -> bool {
        self.arrivals == self.completions
    }

    /// Returns `true` when no transaction is currently in flight.
    pub fn is_quiescent(&self) -> bool {
        self.in_flight == 0
    }

    /// Returns `(arrivals, in_flight, completions)`.
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (self.arrivals, self.in_flight, self.completions)
    }

    /// Total number of arrivals observed.
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    /// Number of transactions currently admitted but not completed.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Total number of completions observed.
    pub fn completions(&self) -> u64 {
        self.completions
    }
}

#[derive(Deserialize)]
struct RawFlowCounter {
    arrivals: u64,
    in_flight: u64,
    completions: u64,
}

impl TryFrom<RawFlowCounter> for FlowCounter {
    type Error = MonitorError;

    fn try_from(raw: RawFlowCounter) -> MonitorResult<Self> {
        Self::checked(raw.arrivals, raw.in_flight, raw.completions)
    }
}

/// Renders as `[arrivals,in_flight,completions]`.
impl Display for FlowCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{}]",
            self.arrivals, self.in_flight, self.completions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_balance() {
        let unbalanced = FlowCounter::from_parts(11, 0, 10);
        let balanced = FlowCounter::from_parts(10, 0, 10);
        assert!(!unbalanced.is_balanced());
        assert!(balanced.is_balanced());
    }

    #[test]
    fn test_rendering() {
        assert_eq!(FlowCounter::from_parts(11, 0, 10).to_string(), "[11,0,10]");
        assert_eq!(FlowCounter::new().to_string(), "[0,0,0]");
    }

    #[test]
    fn test_arrivals_and_completions() {
        let mut counter = FlowCounter::new();
        for _ in 0..5 {
            counter.record_arrival();
        }
        for _ in 0..3 {
            counter.record_completion().unwrap();
        }
        assert_eq!(counter.snapshot(), (5, 2, 3));
        assert!(!counter.is_balanced());
        assert!(!counter.is_quiescent());

        counter.record_completion().unwrap();
        counter.record_completion().unwrap();
        assert_eq!(counter.snapshot(), (5, 0, 5));
        assert!(counter.is_balanced());
        assert!(counter.is_quiescent());
    }

    #[test]
    fn test_unmatched_completion_leaves_counter_untouched() {
        let mut counter = FlowCounter::new();
        assert_eq!(counter.record_completion(), Err(UnmatchedCompletion));
        assert_eq!(counter, FlowCounter::new());

        counter.record_arrival();
        counter.record_completion().unwrap();
        let before = counter;
        assert!(counter.record_completion().is_err());
        assert_eq!(counter, before);
    }

    #[test]
    fn test_checked_rejects_impossible_counts() {
        assert_eq!(
            FlowCounter::checked(11, 1, 10),
            Ok(FlowCounter::from_parts(11, 1, 10))
        );
        assert_eq!(
            FlowCounter::checked(0, 0, 5),
            Err(MonitorError::InvalidCounter {
                arrivals: 0,
                in_flight: 0,
                completions: 5
            })
        );
        assert!(FlowCounter::checked(3, 2, 2).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let counter = FlowCounter::from_parts(11, 1, 10);
        let json = serde_json::to_string(&counter).unwrap();
        assert_eq!(json, r#"{"arrivals":11,"in_flight":1,"completions":10}"#);
        assert_eq!(serde_json::from_str::<FlowCounter>(&json).unwrap(), counter);
    }

    #[test]
    fn test_deserialize_rejects_excess_completions() {
        let err = serde_json::from_str::<FlowCounter>(
            r#"{"arrivals":0,"in_flight":0,"completions":5}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid counter [0,0,5]"));

        assert!(serde_json::from_str::<FlowCounter>(
            r#"{"arrivals":4,"in_flight":3,"completions":2}"#
        )
        .is_err());
    }
}
