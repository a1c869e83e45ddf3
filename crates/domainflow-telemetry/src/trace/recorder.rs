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

//! Multi-producer collection of trace events.

use domainflow_core::TraceEvent;

/// Collects trace events from any number of simulation workers.
///
/// Events travel over an unbounded multi-producer channel, so recording never
/// blocks the worker. The owner drains the accumulated events whenever it
/// wants to export them.
#[derive(Debug)]
pub struct TraceRecorder {
    sender: flume::Sender<TraceEvent>,
    receiver: flume::Receiver<TraceEvent>,
}

impl TraceRecorder {
    /// Creates a new recorder with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!("Trace recorder initialized.");
        Self { sender, receiver }
    }

    /// Records an event.
    pub fn record(&self, event: TraceEvent) {
        log::trace!("Recording trace event for {}", event.element);
        // The recorder holds the receiver, so this cannot disconnect.
        let _ = self.sender.send(event);
    }

    /// Returns a handle that worker threads can record through.
    pub fn sender(&self) -> TraceSender {
        TraceSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of events waiting to be drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Removes and returns every event recorded so far, in arrival order.
    pub fn drain(&self) -> Vec<TraceEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// A cloneable recording handle for worker threads.
#[derive(Debug, Clone)]
pub struct TraceSender {
    sender: flume::Sender<TraceEvent>,
}

impl TraceSender {
    /// Records an event, logging an error if the recorder has been dropped.
    pub fn record(&self, event: TraceEvent) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to record trace event: {e}. Recorder likely dropped.");
        }
    }
}
