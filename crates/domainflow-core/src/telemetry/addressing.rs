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

//! Lattice addressing: packing an `(i, j, k)` coordinate into a dense resource tag.

use super::error::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Number of bits each coordinate occupies inside a [`ResourceTag`].
pub const COORDINATE_BITS: u32 = 16;

/// The largest coordinate value that can be packed without loss.
pub const MAX_COORDINATE: u32 = (1 << COORDINATE_BITS) - 1;

const COORDINATE_MASK: u64 = MAX_COORDINATE as u64;

/// One of the three lattice axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The first coordinate, packed into bits 0..16.
    I,
    /// The second coordinate, packed into bits 16..32.
    J,
    /// The third coordinate, packed into bits 32..48.
    K,
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::I => write!(f, "i"),
            Axis::J => write!(f, "j"),
            Axis::K => write!(f, "k"),
        }
    }
}

/// A position `(i, j, k)` in the iteration space of a computation.
///
/// Coordinates are stored as `u32` so that out-of-range input can be
/// represented and rejected by [`ResourceAddress::encode`] instead of being
/// silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ResourceAddress {
    /// First lattice coordinate.
    pub i: u32,
    /// Second lattice coordinate.
    pub j: u32,
    /// Third lattice coordinate.
    pub k: u32,
}

impl ResourceAddress {
    /// Creates a new address from its three coordinates.
    pub const fn new(i: u32, j: u32, k: u32) -> Self {
        Self { i, j, k }
    }

    /// Packs the address into a [`ResourceTag`] as `i | j << 16 | k << 32`.
    ///
    /// The packing is injective for every address whose coordinates fit in
    /// 16 bits. Any coordinate above [`MAX_COORDINATE`] is rejected with
    /// [`MonitorError::AddressOutOfRange`].
    pub fn encode(&self) -> MonitorResult<ResourceTag> {
        for (axis, value) in self.coordinates() {
            if value > MAX_COORDINATE {
                return Err(MonitorError::AddressOutOfRange { axis, value });
            }
        }
        Ok(ResourceTag(
            u64::from(self.i)
                | u64::from(self.j) << COORDINATE_BITS
                | u64::from(self.k) << (2 * COORDINATE_BITS),
        ))
    }

    /// Returns the coordinates paired with their axis, in packing order.
    pub fn coordinates(&self) -> [(Axis, u32); 3] {
        [(Axis::I, self.i), (Axis::J, self.j), (Axis::K, self.k)]
    }

    /// Formats the address as a lattice point, e.g. `(1,1,3)`.
    pub fn lattice_point(&self) -> String {
        format!("({},{},{})", self.i, self.j, self.k)
    }

    /// Formats the address as a processing-element label, e.g. `[1][2]`.
    ///
    /// A zero `k` is omitted so that planar resources read as two-dimensional
    /// arrays of processing elements.
    pub fn resource_label(&self) -> String {
        if self.k == 0 {
            format!("[{}][{}]", self.i, self.j)
        } else {
            format!("[{}][{}][{}]", self.i, self.j, self.k)
        }
    }
}

impl Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lattice_point())
    }
}

impl From<[u16; 3]> for ResourceAddress {
    fn from(c: [u16; 3]) -> Self {
        Self::new(u32::from(c[0]), u32::from(c[1]), u32::from(c[2]))
    }
}

impl TryFrom<ResourceAddress> for ResourceTag {
    type Error = MonitorError;

    fn try_from(address: ResourceAddress) -> MonitorResult<Self> {
        address.encode()
    }
}

/// An opaque 64-bit identifier for a monitored resource.
///
/// Tags are normally produced by [`ResourceAddress::encode`]; simulators that
/// already own a dense numbering can wrap it directly with
/// [`ResourceTag::from_raw`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceTag(u64);

impl ResourceTag {
    /// Wraps a raw identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Unpacks the tag back into the address it was encoded from.
    ///
    /// Only the low 48 bits take part; bits above them are ignored, so a raw
    /// tag that was not produced by `encode` decodes to its low 48 bits.
    pub fn decode(self) -> ResourceAddress {
        ResourceAddress {
            i: (self.0 & COORDINATE_MASK) as u32,
            j: ((self.0 >> COORDINATE_BITS) & COORDINATE_MASK) as u32,
            k: ((self.0 >> (2 * COORDINATE_BITS)) & COORDINATE_MASK) as u32,
        }
    }
}

impl Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
