//! On-disk layout of a snapshot.
//!
//! A snapshot is a [`SnapshotHeader`] followed by the payload, both encoded
//! with bincode's standard configuration. The payload is the list of
//! [`SnapshotRegion`]s in region-id order. These types are the file format;
//! they are kept apart from the in-memory `Region` and never
//! contain R-Tree internals.

use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::errors::{FloraError, FloraResult};
use crate::geometry::{Coordinate, Ring};
use crate::region::Region;

/// Magic number for file format identification ("FFSP").
pub const MAGIC: u32 = 0x4646_5350;

/// Current snapshot format version.
pub const VERSION: u32 = 1;

/// Header stored at the beginning of a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub region_count: u64,
    pub payload_len: u64,
    /// CRC-32/MPEG-2 of the payload bytes.
    pub payload_checksum: u32,
}

impl SnapshotHeader {
    pub fn for_payload(region_count: usize, payload: &[u8]) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            region_count: region_count as u64,
            payload_len: payload.len() as u64,
            payload_checksum: crc32(payload),
        }
    }

    pub fn validate(&self) -> FloraResult<()> {
        if self.magic != MAGIC {
            return Err(FloraError::Snapshot(
                "Invalid file format (bad magic)".into(),
            ));
        }
        if self.version != VERSION {
            return Err(FloraError::Snapshot(format!(
                "Unsupported snapshot version {} (expected {})",
                self.version, VERSION
            )));
        }
        Ok(())
    }

    /// Checks payload length and checksum against the header.
    pub fn verify_payload(&self, payload: &[u8]) -> FloraResult<()> {
        if payload.len() as u64 != self.payload_len {
            return Err(FloraError::Snapshot(format!(
                "Payload length mismatch - file truncated or padded (expected: {}, got: {})",
                self.payload_len,
                payload.len()
            )));
        }
        let actual = crc32(payload);
        if actual != self.payload_checksum {
            return Err(FloraError::Snapshot(format!(
                "Payload checksum mismatch - possible corruption (expected: {:x}, got: {:x})",
                self.payload_checksum, actual
            )));
        }
        Ok(())
    }
}

/// One region as persisted. `T` is the attribute type, or a reference to it
/// when writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRegion<T> {
    pub boundary: Vec<[f64; 2]>,
    pub holes: Vec<Vec<[f64; 2]>>,
    /// `[min_x, min_y, max_x, max_y]`
    pub envelope: [f64; 4],
    pub attributes: T,
}

impl<'a, A> SnapshotRegion<&'a A> {
    pub fn from_region(region: &'a Region<A>) -> Self {
        let env = region.envelope();
        Self {
            boundary: ring_to_pairs(region.boundary()),
            holes: region.holes().iter().map(ring_to_pairs).collect(),
            envelope: [env.min_x, env.min_y, env.max_x, env.max_y],
            attributes: region.attributes(),
        }
    }
}

impl<A> SnapshotRegion<A> {
    /// Converts back into a region. `id` is used for error messages only.
    pub fn into_region(self, id: usize) -> FloraResult<Region<A>> {
        if self.boundary.is_empty() {
            return Err(FloraError::Snapshot(format!(
                "Region {} has an empty boundary",
                id
            )));
        }
        let [min_x, min_y, max_x, max_y] = self.envelope;
        let envelope = BoundingBox::new(min_x, min_y, max_x, max_y);
        if !envelope.is_valid() {
            return Err(FloraError::Snapshot(format!(
                "Region {} has an invalid envelope {}",
                id, envelope
            )));
        }

        Ok(Region::new(
            pairs_to_ring(self.boundary),
            self.holes.into_iter().map(pairs_to_ring).collect(),
            envelope,
            self.attributes,
        ))
    }
}

fn ring_to_pairs(ring: &Ring) -> Vec<[f64; 2]> {
    ring.coordinates().iter().map(|c| [c.x, c.y]).collect()
}

fn pairs_to_ring(pairs: Vec<[f64; 2]>) -> Ring {
    Ring::new(pairs.into_iter().map(|[x, y]| Coordinate::new(x, y)).collect())
}

/// CRC-32/MPEG-2: polynomial 0x04C11DB7, initial value 0xFFFFFFFF, no
/// reflection and no final XOR.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    const POLY: u32 = 0x04C1_1DB7;

    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }

    crc
}
