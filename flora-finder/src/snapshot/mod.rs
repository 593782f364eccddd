//! Snapshot persistence for a built [`PolygonIndex`].
//!
//! A snapshot stores the regions (rings, envelopes and attributes) in region
//! id order behind a small checksummed header. The R-Tree is not stored; on
//! load it is bulk-loaded again from the stored envelopes, which yields the
//! same region ids and the same candidate order as the index that was saved.
//!
//! Files are written to a uniquely named temporary file in the target
//! directory and renamed into place, so neither a crash mid-write nor two
//! concurrent saves leave a half-written snapshot under the final name.
//! Loading memory-maps the file.

mod format;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use memmap2::Mmap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config::LookupConfig;
use crate::errors::{FloraError, FloraResult};
use crate::index::{BuildReport, PolygonIndex};

pub use format::{MAGIC, VERSION};
use format::{SnapshotHeader, SnapshotRegion};

fn bincode_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

impl<A: Serialize> PolygonIndex<A> {
    /// Encodes the index into snapshot bytes.
    pub fn to_snapshot_bytes(&self) -> FloraResult<Vec<u8>> {
        let stored: Vec<SnapshotRegion<&A>> = self
            .regions()
            .iter()
            .map(SnapshotRegion::from_region)
            .collect();

        let payload = bincode::serde::encode_to_vec(&stored, bincode_config())
            .map_err(|e| FloraError::Serialization(format!("Failed to encode regions: {}", e)))?;
        let header = SnapshotHeader::for_payload(stored.len(), &payload);
        let mut bytes = bincode::serde::encode_to_vec(&header, bincode_config())
            .map_err(|e| FloraError::Serialization(format!("Failed to encode header: {}", e)))?;
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Writes a snapshot of the index to `path`, replacing any existing file.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> FloraResult<()> {
        let path = path.as_ref();
        let start = Instant::now();
        let bytes = self.to_snapshot_bytes()?;

        write_atomically(path, &bytes)?;

        log::info!(
            "Saved snapshot of {} regions ({} bytes) to {} in {:?}",
            self.len(),
            bytes.len(),
            path.display(),
            start.elapsed()
        );
        Ok(())
    }
}

impl<A: DeserializeOwned> PolygonIndex<A> {
    /// Restores an index from snapshot bytes.
    ///
    /// Query settings come from `config`; they are not part of the snapshot.
    pub fn from_snapshot_bytes(bytes: &[u8], config: &LookupConfig) -> FloraResult<Self> {
        let (header, consumed): (SnapshotHeader, usize) =
            bincode::serde::decode_from_slice(bytes, bincode_config())
                .map_err(|e| FloraError::Snapshot(format!("Failed to read header: {}", e)))?;
        header.validate()?;

        let payload = &bytes[consumed..];
        header.verify_payload(payload)?;

        let (stored, _): (Vec<SnapshotRegion<A>>, usize) =
            bincode::serde::decode_from_slice(payload, bincode_config())
                .map_err(|e| FloraError::Snapshot(format!("Failed to decode regions: {}", e)))?;

        if stored.len() as u64 != header.region_count {
            return Err(FloraError::Snapshot(format!(
                "Region count mismatch (header: {}, payload: {})",
                header.region_count,
                stored.len()
            )));
        }

        let regions = stored
            .into_iter()
            .enumerate()
            .map(|(id, region)| region.into_region(id))
            .collect::<FloraResult<Vec<_>>>()?;

        let report = BuildReport {
            regions_indexed: regions.len(),
            ..BuildReport::default()
        };
        Ok(Self::from_regions(regions, config, report))
    }

    /// Loads a snapshot previously written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: impl AsRef<Path>, config: &LookupConfig) -> FloraResult<Self> {
        let path = path.as_ref();
        let start = Instant::now();
        let file = File::open(path)?;

        // mapping a zero-length file fails on some platforms
        if file.metadata()?.len() == 0 {
            return Err(FloraError::Snapshot(format!(
                "Snapshot file {} is empty",
                path.display()
            )));
        }

        // SAFETY: the map is read-only and dropped before this function
        // returns; snapshots are replaced by rename, never modified in place.
        let mmap = unsafe { Mmap::map(&file)? };
        let index = Self::from_snapshot_bytes(&mmap, config)?;

        log::info!(
            "Loaded snapshot of {} regions from {} in {:?}",
            index.len(),
            path.display(),
            start.elapsed()
        );
        Ok(index)
    }
}

/// Writes `bytes` to a uniquely named temporary file next to `path`, syncs
/// it and renames it over `path`. The temporary file is removed if any step
/// fails.
fn write_atomically(path: &Path, bytes: &[u8]) -> FloraResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    writer.write_all(bytes)?;
    let tmp = writer
        .into_inner()
        .map_err(|e| FloraError::Io(e.into_error()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| FloraError::Io(e.error))?;
    Ok(())
}
