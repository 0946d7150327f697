// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic, versioned JSON file I/O.
//!
//! Every write goes to a sibling `.tmp` file first, then `rename`s over the
//! target — on POSIX filesystems rename is atomic, so readers never observe
//! a partially-written file (FatalError policy: callers treat a write
//! failure here as fatal and do not retry inside this crate).

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Current envelope version written by this crate. Bump when a file's shape
/// changes in a way old readers can't tolerate; no migrations are
/// implemented (none were specified upstream), so a version bump is a
/// reminder to add one rather than something this crate does automatically.
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("malformed json at {path}: {source}")]
    Json { path: String, #[source] source: serde_json::Error },
}

impl StorageError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Envelope<T> {
    v: u32,
    data: T,
}

/// Write `value` to `path` atomically, wrapped in a versioned envelope.
///
/// Creates parent directories as needed. Pretty-prints so the files remain
/// diffable / human-inspectable on disk (they double as an audit trail).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| io_err(parent.to_string_lossy().into_owned(), e))?;
    }
    let envelope = Envelope { v: ENVELOPE_VERSION, data: value };
    let body = serde_json::to_vec_pretty(&envelope)
        .map_err(|e| json_err(path.to_string_lossy().into_owned(), e))?;

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, &body)
        .map_err(|e| io_err(tmp_path.to_string_lossy().into_owned(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path.to_string_lossy().into_owned(), e))?;
    Ok(())
}

/// Read and unwrap a versioned JSON envelope written by [`write_json_atomic`].
///
/// Returns `Ok(None)` if the file does not exist (first-touch case); any
/// other I/O or parse failure is returned as an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let envelope: Envelope<T> = serde_json::from_slice(&bytes)
                .map_err(|e| json_err(path.to_string_lossy().into_owned(), e))?;
            Ok(Some(envelope.data))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path.to_string_lossy().into_owned(), e)),
    }
}

fn io_err(path: String, source: std::io::Error) -> StorageError {
    StorageError::Io { path, source }
}

fn json_err(path: String, source: serde_json::Error) -> StorageError {
    StorageError::Json { path, source }
}
