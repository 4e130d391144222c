//! Raw snapshot persistence for later replay.
//!
//! Every inbound snapshot is appended as one JSON line, wrapped in an
//! envelope carrying the wall-clock receive time. Files are kept small by
//! rotating at a fixed byte budget, with a per-match sequence number in
//! the name so a match's dumps sort and replay in order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::snapshot::Snapshot;

const MAX_FILE_BYTES: u64 = 1024 * 1024;

#[derive(Serialize)]
struct Envelope<'a> {
    received_at: String,
    snapshot: &'a Snapshot,
}

#[derive(Debug)]
pub struct SnapshotLogger {
    dir: PathBuf,
    match_key: Option<String>,
    seq: u32,
    writer: Option<BufWriter<File>>,
    bytes_written: u64,
}

impl SnapshotLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
        Ok(Self {
            dir,
            match_key: None,
            seq: 0,
            writer: None,
            bytes_written: 0,
        })
    }

    /// Append one snapshot, opening or rotating the file as needed.
    pub fn record(
        &mut self,
        match_id: Option<&str>,
        snapshot: &Snapshot,
    ) -> Result<(), CoreError> {
        let key = match_id.unwrap_or("unknown").to_string();
        if self.match_key.as_deref() != Some(&key) {
            self.seq = next_seq(&self.dir, &key)?;
            self.match_key = Some(key);
            self.open_current()?;
        } else if self.bytes_written >= MAX_FILE_BYTES {
            self.seq += 1;
            self.open_current()?;
        }

        let line = serde_json::to_string(&Envelope {
            received_at: Utc::now().to_rfc3339(),
            snapshot,
        })?;
        let writer = self.writer.as_mut().expect("opened above");
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush())
            .map_err(|e| CoreError::io(&self.dir, e))?;
        self.bytes_written += line.len() as u64 + 1;
        Ok(())
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        let key = self.match_key.as_deref()?;
        Some(self.dir.join(file_name(key, self.seq)))
    }

    fn open_current(&mut self) -> Result<(), CoreError> {
        let path = self.current_path().expect("match key set");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| CoreError::io(&path, e))?;
        self.bytes_written = file
            .metadata()
            .map_err(|e| CoreError::io(&path, e))?
            .len();
        self.writer = Some(BufWriter::new(file));
        info!(path = %path.display(), "snapshot dump file opened");
        Ok(())
    }
}

fn file_name(match_key: &str, seq: u32) -> String {
    format!("match_{match_key}_{seq}.jsonl")
}

/// First unused sequence number for a match, so restarts append after the
/// dumps already on disk instead of clobbering them.
fn next_seq(dir: &Path, match_key: &str) -> Result<u32, CoreError> {
    let prefix = format!("match_{match_key}_");
    let mut max_seen: Option<u32> = None;

    for entry in fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))? {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(seq) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".jsonl"))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        max_seen = Some(max_seen.map_or(seq, |m| m.max(seq)));
    }

    Ok(max_seen.map_or(0, |m| m + 1))
}
