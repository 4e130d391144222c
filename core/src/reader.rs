//! Snapshot dump ingestion.
//!
//! Two modes: bulk replay of a finished dump, where the whole file is
//! memory-mapped and parsed in parallel, and live tailing of a dump that
//! another process is still appending to.

use std::fs::File;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use memmap2::Mmap;
use rayon::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::CoreError;
use crate::snapshot::Snapshot;

const TAIL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Parse an entire dump file into snapshots, in file order. Lines that do
/// not parse are skipped with a warning; a dump truncated mid-line must
/// not sink the replay.
pub fn read_dump_file(path: &Path) -> Result<Vec<Snapshot>, CoreError> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    // Safety: the mapping is read-only and dropped before this returns.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| CoreError::io(path, e))?;
    let data = &mmap[..];

    let mut lines = Vec::new();
    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', data) {
        lines.push(&data[start..end]);
        start = end + 1;
    }
    if start < data.len() {
        lines.push(&data[start..]);
    }

    Ok(lines
        .par_iter()
        .filter_map(|line| parse_line(line))
        .collect())
}

/// Follow a dump file as it grows, sending each new snapshot down the
/// channel. Starts from the current end of file. Returns when the
/// receiver is dropped.
pub async fn tail_dump_file(
    path: &Path,
    tx: mpsc::Sender<Snapshot>,
) -> Result<(), CoreError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| CoreError::io(path, e))?;
    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::End(0))
        .await
        .map_err(|e| CoreError::io(path, e))?;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| CoreError::io(path, e))?;
        if read == 0 {
            tokio::time::sleep(TAIL_POLL_INTERVAL).await;
            continue;
        }
        if let Some(snapshot) = parse_line(line.as_bytes()) {
            if tx.send(snapshot).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// One dump line. Accepts both the enveloped form written by the snapshot
/// logger and a bare snapshot object.
fn parse_line(line: &[u8]) -> Option<Snapshot> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_slice(trimmed) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, "skipping unparseable dump line");
            return None;
        }
    };
    let inner = match value.get("snapshot") {
        Some(inner) => inner.clone(),
        None => value,
    };
    match serde_json::from_value(inner) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(%err, "skipping malformed snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_file(tag: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "wardscry-reader-{tag}-{}.jsonl",
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_bare_and_enveloped_lines() {
        let path = scratch_file(
            "mixed",
            concat!(
                r#"{"map": {"game_time": 1.0}}"#,
                "\n",
                r#"{"received_at": "2026-01-01T00:00:00Z", "snapshot": {"map": {"game_time": 2.0}}}"#,
                "\n",
            ),
        );
        let snapshots = read_dump_file(&path).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].game_time(), Some(1.0));
        assert_eq!(snapshots[1].game_time(), Some(2.0));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_bad_lines_are_skipped() {
        let path = scratch_file(
            "bad",
            "not json\n{\"map\": {\"game_time\": 3.0}}\n{\"truncat",
        );
        let snapshots = read_dump_file(&path).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].game_time(), Some(3.0));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("wardscry-reader-no-such-file.jsonl");
        assert!(read_dump_file(&path).is_err());
    }
}
