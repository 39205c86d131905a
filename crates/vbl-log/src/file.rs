use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use vbl_types::BlobId;

use crate::error::{LogError, LogResult};
use crate::event::BlobEvent;
use crate::traits::EventLog;

/// Flush/sync strategy for the file log.
#[derive(Clone, Debug, Default)]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    #[default]
    OsDefault,
}

/// Configuration for the file-backed event log.
#[derive(Clone, Debug, Default)]
pub struct FileLogConfig {
    /// Sync/flush strategy.
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Internal mutable state for the log writer.
struct LogWriter {
    writer: BufWriter<File>,
    /// Current write offset in the segment file.
    offset: u64,
}

/// Crash-recoverable file-backed event log.
///
/// Events are serialized with bincode, framed with a length prefix and a
/// CRC32 checksum, and written to a single segment file:
///
/// ```text
/// [4 bytes: entry length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized BlobEvent)]
/// ```
///
/// Reads scan the file front-to-back; entries that fail the CRC check are
/// skipped (they represent incomplete/torn writes from a crash).
pub struct FileEventLog {
    /// Path to the segment file.
    path: PathBuf,
    /// Writer state behind a mutex for thread safety.
    writer: Mutex<LogWriter>,
    /// Number of valid entries (recovered at open, bumped on append).
    count: AtomicU64,
    /// Configuration.
    config: FileLogConfig,
}

impl FileEventLog {
    /// Open (or create) a segment file at the given path.
    ///
    /// Existing entries are scanned once to recover the entry count.
    pub fn open(path: &Path, config: FileLogConfig) -> LogResult<Self> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let offset = file.metadata()?.len();
        let writer = BufWriter::new(file);
        let recovered = Self::scan_file(path)?;

        debug!(path = %path.display(), entries = recovered.len(), "file log opened");

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter { writer, offset }),
            count: AtomicU64::new(recovered.len() as u64),
            config,
        })
    }

    /// Current write offset.
    pub fn offset(&self) -> u64 {
        self.writer.lock().expect("log mutex poisoned").offset
    }

    /// Path to the segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the log (remove all entries).
    pub fn truncate(&self) -> LogResult<()> {
        let mut w = self.writer.lock().expect("log mutex poisoned");

        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        w.writer = BufWriter::new(file);
        w.offset = 0;
        self.count.store(0, Ordering::SeqCst);

        debug!("file log truncated");
        Ok(())
    }

    /// Read all valid entries from the segment, front to back.
    fn scan_file(path: &Path) -> LogResult<Vec<BlobEvent>> {
        let mut file = BufReader::new(File::open(path)?);
        let file_len = file.get_ref().metadata()?.len();
        let mut events = Vec::new();
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            file.seek(SeekFrom::Start(offset))?;

            // Read header
            let mut header_buf = [0u8; HEADER_SIZE];
            match file.read_exact(&mut header_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let length =
                u32::from_le_bytes([header_buf[0], header_buf[1], header_buf[2], header_buf[3]]);
            let expected_crc =
                u32::from_le_bytes([header_buf[4], header_buf[5], header_buf[6], header_buf[7]]);

            // Validate length
            if length == 0 || (offset + HEADER_SIZE as u64 + length as u64) > file_len {
                warn!(offset, length, file_len, "invalid log entry length; stopping scan");
                break;
            }

            // Read payload
            let mut payload = vec![0u8; length as usize];
            match file.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    warn!(offset, "truncated log entry; stopping scan");
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            // CRC check
            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "CRC mismatch; skipping entry"
                );
                offset += HEADER_SIZE as u64 + length as u64;
                continue;
            }

            // Deserialize
            match bincode::deserialize::<BlobEvent>(&payload) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(offset, error = %e, "failed to deserialize log entry; skipping");
                }
            }

            offset += HEADER_SIZE as u64 + length as u64;
        }

        Ok(events)
    }
}

impl EventLog for FileEventLog {
    fn append(&self, event: &BlobEvent) -> LogResult<()> {
        let payload =
            bincode::serialize(event).map_err(|e| LogError::Serialization(e.to_string()))?;

        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        let mut w = self.writer.lock().expect("log mutex poisoned");

        // Write header: [length: u32 LE] [crc: u32 LE]
        w.writer.write_all(&length.to_le_bytes())?;
        w.writer.write_all(&crc.to_le_bytes())?;
        // Write payload
        w.writer.write_all(&payload)?;

        // Sync if configured for every write.
        if matches!(self.config.sync_mode, SyncMode::EveryWrite) {
            w.writer.flush()?;
            w.writer.get_ref().sync_all()?;
        } else {
            w.writer.flush()?;
        }

        w.offset += HEADER_SIZE as u64 + payload.len() as u64;
        self.count.fetch_add(1, Ordering::SeqCst);

        debug!(id = %event.id, len = payload.len(), "log append");
        Ok(())
    }

    fn read_blob(&self, blob: &BlobId) -> LogResult<Vec<BlobEvent>> {
        Ok(Self::scan_file(&self.path)?
            .into_iter()
            .filter(|event| event.blob == *blob)
            .collect())
    }

    fn read_all(&self) -> LogResult<Vec<BlobEvent>> {
        Self::scan_file(&self.path)
    }

    fn len(&self) -> LogResult<u64> {
        Ok(self.count.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventPayload};

    fn test_blob(seed: u8) -> BlobId {
        BlobId::from_raw([seed; 32])
    }

    fn make_event(seed: u8, block: u32) -> BlobEvent {
        BlobEvent::new(
            test_blob(seed),
            block,
            EventKind::ContentPublished,
            EventPayload::Content {
                revision: 0,
                bytes: vec![seed, seed, seed],
            },
        )
    }

    #[test]
    fn append_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileEventLog::open(&dir.path().join("events.log"), FileLogConfig::default())
            .unwrap();

        let e1 = make_event(1, 10);
        let e2 = make_event(2, 11);
        let e3 = make_event(1, 12);

        log.append(&e1).unwrap();
        log.append(&e2).unwrap();
        log.append(&e3).unwrap();

        let all = log.read_all().unwrap();
        assert_eq!(all, vec![e1.clone(), e2, e3.clone()]);

        let one = log.read_blob(&test_blob(1)).unwrap();
        assert_eq!(one, vec![e1, e3]);
    }

    #[test]
    fn read_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log =
            FileEventLog::open(&dir.path().join("empty.log"), FileLogConfig::default()).unwrap();
        assert!(log.read_all().unwrap().is_empty());
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn reopen_recovers_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.log");

        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();
        log.append(&make_event(1, 1)).unwrap();
        log.append(&make_event(2, 2)).unwrap();
        drop(log);

        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();
        assert_eq!(log.len().unwrap(), 2);
        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn crc_detects_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.log");
        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();

        log.append(&make_event(1, 1)).unwrap();
        log.append(&make_event(2, 2)).unwrap();
        drop(log);

        // Corrupt the payload of the first entry (byte 8 is first payload byte).
        {
            let mut file = OpenOptions::new()
                .write(true)
                .read(true)
                .open(&path)
                .unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xFF;
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            file.write_all(&buf).unwrap();
            file.sync_all().unwrap();
        }

        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();
        let recovered = log.read_all().unwrap();

        // First entry should be skipped due to CRC failure; second survives.
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0], make_event(2, 2));
        assert_eq!(log.len().unwrap(), 1);
    }

    #[test]
    fn scan_survives_truncated_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tail.log");
        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();

        log.append(&make_event(1, 1)).unwrap();
        log.append(&make_event(2, 2)).unwrap();
        let total_len = log.offset();
        drop(log);

        // Truncate the file mid-entry (remove last 4 bytes).
        {
            let file = OpenOptions::new().write(true).open(&path).unwrap();
            file.set_len(total_len - 4).unwrap();
        }

        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();
        let recovered = log.read_all().unwrap();

        // Only the first complete entry should be recovered.
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0], make_event(1, 1));
    }

    #[test]
    fn truncate_clears_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trunc.log");
        let log = FileEventLog::open(&path, FileLogConfig::default()).unwrap();

        log.append(&make_event(1, 1)).unwrap();
        assert!(log.offset() > 0);

        log.truncate().unwrap();
        assert_eq!(log.offset(), 0);
        assert_eq!(log.len().unwrap(), 0);
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn sync_every_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileLogConfig {
            sync_mode: SyncMode::EveryWrite,
        };
        let log = FileEventLog::open(&dir.path().join("sync.log"), config).unwrap();

        log.append(&make_event(1, 1)).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }
}
