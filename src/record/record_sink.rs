use super::simulation_record::{RECORD_HEADER, SimulationRecord};
use crate::{info, warn};
use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};
use strum_macros::{Display, EnumString};

/// What to do with a record log that already exists at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SinkMode {
    /// Keep prior rows and append after them.
    Append,
    /// Start a fresh log, discarding prior rows.
    Truncate,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("record log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record log CSV failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path} has header {found:?}, refusing to append")]
    HeaderMismatch { path: String, found: Vec<String> },
    #[error("{path} holds a row with step {value:?}, refusing to append")]
    BadStep { path: String, value: String },
    #[error("step {step} does not follow the last logged step {last}")]
    StepOrder { last: u64, step: u64 },
    #[error("record log is already closed")]
    Closed,
}

/// What `open` found at the log path in append mode.
enum ExistingLog {
    Absent,
    HeaderOnly,
    Rows { last_step: u64 },
}

/// Append-only, durable destination for simulation records.
pub trait RecordSink: Send {
    /// Appends one record. Returns only after the record is durable.
    fn append(&mut self, record: &SimulationRecord) -> Result<(), SinkError>;

    /// Flushes and releases the underlying resource. Later appends fail.
    fn close(&mut self) -> Result<(), SinkError> { Ok(()) }
}

/// CSV record log with a fixed header, synced to disk after every row.
///
/// Steps in the log are strictly increasing, across restarts included: a reopened log
/// only accepts steps after the last one it already holds.
pub struct CsvRecordSink {
    writer: Option<csv::Writer<File>>,
    path: PathBuf,
    last_step: Option<u64>,
}

impl CsvRecordSink {
    const SCAN_CHUNK: u64 = 4096;

    /// Opens the log at `path`.
    ///
    /// In [`SinkMode::Append`] an existing log is checked for the expected header, a
    /// torn last row is cut off and its last step is remembered; an empty or missing log
    /// gets a fresh header.
    ///
    /// # Errors
    /// - `SinkError::HeaderMismatch` if an existing log has different columns.
    /// - `SinkError::BadStep` if an existing row has no valid step.
    /// - `SinkError::Io` / `SinkError::Csv` if the file cannot be prepared.
    pub fn open(path: impl AsRef<Path>, mode: SinkMode) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let existing = match mode {
            SinkMode::Append => Self::prepare_existing(&path)?,
            SinkMode::Truncate => ExistingLog::Absent,
        };
        let (has_header, last_step) = match existing {
            ExistingLog::Absent => (false, None),
            ExistingLog::HeaderOnly => (true, None),
            ExistingLog::Rows { last_step } => (true, Some(last_step)),
        };

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            SinkMode::Append => options.append(true),
            SinkMode::Truncate => options.write(true).truncate(true),
        };
        let file = options.open(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if has_header {
            info!(
                "Appending to existing record log {} after step {}.",
                path.display(),
                last_step.unwrap_or_default()
            );
        } else {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;
            writer.get_ref().sync_data()?;
            info!("Created record log {}.", path.display());
        }
        Ok(Self { writer: Some(writer), path, last_step })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path { &self.path }

    /// Highest step in the log, from earlier runs or this one.
    pub fn last_step(&self) -> Option<u64> { self.last_step }

    /// Validates the log at `path` and finds its last step.
    fn prepare_existing(path: &Path) -> Result<ExistingLog, SinkError> {
        let mut file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ExistingLog::Absent),
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();
        if len == 0 || Self::cut_torn_row(&mut file, len, path)? == 0 {
            return Ok(ExistingLog::Absent);
        }
        drop(file);

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let found = reader.headers()?;
        if !found.iter().eq(RECORD_HEADER.iter().copied()) {
            return Err(SinkError::HeaderMismatch {
                path: path.display().to_string(),
                found: found.iter().map(String::from).collect(),
            });
        }
        let mut last_step = None;
        for row in reader.records() {
            let row = row?;
            let value = row.get(0).unwrap_or_default();
            let step = value.parse::<u64>().map_err(|_| SinkError::BadStep {
                path: path.display().to_string(),
                value: value.to_string(),
            })?;
            last_step = Some(step);
        }
        Ok(last_step.map_or(ExistingLog::HeaderOnly, |last_step| ExistingLog::Rows { last_step }))
    }

    /// Truncates the file after its last newline, dropping a row a crash left half
    /// written. Returns the resulting length.
    #[allow(clippy::cast_possible_truncation)]
    fn cut_torn_row(file: &mut File, len: u64, path: &Path) -> Result<u64, SinkError> {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(len);
        }
        let mut buf = vec![0u8; Self::SCAN_CHUNK as usize];
        let mut end = len;
        let keep = loop {
            if end == 0 {
                break 0;
            }
            let start = end.saturating_sub(Self::SCAN_CHUNK);
            let n = (end - start) as usize;
            file.seek(SeekFrom::Start(start))?;
            file.read_exact(&mut buf[..n])?;
            if let Some(i) = buf[..n].iter().rposition(|b| *b == b'\n') {
                break start + i as u64 + 1;
            }
            end = start;
        };
        file.set_len(keep)?;
        file.sync_data()?;
        warn!("Cut {} bytes of a torn row off {}.", len - keep, path.display());
        Ok(keep)
    }
}

impl RecordSink for CsvRecordSink {
    fn append(&mut self, record: &SimulationRecord) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        if let Some(last) = self.last_step.filter(|last| record.step() <= *last) {
            return Err(SinkError::StepOrder { last, step: record.step() });
        }
        writer.serialize(record)?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        self.last_step = Some(record.step());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            info!("Closed record log {}.", self.path.display());
        }
        Ok(())
    }
}
