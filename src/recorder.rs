use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::drivers::MonitorError;
use crate::types::Sample;

pub const CSV_HEADER: &str = "t_ms,mag_g,rms_g";

/// Append-only CSV log of every accepted sample, in raw device units.
pub struct SampleRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
    rows: usize,
}

impl SampleRecorder {
    pub fn create(path: &Path) -> Result<Self, MonitorError> {
        let file = File::create(path).map_err(|e| MonitorError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}").map_err(|e| MonitorError::io(path, e))?;
        log::info!("recording to {}", path.display());
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    pub fn write_sample(&mut self, sample: &Sample) -> Result<(), MonitorError> {
        // 原始时间戳，不做归一化
        writeln!(
            self.writer,
            "{},{},{}",
            sample.timestamp_ms, sample.magnitude, sample.rms
        )
        .map_err(|e| MonitorError::io(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and close the log. Consumes the recorder so it can only happen once.
    pub fn finish(self) -> Result<PathBuf, MonitorError> {
        let Self { writer, path, rows } = self;
        let file = writer
            .into_inner()
            .map_err(|e| MonitorError::io(&path, e.into_error()))?;
        file.sync_all().map_err(|e| MonitorError::io(&path, e))?;
        log::info!("recording saved ({rows} rows)");
        Ok(path)
    }
}
