use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::time::Duration;
use serialport::SerialPort;
use crate::drivers::MonitorError;
/// What a single read attempt on the transport produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One line, lossily decoded, without its terminator.
    Line(String),
    /// The read timed out with no complete line available.
    Idle,
    /// The stream ended.
    Closed,
}
/// Trait representing something that yields telemetry lines on demand.
pub trait LineSource {
    fn next_line(&mut self) -> Result<ReadOutcome, MonitorError>;
}
impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<ReadOutcome, MonitorError> {
        (**self).next_line()
    }
}
/// Longest line kept, terminator included. Wire records are a few dozen bytes.
pub const MAX_LINE_BYTES: usize = 4096;
/// Splits any byte stream into lines. Bytes that arrive before a read timeout are
/// kept and completed by the next read.
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    // 超长行的剩余部分还没读完，读到换行前全部丢弃
    overlong: bool,
}
impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
            overlong: false,
        }
    }
    fn take_line(&mut self) -> String {
        let raw = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&raw);
        text.trim_end_matches(['\r', '\n']).to_owned()
    }
}
impl<R: Read> LineSource for LineReader<R> {
    fn next_line(&mut self) -> Result<ReadOutcome, MonitorError> {
        // pending 在两次调用之间不会超过 MAX_LINE_BYTES
        let budget = (MAX_LINE_BYTES + 1).saturating_sub(self.pending.len()) as u64;
        let read = (&mut self.reader)
            .take(budget)
            .read_until(b'\n', &mut self.pending);
        match read {
            Ok(0) if self.pending.is_empty() => Ok(ReadOutcome::Closed),
            Ok(_) if self.pending.len() > MAX_LINE_BYTES && self.pending.last() != Some(&b'\n') => {
                if !self.overlong {
                    log::warn!("dropping a line longer than {MAX_LINE_BYTES} bytes");
                }
                self.pending.clear();
                self.overlong = true;
                Ok(ReadOutcome::Idle)
            }
            Ok(_) if std::mem::take(&mut self.overlong) => {
                self.pending.clear();
                Ok(ReadOutcome::Idle)
            }
            // Either a full line, or the tail of a stream that ended without a newline.
            Ok(_) => Ok(ReadOutcome::Line(self.take_line())),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::Idle)
            }
            Err(e) => Err(MonitorError::Transport(e)),
        }
    }
}
/// Opens the serial port the microcontroller prints to.
pub fn open_serial(
    port: &str,
    baud: u32,
    read_timeout: Duration,
) -> Result<LineReader<Box<dyn SerialPort>>, MonitorError> {
    let handle = serialport::new(port, baud)
        .timeout(read_timeout)
        .open()
        .map_err(|source| MonitorError::TransportOpen {
            port: port.to_owned(),
            source,
        })?;
    log::debug!("opened {port} @ {baud} (timeout {read_timeout:?})");
    Ok(LineReader::new(handle))
}
/// Feeds a previously captured wire-format text file through the pipeline.
pub fn open_replay(path: &Path) -> Result<LineReader<File>, MonitorError> {
    let file = File::open(path).map_err(|source| MonitorError::ReplayOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineReader::new(file))
}
/// Scripted transport event for [`ManualSource`].
#[cfg(test)]
#[derive(Clone, Debug)]
pub enum ManualEvent {
    Line(String),
    Idle,
    Fault(ErrorKind),
}
/// In-memory source useful for tests and deterministic playback.
#[cfg(test)]
pub struct ManualSource {
    queue: std::collections::VecDeque<ManualEvent>,
}
#[cfg(test)]
impl ManualSource {
    pub fn new(events: impl IntoIterator<Item = ManualEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| ManualEvent::Line(l.into())))
    }
}
#[cfg(test)]
impl LineSource for ManualSource {
    fn next_line(&mut self) -> Result<ReadOutcome, MonitorError> {
        match self.queue.pop_front() {
            Some(ManualEvent::Line(line)) => Ok(ReadOutcome::Line(line)),
            Some(ManualEvent::Idle) => Ok(ReadOutcome::Idle),
            Some(ManualEvent::Fault(kind)) => Err(MonitorError::Transport(kind.into())),
            None => Ok(ReadOutcome::Closed),
        }
    }
}
