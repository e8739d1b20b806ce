use crate::drivers::buffer::History;
use crate::drivers::error::MonitorError;
use crate::drivers::parser::parse_record;
use crate::drivers::plot::{save_history_png, PlotState, PlotStyle};
use crate::drivers::source::{LineSource, ReadOutcome};
use crate::recorder::SampleRecorder;
use crate::session::SessionFiles;
use crate::types::{Artifacts, Pump, Sample, SamplePoint};
/// Seconds between the session origin `t0_ms` and `timestamp_ms`.
pub fn elapsed_seconds(t0_ms: u64, timestamp_ms: u64) -> f64 {
    (timestamp_ms as f64 - t0_ms as f64) / 1000.0
}
/// One monitoring session: owns the transport, the CSV log and the live window of samples.
pub struct Monitor<S: LineSource> {
    source: S,
    recorder: SampleRecorder,
    history: History,
    plot: PlotState,
    t0_ms: Option<u64>,
    files: SessionFiles,
    style: PlotStyle,
}
impl<S: LineSource> Monitor<S> {
    /// Takes ownership of an already opened transport and creates the log file.
    pub fn start(
        source: S,
        files: SessionFiles,
        capacity: usize,
        style: PlotStyle,
    ) -> Result<Self, MonitorError> {
        let history = History::with_capacity(capacity)?;
        let recorder = SampleRecorder::create(&files.csv_path)?;
        log::info!("session {} started (window of {capacity} samples)", files.stem);
        Ok(Self {
            source,
            recorder,
            history,
            plot: PlotState::default(),
            t0_ms: None,
            files,
            style,
        })
    }
    /// Read at most one line and run it through parse, record and redraw.
    pub fn pump_once(&mut self) -> Result<Pump, MonitorError> {
        let line = match self.source.next_line()? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Idle => return Ok(Pump::Idle),
            ReadOutcome::Closed => return Ok(Pump::Closed),
        };
        let Some(sample) = parse_record(&line) else {
            log::trace!("discarding line {line:?}");
            return Ok(Pump::Rejected);
        };
        self.recorder.write_sample(&sample)?;
        Ok(Pump::Accepted(self.accept(sample)))
    }
    fn accept(&mut self, sample: Sample) -> SamplePoint {
        let t0_ms = *self.t0_ms.get_or_insert(sample.timestamp_ms);
        let point = SamplePoint {
            elapsed: elapsed_seconds(t0_ms, sample.timestamp_ms),
            magnitude: sample.magnitude,
            rms: sample.rms,
        };
        self.history.push(point);
        self.plot.refresh(&self.history);
        point
    }
    pub fn history(&self) -> &History {
        &self.history
    }
    pub fn plot(&self) -> &PlotState {
        &self.plot
    }
    pub fn files(&self) -> &SessionFiles {
        &self.files
    }
    pub fn samples_recorded(&self) -> usize {
        self.recorder.rows()
    }
    /// Close the transport, close the log and save the final plot. Consumes the
    /// session, so it runs at most once. Both outputs are attempted even if one fails.
    pub fn finish(self) -> Result<Artifacts, MonitorError> {
        let Self {
            source,
            recorder,
            history,
            plot,
            files,
            style,
            ..
        } = self;
        drop(source);
        log::debug!("transport closed");
        let csv = recorder.finish();
        let png = save_history_png(&files.png_path, &history, &plot, &style);
        let csv_path = csv?;
        png?;
        Ok(Artifacts {
            csv_path,
            png_path: files.png_path,
        })
    }
}
