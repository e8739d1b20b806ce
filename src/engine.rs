// src/engine.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use crate::drivers::{LineSource, Monitor, MonitorError};
use crate::types::{Artifacts, Pump};

/// Why the read loop ended.
#[derive(Debug)]
pub enum StopReason {
    EndOfStream,
    Interrupted,
    Fault(MonitorError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub artifacts: Artifacts,
    pub samples: usize,
    pub stop: StopReason,
}

/// Steady state: read, record, redraw until the stream ends, a stop is requested
/// or the transport fails.
pub fn drive<S: LineSource>(
    monitor: &mut Monitor<S>,
    stop: &AtomicBool,
    redraw_tick: Duration,
) -> StopReason {
    loop {
        if stop.load(Ordering::SeqCst) {
            return StopReason::Interrupted;
        }
        match monitor.pump_once() {
            Ok(Pump::Accepted(point)) => {
                log::trace!(
                    "t={:.3}s mag={} rms={} x={:?} y={:?}",
                    point.elapsed,
                    point.magnitude,
                    point.rms,
                    monitor.plot().x_bounds,
                    monitor.plot().y_bounds
                );
                // 让出一下，给显示刷新
                if !redraw_tick.is_zero() {
                    thread::sleep(redraw_tick);
                }
            }
            Ok(Pump::Rejected) | Ok(Pump::Idle) => {}
            Ok(Pump::Closed) => return StopReason::EndOfStream,
            Err(e) => return StopReason::Fault(e),
        }
    }
}

/// Run a session to completion without a window, then tear it down exactly once.
pub fn run_headless<S: LineSource>(
    mut monitor: Monitor<S>,
    stop: &AtomicBool,
    redraw_tick: Duration,
) -> Result<RunSummary, MonitorError> {
    let reason = drive(&mut monitor, stop, redraw_tick);
    shutdown(monitor, reason)
}

/// Teardown shared by every front end.
pub fn shutdown<S: LineSource>(
    monitor: Monitor<S>,
    stop: StopReason,
) -> Result<RunSummary, MonitorError> {
    match &stop {
        StopReason::EndOfStream => log::info!("stream closed"),
        StopReason::Interrupted => log::info!("stop requested"),
        StopReason::Fault(e) => log::error!("transport fault: {e}"),
    }
    let samples = monitor.samples_recorded();
    let artifacts = monitor.finish()?;
    artifacts.report();
    Ok(RunSummary {
        artifacts,
        samples,
        stop,
    })
}
