// src/gui.rs
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use crate::drivers::plot::{drawable, TITLE, X_LABEL, Y_LABEL};
use crate::drivers::{LineSource, Monitor, MonitorError, PlotState};
use crate::engine::{self, RunSummary, StopReason};
use crate::types::{Pump, SamplePoint};

// 每帧最多处理的行数，防止界面卡死
const MAX_LINES_PER_FRAME: usize = 256;

pub type Outcome = Rc<RefCell<Option<Result<RunSummary, MonitorError>>>>;

pub struct ScopeApp<S: LineSource> {
    monitor: Option<Monitor<S>>,
    stop: Arc<AtomicBool>,
    outcome: Outcome,
    redraw_tick: Duration,
    // 最后一帧的曲线，结束后继续显示
    mag_line: Vec<[f64; 2]>,
    rms_line: Vec<[f64; 2]>,
    bounds: PlotState,
    latest: Option<SamplePoint>,
    samples: usize,
    status: String,
}

impl<S: LineSource> ScopeApp<S> {
    pub fn new(
        monitor: Monitor<S>,
        stop: Arc<AtomicBool>,
        outcome: Outcome,
        redraw_tick: Duration,
    ) -> Self {
        let status = format!("Recording to {}", monitor.files().csv_path.display());
        Self {
            monitor: Some(monitor),
            stop,
            outcome,
            redraw_tick,
            mag_line: Vec::new(),
            rms_line: Vec::new(),
            bounds: PlotState::default(),
            latest: None,
            samples: 0,
            status,
        }
    }

    /// Drain what the transport has, up to a per-frame budget.
    fn pump(&mut self) -> Option<StopReason> {
        let monitor = self.monitor.as_mut()?;
        if self.stop.load(Ordering::SeqCst) {
            return Some(StopReason::Interrupted);
        }
        let mut changed = false;
        let mut reason = None;
        for _ in 0..MAX_LINES_PER_FRAME {
            match monitor.pump_once() {
                Ok(Pump::Accepted(point)) => {
                    self.latest = Some(point);
                    changed = true;
                }
                Ok(Pump::Rejected) => {}
                Ok(Pump::Idle) => break,
                Ok(Pump::Closed) => {
                    reason = Some(StopReason::EndOfStream);
                    break;
                }
                Err(e) => {
                    reason = Some(StopReason::Fault(e));
                    break;
                }
            }
        }
        if changed {
            let history = monitor.history();
            self.mag_line = history.magnitude_points().map(|(t, v)| [t, v]).collect();
            self.rms_line = history.rms_points().map(|(t, v)| [t, v]).collect();
            self.bounds = *monitor.plot();
            self.samples = monitor.samples_recorded();
        }
        reason
    }

    /// Tear the session down. Later calls are no-ops.
    fn shutdown(&mut self, reason: StopReason) {
        let Some(monitor) = self.monitor.take() else {
            return;
        };
        let result = engine::shutdown(monitor, reason);
        self.status = match &result {
            Ok(summary) => match &summary.stop {
                StopReason::Fault(e) => format!("Transport fault: {e}"),
                _ => format!("Saved {}", summary.artifacts.png_path.display()),
            },
            Err(e) => format!("Teardown failed: {e}"),
        };
        *self.outcome.borrow_mut() = Some(result);
    }

    fn draw(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("samples: {}", self.samples));
                if let Some(p) = self.latest {
                    ui.separator();
                    ui.monospace(format!(
                        "t={:.3}s  mag={:.4} g  rms={:.4} g",
                        p.elapsed, p.magnitude, p.rms
                    ));
                }
                ui.separator();
                ui.label(&self.status);
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(TITLE);
            let (x0, x1) = drawable(self.bounds.x_bounds);
            let (y0, y1) = drawable(self.bounds.y_bounds);
            Plot::new("vibration_plot")
                .legend(Legend::default())
                .x_axis_label(X_LABEL)
                .y_axis_label(Y_LABEL)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, y0], [x1, y1]));
                    plot_ui.line(
                        Line::new(PlotPoints::new(self.mag_line.clone()))
                            .name("mag")
                            .color(Color32::from_rgb(31, 119, 180)),
                    );
                    plot_ui.line(
                        Line::new(PlotPoints::new(self.rms_line.clone()))
                            .name("rms")
                            .color(Color32::from_rgb(255, 127, 14)),
                    );
                });
        });
    }
}

impl<S: LineSource + 'static> eframe::App for ScopeApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ctrl+C 时关闭窗口；流结束时保留最后的画面
        if let Some(reason) = self.pump() {
            self.shutdown(reason);
        }
        ctx.set_visuals(egui::Visuals::dark());
        self.draw(ctx);
        if self.monitor.is_some() {
            ctx.request_repaint_after(self.redraw_tick);
        } else if self.stop.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else {
            // 会话已结束，只需留意 Ctrl+C
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown(StopReason::Interrupted);
    }
}

impl<S: LineSource> Drop for ScopeApp<S> {
    fn drop(&mut self) {
        self.shutdown(StopReason::Interrupted);
    }
}

/// Open the live window and run the session inside its frame loop.
pub fn run<S: LineSource + 'static>(
    monitor: Monitor<S>,
    stop: Arc<AtomicBool>,
    redraw_tick: Duration,
) -> anyhow::Result<Option<Result<RunSummary, MonitorError>>> {
    let outcome: Outcome = Rc::new(RefCell::new(None));
    let app = ScopeApp::new(monitor, stop, outcome.clone(), redraw_tick);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([900.0, 500.0])
        .with_min_inner_size([480.0, 320.0])
        .with_title(TITLE);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native("vibescope", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("window error: {e}"))?;
    let result = outcome.borrow_mut().take();
    Ok(result)
}
