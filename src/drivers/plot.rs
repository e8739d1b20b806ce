use std::io::Cursor;
use std::path::Path;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::buffer::History;
use crate::drivers::error::MonitorError;
/// Y range used while there is nothing to plot, before padding.
pub const DEFAULT_Y_RANGE: (f64, f64) = (-0.1, 0.1);
/// X range shown until the history holds two points.
pub const DEFAULT_X_RANGE: (f64, f64) = (0.0, 1.0);
pub const MIN_Y_PAD: f64 = 0.1;
pub const Y_PAD_FRACTION: f64 = 0.2;
pub const TITLE: &str = "MPU6050 Vibration (mag & rms)";
pub const X_LABEL: &str = "Time (s)";
pub const Y_LABEL: &str = "Acceleration (g)";
// RGB 缓冲区上限
const MAX_IMAGE_BYTES: usize = 256 * 1024 * 1024;
/// Y bounds covering both curves with `max(0.1, 20%)` headroom on each side.
pub fn y_bounds(history: &History) -> (f64, f64) {
    let (lo, hi) = history
        .magnitude()
        .iter()
        .chain(history.rms())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    // Empty history, or only non-finite values.
    let (lo, hi) = if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        DEFAULT_Y_RANGE
    };
    let pad = MIN_Y_PAD.max(Y_PAD_FRACTION * (hi - lo));
    (lo - pad, hi + pad)
}
/// Axis bounds of the live plot. The curves themselves are read straight from [`History`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotState {
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
}
impl Default for PlotState {
    fn default() -> Self {
        let (lo, hi) = DEFAULT_Y_RANGE;
        let pad = MIN_Y_PAD.max(Y_PAD_FRACTION * (hi - lo));
        Self {
            x_bounds: DEFAULT_X_RANGE,
            y_bounds: (lo - pad, hi + pad),
        }
    }
}
impl PlotState {
    /// Recompute bounds after the history changed. With fewer than two points the
    /// previous x range is kept.
    pub fn refresh(&mut self, history: &History) {
        if history.len() >= 2 {
            if let (Some(oldest), Some(newest)) = (history.oldest(), history.newest()) {
                self.x_bounds = (oldest, newest);
            }
        }
        self.y_bounds = y_bounds(history);
    }
}
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub magnitude_color: RGBColor,
    pub rms_color: RGBColor,
    /// Draw caption, tick labels and legend. Needs a system font.
    pub text: bool,
}
impl PlotStyle {
    /// 9 x 5 inch figure at the given resolution.
    pub fn for_dpi(dpi: u32) -> Self {
        Self {
            width: dpi.saturating_mul(9),
            height: dpi.saturating_mul(5),
            ..Self::default()
        }
    }
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1350,
            height: 750,
            background: RGBColor(10, 10, 10),
            foreground: WHITE,
            magnitude_color: RGBColor(31, 119, 180),
            rms_color: RGBColor(255, 127, 14),
            text: true,
        }
    }
}
/// Widen degenerate or reversed ranges so the chart has a drawable extent.
pub fn drawable(range: (f64, f64)) -> (f64, f64) {
    let (lo, hi) = if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    };
    if !lo.is_finite() || !hi.is_finite() {
        return DEFAULT_X_RANGE;
    }
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}
pub fn render_history_png(
    history: &History,
    state: &PlotState,
    style: &PlotStyle,
) -> Result<Vec<u8>, MonitorError> {
    let len = (style.width as usize)
        .checked_mul(style.height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .filter(|&len| len <= MAX_IMAGE_BYTES)
        .ok_or_else(|| {
            MonitorError::Plot(format!(
                "image size {}x{} is too large",
                style.width, style.height
            ))
        })?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (x0, x1) = drawable(state.x_bounds);
        let (y0, y1) = drawable(state.y_bounds);
        let mut builder = ChartBuilder::on(&root);
        builder.margin(10);
        if style.text {
            builder
                .caption(TITLE, ("sans-serif", 22).into_font().color(&style.foreground))
                .set_label_area_size(LabelAreaPosition::Left, 60)
                .set_label_area_size(LabelAreaPosition::Bottom, 45);
        }
        let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&style.foreground.mix(0.1))
            .bold_line_style(&style.foreground.mix(0.25));
        if style.text {
            mesh.x_desc(X_LABEL)
                .y_desc(Y_LABEL)
                .label_style(("sans-serif", 14).into_font().color(&style.foreground))
                .axis_desc_style(("sans-serif", 16).into_font().color(&style.foreground));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        let curves = [
            ("mag", style.magnitude_color, history.magnitude_points().collect::<Vec<_>>()),
            ("rms", style.rms_color, history.rms_points().collect::<Vec<_>>()),
        ];
        for (label, color, points) in curves {
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
        if style.text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font(("sans-serif", 14).into_font().color(&style.foreground))
                .border_style(&style.foreground.mix(0.2))
                .background_style(&style.background)
                .draw()?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Render the final snapshot and write it to `path`. Hosts without fonts still get
/// an image, drawn without text.
pub fn save_history_png(
    path: &Path,
    history: &History,
    state: &PlotState,
    style: &PlotStyle,
) -> Result<(), MonitorError> {
    let png = match render_history_png(history, state, style) {
        Ok(png) => png,
        Err(e) if style.text => {
            log::warn!("plot rendering with text failed ({e}); retrying without labels");
            let plain = PlotStyle {
                text: false,
                ..style.clone()
            };
            render_history_png(history, state, &plain)?
        }
        Err(e) => return Err(e),
    };
    std::fs::write(path, png).map_err(|e| MonitorError::io(path, e))
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, MonitorError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| MonitorError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SamplePoint;
    fn history_of(points: &[(f64, f64, f64)]) -> History {
        let mut history = History::with_capacity(16).unwrap();
        for &(elapsed, magnitude, rms) in points {
            history.push(SamplePoint {
                elapsed,
                magnitude,
                rms,
            });
        }
        history
    }
    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }
    #[test]
    fn y_bounds_use_minimum_pad() {
        let history = history_of(&[(0.0, 0.02, 0.03), (0.5, -0.01, 0.0)]);
        assert!(close(y_bounds(&history), (-0.11, 0.13)));
    }
    #[test]
    fn y_bounds_scale_pad_with_spread() {
        let history = history_of(&[(0.0, 1.0, 0.5), (0.5, 3.0, 0.5)]);
        // spread 2.5 -> pad 0.5
        assert!(close(y_bounds(&history), (0.0, 3.5)));
    }
    #[test]
    fn empty_history_falls_back_to_default_range() {
        let history = History::with_capacity(4).unwrap();
        assert!(close(y_bounds(&history), (-0.2, 0.2)));
        assert!(close(PlotState::default().y_bounds, (-0.2, 0.2)));
    }
    #[test]
    fn x_bounds_need_two_points() {
        let mut state = PlotState::default();
        let mut history = history_of(&[(0.0, 0.1, 0.1)]);
        state.refresh(&history);
        assert_eq!(state.x_bounds, DEFAULT_X_RANGE);
        history.push(SamplePoint {
            elapsed: 0.5,
            magnitude: 0.2,
            rms: 0.1,
        });
        state.refresh(&history);
        assert_eq!(state.x_bounds, (0.0, 0.5));
    }
    #[test]
    fn drawable_widens_degenerate_ranges() {
        assert_eq!(drawable((2.0, 2.0)), (1.5, 2.5));
        assert_eq!(drawable((3.0, 1.0)), (1.0, 3.0));
    }
    #[test]
    fn snapshot_is_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.png");
        let history = history_of(&[(0.0, 0.01, 0.02), (0.5, 0.03, 0.01)]);
        let mut state = PlotState::default();
        state.refresh(&history);
        save_history_png(&path, &history, &state, &PlotStyle::for_dpi(40)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
    #[test]
    fn plain_style_renders_empty_history() {
        let history = History::with_capacity(4).unwrap();
        let style = PlotStyle {
            text: false,
            ..PlotStyle::for_dpi(40)
        };
        let png = render_history_png(&history, &PlotState::default(), &style).unwrap();
        assert!(!png.is_empty());
    }
    #[test]
    fn oversized_image_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let history = history_of(&[(0.0, 0.01, 0.02), (0.5, 0.03, 0.01)]);
        for style in [PlotStyle::for_dpi(u32::MAX), PlotStyle::for_dpi(100_000)] {
            assert!(matches!(
                save_history_png(&path, &history, &PlotState::default(), &style),
                Err(MonitorError::Plot(_))
            ));
        }
        assert!(!path.exists());
        assert_eq!(PlotStyle::for_dpi(u32::MAX).width, u32::MAX);
    }
}
