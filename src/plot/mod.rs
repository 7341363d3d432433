//! Working-set chart: series extraction, averages, labels and output.

pub mod chart;
pub mod scale;

use crate::error::ReportError;
use crate::render::{self, ReportView};
use crate::report::{Metadata, Report, WsPoint};
use anyhow::{Context, bail};
use plotters::prelude::{BitMapBackend, IntoDrawingArea, SVGBackend};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub use scale::YScale;

pub const Y_LABEL: &str = "working set size [pages]";

/// Pixels per inch when converting the figure size.
const DPI: f64 = 100.0;

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FigSize {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 5.0,
        }
    }
}

impl FigSize {
    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width * DPI).round() as u32,
            (self.height * DPI).round() as u32,
        )
    }
}

impl FromStr for FigSize {
    type Err = String;

    /// Parse "<w>,<h>" in inches, e.g. "12,4.5".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(',')
            .ok_or_else(|| format!("expected <width>,<height>, got {:?}", s))?;
        let dim = |v: &str| -> Result<f64, String> {
            match v.trim().parse::<f64>() {
                Ok(x) if x.is_finite() && x > 0.0 => Ok(x),
                _ => Err(format!("bad figure dimension {:?}", v)),
            }
        };
        Ok(Self {
            width: dim(w)?,
            height: dim(h)?,
        })
    }
}

impl fmt::Display for FigSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.width, self.height)
    }
}

/// Where the chart goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Bitmap(PathBuf),
    Svg(PathBuf),
    Html(PathBuf),
    /// Open an HTML report in the default browser.
    Show,
}

impl Output {
    /// Pick the output kind from the file extension.
    pub fn from_path(path: Option<&Path>) -> Result<Self, ReportError> {
        let Some(path) = path else {
            return Ok(Output::Show);
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" | "bmp" | "jpg" | "jpeg" => Ok(Output::Bitmap(path.to_path_buf())),
            "svg" => Ok(Output::Svg(path.to_path_buf())),
            "html" | "htm" => Ok(Output::Html(path.to_path_buf())),
            _ => Err(ReportError::UnsupportedOutput(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub yscale: YScale,
    pub figsize: FigSize,
    pub title: Option<String>,
    pub output: Output,
}

/// Aligned columns of the time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub t: Vec<i64>,
    pub wssi: Vec<i64>,
    pub wssd: Vec<i64>,
    /// Event id by time, for points that carry one.
    pub events: BTreeMap<i64, i64>,
}

impl Series {
    pub fn from_points(points: &[WsPoint]) -> Self {
        let mut s = Series::default();
        for p in points {
            s.t.push(p.t);
            s.wssi.push(p.wssi);
            s.wssd.push(p.wssd);
            if let Some(id) = p.info {
                s.events.insert(p.t, id);
            }
        }
        s
    }

    /// First, middle and last time: the x positions of the average lines.
    pub fn avg_times(&self) -> Option<[f64; 3]> {
        let first = *self.t.first()? as f64;
        let last = *self.t.last()? as f64;
        Some([first, first + (last - first) / 2.0, last])
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Nonzero `Tau` from the preamble.
pub fn tau(meta: &Metadata) -> Option<i64> {
    meta.int("Tau").filter(|&t| t != 0)
}

/// "Working set size of '<cmd>' with τ=<tau>", omitting absent parts.
pub fn default_title(meta: &Metadata) -> String {
    let mut title = String::from("Working set size");
    if let Some(cmd) = meta.text("Command") {
        title.push_str(&format!(" of '{}'", cmd));
    }
    if let Some(tau) = tau(meta) {
        title.push_str(&format!(" with τ={}", group_thousands(tau)));
    }
    title
}

pub fn x_label(meta: &Metadata) -> String {
    match meta.text("Time Unit") {
        Some(unit) => format!("time [{}]", unit),
        None => "time".to_string(),
    }
}

/// Time tick label: integral times print without a fraction.
pub fn time_label(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{:.1}", x)
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct Chart {
    pub series: Series,
    pub title: String,
    pub x_label: String,
    pub scale: YScale,
    pub tau: Option<i64>,
    pub avg_insn: Option<f64>,
    pub avg_data: Option<f64>,
}

impl Chart {
    pub fn new(report: &Report, opts: &PlotOptions) -> Self {
        let series = Series::from_points(&report.points);
        let avg_insn = mean(&series.wssi);
        let avg_data = mean(&series.wssd);
        Self {
            title: opts
                .title
                .clone()
                .unwrap_or_else(|| default_title(&report.meta)),
            x_label: x_label(&report.meta),
            scale: opts.yscale,
            tau: tau(&report.meta),
            avg_insn,
            avg_data,
            series,
        }
    }

    /// Time axis extent, covering the tau marker which starts at 0.
    pub fn x_range(&self) -> (f64, f64) {
        let mut lo = self.series.t.iter().copied().min().unwrap_or(0) as f64;
        let mut hi = self.series.t.iter().copied().max().unwrap_or(0) as f64;
        if let Some(tau) = self.tau {
            lo = lo.min(0.0).min(tau as f64);
            hi = hi.max(0.0).max(tau as f64);
        }
        if lo == hi {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    }

    /// Value axis extent in scaled coordinates, with a small margin.
    pub fn y_range(&self) -> (f64, f64) {
        let mut values: Vec<f64> = self
            .series
            .wssi
            .iter()
            .chain(&self.series.wssd)
            .map(|&v| v as f64)
            .chain(self.avg_insn)
            .chain(self.avg_data)
            .collect();
        if self.tau.is_some() || !self.series.events.is_empty() {
            values.push(0.0);
        }

        let scaled = values.into_iter().map(|v| self.scale.forward(v));
        let (lo, hi) = scaled.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
        (lo - pad, hi + pad)
    }
}

/// Draw the report and write it to the configured output.
pub fn plot_report(report: &Report, opts: &PlotOptions) -> anyhow::Result<()> {
    if report.points.is_empty() {
        bail!("nothing to plot");
    }
    let chart = Chart::new(report, opts);
    let size = opts.figsize.pixels();

    match &opts.output {
        Output::Bitmap(path) => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            chart::draw(root, &chart)
                .with_context(|| format!("render chart to {}", path.display()))?;
            info!("saved chart to {}", path.display());
        }
        Output::Svg(path) => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            chart::draw(root, &chart)
                .with_context(|| format!("render chart to {}", path.display()))?;
            info!("saved chart to {}", path.display());
        }
        Output::Html(path) => {
            write_html(report, &chart, size, path)?;
            info!("saved report to {}", path.display());
        }
        Output::Show => {
            let path = std::env::temp_dir().join(format!("wsplot-{}.html", std::process::id()));
            write_html(report, &chart, size, &path)?;
            info!("opening {}", path.display());
            webbrowser::open(&path.to_string_lossy())
                .with_context(|| format!("open {} in a browser", path.display()))?;
        }
    }
    Ok(())
}

fn write_html(report: &Report, chart: &Chart, size: (u32, u32), path: &Path) -> anyhow::Result<()> {
    let svg = chart::render_svg(chart, size).context("render chart")?;

    let view = ReportView {
        title: &chart.title,
        points: report.points.len(),
        t_first: chart.series.t.first().copied(),
        t_last: chart.series.t.last().copied(),
        avg_insn: chart.avg_insn,
        avg_data: chart.avg_data,
        meta: &report.meta,
        samples: &report.samples,
    };
    let html = render::render_html_report(&svg, &view)?;
    fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::row::MetaValue;
    use pretty_assertions::assert_eq;

    fn meta(pairs: &[(&str, MetaValue)]) -> Metadata {
        let mut m = Metadata::default();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    fn point(t: i64, wssi: i64, wssd: i64, info: Option<i64>) -> WsPoint {
        WsPoint { t, wssi, wssd, info }
    }

    #[test]
    fn mean_of_series() {
        assert_eq!(mean(&[10, 20, 30]), Some(20.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn series_columns_and_events() {
        let s = Series::from_points(&[
            point(0, 10, 20, Some(1)),
            point(4, 12, 22, None),
            point(8, 15, 25, Some(2)),
        ]);
        assert_eq!(s.t, vec![0, 4, 8]);
        assert_eq!(s.wssi, vec![10, 12, 15]);
        assert_eq!(s.wssd, vec![20, 22, 25]);
        assert_eq!(s.events, BTreeMap::from([(0, 1), (8, 2)]));
        assert_eq!(s.avg_times(), Some([0.0, 4.0, 8.0]));
    }

    #[test]
    fn titles() {
        assert_eq!(default_title(&Metadata::default()), "Working set size");
        let m = meta(&[
            ("Command", MetaValue::Text("./a.out -x".into())),
            ("Tau", MetaValue::Int(Some(1_234_567))),
        ]);
        assert_eq!(default_title(&m), "Working set size of './a.out -x' with τ=1,234,567");
        let m = meta(&[("Tau", MetaValue::Int(Some(0)))]);
        assert_eq!(default_title(&m), "Working set size");
    }

    #[test]
    fn axis_labels() {
        assert_eq!(x_label(&Metadata::default()), "time");
        let m = meta(&[("Time Unit", MetaValue::Text("instructions".into()))]);
        assert_eq!(x_label(&m), "time [instructions]");
    }

    #[test]
    fn time_labels() {
        assert_eq!(time_label(10.0), "10");
        assert_eq!(time_label(-5.0), "-5");
        assert_eq!(time_label(2.5), "2.5");
    }

    #[test]
    fn thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn figsize_parsing() {
        let expected = FigSize {
            width: 12.0,
            height: 4.5,
        };
        assert_eq!("12,4.5".parse::<FigSize>(), Ok(expected));
        assert!("12".parse::<FigSize>().is_err());
        assert!("0,5".parse::<FigSize>().is_err());
        assert_eq!(FigSize::default().pixels(), (1000, 500));
    }

    #[test]
    fn output_kind_from_extension() {
        assert_eq!(Output::from_path(None).unwrap(), Output::Show);
        assert_eq!(
            Output::from_path(Some(Path::new("ws.PNG"))).unwrap(),
            Output::Bitmap(PathBuf::from("ws.PNG"))
        );
        assert_eq!(
            Output::from_path(Some(Path::new("ws.svg"))).unwrap(),
            Output::Svg(PathBuf::from("ws.svg"))
        );
        assert!(matches!(
            Output::from_path(Some(Path::new("ws.pdf"))),
            Err(ReportError::UnsupportedOutput(_))
        ));
    }

    #[test]
    fn ranges_cover_tau_and_zero() {
        let report = Report {
            points: vec![point(100, 10, 20, None), point(200, 30, 40, None)],
            meta: meta(&[("Tau", MetaValue::Int(Some(50)))]),
            ..Report::default()
        };
        let opts = PlotOptions {
            yscale: YScale::Linear,
            figsize: FigSize::default(),
            title: Some("custom".into()),
            output: Output::Show,
        };
        let chart = Chart::new(&report, &opts);
        assert_eq!(chart.title, "custom");
        assert_eq!(chart.x_range(), (0.0, 200.0));
        let (lo, hi) = chart.y_range();
        assert!(lo < 0.0 && hi > 40.0);
    }
}
