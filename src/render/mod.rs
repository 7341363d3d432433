//! HTML report wrapping the rendered chart.

pub mod html;

pub use html::{ReportView, render_html_report};
