use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a report from being charted.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("no working-set data found in {}", .0.display())]
    NoDataParsed(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unsupported output format {} (use .png, .bmp, .jpg, .svg or .html)", .0.display())]
    UnsupportedOutput(PathBuf),
}
