use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, info_span};

mod diagnostics;
mod error;
mod plot;
mod render;
mod report;

use error::ReportError;
use plot::{FigSize, Output, PlotOptions, YScale};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "wsplot")]
#[command(about = "Plot the output of valgrind-ws", long_about = None)]
struct Cli {
    /// Report file to parse.
    file: PathBuf,

    /// Scaling of the y axis.
    #[arg(short, long, value_enum, default_value_t = YScale::Linear)]
    yscale: YScale,

    /// Suppress sample information in the plot.
    #[arg(short, long)]
    no_info: bool,

    /// Save the plot (.png, .bmp, .jpg, .svg or .html) instead of opening it in a browser.
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Plot dimensions in inches, e.g. -s 12,4
    #[arg(short = 's', long, default_value_t = FigSize::default())]
    figsize: FigSize,

    /// Title of the plot.
    #[arg(short, long)]
    title: Option<String>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<()> {
    // Reject the output format before doing any work.
    let output = Output::from_path(cli.outfile.as_deref())?;

    // 1) Parse.
    let report = {
        let _span = info_span!("parse", file = %cli.file.display()).entered();
        report::parse_report_file(&cli.file, !cli.no_info)?
    };
    if report.points.is_empty() {
        return Err(ReportError::NoDataParsed(cli.file).into());
    }
    info!("successfully parsed {}", cli.file.display());

    // 2) Plot.
    let opts = PlotOptions {
        yscale: cli.yscale,
        figsize: cli.figsize,
        title: cli.title,
        output,
    };
    let _span = info_span!("plot", scale = ?opts.yscale).entered();
    plot::plot_report(&report, &opts)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    diagnostics::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
