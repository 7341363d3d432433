use crate::error::ReportError;
use crate::report::row::{MetaValue, Report, SampleInfo, WsPoint};
use crate::report::schema::WsetSchema;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Preamble keys whose values are human-readable integers ("1,234 ms").
const NUMERIC_KEYS: [&str; 5] = ["Tau", "Every", "Instructions", "Page size", "Peak window"];

const SECTION_END: &str = "--";

/// Where the parser is within the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Preamble,
    /// Between sections, looking for the next section title.
    Search,
    /// Just saw `Working sets:`; the next line is the column header.
    WsetHeader,
    Wset(WsetSchema),
    SampleInfo,
}

/// Something a single line contributed to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Meta(String, MetaValue),
    Point(WsPoint),
    Sample(i64, SampleInfo),
}

/// Line classifier for valgrind-ws style reports.
pub struct LineParser {
    with_info: bool,
    meta_re: Regex,
    word_re: Regex,
    sample_re: Regex,
}

impl LineParser {
    /// `with_info` enables the `info` column and the `Sample info` section.
    pub fn new(with_info: bool) -> Result<Self, ReportError> {
        Ok(Self {
            with_info,
            // Key may contain spaces ("Page size"); value is the rest of the line.
            meta_re: Regex::new(r"^([^:]+):\s*(.*)$")?,
            word_re: Regex::new(r"\w+")?,
            // [   3] refs=42, loc=foo.c:10
            sample_re: Regex::new(r"^\[\s*(\d+)\]\s*refs=(\d+),\s*loc=(.*)$")?,
        })
    }

    /// Advance the state machine by one line.
    ///
    /// Does no I/O and no logging; lines that fit nothing in the current
    /// state leave it unchanged and produce no record.
    pub fn step(&self, state: State, line: &str) -> (State, Option<Record>) {
        if line.trim() == SECTION_END {
            return (State::Search, None);
        }

        match state {
            State::Preamble => {
                let record = self.meta_line(line);
                (State::Preamble, record)
            }
            State::Search => {
                if line.starts_with("Working sets:") {
                    (State::WsetHeader, None)
                } else if line.starts_with("Sample info") {
                    (State::SampleInfo, None)
                } else {
                    (State::Search, None)
                }
            }
            State::WsetHeader => {
                let words: Vec<&str> =
                    self.word_re.find_iter(line).map(|m| m.as_str()).collect();
                match WsetSchema::from_header(&words) {
                    Some(schema) => (State::Wset(schema), None),
                    None => (State::Search, None),
                }
            }
            State::Wset(schema) => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let record = schema.read_row(&tokens, self.with_info).map(Record::Point);
                (State::Wset(schema), record)
            }
            State::SampleInfo => {
                let record = if self.with_info {
                    self.sample_line(line)
                } else {
                    None
                };
                (State::SampleInfo, record)
            }
        }
    }

    fn meta_line(&self, line: &str) -> Option<Record> {
        let caps = self.meta_re.captures(line)?;
        let key = caps.get(1)?.as_str().trim().to_string();
        let raw = caps.get(2).map_or("", |m| m.as_str()).trim();

        let value = if NUMERIC_KEYS.contains(&key.as_str()) {
            MetaValue::Int(human_number(raw))
        } else {
            MetaValue::Text(raw.to_string())
        };
        Some(Record::Meta(key, value))
    }

    fn sample_line(&self, line: &str) -> Option<Record> {
        let caps = self.sample_re.captures(line)?;
        let id = caps.get(1)?.as_str().parse().ok()?;
        let refs = caps.get(2)?.as_str().parse().ok()?;
        let loc = caps.get(3)?.as_str().trim_end().to_string();
        Some(Record::Sample(id, SampleInfo { refs, loc }))
    }
}

/// Parse "1,234 ms" into 1234. Only the token before the first space counts.
pub fn human_number(value: &str) -> Option<i64> {
    value.split(' ').next()?.replace(',', "").parse().ok()
}

/// Parse a report file.
///
/// Expected layout:
/// ```text
/// Tau: 1,234 ms
/// Command: ./a.out
/// --
/// Working sets:
/// t   WSS_insn   WSS_data   info
/// 0   10         20         1
/// --
/// Sample info
/// [   1] refs=42, loc=foo.c:10
/// ```
pub fn parse_report_file(path: &Path, with_info: bool) -> Result<Report, ReportError> {
    if !path.is_file() {
        return Err(ReportError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    parse_report(BufReader::new(file), with_info)
}

/// Parse a report from any line source.
pub fn parse_report<R: BufRead>(reader: R, with_info: bool) -> Result<Report, ReportError> {
    let parser = LineParser::new(with_info)?;
    let mut report = Report::default();
    let mut state = State::Preamble;
    let mut lines = 0usize;

    // Split on raw bytes so a stray non-UTF-8 byte only mangles its own line.
    for (lineno, buf) in reader.split(b'\n').enumerate() {
        let buf = buf?;
        let bytes = buf.strip_suffix(b"\r").unwrap_or(&buf);
        let line = String::from_utf8_lossy(bytes);
        let lno = lineno + 1;
        lines = lno;

        let was_search = state == State::Search;
        let was_header = state == State::WsetHeader;

        let (next, record) = parser.step(state, &line);

        if was_search {
            match next {
                State::WsetHeader => info!("found working set data in line {}", lno),
                State::SampleInfo => info!("found sample info in line {}", lno),
                _ => {}
            }
        } else if next == State::Search {
            if line.trim() == SECTION_END {
                debug!("section end in line {}", lno);
            } else if was_header {
                warn!(
                    "working set header in line {} lacks t/WSS_insn/WSS_data, skipping section",
                    lno
                );
            }
        }
        if was_header {
            if let State::Wset(schema) = &next {
                debug!(?schema, "working set header");
            }
        }

        match record {
            Some(Record::Meta(key, value)) => {
                debug!("preamble: {}={:?}", key, value);
                report.meta.insert(key, value);
            }
            Some(Record::Point(p)) => {
                trace!(t = p.t, i = p.wssi, d = p.wssd, info = ?p.info, "wset point");
                report.points.push(p);
            }
            Some(Record::Sample(id, sample)) => {
                info!("sample info [{}]: refs={}, loc={}", id, sample.refs, sample.loc);
                report.samples.insert(id, sample);
            }
            None => {}
        }

        state = next;
    }

    info!("parsed {} lines, found {} data points", lines, report.points.len());
    Ok(report)
}
