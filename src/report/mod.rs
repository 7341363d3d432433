//! Parsing of valgrind-ws working-set reports.

pub mod parse;
pub mod row;
pub mod schema;

pub use parse::parse_report_file;
pub use row::{Metadata, Report, SampleTable, WsPoint};
