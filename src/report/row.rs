use serde::Serialize;
use std::collections::BTreeMap;

/// One sample of the working-set time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WsPoint {
    pub t: i64,
    /// Instruction working-set size, in pages.
    pub wssi: i64,
    /// Data working-set size, in pages.
    pub wssd: i64,
    /// Event id from the optional `info` column.
    pub info: Option<i64>,
}

/// A preamble value. Numeric keys keep `None` when the number is unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(Option<i64>),
    Text(String),
}

/// Preamble key/value pairs, e.g. `Tau`, `Command`, `Time Unit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn insert(&mut self, key: String, value: MetaValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Integer value of a numeric key; `None` if absent, unparsed or textual.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            MetaValue::Int(v) => *v,
            MetaValue::Text(_) => None,
        }
    }

    /// Non-empty text value of a key.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            MetaValue::Text(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One entry of the `Sample info` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleInfo {
    pub refs: i64,
    pub loc: String,
}

/// Sample info keyed by event id.
pub type SampleTable = BTreeMap<i64, SampleInfo>;

/// Everything extracted from one report file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub points: Vec<WsPoint>,
    pub meta: Metadata,
    pub samples: SampleTable,
}
