//! Column layout of a `Working sets:` table.
//!
//! Example header: `t        WSS_insn   WSS_data   info`

use crate::report::row::WsPoint;

/// Column positions resolved once from the section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsetSchema {
    pub width: usize,
    pub t: usize,
    pub insn: usize,
    pub data: usize,
    pub info: Option<usize>,
}

impl WsetSchema {
    /// Resolve column positions from a header line.
    ///
    /// Returns `None` if any of `t`, `WSS_insn` or `WSS_data` is missing.
    pub fn from_header(words: &[&str]) -> Option<Self> {
        let find = |name: &str| words.iter().position(|w| *w == name);
        Some(Self {
            width: words.len(),
            t: find("t")?,
            insn: find("WSS_insn")?,
            data: find("WSS_data")?,
            info: find("info"),
        })
    }

    /// Read a data row. Rows with a different token count, or with an
    /// unreadable `t`/`WSS_insn`/`WSS_data`, yield `None`.
    pub fn read_row(&self, tokens: &[&str], with_info: bool) -> Option<WsPoint> {
        if tokens.len() != self.width {
            return None;
        }
        let info = match self.info {
            Some(i) if with_info => tokens[i].parse().ok(),
            _ => None,
        };
        Some(WsPoint {
            t: tokens[self.t].parse().ok()?,
            wssi: tokens[self.insn].parse().ok()?,
            wssd: tokens[self.data].parse().ok()?,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_columns_in_any_order() {
        let schema = WsetSchema::from_header(&["WSS_data", "t", "WSS_insn"]).unwrap();
        assert_eq!(
            schema,
            WsetSchema {
                width: 3,
                t: 1,
                insn: 2,
                data: 0,
                info: None,
            }
        );
    }

    #[test]
    fn missing_required_column() {
        assert_eq!(WsetSchema::from_header(&["t", "WSS_insn", "info"]), None);
    }

    #[test]
    fn info_only_read_when_requested() {
        let schema = WsetSchema::from_header(&["t", "WSS_insn", "WSS_data", "info"]).unwrap();
        let row = ["5", "1", "2", "7"];
        assert_eq!(schema.read_row(&row, true).unwrap().info, Some(7));
        assert_eq!(schema.read_row(&row, false).unwrap().info, None);
    }

    #[test]
    fn unreadable_required_value_drops_row() {
        let schema = WsetSchema::from_header(&["t", "WSS_insn", "WSS_data"]).unwrap();
        assert_eq!(schema.read_row(&["x", "1", "2"], true), None);
        assert_eq!(schema.read_row(&["1", "2"], true), None);
    }
}
