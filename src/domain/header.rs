use std::fmt;

use crate::domain::entities::sheet::CellValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderKey(String);

impl HeaderKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_header_text(text: &str) -> HeaderKey {
    HeaderKey(
        text.to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .collect(),
    )
}

pub fn normalize_header(cell: &CellValue) -> HeaderKey {
    normalize_header_text(&cell.as_text())
}

pub fn normalize_headers(row: &[CellValue]) -> Vec<HeaderKey> {
    row.iter().map(normalize_header).collect()
}
