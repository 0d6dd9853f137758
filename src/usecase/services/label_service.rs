use std::path::{Path, PathBuf};

use crate::config::LABEL_FILE_NAME;
use crate::domain::entities::record::StoredRecord;
use crate::domain::entities::sheet::RawSheet;
use crate::domain::label::{layout_labels, LabelRecord, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::domain::projector::project_sheet;
use crate::error::{IngestError, Result};
use crate::infra::render::cards::render_cards;
use crate::infra::render::pdf::write_pdf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument {
    pub path: PathBuf,
    pub pages: usize,
}

pub fn labels_from_records(records: &[StoredRecord]) -> Vec<LabelRecord> {
    records
        .iter()
        .map(|stored| LabelRecord::from_row(&stored.record.to_stored_row()))
        .collect()
}

pub fn labels_from_sheet(sheet: &RawSheet) -> Vec<LabelRecord> {
    project_sheet(sheet)
        .records
        .iter()
        .map(|record| LabelRecord::from_row(&record.to_stored_row()))
        .collect()
}

pub fn write_label_document(labels: &[LabelRecord], output_dir: &Path) -> Result<LabelDocument> {
    let pages = layout_labels(labels);
    let path = output_dir.join(LABEL_FILE_NAME);
    write_pdf(&path, &pages, PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
        .map_err(|err| IngestError::Render(format!("{err:#}")))?;
    tracing::info!(path = %path.display(), pages = pages.len(), "label document written");
    Ok(LabelDocument {
        path,
        pages: pages.len(),
    })
}

pub fn preview_cards(labels: &[LabelRecord]) -> Vec<String> {
    render_cards(labels)
}
