use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::domain::entities::record::{RecordId, UploadId};
use crate::domain::entities::session::Session;
use crate::domain::entities::sheet::{CellValue, RawSheet};
use crate::domain::projector::project_sheet;
use crate::domain::validation::{apply_quantity_policy, UploadFlow};
use crate::error::{IngestError, Result};
use crate::infra::import::csv::read_csv_sheet;
use crate::infra::import::xlsx::read_first_sheet;
use crate::usecase::ports::repo::{DuplicatePolicy, InsertOutcome, NewUpload, RecordRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub upload_id: UploadId,
    pub record_ids: Vec<RecordId>,
    pub source_rows: usize,
    pub dropped_rows: usize,
    pub blank_rows: usize,
    pub unmapped_headers: Vec<String>,
}

impl ImportSummary {
    pub fn inserted(&self) -> usize {
        self.record_ids.len()
    }
}

/// Hex SHA-256 over the owner id and the raw file bytes.
pub fn upload_token(owner_id: &str, file_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(file_bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Csv,
    Workbook,
}

fn sheet_format(path: &Path) -> Result<SheetFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(SheetFormat::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
        _ => Err(IngestError::UnsupportedFile(path.display().to_string())),
    }
}

/// Reads the file once; the returned bytes are exactly the ones parsed.
fn load_sheet(path: &Path) -> Result<(Vec<u8>, RawSheet)> {
    let format = sheet_format(path)?;
    let bytes = std::fs::read(path)?;
    let sheet = match format {
        SheetFormat::Csv => read_csv_sheet(&bytes),
        SheetFormat::Workbook => read_first_sheet(&bytes),
    }
    .map_err(|err| IngestError::Parse(format!("{}: {err:#}", path.display())))?;
    Ok((bytes, sheet))
}

pub fn read_sheet(path: &Path) -> Result<RawSheet> {
    load_sheet(path).map(|(_, sheet)| sheet)
}

pub struct ImportService {
    repo: Arc<dyn RecordRepository>,
}

impl ImportService {
    pub fn new(repo: Arc<dyn RecordRepository>) -> Self {
        Self { repo }
    }

    pub fn upload_file(
        &self,
        session: &Session,
        path: &Path,
        flow: UploadFlow,
        duplicates: DuplicatePolicy,
    ) -> Result<ImportSummary> {
        let (bytes, sheet) = load_sheet(path)?;
        let token = upload_token(session.owner_id(), &bytes);
        self.upload_sheet(
            session,
            &sheet,
            &path.display().to_string(),
            token,
            flow,
            duplicates,
        )
    }

    pub fn upload_sheet(
        &self,
        session: &Session,
        sheet: &RawSheet,
        source_path: &str,
        token: String,
        flow: UploadFlow,
        duplicates: DuplicatePolicy,
    ) -> Result<ImportSummary> {
        let Some(header) = sheet.header() else {
            return Err(IngestError::EmptyWorkbook(source_path.to_string()));
        };
        if header.iter().all(CellValue::is_blank) {
            return Err(IngestError::MissingHeader(source_path.to_string()));
        }

        let projection = project_sheet(sheet);
        let unmapped_headers: Vec<String> = projection
            .unmapped_headers
            .iter()
            .map(|key| key.to_string())
            .collect();
        if !unmapped_headers.is_empty() {
            tracing::debug!(source = source_path, columns = ?unmapped_headers, "dropping unmapped columns");
        }

        let filtered = apply_quantity_policy(projection.records, flow.quantity_policy());

        let upload = NewUpload {
            owner_id: session.owner_id().to_string(),
            source_path: source_path.to_string(),
            token,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let outcome = self
            .repo
            .insert_upload(upload, filtered.kept, duplicates)
            .map_err(|err| {
                tracing::warn!(source = source_path, error = %err, "bulk insert failed");
                IngestError::from(err)
            })?;

        match outcome {
            InsertOutcome::Duplicate { existing } => {
                tracing::warn!(
                    source = source_path,
                    upload_id = existing.0,
                    "rejected duplicate upload"
                );
                Err(IngestError::DuplicateUpload {
                    upload_id: existing.0,
                })
            }
            InsertOutcome::Inserted {
                upload_id,
                record_ids,
            } => {
                tracing::info!(
                    source = source_path,
                    upload_id = upload_id.0,
                    inserted = record_ids.len(),
                    dropped = filtered.dropped,
                    blank = projection.blank_rows,
                    "upload stored"
                );
                Ok(ImportSummary {
                    upload_id,
                    record_ids,
                    source_rows: sheet.data_rows().len(),
                    dropped_rows: filtered.dropped,
                    blank_rows: projection.blank_rows,
                    unmapped_headers,
                })
            }
        }
    }
}
