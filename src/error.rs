use thiserror::Error;

use crate::usecase::ports::repo::RepoError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read spreadsheet: {0}")]
    Parse(String),

    #[error("spreadsheet has no rows: {0}")]
    EmptyWorkbook(String),

    #[error("spreadsheet header row is empty: {0}")]
    MissingHeader(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("owner identifier is required")]
    MissingOwner,

    #[error("file was already uploaded as upload #{upload_id}")]
    DuplicateUpload { upload_id: i64 },

    #[error("record #{0} not found")]
    RecordNotFound(i64),

    #[error("{0}")]
    Store(String),

    #[error("failed to render labels: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RepoError> for IngestError {
    fn from(err: RepoError) -> Self {
        IngestError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
