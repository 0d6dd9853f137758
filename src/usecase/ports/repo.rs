use crate::domain::entities::record::{
    NormalizedRecord, RecordId, StoredRecord, UploadId, UploadMeta,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Message(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for RepoError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpload {
    pub owner_id: String,
    pub source_path: String,
    pub token: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted {
        upload_id: UploadId,
        record_ids: Vec<RecordId>,
    },
    Duplicate {
        existing: UploadId,
    },
}

pub trait RecordRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn insert_upload(
        &self,
        upload: NewUpload,
        records: Vec<NormalizedRecord>,
        duplicates: DuplicatePolicy,
    ) -> Result<InsertOutcome, RepoError>;

    fn list_records(&self, owner_id: &str) -> Result<Vec<StoredRecord>, RepoError>;
    fn get_record(&self, owner_id: &str, id: RecordId) -> Result<Option<StoredRecord>, RepoError>;
    fn replace_record(
        &self,
        owner_id: &str,
        id: RecordId,
        record: NormalizedRecord,
    ) -> Result<bool, RepoError>;
    fn delete_record(&self, owner_id: &str, id: RecordId) -> Result<bool, RepoError>;
    fn list_uploads(&self, owner_id: &str) -> Result<Vec<UploadMeta>, RepoError>;
}
