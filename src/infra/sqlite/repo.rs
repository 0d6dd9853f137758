use std::path::PathBuf;

use crate::domain::entities::record::{NormalizedRecord, RecordId, StoredRecord, UploadMeta};
use crate::infra::sqlite::queries::{
    delete_record, insert_upload, list_records, list_uploads, load_record, replace_record_fields,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    DuplicatePolicy, InsertOutcome, NewUpload, RecordRepository, RepoError,
};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

fn repo_err(err: anyhow::Error) -> RepoError {
    RepoError::Message(format!("{err:#}"))
}

impl RecordRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(repo_err)
    }

    fn insert_upload(
        &self,
        upload: NewUpload,
        records: Vec<NormalizedRecord>,
        duplicates: DuplicatePolicy,
    ) -> Result<InsertOutcome, RepoError> {
        insert_upload(&self.db_path, &upload, &records, duplicates).map_err(repo_err)
    }

    fn list_records(&self, owner_id: &str) -> Result<Vec<StoredRecord>, RepoError> {
        list_records(&self.db_path, owner_id).map_err(repo_err)
    }

    fn get_record(&self, owner_id: &str, id: RecordId) -> Result<Option<StoredRecord>, RepoError> {
        load_record(&self.db_path, owner_id, id).map_err(repo_err)
    }

    fn replace_record(
        &self,
        owner_id: &str,
        id: RecordId,
        record: NormalizedRecord,
    ) -> Result<bool, RepoError> {
        replace_record_fields(&self.db_path, owner_id, id, &record).map_err(repo_err)
    }

    fn delete_record(&self, owner_id: &str, id: RecordId) -> Result<bool, RepoError> {
        delete_record(&self.db_path, owner_id, id).map_err(repo_err)
    }

    fn list_uploads(&self, owner_id: &str) -> Result<Vec<UploadMeta>, RepoError> {
        list_uploads(&self.db_path, owner_id).map_err(repo_err)
    }
}
