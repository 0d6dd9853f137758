use std::sync::Arc;

use crate::domain::entities::edit::StagedEdits;
use crate::domain::entities::record::{NormalizedRecord, RecordId, StoredRecord, UploadMeta};
use crate::domain::entities::session::Session;
use crate::error::{IngestError, Result};
use crate::usecase::ports::repo::RecordRepository;

pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
}

impl RecordService {
    pub fn new(repo: Arc<dyn RecordRepository>) -> Self {
        Self { repo }
    }

    pub fn list(&self, session: &Session) -> Result<Vec<StoredRecord>> {
        Ok(self.repo.list_records(session.owner_id())?)
    }

    pub fn get(&self, session: &Session, id: RecordId) -> Result<StoredRecord> {
        self.repo
            .get_record(session.owner_id(), id)?
            .ok_or(IngestError::RecordNotFound(id.0))
    }

    pub fn replace(&self, session: &Session, id: RecordId, record: NormalizedRecord) -> Result<()> {
        if !self.repo.replace_record(session.owner_id(), id, record)? {
            return Err(IngestError::RecordNotFound(id.0));
        }
        tracing::info!(record_id = id.0, "record replaced");
        Ok(())
    }

    pub fn apply_edits(
        &self,
        session: &Session,
        id: RecordId,
        edits: &StagedEdits,
    ) -> Result<StoredRecord> {
        let mut stored = self.get(session, id)?;
        let next = edits.apply_to(&stored.record);
        self.replace(session, id, next.clone())?;
        stored.record = next;
        Ok(stored)
    }

    pub fn delete(&self, session: &Session, id: RecordId) -> Result<()> {
        if !self.repo.delete_record(session.owner_id(), id)? {
            return Err(IngestError::RecordNotFound(id.0));
        }
        tracing::info!(record_id = id.0, "record deleted");
        Ok(())
    }

    pub fn list_uploads(&self, session: &Session) -> Result<Vec<UploadMeta>> {
        Ok(self.repo.list_uploads(session.owner_id())?)
    }
}
