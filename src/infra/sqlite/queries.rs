use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, types::Value, Connection, OptionalExtension, TransactionBehavior};

use crate::domain::entities::record::{
    CanonicalField, FieldValue, NormalizedRecord, RecordId, StoredRecord, UploadId, UploadMeta,
};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::repo::{DuplicatePolicy, InsertOutcome, NewUpload};

const KIND_TEXT: &str = "text";
const KIND_NUMBER: &str = "number";

fn encode_value(value: &FieldValue) -> (&'static str, String) {
    match value {
        FieldValue::Text(text) => (KIND_TEXT, text.clone()),
        // `f64::to_string` round-trips through `parse`, NaN included.
        FieldValue::Number(number) => (KIND_NUMBER, number.to_string()),
    }
}

fn decode_value(kind: &str, raw: String) -> Result<FieldValue> {
    match kind {
        KIND_NUMBER => {
            let number = raw
                .parse::<f64>()
                .with_context(|| format!("invalid stored number: {raw}"))?;
            Ok(FieldValue::Number(number))
        }
        _ => Ok(FieldValue::Text(raw)),
    }
}

fn insert_fields(
    tx: &rusqlite::Transaction<'_>,
    record_id: i64,
    record: &NormalizedRecord,
) -> Result<()> {
    let mut insert_field = tx
        .prepare("INSERT INTO record_field(record_id, field, kind, value) VALUES (?1, ?2, ?3, ?4)")
        .context("failed to prepare field insert")?;

    for (field, value) in record.fields() {
        let (kind, raw) = encode_value(value);
        insert_field
            .execute(params![record_id, field.stored_name(), kind, raw])
            .context("failed to insert record field")?;
    }

    Ok(())
}

pub fn find_upload_by_token(conn: &Connection, token: &str) -> Result<Option<UploadId>> {
    let existing = conn
        .query_row(
            "SELECT id FROM upload WHERE token = ?1 ORDER BY id ASC LIMIT 1",
            [token],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .context("failed to look up upload token")?;
    Ok(existing.map(UploadId))
}

pub fn insert_upload(
    db_path: &Path,
    upload: &NewUpload,
    records: &[NormalizedRecord],
    duplicates: DuplicatePolicy,
) -> Result<InsertOutcome> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    // Immediate: the token check and the insert must not interleave with a
    // concurrent upload of the same file.
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("failed to start upload transaction")?;

    if duplicates == DuplicatePolicy::Reject {
        if let Some(existing) = find_upload_by_token(&tx, &upload.token)? {
            return Ok(InsertOutcome::Duplicate { existing });
        }
    }

    tx.execute(
        "INSERT INTO upload(owner_id, source_path, token, row_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            upload.owner_id,
            upload.source_path,
            upload.token,
            records.len() as i64,
            upload.created_at
        ],
    )
    .context("failed to insert upload")?;
    let upload_id = tx.last_insert_rowid();

    let mut insert_record = tx
        .prepare("INSERT INTO record(upload_id, owner_id, created_at) VALUES (?1, ?2, ?3)")
        .context("failed to prepare record insert")?;

    let mut record_ids = Vec::with_capacity(records.len());
    for record in records {
        let record_id = insert_record
            .insert(params![upload_id, upload.owner_id, upload.created_at])
            .context("failed to insert record")?;
        insert_fields(&tx, record_id, record)?;
        record_ids.push(RecordId(record_id));
    }
    drop(insert_record);

    tx.commit().context("failed to commit upload transaction")?;

    Ok(InsertOutcome::Inserted {
        upload_id: UploadId(upload_id),
        record_ids,
    })
}

fn load_records(
    conn: &Connection,
    filter_sql: &str,
    filter_params: Vec<Value>,
) -> Result<Vec<StoredRecord>> {
    let mut record_stmt = conn
        .prepare(&format!(
            "SELECT id, upload_id, owner_id, created_at
             FROM record
             WHERE {filter_sql}
             ORDER BY id ASC"
        ))
        .context("failed to prepare records query")?;
    let mut records = record_stmt
        .query_map(rusqlite::params_from_iter(filter_params.iter().cloned()), |row| {
            Ok(StoredRecord {
                id: RecordId(row.get(0)?),
                upload_id: row.get::<_, Option<i64>>(1)?.map(UploadId),
                owner_id: row.get(2)?,
                created_at: row.get(3)?,
                record: NormalizedRecord::new(),
            })
        })
        .context("failed to query records")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect records")?;
    drop(record_stmt);

    if records.is_empty() {
        return Ok(records);
    }

    let record_pos: HashMap<i64, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.id.0, idx))
        .collect();

    let mut hydrate_stmt = conn
        .prepare(&format!(
            "SELECT record_field.record_id, record_field.field, record_field.kind, record_field.value
             FROM record_field
             JOIN record ON record.id = record_field.record_id
             WHERE {filter_sql}
             ORDER BY record_field.record_id ASC"
        ))
        .context("failed to prepare field hydration query")?;
    let mut hydrate_rows = hydrate_stmt
        .query(rusqlite::params_from_iter(filter_params))
        .context("failed to run field hydration query")?;

    while let Some(row) = hydrate_rows.next().context("failed to read field row")? {
        let record_id: i64 = row.get(0).context("failed to read record_id")?;
        let name: String = row.get(1).context("failed to read field")?;
        let kind: String = row.get(2).context("failed to read kind")?;
        let raw: String = row.get(3).context("failed to read value")?;

        let Some(field) = CanonicalField::from_stored_name(&name) else {
            tracing::warn!(record_id, field = %name, "skipping unknown stored field");
            continue;
        };
        let value = decode_value(&kind, raw)?;

        if let Some(record) = record_pos
            .get(&record_id)
            .and_then(|&idx| records.get_mut(idx))
        {
            record.record.insert(field, value);
        }
    }

    Ok(records)
}

pub fn list_records(db_path: &Path, owner_id: &str) -> Result<Vec<StoredRecord>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    load_records(
        &conn,
        "record.owner_id = ?",
        vec![Value::Text(owner_id.to_string())],
    )
}

pub fn load_record(db_path: &Path, owner_id: &str, id: RecordId) -> Result<Option<StoredRecord>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let records = load_records(
        &conn,
        "record.owner_id = ? AND record.id = ?",
        vec![Value::Text(owner_id.to_string()), Value::Integer(id.0)],
    )?;
    Ok(records.into_iter().next())
}

fn owns_record(conn: &Connection, owner_id: &str, id: RecordId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM record WHERE id = ?1 AND owner_id = ?2",
            params![id.0, owner_id],
            |_| Ok(()),
        )
        .optional()
        .with_context(|| format!("failed to look up record #{}", id.0))?;
    Ok(found.is_some())
}

pub fn replace_record_fields(
    db_path: &Path,
    owner_id: &str,
    id: RecordId,
    record: &NormalizedRecord,
) -> Result<bool> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start replace transaction")?;

    if !owns_record(&tx, owner_id, id)? {
        return Ok(false);
    }

    tx.execute("DELETE FROM record_field WHERE record_id = ?1", params![id.0])
        .with_context(|| format!("failed to clear fields for record #{}", id.0))?;
    insert_fields(&tx, id.0, record)?;

    tx.commit().context("failed to commit record replace")?;
    Ok(true)
}

pub fn delete_record(db_path: &Path, owner_id: &str, id: RecordId) -> Result<bool> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start delete transaction")?;

    if !owns_record(&tx, owner_id, id)? {
        return Ok(false);
    }

    tx.execute("DELETE FROM record_field WHERE record_id = ?1", params![id.0])
        .with_context(|| format!("failed to delete fields for record #{}", id.0))?;
    tx.execute("DELETE FROM record WHERE id = ?1", params![id.0])
        .with_context(|| format!("failed to delete record #{}", id.0))?;
    tx.commit().context("failed to commit delete transaction")?;
    Ok(true)
}

pub fn list_uploads(db_path: &Path, owner_id: &str) -> Result<Vec<UploadMeta>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, owner_id, source_path, token, row_count, created_at
             FROM upload
             WHERE owner_id = ?1
             ORDER BY id DESC",
        )
        .context("failed to prepare uploads query")?;

    let uploads = stmt
        .query_map([owner_id], |row| {
            Ok(UploadMeta {
                id: row.get::<_, i64>(0)?.into(),
                owner_id: row.get(1)?,
                source_path: row.get(2)?,
                token: row.get(3)?,
                row_count: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .context("failed to query uploads")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect uploads")?;

    Ok(uploads)
}
