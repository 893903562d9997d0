use serene_core::model::{
    CompletedSession, CompletedSessionRow, CustomPattern, PatternDraft, SessionId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<CompletedSession, StorageError> {
    let duration_secs = u64_from_i64(
        "duration_secs",
        row.try_get::<i64, _>("duration_secs").map_err(ser)?,
    )?;
    let cycles_completed = u32_from_i64(
        "cycles_completed",
        row.try_get::<i64, _>("cycles_completed").map_err(ser)?,
    )?;

    Ok(CompletedSession::from_persisted(
        row.try_get("technique_name").map_err(ser)?,
        duration_secs,
        cycles_completed,
        row.try_get("completed_at").map_err(ser)?,
    ))
}

pub(crate) fn map_session_row_with_id(row: &SqliteRow) -> Result<CompletedSessionRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(CompletedSessionRow::new(
        SessionId::new(id),
        map_session_row(row)?,
    ))
}

pub(crate) fn map_custom_pattern_row(row: &SqliteRow) -> Result<CustomPattern, StorageError> {
    let total_cycles = u32_from_i64(
        "total_cycles",
        row.try_get::<i64, _>("total_cycles").map_err(ser)?,
    )?;
    let pattern = PatternDraft::new(
        row.try_get("inhale_secs").map_err(ser)?,
        row.try_get("hold_after_inhale_secs").map_err(ser)?,
        row.try_get("exhale_secs").map_err(ser)?,
        row.try_get("hold_after_exhale_secs").map_err(ser)?,
        total_cycles,
    )
    .validate()
    .map_err(ser)?;

    CustomPattern::new(
        row.try_get::<String, _>("name").map_err(ser)?,
        pattern,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
