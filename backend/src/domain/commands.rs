//! Command and result types passed between the io layer and the domain
//! services.

use shared::FieldMap;

use crate::domain::errors::RecordResult;
use crate::domain::models::Record;

#[derive(Debug, Clone)]
pub struct AddRecordCommand {
    pub fields: FieldMap,
}

/// Outcome of a committed insert. `listing` is the re-read that follows it;
/// a failed re-read does not undo the insert.
#[derive(Debug)]
pub struct AddRecordResult {
    pub id: i64,
    pub success_message: String,
    pub listing: RecordResult<Vec<Record>>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRecordCommand {
    pub id: i64,
}

#[derive(Debug)]
pub struct DeleteRecordResult {
    pub deleted_id: i64,
    pub success_message: String,
    pub listing: RecordResult<Vec<Record>>,
}

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub success: bool,
    pub message: String,
}
