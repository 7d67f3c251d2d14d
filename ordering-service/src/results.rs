//! Write outcomes mirrored to the frontend contract.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct InsertResult {
    #[serde(rename = "insertedId")]
    pub inserted_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertResult {
    pub fn inserted(id: Uuid) -> Self {
        Self { inserted_id: Some(id), message: None }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self { inserted_id: None, message: Some(message.into()) }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateResult {
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}
