use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

pub fn to_body<T: Serialize>(document: &T, kind: &str) -> Result<String> {
    serde_json::to_string(document).with_context(|| format!("failed to encode {kind} document"))
}

pub fn from_body<T: DeserializeOwned>(body: &str, kind: &str, id: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("corrupt {kind} document {id}"))
}

/// Caller-supplied id, or a fresh one.
pub fn document_id(id: Option<&str>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).context("limit exceeds SQLite INTEGER range")
}
