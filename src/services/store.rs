use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FeedbackRecord, Interview};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when no interview has this id.
    async fn get_interview(&self, id: &str) -> Result<Option<Interview>>;

    /// Writes the record under `id`, or under a fresh id when `None`. Returns the id used.
    async fn put_feedback(&self, id: Option<&str>, record: &FeedbackRecord) -> Result<String>;
}
