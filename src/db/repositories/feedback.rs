use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::{
    db::{
        helpers::{document_id, from_body, to_body},
        Database,
    },
    models::{Feedback, FeedbackRecord},
};

impl Database {
    /// Writes a feedback document, replacing any existing one with the same id.
    pub async fn put_feedback(&self, id: Option<&str>, record: &FeedbackRecord) -> Result<String> {
        let id = document_id(id);
        let record = record.clone();
        self.execute(move |conn| {
            let body = to_body(&record, "feedback")?;
            conn.execute(
                "INSERT INTO feedback (id, interview_id, user_id, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    interview_id = excluded.interview_id,
                    user_id = excluded.user_id,
                    created_at = excluded.created_at,
                    body = excluded.body",
                params![id, record.interview_id, record.user_id, record.created_at, body],
            )
            .context("failed to store feedback")?;
            Ok(id)
        })
        .await
    }

    pub async fn get_feedback_by_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>> {
        let interview_id = interview_id.to_string();
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, body FROM feedback
                     WHERE interview_id = ?1 AND user_id = ?2
                     LIMIT 1",
                    params![interview_id, user_id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()
                .context("failed to load feedback")?;

            match row {
                Some((id, body)) => {
                    let record: FeedbackRecord = from_body(&body, "feedback", &id)?;
                    Ok(Some(Feedback { id, record }))
                }
                None => Ok(None),
            }
        })
        .await
    }
}
