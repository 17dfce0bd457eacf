use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        helpers::{document_id, from_body, to_body, to_i64},
        Database,
    },
    models::Interview,
};

pub const DEFAULT_LATEST_LIMIT: usize = 20;

fn row_to_interview(row: &Row) -> Result<Interview> {
    let id: String = row.get("id")?;
    let body: String = row.get("body")?;
    let mut interview: Interview = from_body(&body, "interview", &id)?;
    interview.id = id;
    Ok(interview)
}

fn collect(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<Interview>> {
    let mut interviews = Vec::new();
    while let Some(row) = rows.next()? {
        interviews.push(row_to_interview(row)?);
    }
    Ok(interviews)
}

impl Database {
    /// Inserts or replaces an interview. An empty id gets a generated one.
    pub async fn put_interview(&self, interview: &Interview) -> Result<String> {
        let mut interview = interview.clone();
        interview.id = document_id(Some(interview.id.as_str()));

        self.execute(move |conn| {
            let body = to_body(&interview, "interview")?;
            conn.execute(
                "INSERT INTO interviews (id, user_id, finalized, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    finalized = excluded.finalized,
                    created_at = excluded.created_at,
                    body = excluded.body",
                params![
                    interview.id,
                    interview.user_id,
                    interview.finalized,
                    interview.created_at,
                    body,
                ],
            )
            .context("failed to store interview")?;
            Ok(interview.id)
        })
        .await
    }

    pub async fn get_interview(&self, id: &str) -> Result<Option<Interview>> {
        let id = id.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, body FROM interviews WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()
                .context("failed to load interview")?;

            match row {
                Some((id, body)) => {
                    let mut interview: Interview = from_body(&body, "interview", &id)?;
                    interview.id = id;
                    Ok(Some(interview))
                }
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM interviews WHERE user_id = ?1 ORDER BY created_at DESC",
            )?;
            let mut rows = stmt.query(params![user_id])?;
            collect(&mut rows)
        })
        .await
    }

    /// Finalized interviews of other users, newest first.
    pub async fn latest_interviews(
        &self,
        excluding_user: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Interview>> {
        let excluding_user = excluding_user.to_string();
        let limit = to_i64(limit.unwrap_or(DEFAULT_LATEST_LIMIT))?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM interviews
                 WHERE finalized = 1 AND user_id != ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )?;
            let mut rows = stmt.query(params![excluding_user, limit])?;
            collect(&mut rows)
        })
        .await
    }
}
