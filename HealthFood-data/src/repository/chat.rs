use std::str::FromStr;

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::columns::{encode, json_object, now, today};
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{
    ChatMessageRecord, ChatRole, ChatSessionContext, ChatSessionRecord, MessageType, NewChatMessage,
};

/// Repository trait for chat sessions and their messages
#[async_trait]
pub trait ChatRepositoryTrait: Send + Sync {
    /// Open a session; the name defaults to `Chat YYYY-MM-DD`
    async fn create_session(&self, profile_id: i64, name: Option<String>) -> Result<ChatSessionRecord, RepositoryError>;

    /// Most recently active sessions of a profile
    async fn list_sessions(&self, profile_id: i64, limit: u32) -> Result<Vec<ChatSessionRecord>, RepositoryError>;

    /// Session joined with its profile when the user owns it
    async fn session_context(&self, session_id: i64, user_id: i64) -> Result<Option<ChatSessionContext>, RepositoryError>;

    /// Append a message and bump the session's activity time
    async fn add_message(&self, message: NewChatMessage) -> Result<ChatMessageRecord, RepositoryError>;

    /// The last `limit` messages, oldest first
    async fn list_messages(&self, session_id: i64, limit: u32) -> Result<Vec<ChatMessageRecord>, RepositoryError>;
}

/// SQLite-backed chat repository
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: DatabasePool,
}

impl ChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SESSION_SELECT: &str = "SELECT s.id, s.health_profile_id, s.session_name, s.started_at, s.last_message_at,
        (SELECT COUNT(*) FROM chat_messages m WHERE m.session_id = s.id)
     FROM chat_sessions s";

fn map_session(row: &Row<'_>) -> rusqlite::Result<ChatSessionRecord> {
    Ok(ChatSessionRecord {
        id: row.get(0)?,
        health_profile_id: row.get(1)?,
        session_name: row.get(2)?,
        started_at: row.get(3)?,
        last_message_at: row.get(4)?,
        message_count: row.get(5)?,
    })
}

fn parse_column<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<ChatMessageRecord> {
    Ok(ChatMessageRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: parse_column::<ChatRole>(row, 2)?,
        content: row.get(3)?,
        message_type: parse_column::<MessageType>(row, 4)?,
        metadata: json_object(row.get(5)?),
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl ChatRepositoryTrait for ChatRepository {
    async fn create_session(&self, profile_id: i64, name: Option<String>) -> Result<ChatSessionRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Chat {}", today()));
        let ts = now();

        conn.execute(
            "INSERT INTO chat_sessions (health_profile_id, session_name, started_at, last_message_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![profile_id, name, ts],
        )?;
        let id = conn.last_insert_rowid();
        let session = conn.query_row(&format!("{} WHERE s.id = ?1", SESSION_SELECT), [id], map_session)?;
        Ok(session)
    }

    async fn list_sessions(&self, profile_id: i64, limit: u32) -> Result<Vec<ChatSessionRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE s.health_profile_id = ?1 ORDER BY s.last_message_at DESC, s.id DESC LIMIT ?2",
            SESSION_SELECT
        ))?;
        let rows = stmt.query_map(params![profile_id, limit], map_session)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn session_context(&self, session_id: i64, user_id: i64) -> Result<Option<ChatSessionContext>, RepositoryError> {
        let conn = self.pool.get()?;
        let context = conn
            .query_row(
                "SELECT s.id, p.id, p.user_id, p.profile_name, p.conditions_text, p.conditions_json,
                        p.weight, p.height
                 FROM chat_sessions s
                 JOIN health_profiles p ON p.id = s.health_profile_id
                 WHERE s.id = ?1 AND p.user_id = ?2",
                params![session_id, user_id],
                |row| {
                    Ok(ChatSessionContext {
                        session_id: row.get(0)?,
                        health_profile_id: row.get(1)?,
                        user_id: row.get(2)?,
                        profile_name: row.get(3)?,
                        conditions_text: row.get(4)?,
                        conditions_json: json_object(row.get(5)?),
                        weight: row.get(6)?,
                        height: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(context)
    }

    async fn add_message(&self, message: NewChatMessage) -> Result<ChatMessageRecord, RepositoryError> {
        let mut conn = self.pool.get()?;
        let metadata = message.metadata.as_ref().map(encode).transpose()?;
        let ts = now();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO chat_messages (session_id, role, content, message_type, metadata_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.session_id,
                message.role.as_str(),
                message.content,
                message.message_type.as_str(),
                metadata,
                ts
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE chat_sessions SET last_message_at = ?1 WHERE id = ?2",
            params![ts, message.session_id],
        )?;
        let record = tx.query_row(
            "SELECT id, session_id, role, content, message_type, metadata_json, created_at
             FROM chat_messages WHERE id = ?1",
            [id],
            map_message,
        )?;
        tx.commit()?;
        Ok(record)
    }

    async fn list_messages(&self, session_id: i64, limit: u32) -> Result<Vec<ChatMessageRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, message_type, metadata_json, created_at
             FROM chat_messages WHERE session_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![session_id, limit], map_message)?;
        let mut messages = rows.collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}
