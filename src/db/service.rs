use crate::db::models::{Escalation, Faq, Message, Sender, Session};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, types::Type, Connection, Result as DbResult, Row};
use uuid::Uuid;

pub struct DbService;

// Timestamps are selected AS VARCHAR, which DuckDB renders without a zone.
fn parse_timestamp(row: &Row, idx: usize) -> DbResult<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_uuid(row: &Row, idx: usize) -> DbResult<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const MESSAGE_COLUMNS: &str = "id, session_id, sender, content, CAST(created_at AS VARCHAR)";

impl DbService {
    fn row_to_session(row: &Row) -> DbResult<Session> {
        Ok(Session {
            id: parse_uuid(row, 0)?,
            created_at: parse_timestamp(row, 1)?,
        })
    }

    fn row_to_message(row: &Row) -> DbResult<Message> {
        Ok(Message {
            id: row.get(0)?,
            session_id: parse_uuid(row, 1)?,
            sender: row.get::<_, String>(2)?,
            content: row.get::<_, String>(3)?,
            created_at: parse_timestamp(row, 4)?,
        })
    }

    fn row_to_faq(row: &Row) -> DbResult<Faq> {
        Ok(Faq {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
        })
    }

    fn row_to_escalation(row: &Row) -> DbResult<Escalation> {
        Ok(Escalation {
            id: row.get(0)?,
            session_id: parse_uuid(row, 1)?,
            user_message: row.get(2)?,
            created_at: parse_timestamp(row, 3)?,
        })
    }

    // --- Session Operations ---

    pub fn insert_session(conn: &Connection) -> DbResult<Session> {
        let id = Uuid::new_v4();

        conn.execute("INSERT INTO sessions (id) VALUES (?)", params![id.to_string()])?;

        Self::get_session(conn, id)?.ok_or(duckdb::Error::QueryReturnedNoRows)
    }

    pub fn get_session(conn: &Connection, id: Uuid) -> DbResult<Option<Session>> {
        let mut stmt = conn.prepare("SELECT id, CAST(created_at AS VARCHAR) FROM sessions WHERE id = ?")?;
        let mut rows = stmt.query_map(params![id.to_string()], Self::row_to_session)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn list_sessions(conn: &Connection, limit: usize, offset: usize) -> DbResult<Vec<Session>> {
        let mut stmt = conn.prepare(
            "SELECT id, CAST(created_at AS VARCHAR) FROM sessions ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], Self::row_to_session)?;
        rows.collect()
    }

    // --- Message Operations ---

    pub fn insert_message(conn: &Connection, session_id: Uuid, sender: Sender, content: &str) -> DbResult<Message> {
        // Reserve the id up front so the inserted row can be read back exactly.
        let id: i64 = conn.query_row("SELECT nextval('seq_messages_id')", [], |row| row.get(0))?;

        conn.execute(
            "INSERT INTO messages (id, session_id, sender, content) VALUES (?, ?, ?, ?)",
            params![id, session_id.to_string(), sender.as_str(), content],
        )?;

        conn.query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"),
            params![id],
            Self::row_to_message,
        )
    }

    /// One page of a session's history, oldest first.
    pub fn get_messages(conn: &Connection, session_id: Uuid, limit: usize, offset: usize) -> DbResult<Vec<Message>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM messages
             WHERE session_id = ?
             ORDER BY created_at ASC, id ASC
             LIMIT ? OFFSET ?"
        ))?;

        let rows = stmt.query_map(
            params![session_id.to_string(), limit as i64, offset as i64],
            Self::row_to_message,
        )?;
        rows.collect()
    }

    /// Entire history of a session, oldest first, read `page_size` rows at a time.
    pub fn get_all_messages(conn: &Connection, session_id: Uuid, page_size: usize) -> DbResult<Vec<Message>> {
        let page_size = page_size.max(1);
        let mut messages = Vec::new();
        loop {
            let page = Self::get_messages(conn, session_id, page_size, messages.len())?;
            let done = page.len() < page_size;
            messages.extend(page);
            if done {
                return Ok(messages);
            }
        }
    }

    /// The last `limit` messages of a session, returned oldest first.
    pub fn get_recent_messages(conn: &Connection, session_id: Uuid, limit: usize) -> DbResult<Vec<Message>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM (
                 SELECT * FROM messages
                 WHERE session_id = ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?
             ) recent
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![session_id.to_string(), limit as i64], Self::row_to_message)?;
        rows.collect()
    }

    // --- FAQ Operations ---

    pub fn insert_faq(conn: &Connection, question: &str, answer: &str) -> DbResult<Faq> {
        let id: i64 = conn.query_row("SELECT nextval('seq_faqs_id')", [], |row| row.get(0))?;

        conn.execute(
            "INSERT INTO faqs (id, question, answer) VALUES (?, ?, ?)",
            params![id, question, answer],
        )?;

        Ok(Faq {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    /// All FAQ entries in insertion order.
    pub fn list_faqs(conn: &Connection) -> DbResult<Vec<Faq>> {
        let mut stmt = conn.prepare("SELECT id, question, answer FROM faqs ORDER BY id ASC")?;
        let rows = stmt.query_map([], Self::row_to_faq)?;
        rows.collect()
    }

    /// Returns whether a row was removed.
    pub fn delete_faq(conn: &Connection, id: i64) -> DbResult<bool> {
        let affected = conn.execute("DELETE FROM faqs WHERE id = ?", params![id])?;
        Ok(affected > 0)
    }

    // --- Escalation Operations ---

    pub fn insert_escalation(conn: &Connection, session_id: Uuid, user_message: &str) -> DbResult<Escalation> {
        let id: i64 = conn.query_row("SELECT nextval('seq_escalations_id')", [], |row| row.get(0))?;

        conn.execute(
            "INSERT INTO escalations (id, session_id, user_message) VALUES (?, ?, ?)",
            params![id, session_id.to_string(), user_message],
        )?;

        conn.query_row(
            "SELECT id, session_id, user_message, CAST(created_at AS VARCHAR) FROM escalations WHERE id = ?",
            params![id],
            Self::row_to_escalation,
        )
    }

    /// Newest first.
    pub fn list_escalations(conn: &Connection, limit: usize) -> DbResult<Vec<Escalation>> {
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_message, CAST(created_at AS VARCHAR)
             FROM escalations
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_escalation)?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn timestamp_of(raw: &str) -> DbResult<DateTime<Utc>> {
        let conn = Connection::open_in_memory().unwrap();
        conn.query_row("SELECT CAST(? AS VARCHAR)", params![raw], |row| parse_timestamp(row, 0))
    }

    #[test]
    fn parses_duckdb_timestamp_text() {
        let ts = timestamp_of("2024-03-05 14:07:09.123456").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.hour(), 14);
        assert_eq!(ts.second(), 9);

        let whole = timestamp_of("2024-03-05 14:07:09").unwrap();
        assert_eq!(whole.minute(), 7);
    }

    #[test]
    fn malformed_timestamp_is_a_conversion_error() {
        let err = timestamp_of("yesterday-ish").unwrap_err();
        assert!(matches!(err, duckdb::Error::FromSqlConversionFailure(0, _, _)));
    }
}
