use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result, Row};
use std::path::Path;

use crate::error;
use crate::models::{Attempt, MasteryRecord, NewAttempt, StoredQuestion};
use crate::store::QuizStore;

const QUESTION_COLUMNS: &str = "id, topic, prompt, options, correct_index";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL,
                prompt TEXT NOT NULL,
                options TEXT NOT NULL,
                correct_index INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One row per submitted answer, never updated
            CREATE TABLE IF NOT EXISTS user_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                question_id INTEGER NOT NULL,
                topic TEXT NOT NULL,
                selected_index INTEGER,
                is_correct INTEGER NOT NULL,
                time_taken_seconds INTEGER NOT NULL DEFAULT 0,
                attempted_at TEXT NOT NULL,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS user_mastered_questions (
                user_id TEXT NOT NULL,
                question_id INTEGER NOT NULL,
                wrong_attempts INTEGER NOT NULL DEFAULT 0,
                mastered_at TEXT,
                PRIMARY KEY (user_id, question_id),
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_questions_topic ON questions(topic);
            CREATE INDEX IF NOT EXISTS idx_attempts_user ON user_attempts(user_id);
            CREATE INDEX IF NOT EXISTS idx_attempts_user_topic ON user_attempts(user_id, topic);
            "#,
        )?;

        // Run migrations for existing databases
        self.migrate()?;

        Ok(())
    }

    // Older databases predate per-question timing
    fn migrate(&self) -> Result<()> {
        let has_time_taken: bool = self
            .conn
            .prepare("SELECT time_taken_seconds FROM user_attempts LIMIT 1")
            .is_ok();

        if !has_time_taken {
            log::info!("migrating user_attempts: adding time_taken_seconds");
            self.conn.execute_batch(
                "ALTER TABLE user_attempts ADD COLUMN time_taken_seconds INTEGER NOT NULL DEFAULT 0;",
            )?;
        }

        Ok(())
    }

    // Question operations
    pub fn add_question(
        &self,
        topic: &str,
        prompt: &str,
        options_json: &str,
        correct_index: i64,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO questions (topic, prompt, options, correct_index) VALUES (?1, ?2, ?3, ?4)",
            params![topic, prompt, options_json, correct_index],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_question(&self, id: i64) -> Result<Option<StoredQuestion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM questions WHERE id = ?1",
            QUESTION_COLUMNS
        ))?;

        match stmt.query_row(params![id], stored_question_from_row) {
            Ok(q) => Ok(Some(q)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_questions(&self, topic_filter: Option<&str>) -> Result<Vec<StoredQuestion>> {
        let (query, params_vec): (String, Vec<Box<dyn rusqlite::ToSql>>) =
            if let Some(topic) = topic_filter {
                (
                    format!(
                        "SELECT {} FROM questions WHERE topic = ?1 ORDER BY id",
                        QUESTION_COLUMNS
                    ),
                    vec![Box::new(topic.to_string())],
                )
            } else {
                (
                    format!("SELECT {} FROM questions ORDER BY topic, id", QUESTION_COLUMNS),
                    vec![],
                )
            };

        let mut stmt = self.conn.prepare(&query)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();

        let rows = stmt.query_map(params_refs.as_slice(), stored_question_from_row)?;
        rows.collect()
    }

    pub fn questions_in_topics(&self, topics: &[String], limit: usize) -> Result<Vec<StoredQuestion>> {
        if topics.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        let placeholders: Vec<String> = (1..=topics.len()).map(|i| format!("?{}", i)).collect();
        let query = format!(
            "SELECT {} FROM questions WHERE topic IN ({}) ORDER BY id DESC LIMIT ?{}",
            QUESTION_COLUMNS,
            placeholders.join(", "),
            topics.len() + 1
        );

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = topics
            .iter()
            .map(|t| Box::new(t.clone()) as Box<dyn rusqlite::ToSql>)
            .collect();
        params_vec.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&query)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();

        let rows = stmt.query_map(params_refs.as_slice(), stored_question_from_row)?;
        rows.collect()
    }

    pub fn count_questions(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    pub fn question_window(&self, offset: usize, limit: usize) -> Result<Vec<StoredQuestion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM questions ORDER BY id LIMIT ?1 OFFSET ?2",
            QUESTION_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![limit as i64, offset as i64],
            stored_question_from_row,
        )?;
        rows.collect()
    }

    // Practice ranking for signed-in users: unmastered first, most-missed next, then random
    pub fn smart_questions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredQuestion>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT q.id, q.topic, q.prompt, q.options, q.correct_index
            FROM questions q
            LEFT JOIN user_mastered_questions m
                ON m.question_id = q.id AND m.user_id = ?1
            ORDER BY (m.mastered_at IS NOT NULL) ASC,
                     COALESCE(m.wrong_attempts, 0) DESC,
                     RANDOM()
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], stored_question_from_row)?;
        rows.collect()
    }

    // Attempt operations
    pub fn record_attempt(&self, attempt: &NewAttempt) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO user_attempts
                (user_id, question_id, topic, selected_index, is_correct, time_taken_seconds, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attempt.user_id,
                attempt.question_id,
                attempt.topic,
                attempt.selected_index.map(|i| i as i64),
                attempt.is_correct,
                attempt.time_taken_seconds,
                attempt.timestamp.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn attempts_for_user(&self, user_id: &str) -> Result<Vec<Attempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, question_id, topic, selected_index, is_correct,
                   time_taken_seconds, attempted_at
            FROM user_attempts
            WHERE user_id = ?1
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let selected: Option<i64> = row.get(4)?;
            Ok(Attempt {
                id: row.get(0)?,
                user_id: row.get(1)?,
                question_id: row.get(2)?,
                topic: row.get(3)?,
                selected_index: selected.map(|i| i.max(0) as usize),
                is_correct: row.get::<_, i32>(5)? != 0,
                time_taken_seconds: row.get(6)?,
                timestamp: timestamp_from_row(row, 7)?,
            })
        })?;

        rows.collect()
    }

    // Mastery operations
    pub fn get_mastery(&self, user_id: &str, question_id: i64) -> Result<Option<MasteryRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, question_id, wrong_attempts, mastered_at
            FROM user_mastered_questions
            WHERE user_id = ?1 AND question_id = ?2
            "#,
        )?;

        let record = stmt.query_row(params![user_id, question_id], |row| {
            let mastered_at = match row.get::<_, Option<String>>(3)? {
                Some(_) => Some(timestamp_from_row(row, 3)?),
                None => None,
            };
            Ok(MasteryRecord {
                user_id: row.get(0)?,
                question_id: row.get(1)?,
                wrong_attempts: row.get(2)?,
                mastered_at,
            })
        });

        match record {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn upsert_mastery(&self, record: &MasteryRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO user_mastered_questions (user_id, question_id, wrong_attempts, mastered_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, question_id) DO UPDATE SET
                wrong_attempts = excluded.wrong_attempts,
                mastered_at = COALESCE(excluded.mastered_at, mastered_at)
            "#,
            params![
                record.user_id,
                record.question_id,
                record.wrong_attempts,
                record.mastered_at.map(|t| t.to_rfc3339())
            ],
        )?;
        Ok(())
    }
}

impl QuizStore for Database {
    fn fetch_attempts(&self, user_id: &str) -> error::Result<Vec<Attempt>> {
        Ok(self.attempts_for_user(user_id)?)
    }

    fn fetch_questions_by_topics(
        &self,
        topics: &[String],
        limit: usize,
    ) -> error::Result<Vec<StoredQuestion>> {
        Ok(self.questions_in_topics(topics, limit)?)
    }

    fn count_questions(&self) -> error::Result<usize> {
        Ok(Database::count_questions(self)?)
    }

    fn fetch_random_questions(
        &self,
        offset: usize,
        limit: usize,
    ) -> error::Result<Vec<StoredQuestion>> {
        Ok(self.question_window(offset, limit)?)
    }

    fn fetch_smart_questions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> error::Result<Vec<StoredQuestion>> {
        Ok(self.smart_questions(user_id, limit)?)
    }

    fn insert_attempt(&self, attempt: &NewAttempt) -> error::Result<i64> {
        Ok(self.record_attempt(attempt)?)
    }

    fn get_mastery_record(
        &self,
        user_id: &str,
        question_id: i64,
    ) -> error::Result<Option<MasteryRecord>> {
        Ok(self.get_mastery(user_id, question_id)?)
    }

    fn upsert_mastery_record(&self, record: &MasteryRecord) -> error::Result<()> {
        Ok(self.upsert_mastery(record)?)
    }
}

fn stored_question_from_row(row: &Row) -> Result<StoredQuestion> {
    Ok(StoredQuestion {
        id: row.get(0)?,
        topic: row.get(1)?,
        prompt: row.get(2)?,
        options: row.get(3)?,
        correct_index: row.get(4)?,
    })
}

fn timestamp_from_row(row: &Row, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
