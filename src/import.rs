use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::models::Question;

const TOPIC_MARKER: &str = "Topic: ";
const QUESTION_MARKER: &str = "Question: ";
const UNKNOWN_TOPIC: &str = "Unknown";
const MISSING_PROMPT: &str = "No question found";

// One line of a JSONL question dump
#[derive(Debug, Deserialize)]
struct ImportRecord {
    input: String,
    output: String,
}

// `output` is itself a JSON document
#[derive(Debug, Deserialize)]
struct ImportAnswer {
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuestion {
    pub topic: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

fn extract_topic(input: &str) -> String {
    input
        .find(TOPIC_MARKER)
        .map(|start| &input[start + TOPIC_MARKER.len()..])
        .and_then(|rest| rest.lines().next())
        .filter(|topic| !topic.is_empty())
        .unwrap_or(UNKNOWN_TOPIC)
        .to_string()
}

// Everything after the marker, which may span several lines
fn extract_prompt(input: &str) -> String {
    input
        .find(QUESTION_MARKER)
        .map(|start| input[start + QUESTION_MARKER.len()..].trim())
        .filter(|prompt| !prompt.is_empty())
        .unwrap_or(MISSING_PROMPT)
        .to_string()
}

pub fn parse_line(line: &str, line_no: usize) -> Result<ParsedQuestion> {
    let import_err = |reason: String| QuizError::Import {
        line: line_no,
        reason,
    };

    let record: ImportRecord =
        serde_json::from_str(line).map_err(|e| import_err(format!("invalid record: {}", e)))?;
    let answer: ImportAnswer = serde_json::from_str(&record.output)
        .map_err(|e| import_err(format!("invalid output: {}", e)))?;

    let parsed = ParsedQuestion {
        topic: extract_topic(&record.input),
        prompt: extract_prompt(&record.input),
        options: answer.options,
        correct_index: answer.correct_index,
    };

    // Reject anything the selector would later refuse to play
    Question::new(
        0,
        parsed.topic.as_str(),
        parsed.prompt.as_str(),
        parsed.options.clone(),
        parsed.correct_index,
    )
    .map_err(|e| import_err(e.to_string()))?;

    Ok(parsed)
}

/// Insert every valid line. Bad lines are logged and counted, store failures abort.
pub fn import_questions<R: BufRead>(db: &Database, reader: R) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| QuizError::Import {
            line: line_no,
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed = match parse_line(&line, line_no) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("skipping import {}", e);
                report.skipped += 1;
                continue;
            }
        };

        let options = serde_json::to_string(&parsed.options).map_err(|e| QuizError::Import {
            line: line_no,
            reason: e.to_string(),
        })?;
        let id = db.add_question(&parsed.topic, &parsed.prompt, &options, parsed.correct_index)?;
        log::debug!("imported question {} in {}", id, parsed.topic);
        report.inserted += 1;
    }

    log::info!(
        "import finished: {} inserted, {} skipped",
        report.inserted,
        report.skipped
    );
    Ok(report)
}
