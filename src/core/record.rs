//! Answer records and the delimited-text parser
//!
//! Input files hold one answer per row:
//!
//! ```text
//! Answer, question 1, question 2, ...
//! "An answer, with a comma", "How do I embed ""quotes""?"
//! ```
//!
//! Column 0 is the answer, every following column is a question variant.
//! Rows that cannot form a record are skipped and reported as
//! [`RowWarning`]s; the parse only fails when the source has no rows.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QnaError, Result};

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// One answer with its question variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    /// Order is kept; the first question is usually the canonical one
    pub questions: Vec<String>,
}

impl AnswerRecord {
    pub fn new(answer: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            questions,
        }
    }
}

/// A row that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    /// 1-based line the row starts on
    pub line: u64,
    pub reason: String,
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Result of a parse: the records plus what was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<AnswerRecord>,
    pub warnings: Vec<RowWarning>,
}

/// Parse delimited text into answer records
///
/// # Examples
/// ```
/// use qnakb::core::record::parse;
///
/// let outcome = parse("Answer A,Q1,Q2\nAnswer B,Q3", b',').unwrap();
/// assert_eq!(outcome.records.len(), 2);
/// assert_eq!(outcome.records[0].questions, vec!["Q1", "Q2"]);
/// ```
pub fn parse(text: &str, delimiter: u8) -> Result<ParseOutcome> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut outcome = ParseOutcome::default();
    let mut rows = 0usize;

    for result in reader.records() {
        rows += 1;
        match result {
            Ok(row) => {
                let line = row.position().map(|p| p.line()).unwrap_or(rows as u64);
                match record_from_fields(row.iter()) {
                    Ok(record) => outcome.records.push(record),
                    Err(reason) => skip(&mut outcome, line, reason),
                }
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(rows as u64);
                skip(&mut outcome, line, e.to_string());
            }
        }
    }

    if rows == 0 {
        return Err(QnaError::format("question and answer source is empty"));
    }

    Ok(outcome)
}

/// Read and parse a UTF-8 file
pub fn load(path: &Path, delimiter: u8) -> Result<ParseOutcome> {
    let text = std::fs::read_to_string(path).map_err(|e| QnaError::io(path, e))?;
    parse(&text, delimiter)
}

fn skip(outcome: &mut ParseOutcome, line: u64, reason: String) {
    warn!(line, %reason, "skipping row");
    outcome.warnings.push(RowWarning { line, reason });
}

fn record_from_fields<'a>(
    mut fields: impl Iterator<Item = &'a str>,
) -> std::result::Result<AnswerRecord, String> {
    let answer = fields.next().unwrap_or_default();
    let rest: Vec<&str> = fields.collect();

    if rest.is_empty() {
        return Err("missing column: a row needs an answer and at least one question".into());
    }
    if answer.is_empty() {
        return Err("answer is empty".into());
    }

    let questions: Vec<String> = rest
        .into_iter()
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();

    if questions.is_empty() {
        return Err("all question columns are empty".into());
    }

    Ok(AnswerRecord::new(answer, questions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(answer: &str, questions: &[&str]) -> AnswerRecord {
        AnswerRecord::new(answer, questions.iter().map(|q| q.to_string()).collect())
    }

    #[test]
    fn test_parse_two_rows() {
        let outcome = parse("Answer A,Q1,Q2\nAnswer B,Q3", b',').unwrap();
        assert_eq!(
            outcome.records,
            vec![rec("Answer A", &["Q1", "Q2"]), rec("Answer B", &["Q3"])]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "A,q1\n\"B, with comma\",q2,q3\nC,q4\n";
        assert_eq!(parse(text, b',').unwrap(), parse(text, b',').unwrap());
    }

    #[test]
    fn test_empty_input_is_format_error() {
        assert!(matches!(parse("", b','), Err(QnaError::Format(_))));
        assert!(matches!(parse("\n\n", b','), Err(QnaError::Format(_))));
    }

    #[test]
    fn test_single_field_row_skipped() {
        let outcome = parse("OnlyAnswer", b',').unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].line, 1);
    }

    #[test]
    fn test_bad_row_does_not_abort() {
        let outcome = parse("A,q1\nBroken\nC,q2", b',').unwrap();
        assert_eq!(outcome.records, vec![rec("A", &["q1"]), rec("C", &["q2"])]);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].line, 2);
    }

    #[test]
    fn test_quotes_and_embedded_delimiter() {
        let text = r#""Say ""hi"", then leave","How do I greet, politely?""#;
        let outcome = parse(text, b',').unwrap();
        assert_eq!(
            outcome.records,
            vec![rec("Say \"hi\", then leave", &["How do I greet, politely?"])]
        );
    }

    #[test]
    fn test_fields_are_trimmed() {
        let outcome = parse("  Answer  ,  q1 , q2  ", b',').unwrap();
        assert_eq!(outcome.records, vec![rec("Answer", &["q1", "q2"])]);
    }

    #[test]
    fn test_custom_delimiter() {
        let outcome = parse("A;q1;q2,still q2", b';').unwrap();
        assert_eq!(outcome.records, vec![rec("A", &["q1", "q2,still q2"])]);
    }

    #[test]
    fn test_empty_answer_or_questions_rejected() {
        let outcome = parse(",q1\nA,,\nB,,q2", b',').unwrap();
        assert_eq!(outcome.records, vec![rec("B", &["q2"])]);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/definitely/not/here.csv"), b',').unwrap_err();
        assert!(matches!(err, QnaError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.csv");
        std::fs::write(&path, "Answer,Question?\n").unwrap();
        let outcome = load(&path, DEFAULT_DELIMITER).unwrap();
        assert_eq!(outcome.records, vec![rec("Answer", &["Question?"])]);
    }
}
