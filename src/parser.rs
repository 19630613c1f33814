//! Parsing of engine console output.
//!
//! The engine prints a loose, human-oriented report: labelled analysis lines,
//! a row count, a timing line and a pipe-delimited result table, interleaved
//! with prompts and banners. This module classifies each line in a single
//! forward pass and accumulates the recognised pieces into a [`QueryOutcome`].
//! It never fails; unrecognised or malformed lines are skipped.

use std::sync::OnceLock;

use regex::Regex;

use crate::outcome::{QueryOutcome, ResultRow};

const ORIGINAL_QUERY: &str = "Original Query:";
const DETECTED_INTENT: &str = "Detected Intent:";
const BASE_TABLE: &str = "Base Table:";
const SELECT_COLUMNS: &str = "Select Columns:";
const WHERE_CONDITIONS: &str = "Where Conditions:";
const GENERATED_SQL: &str = "Generated SQL:";
const EXECUTION_TIME: &str = "Execution time:";

/// Table rules such as `--- | ---` contain this and are never rows.
const TABLE_RULE: &str = "---";

fn rows_returned_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+) rows? returned$").expect("valid regex"))
}

fn column_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*,\s*").expect("valid regex"))
}

/// Classification of a single trimmed, non-blank output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    OriginalQuery(&'a str),
    DetectedIntent(&'a str),
    BaseTable(&'a str),
    SelectColumns(Vec<&'a str>),
    WhereConditions(&'a str),
    GeneratedSql(&'a str),
    RowsReturned(u64),
    ExecutionTime(&'a str),
    TableRow(Vec<&'a str>),
    Other,
}

/// Classifies one trimmed line. Prefix rules are tried in a fixed priority
/// order and the first match wins.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(rest) = line.strip_prefix(ORIGINAL_QUERY) {
        return LineKind::OriginalQuery(rest.trim());
    }
    if let Some(rest) = line.strip_prefix(DETECTED_INTENT) {
        return LineKind::DetectedIntent(rest.trim());
    }
    if let Some(rest) = line.strip_prefix(BASE_TABLE) {
        return LineKind::BaseTable(rest.trim());
    }
    if let Some(rest) = line.strip_prefix(SELECT_COLUMNS) {
        // Stray commas never produce empty column names
        let columns = column_separator()
            .split(rest.trim())
            .filter(|c| !c.is_empty())
            .collect();
        return LineKind::SelectColumns(columns);
    }
    if let Some(rest) = line.strip_prefix(WHERE_CONDITIONS) {
        return LineKind::WhereConditions(rest.trim());
    }
    if let Some(rest) = line.strip_prefix(GENERATED_SQL) {
        return LineKind::GeneratedSql(rest.trim());
    }
    if let Some(caps) = rows_returned_pattern().captures(line) {
        // A count too large for u64 is treated like any other unparseable line.
        return match caps[1].parse() {
            Ok(count) => LineKind::RowsReturned(count),
            Err(_) => LineKind::Other,
        };
    }
    if let Some(rest) = line.strip_prefix(EXECUTION_TIME) {
        return LineKind::ExecutionTime(rest.trim());
    }
    if line.contains('|') && !line.contains(TABLE_RULE) {
        let cells = line
            .split('|')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        return LineKind::TableRow(cells);
    }
    LineKind::Other
}

/// Accumulates the pipe-delimited result table.
///
/// The first table line becomes the header; later lines are kept only when
/// their cell count matches the header exactly.
#[derive(Debug, Default)]
struct TableBuilder {
    header: Option<Vec<String>>,
    rows: Vec<ResultRow>,
}

impl TableBuilder {
    fn push(&mut self, cells: Vec<&str>) {
        match &self.header {
            None => self.header = Some(cells.into_iter().map(String::from).collect()),
            Some(header) if header.len() == cells.len() => {
                self.rows
                    .push(ResultRow::from_pairs(header.iter().cloned().zip(cells)));
            }
            Some(_) => {}
        }
    }

    fn finish(self) -> Vec<ResultRow> {
        self.rows
    }
}

/// Parses a full engine transcript into a [`QueryOutcome`].
///
/// The outcome is always marked successful; fields that never appear keep
/// their defaults.
pub fn parse_transcript(transcript: &str) -> QueryOutcome {
    let mut outcome = QueryOutcome {
        success: true,
        ..Default::default()
    };
    let mut table = TableBuilder::default();

    for line in transcript.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match classify_line(line) {
            LineKind::OriginalQuery(text) => outcome.query_analysis = Some(text.to_string()),
            LineKind::DetectedIntent(text) => outcome.detected_intent = Some(text.to_string()),
            LineKind::BaseTable(text) => outcome.base_table = Some(text.to_string()),
            LineKind::SelectColumns(columns) => {
                if !columns.is_empty() {
                    outcome.select_columns = columns.into_iter().map(String::from).collect();
                }
            }
            LineKind::WhereConditions(text) => {
                outcome.where_conditions = Some(text.to_string())
            }
            LineKind::GeneratedSql(text) => outcome.generated_sql = Some(text.to_string()),
            LineKind::RowsReturned(count) => outcome.rows_returned = count,
            LineKind::ExecutionTime(text) => outcome.execution_time = Some(text.to_string()),
            LineKind::TableRow(cells) => table.push(cells),
            LineKind::Other => {}
        }
    }

    outcome.result_rows = table.finish();
    outcome
}
