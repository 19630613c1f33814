//! Transport-agnostic outcome types.
//!
//! These types represent the results of the upstream-facing operations
//! (`connect`, `execute_query`, `status`) independent of how they are
//! presented. The CLI serializes them as JSON; any other transport can do the
//! same.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Result of a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionOutcome {
    pub success: bool,
    pub message: String,
}

impl ConnectionOutcome {
    /// Creates a successful outcome.
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates a failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One row of the engine's result table.
///
/// Cells are kept in header order. Lookups are by column name; there is no
/// positional access by design of the output contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    cells: Vec<(String, String)>,
}

impl ResultRow {
    /// Builds a row by pairing header names with cell values.
    ///
    /// A repeated header name keeps its first position and takes the later
    /// value, mirroring map insertion.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::default();
        for (column, value) in pairs {
            row.insert(column.into(), value.into());
        }
        row
    }

    fn insert(&mut self, column: String, value: String) {
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Returns the value for a column, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Structured result of one natural-language query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub query_analysis: Option<String>,
    pub detected_intent: Option<String>,
    pub base_table: Option<String>,
    pub select_columns: Vec<String>,
    pub where_conditions: Option<String>,
    pub generated_sql: Option<String>,
    pub result_rows: Vec<ResultRow>,
    pub rows_returned: u64,
    pub execution_time: Option<String>,
    pub error_message: Option<String>,
}

impl QueryOutcome {
    /// Creates a failed outcome with only the error message set.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Returns true if nothing at all was recognised in the engine output.
    ///
    /// A blank outcome is still successful; callers that care can use this to
    /// tell "ran, returned nothing" apart from a populated result.
    pub fn is_blank(&self) -> bool {
        self.query_analysis.is_none()
            && self.detected_intent.is_none()
            && self.base_table.is_none()
            && self.select_columns.is_empty()
            && self.where_conditions.is_none()
            && self.generated_sql.is_none()
            && self.result_rows.is_empty()
            && self.rows_returned == 0
            && self.execution_time.is_none()
    }
}

/// Non-secret metadata about the current connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub database: String,
    pub user: String,
}

/// Snapshot of the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
    pub executable_found: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_outcome_constructors() {
        let ok = ConnectionOutcome::accepted("Connected to shop on localhost");
        assert!(ok.success);
        assert_eq!(ok.message, "Connected to shop on localhost");

        let failed = ConnectionOutcome::failed("nope");
        assert!(!failed.success);
    }

    #[test]
    fn test_result_row_preserves_header_order() {
        let row = ResultRow::from_pairs([("region", "East"), ("total", "100")]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["region", "total"]);
        assert_eq!(row.get("total"), Some("100"));
        assert_eq!(row.get("missing"), None);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"region":"East","total":"100"}"#);
    }

    #[test]
    fn test_result_row_repeated_column_takes_last_value() {
        let row = ResultRow::from_pairs([("id", "1"), ("name", "a"), ("id", "2")]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("id"), Some("2"));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_failed_query_outcome() {
        let outcome = QueryOutcome::failed("No active connection.");
        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("No active connection.")
        );
        assert!(outcome.is_blank());
    }

    #[test]
    fn test_query_outcome_serialization() {
        let outcome = QueryOutcome {
            success: true,
            base_table: Some("sales".to_string()),
            rows_returned: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["base_table"], "sales");
        assert_eq!(json["rows_returned"], 2);
        assert!(json["query_analysis"].is_null());
        assert_eq!(json["select_columns"], serde_json::json!([]));
    }

    #[test]
    fn test_status_report_omits_missing_connection_info() {
        let status = StatusReport {
            connected: false,
            connection_info: None,
            executable_found: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"connected":false,"executable_found":true}"#);
    }
}
