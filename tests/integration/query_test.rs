//! Query execution and report parsing against a real child process.

use std::time::Duration;

use nl2sql_bridge::Nl2SqlService;
use pretty_assertions::assert_eq;

use super::fake_engine::{profile, service, session};

#[tokio::test]
async fn test_query_returns_parsed_report() {
    let service = service();
    assert!(service.connect(profile("shop")).await.success);

    let outcome = service.execute_query("list all users").await;

    assert!(outcome.success);
    assert_eq!(outcome.query_analysis.as_deref(), Some("list all users"));
    assert_eq!(outcome.detected_intent.as_deref(), Some("select"));
    assert_eq!(outcome.base_table.as_deref(), Some("users"));
    assert_eq!(outcome.select_columns, vec!["id", "name"]);
    assert_eq!(
        outcome.generated_sql.as_deref(),
        Some("SELECT id, name FROM users")
    );
    assert_eq!(outcome.rows_returned, 2);
    assert_eq!(outcome.execution_time.as_deref(), Some("0.004 sec"));
    assert_eq!(outcome.result_rows.len(), 2);
    assert_eq!(outcome.result_rows[0].get("name"), Some("Ada"));
    assert_eq!(outcome.result_rows[1].get("id"), Some("2"));
    assert_eq!(outcome.error_message, None);
}

#[tokio::test]
async fn test_multiline_query_is_sent_as_one_line() {
    let service = service();
    assert!(service.connect(profile("shop")).await.success);

    let outcome = service.execute_query("list all users\nordered by name").await;

    assert!(outcome.success);
    assert_eq!(
        outcome.query_analysis.as_deref(),
        Some("list all users ordered by name")
    );
}

#[tokio::test]
async fn test_non_utf8_output_is_decoded_lossily() {
    let service = service();
    assert!(service.connect(profile("shop")).await.success);

    let outcome = service.execute_query("list cafes").await;

    assert!(outcome.success);
    assert_eq!(outcome.error_message, None);
    assert_eq!(outcome.base_table.as_deref(), Some("cafes"));
    assert_eq!(outcome.rows_returned, 1);
    assert_eq!(outcome.result_rows.len(), 1);
    assert_eq!(outcome.result_rows[0].get("name"), Some("Caf\u{FFFD}"));
}

#[tokio::test]
async fn test_query_before_connect() {
    let service = service();

    let outcome = service.execute_query("list all users").await;
    assert!(!outcome.success);
    assert_eq!(outcome.error_message.as_deref(), Some("No active connection."));
}

#[tokio::test]
async fn test_engine_error_output_is_blank_success() {
    let service = service();
    assert!(service.connect(profile("shop")).await.success);

    let outcome = service.execute_query("fail on purpose").await;

    assert!(outcome.success);
    assert!(outcome.is_blank());
}

#[tokio::test]
async fn test_engine_error_reaches_transcript() {
    let session = session(Duration::from_secs(10));
    session.connect(profile("shop")).await.unwrap();

    let transcript = session.query("fail on purpose").await.unwrap();
    assert!(transcript.contains("ERROR 1146 (42S02)"));
    assert!(transcript.contains("Enter your query"));
}

#[tokio::test]
async fn test_query_times_out() {
    let service = Nl2SqlService::new(session(Duration::from_secs(1)));
    assert!(service.connect(profile("shop")).await.success);

    let outcome = service.execute_query("hang forever").await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("Query execution timed out after 1s")
    );
    // The connection survives a failed query
    assert!(service.status().connected);
}
