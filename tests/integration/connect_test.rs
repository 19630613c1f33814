//! Connection validation against a real child process.

use std::time::Duration;

use nl2sql_bridge::BridgeError;
use pretty_assertions::assert_eq;

use super::fake_engine::{profile, service, session};

#[tokio::test]
async fn test_connect_succeeds_on_prompt() {
    let session = session(Duration::from_secs(10));

    let message = session.connect(profile("shop")).await.unwrap();
    assert_eq!(message, "Connected to shop on db.local");

    let current = session.current_profile().unwrap();
    assert_eq!(current.database(), "shop");
    assert!(session.status().connected);
}

#[tokio::test]
async fn test_connect_rejected_with_stderr_transcript() {
    let session = session(Duration::from_secs(10));

    let err = session.connect(profile("baddb")).await.unwrap_err();
    assert!(matches!(err, BridgeError::ConnectionRejected { .. }));
    assert_eq!(
        err.to_string(),
        "Connection failed: ERROR 1049 (42000): Unknown database 'baddb'\n"
    );
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_failed_connect_keeps_previous_connection() {
    let service = service();

    assert!(service.connect(profile("shop")).await.success);
    let outcome = service.connect(profile("baddb")).await;
    assert!(!outcome.success);

    let status = service.status();
    assert!(status.connected);
    assert_eq!(status.connection_info.unwrap().database, "shop");
}

#[tokio::test]
async fn test_connect_times_out_and_kills_engine() {
    let session = session(Duration::from_secs(1));

    let err = session.connect(profile("hangdb")).await.unwrap_err();
    assert_eq!(err.to_string(), "Connection timed out after 1s");
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_connect_prompt_seen_but_engine_lingers() {
    let session = session(Duration::from_secs(1));

    let message = session.connect(profile("lingerdb")).await.unwrap();
    assert_eq!(message, "Connected to lingerdb on db.local");
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_connect_with_missing_executable() {
    let service = nl2sql_bridge::Nl2SqlService::new(nl2sql_bridge::SessionManager::new(
        "/nonexistent/engine/nl2sql.exe",
        Duration::from_secs(1),
    ));

    let outcome = service.connect(profile("shop")).await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        "nl2sql executable not found at /nonexistent/engine/nl2sql.exe"
    );
    assert!(!service.status().executable_found);
}
