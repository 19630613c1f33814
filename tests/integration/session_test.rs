//! Interactive session loop over in-memory input and output.

use nl2sql_bridge::app::App;
use nl2sql_bridge::config::{Config, ConnectionSettings};
use serde_json::Value;

use super::fake_engine::service;

async fn run_session(app: &App, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    app.run(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_session_with_inline_connect() {
    let app = App::new(
        service(),
        Config::default(),
        ConnectionSettings::default(),
        None,
    );
    let input = "/connect db.local reader s3cret shop 3307\nlist all users\n/status\n/quit\n";

    let responses = run_session(&app, input).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["message"], "Connected to shop on db.local");
    assert_eq!(responses[1]["rows_returned"], 2);
    assert_eq!(responses[1]["result_rows"][1]["name"], "Grace");
    assert_eq!(responses[2]["connected"], true);
    assert_eq!(responses[2]["executable_found"], true);
    assert!(responses[2]["connection_info"].get("password").is_none());
}

#[tokio::test]
async fn test_session_with_named_connection() {
    let config: Config = toml::from_str(
        r#"
[connections.broken]
host = "db.local"
database = "baddb"
user = "reader"
"#,
    )
    .unwrap();
    let app = App::new(service(), config, ConnectionSettings::default(), None);

    let responses = run_session(&app, "/connect broken\n/connect missing\n").await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["success"], false);
    assert_eq!(
        responses[0]["message"],
        "Connection failed: ERROR 1049 (42000): Unknown database 'baddb'\n"
    );
    assert_eq!(responses[1]["success"], false);
    assert!(responses[1]["message"]
        .as_str()
        .unwrap()
        .contains("'missing' not found"));
}
