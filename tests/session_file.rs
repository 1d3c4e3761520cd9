use std::fs;

use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postperson_tui::models::Field;
use postperson_tui::network::{create_client, NetworkActor};
use postperson_tui::{
    NetworkCommand, Outcome, SessionCommand, SessionController, SessionDocument, SessionError,
};

fn compiled(doc: &SessionDocument) -> serde_json::Value {
    serde_json::to_value(doc.compile()).unwrap()
}

#[test]
fn test_new_session_add_save_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.json");

    let mut doc = SessionDocument::open(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

    doc.add_record();
    assert_eq!(
        compiled(&doc),
        json!([{"name": "Name", "method": "GET", "url": "", "headers": {}, "body": ""}])
    );
    doc.save().unwrap();

    let reopened = SessionDocument::open(&path).unwrap();
    assert_eq!(reopened.compile(), doc.compile());
    assert!(!reopened.is_dirty());
}

#[test]
fn test_round_trip_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    let content = json!([
        {"name": "Login", "method": "POST", "url": "https://api.test/login",
         "headers": {"Content-Type": "application/json", "Accept": "*/*"},
         "body": "{\"user\": \"bob\"}"},
        {"url": "http://localhost:8080/health"},
        {"name": "Drop", "method": "DELETE", "headers": null}
    ]);
    fs::write(&path, content.to_string()).unwrap();

    let doc = SessionDocument::open(&path).unwrap();
    assert_eq!(
        compiled(&doc),
        json!([
            {"name": "Login", "method": "POST", "url": "https://api.test/login",
             "headers": {"Content-Type": "application/json", "Accept": "*/*"},
             "body": "{\"user\": \"bob\"}"},
            {"name": "Name", "method": "GET", "url": "http://localhost:8080/health",
             "headers": {}, "body": ""},
            {"name": "Drop", "method": "DELETE", "url": "", "headers": {}, "body": ""}
        ])
    );

    let keys: Vec<&str> = doc.records()[0].definition.headers.keys().collect();
    assert_eq!(keys, vec!["Content-Type", "Accept"]);
}

#[test]
fn test_saved_state_matches_reopened_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    fs::write(&path, r#"[{"name": "A"}, {"name": "B"}, {"name": "C"}]"#).unwrap();

    let mut doc = SessionDocument::open(&path).unwrap();
    doc.delete_record(0).unwrap();
    doc.set_field(0, Field::Url, "http://localhost/b").unwrap();
    doc.set_header(1, "X-Trace", "1").unwrap();
    assert!(doc.is_dirty());
    doc.save().unwrap();
    assert!(!doc.is_dirty());

    // Edits after the save are not on disk
    doc.add_record();

    let reopened = SessionDocument::open(&path).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.records()[0].definition.name, "B");
    assert_eq!(reopened.records()[0].definition.url, "http://localhost/b");
    assert_eq!(reopened.records()[1].definition.headers.get("X-Trace"), Some("1"));
}

#[test]
fn test_delete_shifts_later_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    fs::write(&path, r#"[{"name": "A"}, {"name": "B"}]"#).unwrap();

    let mut doc = SessionDocument::open(&path).unwrap();
    doc.delete_record(0).unwrap();
    assert_eq!(compiled(&doc)[0]["name"], "B");

    let err = doc.delete_record(5).unwrap_err();
    assert_eq!(err, SessionError::IndexOutOfRange { index: 5, len: 1 });
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_empty_header_key_leaves_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    fs::write(&path, r#"[{"name": "A"}]"#).unwrap();

    let mut doc = SessionDocument::open(&path).unwrap();
    let before = doc.compile();
    assert!(matches!(
        doc.set_header(0, "", "value"),
        Err(SessionError::InvalidHeader(_))
    ));
    assert_eq!(doc.compile(), before);
    assert!(!doc.is_dirty());
}

#[test]
fn test_malformed_files_do_not_open() {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in [
        ("object.json", r#"{"name": "A"}"#),
        ("truncated.json", r#"[{"name": "A""#),
        ("scalar.json", r#"[1, 2]"#),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        assert!(
            matches!(
                SessionDocument::open(&path),
                Err(SessionError::MalformedDocument { .. })
            ),
            "{} should be rejected",
            name
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}

#[tokio::test]
async fn test_send_through_network_actor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("s.json");
    let content = json!([{"name": "Status", "url": format!("{}/status", server.uri())}]);
    fs::write(&session_path, content.to_string()).unwrap();

    let mut controller = SessionController::new(SessionDocument::open(&session_path).unwrap());

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
    let actor = tokio::spawn(NetworkActor::new(create_client(None), resp_tx).run(cmd_rx));

    let cmd = match controller.handle(SessionCommand::Send(0)) {
        Outcome::Dispatched(cmd) => cmd,
        other => panic!("expected dispatch, got {:?}", other),
    };
    cmd_tx.send(cmd).unwrap();

    let response = resp_rx.recv().await.unwrap();
    assert_eq!(controller.on_response(response), Some(0));

    let record = &controller.document().records()[0];
    assert!(!record.is_loading());
    let last = record.last_response.as_ref().unwrap();
    assert_eq!(last.status, 503);
    assert_eq!(last.body, "down");
    // Sending is not an edit
    assert!(!controller.is_dirty());

    cmd_tx.send(NetworkCommand::Shutdown).unwrap();
    actor.await.unwrap();
}
