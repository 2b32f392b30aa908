//! End-to-end tests for the `mailboard` binary.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn mailboard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mailboard"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MAILBOARD_CONFIG")
        .output()
        .unwrap()
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mailboard-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_header_round_trip() {
    let out = mailboard(&["header", "encode", "Grüße"]);
    assert!(out.status.success());
    let encoded = String::from_utf8(out.stdout).unwrap();
    assert!(encoded.starts_with("=?UTF-8?B?"));

    let out = mailboard(&["header", "decode", encoded.trim()]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap().trim(), "Grüße");
}

#[test]
fn test_decode_file() {
    let path = temp_file(
        "message.json",
        r#"{
            "id": "m1",
            "threadId": "t1",
            "labelIds": ["STARRED", "TRASH"],
            "internalDate": "1700000000000",
            "payload": {
                "mimeType": "text/plain",
                "headers": [{ "name": "Subject", "value": "=?UTF-8?B?***?=" }],
                "body": { "data": "aGVsbG8" }
            }
        }"#,
    );

    let out = mailboard(&["decode", path.to_str().unwrap()]);
    assert!(out.status.success());

    let email: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(email["id"], "m1");
    assert_eq!(email["folder"], "trash");
    assert_eq!(email["starred"], true);
    assert_eq!(email["body"], "hello");
    assert_eq!(email["date"], "2023-11-14T22:13:20Z");

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("WARN"));
}

#[test]
fn test_compose_rfc2822() {
    let attachment = temp_file("hello.txt", "hi there");
    let attach = format!("{}:text/plain", attachment.display());

    let out = mailboard(&[
        "compose",
        "--to",
        "a@example.com",
        "-s",
        "Status",
        "-b",
        "<p>All good</p>",
        "-a",
        &attach,
        "--rfc2822",
    ]);
    assert!(out.status.success());

    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.starts_with("To: a@example.com\r\nSubject: Status\r\n"));
    assert!(text.contains("Content-Type: multipart/mixed; boundary=\"mailboard_"));
    assert!(text.contains("Content-Type: text/html; charset=UTF-8\r\n"));
    assert!(text.contains("Content-Disposition: attachment; filename=\"hello.txt\"\r\n"));
    assert!(text.contains("aGkgdGhlcmU="));
}

#[test]
fn test_missing_file_fails() {
    let out = mailboard(&["decode", "/nonexistent/mailboard.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("Failed to read"));
}
