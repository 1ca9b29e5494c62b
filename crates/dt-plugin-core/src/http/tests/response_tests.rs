use http::StatusCode;
use serde_json::{json, Value};

use crate::http::{Content, Response};

#[test]
fn test_json_response_round_trip() {
    let payload = json!({"message": "hello", "items": [1, 2]});
    let response = Response::json(&payload);

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.is_json());
    let decoded: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_content_chooses_encoding() {
    assert!(Response::content(json!(["a"])).is_json());
    assert!(!Response::content("plain").is_json());
    assert_eq!(Content::from(json!("text")), Content::Text("text".to_string()));
    assert_eq!(Content::from(json!(42)), Content::Text("42".to_string()));
}

#[test]
fn test_headers_are_case_insensitive() {
    let response = Response::new().with_header("X-Custom", "yes").unwrap();
    assert_eq!(response.header("x-custom"), Some("yes"));
    assert!(Response::new().with_header("bad header", "x").is_err());
}

#[test]
fn test_redirect_and_errors() {
    let redirect = Response::redirect("/wp-admin/admin.php?page=dt-plugin", StatusCode::FOUND).unwrap();
    assert_eq!(redirect.status(), StatusCode::FOUND);
    assert_eq!(redirect.header("location"), Some("/wp-admin/admin.php?page=dt-plugin"));

    let forbidden = Response::forbidden("nope");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body_text(), "nope");
}

#[test]
fn test_write_appends() {
    let response = Response::html("a").write("b").write("c");
    assert_eq!(response.body_text(), "abc");
}
