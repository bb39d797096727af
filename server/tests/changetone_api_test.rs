//! Tone-rewrite proxy integration tests
//!
//! Run with: cargo test -p server --test changetone_api_test

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use support::{json_response, post_json, setup_app, spawn_upstream, text_reply, TEST_API_KEY};

#[tokio::test]
async fn test_change_tone_concise() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("  Meeting moved to 3pm.\n")).await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"So basically the meeting is now going to be at 3pm","tone":"concise"}"#,
    );
    let (status, body, _) = json_response(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newText"], "Meeting moved to 3pm.");

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    let instruction = calls[0].body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(instruction.contains("clear and concise"));
    assert!(calls[0].body.get("generationConfig").is_none());
}

#[tokio::test]
async fn test_change_tone_unknown_tone_uses_generic_instruction() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("Oh, wonderful.")).await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"That is great.","tone":"sarcastic"}"#,
    );
    let (status, body, _) = json_response(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newText"], "Oh, wonderful.");

    let calls = upstream.calls();
    let instruction = calls[0].body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(instruction.contains("sarcastic"));
}

#[tokio::test]
async fn test_change_tone_requires_both_fields() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("x")).await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    for body in [
        r#"{"inputText":"hello"}"#,
        r#"{"tone":"friendly"}"#,
        r#"{"inputText":"","tone":"friendly"}"#,
        r#"{"inputText":"hello","tone":""}"#,
    ] {
        let (status, value, _) = json_response(&app, post_json("/api/changetone", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(value["error"], "inputText and tone are required");
    }
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_change_tone_empty_rewrite_is_valid() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("")).await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"um","tone":"concise"}"#,
    );
    let (status, body, _) = json_response(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newText"], "");
}

#[tokio::test]
async fn test_change_tone_missing_text_is_upstream_error() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        json!({ "candidates": [{ "content": { "parts": [{}] }, "finishReason": "STOP" }] }),
    )
    .await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"hello","tone":"friendly"}"#,
    );
    let (status, body, _) = json_response(&app, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Invalid response structure from Gemini API (missing text)."
    );
}

#[tokio::test]
async fn test_change_tone_missing_credential() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("x")).await;
    let app = setup_app(&upstream, None);

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"hello","tone":"professional"}"#,
    );
    let (status, body, _) = json_response(&app, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error");
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_change_tone_prompt_block_is_client_error() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
    )
    .await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = post_json(
        "/api/changetone",
        r#"{"inputText":"hello","tone":"friendly"}"#,
    );
    let (status, _, _) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_tone_wrong_method() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("x")).await;
    let app = setup_app(&upstream, Some(TEST_API_KEY));

    let req = Request::builder()
        .method("PUT")
        .uri("/api/changetone")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = json_response(&app, req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");
}
