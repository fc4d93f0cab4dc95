use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use parlor::{
    AppState, Config, app,
    model::{Message, MessageKind},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn fixture() -> (Router, AppState) {
    let state = AppState::new(Config::default());
    (app(state.clone()), state)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn text_message(room_id: &str, user_id: &str, content: &str) -> Message {
    Message {
        id: uuid::Uuid::new_v4(),
        kind: MessageKind::Text,
        content: content.to_owned(),
        user_id: user_id.to_owned(),
        username: format!("user-{user_id}"),
        room_id: room_id.to_owned(),
        timestamp: time::OffsetDateTime::now_utc(),
    }
}

#[tokio::test]
async fn create_room_is_idempotent_across_argument_order() {
    let (app, _) = fixture();

    let (status, first) = request(
        &app,
        "POST",
        "/api/chat/create",
        Some(json!({ "user1Id": "1", "user2Id": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["roomId"], "1-2");
    assert_eq!(first["room"]["isReported"], false);

    let (status, second) = request(
        &app,
        "POST",
        "/api/chat/create",
        Some(json!({ "user1Id": "2", "user2Id": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["roomId"], "1-2");
    // same room, not a fresh one
    assert_eq!(second["room"]["createdAt"], first["room"]["createdAt"]);
}

#[tokio::test]
async fn history_of_unknown_room_is_an_empty_list() {
    let (app, _) = fixture();

    let (status, body) = request(&app, "GET", "/api/chat/9-9/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn history_comes_back_in_append_order() {
    let (app, state) = fixture();
    state.registry.ensure_room("1", "2");
    state.log.append(text_message("1-2", "1", "hello"));
    state.log.append(text_message("1-2", "2", "hi yourself"));

    let (status, body) = request(&app, "GET", "/api/chat/1-2/messages", None).await;
    assert_eq!(status, StatusCode::OK);

    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["content"], "hello");
    assert_eq!(history[1]["content"], "hi yourself");
    assert_eq!(history[0]["type"], "text");
    assert!(history[0]["timestamp"].is_string());
}

#[tokio::test]
async fn report_on_unknown_room_is_not_found() {
    let (app, state) = fixture();

    let (status, body) = request(
        &app,
        "POST",
        "/api/chat/9-9/report",
        Some(json!({ "reason": "spam", "reportedBy": "9" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("9-9"));

    // the failed report must not have created the room
    assert!(state.registry.get("9-9").is_none());
}

#[tokio::test]
async fn reported_listing_joins_rooms_with_their_history() {
    let (app, state) = fixture();
    state.registry.ensure_room("1", "2");
    state.registry.ensure_room("3", "4");
    state.log.append(text_message("1-2", "1", "offending message"));

    let (status, body) = request(
        &app,
        "POST",
        "/api/chat/1-2/report",
        Some(json!({ "reason": "spam", "reportedBy": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, listing) = request(&app, "GET", "/api/admin/reported-chats", None).await;
    assert_eq!(status, StatusCode::OK);

    let flagged = listing.as_array().unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["id"], "1-2");
    assert_eq!(flagged[0]["reportReason"], "spam");
    assert_eq!(flagged[0]["messages"][0]["content"], "offending message");
}

#[tokio::test]
async fn repeated_report_overwrites_the_previous_one() {
    let (app, state) = fixture();
    state.registry.ensure_room("1", "2");

    for (reason, reporter) in [("spam", "1"), ("harassment", "2")] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/chat/1-2/report",
            Some(json!({ "reason": reason, "reportedBy": reporter })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, listing) = request(&app, "GET", "/api/admin/reported-chats", None).await;
    let flagged = listing.as_array().unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["reportReason"], "harassment");
    assert_eq!(flagged[0]["reportedBy"], "2");
}

#[tokio::test]
async fn upload_rejects_non_image_payloads() {
    let (app, _) = fixture();

    let body = concat!(
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"image\"; filename=\"notes.txt\"\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "not an image\r\n",
        "--boundary--\r\n",
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=boundary")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
