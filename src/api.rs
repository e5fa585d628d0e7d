//! HTTP API endpoints.
//!
//! Room creation for the TV screen, a word check for the controller and a
//! read-only room lookup.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;
use crate::validation::WordCheck;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_code: String,
    /// Link a phone opens to join as a player
    pub join_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateWordQuery {
    pub word: Option<String>,
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-room", get(create_room))
        .route("/validate-word", get(validate_word))
        .route("/rooms/{code}", get(get_room))
}

/// Build the controller link from the request's own host, honouring a
/// reverse proxy's scheme.
fn join_url(headers: &HeaderMap, room_code: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}/controller?room={}", proto, host, room_code)
}

/// Create a room.
///
/// GET /api/create-room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<CreateRoomResponse> {
    let handle = state.create_room().await;
    let join_url = join_url(&headers, &handle.code);
    Json(CreateRoomResponse {
        room_code: handle.code,
        join_url,
    })
}

/// Check a word the same way answer submission does.
///
/// GET /api/validate-word?word=...
pub async fn validate_word(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateWordQuery>,
) -> Json<WordCheck> {
    match query.word.as_deref().map(str::trim) {
        Some(word) if !word.is_empty() => Json(state.validator.validate(word)),
        _ => Json(WordCheck::rejected("No word provided")),
    }
}

/// Current snapshot of a room.
///
/// GET /api/rooms/{code}
pub async fn get_room(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match state.get_room(&code).await {
        Some(handle) => {
            let snapshot = handle.slot.lock().await.room.snapshot();
            Json(snapshot).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Room not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new());
        (router().with_state(state.clone()), state)
    }

    async fn get_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[test]
    fn test_join_url_uses_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "game.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(
            join_url(&headers, "ABCD"),
            "https://game.example.com/controller?room=ABCD"
        );

        assert_eq!(
            join_url(&HeaderMap::new(), "ABCD"),
            "http://localhost/controller?room=ABCD"
        );
    }

    #[tokio::test]
    async fn test_create_room_endpoint() {
        let (app, state) = app();
        let request = Request::builder()
            .uri("/create-room")
            .header("host", "localhost:3000")
            .body(Body::empty())
            .unwrap();

        let (status, json) = get_json(app, request).await;

        assert_eq!(status, StatusCode::OK);
        let code = json["room_code"].as_str().unwrap();
        assert_eq!(code.len(), 4);
        assert_eq!(
            json["join_url"],
            format!("http://localhost:3000/controller?room={}", code)
        );
        assert!(state.get_room(code).await.is_some());
    }

    #[tokio::test]
    async fn test_validate_word_endpoint() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/validate-word")
            .body(Body::empty())
            .unwrap();
        let (status, json) = get_json(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "No word provided");

        let request = Request::builder()
            .uri("/validate-word?word=3M")
            .body(Body::empty())
            .unwrap();
        let (_, json) = get_json(app, request).await;
        assert_eq!(json["valid"], true);
        assert!(json.get("reason").is_none());
    }

    #[tokio::test]
    async fn test_get_room_endpoint() {
        let (app, state) = app();
        let handle = state.create_room().await;

        let request = Request::builder()
            .uri(format!("/rooms/{}", handle.code.to_lowercase()))
            .body(Body::empty())
            .unwrap();
        let (status, json) = get_json(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["room_code"], handle.code.as_str());
        assert_eq!(json["phase"], "LOBBY");

        let request = Request::builder()
            .uri("/rooms/0000")
            .body(Body::empty())
            .unwrap();
        let (status, _) = get_json(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
