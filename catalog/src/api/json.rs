//! JSON body extractor whose rejections are [`Error::BadRequest`].
//!
//! axum's own `Json` rejects a well-formed body with mistyped fields as 422. Handlers here use
//! this wrapper so every malformed body is a plain-text 400 like the other validation failures.

use crate::errors::Error;
use axum::extract::{FromRequest, rejection::JsonRejection};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest {
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;

    #[derive(Deserialize, Serialize)]
    struct Named {
        name: String,
    }

    async fn echo(Json(body): Json<Named>) -> Json<Named> {
        Json(body)
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_round_trips() {
        let response = server().post("/").json(&serde_json::json!({"name": "Lighting"})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["name"], "Lighting");
    }

    #[tokio::test]
    async fn test_rejections_are_bad_requests() {
        let server = server();

        let response = server.post("/").json(&serde_json::json!({"name": 5})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("invalid type"));

        let response = server.post("/").text("{not json").content_type("application/json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
