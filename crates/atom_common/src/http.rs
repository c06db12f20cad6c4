// --- File: crates/atom_common/src/http.rs ---
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::error::{AtomError, HttpStatusCode};

pub mod client;

/// Extension trait for AtomError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for AtomError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for AtomError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Convert a `Result<T, AtomError>` into a `Result<T, Response>`.
pub fn handle_result<T>(result: Result<T, AtomError>) -> Result<T, Response>
where
    T: IntoResponse,
{
    result.map_err(|err| err.into_response())
}

/// Convert a `Result<T, AtomError>` into a JSON response result.
pub fn handle_json_result<T>(result: Result<T, AtomError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Map a domain error into an HTTP response through a custom converter.
pub fn map_error<T, E, F>(result: Result<T, E>, f: F) -> Result<T, Response>
where
    T: IntoResponse,
    F: FnOnce(E) -> AtomError,
{
    result.map_err(|err| f(err).into_response())
}

/// 405 with an `Allow` header, as returned by the auth routes for wrong verbs.
pub fn method_not_allowed(allow: &'static str) -> Response {
    let mut response = AtomError::coded(
        "METHOD_NOT_ALLOWED",
        format!("Method Not Allowed. Use {}.", allow),
        405,
    )
    .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}

/// Build `{path}?k=v&k2=v2` with URL-encoded values.
pub fn redirect_with_flags(path: &str, flags: &[(&str, &str)]) -> Redirect {
    Redirect::to(&url_with_flags(path, flags))
}

/// The target string used by [`redirect_with_flags`].
pub fn url_with_flags(path: &str, flags: &[(&str, &str)]) -> String {
    if flags.is_empty() {
        return path.to_string();
    }
    let query = encode_pairs(flags);
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

fn encode_pairs(flags: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in flags {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_encoded() {
        assert_eq!(
            url_with_flags(
                "/Settings/UserViewSettings",
                &[("calendar_auth_error", "bad thing&more"), ("atom_agent", "true")]
            ),
            "/Settings/UserViewSettings?calendar_auth_error=bad+thing%26more&atom_agent=true"
        );
        assert_eq!(url_with_flags("/a?x=1", &[("y", "2")]), "/a?x=1&y=2");
    }

    #[test]
    fn method_not_allowed_sets_allow() {
        let response = method_not_allowed("POST");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
