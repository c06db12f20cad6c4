// --- File: crates/atom_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError, Response};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client shared by every vendor integration.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});

/// Creates a new HTTP client with custom configuration.
///
/// # Arguments
///
/// * `timeout_secs` - The timeout in seconds for the client
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}

/// GET with a bearer token.
pub async fn get_bearer(url: &str, token: &str) -> Result<Response, ReqwestError> {
    HTTP_CLIENT.get(url).bearer_auth(token).send().await
}

/// POST a JSON body with a bearer token.
pub async fn post_bearer<T: serde::Serialize + ?Sized>(
    url: &str,
    token: &str,
    body: &T,
) -> Result<Response, ReqwestError> {
    HTTP_CLIENT.post(url).bearer_auth(token).json(body).send().await
}

/// POST a form body, optionally with HTTP Basic client credentials.
pub async fn post_form<T: serde::Serialize + ?Sized>(
    url: &str,
    form: &T,
    basic_auth: Option<(&str, &str)>,
) -> Result<Response, ReqwestError> {
    let mut request = HTTP_CLIENT
        .post(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(form);
    if let Some((user, password)) = basic_auth {
        request = request.basic_auth(user, Some(password));
    }
    request.send().await
}
