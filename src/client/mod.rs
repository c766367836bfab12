//! HTTP client for the PocketBase REST API.
//!
//! One [`PocketBaseClient`] holds the base URL, the auth store and the retry
//! policy. Applications normally keep a single process-wide instance, see
//! [`handle`].

pub mod auth;
pub mod filter;
pub mod handle;
pub mod retry;
pub mod urls;

use crate::domain::model::{AdminCredentials, AuthSession, Collection, ListPage, Record};
use crate::utils::error::{KitError, Result};
use crate::utils::validation::validate_url;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::RwLock;
use std::time::Duration;

pub use retry::RetryPolicy;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_AUTH_COLLECTION: &str = "users";
/// Page size used when listing collections.
pub const COLLECTIONS_PAGE_SIZE: u32 = 200;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_collection: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_collection: DEFAULT_AUTH_COLLECTION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_auth_collection(mut self, collection: impl Into<String>) -> Self {
        self.auth_collection = collection.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Query parameters for `GET /api/collections/{name}/records`.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    pub page: u32,
    pub per_page: u32,
    pub filter: Option<String>,
    pub skip_total: bool,
}

impl RecordQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            filter: None,
            skip_total: false,
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        if self.skip_total {
            params.push(("skipTotal", "1".to_string()));
        }
        params
    }
}

pub struct PocketBaseClient {
    http: Client,
    base_url: String,
    auth_collection: String,
    retry: RetryPolicy,
    session: RwLock<Option<AuthSession>>,
}

impl PocketBaseClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_url("base_url", &config.base_url)?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_collection: config.auth_collection,
            retry: config.retry,
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_collection(&self) -> &str {
        &self.auth_collection
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    pub(crate) fn store_session(&self, session: AuthSession) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
    }

    pub(crate) fn clear_session(&self) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Single attempt; non-2xx statuses become [`KitError::ApiError`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        check_response(self.authorize(request).send().await?).await
    }

    /// Like [`send`](Self::send) but repeats the request on 429/503 according
    /// to the retry policy. `build` is called once per attempt.
    pub(crate) async fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 1;
        let mut backoff = self.retry.initial_backoff;

        loop {
            let response = self.authorize(build()).send().await?;
            let status = response.status();

            if self.retry.should_retry(status, attempt) {
                tracing::debug!(
                    "Retrying after HTTP {} (attempt {}/{}, waiting {:?})",
                    status.as_u16(),
                    attempt,
                    self.retry.max_attempts,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = self.retry.next_backoff(backoff);
                attempt += 1;
                continue;
            }

            return check_response(response).await;
        }
    }

    /// Authenticates as an admin and keeps the token for later requests.
    pub async fn authenticate_admin(&self, credentials: &AdminCredentials) -> Result<()> {
        tracing::debug!("Authenticating admin {}", credentials.email);
        let response = self
            .send(
                self.http
                    .post(self.url("/api/admins/auth-with-password"))
                    .json(&serde_json::json!({
                        "identity": credentials.email,
                        "password": credentials.password,
                    })),
            )
            .await?;

        let payload: serde_json::Value = response.json().await?;
        let token = payload
            .get("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| KitError::AuthError {
                message: "Authentication response missing token".to_string(),
            })?;

        self.store_session(AuthSession {
            token: token.to_string(),
            record: payload.get("admin").cloned(),
            is_admin: true,
        });
        tracing::info!("🔑 Authenticated as admin {}", credentials.email);
        Ok(())
    }

    /// Every collection on the server, following pagination.
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let mut collections = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .send(self.http.get(self.url("/api/collections")).query(&[
                    ("page", page.to_string()),
                    ("perPage", COLLECTIONS_PAGE_SIZE.to_string()),
                ]))
                .await?;
            let payload: ListPage<Collection> = response.json().await?;
            let fetched = payload.items.len();
            collections.extend(payload.items);

            let total = if payload.total_items > 0 {
                payload.total_items
            } else {
                collections.len() as i64
            };
            if i64::from(page) * i64::from(COLLECTIONS_PAGE_SIZE) >= total || fetched == 0 {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} collections", collections.len());
        Ok(collections)
    }

    pub async fn list_records(&self, collection: &str, query: &RecordQuery) -> Result<ListPage<Record>> {
        let url = self.records_url(collection);
        let params = query.to_params();
        let response = self
            .send_with_retry(|| self.http.get(&url).query(&params))
            .await?;
        Ok(response.json().await?)
    }

    /// First record matching `filter`, without counting the total.
    pub async fn find_first(&self, collection: &str, filter: &str) -> Result<Option<Record>> {
        let query = RecordQuery {
            page: 1,
            per_page: 1,
            filter: Some(filter.to_string()),
            skip_total: true,
        };
        let page = self.list_records(collection, &query).await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn create_record(&self, collection: &str, data: &Record) -> Result<StatusCode> {
        let url = self.records_url(collection);
        let response = self
            .send_with_retry(|| self.http.post(&url).json(data))
            .await?;
        Ok(response.status())
    }

    pub async fn update_record(&self, collection: &str, id: &str, data: &Record) -> Result<StatusCode> {
        let url = format!("{}/{}", self.records_url(collection), id);
        let response = self
            .send_with_retry(|| self.http.patch(&url).json(data))
            .await?;
        Ok(response.status())
    }

    fn records_url(&self, collection: &str) -> String {
        self.url(&format!("/api/collections/{}/records", collection))
    }
}

/// Returns the response unchanged on success, otherwise the status and body
/// as [`KitError::ApiError`].
pub async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(KitError::ApiError {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> PocketBaseClient {
        let config = ClientConfig::new(server.base_url()).with_retry(RetryPolicy::immediate(3));
        PocketBaseClient::new(config).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PocketBaseClient::new(ClientConfig::new("http://127.0.0.1:8090/")).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8090");
        assert_eq!(client.url("/api/health"), "http://127.0.0.1:8090/api/health");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(PocketBaseClient::new(ClientConfig::new("127.0.0.1:8090")).is_err());
    }

    #[tokio::test]
    async fn test_admin_auth_stores_token() {
        let server = MockServer::start();
        let auth_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/admins/auth-with-password")
                .json_body(json!({"identity": "admin@example.com", "password": "secret"}));
            then.status(200)
                .json_body(json!({"token": "admin-token", "admin": {"id": "a1"}}));
        });
        let collections_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/collections")
                .header("Authorization", "Bearer admin-token");
            then.status(200).json_body(json!({"page": 1, "totalItems": 0, "items": []}));
        });

        let client = client_for(&server);
        client
            .authenticate_admin(&AdminCredentials {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        client.list_collections().await.unwrap();

        auth_mock.assert();
        collections_mock.assert();
        assert!(client.session().unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_admin_auth_without_token_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/admins/auth-with-password");
            then.status(200).json_body(json!({"admin": {"id": "a1"}}));
        });

        let client = client_for(&server);
        let err = client
            .authenticate_admin(&AdminCredentials {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, KitError::AuthError { .. }));
        assert!(!client.is_signed_in());
    }

    #[tokio::test]
    async fn test_list_collections_follows_pages() {
        let server = MockServer::start();
        let first_page: Vec<_> = (0..200).map(|i| json!({"name": format!("c{:03}", i)})).collect();
        let page_one = server.mock(|when, then| {
            when.method(GET).path("/api/collections").query_param("page", "1");
            then.status(200)
                .json_body(json!({"page": 1, "totalItems": 201, "items": first_page}));
        });
        let page_two = server.mock(|when, then| {
            when.method(GET).path("/api/collections").query_param("page", "2");
            then.status(200)
                .json_body(json!({"page": 2, "totalItems": 201, "items": [{"name": "z_last"}]}));
        });

        let client = client_for(&server);
        let collections = client.list_collections().await.unwrap();

        page_one.assert();
        page_two.assert();
        assert_eq!(collections.len(), 201);
        assert_eq!(collections[200].name, "z_last");
    }

    #[tokio::test]
    async fn test_retry_exhausted_on_service_unavailable() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/collections/posts/records");
            then.status(503).body("busy");
        });

        let client = client_for(&server);
        let err = client.create_record("posts", &Record::new()).await.unwrap_err();

        mock.assert_hits(3);
        match err {
            KitError::ApiError { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/collections/posts/records");
            then.status(400).body(r#"{"message":"invalid"}"#);
        });

        let client = client_for(&server);
        let err = client.create_record("posts", &Record::new()).await.unwrap_err();

        mock.assert_hits(1);
        assert!(matches!(err, KitError::ApiError { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_find_first_sends_filter_and_skip_total() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/collections/users/records")
                .query_param("page", "1")
                .query_param("perPage", "1")
                .query_param("filter", r#"email = "a@b.c""#)
                .query_param("skipTotal", "1");
            then.status(200)
                .json_body(json!({"page": 1, "totalItems": -1, "items": [{"id": "u1"}]}));
        });

        let client = client_for(&server);
        let found = client
            .find_first("users", r#"email = "a@b.c""#)
            .await
            .unwrap()
            .unwrap();

        mock.assert();
        assert_eq!(found["id"], "u1");
    }
}
