use boleto_core::SessionHandle;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Shared plumbing for all gateways: one `reqwest::Client`, the configured
/// backend base URL, and the session handle whose token is attached as a
/// bearer credential when present. Each call is exactly one round trip — no
/// retries, no caching.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionHandle) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token if a session is active; otherwise the
    /// request goes out unauthenticated and the server decides.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.patch(self.url(path)))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.delete(self.url(path)))
    }

    /// Maps error statuses to the gateway taxonomy before handing the
    /// response back.
    pub async fn expect_ok(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected as unauthorized");
            return Err(ApiError::Unauthorized);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), message, "Backend returned an error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::expect_ok(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Sends the request and discards the body; used where the backend's
    /// reply is a confirmation message the caller has no use for.
    pub async fn send_unit(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::expect_ok(builder.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boleto_core::models::{RoleType, User};
    use boleto_core::store::MemoryCredentialStore;
    use std::sync::Arc;

    fn session() -> SessionHandle {
        SessionHandle::new(Arc::new(MemoryCredentialStore::new()))
    }

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role_type: RoleType::Customer,
            enabled: true,
            created_at: None,
        }
    }

    #[test]
    fn requests_carry_bearer_token_after_login() {
        let session = session();
        session.login(sample_user(), "abc".into()).unwrap();

        let client = ApiClient::new("http://localhost:8080/api", session);
        let request = client.get("/events/active").build().unwrap();

        let auth = request.headers().get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn requests_are_unauthenticated_after_logout() {
        let session = session();
        session.login(sample_user(), "abc".into()).unwrap();
        session.logout().unwrap();

        let client = ApiClient::new("http://localhost:8080/api", session);
        let request = client.get("/events/active").build().unwrap();

        assert!(request.headers().get("authorization").is_none());
    }

    #[tokio::test]
    async fn error_statuses_map_to_the_gateway_taxonomy() {
        let unauthorized = http::Response::builder().status(401).body("").unwrap();
        let err = ApiClient::expect_ok(reqwest::Response::from(unauthorized))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let conflict = http::Response::builder()
            .status(409)
            .body("already captured")
            .unwrap();
        match ApiClient::expect_ok(reqwest::Response::from(conflict))
            .await
            .unwrap_err()
        {
            ApiError::Status { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "already captured");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/api/", session());
        let request = client.get("/events/active").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/api/events/active"
        );
    }
}
