use async_trait::async_trait;
use boleto_core::models::{AuthResponse, LoginRequest, RegisterRequest, User};

use crate::error::ApiError;
use crate::http::ApiClient;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError>;
    async fn user_by_id(&self, id: i64) -> Result<User, ApiError>;
}

#[derive(Clone)]
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for HttpAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        ApiClient::send_json(self.client.post("/auth/login").json(&body)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        ApiClient::send_json(self.client.post("/auth/register").json(request)).await
    }

    async fn user_by_id(&self, id: i64) -> Result<User, ApiError> {
        ApiClient::send_json(self.client.get(&format!("/auth/user/id/{}", id))).await
    }
}
