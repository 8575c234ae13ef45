//! `reqwest`-backed implementation of [`AdminApi`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use cmsadmin_auth::{BackendMenuNode, UserInfoPayload};

use crate::api::{AdminApi, ApiError};
use crate::types::{
    ChangePasswordRequest, Envelope, ForgotPasswordRequest, LoginRequest, LoginResponse,
    ResetPasswordRequest, TokenResponse, TotpCodeRequest, TotpSecret, VerifyTotpRequest,
};

/// HTTP client for the admin backend.
///
/// The underlying client keeps a cookie store so the refresh credential set by
/// the backend on login is sent back on `POST /auth/refresh`.
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAdminApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and unwrap the envelope; `data` must be present.
    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        self.envelope::<T>(req)
            .await?
            .data
            .ok_or_else(|| ApiError::Parse("response envelope has no data".to_string()))
    }

    /// Send and check the envelope, ignoring any `data`.
    async fn ack(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.envelope::<Value>(req).await.map(|_| ())
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let body = resp.text().await.map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            // Error statuses usually still carry an envelope with a message.
            return Err(match serde_json::from_str::<Envelope<Value>>(&body) {
                Ok(env) if !env.message.is_empty() => ApiError::rejected(env.code, env.message),
                _ => ApiError::Http(status.as_u16(), body),
            });
        }

        let env: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;
        if !env.is_success() {
            return Err(ApiError::rejected(env.code, env.message));
        }
        Ok(env)
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.fetch(self.client.post(self.url("/auth/login")).json(req)).await
    }

    async fn verify_totp(&self, req: &VerifyTotpRequest) -> Result<TokenResponse, ApiError> {
        self.fetch(self.client.post(self.url("/auth/verify-totp")).json(req))
            .await
    }

    async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.fetch(self.client.post(self.url("/auth/refresh"))).await
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/auth/logout")).bearer_auth(token))
            .await
    }

    async fn user_info(&self, token: &str) -> Result<UserInfoPayload, ApiError> {
        self.fetch(self.client.get(self.url("/auth/user-info")).bearer_auth(token))
            .await
    }

    async fn user_menus(&self, token: &str) -> Result<Vec<BackendMenuNode>, ApiError> {
        self.fetch(self.client.get(self.url("/menus/user")).bearer_auth(token))
            .await
    }

    async fn change_password(
        &self,
        token: &str,
        req: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.ack(
            self.client
                .put(self.url("/auth/password"))
                .bearer_auth(token)
                .json(req),
        )
        .await
    }

    async fn generate_totp(&self, token: &str) -> Result<TotpSecret, ApiError> {
        self.fetch(
            self.client
                .post(self.url("/auth/totp/generate"))
                .bearer_auth(token),
        )
        .await
    }

    async fn bind_totp(&self, token: &str, req: &TotpCodeRequest) -> Result<(), ApiError> {
        self.ack(
            self.client
                .post(self.url("/auth/totp/bind"))
                .bearer_auth(token)
                .json(req),
        )
        .await
    }

    async fn disable_totp(&self, token: &str, req: &TotpCodeRequest) -> Result<(), ApiError> {
        self.ack(
            self.client
                .post(self.url("/auth/totp/disable"))
                .bearer_auth(token)
                .json(req),
        )
        .await
    }

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/auth/forgot-password")).json(req))
            .await
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.ack(self.client.post(self.url("/auth/reset-password")).json(req))
            .await
    }
}
