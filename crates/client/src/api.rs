//! Backend boundary used by the auth flow.
//!
//! The transport is a collaborator: the flow only sees this trait, so tests
//! run against an in-memory implementation and the console against
//! [`crate::http::HttpAdminApi`].

use async_trait::async_trait;
use thiserror::Error;

use cmsadmin_auth::{BackendMenuNode, UserInfoPayload};

use crate::types::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
    ResetPasswordRequest, TokenResponse, TotpCodeRequest, TotpSecret, VerifyTotpRequest,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with a non-zero envelope code. `message` is shown
    /// to the user verbatim.
    #[error("{message}")]
    Rejected { code: i64, message: String },

    /// HTTP 401: the bearer token (or refresh credential) is not accepted.
    #[error("unauthorized")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

/// Calls the auth flow needs. Authenticated calls take the bearer token
/// explicitly; the implementation keeps no session state of its own.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError>;

    async fn verify_totp(&self, req: &VerifyTotpRequest) -> Result<TokenResponse, ApiError>;

    /// Exchange the implicit (cookie) credential for a new token.
    async fn refresh(&self) -> Result<TokenResponse, ApiError>;

    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    async fn user_info(&self, token: &str) -> Result<UserInfoPayload, ApiError>;

    /// Menu forest the user is authorized to see.
    async fn user_menus(&self, token: &str) -> Result<Vec<BackendMenuNode>, ApiError>;

    async fn change_password(
        &self,
        token: &str,
        req: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;

    async fn generate_totp(&self, token: &str) -> Result<TotpSecret, ApiError>;

    async fn bind_totp(&self, token: &str, req: &TotpCodeRequest) -> Result<(), ApiError>;

    async fn disable_totp(&self, token: &str, req: &TotpCodeRequest) -> Result<(), ApiError>;

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<(), ApiError>;

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ApiError>;
}
