//! Auth flow controller.
//!
//! State machine:
//!
//! ```text
//! Anonymous ──login──▶ Authenticated
//!     │                     ▲
//!     └──login──▶ AwaitingSecondFactor ──verify_second_factor──┘
//! Authenticated ──logout / refresh failure──▶ Anonymous
//! ```
//!
//! The controller keeps no state of its own: the session lives in the
//! [`SessionStore`] and the pending challenge is a value handed to the caller.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use cmsadmin_auth::{AccessCodes, MenuError, RouteNode, SessionStore, UserProfile, build_forest};
use cmsadmin_core::{AccessMode, Preferences};

use crate::api::{AdminApi, ApiError};
use crate::types::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
    TotpCodeRequest, TotpSecret, VerifyTotpRequest,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad username/password (backend message, verbatim).
    #[error("{0}")]
    Credential(String),

    /// Bad second-factor code (backend message, verbatim). The same challenge
    /// may be retried.
    #[error("{0}")]
    SecondFactor(String),

    /// Refresh failed; the local session has been cleared.
    #[error("session expired: {0}")]
    SessionExpired(ApiError),

    #[error("not authenticated")]
    NotAuthenticated,

    /// A newer login or a logout completed while this one was in flight.
    #[error("login superseded by a newer session change")]
    Superseded,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Transport(#[from] ApiError),
}

/// Observable state of the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    AwaitingSecondFactor,
    Authenticated,
}

/// Second-factor challenge produced by the password step.
///
/// Not `Clone`: [`AuthFlow::verify_second_factor`] borrows it so a wrong code
/// can be retried with the same challenge. Drop it once verification succeeds
/// or the user abandons the flow.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingChallenge {
    username: String,
    temp_token: String,
}

impl PendingChallenge {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn temp_token(&self) -> &str {
        &self.temp_token
    }
}

/// Result of the password step.
#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Token issued and stored in the session.
    Authenticated,
    /// A second factor is required; no session token is set yet.
    SecondFactorRequired(PendingChallenge),
}

impl LoginOutcome {
    pub fn state(&self) -> AuthState {
        match self {
            LoginOutcome::Authenticated => AuthState::Authenticated,
            LoginOutcome::SecondFactorRequired(_) => AuthState::AwaitingSecondFactor,
        }
    }
}

/// Orchestrates login, second factor, access loading, refresh and logout.
pub struct AuthFlow<A: AdminApi> {
    api: Arc<A>,
    session: SessionStore,
    prefs: Preferences,
}

impl<A: AdminApi> AuthFlow<A> {
    pub fn new(api: Arc<A>, session: SessionStore, prefs: Preferences) -> Self {
        Self { api, session, prefs }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Session-level state. `AwaitingSecondFactor` is carried by the
    /// [`LoginOutcome`] value, not by the store.
    pub fn state(&self) -> AuthState {
        if self.session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// Where to navigate after a completed login.
    pub fn landing_path(&self) -> &str {
        &self.prefs.default_home_path
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login
    // ─────────────────────────────────────────────────────────────────────

    /// Password step.
    ///
    /// On failure nothing is written to the session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        tenant: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        info!(username, tenant = tenant.unwrap_or(""), "login attempt");

        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            tenant: tenant.map(str::to_string),
        };
        let resp = self.api.login(&req).await.map_err(|e| match e {
            ApiError::Rejected { message, .. } => {
                warn!(username, "login rejected");
                AuthError::Credential(message)
            }
            other => AuthError::Transport(other),
        })?;

        if let Some(token) = resp.token.filter(|t| !t.is_empty()) {
            let instance = self.session.begin(token);
            info!(username, login_instance = instance, "authenticated");
            return Ok(LoginOutcome::Authenticated);
        }

        match (resp.require_totp, resp.temp_token) {
            (true, Some(temp_token)) if !temp_token.is_empty() => {
                info!(username, "second factor required");
                Ok(LoginOutcome::SecondFactorRequired(PendingChallenge {
                    username: username.to_string(),
                    temp_token,
                }))
            }
            (true, _) => Err(AuthError::MalformedResponse(
                "second factor required but no temp token issued".to_string(),
            )),
            (false, _) => Err(AuthError::MalformedResponse(
                "login response carried neither a token nor a second-factor challenge".to_string(),
            )),
        }
    }

    /// Second-factor step. On a wrong code the challenge stays usable.
    pub async fn verify_second_factor(
        &self,
        challenge: &PendingChallenge,
        code: &str,
    ) -> Result<(), AuthError> {
        let req = VerifyTotpRequest {
            code: code.trim().to_string(),
            temp_token: challenge.temp_token.clone(),
        };
        let resp = self.api.verify_totp(&req).await.map_err(|e| match e {
            ApiError::Rejected { message, .. } => {
                warn!(username = %challenge.username, "second factor rejected");
                AuthError::SecondFactor(message)
            }
            other => AuthError::Transport(other),
        })?;

        if resp.token.is_empty() {
            return Err(AuthError::MalformedResponse(
                "second-factor verification returned an empty token".to_string(),
            ));
        }

        let instance = self.session.begin(resp.token);
        info!(
            username = %challenge.username,
            login_instance = instance,
            "authenticated (second factor)"
        );
        Ok(())
    }

    fn token(&self) -> Result<String, AuthError> {
        self.session.access_token().ok_or(AuthError::NotAuthenticated)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Access loading
    // ─────────────────────────────────────────────────────────────────────

    /// Access codes of the authenticated user. An empty set is valid.
    pub async fn fetch_access_codes(&self) -> Result<AccessCodes, AuthError> {
        let token = self.token()?;
        let info = self.api.user_info(&token).await?;
        Ok(info.access_codes())
    }

    /// Authorized menu forest, transformed into routes.
    pub async fn fetch_menus(&self) -> Result<Vec<RouteNode>, AuthError> {
        let token = self.token()?;
        let nodes = self.api.user_menus(&token).await?;
        Ok(build_forest(&nodes)?)
    }

    /// Load profile, codes and menus, then install codes + menus in one
    /// store update. Returns the profile.
    ///
    /// In [`AccessMode::Frontend`] no menus are fetched; the host shell
    /// filters its own routes with the installed codes.
    pub async fn complete_login(&self) -> Result<UserProfile, AuthError> {
        let snapshot = self.session.snapshot();
        let instance = snapshot.login_instance();
        let token = snapshot
            .access_token()
            .ok_or(AuthError::NotAuthenticated)?
            .to_string();

        let (info, menus) = match self.prefs.access_mode {
            AccessMode::Backend => {
                let (info, nodes) =
                    tokio::try_join!(self.api.user_info(&token), self.api.user_menus(&token))?;
                (info, build_forest(&nodes)?)
            }
            AccessMode::Frontend => (self.api.user_info(&token).await?, Vec::new()),
        };
        let codes = info.access_codes();
        debug!(codes = codes.len(), menus = menus.len(), "access loaded");

        if !self.session.set_access(instance, codes, menus) {
            return Err(AuthError::Superseded);
        }
        Ok(info.into_profile(&self.prefs.default_home_path))
    }

    /// Re-enter a saved session. Any failure leaves the store cleared.
    pub async fn restore(&self, token: String) -> Result<UserProfile, AuthError> {
        self.session.begin(token);
        match self.complete_login().await {
            Ok(profile) => {
                info!(username = %profile.username, "session restored");
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "session restore failed");
                self.session.clear();
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Refresh / logout
    // ─────────────────────────────────────────────────────────────────────

    /// Renew the token using the implicit credential. Not retried: on failure
    /// the session is cleared and the caller must return to the login page.
    ///
    /// A token arriving after the session was cleared is discarded and
    /// `NotAuthenticated` is returned.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        match self.api.refresh().await {
            Ok(resp) if !resp.token.is_empty() => {
                if !self.session.renew_token(resp.token) {
                    debug!("refresh completed after the session was cleared; token dropped");
                    return Err(AuthError::NotAuthenticated);
                }
                debug!("token refreshed");
                Ok(())
            }
            Ok(_) => {
                warn!("refresh returned an empty token; clearing session");
                self.session.clear();
                Err(AuthError::SessionExpired(ApiError::Parse("empty token".to_string())))
            }
            Err(e) => {
                warn!(error = %e, "refresh failed; clearing session");
                self.session.clear();
                Err(AuthError::SessionExpired(e))
            }
        }
    }

    /// React to a request rejected with HTTP 401.
    ///
    /// Refreshes when `enable_refresh_token` is set; otherwise the session is
    /// cleared and the user must sign in again.
    pub async fn handle_unauthorized(&self) -> Result<(), AuthError> {
        if self.prefs.enable_refresh_token {
            return self.refresh().await;
        }
        warn!("access token rejected; clearing session");
        self.session.clear();
        Err(AuthError::SessionExpired(ApiError::Unauthorized))
    }

    /// Best-effort server-side logout; the local session is always cleared.
    pub async fn logout(&self) {
        if let Some(token) = self.session.access_token() {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "server-side logout failed");
            }
        }
        self.session.clear();
        info!("logged out");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Account security
    // ─────────────────────────────────────────────────────────────────────

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let token = self.token()?;
        let req = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.api.change_password(&token, &req).await?;
        Ok(())
    }

    pub async fn generate_totp(&self) -> Result<TotpSecret, AuthError> {
        let token = self.token()?;
        Ok(self.api.generate_totp(&token).await?)
    }

    pub async fn bind_totp(&self, code: &str) -> Result<(), AuthError> {
        let token = self.token()?;
        let req = TotpCodeRequest {
            code: code.trim().to_string(),
        };
        self.api.bind_totp(&token, &req).await.map_err(second_factor)
    }

    pub async fn disable_totp(&self, code: &str) -> Result<(), AuthError> {
        let token = self.token()?;
        let req = TotpCodeRequest {
            code: code.trim().to_string(),
        };
        self.api.disable_totp(&token, &req).await.map_err(second_factor)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let req = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.api.forgot_password(&req).await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let req = ResetPasswordRequest {
            email: email.to_string(),
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.api.reset_password(&req).await?;
        Ok(())
    }
}

fn second_factor(e: ApiError) -> AuthError {
    match e {
        ApiError::Rejected { message, .. } => AuthError::SecondFactor(message),
        other => AuthError::Transport(other),
    }
}
