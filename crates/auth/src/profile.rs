use serde::{Deserialize, Serialize};

use cmsadmin_core::{TenantId, UserId};

use crate::{AccessCodes, Role};

/// `GET /auth/user-info` payload as sent by the backend.
///
/// Every field except `id` may be absent; defaults are applied by
/// [`UserInfoPayload::into_profile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoPayload {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub totp_enabled: Option<bool>,
    #[serde(default)]
    pub email_notify: Option<i8>,
    #[serde(default)]
    pub is_admin: Option<i8>,
}

impl UserInfoPayload {
    /// Access codes granted to the user; absent means none (fully restricted).
    pub fn access_codes(&self) -> AccessCodes {
        self.permissions.iter().flatten().cloned().collect()
    }

    /// Map the payload to the console's profile model.
    pub fn into_profile(self, home_path: &str) -> UserProfile {
        let real_name = match self.nickname.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => self.username.clone(),
        };

        UserProfile {
            user_id: self.id.to_string(),
            username: self.username,
            real_name,
            avatar: self.avatar.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            tenant_id: self.tenant_id,
            roles: self.roles.unwrap_or_default(),
            home_path: home_path.to_string(),
            totp_enabled: self.totp_enabled.unwrap_or(false),
            email_notify: self.email_notify.unwrap_or(1),
            is_admin: self.is_admin.unwrap_or(0),
        }
    }
}

/// The authenticated user as the console presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    /// Nickname, or the username when no nickname is set.
    pub real_name: String,
    pub avatar: String,
    pub email: String,
    pub phone: String,
    pub tenant_id: Option<TenantId>,
    pub roles: Vec<Role>,
    pub home_path: String,
    pub totp_enabled: bool,
    pub email_notify: i8,
    pub is_admin: i8,
}

impl UserProfile {
    pub fn is_super_admin(&self) -> bool {
        self.roles.iter().any(Role::is_super_admin)
    }
}
