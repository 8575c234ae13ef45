//! Client preferences (externally supplied configuration).
//!
//! Values come from defaults, then environment variables, then an optional
//! JSON overrides document. Only the keys present in an override replace the
//! current value.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

pub const DEFAULT_HOME_PATH: &str = "/dashboard/analytics";
pub const DEFAULT_LOCALE: &str = "zh";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

/// Where the navigation tree comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Menus are fetched from the backend and authorized server-side.
    #[default]
    Backend,
    /// Routes are declared by the host shell; only access codes are loaded
    /// and the shell filters its own routes with them.
    Frontend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub app_name: String,
    pub api_base_url: String,
    pub access_mode: AccessMode,
    /// Whether an expired token is renewed via the refresh endpoint or the
    /// user is sent back to the login page.
    pub enable_refresh_token: bool,
    pub locale: String,
    /// Landing route used after a successful login.
    pub default_home_path: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            app_name: "CMS Admin".to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            access_mode: AccessMode::Backend,
            enable_refresh_token: false,
            locale: DEFAULT_LOCALE.to_string(),
            default_home_path: DEFAULT_HOME_PATH.to_string(),
        }
    }
}

/// Partial preferences; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceOverrides {
    app_name: Option<String>,
    api_base_url: Option<String>,
    access_mode: Option<AccessMode>,
    enable_refresh_token: Option<bool>,
    locale: Option<String>,
    default_home_path: Option<String>,
}

impl Preferences {
    /// Build preferences from `CMSADMIN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build preferences from an arbitrary key lookup (testable form of
    /// [`Preferences::from_env`]).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut prefs = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("CMSADMIN_APP_NAME") {
            prefs.app_name = v;
        }
        if let Some(v) = non_empty("CMSADMIN_API_URL") {
            prefs.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty("CMSADMIN_HOME_PATH") {
            prefs.default_home_path = v;
        }
        if let Some(v) = non_empty("CMSADMIN_LOCALE") {
            prefs.locale = v;
        }
        if let Some(v) = non_empty("CMSADMIN_REFRESH_TOKEN") {
            prefs.enable_refresh_token = matches!(v.trim(), "1" | "true" | "TRUE" | "yes");
        }
        prefs
    }

    /// Apply a JSON overrides document on top of the current values.
    pub fn merge_overrides(mut self, json: &str) -> DomainResult<Self> {
        let o: PreferenceOverrides = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("preferences: {e}")))?;

        if let Some(v) = o.app_name {
            self.app_name = v;
        }
        if let Some(v) = o.api_base_url {
            self.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = o.access_mode {
            self.access_mode = v;
        }
        if let Some(v) = o.enable_refresh_token {
            self.enable_refresh_token = v;
        }
        if let Some(v) = o.locale {
            self.locale = v;
        }
        if let Some(v) = o.default_home_path {
            self.default_home_path = v;
        }

        if !self.default_home_path.starts_with('/') {
            return Err(DomainError::validation("defaultHomePath must start with '/'"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_the_console_fallbacks() {
        let p = Preferences::default();
        assert_eq!(p.default_home_path, "/dashboard/analytics");
        assert_eq!(p.locale, "zh");
        assert_eq!(p.access_mode, AccessMode::Backend);
        assert!(!p.enable_refresh_token);
    }

    #[test]
    fn lookup_overrides_defaults_and_ignores_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CMSADMIN_API_URL", "https://admin.example.com/api/"),
            ("CMSADMIN_LOCALE", "en"),
            ("CMSADMIN_HOME_PATH", "  "),
            ("CMSADMIN_REFRESH_TOKEN", "true"),
        ]);
        let p = Preferences::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(p.api_base_url, "https://admin.example.com/api");
        assert_eq!(p.locale, "en");
        assert_eq!(p.default_home_path, DEFAULT_HOME_PATH);
        assert!(p.enable_refresh_token);
    }

    #[test]
    fn merge_overrides_replaces_only_present_keys() {
        let p = Preferences::default()
            .merge_overrides(r#"{"locale":"en-US","accessMode":"frontend"}"#)
            .unwrap();
        assert_eq!(p.locale, "en-US");
        assert_eq!(p.access_mode, AccessMode::Frontend);
        assert_eq!(p.default_home_path, DEFAULT_HOME_PATH);
    }

    #[test]
    fn merge_overrides_rejects_relative_home_path() {
        let err = Preferences::default()
            .merge_overrides(r#"{"defaultHomePath":"dashboard"}"#)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn merge_overrides_rejects_malformed_json() {
        assert!(Preferences::default().merge_overrides("{").is_err());
    }
}
