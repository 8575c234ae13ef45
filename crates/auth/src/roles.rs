use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role code reported by the backend for the current user (e.g. `"super_admin"`).
///
/// Authorization on the client is decided on access codes. The backend already
/// expands `super_admin` into every code, so role names are informational here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const SUPER_ADMIN: Role = Role(Cow::Borrowed("super_admin"));
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const USER: Role = Role(Cow::Borrowed("user"));

    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_super_admin(&self) -> bool {
        *self == Self::SUPER_ADMIN
    }

    /// Seeded by the backend and never deletable by tenants.
    pub fn is_builtin(&self) -> bool {
        [Self::SUPER_ADMIN, Self::ADMIN, Self::USER].contains(self)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roles_are_recognised() {
        assert!(Role::new("super_admin").is_super_admin());
        assert!(Role::new(String::from("admin")).is_builtin());
        assert!(!Role::new("editor").is_builtin());
        assert!(!Role::ADMIN.is_super_admin());
    }

    #[test]
    fn serializes_as_plain_string() {
        let roles: Vec<Role> = serde_json::from_str(r#"["super_admin","editor"]"#).unwrap();
        assert_eq!(roles[0], Role::SUPER_ADMIN);
        assert_eq!(serde_json::to_string(&roles[1]).unwrap(), r#""editor""#);
    }
}
