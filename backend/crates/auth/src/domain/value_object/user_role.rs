use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// `Service` is the role of a request authenticated with an API key. It
/// ranks with `User` for authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Manager = 1,
    Admin = 2,
    Service = 3,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Manager => "manager",
            Admin => "admin",
            Service => "service",
        }
    }

    /// Position in the `user < manager < admin` order
    #[inline]
    pub const fn rank(&self) -> u8 {
        use UserRole::*;
        match self {
            User | Service => 0,
            Manager => 1,
            Admin => 2,
        }
    }

    #[inline]
    pub const fn satisfies(&self, min: UserRole) -> bool {
        self.rank() >= min.rank()
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(User),
            1 => Some(Manager),
            2 => Some(Admin),
            3 => Some(Service),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "user" => Some(User),
            "manager" => Some(Manager),
            "admin" => Some(Admin),
            "service" => Some(Service),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::User));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Manager));
        assert_eq!(UserRole::from_id(2), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(3), Some(UserRole::Service));
        assert_eq!(UserRole::from_id(9), None);
    }

    #[test]
    fn test_user_role_code_roundtrip() {
        for role in [
            UserRole::User,
            UserRole::Manager,
            UserRole::Admin,
            UserRole::Service,
        ] {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
            assert_eq!(role.to_string(), role.code());
        }
        assert_eq!(UserRole::from_code("super_admin"), None);
    }

    #[test]
    fn test_user_role_order() {
        assert!(UserRole::Admin.satisfies(UserRole::Manager));
        assert!(UserRole::Manager.satisfies(UserRole::User));
        assert!(!UserRole::User.satisfies(UserRole::Manager));
        assert!(!UserRole::Manager.satisfies(UserRole::Admin));
        assert!(UserRole::Service.satisfies(UserRole::User));
        assert!(!UserRole::Service.satisfies(UserRole::Manager));
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }
}
