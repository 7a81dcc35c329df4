//! Principal
//!
//! The authenticated caller attached to a request by the auth middleware.

use kernel::id::UserId;
use serde::Serialize;

use crate::domain::entity::user::User;
use crate::domain::value_object::{public_id::PublicId, user_role::UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalSource {
    Session,
    ApiKey,
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub public_id: PublicId,
    pub role: UserRole,
    pub via: PrincipalSource,
}

impl Principal {
    pub fn from_session(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            public_id: user.public_id,
            role: user.user_role,
            via: PrincipalSource::Session,
        }
    }

    /// API key callers act as the key owner with the `service` role
    pub fn from_api_key(owner: &User) -> Self {
        Self {
            user_id: owner.user_id,
            public_id: owner.public_id,
            role: UserRole::Service,
            via: PrincipalSource::ApiKey,
        }
    }

    pub fn has_role(&self, min: UserRole) -> bool {
        self.role.satisfies(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::email::Email;

    #[test]
    fn test_api_key_principal_is_service() {
        let mut owner = User::new(Email::new("admin@example.com").unwrap(), "Admin");
        owner.set_role(UserRole::Admin);

        let session = Principal::from_session(&owner);
        assert!(session.has_role(UserRole::Admin));

        let service = Principal::from_api_key(&owner);
        assert_eq!(service.role, UserRole::Service);
        assert_eq!(service.user_id, owner.user_id);
        assert!(!service.has_role(UserRole::Admin));
        assert!(service.has_role(UserRole::User));
    }
}
