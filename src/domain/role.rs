use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Athlete,
    Coach,
    CollegeAdmin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
    GeneralUser,
}

/// Actions gated on the caller's role rather than on ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageCatalog,
    ManageOrders,
    ManageSports,
    ManagePodcasts,
    /// Delete other users' posts, comments and reviews.
    ModerateContent,
    RequestCoachingSession,
    RespondToCoachingSession,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Athlete,
        Role::Coach,
        Role::CollegeAdmin,
        Role::SuperAdmin,
        Role::GeneralUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Athlete => "athlete",
            Role::Coach => "coach",
            Role::CollegeAdmin => "college_admin",
            Role::SuperAdmin => "superadmin",
            Role::GeneralUser => "general_user",
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ManageCatalog
            | Permission::ManageOrders
            | Permission::ManageSports
            | Permission::ManagePodcasts
            | Permission::ModerateContent => matches!(self, Role::SuperAdmin),
            Permission::RequestCoachingSession => matches!(self, Role::Athlete),
            Permission::RespondToCoachingSession => matches!(self, Role::Coach),
        }
    }

    /// Roles a user may pick for themselves at registration.
    pub fn self_assignable(&self) -> bool {
        match self {
            Role::Athlete | Role::Coach | Role::CollegeAdmin | Role::GeneralUser => true,
            Role::SuperAdmin => false,
        }
    }

    /// Roles that can be looked up through the public profile search.
    pub fn searchable(&self) -> bool {
        matches!(self, Role::Athlete | Role::Coach)
    }

    pub fn require(&self, permission: Permission) -> Result<(), DomainError> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown role '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_superadmin_manages_catalog_and_orders() {
        for role in Role::ALL {
            assert_eq!(
                role.allows(Permission::ManageCatalog),
                role == Role::SuperAdmin,
                "{role}"
            );
            assert_eq!(role.allows(Permission::ManageOrders), role == Role::SuperAdmin);
        }
    }

    #[test]
    fn coaching_permissions_follow_role() {
        assert!(Role::Athlete.allows(Permission::RequestCoachingSession));
        assert!(!Role::Coach.allows(Permission::RequestCoachingSession));
        assert!(Role::Coach.allows(Permission::RespondToCoachingSession));
        assert!(!Role::Athlete.allows(Permission::RespondToCoachingSession));
    }

    #[test]
    fn require_returns_forbidden() {
        let err = Role::Coach
            .require(Permission::ManageSports)
            .expect_err("coach cannot manage sports");
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("college_admin".parse::<Role>().unwrap(), Role::CollegeAdmin);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn serde_matches_stored_names() {
        for role in Role::ALL {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
        }
    }

    #[test]
    fn superadmin_is_not_self_assignable() {
        assert!(!Role::SuperAdmin.self_assignable());
        assert!(Role::GeneralUser.self_assignable());
    }
}
