use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AuthzError, Permission};

/// Coarse-grained account category. Decides which route classes a user reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Rh,
    Colaborator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Rh, Role::Colaborator];

    /// Storage and form spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Rh => "rh",
            Role::Colaborator => "colaborator",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AuthzError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "rh" | "hr" => Ok(Role::Rh),
            "colaborator" | "collaborator" => Ok(Role::Colaborator),
            _ => Err(AuthzError::UnknownRole(value.to_string())),
        }
    }

    /// Capability tag granted to a fresh account of this role.
    pub fn default_permission(self) -> Permission {
        match self {
            Role::Admin => Permission::Admin,
            Role::Rh => Permission::Rh,
            Role::Colaborator => Permission::Colaborator,
        }
    }

    /// Roles this role is allowed to hand out when creating accounts.
    pub fn may_create(self, target: Role) -> bool {
        match self {
            Role::Admin => true,
            Role::Rh => target == Role::Colaborator,
            Role::Colaborator => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_spelling_and_aliases() {
        assert_eq!(Role::parse("admin"), Ok(Role::Admin));
        assert_eq!(Role::parse(" RH "), Ok(Role::Rh));
        assert_eq!(Role::parse("colaborator"), Ok(Role::Colaborator));
        assert_eq!(Role::parse("collaborator"), Ok(Role::Colaborator));
        assert_eq!(
            Role::parse("owner"),
            Err(AuthzError::UnknownRole("owner".into()))
        );
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn creation_ceiling_follows_role() {
        assert!(Role::Admin.may_create(Role::Admin));
        assert!(Role::Admin.may_create(Role::Rh));
        assert!(Role::Rh.may_create(Role::Colaborator));
        assert!(!Role::Rh.may_create(Role::Rh));
        assert!(!Role::Rh.may_create(Role::Admin));
        assert!(!Role::Colaborator.may_create(Role::Colaborator));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::Colaborator).unwrap();
        assert_eq!(json, "\"colaborator\"");
    }
}
