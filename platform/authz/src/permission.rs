use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthzError;

/// Fine-grained capability tag stored per user.
///
/// Tags are advisory: route access is decided by [`crate::Role`] alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Admin,
    Rh,
    Colaborator,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Admin => "admin",
            Permission::Rh => "rh",
            Permission::Colaborator => "colaborator",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AuthzError> {
        match value.trim() {
            "admin" => Ok(Permission::Admin),
            "rh" => Ok(Permission::Rh),
            "colaborator" => Ok(Permission::Colaborator),
            other => Err(AuthzError::UnknownPermission(other.to_string())),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated set of capability tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    tags: BTreeSet<Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            tags: permissions.into_iter().collect(),
        }
    }

    /// Parses the stored/submitted form: a JSON array of tag strings, e.g. `["rh"]`.
    pub fn from_json(raw: &str) -> Result<Self, AuthzError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let values: Vec<String> = serde_json::from_str(trimmed)
            .map_err(|err| AuthzError::MalformedPermissions(err.to_string()))?;
        values
            .iter()
            .map(|value| Permission::parse(value))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|tags| Self { tags })
    }

    pub fn to_json(&self) -> String {
        let values: Vec<&str> = self.tags.iter().map(|p| p.as_str()).collect();
        serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.tags.insert(permission)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.tags.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.tags.iter().copied()
    }
}
