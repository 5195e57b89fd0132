use serde::{Deserialize, Serialize};

use crate::{PermissionSet, Role};

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub role: Role,
    pub permissions: PermissionSet,
}

impl Principal {
    pub fn new(user_id: i32, role: Role, permissions: PermissionSet) -> Self {
        Self {
            user_id,
            role,
            permissions,
        }
    }

    pub fn may_create(&self, target: Role) -> bool {
        self.role.may_create(target)
    }
}

/// Access class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAccess {
    /// Served to everyone.
    Public,
    /// Login-adjacent pages; signed-in users are bounced home.
    GuestOnly,
    Authenticated,
    AdminOnly,
    RhOrAdmin,
}

impl RouteAccess {
    pub fn requires_principal(self) -> bool {
        matches!(
            self,
            RouteAccess::Authenticated | RouteAccess::AdminOnly | RouteAccess::RhOrAdmin
        )
    }
}

/// Outcome of the gate. `Deny` carries the redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny(target) => Some(target),
        }
    }
}

/// Redirect targets used by the gate. Built once at startup and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub login_route: String,
    pub home_route: String,
    /// Where a collaborator lands when hitting an rh-or-admin route.
    pub forbidden_redirect: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            login_route: "/login".into(),
            home_route: "/home".into(),
            forbidden_redirect: "/home".into(),
        }
    }
}

impl AccessPolicy {
    pub fn with_forbidden_redirect(mut self, target: impl Into<String>) -> Self {
        self.forbidden_redirect = target.into();
        self
    }

    pub fn decide(&self, principal: Option<&Principal>, access: RouteAccess) -> Decision {
        let Some(principal) = principal else {
            return if access.requires_principal() {
                Decision::Deny(self.login_route.clone())
            } else {
                Decision::Allow
            };
        };
        match access {
            RouteAccess::GuestOnly => Decision::Deny(self.home_route.clone()),
            RouteAccess::AdminOnly if principal.role != Role::Admin => {
                Decision::Deny(self.home_route.clone())
            }
            RouteAccess::RhOrAdmin if !matches!(principal.role, Role::Admin | Role::Rh) => {
                Decision::Deny(self.forbidden_redirect.clone())
            }
            _ => Decision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: [RouteAccess; 5] = [
        RouteAccess::Public,
        RouteAccess::GuestOnly,
        RouteAccess::Authenticated,
        RouteAccess::AdminOnly,
        RouteAccess::RhOrAdmin,
    ];

    fn principal(role: Role) -> Principal {
        Principal::new(1, role, PermissionSet::from_permissions([role.default_permission()]))
    }

    fn deny(target: &str) -> Decision {
        Decision::Deny(target.to_string())
    }

    #[test]
    fn anonymous_is_sent_to_login_for_protected_classes() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.decide(None, RouteAccess::Authenticated), deny("/login"));
        assert_eq!(policy.decide(None, RouteAccess::AdminOnly), deny("/login"));
        assert_eq!(policy.decide(None, RouteAccess::RhOrAdmin), deny("/login"));
        assert_eq!(policy.decide(None, RouteAccess::GuestOnly), Decision::Allow);
        assert_eq!(policy.decide(None, RouteAccess::Public), Decision::Allow);
    }

    #[test]
    fn signed_in_users_are_bounced_from_guest_pages() {
        let policy = AccessPolicy::default();
        for role in Role::ALL {
            assert_eq!(
                policy.decide(Some(&principal(role)), RouteAccess::GuestOnly),
                deny("/home")
            );
        }
    }

    #[test]
    fn admin_only_routes_send_other_roles_home() {
        let policy = AccessPolicy::default();
        let admin = principal(Role::Admin);
        assert_eq!(policy.decide(Some(&admin), RouteAccess::AdminOnly), Decision::Allow);
        assert_eq!(
            policy.decide(Some(&principal(Role::Rh)), RouteAccess::AdminOnly),
            deny("/home")
        );
        assert_eq!(
            policy.decide(Some(&principal(Role::Colaborator)), RouteAccess::AdminOnly),
            deny("/home")
        );
    }

    #[test]
    fn rh_or_admin_routes_exclude_collaborators() {
        let policy = AccessPolicy::default();
        assert!(policy
            .decide(Some(&principal(Role::Admin)), RouteAccess::RhOrAdmin)
            .is_allowed());
        assert!(policy
            .decide(Some(&principal(Role::Rh)), RouteAccess::RhOrAdmin)
            .is_allowed());
        assert_eq!(
            policy.decide(Some(&principal(Role::Colaborator)), RouteAccess::RhOrAdmin),
            deny("/home")
        );
    }

    #[test]
    fn collaborator_redirect_target_is_configurable() {
        let policy = AccessPolicy::default().with_forbidden_redirect("/forbidden");
        let decision = policy.decide(Some(&principal(Role::Colaborator)), RouteAccess::RhOrAdmin);
        assert_eq!(decision.redirect_target(), Some("/forbidden"));
        // rule 3 keeps its own target
        assert_eq!(
            policy.decide(Some(&principal(Role::Rh)), RouteAccess::AdminOnly),
            deny("/home")
        );
    }

    #[test]
    fn permissions_do_not_influence_decisions() {
        let policy = AccessPolicy::default();
        let elevated = Principal::new(
            7,
            Role::Colaborator,
            PermissionSet::from_permissions([crate::Permission::Admin]),
        );
        assert_eq!(policy.decide(Some(&elevated), RouteAccess::AdminOnly), deny("/home"));
    }

    #[test]
    fn every_input_has_a_decision() {
        let policy = AccessPolicy::default();
        for access in CLASSES {
            let anonymous = policy.decide(None, access);
            assert_eq!(anonymous.is_allowed(), !access.requires_principal());
            for role in Role::ALL {
                let decision = policy.decide(Some(&principal(role)), access);
                if let Some(target) = decision.redirect_target() {
                    assert!(target.starts_with('/'));
                }
            }
        }
    }
}
