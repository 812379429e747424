//! Route -> requirement table, evaluated after the gate. First matching rule wins.

use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::services::auth::path_pattern::PathPattern;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    /// Authenticated and holding exactly this authority.
    Authority(String),
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl Rule {
    pub fn new(pattern: &str, requirement: Requirement) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            requirement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity on a route that needs one (401).
    Unauthenticated,
    /// Identity present but lacking the required authority (403).
    Forbidden,
}

impl From<Denial> for AppError {
    fn from(d: Denial) -> Self {
        match d {
            Denial::Unauthenticated => AppError::Unauthenticated,
            Denial::Forbidden => AppError::Forbidden,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<Rule>,
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::new(vec![
            // must precede the /auth/** permit rule
            Rule::new("/api/v1/auth/profile", Requirement::Authenticated),
            Rule::new("/api/v1/auth/**", Requirement::PermitAll),
            Rule::new("/health", Requirement::PermitAll),
            Rule::new("/**", Requirement::Authenticated),
        ])
    }
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Unmatched paths require authentication.
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|r| r.pattern.matches(path))
            .map(|r| &r.requirement)
            .unwrap_or(&Requirement::Authenticated)
    }

    pub fn evaluate(&self, path: &str, identity: Option<&Identity>) -> Result<(), Denial> {
        match (self.requirement_for(path), identity) {
            (Requirement::PermitAll, _) => Ok(()),
            (_, None) => Err(Denial::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::Authority(required), Some(id)) if id.has_authority(required) => Ok(()),
            (Requirement::Authority(_), Some(_)) => Err(Denial::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new("alice", "ROLE_USER")
    }

    #[test]
    fn profile_requires_any_identity() {
        let policy = AuthorizationPolicy::default();

        assert_eq!(
            policy.evaluate("/api/v1/auth/profile", None),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(policy.evaluate("/api/v1/auth/profile", Some(&alice())), Ok(()));
        let admin = Identity::new("root", "ROLE_ADMIN");
        assert_eq!(policy.evaluate("/api/v1/auth/profile", Some(&admin)), Ok(()));
    }

    #[test]
    fn other_auth_endpoints_are_open() {
        let policy = AuthorizationPolicy::default();
        for path in [
            "/api/v1/auth/login",
            "/api/v1/auth/signup",
            "/api/v1/auth/refresh",
            "/api/v1/auth/logout",
        ] {
            assert_eq!(policy.evaluate(path, None), Ok(()), "{path}");
        }
    }

    #[test]
    fn everything_else_requires_identity() {
        let policy = AuthorizationPolicy::default();
        assert_eq!(
            policy.evaluate("/api/v1/posts", None),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(policy.evaluate("/api/v1/posts", Some(&alice())), Ok(()));
        assert_eq!(policy.evaluate("/health", None), Ok(()));
    }

    #[test]
    fn authority_rule_distinguishes_401_from_403() {
        let policy = AuthorizationPolicy::new(vec![Rule::new(
            "/admin/**",
            Requirement::Authority("ROLE_ADMIN".into()),
        )]);

        assert_eq!(policy.evaluate("/admin/users", None), Err(Denial::Unauthenticated));
        assert_eq!(
            policy.evaluate("/admin/users", Some(&alice())),
            Err(Denial::Forbidden)
        );
        let admin = Identity::new("root", "ROLE_ADMIN");
        assert_eq!(policy.evaluate("/admin/users", Some(&admin)), Ok(()));
    }

    #[test]
    fn empty_table_denies_anonymous() {
        let policy = AuthorizationPolicy::new(Vec::new());
        assert_eq!(policy.evaluate("/x", None), Err(Denial::Unauthenticated));
    }
}
