//! Role registry and automatic role selection

use super::entities::{RoleAgent, RoleId};
use crate::core::error::DomainError;
use crate::core::query::Query;
use std::sync::Arc;

/// Ordered collection of available roles
///
/// Iteration order is always by role id, which keeps selection and
/// consensus output stable across runs.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: Vec<Arc<RoleAgent>>,
}

impl RoleRegistry {
    pub fn new(roles: impl IntoIterator<Item = RoleAgent>) -> Self {
        let mut registry = Self::default();
        for role in roles {
            registry.insert(role);
        }
        registry
    }

    /// The five built-in specialties
    pub fn builtin() -> Self {
        Self::new([
            RoleAgent::new(
                "architect",
                "Systems Architect",
                "You are a systems architect. Judge proposals by structure, \
                 boundaries, coupling and long-term maintainability.",
            )
            .with_capabilities(["architect", "design", "structur", "modul", "scal", "system"]),
            RoleAgent::new(
                "security",
                "Security Reviewer",
                "You are a security reviewer. Look for attack surface, unsafe \
                 defaults, secret handling and trust boundaries.",
            )
            .with_capabilities(["secur", "auth", "crypt", "threat", "vulnerab", "secret"]),
            RoleAgent::new(
                "performance",
                "Performance Engineer",
                "You are a performance engineer. Reason about latency, \
                 throughput, memory and the cost of each approach.",
            )
            .with_capabilities(["perform", "latenc", "throughput", "memory", "fast", "cach"]),
            RoleAgent::new(
                "ux",
                "User Experience Advocate",
                "You advocate for the people using the system. Weigh clarity, \
                 ergonomics, accessibility and failure messaging.",
            )
            .with_capabilities(["user", "ux", "interface", "usab", "access", "ergonom"]),
            RoleAgent::new(
                "pragmatist",
                "Delivery Pragmatist",
                "You are a pragmatic engineer focused on shipping. Prefer the \
                 simplest option that works and name its risks plainly.",
            )
            .with_capabilities(["ship", "deadline", "simpl", "cost", "risk", "deliver"]),
        ])
    }

    /// Insert or replace a role, keeping id order
    pub fn insert(&mut self, role: RoleAgent) {
        match self.roles.binary_search_by(|r| r.id.cmp(&role.id)) {
            Ok(idx) => self.roles[idx] = Arc::new(role),
            Err(idx) => self.roles.insert(idx, Arc::new(role)),
        }
    }

    pub fn get(&self, id: &RoleId) -> Option<Arc<RoleAgent>> {
        self.roles
            .binary_search_by(|r| r.id.cmp(id))
            .ok()
            .map(|idx| Arc::clone(&self.roles[idx]))
    }

    pub fn roles(&self) -> &[Arc<RoleAgent>] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Look up a subset by id, failing on the first unknown name
    pub fn pick<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Arc<RoleAgent>>, DomainError> {
        ids.iter()
            .map(|id| {
                self.get(&RoleId::new(id.as_ref()))
                    .ok_or_else(|| DomainError::UnknownRole(id.as_ref().to_string()))
            })
            .collect()
    }

    /// Pick up to `limit` roles ranked by [`RoleAgent::can_handle`].
    ///
    /// Ties break on role id. Roles scoring zero are only used to fill the
    /// selection when nothing matched at all, so a query always gets at
    /// least one role when the registry is non-empty.
    pub fn select(&self, query: &Query, limit: usize) -> Vec<Arc<RoleAgent>> {
        let mut scored: Vec<(f64, &Arc<RoleAgent>)> = self
            .roles
            .iter()
            .map(|role| (role.can_handle(query), role))
            .collect();

        scored.sort_by(|(sa, ra), (sb, rb)| sb.total_cmp(sa).then_with(|| ra.id.cmp(&rb.id)));

        let matched: Vec<_> = scored
            .iter()
            .filter(|(score, _)| *score > 0.0)
            .take(limit)
            .map(|(_, role)| Arc::clone(role))
            .collect();

        if matched.is_empty() {
            scored
                .iter()
                .take(limit)
                .map(|(_, role)| Arc::clone(role))
                .collect()
        } else {
            matched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_five_sorted_roles() {
        let registry = RoleRegistry::builtin();
        let ids: Vec<_> = registry.roles().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["architect", "performance", "pragmatist", "security", "ux"]
        );
    }

    #[test]
    fn test_select_ranks_by_confidence() {
        let registry = RoleRegistry::builtin();
        let q = Query::try_new("Is our auth token cache a security threat or a latency win?")
            .unwrap();
        let picked: Vec<_> = registry
            .select(&q, 2)
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(picked, vec!["security", "performance"]);
    }

    #[test]
    fn test_select_falls_back_when_nothing_matches() {
        let registry = RoleRegistry::builtin();
        let q = Query::try_new("zzz").unwrap();
        assert_eq!(registry.select(&q, 3).len(), 3);
    }

    #[test]
    fn test_pick_unknown_role() {
        let registry = RoleRegistry::builtin();
        assert!(registry.pick(&["security", "ux"]).is_ok());
        assert_eq!(
            registry.pick(&["wizard"]).unwrap_err(),
            DomainError::UnknownRole("wizard".to_string())
        );
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut registry = RoleRegistry::builtin();
        registry.insert(RoleAgent::new("ux", "Replaced", "p"));
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get(&RoleId::new("ux")).unwrap().title, "Replaced");
    }
}
