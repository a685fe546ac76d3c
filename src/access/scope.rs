use std::collections::HashSet;

use uuid::Uuid;

use crate::models::UserRole;

/// The set of locations a principal may see.
///
/// Resolved fresh on every request from the principal's role, their
/// `can_view_all` flag and their location assignments. Never cached across
/// requests: a revoked assignment takes effect on the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Every location in the company.
    All,
    /// Only the listed locations.
    Locations(HashSet<Uuid>),
}

impl AccessScope {
    pub fn resolve(role: UserRole, can_view_all: bool, assigned: &[Uuid]) -> Self {
        if role == UserRole::SuperAdmin || can_view_all {
            AccessScope::All
        } else {
            AccessScope::Locations(assigned.iter().copied().collect())
        }
    }

    pub fn sees_all(&self) -> bool {
        matches!(self, AccessScope::All)
    }

    pub fn contains(&self, location_id: Uuid) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::Locations(ids) => ids.contains(&location_id),
        }
    }

    /// Location ids to AND into a list query, or `None` when no filter is
    /// needed. An empty vec is a real filter that matches nothing.
    pub fn as_filter(&self) -> Option<Vec<Uuid>> {
        match self {
            AccessScope::All => None,
            AccessScope::Locations(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_sees_all_without_assignments() {
        let scope = AccessScope::resolve(UserRole::SuperAdmin, false, &[]);
        assert!(scope.sees_all());
        assert!(scope.contains(Uuid::new_v4()));
        assert!(scope.as_filter().is_none());
    }

    #[test]
    fn test_can_view_all_overrides_role() {
        let scope = AccessScope::resolve(UserRole::Employee, true, &[]);
        assert!(scope.sees_all());
    }

    #[test]
    fn test_assigned_locations_only() {
        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = AccessScope::resolve(UserRole::Manager, false, &[mine]);

        assert!(!scope.sees_all());
        assert!(scope.contains(mine));
        assert!(!scope.contains(other));
        assert_eq!(scope.as_filter(), Some(vec![mine]));
    }

    #[test]
    fn test_no_assignments_matches_nothing() {
        let scope = AccessScope::resolve(UserRole::Employee, false, &[]);

        assert!(!scope.contains(Uuid::new_v4()));
        assert_eq!(scope.as_filter(), Some(vec![]));
    }
}
