use crate::models::UserRole;

/// A discrete management action a role may be entitled to.
///
/// Worker actions (claiming an open shift, clocking in/out, filing or
/// cancelling a time-off request) carry no capability; they are gated by
/// ownership and location scope instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, update or delete individual shifts.
    ManageShifts,
    /// Bulk shift creation, week copying and publishing.
    BulkManageShifts,
    /// Approve or reject submitted timesheets.
    ReviewTimesheets,
    /// Approve or reject time-off requests.
    ReviewTimeOff,
    /// Create and update user accounts.
    ManageUsers,
    /// Deactivate user accounts.
    DeactivateUsers,
    /// Create locations, deactivate them, rotate kiosk tokens.
    ManageLocations,
    /// Update an existing location's details.
    EditLocation,
    /// Create, update or deactivate positions.
    ManagePositions,
}

/// The full set of capabilities granted to a role.
pub fn capabilities_for(role: UserRole) -> &'static [Capability] {
    use Capability::*;

    match role {
        UserRole::SuperAdmin | UserRole::Admin => &[
            ManageShifts,
            BulkManageShifts,
            ReviewTimesheets,
            ReviewTimeOff,
            ManageUsers,
            DeactivateUsers,
            ManageLocations,
            EditLocation,
            ManagePositions,
        ],
        UserRole::Manager => &[
            ManageShifts,
            BulkManageShifts,
            ReviewTimesheets,
            ReviewTimeOff,
            ManageUsers,
            EditLocation,
        ],
        UserRole::Supervisor => &[ManageShifts, ReviewTimesheets, ReviewTimeOff],
        UserRole::Employee => &[],
    }
}

pub fn role_has(role: UserRole, capability: Capability) -> bool {
    capabilities_for(role).contains(&capability)
}

/// Whether `actor` may hand out the role `target` on an account.
///
/// Managers staff their locations with workers and supervisors but cannot
/// mint peers or admins; admins cannot mint super admins. Combined with
/// [`can_grant_view_all`] this keeps a location-scoped account from ever
/// producing a sees-all one.
pub fn can_assign_role(actor: UserRole, target: UserRole) -> bool {
    match actor {
        UserRole::SuperAdmin => true,
        UserRole::Admin => target != UserRole::SuperAdmin,
        UserRole::Manager => matches!(target, UserRole::Supervisor | UserRole::Employee),
        UserRole::Supervisor | UserRole::Employee => false,
    }
}

/// Only the super admin may grant company-wide visibility.
pub fn can_grant_view_all(actor: UserRole) -> bool {
    actor == UserRole::SuperAdmin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles_have_everything() {
        for role in [UserRole::SuperAdmin, UserRole::Admin] {
            assert!(role_has(role, Capability::ManageShifts));
            assert!(role_has(role, Capability::BulkManageShifts));
            assert!(role_has(role, Capability::ReviewTimesheets));
            assert!(role_has(role, Capability::ReviewTimeOff));
            assert!(role_has(role, Capability::ManageUsers));
            assert!(role_has(role, Capability::DeactivateUsers));
            assert!(role_has(role, Capability::ManageLocations));
            assert!(role_has(role, Capability::EditLocation));
            assert!(role_has(role, Capability::ManagePositions));
        }
    }

    #[test]
    fn test_manager_scope() {
        let role = UserRole::Manager;

        assert!(role_has(role, Capability::ManageShifts));
        assert!(role_has(role, Capability::BulkManageShifts));
        assert!(role_has(role, Capability::ManageUsers));
        assert!(role_has(role, Capability::EditLocation));

        assert!(!role_has(role, Capability::DeactivateUsers));
        assert!(!role_has(role, Capability::ManageLocations));
        assert!(!role_has(role, Capability::ManagePositions));
    }

    #[test]
    fn test_supervisor_schedules_and_reviews_only() {
        let role = UserRole::Supervisor;

        assert!(role_has(role, Capability::ManageShifts));
        assert!(role_has(role, Capability::ReviewTimesheets));
        assert!(role_has(role, Capability::ReviewTimeOff));

        assert!(!role_has(role, Capability::BulkManageShifts));
        assert!(!role_has(role, Capability::ManageUsers));
        assert!(!role_has(role, Capability::EditLocation));
    }

    #[test]
    fn test_employee_has_no_capabilities() {
        assert!(capabilities_for(UserRole::Employee).is_empty());
    }

    #[test]
    fn test_role_assignment_ceiling() {
        use UserRole::*;

        assert!(can_assign_role(SuperAdmin, SuperAdmin));
        assert!(can_assign_role(SuperAdmin, Admin));

        assert!(can_assign_role(Admin, Manager));
        assert!(!can_assign_role(Admin, SuperAdmin));

        assert!(can_assign_role(Manager, Supervisor));
        assert!(can_assign_role(Manager, Employee));
        assert!(!can_assign_role(Manager, Manager));
        assert!(!can_assign_role(Manager, Admin));
        assert!(!can_assign_role(Manager, SuperAdmin));

        assert!(!can_assign_role(Supervisor, Employee));
        assert!(!can_assign_role(Employee, Employee));
    }

    #[test]
    fn test_only_super_admin_grants_view_all() {
        assert!(can_grant_view_all(UserRole::SuperAdmin));
        for role in [
            UserRole::Admin,
            UserRole::Manager,
            UserRole::Supervisor,
            UserRole::Employee,
        ] {
            assert!(!can_grant_view_all(role), "{:?} granted view-all", role);
        }
    }
}
