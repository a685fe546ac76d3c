pub mod capability;
pub mod scope;

pub use capability::{can_assign_role, can_grant_view_all, capabilities_for, role_has, Capability};
pub use scope::AccessScope;
