//! Helper predicates shared by the store-side rule set and client gating.
//!
//! Every predicate is total: absent data makes it return `false`.

use chrono::{DateTime, Duration, Utc};
use orbita_core::TenantId;

use crate::{Principal, Role, UserId};

/// Default edit window for owners of time entries.
pub const DEFAULT_EDIT_WINDOW_SECONDS: i64 = 300;

/// Returns whether a principal is present.
#[must_use]
pub fn is_authenticated(principal: Option<&Principal>) -> bool {
    principal.is_some()
}

/// Returns whether the principal is the owner recorded on the resource.
#[must_use]
pub fn is_owner(principal: &Principal, owner: Option<UserId>) -> bool {
    owner.is_some_and(|owner| owner == principal.user_id())
}

/// Returns whether principal and resource belong to the same company.
#[must_use]
pub fn same_company(principal: &Principal, tenant_id: Option<TenantId>) -> bool {
    match (principal.tenant_id(), tenant_id) {
        (Some(principal_tenant), Some(resource_tenant)) => principal_tenant == resource_tenant,
        _ => false,
    }
}

/// Returns whether the principal is a platform operator.
#[must_use]
pub fn is_super_admin(principal: &Principal) -> bool {
    principal.role() == Role::SuperAdmin
}

/// Returns whether the principal holds one of the listed roles.
#[must_use]
pub fn has_role(principal: &Principal, roles: &[Role]) -> bool {
    roles.contains(&principal.role())
}

/// Returns whether the principal confirmed their email.
#[must_use]
pub fn email_verified(principal: &Principal) -> bool {
    principal.email_verified()
}

/// Returns whether `now` is at most `window` after `created_at`.
///
/// The boundary is inclusive. A timestamp in the future never qualifies.
#[must_use]
pub fn within_edit_window(
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let Some(created_at) = created_at else {
        return false;
    };

    if created_at > now {
        return false;
    }

    now - created_at <= window
}
