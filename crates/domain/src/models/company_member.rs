//! Management company membership domain models.
//!
//! A membership links a user to a management company with a role name and a
//! permission bundle. At steady state there is exactly one active membership
//! per (company, user) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name given to administrators created through an invitation.
pub const ADMIN_MEMBER_ROLE: &str = "admin";

/// Permission bundle carried by a membership (stored as JSON).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberPermissions {
    #[serde(default)]
    pub can_change_subscription: bool,
    #[serde(default)]
    pub can_manage_members: bool,
    #[serde(default)]
    pub can_create_tickets: bool,
    #[serde(default)]
    pub can_view_invoices: bool,
}

impl MemberPermissions {
    /// The standard bundle granted to a company's primary administrator.
    pub fn primary_admin() -> Self {
        Self {
            can_change_subscription: true,
            can_manage_members: true,
            can_create_tickets: true,
            can_view_invoices: true,
        }
    }
}

/// Company membership domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompanyMember {
    pub id: Uuid,
    pub management_company_id: Uuid,
    pub user_id: Uuid,
    pub role_name: String,
    pub permissions: Option<MemberPermissions>,
    pub is_primary_admin: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub invited_at: Option<DateTime<Utc>>,
    pub invited_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a membership directly in its final state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompanyMember {
    pub management_company_id: Uuid,
    pub user_id: Uuid,
    pub role_name: String,
    pub permissions: MemberPermissions,
    pub is_primary_admin: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub invited_at: Option<DateTime<Utc>>,
    pub invited_by: Option<Uuid>,
    pub is_active: bool,
}

/// Partial update of a membership.
///
/// Role name, permissions and primary-admin flag are deliberately absent:
/// activation preserves whatever was pre-provisioned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberUpdate {
    pub is_active: Option<bool>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl MemberUpdate {
    /// Update that activates a membership joined at `now`.
    pub fn join(now: DateTime<Utc>) -> Self {
        Self {
            is_active: Some(true),
            joined_at: Some(now),
        }
    }

    pub fn apply_to(&self, member: &mut CompanyMember) {
        if let Some(active) = self.is_active {
            member.is_active = active;
        }
        if let Some(joined_at) = self.joined_at {
            member.joined_at = Some(joined_at);
        }
    }
}
