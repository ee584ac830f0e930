//! Role and role assignment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the tenant-agnostic role every active user holds.
pub const BASELINE_ROLE_NAME: &str = "USER";

/// Name of the administrative role granted per management company.
pub const ADMIN_ROLE_NAME: &str = "ADMIN";

/// Role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
}

/// Authority boundary of a role assignment.
///
/// A scoped assignment carries exactly one scope identifier; a global one
/// carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RoleScope {
    Global,
    ManagementCompany(Uuid),
    Condominium(Uuid),
    Building(Uuid),
}

/// Column triple `(management_company_id, condominium_id, building_id)`.
pub type ScopeColumns = (Option<Uuid>, Option<Uuid>, Option<Uuid>);

impl RoleScope {
    /// Builds a scope from its nullable storage columns.
    ///
    /// Fails when more than one identifier is set.
    pub fn from_columns(
        management_company_id: Option<Uuid>,
        condominium_id: Option<Uuid>,
        building_id: Option<Uuid>,
    ) -> Result<Self, String> {
        match (management_company_id, condominium_id, building_id) {
            (None, None, None) => Ok(RoleScope::Global),
            (Some(id), None, None) => Ok(RoleScope::ManagementCompany(id)),
            (None, Some(id), None) => Ok(RoleScope::Condominium(id)),
            (None, None, Some(id)) => Ok(RoleScope::Building(id)),
            _ => Err("Role assignment carries more than one scope identifier".to_string()),
        }
    }

    /// Splits the scope into its nullable storage columns.
    pub fn to_columns(&self) -> ScopeColumns {
        match *self {
            RoleScope::Global => (None, None, None),
            RoleScope::ManagementCompany(id) => (Some(id), None, None),
            RoleScope::Condominium(id) => (None, Some(id), None),
            RoleScope::Building(id) => (None, None, Some(id)),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, RoleScope::Global)
    }

    pub fn management_company_id(&self) -> Option<Uuid> {
        match self {
            RoleScope::ManagementCompany(id) => Some(*id),
            _ => None,
        }
    }
}

/// A role granted to a user within a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub scope: RoleScope,
    pub is_active: bool,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

/// Input for creating a role assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub scope: RoleScope,
    pub is_active: bool,
    pub assigned_by: Option<Uuid>,
}

impl NewUserRole {
    /// Active assignment with no scope.
    pub fn global(user_id: Uuid, role_id: Uuid, assigned_by: Option<Uuid>) -> Self {
        Self {
            user_id,
            role_id,
            scope: RoleScope::Global,
            is_active: true,
            assigned_by,
        }
    }

    /// Active assignment limited to one management company.
    pub fn management_company(
        user_id: Uuid,
        role_id: Uuid,
        management_company_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> Self {
        Self {
            user_id,
            role_id,
            scope: RoleScope::ManagementCompany(management_company_id),
            is_active: true,
            assigned_by,
        }
    }
}
