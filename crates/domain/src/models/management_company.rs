//! Management company (tenant) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Management company domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ManagementCompany {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a management company.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyUpdate {
    pub is_active: Option<bool>,
}

impl CompanyUpdate {
    pub fn activate() -> Self {
        Self {
            is_active: Some(true),
        }
    }

    pub fn apply_to(&self, company: &mut ManagementCompany) {
        if let Some(active) = self.is_active {
            company.is_active = active;
        }
    }
}
