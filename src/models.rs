use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::AppError;
use crate::lead::{Lead, LeadContact, LeadState, LeadStatus};

// ============ Database Models ============

/// One row of the `leads` table.
///
/// Contact columns are flattened; they are all set for an accepted lead and all null otherwise.
#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub category: String,
    pub description: Option<String>,
    pub status: String,
    pub price: BigDecimal,
    pub contact_first_name: String,
    pub suburb: String,
    pub contact_full_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone_number: Option<String>,
    pub version: i64,
}

impl TryFrom<LeadRow> for Lead {
    type Error = AppError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let status: LeadStatus = row
            .status
            .parse()
            .map_err(|e: String| AppError::InternalError(format!("lead {}: {}", row.id, e)))?;

        let contact = match (
            row.contact_full_name,
            row.contact_email,
            row.contact_phone_number,
        ) {
            (Some(full_name), Some(email), Some(phone_number)) => Some(LeadContact {
                full_name,
                email,
                phone_number,
            }),
            (None, None, None) => None,
            _ => {
                return Err(AppError::InternalError(format!(
                    "lead {} has partial contact columns",
                    row.id
                )))
            }
        };

        let state = match (status, contact) {
            (LeadStatus::New, None) => LeadState::New,
            (LeadStatus::Declined, None) => LeadState::Declined,
            (LeadStatus::Accepted, Some(contact)) => LeadState::Accepted(contact),
            (status, _) => {
                return Err(AppError::InternalError(format!(
                    "lead {} contact columns do not match status {}",
                    row.id, status
                )))
            }
        };

        Ok(Lead {
            id: row.id,
            created: row.created,
            category: row.category,
            description: row.description,
            price: row.price,
            contact_first_name: row.contact_first_name,
            suburb: row.suburb,
            state,
            version: row.version,
        })
    }
}

// ============ API Request/Response Models ============

/// JSON representation of a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadResource {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub category: String,
    pub description: Option<String>,
    pub status: LeadStatus,
    #[serde(with = "crate::money")]
    #[schema(value_type = f64, example = 540.0)]
    pub price: BigDecimal,
    pub contact_first_name: String,
    pub suburb: String,
    /// Present only on accepted leads.
    pub contact: Option<LeadContact>,
}

impl From<&Lead> for LeadResource {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id(),
            created: lead.created(),
            category: lead.category().to_string(),
            description: lead.description().map(str::to_string),
            status: lead.status(),
            price: lead.price().clone(),
            contact_first_name: lead.contact_first_name().to_string(),
            suburb: lead.suburb().to_string(),
            contact: lead.contact().cloned(),
        }
    }
}

/// Query string accepted by `GET /leads`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadQueryParams {
    /// Only return leads in this status.
    pub status: Option<LeadStatus>,
    /// Case-insensitive text matched against category and description.
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Page size (default 30, at most 100).
    pub size: Option<u32>,
}
