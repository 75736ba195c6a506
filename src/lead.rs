//! The Lead entity and its status state machine.
//!
//! A lead starts `New` and moves exactly once, to `Accepted` (with the buyer's contact details)
//! or to `Declined`. Both transitions share a single guard, [`Lead::can_transition`]. Accepting
//! a lead priced above [`discount_threshold`] applies a flat [`discount_rate`] reduction.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money;

/// Message reported whenever a transition is attempted on a lead that already left `New`.
pub const INVALID_LEAD_STATUS_MESSAGE: &str = "Cannot operate on a lead that is not new";

/// Prices strictly above this amount are discounted on acceptance.
pub fn discount_threshold() -> BigDecimal {
    money::from_cents(50_000)
}

/// Fraction taken off a discounted price (0.10).
pub fn discount_rate() -> BigDecimal {
    money::from_cents(10)
}

/// Applies the acceptance discount to a price.
///
/// Amounts at or below the threshold are returned unchanged; above it the result is
/// `price - price * 0.10`, rounded half-up to cents.
pub fn discounted_price(price: &BigDecimal) -> BigDecimal {
    if *price > discount_threshold() {
        let discount = price * &discount_rate();
        money::round_to_cents(&(price - &discount))
    } else {
        price.clone()
    }
}

/// Lifecycle status of a lead, as exposed on the wire and stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LeadStatus {
    New,
    Accepted,
    Declined,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Accepted => "Accepted",
            LeadStatus::Declined => "Declined",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(LeadStatus::New),
            "Accepted" => Ok(LeadStatus::Accepted),
            "Declined" => Ok(LeadStatus::Declined),
            other => Err(format!("unknown lead status '{}'", other)),
        }
    }
}

/// Buyer contact details, supplied when a lead is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadContact {
    /// Full name of the contact (2 to 128 characters).
    #[schema(example = "Yuri L")]
    pub full_name: String,
    /// Contact email address.
    #[schema(example = "y@x.com")]
    pub email: String,
    /// Digits only, 5 to 11 of them.
    #[schema(example = "0412345678")]
    pub phone_number: String,
}

/// Input for creating a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateLeadData {
    /// Trade or service category (2 to 64 characters).
    #[schema(example = "Painter")]
    pub category: String,
    /// Optional free text (2 to 256 characters).
    #[serde(default)]
    pub description: Option<String>,
    /// Price between 0.01 and 1000.00.
    #[serde(with = "crate::money")]
    #[schema(value_type = f64, example = 600.0)]
    pub price: BigDecimal,
    /// First name of the person who raised the lead (2 to 64 characters).
    #[schema(example = "Yuri")]
    pub contact_first_name: String,
    /// Suburb the job is in (2 to 128 characters).
    pub suburb: String,
}

impl CreateLeadData {
    /// Canonicalises client input: an empty description means "no description" and the price is
    /// rounded to whole cents.
    pub fn normalize(mut self) -> Self {
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            self.description = None;
        }
        self.price = money::round_to_cents(&self.price);
        self
    }
}

/// Status together with the data that only exists in that status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadState {
    New,
    Accepted(LeadContact),
    Declined,
}

impl LeadState {
    pub fn status(&self) -> LeadStatus {
        match self {
            LeadState::New => LeadStatus::New,
            LeadState::Accepted(_) => LeadStatus::Accepted,
            LeadState::Declined => LeadStatus::Declined,
        }
    }
}

/// Failure of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOperationError {
    /// Accept or decline attempted on a lead that is not `New`.
    InvalidStateTransition { current: LeadStatus },
}

impl fmt::Display for LeadOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadOperationError::InvalidStateTransition { .. } => {
                f.write_str(INVALID_LEAD_STATUS_MESSAGE)
            }
        }
    }
}

impl std::error::Error for LeadOperationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub(crate) id: Uuid,
    pub(crate) created: DateTime<Utc>,
    pub(crate) category: String,
    pub(crate) description: Option<String>,
    pub(crate) price: BigDecimal,
    pub(crate) contact_first_name: String,
    pub(crate) suburb: String,
    pub(crate) state: LeadState,
    /// Optimistic-concurrency token owned by the repository.
    pub(crate) version: i64,
}

impl Lead {
    /// Builds a fresh `New` lead from already validated input.
    pub fn new(data: CreateLeadData) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: Utc::now(),
            category: data.category,
            description: data.description,
            price: data.price,
            contact_first_name: data.contact_first_name,
            suburb: data.suburb,
            state: LeadState::New,
            version: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> &BigDecimal {
        &self.price
    }

    pub fn contact_first_name(&self) -> &str {
        &self.contact_first_name
    }

    pub fn suburb(&self) -> &str {
        &self.suburb
    }

    pub fn status(&self) -> LeadStatus {
        self.state.status()
    }

    /// Contact details; only an accepted lead has them.
    pub fn contact(&self) -> Option<&LeadContact> {
        match &self.state {
            LeadState::Accepted(contact) => Some(contact),
            LeadState::New | LeadState::Declined => None,
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Whether the lead may still be accepted or declined.
    pub fn can_transition(&self) -> bool {
        matches!(self.state, LeadState::New)
    }

    fn ensure_can_transition(&self) -> Result<(), LeadOperationError> {
        if self.can_transition() {
            Ok(())
        } else {
            Err(LeadOperationError::InvalidStateTransition {
                current: self.status(),
            })
        }
    }

    /// Accepts the lead, recording the contact and applying the price discount.
    ///
    /// Leaves the lead untouched when it is not `New`.
    pub fn accept(&mut self, contact: LeadContact) -> Result<(), LeadOperationError> {
        self.ensure_can_transition()?;

        self.state = LeadState::Accepted(contact);
        self.price = discounted_price(&self.price);

        Ok(())
    }

    /// Declines the lead. Leaves the lead untouched when it is not `New`.
    pub fn decline(&mut self) -> Result<(), LeadOperationError> {
        self.ensure_can_transition()?;

        self.state = LeadState::Declined;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_data(cents: i64) -> CreateLeadData {
        CreateLeadData {
            category: "Painter".to_string(),
            description: Some("Paint two bedrooms".to_string()),
            price: money::from_cents(cents),
            contact_first_name: "Yuri".to_string(),
            suburb: "Yarra".to_string(),
        }
    }

    fn contact() -> LeadContact {
        LeadContact {
            full_name: "Yuri L".to_string(),
            email: "y@x.com".to_string(),
            phone_number: "0412345678".to_string(),
        }
    }

    #[test]
    fn test_new_lead_starts_new_without_contact() {
        let lead = Lead::new(create_data(60_000));

        assert_eq!(lead.status(), LeadStatus::New);
        assert!(lead.contact().is_none());
        assert!(lead.can_transition());
        assert_eq!(lead.version(), 0);
        assert_eq!(lead.price(), &money::from_cents(60_000));
    }

    #[test]
    fn test_accept_sets_contact_and_discount() {
        let mut lead = Lead::new(create_data(60_000));

        lead.accept(contact()).unwrap();

        assert_eq!(lead.status(), LeadStatus::Accepted);
        assert_eq!(lead.contact(), Some(&contact()));
        assert_eq!(lead.price(), &money::from_cents(54_000));
    }

    #[test]
    fn test_decline_only_changes_status() {
        let mut lead = Lead::new(create_data(60_000));
        let before = lead.clone();

        lead.decline().unwrap();

        assert_eq!(lead.status(), LeadStatus::Declined);
        assert!(lead.contact().is_none());
        assert_eq!(lead.price(), before.price());
        assert_eq!(lead.id(), before.id());
    }

    #[test]
    fn test_terminal_leads_reject_transitions() {
        let mut declined = Lead::new(create_data(10_000));
        declined.decline().unwrap();
        let snapshot = declined.clone();

        let err = declined.accept(contact()).unwrap_err();
        assert_eq!(
            err,
            LeadOperationError::InvalidStateTransition {
                current: LeadStatus::Declined
            }
        );
        assert_eq!(declined.decline(), Err(err));
        assert_eq!(declined, snapshot);
        assert_eq!(err.to_string(), INVALID_LEAD_STATUS_MESSAGE);
    }

    #[test]
    fn test_discount_threshold_is_strict() {
        assert_eq!(
            discounted_price(&money::from_cents(50_000)),
            money::from_cents(50_000)
        );
        assert_eq!(
            discounted_price(&money::from_cents(50_001)),
            money::from_cents(45_001)
        );
        assert_eq!(
            discounted_price(&money::from_cents(100_000)),
            money::from_cents(90_000)
        );
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in [LeadStatus::New, LeadStatus::Accepted, LeadStatus::Declined] {
            assert_eq!(status.as_str().parse::<LeadStatus>(), Ok(status));
        }
        assert!("new".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_normalize_drops_empty_description_and_rounds_price() {
        let data = CreateLeadData {
            description: Some("   ".to_string()),
            price: money::parse_amount("10.005").unwrap(),
            ..create_data(0)
        }
        .normalize();

        assert_eq!(data.description, None);
        assert_eq!(data.price, money::from_cents(1_001));
    }
}
