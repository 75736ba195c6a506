//! Input bounds for lead creation and acceptance payloads.
//!
//! Every violated rule is reported, not just the first one, so a form can highlight all of its
//! bad fields at once.

use bigdecimal::BigDecimal;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::lead::{CreateLeadData, LeadContact};
use crate::money;

/// Input rejected by bounds checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates failed rules for one payload.
#[derive(Default)]
struct Checks {
    messages: Vec<String>,
}

impl Checks {
    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.messages.push(format!(
                "{} must be between {} and {} characters",
                field, min, max
            ));
        }
    }

    fn range(&mut self, field: &str, value: &BigDecimal, min: &BigDecimal, max: &BigDecimal) {
        if value < min || value > max {
            self.messages
                .push(format!("{} must be between {} and {}", field, min, max));
        }
    }

    fn that(&mut self, ok: bool, message: &str) {
        if !ok {
            self.messages.push(message.to_string());
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                messages: self.messages,
            })
        }
    }
}

pub const CATEGORY_LENGTH: (usize, usize) = (2, 64);
pub const DESCRIPTION_LENGTH: (usize, usize) = (2, 256);
pub const CONTACT_FIRST_NAME_LENGTH: (usize, usize) = (2, 64);
pub const SUBURB_LENGTH: (usize, usize) = (2, 128);
pub const FULL_NAME_LENGTH: (usize, usize) = (2, 128);
pub const PHONE_DIGITS: (usize, usize) = (5, 11);

pub fn min_price() -> BigDecimal {
    money::from_cents(1)
}

pub fn max_price() -> BigDecimal {
    money::from_cents(100_000)
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    // RFC 5322 simplified: local@domain.tld
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email regex is valid")
    })
}

/// Basic email syntax check: something@domain.tld
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    email_regex().is_match(email)
}

/// Phone numbers are plain digit strings, 5 to 11 digits long.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let (min, max) = PHONE_DIGITS;
    (min..=max).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit())
}

impl CreateLeadData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();

        checks.length("category", &self.category, CATEGORY_LENGTH.0, CATEGORY_LENGTH.1);
        if let Some(description) = &self.description {
            checks.length(
                "description",
                description,
                DESCRIPTION_LENGTH.0,
                DESCRIPTION_LENGTH.1,
            );
        }
        checks.range("price", &self.price, &min_price(), &max_price());
        checks.length(
            "contact_first_name",
            &self.contact_first_name,
            CONTACT_FIRST_NAME_LENGTH.0,
            CONTACT_FIRST_NAME_LENGTH.1,
        );
        checks.length("suburb", &self.suburb, SUBURB_LENGTH.0, SUBURB_LENGTH.1);

        checks.finish()
    }
}

impl LeadContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();

        checks.length("full_name", &self.full_name, FULL_NAME_LENGTH.0, FULL_NAME_LENGTH.1);
        checks.that(is_valid_email(&self.email), "email must be a valid email address");
        checks.that(
            is_valid_phone_number(&self.phone_number),
            "phone_number must contain between 5 and 11 digits",
        );

        checks.finish()
    }
}
