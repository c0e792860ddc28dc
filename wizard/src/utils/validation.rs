// Input validation utilities
// Per-step rules for the lead wizard. Only Identity and Contact block.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::form::FormData;
use crate::models::industry::Industry;

/// Minimal `local@domain.tld` shape check, not RFC 5322.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s]+$").expect("email regex is valid"));

/// North-American style numbers with optional `+`, parentheses and separators.
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$")
        .expect("phone regex is valid")
});

/// How strictly the phone number is checked on the Contact step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonePolicy {
    /// Any non-blank value.
    #[default]
    Required,
    /// Non-blank and matching the phone pattern.
    Pattern,
}

/// A failed step validation. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your business name.")]
    MissingBusinessName,
    #[error("Please enter your name.")]
    MissingContactName,
    #[error("Please select your industry.")]
    MissingIndustry,
    #[error("Please tell us what industry you're in.")]
    MissingOtherIndustry,
    #[error("Please enter your city.")]
    MissingCity,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter your phone number.")]
    MissingPhone,
    #[error("Please enter a valid phone number so we can text you the preview.")]
    InvalidPhone,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone.trim())
}

/// Identity step: first failing rule wins, in field order.
pub fn validate_identity(form: &FormData) -> Result<(), ValidationError> {
    if form.business_name.trim().is_empty() {
        return Err(ValidationError::MissingBusinessName);
    }
    if form.contact_name.trim().is_empty() {
        return Err(ValidationError::MissingContactName);
    }
    let Some(industry) = form.industry else {
        return Err(ValidationError::MissingIndustry);
    };
    if industry == Industry::Other && form.other_industry.trim().is_empty() {
        return Err(ValidationError::MissingOtherIndustry);
    }
    if form.city.trim().is_empty() {
        return Err(ValidationError::MissingCity);
    }
    Ok(())
}

/// Contact step: email shape is checked before the phone.
pub fn validate_contact(form: &FormData, phone_policy: PhonePolicy) -> Result<(), ValidationError> {
    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    let phone = form.phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if phone_policy == PhonePolicy::Pattern && !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}
