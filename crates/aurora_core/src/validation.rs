//! Checkout and profile form field validation.
//!
//! # Invariants
//! - Validators trim surrounding whitespace before matching.
//! - Each failure names its field so the UI can pick the translated message
//!   at `checkout.errors.<field>`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{7,18}[0-9]$").expect("valid phone regex"));
static POSTAL_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{2,8}[A-Za-z0-9]$").expect("valid postal code regex")
});
static CARD_HOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}][\p{L}'\.\-]*(\s+[\p{L}][\p{L}'\.\-]*)+$")
        .expect("valid card holder regex")
});
static CARD_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13,19}$").expect("valid card number regex"));
static CARD_EXPIRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("valid card expiry regex"));

/// Form field identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Phone,
    PostalCode,
    CardHolder,
    CardNumber,
    CardExpiry,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::PostalCode => "postal_code",
            Self::CardHolder => "card_holder",
            Self::CardNumber => "card_number",
            Self::CardExpiry => "card_expiry",
        }
    }

    /// Translation key of the field's error message.
    pub fn message_key(self) -> String {
        format!("checkout.errors.{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty(Field),
    Invalid(Field),
    Expired,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::Empty(field) | Self::Invalid(field) => *field,
            Self::Expired => Field::CardExpiry,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(field) => write!(f, "{} is required", field.as_str()),
            Self::Invalid(field) => write!(f, "{} is invalid", field.as_str()),
            Self::Expired => write!(f, "card is expired"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_email(value: &str) -> ValidationResult {
    match_field(Field::Email, &EMAIL_RE, value)
}

pub fn validate_phone(value: &str) -> ValidationResult {
    match_field(Field::Phone, &PHONE_RE, value)
}

pub fn validate_postal_code(value: &str) -> ValidationResult {
    match_field(Field::PostalCode, &POSTAL_CODE_RE, value)
}

pub fn validate_card_holder(value: &str) -> ValidationResult {
    match_field(Field::CardHolder, &CARD_HOLDER_RE, value)
}

/// Accepts 13-19 digits (spaces and dashes ignored) passing the Luhn check.
pub fn validate_card_number(value: &str) -> ValidationResult {
    let digits: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.is_empty() {
        return Err(ValidationError::Empty(Field::CardNumber));
    }
    if !CARD_NUMBER_RE.is_match(&digits) || !luhn_valid(&digits) {
        return Err(ValidationError::Invalid(Field::CardNumber));
    }
    Ok(())
}

/// Accepts `MM/YY` not earlier than `(current_year, current_month)`.
///
/// `current_year` is the full year (e.g. 2026).
pub fn validate_card_expiry(
    value: &str,
    current_year: u32,
    current_month: u32,
) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(Field::CardExpiry));
    }
    let captures = CARD_EXPIRY_RE
        .captures(trimmed)
        .ok_or(ValidationError::Invalid(Field::CardExpiry))?;
    let month: u32 = captures[1]
        .parse()
        .map_err(|_| ValidationError::Invalid(Field::CardExpiry))?;
    let year: u32 = captures[2]
        .parse()
        .map_err(|_| ValidationError::Invalid(Field::CardExpiry))?;
    let year = 2000 + year;
    if (year, month) < (current_year, current_month) {
        return Err(ValidationError::Expired);
    }
    Ok(())
}

fn match_field(field: Field, pattern: &Regex, value: &str) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if !pattern.is_match(trimmed) {
        return Err(ValidationError::Invalid(field));
    }
    Ok(())
}

fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (index, c) in digits.chars().rev().enumerate() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::{
        validate_card_expiry, validate_card_holder, validate_card_number, validate_email,
        validate_phone, validate_postal_code, Field, ValidationError,
    };

    #[test]
    fn email_accepts_common_forms_and_rejects_garbage() {
        assert!(validate_email("ana.garcia+shop@example.co.uk").is_ok());
        assert_eq!(
            validate_email("ana@"),
            Err(ValidationError::Invalid(Field::Email))
        );
        assert_eq!(validate_email("   "), Err(ValidationError::Empty(Field::Email)));
    }

    #[test]
    fn phone_and_postal_code() {
        assert!(validate_phone("+34 600 123 456").is_ok());
        assert!(validate_phone("12ab").is_err());
        assert!(validate_postal_code("28013").is_ok());
        assert!(validate_postal_code("SW1A 1AA").is_ok());
        assert!(validate_postal_code("1").is_err());
    }

    #[test]
    fn card_holder_requires_two_words() {
        assert!(validate_card_holder("María José Núñez").is_ok());
        assert!(validate_card_holder("Madonna").is_err());
    }

    #[test]
    fn card_number_uses_luhn() {
        assert!(validate_card_number("4242 4242 4242 4242").is_ok());
        assert_eq!(
            validate_card_number("4242 4242 4242 4241"),
            Err(ValidationError::Invalid(Field::CardNumber))
        );
    }

    #[test]
    fn card_expiry_compares_against_current_month() {
        assert!(validate_card_expiry("10/26", 2026, 10).is_ok());
        assert_eq!(
            validate_card_expiry("09/26", 2026, 10),
            Err(ValidationError::Expired)
        );
        assert_eq!(
            validate_card_expiry("13/30", 2026, 10),
            Err(ValidationError::Invalid(Field::CardExpiry))
        );
    }

    #[test]
    fn message_key_points_at_checkout_errors() {
        assert_eq!(Field::PostalCode.message_key(), "checkout.errors.postal_code");
    }
}
