// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{NewAgency, NewClient, NewCollector};
use rust_decimal::Decimal;

/// Minimum length of a national identity card number.
const CNI_MIN_LEN: usize = 8;
/// Maximum length of a national identity card number.
const CNI_MAX_LEN: usize = 20;
/// Maximum length of an agency code.
const AGENCY_CODE_MAX_LEN: usize = 10;

/// Validates that a display name is present.
///
/// # Arguments
///
/// * `name` - The name to validate
///
/// # Errors
///
/// Returns an error if the name is empty or whitespace only.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a national identity card number.
///
/// # Arguments
///
/// * `cni` - The CNI to validate
///
/// # Errors
///
/// Returns an error if the CNI is not 8 to 20 ASCII alphanumeric characters.
pub fn validate_cni(cni: &str) -> Result<(), DomainError> {
    let len: usize = cni.len();
    if !(CNI_MIN_LEN..=CNI_MAX_LEN).contains(&len) {
        return Err(DomainError::InvalidCni(format!(
            "CNI must be between {CNI_MIN_LEN} and {CNI_MAX_LEN} characters, got {len}"
        )));
    }
    if !cni.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidCni(format!(
            "CNI must be alphanumeric, got '{cni}'"
        )));
    }
    Ok(())
}

/// Validates an agency code.
///
/// # Arguments
///
/// * `code` - The code to validate
///
/// # Errors
///
/// Returns an error if the code is empty, longer than 10 characters, or
/// contains anything but uppercase ASCII letters and digits.
pub fn validate_agency_code(code: &str) -> Result<(), DomainError> {
    if code.is_empty() {
        return Err(DomainError::InvalidAgencyCode(String::from(
            "Agency code cannot be empty",
        )));
    }
    if code.len() > AGENCY_CODE_MAX_LEN {
        return Err(DomainError::InvalidAgencyCode(format!(
            "Agency code must be at most {AGENCY_CODE_MAX_LEN} characters, got {}",
            code.len()
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(DomainError::InvalidAgencyCode(format!(
            "Agency code must be uppercase letters and digits, got '{code}'"
        )));
    }
    Ok(())
}

/// Validates that an amount is strictly positive.
///
/// # Errors
///
/// Returns an error if the amount is zero or negative.
pub fn validate_positive_amount(field: &str, amount: Decimal) -> Result<(), DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::NonPositiveAmount {
            field: field.to_string(),
            amount,
        });
    }
    Ok(())
}

/// Validates an agency registration.
///
/// # Errors
///
/// Returns an error if the code or name is invalid.
pub fn validate_new_agency(agency: &NewAgency) -> Result<(), DomainError> {
    validate_agency_code(&agency.code)?;
    validate_name(&agency.name)
}

/// Validates a collector registration.
///
/// # Errors
///
/// Returns an error if the name is empty or the maximum withdrawal is not
/// positive.
pub fn validate_new_collector(collector: &NewCollector) -> Result<(), DomainError> {
    validate_name(&collector.name)?;
    validate_positive_amount("max_withdrawal", collector.max_withdrawal)
}

/// Validates a client registration.
///
/// Uniqueness of the CNI is enforced by the store, not here.
///
/// # Errors
///
/// Returns an error if the name or CNI is invalid.
pub fn validate_new_client(client: &NewClient) -> Result<(), DomainError> {
    validate_name(&client.name)?;
    validate_cni(&client.cni)
}
