// 📐 Request Validation
// Boundary checks shared by the CLI and the HTTP API. The engine itself
// trusts its inputs.

use crate::error::ValidationError;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// Exactly two ASCII uppercase letters (ISO 3166-1 alpha-2 shape)
pub fn validate_country_code(field: &str, code: &str) -> Result<(), ValidationError> {
    if code.len() != 2 {
        return Err(ValidationError::new(
            field,
            "Country code must be exactly 2 characters",
        ));
    }
    if !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            field,
            "Country code must be 2 uppercase letters",
        ));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if year < MIN_YEAR {
        return Err(ValidationError::new(
            "year",
            format!("Year must be {} or later", MIN_YEAR),
        ));
    }
    if year > MAX_YEAR {
        return Err(ValidationError::new(
            "year",
            format!("Year must be {} or earlier", MAX_YEAR),
        ));
    }
    Ok(())
}

/// Split a comma-separated list, dropping blanks
pub fn split_country_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// At least one code, every code well-formed; all problems reported at once
pub fn validate_country_codes(codes: &[String]) -> ValidationResult<()> {
    if codes.is_empty() {
        return Err(vec![ValidationError::new(
            "countryCodes",
            "At least one country code must be provided",
        )]);
    }

    let errors: Vec<ValidationError> = codes
        .iter()
        .enumerate()
        .filter_map(|(i, code)| {
            validate_country_code(&format!("countryCodes[{}]", i), code).err()
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collect the errors of several independent checks
pub fn collect(checks: Vec<Result<(), ValidationError>>) -> ValidationResult<()> {
    let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
