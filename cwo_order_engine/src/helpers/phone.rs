use regex::Regex;
use thiserror::Error;

/// The rejection carries the caller's original, un-normalized input so error messages can
/// echo exactly what was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid mobile number format. Expected 10 digits starting with 6-9. Received: {0}")]
pub struct InvalidMobileNumber(pub String);

/// Normalizes an Indian mobile number: strips all whitespace and a leading `+91`, then
/// requires exactly ten digits starting with 6-9.
pub fn normalize_mobile_number(raw: &str) -> Result<String, InvalidMobileNumber> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("+91").unwrap_or(&cleaned).to_string();
    let re = Regex::new(r"^[6-9]\d{9}$").expect("hardcoded regex is valid");
    if re.is_match(&cleaned) {
        Ok(cleaned)
    } else {
        Err(InvalidMobileNumber(raw.to_string()))
    }
}
