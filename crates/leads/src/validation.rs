use crate::error::{LeadError, Result};
use crate::model::ContactInput;

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 320;
pub const PHONE_MAX: usize = 50;
pub const MESSAGE_MAX: usize = 5000;

/// A submission that passed validation, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Validate contact form fields. The first failing field is reported.
pub fn validate_contact(input: &ContactInput, min_message_len: usize) -> Result<ValidContact> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(LeadError::validation("name", "Name is required"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(LeadError::validation(
            "name",
            format!("Name must be at most {} characters", NAME_MAX),
        ));
    }

    let email = input.email.trim();
    if email.len() > EMAIL_MAX || !is_valid_email(email) {
        return Err(LeadError::validation("email", "Invalid email address"));
    }

    let phone = input
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(phone) = phone
        && phone.chars().count() > PHONE_MAX
    {
        return Err(LeadError::validation(
            "phone",
            format!("Phone must be at most {} characters", PHONE_MAX),
        ));
    }

    let message = input.message.trim();
    let message_len = message.chars().count();
    if message_len < min_message_len {
        return Err(LeadError::validation(
            "message",
            format!("Message must be at least {} characters", min_message_len),
        ));
    }
    if message_len > MESSAGE_MAX {
        return Err(LeadError::validation(
            "message",
            format!("Message must be at most {} characters", MESSAGE_MAX),
        ));
    }

    Ok(ValidContact {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        message: message.to_string(),
    })
}

/// Validate email format
/// Checks for basic RFC 5322 compliance without full regex
pub fn is_valid_email(email: &str) -> bool {
    // Must have exactly one @ symbol
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if email.chars().any(char::is_whitespace) {
        return false;
    }

    // Local part (before @) checks
    if local.is_empty() || local.len() > 64 {
        return false;
    }

    // Domain checks
    if domain.is_empty() || domain.len() > 255 {
        return false;
    }

    // Domain must have at least one dot
    if !domain.contains('.') {
        return false;
    }

    // Domain can't start/end with dot or hyphen
    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return false;
    }

    // No consecutive dots
    if domain.contains("..") {
        return false;
    }

    // Domain must have valid TLD (at least 2 chars after last dot)
    if let Some(last_dot) = domain.rfind('.') {
        let tld = &domain[last_dot + 1..];
        if tld.len() < 2 {
            return false;
        }
    }

    true
}
