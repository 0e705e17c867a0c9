//! Message validation rules.

use planhub_core::error::AppError;

/// Maximum allowed inbound message size in bytes.
const MAX_MESSAGE_SIZE: usize = 4_096;

/// Maximum channel name length.
const MAX_CHANNEL_NAME: usize = 64;

/// Validates a raw inbound frame before parsing.
pub fn validate_inbound(raw: &str) -> Result<(), AppError> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {MAX_MESSAGE_SIZE} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates channel name format.
pub fn validate_channel_name(channel: &str) -> Result<(), AppError> {
    if channel.is_empty() || channel.len() > MAX_CHANNEL_NAME {
        return Err(AppError::validation("Invalid channel name length"));
    }

    if !channel.chars().all(|c| c.is_ascii_alphanumeric() || c == ':') {
        return Err(AppError::validation(
            "Channel name contains invalid characters",
        ));
    }

    Ok(())
}
