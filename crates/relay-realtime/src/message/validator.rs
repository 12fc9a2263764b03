//! Message validation rules.

use relay_core::error::AppError;

/// Maximum channel name length in bytes.
const MAX_CHANNEL_NAME: usize = 256;

/// Validates a raw inbound text frame.
pub fn validate_inbound(raw: &str, max_size: usize) -> Result<(), AppError> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates channel name format.
pub fn validate_channel_name(channel: &str) -> Result<(), AppError> {
    if channel.trim().is_empty() || channel.len() > MAX_CHANNEL_NAME {
        return Err(AppError::validation("Invalid channel name length"));
    }

    if channel.chars().any(char::is_control) {
        return Err(AppError::validation(
            "Channel name contains invalid characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_limits() {
        assert!(validate_inbound(r#"{"event":"join"}"#, 64).is_ok());
        assert!(validate_inbound("   ", 64).is_err());
        assert!(validate_inbound(&"x".repeat(65), 64).is_err());
    }

    #[test]
    fn test_channel_names() {
        assert!(validate_channel_name("team.sales/eu").is_ok());
        assert!(validate_channel_name("").is_err());
        assert!(validate_channel_name("bad\nname").is_err());
        assert!(validate_channel_name(&"c".repeat(257)).is_err());
    }
}
