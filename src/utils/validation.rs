use crate::utils::error::ConfigError;

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<(), ConfigError> {
    if value < min_value {
        return Err(ConfigError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Shape check only: one `@`, non-empty local part, dotted domain.
pub fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("store_timeout_ms", 5, 1).is_ok());
        assert!(validate_positive_number("store_timeout_ms", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("min_duration_minutes", 15, 1, 180).is_ok());
        assert!(validate_range("min_duration_minutes", 0, 1, 180).is_err());
        assert!(validate_range("min_duration_minutes", 181, 1, 180).is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_well_formed_email("john@example.com"));
        assert!(!is_well_formed_email("john.example.com"));
        assert!(!is_well_formed_email("@example.com"));
        assert!(!is_well_formed_email("john@localhost"));
        assert!(!is_well_formed_email("jo hn@example.com"));
    }
}
