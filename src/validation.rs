use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;
use crate::phone::normalize;

/// Minimum length of a phone after normalization.
pub const MIN_PHONE_LEN: usize = 10;
/// Maximum length of a phone after normalization.
pub const MAX_PHONE_LEN: usize = 20;

/// Creation payload: `{phone, address}`.
///
/// The phone is normalized before its length bounds are checked; the address
/// is checked as-is, no normalization is ever applied to it.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecord {
    pub phone: String,
    #[validate(length(min = 5, max = 500, message = "address must be between 5 and 500 characters"))]
    pub address: String,
}

impl CreateRecord {
    pub fn into_validated(mut self) -> Result<Self, ApiError> {
        self.phone = normalize(&self.phone);
        if self.phone.len() < MIN_PHONE_LEN {
            return Err(ApiError::Validation(format!(
                "phone: must contain at least {MIN_PHONE_LEN} digits"
            )));
        }
        if self.phone.len() > MAX_PHONE_LEN {
            return Err(ApiError::Validation(format!(
                "phone: must contain at most {MAX_PHONE_LEN} characters"
            )));
        }
        self.validate()
            .map_err(|e| ApiError::Validation(validation_detail(&e)))?;
        Ok(self)
    }
}

/// Update payload: `{address}` only; the phone comes from the path.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecord {
    #[validate(length(min = 5, max = 500, message = "address must be between 5 and 500 characters"))]
    pub address: String,
}

impl UpdateRecord {
    pub fn into_validated(self) -> Result<Self, ApiError> {
        self.validate()
            .map_err(|e| ApiError::Validation(validation_detail(&e)))?;
        Ok(self)
    }
}

/// Flattens derive-produced errors into one field-level message.
fn validation_detail(errors: &ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(err) = field_errors.first() {
            return match &err.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value"),
            };
        }
    }
    "invalid payload".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(phone: &str, address: &str) -> CreateRecord {
        CreateRecord {
            phone: phone.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn test_create_normalizes_phone() {
        let record = create("+7 (916) 123-45-67", "Main street 1").into_validated().unwrap();
        assert_eq!(record.phone, "+79161234567");
        assert_eq!(record.address, "Main street 1");
    }

    #[test]
    fn test_create_rejects_short_phone() {
        let err = create("12-34-56", "Main street 1").into_validated().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_overlong_phone() {
        let err = create("+123456789012345678901", "Main street 1")
            .into_validated()
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_short_address() {
        let err = create("+79161234567", "abcd").into_validated().unwrap_err();
        match err {
            ApiError::Validation(detail) => assert!(detail.contains("address")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_overlong_address() {
        let long = "a".repeat(501);
        assert!(create("+79161234567", &long).into_validated().is_err());
        let max = "a".repeat(500);
        assert!(create("+79161234567", &max).into_validated().is_ok());
    }

    #[test]
    fn test_update_address_bounds() {
        assert!(UpdateRecord { address: "abcd".into() }.into_validated().is_err());
        assert!(UpdateRecord { address: "abcde".into() }.into_validated().is_ok());
    }

    #[test]
    fn test_address_is_not_normalized() {
        let record = create("+79161234567", " 5, Main (street) ").into_validated().unwrap();
        assert_eq!(record.address, " 5, Main (street) ");
    }
}
