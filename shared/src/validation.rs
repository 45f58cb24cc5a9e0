//! Validation utilities for the storefront

use rust_decimal::Decimal;
use validator::ValidationError;

// ============================================================================
// Field Validations
// ============================================================================

fn required(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

/// Reject empty or whitespace-only strings (used with `#[validate(custom)]`)
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    required(value, "This field is required")
}

/// Account names must have at least one visible character
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    required(value, "Name is required")
}

/// Review comments must have at least one visible character
pub fn validate_review_comment(value: &str) -> Result<(), ValidationError> {
    required(value, "Comment is required")
}

/// Check an email address after trimming surrounding whitespace.
///
/// Accounts are stored under the trimmed, lowercased address.
pub fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if !validator::validate_email(value.trim()) {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        return Err(err);
    }
    Ok(())
}

/// A coupon discount must be a percentage in (0, 100]
pub fn validate_discount_percent(discount: Decimal) -> Result<(), &'static str> {
    if discount <= Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err("Discount must be greater than 0 and at most 100");
    }
    Ok(())
}

/// A coupon code is 3-32 characters of letters, digits, `-` or `_`
pub fn validate_coupon_code(code: &str) -> Result<(), &'static str> {
    let len = code.chars().count();
    if !(3..=32).contains(&len) {
        return Err("Coupon code must be 3-32 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Coupon code may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Treat `None` and blank strings alike for partial updates
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Upload Validations
// ============================================================================

const IMAGE_TYPES: [&str; 3] = ["jpg", "jpeg", "png"];

/// Accept a file only when both its extension and its MIME type name an image
/// type of jpg, jpeg or png.
pub fn validate_image_upload(filename: &str, mime_type: &str) -> Result<(), &'static str> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = mime_type.to_ascii_lowercase();

    let ext_ok = IMAGE_TYPES.contains(&extension.as_str());
    let mime_ok = IMAGE_TYPES.iter().any(|t| mime.contains(t));

    if ext_ok && mime_ok {
        Ok(())
    } else {
        Err("Images only!")
    }
}

/// Reduce an uploaded file name to a safe basename.
///
/// Path components are stripped and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Paris").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_blank_name_and_comment_messages() {
        let err = validate_name(" \t ").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Name is required"));
        let err = validate_review_comment("   ").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Comment is required"));
        assert!(validate_name("Jane").is_ok());
    }

    #[test]
    fn test_validate_email_address_trims() {
        assert!(validate_email_address(" Jane@Example.com ").is_ok());
        assert!(validate_email_address("jane@example.com").is_ok());
        assert!(validate_email_address("   ").is_err());
        assert!(validate_email_address("not-an-email").is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(Decimal::from(10)).is_ok());
        assert!(validate_discount_percent(Decimal::from(100)).is_ok());
        assert!(validate_discount_percent(Decimal::ZERO).is_err());
        assert!(validate_discount_percent(Decimal::from(101)).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert!(validate_coupon_code("SAVE10").is_ok());
        assert!(validate_coupon_code("SUMMER_SALE-2024").is_ok());
        assert!(validate_coupon_code("AB").is_err());
        assert!(validate_coupon_code("SAVE 10").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_validate_image_upload() {
        assert!(validate_image_upload("photo.JPG", "image/jpeg").is_ok());
        assert!(validate_image_upload("photo.png", "image/png").is_ok());
        assert!(validate_image_upload("photo.jpeg", "image/jpeg").is_ok());
        // extension and mime must both match
        assert!(validate_image_upload("photo.gif", "image/gif").is_err());
        assert!(validate_image_upload("photo.png", "application/pdf").is_err());
        assert!(validate_image_upload("script.sh", "image/png").is_err());
        assert!(validate_image_upload("noextension", "image/png").is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\my pic.png"), "my_pic.png");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename(""), "upload");
    }

    proptest! {
        #[test]
        fn test_sanitized_names_stay_in_upload_dir(name in ".{0,64}") {
            let safe = sanitize_filename(&name);
            prop_assert!(!safe.is_empty());
            prop_assert!(!safe.starts_with('.'));
            prop_assert!(safe
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
        }
    }
}
