//! Input validation helpers
//!
//! Payload structs in `shared::models` declare their limits with
//! `validator::Validate`; this module turns failures into [`AppError`] and
//! adds the checks derive attributes can't express (blank strings).

use std::collections::HashMap;

use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

/// Notes, descriptions, reasons (refund reason, order note, etc.)
pub const MAX_NOTE_LEN: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Trim and drop empty optional text
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert `validator` errors into a `ValidationFailed` error.
///
/// `details.fields` maps each failing field path (`items[0].quantity`) to its
/// error codes.
pub fn validation_error(errors: &ValidationErrors) -> AppError {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    collect_field_errors(String::new(), errors, &mut fields);

    let mut names: Vec<&String> = fields.keys().collect();
    names.sort();
    let message = match names.first() {
        Some(first) if names.len() == 1 => format!("Invalid field: {first}"),
        Some(_) => format!(
            "Invalid fields: {}",
            names.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ),
        None => "Validation failed".to_string(),
    };

    let details: serde_json::Map<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect();

    AppError::validation(message).with_detail("fields", Value::Object(details))
}

fn collect_field_errors(
    prefix: String,
    errors: &ValidationErrors,
    out: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.entry(path)
                    .or_default()
                    .extend(errs.iter().map(|e| e.code.to_string()));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_field_errors(format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;
    use shared::models::{GuestOrderCreate, OrderItemInput};
    use validator::Validate;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("ok", "reason", 10).is_ok());
        assert!(validate_required_text("   ", "reason", 10).is_err());
        assert!(validate_required_text("01234567890", "reason", 10).is_err());
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(Some("  hi ".into())), Some("hi".into()));
        assert_eq!(normalize_optional_text(Some("   ".into())), None);
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn test_nested_validation_error_paths() {
        let payload = GuestOrderCreate {
            items: vec![OrderItemInput {
                menu_item_id: 1,
                quantity: 0,
                notes: None,
            }],
            notes: None,
        };
        let errors = payload.validate().unwrap_err();
        let err = validation_error(&errors);

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let fields = &err.details.unwrap()["fields"];
        assert!(fields.get("items[0].quantity").is_some(), "{fields}");
    }
}
