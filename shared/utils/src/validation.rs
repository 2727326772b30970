use crate::error::{BomForgeError, BomForgeResult};
use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> BomForgeResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomForgeError::validation("model", error_messages))
        }
    }
}

/// Flattens field errors, including those of nested structs, into one message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => match error.code.as_ref() {
                            "length" => format!("Length validation failed for field '{}'", field),
                            "range" => format!("Value out of range for field '{}'", field),
                            "required" => format!("Field '{}' is required", field),
                            code => format!("Validation failed for field '{}': {}", field, code),
                        },
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, messages),
            ValidationErrorsKind::List(entries) => {
                for nested in entries.values() {
                    collect_messages(nested, messages);
                }
            }
        }
    }
}

pub fn validate_file_type(file_name: &str, allowed_types: &[String]) -> BomForgeResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&extension)) {
        return Err(BomForgeError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> BomForgeResult<()> {
    if file_size > max_size {
        return Err(BomForgeError::validation(
            "file_size",
            format!(
                "File size {} bytes exceeds maximum allowed size {} bytes",
                file_size, max_size
            ),
        ));
    }

    Ok(())
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,127}$").expect("identifier pattern is valid"))
}

/// Upload and conversion handles are interpolated into URL paths
pub fn validate_handle(field: &str, handle: &str) -> BomForgeResult<()> {
    if !identifier_regex().is_match(handle) {
        return Err(BomForgeError::validation(
            field,
            format!("'{}' is not a valid identifier", handle),
        ));
    }

    Ok(())
}
