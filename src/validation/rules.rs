use std::borrow::Cow;

use validator::ValidationError;

pub const MAX_LABEL_LEN: usize = 64;

/// Labels are spliced into Cypher text, so only identifier-shaped labels pass:
/// a leading ASCII letter or underscore followed by letters, digits or underscores.
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(label_error("label must be between 1 and 64 characters"));
    }

    let mut chars = label.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !leading_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(label_error(
            "label may contain only ASCII letters, digits and underscores and must not start with a digit",
        ));
    }

    Ok(())
}

fn label_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("label");
    error.message = Some(Cow::Borrowed(message));
    error
}
