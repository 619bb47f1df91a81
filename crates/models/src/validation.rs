//! Reusable field checks. Each returns the human-readable reason on failure so
//! callers can collect them into a [`crate::errors::FieldErrors`] map.

pub fn required_text(value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be blank".into());
    }
    max_chars(value, max_len)
}

pub fn optional_text(value: Option<&str>, max_len: usize) -> Result<(), String> {
    match value {
        Some(v) => max_chars(v, max_len),
        None => Ok(()),
    }
}

pub fn max_chars(value: &str, max_len: usize) -> Result<(), String> {
    if value.chars().count() > max_len {
        return Err(format!("must be at most {max_len} characters"));
    }
    Ok(())
}
