//! Strict traversal of nested JSON objects along an ordered key path.

use serde_json::Value;
use thiserror::Error;

/// Failure while walking a key path through nested objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The named key could not be applied at its level, either because the
    /// level does not contain it or because the level is not an object.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    /// An empty path is a caller bug: returning the root unchanged would be
    /// ambiguous, so it is rejected outright.
    #[error("lookup path must contain at least one key")]
    EmptyPath,
}

impl LookupError {
    /// The first key that failed to apply, if any.
    #[must_use]
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            Self::KeyNotFound(key) => Some(key),
            Self::EmptyPath => None,
        }
    }
}

/// Walk `path` left to right through `map`, returning the value at the final
/// key.
///
/// Each step requires the current value to be a JSON object containing the
/// next key. The error reports exactly the first key that failed, never the
/// full path, and no partial result is returned.
///
/// # Errors
///
/// - [`LookupError::EmptyPath`] if `path` is empty.
/// - [`LookupError::KeyNotFound`] for the first key absent at its level (a
///   non-object mid-path counts as absence of the key being applied).
pub fn access_nested<'a>(map: &'a Value, path: &[&str]) -> Result<&'a Value, LookupError> {
    if path.is_empty() {
        return Err(LookupError::EmptyPath);
    }

    let mut current = map;
    for key in path {
        current = current
            .as_object()
            .and_then(|level| level.get(*key))
            .ok_or_else(|| LookupError::KeyNotFound((*key).to_string()))?;
    }
    Ok(current)
}
