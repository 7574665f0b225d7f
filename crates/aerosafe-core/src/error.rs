//! Error types for `aerosafe-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::store::{StoreError, StoreErrorKind};

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed. Surfaced to the user as-is.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The requested state change is not permitted from the current state.
  #[error("invalid transition: {0}")]
  InvalidTransition(String),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  /// The write collides with an existing record, e.g. a duplicate
  /// registration or email.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A stored record could not be parsed into its typed form.
  #[error("data integrity error: {0}")]
  DataIntegrity(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn not_found(kind: &'static str, id: Uuid) -> Self {
    Self::NotFound { kind, id }
  }

  /// Translate a backend error by its [`StoreErrorKind`]. Only
  /// [`StoreErrorKind::Other`] is boxed into [`Error::Store`].
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.kind() {
      StoreErrorKind::DataIntegrity => Self::DataIntegrity(e.to_string()),
      StoreErrorKind::Conflict => Self::Conflict(e.to_string()),
      StoreErrorKind::Other => Self::Store(Box::new(e)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject a blank (empty or whitespace-only) required text field.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(())
}

/// Reject dates outside years 0000 to 9999, which have no fixed-width
/// text form.
pub(crate) fn require_four_digit_year(field: &str, year: i32) -> Result<()> {
  if !(0..=9999).contains(&year) {
    return Err(Error::Validation(format!(
      "{field} year {year} is outside 0000-9999"
    )));
  }
  Ok(())
}
