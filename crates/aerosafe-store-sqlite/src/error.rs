//! Error type for `aerosafe-store-sqlite`.

use aerosafe_core::store::{StoreError, StoreErrorKind};
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored value does not decode into its domain type.
  #[error("data integrity error: {0}")]
  DataIntegrity(String),

  /// An update in a batch matched no row; the batch was rolled back.
  #[error("no {table} row with id {id}")]
  RowMissing { table: &'static str, id: uuid::Uuid },
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::DataIntegrity(_) | Error::Uuid(_) => StoreErrorKind::DataIntegrity,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(failure, _),
      )) if matches!(
        failure.extended_code,
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
      ) =>
      {
        StoreErrorKind::Conflict
      }
      _ => StoreErrorKind::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
