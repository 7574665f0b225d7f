//! The `SafetyStore` persistence gateway and its query types.
//!
//! The trait is implemented by storage backends (e.g. `aerosafe-store-sqlite`).
//! The engine and higher layers depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  action::{ActionStatus, CorrectiveAction},
  aircraft::{Aircraft, AircraftStatus},
  investigation::{Investigation, InvestigationUpdate, Stage},
  occurrence::{Occurrence, OccurrenceStatus, OccurrenceType},
  profile::Profile,
  trailer::FuelTrailer,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`SafetyStore::list_occurrences`]. Results are ordered
/// newest-reported first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrenceQuery {
  pub status:          Option<OccurrenceStatus>,
  /// Exclude closed occurrences. Ignored when `status` is set.
  #[serde(default)]
  pub open_only:       bool,
  pub occurrence_type: Option<OccurrenceType>,
  /// Occurrences involving this aircraft.
  pub aircraft_id:     Option<Uuid>,
  pub occurred_after:  Option<DateTime<Utc>>,
  /// Case-insensitive substring of the title.
  pub text:            Option<String>,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

/// Parameters for [`SafetyStore::list_investigations`]. Newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvestigationQuery {
  pub stage:         Option<Stage>,
  pub created_after: Option<DateTime<Utc>>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSort {
  Title,
  Status,
  #[default]
  DueDate,
}

/// Parameters for [`SafetyStore::list_actions`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionQuery {
  pub status:           Option<ActionStatus>,
  pub investigation_id: Option<Uuid>,
  /// Case-insensitive substring of the title or description.
  pub text:             Option<String>,
  #[serde(default)]
  pub sort:             ActionSort,
  #[serde(default)]
  pub descending:       bool,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftSort {
  #[default]
  Registration,
  Type,
  Model,
  Status,
}

/// Parameters for [`SafetyStore::list_aircraft`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AircraftQuery {
  pub status:        Option<AircraftStatus>,
  #[serde(rename = "type")]
  pub aircraft_type: Option<String>,
  /// Case-insensitive substring of registration, model or type.
  pub text:          Option<String>,
  #[serde(default)]
  pub sort:          AircraftSort,
  #[serde(default)]
  pub descending:    bool,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// A single record write. Updates replace every mutable column of the row;
/// the `Reconcile*` variants touch only status and `updated_at`.
#[derive(Debug, Clone)]
pub enum Write {
  InsertProfile(Profile),
  InsertOccurrence(Occurrence),
  UpdateOccurrence(Occurrence),
  InsertInvestigation(Investigation),
  UpdateInvestigation(Investigation),
  InsertUpdate(InvestigationUpdate),
  InsertAction(CorrectiveAction),
  UpdateAction(CorrectiveAction),
  InsertAircraft(Aircraft),
  UpdateAircraft(Aircraft),
  InsertTrailer(FuelTrailer),
  UpdateTrailer(FuelTrailer),
  /// Move an action's status from `from` to `to`. Applies only while the row
  /// still holds `from`; otherwise it is a no-op and the batch carries on.
  ReconcileActionStatus {
    action_id: Uuid,
    from:      ActionStatus,
    to:        ActionStatus,
    at:        DateTime<Utc>,
  },
  /// Guarded occurrence status change, with the same rules as
  /// [`Write::ReconcileActionStatus`].
  ReconcileOccurrenceStatus {
    occurrence_id: Uuid,
    from:          OccurrenceStatus,
    to:            OccurrenceStatus,
    at:            DateTime<Utc>,
  },
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Every occurrence, investigation and corrective action, read in one go for
/// reporting and reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub occurrences:    Vec<Occurrence>,
  pub investigations: Vec<Investigation>,
  pub actions:        Vec<CorrectiveAction>,
  /// Rows that failed to parse and were left out.
  pub rejected:       usize,
}

// ─── Backend errors ──────────────────────────────────────────────────────────

/// How a backend failure surfaces through [`crate::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// A stored value does not parse into its domain type.
  DataIntegrity,
  /// A write broke a uniqueness rule.
  Conflict,
  Other,
}

/// Error type of a [`SafetyStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an aerosafe storage backend.
///
/// Reads return fully typed records; the backend is the parsing boundary.
/// All writes go through [`SafetyStore::apply`], which commits a batch
/// atomically: either every write lands or none does.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SafetyStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Commit `batch` in a single transaction. An update that matches no row
  /// fails the whole batch; a guarded `Reconcile*` write that finds the row
  /// changed is skipped instead.
  fn apply(
    &self,
    batch: Vec<Write>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// All profiles ordered by full name.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  // ── Occurrences ───────────────────────────────────────────────────────

  fn get_occurrence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Occurrence>, Self::Error>> + Send + '_;

  fn list_occurrences<'a>(
    &'a self,
    query: &'a OccurrenceQuery,
  ) -> impl Future<Output = Result<Vec<Occurrence>, Self::Error>> + Send + 'a;

  // ── Investigations ────────────────────────────────────────────────────

  fn get_investigation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Investigation>, Self::Error>> + Send + '_;

  /// The investigation owned by `occurrence_id`, if one has been started.
  fn investigation_for(
    &self,
    occurrence_id: Uuid,
  ) -> impl Future<Output = Result<Option<Investigation>, Self::Error>> + Send + '_;

  fn list_investigations<'a>(
    &'a self,
    query: &'a InvestigationQuery,
  ) -> impl Future<Output = Result<Vec<Investigation>, Self::Error>> + Send + 'a;

  /// Progress notes for an investigation, oldest first.
  fn list_updates(
    &self,
    investigation_id: Uuid,
  ) -> impl Future<Output = Result<Vec<InvestigationUpdate>, Self::Error>> + Send + '_;

  // ── Corrective actions ────────────────────────────────────────────────

  fn get_action(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CorrectiveAction>, Self::Error>> + Send + '_;

  fn list_actions<'a>(
    &'a self,
    query: &'a ActionQuery,
  ) -> impl Future<Output = Result<Vec<CorrectiveAction>, Self::Error>> + Send + 'a;

  // ── Fleet ─────────────────────────────────────────────────────────────

  fn get_aircraft(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Aircraft>, Self::Error>> + Send + '_;

  fn list_aircraft<'a>(
    &'a self,
    query: &'a AircraftQuery,
  ) -> impl Future<Output = Result<Vec<Aircraft>, Self::Error>> + Send + 'a;

  fn get_trailer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FuelTrailer>, Self::Error>> + Send + '_;

  /// All trailers ordered by name.
  fn list_trailers(
    &self,
  ) -> impl Future<Output = Result<Vec<FuelTrailer>, Self::Error>> + Send + '_;

  // ── Reporting ─────────────────────────────────────────────────────────

  /// Read every occurrence, investigation and action. Malformed rows are
  /// skipped and counted in [`Snapshot::rejected`] rather than failing the
  /// whole read.
  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}
