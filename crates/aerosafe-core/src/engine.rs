//! [`Engine`], the service that owns every state change.
//!
//! Operations are spread over several modules by concern:
//! [`crate::lifecycle`] (occurrences, investigations, corrective actions),
//! [`crate::fleet`] (aircraft, trailers, profiles), [`crate::reconcile`] and
//! [`crate::report`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  action::CorrectiveAction,
  clock::{Clock, SystemClock},
  investigation::Investigation,
  occurrence::Occurrence,
  store::{SafetyStore, Write},
};

/// Validates requests, stamps them with the clock, and commits the resulting
/// writes through the store.
pub struct Engine<S, C = SystemClock> {
  store: S,
  clock: C,
}

impl<S: SafetyStore> Engine<S> {
  /// An engine on wall-clock time.
  pub fn with_system_clock(store: S) -> Self { Self::new(store, SystemClock) }
}

impl<S: SafetyStore, C: Clock> Engine<S, C> {
  pub fn new(store: S, clock: C) -> Self { Self { store, clock } }

  /// Direct read access to the backing store.
  pub fn store(&self) -> &S { &self.store }

  pub fn now(&self) -> DateTime<Utc> { self.clock.now() }

  pub(crate) async fn commit(&self, batch: Vec<Write>) -> Result<()> {
    if batch.is_empty() {
      return Ok(());
    }
    self.store.apply(batch).await.map_err(Error::store)
  }

  pub(crate) async fn require_occurrence(&self, id: Uuid) -> Result<Occurrence> {
    self
      .store
      .get_occurrence(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found("occurrence", id))
  }

  pub(crate) async fn require_investigation(
    &self,
    id: Uuid,
  ) -> Result<Investigation> {
    self
      .store
      .get_investigation(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found("investigation", id))
  }

  pub(crate) async fn require_action(&self, id: Uuid) -> Result<CorrectiveAction> {
    self
      .store
      .get_action(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found("corrective action", id))
  }
}
