//! Reconciliation of derived statuses against the current date.
//!
//! Corrective actions drift into (and out of) `overdue` as time passes, and
//! an occurrence's status can disagree with its investigation if a write was
//! lost. [`plan`] computes the corrective writes as a pure function of a
//! snapshot; [`Engine::reconcile`] applies them. Running it twice in a row
//! changes nothing the second time.
//!
//! Planned writes are guarded on the status seen in the snapshot, so a row
//! changed by a request after the snapshot was taken is left as it is.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Engine, Error, Result,
  action::ActionStatus,
  clock::Clock,
  investigation::Investigation,
  store::{SafetyStore, Snapshot, Write},
};

/// Counts of records changed by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
  pub actions_marked_overdue: usize,
  pub actions_cleared:        usize,
  pub occurrences_repaired:   usize,
}

impl ReconcileSummary {
  pub fn is_noop(&self) -> bool { *self == Self::default() }
}

/// Compute the writes that bring `snapshot` in line with `now`.
pub fn plan(snapshot: &Snapshot, now: DateTime<Utc>) -> (Vec<Write>, ReconcileSummary) {
  let mut writes = Vec::new();
  let mut summary = ReconcileSummary::default();

  for action in &snapshot.actions {
    let status = action.reconciled_status(now);
    if status == action.status {
      continue;
    }
    if status == ActionStatus::Overdue {
      summary.actions_marked_overdue += 1;
    } else {
      summary.actions_cleared += 1;
    }
    writes.push(Write::ReconcileActionStatus {
      action_id: action.action_id,
      from:      action.status,
      to:        status,
      at:        now,
    });
  }

  let by_occurrence: HashMap<Uuid, &Investigation> = snapshot
    .investigations
    .iter()
    .map(|inv| (inv.occurrence_id, inv))
    .collect();

  for occurrence in &snapshot.occurrences {
    let investigation = by_occurrence.get(&occurrence.occurrence_id).copied();
    if let Some(status) = occurrence.required_status(investigation) {
      tracing::debug!(
        occurrence_id = %occurrence.occurrence_id,
        from = %occurrence.status,
        to = %status,
        "repairing occurrence status"
      );
      writes.push(Write::ReconcileOccurrenceStatus {
        occurrence_id: occurrence.occurrence_id,
        from:          occurrence.status,
        to:            status,
        at:            now,
      });
      summary.occurrences_repaired += 1;
    }
  }

  (writes, summary)
}

impl<S: SafetyStore, C: Clock> Engine<S, C> {
  /// Recompute overdue actions and occurrence statuses as of the clock's
  /// `now`, committing every change in one batch.
  pub async fn reconcile(&self) -> Result<ReconcileSummary> {
    let now = self.now();
    let snapshot = self.store().snapshot().await.map_err(Error::store)?;
    let (writes, summary) = plan(&snapshot, now);
    self.commit(writes).await?;
    if !summary.is_noop() {
      tracing::info!(
        marked_overdue = summary.actions_marked_overdue,
        cleared = summary.actions_cleared,
        occurrences_repaired = summary.occurrences_repaired,
        "reconciliation applied"
      );
    }
    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone};

  use super::*;
  use crate::{
    action::CorrectiveAction,
    investigation::Stage,
    occurrence::{Occurrence, OccurrenceStatus, OccurrenceType, Severity},
  };

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

  fn occurrence(status: OccurrenceStatus) -> Occurrence {
    Occurrence {
      occurrence_id: Uuid::new_v4(),
      title: "Runway incursion".into(),
      occurred_at: now(),
      location: "RWY 03L".into(),
      occurrence_type: OccurrenceType::Incident,
      severity: Severity::Critical,
      status,
      description: "Vehicle crossed hold short line".into(),
      aircraft_id: None,
      reporter_id: Uuid::new_v4(),
      assigned_to: None,
      weather_conditions: None,
      flight_phase: None,
      immediate_actions: None,
      is_invalid: false,
      invalid_reason: None,
      created_at: now(),
      updated_at: now(),
    }
  }

  fn action(status: ActionStatus, due: (i32, u32, u32)) -> CorrectiveAction {
    CorrectiveAction {
      action_id: Uuid::new_v4(),
      investigation_id: Uuid::new_v4(),
      title: "Repaint hold short markings".into(),
      description: "Markings faded".into(),
      assigned_to: None,
      status,
      due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
      completed_at: None,
      created_at: now(),
      updated_at: now(),
    }
  }

  #[test]
  fn marks_past_due_actions_overdue() {
    let snapshot = Snapshot {
      actions: vec![
        action(ActionStatus::Pending, (2024, 5, 1)),
        action(ActionStatus::InProgress, (2024, 7, 1)),
        action(ActionStatus::Completed, (2024, 1, 1)),
      ],
      ..Default::default()
    };
    let (writes, summary) = plan(&snapshot, now());
    assert_eq!(summary.actions_marked_overdue, 1);
    assert_eq!(writes.len(), 1);
    assert!(matches!(
      &writes[0],
      Write::ReconcileActionStatus {
        from: ActionStatus::Pending,
        to: ActionStatus::Overdue,
        ..
      }
    ));
  }

  #[test]
  fn repairs_occurrence_behind_its_investigation() {
    let occ = occurrence(OccurrenceStatus::UnderInvestigation);
    let mut inv = Investigation::open(occ.occurrence_id, None, now());
    inv.stage = Stage::Completed;
    inv.completed_at = Some(now());

    let snapshot = Snapshot {
      occurrences: vec![occ],
      investigations: vec![inv],
      ..Default::default()
    };
    let (writes, summary) = plan(&snapshot, now());
    assert_eq!(summary.occurrences_repaired, 1);
    assert!(matches!(
      &writes[0],
      Write::ReconcileOccurrenceStatus {
        from: OccurrenceStatus::UnderInvestigation,
        to: OccurrenceStatus::Closed,
        ..
      }
    ));
  }

  #[test]
  fn consistent_snapshot_plans_nothing() {
    let occ = occurrence(OccurrenceStatus::UnderInvestigation);
    let inv = Investigation::open(occ.occurrence_id, None, now());
    let snapshot = Snapshot {
      occurrences: vec![occ, occurrence(OccurrenceStatus::Reported)],
      investigations: vec![inv],
      actions: vec![action(ActionStatus::Overdue, (2024, 5, 1))],
      rejected: 0,
    };
    let (writes, summary) = plan(&snapshot, now());
    assert!(writes.is_empty());
    assert!(summary.is_noop());
  }
}
