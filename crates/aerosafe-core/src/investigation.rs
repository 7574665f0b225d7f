//! Investigations and the fixed stage sequence they move through.
//!
//! Stages form a closed, totally ordered set. An investigation only ever
//! moves to the immediate successor of its current stage; `completed` is
//! terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{action::CorrectiveAction, occurrence::Occurrence};

// ─── Stage ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
  #[default]
  NotStarted,
  DataCollection,
  Analysis,
  Recommendations,
  Review,
  Completed,
}

impl Stage {
  /// Every stage, in order.
  pub const ALL: [Stage; 6] = [
    Stage::NotStarted,
    Stage::DataCollection,
    Stage::Analysis,
    Stage::Recommendations,
    Stage::Review,
    Stage::Completed,
  ];

  /// Position in the sequence, starting at 0 for `not_started`.
  pub fn index(self) -> usize { self as usize }

  /// The only stage this one may advance to, or `None` once completed.
  pub fn next(self) -> Option<Stage> {
    Self::ALL.get(self.index() + 1).copied()
  }

  pub fn is_terminal(self) -> bool { self == Stage::Completed }

  /// Fixed display mapping; never persisted.
  pub fn progress_percent(self) -> u8 {
    match self {
      Stage::NotStarted => 0,
      Stage::DataCollection => 20,
      Stage::Analysis => 40,
      Stage::Recommendations => 60,
      Stage::Review => 80,
      Stage::Completed => 100,
    }
  }
}

// ─── Duration ────────────────────────────────────────────────────────────────

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// How long an investigation has been (or was) running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum InvestigationDuration {
  NotStarted,
  /// Whole calendar days, partial days rounded up.
  Days(i64),
}

impl fmt::Display for InvestigationDuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NotStarted => f.write_str("Not started"),
      Self::Days(n) => write!(f, "{n} days"),
    }
  }
}

// ─── Investigation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
  pub investigation_id:     Uuid,
  /// Owning occurrence; at most one investigation per occurrence.
  pub occurrence_id:        Uuid,
  pub lead_investigator_id: Option<Uuid>,
  pub stage:                Stage,
  pub findings:             Option<String>,
  pub root_causes:          Option<String>,
  pub contributing_factors: Option<String>,
  pub recommendations:      Option<String>,
  pub started_at:           Option<DateTime<Utc>>,
  /// Set exactly when `stage` reaches [`Stage::Completed`].
  pub completed_at:         Option<DateTime<Utc>>,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
}

impl Investigation {
  /// A fresh investigation in the initial stage, started at `now`.
  pub fn open(
    occurrence_id: Uuid,
    lead_investigator_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      investigation_id: Uuid::new_v4(),
      occurrence_id,
      lead_investigator_id,
      stage: Stage::NotStarted,
      findings: None,
      root_causes: None,
      contributing_factors: None,
      recommendations: None,
      started_at: Some(now),
      completed_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn progress_percent(&self) -> u8 { self.stage.progress_percent() }

  /// Elapsed days from `started_at` to `completed_at`, or to `now` while
  /// still open. Uses `ceil(diff_ms / 86_400_000)`.
  pub fn duration(&self, now: DateTime<Utc>) -> InvestigationDuration {
    let Some(started) = self.started_at else {
      return InvestigationDuration::NotStarted;
    };
    let end = self.completed_at.unwrap_or(now);
    let millis = (end - started).num_milliseconds() as f64;
    InvestigationDuration::Days((millis / MILLIS_PER_DAY).ceil() as i64)
  }
}

/// Free-text results recorded while an investigation runs. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindingsPatch {
  pub lead_investigator_id: Option<Uuid>,
  pub findings:             Option<String>,
  pub root_causes:          Option<String>,
  pub contributing_factors: Option<String>,
  pub recommendations:      Option<String>,
}

impl FindingsPatch {
  pub fn apply_to(self, inv: &mut Investigation) {
    if let Some(lead) = self.lead_investigator_id {
      inv.lead_investigator_id = Some(lead);
    }
    if let Some(v) = self.findings {
      inv.findings = Some(v);
    }
    if let Some(v) = self.root_causes {
      inv.root_causes = Some(v);
    }
    if let Some(v) = self.contributing_factors {
      inv.contributing_factors = Some(v);
    }
    if let Some(v) = self.recommendations {
      inv.recommendations = Some(v);
    }
  }
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// An append-only progress note. Never modified after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationUpdate {
  pub update_id:        Uuid,
  pub investigation_id: Uuid,
  pub author_id:        Uuid,
  pub note:             String,
  pub created_at:       DateTime<Utc>,
}

// ─── Materialised view ───────────────────────────────────────────────────────

/// The computed read model for an investigation detail page, never stored,
/// always derived.
#[derive(Debug, Clone, Serialize)]
pub struct InvestigationView {
  pub investigation:      Investigation,
  pub occurrence:         Occurrence,
  /// Oldest first.
  pub updates:            Vec<InvestigationUpdate>,
  pub corrective_actions: Vec<CorrectiveAction>,
  pub progress_percent:   u8,
  pub duration:           InvestigationDuration,
  pub next_stage:         Option<Stage>,
  pub as_of:              DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
  }

  #[test]
  fn stages_advance_one_step_at_a_time() {
    let mut stage = Stage::NotStarted;
    let mut seen = vec![stage];
    while let Some(next) = stage.next() {
      assert_eq!(next.index(), stage.index() + 1);
      stage = next;
      seen.push(stage);
    }
    assert_eq!(seen, Stage::ALL);
    assert!(stage.is_terminal());
  }

  #[test]
  fn progress_mapping() {
    let pct: Vec<u8> = Stage::ALL.iter().map(|s| s.progress_percent()).collect();
    assert_eq!(pct, [0, 20, 40, 60, 80, 100]);
  }

  #[test]
  fn duration_rounds_partial_days_up() {
    let inv = Investigation::open(Uuid::new_v4(), None, at(2024, 1, 1, 0));
    assert_eq!(inv.duration(at(2024, 1, 3, 12)), InvestigationDuration::Days(3));
  }

  #[test]
  fn duration_uses_completed_at_when_set() {
    let mut inv = Investigation::open(Uuid::new_v4(), None, at(2024, 1, 1, 0));
    inv.stage = Stage::Completed;
    inv.completed_at = Some(at(2024, 1, 5, 0));
    assert_eq!(inv.duration(at(2024, 6, 1, 0)), InvestigationDuration::Days(4));
  }

  #[test]
  fn duration_zero_on_same_instant() {
    let inv = Investigation::open(Uuid::new_v4(), None, at(2024, 1, 1, 0));
    assert_eq!(inv.duration(at(2024, 1, 1, 0)), InvestigationDuration::Days(0));
  }

  #[test]
  fn duration_not_started_without_start() {
    let mut inv = Investigation::open(Uuid::new_v4(), None, at(2024, 1, 1, 0));
    inv.started_at = None;
    let d = inv.duration(at(2024, 1, 2, 0));
    assert_eq!(d, InvestigationDuration::NotStarted);
    assert_eq!(d.to_string(), "Not started");
    assert_eq!(InvestigationDuration::Days(3).to_string(), "3 days");
  }

  #[test]
  fn findings_patch_keeps_unset_fields() {
    let mut inv = Investigation::open(Uuid::new_v4(), None, at(2024, 1, 1, 0));
    inv.findings = Some("initial".into());
    FindingsPatch {
      root_causes: Some("fatigue".into()),
      ..Default::default()
    }
    .apply_to(&mut inv);
    assert_eq!(inv.findings.as_deref(), Some("initial"));
    assert_eq!(inv.root_causes.as_deref(), Some("fatigue"));
  }
}
