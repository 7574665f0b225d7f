//! Occurrences: reported safety events.
//!
//! An occurrence's status is tied to its investigation: it becomes
//! `under_investigation` when one is started and `closed` when that
//! investigation completes or when the occurrence is marked invalid.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Result,
  error::{require_four_digit_year, require_text},
  investigation::{Investigation, Stage},
};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OccurrenceType {
  Incident,
  Accident,
  Hazard,
  Observation,
}

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
pub enum Severity {
  Low,
  #[default]
  Medium,
  High,
  Critical,
}

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
pub enum OccurrenceStatus {
  #[default]
  Reported,
  InReview,
  UnderInvestigation,
  Closed,
}

impl OccurrenceStatus {
  /// Anything not yet closed counts as open.
  pub fn is_open(self) -> bool { self != Self::Closed }
}

// ─── Occurrence ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
  pub occurrence_id:      Uuid,
  pub title:              String,
  /// When the event happened, distinct from when it was reported.
  pub occurred_at:        DateTime<Utc>,
  pub location:           String,
  pub occurrence_type:    OccurrenceType,
  pub severity:           Severity,
  pub status:             OccurrenceStatus,
  pub description:        String,
  pub aircraft_id:        Option<Uuid>,
  pub reporter_id:        Uuid,
  pub assigned_to:        Option<Uuid>,
  pub weather_conditions: Option<String>,
  pub flight_phase:       Option<String>,
  pub immediate_actions:  Option<String>,
  pub is_invalid:         bool,
  pub invalid_reason:     Option<String>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Occurrence {
  /// The status this occurrence must have given its investigation, or
  /// `None` if the current status already satisfies the invariant.
  ///
  /// Invalid or completed-investigation occurrences are closed; an open
  /// investigation means `under_investigation`; without an investigation the
  /// status may only be `reported` or `in_review`.
  pub fn required_status(
    &self,
    investigation: Option<&Investigation>,
  ) -> Option<OccurrenceStatus> {
    let required = match investigation {
      _ if self.is_invalid => OccurrenceStatus::Closed,
      Some(inv) if inv.stage == Stage::Completed => OccurrenceStatus::Closed,
      Some(_) => OccurrenceStatus::UnderInvestigation,
      None => match self.status {
        OccurrenceStatus::Reported | OccurrenceStatus::InReview => {
          return None;
        }
        _ => OccurrenceStatus::Reported,
      },
    };
    (self.status != required).then_some(required)
  }
}

// ─── NewOccurrence ───────────────────────────────────────────────────────────

/// Input to [`crate::Engine::report_occurrence`]. The reporter is taken from
/// the acting user, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOccurrence {
  pub title:              String,
  pub occurred_at:        DateTime<Utc>,
  pub location:           String,
  pub occurrence_type:    OccurrenceType,
  #[serde(default)]
  pub severity:           Severity,
  pub description:        String,
  pub aircraft_id:        Option<Uuid>,
  pub weather_conditions: Option<String>,
  pub flight_phase:       Option<String>,
  pub immediate_actions:  Option<String>,
}

impl NewOccurrence {
  pub fn validate(&self) -> Result<()> {
    require_text("title", &self.title)?;
    require_text("location", &self.location)?;
    require_text("description", &self.description)?;
    require_four_digit_year("occurrence date", self.occurred_at.year())
  }
}
