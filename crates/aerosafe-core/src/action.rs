//! Corrective actions produced by investigations.
//!
//! `overdue` is a derived status: an action is overdue exactly when it is not
//! completed and its due date lies in the past. [`CorrectiveAction::is_overdue_at`]
//! is the single predicate behind both the stored status and the reporting
//! count.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::{require_four_digit_year, require_text},
};

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
pub enum ActionStatus {
  #[default]
  Pending,
  InProgress,
  Completed,
  Overdue,
}

/// True when a non-completed action's due date has passed at `now`.
///
/// A due date counts from the start of that day in UTC.
pub fn is_overdue(
  status: ActionStatus,
  due_date: Option<NaiveDate>,
  now: DateTime<Utc>,
) -> bool {
  status != ActionStatus::Completed
    && due_date.is_some_and(|due| due.and_time(NaiveTime::MIN).and_utc() < now)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveAction {
  pub action_id:        Uuid,
  pub investigation_id: Uuid,
  pub title:            String,
  pub description:      String,
  pub assigned_to:      Option<Uuid>,
  pub status:           ActionStatus,
  pub due_date:         Option<NaiveDate>,
  pub completed_at:     Option<DateTime<Utc>>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl CorrectiveAction {
  pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
    is_overdue(self.status, self.due_date, now)
  }

  /// The status this action should carry at `now`.
  ///
  /// Actions past due become `overdue`; an `overdue` action whose due date
  /// no longer lies in the past drops back to `pending`. Everything else is
  /// kept.
  pub fn reconciled_status(&self, now: DateTime<Utc>) -> ActionStatus {
    if self.is_overdue_at(now) {
      ActionStatus::Overdue
    } else if self.status == ActionStatus::Overdue {
      ActionStatus::Pending
    } else {
      self.status
    }
  }
}

/// Input to [`crate::Engine::add_corrective_action`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCorrectiveAction {
  pub title:       String,
  pub description: String,
  pub assigned_to: Option<Uuid>,
  pub due_date:    Option<NaiveDate>,
}

impl NewCorrectiveAction {
  pub fn validate(&self) -> Result<()> {
    require_text("title", &self.title)?;
    require_text("description", &self.description)?;
    let Some(due) = self.due_date else {
      return Err(Error::validation("due date is required"));
    };
    require_four_digit_year("due date", due.year())
  }
}
