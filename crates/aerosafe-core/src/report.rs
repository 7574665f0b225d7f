//! Reporting aggregator.
//!
//! Everything here is a pure function over records already in memory; the
//! only fallible step is taking the [`Snapshot`], which happens in the store.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::{
  Engine, Error, Result,
  action::{ActionStatus, CorrectiveAction},
  clock::Clock,
  occurrence::{Occurrence, OccurrenceStatus, OccurrenceType, Severity},
  store::{SafetyStore, Snapshot},
};

/// Number of monthly buckets carried by [`SafetyReport`].
pub const REPORT_MONTHS: usize = 12;

/// Window used by [`DashboardStats::recent_occurrences`].
pub const RECENT_DAYS: i64 = 30;

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Count records by key. Records for which `key` yields `None` are left out,
/// so every count in the result is at least one.
pub fn count_by<T, K, F>(records: &[T], key: F) -> BTreeMap<K, usize>
where
  K: Ord,
  F: Fn(&T) -> Option<K>,
{
  let mut counts = BTreeMap::new();
  let mut skipped = 0usize;
  for record in records {
    match key(record) {
      Some(k) => *counts.entry(k).or_insert(0) += 1,
      None => skipped += 1,
    }
  }
  if skipped > 0 {
    tracing::debug!(skipped, "records without a grouping key left out");
  }
  counts
}

/// A calendar month in UTC, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
  pub year:  i32,
  pub month: u32,
}

impl YearMonth {
  pub fn of(at: DateTime<Utc>) -> Self {
    Self { year: at.year(), month: at.month() }
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl Serialize for YearMonth {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
  pub month: YearMonth,
  pub count: usize,
}

/// Occurrences per month of `occurred_at`, oldest month first. Months with
/// no occurrences are absent.
pub fn monthly_buckets(occurrences: &[Occurrence]) -> Vec<MonthBucket> {
  count_by(occurrences, |o| Some(YearMonth::of(o.occurred_at)))
    .into_iter()
    .map(|(month, count)| MonthBucket { month, count })
    .collect()
}

/// The last `n` buckets, still in chronological order.
pub fn recent(buckets: &[MonthBucket], n: usize) -> &[MonthBucket] {
  &buckets[buckets.len().saturating_sub(n)..]
}

/// Share of completed actions as a whole percentage. Zero when there are no
/// actions.
pub fn completion_rate(actions: &[CorrectiveAction]) -> u8 {
  if actions.is_empty() {
    return 0;
  }
  let completed = actions
    .iter()
    .filter(|a| a.status == ActionStatus::Completed)
    .count();
  let rate = (completed as f64 / actions.len() as f64 * 100.0).round();
  rate.clamp(0.0, 100.0) as u8
}

pub fn overdue_count(actions: &[CorrectiveAction], now: DateTime<Utc>) -> usize {
  actions.iter().filter(|a| a.is_overdue_at(now)).count()
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// The safety report page.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyReport {
  pub total_occurrences: usize,
  /// Occurrences whose status is anything but `closed`.
  pub open_occurrences:  usize,
  pub by_type:           BTreeMap<OccurrenceType, usize>,
  pub by_status:         BTreeMap<OccurrenceStatus, usize>,
  pub by_severity:       BTreeMap<Severity, usize>,
  pub action_status:     BTreeMap<ActionStatus, usize>,
  /// At most [`REPORT_MONTHS`] buckets, oldest first.
  pub monthly:           Vec<MonthBucket>,
  pub overdue_actions:   usize,
  pub completion_rate:   u8,
  /// Malformed rows left out of every figure above.
  pub rejected_rows:     usize,
  pub generated_at:      DateTime<Utc>,
}

impl SafetyReport {
  pub fn build(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
    let occurrences = &snapshot.occurrences;
    let actions = &snapshot.actions;
    let monthly = monthly_buckets(occurrences);

    Self {
      total_occurrences: occurrences.len(),
      open_occurrences:  occurrences.iter().filter(|o| o.status.is_open()).count(),
      by_type:           count_by(occurrences, |o| Some(o.occurrence_type)),
      by_status:         count_by(occurrences, |o| Some(o.status)),
      by_severity:       count_by(occurrences, |o| Some(o.severity)),
      action_status:     count_by(actions, |a| Some(a.status)),
      monthly:           recent(&monthly, REPORT_MONTHS).to_vec(),
      overdue_actions:   overdue_count(actions, now),
      completion_rate:   completion_rate(actions),
      rejected_rows:     snapshot.rejected,
      generated_at:      now,
    }
  }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
  pub open_occurrences:   usize,
  pub closed_occurrences: usize,
  /// Occurrences reported in the last [`RECENT_DAYS`] days.
  pub recent_occurrences: usize,
  /// Actions neither completed nor overdue.
  pub pending_actions:    usize,
  pub overdue_actions:    usize,
}

impl DashboardStats {
  pub fn build(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
    let since = now - TimeDelta::days(RECENT_DAYS);
    let occurrences = &snapshot.occurrences;
    let overdue_actions = overdue_count(&snapshot.actions, now);
    let pending_actions = snapshot
      .actions
      .iter()
      .filter(|a| a.status != ActionStatus::Completed && !a.is_overdue_at(now))
      .count();

    Self {
      open_occurrences: occurrences.iter().filter(|o| o.status.is_open()).count(),
      closed_occurrences: occurrences
        .iter()
        .filter(|o| !o.status.is_open())
        .count(),
      recent_occurrences: occurrences
        .iter()
        .filter(|o| o.created_at >= since)
        .count(),
      pending_actions,
      overdue_actions,
    }
  }
}

impl<S: SafetyStore, C: Clock> Engine<S, C> {
  pub async fn safety_report(&self) -> Result<SafetyReport> {
    let snapshot = self.store().snapshot().await.map_err(Error::store)?;
    Ok(SafetyReport::build(&snapshot, self.now()))
  }

  pub async fn dashboard(&self) -> Result<DashboardStats> {
    let snapshot = self.store().snapshot().await.map_err(Error::store)?;
    Ok(DashboardStats::build(&snapshot, self.now()))
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone};
  use uuid::Uuid;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
  }

  fn occurrence(
    occurred_at: DateTime<Utc>,
    occurrence_type: OccurrenceType,
    status: OccurrenceStatus,
  ) -> Occurrence {
    Occurrence {
      occurrence_id: Uuid::new_v4(),
      title: "Bird strike on approach".into(),
      occurred_at,
      location: "Final RWY 27".into(),
      occurrence_type,
      severity: Severity::Medium,
      status,
      description: "Single gull, no damage found".into(),
      aircraft_id: None,
      reporter_id: Uuid::new_v4(),
      assigned_to: None,
      weather_conditions: None,
      flight_phase: Some("approach".into()),
      immediate_actions: None,
      is_invalid: false,
      invalid_reason: None,
      created_at: occurred_at,
      updated_at: occurred_at,
    }
  }

  fn action(status: ActionStatus, due: Option<NaiveDate>) -> CorrectiveAction {
    CorrectiveAction {
      action_id: Uuid::new_v4(),
      investigation_id: Uuid::new_v4(),
      title: "Review wildlife hazard plan".into(),
      description: "Update dispersal procedures".into(),
      assigned_to: None,
      status,
      due_date: due,
      completed_at: None,
      created_at: at(2024, 1, 1),
      updated_at: at(2024, 1, 1),
    }
  }

  #[test]
  fn completion_rate_of_nothing_is_zero() {
    assert_eq!(completion_rate(&[]), 0);
  }

  #[test]
  fn completion_rate_rounds() {
    let half = [
      action(ActionStatus::Completed, None),
      action(ActionStatus::Pending, None),
    ];
    assert_eq!(completion_rate(&half), 50);

    let third = [
      action(ActionStatus::Completed, None),
      action(ActionStatus::Pending, None),
      action(ActionStatus::InProgress, None),
    ];
    assert_eq!(completion_rate(&third), 33);
  }

  #[test]
  fn count_by_skips_missing_keys() {
    let occurrences = vec![
      occurrence(at(2024, 1, 5), OccurrenceType::Hazard, OccurrenceStatus::Reported),
      occurrence(at(2024, 1, 6), OccurrenceType::Hazard, OccurrenceStatus::Closed),
      occurrence(at(2024, 2, 1), OccurrenceType::Incident, OccurrenceStatus::Reported),
    ];
    let counts = count_by(&occurrences, |o| o.flight_phase.clone());
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.values().sum::<usize>(), 3);

    let keyed = count_by(&occurrences, |o| {
      (o.occurrence_type == OccurrenceType::Hazard).then_some(o.status)
    });
    assert!(keyed.values().all(|&n| n > 0));
    assert_eq!(keyed.values().sum::<usize>(), 2);
  }

  #[test]
  fn monthly_buckets_are_chronological() {
    let occurrences = vec![
      occurrence(at(2024, 3, 2), OccurrenceType::Observation, OccurrenceStatus::Reported),
      occurrence(at(2023, 12, 31), OccurrenceType::Incident, OccurrenceStatus::Reported),
      occurrence(at(2024, 3, 20), OccurrenceType::Incident, OccurrenceStatus::Reported),
    ];
    let buckets = monthly_buckets(&occurrences);
    let labels: Vec<_> = buckets.iter().map(|b| b.month.to_string()).collect();
    assert_eq!(labels, ["2023-12", "2024-03"]);
    assert_eq!(buckets[1].count, 2);

    assert_eq!(recent(&buckets, 1), &buckets[1..]);
    assert_eq!(recent(&buckets, 12).len(), 2);
  }

  #[test]
  fn overdue_count_matches_reconciled_status() {
    let now = at(2024, 6, 1);
    let actions = vec![
      action(ActionStatus::Pending, NaiveDate::from_ymd_opt(2024, 5, 31)),
      action(ActionStatus::InProgress, NaiveDate::from_ymd_opt(2024, 6, 1)),
      action(ActionStatus::Pending, NaiveDate::from_ymd_opt(2024, 6, 2)),
      action(ActionStatus::Completed, NaiveDate::from_ymd_opt(2024, 1, 1)),
      action(ActionStatus::Pending, None),
    ];
    let reconciled = actions
      .iter()
      .filter(|a| a.reconciled_status(now) == ActionStatus::Overdue)
      .count();
    assert_eq!(overdue_count(&actions, now), reconciled);
    assert_eq!(reconciled, 2);
  }

  #[test]
  fn safety_report_summarises_snapshot() {
    let now = at(2024, 6, 1);
    let snapshot = Snapshot {
      occurrences: vec![
        occurrence(at(2024, 5, 1), OccurrenceType::Incident, OccurrenceStatus::Closed),
        occurrence(at(2024, 5, 20), OccurrenceType::Hazard, OccurrenceStatus::Reported),
      ],
      investigations: vec![],
      actions: vec![
        action(ActionStatus::Completed, None),
        action(ActionStatus::Pending, NaiveDate::from_ymd_opt(2024, 5, 1)),
      ],
      rejected: 1,
    };
    let report = SafetyReport::build(&snapshot, now);
    assert_eq!(report.total_occurrences, 2);
    assert_eq!(report.open_occurrences, 1);
    assert_eq!(report.by_type[&OccurrenceType::Hazard], 1);
    assert_eq!(report.overdue_actions, 1);
    assert_eq!(report.completion_rate, 50);
    assert_eq!(report.rejected_rows, 1);
    assert_eq!(report.monthly.len(), 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["monthly"][0]["month"], "2024-05");
    assert_eq!(json["by_status"]["closed"], 1);
  }

  #[test]
  fn dashboard_counts_recent_and_pending() {
    let now = at(2024, 6, 1);
    let snapshot = Snapshot {
      occurrences: vec![
        occurrence(at(2024, 5, 25), OccurrenceType::Incident, OccurrenceStatus::Reported),
        occurrence(at(2024, 3, 1), OccurrenceType::Incident, OccurrenceStatus::Closed),
      ],
      investigations: vec![],
      actions: vec![
        action(ActionStatus::Pending, NaiveDate::from_ymd_opt(2024, 7, 1)),
        action(ActionStatus::Pending, NaiveDate::from_ymd_opt(2024, 5, 1)),
        action(ActionStatus::Completed, None),
      ],
      rejected: 0,
    };
    let stats = DashboardStats::build(&snapshot, now);
    assert_eq!(stats, DashboardStats {
      open_occurrences:   1,
      closed_occurrences: 1,
      recent_occurrences: 1,
      pending_actions:    1,
      overdue_actions:    1,
    });
  }
}
