//! Encoding and decoding between domain types and the plain values stored in
//! SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 UTC strings with microseconds, dates
//! are `YYYY-MM-DD`, UUIDs are hyphenated lowercase, and enums are their
//! snake_case names. Decoding is the parsing boundary: a value that does not
//! fit its domain type becomes [`Error::DataIntegrity`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Row, types::Value};
use uuid::Uuid;

use aerosafe_core::{
  action::CorrectiveAction,
  aircraft::Aircraft,
  investigation::{Investigation, InvestigationUpdate},
  occurrence::Occurrence,
  profile::Profile,
  store::Write,
  trailer::FuelTrailer,
};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DataIntegrity(format!("bad timestamp {s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DataIntegrity(format!("bad date {s:?}: {e}")))
}

fn decode_enum<T: FromStr>(column: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::DataIntegrity(format!("unknown {column}: {s:?}")))
}

fn decode_u32(column: &str, n: i64) -> Result<u32> {
  u32::try_from(n)
    .map_err(|_| Error::DataIntegrity(format!("{column} out of range: {n}")))
}

// ─── Bound parameters ────────────────────────────────────────────────────────

pub fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

pub fn uuid_value(id: Uuid) -> Value { Value::Text(encode_uuid(id)) }

fn opt_uuid(id: Option<Uuid>) -> Value { id.map_or(Value::Null, uuid_value) }

pub fn dt_value(dt: DateTime<Utc>) -> Value { Value::Text(encode_dt(dt)) }

fn opt_dt(dt: Option<DateTime<Utc>>) -> Value { dt.map_or(Value::Null, dt_value) }

fn opt_date(d: Option<NaiveDate>) -> Value {
  d.map_or(Value::Null, |d| Value::Text(encode_date(d)))
}

pub fn enum_value(v: impl AsRef<str>) -> Value { text(v.as_ref()) }

// ─── Writes ──────────────────────────────────────────────────────────────────

/// One SQL statement with its bound parameters.
pub struct Statement {
  pub sql:    &'static str,
  pub params: Vec<Value>,
  /// For updates: the table and key that must match a row, or the batch is
  /// abandoned. Inserts and guarded updates leave this unset.
  pub target: Option<(&'static str, Uuid)>,
}

impl Statement {
  fn insert(sql: &'static str, params: Vec<Value>) -> Self {
    Self { sql, params, target: None }
  }

  fn update(sql: &'static str, params: Vec<Value>, table: &'static str, id: Uuid) -> Self {
    Self { sql, params, target: Some((table, id)) }
  }

  /// An update allowed to match nothing.
  fn guarded(sql: &'static str, params: Vec<Value>) -> Self {
    Self { sql, params, target: None }
  }
}

pub fn encode_write(write: Write) -> Statement {
  match write {
    Write::InsertProfile(p) => Statement::insert(
      "INSERT INTO profiles (
         profile_id, email, full_name, role, position, phone, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      vec![
        uuid_value(p.profile_id),
        text(p.email),
        text(p.full_name),
        enum_value(p.role),
        opt_text(p.position),
        opt_text(p.phone),
        dt_value(p.created_at),
        dt_value(p.updated_at),
      ],
    ),

    Write::InsertOccurrence(o) => Statement::insert(
      "INSERT INTO occurrences (
         occurrence_id, title, occurred_at, location, occurrence_type, severity,
         status, description, aircraft_id, reporter_id, assigned_to,
         weather_conditions, flight_phase, immediate_actions, is_invalid,
         invalid_reason, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                 ?15, ?16, ?17, ?18)",
      occurrence_params(o),
    ),
    Write::UpdateOccurrence(o) => {
      let id = o.occurrence_id;
      Statement::update(
        "UPDATE occurrences SET
           title = ?2, occurred_at = ?3, location = ?4, occurrence_type = ?5,
           severity = ?6, status = ?7, description = ?8, aircraft_id = ?9,
           reporter_id = ?10, assigned_to = ?11, weather_conditions = ?12,
           flight_phase = ?13, immediate_actions = ?14, is_invalid = ?15,
           invalid_reason = ?16, created_at = ?17, updated_at = ?18
         WHERE occurrence_id = ?1",
        occurrence_params(o),
        "occurrences",
        id,
      )
    }

    Write::InsertInvestigation(i) => Statement::insert(
      "INSERT INTO investigations (
         investigation_id, occurrence_id, lead_investigator_id, stage, findings,
         root_causes, contributing_factors, recommendations, started_at,
         completed_at, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
      investigation_params(i),
    ),
    Write::UpdateInvestigation(i) => {
      let id = i.investigation_id;
      Statement::update(
        "UPDATE investigations SET
           occurrence_id = ?2, lead_investigator_id = ?3, stage = ?4,
           findings = ?5, root_causes = ?6, contributing_factors = ?7,
           recommendations = ?8, started_at = ?9, completed_at = ?10,
           created_at = ?11, updated_at = ?12
         WHERE investigation_id = ?1",
        investigation_params(i),
        "investigations",
        id,
      )
    }

    Write::InsertUpdate(u) => Statement::insert(
      "INSERT INTO investigation_updates (
         update_id, investigation_id, author_id, note, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5)",
      vec![
        uuid_value(u.update_id),
        uuid_value(u.investigation_id),
        uuid_value(u.author_id),
        text(u.note),
        dt_value(u.created_at),
      ],
    ),

    Write::InsertAction(a) => Statement::insert(
      "INSERT INTO corrective_actions (
         action_id, investigation_id, title, description, assigned_to, status,
         due_date, completed_at, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      action_params(a),
    ),
    Write::UpdateAction(a) => {
      let id = a.action_id;
      Statement::update(
        "UPDATE corrective_actions SET
           investigation_id = ?2, title = ?3, description = ?4,
           assigned_to = ?5, status = ?6, due_date = ?7, completed_at = ?8,
           created_at = ?9, updated_at = ?10
         WHERE action_id = ?1",
        action_params(a),
        "corrective_actions",
        id,
      )
    }

    Write::InsertAircraft(a) => Statement::insert(
      "INSERT INTO aircraft (
         aircraft_id, registration, aircraft_type, model, year, status, notes,
         created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      aircraft_params(a),
    ),
    Write::UpdateAircraft(a) => {
      let id = a.aircraft_id;
      Statement::update(
        "UPDATE aircraft SET
           registration = ?2, aircraft_type = ?3, model = ?4, year = ?5,
           status = ?6, notes = ?7, created_at = ?8, updated_at = ?9
         WHERE aircraft_id = ?1",
        aircraft_params(a),
        "aircraft",
        id,
      )
    }

    Write::InsertTrailer(t) => Statement::insert(
      "INSERT INTO trailers (
         trailer_id, name, max_capacity, current_fuel, last_refilled, status,
         location, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      trailer_params(t),
    ),
    Write::UpdateTrailer(t) => {
      let id = t.trailer_id;
      Statement::update(
        "UPDATE trailers SET
           name = ?2, max_capacity = ?3, current_fuel = ?4, last_refilled = ?5,
           status = ?6, location = ?7, created_at = ?8, updated_at = ?9
         WHERE trailer_id = ?1",
        trailer_params(t),
        "trailers",
        id,
      )
    }

    Write::ReconcileActionStatus { action_id, from, to, at } => Statement::guarded(
      "UPDATE corrective_actions SET status = ?2, updated_at = ?3
       WHERE action_id = ?1 AND status = ?4",
      vec![uuid_value(action_id), enum_value(to), dt_value(at), enum_value(from)],
    ),
    Write::ReconcileOccurrenceStatus { occurrence_id, from, to, at } => {
      Statement::guarded(
        "UPDATE occurrences SET status = ?2, updated_at = ?3
         WHERE occurrence_id = ?1 AND status = ?4",
        vec![
          uuid_value(occurrence_id),
          enum_value(to),
          dt_value(at),
          enum_value(from),
        ],
      )
    }
  }
}

fn occurrence_params(o: Occurrence) -> Vec<Value> {
  vec![
    uuid_value(o.occurrence_id),
    text(o.title),
    dt_value(o.occurred_at),
    text(o.location),
    enum_value(o.occurrence_type),
    enum_value(o.severity),
    enum_value(o.status),
    text(o.description),
    opt_uuid(o.aircraft_id),
    uuid_value(o.reporter_id),
    opt_uuid(o.assigned_to),
    opt_text(o.weather_conditions),
    opt_text(o.flight_phase),
    opt_text(o.immediate_actions),
    Value::Integer(i64::from(o.is_invalid)),
    opt_text(o.invalid_reason),
    dt_value(o.created_at),
    dt_value(o.updated_at),
  ]
}

fn investigation_params(i: Investigation) -> Vec<Value> {
  vec![
    uuid_value(i.investigation_id),
    uuid_value(i.occurrence_id),
    opt_uuid(i.lead_investigator_id),
    enum_value(i.stage),
    opt_text(i.findings),
    opt_text(i.root_causes),
    opt_text(i.contributing_factors),
    opt_text(i.recommendations),
    opt_dt(i.started_at),
    opt_dt(i.completed_at),
    dt_value(i.created_at),
    dt_value(i.updated_at),
  ]
}

fn action_params(a: CorrectiveAction) -> Vec<Value> {
  vec![
    uuid_value(a.action_id),
    uuid_value(a.investigation_id),
    text(a.title),
    text(a.description),
    opt_uuid(a.assigned_to),
    enum_value(a.status),
    opt_date(a.due_date),
    opt_dt(a.completed_at),
    dt_value(a.created_at),
    dt_value(a.updated_at),
  ]
}

fn aircraft_params(a: Aircraft) -> Vec<Value> {
  vec![
    uuid_value(a.aircraft_id),
    text(a.registration),
    text(a.aircraft_type),
    text(a.model),
    a.year.map_or(Value::Null, |y| Value::Integer(i64::from(y))),
    enum_value(a.status),
    opt_text(a.notes),
    dt_value(a.created_at),
    dt_value(a.updated_at),
  ]
}

fn trailer_params(t: FuelTrailer) -> Vec<Value> {
  vec![
    uuid_value(t.trailer_id),
    text(t.name),
    Value::Integer(i64::from(t.max_capacity)),
    Value::Integer(i64::from(t.current_fuel)),
    opt_dt(t.last_refilled),
    enum_value(t.status),
    text(t.location),
    dt_value(t.created_at),
    dt_value(t.updated_at),
  ]
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str =
  "profile_id, email, full_name, role, position, phone, created_at, updated_at";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id: String,
  pub email:      String,
  pub full_name:  String,
  pub role:       String,
  pub position:   Option<String>,
  pub phone:      Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id: row.get(0)?,
      email:      row.get(1)?,
      full_name:  row.get(2)?,
      role:       row.get(3)?,
      position:   row.get(4)?,
      phone:      row.get(5)?,
      created_at: row.get(6)?,
      updated_at: row.get(7)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id: decode_uuid(&self.profile_id)?,
      email:      self.email,
      full_name:  self.full_name,
      role:       decode_enum("role", &self.role)?,
      position:   self.position,
      phone:      self.phone,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const OCCURRENCE_COLUMNS: &str = "occurrence_id, title, occurred_at, location, \
  occurrence_type, severity, status, description, aircraft_id, reporter_id, \
  assigned_to, weather_conditions, flight_phase, immediate_actions, is_invalid, \
  invalid_reason, created_at, updated_at";

/// Raw values read directly from an `occurrences` row.
pub struct RawOccurrence {
  pub occurrence_id:      String,
  pub title:              String,
  pub occurred_at:        String,
  pub location:           String,
  pub occurrence_type:    String,
  pub severity:           String,
  pub status:             String,
  pub description:        String,
  pub aircraft_id:        Option<String>,
  pub reporter_id:        String,
  pub assigned_to:        Option<String>,
  pub weather_conditions: Option<String>,
  pub flight_phase:       Option<String>,
  pub immediate_actions:  Option<String>,
  pub is_invalid:         i64,
  pub invalid_reason:     Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawOccurrence {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      occurrence_id:      row.get(0)?,
      title:              row.get(1)?,
      occurred_at:        row.get(2)?,
      location:           row.get(3)?,
      occurrence_type:    row.get(4)?,
      severity:           row.get(5)?,
      status:             row.get(6)?,
      description:        row.get(7)?,
      aircraft_id:        row.get(8)?,
      reporter_id:        row.get(9)?,
      assigned_to:        row.get(10)?,
      weather_conditions: row.get(11)?,
      flight_phase:       row.get(12)?,
      immediate_actions:  row.get(13)?,
      is_invalid:         row.get(14)?,
      invalid_reason:     row.get(15)?,
      created_at:         row.get(16)?,
      updated_at:         row.get(17)?,
    })
  }

  pub fn into_occurrence(self) -> Result<Occurrence> {
    Ok(Occurrence {
      occurrence_id:      decode_uuid(&self.occurrence_id)?,
      title:              self.title,
      occurred_at:        decode_dt(&self.occurred_at)?,
      location:           self.location,
      occurrence_type:    decode_enum("occurrence type", &self.occurrence_type)?,
      severity:           decode_enum("severity", &self.severity)?,
      status:             decode_enum("occurrence status", &self.status)?,
      description:        self.description,
      aircraft_id:        decode_opt_uuid(self.aircraft_id)?,
      reporter_id:        decode_uuid(&self.reporter_id)?,
      assigned_to:        decode_opt_uuid(self.assigned_to)?,
      weather_conditions: self.weather_conditions,
      flight_phase:       self.flight_phase,
      immediate_actions:  self.immediate_actions,
      is_invalid:         self.is_invalid != 0,
      invalid_reason:     self.invalid_reason,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

pub const INVESTIGATION_COLUMNS: &str = "investigation_id, occurrence_id, \
  lead_investigator_id, stage, findings, root_causes, contributing_factors, \
  recommendations, started_at, completed_at, created_at, updated_at";

/// Raw values read directly from an `investigations` row.
pub struct RawInvestigation {
  pub investigation_id:     String,
  pub occurrence_id:        String,
  pub lead_investigator_id: Option<String>,
  pub stage:                String,
  pub findings:             Option<String>,
  pub root_causes:          Option<String>,
  pub contributing_factors: Option<String>,
  pub recommendations:      Option<String>,
  pub started_at:           Option<String>,
  pub completed_at:         Option<String>,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawInvestigation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      investigation_id:     row.get(0)?,
      occurrence_id:        row.get(1)?,
      lead_investigator_id: row.get(2)?,
      stage:                row.get(3)?,
      findings:             row.get(4)?,
      root_causes:          row.get(5)?,
      contributing_factors: row.get(6)?,
      recommendations:      row.get(7)?,
      started_at:           row.get(8)?,
      completed_at:         row.get(9)?,
      created_at:           row.get(10)?,
      updated_at:           row.get(11)?,
    })
  }

  pub fn into_investigation(self) -> Result<Investigation> {
    Ok(Investigation {
      investigation_id:     decode_uuid(&self.investigation_id)?,
      occurrence_id:        decode_uuid(&self.occurrence_id)?,
      lead_investigator_id: decode_opt_uuid(self.lead_investigator_id)?,
      stage:                decode_enum("stage", &self.stage)?,
      findings:             self.findings,
      root_causes:          self.root_causes,
      contributing_factors: self.contributing_factors,
      recommendations:      self.recommendations,
      started_at:           decode_opt_dt(self.started_at)?,
      completed_at:         decode_opt_dt(self.completed_at)?,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

pub const UPDATE_COLUMNS: &str =
  "update_id, investigation_id, author_id, note, created_at";

/// Raw values read directly from an `investigation_updates` row.
pub struct RawUpdate {
  pub update_id:        String,
  pub investigation_id: String,
  pub author_id:        String,
  pub note:             String,
  pub created_at:       String,
}

impl RawUpdate {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      update_id:        row.get(0)?,
      investigation_id: row.get(1)?,
      author_id:        row.get(2)?,
      note:             row.get(3)?,
      created_at:       row.get(4)?,
    })
  }

  pub fn into_update(self) -> Result<InvestigationUpdate> {
    Ok(InvestigationUpdate {
      update_id:        decode_uuid(&self.update_id)?,
      investigation_id: decode_uuid(&self.investigation_id)?,
      author_id:        decode_uuid(&self.author_id)?,
      note:             self.note,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub const ACTION_COLUMNS: &str = "action_id, investigation_id, title, description, \
  assigned_to, status, due_date, completed_at, created_at, updated_at";

/// Raw values read directly from a `corrective_actions` row.
pub struct RawAction {
  pub action_id:        String,
  pub investigation_id: String,
  pub title:            String,
  pub description:      String,
  pub assigned_to:      Option<String>,
  pub status:           String,
  pub due_date:         Option<String>,
  pub completed_at:     Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawAction {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      action_id:        row.get(0)?,
      investigation_id: row.get(1)?,
      title:            row.get(2)?,
      description:      row.get(3)?,
      assigned_to:      row.get(4)?,
      status:           row.get(5)?,
      due_date:         row.get(6)?,
      completed_at:     row.get(7)?,
      created_at:       row.get(8)?,
      updated_at:       row.get(9)?,
    })
  }

  pub fn into_action(self) -> Result<CorrectiveAction> {
    Ok(CorrectiveAction {
      action_id:        decode_uuid(&self.action_id)?,
      investigation_id: decode_uuid(&self.investigation_id)?,
      title:            self.title,
      description:      self.description,
      assigned_to:      decode_opt_uuid(self.assigned_to)?,
      status:           decode_enum("action status", &self.status)?,
      due_date:         self.due_date.as_deref().map(decode_date).transpose()?,
      completed_at:     decode_opt_dt(self.completed_at)?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub const AIRCRAFT_COLUMNS: &str = "aircraft_id, registration, aircraft_type, model, \
  year, status, notes, created_at, updated_at";

/// Raw values read directly from an `aircraft` row.
pub struct RawAircraft {
  pub aircraft_id:   String,
  pub registration:  String,
  pub aircraft_type: String,
  pub model:         String,
  pub year:          Option<i64>,
  pub status:        String,
  pub notes:         Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawAircraft {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      aircraft_id:   row.get(0)?,
      registration:  row.get(1)?,
      aircraft_type: row.get(2)?,
      model:         row.get(3)?,
      year:          row.get(4)?,
      status:        row.get(5)?,
      notes:         row.get(6)?,
      created_at:    row.get(7)?,
      updated_at:    row.get(8)?,
    })
  }

  pub fn into_aircraft(self) -> Result<Aircraft> {
    let year = self
      .year
      .map(|y| {
        i32::try_from(y)
          .map_err(|_| Error::DataIntegrity(format!("year out of range: {y}")))
      })
      .transpose()?;
    Ok(Aircraft {
      aircraft_id: decode_uuid(&self.aircraft_id)?,
      registration: self.registration,
      aircraft_type: self.aircraft_type,
      model: self.model,
      year,
      status: decode_enum("aircraft status", &self.status)?,
      notes: self.notes,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const TRAILER_COLUMNS: &str = "trailer_id, name, max_capacity, current_fuel, \
  last_refilled, status, location, created_at, updated_at";

/// Raw values read directly from a `trailers` row.
pub struct RawTrailer {
  pub trailer_id:    String,
  pub name:          String,
  pub max_capacity:  i64,
  pub current_fuel:  i64,
  pub last_refilled: Option<String>,
  pub status:        String,
  pub location:      String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawTrailer {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      trailer_id:    row.get(0)?,
      name:          row.get(1)?,
      max_capacity:  row.get(2)?,
      current_fuel:  row.get(3)?,
      last_refilled: row.get(4)?,
      status:        row.get(5)?,
      location:      row.get(6)?,
      created_at:    row.get(7)?,
      updated_at:    row.get(8)?,
    })
  }

  pub fn into_trailer(self) -> Result<FuelTrailer> {
    Ok(FuelTrailer {
      trailer_id:    decode_uuid(&self.trailer_id)?,
      name:          self.name,
      max_capacity:  decode_u32("max capacity", self.max_capacity)?,
      current_fuel:  decode_u32("current fuel", self.current_fuel)?,
      last_refilled: decode_opt_dt(self.last_refilled)?,
      status:        decode_enum("trailer status", &self.status)?,
      location:      self.location,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use aerosafe_core::occurrence::Severity;
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_text() {
    let early = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
    let late = early + chrono::TimeDelta::milliseconds(1);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn unknown_enum_is_data_integrity() {
    let err = decode_enum::<Severity>("severity", "catastrophic").unwrap_err();
    assert!(matches!(err, Error::DataIntegrity(_)));
    assert_eq!(decode_enum::<Severity>("severity", "high").unwrap(), Severity::High);
  }
}
