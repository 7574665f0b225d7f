//! [`SqliteStore`], the SQLite implementation of [`SafetyStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, Row, params_from_iter, types::Value};
use uuid::Uuid;

use aerosafe_core::{
  action::CorrectiveAction,
  aircraft::Aircraft,
  investigation::{Investigation, InvestigationUpdate},
  occurrence::{Occurrence, OccurrenceStatus},
  profile::Profile,
  store::{
    ActionQuery, ActionSort, AircraftQuery, AircraftSort, InvestigationQuery,
    OccurrenceQuery, SafetyStore, Snapshot, Write,
  },
  trailer::FuelTrailer,
};

use crate::{
  Error, Result,
  encode::{
    ACTION_COLUMNS, AIRCRAFT_COLUMNS, INVESTIGATION_COLUMNS, OCCURRENCE_COLUMNS,
    PROFILE_COLUMNS, RawAction, RawAircraft, RawInvestigation, RawOccurrence,
    RawProfile, RawTrailer, RawUpdate, Statement, TRAILER_COLUMNS, UPDATE_COLUMNS,
    dt_value, encode_write, enum_value, text, uuid_value,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An aerosafe store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL, bypassing the typed write path.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_rows<R, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    map: F,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params.iter()), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn query_opt<R, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    map: F,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<R> + Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, params_from_iter(params.iter()), map)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }
}

// ─── Query building ──────────────────────────────────────────────────────────

/// Accumulates `WHERE` conditions with positional parameters.
#[derive(Default)]
struct Filter {
  conds:  Vec<&'static str>,
  params: Vec<Value>,
}

impl Filter {
  fn push(&mut self, cond: &'static str, value: Value) {
    self.conds.push(cond);
    self.params.push(value);
  }

  /// Case-insensitive substring match against every column in `cond`, which
  /// must use one `?` per column.
  fn push_text(&mut self, cond: &'static str, needle: &str, columns: usize) {
    let pattern = format!("%{}%", needle.to_lowercase());
    self.conds.push(cond);
    for _ in 0..columns {
      self.params.push(text(pattern.clone()));
    }
  }

  /// Render `SELECT {columns} FROM {table} WHERE .. ORDER BY .. LIMIT ..`,
  /// consuming the filter into the final SQL and parameters.
  fn finish(
    mut self,
    columns: &str,
    table: &str,
    order_by: &str,
    limit: Option<usize>,
    offset: Option<usize>,
  ) -> (String, Vec<Value>) {
    let where_clause = if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    };
    // A negative LIMIT means no limit in SQLite.
    let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    let offset = offset.map_or(0, |n| i64::try_from(n).unwrap_or(i64::MAX));
    self.params.push(Value::Integer(limit));
    self.params.push(Value::Integer(offset));
    let sql = format!(
      "SELECT {columns} FROM {table} {where_clause} ORDER BY {order_by} \
       LIMIT ? OFFSET ?"
    );
    (sql, self.params)
  }
}

fn direction(descending: bool) -> &'static str {
  if descending { "DESC" } else { "ASC" }
}

fn decode_all<R, T>(raws: Vec<R>, decode: fn(R) -> Result<T>) -> Result<Vec<T>> {
  raws.into_iter().map(decode).collect()
}

/// Decode `raws`, logging and dropping rows that fail.
fn decode_lenient<R, T>(
  table: &'static str,
  raws: Vec<R>,
  decode: fn(R) -> Result<T>,
  rejected: &mut usize,
) -> Vec<T> {
  raws
    .into_iter()
    .filter_map(|raw| match decode(raw) {
      Ok(record) => Some(record),
      Err(error) => {
        tracing::warn!(table, %error, "skipping malformed row");
        *rejected += 1;
        None
      }
    })
    .collect()
}

// ─── SafetyStore impl ────────────────────────────────────────────────────────

impl SafetyStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn apply(&self, batch: Vec<Write>) -> Result<()> {
    let statements: Vec<Statement> = batch.into_iter().map(encode_write).collect();

    let missing = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for statement in &statements {
          let changed =
            tx.execute(statement.sql, params_from_iter(statement.params.iter()))?;
          // Returning early drops `tx`, which rolls the batch back.
          if let (0, Some(target)) = (changed, statement.target) {
            return Ok(Some(target));
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some((table, id)) => Err(Error::RowMissing { table, id }),
      None => Ok(()),
    }
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1");
    self
      .query_opt(sql, vec![uuid_value(id)], RawProfile::from_row)
      .await?
      .map(RawProfile::into_profile)
      .transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name");
    let raws = self.query_rows(sql, vec![], RawProfile::from_row).await?;
    decode_all(raws, RawProfile::into_profile)
  }

  // ── Occurrences ───────────────────────────────────────────────────────────

  async fn get_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>> {
    let sql =
      format!("SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE occurrence_id = ?1");
    self
      .query_opt(sql, vec![uuid_value(id)], RawOccurrence::from_row)
      .await?
      .map(RawOccurrence::into_occurrence)
      .transpose()
  }

  async fn list_occurrences<'a>(
    &'a self,
    query: &'a OccurrenceQuery,
  ) -> Result<Vec<Occurrence>> {
    let mut filter = Filter::default();
    if let Some(status) = query.status {
      filter.push("status = ?", enum_value(status));
    } else if query.open_only {
      filter.push("status != ?", enum_value(OccurrenceStatus::Closed));
    }
    if let Some(kind) = query.occurrence_type {
      filter.push("occurrence_type = ?", enum_value(kind));
    }
    if let Some(id) = query.aircraft_id {
      filter.push("aircraft_id = ?", uuid_value(id));
    }
    if let Some(after) = query.occurred_after {
      filter.push("occurred_at >= ?", dt_value(after));
    }
    if let Some(needle) = query.text.as_deref() {
      filter.push_text("lower(title) LIKE ?", needle, 1);
    }

    let (sql, params) = filter.finish(
      OCCURRENCE_COLUMNS,
      "occurrences",
      "created_at DESC, rowid DESC",
      query.limit,
      query.offset,
    );
    let raws = self.query_rows(sql, params, RawOccurrence::from_row).await?;
    decode_all(raws, RawOccurrence::into_occurrence)
  }

  // ── Investigations ────────────────────────────────────────────────────────

  async fn get_investigation(&self, id: Uuid) -> Result<Option<Investigation>> {
    let sql = format!(
      "SELECT {INVESTIGATION_COLUMNS} FROM investigations WHERE investigation_id = ?1"
    );
    self
      .query_opt(sql, vec![uuid_value(id)], RawInvestigation::from_row)
      .await?
      .map(RawInvestigation::into_investigation)
      .transpose()
  }

  async fn investigation_for(
    &self,
    occurrence_id: Uuid,
  ) -> Result<Option<Investigation>> {
    let sql = format!(
      "SELECT {INVESTIGATION_COLUMNS} FROM investigations WHERE occurrence_id = ?1"
    );
    self
      .query_opt(sql, vec![uuid_value(occurrence_id)], RawInvestigation::from_row)
      .await?
      .map(RawInvestigation::into_investigation)
      .transpose()
  }

  async fn list_investigations<'a>(
    &'a self,
    query: &'a InvestigationQuery,
  ) -> Result<Vec<Investigation>> {
    let mut filter = Filter::default();
    if let Some(stage) = query.stage {
      filter.push("stage = ?", enum_value(stage));
    }
    if let Some(after) = query.created_after {
      filter.push("created_at >= ?", dt_value(after));
    }

    let (sql, params) = filter.finish(
      INVESTIGATION_COLUMNS,
      "investigations",
      "created_at DESC, rowid DESC",
      query.limit,
      query.offset,
    );
    let raws = self
      .query_rows(sql, params, RawInvestigation::from_row)
      .await?;
    decode_all(raws, RawInvestigation::into_investigation)
  }

  async fn list_updates(
    &self,
    investigation_id: Uuid,
  ) -> Result<Vec<InvestigationUpdate>> {
    let sql = format!(
      "SELECT {UPDATE_COLUMNS} FROM investigation_updates
       WHERE investigation_id = ?1
       ORDER BY created_at ASC, rowid ASC"
    );
    let raws = self
      .query_rows(sql, vec![uuid_value(investigation_id)], RawUpdate::from_row)
      .await?;
    decode_all(raws, RawUpdate::into_update)
  }

  // ── Corrective actions ────────────────────────────────────────────────────

  async fn get_action(&self, id: Uuid) -> Result<Option<CorrectiveAction>> {
    let sql =
      format!("SELECT {ACTION_COLUMNS} FROM corrective_actions WHERE action_id = ?1");
    self
      .query_opt(sql, vec![uuid_value(id)], RawAction::from_row)
      .await?
      .map(RawAction::into_action)
      .transpose()
  }

  async fn list_actions<'a>(
    &'a self,
    query: &'a ActionQuery,
  ) -> Result<Vec<CorrectiveAction>> {
    let mut filter = Filter::default();
    if let Some(status) = query.status {
      filter.push("status = ?", enum_value(status));
    }
    if let Some(id) = query.investigation_id {
      filter.push("investigation_id = ?", uuid_value(id));
    }
    if let Some(needle) = query.text.as_deref() {
      filter.push_text("(lower(title) LIKE ? OR lower(description) LIKE ?)", needle, 2);
    }

    let dir = direction(query.descending);
    let order_by = match query.sort {
      ActionSort::Title => format!("title {dir}"),
      ActionSort::Status => format!("status {dir}, due_date IS NULL, due_date ASC"),
      ActionSort::DueDate => format!("due_date IS NULL, due_date {dir}"),
    };
    let (sql, params) = filter.finish(
      ACTION_COLUMNS,
      "corrective_actions",
      &order_by,
      query.limit,
      query.offset,
    );
    let raws = self.query_rows(sql, params, RawAction::from_row).await?;
    decode_all(raws, RawAction::into_action)
  }

  // ── Fleet ─────────────────────────────────────────────────────────────────

  async fn get_aircraft(&self, id: Uuid) -> Result<Option<Aircraft>> {
    let sql = format!("SELECT {AIRCRAFT_COLUMNS} FROM aircraft WHERE aircraft_id = ?1");
    self
      .query_opt(sql, vec![uuid_value(id)], RawAircraft::from_row)
      .await?
      .map(RawAircraft::into_aircraft)
      .transpose()
  }

  async fn list_aircraft<'a>(
    &'a self,
    query: &'a AircraftQuery,
  ) -> Result<Vec<Aircraft>> {
    let mut filter = Filter::default();
    if let Some(status) = query.status {
      filter.push("status = ?", enum_value(status));
    }
    if let Some(kind) = query.aircraft_type.as_deref() {
      filter.push("aircraft_type = ?", text(kind));
    }
    if let Some(needle) = query.text.as_deref() {
      filter.push_text(
        "(lower(registration) LIKE ? OR lower(model) LIKE ? \
         OR lower(aircraft_type) LIKE ?)",
        needle,
        3,
      );
    }

    let column = match query.sort {
      AircraftSort::Registration => "registration",
      AircraftSort::Type => "aircraft_type",
      AircraftSort::Model => "model",
      AircraftSort::Status => "status",
    };
    let order_by = format!("{column} {}, registration ASC", direction(query.descending));
    let (sql, params) = filter.finish(
      AIRCRAFT_COLUMNS,
      "aircraft",
      &order_by,
      query.limit,
      query.offset,
    );
    let raws = self.query_rows(sql, params, RawAircraft::from_row).await?;
    decode_all(raws, RawAircraft::into_aircraft)
  }

  async fn get_trailer(&self, id: Uuid) -> Result<Option<FuelTrailer>> {
    let sql = format!("SELECT {TRAILER_COLUMNS} FROM trailers WHERE trailer_id = ?1");
    self
      .query_opt(sql, vec![uuid_value(id)], RawTrailer::from_row)
      .await?
      .map(RawTrailer::into_trailer)
      .transpose()
  }

  async fn list_trailers(&self) -> Result<Vec<FuelTrailer>> {
    let sql = format!("SELECT {TRAILER_COLUMNS} FROM trailers ORDER BY name");
    let raws = self.query_rows(sql, vec![], RawTrailer::from_row).await?;
    decode_all(raws, RawTrailer::into_trailer)
  }

  // ── Reporting ─────────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Snapshot> {
    let (occurrences, investigations, actions) = self
      .conn
      .call(|conn| {
        let occurrences = conn
          .prepare(&format!("SELECT {OCCURRENCE_COLUMNS} FROM occurrences"))?
          .query_map([], RawOccurrence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        let investigations = conn
          .prepare(&format!("SELECT {INVESTIGATION_COLUMNS} FROM investigations"))?
          .query_map([], RawInvestigation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        let actions = conn
          .prepare(&format!("SELECT {ACTION_COLUMNS} FROM corrective_actions"))?
          .query_map([], RawAction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((occurrences, investigations, actions))
      })
      .await?;

    let mut rejected = 0;
    let snapshot = Snapshot {
      occurrences: decode_lenient(
        "occurrences",
        occurrences,
        RawOccurrence::into_occurrence,
        &mut rejected,
      ),
      investigations: decode_lenient(
        "investigations",
        investigations,
        RawInvestigation::into_investigation,
        &mut rejected,
      ),
      actions: decode_lenient(
        "corrective_actions",
        actions,
        RawAction::into_action,
        &mut rejected,
      ),
      rejected,
    };
    Ok(snapshot)
  }
}
