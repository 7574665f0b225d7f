//! Handlers for `/occurrences` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/occurrences` | Query: [`OccurrenceQuery`] |
//! | `POST` | `/occurrences` | Body: [`NewOccurrence`]; returns 201 |
//! | `GET`  | `/occurrences/{id}` | 404 if not found |
//! | `POST` | `/occurrences/{id}/invalidate` | Body: `{"reason":"..."}` |
//! | `POST` | `/occurrences/{id}/investigation` | Body: `{"lead_investigator_id":..}`; returns 201 |

use std::sync::Arc;

use aerosafe_core::{
  Engine, Error,
  clock::Clock,
  investigation::Investigation,
  occurrence::{NewOccurrence, Occurrence},
  store::{OccurrenceQuery, SafetyStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Identity, JsonBody},
};

/// `GET /occurrences[?status=..][&open_only=true][&occurrence_type=..][&aircraft_id=..][&text=..]`
pub async fn list<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Query(query): Query<OccurrenceQuery>,
) -> Result<Json<Vec<Occurrence>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let occurrences = engine
    .store()
    .list_occurrences(&query)
    .await
    .map_err(Error::store)?;
  Ok(Json(occurrences))
}

/// `POST /occurrences`
pub async fn create<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Identity(actor): Identity,
  JsonBody(body): JsonBody<NewOccurrence>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let occurrence = engine.report_occurrence(actor, body).await?;
  Ok((StatusCode::CREATED, Json(occurrence)))
}

/// `GET /occurrences/{id}`
pub async fn get_one<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Occurrence>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let occurrence = engine
    .store()
    .get_occurrence(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::not_found("occurrence", id))?;
  Ok(Json(occurrence))
}

#[derive(Debug, Deserialize)]
pub struct InvalidateBody {
  #[serde(default)]
  pub reason: String,
}

/// `POST /occurrences/{id}/invalidate`
pub async fn invalidate<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<InvalidateBody>,
) -> Result<Json<Occurrence>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.mark_invalid(id, &body.reason).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct StartBody {
  pub lead_investigator_id: Option<Uuid>,
}

/// `POST /occurrences/{id}/investigation`
pub async fn start_investigation<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Identity(actor): Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<StartBody>,
) -> Result<(StatusCode, Json<Investigation>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let investigation = engine
    .start_investigation(actor, id, body.lead_investigator_id)
    .await?;
  Ok((StatusCode::CREATED, Json(investigation)))
}
