//! Handlers for `/investigations` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/investigations` | Query: [`InvestigationQuery`] |
//! | `GET`   | `/investigations/{id}` | Materialised [`InvestigationView`] |
//! | `PATCH` | `/investigations/{id}` | Body: [`FindingsPatch`] |
//! | `POST`  | `/investigations/{id}/advance` | Body: `{"stage":"analysis"}` |
//! | `GET`   | `/investigations/{id}/updates` | Oldest first; 404 if not found |
//! | `POST`  | `/investigations/{id}/updates` | Body: `{"note":"..."}`; returns 201 |
//! | `POST`  | `/investigations/{id}/actions` | Body: [`NewCorrectiveAction`]; returns 201 |

use std::sync::Arc;

use aerosafe_core::{
  Engine, Error,
  action::{CorrectiveAction, NewCorrectiveAction},
  clock::Clock,
  investigation::{
    FindingsPatch, Investigation, InvestigationUpdate, InvestigationView, Stage,
  },
  store::{InvestigationQuery, SafetyStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Identity, JsonBody},
};

/// `GET /investigations[?stage=..][&created_after=..]`
pub async fn list<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Query(query): Query<InvestigationQuery>,
) -> Result<Json<Vec<Investigation>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let investigations = engine
    .store()
    .list_investigations(&query)
    .await
    .map_err(Error::store)?;
  Ok(Json(investigations))
}

/// `GET /investigations/{id}`
pub async fn view<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<InvestigationView>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.investigation_view(id).await?))
}

/// `PATCH /investigations/{id}`
pub async fn update_findings<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(patch): JsonBody<FindingsPatch>,
) -> Result<Json<Investigation>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.update_findings(id, patch).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceBody {
  pub stage: Stage,
}

/// `POST /investigations/{id}/advance`
pub async fn advance<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Identity(actor): Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<AdvanceBody>,
) -> Result<Json<Investigation>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  tracing::debug!(
    investigation_id = %id,
    user_id = %actor.user_id,
    stage = %body.stage,
    "advance requested"
  );
  Ok(Json(engine.advance(id, body.stage).await?))
}

/// `GET /investigations/{id}/updates`
pub async fn list_updates<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<InvestigationUpdate>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.investigation_updates(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  #[serde(default)]
  pub note: String,
}

/// `POST /investigations/{id}/updates`
pub async fn add_update<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Identity(actor): Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<NoteBody>,
) -> Result<(StatusCode, Json<InvestigationUpdate>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let update = engine.add_update(actor, id, &body.note).await?;
  Ok((StatusCode::CREATED, Json(update)))
}

/// `POST /investigations/{id}/actions`
pub async fn add_action<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<NewCorrectiveAction>,
) -> Result<(StatusCode, Json<CorrectiveAction>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let action = engine.add_corrective_action(id, body).await?;
  Ok((StatusCode::CREATED, Json(action)))
}
