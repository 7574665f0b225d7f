//! Handlers for `/actions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/actions` | Query: [`ActionQuery`] |
//! | `GET`  | `/actions/{id}` | 404 if not found |
//! | `POST` | `/actions/{id}/status` | Body: `{"status":"completed"}` |

use std::sync::Arc;

use aerosafe_core::{
  Engine, Error,
  action::{ActionStatus, CorrectiveAction},
  clock::Clock,
  store::{ActionQuery, SafetyStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Identity, JsonBody},
};

/// `GET /actions[?status=..][&investigation_id=..][&text=..][&sort=title][&descending=true]`
pub async fn list<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Query(query): Query<ActionQuery>,
) -> Result<Json<Vec<CorrectiveAction>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let actions = engine
    .store()
    .list_actions(&query)
    .await
    .map_err(Error::store)?;
  Ok(Json(actions))
}

/// `GET /actions/{id}`
pub async fn get_one<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CorrectiveAction>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let action = engine
    .store()
    .get_action(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::not_found("corrective action", id))?;
  Ok(Json(action))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ActionStatus,
}

/// `POST /actions/{id}/status`
pub async fn set_status<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<CorrectiveAction>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.set_action_status(id, body.status).await?))
}
