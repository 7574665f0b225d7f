//! Handlers for aircraft, fuel trailers and profiles.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/aircraft` | Query: [`AircraftQuery`] |
//! | `POST` | `/aircraft` | Body: [`AircraftDraft`]; returns 201 |
//! | `GET`  | `/aircraft/{id}` | 404 if not found |
//! | `PUT`  | `/aircraft/{id}` | Body: [`AircraftDraft`] |
//! | `GET`  | `/trailers` | Ordered by name |
//! | `POST` | `/trailers` | Body: [`NewTrailer`]; returns 201 |
//! | `POST` | `/trailers/{id}/fuel` | Body: `{"litres":1500}`; clamped to capacity |
//! | `POST` | `/trailers/{id}/status` | Body: `{"status":"in_use"}` |
//! | `GET`  | `/profiles` | Ordered by full name |
//! | `POST` | `/profiles` | Body: [`NewProfile`]; returns 201 |
//! | `GET`  | `/profiles/{id}` | 404 if not found |

use std::sync::Arc;

use aerosafe_core::{
  Engine, Error,
  aircraft::{Aircraft, AircraftDraft},
  clock::Clock,
  profile::{NewProfile, Profile},
  store::{AircraftQuery, SafetyStore},
  trailer::{FuelTrailer, NewTrailer, TrailerStatus},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Identity, JsonBody},
};

// ─── Aircraft ────────────────────────────────────────────────────────────────

/// `GET /aircraft[?status=..][&type=..][&text=..][&sort=model][&descending=true]`
pub async fn list_aircraft<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Query(query): Query<AircraftQuery>,
) -> Result<Json<Vec<Aircraft>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let aircraft = engine
    .store()
    .list_aircraft(&query)
    .await
    .map_err(Error::store)?;
  Ok(Json(aircraft))
}

/// `POST /aircraft`
pub async fn create_aircraft<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  JsonBody(draft): JsonBody<AircraftDraft>,
) -> Result<(StatusCode, Json<Aircraft>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let aircraft = engine.register_aircraft(draft).await?;
  Ok((StatusCode::CREATED, Json(aircraft)))
}

/// `GET /aircraft/{id}`
pub async fn get_aircraft<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Aircraft>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let aircraft = engine
    .store()
    .get_aircraft(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::not_found("aircraft", id))?;
  Ok(Json(aircraft))
}

/// `PUT /aircraft/{id}`
pub async fn update_aircraft<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(draft): JsonBody<AircraftDraft>,
) -> Result<Json<Aircraft>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.update_aircraft(id, draft).await?))
}

// ─── Trailers ────────────────────────────────────────────────────────────────

/// A trailer with its derived fill level.
#[derive(Debug, Serialize)]
pub struct TrailerView {
  #[serde(flatten)]
  pub trailer:      FuelTrailer,
  pub fuel_percent: u8,
}

impl From<FuelTrailer> for TrailerView {
  fn from(trailer: FuelTrailer) -> Self {
    Self { fuel_percent: trailer.fuel_percent(), trailer }
  }
}

/// `GET /trailers`
pub async fn list_trailers<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
) -> Result<Json<Vec<TrailerView>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let trailers = engine.store().list_trailers().await.map_err(Error::store)?;
  Ok(Json(trailers.into_iter().map(TrailerView::from).collect()))
}

/// `POST /trailers`
pub async fn create_trailer<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  JsonBody(body): JsonBody<NewTrailer>,
) -> Result<(StatusCode, Json<TrailerView>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let trailer = engine.add_trailer(body).await?;
  Ok((StatusCode::CREATED, Json(trailer.into())))
}

#[derive(Debug, Deserialize)]
pub struct FuelBody {
  pub litres: i64,
}

/// `POST /trailers/{id}/fuel`
pub async fn set_fuel<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<FuelBody>,
) -> Result<Json<TrailerView>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.set_trailer_fuel(id, body.litres).await?.into()))
}

#[derive(Debug, Deserialize)]
pub struct TrailerStatusBody {
  pub status: TrailerStatus,
}

/// `POST /trailers/{id}/status`
pub async fn set_trailer_status<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<TrailerStatusBody>,
) -> Result<Json<TrailerView>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.set_trailer_status(id, body.status).await?.into()))
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// `GET /profiles`
pub async fn list_profiles<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let profiles = engine.store().list_profiles().await.map_err(Error::store)?;
  Ok(Json(profiles))
}

/// `POST /profiles`
pub async fn create_profile<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  _: Identity,
  JsonBody(body): JsonBody<NewProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let profile = engine.register_profile(body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profiles/{id}`
pub async fn get_profile<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  let profile = engine
    .store()
    .get_profile(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::not_found("profile", id))?;
  Ok(Json(profile))
}
