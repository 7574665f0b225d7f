//! Reporting and maintenance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/summary` | [`SafetyReport`] |
//! | `GET`  | `/reports/dashboard` | [`DashboardStats`] |
//! | `POST` | `/admin/reconcile` | Recompute derived statuses; returns counts |

use std::sync::Arc;

use aerosafe_core::{
  Engine,
  clock::Clock,
  reconcile::ReconcileSummary,
  report::{DashboardStats, SafetyReport},
  store::SafetyStore,
};
use axum::{Json, extract::State};

use crate::{error::ApiError, extract::Identity};

/// `GET /reports/summary`
pub async fn summary<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
) -> Result<Json<SafetyReport>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.safety_report().await?))
}

/// `GET /reports/dashboard`
pub async fn dashboard<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Ok(Json(engine.dashboard().await?))
}

/// `POST /admin/reconcile`
pub async fn reconcile<S, C>(
  State(engine): State<Arc<Engine<S, C>>>,
  Identity(actor): Identity,
) -> Result<Json<ReconcileSummary>, ApiError>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  tracing::info!(user_id = %actor.user_id, "manual reconciliation requested");
  Ok(Json(engine.reconcile().await?))
}
