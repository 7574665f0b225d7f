//! JSON REST API for aerosafe.
//!
//! Exposes an axum [`Router`] over an [`Engine`] backed by any
//! [`SafetyStore`]. Authentication, TLS and transport concerns are the
//! caller's responsibility; the acting user arrives in trusted
//! `x-user-id` / `x-user-role` headers.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", aerosafe_api::api_router(engine.clone()))
//! ```

pub mod actions;
pub mod error;
pub mod extract;
pub mod fleet;
pub mod investigations;
pub mod occurrences;
pub mod reports;

use std::sync::Arc;

use aerosafe_core::{Engine, clock::Clock, store::SafetyStore};
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(engine: Arc<Engine<S, C>>) -> Router<()>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Router::new()
    // Occurrences
    .route(
      "/occurrences",
      get(occurrences::list::<S, C>).post(occurrences::create::<S, C>),
    )
    .route("/occurrences/{id}", get(occurrences::get_one::<S, C>))
    .route(
      "/occurrences/{id}/invalidate",
      post(occurrences::invalidate::<S, C>),
    )
    .route(
      "/occurrences/{id}/investigation",
      post(occurrences::start_investigation::<S, C>),
    )
    // Investigations
    .route("/investigations", get(investigations::list::<S, C>))
    .route(
      "/investigations/{id}",
      get(investigations::view::<S, C>).patch(investigations::update_findings::<S, C>),
    )
    .route(
      "/investigations/{id}/advance",
      post(investigations::advance::<S, C>),
    )
    .route(
      "/investigations/{id}/updates",
      get(investigations::list_updates::<S, C>).post(investigations::add_update::<S, C>),
    )
    .route(
      "/investigations/{id}/actions",
      post(investigations::add_action::<S, C>),
    )
    // Corrective actions
    .route("/actions", get(actions::list::<S, C>))
    .route("/actions/{id}", get(actions::get_one::<S, C>))
    .route("/actions/{id}/status", post(actions::set_status::<S, C>))
    // Fleet
    .route(
      "/aircraft",
      get(fleet::list_aircraft::<S, C>).post(fleet::create_aircraft::<S, C>),
    )
    .route(
      "/aircraft/{id}",
      get(fleet::get_aircraft::<S, C>).put(fleet::update_aircraft::<S, C>),
    )
    .route(
      "/trailers",
      get(fleet::list_trailers::<S, C>).post(fleet::create_trailer::<S, C>),
    )
    .route("/trailers/{id}/fuel", post(fleet::set_fuel::<S, C>))
    .route("/trailers/{id}/status", post(fleet::set_trailer_status::<S, C>))
    .route(
      "/profiles",
      get(fleet::list_profiles::<S, C>).post(fleet::create_profile::<S, C>),
    )
    .route("/profiles/{id}", get(fleet::get_profile::<S, C>))
    // Reporting and maintenance
    .route("/reports/summary", get(reports::summary::<S, C>))
    .route("/reports/dashboard", get(reports::dashboard::<S, C>))
    .route("/admin/reconcile", post(reports::reconcile::<S, C>))
    .with_state(engine)
}

// ─── Router tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use aerosafe_core::clock::ManualClock;
  use aerosafe_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{TimeDelta, TimeZone, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;
  use crate::extract::{USER_ID_HEADER, USER_ROLE_HEADER};

  struct TestApp {
    router: Router,
    clock:  Arc<ManualClock>,
    user:   Uuid,
  }

  async fn app() -> TestApp {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let start = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let engine = Arc::new(Engine::new(store, Arc::clone(&clock)));
    TestApp {
      router: api_router(engine),
      clock,
      user: Uuid::new_v4(),
    }
  }

  impl TestApp {
    async fn send(
      &self,
      method: &str,
      uri: &str,
      identified: bool,
      body: Option<Value>,
    ) -> (StatusCode, Value) {
      let mut builder = Request::builder().method(method).uri(uri);
      if identified {
        builder = builder
          .header(USER_ID_HEADER, self.user.to_string())
          .header(USER_ROLE_HEADER, "safety_officer");
      }
      let body = match body {
        Some(json) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(json.to_string())
        }
        None => Body::empty(),
      };
      let resp = self
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
      let status = resp.status();
      let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
      let value = if bytes.is_empty() {
        Value::Null
      } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
      };
      (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
      self.send("GET", uri, false, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
      self.send("POST", uri, true, Some(body)).await
    }
  }

  fn occurrence_body(title: &str) -> Value {
    json!({
      "title": title,
      "occurred_at": "2024-03-30T14:05:00Z",
      "location": "Taxiway B",
      "occurrence_type": "hazard",
      "description": "FOD found near holding point"
    })
  }

  async fn reported(app: &TestApp) -> String {
    let (status, body) = app.post("/occurrences", occurrence_body("FOD on taxiway")).await;
    assert_eq!(status, StatusCode::CREATED);
    body["occurrence_id"].as_str().unwrap().to_owned()
  }

  async fn investigated(app: &TestApp) -> String {
    let occ = reported(app).await;
    let (status, body) = app
      .post(&format!("/occurrences/{occ}/investigation"), json!({}))
      .await;
    assert_eq!(status, StatusCode::CREATED);
    body["investigation_id"].as_str().unwrap().to_owned()
  }

  // ── Occurrences ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_occurrence_requires_identity() {
    let app = app().await;
    let (status, body) = app
      .send("POST", "/occurrences", false, Some(occurrence_body("FOD")))
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains(USER_ID_HEADER));
  }

  #[tokio::test]
  async fn create_and_fetch_occurrence() {
    let app = app().await;
    let (status, created) = app
      .post("/occurrences", occurrence_body("FOD on taxiway"))
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "reported");
    assert_eq!(created["severity"], "medium");
    assert_eq!(created["reporter_id"], app.user.to_string());

    let id = created["occurrence_id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/occurrences/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = app.get("/occurrences?open_only=true&text=fod").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn validation_errors_are_422() {
    let app = app().await;
    let (status, body) = app.post("/occurrences", occurrence_body("  ")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("title"));
  }

  #[tokio::test]
  async fn malformed_requests_are_400() {
    let app = app().await;
    let (status, body) = app
      .send(
        "POST",
        "/occurrences",
        true,
        Some(json!({ "title": "missing everything else" })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/occurrences/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unknown_occurrence_is_404() {
    let app = app().await;
    let (status, body) = app.get(&format!("/occurrences/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("occurrence"));
  }

  #[tokio::test]
  async fn invalidate_needs_reason() {
    let app = app().await;
    let occ = reported(&app).await;

    let (status, _) = app
      .post(&format!("/occurrences/{occ}/invalidate"), json!({ "reason": "" }))
      .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
      .post(&format!("/occurrences/{occ}/invalidate"), json!({ "reason": "duplicate" }))
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["is_invalid"], true);
  }

  // ── Investigations ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn investigation_lifecycle_over_http() {
    let app = app().await;
    let inv = investigated(&app).await;

    let (status, _) = app
      .post(&format!("/investigations/{inv}/advance"), json!({ "stage": "analysis" }))
      .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, advanced) = app
      .post(
        &format!("/investigations/{inv}/advance"),
        json!({ "stage": "data_collection" }),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(advanced["stage"], "data_collection");

    let (status, _) = app
      .post(&format!("/investigations/{inv}/updates"), json!({ "note": "Swept area" }))
      .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, patched) = app
      .send(
        "PATCH",
        &format!("/investigations/{inv}"),
        true,
        Some(json!({ "findings": "Loose panel from tug" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["findings"], "Loose panel from tug");

    app.clock.advance(TimeDelta::hours(30));
    let (status, view) = app.get(&format!("/investigations/{inv}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress_percent"], 20);
    assert_eq!(view["next_stage"], "analysis");
    assert_eq!(view["duration"], json!({ "kind": "days", "days": 2 }));
    assert_eq!(view["occurrence"]["status"], "under_investigation");
    assert_eq!(view["updates"].as_array().unwrap().len(), 1);

    let (status, updates) = app.get(&format!("/investigations/{inv}/updates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updates[0]["note"], "Swept area");

    let (status, listed) = app.get("/investigations?stage=data_collection").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn updates_of_unknown_investigation_are_404() {
    let app = app().await;
    let (status, body) = app
      .get(&format!("/investigations/{}/updates", Uuid::new_v4()))
      .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("investigation"));
  }

  #[tokio::test]
  async fn second_investigation_conflicts() {
    let app = app().await;
    let occ = reported(&app).await;
    let uri = format!("/occurrences/{occ}/investigation");
    assert_eq!(app.post(&uri, json!({})).await.0, StatusCode::CREATED);
    assert_eq!(app.post(&uri, json!({})).await.0, StatusCode::CONFLICT);
  }

  // ── Corrective actions and reports ──────────────────────────────────────────

  #[tokio::test]
  async fn actions_reports_and_reconcile() {
    let app = app().await;
    let inv = investigated(&app).await;

    let (status, action) = app
      .post(
        &format!("/investigations/{inv}/actions"),
        json!({
          "title": "Add FOD walk to shift brief",
          "description": "Daily FOD walk before first departure",
          "due_date": "2024-04-10"
        }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(action["status"], "pending");
    let action_id = action["action_id"].as_str().unwrap().to_owned();

    let (status, _) = app
      .post(&format!("/actions/{action_id}/status"), json!({ "status": "overdue" }))
      .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    app.clock.advance(TimeDelta::days(14));
    let (status, summary) = app.post("/admin/reconcile", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["actions_marked_overdue"], 1);

    let (_, overdue) = app.get("/actions?status=overdue").await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let (status, report) = app.get("/reports/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_occurrences"], 1);
    assert_eq!(report["overdue_actions"], 1);
    assert_eq!(report["completion_rate"], 0);
    assert_eq!(report["monthly"][0]["month"], "2024-03");

    let (status, done) = app
      .post(&format!("/actions/{action_id}/status"), json!({ "status": "completed" }))
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");

    let (_, dashboard) = app.get("/reports/dashboard").await;
    assert_eq!(dashboard["overdue_actions"], 0);
    assert_eq!(dashboard["open_occurrences"], 1);
  }

  #[tokio::test]
  async fn reconcile_requires_identity() {
    let app = app().await;
    let (status, _) = app.send("POST", "/admin/reconcile", false, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Fleet ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn trailers_report_fill_level() {
    let app = app().await;
    let (status, trailer) = app
      .post(
        "/trailers",
        json!({
          "name": "Bowser 1",
          "max_capacity": 2000,
          "current_fuel": 1250,
          "location": "Hangar 3"
        }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(trailer["fuel_percent"], 63);
    assert_eq!(trailer["status"], "available");

    let id = trailer["trailer_id"].as_str().unwrap();
    let (_, refilled) = app
      .post(&format!("/trailers/{id}/fuel"), json!({ "litres": 9000 }))
      .await;
    assert_eq!(refilled["current_fuel"], 2000);
    assert_eq!(refilled["fuel_percent"], 100);

    let (_, busy) = app
      .post(&format!("/trailers/{id}/status"), json!({ "status": "in_use" }))
      .await;
    assert_eq!(busy["status"], "in_use");
  }

  #[tokio::test]
  async fn aircraft_crud() {
    let app = app().await;
    let (status, created) = app
      .post(
        "/aircraft",
        json!({ "registration": "ZS-HEL", "type": "Helicopter", "model": "EC130" }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "Helicopter");
    assert_eq!(created["status"], "active");

    let id = created["aircraft_id"].as_str().unwrap();
    let (status, updated) = app
      .send(
        "PUT",
        &format!("/aircraft/{id}"),
        true,
        Some(json!({
          "registration": "ZS-HEL",
          "type": "Helicopter",
          "model": "EC130 T2",
          "status": "maintenance"
        })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");

    let (_, listed) = app.get("/aircraft?status=maintenance").await;
    assert_eq!(listed[0]["model"], "EC130 T2");
  }

  #[tokio::test]
  async fn duplicate_registration_is_409() {
    let app = app().await;
    let body = json!({ "registration": "ZS-DUP", "type": "Fixed wing", "model": "C172" });
    assert_eq!(app.post("/aircraft", body.clone()).await.0, StatusCode::CREATED);

    let (status, err) = app.post("/aircraft", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("ZS-DUP"));

    let (_, listed) = app.get("/aircraft").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn occurrences_filter_by_aircraft() {
    let app = app().await;
    let (_, aircraft) = app
      .post(
        "/aircraft",
        json!({ "registration": "ZS-ONE", "type": "Helicopter", "model": "B206" }),
      )
      .await;
    let aircraft_id = aircraft["aircraft_id"].as_str().unwrap();

    let mut linked = occurrence_body("Tail rotor strike");
    linked["aircraft_id"] = json!(aircraft_id);
    assert_eq!(app.post("/occurrences", linked).await.0, StatusCode::CREATED);
    reported(&app).await;

    let (status, listed) = app
      .get(&format!("/occurrences?aircraft_id={aircraft_id}"))
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Tail rotor strike");
  }

  #[tokio::test]
  async fn profiles_register_and_fetch() {
    let app = app().await;
    let (status, profile) = app
      .post(
        "/profiles",
        json!({ "email": "lerato@example.com", "full_name": "Lerato N", "role": "investigator" }),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = profile["profile_id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/profiles/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["role"], "investigator");
  }
}
