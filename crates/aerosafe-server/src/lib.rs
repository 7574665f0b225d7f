//! Process wiring for the aerosafe server: configuration, the top-level
//! router and the optional background reconciler.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use aerosafe_core::{Engine, clock::Clock, store::SafetyStore};
use axum::{Router, routing::get};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AEROSAFE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  /// Seconds between scheduled reconciliation runs. Unset or zero disables
  /// the background task.
  #[serde(default)]
  pub reconcile_interval_secs: Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/aerosafe/aerosafe.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn reconcile_interval(&self) -> Option<Duration> {
    self
      .reconcile_interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP application: the JSON API under `/api`, a liveness check
/// at `/health`, and request tracing.
pub fn app<S, C>(engine: Arc<Engine<S, C>>) -> Router
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", aerosafe_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}

// ─── Background reconciliation ────────────────────────────────────────────────

/// Run [`Engine::reconcile`] every `every`, starting immediately. Failures
/// are logged and the loop carries on.
pub fn spawn_reconciler<S, C>(engine: Arc<Engine<S, C>>, every: Duration) -> JoinHandle<()>
where
  S: SafetyStore + 'static,
  C: Clock + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      if let Err(e) = engine.reconcile().await {
        tracing::error!(error = %e, "scheduled reconciliation failed");
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use aerosafe_core::{
    action::{ActionStatus, NewCorrectiveAction},
    clock::ManualClock,
    occurrence::{NewOccurrence, OccurrenceType, Severity},
    profile::{Actor, Role},
  };
  use aerosafe_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn config_defaults_apply() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("~/.local/share/aerosafe/aerosafe.db"));
    assert_eq!(cfg.reconcile_interval(), None);
  }

  #[test]
  fn config_overrides_and_zero_interval() {
    let cfg = parse(
      r#"
        host = "0.0.0.0"
        port = 9000
        store_path = "/var/lib/aerosafe/db.sqlite"
        reconcile_interval_secs = 3600
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.reconcile_interval(), Some(Duration::from_secs(3600)));

    let disabled = parse("reconcile_interval_secs = 0");
    assert_eq!(disabled.reconcile_interval(), None);
  }

  #[test]
  fn tilde_expansion() {
    let plain = Path::new("/tmp/aerosafe.db");
    assert_eq!(expand_tilde(plain), plain);

    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/aerosafe.db")),
        PathBuf::from(home).join("aerosafe.db")
      );
    }
  }

  async fn engine() -> (Arc<Engine<SqliteStore, Arc<ManualClock>>>, Arc<ManualClock>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let clock = Arc::new(ManualClock::new(
      Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    (Arc::new(Engine::new(store, Arc::clone(&clock))), clock)
  }

  #[tokio::test]
  async fn app_serves_health_and_nested_api() {
    let (engine, _) = engine().await;
    let app = app(engine);

    let health = app
      .clone()
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let dashboard = app
      .clone()
      .oneshot(Request::get("/api/reports/dashboard").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);

    let unmounted = app
      .oneshot(Request::get("/reports/dashboard").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(unmounted.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn reconciler_marks_overdue_actions() {
    let (engine, clock) = engine().await;
    let actor = Actor { user_id: Uuid::new_v4(), role: Role::SafetyOfficer };

    let occurrence = engine
      .report_occurrence(actor, NewOccurrence {
        title:              "Bird strike on approach".to_owned(),
        occurred_at:        clock.now(),
        location:           "RWY 21".to_owned(),
        occurrence_type:    OccurrenceType::Incident,
        severity:           Severity::High,
        description:        "Single bird, no damage found".to_owned(),
        aircraft_id:        None,
        weather_conditions: None,
        flight_phase:       Some("approach".to_owned()),
        immediate_actions:  None,
      })
      .await
      .unwrap();
    let investigation = engine
      .start_investigation(actor, occurrence.occurrence_id, None)
      .await
      .unwrap();
    let action = engine
      .add_corrective_action(investigation.investigation_id, NewCorrectiveAction {
        title:       "Review wildlife hazard plan".to_owned(),
        description: "Check grass cutting schedule".to_owned(),
        assigned_to: None,
        due_date:    NaiveDate::from_ymd_opt(2024, 5, 10),
      })
      .await
      .unwrap();
    assert_eq!(action.status, ActionStatus::Pending);

    clock.advance(TimeDelta::days(30));
    let handle = spawn_reconciler(Arc::clone(&engine), Duration::from_millis(10));

    let mut status = ActionStatus::Pending;
    for _ in 0..100 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      status = engine
        .store()
        .get_action(action.action_id)
        .await
        .unwrap()
        .unwrap()
        .status;
      if status == ActionStatus::Overdue {
        break;
      }
    }
    handle.abort();
    assert_eq!(status, ActionStatus::Overdue);
  }
}
