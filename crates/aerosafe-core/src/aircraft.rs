//! Aircraft registry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Result, error::require_text};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AircraftStatus {
  #[default]
  Active,
  Maintenance,
  Inactive,
  Retired,
}

/// An aircraft in the operator's fleet. Referenced by occurrences, never
/// owned by them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
  pub aircraft_id:   Uuid,
  /// Tail number, e.g. `ZS-ABC`.
  pub registration:  String,
  #[serde(rename = "type")]
  pub aircraft_type: String,
  pub model:         String,
  pub year:          Option<i32>,
  pub status:        AircraftStatus,
  pub notes:         Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Editable fields of an aircraft; used for both registration and update.
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftDraft {
  pub registration:  String,
  #[serde(rename = "type")]
  pub aircraft_type: String,
  pub model:         String,
  pub year:          Option<i32>,
  #[serde(default)]
  pub status:        AircraftStatus,
  pub notes:         Option<String>,
}

impl AircraftDraft {
  pub fn validate(&self) -> Result<()> {
    require_text("registration", &self.registration)?;
    require_text("type", &self.aircraft_type)?;
    require_text("model", &self.model)
  }
}
