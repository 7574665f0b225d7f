//! Fuel trailers: mobile refuellers tracked by capacity and current level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, error::require_text};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrailerStatus {
  #[default]
  Available,
  InUse,
  Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTrailer {
  pub trailer_id:    Uuid,
  pub name:          String,
  /// Litres.
  pub max_capacity:  u32,
  /// Litres; always within `0..=max_capacity`.
  pub current_fuel:  u32,
  pub last_refilled: Option<DateTime<Utc>>,
  pub status:        TrailerStatus,
  pub location:      String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl FuelTrailer {
  /// Fill level as a whole percentage, capped at 100.
  pub fn fuel_percent(&self) -> u8 {
    if self.max_capacity == 0 {
      return 0;
    }
    let pct = (f64::from(self.current_fuel) / f64::from(self.max_capacity)
      * 100.0)
      .round();
    pct.min(100.0) as u8
  }

  /// Clamp a requested level into the trailer's capacity.
  pub fn clamp_fuel(&self, litres: i64) -> u32 {
    litres.clamp(0, i64::from(self.max_capacity)) as u32
  }
}

/// Input to [`crate::Engine::add_trailer`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrailer {
  pub name:         String,
  pub max_capacity: u32,
  #[serde(default)]
  pub current_fuel: u32,
  pub location:     String,
}

impl NewTrailer {
  pub fn validate(&self) -> Result<()> {
    require_text("name", &self.name)?;
    require_text("location", &self.location)?;
    if self.max_capacity == 0 {
      return Err(Error::validation("max capacity must be positive"));
    }
    if self.current_fuel > self.max_capacity {
      return Err(Error::validation("current fuel exceeds max capacity"));
    }
    Ok(())
  }
}
