//! User profiles and the explicit acting identity.
//!
//! Profiles are weak reference targets: occurrences, investigations, updates
//! and actions point at them for authorship and assignment, but never own
//! them. Authentication happens upstream; the core trusts the [`Actor`] it is
//! handed.

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
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Admin,
  SafetyOfficer,
  Investigator,
  #[default]
  Reporter,
  Readonly,
}

/// The user performing an operation. Passed into every operation that
/// records authorship; never read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Actor {
  pub fn new(user_id: Uuid, role: Role) -> Self { Self { user_id, role } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: Uuid,
  pub email:      String,
  pub full_name:  String,
  pub role:       Role,
  pub position:   Option<String>,
  pub phone:      Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::Engine::register_profile`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub email:     String,
  pub full_name: String,
  #[serde(default)]
  pub role:      Role,
  pub position:  Option<String>,
  pub phone:     Option<String>,
}

impl NewProfile {
  pub fn validate(&self) -> Result<()> {
    require_text("email", &self.email)?;
    require_text("full name", &self.full_name)
  }
}
