//! Aircraft, fuel trailers and user profiles. Plain records with no
//! lifecycle coupling to investigations.

use uuid::Uuid;

use crate::{
  Engine, Error, Result,
  aircraft::{Aircraft, AircraftDraft},
  clock::Clock,
  profile::{NewProfile, Profile},
  store::{SafetyStore, Write},
  trailer::{FuelTrailer, NewTrailer, TrailerStatus},
};

impl<S: SafetyStore, C: Clock> Engine<S, C> {
  // ── Aircraft ──────────────────────────────────────────────────────────

  pub async fn register_aircraft(&self, draft: AircraftDraft) -> Result<Aircraft> {
    draft.validate()?;
    let now = self.now();
    let aircraft = Aircraft {
      aircraft_id:   Uuid::new_v4(),
      registration:  draft.registration,
      aircraft_type: draft.aircraft_type,
      model:         draft.model,
      year:          draft.year,
      status:        draft.status,
      notes:         draft.notes,
      created_at:    now,
      updated_at:    now,
    };
    self
      .commit(vec![Write::InsertAircraft(aircraft.clone())])
      .await
      .map_err(|e| duplicate(e, "registration", &aircraft.registration))?;
    Ok(aircraft)
  }

  /// Replace the editable fields of an existing aircraft.
  pub async fn update_aircraft(
    &self,
    aircraft_id: Uuid,
    draft: AircraftDraft,
  ) -> Result<Aircraft> {
    draft.validate()?;
    let existing = self
      .store()
      .get_aircraft(aircraft_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found("aircraft", aircraft_id))?;

    let aircraft = Aircraft {
      registration: draft.registration,
      aircraft_type: draft.aircraft_type,
      model: draft.model,
      year: draft.year,
      status: draft.status,
      notes: draft.notes,
      updated_at: self.now(),
      ..existing
    };
    self
      .commit(vec![Write::UpdateAircraft(aircraft.clone())])
      .await
      .map_err(|e| duplicate(e, "registration", &aircraft.registration))?;
    Ok(aircraft)
  }

  // ── Fuel trailers ─────────────────────────────────────────────────────

  pub async fn add_trailer(&self, input: NewTrailer) -> Result<FuelTrailer> {
    input.validate()?;
    let now = self.now();
    let trailer = FuelTrailer {
      trailer_id:    Uuid::new_v4(),
      name:          input.name,
      max_capacity:  input.max_capacity,
      current_fuel:  input.current_fuel,
      last_refilled: None,
      status:        TrailerStatus::Available,
      location:      input.location,
      created_at:    now,
      updated_at:    now,
    };
    self
      .commit(vec![Write::InsertTrailer(trailer.clone())])
      .await?;
    Ok(trailer)
  }

  /// Set the fuel level, clamped to the trailer's capacity, and stamp the
  /// refill time.
  pub async fn set_trailer_fuel(
    &self,
    trailer_id: Uuid,
    litres: i64,
  ) -> Result<FuelTrailer> {
    let mut trailer = self.require_trailer(trailer_id).await?;
    let now = self.now();
    trailer.current_fuel = trailer.clamp_fuel(litres);
    trailer.last_refilled = Some(now);
    trailer.updated_at = now;
    self
      .commit(vec![Write::UpdateTrailer(trailer.clone())])
      .await?;
    Ok(trailer)
  }

  pub async fn set_trailer_status(
    &self,
    trailer_id: Uuid,
    status: TrailerStatus,
  ) -> Result<FuelTrailer> {
    let mut trailer = self.require_trailer(trailer_id).await?;
    trailer.status = status;
    trailer.updated_at = self.now();
    self
      .commit(vec![Write::UpdateTrailer(trailer.clone())])
      .await?;
    Ok(trailer)
  }

  async fn require_trailer(&self, id: Uuid) -> Result<FuelTrailer> {
    self
      .store()
      .get_trailer(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found("trailer", id))
  }

  // ── Profiles ──────────────────────────────────────────────────────────

  pub async fn register_profile(&self, input: NewProfile) -> Result<Profile> {
    input.validate()?;
    let now = self.now();
    let profile = Profile {
      profile_id: Uuid::new_v4(),
      email:      input.email,
      full_name:  input.full_name,
      role:       input.role,
      position:   input.position,
      phone:      input.phone,
      created_at: now,
      updated_at: now,
    };
    self
      .commit(vec![Write::InsertProfile(profile.clone())])
      .await
      .map_err(|e| duplicate(e, "email", &profile.email))?;
    Ok(profile)
  }
}

/// Name the colliding value in a uniqueness conflict.
fn duplicate(e: Error, field: &str, value: &str) -> Error {
  match e {
    Error::Conflict(_) => Error::Conflict(format!("{field} {value:?} is already in use")),
    other => other,
  }
}
