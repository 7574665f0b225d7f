//! The investigation lifecycle: reporting an occurrence, starting and
//! advancing its investigation, recording notes and corrective actions, or
//! closing the occurrence as invalid instead.
//!
//! Every transition that touches two records (investigation and occurrence)
//! is committed as one batch, so the pair lands together or not at all.

use uuid::Uuid;

use crate::{
  Engine, Error, Result,
  action::{ActionStatus, CorrectiveAction, NewCorrectiveAction},
  clock::Clock,
  investigation::{
    FindingsPatch, Investigation, InvestigationUpdate, InvestigationView, Stage,
  },
  occurrence::{NewOccurrence, Occurrence, OccurrenceStatus},
  profile::Actor,
  store::{ActionQuery, SafetyStore, Write},
};

impl<S: SafetyStore, C: Clock> Engine<S, C> {
  // ── Occurrences ───────────────────────────────────────────────────────

  /// Record a new occurrence reported by `actor`.
  pub async fn report_occurrence(
    &self,
    actor: Actor,
    input: NewOccurrence,
  ) -> Result<Occurrence> {
    input.validate()?;
    let now = self.now();
    let occurrence = Occurrence {
      occurrence_id:      Uuid::new_v4(),
      title:              input.title,
      occurred_at:        input.occurred_at,
      location:           input.location,
      occurrence_type:    input.occurrence_type,
      severity:           input.severity,
      status:             OccurrenceStatus::Reported,
      description:        input.description,
      aircraft_id:        input.aircraft_id,
      reporter_id:        actor.user_id,
      assigned_to:        None,
      weather_conditions: input.weather_conditions,
      flight_phase:       input.flight_phase,
      immediate_actions:  input.immediate_actions,
      is_invalid:         false,
      invalid_reason:     None,
      created_at:         now,
      updated_at:         now,
    };

    self
      .commit(vec![Write::InsertOccurrence(occurrence.clone())])
      .await?;
    tracing::info!(
      occurrence_id = %occurrence.occurrence_id,
      reporter_id = %actor.user_id,
      "occurrence reported"
    );
    Ok(occurrence)
  }

  /// Close an occurrence as invalid instead of investigating it.
  ///
  /// Rejected once an investigation exists or the occurrence is closed.
  pub async fn mark_invalid(
    &self,
    occurrence_id: Uuid,
    reason: &str,
  ) -> Result<Occurrence> {
    if reason.trim().is_empty() {
      return Err(Error::validation(
        "a reason is required to mark an occurrence invalid",
      ));
    }

    let mut occurrence = self.require_occurrence(occurrence_id).await?;
    let investigation = self
      .store()
      .investigation_for(occurrence_id)
      .await
      .map_err(Error::store)?;

    if investigation.is_some()
      || matches!(
        occurrence.status,
        OccurrenceStatus::UnderInvestigation | OccurrenceStatus::Closed
      )
    {
      return Err(Error::InvalidTransition(format!(
        "occurrence {occurrence_id} is {} and cannot be marked invalid",
        occurrence.status
      )));
    }

    occurrence.is_invalid = true;
    occurrence.invalid_reason = Some(reason.to_owned());
    occurrence.status = OccurrenceStatus::Closed;
    occurrence.updated_at = self.now();

    self
      .commit(vec![Write::UpdateOccurrence(occurrence.clone())])
      .await?;
    tracing::info!(%occurrence_id, "occurrence marked invalid");
    Ok(occurrence)
  }

  // ── Investigations ────────────────────────────────────────────────────

  /// Open an investigation for an occurrence that has none, moving the
  /// occurrence to `under_investigation`.
  pub async fn start_investigation(
    &self,
    actor: Actor,
    occurrence_id: Uuid,
    lead_investigator_id: Option<Uuid>,
  ) -> Result<Investigation> {
    let mut occurrence = self.require_occurrence(occurrence_id).await?;

    let existing = self
      .store()
      .investigation_for(occurrence_id)
      .await
      .map_err(Error::store)?;
    if let Some(existing) = existing {
      return Err(Error::InvalidTransition(format!(
        "occurrence {occurrence_id} already has investigation {}",
        existing.investigation_id
      )));
    }
    if occurrence.is_invalid || occurrence.status == OccurrenceStatus::Closed {
      return Err(Error::InvalidTransition(format!(
        "occurrence {occurrence_id} is closed"
      )));
    }

    let now = self.now();
    let investigation =
      Investigation::open(occurrence_id, lead_investigator_id, now);
    occurrence.status = OccurrenceStatus::UnderInvestigation;
    occurrence.updated_at = now;

    self
      .commit(vec![
        Write::InsertInvestigation(investigation.clone()),
        Write::UpdateOccurrence(occurrence),
      ])
      .await?;
    tracing::info!(
      %occurrence_id,
      investigation_id = %investigation.investigation_id,
      started_by = %actor.user_id,
      "investigation started"
    );
    Ok(investigation)
  }

  /// Move an investigation to `target`, which must be the stage immediately
  /// after its current one. Reaching `completed` closes the occurrence.
  pub async fn advance(
    &self,
    investigation_id: Uuid,
    target: Stage,
  ) -> Result<Investigation> {
    let mut investigation = self.require_investigation(investigation_id).await?;
    let mut occurrence = self
      .require_occurrence(investigation.occurrence_id)
      .await?;

    let from = investigation.stage;
    if from.next() != Some(target) {
      return Err(Error::InvalidTransition(format!(
        "cannot move investigation from {from} to {target}"
      )));
    }

    let now = self.now();
    investigation.stage = target;
    investigation.updated_at = now;

    let mut batch = Vec::with_capacity(2);
    if target == Stage::Completed {
      investigation.completed_at = Some(now);
      occurrence.status = OccurrenceStatus::Closed;
      occurrence.updated_at = now;
      batch.push(Write::UpdateOccurrence(occurrence));
    }
    batch.push(Write::UpdateInvestigation(investigation.clone()));

    self.commit(batch).await?;
    tracing::info!(%investigation_id, %from, to = %target, "investigation advanced");
    Ok(investigation)
  }

  /// Record findings and related free-text fields. Does not change stage.
  pub async fn update_findings(
    &self,
    investigation_id: Uuid,
    patch: FindingsPatch,
  ) -> Result<Investigation> {
    let mut investigation = self.require_investigation(investigation_id).await?;
    patch.apply_to(&mut investigation);
    investigation.updated_at = self.now();
    self
      .commit(vec![Write::UpdateInvestigation(investigation.clone())])
      .await?;
    Ok(investigation)
  }

  /// Append a progress note authored by `actor`.
  pub async fn add_update(
    &self,
    actor: Actor,
    investigation_id: Uuid,
    note: &str,
  ) -> Result<InvestigationUpdate> {
    if note.trim().is_empty() {
      return Err(Error::validation("update text cannot be empty"));
    }
    self.require_investigation(investigation_id).await?;

    let update = InvestigationUpdate {
      update_id: Uuid::new_v4(),
      investigation_id,
      author_id: actor.user_id,
      note: note.to_owned(),
      created_at: self.now(),
    };
    self.commit(vec![Write::InsertUpdate(update.clone())]).await?;
    Ok(update)
  }

  /// Progress notes for an existing investigation, oldest first.
  pub async fn investigation_updates(
    &self,
    investigation_id: Uuid,
  ) -> Result<Vec<InvestigationUpdate>> {
    self.require_investigation(investigation_id).await?;
    self
      .store()
      .list_updates(investigation_id)
      .await
      .map_err(Error::store)
  }

  /// Assemble the detail view: investigation, occurrence, notes, actions and
  /// the derived progress and duration.
  pub async fn investigation_view(
    &self,
    investigation_id: Uuid,
  ) -> Result<InvestigationView> {
    let investigation = self.require_investigation(investigation_id).await?;
    let occurrence = self
      .require_occurrence(investigation.occurrence_id)
      .await?;
    let updates = self
      .store()
      .list_updates(investigation_id)
      .await
      .map_err(Error::store)?;
    let query = ActionQuery {
      investigation_id: Some(investigation_id),
      ..Default::default()
    };
    let corrective_actions = self
      .store()
      .list_actions(&query)
      .await
      .map_err(Error::store)?;

    let as_of = self.now();
    Ok(InvestigationView {
      progress_percent: investigation.progress_percent(),
      duration: investigation.duration(as_of),
      next_stage: investigation.stage.next(),
      investigation,
      occurrence,
      updates,
      corrective_actions,
      as_of,
    })
  }

  // ── Corrective actions ────────────────────────────────────────────────

  /// Attach a corrective action to an investigation. Starts `pending`, or
  /// `overdue` if the due date has already passed.
  pub async fn add_corrective_action(
    &self,
    investigation_id: Uuid,
    input: NewCorrectiveAction,
  ) -> Result<CorrectiveAction> {
    input.validate()?;
    self.require_investigation(investigation_id).await?;

    let now = self.now();
    let mut action = CorrectiveAction {
      action_id: Uuid::new_v4(),
      investigation_id,
      title: input.title,
      description: input.description,
      assigned_to: input.assigned_to,
      status: ActionStatus::Pending,
      due_date: input.due_date,
      completed_at: None,
      created_at: now,
      updated_at: now,
    };
    action.status = action.reconciled_status(now);

    self.commit(vec![Write::InsertAction(action.clone())]).await?;
    Ok(action)
  }

  /// Change an action's status. `overdue` is derived and cannot be set
  /// directly; a past-due request lands as `overdue` anyway.
  pub async fn set_action_status(
    &self,
    action_id: Uuid,
    status: ActionStatus,
  ) -> Result<CorrectiveAction> {
    if status == ActionStatus::Overdue {
      return Err(Error::validation(
        "overdue is derived from the due date and cannot be set",
      ));
    }
    let mut action = self.require_action(action_id).await?;

    let now = self.now();
    action.completed_at = match (status, action.completed_at) {
      (ActionStatus::Completed, Some(at)) => Some(at),
      (ActionStatus::Completed, None) => Some(now),
      _ => None,
    };
    action.status = status;
    action.status = action.reconciled_status(now);
    action.updated_at = now;

    self.commit(vec![Write::UpdateAction(action.clone())]).await?;
    tracing::info!(%action_id, status = %action.status, "corrective action updated");
    Ok(action)
  }
}
