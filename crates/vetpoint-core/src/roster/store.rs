//! The roster store.

use std::sync::Arc;

use super::{PatientRepository, RosterError, RosterResult};
use crate::config::ReminderConfig;
use crate::models::{NewPatient, Patient, PatientPatch};
use crate::reminders::{dispatch, reconcile, ReminderAction, ReminderScheduler};
use crate::view::{self, PatientFilters, RosterStats, StatusFilter};

/// Authoritative patient list for the signed-in clinic user.
///
/// Mutations build a new snapshot, persist it through the repository and only
/// then swap it in, so a failed write leaves the store untouched and readers
/// holding an older [`snapshot`](Self::snapshot) never see a partial change.
/// Every adopted snapshot is reconciled against the previous one and the
/// resulting reminder actions are dispatched best-effort.
///
/// A store built with [`with_deferred_reminders`](Self::with_deferred_reminders)
/// queues those actions instead; the owner drains them with
/// [`take_pending_reminders`](Self::take_pending_reminders) and dispatches
/// once it no longer holds any lock around the store.
pub struct RosterStore<R> {
    repo: R,
    scheduler: Arc<dyn ReminderScheduler>,
    config: ReminderConfig,
    user_id: Option<String>,
    snapshot: Arc<Vec<Patient>>,
    selected: Option<String>,
    defer_reminders: bool,
    pending: Vec<ReminderAction>,
}

/// Reminder actions drained from a deferred store, ready to dispatch.
pub struct PendingReminders {
    actions: Vec<ReminderAction>,
    scheduler: Arc<dyn ReminderScheduler>,
    config: ReminderConfig,
}

impl PendingReminders {
    pub fn actions(&self) -> &[ReminderAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Send the actions. Returns how many failed.
    pub fn dispatch(self) -> usize {
        if self.actions.is_empty() {
            return 0;
        }
        dispatch(&self.actions, self.scheduler.as_ref(), &self.config)
    }
}

impl<R: PatientRepository> RosterStore<R> {
    /// Create an empty, signed-out store.
    pub fn new(repo: R, scheduler: Arc<dyn ReminderScheduler>, config: ReminderConfig) -> Self {
        Self {
            repo,
            scheduler,
            config,
            user_id: None,
            snapshot: Arc::new(Vec::new()),
            selected: None,
            defer_reminders: false,
            pending: Vec::new(),
        }
    }

    /// Queue reminder actions rather than dispatching them inline.
    pub fn with_deferred_reminders(mut self) -> Self {
        self.defer_reminders = true;
        self
    }

    /// Drain queued reminder actions, in the order they were produced.
    pub fn take_pending_reminders(&mut self) -> PendingReminders {
        PendingReminders {
            actions: std::mem::take(&mut self.pending),
            scheduler: Arc::clone(&self.scheduler),
            config: self.config.clone(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current snapshot. Cheap to clone and immune to later mutations.
    pub fn snapshot(&self) -> Arc<Vec<Patient>> {
        Arc::clone(&self.snapshot)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.snapshot
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.snapshot.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Display list for the given search text and status chip.
    pub fn view(&self, search: &str, status: StatusFilter) -> Vec<Patient> {
        view::filter_roster(&self.snapshot, search, status)
    }

    pub fn filter(&self, filters: &PatientFilters) -> Vec<Patient> {
        view::apply_filters(&self.snapshot, filters)
    }

    pub fn stats(&self) -> RosterStats {
        view::roster_stats(&self.snapshot)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selected patient, as currently stored.
    pub fn selected(&self) -> Option<&Patient> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: &str) -> RosterResult<&Patient> {
        let index = self.position(id)?;
        self.selected = Some(id.to_string());
        Ok(&self.snapshot[index])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Switch to a clinic user's roster.
    ///
    /// Reminders for the outgoing roster are cancelled and the incoming
    /// roster's appointments are scheduled.
    pub fn sign_in(&mut self, user_id: &str) -> RosterResult<()> {
        let roster = self.repo.load_roster(user_id)?;
        tracing::info!(user_id, patients = roster.len(), "clinic user signed in");

        self.user_id = Some(user_id.to_string());
        self.selected = None;
        self.adopt(roster);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            tracing::info!(user_id = %user_id, "clinic user signed out");
        }
        self.selected = None;
        self.adopt(Vec::new());
    }

    /// Pull a fresh snapshot from the repository.
    pub fn refresh(&mut self) -> RosterResult<()> {
        let user_id = self.require_user()?;
        let roster = self.repo.load_roster(&user_id)?;
        self.replace_all(roster);
        Ok(())
    }

    /// Adopt a full snapshot reported by the repository.
    pub fn replace_all(&mut self, records: Vec<Patient>) {
        self.adopt(records);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn create(&mut self, input: NewPatient) -> RosterResult<Patient> {
        let user_id = self.require_user()?;
        let patient = Patient::from_new(input);

        self.repo.add(&user_id, &patient)?;

        let mut next = self.snapshot.as_ref().clone();
        next.push(patient.clone());
        self.adopt(next);
        Ok(patient)
    }

    /// Create several patients at once. All or nothing: if any write fails,
    /// the ones already written are removed again.
    pub fn create_many(&mut self, inputs: Vec<NewPatient>) -> RosterResult<Vec<Patient>> {
        let user_id = self.require_user()?;
        let mut created: Vec<Patient> = Vec::with_capacity(inputs.len());

        for input in inputs {
            let patient = Patient::from_new(input);
            if let Err(e) = self.repo.add(&user_id, &patient) {
                for written in &created {
                    if let Err(rollback) = self.repo.delete(&user_id, &written.id) {
                        tracing::warn!(patient_id = %written.id, "rollback failed: {rollback}");
                    }
                }
                return Err(e.into());
            }
            created.push(patient);
        }

        let mut next = self.snapshot.as_ref().clone();
        next.extend(created.iter().cloned());
        self.adopt(next);
        Ok(created)
    }

    /// Merge a patch into a patient and refresh its last visit.
    pub fn update(&mut self, id: &str, patch: PatientPatch) -> RosterResult<Patient> {
        let index = self.position(id)?;
        let mut patient = self.snapshot[index].clone();
        patient.apply(patch);
        self.store_at(index, patient)
    }

    /// Remove a patient. Its reminder is cancelled before the delete is
    /// persisted, so it goes even if the delete fails.
    pub fn delete(&mut self, id: &str) -> RosterResult<()> {
        let user_id = self.require_user()?;
        let index = self.position(id)?;

        self.emit(vec![ReminderAction::cancel(id)]);
        self.repo.delete(&user_id, id)?;

        let mut next = self.snapshot.as_ref().clone();
        next.remove(index);
        // Reminder already cancelled above
        self.snapshot = Arc::new(next);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        tracing::info!(patient_id = id, "patient deleted");
        Ok(())
    }

    pub fn add_photo(&mut self, id: &str, uri: String) -> RosterResult<Patient> {
        let index = self.position(id)?;
        let mut patient = self.snapshot[index].clone();
        patient.photos.push(uri);
        self.store_at(index, patient)
    }

    /// Remove the photo at `index`. Out-of-range indexes change nothing.
    pub fn remove_photo(&mut self, id: &str, photo_index: usize) -> RosterResult<Patient> {
        let index = self.position(id)?;
        let mut patient = self.snapshot[index].clone();
        if photo_index >= patient.photos.len() {
            return Ok(patient);
        }
        patient.photos.remove(photo_index);
        self.store_at(index, patient)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_user(&self) -> RosterResult<String> {
        self.user_id.clone().ok_or(RosterError::NotSignedIn)
    }

    fn position(&self, id: &str) -> RosterResult<usize> {
        self.snapshot
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RosterError::NotFound(id.to_string()))
    }

    /// Persist a changed record and adopt it at `index`.
    fn store_at(&mut self, index: usize, patient: Patient) -> RosterResult<Patient> {
        let user_id = self.require_user()?;
        self.repo.update(&user_id, &patient)?;

        let mut next = self.snapshot.as_ref().clone();
        next[index] = patient.clone();
        self.adopt(next);
        Ok(patient)
    }

    /// Swap in a new snapshot and push the reminder changes it implies.
    fn adopt(&mut self, next: Vec<Patient>) {
        let previous = std::mem::replace(&mut self.snapshot, Arc::new(next));
        let actions = reconcile(&previous, &self.snapshot);

        if let Some(id) = self.selected.as_deref() {
            if !self.snapshot.iter().any(|p| p.id == id) {
                self.selected = None;
            }
        }

        tracing::debug!(
            patients = self.snapshot.len(),
            reminder_actions = actions.len(),
            "roster snapshot adopted"
        );
        self.emit(actions);
    }

    fn emit(&mut self, actions: Vec<ReminderAction>) {
        if self.defer_reminders {
            self.pending.extend(actions);
        } else {
            dispatch(&actions, self.scheduler.as_ref(), &self.config);
        }
    }
}
