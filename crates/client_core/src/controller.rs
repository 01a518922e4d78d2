use std::sync::Arc;

use shared::{
    domain::{parse_duration_minutes, WorkoutEntry, WorkoutId, WorkoutStatus},
    protocol::{NewWorkout, WorkoutUpdate},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    gateway::{ApiResult, WorkoutApi},
    session::SessionStore,
};

pub const WORKOUT_ADDED: &str = "Workout added!";
pub const WORKOUT_UPDATED: &str = "Workout updated!";
pub const WORKOUT_COMPLETED: &str = "Workout marked as completed!";
pub const WORKOUT_DELETED: &str = "Workout deleted.";

/// Pending input for a new workout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub name: String,
    pub duration: String,
    pub status: WorkoutStatus,
}

impl FormDraft {
    fn to_new_workout(&self) -> Option<NewWorkout> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let duration = parse_duration_minutes(&self.duration).ok()?;
        Some(NewWorkout {
            name: name.to_string(),
            duration,
            status: self.status,
        })
    }
}

/// First step of an update: filled in by the caller, then committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDraft {
    id: WorkoutId,
    pub name: Option<String>,
    pub duration: Option<String>,
    cancelled: bool,
}

impl UpdateDraft {
    pub fn new(id: WorkoutId) -> Self {
        Self {
            id,
            name: None,
            duration: None,
            cancelled: false,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn cancel(mut self) -> Self {
        self.cancelled = true;
        self
    }

    fn to_update(&self) -> Option<WorkoutUpdate> {
        if self.cancelled {
            return None;
        }
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let duration = parse_duration_minutes(self.duration.as_deref()?).ok()?;
        Some(WorkoutUpdate {
            name: name.to_string(),
            duration,
        })
    }
}

/// First step of a delete: nothing is sent unless confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: WorkoutId,
    confirmed: bool,
}

impl DeleteConfirmation {
    pub fn new(id: WorkoutId) -> Self {
        Self {
            id,
            confirmed: false,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn confirm(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// A local precondition failed; nothing was sent.
    Aborted,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    WorkoutsChanged(Vec<WorkoutEntry>),
    StatusChanged(String),
    DraftReset,
}

#[derive(Default)]
struct ListState {
    workouts: Vec<WorkoutEntry>,
    draft: FormDraft,
    status_message: Option<String>,
    /// Token the collection was last loaded for; `None` until the first load.
    loaded_for: Option<Option<String>>,
}

impl ListState {
    fn position(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| &w.id == id)
    }

    fn replace_in_place(&mut self, entry: WorkoutEntry) -> bool {
        match self.position(&entry.id) {
            Some(index) => {
                self.workouts[index] = entry;
                true
            }
            None => false,
        }
    }

    fn prepend(&mut self, entry: WorkoutEntry) {
        self.workouts.retain(|w| w.id != entry.id);
        self.workouts.insert(0, entry);
    }

    fn remove(&mut self, id: &WorkoutId) -> bool {
        let before = self.workouts.len();
        self.workouts.retain(|w| &w.id != id);
        self.workouts.len() != before
    }
}

pub struct WorkoutListController {
    api: Arc<dyn WorkoutApi>,
    session: Arc<SessionStore>,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ListEvent>,
}

impl WorkoutListController {
    pub fn new(api: Arc<dyn WorkoutApi>, session: Arc<SessionStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            session,
            inner: Mutex::new(ListState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn workouts(&self) -> Vec<WorkoutEntry> {
        self.inner.lock().await.workouts.clone()
    }

    pub async fn status_message(&self) -> Option<String> {
        self.inner.lock().await.status_message.clone()
    }

    pub async fn draft(&self) -> FormDraft {
        self.inner.lock().await.draft.clone()
    }

    pub async fn set_draft(&self, draft: FormDraft) {
        self.inner.lock().await.draft = draft;
    }

    pub async fn edit_draft(&self, edit: impl FnOnce(&mut FormDraft)) {
        let mut guard = self.inner.lock().await;
        edit(&mut guard.draft);
    }

    /// Whether the complete action is available for `id`.
    pub async fn can_complete(&self, id: &WorkoutId) -> bool {
        let guard = self.inner.lock().await;
        guard
            .workouts
            .iter()
            .any(|w| &w.id == id && !w.is_completed())
    }

    /// Loads the list when the view becomes active or the session token
    /// changed since the last load. Returns whether a load was issued.
    pub async fn sync_with_session(&self) -> bool {
        let token = self.session.read().await;
        {
            let guard = self.inner.lock().await;
            if guard.loaded_for.as_ref() == Some(&token) {
                return false;
            }
        }
        self.load_for(token).await;
        true
    }

    pub async fn load(&self) -> OperationOutcome {
        let token = self.session.read().await;
        self.load_for(token).await
    }

    async fn load_for(&self, token: Option<String>) -> OperationOutcome {
        {
            let mut guard = self.inner.lock().await;
            guard.loaded_for = Some(token);
        }

        match self.api.list_mine().await {
            ApiResult::Ok(mut workouts) => {
                workouts.reverse();
                info!(count = workouts.len(), "workouts loaded");
                let mut guard = self.inner.lock().await;
                guard.workouts = workouts;
                self.emit(ListEvent::WorkoutsChanged(guard.workouts.clone()));
                OperationOutcome::Succeeded
            }
            ApiResult::Failed(message) => {
                warn!("workout load failed: {message}");
                self.set_status(message.clone()).await;
                OperationOutcome::Failed(message)
            }
        }
    }

    pub async fn add(&self) -> OperationOutcome {
        let Some(new_workout) = self.inner.lock().await.draft.to_new_workout() else {
            debug!("add aborted: draft incomplete");
            return OperationOutcome::Aborted;
        };

        match self.api.add_workout(&new_workout).await {
            ApiResult::Ok(entry) => {
                info!(workout_id = %entry.id, "workout added");
                let mut guard = self.inner.lock().await;
                guard.prepend(entry);
                guard.draft = FormDraft::default();
                guard.status_message = Some(WORKOUT_ADDED.to_string());
                self.emit(ListEvent::WorkoutsChanged(guard.workouts.clone()));
                self.emit(ListEvent::DraftReset);
                self.emit(ListEvent::StatusChanged(WORKOUT_ADDED.to_string()));
                OperationOutcome::Succeeded
            }
            ApiResult::Failed(message) => self.fail("add_workout", message).await,
        }
    }

    pub fn request_update(&self, id: WorkoutId) -> UpdateDraft {
        UpdateDraft::new(id)
    }

    pub async fn commit_update(&self, draft: UpdateDraft) -> OperationOutcome {
        let Some(update) = draft.to_update() else {
            debug!(workout_id = %draft.id, "update aborted: missing name or duration");
            return OperationOutcome::Aborted;
        };

        match self.api.update_workout(&draft.id, &update).await {
            ApiResult::Ok(entry) => {
                info!(workout_id = %entry.id, "workout updated");
                self.apply_replacement(entry, WORKOUT_UPDATED).await;
                OperationOutcome::Succeeded
            }
            ApiResult::Failed(message) => self.fail("update_workout", message).await,
        }
    }

    pub async fn complete(&self, id: &WorkoutId) -> OperationOutcome {
        if !self.can_complete(id).await {
            debug!(workout_id = %id, "complete skipped: already completed or absent");
            return OperationOutcome::Aborted;
        }

        match self.api.complete_workout(id).await {
            ApiResult::Ok(entry) => {
                info!(workout_id = %entry.id, "workout completed");
                self.apply_replacement(entry, WORKOUT_COMPLETED).await;
                OperationOutcome::Succeeded
            }
            ApiResult::Failed(message) => self.fail("complete_workout", message).await,
        }
    }

    pub fn request_delete(&self, id: WorkoutId) -> DeleteConfirmation {
        DeleteConfirmation::new(id)
    }

    pub async fn commit_delete(&self, confirmation: DeleteConfirmation) -> OperationOutcome {
        if !confirmation.is_confirmed() {
            debug!(workout_id = %confirmation.id, "delete aborted: not confirmed");
            return OperationOutcome::Aborted;
        }

        match self.api.delete_workout(&confirmation.id).await {
            ApiResult::Ok(()) => {
                info!(workout_id = %confirmation.id, "workout deleted");
                let mut guard = self.inner.lock().await;
                if guard.remove(&confirmation.id) {
                    self.emit(ListEvent::WorkoutsChanged(guard.workouts.clone()));
                }
                guard.status_message = Some(WORKOUT_DELETED.to_string());
                self.emit(ListEvent::StatusChanged(WORKOUT_DELETED.to_string()));
                OperationOutcome::Succeeded
            }
            ApiResult::Failed(message) => self.fail("delete_workout", message).await,
        }
    }

    async fn apply_replacement(&self, entry: WorkoutEntry, message: &str) {
        let id = entry.id.clone();
        let mut guard = self.inner.lock().await;
        if guard.replace_in_place(entry) {
            self.emit(ListEvent::WorkoutsChanged(guard.workouts.clone()));
        } else {
            debug!(workout_id = %id, "settled entry no longer listed; ignoring");
        }
        guard.status_message = Some(message.to_string());
        self.emit(ListEvent::StatusChanged(message.to_string()));
    }

    async fn fail(&self, operation: &'static str, message: String) -> OperationOutcome {
        warn!(operation, "workout operation failed: {message}");
        self.set_status(message.clone()).await;
        OperationOutcome::Failed(message)
    }

    async fn set_status(&self, message: String) {
        let mut guard = self.inner.lock().await;
        guard.status_message = Some(message.clone());
        self.emit(ListEvent::StatusChanged(message));
    }

    /// Callers hold the state lock so subscribers see events in the order
    /// results were applied.
    fn emit(&self, event: ListEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
