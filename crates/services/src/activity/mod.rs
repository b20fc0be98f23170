pub mod capacity;
pub mod transitions;

use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use thiserror::Error;
use tracing::{debug, warn};
use voluntry_db::models::{
    Activity, ActivityState, ActivityStatus, Attendance, AttendanceStatus, Participant, UserRole,
};

use crate::dao::{
    activity::{ActivityDao, ActivityFilter},
    attendance::AttendanceDao,
    base::{DaoError, PaginatedResult, PaginationParams},
};
use capacity::CapacityError;

/// Bounded retries for the compare-and-swap write loops before giving up
/// with a conflict.
const MAX_WRITE_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Activity not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Already joined this activity")]
    AlreadyJoined,
    #[error("Not enough slots available")]
    CapacityExceeded,
    #[error("User is not a participant in this activity")]
    NotAParticipant,
    #[error("{0}")]
    InvalidState(String),
    #[error("Concurrent update conflict, please retry")]
    Conflict,
    #[error(transparent)]
    Dao(DaoError),
}

impl From<DaoError> for ActivityError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ActivityError::NotFound,
            other => ActivityError::Dao(other),
        }
    }
}

pub type ActivityResult<T> = Result<T, ActivityError>;

/// The authenticated caller, as the lifecycle rules see it.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: ObjectId,
    pub role: UserRole,
}

impl Actor {
    fn owns(&self, activity: &Activity) -> bool {
        activity.owner_id == Some(self.user_id)
    }

    /// Owner or admin: may edit and delete.
    fn can_manage(&self, activity: &Activity) -> bool {
        self.owns(activity) || self.role == UserRole::Admin
    }

    /// Owner, manager or admin: may drive state and record attendance.
    fn can_moderate(&self, activity: &Activity) -> bool {
        self.owns(activity) || matches!(self.role, UserRole::Manager | UserRole::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime,
    pub location: Option<String>,
    pub slots: u32,
    pub tags: Vec<String>,
}

/// Partial update: `None` leaves a field untouched; for nullable fields an
/// explicit `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateActivity {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<DateTime>,
    pub location: Option<Option<String>>,
    pub slots: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
}

pub struct ActivityService {
    pub activities: ActivityDao,
    pub attendance: AttendanceDao,
}

impl ActivityService {
    pub fn new(db: &Database) -> Self {
        Self {
            activities: ActivityDao::new(db),
            attendance: AttendanceDao::new(db),
        }
    }

    pub async fn create(&self, actor: &Actor, input: CreateActivity) -> ActivityResult<Activity> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ActivityError::Validation(
                "Title and date are required".to_string(),
            ));
        }

        let now = DateTime::now();
        let activity = Activity {
            id: None,
            owner_id: Some(actor.user_id),
            title,
            description: input.description,
            date: input.date,
            location: input.location,
            slots: input.slots,
            tags: input.tags,
            state: ActivityState::Draft,
            status: ActivityStatus::Upcoming,
            participants: Vec::new(),
            media_urls: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        Ok(self.activities.create(&activity).await?)
    }

    pub async fn get(&self, activity_id: ObjectId) -> ActivityResult<Activity> {
        Ok(self.activities.base.find_by_id(activity_id).await?)
    }

    pub async fn list(
        &self,
        filter: &ActivityFilter,
        params: &PaginationParams,
    ) -> ActivityResult<PaginatedResult<Activity>> {
        Ok(self.activities.list_public(filter, params).await?)
    }

    pub async fn list_for_user(
        &self,
        user_id: ObjectId,
        role: Option<&str>,
    ) -> ActivityResult<Vec<Activity>> {
        Ok(self.activities.list_for_user(user_id, role).await?)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        activity_id: ObjectId,
        patch: UpdateActivity,
    ) -> ActivityResult<Activity> {
        let activity = self.get(activity_id).await?;
        if !actor.can_manage(&activity) {
            return Err(ActivityError::Forbidden(
                "Only owner or admin can edit this activity".to_string(),
            ));
        }

        let mut set = doc! {};
        let mut unset = doc! {};

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ActivityError::Validation("Title must not be empty".to_string()));
            }
            set.insert("title", title);
        }
        match patch.description {
            Some(Some(description)) => {
                set.insert("description", description);
            }
            Some(None) => {
                unset.insert("description", "");
            }
            None => {}
        }
        if let Some(date) = patch.date {
            set.insert("date", date);
        }
        match patch.location {
            Some(Some(location)) => {
                set.insert("location", location);
            }
            Some(None) => {
                unset.insert("location", "");
            }
            None => {}
        }
        if let Some(slots) = patch.slots {
            set.insert("slots", slots);
        }
        if let Some(tags) = patch.tags {
            set.insert("tags", tags);
        }
        if let Some(media_urls) = patch.media_urls {
            set.insert("media_urls", media_urls);
        }

        if !set.is_empty() || !unset.is_empty() {
            self.activities.patch(activity_id, set, unset).await?;
        }

        self.get(activity_id).await
    }

    /// Deletes the activity and every attendance row referencing it.
    /// Attendance goes first so a failure in between never leaves attendance
    /// rows pointing at a deleted activity.
    pub async fn delete(&self, actor: &Actor, activity_id: ObjectId) -> ActivityResult<()> {
        let activity = self.get(activity_id).await?;
        if !actor.can_manage(&activity) {
            return Err(ActivityError::Forbidden(
                "Only owner or admin can delete this activity".to_string(),
            ));
        }

        let removed = self.attendance.delete_by_activity(activity_id).await?;
        debug!(%activity_id, removed, "Cascaded attendance delete");
        self.activities.delete(activity_id).await?;
        Ok(())
    }

    /// Join with a capacity check that holds under concurrency: the check
    /// runs against a snapshot, and the append only lands if the document
    /// version is unchanged since that snapshot.
    pub async fn join(
        &self,
        user_id: ObjectId,
        activity_id: ObjectId,
        requested: u32,
    ) -> ActivityResult<Activity> {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let activity = self.get(activity_id).await?;

            if activity.state != ActivityState::Open {
                return Err(ActivityError::InvalidState(
                    "Activity is not open for joining".to_string(),
                ));
            }
            if activity.participant(user_id).is_some() {
                return Err(ActivityError::AlreadyJoined);
            }
            capacity::can_accept(activity.slots, &activity.participants, requested).map_err(
                |e| match e {
                    CapacityError::InvalidCount => ActivityError::Validation(
                        "Participant count must be at least 1".to_string(),
                    ),
                    CapacityError::Exceeded => ActivityError::CapacityExceeded,
                },
            )?;

            let participant = Participant {
                user_id,
                joined_at: DateTime::now(),
                count: requested,
            };

            if self
                .activities
                .push_participant(activity_id, activity.version, &participant)
                .await?
            {
                return self.get(activity_id).await;
            }

            warn!(%activity_id, attempt, "Join lost a version race, retrying");
        }

        Err(ActivityError::Conflict)
    }

    /// Idempotent: leaving an activity you are not part of is a no-op.
    pub async fn leave(&self, user_id: ObjectId, activity_id: ObjectId) -> ActivityResult<Activity> {
        // Distinguish "no such activity" from "not a participant".
        self.get(activity_id).await?;
        self.activities.pull_participant(activity_id, user_id).await?;
        self.get(activity_id).await
    }

    /// Removes every trace of a user from the activity store: their owned
    /// activities (attendance first, same ordering as `delete`), their
    /// participant entries elsewhere, and their own attendance rows.
    pub async fn purge_user(&self, user_id: ObjectId) -> ActivityResult<()> {
        let owned = self.activities.ids_owned_by(user_id).await?;
        if !owned.is_empty() {
            self.attendance.delete_by_activities(&owned).await?;
            self.activities.delete_by_owner(user_id).await?;
        }

        let pulled = self.activities.pull_participant_everywhere(user_id).await?;
        let attendance = self.attendance.delete_by_user(user_id).await?;
        debug!(%user_id, owned = owned.len(), pulled, attendance, "Purged user data");
        Ok(())
    }

    pub async fn record_attendance(
        &self,
        actor: &Actor,
        activity_id: ObjectId,
        user_id: ObjectId,
        status: &str,
        notes: Option<String>,
    ) -> ActivityResult<Attendance> {
        let status = AttendanceStatus::parse(status).ok_or_else(|| {
            ActivityError::Validation("status must be present or absent".to_string())
        })?;

        let activity = self.get(activity_id).await?;
        if !actor.can_moderate(&activity) {
            return Err(ActivityError::Forbidden(
                "Only owner, manager or admin can record attendance".to_string(),
            ));
        }
        if activity.participant(user_id).is_none() {
            return Err(ActivityError::NotAParticipant);
        }

        Ok(self
            .attendance
            .upsert(activity_id, user_id, status, Some(actor.user_id), notes)
            .await?)
    }

    pub async fn change_state(
        &self,
        actor: &Actor,
        activity_id: ObjectId,
        new_state: &str,
    ) -> ActivityResult<Activity> {
        let new_state = ActivityState::parse(new_state).ok_or_else(|| {
            ActivityError::Validation(
                "Valid state (draft/open/closed/cancelled) is required".to_string(),
            )
        })?;

        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let activity = self.get(activity_id).await?;
            if !actor.can_moderate(&activity) {
                return Err(ActivityError::Forbidden(
                    "Only owner, manager or admin can change activity state".to_string(),
                ));
            }

            if !transitions::can_transition(activity.state, new_state) {
                return Err(ActivityError::InvalidState(format!(
                    "Cannot change state from {} to {}",
                    activity.state.as_str(),
                    new_state.as_str()
                )));
            }

            let new_status = transitions::derived_status(new_state, activity.status);

            if self
                .activities
                .set_state(activity_id, activity.version, new_state, new_status)
                .await?
            {
                return self.get(activity_id).await;
            }

            warn!(%activity_id, attempt, "State change lost a version race, retrying");
        }

        Err(ActivityError::Conflict)
    }
}
