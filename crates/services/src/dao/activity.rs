use bson::{DateTime, Document, doc, oid::ObjectId};
use mongodb::Database;
use voluntry_db::models::{Activity, ActivityState, ActivityStatus, Participant};

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams, escape_regex};

/// Listing filters for the public activity feed.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
    pub from: Option<DateTime>,
    pub to: Option<DateTime>,
}

pub struct ActivityDao {
    pub base: BaseDao<Activity>,
}

impl ActivityDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Activity::COLLECTION),
        }
    }

    pub async fn create(&self, activity: &Activity) -> DaoResult<Activity> {
        let id = self.base.insert_one(activity).await?;
        self.base.find_by_id(id).await
    }

    /// Compare-and-swap append of a participant. Matches only while the
    /// document still carries `expected_version`, so two concurrent joins
    /// cannot both land on the same capacity check.
    pub async fn push_participant(
        &self,
        activity_id: ObjectId,
        expected_version: i64,
        participant: &Participant,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": activity_id, "version": expected_version },
                doc! {
                    "$push": { "participants": bson::to_bson(participant)? },
                    "$inc": { "version": 1 },
                },
            )
            .await
    }

    /// Removes a user from the participant list. A plain `$pull` is atomic
    /// and idempotent, so no version guard is needed.
    pub async fn pull_participant(
        &self,
        activity_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                activity_id,
                doc! {
                    "$pull": { "participants": { "user_id": user_id } },
                    "$inc": { "version": 1 },
                },
            )
            .await
    }

    /// Compare-and-swap write of the state/status pair.
    pub async fn set_state(
        &self,
        activity_id: ObjectId,
        expected_version: i64,
        state: ActivityState,
        status: ActivityStatus,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": activity_id, "version": expected_version },
                doc! {
                    "$set": { "state": state.as_str(), "status": status.as_str() },
                    "$inc": { "version": 1 },
                },
            )
            .await
    }

    /// Partial field update. `set` overwrites, `unset` clears.
    pub async fn patch(
        &self,
        activity_id: ObjectId,
        set: Document,
        unset: Document,
    ) -> DaoResult<bool> {
        let mut update = doc! { "$inc": { "version": 1 } };
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        self.base.update_by_id(activity_id, update).await
    }

    pub async fn delete(&self, activity_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(activity_id).await
    }

    /// Public listing: draft and cancelled activities are never shown.
    pub async fn list_public(
        &self,
        filter: &ActivityFilter,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Activity>> {
        let mut query = doc! {
            "state": { "$in": [ActivityState::Open.as_str(), ActivityState::Closed.as_str()] },
        };

        if let Some(ref tag) = filter.tag {
            query.insert("tags", tag);
        }

        if let Some(ref search) = filter.search {
            let escaped = escape_regex(search);
            query.insert(
                "$or",
                vec![
                    doc! { "title": { "$regex": &escaped, "$options": "i" } },
                    doc! { "description": { "$regex": &escaped, "$options": "i" } },
                ],
            );
        }

        if filter.from.is_some() || filter.to.is_some() {
            let mut range = doc! {};
            if let Some(from) = filter.from {
                range.insert("$gte", from);
            }
            if let Some(to) = filter.to {
                range.insert("$lte", to);
            }
            query.insert("date", range);
        }

        self.base.find_paginated(query, params).await
    }

    /// Activities a user owns, participates in, or both.
    pub async fn list_for_user(
        &self,
        user_id: ObjectId,
        role: Option<&str>,
    ) -> DaoResult<Vec<Activity>> {
        let query = match role {
            Some("owner") => doc! { "owner_id": user_id },
            Some("participant") => doc! { "participants.user_id": user_id },
            _ => doc! {
                "$or": [
                    { "owner_id": user_id },
                    { "participants.user_id": user_id },
                ]
            },
        };

        self.base
            .find_many(query, Some(doc! { "created_at": -1 }))
            .await
    }

    pub async fn ids_owned_by(&self, owner_id: ObjectId) -> DaoResult<Vec<ObjectId>> {
        let owned = self.base.find_many(doc! { "owner_id": owner_id }, None).await?;
        Ok(owned.into_iter().filter_map(|a| a.id).collect())
    }

    pub async fn delete_by_owner(&self, owner_id: ObjectId) -> DaoResult<u64> {
        self.base.hard_delete(doc! { "owner_id": owner_id }).await
    }

    /// Drops a user from every participant list they appear in.
    pub async fn pull_participant_everywhere(&self, user_id: ObjectId) -> DaoResult<u64> {
        let result = self
            .base
            .collection()
            .update_many(
                doc! { "participants.user_id": user_id },
                doc! {
                    "$pull": { "participants": { "user_id": user_id } },
                    "$inc": { "version": 1 },
                },
            )
            .await?;
        Ok(result.modified_count)
    }
}
