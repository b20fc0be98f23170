use bson::{doc, oid::ObjectId};
use mongodb::Database;
use voluntry_db::models::{Attendance, AttendanceStatus};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct AttendanceDao {
    pub base: BaseDao<Attendance>,
}

impl AttendanceDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Attendance::COLLECTION),
        }
    }

    /// Upsert keyed by (activity, user): recording attendance twice for the
    /// same pair overwrites instead of duplicating.
    pub async fn upsert(
        &self,
        activity_id: ObjectId,
        user_id: ObjectId,
        status: AttendanceStatus,
        recorded_by: Option<ObjectId>,
        notes: Option<String>,
    ) -> DaoResult<Attendance> {
        let now = bson::DateTime::now();
        let filter = doc! { "activity_id": activity_id, "user_id": user_id };
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "recorded_by": recorded_by,
                "notes": notes,
                "updated_at": now,
            },
            "$setOnInsert": {
                "activity_id": activity_id,
                "user_id": user_id,
                "created_at": now,
            },
        };

        let opts = mongodb::options::UpdateOptions::builder()
            .upsert(true)
            .build();
        self.base
            .collection()
            .update_one(filter.clone(), update)
            .with_options(opts)
            .await?;

        self.base.find_one(filter).await?.ok_or(DaoError::NotFound)
    }

    pub async fn list_by_activity(&self, activity_id: ObjectId) -> DaoResult<Vec<Attendance>> {
        self.base
            .find_many(
                doc! { "activity_id": activity_id },
                Some(doc! { "created_at": 1 }),
            )
            .await
    }

    /// Cascade hook for activity deletion.
    pub async fn delete_by_activity(&self, activity_id: ObjectId) -> DaoResult<u64> {
        self.base
            .hard_delete(doc! { "activity_id": activity_id })
            .await
    }

    pub async fn delete_by_activities(&self, activity_ids: &[ObjectId]) -> DaoResult<u64> {
        self.base
            .hard_delete(doc! { "activity_id": { "$in": activity_ids } })
            .await
    }

    pub async fn delete_by_user(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base.hard_delete(doc! { "user_id": user_id }).await
    }
}
