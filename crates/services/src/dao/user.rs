use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use voluntry_db::models::{User, UserRole};

use super::base::{
    BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams, escape_regex,
};

/// Listing filters for the admin user directory.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        display_name: String,
        password_hash: String,
        role: UserRole,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email,
            display_name,
            avatar: None,
            password_hash: Some(password_hash),
            role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        display_name: Option<String>,
        avatar: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = display_name {
            update.insert("display_name", name);
        }
        if let Some(av) = avatar {
            update.insert("avatar", av);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }

    /// Admin directory: name/email search plus a role filter.
    pub async fn list(
        &self,
        filter: &UserFilter,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<User>> {
        let mut query = doc! { "deleted_at": null };

        if let Some(ref search) = filter.search {
            let escaped = escape_regex(search);
            query.insert(
                "$or",
                vec![
                    doc! { "display_name": { "$regex": &escaped, "$options": "i" } },
                    doc! { "email": { "$regex": &escaped, "$options": "i" } },
                ],
            );
        }
        if let Some(role) = filter.role {
            query.insert("role", role.as_str());
        }

        self.base.find_paginated(query, params).await
    }

    pub async fn count_admins(&self) -> DaoResult<u64> {
        self.base
            .count(doc! { "role": UserRole::Admin.as_str(), "deleted_at": null })
            .await
    }

    pub async fn set_role(&self, user_id: ObjectId, role: UserRole) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "role": role.as_str() } })
            .await
    }

    pub async fn delete(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(user_id).await
    }
}
