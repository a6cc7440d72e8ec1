use crate::impl_paginatable_for;
use crate::model::entity::Student;
use crate::model::repo::{ResourceTyped, expect_deleted};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseError, ModelManager, error::DatabaseResult, repo::CrudRepository};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    id: uuid::Uuid,
    name: String,
    username: String,
    email: Option<String>,
    #[serde(skip)]
    password: String,
}

/// `password` is stored as given; callers hash it first (see [`crate::auth::hash_password`]).
#[derive(Debug, Deserialize, Serialize)]
pub struct UserEntityCreateUpdate {
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, uuid::Uuid> for UserEntity {
    #[tracing::instrument(skip_all, fields(username = %data.username))]
    async fn create(mm: &ModelManager, data: UserEntityCreateUpdate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "User" (id, name, username, email, password)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING id, name, username, email, password
            "#,
        )
        .bind(mm.next_id())
        .bind(&data.name)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("user created");
        Ok(row)
    }

    async fn update(self, mm: &ModelManager, data: UserEntityCreateUpdate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE "User" SET name = $1, username = $2, email = $3, password = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password)
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "User" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())
    }

    async fn find_by_id(mm: &ModelManager, id: uuid::Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "User" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "User" ORDER BY username LIMIT $1 OFFSET $2"#)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "User""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreateUpdate, Uuid);

impl UserEntity {
    pub async fn find_by_username(
        mm: &ModelManager,
        username: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "User" WHERE username = $1"#)
            .bind(username)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_email(mm: &ModelManager, email: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "User" WHERE email = $1"#)
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Students owned by this user.
    pub async fn students(&self, mm: &ModelManager) -> DatabaseResult<Vec<Student>> {
        Student::all_by_user(mm, self.id).await
    }
}
