use crate::impl_paginatable_for;
use crate::model::entity::{Module, VoiceExercisesHistory};
use crate::model::repo::{ResourceTyped, expect_deleted};
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult, repo::CrudRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Postgres `grade_enum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grade_enum")]
pub enum Grade {
    GradeOne,
    GradeTwo,
    GradeThree,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GradeOne => "GradeOne",
            Self::GradeTwo => "GradeTwo",
            Self::GradeThree => "GradeThree",
        }
    }
}

impl std::str::FromStr for Grade {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GradeOne" => Ok(Self::GradeOne),
            "GradeTwo" => Ok(Self::GradeTwo),
            "GradeThree" => Ok(Self::GradeThree),
            other => Err(DatabaseError::unknown_variant("grade", other)),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct VoiceExercises {
    id: Uuid,
    user_id: Option<String>,
    voice_image: Option<String>,
    voice: String,
    grade: Option<Grade>,
    module_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// `user_id` is free text and is not checked against `User`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceExercisesCreate {
    pub user_id: Option<String>,
    pub voice_image: Option<String>,
    pub voice: String,
    pub grade: Option<Grade>,
    pub module_id: Uuid,
}

impl ResourceTyped for VoiceExercises {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::VoiceExercises
    }
}

impl VoiceExercises {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn voice_image(&self) -> Option<&str> {
        self.voice_image.as_deref()
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[async_trait::async_trait]
impl CrudRepository<VoiceExercises, VoiceExercisesCreate, Uuid> for VoiceExercises {
    #[tracing::instrument(skip_all, fields(module_id = %data.module_id))]
    async fn create(mm: &ModelManager, data: VoiceExercisesCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "VoiceExercises" (id, "userId", "voiceImage", voice, grade, "moduleId")
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(mm.next_id())
        .bind(&data.user_id)
        .bind(&data.voice_image)
        .bind(&data.voice)
        .bind(data.grade)
        .bind(data.module_id)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("voice exercise created");
        Ok(row)
    }

    async fn update(self, mm: &ModelManager, data: VoiceExercisesCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE "VoiceExercises"
            SET "userId" = $1, "voiceImage" = $2, voice = $3, grade = $4, "moduleId" = $5, "updatedAt" = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.user_id)
        .bind(&data.voice_image)
        .bind(&data.voice)
        .bind(data.grade)
        .bind(data.module_id)
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "VoiceExercises" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())
    }

    async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "VoiceExercises" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercises" ORDER BY "createdAt" LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "VoiceExercises""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl VoiceExercises {
    pub async fn all_by_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercises" WHERE "moduleId" = $1 ORDER BY "createdAt""#,
        )
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_by_grade(mm: &ModelManager, grade: Grade) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercises" WHERE grade = $1 ORDER BY "createdAt""#,
        )
        .bind(grade)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn module(&self, mm: &ModelManager) -> DatabaseResult<Option<Module>> {
        Module::find_by_id(mm, self.module_id).await
    }

    pub async fn history(&self, mm: &ModelManager) -> DatabaseResult<Vec<VoiceExercisesHistory>> {
        VoiceExercisesHistory::all_by_voice_exercises(mm, self.id).await
    }
}

impl_paginatable_for!(VoiceExercises, VoiceExercisesCreate, Uuid);
