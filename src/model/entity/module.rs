use crate::impl_paginatable_for;
use crate::model::entity::{Grade, VoiceExercises};
use crate::model::repo::{ResourceTyped, expect_deleted};
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult, repo::CrudRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Postgres `subject_enum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subject_enum")]
pub enum Subject {
    Reading,
    Math,
}

impl std::str::FromStr for Subject {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Reading" => Ok(Self::Reading),
            "Math" => Ok(Self::Math),
            other => Err(DatabaseError::unknown_variant("subject", other)),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading"),
            Self::Math => write!(f, "Math"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Module {
    id: Uuid,
    module_title: String,
    module_description: Option<String>,
    learn_outcome1: Option<String>,
    video_module: Option<String>,
    image_module: Option<String>,
    subjects: Option<Subject>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCreate {
    pub module_title: String,
    pub module_description: Option<String>,
    pub learn_outcome1: Option<String>,
    pub video_module: Option<String>,
    pub image_module: Option<String>,
    pub subjects: Option<Subject>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_title(&self) -> &str {
        &self.module_title
    }

    pub fn module_description(&self) -> Option<&str> {
        self.module_description.as_deref()
    }

    pub fn learn_outcome1(&self) -> Option<&str> {
        self.learn_outcome1.as_deref()
    }

    pub fn video_module(&self) -> Option<&str> {
        self.video_module.as_deref()
    }

    pub fn image_module(&self) -> Option<&str> {
        self.image_module.as_deref()
    }

    pub fn subjects(&self) -> Option<Subject> {
        self.subjects
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `None` until the first update.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[async_trait::async_trait]
impl CrudRepository<Module, ModuleCreate, Uuid> for Module {
    #[tracing::instrument(skip_all, fields(title = %data.module_title))]
    async fn create(mm: &ModelManager, data: ModuleCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "Module" (id, "moduleTitle", "moduleDescription", "learnOutcome1", "videoModule", "imageModule", subjects)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(mm.next_id())
        .bind(&data.module_title)
        .bind(&data.module_description)
        .bind(&data.learn_outcome1)
        .bind(&data.video_module)
        .bind(&data.image_module)
        .bind(data.subjects)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("module created");
        Ok(row)
    }

    async fn update(self, mm: &ModelManager, data: ModuleCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE "Module"
            SET "moduleTitle" = $1, "moduleDescription" = $2, "learnOutcome1" = $3,
                "videoModule" = $4, "imageModule" = $5, subjects = $6, "updatedAt" = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.module_title)
        .bind(&data.module_description)
        .bind(&data.learn_outcome1)
        .bind(&data.video_module)
        .bind(&data.image_module)
        .bind(data.subjects)
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    /// Fails with a foreign-key violation while exercises still reference the module.
    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "Module" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())
    }

    async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Module" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Module" ORDER BY "createdAt" LIMIT $1 OFFSET $2"#)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Module""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Module {
    pub async fn find_by_title(mm: &ModelManager, title: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Module" WHERE "moduleTitle" = $1 LIMIT 1"#)
            .bind(title)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all_by_subject(mm: &ModelManager, subject: Subject) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Module" WHERE subjects = $1 ORDER BY "createdAt""#)
            .bind(subject)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn voice_exercises(&self, mm: &ModelManager) -> DatabaseResult<Vec<VoiceExercises>> {
        VoiceExercises::all_by_module(mm, self.id).await
    }
}

impl_paginatable_for!(Module, ModuleCreate, Uuid);

// Utils

#[derive(sqlx::FromRow)]
pub struct ModuleWithExercisesRow {
    pub id: Uuid,
    pub module_title: String,
    pub subjects: Option<Subject>,
    pub exercises: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseSummary {
    pub id: Uuid,
    pub voice: String,
    pub grade: Option<Grade>,
}

impl ModuleWithExercisesRow {
    pub async fn fetch_all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<ModuleWithExercisesRow> = sqlx::query_as(
            r#"
            SELECT
            m.id,
            m."moduleTitle" AS module_title,
            m.subjects,
            COALESCE(
                json_agg(
                    json_build_object(
                        'id', ve.id,
                        'voice', ve.voice,
                        'grade', ve.grade
                    )
                    ORDER BY ve."createdAt"
                ) FILTER (WHERE ve.id IS NOT NULL),
                '[]'
            ) AS exercises
            FROM "Module" m
            LEFT JOIN "VoiceExercises" ve ON ve."moduleId" = m.id
            GROUP BY m.id
            ORDER BY m."createdAt";
        "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub fn exercises(&self) -> DatabaseResult<Vec<ExerciseSummary>> {
        Ok(serde_json::from_value(self.exercises.clone())?)
    }
}
