use crate::impl_paginatable_for;
use crate::model::entity::{Grade, Student, VoiceExercises};
use crate::model::repo::{ResourceTyped, expect_deleted};
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One attempt at a voice exercise. Both references are nullable: a row
/// outlives the student or exercise it points to.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct VoiceExercisesHistory {
    id: Uuid,
    voice: Option<String>,
    voice_image: Option<String>,
    voice_record: Option<String>,
    recognized_text: Option<String>,
    accuracy_score: Option<i32>,
    pronunciation_score: Option<i32>,
    fluency_score: Option<i32>,
    speed_score: Option<i32>,
    score: Option<i32>,
    phonemes: Option<String>,
    created_at: DateTime<Utc>,
    voice_exercises_id: Option<Uuid>,
    student_id: Option<Uuid>,
    completed: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceExercisesHistoryCreate {
    pub voice: Option<String>,
    pub voice_image: Option<String>,
    pub voice_record: Option<String>,
    pub recognized_text: Option<String>,
    pub accuracy_score: Option<i32>,
    pub pronunciation_score: Option<i32>,
    pub fluency_score: Option<i32>,
    pub speed_score: Option<i32>,
    pub score: Option<i32>,
    pub phonemes: Option<String>,
    pub voice_exercises_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
    /// Defaults to `false`.
    pub completed: Option<bool>,
}

impl ResourceTyped for VoiceExercisesHistory {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::VoiceExercisesHistory
    }
}

impl VoiceExercisesHistory {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn voice_image(&self) -> Option<&str> {
        self.voice_image.as_deref()
    }

    pub fn voice_record(&self) -> Option<&str> {
        self.voice_record.as_deref()
    }

    pub fn recognized_text(&self) -> Option<&str> {
        self.recognized_text.as_deref()
    }

    pub fn accuracy_score(&self) -> Option<i32> {
        self.accuracy_score
    }

    pub fn pronunciation_score(&self) -> Option<i32> {
        self.pronunciation_score
    }

    pub fn fluency_score(&self) -> Option<i32> {
        self.fluency_score
    }

    pub fn speed_score(&self) -> Option<i32> {
        self.speed_score
    }

    pub fn score(&self) -> Option<i32> {
        self.score
    }

    pub fn phonemes(&self) -> Option<&str> {
        self.phonemes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn voice_exercises_id(&self) -> Option<Uuid> {
        self.voice_exercises_id
    }

    pub fn student_id(&self) -> Option<Uuid> {
        self.student_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }
}

#[async_trait::async_trait]
impl CrudRepository<VoiceExercisesHistory, VoiceExercisesHistoryCreate, Uuid>
    for VoiceExercisesHistory
{
    #[tracing::instrument(skip_all)]
    async fn create(mm: &ModelManager, data: VoiceExercisesHistoryCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "VoiceExercisesHistory" (
                id, voice, "voiceImage", "voiceRecord", "recognizedText",
                "accuracyScore", "pronunciationScore", "fluencyScore", "speedScore", score,
                phonemes, "voiceExercisesId", "studentId", completed
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
            RETURNING *
            "#,
        )
        .bind(mm.next_id())
        .bind(&data.voice)
        .bind(&data.voice_image)
        .bind(&data.voice_record)
        .bind(&data.recognized_text)
        .bind(data.accuracy_score)
        .bind(data.pronunciation_score)
        .bind(data.fluency_score)
        .bind(data.speed_score)
        .bind(data.score)
        .bind(&data.phonemes)
        .bind(data.voice_exercises_id)
        .bind(data.student_id)
        .bind(data.completed.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("attempt recorded");
        Ok(row)
    }

    async fn update(
        self,
        mm: &ModelManager,
        data: VoiceExercisesHistoryCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE "VoiceExercisesHistory"
            SET voice = $1, "voiceImage" = $2, "voiceRecord" = $3, "recognizedText" = $4,
                "accuracyScore" = $5, "pronunciationScore" = $6, "fluencyScore" = $7,
                "speedScore" = $8, score = $9, phonemes = $10,
                "voiceExercisesId" = $11, "studentId" = $12, completed = $13
            WHERE id = $14
            RETURNING *
            "#,
        )
        .bind(&data.voice)
        .bind(&data.voice_image)
        .bind(&data.voice_record)
        .bind(&data.recognized_text)
        .bind(data.accuracy_score)
        .bind(data.pronunciation_score)
        .bind(data.fluency_score)
        .bind(data.speed_score)
        .bind(data.score)
        .bind(&data.phonemes)
        .bind(data.voice_exercises_id)
        .bind(data.student_id)
        .bind(data.completed.unwrap_or(self.completed))
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(crate::model::DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "VoiceExercisesHistory" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())
    }

    async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "VoiceExercisesHistory" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercisesHistory" ORDER BY "createdAt" DESC LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "VoiceExercisesHistory""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl VoiceExercisesHistory {
    pub async fn all_by_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercisesHistory" WHERE "studentId" = $1 ORDER BY "createdAt" DESC"#,
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_by_voice_exercises(
        mm: &ModelManager,
        voice_exercises_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "VoiceExercisesHistory" WHERE "voiceExercisesId" = $1 ORDER BY "createdAt" DESC"#,
        )
        .bind(voice_exercises_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn student(&self, mm: &ModelManager) -> DatabaseResult<Option<Student>> {
        match self.student_id {
            Some(id) => Student::find_by_id(mm, id).await,
            None => Ok(None),
        }
    }

    pub async fn voice_exercises(&self, mm: &ModelManager) -> DatabaseResult<Option<VoiceExercises>> {
        match self.voice_exercises_id {
            Some(id) => VoiceExercises::find_by_id(mm, id).await,
            None => Ok(None),
        }
    }
}

impl_paginatable_for!(VoiceExercisesHistory, VoiceExercisesHistoryCreate, Uuid);

// Utils

/// History row of a student in a given grade, with the module it was practiced in.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryReportRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub score: Option<i32>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub module_title: Option<String>,
}

impl HistoryReportRow {
    /// `grade` is compared against the student's free-text grade column.
    pub async fn fetch_by_student_grade(
        mm: &ModelManager,
        grade: Grade,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                h.id,
                s.id AS student_id,
                s.firstname,
                s.lastname,
                h.score,
                h.completed,
                h."createdAt" AS created_at,
                m."moduleTitle" AS module_title
            FROM "VoiceExercisesHistory" h
            JOIN "Student" s ON s.id = h."studentId"
            LEFT JOIN "VoiceExercises" ve ON ve.id = h."voiceExercisesId"
            LEFT JOIN "Module" m ON m.id = ve."moduleId"
            WHERE s.grade = $1
            ORDER BY h."createdAt" DESC
            "#,
        )
        .bind(grade.as_str())
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
