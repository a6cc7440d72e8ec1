use crate::impl_paginatable_for;
use crate::model::entity::Student;
use crate::model::repo::{ResourceTyped, expect_deleted};
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult, repo::CrudRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Tier recorded on awards granted from voice-exercise history.
pub const VOICE_TIER: &str = "Voice";

#[derive(Debug, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Award {
    id: Uuid,
    student_id: Uuid,
    award_type: String,
    tier: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardCreate {
    pub student_id: Uuid,
    pub award_type: String,
    pub tier: Option<String>,
}

impl ResourceTyped for Award {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Award
    }
}

impl Award {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn award_type(&self) -> &str {
        &self.award_type
    }

    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[async_trait::async_trait]
impl CrudRepository<Award, AwardCreate, Uuid> for Award {
    #[tracing::instrument(skip_all, fields(student_id = %data.student_id, award_type = %data.award_type))]
    async fn create(mm: &ModelManager, data: AwardCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "Award" (id, "studentId", "awardType", tier)
            VALUES ($1,$2,$3,$4)
            RETURNING id, "studentId", "awardType", tier, "createdAt"
            "#,
        )
        .bind(mm.next_id())
        .bind(data.student_id)
        .bind(&data.award_type)
        .bind(&data.tier)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("award granted");
        Ok(row)
    }

    async fn update(self, mm: &ModelManager, data: AwardCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"UPDATE "Award" SET "studentId" = $1, "awardType" = $2, tier = $3 WHERE id = $4 RETURNING *"#,
        )
        .bind(data.student_id)
        .bind(&data.award_type)
        .bind(&data.tier)
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "Award" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())
    }

    async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Award" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Award" ORDER BY "createdAt" DESC LIMIT $1 OFFSET $2"#)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Award""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Award {
    pub async fn all_by_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "Award" WHERE "studentId" = $1 ORDER BY "createdAt" DESC"#,
        )
        .bind(student_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn count_by_student(mm: &ModelManager, student_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Award" WHERE "studentId" = $1"#)
            .bind(student_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn student(&self, mm: &ModelManager) -> DatabaseResult<Option<Student>> {
        Student::find_by_id(mm, self.student_id).await
    }

    /// Grants a voice-tier badge from the student's average attempt score.
    ///
    /// Every history row of the student counts, a missing score counts as 0.
    /// Returns `None` when the student has no attempts or the average is
    /// below the lowest badge.
    #[tracing::instrument(skip(mm))]
    pub async fn evaluate_for_student(
        mm: &ModelManager,
        student_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let (attempts, average): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(COALESCE(score, 0))::float8
            FROM "VoiceExercisesHistory"
            WHERE "studentId" = $1
            "#,
        )
        .bind(student_id)
        .fetch_one(mm.executor())
        .await?;

        if attempts == 0 {
            tracing::debug!("no attempts, nothing to award");
            return Ok(None);
        }

        let average = average.unwrap_or(0.0);
        let Some(badge) = Badge::for_average(average) else {
            tracing::debug!(average, "average below every badge");
            return Ok(None);
        };

        let award = Award::create(
            mm,
            AwardCreate {
                student_id,
                award_type: badge.to_string(),
                tier: Some(VOICE_TIER.to_string()),
            },
        )
        .await?;

        tracing::info!(average, badge = %badge, "award granted");
        Ok(Some(award))
    }
}

impl_paginatable_for!(Award, AwardCreate, Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Star,
    Gold,
    Silver,
    Bronze,
}

impl Badge {
    pub fn for_average(average: f64) -> Option<Self> {
        if average >= 95.0 {
            Some(Self::Star)
        } else if average >= 90.0 {
            Some(Self::Gold)
        } else if average >= 80.0 {
            Some(Self::Silver)
        } else if average >= 70.0 {
            Some(Self::Bronze)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Star => write!(f, "Star Badge"),
            Self::Gold => write!(f, "Gold Badge"),
            Self::Silver => write!(f, "Silver Badge"),
            Self::Bronze => write!(f, "Bronze Badge"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn badge_thresholds_are_inclusive() {
        assert_eq!(Badge::for_average(100.0), Some(Badge::Star));
        assert_eq!(Badge::for_average(95.0), Some(Badge::Star));
        assert_eq!(Badge::for_average(94.9), Some(Badge::Gold));
        assert_eq!(Badge::for_average(90.0), Some(Badge::Gold));
        assert_eq!(Badge::for_average(80.0), Some(Badge::Silver));
        assert_eq!(Badge::for_average(70.0), Some(Badge::Bronze));
        assert_eq!(Badge::for_average(69.99), None);
        assert_eq!(Badge::for_average(0.0), None);
    }

    #[test]
    fn badge_names() {
        assert_eq!(Badge::Star.to_string(), "Star Badge");
        assert_eq!(Badge::Bronze.to_string(), "Bronze Badge");
    }
}
