use crate::impl_paginatable_for;
use crate::model::entity::{Award, UserEntity, VoiceExercisesHistory};
use crate::model::repo::{ResourceTyped, expect_deleted};
use crate::model::{DatabaseError, ModelManager, error::DatabaseResult, repo::CrudRepository};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Student {
    id: Uuid,
    firstname: String,
    lastname: String,
    user_id: Uuid,
    sex: Option<String>,
    grade: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StudentCreate {
    pub firstname: String,
    pub lastname: String,
    pub user_id: Uuid,
    pub sex: Option<String>,
    pub grade: Option<String>,
}

impl ResourceTyped for Student {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Student
    }
}

impl Student {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn sex(&self) -> Option<&str> {
        self.sex.as_deref()
    }

    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }
}

#[async_trait::async_trait]
impl CrudRepository<Student, StudentCreate, Uuid> for Student {
    #[tracing::instrument(skip_all, fields(user_id = %data.user_id))]
    async fn create(mm: &ModelManager, data: StudentCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "Student" (id, firstname, lastname, user_id, sex, grade)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING id, firstname, lastname, user_id, sex, grade
            "#,
        )
        .bind(mm.next_id())
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(data.user_id)
        .bind(&data.sex)
        .bind(&data.grade)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("student created");
        Ok(row)
    }

    async fn update(self, mm: &ModelManager, data: StudentCreate) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE "Student" SET firstname = $1, lastname = $2, user_id = $3, sex = $4, grade = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.firstname)
        .bind(&data.lastname)
        .bind(data.user_id)
        .bind(&data.sex)
        .bind(&data.grade)
        .bind(self.id)
        .fetch_optional(mm.executor())
        .await?;

        row.ok_or(DatabaseError::NotFound {
            resource_type: Self::get_resource_type(),
        })
    }

    /// Awards go with the student; history rows stay and lose their `studentId`.
    #[tracing::instrument(skip_all, fields(id = %self.id))]
    async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        let result = sqlx::query(r#"DELETE FROM "Student" WHERE id = $1"#)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        expect_deleted(result, Self::get_resource_type())?;
        tracing::debug!("student deleted");
        Ok(())
    }

    async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(r#"SELECT * FROM "Student" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, limit: i64, offset: i64) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "Student" ORDER BY lastname, firstname LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Student""#)
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Student, StudentCreate, Uuid);

impl Student {
    pub async fn all_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"SELECT * FROM "Student" WHERE user_id = $1 ORDER BY lastname, firstname"#,
        )
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Owning user. `None` only if the row was removed concurrently.
    pub async fn user(&self, mm: &ModelManager) -> DatabaseResult<Option<UserEntity>> {
        UserEntity::find_by_id(mm, self.user_id).await
    }

    pub async fn history(&self, mm: &ModelManager) -> DatabaseResult<Vec<VoiceExercisesHistory>> {
        VoiceExercisesHistory::all_by_student(mm, self.id).await
    }

    pub async fn awards(&self, mm: &ModelManager) -> DatabaseResult<Vec<Award>> {
        Award::all_by_student(mm, self.id).await
    }
}

// Utils

/// Modules a student has completed at least one exercise in, out of all modules.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentProgressRow {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub grade: Option<String>,
    pub completed_modules: i64,
    pub total_modules: i64,
}

const PROGRESS_QUERY: &str = r#"
    SELECT
        s.id,
        s.firstname,
        s.lastname,
        s.grade,
        COUNT(DISTINCT ve."moduleId") FILTER (WHERE h.completed) AS completed_modules,
        (SELECT COUNT(*) FROM "Module") AS total_modules
    FROM "Student" s
    LEFT JOIN "VoiceExercisesHistory" h ON h."studentId" = s.id
    LEFT JOIN "VoiceExercises" ve ON ve.id = h."voiceExercisesId"
"#;

impl StudentProgressRow {
    pub async fn fetch_all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(&format!(
            "{PROGRESS_QUERY} GROUP BY s.id ORDER BY s.lastname, s.firstname"
        ))
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn fetch_for_student(
        mm: &ModelManager,
        student_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(&format!("{PROGRESS_QUERY} WHERE s.id = $1 GROUP BY s.id"))
            .bind(student_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }

    /// Completed share in percent, 0 when there are no modules.
    pub fn percent(&self) -> f64 {
        if self.total_modules == 0 {
            return 0.0;
        }
        self.completed_modules as f64 / self.total_modules as f64 * 100.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn progress(completed_modules: i64, total_modules: i64) -> StudentProgressRow {
        StudentProgressRow {
            id: Uuid::nil(),
            firstname: "Ana".into(),
            lastname: "Cruz".into(),
            grade: Some("GradeOne".into()),
            completed_modules,
            total_modules,
        }
    }

    #[test]
    fn percent_of_completed_modules() {
        assert_eq!(progress(1, 4).percent(), 25.0);
        assert_eq!(progress(3, 3).percent(), 100.0);
    }

    #[test]
    fn percent_without_modules_is_zero() {
        assert_eq!(progress(0, 0).percent(), 0.0);
    }
}
