mod common;

use speechdrill::model::entity::{Grade, VoiceExercises, VoiceExercisesCreate};
use speechdrill::model::{ConstraintViolation, CrudRepository};
use uuid::Uuid;

use crate::common::{create_exercise, create_module, setup_test_db};

#[tokio::test]
async fn exercise_requires_existing_module() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let err = VoiceExercises::create(
        mm,
        VoiceExercisesCreate {
            user_id: None,
            voice_image: None,
            voice: "apple".to_string(),
            grade: Some(Grade::GradeOne),
            module_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.violation(), Some(ConstraintViolation::ForeignKey));
}

#[tokio::test]
async fn grade_outside_enum_is_a_domain_violation() {
    let db = setup_test_db().await;
    let module = create_module(db.mm(), "Vowels").await;

    let result = sqlx::query(
        r#"INSERT INTO "VoiceExercises" (id, voice, grade, "moduleId") VALUES ($1, 'apple', $2::grade_enum, $3)"#,
    )
    .bind(Uuid::new_v4())
    .bind("GradeFour")
    .bind(module.id())
    .execute(db.pool())
    .await;

    let err = speechdrill::model::DatabaseError::from(result.unwrap_err());
    assert_eq!(err.violation(), Some(ConstraintViolation::Domain));
}

#[tokio::test]
async fn voice_is_required() {
    let db = setup_test_db().await;
    let module = create_module(db.mm(), "Vowels").await;

    let result = sqlx::query(r#"INSERT INTO "VoiceExercises" (id, "moduleId") VALUES ($1, $2)"#)
        .bind(Uuid::new_v4())
        .bind(module.id())
        .execute(db.pool())
        .await;

    let err = speechdrill::model::DatabaseError::from(result.unwrap_err());
    assert_eq!(err.violation(), Some(ConstraintViolation::NotNull));
}

#[tokio::test]
async fn user_id_is_free_text() {
    let db = setup_test_db().await;
    let mm = db.mm();
    let module = create_module(mm, "Vowels").await;

    let exercise = VoiceExercises::create(
        mm,
        VoiceExercisesCreate {
            user_id: Some("not-a-user-id".to_string()),
            voice_image: Some("apple.png".to_string()),
            voice: "apple".to_string(),
            grade: Some(Grade::GradeThree),
            module_id: module.id(),
        },
    )
    .await
    .unwrap();

    assert_eq!(exercise.user_id(), Some("not-a-user-id"));
    assert_eq!(exercise.grade(), Some(Grade::GradeThree));
}

#[tokio::test]
async fn exercise_update_and_navigation() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let vowels = create_module(mm, "Vowels").await;
    let consonants = create_module(mm, "Consonants").await;
    let exercise = create_exercise(mm, &vowels, "apple").await;
    assert_eq!(exercise.updated_at(), None);

    let exercise = exercise
        .update(
            mm,
            VoiceExercisesCreate {
                user_id: None,
                voice_image: None,
                voice: "ball".to_string(),
                grade: Some(Grade::GradeTwo),
                module_id: consonants.id(),
            },
        )
        .await
        .unwrap();

    assert!(exercise.updated_at().is_some());
    assert_eq!(exercise.voice(), "ball");

    let module = exercise.module(mm).await.unwrap().unwrap();
    assert_eq!(module.module_title(), "Consonants");
    assert!(vowels.voice_exercises(mm).await.unwrap().is_empty());
    assert_eq!(consonants.voice_exercises(mm).await.unwrap().len(), 1);

    let grade_two = VoiceExercises::all_by_grade(mm, Grade::GradeTwo).await.unwrap();
    assert_eq!(grade_two.len(), 1);
    assert!(VoiceExercises::all_by_grade(mm, Grade::GradeOne).await.unwrap().is_empty());
}
