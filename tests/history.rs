mod common;

use speechdrill::model::entity::{
    Grade, HistoryReportRow, StudentProgressRow, VoiceExercisesHistory,
    VoiceExercisesHistoryCreate,
};
use speechdrill::model::{ConstraintViolation, CrudRepository};
use uuid::Uuid;

use crate::common::{create_exercise, create_module, create_student, create_user, setup_test_db};

#[tokio::test]
async fn completed_defaults_to_false() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let attempt = VoiceExercisesHistory::create(mm, VoiceExercisesHistoryCreate::default())
        .await
        .unwrap();
    assert!(!attempt.completed());

    // column default, bypassing the repository
    let id = Uuid::new_v4();
    sqlx::query(r#"INSERT INTO "VoiceExercisesHistory" (id, score) VALUES ($1, 50)"#)
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();
    let raw = VoiceExercisesHistory::find_by_id(mm, id).await.unwrap().unwrap();
    assert!(!raw.completed());
    assert_eq!(raw.score(), Some(50));
}

#[tokio::test]
async fn unattached_attempt_is_allowed() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let attempt = VoiceExercisesHistory::create(
        mm,
        VoiceExercisesHistoryCreate {
            recognized_text: Some("apel".to_string()),
            accuracy_score: Some(60),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(attempt.student_id(), None);
    assert!(attempt.student(mm).await.unwrap().is_none());
    assert!(attempt.voice_exercises(mm).await.unwrap().is_none());
}

#[tokio::test]
async fn attempt_requires_existing_student_when_set() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let err = VoiceExercisesHistory::create(
        mm,
        VoiceExercisesHistoryCreate {
            student_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.violation(), Some(ConstraintViolation::ForeignKey));
}

#[tokio::test]
async fn attempt_navigation_and_update() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let user = create_user(mm, "parent", None).await;
    let student = create_student(mm, &user, "GradeOne").await;
    let module = create_module(mm, "Vowels").await;
    let exercise = create_exercise(mm, &module, "apple").await;

    let attempt = VoiceExercisesHistory::create(
        mm,
        VoiceExercisesHistoryCreate {
            voice: Some("apple".to_string()),
            student_id: Some(student.id()),
            voice_exercises_id: Some(exercise.id()),
            pronunciation_score: Some(70),
            score: Some(72),
            phonemes: Some("AE P AH L".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(attempt.student(mm).await.unwrap().unwrap().id(), student.id());
    assert_eq!(
        attempt.voice_exercises(mm).await.unwrap().unwrap().voice(),
        "apple"
    );
    assert_eq!(exercise.history(mm).await.unwrap().len(), 1);

    let attempt = attempt
        .update(
            mm,
            VoiceExercisesHistoryCreate {
                voice: Some("apple".to_string()),
                student_id: Some(student.id()),
                voice_exercises_id: Some(exercise.id()),
                score: Some(91),
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(attempt.completed());
    assert_eq!(attempt.score(), Some(91));
    assert_eq!(attempt.pronunciation_score(), None);
}

#[tokio::test]
async fn deleting_exercise_keeps_history() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let module = create_module(mm, "Vowels").await;
    let exercise = create_exercise(mm, &module, "apple").await;
    let attempt = VoiceExercisesHistory::create(
        mm,
        VoiceExercisesHistoryCreate {
            voice_exercises_id: Some(exercise.id()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    exercise.delete(mm).await.unwrap();

    let kept = VoiceExercisesHistory::find_by_id(mm, attempt.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.voice_exercises_id(), None);
}

#[tokio::test]
async fn progress_counts_distinct_completed_modules() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let user = create_user(mm, "parent", None).await;
    let student = create_student(mm, &user, "GradeOne").await;
    let idle = create_student(mm, &user, "GradeOne").await;

    let vowels = create_module(mm, "Vowels").await;
    let counting = create_module(mm, "Counting").await;
    create_module(mm, "Shapes").await;
    create_module(mm, "Colors").await;

    let apple = create_exercise(mm, &vowels, "apple").await;
    let egg = create_exercise(mm, &vowels, "egg").await;
    let one = create_exercise(mm, &counting, "one").await;

    for (exercise, completed) in [(&apple, true), (&egg, true), (&one, false)] {
        VoiceExercisesHistory::create(
            mm,
            VoiceExercisesHistoryCreate {
                student_id: Some(student.id()),
                voice_exercises_id: Some(exercise.id()),
                completed: Some(completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let progress = StudentProgressRow::fetch_for_student(mm, student.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.completed_modules, 1);
    assert_eq!(progress.total_modules, 4);
    assert_eq!(progress.percent(), 25.0);

    let all = StudentProgressRow::fetch_all(mm).await.unwrap();
    assert_eq!(all.len(), 2);
    let idle_row = all.iter().find(|row| row.id == idle.id()).unwrap();
    assert_eq!(idle_row.completed_modules, 0);
}

#[tokio::test]
async fn history_report_filters_by_student_grade() {
    let db = setup_test_db().await;
    let mm = db.mm();

    let user = create_user(mm, "parent", None).await;
    let first_grader = create_student(mm, &user, "GradeOne").await;
    let second_grader = create_student(mm, &user, "GradeTwo").await;
    let module = create_module(mm, "Vowels").await;
    let exercise = create_exercise(mm, &module, "apple").await;

    for student in [&first_grader, &second_grader] {
        VoiceExercisesHistory::create(
            mm,
            VoiceExercisesHistoryCreate {
                student_id: Some(student.id()),
                voice_exercises_id: Some(exercise.id()),
                score: Some(80),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }
    // orphaned from its exercise, still reported without a module title
    VoiceExercisesHistory::create(
        mm,
        VoiceExercisesHistoryCreate {
            student_id: Some(first_grader.id()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let rows = HistoryReportRow::fetch_by_student_grade(mm, Grade::GradeOne)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.student_id == first_grader.id()));
    assert_eq!(
        rows.iter().filter(|row| row.module_title.as_deref() == Some("Vowels")).count(),
        1
    );
    assert_eq!(rows.iter().filter(|row| row.module_title.is_none()).count(), 1);

    let none = HistoryReportRow::fetch_by_student_grade(mm, Grade::GradeThree)
        .await
        .unwrap();
    assert!(none.is_empty());
}
