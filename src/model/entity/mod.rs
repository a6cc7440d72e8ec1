mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod student;
pub use student::{Student, StudentCreate, StudentProgressRow};

mod module;
pub use module::{ExerciseSummary, Module, ModuleCreate, ModuleWithExercisesRow, Subject};

mod voice_exercises;
pub use voice_exercises::{Grade, VoiceExercises, VoiceExercisesCreate};

mod voice_exercises_history;
pub use voice_exercises_history::{
    HistoryReportRow, VoiceExercisesHistory, VoiceExercisesHistoryCreate,
};

mod award;
pub use award::{Award, AwardCreate, Badge, VOICE_TIER};
