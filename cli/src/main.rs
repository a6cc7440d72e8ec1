use clap::{Parser, Subcommand};
use speechdrill::model::entity::{
    Award,
    Grade,
    HistoryReportRow,
    Module,
    ModuleCreate,
    ModuleWithExercisesRow,
    Student,
    StudentCreate,
    StudentProgressRow,
    Subject,
    UserEntity,
    UserEntityCreateUpdate,
    VoiceExercises,
    VoiceExercisesCreate,
    VoiceExercisesHistory,
    VoiceExercisesHistoryCreate,
};
use speechdrill::model::{CrudRepository, DatabaseError, ModelManager, ResourceType};
use speechdrill::{Config, error::AppResult};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling and inspecting the speechdrill DB", long_about = None)]
pub struct Cli {
    /// Apply pending migrations before running the command
    #[arg(long, global = true, default_value_t = false)]
    pub migrate: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage voice exercises
    Exercise {
        #[command(subcommand)]
        action: ExerciseCommands,
    },

    /// Record exercise attempts
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Grant awards
    Award {
        #[command(subcommand)]
        action: AwardCommands,
    },

    /// Print reports
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Check a password against the stored hash
    CheckPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    Add {
        /// Username of the owning user
        #[arg(long)]
        username: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        grade: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        learn_outcome: Option<String>,
        #[arg(long)]
        video: Option<String>,
        #[arg(long)]
        image: Option<String>,
        /// Reading or Math
        #[arg(long)]
        subject: Option<Subject>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExerciseCommands {
    Add {
        /// Module title to attach the exercise to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        voice: String,
        #[arg(long)]
        voice_image: Option<String>,
        /// GradeOne, GradeTwo or GradeThree
        #[arg(long)]
        grade: Option<Grade>,
        /// Free-text author reference
        #[arg(long)]
        user_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    Record {
        #[arg(long)]
        student_id: Option<Uuid>,
        #[arg(long)]
        exercise_id: Option<Uuid>,
        #[arg(long)]
        recognized_text: Option<String>,
        #[arg(long)]
        accuracy: Option<i32>,
        #[arg(long)]
        pronunciation: Option<i32>,
        #[arg(long)]
        fluency: Option<i32>,
        #[arg(long)]
        speed: Option<i32>,
        #[arg(long)]
        score: Option<i32>,
        #[arg(long, default_value_t = false)]
        completed: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AwardCommands {
    /// Evaluate voice-exercise history and grant a badge if earned
    Evaluate {
        #[arg(long)]
        student_id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Completed modules per student
    Progress,
    /// Attempts of students in a grade
    History {
        #[arg(long)]
        grade: Grade,
    },
    /// Modules with their exercises
    Modules,
}

async fn connect() -> AppResult<ModelManager> {
    let config = Config::get_or_init(true).await?;
    speechdrill::build_model_manager(config)
}

fn not_found(resource_type: ResourceType) -> DatabaseError {
    DatabaseError::NotFound { resource_type }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    speechdrill::setup_trace();

    let mm = connect().await?;
    if args.migrate {
        speechdrill::model::migrate(&mm).await?;
    }

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { name, username, email, password } => {
                let user = UserEntity::create(
                    &mm,
                    UserEntityCreateUpdate {
                        name,
                        username,
                        email,
                        password: speechdrill::auth::hash_password(&password)?,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
            UserCommands::CheckPassword { username, password } => {
                let user = UserEntity::find_by_username(&mm, &username)
                    .await?
                    .ok_or(not_found(ResourceType::User))?;

                if speechdrill::auth::verify_password(&password, user.password())? {
                    println!("Password matches for {}", user.username());
                } else {
                    println!("Password does not match for {}", user.username());
                    std::process::exit(1);
                }
            }
        },

        Commands::Student { action } => match action {
            StudentCommands::Add { username, firstname, lastname, sex, grade } => {
                let user = UserEntity::find_by_username(&mm, &username)
                    .await?
                    .ok_or(not_found(ResourceType::User))?;

                let student = Student::create(
                    &mm,
                    StudentCreate {
                        firstname,
                        lastname,
                        user_id: user.id(),
                        sex,
                        grade,
                    },
                )
                .await?;
                println!("Student created: {:?}", student);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add { title, description, learn_outcome, video, image, subject } => {
                let module = Module::create(
                    &mm,
                    ModuleCreate {
                        module_title: title,
                        module_description: description,
                        learn_outcome1: learn_outcome,
                        video_module: video,
                        image_module: image,
                        subjects: subject,
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Exercise { action } => match action {
            ExerciseCommands::Add { module_title, voice, voice_image, grade, user_id } => {
                let module = Module::find_by_title(&mm, &module_title)
                    .await?
                    .ok_or(not_found(ResourceType::Module))?;

                let exercise = VoiceExercises::create(
                    &mm,
                    VoiceExercisesCreate {
                        user_id,
                        voice_image,
                        voice,
                        grade,
                        module_id: module.id(),
                    },
                )
                .await?;
                println!("Exercise created: {:?}", exercise);
            }
        },

        Commands::History { action } => match action {
            HistoryCommands::Record {
                student_id,
                exercise_id,
                recognized_text,
                accuracy,
                pronunciation,
                fluency,
                speed,
                score,
                completed,
            } => {
                // copy the prompt from the exercise like the practice screen does
                let exercise = match exercise_id {
                    Some(id) => Some(
                        VoiceExercises::find_by_id(&mm, id)
                            .await?
                            .ok_or(not_found(ResourceType::VoiceExercises))?,
                    ),
                    None => None,
                };

                let attempt = VoiceExercisesHistory::create(
                    &mm,
                    VoiceExercisesHistoryCreate {
                        voice: exercise.as_ref().map(|e| e.voice().to_string()),
                        voice_image: exercise
                            .as_ref()
                            .and_then(|e| e.voice_image().map(str::to_string)),
                        recognized_text,
                        accuracy_score: accuracy,
                        pronunciation_score: pronunciation,
                        fluency_score: fluency,
                        speed_score: speed,
                        score,
                        voice_exercises_id: exercise_id,
                        student_id,
                        completed: Some(completed),
                        ..Default::default()
                    },
                )
                .await?;
                println!("Attempt recorded: {:?}", attempt);
            }
        },

        Commands::Award { action } => match action {
            AwardCommands::Evaluate { student_id } => {
                match Award::evaluate_for_student(&mm, student_id).await? {
                    Some(award) => println!("Award granted: {:?}", award),
                    None => println!("No award earned."),
                }
            }
        },

        Commands::Report { action } => match action {
            ReportCommands::Progress => {
                for row in StudentProgressRow::fetch_all(&mm).await? {
                    println!(
                        "{} {}: {}/{} modules ({:.2}%)",
                        row.firstname,
                        row.lastname,
                        row.completed_modules,
                        row.total_modules,
                        row.percent()
                    );
                }
            }
            ReportCommands::History { grade } => {
                let rows = HistoryReportRow::fetch_by_student_grade(&mm, grade).await?;
                println!("{}", serde_json::to_string_pretty(&rows).map_err(DatabaseError::from)?);
            }
            ReportCommands::Modules => {
                for row in ModuleWithExercisesRow::fetch_all(&mm).await? {
                    let subject = row.subjects.map(|s| s.to_string()).unwrap_or_default();
                    println!("{} [{}]", row.module_title, subject);
                    for exercise in row.exercises()? {
                        let grade = exercise.grade.map(|g| g.to_string()).unwrap_or_default();
                        println!("  - {} {} {}", exercise.id, exercise.voice, grade);
                    }
                }
            }
        },
    }

    Ok(())
}
