mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{ConstraintViolation, DatabaseError, DatabaseResult};

mod id;
pub use id::{IdGenerator, new_id};

mod repo;
pub use repo::{CrudRepository, Page, PaginatableRepository, ResourceType, ResourceTyped};

use sqlx::PgPool;
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Persistence context. Built once at startup and passed by reference into
/// every repository call.
#[derive(Debug, Clone)]
pub struct ModelManager {
    database: DbConnection,
    id_generator: IdGenerator,
}

impl ModelManager {
    pub fn new(conn: DbConnection) -> Self {
        Self::with_id_generator(conn, new_id)
    }

    pub fn with_id_generator(conn: DbConnection, id_generator: IdGenerator) -> Self {
        Self {
            database: conn,
            id_generator,
        }
    }

    pub fn executor(&self) -> &PgPool {
        self.database.pool()
    }

    pub fn next_id(&self) -> Uuid {
        (self.id_generator)()
    }
}

/// Applies the bundled schema migrations.
#[tracing::instrument(skip_all)]
pub async fn migrate(mm: &ModelManager) -> DatabaseResult<()> {
    tracing::debug!("applying migrations...");
    MIGRATOR.run(mm.executor()).await?;
    Ok(())
}
