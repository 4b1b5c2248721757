/// Embedded schema migrations
///
/// The SQL files in `fieldtask-shared/migrations/` are compiled into the
/// binary with `sqlx::migrate!` and applied in timestamp order.
///
/// | Migration | Creates |
/// |---|---|
/// | `..._create_users` | `user_role` enum, `users` table |
/// | `..._create_tasks` | `task_status` enum, `tasks` table |

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPool;
use tracing::{error, info};

/// Migrations bundled with this crate
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails; the failing migration is rolled
/// back
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Running database migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(trace = "db.migrations.run", error = %e, "Migration failed");
        e
    })?;

    info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        let descriptions: Vec<&str> = MIGRATOR.iter().map(|m| m.description.as_ref()).collect();
        assert!(descriptions.contains(&"create users"));
        assert!(descriptions.contains(&"create tasks"));
    }
}
