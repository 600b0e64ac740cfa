use ficshelf_common::{Conf, Report};

pub async fn run(conf: &Conf) -> Result<(), Report> {
    let applied = migrate(&conf.database).await?;

    tracing::info!(database = %conf.database, applied, "database is up to date");

    Ok(())
}

/// Creates the database when missing, applies pending migrations and returns how many are applied.
#[tracing::instrument(err)]
async fn migrate(database: &str) -> Result<i64, Report> {
    let pool = ficshelf_queries::init_database_connection(database).await?;

    let applied = ficshelf_queries::applied_migrations(&pool).await?;

    pool.close().await;

    Ok(applied)
}
