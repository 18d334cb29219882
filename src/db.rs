use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Schema,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{author, author_dashboard, category, content, dashboard, element, record, template};

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    if config.is_sqlite() {
        info!("Connecting to sqlite database: {}", config.name);
    } else {
        info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);
    }

    let mut opt = ConnectOptions::new(&database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);
    if !config.is_sqlite() {
        opt.set_schema_search_path("public");
    }

    let db = Database::connect(opt).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

/// Create tables and indexes that do not exist yet
pub async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    // Create tables in dependency order
    // 1. Independent tables first
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(category::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(author::Entity)).await?;

    // 2. Tables with foreign key dependencies
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(dashboard::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(author_dashboard::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(template::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(element::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(content::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(record::Entity)).await?;

    // 3. Composite unique keys and secondary indexes
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("uq_dashboard_name_category")
            .table(dashboard::Entity)
            .col(dashboard::Column::Name)
            .col(dashboard::Column::CategoryName)
            .unique()
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("uq_template_name_dashboard")
            .table(template::Entity)
            .col(template::Column::Name)
            .col(template::Column::DashboardId)
            .unique()
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("uq_element_name_template")
            .table(element::Entity)
            .col(element::Column::Name)
            .col(element::Column::TemplateId)
            .unique()
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("idx_record_created_at")
            .table(record::Entity)
            .col(record::Column::CreatedAt)
            .to_owned(),
    )
    .await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Create an index if it doesn't exist
async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Fresh in-memory sqlite database with the full schema, for tests
#[cfg(test)]
pub async fn test_database() -> DatabaseConnection {
    // every pooled connection would open its own empty in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to connect to test database");
    auto_migrate(&db).await.expect("Failed to migrate test database");
    db
}
