//! Schema creation
//!
//! Idempotent DDL applied in one transaction. Foreign keys carry the same
//! cascade/set-null rules the deletion service applies, so rows removed by
//! hand do not leave dangling references either.

use sqlx::PgPool;

/// Statements applied by [`migrate`], in order
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'DEVELOPER',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        product_backlog_id BIGINT,
        owner_id BIGINT REFERENCES users (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_backlogs (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        project_id BIGINT REFERENCES projects (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    // projects and product_backlogs reference each other
    "ALTER TABLE projects DROP CONSTRAINT IF EXISTS projects_product_backlog_id_fkey",
    r#"
    ALTER TABLE projects ADD CONSTRAINT projects_product_backlog_id_fkey
        FOREIGN KEY (product_backlog_id) REFERENCES product_backlogs (id) ON DELETE SET NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS epics (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        product_backlog_id BIGINT REFERENCES product_backlogs (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sprint_backlogs (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        product_backlog_id BIGINT REFERENCES product_backlogs (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sprints (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        sprint_backlog_id BIGINT REFERENCES sprint_backlogs (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT sprints_date_order CHECK (end_date >= start_date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS sprints_sprint_backlog_id_idx ON sprints (sprint_backlog_id)",
    r#"
    CREATE TABLE IF NOT EXISTS user_stories (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        as_a TEXT,
        i_want TEXT,
        so_that TEXT,
        description TEXT,
        acceptance_criteria TEXT,
        priority TEXT NOT NULL DEFAULT 'MEDIUM',
        status TEXT NOT NULL DEFAULT 'toDo',
        epic_id BIGINT REFERENCES epics (id) ON DELETE SET NULL,
        product_backlog_id BIGINT REFERENCES product_backlogs (id) ON DELETE SET NULL,
        sprint_backlog_id BIGINT REFERENCES sprint_backlogs (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS user_stories_sprint_backlog_id_idx ON user_stories (sprint_backlog_id)",
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'TO_DO',
        due_date DATE,
        priority TEXT NOT NULL DEFAULT 'MEDIUM',
        estimated_hours DOUBLE PRECISION CHECK (estimated_hours >= 0),
        logged_hours DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (logged_hours >= 0),
        user_story_id BIGINT REFERENCES user_stories (id) ON DELETE CASCADE,
        assignee_id BIGINT REFERENCES users (id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS tasks_user_story_id_idx ON tasks (user_story_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id BIGSERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        task_id BIGINT NOT NULL REFERENCES tasks (id) ON DELETE CASCADE,
        author_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Create all tables, constraints and indexes
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = SCHEMA.len(), "schema migrated");
    Ok(())
}
