//! PostgreSQL store
//!
//! Runtime-checked SQLx queries against the schema created by [`migrate`].
//! Every table shares the CRUD shape described by [`PgEntity`]; the filtered
//! queries are written out per repository trait.

mod rows;
mod schema;

use async_trait::async_trait;
use bl_core::traits::{Entity, Id};
use bl_models::{
    Comment, Epic, ProductBacklog, Project, Sprint, SprintBacklog, Task, User, UserStory,
};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use crate::repository::*;

pub use rows::*;
pub use schema::{migrate, SCHEMA};

type PgQueryAs<'q, R> = QueryAs<'q, Postgres, R, PgArguments>;

/// Table mapping for a model stored by [`PgStore`]
pub trait PgEntity: Entity {
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    /// Column list shared by every SELECT and RETURNING clause
    const COLUMNS: &'static str;

    /// INSERT binding the writable fields as `$1..$n`
    const INSERT: &'static str;

    /// UPDATE binding the writable fields as `$1..$n` and the id as `$n+1`
    const UPDATE: &'static str;

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row>;

    fn from_row(row: Self::Row) -> RepositoryResult<Self>;
}

macro_rules! project_columns {
    () => {
        "id, name, description, product_backlog_id, owner_id, created_at, updated_at"
    };
}

macro_rules! product_backlog_columns {
    () => {
        "id, title, description, project_id, created_at, updated_at"
    };
}

macro_rules! backlog_child_columns {
    () => {
        "id, title, description, product_backlog_id, created_at, updated_at"
    };
}

macro_rules! sprint_columns {
    () => {
        "id, name, start_date, end_date, sprint_backlog_id, created_at, updated_at"
    };
}

macro_rules! user_story_columns {
    () => {
        "id, title, as_a, i_want, so_that, description, acceptance_criteria, priority, status, \
         epic_id, product_backlog_id, sprint_backlog_id, created_at, updated_at"
    };
}

macro_rules! task_columns {
    () => {
        "id, title, description, status, due_date, priority, estimated_hours, logged_hours, \
         user_story_id, assignee_id, created_at, updated_at"
    };
}

macro_rules! comment_columns {
    () => {
        "id, content, task_id, author_id, created_at, updated_at"
    };
}

macro_rules! user_columns {
    () => {
        "id, username, email, password_hash, role, created_at, updated_at"
    };
}

impl PgEntity for Project {
    type Row = ProjectRow;

    const COLUMNS: &'static str = project_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO projects (name, description, product_backlog_id, owner_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING ",
        project_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE projects SET name = $1, description = $2, product_backlog_id = $3, owner_id = $4, ",
        "updated_at = NOW() WHERE id = $5 RETURNING ",
        project_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.name)
            .bind(&self.description)
            .bind(self.product_backlog_id)
            .bind(self.owner_id)
    }

    fn from_row(row: ProjectRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for ProductBacklog {
    type Row = ProductBacklogRow;

    const COLUMNS: &'static str = product_backlog_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO product_backlogs (title, description, project_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, NOW(), NOW()) RETURNING ",
        product_backlog_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE product_backlogs SET title = $1, description = $2, project_id = $3, ",
        "updated_at = NOW() WHERE id = $4 RETURNING ",
        product_backlog_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.project_id)
    }

    fn from_row(row: ProductBacklogRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for Epic {
    type Row = BacklogChildRow;

    const COLUMNS: &'static str = backlog_child_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO epics (title, description, product_backlog_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, NOW(), NOW()) RETURNING ",
        backlog_child_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE epics SET title = $1, description = $2, product_backlog_id = $3, ",
        "updated_at = NOW() WHERE id = $4 RETURNING ",
        backlog_child_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.product_backlog_id)
    }

    fn from_row(row: BacklogChildRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for SprintBacklog {
    type Row = BacklogChildRow;

    const COLUMNS: &'static str = backlog_child_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO sprint_backlogs (title, description, product_backlog_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, NOW(), NOW()) RETURNING ",
        backlog_child_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE sprint_backlogs SET title = $1, description = $2, product_backlog_id = $3, ",
        "updated_at = NOW() WHERE id = $4 RETURNING ",
        backlog_child_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.product_backlog_id)
    }

    fn from_row(row: BacklogChildRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for Sprint {
    type Row = SprintRow;

    const COLUMNS: &'static str = sprint_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO sprints (name, start_date, end_date, sprint_backlog_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING ",
        sprint_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE sprints SET name = $1, start_date = $2, end_date = $3, sprint_backlog_id = $4, ",
        "updated_at = NOW() WHERE id = $5 RETURNING ",
        sprint_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.name)
            .bind(self.start_date)
            .bind(self.end_date)
            .bind(self.sprint_backlog_id)
    }

    fn from_row(row: SprintRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for UserStory {
    type Row = UserStoryRow;

    const COLUMNS: &'static str = user_story_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO user_stories (title, as_a, i_want, so_that, description, acceptance_criteria, ",
        "priority, status, epic_id, product_backlog_id, sprint_backlog_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW()) RETURNING ",
        user_story_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE user_stories SET title = $1, as_a = $2, i_want = $3, so_that = $4, ",
        "description = $5, acceptance_criteria = $6, priority = $7, status = $8, epic_id = $9, ",
        "product_backlog_id = $10, sprint_backlog_id = $11, updated_at = NOW() ",
        "WHERE id = $12 RETURNING ",
        user_story_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.title)
            .bind(&self.as_a)
            .bind(&self.i_want)
            .bind(&self.so_that)
            .bind(&self.description)
            .bind(&self.acceptance_criteria)
            .bind(self.priority.as_str())
            .bind(self.status.as_str())
            .bind(self.epic_id)
            .bind(self.product_backlog_id)
            .bind(self.sprint_backlog_id)
    }

    fn from_row(row: UserStoryRow) -> RepositoryResult<Self> {
        row.try_into()
    }
}

impl PgEntity for Task {
    type Row = TaskRow;

    const COLUMNS: &'static str = task_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO tasks (title, description, status, due_date, priority, estimated_hours, ",
        "logged_hours, user_story_id, assignee_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) RETURNING ",
        task_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE tasks SET title = $1, description = $2, status = $3, due_date = $4, ",
        "priority = $5, estimated_hours = $6, logged_hours = $7, user_story_id = $8, ",
        "assignee_id = $9, updated_at = NOW() WHERE id = $10 RETURNING ",
        task_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.status.as_str())
            .bind(self.due_date)
            .bind(self.priority.as_str())
            .bind(self.estimated_hours)
            .bind(self.logged_hours)
            .bind(self.user_story_id)
            .bind(self.assignee_id)
    }

    fn from_row(row: TaskRow) -> RepositoryResult<Self> {
        row.try_into()
    }
}

impl PgEntity for Comment {
    type Row = CommentRow;

    const COLUMNS: &'static str = comment_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO comments (content, task_id, author_id, created_at, updated_at) ",
        "VALUES ($1, $2, $3, NOW(), NOW()) RETURNING ",
        comment_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE comments SET content = $1, task_id = $2, author_id = $3, ",
        "updated_at = NOW() WHERE id = $4 RETURNING ",
        comment_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.content)
            .bind(self.task_id)
            .bind(self.author_id)
    }

    fn from_row(row: CommentRow) -> RepositoryResult<Self> {
        Ok(row.into())
    }
}

impl PgEntity for User {
    type Row = UserRow;

    const COLUMNS: &'static str = user_columns!();
    const INSERT: &'static str = concat!(
        "INSERT INTO users (username, email, password_hash, role, created_at, updated_at) ",
        "VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING ",
        user_columns!()
    );
    const UPDATE: &'static str = concat!(
        "UPDATE users SET username = $1, email = $2, password_hash = $3, role = $4, ",
        "updated_at = NOW() WHERE id = $5 RETURNING ",
        user_columns!()
    );

    fn bind_fields<'q>(&'q self, query: PgQueryAs<'q, Self::Row>) -> PgQueryAs<'q, Self::Row> {
        query
            .bind(&self.username)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.role.as_str())
    }

    fn from_row(row: UserRow) -> RepositoryResult<Self> {
        row.try_into()
    }
}

/// Unique and check violations become domain errors; the rest stay database errors
fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepositoryError::Conflict(db.message().to_string());
        }
        if db.is_check_violation() || db.is_foreign_key_violation() {
            return RepositoryError::Validation(db.message().to_string());
        }
    }
    RepositoryError::Database(err)
}

fn convert_all<T: PgEntity>(rows: Vec<T::Row>) -> RepositoryResult<Vec<T>> {
    rows.into_iter().map(T::from_row).collect()
}

/// PostgreSQL implementation of every repository trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Rows of `T` whose `column` equals `value`
    async fn select_where<T: PgEntity>(
        &self,
        column: &str,
        value: Id,
        order_by: &str,
    ) -> RepositoryResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
            T::COLUMNS,
            T::TABLE_NAME,
            column,
            order_by
        );
        let rows = sqlx::query_as::<_, T::Row>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }
}

#[async_trait]
impl<T: PgEntity> Repository<T> for PgStore {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<T>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::TABLE_NAME);
        let row = sqlx::query_as::<_, T::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(T::from_row).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", T::COLUMNS, T::TABLE_NAME);
        let rows = sqlx::query_as::<_, T::Row>(&sql)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn save(&self, entity: T) -> RepositoryResult<T> {
        let row = match entity.id() {
            None => entity
                .bind_fields(sqlx::query_as::<_, T::Row>(T::INSERT))
                .fetch_one(&self.pool)
                .await
                .map_err(map_write_error)?,
            Some(id) => entity
                .bind_fields(sqlx::query_as::<_, T::Row>(T::UPDATE))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_write_error)?
                .ok_or_else(|| RepositoryError::not_found::<T>(id))?,
        };

        let saved = T::from_row(row)?;
        tracing::debug!(table = T::TABLE_NAME, id = ?saved.id(), "saved");
        Ok(saved)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE_NAME);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found::<T>(id));
        }

        tracing::debug!(table = T::TABLE_NAME, id, "deleted");
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE_NAME);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn find_by_owner(&self, user_id: Id) -> RepositoryResult<Vec<Project>> {
        self.select_where("owner_id", user_id, "id").await
    }

    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Option<Project>> {
        let projects: Vec<Project> = self
            .select_where("product_backlog_id", product_backlog_id, "id")
            .await?;
        Ok(projects.into_iter().next())
    }
}

impl ProductBacklogRepository for PgStore {}

#[async_trait]
impl EpicRepository for PgStore {
    async fn find_by_product_backlog(&self, product_backlog_id: Id) -> RepositoryResult<Vec<Epic>> {
        self.select_where("product_backlog_id", product_backlog_id, "id")
            .await
    }
}

#[async_trait]
impl SprintBacklogRepository for PgStore {
    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<SprintBacklog>> {
        self.select_where("product_backlog_id", product_backlog_id, "id")
            .await
    }
}

#[async_trait]
impl SprintRepository for PgStore {
    async fn find_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<Vec<Sprint>> {
        self.select_where("sprint_backlog_id", sprint_backlog_id, "start_date, id")
            .await
    }
}

#[async_trait]
impl UserStoryRepository for PgStore {
    async fn find_by_sprint_backlog(
        &self,
        sprint_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>> {
        self.select_where("sprint_backlog_id", sprint_backlog_id, "id")
            .await
    }

    async fn count_by_sprint_backlog(&self, sprint_backlog_id: Id) -> RepositoryResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_stories WHERE sprint_backlog_id = $1",
        )
        .bind(sprint_backlog_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn find_without_sprint_backlog(&self) -> RepositoryResult<Vec<UserStory>> {
        let rows = sqlx::query_as::<_, UserStoryRow>(concat!(
            "SELECT ",
            user_story_columns!(),
            " FROM user_stories WHERE sprint_backlog_id IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn find_by_epic(&self, epic_id: Id) -> RepositoryResult<Vec<UserStory>> {
        self.select_where("epic_id", epic_id, "id").await
    }

    async fn find_by_product_backlog(
        &self,
        product_backlog_id: Id,
    ) -> RepositoryResult<Vec<UserStory>> {
        self.select_where("product_backlog_id", product_backlog_id, "id")
            .await
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn find_by_user_story(&self, user_story_id: Id) -> RepositoryResult<Vec<Task>> {
        self.select_where("user_story_id", user_story_id, "id").await
    }

    async fn find_by_assignee(&self, user_id: Id) -> RepositoryResult<Vec<Task>> {
        self.select_where("assignee_id", user_id, "id").await
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn find_by_task(&self, task_id: Id) -> RepositoryResult<Vec<Comment>> {
        self.select_where("task_id", task_id, "created_at, id").await
    }

    async fn find_by_author(&self, user_id: Id) -> RepositoryResult<Vec<Comment>> {
        self.select_where("author_id", user_id, "created_at, id").await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(sql: &str) -> usize {
        (1..=20).filter(|n| sql.contains(&format!("${}", n))).count()
    }

    #[test]
    fn test_update_binds_id_last() {
        assert_eq!(placeholders(<Project as PgEntity>::INSERT), 4);
        assert_eq!(placeholders(<Project as PgEntity>::UPDATE), 5);
        assert_eq!(placeholders(<UserStory as PgEntity>::INSERT), 11);
        assert!(<UserStory as PgEntity>::UPDATE.contains("WHERE id = $12"));
        assert_eq!(placeholders(<Task as PgEntity>::INSERT), 9);
        assert!(<Task as PgEntity>::UPDATE.contains("WHERE id = $10"));
        assert!(<Sprint as PgEntity>::UPDATE.contains("WHERE id = $5"));
    }

    #[test]
    fn test_returning_matches_columns() {
        assert!(<Sprint as PgEntity>::INSERT.ends_with(<Sprint as PgEntity>::COLUMNS));
        assert!(<Comment as PgEntity>::UPDATE.ends_with(<Comment as PgEntity>::COLUMNS));
        assert!(<User as PgEntity>::INSERT.ends_with(<User as PgEntity>::COLUMNS));
    }
}
